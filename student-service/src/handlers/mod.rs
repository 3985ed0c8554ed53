pub mod fallback;
pub mod health;
pub mod students;

pub use fallback::{method_not_allowed, not_found, timeout_detail};
pub use health::{health_check, metrics, readiness_check, root};
pub use students::{create_student, delete_student, get_student, list_students, update_student};

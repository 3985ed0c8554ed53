pub mod students;

pub use students::{GpaValue, StudentPayload};

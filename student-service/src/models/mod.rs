pub mod student;

pub use student::{DecodeError, NewStudent, StudentId, StudentRecord, StudentUpdate};

pub mod validation;

pub use validation::{
    validate_identifier, validate_record, validate_update, JsonPayload, ValidationError, MAX_GPA,
};

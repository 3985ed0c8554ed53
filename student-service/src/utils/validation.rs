use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use thiserror::Error;
use validator::ValidateEmail;

use crate::dtos::{GpaValue, StudentPayload};
use crate::models::{NewStudent, StudentId, StudentUpdate};

/// Highest GPA a record may carry (inclusive).
pub const MAX_GPA: f64 = 4.0;

const IDENTIFIER_LEN: usize = 24;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Field '{0}' is required and must not be empty")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Field 'gpa' must be a number")]
    InvalidGpa,

    #[error("Field 'gpa' must be less than or equal to 4.0, got {0}")]
    GpaOutOfRange(f64),

    #[error("Invalid student id '{0}'")]
    InvalidIdentifier(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError(anyhow::Error::new(err))
    }
}

/// Parses a 24-hex-character identifier, normalising it to lowercase.
pub fn validate_identifier(raw: &str) -> Result<StudentId, ValidationError> {
    if raw.len() != IDENTIFIER_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidIdentifier(raw.to_string()));
    }
    ObjectId::parse_str(raw.to_ascii_lowercase())
        .map(StudentId::from)
        .map_err(|_| ValidationError::InvalidIdentifier(raw.to_string()))
}

/// Validates a create payload. Fields are checked in the order
/// name, email, course, gpa and the first failure is returned.
pub fn validate_record(payload: StudentPayload) -> Result<NewStudent, ValidationError> {
    let name = required(payload.name, "name")?;
    let email = validate_email(required(payload.email, "email")?)?;
    let course = required(payload.course, "course")?;
    let gpa = validate_gpa(&payload.gpa.ok_or(ValidationError::MissingField("gpa"))?)?;

    Ok(NewStudent {
        name,
        email,
        course,
        gpa,
    })
}

/// Validates a partial update; absent fields are left alone.
pub fn validate_update(payload: StudentPayload) -> Result<StudentUpdate, ValidationError> {
    Ok(StudentUpdate {
        name: payload.name.map(|v| non_empty(v, "name")).transpose()?,
        email: payload
            .email
            .map(|v| non_empty(v, "email").and_then(validate_email))
            .transpose()?,
        course: payload.course.map(|v| non_empty(v, "course")).transpose()?,
        gpa: payload.gpa.as_ref().map(validate_gpa).transpose()?,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    non_empty(value.ok_or(ValidationError::MissingField(field))?, field)
}

fn non_empty(value: String, field: &'static str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value)
}

fn validate_email(email: String) -> Result<String, ValidationError> {
    if email.validate_email() {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn validate_gpa(gpa: &GpaValue) -> Result<f64, ValidationError> {
    let value = gpa.as_f64().ok_or(ValidationError::InvalidGpa)?;
    if value > MAX_GPA {
        return Err(ValidationError::GpaOutOfRange(value));
    }
    Ok(value)
}

/// JSON body extractor whose rejections render as `{"detail": ...}`.
///
/// Type mismatches become 422, unparseable bodies 400.
pub struct JsonPayload<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonPayload(value)),
            Err(JsonRejection::JsonDataError(e)) => Err(AppError::ValidationError(
                anyhow::anyhow!("Invalid request body: {}", e.body_text()),
            )),
            Err(e) => Err(AppError::BadRequest(anyhow::anyhow!(
                "Json parse error: {}",
                e.body_text()
            ))),
        }
    }
}

//! Student record schema and its mapping to and from stored documents.

use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize, Serializer};
use service_core::error::AppError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::validation::{validate_identifier, ValidationError};

/// Store-assigned identifier of a student.
///
/// Always rendered as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StudentId(ObjectId);

impl StudentId {
    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// Equality filter selecting the document with this id.
    pub fn filter(&self) -> Document {
        doc! { "_id": self.0 }
    }
}

impl From<ObjectId> for StudentId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl FromStr for StudentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_identifier(s)
    }
}

impl Serialize for StudentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub course: String,
    pub gpa: f64,
}

/// A stored document does not have the shape of a student record.
#[derive(Debug, Error)]
#[error("Stored student document is malformed: {0}")]
pub struct DecodeError(#[from] bson::de::Error);

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

#[derive(Deserialize)]
struct StoredStudent {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    course: String,
    gpa: f64,
}

impl StudentRecord {
    pub fn from_document(document: Document) -> Result<Self, DecodeError> {
        let stored: StoredStudent = bson::from_document(document)?;
        Ok(Self {
            id: StudentId(stored.id),
            name: stored.name,
            email: stored.email,
            course: stored.course,
            gpa: stored.gpa,
        })
    }
}

/// A validated record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course: String,
    pub gpa: f64,
}

impl NewStudent {
    pub fn to_document(&self) -> Document {
        doc! {
            "name": self.name.as_str(),
            "email": self.email.as_str(),
            "course": self.course.as_str(),
            "gpa": self.gpa,
        }
    }
}

/// Validated partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub gpa: Option<f64>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.course.is_none() && self.gpa.is_none()
    }

    /// Fields to `$set`, containing only the ones present.
    pub fn to_document(&self) -> Document {
        let mut changes = Document::new();
        if let Some(name) = &self.name {
            changes.insert("name", name.as_str());
        }
        if let Some(email) = &self.email {
            changes.insert("email", email.as_str());
        }
        if let Some(course) = &self.course {
            changes.insert("course", course.as_str());
        }
        if let Some(gpa) = self.gpa {
            changes.insert("gpa", gpa);
        }
        changes
    }
}

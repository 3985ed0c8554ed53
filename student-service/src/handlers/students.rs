use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use metrics::counter;
use mongodb::bson::doc;
use service_core::error::AppError;

use crate::dtos::StudentPayload;
use crate::models::{StudentId, StudentRecord};
use crate::startup::AppState;
use crate::utils::{validate_identifier, validate_record, validate_update, JsonPayload};

/// Upper bound on the number of records returned by a listing.
pub const LIST_LIMIT: i64 = 100;

fn student_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Student not found"))
}

async fn fetch_student(state: &AppState, id: StudentId) -> Result<Option<StudentRecord>, AppError> {
    state
        .store
        .find_one(state.collection(), id.filter())
        .await?
        .map(StudentRecord::from_document)
        .transpose()
        .map_err(AppError::from)
}

pub async fn create_student(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload<StudentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let student = validate_record(payload)?;

    let id = StudentId::from(
        state
            .store
            .insert(state.collection(), student.to_document())
            .await?,
    );

    // Read back what was persisted rather than echoing the request.
    let created = fetch_student(&state, id).await?.ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("Student {} missing right after insert", id))
    })?;

    counter!("students_created_total").increment(1);
    tracing::info!(student_id = %created.id, "Student created");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_students(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let documents = state
        .store
        .find_many(state.collection(), doc! {}, LIST_LIMIT)
        .await?;

    let students = documents
        .into_iter()
        .map(StudentRecord::from_document)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = students.len(), "Listed students");

    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = validate_identifier(&id)?;

    let student = fetch_student(&state, id)
        .await?
        .ok_or_else(student_not_found)?;

    Ok(Json(student))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonPayload(payload): JsonPayload<StudentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let id = validate_identifier(&id)?;
    let update = validate_update(payload)?;

    if !update.is_empty() {
        let matched = state
            .store
            .update_one(state.collection(), id.filter(), update.to_document())
            .await?;
        if matched == 0 {
            return Err(student_not_found());
        }
        counter!("students_updated_total").increment(1);
        tracing::info!(student_id = %id, "Student updated");
    }

    let student = fetch_student(&state, id)
        .await?
        .ok_or_else(student_not_found)?;

    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = validate_identifier(&id)?;

    let existing = state
        .store
        .find_one(state.collection(), id.filter())
        .await?;
    if existing.is_none() {
        return Err(student_not_found());
    }

    // A concurrent delete may have won between the lookup and this call.
    let deleted = state
        .store
        .delete_one(state.collection(), id.filter())
        .await?;
    if deleted == 0 {
        return Err(student_not_found());
    }

    counter!("students_deleted_total").increment(1);
    tracing::info!(student_id = %id, "Student deleted");

    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    error::{RepoError, RepoResult},
    models::{
        CreatePersonRequest, HealthStatus, Person, PersonResponse, PersonsResponse,
        UpdatePersonRequest,
    },
    state::AppState,
};

/// Collection path; a created person lives at `{PERSONS_PATH}/{id}`.
pub const PERSONS_PATH: &str = "/api/v1/persons";

pub async fn healthcheck() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

pub async fn create_person(
    State(state): State<AppState>,
    payload: Result<Json<CreatePersonRequest>, JsonRejection>,
) -> RepoResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(malformed_body)?;
    payload.validate().map_err(RepoError::InvalidInput)?;

    let created = state.service.create(Person::from(payload)).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{PERSONS_PATH}/{}", created.id))],
    ))
}

pub async fn list_persons(State(state): State<AppState>) -> RepoResult<Json<PersonsResponse>> {
    let persons = state.service.get_all().await?;
    Ok(Json(PersonsResponse::from(persons)))
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RepoResult<Json<PersonResponse>> {
    let person = state.service.get_by_id(&id).await?;
    Ok(Json(PersonResponse::from(person)))
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePersonRequest>, JsonRejection>,
) -> RepoResult<Json<PersonResponse>> {
    let Json(payload) = payload.map_err(malformed_body)?;
    let (person, mask) = payload.into_person_and_mask(id);

    let updated = state.service.update(person, mask).await?;
    Ok(Json(PersonResponse::from(updated)))
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RepoResult<StatusCode> {
    state.service.delete(&id).await?;
    Ok(StatusCode::OK)
}

// Axum would answer with its own status and a text body; every malformed
// body is a plain 400 here.
fn malformed_body(rejection: JsonRejection) -> RepoError {
    RepoError::invalid_input(rejection.body_text())
}

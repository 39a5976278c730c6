//! Pet route handlers. All of them sit behind the auth gate.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use petstore_core::{ApiResponse, Pet, PetId};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::extract::{ApiForm, ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `?status=available,sold`
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// `?tags=tag1,tag2`
#[derive(Debug, Deserialize)]
pub struct TagsQuery {
    pub tags: Option<String>,
}

/// Form body of `POST /pet/{petId}`.
#[derive(Debug, Deserialize)]
pub struct PetForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// Split a required comma-separated query value.
fn split_required(value: Option<String>, param: &str) -> Result<Vec<String>> {
    match value {
        Some(value) if !value.is_empty() => Ok(value.split(',').map(str::to_owned).collect()),
        _ => Err(AppError::BadRequest(format!(
            "{param} query parameter is required"
        ))),
    }
}

/// Add a new pet.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(pet): ApiJson<Pet>,
) -> Result<(StatusCode, Json<Pet>)> {
    let created = state.pets().create_pet(&pet).await?;
    tracing::debug!(username = %user.username, pet_id = %created.id, "create pet");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing pet.
pub async fn update(
    State(state): State<AppState>,
    ApiJson(pet): ApiJson<Pet>,
) -> Result<Json<Pet>> {
    Ok(Json(state.pets().update_pet(&pet).await?))
}

/// Find pets by status. No match is reported as 404.
pub async fn find_by_status(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatusQuery>,
) -> Result<Json<Vec<Pet>>> {
    let statuses = split_required(query.status, "status")?;
    let pets = state.pets().find_pets_by_status(&statuses).await?;
    if pets.is_empty() {
        return Err(AppError::NotFound("no pets found for given statuses".to_string()));
    }
    Ok(Json(pets))
}

/// Find pets by tags. No match is reported as 404.
pub async fn find_by_tags(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TagsQuery>,
) -> Result<Json<Vec<Pet>>> {
    let tags = split_required(query.tags, "tags")?;
    let pets = state.pets().find_pets_by_tags(&tags).await?;
    if pets.is_empty() {
        return Err(AppError::NotFound("no pets found for given tags".to_string()));
    }
    Ok(Json(pets))
}

pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PetId>,
) -> Result<Json<Pet>> {
    Ok(Json(state.pets().find_pet_by_id(id).await?))
}

/// Update name and status from a form.
pub async fn update_form(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PetId>,
    ApiForm(form): ApiForm<PetForm>,
) -> Result<Json<Pet>> {
    let pet = state
        .pets()
        .update_pet_form_data(id, &form.name, &form.status)
        .await?;
    Ok(Json(pet))
}

pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<PetId>,
) -> Result<StatusCode> {
    state.pets().delete_pet(id).await?;
    tracing::debug!(username = %user.username, pet_id = %id, "delete pet");
    Ok(StatusCode::NO_CONTENT)
}

/// Accept an image upload. The file is read and discarded.
pub async fn upload_image(
    ApiPath(id): ApiPath<PetId>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>> {
    let mut multipart = multipart?;
    let mut file_bytes = None;
    let mut metadata = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => file_bytes = Some(field.bytes().await?.len()),
            Some("additionalMetadata") => metadata = Some(field.text().await?),
            _ => {}
        }
    }

    let Some(size) = file_bytes else {
        return Err(AppError::BadRequest("file is required".to_string()));
    };

    tracing::info!(pet_id = %id, size, metadata = ?metadata, "pet image received");
    Ok(Json(ApiResponse::new(
        StatusCode::OK.as_u16(),
        "success",
        format!("Image uploaded for pet ID {id} (stub)"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_required() {
        assert_eq!(
            split_required(Some("available,sold".to_string()), "status").ok(),
            Some(vec!["available".to_string(), "sold".to_string()])
        );
        assert!(split_required(None, "status").is_err());
        assert!(split_required(Some(String::new()), "status").is_err());
    }

    #[test]
    fn test_trailing_comma_yields_empty_token() {
        let tags = split_required(Some("tag1,".to_string()), "tags").ok();
        assert_eq!(tags, Some(vec!["tag1".to_string(), String::new()]));
    }
}

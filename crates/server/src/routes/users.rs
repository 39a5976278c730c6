//! User route handlers. None of them require a token.

use axum::{Json, extract::State, http::StatusCode};
use petstore_core::User;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// `?username=&password=`
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Register a user.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(user): ApiJson<User>,
) -> Result<(StatusCode, Json<User>)> {
    let created = state.users().create_user(&user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Register several users (`createWithList` and `createWithArray`).
pub async fn create_batch(
    State(state): State<AppState>,
    ApiJson(users): ApiJson<Vec<User>>,
) -> Result<(StatusCode, Json<Vec<User>>)> {
    let created = state.users().create_users(&users).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn show(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users().find_user_by_username(&username).await?))
}

/// Overwrite a user's profile. The username in the path wins.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
    ApiJson(user): ApiJson<User>,
) -> Result<Json<User>> {
    Ok(Json(state.users().update_user(&username, &user).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> Result<StatusCode> {
    state.users().delete_user(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Exchange a username and password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LoginQuery>,
) -> Result<Json<TokenResponse>> {
    if query.username.is_empty() || query.password.is_empty() {
        return Err(AppError::BadRequest(
            "missing username or password".to_string(),
        ));
    }

    let token = state.users().login(&query.username, &query.password).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.users().logout();
    StatusCode::OK
}

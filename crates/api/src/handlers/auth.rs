//! Login and self-registration. Both return a fresh token.

use ::auth::password;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use db::{models::NewUser, repository::users as user_repo, DbError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::ApiError;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginDto {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterDto {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub async fn token(
    State(state): State<AppState>,
    payload: Result<Json<LoginDto>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload?;
    let creds = match user_repo::get_credentials(&state.pool, &payload.username).await {
        Ok(c) => c,
        Err(DbError::NotFound(_)) => return Err(ApiError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    let stored = creds.password;
    let valid = tokio::task::spawn_blocking(move || password::verify(&payload.password, &stored))
        .await
        .map_err(|e| ApiError::Internal(format!("verify task failed: {e}")))??;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.keys.issue(&creds.username, creds.is_admin)?;
    Ok(Json(json!({ "token": token })))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    let user = NewUser {
        password_hash: state.hash_password(payload.password).await?,
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        is_admin: false,
    };

    let row = user_repo::create_user(&state.pool, &user).await?;
    info!(username = %row.username, "user registered");

    let token = state.keys.issue(&row.username, row.is_admin)?;
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

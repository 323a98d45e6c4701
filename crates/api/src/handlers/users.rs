use ::auth::Gate;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use db::{
    models::{NewUser, UserChanges},
    repository::users as user_repo,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::{identity::Identity, ApiError};

/// Admin-only user creation; unlike self-registration it may grant admin.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserDto {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

pub async fn create(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<CreateUserDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    identity.require(&[Gate::AdminOnly], None)?;
    let Json(payload) = payload?;

    let user = NewUser {
        password_hash: state.hash_password(payload.password).await?,
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        is_admin: payload.is_admin,
    };

    let row = user_repo::create_user(&state.pool, &user).await?;
    info!(username = %row.username, is_admin = row.is_admin, "user created");

    let token = state.keys.issue(&row.username, row.is_admin)?;
    Ok((StatusCode::CREATED, Json(json!({ "user": row, "token": token }))))
}

pub async fn list(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::AdminOnly], None)?;

    let users = user_repo::list_users(&state.pool).await?;
    Ok(Json(json!({ "users": users })))
}

/// A user together with the ids of the jobs they applied to.
pub async fn get(
    identity: Identity,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::SelfOrAdmin], Some(&username))?;

    let user = user_repo::get_user(&state.pool, &username).await?;
    let applications = user_repo::applied_job_ids(&state.pool, &username).await?;

    let mut body = serde_json::to_value(user).map_err(|e| ApiError::Internal(e.to_string()))?;
    body["applications"] = json!(applications);
    Ok(Json(json!({ "user": body })))
}

pub async fn update(
    identity: Identity,
    Path(username): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<UserChanges>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::SelfOrAdmin], Some(&username))?;
    let Json(mut changes) = payload?;

    if let Some(plain) = changes.password.take() {
        changes.password = Some(state.hash_password(plain).await?);
    }

    let data = changes.into_partial();
    if data.is_empty() {
        return Err(ApiError::BadRequest("no data".into()));
    }

    let user = user_repo::update_user(&state.pool, &username, data).await?;
    info!(%username, "user updated");
    Ok(Json(json!({ "user": user })))
}

pub async fn delete(
    identity: Identity,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::SelfOrAdmin], Some(&username))?;

    user_repo::delete_user(&state.pool, &username).await?;
    info!(%username, "user deleted");
    Ok(Json(json!({ "deleted": username })))
}

/// `id` is parsed only after the gate, so a denied caller can't probe it.
pub async fn apply(
    identity: Identity,
    Path((username, id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::SelfOrAdmin], Some(&username))?;
    let job_id: i32 = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid job id: {id}")))?;

    user_repo::apply_to_job(&state.pool, &username, job_id).await?;
    info!(%username, job_id, "applied to job");
    Ok(Json(json!({ "applied": job_id })))
}

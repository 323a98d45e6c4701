use ::auth::Gate;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use db::{
    models::{JobChanges, JobFilter, NewJob},
    repository::{companies as company_repo, jobs as job_repo},
};
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::{identity::Identity, ApiError};

pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<JobFilter>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(filter) = filter?;

    let jobs = job_repo::find_jobs(&state.pool, filter.predicates()).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

/// A job together with the company that posted it.
pub async fn get(
    id: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;

    let job = job_repo::get_job(&state.pool, id).await?;
    let company = company_repo::get_company(&state.pool, &job.company_handle).await?;

    let mut body = serde_json::to_value(job).map_err(|e| ApiError::Internal(e.to_string()))?;
    body["company"] = json!(company);
    Ok(Json(json!({ "job": body })))
}

pub async fn create(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<NewJob>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    identity.require(&[Gate::AdminOnly], None)?;
    let Json(payload) = payload?;

    let job = job_repo::create_job(&state.pool, &payload).await?;
    info!(id = job.id, company = %job.company_handle, "job created");
    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

pub async fn update(
    identity: Identity,
    id: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<JobChanges>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::AdminOnly], None)?;
    let Path(id) = id?;
    let Json(changes) = payload?;

    let data = changes.into_partial();
    if data.is_empty() {
        return Err(ApiError::BadRequest("no data".into()));
    }

    let job = job_repo::update_job(&state.pool, id, data).await?;
    info!(id, "job updated");
    Ok(Json(json!({ "job": job })))
}

pub async fn delete(
    identity: Identity,
    id: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::AdminOnly], None)?;
    let Path(id) = id?;

    job_repo::delete_job(&state.pool, id).await?;
    info!(id, "job deleted");
    Ok(Json(json!({ "deleted": id })))
}

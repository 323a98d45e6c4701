use ::auth::Gate;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use db::{
    models::{CompanyChanges, CompanyFilter, NewCompany},
    repository::{companies as company_repo, jobs as job_repo},
};
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::{identity::Identity, ApiError};

pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<CompanyFilter>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(filter) = filter?;

    if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
        if min > max {
            return Err(ApiError::BadRequest(
                "minEmployees cannot be greater than maxEmployees".into(),
            ));
        }
    }

    let companies = company_repo::find_companies(&state.pool, filter.predicates()).await?;
    Ok(Json(json!({ "companies": companies })))
}

/// A company together with the jobs it has posted.
pub async fn get(
    Path(handle): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let company = company_repo::get_company(&state.pool, &handle).await?;
    let jobs = job_repo::jobs_for_company(&state.pool, &handle).await?;

    let mut body = serde_json::to_value(company).map_err(|e| ApiError::Internal(e.to_string()))?;
    body["jobs"] = json!(jobs);
    Ok(Json(json!({ "company": body })))
}

pub async fn create(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<NewCompany>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    identity.require(&[Gate::AdminOnly], None)?;
    let Json(payload) = payload?;

    let company = company_repo::create_company(&state.pool, &payload).await?;
    info!(handle = %company.handle, "company created");
    Ok((StatusCode::CREATED, Json(json!({ "company": company }))))
}

pub async fn update(
    identity: Identity,
    Path(handle): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<CompanyChanges>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::AdminOnly], None)?;
    let Json(changes) = payload?;

    let data = changes.into_partial();
    if data.is_empty() {
        return Err(ApiError::BadRequest("no data".into()));
    }

    let company = company_repo::update_company(&state.pool, &handle, data).await?;
    info!(%handle, "company updated");
    Ok(Json(json!({ "company": company })))
}

pub async fn delete(
    identity: Identity,
    Path(handle): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    identity.require(&[Gate::AdminOnly], None)?;

    company_repo::delete_company(&state.pool, &handle).await?;
    info!(%handle, "company deleted");
    Ok(Json(json!({ "deleted": handle })))
}

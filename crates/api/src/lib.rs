//! `api` crate — HTTP REST API layer.
//!
//! Exposes:
//!   POST   /auth/token
//!   POST   /auth/register
//!   GET    /companies            POST /companies            (admin)
//!   GET    /companies/{handle}   PATCH|DELETE               (admin)
//!   GET    /jobs                 POST /jobs                 (admin)
//!   GET    /jobs/{id}            PATCH|DELETE               (admin)
//!   GET    /users (admin)        POST /users                (admin)
//!   GET|PATCH|DELETE /users/{username}                      (self or admin)
//!   POST   /users/{username}/jobs/{id}                      (self or admin)
//!
//! Every request first passes through [`identity::authenticate`], which
//! attaches the caller's claims (or nothing). Handlers check their gates
//! before parsing the body or touching the store.

pub mod error;
pub mod handlers;
pub mod identity;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;
pub use handlers::AppState;

use handlers::{auth as auth_handlers, companies, jobs, users};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/token", post(auth_handlers::token))
        .route("/auth/register", post(auth_handlers::register))
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/:handle",
            get(companies::get).patch(companies::update).delete(companies::delete),
        )
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route("/jobs/:id", get(jobs::get).patch(jobs::update).delete(jobs::delete))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/users/:username/jobs/:id", post(users::apply))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), identity::authenticate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

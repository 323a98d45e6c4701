//! Request identity: the middleware that decodes the bearer credential and
//! the extractor handlers use to read the result.

use std::convert::Infallible;

use auth::{check_gates, Gate, IdentityClaims};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{handlers::AppState, ApiError};

/// Claims of the caller, or `None` for an anonymous request.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<IdentityClaims>);

impl Identity {
    pub fn claims(&self) -> Option<&IdentityClaims> {
        self.0.as_ref()
    }

    /// Run `gates` against this identity and the route's target resource.
    pub fn require(&self, gates: &[Gate], resource_id: Option<&str>) -> Result<(), ApiError> {
        check_gates(gates, self.claims(), resource_id)?;
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned().unwrap_or_default())
    }
}

/// Attach an [`Identity`] to every request. Never rejects.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let credential = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let claims = state.keys.extract_identity(credential);

    req.extensions_mut().insert(Identity(claims));
    next.run(req).await
}

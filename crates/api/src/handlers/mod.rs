//! Route handlers, one module per resource.
//!
//! Each gated handler takes its body and path as `Result<_, Rejection>` and
//! unwraps them only after [`Identity::require`](crate::identity::Identity::require)
//! passed, so a denied caller learns nothing about what the route would have
//! accepted or found.

pub mod auth;
pub mod companies;
pub mod jobs;
pub mod users;

use std::sync::Arc;

use ::auth::{password, TokenKeys};
use db::DbPool;

use crate::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub keys: Arc<TokenKeys>,
    /// bcrypt work factor for newly hashed passwords.
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(pool: DbPool, secret_key: &[u8], bcrypt_cost: u32) -> Self {
        Self {
            pool,
            keys: Arc::new(TokenKeys::from_secret(secret_key)),
            bcrypt_cost,
        }
    }

    /// Hash off the async runtime; bcrypt is deliberately slow.
    pub(crate) async fn hash_password(&self, plain: String) -> Result<String, ApiError> {
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || password::hash(&plain, cost))
            .await
            .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))??;
        Ok(hashed)
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".into())
}

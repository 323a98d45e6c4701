//! Auth-level error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// A gate denied the request. Deliberately carries no detail: a missing
    /// identity and the wrong identity look the same to the caller.
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Password(#[from] bcrypt::BcryptError),
}

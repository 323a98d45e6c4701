//! `auth` crate — request identity and access gates.
//!
//! - [`TokenKeys`] issues and verifies signed identity tokens and turns an
//!   optional bearer credential into optional [`IdentityClaims`].
//! - [`Gate`] is a pure allow/deny predicate over those claims and the
//!   route's target resource id.
//! - [`password`] hashes and checks stored passwords.
//!
//! Nothing here touches HTTP or the database.

pub mod error;
pub mod gate;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use gate::{check_gates, Gate};
pub use token::{IdentityClaims, TokenKeys};

//! Authorization gates.
//!
//! A gate is a pure predicate over the request's claims (if any) and the
//! route's target resource id (if any). Gates never imply one another, and
//! every denial is the same [`AuthError::Unauthorized`], whether the caller
//! is anonymous or simply the wrong user.

use tracing::debug;

use crate::{AuthError, IdentityClaims};

/// Declaration order is evaluation order when gates are composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gate {
    /// Any verified identity with a non-empty subject.
    IdentityRequired,
    /// A verified identity with the admin flag set.
    AdminOnly,
    /// An admin, or the user the route is about.
    SelfOrAdmin,
}

impl Gate {
    const ORDER: [Gate; 3] = [Gate::IdentityRequired, Gate::AdminOnly, Gate::SelfOrAdmin];

    pub fn check(
        self,
        claims: Option<&IdentityClaims>,
        resource_id: Option<&str>,
    ) -> Result<(), AuthError> {
        let allowed = match (self, claims) {
            (_, None) => false,
            (Gate::IdentityRequired, Some(c)) => !c.subject.is_empty(),
            (Gate::AdminOnly, Some(c)) => c.is_admin,
            (Gate::SelfOrAdmin, Some(c)) => c.is_admin || resource_id == Some(c.subject.as_str()),
        };

        if allowed {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        }
    }
}

/// Run `gates` in their fixed order, stopping at the first denial.
///
/// The order the caller lists them in doesn't matter.
pub fn check_gates(
    gates: &[Gate],
    claims: Option<&IdentityClaims>,
    resource_id: Option<&str>,
) -> Result<(), AuthError> {
    Gate::ORDER
        .into_iter()
        .filter(|gate| gates.contains(gate))
        .try_for_each(|gate| {
            gate.check(claims, resource_id).map_err(|err| {
                debug!(?gate, subject = claims.map(|c| c.subject.as_str()), "gate denied");
                err
            })
        })
}

//! Authorization: the responsibility rule as a pure predicate.

use thiserror::Error;

use tenderhub_core::{DomainError, OrganizationId, UserId};

use crate::Responsibility;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("user {user_id} is not responsible for organization {organization_id}")]
    Forbidden {
        organization_id: OrganizationId,
        user_id: UserId,
    },
}

impl From<AuthzError> for DomainError {
    fn from(_: AuthzError) -> Self {
        DomainError::Forbidden
    }
}

/// Decide whether `user_id` may act on behalf of `organization_id`.
///
/// `edge` is whatever the responsibility lookup returned for the pair. Absence
/// (missing organization, missing user, or no link) is reported uniformly as
/// forbidden, and an edge for any other pair never grants access.
///
/// - No IO
/// - No panics
pub fn authorize(
    edge: Option<&Responsibility>,
    organization_id: OrganizationId,
    user_id: UserId,
) -> Result<(), AuthzError> {
    match edge {
        Some(r) if r.links(organization_id, user_id) => Ok(()),
        _ => Err(AuthzError::Forbidden {
            organization_id,
            user_id,
        }),
    }
}

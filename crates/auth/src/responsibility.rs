//! The user-to-organization responsibility edge.

use tenderhub_core::{Entity, OrganizationId, ResponsibilityId, UserId};

/// Designates a user as responsible for an organization.
///
/// At most one edge exists per `(organization_id, user_id)` pair. The set of
/// edges is the only source of truth for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Responsibility {
    pub id: ResponsibilityId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
}

impl Responsibility {
    pub fn grant(organization_id: OrganizationId, user_id: UserId) -> Self {
        Self {
            id: ResponsibilityId::new(),
            organization_id,
            user_id,
        }
    }

    pub fn links(&self, organization_id: OrganizationId, user_id: UserId) -> bool {
        self.organization_id == organization_id && self.user_id == user_id
    }
}

impl Entity for Responsibility {
    type Id = ResponsibilityId;

    fn id(&self) -> ResponsibilityId {
        self.id
    }
}

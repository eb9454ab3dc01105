use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use tenderhub_auth::{NewOrganization, Organization};
use tenderhub_core::{DomainError, DomainResult, EntityKind, OrganizationId};

use crate::store::OrganizationStore;

#[derive(Clone)]
pub struct OrganizationRegistry {
    organizations: Arc<dyn OrganizationStore>,
}

impl OrganizationRegistry {
    pub fn new(organizations: Arc<dyn OrganizationStore>) -> Self {
        Self { organizations }
    }

    #[instrument(skip(self, input), fields(name = %input.name, organization_type = %input.organization_type))]
    pub async fn create_organization(&self, input: NewOrganization) -> DomainResult<Organization> {
        let organization = Organization::register(input, Utc::now())?;
        self.organizations
            .insert_organization(&organization)
            .await
            .map_err(|e| e.into_domain(EntityKind::Organization))?;

        tracing::info!(organization_id = %organization.id, "organization created");
        Ok(organization)
    }

    pub async fn get_organization_by_id(&self, id: OrganizationId) -> DomainResult<Organization> {
        self.organizations
            .organization_by_id(id)
            .await
            .map_err(|e| e.into_domain(EntityKind::Organization))?
            .ok_or(DomainError::NotFound(EntityKind::Organization))
    }
}

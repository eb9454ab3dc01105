//! Organizations that own tenders.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use tenderhub_core::{DomainError, DomainResult, Entity, OrganizationId};

/// Legal form of an organization.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationType {
    #[serde(rename = "IE")]
    IndividualEntrepreneur,
    #[serde(rename = "LLC")]
    LimitedLiabilityCompany,
    #[serde(rename = "JSC")]
    JointStockCompany,
}

impl OrganizationType {
    pub fn code(&self) -> &'static str {
        match self {
            OrganizationType::IndividualEntrepreneur => "IE",
            OrganizationType::LimitedLiabilityCompany => "LLC",
            OrganizationType::JointStockCompany => "JSC",
        }
    }
}

impl core::fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OrganizationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IE" => Ok(OrganizationType::IndividualEntrepreneur),
            "LLC" => Ok(OrganizationType::LimitedLiabilityCompany),
            "JSC" => Ok(OrganizationType::JointStockCompany),
            other => Err(DomainError::validation(format!(
                "organization type must be one of IE, LLC, JSC (got '{other}')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub organization_type: OrganizationType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub description: String,
    pub organization_type: OrganizationType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Names are not unique; only emptiness is rejected.
    pub fn register(input: NewOrganization, now: DateTime<Utc>) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("organization name must not be empty"));
        }

        Ok(Self {
            id: OrganizationId::new(),
            name: input.name,
            description: input.description,
            organization_type: input.organization_type,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Organization {
    type Id = OrganizationId;

    fn id(&self) -> OrganizationId {
        self.id
    }
}

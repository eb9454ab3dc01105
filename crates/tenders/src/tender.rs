//! Tenders: a procurement request filed by an organization, and the changes
//! it accepts over its lifetime.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use tenderhub_core::{
    DomainError, DomainResult, Entity, LifecycleStatus, OrganizationId, TenderId, TransitionPolicy,
    Versioned,
};

/// Kind of work a tender procures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Construction,
    Delivery,
    Manufacture,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::Construction,
        ServiceType::Delivery,
        ServiceType::Manufacture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Construction => "Construction",
            ServiceType::Delivery => "Delivery",
            ServiceType::Manufacture => "Manufacture",
        }
    }
}

impl core::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown service type '{s}'")))
    }
}

/// Input for publishing a new tender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTender {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub organization_id: OrganizationId,
    pub creator_username: String,
}

/// A procurement request owned by one organization.
///
/// # Invariants
/// - `organization_id` never changes after creation.
/// - `version` starts at 1 and grows by exactly one per accepted change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tender {
    pub id: TenderId,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: LifecycleStatus,
    pub organization_id: OrganizationId,
    pub version: u64,
    pub creator_username: String,
    pub created_at: DateTime<Utc>,
}

/// Partial edit. Absent and empty fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenderPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
}

/// A single accepted mutation of a tender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenderChange {
    SetStatus(LifecycleStatus),
    Edit(TenderPatch),
}

impl Tender {
    pub fn create(input: NewTender, now: DateTime<Utc>) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("tender name must not be empty"));
        }
        if input.description.trim().is_empty() {
            return Err(DomainError::validation("tender description must not be empty"));
        }
        if input.creator_username.trim().is_empty() {
            return Err(DomainError::validation("creator username must not be empty"));
        }

        Ok(Self {
            id: TenderId::new(),
            name: input.name,
            description: input.description,
            service_type: input.service_type,
            status: LifecycleStatus::Created,
            organization_id: input.organization_id,
            version: 1,
            creator_username: input.creator_username,
            created_at: now,
        })
    }

    /// Apply a change in place and bump the version once.
    ///
    /// An edit with no usable field still counts as a change. On error the tender
    /// is left untouched.
    pub fn apply(&mut self, change: &TenderChange, transitions: &TransitionPolicy) -> DomainResult<()> {
        match change {
            TenderChange::SetStatus(to) => {
                transitions.check(self.status, *to)?;
                self.status = *to;
            }
            TenderChange::Edit(patch) => {
                if let Some(name) = non_empty(&patch.name) {
                    self.name = name.to_string();
                }
                if let Some(description) = non_empty(&patch.description) {
                    self.description = description.to_string();
                }
                if let Some(service_type) = patch.service_type {
                    self.service_type = service_type;
                }
            }
        }
        self.version += 1;
        Ok(())
    }
}

impl Entity for Tender {
    type Id = TenderId;

    fn id(&self) -> TenderId {
        self.id
    }
}

impl Versioned for Tender {
    fn version(&self) -> u64 {
        self.version
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

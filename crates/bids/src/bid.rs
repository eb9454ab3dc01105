//! Bids placed against a tender by a user or an organization.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenderhub_core::{
    BidId, DomainError, DomainResult, Entity, LifecycleStatus, OrganizationId, TenderId,
    TransitionPolicy, UserId, Versioned,
};

/// Whether a bid was placed by a user or by an organization.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorType {
    User,
    Organization,
}

impl AuthorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorType::User => "User",
            AuthorType::Organization => "Organization",
        }
    }
}

impl core::fmt::Display for AuthorType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(AuthorType::User),
            "Organization" => Ok(AuthorType::Organization),
            other => Err(DomainError::validation(format!("unknown author type '{other}'"))),
        }
    }
}

/// The author of a bid, typed by kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BidAuthor {
    User(UserId),
    Organization(OrganizationId),
}

impl BidAuthor {
    pub fn from_parts(kind: AuthorType, id: Uuid) -> Self {
        match kind {
            AuthorType::User => BidAuthor::User(UserId::from_uuid(id)),
            AuthorType::Organization => BidAuthor::Organization(OrganizationId::from_uuid(id)),
        }
    }

    pub fn kind(&self) -> AuthorType {
        match self {
            BidAuthor::User(_) => AuthorType::User,
            BidAuthor::Organization(_) => AuthorType::Organization,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            BidAuthor::User(id) => *id.as_uuid(),
            BidAuthor::Organization(id) => *id.as_uuid(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBid {
    pub name: String,
    pub description: String,
    pub tender_id: TenderId,
    pub author: BidAuthor,
}

/// An offer placed against a tender.
///
/// `tender_id` is fixed for the life of the bid; `version` follows the same
/// discipline as tenders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bid {
    pub id: BidId,
    pub name: String,
    pub description: String,
    pub status: LifecycleStatus,
    pub tender_id: TenderId,
    pub author: BidAuthor,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BidPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidChange {
    SetStatus(LifecycleStatus),
    Edit(BidPatch),
}

impl Bid {
    pub fn create(input: NewBid, now: DateTime<Utc>) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("bid name must not be empty"));
        }
        if input.description.trim().is_empty() {
            return Err(DomainError::validation("bid description must not be empty"));
        }

        Ok(Self {
            id: BidId::new(),
            name: input.name,
            description: input.description,
            status: LifecycleStatus::Created,
            tender_id: input.tender_id,
            author: input.author,
            version: 1,
            created_at: now,
        })
    }

    /// True when the bid was authored by exactly this identity, whatever its kind.
    pub fn is_authored_by(&self, author_id: Uuid) -> bool {
        self.author.uuid() == author_id
    }

    /// Apply a change in place and bump the version once.
    pub fn apply(&mut self, change: &BidChange, transitions: &TransitionPolicy) -> DomainResult<()> {
        match change {
            BidChange::SetStatus(to) => {
                transitions.check(self.status, *to)?;
                self.status = *to;
            }
            BidChange::Edit(patch) => {
                if let Some(name) = patch.name.as_deref().filter(|v| !v.is_empty()) {
                    self.name = name.to_string();
                }
                if let Some(description) = patch.description.as_deref().filter(|v| !v.is_empty()) {
                    self.description = description.to_string();
                }
            }
        }
        self.version += 1;
        Ok(())
    }
}

impl Entity for Bid {
    type Id = BidId;

    fn id(&self) -> BidId {
        self.id
    }
}

impl Versioned for Bid {
    fn version(&self) -> u64 {
        self.version
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use tenderhub_auth::{Organization, Responsibility, User};
use tenderhub_bids::{Bid, BidChange};
use tenderhub_core::{
    BidId, DomainError, EntityKind, ExpectedVersion, OrganizationId, Page, ResponsibilityId,
    TenderId, TransitionPolicy, UserId,
};
use tenderhub_tenders::{ServiceType, Tender, TenderChange};

/// Storage operation error.
///
/// These are **infrastructure errors** as opposed to domain errors. Engines turn
/// them into [`DomainError`] with [`StoreError::into_domain`], naming the entity
/// the operation was about.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// A foreign key pointed at a record that does not exist.
    #[error("referenced {0} does not exist")]
    MissingReference(EntityKind),

    #[error("optimistic concurrency check failed (expected: {expected:?}, actual: {actual})")]
    Conflict {
        expected: ExpectedVersion,
        actual: u64,
    },

    /// The domain refused the change (e.g. a disallowed status transition).
    #[error("change rejected: {0}")]
    Rejected(DomainError),

    #[error("storage backend failure in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    pub fn into_domain(self, kind: EntityKind) -> DomainError {
        match self {
            StoreError::NotFound => DomainError::NotFound(kind),
            StoreError::AlreadyExists(_) => DomainError::AlreadyExists(kind),
            StoreError::MissingReference(referenced) => DomainError::NotFound(referenced),
            err @ StoreError::Conflict { .. } => DomainError::conflict(err.to_string()),
            StoreError::Rejected(err) => err,
            StoreError::Backend { operation, message } => DomainError::Storage { operation, message },
        }
    }
}

/// Tender listing criteria. Results are always ordered by name, then id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenderFilter {
    pub service_type: Option<ServiceType>,
    pub creator_username: Option<String>,
}

/// Bid listing criteria. Results are always ordered by name, then id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BidFilter {
    pub author_id: Option<Uuid>,
    pub tender_id: Option<TenderId>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AlreadyExists` on a username collision.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn insert_organization(&self, organization: &Organization) -> Result<(), StoreError>;
    async fn organization_by_id(&self, id: OrganizationId) -> Result<Option<Organization>, StoreError>;
}

#[async_trait]
pub trait ResponsibilityStore: Send + Sync {
    /// Fails with `AlreadyExists` for a duplicate pair and `MissingReference`
    /// when the organization or user does not exist.
    async fn insert_responsibility(&self, responsibility: &Responsibility) -> Result<(), StoreError>;
    async fn responsibility_by_id(&self, id: ResponsibilityId) -> Result<Option<Responsibility>, StoreError>;
    async fn responsibility_for(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<Responsibility>, StoreError>;
}

#[async_trait]
pub trait TenderStore: Send + Sync {
    async fn insert_tender(&self, tender: &Tender) -> Result<(), StoreError>;
    async fn tender_by_id(&self, id: TenderId) -> Result<Option<Tender>, StoreError>;
    async fn list_tenders(&self, filter: &TenderFilter, page: Page) -> Result<Vec<Tender>, StoreError>;

    /// Read, apply `change` and write back as one atomic step.
    ///
    /// Returns the refreshed tender. The version check against `expected` and the
    /// transition check against `transitions` both happen inside that step.
    async fn update_tender(
        &self,
        id: TenderId,
        change: &TenderChange,
        transitions: &TransitionPolicy,
        expected: ExpectedVersion,
    ) -> Result<Tender, StoreError>;
}

#[async_trait]
pub trait BidStore: Send + Sync {
    /// Fails with `MissingReference(Tender)` when the tender does not exist.
    async fn insert_bid(&self, bid: &Bid) -> Result<(), StoreError>;
    async fn bid_by_id(&self, id: BidId) -> Result<Option<Bid>, StoreError>;
    async fn list_bids(&self, filter: &BidFilter, page: Page) -> Result<Vec<Bid>, StoreError>;

    /// Same contract as [`TenderStore::update_tender`].
    async fn update_bid(
        &self,
        id: BidId,
        change: &BidChange,
        transitions: &TransitionPolicy,
        expected: ExpectedVersion,
    ) -> Result<Bid, StoreError>;
}

/// One handle per entity, all usually backed by the same adapter.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub responsibilities: Arc<dyn ResponsibilityStore>,
    pub tenders: Arc<dyn TenderStore>,
    pub bids: Arc<dyn BidStore>,
}

impl Stores {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: UserStore + OrganizationStore + ResponsibilityStore + TenderStore + BidStore + 'static,
    {
        Self {
            users: backend.clone(),
            organizations: backend.clone(),
            responsibilities: backend.clone(),
            tenders: backend.clone(),
            bids: backend,
        }
    }
}

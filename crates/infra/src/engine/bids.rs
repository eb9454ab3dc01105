use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use tenderhub_bids::{Bid, BidChange, BidPatch, NewBid};
use tenderhub_core::{
    BidId, ConcurrencyMode, DomainError, DomainResult, EntityKind, ExpectedVersion, LifecyclePolicy,
    LifecycleStatus, Page, TenderId, UserId,
};

use crate::engine::{AuthorizationGate, TenderEngine};
use crate::store::{BidFilter, BidStore};

/// Owns bid state. Authorization goes through the tender a bid targets: the
/// requester must be responsible for that tender's organization.
#[derive(Clone)]
pub struct BidEngine {
    bids: Arc<dyn BidStore>,
    tenders: TenderEngine,
    gate: AuthorizationGate,
    policy: Arc<LifecyclePolicy>,
}

impl BidEngine {
    pub fn new(
        bids: Arc<dyn BidStore>,
        tenders: TenderEngine,
        gate: AuthorizationGate,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            bids,
            tenders,
            gate,
            policy: Arc::new(policy),
        }
    }

    /// Store a new bid in `Created` at version 1.
    ///
    /// The target tender is resolved first; a missing tender fails with
    /// `NotFound(Tender)` and nothing is written.
    #[instrument(skip(self, input), fields(tender_id = %input.tender_id, author = %input.author.uuid()))]
    pub async fn create(&self, input: NewBid) -> DomainResult<Bid> {
        self.tenders.get_by_id(input.tender_id).await?;

        let bid = Bid::create(input, Utc::now())?;
        self.bids
            .insert_bid(&bid)
            .await
            .map_err(|e| e.into_domain(EntityKind::Bid))?;

        tracing::info!(bid_id = %bid.id, "bid created");
        Ok(bid)
    }

    pub async fn get_by_id(&self, id: BidId) -> DomainResult<Bid> {
        self.bids
            .bid_by_id(id)
            .await
            .map_err(|e| e.into_domain(EntityKind::Bid))?
            .ok_or(DomainError::NotFound(EntityKind::Bid))
    }

    /// The requester's own bids on one tender.
    #[instrument(skip(self), fields(tender_id = %tender_id, requester = %requester))]
    pub async fn get_by_tender_id(
        &self,
        tender_id: TenderId,
        requester: UserId,
        page: Page,
    ) -> DomainResult<Vec<Bid>> {
        let filter = BidFilter {
            author_id: Some(*requester.as_uuid()),
            tender_id: Some(tender_id),
        };
        self.list(&filter, page).await
    }

    #[instrument(skip(self), fields(requester = %requester))]
    pub async fn list_mine(&self, requester: UserId, page: Page) -> DomainResult<Vec<Bid>> {
        let filter = BidFilter {
            author_id: Some(*requester.as_uuid()),
            ..BidFilter::default()
        };
        self.list(&filter, page).await
    }

    /// Always guarded, whatever the bid's status.
    #[instrument(skip(self), fields(bid_id = %id, requester = %requester))]
    pub async fn get_status(&self, id: BidId, requester: UserId) -> DomainResult<LifecycleStatus> {
        let bid = self.get_by_id(id).await?;
        self.authorize_for(&bid, requester).await?;
        Ok(bid.status)
    }

    #[instrument(skip(self), fields(bid_id = %id, requester = %requester))]
    pub async fn set_status(&self, id: BidId, status: LifecycleStatus, requester: UserId) -> DomainResult<Bid> {
        let bid = self.get_by_id(id).await?;
        self.authorize_for(&bid, requester).await?;

        let expected = self.expected_version(&bid);
        self.mutate(id, BidChange::SetStatus(status), expected).await
    }

    /// Apply a partial edit. No authorization here; see [`BidEngine::edit_as`].
    #[instrument(skip(self, patch), fields(bid_id = %id))]
    pub async fn edit(&self, id: BidId, patch: BidPatch) -> DomainResult<Bid> {
        let expected = match self.policy.concurrency {
            ConcurrencyMode::LastWriteWins => ExpectedVersion::Any,
            ConcurrencyMode::CompareAndSwap => {
                let current = self.get_by_id(id).await?;
                self.expected_version(&current)
            }
        };
        self.mutate(id, BidChange::Edit(patch), expected).await
    }

    #[instrument(skip(self, patch), fields(bid_id = %id, requester = %requester))]
    pub async fn edit_as(&self, id: BidId, patch: BidPatch, requester: UserId) -> DomainResult<Bid> {
        let bid = self.get_by_id(id).await?;
        self.authorize_for(&bid, requester).await?;

        let expected = self.expected_version(&bid);
        self.mutate(id, BidChange::Edit(patch), expected).await
    }

    async fn authorize_for(&self, bid: &Bid, requester: UserId) -> DomainResult<()> {
        let tender = self.tenders.get_by_id(bid.tender_id).await?;
        self.gate
            .assert_responsible(tender.organization_id, requester)
            .await
    }

    fn expected_version(&self, read: &Bid) -> ExpectedVersion {
        match self.policy.concurrency {
            ConcurrencyMode::LastWriteWins => ExpectedVersion::Any,
            ConcurrencyMode::CompareAndSwap => ExpectedVersion::Exact(read.version),
        }
    }

    async fn list(&self, filter: &BidFilter, page: Page) -> DomainResult<Vec<Bid>> {
        self.bids
            .list_bids(filter, page)
            .await
            .map_err(|e| e.into_domain(EntityKind::Bid))
    }

    async fn mutate(&self, id: BidId, change: BidChange, expected: ExpectedVersion) -> DomainResult<Bid> {
        let bid = self
            .bids
            .update_bid(id, &change, &self.policy.transitions, expected)
            .await
            .map_err(|e| e.into_domain(EntityKind::Bid))?;

        tracing::info!(bid_id = %bid.id, version = bid.version, status = %bid.status, "bid updated");
        Ok(bid)
    }
}

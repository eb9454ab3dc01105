use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use tenderhub_core::{
    ConcurrencyMode, DomainError, DomainResult, EntityKind, ExpectedVersion, LifecyclePolicy,
    LifecycleStatus, Page, TenderId, UserId,
};
use tenderhub_tenders::{NewTender, ServiceType, Tender, TenderChange, TenderPatch};

use crate::engine::AuthorizationGate;
use crate::store::{TenderFilter, TenderStore};

/// Owns tender state: creation, listing, status transitions and edits.
#[derive(Clone)]
pub struct TenderEngine {
    tenders: Arc<dyn TenderStore>,
    gate: AuthorizationGate,
    policy: Arc<LifecyclePolicy>,
}

impl TenderEngine {
    pub fn new(tenders: Arc<dyn TenderStore>, gate: AuthorizationGate, policy: LifecyclePolicy) -> Self {
        Self {
            tenders,
            gate,
            policy: Arc::new(policy),
        }
    }

    /// Store a new tender in `Created` at version 1.
    ///
    /// Does not consult the gate; callers that act for a user check
    /// responsibility for `input.organization_id` first.
    #[instrument(
        skip(self, input),
        fields(organization_id = %input.organization_id, creator = %input.creator_username)
    )]
    pub async fn create(&self, input: NewTender) -> DomainResult<Tender> {
        let tender = Tender::create(input, Utc::now())?;
        self.tenders
            .insert_tender(&tender)
            .await
            .map_err(|e| e.into_domain(EntityKind::Tender))?;

        tracing::info!(tender_id = %tender.id, "tender created");
        Ok(tender)
    }

    pub async fn get_by_id(&self, id: TenderId) -> DomainResult<Tender> {
        self.tenders
            .tender_by_id(id)
            .await
            .map_err(|e| e.into_domain(EntityKind::Tender))?
            .ok_or(DomainError::NotFound(EntityKind::Tender))
    }

    /// List tenders of the requested service types.
    ///
    /// With no types, all tenders are paged once. Otherwise each distinct type is
    /// paged on its own and the pages are concatenated in request order, so the
    /// result can hold up to `types × limit` tenders.
    #[instrument(skip(self))]
    pub async fn list_by_type(&self, service_types: &[ServiceType], page: Page) -> DomainResult<Vec<Tender>> {
        if service_types.is_empty() {
            return self.list(&TenderFilter::default(), page).await;
        }

        let mut seen = Vec::with_capacity(service_types.len());
        let mut tenders = Vec::new();
        for service_type in service_types {
            if seen.contains(service_type) {
                continue;
            }
            seen.push(*service_type);

            let filter = TenderFilter {
                service_type: Some(*service_type),
                ..TenderFilter::default()
            };
            tenders.extend(self.list(&filter, page).await?);
        }
        Ok(tenders)
    }

    #[instrument(skip(self))]
    pub async fn list_mine(&self, username: &str, page: Page) -> DomainResult<Vec<Tender>> {
        let filter = TenderFilter {
            creator_username: Some(username.to_string()),
            ..TenderFilter::default()
        };
        self.list(&filter, page).await
    }

    /// Published tenders are readable by anyone; otherwise the requester must be
    /// responsible for the owning organization.
    #[instrument(skip(self), fields(tender_id = %id, requester = %requester))]
    pub async fn get_status(&self, id: TenderId, requester: UserId) -> DomainResult<LifecycleStatus> {
        let tender = self.get_by_id(id).await?;
        if !tender.status.is_public() {
            self.gate
                .assert_responsible(tender.organization_id, requester)
                .await?;
        }
        Ok(tender.status)
    }

    #[instrument(skip(self), fields(tender_id = %id, requester = %requester))]
    pub async fn set_status(
        &self,
        id: TenderId,
        status: LifecycleStatus,
        requester: UserId,
    ) -> DomainResult<Tender> {
        let tender = self.get_by_id(id).await?;
        self.gate
            .assert_responsible(tender.organization_id, requester)
            .await?;

        let expected = self.expected_version(&tender);
        self.mutate(id, TenderChange::SetStatus(status), expected).await
    }

    /// Apply a partial edit. No authorization here; see [`TenderEngine::edit_as`].
    #[instrument(skip(self, patch), fields(tender_id = %id))]
    pub async fn edit(&self, id: TenderId, patch: TenderPatch) -> DomainResult<Tender> {
        let expected = match self.policy.concurrency {
            ConcurrencyMode::LastWriteWins => ExpectedVersion::Any,
            ConcurrencyMode::CompareAndSwap => {
                let current = self.get_by_id(id).await?;
                self.expected_version(&current)
            }
        };
        self.mutate(id, TenderChange::Edit(patch), expected).await
    }

    /// Edit on behalf of `requester`, who must be responsible for the tender's
    /// organization.
    #[instrument(skip(self, patch), fields(tender_id = %id, requester = %requester))]
    pub async fn edit_as(&self, id: TenderId, patch: TenderPatch, requester: UserId) -> DomainResult<Tender> {
        let tender = self.get_by_id(id).await?;
        self.gate
            .assert_responsible(tender.organization_id, requester)
            .await?;

        let expected = self.expected_version(&tender);
        self.mutate(id, TenderChange::Edit(patch), expected).await
    }

    fn expected_version(&self, read: &Tender) -> ExpectedVersion {
        match self.policy.concurrency {
            ConcurrencyMode::LastWriteWins => ExpectedVersion::Any,
            ConcurrencyMode::CompareAndSwap => ExpectedVersion::Exact(read.version),
        }
    }

    async fn list(&self, filter: &TenderFilter, page: Page) -> DomainResult<Vec<Tender>> {
        self.tenders
            .list_tenders(filter, page)
            .await
            .map_err(|e| e.into_domain(EntityKind::Tender))
    }

    async fn mutate(
        &self,
        id: TenderId,
        change: TenderChange,
        expected: ExpectedVersion,
    ) -> DomainResult<Tender> {
        let tender = self
            .tenders
            .update_tender(id, &change, &self.policy.transitions, expected)
            .await
            .map_err(|e| e.into_domain(EntityKind::Tender))?;

        tracing::info!(tender_id = %tender.id, version = tender.version, status = %tender.status, "tender updated");
        Ok(tender)
    }
}

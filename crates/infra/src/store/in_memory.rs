use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use tenderhub_auth::{Organization, Responsibility, User};
use tenderhub_bids::{Bid, BidChange};
use tenderhub_core::{
    BidId, DomainResult, EntityKind, ExpectedVersion, OrganizationId, Page, ResponsibilityId,
    TenderId, TransitionPolicy, UserId, Versioned,
};
use tenderhub_tenders::{Tender, TenderChange};

use super::r#trait::{
    BidFilter, BidStore, OrganizationStore, ResponsibilityStore, StoreError, TenderFilter, TenderStore,
    UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    organizations: HashMap<OrganizationId, Organization>,
    responsibilities: HashMap<ResponsibilityId, Responsibility>,
    tenders: HashMap<TenderId, Tender>,
    bids: HashMap<BidId, Bid>,
}

/// In-memory store for every entity.
///
/// Intended for tests/dev. Emulates the unique and foreign-key constraints of the
/// Postgres schema so both adapters report the same errors. Every mutation runs
/// under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::backend("read_lock", "lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::backend("write_lock", "lock poisoned"))
    }
}

/// Check the expected version, apply on a copy, then commit the copy.
fn update_versioned<T>(
    record: Option<&mut T>,
    expected: ExpectedVersion,
    apply: impl FnOnce(&mut T) -> DomainResult<()>,
) -> Result<T, StoreError>
where
    T: Versioned + Clone,
{
    let record = record.ok_or(StoreError::NotFound)?;
    let actual = record.version();
    if !expected.matches(actual) {
        return Err(StoreError::Conflict { expected, actual });
    }

    let mut next = record.clone();
    apply(&mut next).map_err(StoreError::Rejected)?;
    *record = next.clone();
    Ok(next)
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::AlreadyExists(format!("username '{}'", user.username)));
        }
        if tables.users.contains_key(&user.id) {
            return Err(StoreError::AlreadyExists(format!("user {}", user.id)));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn insert_organization(&self, organization: &Organization) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.organizations.contains_key(&organization.id) {
            return Err(StoreError::AlreadyExists(format!("organization {}", organization.id)));
        }
        tables.organizations.insert(organization.id, organization.clone());
        Ok(())
    }

    async fn organization_by_id(&self, id: OrganizationId) -> Result<Option<Organization>, StoreError> {
        Ok(self.read()?.organizations.get(&id).cloned())
    }
}

#[async_trait]
impl ResponsibilityStore for InMemoryStore {
    async fn insert_responsibility(&self, responsibility: &Responsibility) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.organizations.contains_key(&responsibility.organization_id) {
            return Err(StoreError::MissingReference(EntityKind::Organization));
        }
        if !tables.users.contains_key(&responsibility.user_id) {
            return Err(StoreError::MissingReference(EntityKind::User));
        }
        if tables
            .responsibilities
            .values()
            .any(|r| r.links(responsibility.organization_id, responsibility.user_id))
        {
            return Err(StoreError::AlreadyExists(format!(
                "responsibility ({}, {})",
                responsibility.organization_id, responsibility.user_id
            )));
        }
        tables.responsibilities.insert(responsibility.id, *responsibility);
        Ok(())
    }

    async fn responsibility_by_id(&self, id: ResponsibilityId) -> Result<Option<Responsibility>, StoreError> {
        Ok(self.read()?.responsibilities.get(&id).copied())
    }

    async fn responsibility_for(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<Responsibility>, StoreError> {
        Ok(self
            .read()?
            .responsibilities
            .values()
            .find(|r| r.links(organization_id, user_id))
            .copied())
    }
}

#[async_trait]
impl TenderStore for InMemoryStore {
    async fn insert_tender(&self, tender: &Tender) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.organizations.contains_key(&tender.organization_id) {
            return Err(StoreError::MissingReference(EntityKind::Organization));
        }
        if tables.tenders.contains_key(&tender.id) {
            return Err(StoreError::AlreadyExists(format!("tender {}", tender.id)));
        }
        tables.tenders.insert(tender.id, tender.clone());
        Ok(())
    }

    async fn tender_by_id(&self, id: TenderId) -> Result<Option<Tender>, StoreError> {
        Ok(self.read()?.tenders.get(&id).cloned())
    }

    async fn list_tenders(&self, filter: &TenderFilter, page: Page) -> Result<Vec<Tender>, StoreError> {
        let tables = self.read()?;
        let mut matching: Vec<&Tender> = tables
            .tenders
            .values()
            .filter(|t| filter.service_type.is_none_or(|ty| t.service_type == ty))
            .filter(|t| {
                filter
                    .creator_username
                    .as_deref()
                    .is_none_or(|name| t.creator_username == name)
            })
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(page.slice(&matching).iter().map(|t| (*t).clone()).collect())
    }

    async fn update_tender(
        &self,
        id: TenderId,
        change: &TenderChange,
        transitions: &TransitionPolicy,
        expected: ExpectedVersion,
    ) -> Result<Tender, StoreError> {
        let mut tables = self.write()?;
        update_versioned(tables.tenders.get_mut(&id), expected, |tender| {
            tender.apply(change, transitions)
        })
    }
}

#[async_trait]
impl BidStore for InMemoryStore {
    async fn insert_bid(&self, bid: &Bid) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.tenders.contains_key(&bid.tender_id) {
            return Err(StoreError::MissingReference(EntityKind::Tender));
        }
        if tables.bids.contains_key(&bid.id) {
            return Err(StoreError::AlreadyExists(format!("bid {}", bid.id)));
        }
        tables.bids.insert(bid.id, bid.clone());
        Ok(())
    }

    async fn bid_by_id(&self, id: BidId) -> Result<Option<Bid>, StoreError> {
        Ok(self.read()?.bids.get(&id).cloned())
    }

    async fn list_bids(&self, filter: &BidFilter, page: Page) -> Result<Vec<Bid>, StoreError> {
        let tables = self.read()?;
        let mut matching: Vec<&Bid> = tables
            .bids
            .values()
            .filter(|b| filter.author_id.is_none_or(|author| b.is_authored_by(author)))
            .filter(|b| filter.tender_id.is_none_or(|tender| b.tender_id == tender))
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(page.slice(&matching).iter().map(|b| (*b).clone()).collect())
    }

    async fn update_bid(
        &self,
        id: BidId,
        change: &BidChange,
        transitions: &TransitionPolicy,
        expected: ExpectedVersion,
    ) -> Result<Bid, StoreError> {
        let mut tables = self.write()?;
        update_versioned(tables.bids.get_mut(&id), expected, |bid| bid.apply(change, transitions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tenderhub_auth::{NewOrganization, NewUser, OrganizationType};
    use tenderhub_core::LifecycleStatus;
    use tenderhub_tenders::{NewTender, ServiceType};

    fn test_user(username: &str) -> User {
        User::register(
            NewUser {
                username: username.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn test_org() -> Organization {
        Organization::register(
            NewOrganization {
                name: "Acme".to_string(),
                description: "roads".to_string(),
                organization_type: OrganizationType::LimitedLiabilityCompany,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn test_tender(org: OrganizationId, name: &str, service_type: ServiceType) -> Tender {
        Tender::create(
            NewTender {
                name: name.to_string(),
                description: "desc".to_string(),
                service_type,
                organization_id: org,
                creator_username: "ada".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = InMemoryStore::new();
        store.insert_user(&test_user("ada")).await.unwrap();

        match store.insert_user(&test_user("ada")).await {
            Err(StoreError::AlreadyExists(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn responsibility_requires_existing_records() {
        let store = InMemoryStore::new();
        let org = test_org();
        store.insert_organization(&org).await.unwrap();

        let dangling = Responsibility::grant(org.id, UserId::new());
        match store.insert_responsibility(&dangling).await {
            Err(StoreError::MissingReference(EntityKind::User)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_pair_is_rejected() {
        let store = InMemoryStore::new();
        let org = test_org();
        let user = test_user("ada");
        store.insert_organization(&org).await.unwrap();
        store.insert_user(&user).await.unwrap();

        store
            .insert_responsibility(&Responsibility::grant(org.id, user.id))
            .await
            .unwrap();
        assert!(matches!(
            store
                .insert_responsibility(&Responsibility::grant(org.id, user.id))
                .await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn listing_is_ordered_by_name_and_paged() {
        let store = InMemoryStore::new();
        let org = test_org();
        store.insert_organization(&org).await.unwrap();
        for name in ["delta", "alpha", "charlie", "bravo"] {
            store
                .insert_tender(&test_tender(org.id, name, ServiceType::Delivery))
                .await
                .unwrap();
        }

        let page = store
            .list_tenders(&TenderFilter::default(), Page::new(Some(2), Some(1)))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["bravo", "charlie"]);
    }

    #[tokio::test]
    async fn stale_expected_version_conflicts() {
        let store = InMemoryStore::new();
        let org = test_org();
        store.insert_organization(&org).await.unwrap();
        let tender = test_tender(org.id, "bridge", ServiceType::Construction);
        store.insert_tender(&tender).await.unwrap();

        let change = TenderChange::SetStatus(LifecycleStatus::Published);
        let policy = TransitionPolicy::free();
        let updated = store
            .update_tender(tender.id, &change, &policy, ExpectedVersion::Exact(1))
            .await
            .unwrap();
        assert_eq!(updated.version, 2);

        match store
            .update_tender(tender.id, &change, &policy, ExpectedVersion::Exact(1))
            .await
        {
            Err(StoreError::Conflict { actual: 2, .. }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bid_requires_existing_tender() {
        let store = InMemoryStore::new();
        let bid = Bid::create(
            tenderhub_bids::NewBid {
                name: "offer".to_string(),
                description: "cheap".to_string(),
                tender_id: TenderId::new(),
                author: tenderhub_bids::BidAuthor::User(UserId::new()),
            },
            Utc::now(),
        )
        .unwrap();

        assert!(matches!(
            store.insert_bid(&bid).await,
            Err(StoreError::MissingReference(EntityKind::Tender))
        ));
        assert!(store.bid_by_id(bid.id).await.unwrap().is_none());
    }
}

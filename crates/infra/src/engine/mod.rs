//! Lifecycle engines: the operations the HTTP layer calls.
//!
//! Engines are cheap to clone (they only hold `Arc` store handles) and carry no
//! state of their own; every durable fact lives in the store.

pub mod bids;
pub mod gate;
pub mod identity;
pub mod organizations;
pub mod tenders;

pub use bids::BidEngine;
pub use gate::AuthorizationGate;
pub use identity::IdentityDirectory;
pub use organizations::OrganizationRegistry;
pub use tenders::TenderEngine;

use tenderhub_core::LifecyclePolicy;

use crate::store::Stores;

/// Every engine wired against one set of stores.
#[derive(Clone)]
pub struct Engines {
    pub identity: IdentityDirectory,
    pub organizations: OrganizationRegistry,
    pub gate: AuthorizationGate,
    pub tenders: TenderEngine,
    pub bids: BidEngine,
}

impl Engines {
    pub fn new(stores: Stores, policy: LifecyclePolicy) -> Self {
        let gate = AuthorizationGate::new(stores.responsibilities);
        let tenders = TenderEngine::new(stores.tenders, gate.clone(), policy.clone());
        let bids = BidEngine::new(stores.bids, tenders.clone(), gate.clone(), policy);

        Self {
            identity: IdentityDirectory::new(stores.users),
            organizations: OrganizationRegistry::new(stores.organizations),
            gate,
            tenders,
            bids,
        }
    }
}

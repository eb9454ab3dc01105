//! Persistence boundary: one async trait per entity plus two adapters.

pub mod in_memory;
pub mod postgres;
mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{
    BidFilter, BidStore, OrganizationStore, ResponsibilityStore, StoreError, Stores, TenderFilter,
    TenderStore, UserStore,
};

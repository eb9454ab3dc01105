//! Infrastructure layer: persistence adapters and the lifecycle engines built on them.

pub mod engine;
pub mod store;


pub use engine::Engines;
pub use store::{InMemoryStore, PostgresStore, StoreError, Stores};

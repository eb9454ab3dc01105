//! `tenderhub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error model, lifecycle status rules and pagination.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod pagination;
pub mod value_object;

pub use aggregate::{ExpectedVersion, Versioned};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, EntityKind};
pub use id::{BidId, OrganizationId, ResponsibilityId, TenderId, UserId};
pub use lifecycle::{ConcurrencyMode, LifecyclePolicy, LifecycleStatus, TransitionPolicy};
pub use pagination::Page;
pub use value_object::ValueObject;

//! `tenderhub-auth`: identities, organizations, and the responsibility rule.
//!
//! This crate is intentionally decoupled from HTTP and storage: it defines the
//! records and the pure predicate; lookups happen in `tenderhub-infra`.

pub mod authorize;
pub mod organization;
pub mod responsibility;
pub mod user;

pub use authorize::{authorize, AuthzError};
pub use organization::{NewOrganization, Organization, OrganizationType};
pub use responsibility::Responsibility;
pub use user::{NewUser, User};

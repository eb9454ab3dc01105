//! `tenderhub-tenders`: tender records and their pure state changes.

pub mod tender;

pub use tender::{NewTender, ServiceType, Tender, TenderChange, TenderPatch};

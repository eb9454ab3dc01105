//! Status lifecycle shared by tenders and bids.
//!
//! Both entities move through the same three states. By default any state may be
//! set explicitly; a [`TransitionPolicy`] can narrow the graph when a deployment
//! wants a strict `Created → Published → Closed` flow.

use std::collections::HashSet;

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleStatus {
    #[default]
    Created,
    Published,
    Closed,
}

impl LifecycleStatus {
    pub const ALL: [LifecycleStatus; 3] = [
        LifecycleStatus::Created,
        LifecycleStatus::Published,
        LifecycleStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Created => "Created",
            LifecycleStatus::Published => "Published",
            LifecycleStatus::Closed => "Closed",
        }
    }

    /// Published entities are visible to everyone; the others only to
    /// responsible users of the owning organization.
    pub fn is_public(&self) -> bool {
        matches!(self, LifecycleStatus::Published)
    }
}

impl ValueObject for LifecycleStatus {}

impl core::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown status '{s}'")))
    }
}

/// Which `(from, to)` status changes are accepted.
///
/// `None` means every change is accepted (including re-setting the current state).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    allowed: Option<HashSet<(LifecycleStatus, LifecycleStatus)>>,
}

impl TransitionPolicy {
    pub fn free() -> Self {
        Self::default()
    }

    /// Forward-only flow: publish, close, or close without publishing.
    pub fn strict() -> Self {
        use LifecycleStatus::*;
        Self::only([(Created, Published), (Published, Closed), (Created, Closed)])
    }

    pub fn only(pairs: impl IntoIterator<Item = (LifecycleStatus, LifecycleStatus)>) -> Self {
        Self {
            allowed: Some(pairs.into_iter().collect()),
        }
    }

    pub fn permits(&self, from: LifecycleStatus, to: LifecycleStatus) -> bool {
        match &self.allowed {
            None => true,
            Some(pairs) => pairs.contains(&(from, to)),
        }
    }

    pub fn check(&self, from: LifecycleStatus, to: LifecycleStatus) -> DomainResult<()> {
        if self.permits(from, to) {
            Ok(())
        } else {
            Err(DomainError::invariant(format!(
                "status transition from {from} to {to} is not allowed"
            )))
        }
    }
}

/// How engines guard concurrent mutations of the same record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Mutations are applied atomically against whatever version is current.
    #[default]
    LastWriteWins,
    /// The engine reads the record first and rejects the write if another
    /// mutation landed in between.
    CompareAndSwap,
}

/// Lifecycle knobs shared by the tender and bid engines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub transitions: TransitionPolicy,
    pub concurrency: ConcurrencyMode,
}

//! Users (employees) of the identity directory.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use tenderhub_core::{DomainError, DomainResult, Entity, UserId};

/// Input for registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// A registered user.
///
/// Immutable after creation apart from timestamps; `username` is unique across
/// the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn register(input: NewUser, now: DateTime<Utc>) -> DomainResult<Self> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username must not be empty"));
        }

        Ok(Self {
            id: UserId::new(),
            username: username.to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use tenderhub_auth::{NewUser, User};
use tenderhub_core::{DomainError, DomainResult, EntityKind, UserId};

use crate::store::UserStore;

/// Resolves usernames and ids to users.
#[derive(Clone)]
pub struct IdentityDirectory {
    users: Arc<dyn UserStore>,
}

impl IdentityDirectory {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: NewUser) -> DomainResult<User> {
        let user = User::register(input, Utc::now())?;
        self.users
            .insert_user(&user)
            .await
            .map_err(|e| e.into_domain(EntityKind::User))?;

        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: UserId) -> DomainResult<User> {
        self.users
            .user_by_id(id)
            .await
            .map_err(|e| e.into_domain(EntityKind::User))?
            .ok_or(DomainError::NotFound(EntityKind::User))
    }

    pub async fn get_user_by_username(&self, username: &str) -> DomainResult<User> {
        self.users
            .user_by_username(username)
            .await
            .map_err(|e| e.into_domain(EntityKind::User))?
            .ok_or(DomainError::NotFound(EntityKind::User))
    }
}

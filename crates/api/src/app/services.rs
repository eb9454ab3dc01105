use std::sync::Arc;

use tenderhub_auth::User;
use tenderhub_core::DomainResult;
use tenderhub_infra::{Engines, InMemoryStore, PostgresStore, Stores};

use crate::config::Config;

/// Shared application services, injected into handlers as an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub engines: Engines,
}

impl AppServices {
    pub fn new(engines: Engines) -> Self {
        Self { engines }
    }

    /// Resolve the acting user from the `username` the client supplied.
    pub async fn requester(&self, username: &str) -> DomainResult<User> {
        self.engines.identity.get_user_by_username(username).await
    }
}

/// Wire the engines against Postgres when a database URL is configured,
/// otherwise against the in-memory store.
pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let policy = config.lifecycle.policy();

    let stores = match config.database.url.as_deref() {
        Some(url) => {
            let store = PostgresStore::connect(url, config.database.max_connections).await?;
            store.migrate().await?;
            tracing::info!(max_connections = config.database.max_connections, "using postgres store");
            Stores::from_backend(Arc::new(store))
        }
        None => {
            tracing::warn!("database.url not set; using in-memory store");
            Stores::from_backend(Arc::new(InMemoryStore::new()))
        }
    };

    Ok(AppServices::new(Engines::new(stores, policy)))
}

use std::sync::Arc;

use tracing::instrument;

use tenderhub_auth::{authorize, Responsibility};
use tenderhub_core::{DomainError, DomainResult, EntityKind, OrganizationId, ResponsibilityId, UserId};

use crate::store::ResponsibilityStore;

/// The single place that decides whether a user may act for an organization.
///
/// Both lifecycle engines route every guarded operation through
/// [`AuthorizationGate::assert_responsible`].
#[derive(Clone)]
pub struct AuthorizationGate {
    responsibilities: Arc<dyn ResponsibilityStore>,
}

impl AuthorizationGate {
    pub fn new(responsibilities: Arc<dyn ResponsibilityStore>) -> Self {
        Self { responsibilities }
    }

    /// `Ok(())` iff a responsibility edge exists for exactly this pair.
    #[instrument(skip(self), fields(organization_id = %organization_id, user_id = %user_id))]
    pub async fn assert_responsible(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> DomainResult<()> {
        let edge = self
            .responsibilities
            .responsibility_for(organization_id, user_id)
            .await
            .map_err(|e| e.into_domain(EntityKind::Responsibility))?;

        authorize(edge.as_ref(), organization_id, user_id).map_err(|denied| {
            tracing::warn!(%organization_id, %user_id, "{denied}");
            DomainError::from(denied)
        })
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, user_id = %user_id))]
    pub async fn create_responsibility(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> DomainResult<Responsibility> {
        let responsibility = Responsibility::grant(organization_id, user_id);
        self.responsibilities
            .insert_responsibility(&responsibility)
            .await
            .map_err(|e| e.into_domain(EntityKind::Responsibility))?;

        tracing::info!(responsibility_id = %responsibility.id, "responsibility granted");
        Ok(responsibility)
    }

    pub async fn get_responsibility(&self, id: ResponsibilityId) -> DomainResult<Responsibility> {
        self.responsibilities
            .responsibility_by_id(id)
            .await
            .map_err(|e| e.into_domain(EntityKind::Responsibility))?
            .ok_or(DomainError::NotFound(EntityKind::Responsibility))
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::store::InMemoryStore;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn denial_logs_one_warning_and_no_error() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let gate = AuthorizationGate::new(Arc::new(InMemoryStore::new()));
        let err = gate
            .assert_responsible(OrganizationId::new(), UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Forbidden);

        let out = log.contents();
        assert_eq!(out.matches(" WARN ").count(), 1, "{out}");
        assert!(!out.contains("ERROR"), "{out}");
    }
}

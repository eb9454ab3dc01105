//! Postgres-backed store.
//!
//! Plain `sqlx::query` with explicit binds and `try_get` row mapping. Every
//! mutation of a tender or bid runs as `SELECT ... FOR UPDATE` followed by an
//! `UPDATE` inside one transaction, so concurrent writers are serialized per row
//! and the version increments exactly once per accepted change.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{instrument, Span};
use uuid::Uuid;

use tenderhub_auth::{Organization, OrganizationType, Responsibility, User};
use tenderhub_bids::{AuthorType, Bid, BidAuthor, BidChange};
use tenderhub_core::{
    BidId, EntityKind, ExpectedVersion, LifecycleStatus, OrganizationId, Page, ResponsibilityId,
    TenderId, TransitionPolicy, UserId,
};
use tenderhub_tenders::{ServiceType, Tender, TenderChange};

use super::r#trait::{
    BidFilter, BidStore, OrganizationStore, ResponsibilityStore, StoreError, TenderFilter, TenderStore,
    UserStore,
};

/// Postgres store for every entity.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&*self.pool)
            .await
            .map_err(|e| StoreError::backend("migrate", e.to_string()))
    }
}

const TENDER_COLUMNS: &str = "id, name, description, service_type, status, organization_id, version, creator_username, created_at";
const BID_COLUMNS: &str =
    "id, name, description, status, tender_id, author_type, author_id, version, created_at";

fn decode<T>(operation: &'static str, value: &str) -> Result<T, StoreError>
where
    T: core::str::FromStr<Err = tenderhub_core::DomainError>,
{
    value
        .parse()
        .map_err(|e: tenderhub_core::DomainError| StoreError::backend(operation, e.to_string()))
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let op = "decode_user";
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error(op, e))?),
        username: row.try_get("username").map_err(|e| map_sqlx_error(op, e))?,
        first_name: row.try_get("first_name").map_err(|e| map_sqlx_error(op, e))?,
        last_name: row.try_get("last_name").map_err(|e| map_sqlx_error(op, e))?,
        created_at: row.try_get("created_at").map_err(|e| map_sqlx_error(op, e))?,
        updated_at: row.try_get("updated_at").map_err(|e| map_sqlx_error(op, e))?,
    })
}

fn organization_from_row(row: &PgRow) -> Result<Organization, StoreError> {
    let op = "decode_organization";
    let organization_type: String = row.try_get("type").map_err(|e| map_sqlx_error(op, e))?;
    Ok(Organization {
        id: OrganizationId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error(op, e))?),
        name: row.try_get("name").map_err(|e| map_sqlx_error(op, e))?,
        description: row.try_get("description").map_err(|e| map_sqlx_error(op, e))?,
        organization_type: decode::<OrganizationType>(op, &organization_type)?,
        created_at: row.try_get("created_at").map_err(|e| map_sqlx_error(op, e))?,
        updated_at: row.try_get("updated_at").map_err(|e| map_sqlx_error(op, e))?,
    })
}

fn responsibility_from_row(row: &PgRow) -> Result<Responsibility, StoreError> {
    let op = "decode_responsibility";
    Ok(Responsibility {
        id: ResponsibilityId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error(op, e))?),
        organization_id: OrganizationId::from_uuid(
            row.try_get("organization_id").map_err(|e| map_sqlx_error(op, e))?,
        ),
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(|e| map_sqlx_error(op, e))?),
    })
}

fn tender_from_row(row: &PgRow) -> Result<Tender, StoreError> {
    let op = "decode_tender";
    let service_type: String = row.try_get("service_type").map_err(|e| map_sqlx_error(op, e))?;
    let status: String = row.try_get("status").map_err(|e| map_sqlx_error(op, e))?;
    let version: i64 = row.try_get("version").map_err(|e| map_sqlx_error(op, e))?;
    Ok(Tender {
        id: TenderId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error(op, e))?),
        name: row.try_get("name").map_err(|e| map_sqlx_error(op, e))?,
        description: row.try_get("description").map_err(|e| map_sqlx_error(op, e))?,
        service_type: decode::<ServiceType>(op, &service_type)?,
        status: decode::<LifecycleStatus>(op, &status)?,
        organization_id: OrganizationId::from_uuid(
            row.try_get("organization_id").map_err(|e| map_sqlx_error(op, e))?,
        ),
        version: version as u64,
        creator_username: row.try_get("creator_username").map_err(|e| map_sqlx_error(op, e))?,
        created_at: row.try_get("created_at").map_err(|e| map_sqlx_error(op, e))?,
    })
}

fn bid_from_row(row: &PgRow) -> Result<Bid, StoreError> {
    let op = "decode_bid";
    let status: String = row.try_get("status").map_err(|e| map_sqlx_error(op, e))?;
    let author_type: String = row.try_get("author_type").map_err(|e| map_sqlx_error(op, e))?;
    let author_id: Uuid = row.try_get("author_id").map_err(|e| map_sqlx_error(op, e))?;
    let version: i64 = row.try_get("version").map_err(|e| map_sqlx_error(op, e))?;
    Ok(Bid {
        id: BidId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error(op, e))?),
        name: row.try_get("name").map_err(|e| map_sqlx_error(op, e))?,
        description: row.try_get("description").map_err(|e| map_sqlx_error(op, e))?,
        status: decode::<LifecycleStatus>(op, &status)?,
        tender_id: TenderId::from_uuid(row.try_get("tender_id").map_err(|e| map_sqlx_error(op, e))?),
        author: BidAuthor::from_parts(decode::<AuthorType>(op, &author_type)?, author_id),
        version: version as u64,
        created_at: row.try_get("created_at").map_err(|e| map_sqlx_error(op, e))?,
    })
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id, username = %user.username), err)]
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO employee (id, username, first_name, last_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, first_name, last_name, created_at, updated_at
            FROM employee
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, first_name, last_name, created_at, updated_at
            FROM employee
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_by_username", e))?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl OrganizationStore for PostgresStore {
    #[instrument(skip(self, organization), fields(organization_id = %organization.id), err)]
    async fn insert_organization(&self, organization: &Organization) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO organization (id, name, description, type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(organization.id.as_uuid())
        .bind(&organization.name)
        .bind(&organization.description)
        .bind(organization.organization_type.code())
        .bind(organization.created_at)
        .bind(organization.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_organization", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(organization_id = %id), err)]
    async fn organization_by_id(&self, id: OrganizationId) -> Result<Option<Organization>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, type, created_at, updated_at
            FROM organization
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("organization_by_id", e))?;

        row.as_ref().map(organization_from_row).transpose()
    }
}

#[async_trait]
impl ResponsibilityStore for PostgresStore {
    #[instrument(
        skip(self, responsibility),
        fields(
            organization_id = %responsibility.organization_id,
            user_id = %responsibility.user_id
        ),
        err
    )]
    async fn insert_responsibility(&self, responsibility: &Responsibility) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO organization_responsible (id, organization_id, user_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(responsibility.id.as_uuid())
        .bind(responsibility.organization_id.as_uuid())
        .bind(responsibility.user_id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_responsibility", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(responsibility_id = %id), err)]
    async fn responsibility_by_id(&self, id: ResponsibilityId) -> Result<Option<Responsibility>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, user_id
            FROM organization_responsible
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("responsibility_by_id", e))?;

        row.as_ref().map(responsibility_from_row).transpose()
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, user_id = %user_id), err)]
    async fn responsibility_for(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<Responsibility>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, user_id
            FROM organization_responsible
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("responsibility_for", e))?;

        row.as_ref().map(responsibility_from_row).transpose()
    }
}

#[async_trait]
impl TenderStore for PostgresStore {
    #[instrument(skip(self, tender), fields(tender_id = %tender.id, organization_id = %tender.organization_id), err)]
    async fn insert_tender(&self, tender: &Tender) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO tender ({TENDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(tender.id.as_uuid())
        .bind(&tender.name)
        .bind(&tender.description)
        .bind(tender.service_type.as_str())
        .bind(tender.status.as_str())
        .bind(tender.organization_id.as_uuid())
        .bind(tender.version as i64)
        .bind(&tender.creator_username)
        .bind(tender.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_tender", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(tender_id = %id), err)]
    async fn tender_by_id(&self, id: TenderId) -> Result<Option<Tender>, StoreError> {
        let row = sqlx::query(&format!("SELECT {TENDER_COLUMNS} FROM tender WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("tender_by_id", e))?;

        row.as_ref().map(tender_from_row).transpose()
    }

    #[instrument(
        skip(self),
        fields(limit = page.limit(), offset = page.offset(), row_count = tracing::field::Empty),
        err
    )]
    async fn list_tenders(&self, filter: &TenderFilter, page: Page) -> Result<Vec<Tender>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TENDER_COLUMNS}
            FROM tender
            WHERE ($1::text IS NULL OR service_type = $1)
              AND ($2::text IS NULL OR creator_username = $2)
            ORDER BY name ASC, id ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.service_type.map(|t| t.as_str()))
        .bind(filter.creator_username.as_deref())
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_tenders", e))?;

        Span::current().record("row_count", rows.len());
        rows.iter().map(tender_from_row).collect()
    }

    #[instrument(skip(self, change, transitions), fields(tender_id = %id, expected = ?expected), err)]
    async fn update_tender(
        &self,
        id: TenderId,
        change: &TenderChange,
        transitions: &TransitionPolicy,
        expected: ExpectedVersion,
    ) -> Result<Tender, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(&format!(
            "SELECT {TENDER_COLUMNS} FROM tender WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_tender", e))?;

        let mut tender = match row {
            Some(row) => tender_from_row(&row)?,
            None => return Err(StoreError::NotFound),
        };
        if !expected.matches(tender.version) {
            return Err(StoreError::Conflict {
                expected,
                actual: tender.version,
            });
        }
        tender.apply(change, transitions).map_err(StoreError::Rejected)?;

        sqlx::query(
            r#"
            UPDATE tender
            SET name = $2, description = $3, service_type = $4, status = $5, version = $6
            WHERE id = $1
            "#,
        )
        .bind(tender.id.as_uuid())
        .bind(&tender.name)
        .bind(&tender.description)
        .bind(tender.service_type.as_str())
        .bind(tender.status.as_str())
        .bind(tender.version as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_tender", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(tender)
    }
}

#[async_trait]
impl BidStore for PostgresStore {
    #[instrument(skip(self, bid), fields(bid_id = %bid.id, tender_id = %bid.tender_id), err)]
    async fn insert_bid(&self, bid: &Bid) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO bid ({BID_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(bid.id.as_uuid())
        .bind(&bid.name)
        .bind(&bid.description)
        .bind(bid.status.as_str())
        .bind(bid.tender_id.as_uuid())
        .bind(bid.author.kind().as_str())
        .bind(bid.author.uuid())
        .bind(bid.version as i64)
        .bind(bid.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_bid", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(bid_id = %id), err)]
    async fn bid_by_id(&self, id: BidId) -> Result<Option<Bid>, StoreError> {
        let row = sqlx::query(&format!("SELECT {BID_COLUMNS} FROM bid WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("bid_by_id", e))?;

        row.as_ref().map(bid_from_row).transpose()
    }

    #[instrument(skip(self), fields(limit = page.limit(), offset = page.offset()), err)]
    async fn list_bids(&self, filter: &BidFilter, page: Page) -> Result<Vec<Bid>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {BID_COLUMNS}
            FROM bid
            WHERE ($1::uuid IS NULL OR author_id = $1)
              AND ($2::uuid IS NULL OR tender_id = $2)
            ORDER BY name ASC, id ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.author_id)
        .bind(filter.tender_id.map(Uuid::from))
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_bids", e))?;

        rows.iter().map(bid_from_row).collect()
    }

    #[instrument(skip(self, change, transitions), fields(bid_id = %id, expected = ?expected), err)]
    async fn update_bid(
        &self,
        id: BidId,
        change: &BidChange,
        transitions: &TransitionPolicy,
        expected: ExpectedVersion,
    ) -> Result<Bid, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(&format!("SELECT {BID_COLUMNS} FROM bid WHERE id = $1 FOR UPDATE"))
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_bid", e))?;

        let mut bid = match row {
            Some(row) => bid_from_row(&row)?,
            None => return Err(StoreError::NotFound),
        };
        if !expected.matches(bid.version) {
            return Err(StoreError::Conflict {
                expected,
                actual: bid.version,
            });
        }
        bid.apply(change, transitions).map_err(StoreError::Rejected)?;

        sqlx::query(
            r#"
            UPDATE bid
            SET name = $2, description = $3, status = $4, version = $5
            WHERE id = $1
            "#,
        )
        .bind(bid.id.as_uuid())
        .bind(&bid.name)
        .bind(&bid.description)
        .bind(bid.status.as_str())
        .bind(bid.version as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_bid", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(bid)
    }
}

/// Which record a named foreign-key constraint points at.
fn referenced_kind(constraint: Option<&str>) -> EntityKind {
    match constraint {
        Some("organization_responsible_user_fk") => EntityKind::User,
        Some("bid_tender_fk") => EntityKind::Tender,
        _ => EntityKind::Organization,
    }
}

/// Map a SQLx error to a store error.
///
/// Dropped transactions roll back on their own, so early returns above need no
/// explicit rollback.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                // Unique violation
                Some("23505") => StoreError::AlreadyExists(msg),
                // Foreign key violation
                Some("23503") => StoreError::MissingReference(referenced_kind(db_err.constraint())),
                _ => StoreError::backend(operation, msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        _ => StoreError::backend(operation, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_keys_name_their_target() {
        assert_eq!(referenced_kind(Some("bid_tender_fk")), EntityKind::Tender);
        assert_eq!(
            referenced_kind(Some("organization_responsible_user_fk")),
            EntityKind::User
        );
        assert_eq!(
            referenced_kind(Some("tender_organization_fk")),
            EntityKind::Organization
        );
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            map_sqlx_error("tender_by_id", sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }
}

//! Pool setup and the inventory lock entry point.

use crate::lock::PgEventLock;
use crate::rows::{db_error, inventory_from_row};
use boxoffice_core::{EventId, InventoryStore, StorageProbe, StoreError, StoreResult};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Connection pool tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on open connections
    pub max_connections: u32,
    /// Connections kept warm
    pub min_connections: u32,
    /// How long to wait for a free connection
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout` applied to every session.
    ///
    /// Waiting for an event's row lock is exempt: how long a reservation
    /// waits is decided by the caller's deadline alone.
    pub statement_timeout: Duration,
    /// Idle connections are closed after this long
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// `PostgreSQL`-backed inventory, ledger and catalog.
#[derive(Clone, Debug)]
pub struct PostgresBoxOffice {
    pool: PgPool,
}

impl PostgresBoxOffice {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the URL is malformed or the
    /// first connection cannot be established.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> StoreResult<Self> {
        let statement_timeout = format!("{}ms", settings.statement_timeout.as_millis());
        let options = PgConnectOptions::from_str(database_url)
            .map_err(db_error("parse database url"))?
            .options([("statement_timeout", statement_timeout)]);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .idle_timeout(Some(settings.idle_timeout))
            .connect_with(options)
            .await
            .map_err(db_error("connect"))?;

        tracing::info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if a migration fails.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Migration failed: {e}")))
    }

    /// Round-trip a trivial query.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the database is unreachable.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("ping"))?;
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every connection. Waits for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl InventoryStore for PostgresBoxOffice {
    type Lock = PgEventLock;

    async fn lock_event(&self, event_id: EventId) -> StoreResult<Option<PgEventLock>> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        sqlx::query("SET LOCAL statement_timeout = 0")
            .execute(&mut *tx)
            .await
            .map_err(db_error("lift statement timeout"))?;

        let row = sqlx::query(
            "SELECT tickets_vip, tickets_regular, price_vip_cents, price_regular_cents
             FROM events
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(event_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("lock event"))?;

        let Some(row) = row else {
            if let Err(e) = tx.rollback().await {
                tracing::warn!(%event_id, error = %e, "Rollback failed");
            }
            return Ok(None);
        };

        // Back to the session's timeout for the rest of the unit.
        sqlx::query("SET LOCAL statement_timeout TO DEFAULT")
            .execute(&mut *tx)
            .await
            .map_err(db_error("restore statement timeout"))?;

        let inventory = inventory_from_row(&row)?;
        Ok(Some(PgEventLock::new(tx, event_id, inventory)))
    }
}

impl StorageProbe for PostgresBoxOffice {
    const BACKEND: &'static str = "postgres";

    async fn probe(&self) -> StoreResult<()> {
        self.ping().await
    }
}

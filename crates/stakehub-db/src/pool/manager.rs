//! Process-wide PostgreSQL connection manager
//!
//! The pool is built on first use and never torn down or rebuilt. Concurrent
//! first callers all await the same initialization. Dead idle connections
//! are replaced by the pool itself (`test_before_acquire`), so a network
//! blip never requires recreating the pool.

use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use stakehub_common::DatabaseConfig;

use super::ssl::SslPolicy;
use crate::error::DbError;

/// Pool construction parameters
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub statement_timeout: Duration,
    pub query_timeout: Duration,
    pub ssl_reject_unauthorized: bool,
    pub verbose_logs: bool,
    /// Set while the application is being built rather than served
    pub build_phase: bool,
}

impl PoolSettings {
    pub fn from_config(config: &DatabaseConfig, build_phase: bool) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            acquire_timeout: Duration::from_secs(config.acquire_timeout_secs),
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            max_lifetime: Duration::from_secs(config.max_lifetime_secs),
            statement_timeout: Duration::from_millis(config.statement_timeout_ms),
            query_timeout: Duration::from_millis(config.query_timeout_ms),
            ssl_reject_unauthorized: config.ssl_reject_unauthorized,
            verbose_logs: config.verbose_logs,
            build_phase,
        }
    }

    /// Default settings for a URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(1800),
            statement_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            ssl_reject_unauthorized: false,
            verbose_logs: false,
            build_phase: false,
        }
    }

    fn verbose(&self) -> bool {
        self.verbose_logs && !self.build_phase
    }
}

static GLOBAL: OnceLock<Arc<ConnectionManager>> = OnceLock::new();

/// Owner of the single connection pool
pub struct ConnectionManager {
    settings: PoolSettings,
    pool: OnceCell<PgPool>,
}

impl ConnectionManager {
    /// Create a manager; no connection is made until the pool is first needed
    pub fn new(settings: PoolSettings) -> Self {
        Self {
            settings,
            pool: OnceCell::new(),
        }
    }

    /// Wrap an already built pool
    pub fn from_pool(pool: PgPool, settings: PoolSettings) -> Self {
        Self {
            settings,
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    /// Install the process-wide manager. The first installation wins and
    /// later calls get the existing instance back.
    pub fn init_global(settings: PoolSettings) -> Arc<Self> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::new(settings)))
            .clone()
    }

    /// The process-wide manager, if one was installed
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Connection options with TLS policy and server-side statement timeout applied
    ///
    /// # Errors
    /// `DbError::Configuration` if the URL cannot be parsed
    pub fn connect_options(&self) -> Result<PgConnectOptions, DbError> {
        let mut options = PgConnectOptions::from_str(&self.settings.url)
            .map_err(|e| DbError::Configuration(e.to_string()))?;

        // An explicit sslmode in the URL always wins
        if !self.settings.url.contains("sslmode=") {
            let policy = SslPolicy::for_host(options.get_host(), self.settings.ssl_reject_unauthorized);
            debug!(?policy, host = options.get_host(), "Selected database TLS policy");
            options = options.ssl_mode(policy.mode());
        }

        options = options.options([(
            "statement_timeout",
            self.settings.statement_timeout.as_millis().to_string(),
        )]);

        if !self.settings.verbose() {
            options = options.disable_statement_logging();
        }

        Ok(options)
    }

    /// The shared pool, created on first call
    ///
    /// # Errors
    /// `DbError::Configuration` if the database URL is invalid
    pub async fn pool(&self) -> Result<&PgPool, DbError> {
        self.pool
            .get_or_try_init(|| async {
                let options = self.connect_options()?;

                info!(
                    max_connections = self.settings.max_connections,
                    min_connections = self.settings.min_connections,
                    "Initializing database pool"
                );

                Ok(PgPoolOptions::new()
                    .max_connections(self.settings.max_connections)
                    .min_connections(self.settings.min_connections)
                    .acquire_timeout(self.settings.acquire_timeout)
                    .idle_timeout(self.settings.idle_timeout)
                    .max_lifetime(self.settings.max_lifetime)
                    .test_before_acquire(true)
                    .connect_lazy_with(options))
            })
            .await
    }

    /// Run a query future under the default query deadline
    ///
    /// # Errors
    /// `DbError::Timeout` on deadline, otherwise the driver error
    pub async fn run<T, Fut>(&self, fut: Fut) -> Result<T, DbError>
    where
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        self.query_with_timeout(fut, self.settings.query_timeout).await
    }

    /// Race a query future against a timer.
    ///
    /// On timeout the future is dropped, which returns any connection it
    /// held to the pool. The driver operation itself is abandoned, not
    /// cancelled server-side (`statement_timeout` covers that).
    ///
    /// # Errors
    /// `DbError::Timeout` on deadline, otherwise the driver error
    pub async fn query_with_timeout<T, Fut>(&self, fut: Fut, timeout: Duration) -> Result<T, DbError>
    where
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let started = Instant::now();

        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(value)) => {
                if self.settings.verbose() {
                    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Query completed");
                }
                Ok(value)
            }
            Ok(Err(e)) => {
                if matches!(e, sqlx::Error::PoolTimedOut) {
                    error!(
                        max_connections = self.settings.max_connections,
                        "Timed out acquiring a pooled connection"
                    );
                } else if self.settings.verbose() {
                    debug!(error = %e, "Query failed");
                }
                Err(DbError::from(e))
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Query timed out");
                Err(DbError::Timeout(timeout))
            }
        }
    }

    /// Execute a single statement with a deadline, returning rows affected
    ///
    /// # Errors
    /// Pool, query or timeout errors
    pub async fn execute_with_timeout(&self, sql: &str, timeout: Duration) -> Result<u64, DbError> {
        let pool = self.pool().await?;
        self.query_with_timeout(sqlx::query(sql).execute(pool), timeout)
            .await
            .map(|r| r.rows_affected())
    }

    /// Acquire one connection and run `f` on it, all under a deadline
    ///
    /// # Errors
    /// Pool, query or timeout errors
    pub async fn with_connection<T, F>(&self, timeout: Duration, f: F) -> Result<T, DbError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>>,
    {
        let pool = self.pool().await?;
        self.query_with_timeout(
            async move {
                let mut conn = pool.acquire().await?;
                f(&mut *conn).await
            },
            timeout,
        )
        .await
    }

    /// Run `f` inside BEGIN/COMMIT on a single connection; ROLLBACK on error
    ///
    /// # Errors
    /// The error returned by `f`, or a failure to begin or commit
    pub async fn transaction<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>>,
    {
        let pool = self.pool().await?;
        let mut tx = self.run(pool.begin()).await?;

        match f(&mut *tx).await {
            Ok(value) => {
                self.run(tx.commit()).await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Transaction rollback failed");
                }
                Err(DbError::from(e))
            }
        }
    }

    /// `SELECT 1` round trip
    ///
    /// # Errors
    /// Any pool, query or timeout error
    pub async fn health_check(&self) -> Result<(), DbError> {
        let pool = self.pool().await?;
        self.run(sqlx::query("SELECT 1").execute(pool)).await.map(|_| ())
    }

    /// Open a first connection ahead of traffic. Failures are logged only.
    pub async fn warmup(&self) {
        if self.settings.build_phase {
            debug!("Skipping database warmup during build phase");
            return;
        }

        let started = Instant::now();
        match self.health_check().await {
            Ok(()) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Database warmup complete"
            ),
            Err(e) => warn!(error = %e, "Database warmup failed"),
        }
    }

    /// Close the pool on shutdown
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("initialized", &self.is_initialized())
            .field("max_connections", &self.settings.max_connections)
            .finish_non_exhaustive()
    }
}

//! Admission control for critical database work
//!
//! A bounded semaphore in front of operations that must not pile up on the
//! pool (login, session creation). Waiters are served in FIFO order. A
//! caller that cannot get a permit before the deadline is rejected.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::error::DbError;

/// Bounded admission queue
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
    max_wait: Duration,
}

/// Held while the admitted operation runs; dropping it admits the next waiter
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    waited: Duration,
}

impl AdmissionPermit {
    /// How long the caller queued before being admitted
    pub fn waited(&self) -> Duration {
        self.waited
    }
}

impl AdmissionGate {
    pub const DEFAULT_CAPACITY: usize = 1;
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(10);

    pub fn new(capacity: usize, max_wait: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            max_wait,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a permit, at most `max_wait`
    ///
    /// # Errors
    /// `DbError::Overloaded` when the deadline passes first
    pub async fn admit(&self) -> Result<AdmissionPermit, DbError> {
        let started = Instant::now();

        let permit = tokio::time::timeout(self.max_wait, self.permits.clone().acquire_owned())
            .await
            .map_err(|_| {
                warn!(
                    max_wait_ms = self.max_wait.as_millis() as u64,
                    capacity = self.capacity,
                    "Admission deadline exceeded, rejecting request"
                );
                DbError::Overloaded(self.max_wait)
            })?
            // The semaphore is never closed
            .map_err(|_| DbError::Overloaded(self.max_wait))?;

        let waited = started.elapsed();
        if waited > Duration::from_millis(100) {
            debug!(waited_ms = waited.as_millis() as u64, "Admitted after queueing");
        }

        Ok(AdmissionPermit {
            _permit: permit,
            waited,
        })
    }

    /// Run `fut` once admitted
    ///
    /// # Errors
    /// Propagates the future's error, or the admission rejection converted into `E`
    pub async fn run<T, E, Fut>(&self, fut: Fut) -> Result<T, E>
    where
        Fut: std::future::Future<Output = Result<T, E>>,
        E: From<DbError>,
    {
        let _permit = self.admit().await?;
        fut.await
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Self::DEFAULT_MAX_WAIT)
    }
}

//! Optional concurrency control for extractions.
//!
//! Each extraction holds the whole inflated `word/document.xml` in memory, up to
//! `extraction.max_part_size` bytes, and the `body_xml` strategy writes a second copy of the
//! body next to it. With unlimited concurrency peak memory therefore grows with the number of
//! in-flight uploads. Setting `limits.extractions.max_concurrent` caps it at roughly
//! `max_concurrent * max_part_size` for the parsed input; [`ExtractionLimiter::memory_ceiling`]
//! reports that figure at startup.
//!
//! Extraction requests share no other state, so by default nothing here is active. Requests
//! that cannot get a slot within the bounded, time-limited queue receive HTTP 429.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::{ExtractionLimitsConfig, LimitsConfig};
use crate::errors::{Error, Result};

const BUSY: &str = "Too many documents being processed. Please retry later.";

/// Container for all resource limiters.
#[derive(Debug, Default, Clone)]
pub struct Limiters {
    /// Limiter for concurrent extractions. None means unlimited.
    pub extractions: Option<Arc<ExtractionLimiter>>,
}

impl Limiters {
    /// `max_part_size` is the per-extraction cap on the inflated document part.
    pub fn new(config: &LimitsConfig, max_part_size: u64) -> Self {
        Self {
            extractions: ExtractionLimiter::new(&config.extractions, max_part_size).map(Arc::new),
        }
    }
}

/// Bounded queue in front of a fixed number of extraction slots.
#[derive(Debug)]
pub struct ExtractionLimiter {
    semaphore: Arc<Semaphore>,
    slots: usize,
    max_part_size: u64,
    waiting: AtomicUsize,
    max_waiting: Option<usize>,
    max_wait: Duration,
}

impl ExtractionLimiter {
    /// Returns `None` when `max_concurrent` is 0 (unlimited).
    pub fn new(config: &ExtractionLimitsConfig, max_part_size: u64) -> Option<Self> {
        if config.max_concurrent == 0 {
            return None;
        }

        Some(Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            slots: config.max_concurrent,
            max_part_size,
            waiting: AtomicUsize::new(0),
            max_waiting: (config.max_waiting > 0).then_some(config.max_waiting),
            max_wait: Duration::from_secs(config.max_wait_secs),
        })
    }

    /// Upper bound, in bytes, on inflated document parts held by in-flight extractions.
    pub fn memory_ceiling(&self) -> u64 {
        (self.slots as u64).saturating_mul(self.max_part_size)
    }

    /// Wait for an extraction slot.
    ///
    /// Fails with [`Error::TooManyRequests`] when the queue is full or the wait times out.
    pub async fn acquire(&self) -> Result<ExtractionPermit> {
        if let Ok(permit) = self.semaphore.clone().try_acquire_owned() {
            return Ok(ExtractionPermit { _permit: permit });
        }

        let already_waiting = self.waiting.fetch_add(1, Ordering::SeqCst);
        if let Some(max_waiting) = self.max_waiting
            && already_waiting >= max_waiting
        {
            self.waiting.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(max_waiting, "Extraction queue full, rejecting request");
            return Err(Error::TooManyRequests {
                message: BUSY.to_string(),
            });
        }

        let result = if self.max_wait.is_zero() {
            self.semaphore
                .clone()
                .try_acquire_owned()
                .map(|permit| ExtractionPermit { _permit: permit })
                .map_err(|_| Error::TooManyRequests {
                    message: BUSY.to_string(),
                })
        } else {
            match tokio::time::timeout(self.max_wait, self.semaphore.clone().acquire_owned()).await {
                Ok(Ok(permit)) => Ok(ExtractionPermit { _permit: permit }),
                Ok(Err(_)) => Err(Error::TooManyRequests {
                    message: "Extraction service temporarily unavailable.".to_string(),
                }),
                Err(_) => Err(Error::TooManyRequests {
                    message: "Timed out waiting for an extraction slot. Please retry later.".to_string(),
                }),
            }
        };

        self.waiting.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Holds an extraction slot until dropped.
#[must_use]
pub struct ExtractionPermit {
    _permit: OwnedSemaphorePermit,
}

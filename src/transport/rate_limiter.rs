//! Sliding-window rate limiting for outbound requests.
//!
//! This module provides the [`RateLimiter`] struct which caps the number of
//! requests *initiated* in any rolling window (one second by default). Callers
//! beyond the ceiling wait and are released in arrival order as older requests
//! age out of the window.
//!
//! # Overview
//!
//! The limiter is global: every request made through the shared
//! [`HttpClient`](super::HttpClient) draws from the same window, regardless of
//! host. It bounds request *rate* only; it does not bound how many requests
//! are in flight at once.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use asset_preview::transport::RateLimiter;
//!
//! # async fn example() {
//! // At most 150 requests per rolling second
//! let limiter = Arc::new(RateLimiter::per_second(150));
//!
//! // Returns immediately while the window has room
//! limiter.acquire().await;
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::constants::{CUMULATIVE_DELAY_WARNING_THRESHOLD, RATE_LIMIT_WINDOW};

/// Sliding-window rate limiter shared by every outbound request.
///
/// Designed to be wrapped in `Arc` and shared across Tokio tasks. The
/// dispatch log is guarded by a `tokio::sync::Mutex`, whose waiters are woken
/// in FIFO order, so queued callers are released in the order they arrived.
///
/// # Thread Safety
///
/// `RateLimiter` is `Send + Sync`.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum number of requests initiated per window.
    max_requests: usize,

    /// Length of the rolling window.
    window: Duration,

    /// Whether rate limiting is disabled (for `--rate-limit 0`).
    disabled: bool,

    /// Dispatch times of requests still inside the window, oldest first.
    /// The lock is held while waiting so later callers queue behind earlier ones.
    dispatched: Mutex<VecDeque<Instant>>,

    /// Total time callers have spent waiting (in milliseconds).
    cumulative_delay_ms: AtomicU64,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` initiations per `window`.
    ///
    /// A `max_requests` of zero yields a disabled limiter.
    #[must_use]
    #[instrument(level = "debug")]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        if max_requests == 0 {
            return Self::disabled();
        }
        debug!(max_requests, "creating rate limiter");
        Self {
            max_requests,
            window,
            disabled: false,
            dispatched: Mutex::new(VecDeque::with_capacity(max_requests)),
            cumulative_delay_ms: AtomicU64::new(0),
        }
    }

    /// Creates a limiter allowing `requests_per_second` initiations in any
    /// rolling one-second window. Zero disables limiting.
    ///
    /// # Example
    ///
    /// ```
    /// use asset_preview::transport::RateLimiter;
    ///
    /// let limiter = RateLimiter::per_second(150);
    /// assert_eq!(limiter.max_requests(), 150);
    /// ```
    #[must_use]
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(
            usize::try_from(requests_per_second).unwrap_or(usize::MAX),
            RATE_LIMIT_WINDOW,
        )
    }

    /// Creates a disabled rate limiter that never delays.
    #[must_use]
    pub fn disabled() -> Self {
        debug!("creating disabled rate limiter");
        Self {
            max_requests: 0,
            window: Duration::ZERO,
            disabled: true,
            dispatched: Mutex::new(VecDeque::new()),
            cumulative_delay_ms: AtomicU64::new(0),
        }
    }

    /// Returns whether rate limiting is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the per-window request ceiling (0 when disabled).
    #[must_use]
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Returns the rolling window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the total time callers have waited on this limiter.
    #[must_use]
    pub fn cumulative_delay(&self) -> Duration {
        Duration::from_millis(self.cumulative_delay_ms.load(Ordering::SeqCst))
    }

    /// Waits until a request may be initiated, then records the dispatch.
    ///
    /// Returns immediately while fewer than `max_requests` dispatches fall
    /// inside the current window. Otherwise sleeps until the oldest dispatch
    /// leaves the window. Nothing is ever dropped; excess callers only wait.
    #[instrument(level = "trace", skip(self))]
    pub async fn acquire(&self) {
        if self.disabled {
            return;
        }

        let mut dispatched = self.dispatched.lock().await;
        let now = Instant::now();
        evict_expired(&mut dispatched, now, self.window);

        if dispatched.len() >= self.max_requests
            && let Some(&oldest) = dispatched.front()
        {
            let release_at = oldest + self.window;
            let delay = release_at.saturating_duration_since(now);
            let cumulative = self.add_cumulative_delay(delay);

            debug!(
                delay_ms = delay.as_millis(),
                queued_in_window = dispatched.len(),
                "rate limit reached, waiting for window"
            );

            if cumulative >= CUMULATIVE_DELAY_WARNING_THRESHOLD
                && cumulative.saturating_sub(delay) < CUMULATIVE_DELAY_WARNING_THRESHOLD
            {
                warn!(
                    cumulative_delay_secs = cumulative.as_secs(),
                    "excessive rate limiting - consider raising the requests-per-second ceiling"
                );
            }

            tokio::time::sleep_until(release_at).await;
            evict_expired(&mut dispatched, Instant::now(), self.window);
        }

        dispatched.push_back(Instant::now());
    }

    #[allow(clippy::cast_possible_truncation)]
    fn add_cumulative_delay(&self, delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as u64;
        let total = self
            .cumulative_delay_ms
            .fetch_add(delay_ms, Ordering::SeqCst)
            + delay_ms;
        Duration::from_millis(total)
    }
}

/// Drops dispatch records that are a full window or more in the past.
fn evict_expired(dispatched: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = dispatched.front() {
        if now.saturating_duration_since(oldest) >= window {
            dispatched.pop_front();
        } else {
            break;
        }
    }
}

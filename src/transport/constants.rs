//! Constants for the transport module (timeouts, rate limiting).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
///
/// Only the connect phase is bounded; requests and body streams have no timeout.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default ceiling on requests initiated per rolling window.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 150;

/// Length of the rolling rate limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(1);

/// Warning threshold for cumulative time spent waiting on the rate limiter.
pub const CUMULATIVE_DELAY_WARNING_THRESHOLD: Duration = Duration::from_secs(30);

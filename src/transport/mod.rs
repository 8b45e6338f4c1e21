//! Rate-limited HTTP transport shared by every outbound call.
//!
//! # Features
//!
//! - Global sliding-window rate limit (default 150 requests per second)
//! - FIFO release of queued requests
//! - Streaming response bodies to disk
//! - Connect timeout only; no request timeout and no retry
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use asset_preview::transport::{HttpClient, RateLimiter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(Arc::new(RateLimiter::per_second(150)))?;
//! let bytes = client
//!     .stream_to_file("https://example.com/thumb.png", Path::new("thumb.png"))
//!     .await?;
//! println!("wrote {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
pub mod rate_limiter;

pub use client::HttpClient;
pub use constants::DEFAULT_REQUESTS_PER_SECOND;
pub use error::TransportError;
pub use rate_limiter::RateLimiter;

//! Lap feed access
//!
//! The upstream feed is reached through a proxy collaborator that answers
//! with the feed's JSON body. [`LapFeed`] is the seam the refresh pipeline
//! depends on; [`HttpLapFeed`] is the production implementation.

pub mod client;

use crate::domain::FeedError;
use async_trait::async_trait;
use serde_json::Value;

pub use client::HttpLapFeed;

/// Something that can hand back the raw feed payload
#[async_trait]
pub trait LapFeed: Send + Sync {
    /// Fetch the raw payload; timeouts are reported as transport failures
    async fn fetch(&self) -> Result<Value, FeedError>;
}

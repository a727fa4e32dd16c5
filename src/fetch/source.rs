use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FeedError;

/// Where raw feed bytes come from.
///
/// The refresh loop only talks to this seam, so tests can script a source
/// instead of standing up an HTTP endpoint.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Bytes, FeedError>;
}

use crate::domain::model::{CopyRequest, ItemAttributes, ListingCopy, QueryAttributes, ScrapedListing};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Multimodal model: photo bytes in, item attributes out.
/// Fails with `AnalysisUnavailable` on network or quota errors.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze_image(&self, image: &[u8]) -> Result<ItemAttributes>;
}

/// Comparable search. An empty vec means "no results" and is not an error;
/// `ScrapeUnavailable` is reserved for total failure.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn search(&self, query: &QueryAttributes) -> Result<Vec<ScrapedListing>>;
}

/// Title and description writer. Fails with `GenerationUnavailable`.
#[async_trait]
pub trait CopyWriter: Send + Sync {
    async fn generate_copy(&self, request: &CopyRequest) -> Result<ListingCopy>;
}

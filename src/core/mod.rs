pub mod engine;
pub mod estimator;
pub mod normalizer;
pub mod stats;
pub mod text;

pub use crate::domain::model::{ComparableSample, PriceEstimate, QueryAttributes, ScrapedListing};
pub use crate::domain::ports::{CopyWriter, ListingSource, VisionAnalyzer};
pub use crate::utils::error::Result;

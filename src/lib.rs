pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::PricingConfig;
pub use core::{
    engine::ListingEngine,
    estimator::{estimate, EstimateParams},
    normalizer::normalize,
};
pub use domain::model::{
    ComparableSample, Condition, ConditionGrade, Confidence, CopyStyle, ListingDraft,
    MarketPosition, PriceEstimate, PriceRange, QueryAttributes, SaleSpeed, ScrapedListing,
};
pub use utils::error::{PricerError, Result};

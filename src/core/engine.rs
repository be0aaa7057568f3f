use crate::config::pricing::PricingConfig;
use crate::core::estimator::{estimate, EstimateParams};
use crate::core::normalizer::normalize;
use crate::domain::model::{
    Condition, Confidence, CopyRequest, ItemDetails, ListingDraft, PriceEstimate, QueryAttributes,
    SaleSpeed,
};
use crate::domain::ports::{CopyWriter, ListingSource, VisionAnalyzer};
use crate::utils::error::{PricerError, Result};
use std::time::Instant;

const VISION_WEIGHT: f64 = 0.4;
const PRICE_WEIGHT: f64 = 0.4;
const MARKET_DATA_WEIGHT: f64 = 0.2;
/// Comparable count at which market data counts as complete.
const FULL_MARKET_DATA: usize = 20;
/// Assumed when the vision collaborator reports no confidence.
const DEFAULT_VISION_CONFIDENCE: f64 = 0.5;

/// Blends vision certainty, pricing confidence and comparable count into a
/// single score in [0, 1], rounded to two decimals.
pub fn overall_confidence(vision: Option<f64>, price: Confidence, sample_size: usize) -> f64 {
    let vision = vision
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_VISION_CONFIDENCE);
    let market_data = (sample_size as f64 / FULL_MARKET_DATA as f64).min(1.0);

    let overall =
        vision * VISION_WEIGHT + price.score() * PRICE_WEIGHT + market_data * MARKET_DATA_WEIGHT;
    (overall * 100.0).round() / 100.0
}

/// Photo in, listing out: vision, comparable search, pricing, copy.
///
/// Holds no per-request state, so one engine can serve concurrent requests.
pub struct ListingEngine<V: VisionAnalyzer, S: ListingSource, W: CopyWriter> {
    vision: V,
    source: S,
    writer: W,
    config: PricingConfig,
}

impl<V: VisionAnalyzer, S: ListingSource, W: CopyWriter> ListingEngine<V, S, W> {
    pub fn new(vision: V, source: S, writer: W, config: PricingConfig) -> Self {
        Self {
            vision,
            source,
            writer,
            config,
        }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Prices an item without a photo.
    pub async fn price_check(
        &self,
        query: &QueryAttributes,
        condition: Condition,
        sale_speed: SaleSpeed,
    ) -> Result<PriceEstimate> {
        if !query.is_identifiable() {
            return Err(PricerError::InvalidQuery {
                message: "query needs at least a brand or an item type".to_string(),
            });
        }

        tracing::info!(
            "💰 Searching comparables for {} {}",
            query.brand().unwrap_or("-"),
            query.item_type().unwrap_or("-")
        );
        let listings = self.source.search(query).await?;
        tracing::info!("Found {} raw listings", listings.len());

        let sample = normalize(&listings, query, &self.config)?;
        let params = EstimateParams {
            condition,
            sale_speed,
            fallback_price: self.config.fallback.base_price_for(query.item_type()),
        };
        let estimate = estimate(&sample, &params, &self.config);

        tracing::info!(
            "📊 Recommended {} from {} comparables ({:?} confidence)",
            estimate.recommended_price,
            estimate.sample_size,
            estimate.confidence
        );
        Ok(estimate)
    }

    pub async fn create_listing(&self, image: &[u8], details: &ItemDetails) -> Result<ListingDraft> {
        let started = Instant::now();

        tracing::info!("🔍 Analyzing image ({} bytes)", image.len());
        let attributes = self.vision.analyze_image(image).await?;
        tracing::debug!("Vision attributes: {:?}", attributes);

        let query = QueryAttributes::for_item(&attributes, details);
        let estimate = self
            .price_check(&query, details.condition, details.sale_speed)
            .await?;

        tracing::info!("✍️ Generating listing copy");
        let copy = self
            .writer
            .generate_copy(&CopyRequest {
                attributes: attributes.clone(),
                size: details.size.clone(),
                condition: details.condition,
                price: estimate.recommended_price,
                style: details.style,
            })
            .await?;

        let confidence_score =
            overall_confidence(attributes.confidence, estimate.confidence, estimate.sample_size);
        tracing::info!(
            "✅ Listing ready in {:?} (confidence {:.2})",
            started.elapsed(),
            confidence_score
        );

        Ok(ListingDraft {
            title: copy.title,
            description: copy.description,
            price: estimate.recommended_price,
            size: details.size.clone(),
            condition: details.condition,
            attributes,
            estimate,
            confidence_score,
        })
    }
}

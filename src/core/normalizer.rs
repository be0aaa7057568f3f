use crate::config::pricing::{OutlierConfig, PricingConfig};
use crate::core::stats;
use crate::core::text::{map_condition, normalize_size, parse_price, relevance_tokens, title_matches};
use crate::domain::model::{
    Comparable, ComparableSample, Condition, QueryAttributes, ScrapedListing, SizeToken,
};
use crate::utils::error::{PricerError, Result};

/// Why listings were left out of a sample. Only used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub unparseable_price: usize,
    pub unsold: usize,
    pub irrelevant: usize,
    pub outliers: usize,
}

/// Turns raw search results into a comparable sample.
///
/// Malformed listings are dropped, never reported as errors. The only failure
/// is a query with neither brand nor type, since nothing could be filtered on.
pub fn normalize(
    raw_listings: &[ScrapedListing],
    query: &QueryAttributes,
    config: &PricingConfig,
) -> Result<ComparableSample> {
    let (sample, drops) = normalize_with_counts(raw_listings, query, config)?;

    tracing::debug!(
        "Normalized {} raw listings into {} comparables (unparseable: {}, unsold: {}, irrelevant: {}, outliers: {})",
        raw_listings.len(),
        sample.len(),
        drops.unparseable_price,
        drops.unsold,
        drops.irrelevant,
        drops.outliers
    );

    Ok(sample)
}

pub fn normalize_with_counts(
    raw_listings: &[ScrapedListing],
    query: &QueryAttributes,
    config: &PricingConfig,
) -> Result<(ComparableSample, DropCounts)> {
    if !query.is_identifiable() {
        return Err(PricerError::InvalidQuery {
            message: "query needs at least a brand or an item type".to_string(),
        });
    }

    let tokens = relevance_tokens(query.brand(), query.item_type());
    let query_size = query
        .size
        .as_deref()
        .map(normalize_size)
        .unwrap_or(SizeToken::Unknown);

    let mut drops = DropCounts::default();
    let mut comparables = Vec::with_capacity(raw_listings.len());

    for listing in raw_listings {
        let Some(price) = listing.price.as_ref().and_then(parse_price) else {
            drops.unparseable_price += 1;
            continue;
        };

        if config.filter.require_sold && listing.sold == Some(false) {
            drops.unsold += 1;
            continue;
        }

        if !title_matches(&listing.title, &tokens) {
            drops.irrelevant += 1;
            continue;
        }

        let condition = listing
            .condition
            .as_deref()
            .map(map_condition)
            .unwrap_or(Condition::Unknown);
        let size_match = listing
            .size
            .as_deref()
            .map(normalize_size)
            .is_some_and(|size| size.matches(&query_size));

        comparables.push(Comparable {
            price,
            condition,
            size_match,
        });
    }

    let before_trim = comparables.len();
    let comparables = trim_outliers(comparables, &config.outliers);
    drops.outliers = before_trim - comparables.len();

    Ok((ComparableSample::new(comparables), drops))
}

/// Drops prices outside the Tukey fences. Samples smaller than
/// `min_sample` are returned untouched.
pub fn trim_outliers(comparables: Vec<Comparable>, config: &OutlierConfig) -> Vec<Comparable> {
    if comparables.len() < config.min_sample {
        return comparables;
    }

    let prices: Vec<f64> = comparables.iter().map(|c| c.price).collect();
    let sorted = stats::sorted(&prices);
    let Some((low, high)) = stats::iqr_fences(&sorted, config.iqr_multiplier) else {
        return comparables;
    };

    comparables
        .into_iter()
        .filter(|c| c.price >= low && c.price <= high)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ConditionGrade;

    fn nike_felpa() -> QueryAttributes {
        QueryAttributes::new(Some("Nike"), Some("Felpa")).with_size("M")
    }

    #[test]
    fn test_rejects_query_without_brand_or_type() {
        let err = normalize(&[], &QueryAttributes::default(), &PricingConfig::default()).unwrap_err();
        assert!(matches!(err, PricerError::InvalidQuery { .. }));
    }

    #[test]
    fn test_empty_input_is_empty_sample() {
        let sample = normalize(&[], &nike_felpa(), &PricingConfig::default()).unwrap();
        assert!(sample.is_empty());
    }

    #[test]
    fn test_drops_unparseable_and_irrelevant() {
        let listings = vec![
            ScrapedListing::new("Felpa Nike grigia", "15€"),
            ScrapedListing::new("Felpa Nike nera", "gratis"),
            ScrapedListing {
                title: "Felpa Nike blu".to_string(),
                price: None,
                ..Default::default()
            },
            ScrapedListing::new("Pantaloni cargo", "20€"),
        ];

        let (sample, drops) =
            normalize_with_counts(&listings, &nike_felpa(), &PricingConfig::default()).unwrap();

        assert_eq!(sample.prices(), vec![15.0]);
        assert_eq!(drops.unparseable_price, 2);
        assert_eq!(drops.irrelevant, 1);
        assert_eq!(drops.outliers, 0);
    }

    #[test]
    fn test_maps_condition_and_size() {
        let listings = vec![
            ScrapedListing::new("Nike hoodie", 20.0)
                .with_condition("very_good")
                .with_size("Taglia M"),
            ScrapedListing::new("Nike hoodie", 18.0)
                .with_condition("mystery")
                .with_size("L"),
            ScrapedListing::new("Nike hoodie", 19.0),
        ];

        let sample = normalize(&listings, &nike_felpa(), &PricingConfig::default()).unwrap();
        let comparables: Vec<&Comparable> = sample.iter().collect();

        assert_eq!(comparables.len(), 3);
        assert_eq!(comparables[0].condition, Condition::Known(ConditionGrade::LikeNew));
        assert!(comparables[0].size_match);
        assert_eq!(comparables[1].condition, Condition::Unknown);
        assert!(!comparables[1].size_match);
        assert!(!comparables[2].size_match);
        assert_eq!(sample.size_matched(), 1);
    }

    #[test]
    fn test_unknown_query_size_never_matches() {
        let query = QueryAttributes::new(Some("Nike"), None);
        let listings = vec![ScrapedListing::new("Nike tee", 10.0).with_size("M")];

        let sample = normalize(&listings, &query, &PricingConfig::default()).unwrap();
        assert_eq!(sample.size_matched(), 0);
    }

    #[test]
    fn test_outlier_trim_needs_min_sample() {
        let three = vec![
            ScrapedListing::new("Nike felpa", 12.0),
            ScrapedListing::new("Nike felpa", 13.0),
            ScrapedListing::new("Nike felpa", 1000.0),
        ];
        let sample = normalize(&three, &nike_felpa(), &PricingConfig::default()).unwrap();
        assert_eq!(sample.len(), 3);

        let mut four = three.clone();
        four.push(ScrapedListing::new("Nike felpa", 14.0));
        let sample = normalize(&four, &nike_felpa(), &PricingConfig::default()).unwrap();
        assert_eq!(sample.len(), 3);
        assert!(!sample.prices().contains(&1000.0));
    }

    #[test]
    fn test_require_sold_filter() {
        let listings = vec![
            ScrapedListing::new("Nike felpa", 12.0).with_sold(true),
            ScrapedListing::new("Nike felpa", 13.0).with_sold(false),
            ScrapedListing::new("Nike felpa", 14.0),
        ];

        let mut config = PricingConfig::default();
        let sample = normalize(&listings, &nike_felpa(), &config).unwrap();
        assert_eq!(sample.len(), 3);

        config.filter.require_sold = true;
        let (sample, drops) = normalize_with_counts(&listings, &nike_felpa(), &config).unwrap();
        assert_eq!(sample.prices(), vec![12.0, 14.0]);
        assert_eq!(drops.unsold, 1);
    }

    #[test]
    fn test_trim_outliers_keeps_tight_cluster() {
        let comparables: Vec<Comparable> = [15.0, 15.0, 15.0, 15.0, 10_000.0]
            .iter()
            .map(|&price| Comparable {
                price,
                condition: Condition::Unknown,
                size_match: false,
            })
            .collect();

        let kept = trim_outliers(comparables, &OutlierConfig::default());
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|c| c.price == 15.0));
    }
}

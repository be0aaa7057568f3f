use crate::config::pricing::PricingConfig;
use crate::core::stats;
use crate::domain::model::{
    is_plausible_price, ComparableSample, Condition, ConditionGrade, Confidence, MarketPosition,
    PriceDistribution, PriceEstimate, PriceRange, SaleSpeed,
};

/// Per-request inputs to [`estimate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateParams {
    /// Condition of the item being listed.
    pub condition: Condition,
    pub sale_speed: SaleSpeed,
    /// Category base price, used as-is when the sample is empty.
    pub fallback_price: f64,
}

impl EstimateParams {
    pub fn new(condition: impl Into<Condition>, fallback_price: f64) -> Self {
        Self {
            condition: condition.into(),
            sale_speed: SaleSpeed::Normal,
            fallback_price,
        }
    }

    pub fn with_sale_speed(mut self, sale_speed: SaleSpeed) -> Self {
        self.sale_speed = sale_speed;
        self
    }
}

/// Recommends a price from a normalized sample. Total: every input, empty
/// and single-element samples included, yields a positive estimate whose
/// range contains the recommended price.
pub fn estimate(
    sample: &ComparableSample,
    params: &EstimateParams,
    config: &PricingConfig,
) -> PriceEstimate {
    let sorted = stats::sorted(&sample.prices());
    let (Some(median), Some((q1, q3))) = (stats::median(&sorted), stats::quartiles(&sorted)) else {
        return fallback_estimate(params.fallback_price, config);
    };

    let adjustment = condition_adjustment(sample, params.condition, config)
        * config.sale_speed.multiplier(params.sale_speed);
    if !(q3 * adjustment * 100.0).is_finite() || adjustment <= 0.0 {
        tracing::warn!(
            "Adjustment {} pushes prices out of range, falling back to base price",
            adjustment
        );
        return fallback_estimate(params.fallback_price, config);
    }

    let whole_units = sample.has_whole_prices();
    let unit = if whole_units { 1.0 } else { 0.1 };
    let recommended_price = round_to_granularity(median * adjustment, whole_units).max(unit);

    let price_range = percentile_range(q1 * adjustment, q3 * adjustment, recommended_price, config);
    let distribution = distribution(&sorted, median, q1, q3);
    let confidence = confidence(sample.len(), &sorted, config);
    let market_position = market_position(recommended_price, q1, q3);

    tracing::debug!(
        "Estimated {} from {} comparables (median {:.2}, adjustment {:.3}, {} size matches)",
        recommended_price,
        sample.len(),
        median,
        adjustment,
        sample.size_matched()
    );

    PriceEstimate {
        recommended_price,
        price_range,
        confidence,
        sample_size: sample.len(),
        market_position,
        summary: summary(sample.len(), &distribution, market_position),
        distribution: Some(distribution),
    }
}

fn fallback_estimate(fallback_price: f64, config: &PricingConfig) -> PriceEstimate {
    let base = if is_plausible_price(fallback_price) {
        fallback_price
    } else {
        config.fallback.default_price
    };
    let recommended_price = stats::round_to_cents(base);
    let spread = config.range.fallback_spread;

    tracing::debug!("No comparables left, falling back to base price {}", recommended_price);

    PriceEstimate {
        recommended_price,
        price_range: PriceRange {
            low: stats::round_to_cents(recommended_price * (1.0 - spread)).min(recommended_price),
            high: stats::round_to_cents(recommended_price * (1.0 + spread)).max(recommended_price),
        },
        confidence: Confidence::Low,
        sample_size: 0,
        market_position: MarketPosition::Average,
        distribution: None,
        summary: format!(
            "No comparable listings were usable. Priced from the {}€ base price.",
            recommended_price
        ),
    }
}

/// Factor of the listed item's condition over the factor at the sample's
/// average condition rank. Samples with no known condition count as `good`.
pub fn condition_adjustment(
    sample: &ComparableSample,
    condition: Condition,
    config: &PricingConfig,
) -> f64 {
    let Condition::Known(grade) = condition else {
        return 1.0;
    };
    let factors = &config.condition_factors;
    let baseline_rank = sample
        .average_condition_rank()
        .unwrap_or(ConditionGrade::Good.rank() as f64);

    let baseline = factors.factor_at_rank(baseline_rank);
    if baseline <= 0.0 {
        return 1.0;
    }
    factors.factor(grade) / baseline
}

/// Whole units when every observed price was whole, otherwise one decimal.
fn round_to_granularity(value: f64, whole_units: bool) -> f64 {
    if whole_units {
        value.round()
    } else {
        (value * 10.0).round() / 10.0
    }
}

fn percentile_range(low: f64, high: f64, recommended: f64, config: &PricingConfig) -> PriceRange {
    let mut low = stats::round_to_cents(low);
    let mut high = stats::round_to_cents(high);

    if high - low < 0.005 {
        let widening = config.range.single_point_widening;
        low = stats::round_to_cents(recommended * (1.0 - widening));
        high = stats::round_to_cents(recommended * (1.0 + widening));
    }

    PriceRange {
        low: low.min(recommended),
        high: high.max(recommended),
    }
}

fn confidence(sample_size: usize, prices: &[f64], config: &PricingConfig) -> Confidence {
    let thresholds = &config.confidence;
    let cv = stats::coefficient_of_variation(prices);

    if sample_size >= thresholds.high_min_sample
        && cv.is_some_and(|cv| cv < thresholds.high_max_cv)
    {
        Confidence::High
    } else if sample_size >= thresholds.medium_min_sample {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn market_position(recommended: f64, q1: f64, q3: f64) -> MarketPosition {
    if recommended <= q1 {
        MarketPosition::Low
    } else if recommended >= q3 {
        MarketPosition::High
    } else {
        MarketPosition::Average
    }
}

fn summary(sample_size: usize, distribution: &PriceDistribution, position: MarketPosition) -> String {
    format!(
        "Analyzed {} comparable listings. Average market price: {}€. The recommended price is {}. Price spread: ±{}€.",
        sample_size,
        distribution.mean,
        position.describe(),
        distribution.std_dev
    )
}

fn distribution(sorted: &[f64], median: f64, q1: f64, q3: f64) -> PriceDistribution {
    let min = sorted.first().copied().unwrap_or(median);
    let max = sorted.last().copied().unwrap_or(median);
    PriceDistribution {
        min,
        max,
        mean: stats::round_to_cents(stats::mean(sorted).unwrap_or(median)),
        median: stats::round_to_cents(median),
        std_dev: stats::round_to_cents(stats::std_dev(sorted)),
        q1: stats::round_to_cents(q1),
        q3: stats::round_to_cents(q3),
    }
}

use crate::core::text::canonical_item_type;
use crate::domain::model::{ConditionGrade, SaleSpeed};
use crate::utils::error::{PricerError, Result};
use crate::utils::validation::{
    validate_positive_amount, validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Every pricing policy knob. Passed explicitly to `normalize` and `estimate`;
/// there is no global instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub outliers: OutlierConfig,
    pub condition_factors: ConditionFactors,
    pub sale_speed: SaleSpeedMultipliers,
    pub confidence: ConfidenceConfig,
    pub range: RangeConfig,
    pub fallback: FallbackConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub iqr_multiplier: f64,
    /// Below this many prices the IQR is too unstable to trim on.
    pub min_sample: usize,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            min_sample: 4,
        }
    }
}

/// Price multipliers per condition grade, relative to `good`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionFactors {
    pub new: f64,
    pub like_new: f64,
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Default for ConditionFactors {
    fn default() -> Self {
        Self {
            new: 1.15,
            like_new: 1.05,
            good: 1.0,
            fair: 0.9,
            poor: 0.8,
        }
    }
}

impl ConditionFactors {
    pub fn factor(&self, grade: ConditionGrade) -> f64 {
        match grade {
            ConditionGrade::New => self.new,
            ConditionGrade::LikeNew => self.like_new,
            ConditionGrade::Good => self.good,
            ConditionGrade::Fair => self.fair,
            ConditionGrade::Poor => self.poor,
        }
    }

    /// Linear interpolation for fractional ranks such as a sample average.
    pub fn factor_at_rank(&self, rank: f64) -> f64 {
        let max_rank = ConditionGrade::New.rank() as f64;
        let rank = if rank.is_finite() {
            rank.clamp(0.0, max_rank)
        } else {
            ConditionGrade::Good.rank() as f64
        };
        let lower = ConditionGrade::ALL[rank.floor() as usize];
        let upper = ConditionGrade::ALL[rank.ceil() as usize];
        let weight = rank - rank.floor();
        self.factor(lower) + (self.factor(upper) - self.factor(lower)) * weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleSpeedMultipliers {
    pub fast: f64,
    pub normal: f64,
    pub premium: f64,
}

impl Default for SaleSpeedMultipliers {
    fn default() -> Self {
        Self {
            fast: 0.85,
            normal: 1.0,
            premium: 1.15,
        }
    }
}

impl SaleSpeedMultipliers {
    pub fn multiplier(&self, speed: SaleSpeed) -> f64 {
        match speed {
            SaleSpeed::Fast => self.fast,
            SaleSpeed::Normal => self.normal,
            SaleSpeed::Premium => self.premium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub high_min_sample: usize,
    /// Coefficient of variation must stay strictly below this for `high`.
    pub high_max_cv: f64,
    pub medium_min_sample: usize,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            high_min_sample: 8,
            high_max_cv: 0.3,
            medium_min_sample: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Half-width applied when the percentile band collapses to a point.
    pub single_point_widening: f64,
    /// Half-width of the band around a fallback price.
    pub fallback_spread: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            single_point_widening: 0.15,
            fallback_spread: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub default_price: f64,
    /// Base price per canonical item type, used when no comparables survive.
    pub category_prices: HashMap<String, f64>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        let category_prices = [
            ("felpa", 20.0),
            ("t-shirt", 12.0),
            ("jeans", 30.0),
            ("scarpe", 40.0),
            ("giacca", 35.0),
            ("camicia", 15.0),
        ]
        .into_iter()
        .map(|(name, price)| (name.to_string(), price))
        .collect();

        Self {
            default_price: 15.0,
            category_prices,
        }
    }
}

impl FallbackConfig {
    pub fn base_price_for(&self, item_type: Option<&str>) -> f64 {
        item_type
            .map(canonical_item_type)
            .and_then(|name| self.category_prices.get(&name).copied())
            .filter(|price| price.is_finite() && *price > 0.0)
            .unwrap_or(self.default_price)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Drop comparables explicitly marked as unsold.
    pub require_sold: bool,
}

impl PricingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PricerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PricerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        lazy_static::lazy_static! {
            static ref ENV_VAR_RE: regex::Regex = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
        }

        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_positive_amount("outliers.iqr_multiplier", self.outliers.iqr_multiplier)?;
        validate_positive_number("outliers.min_sample", self.outliers.min_sample, 1)?;

        let factors = &self.condition_factors;
        for grade in ConditionGrade::ALL {
            validate_positive_amount(
                &format!("condition_factors.{}", grade.as_str().replace('-', "_")),
                factors.factor(grade),
            )?;
        }
        let monotonic = ConditionGrade::ALL
            .windows(2)
            .all(|pair| factors.factor(pair[0]) <= factors.factor(pair[1]));
        if !monotonic {
            return Err(PricerError::InvalidConfigValueError {
                field: "condition_factors".to_string(),
                value: format!("{:?}", factors),
                reason: "Factors must not decrease from poor to new".to_string(),
            });
        }

        validate_positive_amount("sale_speed.fast", self.sale_speed.fast)?;
        validate_positive_amount("sale_speed.normal", self.sale_speed.normal)?;
        validate_positive_amount("sale_speed.premium", self.sale_speed.premium)?;

        validate_positive_number(
            "confidence.medium_min_sample",
            self.confidence.medium_min_sample,
            1,
        )?;
        validate_positive_number(
            "confidence.high_min_sample",
            self.confidence.high_min_sample,
            self.confidence.medium_min_sample,
        )?;
        validate_positive_amount("confidence.high_max_cv", self.confidence.high_max_cv)?;

        validate_range(
            "range.single_point_widening",
            self.range.single_point_widening,
            0.0,
            0.99,
        )?;
        validate_range("range.fallback_spread", self.range.fallback_spread, 0.0, 0.99)?;

        validate_positive_amount("fallback.default_price", self.fallback.default_price)?;
        for (category, price) in &self.fallback.category_prices {
            validate_positive_amount(&format!("fallback.category_prices.{}", category), *price)?;
        }

        Ok(())
    }
}

impl Validate for PricingConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

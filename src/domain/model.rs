use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Price field as it arrives from the scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
    /// Marketplace API shape: `{"amount": "12.0", "currency_code": "EUR"}`
    Amount {
        amount: Box<RawPrice>,
        #[serde(default)]
        currency_code: Option<String>,
    },
}

impl From<&str> for RawPrice {
    fn from(value: &str) -> Self {
        RawPrice::Text(value.to_string())
    }
}

impl From<f64> for RawPrice {
    fn from(value: f64) -> Self {
        RawPrice::Number(value)
    }
}

/// One comparable listing returned by a search. Nothing in it is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedListing {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sold: Option<bool>,
}

impl ScrapedListing {
    pub fn new(title: impl Into<String>, price: impl Into<RawPrice>) -> Self {
        Self {
            title: title.into(),
            price: Some(price.into()),
            ..Default::default()
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_sold(mut self, sold: bool) -> Self {
        self.sold = Some(sold);
        self
    }
}

/// The attributes a comparable search was built from, shared by every listing it returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryAttributes {
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
}

impl QueryAttributes {
    pub fn new(brand: Option<&str>, item_type: Option<&str>) -> Self {
        Self {
            brand: brand.map(str::to_string),
            item_type: item_type.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Builds the search query for an item the vision collaborator described.
    pub fn for_item(attributes: &ItemAttributes, details: &ItemDetails) -> Self {
        Self {
            brand: attributes.brand.clone(),
            item_type: Some(attributes.item_type.clone()),
            color: attributes.color.clone(),
            material: attributes.material.clone(),
            size: Some(details.size.clone()),
            condition: Some(details.condition.to_string()),
        }
    }

    pub fn brand(&self) -> Option<&str> {
        non_blank(self.brand.as_deref())
    }

    pub fn item_type(&self) -> Option<&str> {
        non_blank(self.item_type.as_deref())
    }

    pub fn is_identifiable(&self) -> bool {
        self.brand().is_some() || self.item_type().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Ordered condition grades, worst first so `Ord` follows quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionGrade {
    Poor,
    Fair,
    Good,
    LikeNew,
    New,
}

impl ConditionGrade {
    pub const ALL: [ConditionGrade; 5] = [
        ConditionGrade::Poor,
        ConditionGrade::Fair,
        ConditionGrade::Good,
        ConditionGrade::LikeNew,
        ConditionGrade::New,
    ];

    /// poor = 0 ... new = 4
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionGrade::Poor => "poor",
            ConditionGrade::Fair => "fair",
            ConditionGrade::Good => "good",
            ConditionGrade::LikeNew => "like-new",
            ConditionGrade::New => "new",
        }
    }
}

impl fmt::Display for ConditionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition after mapping free text through the label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Condition {
    Known(ConditionGrade),
    #[default]
    Unknown,
}

impl Condition {
    pub fn grade(self) -> Option<ConditionGrade> {
        match self {
            Condition::Known(grade) => Some(grade),
            Condition::Unknown => None,
        }
    }

    pub fn rank(self) -> Option<u8> {
        self.grade().map(ConditionGrade::rank)
    }
}

impl From<ConditionGrade> for Condition {
    fn from(grade: ConditionGrade) -> Self {
        Condition::Known(grade)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Known(grade) => f.write_str(grade.as_str()),
            Condition::Unknown => f.write_str("unknown"),
        }
    }
}

impl FromStr for Condition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(crate::core::text::map_condition(s))
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(crate::core::text::map_condition(&label))
    }
}

/// Canonical size token, or `Unknown` when the text could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SizeToken {
    Known(String),
    Unknown,
}

impl SizeToken {
    /// Unknown never matches anything, itself included.
    pub fn matches(&self, other: &SizeToken) -> bool {
        match (self, other) {
            (SizeToken::Known(a), SizeToken::Known(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeToken::Known(token) => f.write_str(token),
            SizeToken::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparable {
    pub price: f64,
    pub condition: Condition,
    pub size_match: bool,
}

/// Highest price a single comparable may carry. Anything above it is a
/// scraping error, and the cap keeps every adjusted figure finite.
pub const MAX_LISTING_PRICE: f64 = 1_000_000.0;

pub fn is_plausible_price(price: f64) -> bool {
    price.is_finite() && price > 0.0 && price <= MAX_LISTING_PRICE
}

/// Cleaned comparables for one pricing request. Every price is positive and
/// at most [`MAX_LISTING_PRICE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparableSample {
    comparables: Vec<Comparable>,
}

impl ComparableSample {
    pub fn new(comparables: Vec<Comparable>) -> Self {
        let comparables = comparables
            .into_iter()
            .filter(|c| is_plausible_price(c.price))
            .collect();
        Self { comparables }
    }

    pub fn from_prices(prices: &[f64]) -> Self {
        Self::new(
            prices
                .iter()
                .map(|&price| Comparable {
                    price,
                    condition: Condition::Unknown,
                    size_match: false,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.comparables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comparable> {
        self.comparables.iter()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.comparables.iter().map(|c| c.price).collect()
    }

    /// True when every observed price is a whole currency unit.
    pub fn has_whole_prices(&self) -> bool {
        self.comparables.iter().all(|c| c.price.fract() == 0.0)
    }

    /// Mean rank over comparables with a known condition.
    pub fn average_condition_rank(&self) -> Option<f64> {
        let ranks: Vec<f64> = self
            .comparables
            .iter()
            .filter_map(|c| c.condition.rank())
            .map(f64::from)
            .collect();
        if ranks.is_empty() {
            None
        } else {
            Some(ranks.iter().sum::<f64>() / ranks.len() as f64)
        }
    }

    pub fn size_matched(&self) -> usize {
        self.comparables.iter().filter(|c| c.size_match).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Numeric weight used when blending with other confidence sources.
    pub fn score(self) -> f64 {
        match self {
            Confidence::Low => 0.4,
            Confidence::Medium => 0.6,
            Confidence::High => 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SaleSpeed {
    /// Undercut the market to sell quickly.
    Fast,
    #[default]
    Normal,
    /// Ask above the market and wait.
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketPosition {
    Low,
    Average,
    High,
}

impl MarketPosition {
    pub fn describe(self) -> &'static str {
        match self {
            MarketPosition::Low => "competitive",
            MarketPosition::Average => "in line with the market",
            MarketPosition::High => "premium",
        }
    }
}

/// Tone of the generated listing description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CopyStyle {
    #[default]
    Friendly,
    Professional,
    Trendy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDistribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub recommended_price: f64,
    pub price_range: PriceRange,
    pub confidence: Confidence,
    pub sample_size: usize,
    pub market_position: MarketPosition,
    pub distribution: Option<PriceDistribution>,
    /// One-paragraph explanation for the seller.
    #[serde(default)]
    pub summary: String,
}

impl PriceEstimate {
    pub fn is_fallback(&self) -> bool {
        self.sample_size == 0
    }
}

impl fmt::Display for PriceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (range {} - {}, {:?} confidence, {} comparables)",
            self.recommended_price,
            self.price_range.low,
            self.price_range.high,
            self.confidence,
            self.sample_size
        )
    }
}

/// What the vision collaborator could tell about the photo. Only the type is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAttributes {
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    pub color: Option<String>,
    pub material: Option<String>,
    /// How sure the analyzer is, in [0, 1]. `None` when it does not say.
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Metadata the seller supplies alongside the photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub size: String,
    pub condition: Condition,
    #[serde(default)]
    pub sale_speed: SaleSpeed,
    #[serde(default)]
    pub style: CopyStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyRequest {
    pub attributes: ItemAttributes,
    pub size: String,
    pub condition: Condition,
    pub price: f64,
    #[serde(default)]
    pub style: CopyStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingCopy {
    pub title: String,
    pub description: String,
}

/// A listing ready to publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub size: String,
    pub condition: Condition,
    pub attributes: ItemAttributes,
    pub estimate: PriceEstimate,
    /// Vision and pricing confidence blended into [0, 1].
    pub confidence_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_price_deserializes_all_shapes() {
        let listings: Vec<ScrapedListing> = serde_json::from_str(
            r#"[
                {"title": "a", "price": 12.5},
                {"title": "b", "price": "14€"},
                {"title": "c", "price": {"amount": "13.0", "currency_code": "EUR"}},
                {"title": "d"}
            ]"#,
        )
        .unwrap();

        assert_eq!(listings[0].price, Some(RawPrice::Number(12.5)));
        assert_eq!(listings[1].price, Some(RawPrice::Text("14€".to_string())));
        assert!(matches!(listings[2].price, Some(RawPrice::Amount { .. })));
        assert_eq!(listings[3].price, None);
    }

    #[test]
    fn test_query_identifiable() {
        assert!(QueryAttributes::new(Some("Nike"), None).is_identifiable());
        assert!(QueryAttributes::new(None, Some("felpa")).is_identifiable());
        assert!(!QueryAttributes::new(Some("  "), None).is_identifiable());
        assert!(!QueryAttributes::default().is_identifiable());
    }

    #[test]
    fn test_condition_ordering_and_serde() {
        assert!(ConditionGrade::New > ConditionGrade::Poor);
        assert_eq!(ConditionGrade::LikeNew.rank(), 3);

        let json = serde_json::to_string(&Condition::Known(ConditionGrade::LikeNew)).unwrap();
        assert_eq!(json, "\"like-new\"");
        let parsed: Condition = serde_json::from_str("\"Ottimo\"").unwrap();
        assert_eq!(parsed, Condition::Known(ConditionGrade::LikeNew));
        let unknown: Condition = serde_json::from_str("\"???\"").unwrap();
        assert_eq!(unknown, Condition::Unknown);
    }

    #[test]
    fn test_unknown_size_never_matches() {
        let m = SizeToken::Known("M".to_string());
        assert!(m.matches(&SizeToken::Known("M".to_string())));
        assert!(!m.matches(&SizeToken::Unknown));
        assert!(!SizeToken::Unknown.matches(&SizeToken::Unknown));
    }

    #[test]
    fn test_sample_drops_non_positive_prices() {
        let sample = ComparableSample::from_prices(&[10.0, 0.0, -3.0, f64::INFINITY, 12.0]);
        assert_eq!(sample.len(), 2);
        assert!(sample.has_whole_prices());
        assert_eq!(sample.average_condition_rank(), None);
    }
}

use listing_pricer::{
    estimate, normalize, ComparableSample, ConditionGrade, Confidence, EstimateParams,
    PricingConfig, QueryAttributes, SaleSpeed, ScrapedListing,
};

fn nike_felpa() -> QueryAttributes {
    QueryAttributes::new(Some("Nike"), Some("Felpa"))
}

fn felpe(prices: &[f64]) -> Vec<ScrapedListing> {
    prices
        .iter()
        .map(|price| ScrapedListing::new("Felpa Nike grigia", *price))
        .collect()
}

fn price_for(sample: &ComparableSample, grade: ConditionGrade, speed: SaleSpeed) -> f64 {
    let params = EstimateParams::new(grade, 15.0).with_sale_speed(speed);
    estimate(sample, &params, &PricingConfig::default()).recommended_price
}

#[test]
fn test_mixed_price_formats_end_to_end() {
    let raw = vec![
        ScrapedListing::new("Nike felpa grigia", "12,50€"),
        ScrapedListing::new("Felpa Nike vintage", "14€"),
        ScrapedListing::new("Hoodie Nike", "bad"),
        ScrapedListing::new("Nike hoodie M", "13€"),
        ScrapedListing::new("Felpa Nike autografata", "1000€"),
    ];
    let config = PricingConfig::default();

    let sample = normalize(&raw, &nike_felpa(), &config).unwrap();
    assert_eq!(sample.len(), 3);
    assert_eq!(sample.prices(), vec![12.5, 14.0, 13.0]);

    let params = EstimateParams::new(ConditionGrade::Good, 15.0);
    let result = estimate(&sample, &params, &config);

    assert_eq!(result.sample_size, 3);
    assert_eq!(result.recommended_price, 13.0);
    assert_eq!(result.price_range.low, 12.75);
    assert_eq!(result.price_range.high, 13.5);
    assert_eq!(result.confidence, Confidence::Medium);
    assert!(result.distribution.is_some());
}

#[test]
fn test_estimate_is_deterministic() {
    let raw = felpe(&[18.0, 22.0, 19.5, 25.0, 21.0, 20.0]);
    let config = PricingConfig::default();
    let params = EstimateParams::new(ConditionGrade::LikeNew, 15.0).with_sale_speed(SaleSpeed::Fast);

    let first = estimate(&normalize(&raw, &nike_felpa(), &config).unwrap(), &params, &config);
    let second = estimate(&normalize(&raw, &nike_felpa(), &config).unwrap(), &params, &config);

    assert_eq!(first, second);
}

#[test]
fn test_single_outlier_does_not_move_price() {
    let config = PricingConfig::default();
    let params = EstimateParams::new(ConditionGrade::Good, 15.0);

    let clean = normalize(&felpe(&[20.0, 21.0, 22.0, 23.0, 24.0, 25.0]), &nike_felpa(), &config).unwrap();
    let noisy = normalize(
        &felpe(&[20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 500.0]),
        &nike_felpa(),
        &config,
    )
    .unwrap();

    assert_eq!(noisy.len(), 6);
    assert_eq!(
        estimate(&clean, &params, &config).recommended_price,
        estimate(&noisy, &params, &config).recommended_price
    );
}

#[test]
fn test_no_relevant_listings_falls_back() {
    let raw = vec![
        ScrapedListing::new("Jeans Levi's 501", 30.0),
        ScrapedListing::new("Scarpe Adidas", 40.0),
    ];
    let config = PricingConfig::default();

    let sample = normalize(&raw, &nike_felpa(), &config).unwrap();
    assert!(sample.is_empty());

    let result = estimate(&sample, &EstimateParams::new(ConditionGrade::Good, 20.0), &config);
    assert!(result.is_fallback());
    assert_eq!(result.recommended_price, 20.0);
    assert_eq!(result.price_range.low, 16.0);
    assert_eq!(result.price_range.high, 24.0);
    assert_eq!(result.confidence, Confidence::Low);
}

#[test]
fn test_better_condition_never_prices_lower() {
    let sample = ComparableSample::from_prices(&[10.0, 12.0, 14.0, 16.0, 18.0]);

    let mut previous = 0.0;
    for grade in ConditionGrade::ALL {
        let price = price_for(&sample, grade, SaleSpeed::Normal);
        assert!(price >= previous, "{} priced below a worse grade", grade);
        previous = price;
    }
    assert!(price_for(&sample, ConditionGrade::New, SaleSpeed::Normal)
        > price_for(&sample, ConditionGrade::Poor, SaleSpeed::Normal));
}

#[test]
fn test_sale_speed_orders_prices() {
    let sample = ComparableSample::from_prices(&[10.0, 12.0, 14.0, 16.0, 18.0]);

    let fast = price_for(&sample, ConditionGrade::Good, SaleSpeed::Fast);
    let normal = price_for(&sample, ConditionGrade::Good, SaleSpeed::Normal);
    let premium = price_for(&sample, ConditionGrade::Good, SaleSpeed::Premium);

    assert_eq!((fast, normal, premium), (12.0, 14.0, 16.0));
}

#[test]
fn test_estimates_are_positive_and_ranged() {
    let config = PricingConfig::default();
    let samples = [
        vec![],
        vec![0.4],
        vec![5.0, 5.0, 5.0],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        vec![99.9, 101.1, 250.0, 80.0],
    ];

    for prices in samples {
        let sample = ComparableSample::from_prices(&prices);
        for grade in ConditionGrade::ALL {
            let result = estimate(&sample, &EstimateParams::new(grade, 15.0), &config);
            assert!(result.recommended_price > 0.0);
            assert!(result.price_range.low <= result.recommended_price);
            assert!(result.recommended_price <= result.price_range.high);
        }
    }
}

#[test]
fn test_shipped_config_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("pricing-config.toml");
    let config = PricingConfig::from_file(path).unwrap();
    assert_eq!(config, PricingConfig::default());
}

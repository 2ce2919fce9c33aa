use approx::assert_relative_eq;
use roi_forecast::features::FEATURE_NAMES;
use roi_forecast::{
    CampaignRecord, Feature, MarketFactors, ReferenceDataset, RevenuePredictor, RoiError, TrainingConfig,
};
use rstest::{fixture, rstest};

#[fixture]
fn predictor() -> RevenuePredictor {
    RevenuePredictor::train(&ReferenceDataset, &TrainingConfig::default()).unwrap()
}

fn record(ad_cost: f64, approach: &str) -> CampaignRecord {
    CampaignRecord {
        ad_cost: Some(ad_cost),
        factors: Some(MarketFactors {
            cultural_trend: Some(60.0),
            population: Some(1_200_000.0),
            search_trends: Some(70.0),
            competitor_count: Some(3.0),
            policy_impact: Some(0.85),
        }),
        ad_approach: Some(approach.to_string()),
    }
}

#[rstest]
#[case(CampaignRecord::default())]
#[case(record(500.0, "emotive"))]
#[case(record(2500.0, "comparative"))]
#[case(record(0.0, "reminder"))]
fn test_feature_impact_covers_schema(predictor: RevenuePredictor, #[case] input: CampaignRecord) {
    let result = predictor.predict(&input).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    let impact = json["featureImpact"].as_object().unwrap();

    assert_eq!(impact.len(), 7);
    let mut total = 0.0;
    for name in FEATURE_NAMES {
        let value = impact[name].as_f64().unwrap();
        assert!(value >= 0.0);
        total += value;
    }
    assert_relative_eq!(total, 1.0, epsilon = 1e-9);
}

#[rstest]
#[case(record(500.0, "emotive"))]
#[case(record(1500.0, "persuasive"))]
#[case(record(40_000.0, "informative"))]
fn test_roi_formula(predictor: RevenuePredictor, #[case] input: CampaignRecord) {
    let result = predictor.predict(&input).unwrap();

    assert_relative_eq!(
        result.roi,
        (result.revenue - result.cost) / result.cost,
        epsilon = 1e-12
    );
}

#[rstest]
fn test_zero_cost_roi(predictor: RevenuePredictor) {
    let result = predictor.predict(&record(0.0, "informative")).unwrap();

    assert_eq!(result.cost, 0.0);
    assert_eq!(result.roi, 0.0);
}

#[rstest]
fn test_positive_roi_has_single_balanced_message(predictor: RevenuePredictor) {
    // A tiny spend makes any learned revenue a large return
    let result = predictor.predict(&record(1.0, "emotive")).unwrap();

    assert!(result.roi >= 0.1);
    assert_eq!(
        result.analysis,
        vec!["ROI is positive. Performance is driven by balanced factors."]
    );
    assert_eq!(result.suggestions.len(), 1);
}

#[rstest]
fn test_huge_spend_is_underperforming(predictor: RevenuePredictor) {
    // Predictions are averages of training revenues (at most 5000)
    let result = predictor.predict(&record(1_000_000.0, "comparative")).unwrap();

    assert!(result.roi < 0.1);
    assert!(result.analysis.len() <= 2);
    assert_eq!(result.analysis.len(), result.suggestions.len());
}

#[rstest]
fn test_predictions_stay_within_training_range(predictor: RevenuePredictor) {
    for input in [
        CampaignRecord::default(),
        record(100.0, "reminder"),
        record(9000.0, "persuasive"),
    ] {
        let revenue = predictor.predict(&input).unwrap().revenue;
        assert!((1200.0..=5000.0).contains(&revenue), "revenue {}", revenue);
    }
}

#[rstest]
fn test_unknown_approach_produces_no_record(predictor: RevenuePredictor) {
    let result = predictor.predict(&record(1000.0, "humorous"));

    match result {
        Err(RoiError::UnknownCategory(label)) => assert_eq!(label, "humorous"),
        other => panic!("Expected UnknownCategory, got {:?}", other),
    }
}

#[rstest]
fn test_missing_factor(predictor: RevenuePredictor) {
    let input = CampaignRecord::from_json(
        r#"{"adCost": 1000, "factors": {"culturalTrend": 50, "population": 1000000,
            "searchTrends": 50, "policyImpact": 0.8}, "adApproach": "informative"}"#,
    )
    .unwrap();

    assert!(matches!(
        predictor.predict(&input),
        Err(RoiError::MissingField(name)) if name == "factors.competitorCount"
    ));
}

#[test]
fn test_training_is_reproducible() {
    let config = TrainingConfig::default();
    let first = RevenuePredictor::train(&ReferenceDataset, &config).unwrap();
    let second = RevenuePredictor::train(&ReferenceDataset, &config).unwrap();

    assert_eq!(first.model(), second.model());
    assert_eq!(first.feature_importance(), second.feature_importance());

    let a = first.predict(&CampaignRecord::default()).unwrap();
    let b = second.predict(&CampaignRecord::default()).unwrap();
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[rstest]
fn test_reference_result_is_pinned(predictor: RevenuePredictor) {
    // 100 trees, seed 42, default campaign
    let result = predictor.predict(&CampaignRecord::default()).unwrap();

    assert_relative_eq!(result.revenue, 2158.0, epsilon = 1e-9);
    assert_relative_eq!(result.cost, 1000.0);
    assert_relative_eq!(result.roi, 1.158, epsilon = 1e-9);

    let impact = &result.feature_impact;
    assert_relative_eq!(impact.get(Feature::SearchTrends), 0.2394212, epsilon = 1e-6);
    assert_relative_eq!(impact.get(Feature::Population), 0.1794346, epsilon = 1e-6);
    assert_relative_eq!(impact.get(Feature::AdCost), 0.1624289, epsilon = 1e-6);

    assert_eq!(
        result.analysis,
        vec!["ROI is positive. Performance is driven by balanced factors."]
    );
}

#[rstest]
fn test_repeated_inference_is_byte_identical(predictor: RevenuePredictor) {
    let input = CampaignRecord::default();
    let first = predictor.predict(&input).unwrap().to_json().unwrap();

    for _ in 0..5 {
        assert_eq!(predictor.predict(&input).unwrap().to_json().unwrap(), first);
    }
}

#[rstest]
fn test_importance_is_independent_of_query(predictor: RevenuePredictor) {
    let a = predictor.predict(&CampaignRecord::default()).unwrap();
    let b = predictor.predict(&record(2500.0, "comparative")).unwrap();

    assert_eq!(a.feature_impact, b.feature_impact);
}

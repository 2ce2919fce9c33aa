use roi_forecast::{
    CodeOrder, CsvTrainingSource, RevenuePredictor, RoiError, TrainingConfig, TrainingSource,
};
use std::io::Write;
use tempfile::NamedTempFile;

// Helper function to create a small campaign file
fn create_campaign_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(
        file,
        "ad_cost,cultural_trend,population,search_trends,competitor_count,policy_impact,ad_approach,revenue"
    )
    .unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }

    file
}

const MARKET_ROWS: [&str; 8] = [
    "1000,50,1000000,60,2,0.8,informative,2000",
    "1500,70,1500000,80,3,0.9,persuasive,3500",
    "500,30,500000,40,1,0.7,emotive,1200",
    "2000,60,1200000,70,2,0.85,comparative,2800",
    "800,40,800000,50,1,0.9,reminder,1600",
    "3000,80,2000000,90,4,0.95,emotive,5000",
    "1200,55,900000,65,2,0.75,humorous,2300",
    "2500,75,1800000,85,5,0.6,humorous,3900",
];

#[test]
fn test_load_csv() {
    let file = create_campaign_csv(&MARKET_ROWS);
    let samples = CsvTrainingSource::new(file.path()).load().unwrap();

    assert_eq!(samples.len(), 8);
    assert_eq!(samples[6].ad_approach, "humorous");
    assert_eq!(samples[7].revenue, 3900.0);
}

#[test]
fn test_csv_extends_category_set() {
    let file = create_campaign_csv(&MARKET_ROWS);
    let config = TrainingConfig::default().with_tree_count(20);
    let predictor = RevenuePredictor::train(&CsvTrainingSource::new(file.path()), &config).unwrap();

    // A market with its own approaches accepts them at inference time
    assert!(predictor.encoder().contains("humorous"));
    assert_eq!(predictor.encoder().len(), 6);

    let report = predictor.report().unwrap();
    assert_eq!(report.test_samples, 2);
    assert_eq!(report.train_samples, 6);
}

#[test]
fn test_first_seen_code_order() {
    let file = create_campaign_csv(&MARKET_ROWS);
    let mut config = TrainingConfig::default().with_tree_count(5);
    config.code_order = CodeOrder::FirstSeen;
    let predictor = RevenuePredictor::train(&CsvTrainingSource::new(file.path()), &config).unwrap();

    assert_eq!(predictor.encoder().encode("informative").unwrap(), 0);
    assert_eq!(predictor.encoder().encode("humorous").unwrap(), 5);
}

#[test]
fn test_header_only_file() {
    let file = create_campaign_csv(&[]);

    assert!(matches!(
        CsvTrainingSource::new(file.path()).load(),
        Err(RoiError::DataError(_))
    ));
}

#[test]
fn test_single_row_is_insufficient() {
    let file = create_campaign_csv(&MARKET_ROWS[..1]);
    let result = RevenuePredictor::train(
        &CsvTrainingSource::new(file.path()),
        &TrainingConfig::default(),
    );

    assert!(matches!(result, Err(RoiError::InsufficientData(_))));
}

#[test]
fn test_malformed_row() {
    let file = create_campaign_csv(&["1000,fifty,1000000,60,2,0.8,informative,2000"]);

    assert!(matches!(
        CsvTrainingSource::new(file.path()).load(),
        Err(RoiError::CsvError(_))
    ));
}

#[test]
fn test_missing_file() {
    let result = CsvTrainingSource::new("/nonexistent/campaigns.csv").load();
    assert!(matches!(result, Err(RoiError::IoError(_))));
}

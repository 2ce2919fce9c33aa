use clap::Parser;
use pretty_assertions::assert_eq;
use roi_cli::{run, Cli};
use tempfile::TempDir;

fn run_args(args: &[&str]) -> anyhow::Result<serde_json::Value> {
    let output = run(Cli::parse_from(args))?;
    Ok(serde_json::from_str(&output)?)
}

#[test]
fn test_predict_default_campaign() {
    let value = run_args(&["adroi", "predict", "--trees", "10"]).unwrap();
    let object = value.as_object().unwrap();

    let mut keys: Vec<_> = object.keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["analysis", "cost", "featureImpact", "revenue", "roi", "suggestions"]
    );
    assert_eq!(value["cost"], 1000.0);
}

#[test]
fn test_train_then_predict_from_artifact() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("model.json");
    let model = model.to_str().unwrap();

    let summary = run_args(&["adroi", "train", "--output", model, "--trees", "15", "--seed", "7"]).unwrap();
    assert_eq!(summary["trees"], 15);
    assert_eq!(summary["trainSamples"], 4);
    assert_eq!(summary["testSamples"], 2);

    let input = r#"{"adCost": 1800, "factors": {"culturalTrend": 65, "population": 1300000,
        "searchTrends": 75, "competitorCount": 3, "policyImpact": 0.9}, "adApproach": "persuasive"}"#;
    let from_artifact = run(Cli::parse_from(["adroi", "predict", input, "--model", model])).unwrap();
    let in_process = run(Cli::parse_from([
        "adroi", "predict", input, "--trees", "15", "--seed", "7",
    ]))
    .unwrap();

    assert_eq!(from_artifact, in_process);
}

#[test]
fn test_unknown_approach_fails_without_output() {
    let input = r#"{"adCost": 1000, "factors": {"culturalTrend": 50, "population": 1000000,
        "searchTrends": 50, "competitorCount": 2, "policyImpact": 0.8}, "adApproach": "viral"}"#;
    let result = run(Cli::parse_from(["adroi", "predict", input, "--trees", "5"]));

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("viral"));
}

#[test]
fn test_missing_model_file() {
    let result = run(Cli::parse_from([
        "adroi",
        "predict",
        "--model",
        "/nonexistent/model.json",
    ]));
    assert!(result.is_err());
}

#[test]
fn test_estimate_newspaper_cost() {
    let value = run_args(&[
        "adroi",
        "estimate-cost",
        "--ad-type",
        "newspaper",
        "--approach",
        "comparative",
        "--location",
        "Mumbai, India",
    ])
    .unwrap();

    assert_eq!(value["adType"], "newspaper");
    assert!((value["estimatedCost"].as_f64().unwrap() - 3600.0).abs() < 1e-9);
    assert!(value.get("competitorCount").is_none());
}

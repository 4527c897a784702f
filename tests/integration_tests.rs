use exec_advisory::analysis::{DueDiligenceAnalyzer, DueDiligenceReport};
use exec_advisory::config::demo;
use exec_advisory::{AdvisoryConfig, AdvisoryEngine, AnalysisKind, LocalStorage};
use std::path::Path;
use tempfile::TempDir;

fn demo_config(output_path: &str, seed: u64) -> AdvisoryConfig {
    let mut config = AdvisoryConfig::demo();
    config.output.path = output_path.to_string();
    config.sampling.seed = Some(seed);
    config
}

fn read_json(path: &str) -> serde_json::Value {
    let data = std::fs::read(path).unwrap();
    serde_json::from_slice(&data).unwrap()
}

#[test]
fn test_end_to_end_demo_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let config = demo_config(&output_path, 42);

    let storage = LocalStorage::new(output_path.clone());
    let engine = AdvisoryEngine::new(storage, config.clone(), config.inputs.clone());
    let outcomes = engine.run(None).unwrap();

    let kinds: Vec<AnalysisKind> = outcomes.iter().map(|o| o.kind).collect();
    assert_eq!(kinds, AnalysisKind::ALL.to_vec());

    for outcome in &outcomes {
        assert!(!outcome.summary.is_empty(), "{} has no summary", outcome.kind);
        for file in &outcome.exported_files {
            assert!(Path::new(file).exists(), "missing {}", file);
        }
    }

    let budget = outcomes
        .iter()
        .find(|o| o.kind == AnalysisKind::Budget)
        .unwrap();
    assert!(budget.exported_files.iter().any(|f| f.ends_with(".csv")));

    let transformation = outcomes
        .iter()
        .find(|o| o.kind == AnalysisKind::Transformation)
        .unwrap();
    assert!(transformation.exported_files[0]
        .contains("digital_transformation_roadmap_techcorp_solutions_"));
}

#[test]
fn test_export_round_trip_preserves_numbers() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let config = demo_config(&output_path, 1);

    let engine = AdvisoryEngine::new(
        LocalStorage::new(output_path.clone()),
        config.clone(),
        config.inputs.clone(),
    );
    let outcome = engine
        .run(Some(AnalysisKind::DueDiligence))
        .unwrap()
        .remove(0);

    let value = read_json(&outcome.exported_files[0]);
    assert!(value["analysis_date"].is_string());

    let exported: DueDiligenceReport = serde_json::from_value(value).unwrap();
    let direct = DueDiligenceAnalyzer::default()
        .generate_report(&demo::due_diligence())
        .unwrap();

    assert_eq!(exported.target_company, direct.target_company);
    assert_eq!(exported.recommendation, direct.recommendation);
    assert!((exported.overall_score - direct.overall_score).abs() < 1e-9);
    assert!((exported.valuation.ebitda_based_low - 180.0).abs() < 1e-9);
    assert!((exported.valuation.ebitda_based_high - 270.0).abs() < 1e-9);
}

#[test]
fn test_seeded_forecast_is_reproducible() {
    let run = |dir: &TempDir| {
        let output_path = dir.path().to_str().unwrap().to_string();
        let mut config = demo_config(&output_path, 2024);
        if let Some(forecast) = config.inputs.forecast.as_mut() {
            forecast.base_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1);
        }
        let engine = AdvisoryEngine::new(
            LocalStorage::new(output_path),
            config.clone(),
            config.inputs.clone(),
        );
        let outcome = engine.run(Some(AnalysisKind::Forecast)).unwrap().remove(0);
        read_json(&outcome.exported_files[0])
    };

    let first = run(&TempDir::new().unwrap());
    let second = run(&TempDir::new().unwrap());

    assert_eq!(first["confidence_bands"], second["confidence_bands"]);
    for band in first["confidence_bands"]["revenue"].as_array().unwrap() {
        assert!(band["lower"].as_f64().unwrap() <= band["upper"].as_f64().unwrap());
    }
}

#[test]
fn test_dry_run_leaves_output_empty() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("reports").to_str().unwrap().to_string();
    let config = demo_config(&output_path, 3);

    let engine = AdvisoryEngine::new(
        LocalStorage::new(output_path.clone()),
        config.clone(),
        config.inputs.clone(),
    )
    .with_dry_run(true);
    let outcomes = engine.run(None).unwrap();

    assert_eq!(outcomes.len(), 7);
    assert!(outcomes.iter().all(|o| o.exported_files.is_empty()));
    assert!(!Path::new(&output_path).exists());
}

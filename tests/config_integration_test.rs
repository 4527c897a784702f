use exec_advisory::core::ConfigProvider;
use exec_advisory::utils::error::AdvisoryError;
use exec_advisory::utils::validation::Validate;
use exec_advisory::{AdvisoryConfig, AdvisoryEngine, AnalysisKind, LocalStorage};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const COST_BENEFIT_CONFIG: &str = r#"
[advisory]
name = "erp-upgrade"
description = "ERP upgrade business case"

[output]
path = "${EXEC_ADVISORY_IT_OUTPUT}"

[sampling]
seed = 9

[cost_benefit]
project_name = "ERP Upgrade"
discount_rate = 0.08
analysis_period_years = 2

[[cost_benefit.costs]]
description = "Licences"
amount = 40000.0
category = "capital"

[[cost_benefit.benefits]]
description = "Faster close"
amount = 6000.0
timing_months = 3
confidence = 0.9
"#;

#[test]
fn test_toml_file_drives_engine() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();
    std::env::set_var("EXEC_ADVISORY_IT_OUTPUT", &output_path);

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(COST_BENEFIT_CONFIG.as_bytes()).unwrap();

    let config = AdvisoryConfig::from_file(file.path()).unwrap();
    std::env::remove_var("EXEC_ADVISORY_IT_OUTPUT");

    assert!(config.validate().is_ok());
    assert_eq!(config.output_path(), output_path);
    assert_eq!(config.seed(), Some(9));

    let engine = AdvisoryEngine::new(
        LocalStorage::new(output_path.clone()),
        config.clone(),
        config.inputs.clone(),
    );
    let outcomes = engine.run(None).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].kind, AnalysisKind::CostBenefit);
    assert!(outcomes[0].exported_files[0].contains("cost_benefit_erp_upgrade_"));

    let data = std::fs::read(&outcomes[0].exported_files[0]).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&data).unwrap();
    assert_eq!(value["analysis_parameters"]["discount_rate"], 0.08);
}

#[test]
fn test_invalid_confidence_fails_validation() {
    let toml_content = COST_BENEFIT_CONFIG
        .replace("${EXEC_ADVISORY_IT_OUTPUT}", "./out")
        .replace("confidence = 0.9", "confidence = 1.4");

    let config = AdvisoryConfig::from_toml_str(&toml_content).unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, AdvisoryError::InvalidConfigValueError { .. }));
}

#[test]
fn test_missing_advisory_section_is_parse_error() {
    let err = AdvisoryConfig::from_toml_str("[output]\npath = \"./out\"\n").unwrap_err();
    assert!(matches!(err, AdvisoryError::ConfigValidationError { .. }));
}

#[test]
fn test_strict_scoring_rejects_missing_factors() {
    let toml_content = r#"
[advisory]
name = "strict"

[scoring]
strict = true

[due_diligence]
target_company = "Acme"
deal_value = 50.0

[due_diligence.strategic_factors]
market_expansion = 8.0
"#;
    let config = AdvisoryConfig::from_toml_str(toml_content).unwrap();
    let engine = AdvisoryEngine::new(
        LocalStorage::new(TempDir::new().unwrap().path().to_str().unwrap().to_string()),
        config.clone(),
        config.inputs.clone(),
    )
    .with_dry_run(true);

    let err = engine.run(Some(AnalysisKind::DueDiligence)).unwrap_err();
    assert!(matches!(err, AdvisoryError::MissingComponent { .. }));
}

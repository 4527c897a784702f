use crate::analysis::AnalysisInputs;
use crate::core::sampler::DEFAULT_SIMULATIONS;
use crate::core::ConfigProvider;
use crate::utils::error::{AdvisoryError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 成本效益分析期間上限（年）
const MAX_ANALYSIS_YEARS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    pub advisory: AdvisorySection,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// `[due_diligence]`、`[budget]` 等分析區段
    #[serde(flatten)]
    pub inputs: AnalysisInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorySection {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "./reports".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// 缺少評分元件時報錯
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_simulations")]
    pub simulations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            simulations: default_simulations(),
            seed: None,
        }
    }
}

fn default_simulations() -> usize {
    DEFAULT_SIMULATIONS
}

impl AdvisoryConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdvisoryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 內建示範資料，輸出到 `./reports`
    pub fn demo() -> Self {
        Self {
            advisory: AdvisorySection {
                name: "demo".to_string(),
                description: Some("Built-in demonstration inputs".to_string()),
            },
            output: OutputConfig::default(),
            scoring: ScoringConfig::default(),
            sampling: SamplingConfig::default(),
            inputs: super::demo::demo_inputs(),
        }
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定者保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdvisoryError::ProcessingError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable '{}' not set, leaving placeholder", var_name);
                format!("${{{}}}", var_name)
            })
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("advisory.name", &self.advisory.name)?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_positive_number("sampling.simulations", self.sampling.simulations, 1)?;

        let inputs = &self.inputs;
        if let Some(dd) = &inputs.due_diligence {
            validation::validate_non_empty_string("due_diligence.target_company", &dd.target_company)?;
        }

        if let Some(budget) = &inputs.budget {
            for category in &budget.categories {
                validation::validate_range(
                    &format!("budget.categories.{}.current_allocation", category.name),
                    category.current_allocation,
                    0.0,
                    1.0,
                )?;
            }
            let allocations: Vec<f64> = budget.categories.iter().map(|c| c.current_allocation).collect();
            if !allocations.is_empty() {
                validation::validate_weights("budget.categories.current_allocation", &allocations)?;
            }
        }

        if let Some(cb) = &inputs.cost_benefit {
            validation::validate_range("cost_benefit.discount_rate", cb.discount_rate, 0.0, 1.0)?;
            validation::validate_range(
                "cost_benefit.analysis_period_years",
                cb.analysis_period_years,
                1,
                MAX_ANALYSIS_YEARS,
            )?;
            for benefit in &cb.benefits {
                validation::validate_range(
                    &format!("cost_benefit.benefits.{}.confidence", benefit.description),
                    benefit.confidence,
                    0.0,
                    1.0,
                )?;
            }
        }

        if let Some(forecast) = &inputs.forecast {
            validation::validate_range(
                "forecast.assumptions.confidence_interval",
                forecast.assumptions.confidence_interval,
                0.0,
                1.0,
            )?;
        }

        if let Some(transformation) = &inputs.transformation {
            validation::validate_non_empty_string(
                "transformation.company_name",
                &transformation.company_name,
            )?;
        }

        Ok(())
    }
}

impl ConfigProvider for AdvisoryConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn seed(&self) -> Option<u64> {
        self.sampling.seed
    }

    fn simulations(&self) -> usize {
        self.sampling.simulations
    }

    fn strict_scoring(&self) -> bool {
        self.scoring.strict
    }
}

impl Validate for AdvisoryConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AnalysisKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config() {
        let toml_content = r#"
[advisory]
name = "quarterly-review"
"#;

        let config = AdvisoryConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.advisory.name, "quarterly-review");
        assert_eq!(config.output_path(), "./reports");
        assert_eq!(config.simulations(), DEFAULT_SIMULATIONS);
        assert_eq!(config.seed(), None);
        assert!(!config.strict_scoring());
        assert_eq!(config.inputs, AnalysisInputs::default());
    }

    #[test]
    fn test_parse_analysis_sections() {
        let toml_content = r#"
[advisory]
name = "deal-review"

[scoring]
strict = true

[sampling]
simulations = 200
seed = 42

[due_diligence]
target_company = "Acme"
deal_value = 120.0

[due_diligence.metrics]
revenue_3yr_cagr = 10.0
ebitda_margin = 18.0

[due_diligence.strategic_factors]
market_expansion = 8.0

[budget]
total_budget = 50000.0

[[budget.categories]]
name = "Marketing"
current_allocation = 1.0
roi = 2.0
cost_type = "variable"
"#;

        let config = AdvisoryConfig::from_toml_str(toml_content).unwrap();

        assert!(config.strict_scoring());
        assert_eq!(config.seed(), Some(42));
        assert_eq!(config.simulations(), 200);
        let dd = config.inputs.due_diligence.as_ref().unwrap();
        assert_eq!(dd.target_company, "Acme");
        assert_eq!(dd.metrics.ebitda_margin, 18.0);
        assert_eq!(dd.revenue, 100.0);
        assert_eq!(config.inputs.budget.as_ref().unwrap().categories.len(), 1);
        assert!(config.inputs.has(AnalysisKind::Budget));
        assert!(!config.inputs.has(AnalysisKind::Forecast));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("EXEC_ADVISORY_TEST_OUTPUT", "/tmp/advisory-out");

        let toml_content = r#"
[advisory]
name = "env"

[output]
path = "${EXEC_ADVISORY_TEST_OUTPUT}"
"#;

        let config = AdvisoryConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output.path, "/tmp/advisory-out");

        std::env::remove_var("EXEC_ADVISORY_TEST_OUTPUT");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[advisory]
name = "bad"

[sampling]
simulations = 0
"#;
        let config = AdvisoryConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[advisory]
name = "bad-rate"

[cost_benefit]
project_name = "ERP"
discount_rate = 1.5
"#;
        let config = AdvisoryConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[advisory]
name = "long-horizon"

[cost_benefit]
project_name = "ERP"
analysis_period_years = 500
"#;
        let config = AdvisoryConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[advisory]
name = "max-horizon"

[cost_benefit]
project_name = "ERP"
analysis_period_years = 50
"#;
        let config = AdvisoryConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_enum_rejected() {
        let toml_content = r#"
[advisory]
name = "bad-industry"

[benchmark]
company_name = "Acme"

[benchmark.context]
industry = "space_mining"
role = "cfo"
company_size = "startup"
"#;
        assert!(AdvisoryConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[advisory]\nname = \"file-test\"\n\n[output]\npath = \"./out\"\n")
            .unwrap();

        let config = AdvisoryConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.advisory.name, "file-test");
        assert_eq!(config.output_path(), "./out");
    }

    #[test]
    fn test_demo_config_is_valid() {
        assert!(AdvisoryConfig::demo().validate().is_ok());
    }
}

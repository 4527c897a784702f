pub mod cli;
pub mod demo;
pub mod toml_config;

use crate::domain::model::AnalysisKind;

#[cfg(feature = "cli")]
use crate::utils::error::{AdvisoryError, Result};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::AdvisoryConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "exec-advisory")]
#[command(about = "Executive advisory calculators with JSON report export")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Run every analysis on the built-in demonstration inputs
    #[arg(long, conflicts_with = "config")]
    pub demo: bool,

    /// Run a single analysis
    #[arg(long, value_enum)]
    pub only: Option<AnalysisKind>,

    /// Seed for the Monte Carlo sampler
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the output directory from the config file
    #[arg(long)]
    pub output_path: Option<String>,

    /// Compute and print summaries without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔或示範資料，再套用命令列覆蓋
    pub fn resolve(&self) -> Result<AdvisoryConfig> {
        let mut config = match (&self.config, self.demo) {
            (Some(path), _) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                AdvisoryConfig::from_file(path)?
            }
            (None, true) => {
                tracing::info!("🎬 Using built-in demo inputs");
                AdvisoryConfig::demo()
            }
            (None, false) => {
                return Err(AdvisoryError::MissingConfigError {
                    field: "--config or --demo".to_string(),
                })
            }
        };

        if let Some(seed) = self.seed {
            config.sampling.seed = Some(seed);
            tracing::info!("🔧 Sampler seed overridden to: {}", seed);
        }
        if let Some(path) = &self.output_path {
            config.output.path = path.clone();
            tracing::info!("🔧 Output path overridden to: {}", path);
        }

        Ok(config)
    }
}

/// 可執行的分析名稱，供錯誤訊息使用
pub fn known_analyses() -> String {
    AnalysisKind::ALL
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

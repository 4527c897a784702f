pub mod analysis;
pub mod config;
pub mod core;
pub mod domain;
pub mod prompt;
pub mod utils;

pub use config::cli::LocalStorage;
pub use config::toml_config::AdvisoryConfig;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{AdvisoryEngine, ReportExporter};
pub use domain::model::{AnalysisKind, AnalysisOutcome};
pub use prompt::{PromptRegistry, QualityValidator, UsageAnalytics};
pub use utils::error::{AdvisoryError, Result};

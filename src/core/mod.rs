pub mod engine;
pub mod keywords;
pub mod sampler;
pub mod scoring;
pub mod stats;
pub mod time_value;

pub use crate::domain::model::{AnalysisKind, AnalysisOutcome};
pub use crate::domain::ports::{ConfigProvider, Report, Storage};
pub use crate::utils::error::Result;
pub use engine::{AdvisoryEngine, ReportExporter};

//! 提示層：範本模型、渲染、情境調整、登錄、品質評估與使用統計。

pub mod adapter;
pub mod analytics;
pub mod library;
pub mod model;
pub mod quality;
pub mod registry;
pub mod render;

pub use adapter::ContextAdapter;
pub use analytics::UsageAnalytics;
pub use model::{PromptContext, PromptTemplate};
pub use quality::QualityValidator;
pub use registry::PromptRegistry;

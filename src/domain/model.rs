use serde::{Deserialize, Serialize};
use std::fmt;

/// 可執行的分析種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum AnalysisKind {
    DueDiligence,
    Budget,
    CostBenefit,
    Forecast,
    Benchmark,
    CustomerInsight,
    Transformation,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::DueDiligence,
        AnalysisKind::Budget,
        AnalysisKind::CostBenefit,
        AnalysisKind::Forecast,
        AnalysisKind::Benchmark,
        AnalysisKind::CustomerInsight,
        AnalysisKind::Transformation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::DueDiligence => "due_diligence",
            AnalysisKind::Budget => "budget",
            AnalysisKind::CostBenefit => "cost_benefit",
            AnalysisKind::Forecast => "forecast",
            AnalysisKind::Benchmark => "benchmark",
            AnalysisKind::CustomerInsight => "customer_insight",
            AnalysisKind::Transformation => "transformation",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 匯出時附加在報告最上層的分析日期
#[derive(Debug, Serialize)]
pub struct ExportEnvelope<'a, R: Serialize> {
    pub analysis_date: String,
    #[serde(flatten)]
    pub report: &'a R,
}

/// 單一分析執行的結果摘要
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub kind: AnalysisKind,
    pub summary: Vec<String>,
    pub exported_files: Vec<String>,
}

/// `f64::INFINITY` 在 JSON 中以 null 表示，讀回時還原；`-inf` 與 NaN 不可序列化
pub mod unbounded_f64 {
    use serde::ser::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if *value == f64::INFINITY {
            serializer.serialize_none()
        } else {
            Err(S::Error::custom(format!("cannot serialize non-finite value {}", value)))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

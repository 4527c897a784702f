// Analyzers: each turns a typed input section into a `Report`.

pub mod benchmark;
pub mod budget;
pub mod cost_benefit;
pub mod customer_insight;
pub mod due_diligence;
pub mod forecast;
pub mod transformation;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use benchmark::{BenchmarkAnalyzer, BenchmarkInput, BenchmarkReport};
pub use budget::{BudgetCategory, BudgetOptimizer, BudgetReport};
pub use cost_benefit::{BenefitItem, CostBenefitAssessor, CostBenefitReport, CostItem};
pub use customer_insight::{CustomerFeedback, CustomerInsightReport, CustomerSegment};
pub use due_diligence::{DueDiligenceAnalyzer, DueDiligenceInput, DueDiligenceReport};
pub use forecast::{ForecastAnalyzer, ForecastAssumptions, ForecastReport, HistoricalData};
pub use transformation::{TransformationInput, TransformationPlanner, TransformationRoadmap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetInput {
    pub total_budget: f64,
    #[serde(default)]
    pub categories: Vec<BudgetCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBenefitInput {
    pub project_name: String,
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
    #[serde(default = "default_analysis_years")]
    pub analysis_period_years: u32,
    #[serde(default)]
    pub costs: Vec<CostItem>,
    #[serde(default)]
    pub benefits: Vec<BenefitItem>,
}

fn default_discount_rate() -> f64 {
    cost_benefit::DEFAULT_DISCOUNT_RATE
}

fn default_analysis_years() -> u32 {
    cost_benefit::DEFAULT_ANALYSIS_YEARS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastInput {
    pub company_name: String,
    /// 預測起算日，未指定時取執行當天
    #[serde(default)]
    pub base_date: Option<NaiveDate>,
    #[serde(default)]
    pub history: Vec<HistoricalData>,
    #[serde(default)]
    pub assumptions: ForecastAssumptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInsightInput {
    #[serde(default)]
    pub segments: Vec<CustomerSegment>,
    #[serde(default)]
    pub feedback: Vec<CustomerFeedback>,
}

/// 各分析的輸入；缺少的區段不執行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInputs {
    #[serde(default)]
    pub due_diligence: Option<DueDiligenceInput>,
    #[serde(default)]
    pub budget: Option<BudgetInput>,
    #[serde(default)]
    pub cost_benefit: Option<CostBenefitInput>,
    #[serde(default)]
    pub forecast: Option<ForecastInput>,
    #[serde(default)]
    pub benchmark: Option<BenchmarkInput>,
    #[serde(default)]
    pub customer_insight: Option<CustomerInsightInput>,
    #[serde(default)]
    pub transformation: Option<TransformationInput>,
}

impl AnalysisInputs {
    pub fn has(&self, kind: crate::domain::model::AnalysisKind) -> bool {
        use crate::domain::model::AnalysisKind::*;
        match kind {
            DueDiligence => self.due_diligence.is_some(),
            Budget => self.budget.is_some(),
            CostBenefit => self.cost_benefit.is_some(),
            Forecast => self.forecast.is_some(),
            Benchmark => self.benchmark.is_some(),
            CustomerInsight => self.customer_insight.is_some(),
            Transformation => self.transformation.is_some(),
        }
    }
}

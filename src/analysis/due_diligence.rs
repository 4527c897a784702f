//! 併購盡職調查：財務、策略契合度與風險三面向加權評分。

use crate::core::scoring::{
    ComponentTransform, MissingComponentPolicy, ScoreCard, TierClassifier, WeightedScorer,
};
use crate::domain::model::AnalysisKind;
use crate::domain::ports::Report;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WEIGHT_FINANCIAL: f64 = 0.40;
pub const WEIGHT_STRATEGIC: f64 = 0.35;
pub const WEIGHT_RISK: f64 = 0.25;

const REVENUE_MULTIPLE: (f64, f64) = (2.0, 4.0);
const EBITDA_MULTIPLE: (f64, f64) = (8.0, 12.0);
const FCF_MULTIPLE: f64 = 8.0;

pub const STRATEGIC_FACTORS: [&str; 6] = [
    "market_expansion",
    "product_synergies",
    "cost_synergies",
    "technology_capabilities",
    "customer_base_overlap",
    "cultural_alignment",
];

pub const RISK_FACTORS: [&str; 6] = [
    "integration_complexity",
    "regulatory_hurdles",
    "customer_retention",
    "key_person_dependency",
    "technology_obsolescence",
    "market_competition",
];

/// 目標公司財務指標（百分比以 15.2 表示 15.2%）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialMetrics {
    pub revenue_3yr_cagr: f64,
    pub ebitda_margin: f64,
    pub debt_to_equity: f64,
    pub current_ratio: f64,
    pub roe: f64,
    pub free_cash_flow_margin: f64,
}

impl FinancialMetrics {
    fn raw(&self, component: &str) -> Option<f64> {
        match component {
            "revenue_growth" => Some(self.revenue_3yr_cagr),
            "profitability" => Some(self.ebitda_margin),
            "liquidity" => Some(self.current_ratio),
            "leverage" => Some(self.debt_to_equity),
            "efficiency" => Some(self.roe),
            "cash_generation" => Some(self.free_cash_flow_margin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysis {
    pub scores: ScoreCard,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicAnalysis {
    pub scores: ScoreCard,
    pub synergy_potential: Vec<String>,
    pub integration_challenges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// 已反轉：10 - 平均風險，越高越好
    pub overall_score: f64,
    pub factors: ScoreCard,
    pub high_risks: Vec<String>,
    pub moderate_risks: Vec<String>,
    pub manageable_risks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationRange {
    pub revenue_based_low: f64,
    pub revenue_based_high: f64,
    pub ebitda_based_low: f64,
    pub ebitda_based_high: f64,
    pub dcf_estimate: f64,
    pub recommended_range_low: f64,
    pub recommended_range_high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealRecommendation {
    Pass,
    Conditional,
    Buy,
    StrongBuy,
}

impl DealRecommendation {
    pub fn description(&self) -> &'static str {
        match self {
            DealRecommendation::StrongBuy => {
                "STRONG BUY - Excellent strategic fit with attractive valuation"
            }
            DealRecommendation::Buy => "BUY - Good opportunity with manageable risks",
            DealRecommendation::Conditional => {
                "CONDITIONAL - Proceed with caution, negotiate better terms"
            }
            DealRecommendation::Pass => "PASS - Too many risks and concerns",
        }
    }
}

/// 分類器輸入：整體分數與估值上限
#[derive(Debug, Clone, Copy)]
pub struct DealSignal {
    pub overall_score: f64,
    pub deal_value: f64,
    pub valuation_ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueDiligenceInput {
    pub target_company: String,
    pub deal_value: f64,
    #[serde(default)]
    pub metrics: FinancialMetrics,
    #[serde(default)]
    pub strategic_factors: HashMap<String, f64>,
    #[serde(default)]
    pub risk_factors: HashMap<String, f64>,
    #[serde(default = "default_revenue")]
    pub revenue: f64,
    #[serde(default = "default_ebitda")]
    pub ebitda: f64,
}

fn default_revenue() -> f64 {
    100.0
}

fn default_ebitda() -> f64 {
    20.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueDiligenceReport {
    pub target_company: String,
    pub deal_value: f64,
    pub financial_score: f64,
    pub strategic_score: f64,
    pub risk_score: f64,
    pub overall_score: f64,
    pub recommendation: DealRecommendation,
    pub overall_recommendation: String,
    pub valuation: ValuationRange,
    pub key_findings: Vec<String>,
    pub red_flags: Vec<String>,
    pub synergies: Vec<String>,
}

impl Report for DueDiligenceReport {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::DueDiligence
    }

    fn export_stem(&self) -> String {
        format!("due_diligence_{}", slug(&self.target_company))
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Target: {} (deal value ${}M)", self.target_company, self.deal_value),
            format!("Financial Score: {:.1}/10", self.financial_score),
            format!("Strategic Score: {:.1}/10", self.strategic_score),
            format!("Risk Score: {:.1}/10", self.risk_score),
            format!("Recommendation: {}", self.overall_recommendation),
        ];
        lines.extend(self.key_findings.iter().map(|f| format!("Finding: {}", f)));
        lines.extend(self.red_flags.iter().map(|f| format!("Red flag: {}", f)));
        lines
    }
}

pub struct DueDiligenceAnalyzer {
    financial: WeightedScorer,
    strategic: WeightedScorer,
    risk: WeightedScorer,
    classifier: TierClassifier<DealSignal, DealRecommendation>,
}

impl Default for DueDiligenceAnalyzer {
    fn default() -> Self {
        Self::new(MissingComponentPolicy::Neutral)
    }
}

impl DueDiligenceAnalyzer {
    pub fn new(policy: MissingComponentPolicy) -> Self {
        let financial = WeightedScorer::new()
            .component("revenue_growth", ComponentTransform::scaled(2.0))
            .component("profitability", ComponentTransform::scaled(0.5))
            .component("liquidity", ComponentTransform::scaled(5.0))
            .component("leverage", ComponentTransform::new(-2.0, 10.0))
            .component("efficiency", ComponentTransform::scaled(0.5))
            .component("cash_generation", ComponentTransform::scaled(0.4));

        let strategic = STRATEGIC_FACTORS
            .iter()
            .fold(WeightedScorer::new(), |s, name| {
                s.component(name, ComponentTransform::IDENTITY)
            })
            .with_policy(policy);

        let risk = RISK_FACTORS
            .iter()
            .fold(WeightedScorer::new(), |s, name| {
                s.component(name, ComponentTransform::IDENTITY)
            })
            .with_policy(policy);

        Self {
            financial,
            strategic,
            risk,
            classifier: deal_classifier(),
        }
    }

    pub fn analyze_financial_metrics(&self, metrics: &FinancialMetrics) -> Result<FinancialAnalysis> {
        let scores = self.financial.score_with(|name| metrics.raw(name))?;
        Ok(FinancialAnalysis {
            strengths: scores.strengths(),
            concerns: scores.concerns(),
            scores,
        })
    }

    pub fn assess_strategic_fit(&self, factors: &HashMap<String, f64>) -> Result<StrategicAnalysis> {
        let scores = self.strategic.score_map(factors)?;
        Ok(StrategicAnalysis {
            synergy_potential: scores.strengths(),
            integration_challenges: scores.concerns(),
            scores,
        })
    }

    pub fn evaluate_risks(&self, factors: &HashMap<String, f64>) -> Result<RiskAnalysis> {
        let scores = self.risk.score_map(factors)?;
        Ok(RiskAnalysis {
            overall_score: 10.0 - scores.overall,
            high_risks: scores.names_where(|v| v >= 8.0),
            moderate_risks: scores.names_where(|v| (6.0..8.0).contains(&v)),
            manageable_risks: scores.names_where(|v| v < 6.0),
            factors: scores,
        })
    }

    pub fn calculate_valuation_range(
        &self,
        metrics: &FinancialMetrics,
        revenue: f64,
        ebitda: f64,
    ) -> ValuationRange {
        let dcf_estimate = ebitda * metrics.free_cash_flow_margin * FCF_MULTIPLE;
        let ebitda_based_low = ebitda * EBITDA_MULTIPLE.0;
        let ebitda_based_high = ebitda * EBITDA_MULTIPLE.1;

        ValuationRange {
            revenue_based_low: revenue * REVENUE_MULTIPLE.0,
            revenue_based_high: revenue * REVENUE_MULTIPLE.1,
            ebitda_based_low,
            ebitda_based_high,
            dcf_estimate,
            recommended_range_low: ebitda_based_low.min(dcf_estimate * 0.9),
            recommended_range_high: ebitda_based_high.max(dcf_estimate * 1.1),
        }
    }

    pub fn classify(&self, signal: &DealSignal) -> DealRecommendation {
        self.classifier.classify(signal)
    }

    pub fn generate_report(&self, input: &DueDiligenceInput) -> Result<DueDiligenceReport> {
        tracing::info!("🏢 Running due diligence for {}", input.target_company);

        let financial = self.analyze_financial_metrics(&input.metrics)?;
        let strategic = self.assess_strategic_fit(&input.strategic_factors)?;
        let risk = self.evaluate_risks(&input.risk_factors)?;
        let valuation = self.calculate_valuation_range(&input.metrics, input.revenue, input.ebitda);

        let overall_score = financial.scores.overall * WEIGHT_FINANCIAL
            + strategic.scores.overall * WEIGHT_STRATEGIC
            + risk.overall_score * WEIGHT_RISK;

        tracing::debug!(
            "Scores: financial={:.2} strategic={:.2} risk={:.2} overall={:.2}",
            financial.scores.overall,
            strategic.scores.overall,
            risk.overall_score,
            overall_score
        );

        let recommendation = self.classify(&DealSignal {
            overall_score,
            deal_value: input.deal_value,
            valuation_ceiling: valuation.recommended_range_high,
        });

        let mut key_findings = Vec::new();
        if !financial.strengths.is_empty() {
            key_findings.push(format!(
                "Financial strengths: {}",
                financial.strengths.join(", ")
            ));
        }
        if !strategic.synergy_potential.is_empty() {
            key_findings.push(format!(
                "Synergy opportunities: {}",
                strategic.synergy_potential.join(", ")
            ));
        }

        let mut red_flags: Vec<String> = financial
            .concerns
            .iter()
            .map(|c| format!("Financial concern: {}", c))
            .collect();
        red_flags.extend(risk.high_risks.iter().map(|r| format!("High risk: {}", r)));

        Ok(DueDiligenceReport {
            target_company: input.target_company.clone(),
            deal_value: input.deal_value,
            financial_score: financial.scores.overall,
            strategic_score: strategic.scores.overall,
            risk_score: risk.overall_score,
            overall_score,
            recommendation,
            overall_recommendation: recommendation.description().to_string(),
            valuation,
            key_findings,
            red_flags,
            synergies: strategic.synergy_potential,
        })
    }
}

fn deal_classifier() -> TierClassifier<DealSignal, DealRecommendation> {
    TierClassifier::new(DealRecommendation::Pass)
        .rule(DealRecommendation::StrongBuy, |s: &DealSignal| {
            s.overall_score >= 8.0 && s.deal_value <= s.valuation_ceiling
        })
        .rule(DealRecommendation::Buy, |s: &DealSignal| {
            s.overall_score >= 6.5 && s.deal_value <= s.valuation_ceiling
        })
        .rule(DealRecommendation::Conditional, |s: &DealSignal| {
            s.overall_score >= 5.0
        })
}

/// 檔名片段：僅保留 `[a-z0-9_-]`，其餘字元一律轉成 `_`
pub(crate) fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

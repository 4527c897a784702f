//! 成本效益評估：現值、回收期、IRR 近似與敏感度分析。

use super::due_diligence::slug;
use crate::core::stats;
use crate::core::time_value::{CashItem, Discounter};
use crate::domain::model::{unbounded_f64, AnalysisKind};
use crate::domain::ports::Report;
use crate::utils::error::{AdvisoryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;
pub const DEFAULT_ANALYSIS_YEARS: u32 = 3;

const IRR_FLOOR: f64 = -50.0;
const IRR_CAP: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub timing_months: i64,
    #[serde(default = "default_cost_category")]
    pub category: String,
    #[serde(default)]
    pub recurring: bool,
}

fn default_cost_category() -> String {
    "operational".to_string()
}

impl CostItem {
    pub fn new(description: &str, amount: f64, timing_months: i64, category: &str, recurring: bool) -> Self {
        Self {
            description: description.to_string(),
            amount,
            timing_months,
            category: category.to_string(),
            recurring,
        }
    }

    fn cash_item(&self) -> CashItem {
        CashItem {
            amount: self.amount,
            start_period: self.timing_months,
            recurring: self.recurring,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitItem {
    pub description: String,
    pub amount: f64,
    #[serde(default = "default_benefit_timing")]
    pub timing_months: i64,
    #[serde(default = "default_benefit_category")]
    pub category: String,
    #[serde(default = "default_true")]
    pub recurring: bool,
    /// 實現機率 (0-1)
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_benefit_timing() -> i64 {
    6
}

fn default_benefit_category() -> String {
    "revenue".to_string()
}

fn default_true() -> bool {
    true
}

fn default_confidence() -> f64 {
    0.8
}

impl BenefitItem {
    pub fn new(
        description: &str,
        amount: f64,
        timing_months: i64,
        category: &str,
        recurring: bool,
        confidence: f64,
    ) -> Self {
        Self {
            description: description.to_string(),
            amount,
            timing_months,
            category: category.to_string(),
            recurring,
            confidence,
        }
    }

    fn cash_item(&self) -> CashItem {
        CashItem {
            amount: self.amount,
            start_period: self.timing_months,
            recurring: self.recurring,
        }
    }
}

/// 單邊（成本或效益）的現值彙總
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowAnalysis {
    pub total_pv: f64,
    pub risk_adjusted_pv: f64,
    pub by_category: BTreeMap<String, f64>,
    /// 每月名目金額，成本為負
    pub cash_flow: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParameters {
    pub discount_rate: f64,
    pub analysis_period_months: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub total_costs: f64,
    pub total_benefits: f64,
    pub net_benefit: f64,
    #[serde(with = "unbounded_f64")]
    pub benefit_cost_ratio: f64,
    pub roi_percentage: f64,
    /// 分析期內未回收時為 None
    pub payback_months: Option<usize>,
    pub npv: f64,
    pub irr: f64,
    pub risk_adjusted_npv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub costs_by_category: BTreeMap<String, f64>,
    pub benefits_by_category: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentDecision {
    RejectNegativeNpv,
    RejectCostsExceedBenefits,
    ReviewRequired,
    ConditionalApprove,
    Approve,
    StrongApprove,
}

impl InvestmentDecision {
    pub fn description(&self) -> &'static str {
        match self {
            InvestmentDecision::RejectNegativeNpv => "REJECT - Negative risk-adjusted NPV",
            InvestmentDecision::RejectCostsExceedBenefits => "REJECT - Costs exceed benefits",
            InvestmentDecision::StrongApprove => {
                "STRONG APPROVE - Excellent returns with quick payback"
            }
            InvestmentDecision::Approve => "APPROVE - Good investment with acceptable risk",
            InvestmentDecision::ConditionalApprove => {
                "CONDITIONAL APPROVE - Moderate returns, monitor closely"
            }
            InvestmentDecision::ReviewRequired => "REVIEW REQUIRED - Marginal investment case",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBenefitReport {
    pub project_name: String,
    pub analysis_parameters: AnalysisParameters,
    pub financial_metrics: FinancialMetrics,
    pub breakdown: Breakdown,
    pub sensitivity_analysis: BTreeMap<String, f64>,
    pub decision: InvestmentDecision,
    pub recommendation: String,
}

impl Report for CostBenefitReport {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::CostBenefit
    }

    fn export_stem(&self) -> String {
        format!(
            "cost_benefit_{}",
            slug(&self.project_name)
        )
    }

    fn summary(&self) -> Vec<String> {
        let m = &self.financial_metrics;
        let payback = match m.payback_months {
            Some(months) => format!("{} months", months),
            None => "Beyond analysis period".to_string(),
        };
        let mut lines = vec![
            format!("Project: {}", self.project_name),
            format!("Total Costs (PV): ${:.0}", m.total_costs),
            format!("Total Benefits (PV): ${:.0}", m.total_benefits),
            format!("Net Benefit (NPV): ${:.0}", m.net_benefit),
            format!("Risk-Adjusted NPV: ${:.0}", m.risk_adjusted_npv),
            format!("Benefit-Cost Ratio: {:.2}", m.benefit_cost_ratio),
            format!("ROI: {:.1}%", m.roi_percentage),
            format!("IRR: {:.1}%", m.irr),
            format!("Payback Period: {}", payback),
            format!("Recommendation: {}", self.recommendation),
        ];
        for (scenario, impact) in &self.sensitivity_analysis {
            lines.push(format!("Sensitivity {}: {:+.1}%", scenario, impact));
        }
        lines
    }
}

/// 不含敏感度分析的核心結果
#[derive(Debug, Clone, PartialEq)]
struct CoreMetrics {
    costs: FlowAnalysis,
    benefits: FlowAnalysis,
    metrics: FinancialMetrics,
}

#[derive(Debug, Clone)]
pub struct CostBenefitAssessor {
    discount_rate: f64,
    discounter: Discounter,
    period_months: usize,
}

impl Default for CostBenefitAssessor {
    fn default() -> Self {
        Self::new(DEFAULT_DISCOUNT_RATE, DEFAULT_ANALYSIS_YEARS)
    }
}

impl CostBenefitAssessor {
    pub fn new(discount_rate: f64, analysis_period_years: u32) -> Self {
        Self {
            discount_rate,
            discounter: Discounter::monthly_from_annual(discount_rate),
            period_months: analysis_period_years as usize * 12,
        }
    }

    pub fn period_months(&self) -> usize {
        self.period_months
    }

    pub fn present_value(&self, future_value: f64, months: i64) -> f64 {
        self.discounter.present_value(future_value, months)
    }

    pub fn analyze_costs(&self, costs: &[CostItem]) -> FlowAnalysis {
        let mut analysis = FlowAnalysis {
            cash_flow: vec![0.0; self.period_months],
            ..Default::default()
        };

        for cost in costs {
            let item = cost.cash_item();
            let pv = item.present_value(&self.discounter, self.period_months as i64);
            analysis.total_pv += pv;
            analysis.risk_adjusted_pv += pv;
            *analysis.by_category.entry(cost.category.clone()).or_insert(0.0) += pv;
            item.apply_to_cash_flow(&mut analysis.cash_flow, -1.0);
        }

        analysis
    }

    pub fn analyze_benefits(&self, benefits: &[BenefitItem]) -> FlowAnalysis {
        let mut analysis = FlowAnalysis {
            cash_flow: vec![0.0; self.period_months],
            ..Default::default()
        };

        for benefit in benefits {
            let item = benefit.cash_item();
            let pv = item.present_value(&self.discounter, self.period_months as i64);
            analysis.total_pv += pv;
            analysis.risk_adjusted_pv += pv * benefit.confidence;
            *analysis
                .by_category
                .entry(benefit.category.clone())
                .or_insert(0.0) += pv;
            item.apply_to_cash_flow(&mut analysis.cash_flow, 1.0);
        }

        analysis
    }

    /// 累計淨現金流首次為正的月份（從 1 起算）
    pub fn payback_period(cost_flow: &[f64], benefit_flow: &[f64]) -> Option<usize> {
        let mut cumulative = 0.0;
        for (month, (cost, benefit)) in cost_flow.iter().zip(benefit_flow).enumerate() {
            cumulative += benefit + cost;
            if cumulative > 0.0 {
                return Some(month + 1);
            }
        }
        None
    }

    /// 以平均正向月流量除以總負向流量年化的粗略 IRR，限制在 [-50, 100]
    pub fn approximate_irr(cost_flow: &[f64], benefit_flow: &[f64]) -> f64 {
        let net: Vec<f64> = cost_flow
            .iter()
            .zip(benefit_flow)
            .map(|(c, b)| c + b)
            .collect();

        match net.first() {
            Some(first) if *first < 0.0 => {}
            _ => return 0.0,
        }

        let total_costs: f64 = net.iter().filter(|v| **v < 0.0).sum::<f64>().abs();
        if total_costs == 0.0 {
            return 0.0;
        }

        let positives: Vec<f64> = net.iter().copied().filter(|v| *v > 0.0).collect();
        let average_monthly_return = stats::mean(&positives);
        let irr = average_monthly_return / total_costs * 12.0 * 100.0;

        irr.clamp(IRR_FLOOR, IRR_CAP)
    }

    fn core_metrics(&self, costs: &[CostItem], benefits: &[BenefitItem]) -> CoreMetrics {
        let cost_analysis = self.analyze_costs(costs);
        let benefit_analysis = self.analyze_benefits(benefits);

        let total_costs = cost_analysis.total_pv;
        let total_benefits = benefit_analysis.total_pv;
        let net_benefit = total_benefits - total_costs;
        let risk_adjusted_npv = benefit_analysis.risk_adjusted_pv - total_costs;

        let (benefit_cost_ratio, roi_percentage) = if total_costs > 0.0 {
            (total_benefits / total_costs, net_benefit / total_costs * 100.0)
        } else {
            (f64::INFINITY, 0.0)
        };

        let metrics = FinancialMetrics {
            total_costs,
            total_benefits,
            net_benefit,
            benefit_cost_ratio,
            roi_percentage,
            payback_months: Self::payback_period(
                &cost_analysis.cash_flow,
                &benefit_analysis.cash_flow,
            ),
            npv: net_benefit,
            irr: Self::approximate_irr(&cost_analysis.cash_flow, &benefit_analysis.cash_flow),
            risk_adjusted_npv,
        };

        CoreMetrics {
            costs: cost_analysis,
            benefits: benefit_analysis,
            metrics,
        }
    }

    /// 成本 +20%、效益 -20%、效益延後三個月對 NPV 的百分比影響
    pub fn sensitivity_analysis(
        &self,
        costs: &[CostItem],
        benefits: &[BenefitItem],
    ) -> BTreeMap<String, f64> {
        let base_npv = self.core_metrics(costs, benefits).metrics.npv;
        let impact = |npv: f64| {
            if base_npv != 0.0 {
                (npv - base_npv) / base_npv * 100.0
            } else {
                0.0
            }
        };

        let costs_high: Vec<CostItem> = costs
            .iter()
            .map(|c| CostItem {
                amount: c.amount * 1.2,
                ..c.clone()
            })
            .collect();
        let benefits_low: Vec<BenefitItem> = benefits
            .iter()
            .map(|b| BenefitItem {
                amount: b.amount * 0.8,
                ..b.clone()
            })
            .collect();
        let benefits_delayed: Vec<BenefitItem> = benefits
            .iter()
            .map(|b| BenefitItem {
                timing_months: b.timing_months + 3,
                ..b.clone()
            })
            .collect();

        let mut sensitivity = BTreeMap::new();
        sensitivity.insert(
            "costs_+20%".to_string(),
            impact(self.core_metrics(&costs_high, benefits).metrics.npv),
        );
        sensitivity.insert(
            "benefits_-20%".to_string(),
            impact(self.core_metrics(costs, &benefits_low).metrics.npv),
        );
        sensitivity.insert(
            "benefits_delayed_3mo".to_string(),
            impact(self.core_metrics(costs, &benefits_delayed).metrics.npv),
        );
        sensitivity
    }

    pub fn decide(metrics: &FinancialMetrics) -> InvestmentDecision {
        let payback_within = |limit: usize| metrics.payback_months.is_some_and(|m| m <= limit);
        let bcr = metrics.benefit_cost_ratio;
        let roi = metrics.roi_percentage;

        if metrics.risk_adjusted_npv <= 0.0 {
            InvestmentDecision::RejectNegativeNpv
        } else if bcr < 1.0 {
            InvestmentDecision::RejectCostsExceedBenefits
        } else if roi > 50.0 && payback_within(12) && bcr > 2.0 {
            InvestmentDecision::StrongApprove
        } else if roi > 25.0 && payback_within(24) && bcr > 1.5 {
            InvestmentDecision::Approve
        } else if roi > 15.0 && payback_within(36) {
            InvestmentDecision::ConditionalApprove
        } else {
            InvestmentDecision::ReviewRequired
        }
    }

    pub fn assess_project(
        &self,
        project_name: &str,
        costs: &[CostItem],
        benefits: &[BenefitItem],
    ) -> Result<CostBenefitReport> {
        if let Some(bad) = benefits
            .iter()
            .find(|b| !(0.0..=1.0).contains(&b.confidence))
        {
            return Err(AdvisoryError::InvalidConfigValueError {
                field: format!("benefits.{}.confidence", bad.description),
                value: bad.confidence.to_string(),
                reason: "Confidence must be between 0 and 1".to_string(),
            });
        }

        tracing::info!(
            "📊 Assessing '{}' ({} costs, {} benefits, {} months)",
            project_name,
            costs.len(),
            benefits.len(),
            self.period_months
        );

        let core = self.core_metrics(costs, benefits);
        let sensitivity_analysis = self.sensitivity_analysis(costs, benefits);
        let decision = Self::decide(&core.metrics);

        tracing::debug!(
            "NPV {:.2}, risk-adjusted {:.2}, decision {:?}",
            core.metrics.npv,
            core.metrics.risk_adjusted_npv,
            decision
        );

        Ok(CostBenefitReport {
            project_name: project_name.to_string(),
            analysis_parameters: AnalysisParameters {
                discount_rate: self.discount_rate,
                analysis_period_months: self.period_months,
            },
            financial_metrics: core.metrics,
            breakdown: Breakdown {
                costs_by_category: core.costs.by_category,
                benefits_by_category: core.benefits.by_category,
            },
            sensitivity_analysis,
            decision,
            recommendation: decision.description().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(bcr: f64, roi: f64, payback: Option<usize>, risk_adjusted_npv: f64) -> FinancialMetrics {
        FinancialMetrics {
            total_costs: 100.0,
            total_benefits: 100.0 * bcr,
            net_benefit: 0.0,
            benefit_cost_ratio: bcr,
            roi_percentage: roi,
            payback_months: payback,
            npv: 0.0,
            irr: 0.0,
            risk_adjusted_npv,
        }
    }

    #[test]
    fn test_recurring_cost_is_discounted_annuity() {
        let assessor = CostBenefitAssessor::default();
        let analysis = assessor.analyze_costs(&[CostItem::new("Maintenance", 3000.0, 3, "operational", true)]);

        let expected: f64 = (3..36).map(|m| assessor.present_value(3000.0, m)).sum();
        assert!((analysis.total_pv - expected).abs() < 1e-6);
        assert_eq!(analysis.cash_flow[2], 0.0);
        assert_eq!(analysis.cash_flow[3], -3000.0);
        assert_eq!(analysis.cash_flow[35], -3000.0);
    }

    #[test]
    fn test_benefit_risk_adjustment() {
        let assessor = CostBenefitAssessor::default();
        let analysis = assessor.analyze_benefits(&[BenefitItem::new("Avoidance", 30000.0, 0, "cost_savings", false, 0.5)]);

        assert_eq!(analysis.total_pv, 30000.0);
        assert_eq!(analysis.risk_adjusted_pv, 15000.0);
        assert_eq!(analysis.by_category["cost_savings"], 30000.0);
    }

    #[test]
    fn test_payback_first_positive_month() {
        let costs = vec![-100.0, 0.0, 0.0, 0.0];
        let benefits = vec![0.0, 40.0, 40.0, 40.0];
        assert_eq!(CostBenefitAssessor::payback_period(&costs, &benefits), Some(4));
        assert_eq!(CostBenefitAssessor::payback_period(&costs, &[0.0; 4]), None);
    }

    #[test]
    fn test_irr_approximation_and_clamp() {
        assert_eq!(CostBenefitAssessor::approximate_irr(&[10.0], &[0.0]), 0.0);

        let irr = CostBenefitAssessor::approximate_irr(&[-1200.0, 0.0, 0.0], &[0.0, 10.0, 30.0]);
        assert!((irr - 20.0).abs() < 1e-9);

        let capped = CostBenefitAssessor::approximate_irr(&[-10.0, 0.0], &[0.0, 1000.0]);
        assert_eq!(capped, 100.0);
    }

    #[test]
    fn test_zero_costs_give_unbounded_ratio() {
        let assessor = CostBenefitAssessor::default();
        let report = assessor
            .assess_project("Free", &[], &[BenefitItem::new("Gift", 100.0, 0, "revenue", false, 1.0)])
            .unwrap();

        assert!(report.financial_metrics.benefit_cost_ratio.is_infinite());
        assert_eq!(report.financial_metrics.roi_percentage, 0.0);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["financial_metrics"]["benefit_cost_ratio"].is_null());
    }

    #[test]
    fn test_decision_ladder() {
        use InvestmentDecision::*;
        let decide = CostBenefitAssessor::decide;

        assert_eq!(decide(&metrics(3.0, 80.0, Some(6), 0.0)), RejectNegativeNpv);
        assert_eq!(decide(&metrics(0.9, 80.0, Some(6), 10.0)), RejectCostsExceedBenefits);
        assert_eq!(decide(&metrics(2.5, 60.0, Some(12), 10.0)), StrongApprove);
        assert_eq!(decide(&metrics(2.5, 60.0, Some(13), 10.0)), Approve);
        assert_eq!(decide(&metrics(1.2, 20.0, Some(30), 10.0)), ConditionalApprove);
        assert_eq!(decide(&metrics(1.2, 20.0, None, 10.0)), ReviewRequired);
    }

    #[test]
    fn test_sensitivity_directions() {
        let assessor = CostBenefitAssessor::default();
        let costs = vec![CostItem::new("License", 50000.0, 0, "capital", false)];
        let benefits = vec![BenefitItem::new("Savings", 5000.0, 2, "cost_savings", true, 0.9)];

        let sensitivity = assessor.sensitivity_analysis(&costs, &benefits);
        assert_eq!(sensitivity.len(), 3);
        assert!(sensitivity["costs_+20%"] < 0.0);
        assert!(sensitivity["benefits_-20%"] < 0.0);
        assert!(sensitivity["benefits_delayed_3mo"] < 0.0);
    }

    #[test]
    fn test_zero_base_npv_gives_zero_sensitivity() {
        let assessor = CostBenefitAssessor::default();
        let sensitivity = assessor.sensitivity_analysis(&[], &[]);
        assert!(sensitivity.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let assessor = CostBenefitAssessor::default();
        let result = assessor.assess_project(
            "Bad",
            &[],
            &[BenefitItem::new("Oops", 1.0, 0, "revenue", false, 1.5)],
        );
        assert!(result.is_err());
    }
}

//! 預算配置最佳化：效率評分、機會辨識與重新分配。

use crate::core::scoring::{ComponentTransform, WeightedScorer};
use crate::domain::model::AnalysisKind;
use crate::domain::ports::Report;
use crate::utils::error::{AdvisoryError, Result};
use serde::{Deserialize, Serialize};

/// 低效類別最多削減的比例
const MAX_REDUCTION: f64 = 0.10;
/// 建議只列出超過總預算 1% 的變動
const REPORTABLE_CHANGE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    Fixed,
    #[default]
    Variable,
    Discretionary,
}

impl CostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostType::Fixed => "fixed",
            CostType::Variable => "variable",
            CostType::Discretionary => "discretionary",
        }
    }

    /// (roi 權重, priority 權重)
    fn weights(&self) -> (f64, f64) {
        match self {
            CostType::Variable => (0.7, 0.3),
            CostType::Discretionary => (0.8, 0.2),
            CostType::Fixed => (0.4, 0.6),
        }
    }

    fn is_flexible(&self) -> bool {
        !matches!(self, CostType::Fixed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub name: String,
    /// 佔總預算比例 (0-1)
    pub current_allocation: f64,
    #[serde(default)]
    pub roi: f64,
    #[serde(default = "default_priority")]
    pub priority_score: f64,
    #[serde(default)]
    pub cost_type: CostType,
}

fn default_priority() -> f64 {
    5.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOpportunities {
    pub high_roi_underfunded: Vec<String>,
    pub low_roi_overfunded: Vec<String>,
    pub cost_reduction: Vec<String>,
    pub reallocation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub name: String,
    pub current_allocation_pct: f64,
    pub proposed_allocation_pct: f64,
    pub current_amount: f64,
    pub proposed_amount: f64,
    pub roi: f64,
    pub priority_score: f64,
    pub cost_type: CostType,
    pub efficiency_score: f64,
}

impl CategoryAllocation {
    pub fn change(&self) -> f64 {
        self.proposed_amount - self.current_amount
    }

    pub fn change_pct(&self) -> f64 {
        if self.current_amount > 0.0 {
            self.change() / self.current_amount * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub savings_identified: f64,
    pub reallocation_amount: f64,
    pub efficiency_gain_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub total_budget: f64,
    pub optimization_summary: OptimizationSummary,
    pub categories: Vec<CategoryAllocation>,
    pub opportunities: OptimizationOpportunities,
    pub recommendations: Vec<String>,
}

/// 儀表板 CSV 的一列
#[derive(Debug, Serialize)]
struct DashboardRow<'a> {
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Current_Allocation_$")]
    current_amount: f64,
    #[serde(rename = "Current_Allocation_%")]
    current_pct: f64,
    #[serde(rename = "Proposed_Allocation_$")]
    proposed_amount: f64,
    #[serde(rename = "Proposed_Allocation_%")]
    proposed_pct: f64,
    #[serde(rename = "Change_$")]
    change: f64,
    #[serde(rename = "Change_%")]
    change_pct: f64,
    #[serde(rename = "ROI")]
    roi: f64,
    #[serde(rename = "Priority_Score")]
    priority_score: f64,
    #[serde(rename = "Efficiency_Score")]
    efficiency_score: f64,
    #[serde(rename = "Cost_Type")]
    cost_type: &'a str,
}

impl BudgetReport {
    pub fn dashboard_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for c in &self.categories {
            writer.serialize(DashboardRow {
                category: &c.name,
                current_amount: c.current_amount,
                current_pct: c.current_allocation_pct,
                proposed_amount: c.proposed_amount,
                proposed_pct: c.proposed_allocation_pct,
                change: c.change(),
                change_pct: c.change_pct(),
                roi: c.roi,
                priority_score: c.priority_score,
                efficiency_score: c.efficiency_score,
                cost_type: c.cost_type.as_str(),
            })?;
        }
        writer.into_inner().map_err(|e| AdvisoryError::ProcessingError {
            message: format!("Failed to flush dashboard CSV: {}", e),
        })
    }
}

impl Report for BudgetReport {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Budget
    }

    fn export_stem(&self) -> String {
        "budget_optimization".to_string()
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Total Budget: ${:.0}", self.total_budget),
            format!(
                "Efficiency Gain: {:.1}%",
                self.optimization_summary.efficiency_gain_pct
            ),
            format!(
                "Reallocation Amount: ${:.0}",
                self.optimization_summary.reallocation_amount
            ),
        ];
        let mut ordered: Vec<&CategoryAllocation> = self.categories.iter().collect();
        ordered.sort_by(|a, b| b.proposed_amount.total_cmp(&a.proposed_amount));
        for c in ordered {
            lines.push(format!(
                "{}: ${:.0} -> ${:.0} ({:+.1}%) | ROI {:.1}x | Efficiency {:.1}",
                c.name,
                c.current_amount,
                c.proposed_amount,
                c.change_pct(),
                c.roi,
                c.efficiency_score
            ));
        }
        lines.extend(self.recommendations.iter().cloned());
        lines
    }

    fn csv_export(&self) -> Result<Option<Vec<u8>>> {
        self.dashboard_csv().map(Some)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetOptimizer;

impl BudgetOptimizer {
    pub fn new() -> Self {
        Self
    }

    fn scorer(cost_type: CostType) -> WeightedScorer {
        let (roi_weight, priority_weight) = cost_type.weights();
        WeightedScorer::new()
            .weighted_component("roi", ComponentTransform::scaled(2.0), roi_weight)
            .weighted_component("priority", ComponentTransform::IDENTITY, priority_weight)
    }

    /// roi 先換算為 clamp(roi * 2)，再依成本類型與優先度加權
    pub fn efficiency_score(&self, category: &BudgetCategory) -> Result<f64> {
        let card = Self::scorer(category.cost_type).score_with(|name| match name {
            "roi" => Some(category.roi),
            "priority" => Some(category.priority_score),
            _ => None,
        })?;
        Ok(card.overall)
    }

    pub fn identify_opportunities(
        &self,
        categories: &[BudgetCategory],
    ) -> Result<OptimizationOpportunities> {
        let mut opportunities = OptimizationOpportunities::default();

        for category in categories {
            let efficiency = self.efficiency_score(category)?;

            if efficiency >= 8.0 && category.current_allocation < 0.10 {
                opportunities
                    .high_roi_underfunded
                    .push(category.name.clone());
            } else if efficiency <= 4.0 && category.current_allocation > 0.05 {
                opportunities.low_roi_overfunded.push(category.name.clone());
            }

            if category.cost_type == CostType::Discretionary && category.roi < 1.0 {
                opportunities.cost_reduction.push(category.name.clone());
            }

            if efficiency >= 7.0 && category.cost_type.is_flexible() {
                opportunities
                    .reallocation
                    .push(format!("Increase {}", category.name));
            }
        }

        Ok(opportunities)
    }

    pub fn optimize(&self, categories: &[BudgetCategory], total_budget: f64) -> Result<BudgetReport> {
        if total_budget <= 0.0 {
            return Err(AdvisoryError::InvalidConfigValueError {
                field: "total_budget".to_string(),
                value: total_budget.to_string(),
                reason: "Total budget must be positive".to_string(),
            });
        }

        tracing::info!(
            "💰 Optimizing {} budget categories (total ${:.0})",
            categories.len(),
            total_budget
        );

        let efficiencies = categories
            .iter()
            .map(|c| self.efficiency_score(c))
            .collect::<Result<Vec<f64>>>()?;

        let mut proposed: Vec<f64> = categories.iter().map(|c| c.current_allocation).collect();
        let mut pool = 0.0;

        for (i, category) in categories.iter().enumerate() {
            let efficiency = efficiencies[i];
            if efficiency < 5.0 && category.cost_type.is_flexible() {
                let reduction_pct = MAX_REDUCTION.min((5.0 - efficiency) / 20.0);
                let reduction = category.current_allocation * total_budget * reduction_pct;
                proposed[i] -= reduction / total_budget;
                pool += reduction;
                tracing::debug!(
                    "Reducing {} by ${:.0} (efficiency {:.2})",
                    category.name,
                    reduction,
                    efficiency
                );
            }
        }

        let receivers: Vec<usize> = (0..categories.len())
            .filter(|&i| efficiencies[i] > 7.0 && categories[i].cost_type.is_flexible())
            .collect();
        let total_efficiency: f64 = receivers.iter().map(|&i| efficiencies[i]).sum();

        if pool > 0.0 && total_efficiency > 0.0 {
            for &i in &receivers {
                let increase = efficiencies[i] / total_efficiency * pool;
                proposed[i] += increase / total_budget;
            }
        } else if pool > 0.0 {
            tracing::warn!("No high-efficiency category to receive ${:.0}", pool);
        }

        let allocations: Vec<CategoryAllocation> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| CategoryAllocation {
                name: c.name.clone(),
                current_allocation_pct: c.current_allocation * 100.0,
                proposed_allocation_pct: proposed[i] * 100.0,
                current_amount: c.current_allocation * total_budget,
                proposed_amount: proposed[i] * total_budget,
                roi: c.roi,
                priority_score: c.priority_score,
                cost_type: c.cost_type,
                efficiency_score: efficiencies[i],
            })
            .collect();

        let opportunities = self.identify_opportunities(categories)?;
        let recommendations = recommendations(&allocations, &opportunities, total_budget);
        let efficiency_gain_pct = efficiency_gain(categories, &proposed);

        tracing::info!(
            "✅ Budget optimized: ${:.0} reallocated, efficiency gain {:.1}%",
            pool,
            efficiency_gain_pct
        );

        Ok(BudgetReport {
            total_budget,
            optimization_summary: OptimizationSummary {
                savings_identified: 0.0,
                reallocation_amount: pool,
                efficiency_gain_pct,
            },
            categories: allocations,
            opportunities,
            recommendations,
        })
    }
}

/// (提案加權 ROI - 目前加權 ROI) / 目前 * 100；目前 <= 0 時為 0
fn efficiency_gain(categories: &[BudgetCategory], proposed: &[f64]) -> f64 {
    let current: f64 = categories.iter().map(|c| c.current_allocation * c.roi).sum();
    let optimized: f64 = categories
        .iter()
        .zip(proposed)
        .map(|(c, p)| p * c.roi)
        .sum();

    if current > 0.0 {
        (optimized - current) / current * 100.0
    } else {
        0.0
    }
}

fn recommendations(
    allocations: &[CategoryAllocation],
    opportunities: &OptimizationOpportunities,
    total_budget: f64,
) -> Vec<String> {
    let mut out = Vec::new();

    for c in allocations {
        let change = c.change();
        if change.abs() <= total_budget * REPORTABLE_CHANGE {
            continue;
        }
        if change > 0.0 {
            out.push(format!(
                "Increase {} budget by ${:.0} ({:+.1}%) due to high ROI of {:.1}x",
                c.name,
                change,
                c.change_pct(),
                c.roi
            ));
        } else {
            out.push(format!(
                "Reduce {} budget by ${:.0} ({:.1}%) due to low efficiency score",
                c.name,
                -change,
                c.change_pct()
            ));
        }
    }

    if !opportunities.high_roi_underfunded.is_empty() {
        out.push(format!(
            "Consider additional investment in high-ROI areas: {}",
            opportunities.high_roi_underfunded.join(", ")
        ));
    }
    if !opportunities.cost_reduction.is_empty() {
        out.push(format!(
            "Review cost structure for potential reductions: {}",
            opportunities.cost_reduction.join(", ")
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, alloc: f64, roi: f64, priority: f64, cost_type: CostType) -> BudgetCategory {
        BudgetCategory {
            name: name.to_string(),
            current_allocation: alloc,
            roi,
            priority_score: priority,
            cost_type,
        }
    }

    #[test]
    fn test_efficiency_weights_by_cost_type() {
        let optimizer = BudgetOptimizer::new();
        let variable = category("Sales", 0.3, 2.5, 8.0, CostType::Variable);
        let fixed = category("Ops", 0.2, 1.8, 7.0, CostType::Fixed);
        let discretionary = category("Training", 0.05, 3.8, 6.5, CostType::Discretionary);

        assert!((optimizer.efficiency_score(&variable).unwrap() - 5.9).abs() < 1e-9);
        assert!((optimizer.efficiency_score(&fixed).unwrap() - (3.6 * 0.4 + 4.2)).abs() < 1e-9);
        assert!((optimizer.efficiency_score(&discretionary).unwrap() - (6.08 + 1.3)).abs() < 1e-9);
    }

    #[test]
    fn test_roi_component_is_clamped() {
        let optimizer = BudgetOptimizer::new();
        let product = category("Product", 0.25, 6.0, 9.0, CostType::Variable);
        assert!((optimizer.efficiency_score(&product).unwrap() - 9.7).abs() < 1e-9);
    }

    #[test]
    fn test_low_efficiency_flexible_category_funds_pool() {
        let optimizer = BudgetOptimizer::new();
        let categories = vec![
            category("Events", 0.30, 0.5, 3.0, CostType::Variable),
            category("Product", 0.50, 4.2, 9.0, CostType::Variable),
            category("Admin", 0.20, 0.5, 2.0, CostType::Fixed),
        ];

        let report = optimizer.optimize(&categories, 1_000_000.0).unwrap();

        // events 效率 = 0.7 + 0.9 = 1.6，削減 min(0.10, 3.4/20) = 10%
        let pool = report.optimization_summary.reallocation_amount;
        assert!((pool - 30_000.0).abs() < 1e-6);
        assert!((report.categories[0].proposed_amount - 270_000.0).abs() < 1e-6);
        assert!((report.categories[1].proposed_amount - 530_000.0).abs() < 1e-6);
        assert_eq!(report.categories[2].proposed_amount, 200_000.0);

        let total: f64 = report.categories.iter().map(|c| c.proposed_amount).sum();
        assert!((total - 1_000_000.0).abs() < 1e-6);
        assert!(report.optimization_summary.efficiency_gain_pct > 0.0);
        assert!(report.recommendations[0].starts_with("Reduce Events budget by $30000"));
    }

    #[test]
    fn test_opportunities() {
        let optimizer = BudgetOptimizer::new();
        let categories = vec![
            category("Training", 0.05, 4.0, 9.0, CostType::Discretionary),
            category("Perks", 0.10, 0.5, 2.0, CostType::Discretionary),
        ];

        let opportunities = optimizer.identify_opportunities(&categories).unwrap();
        assert_eq!(opportunities.high_roi_underfunded, vec!["Training"]);
        assert_eq!(opportunities.low_roi_overfunded, vec!["Perks"]);
        assert_eq!(opportunities.cost_reduction, vec!["Perks"]);
        assert_eq!(opportunities.reallocation, vec!["Increase Training"]);
    }

    #[test]
    fn test_zero_roi_means_no_efficiency_gain() {
        let optimizer = BudgetOptimizer::new();
        let categories = vec![category("Ops", 1.0, 0.0, 5.0, CostType::Fixed)];
        let report = optimizer.optimize(&categories, 100.0).unwrap();
        assert_eq!(report.optimization_summary.efficiency_gain_pct, 0.0);
    }

    #[test]
    fn test_non_positive_budget_rejected() {
        let optimizer = BudgetOptimizer::new();
        assert!(optimizer.optimize(&[], 0.0).is_err());
    }

    #[test]
    fn test_dashboard_csv_headers() {
        let optimizer = BudgetOptimizer::new();
        let categories = vec![category("Sales", 1.0, 2.5, 8.0, CostType::Variable)];
        let report = optimizer.optimize(&categories, 1000.0).unwrap();

        let csv = String::from_utf8(report.dashboard_csv().unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Category,Current_Allocation_$,Current_Allocation_%,Proposed_Allocation_$,Proposed_Allocation_%,Change_$,Change_%,ROI,Priority_Score,Efficiency_Score,Cost_Type"
        );
        assert!(lines.next().unwrap().starts_with("Sales,1000.0,100.0"));
    }
}

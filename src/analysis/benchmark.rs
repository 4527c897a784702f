//! 績效標竿：產生標竿分析提示、計算績效缺口並排定改善優先序。

use super::due_diligence::slug;
use crate::core::scoring::{ComponentTransform, MissingComponentPolicy, WeightedScorer};
use crate::core::stats;
use crate::domain::model::AnalysisKind;
use crate::domain::ports::Report;
use crate::prompt::library::{
    register_benchmark_templates, COMPREHENSIVE_BENCHMARK_ID, IMPROVEMENT_PLANNING_ID,
    INDUSTRY_BENCHMARK_ID,
};
use crate::prompt::model::PromptContext;
use crate::prompt::registry::PromptRegistry;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const WEIGHT_FINANCIAL_IMPACT: f64 = 0.35;
pub const WEIGHT_COMPETITIVE_IMPORTANCE: f64 = 0.25;
pub const WEIGHT_FEASIBILITY: f64 = 0.20;
pub const WEIGHT_RESOURCES: f64 = 0.20;

const IMPROVEMENT_AREA_LIMIT: usize = 3;
const NO_VARS: [(&str, &str); 0] = [];
const INVESTOR_GUIDANCE: &str = "Include investor communication implications: performance narrative, peer positioning disclosure, and progress reporting cadence.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkType {
    #[serde(rename = "financial_performance")]
    Financial,
    #[serde(rename = "operational_efficiency")]
    Operational,
    #[serde(rename = "strategic_positioning")]
    Strategic,
    #[serde(rename = "esg_sustainability")]
    Esg,
    #[serde(rename = "digital_maturity")]
    Digital,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkScope {
    #[default]
    #[serde(rename = "industry_peers")]
    Industry,
    #[serde(rename = "size_cohort")]
    Size,
    #[serde(rename = "geographic_region")]
    Geographic,
    #[serde(rename = "best_in_class")]
    BestInClass,
    #[serde(rename = "historical_performance")]
    Historical,
}

impl BenchmarkScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkScope::Industry => "industry_peers",
            BenchmarkScope::Size => "size_cohort",
            BenchmarkScope::Geographic => "geographic_region",
            BenchmarkScope::BestInClass => "best_in_class",
            BenchmarkScope::Historical => "historical_performance",
        }
    }

    /// 提示中使用的文字，如 "industry peers"
    pub fn phrase(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

fn default_types() -> Vec<BenchmarkType> {
    vec![BenchmarkType::Financial]
}

fn default_time_period() -> String {
    "3 years".to_string()
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_types")]
    pub benchmark_types: Vec<BenchmarkType>,
    #[serde(default)]
    pub benchmark_scope: BenchmarkScope,
    #[serde(default)]
    pub peer_companies: Vec<String>,
    #[serde(default = "default_time_period")]
    pub time_period: String,
    #[serde(default)]
    pub performance_metrics: Vec<String>,
    #[serde(default = "enabled")]
    pub gap_analysis: bool,
    #[serde(default = "enabled")]
    pub improvement_planning: bool,
    #[serde(default)]
    pub investor_communication: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            benchmark_types: default_types(),
            benchmark_scope: BenchmarkScope::default(),
            peer_companies: Vec::new(),
            time_period: default_time_period(),
            performance_metrics: Vec::new(),
            gap_analysis: true,
            improvement_planning: true,
            investor_communication: false,
        }
    }
}

pub const METRIC_CATALOGUE: [(&str, [&str; 10]); 5] = [
    (
        "financial_performance",
        [
            "Revenue growth rate (3-year CAGR)",
            "EBITDA margin",
            "Net profit margin",
            "Return on Assets (ROA)",
            "Return on Equity (ROE)",
            "Return on Invested Capital (ROIC)",
            "Free cash flow margin",
            "Cash conversion cycle",
            "Debt-to-equity ratio",
            "Interest coverage ratio",
        ],
    ),
    (
        "operational_efficiency",
        [
            "Revenue per employee",
            "Operating expense ratio",
            "Asset turnover",
            "Inventory turnover",
            "Receivables turnover",
            "Working capital efficiency",
            "Capacity utilization",
            "Quality metrics (defect rates)",
            "Customer acquisition cost",
            "Customer lifetime value",
        ],
    ),
    (
        "growth_and_investment",
        [
            "R&D as % of revenue",
            "Capital expenditure as % of revenue",
            "Technology spending ratio",
            "Employee training investment",
            "Innovation pipeline strength",
            "Time to market metrics",
            "Market share growth",
            "Geographic expansion rate",
            "New product revenue %",
            "Digital transformation progress",
        ],
    ),
    (
        "customer_and_market",
        [
            "Customer satisfaction scores",
            "Net Promoter Score (NPS)",
            "Customer retention rate",
            "Market share position",
            "Brand recognition metrics",
            "Customer complaint rates",
            "Service quality metrics",
            "Cross-selling effectiveness",
            "Customer engagement metrics",
            "Pricing premium ability",
        ],
    ),
    (
        "esg_and_sustainability",
        [
            "Carbon footprint intensity",
            "Energy efficiency metrics",
            "Waste reduction performance",
            "Diversity and inclusion metrics",
            "Employee engagement scores",
            "Community investment ratio",
            "Governance rating scores",
            "Regulatory compliance record",
            "Stakeholder satisfaction",
            "Sustainability reporting quality",
        ],
    ),
];

pub fn industry_benchmark_metrics() -> BTreeMap<String, Vec<String>> {
    METRIC_CATALOGUE
        .iter()
        .map(|(category, metrics)| {
            (
                category.to_string(),
                metrics.iter().map(|m| m.to_string()).collect(),
            )
        })
        .collect()
}

fn neutral() -> f64 {
    5.0
}

/// 缺口優先序的四個 1-10 評分；資源需求越高越不利
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapFactors {
    #[serde(default = "neutral")]
    pub financial_impact: f64,
    #[serde(default = "neutral")]
    pub competitive_importance: f64,
    #[serde(default = "neutral")]
    pub implementation_feasibility: f64,
    #[serde(default = "neutral")]
    pub resource_requirements: f64,
}

impl Default for GapFactors {
    fn default() -> Self {
        Self {
            financial_impact: neutral(),
            competitive_importance: neutral(),
            implementation_feasibility: neutral(),
            resource_requirements: neutral(),
        }
    }
}

impl GapFactors {
    fn raw(&self, component: &str) -> Option<f64> {
        match component {
            "financial_impact" => Some(self.financial_impact),
            "competitive_importance" => Some(self.competitive_importance),
            "implementation_feasibility" => Some(self.implementation_feasibility),
            "resource_requirements" => Some(self.resource_requirements),
            _ => None,
        }
    }
}

/// 我方指標與標竿值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricObservation {
    pub metric: String,
    pub value: f64,
    pub benchmark: f64,
    #[serde(default)]
    pub lower_is_better: bool,
    #[serde(default)]
    pub factors: GapFactors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceGap {
    pub metric: String,
    pub value: f64,
    pub benchmark: f64,
    /// 我方 - 標竿
    pub absolute_gap: f64,
    /// 我方 / 標竿；標竿為 0 時為 None
    pub relative_gap: Option<f64>,
    pub underperforming: bool,
    pub priority_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritizationCriterion {
    pub weight: f64,
    pub measurement: &'static str,
    pub scale: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapAssessmentMethodology {
    pub data_collection: Vec<&'static str>,
    pub gap_calculation: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapFramework {
    pub gap_assessment_methodology: GapAssessmentMethodology,
    pub gap_prioritization_criteria: BTreeMap<&'static str, PrioritizationCriterion>,
    pub improvement_target_setting: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernanceBody {
    pub composition: &'static str,
    pub frequency: &'static str,
    pub responsibilities: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernanceStructure {
    pub steering_committee: GovernanceBody,
    pub working_groups: GovernanceBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringFramework {
    pub data_refresh_cycle: &'static str,
    pub reporting_cadence: &'static str,
    pub escalation_triggers: Vec<&'static str>,
    pub continuous_improvement: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernanceFramework {
    pub governance_structure: GovernanceStructure,
    pub monitoring_framework: MonitoringFramework,
}

pub fn performance_gap_framework() -> GapFramework {
    let criterion = |weight, measurement, scale| PrioritizationCriterion {
        weight,
        measurement,
        scale,
    };
    GapFramework {
        gap_assessment_methodology: GapAssessmentMethodology {
            data_collection: vec![
                "Public financial data analysis",
                "Industry reports and surveys",
                "Management consulting benchmarks",
                "Credit rating agency reports",
                "Investor presentations and calls",
            ],
            gap_calculation: vec![
                "Absolute gap (our metric - benchmark)",
                "Relative gap (our metric / benchmark)",
                "Percentile ranking position",
                "Standard deviations from mean",
                "Quartile positioning analysis",
            ],
        },
        gap_prioritization_criteria: BTreeMap::from([
            ("financial_impact", criterion(WEIGHT_FINANCIAL_IMPACT, "NPV of closing gap", "1-10")),
            ("competitive_importance", criterion(WEIGHT_COMPETITIVE_IMPORTANCE, "Strategic significance", "1-10")),
            ("implementation_feasibility", criterion(WEIGHT_FEASIBILITY, "Ease of execution", "1-10")),
            ("resource_requirements", criterion(WEIGHT_RESOURCES, "Investment needed", "1-10 (inverse)")),
        ]),
        improvement_target_setting: vec![
            "Top quartile performance target",
            "Best-in-class aspiration level",
            "Phased improvement milestones",
            "Time-bound achievement timeline",
            "Risk-adjusted target ranges",
        ],
    }
}

pub fn benchmarking_governance_framework() -> GovernanceFramework {
    GovernanceFramework {
        governance_structure: GovernanceStructure {
            steering_committee: GovernanceBody {
                composition: "C-suite executives",
                frequency: "Quarterly",
                responsibilities: vec![
                    "Strategic direction and priorities",
                    "Resource allocation decisions",
                    "Performance target approval",
                    "Major initiative oversight",
                ],
            },
            working_groups: GovernanceBody {
                composition: "Functional leaders and analysts",
                frequency: "Monthly",
                responsibilities: vec![
                    "Data collection and analysis",
                    "Best practice identification",
                    "Improvement initiative development",
                    "Progress monitoring and reporting",
                ],
            },
        },
        monitoring_framework: MonitoringFramework {
            data_refresh_cycle: "Quarterly with annual comprehensive update",
            reporting_cadence: "Monthly dashboard, quarterly deep dive",
            escalation_triggers: vec![
                "Performance deterioration vs. benchmarks",
                "New competitive threats identified",
                "Industry best practices evolution",
                "Regulatory or market changes",
            ],
            continuous_improvement: vec![
                "Benchmarking methodology refinement",
                "Peer group composition updates",
                "Metric relevance and validity review",
                "Stakeholder feedback integration",
            ],
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkInput {
    pub company_name: String,
    pub context: PromptContext,
    #[serde(default)]
    pub config: BenchmarkConfig,
    /// 未指定時取優先序最高的落後指標
    #[serde(default)]
    pub improvement_areas: Option<String>,
    #[serde(default)]
    pub observations: Vec<MetricObservation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPrompts {
    pub comprehensive_analysis: String,
    pub industry_positioning: String,
    pub improvement_planning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub company_name: String,
    pub context: PromptContext,
    pub config: BenchmarkConfig,
    pub prompts: BenchmarkPrompts,
    pub metric_catalogue: BTreeMap<String, Vec<String>>,
    /// 依優先分數遞減
    pub gaps: Vec<PerformanceGap>,
    pub priority_improvements: Vec<String>,
    pub average_priority_score: f64,
    pub gap_framework: GapFramework,
    pub governance_framework: GovernanceFramework,
}

impl Report for BenchmarkReport {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Benchmark
    }

    fn export_stem(&self) -> String {
        format!("performance_benchmark_{}", slug(&self.company_name))
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Company: {}", self.company_name),
            format!(
                "Scope: {} over {}",
                self.config.benchmark_scope.phrase(),
                self.config.time_period
            ),
            format!(
                "Comprehensive prompt: {} characters",
                self.prompts.comprehensive_analysis.len()
            ),
        ];
        for gap in self.gaps.iter().filter(|g| g.underperforming) {
            lines.push(format!(
                "Gap: {} {:.2} vs {:.2} (priority {:.2})",
                gap.metric, gap.value, gap.benchmark, gap.priority_score
            ));
        }
        lines
    }
}

pub struct BenchmarkAnalyzer {
    registry: PromptRegistry,
    prioritizer: WeightedScorer,
}

impl Default for BenchmarkAnalyzer {
    fn default() -> Self {
        Self::new(MissingComponentPolicy::Neutral)
    }
}

impl BenchmarkAnalyzer {
    pub fn new(policy: MissingComponentPolicy) -> Self {
        let mut registry = PromptRegistry::new();
        register_benchmark_templates(&mut registry);
        Self::with_registry(registry, policy)
    }

    /// 使用已註冊標竿範本的登錄表
    pub fn with_registry(registry: PromptRegistry, policy: MissingComponentPolicy) -> Self {
        let prioritizer = WeightedScorer::new()
            .weighted_component("financial_impact", ComponentTransform::IDENTITY, WEIGHT_FINANCIAL_IMPACT)
            .weighted_component("competitive_importance", ComponentTransform::IDENTITY, WEIGHT_COMPETITIVE_IMPORTANCE)
            .weighted_component("implementation_feasibility", ComponentTransform::IDENTITY, WEIGHT_FEASIBILITY)
            .weighted_component("resource_requirements", ComponentTransform::new(-1.0, 10.0), WEIGHT_RESOURCES)
            .with_policy(policy);
        Self {
            registry,
            prioritizer,
        }
    }

    pub fn registry(&self) -> &PromptRegistry {
        &self.registry
    }

    pub fn generate_benchmark_analysis_prompt(
        &self,
        config: &BenchmarkConfig,
        context: &PromptContext,
    ) -> Result<String> {
        let scope = config.benchmark_scope.phrase();
        let vars = [
            ("benchmark_scope", scope.as_str()),
            ("time_period", config.time_period.as_str()),
        ];
        let mut prompt = self
            .registry
            .generate_prompt(COMPREHENSIVE_BENCHMARK_ID, context, &vars[..])?;
        if config.investor_communication {
            prompt.push_str("\n\n");
            prompt.push_str(INVESTOR_GUIDANCE);
        }
        Ok(prompt)
    }

    pub fn generate_industry_benchmark_prompt(&self, context: &PromptContext) -> Result<String> {
        self.registry
            .generate_prompt_with(INDUSTRY_BENCHMARK_ID, context, &NO_VARS[..], &["company_size", "industry"])
    }

    pub fn generate_improvement_planning_prompt(
        &self,
        improvement_areas: &str,
        context: &PromptContext,
    ) -> Result<String> {
        let vars = [("improvement_areas", improvement_areas)];
        self.registry
            .generate_prompt(IMPROVEMENT_PLANNING_ID, context, &vars[..])
    }

    /// 加權 0.35 / 0.25 / 0.20 / 0.20，資源需求以 10 - 值計
    pub fn priority_score(&self, factors: &GapFactors) -> Result<f64> {
        Ok(self.prioritizer.score_with(|name| factors.raw(name))?.overall)
    }

    pub fn calculate_gap(&self, observation: &MetricObservation) -> Result<PerformanceGap> {
        let absolute_gap = observation.value - observation.benchmark;
        let relative_gap = if observation.benchmark != 0.0 {
            Some(observation.value / observation.benchmark)
        } else {
            tracing::warn!("Benchmark for '{}' is zero, relative gap undefined", observation.metric);
            None
        };
        let underperforming = if observation.lower_is_better {
            observation.value > observation.benchmark
        } else {
            observation.value < observation.benchmark
        };

        Ok(PerformanceGap {
            metric: observation.metric.clone(),
            value: observation.value,
            benchmark: observation.benchmark,
            absolute_gap,
            relative_gap,
            underperforming,
            priority_score: self.priority_score(&observation.factors)?,
        })
    }

    /// 依優先分數遞減排序，同分維持輸入順序
    pub fn prioritize_gaps(&self, observations: &[MetricObservation]) -> Result<Vec<PerformanceGap>> {
        let mut gaps = observations
            .iter()
            .map(|o| self.calculate_gap(o))
            .collect::<Result<Vec<_>>>()?;
        gaps.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
        Ok(gaps)
    }

    pub fn analyze(&self, input: &BenchmarkInput) -> Result<BenchmarkReport> {
        tracing::info!("📊 Benchmarking {} against {}", input.company_name, input.config.benchmark_scope.phrase());

        let gaps = if input.config.gap_analysis {
            self.prioritize_gaps(&input.observations)?
        } else {
            Vec::new()
        };
        let priority_improvements: Vec<String> = gaps
            .iter()
            .filter(|g| g.underperforming)
            .map(|g| g.metric.clone())
            .collect();
        let average_priority_score =
            stats::mean(&gaps.iter().map(|g| g.priority_score).collect::<Vec<_>>());

        let comprehensive_analysis = self.generate_benchmark_analysis_prompt(&input.config, &input.context)?;
        let industry_positioning = self.generate_industry_benchmark_prompt(&input.context)?;

        let improvement_planning = if input.config.improvement_planning {
            let areas = match &input.improvement_areas {
                Some(areas) => Some(areas.clone()),
                None if !priority_improvements.is_empty() => Some(
                    priority_improvements
                        .iter()
                        .take(IMPROVEMENT_AREA_LIMIT)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                None => None,
            };
            let prompt = match areas {
                Some(areas) => self.generate_improvement_planning_prompt(&areas, &input.context)?,
                None => self.registry.generate_prompt(
                    IMPROVEMENT_PLANNING_ID,
                    &input.context,
                    &NO_VARS[..],
                )?,
            };
            Some(prompt)
        } else {
            None
        };

        tracing::debug!(
            "{} gaps analysed, {} underperforming",
            gaps.len(),
            priority_improvements.len()
        );

        Ok(BenchmarkReport {
            company_name: input.company_name.clone(),
            context: input.context.clone(),
            config: input.config.clone(),
            prompts: BenchmarkPrompts {
                comprehensive_analysis,
                industry_positioning,
                improvement_planning,
            },
            metric_catalogue: industry_benchmark_metrics(),
            gaps,
            priority_improvements,
            average_priority_score,
            gap_framework: performance_gap_framework(),
            governance_framework: benchmarking_governance_framework(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::model::{CompanySize, ExecutiveRole, IndustryType};
    use proptest::prelude::*;

    fn context() -> PromptContext {
        PromptContext::new(IndustryType::Technology, ExecutiveRole::Cfo, CompanySize::Enterprise)
    }

    fn observation(metric: &str, value: f64, benchmark: f64, factors: GapFactors) -> MetricObservation {
        MetricObservation {
            metric: metric.to_string(),
            value,
            benchmark,
            lower_is_better: false,
            factors,
        }
    }

    #[test]
    fn test_priority_weights_and_inverse_resources() {
        let analyzer = BenchmarkAnalyzer::default();
        let factors = GapFactors {
            financial_impact: 8.0,
            competitive_importance: 6.0,
            implementation_feasibility: 4.0,
            resource_requirements: 7.0,
        };
        let expected = 8.0 * 0.35 + 6.0 * 0.25 + 4.0 * 0.20 + (10.0 - 7.0) * 0.20;
        assert!((analyzer.priority_score(&factors).unwrap() - expected).abs() < 1e-9);
        assert!((analyzer.priority_score(&GapFactors::default()).unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_calculation() {
        let analyzer = BenchmarkAnalyzer::default();
        let gap = analyzer
            .calculate_gap(&observation("EBITDA margin", 15.0, 20.0, GapFactors::default()))
            .unwrap();
        assert_eq!(gap.absolute_gap, -5.0);
        assert_eq!(gap.relative_gap, Some(0.75));
        assert!(gap.underperforming);

        let mut cost = observation("Customer acquisition cost", 120.0, 100.0, GapFactors::default());
        cost.lower_is_better = true;
        assert!(analyzer.calculate_gap(&cost).unwrap().underperforming);

        let zero = analyzer
            .calculate_gap(&observation("Waste", 3.0, 0.0, GapFactors::default()))
            .unwrap();
        assert_eq!(zero.relative_gap, None);
    }

    #[test]
    fn test_comprehensive_prompt_substitutes_scope() {
        let analyzer = BenchmarkAnalyzer::default();
        let config = BenchmarkConfig {
            benchmark_scope: BenchmarkScope::BestInClass,
            time_period: "5 years".to_string(),
            investor_communication: true,
            ..Default::default()
        };
        let prompt = analyzer.generate_benchmark_analysis_prompt(&config, &context()).unwrap();

        assert!(prompt.contains("against best in class over a 5 years period"));
        assert!(prompt.contains("Focus on innovation metrics"));
        assert!(prompt.ends_with(INVESTOR_GUIDANCE));
        assert!(!prompt.contains("{benchmark_scope}"));
    }

    #[test]
    fn test_analyze_derives_improvement_areas_from_gaps() {
        let analyzer = BenchmarkAnalyzer::default();
        let high = GapFactors {
            financial_impact: 9.0,
            ..Default::default()
        };
        let input = BenchmarkInput {
            company_name: "Acme Corp".to_string(),
            context: context(),
            config: BenchmarkConfig::default(),
            improvement_areas: None,
            observations: vec![
                observation("Asset turnover", 0.8, 1.0, GapFactors::default()),
                observation("Net Promoter Score (NPS)", 30.0, 45.0, high),
                observation("EBITDA margin", 25.0, 20.0, high),
            ],
        };

        let report = analyzer.analyze(&input).unwrap();
        assert_eq!(
            report.priority_improvements,
            vec!["Net Promoter Score (NPS)".to_string(), "Asset turnover".to_string()]
        );
        let plan = report.prompts.improvement_planning.as_deref().unwrap();
        assert!(plan.contains("targeting Net Promoter Score (NPS), Asset turnover"));
        assert_eq!(report.metric_catalogue.len(), 5);
        assert_eq!(report.export_stem(), "performance_benchmark_acme_corp");
    }

    #[test]
    fn test_gap_analysis_disabled() {
        let analyzer = BenchmarkAnalyzer::default();
        let input = BenchmarkInput {
            company_name: "Beta".to_string(),
            context: context(),
            config: BenchmarkConfig {
                gap_analysis: false,
                improvement_planning: false,
                ..Default::default()
            },
            improvement_areas: None,
            observations: vec![observation("ROE", 5.0, 10.0, GapFactors::default())],
        };

        let report = analyzer.analyze(&input).unwrap();
        assert!(report.gaps.is_empty());
        assert!(report.prompts.improvement_planning.is_none());
    }

    proptest! {
        #[test]
        fn prop_priority_score_within_range(
            a in -20.0f64..20.0,
            b in -20.0f64..20.0,
            c in -20.0f64..20.0,
            d in -20.0f64..20.0,
        ) {
            let analyzer = BenchmarkAnalyzer::default();
            let score = analyzer.priority_score(&GapFactors {
                financial_impact: a,
                competitive_importance: b,
                implementation_feasibility: c,
                resource_requirements: d,
            }).unwrap();
            prop_assert!((0.0..=10.0 + 1e-9).contains(&score));
        }
    }
}

//! 數位轉型規劃：成熟度評估、計畫優先序、分期、商業案例與里程碑。

use super::due_diligence::slug;
use crate::core::keywords::count_matches;
use crate::core::scoring::{ComponentTransform, MissingComponentPolicy, ScoreCard, WeightedScorer};
use crate::domain::model::AnalysisKind;
use crate::domain::ports::Report;
use crate::utils::error::Result;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const MATURITY_AREAS: [&str; 5] = [
    "technology_stack",
    "process_digitization",
    "data_capability",
    "talent_readiness",
    "change_readiness",
];

/// 各面向五個成熟度等級的描述
const MATURITY_LEVELS: [(&str, [&str; 5]); 5] = [
    ("technology_stack", ["Legacy systems", "Some modern tools", "Integrated platforms", "Cloud-native", "AI-driven"]),
    ("process_digitization", ["Manual processes", "Some automation", "Workflow tools", "End-to-end automation", "Intelligent automation"]),
    ("data_capability", ["Limited data use", "Basic reporting", "Analytics dashboards", "Predictive analytics", "AI/ML integration"]),
    ("talent_readiness", ["Low digital skills", "Basic training", "Some expertise", "Strong capabilities", "Innovation leaders"]),
    ("change_readiness", ["Resistant to change", "Cautious adoption", "Open to change", "Change-agile", "Change-native"]),
];

const VALUE_KEYWORDS: [&str; 4] = ["revenue", "efficiency", "customer", "competitive"];
const READINESS_MATURITY: f64 = 7.0;
const MILESTONE_INTERVAL_DAYS: u64 = 90;
const ROADMAP_MONTHS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechnologyCategory {
    #[serde(rename = "cloud_infrastructure")]
    CloudInfrastructure,
    #[serde(rename = "data_analytics")]
    DataAnalytics,
    #[serde(rename = "process_automation")]
    Automation,
    #[serde(rename = "collaboration_tools")]
    Collaboration,
    #[serde(rename = "customer_experience")]
    CustomerExperience,
    #[serde(rename = "cybersecurity")]
    Cybersecurity,
    #[serde(rename = "system_integration")]
    Integration,
    #[serde(rename = "mobile_solutions")]
    MobileSolutions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

impl Complexity {
    fn penalty(&self) -> f64 {
        match self {
            Complexity::Low => 0.0,
            Complexity::Medium => -1.0,
            Complexity::High => -2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    fn base_score(&self) -> f64 {
        match self {
            Priority::Critical => 10.0,
            Priority::High => 8.0,
            Priority::Medium => 6.0,
            Priority::Low => 4.0,
        }
    }
}

/// 五個成熟度面向的 1-10 自評，缺值依評分策略處理
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaturityInput {
    pub technology_stack: Option<f64>,
    pub process_digitization: Option<f64>,
    pub data_capability: Option<f64>,
    pub talent_readiness: Option<f64>,
    pub change_readiness: Option<f64>,
}

impl MaturityInput {
    fn raw(&self, area: &str) -> Option<f64> {
        match area {
            "technology_stack" => self.technology_stack,
            "process_digitization" => self.process_digitization,
            "data_capability" => self.data_capability,
            "talent_readiness" => self.talent_readiness,
            "change_readiness" => self.change_readiness,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaMaturity {
    pub area: String,
    pub score: f64,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentStateAssessment {
    pub overall_maturity_score: f64,
    pub technology_stack_score: f64,
    pub process_digitization_score: f64,
    pub data_capability_score: f64,
    pub talent_readiness_score: f64,
    pub change_readiness_score: f64,
    pub maturity_levels: Vec<AreaMaturity>,
    pub key_gaps: Vec<String>,
    pub strengths: Vec<String>,
    pub pain_points: Vec<String>,
}

fn default_timeline() -> u32 {
    6
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationInitiative {
    pub name: String,
    pub category: TechnologyCategory,
    pub description: String,
    pub business_value: String,
    #[serde(default)]
    pub investment_required: f64,
    #[serde(default = "default_timeline")]
    pub timeline_months: u32,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub success_metrics: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizedInitiative {
    #[serde(flatten)]
    pub initiative: TransformationInitiative,
    pub priority_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationPhase {
    pub name: String,
    pub initiatives: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BenefitBreakdown {
    pub cost_savings: f64,
    pub revenue_increase: f64,
    pub productivity_gains: f64,
    pub risk_reduction: f64,
}

impl BenefitBreakdown {
    pub fn total(&self) -> f64 {
        self.cost_savings + self.revenue_increase + self.productivity_gains + self.risk_reduction
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessCase {
    pub total_investment: f64,
    pub estimated_annual_benefits: f64,
    pub roi_percentage: f64,
    /// 沒有效益時為 None
    pub payback_months: Option<f64>,
    pub benefit_breakdown: BenefitBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub phase: String,
    pub date: NaiveDate,
    pub deliverables: Vec<String>,
    pub success_criteria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationInput {
    pub company_name: String,
    #[serde(default)]
    pub maturity: MaturityInput,
    #[serde(default)]
    pub initiatives: Vec<TransformationInitiative>,
    /// 里程碑起算日，未指定時取執行當天
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationRoadmap {
    pub company_name: String,
    pub current_state: CurrentStateAssessment,
    pub initiatives: Vec<PrioritizedInitiative>,
    pub phases: Vec<ImplementationPhase>,
    pub business_case: BusinessCase,
    pub timeline_months: u32,
    pub expected_roi: f64,
    pub key_milestones: Vec<Milestone>,
    pub success_factors: Vec<String>,
    pub risk_mitigation: Vec<String>,
}

impl Report for TransformationRoadmap {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Transformation
    }

    fn export_stem(&self) -> String {
        format!("digital_transformation_roadmap_{}", slug(&self.company_name))
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Overall Digital Maturity: {:.1}/10",
                self.current_state.overall_maturity_score
            ),
            format!("Total Investment: ${:.0}", self.business_case.total_investment),
            format!("Expected ROI: {:.1}%", self.expected_roi),
            format!("Timeline: {} months", self.timeline_months),
        ];
        for milestone in &self.key_milestones {
            lines.push(format!("{}: {}", milestone.date, milestone.phase));
        }
        lines
    }
}

/// "technology_stack" -> "Technology Stack"
fn area_title(area: &str) -> String {
    crate::prompt::model::title_case(area)
}

fn maturity_level(area: &str, score: f64) -> String {
    let index = ((score - 1.0) / 2.0).floor().clamp(0.0, 4.0) as usize;
    MATURITY_LEVELS
        .iter()
        .find(|(name, _)| *name == area)
        .map(|(_, levels)| levels[index].to_string())
        .unwrap_or_default()
}

fn phase_for(initiative: &TransformationInitiative) -> usize {
    use TechnologyCategory::*;
    match initiative.category {
        CloudInfrastructure | Cybersecurity => 0,
        _ if initiative.priority == Priority::Critical => 0,
        Integration | DataAnalytics => 1,
        _ if initiative.timeline_months <= 12 => 1,
        Automation | CustomerExperience => 2,
        _ => 3,
    }
}

const PHASE_NAMES: [&str; 4] = [
    "Phase 1 - Foundation (0-6 months)",
    "Phase 2 - Core Systems (6-12 months)",
    "Phase 3 - Advanced Capabilities (12-18 months)",
    "Phase 4 - Optimization (18-24 months)",
];

pub struct TransformationPlanner {
    maturity: WeightedScorer,
}

impl Default for TransformationPlanner {
    fn default() -> Self {
        Self::new(MissingComponentPolicy::Neutral)
    }
}

impl TransformationPlanner {
    pub fn new(policy: MissingComponentPolicy) -> Self {
        let maturity = MATURITY_AREAS
            .iter()
            .fold(WeightedScorer::new(), |scorer, area| {
                scorer.component(area, ComponentTransform::IDENTITY)
            })
            .with_policy(policy);
        Self { maturity }
    }

    pub fn assess_digital_maturity(&self, input: &MaturityInput) -> Result<CurrentStateAssessment> {
        let card: ScoreCard = self.maturity.score_with(|area| input.raw(area))?;
        let overall = card.overall;
        let score = |area: &str| card.get(area).unwrap_or(0.0);

        let mut key_gaps = Vec::new();
        let mut strengths = Vec::new();
        for component in &card.components {
            let title = area_title(&component.name);
            if component.score <= 4.0 {
                key_gaps.push(format!("Low {} capability (score: {:.1})", title, component.score));
            } else if component.score >= 7.0 {
                strengths.push(format!("Strong {} foundation", title));
            }
        }

        let pain_points: &[&str] = if overall < 5.0 {
            &[
                "Legacy system integration challenges",
                "Manual process inefficiencies",
                "Limited data visibility",
                "Skill gaps in digital technologies",
            ]
        } else if overall < 7.0 {
            &[
                "Siloed systems and data",
                "Inconsistent digital experiences",
                "Change management resistance",
            ]
        } else {
            &["Optimization and advanced analytics", "AI and automation integration"]
        };

        tracing::debug!("Digital maturity {:.2} with {} gaps", overall, key_gaps.len());

        Ok(CurrentStateAssessment {
            overall_maturity_score: overall,
            technology_stack_score: score("technology_stack"),
            process_digitization_score: score("process_digitization"),
            data_capability_score: score("data_capability"),
            talent_readiness_score: score("talent_readiness"),
            change_readiness_score: score("change_readiness"),
            maturity_levels: card
                .components
                .iter()
                .map(|c| AreaMaturity {
                    area: c.name.clone(),
                    score: c.score,
                    level: maturity_level(&c.name, c.score),
                })
                .collect(),
            key_gaps,
            strengths,
            pain_points: pain_points.iter().map(|p| p.to_string()).collect(),
        })
    }

    /// (優先度基分 + 複雜度扣分 + 價值關鍵字數) × min(1, 成熟度 / 7)
    pub fn priority_score(initiative: &TransformationInitiative, current: &CurrentStateAssessment) -> f64 {
        let value_boost = count_matches(&initiative.business_value, &VALUE_KEYWORDS) as f64;
        let readiness = (current.overall_maturity_score / READINESS_MATURITY).min(1.0);
        (initiative.priority.base_score() + initiative.complexity.penalty() + value_boost) * readiness
    }

    /// 依分數遞減，同分維持輸入順序
    pub fn prioritize_initiatives(
        initiatives: &[TransformationInitiative],
        current: &CurrentStateAssessment,
    ) -> Vec<PrioritizedInitiative> {
        let mut prioritized: Vec<PrioritizedInitiative> = initiatives
            .iter()
            .map(|i| PrioritizedInitiative {
                priority_score: Self::priority_score(i, current),
                initiative: i.clone(),
            })
            .collect();
        prioritized.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
        prioritized
    }

    /// 基礎建設類或 critical 進第一期；整合、資料類或 12 個月內者進第二期
    pub fn create_implementation_phases(prioritized: &[PrioritizedInitiative]) -> Vec<ImplementationPhase> {
        let mut phases: Vec<ImplementationPhase> = PHASE_NAMES
            .iter()
            .map(|name| ImplementationPhase {
                name: name.to_string(),
                initiatives: Vec::new(),
            })
            .collect();
        for p in prioritized {
            phases[phase_for(&p.initiative)]
                .initiatives
                .push(p.initiative.name.clone());
        }
        phases
    }

    pub fn calculate_business_case(initiatives: &[TransformationInitiative]) -> BusinessCase {
        let total_investment: f64 = initiatives.iter().map(|i| i.investment_required).sum();
        let mut benefits = BenefitBreakdown::default();

        for initiative in initiatives {
            let investment = initiative.investment_required;
            match initiative.category {
                TechnologyCategory::Automation => {
                    benefits.cost_savings += investment * 0.30;
                    benefits.productivity_gains += investment * 0.25;
                }
                TechnologyCategory::CustomerExperience => {
                    benefits.revenue_increase += investment * 0.15;
                }
                TechnologyCategory::DataAnalytics => {
                    benefits.revenue_increase += investment * 0.12;
                    benefits.cost_savings += investment * 0.08;
                }
                TechnologyCategory::CloudInfrastructure => {
                    benefits.cost_savings += investment * 0.20;
                    benefits.risk_reduction += investment * 0.10;
                }
                _ => {
                    benefits.productivity_gains += investment * 0.15;
                }
            }
        }

        let total_benefits = benefits.total();
        let roi_percentage = if total_investment > 0.0 {
            (total_benefits - total_investment) / total_investment * 100.0
        } else {
            0.0
        };
        let payback_months = if total_benefits > 0.0 {
            Some(total_investment / (total_benefits / 12.0))
        } else {
            None
        };

        BusinessCase {
            total_investment,
            estimated_annual_benefits: total_benefits,
            roi_percentage,
            payback_months,
            benefit_breakdown: benefits,
        }
    }

    pub fn identify_success_factors(
        initiatives: &[TransformationInitiative],
        current: &CurrentStateAssessment,
    ) -> Vec<String> {
        let mut factors = vec![
            "Strong executive sponsorship and leadership commitment",
            "Clear communication of vision and benefits to all stakeholders",
            "Adequate budget allocation and resource commitment",
        ];
        if current.change_readiness_score < 6.0 {
            factors.push("Comprehensive change management and training programs");
        }
        if current.talent_readiness_score < 6.0 {
            factors.push("Talent acquisition and skill development initiatives");
        }
        if current.technology_stack_score < 5.0 {
            factors.push("Legacy system modernization and integration strategy");
        }
        if initiatives.iter().any(|i| i.complexity == Complexity::High) {
            factors.push("Experienced program management and vendor partnerships");
        }
        factors.extend([
            "Phased implementation approach with quick wins",
            "Continuous monitoring and course correction",
            "Customer and employee feedback integration",
            "Data-driven decision making throughout transformation",
        ]);
        factors.into_iter().map(String::from).collect()
    }

    pub fn generate_risk_mitigation_strategies(initiatives: &[TransformationInitiative]) -> Vec<String> {
        let has = |category: TechnologyCategory| initiatives.iter().any(|i| i.category == category);
        let mut strategies = vec![
            "Establish transformation governance committee with clear decision rights",
            "Implement comprehensive project management and tracking systems",
            "Create detailed contingency plans for critical initiatives",
        ];
        if has(TechnologyCategory::CloudInfrastructure) {
            strategies.push("Develop cloud security and compliance framework");
        }
        if has(TechnologyCategory::DataAnalytics) {
            strategies.push("Ensure data governance and privacy protection measures");
        }
        if has(TechnologyCategory::Automation) {
            strategies.push("Plan workforce transition and reskilling programs");
        }
        strategies.extend([
            "Maintain business continuity during system transitions",
            "Regular vendor performance monitoring and backup options",
            "Budget contingency (10-15%) for unforeseen challenges",
            "Pilot testing and phased rollouts to minimize disruption",
        ]);
        strategies.into_iter().map(String::from).collect()
    }

    /// 第 n 期里程碑落在 `start + 90 * n` 天；空的分期略過
    pub fn key_milestones(phases: &[ImplementationPhase], start: NaiveDate) -> Vec<Milestone> {
        phases
            .iter()
            .enumerate()
            .filter(|(_, phase)| !phase.initiatives.is_empty())
            .map(|(index, phase)| {
                let offset = MILESTONE_INTERVAL_DAYS * (index as u64 + 1);
                let focus = phase.name.split(" - ").nth(1).unwrap_or(&phase.name);
                Milestone {
                    phase: phase.name.clone(),
                    date: start.checked_add_days(Days::new(offset)).unwrap_or(start),
                    deliverables: phase.initiatives.iter().take(3).cloned().collect(),
                    success_criteria: format!(
                        "Complete {} initiatives in {}",
                        phase.initiatives.len(),
                        focus
                    ),
                }
            })
            .collect()
    }

    pub fn create_transformation_roadmap(
        &self,
        input: &TransformationInput,
        start: NaiveDate,
    ) -> Result<TransformationRoadmap> {
        tracing::info!(
            "🚀 Planning transformation for {} ({} initiatives)",
            input.company_name,
            input.initiatives.len()
        );

        let current_state = self.assess_digital_maturity(&input.maturity)?;
        let initiatives = Self::prioritize_initiatives(&input.initiatives, &current_state);
        let ordered: Vec<TransformationInitiative> =
            initiatives.iter().map(|p| p.initiative.clone()).collect();

        let business_case = Self::calculate_business_case(&ordered);
        let phases = Self::create_implementation_phases(&initiatives);
        let key_milestones = Self::key_milestones(&phases, start);
        let success_factors = Self::identify_success_factors(&ordered, &current_state);
        let risk_mitigation = Self::generate_risk_mitigation_strategies(&ordered);

        Ok(TransformationRoadmap {
            company_name: input.company_name.clone(),
            expected_roi: business_case.roi_percentage,
            current_state,
            initiatives,
            phases,
            business_case,
            timeline_months: ROADMAP_MONTHS,
            key_milestones,
            success_factors,
            risk_mitigation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initiative(
        name: &str,
        category: TechnologyCategory,
        investment: f64,
        priority: Priority,
        complexity: Complexity,
        value: &str,
        months: u32,
    ) -> TransformationInitiative {
        TransformationInitiative {
            name: name.to_string(),
            category,
            description: String::new(),
            business_value: value.to_string(),
            investment_required: investment,
            timeline_months: months,
            complexity,
            priority,
            dependencies: Vec::new(),
            success_metrics: Vec::new(),
            risks: Vec::new(),
        }
    }

    fn demo_maturity() -> MaturityInput {
        MaturityInput {
            technology_stack: Some(4.2),
            process_digitization: Some(3.8),
            data_capability: Some(5.1),
            talent_readiness: Some(4.5),
            change_readiness: Some(6.2),
        }
    }

    #[test]
    fn test_maturity_assessment() {
        let planner = TransformationPlanner::default();
        let state = planner.assess_digital_maturity(&demo_maturity()).unwrap();

        assert!((state.overall_maturity_score - 4.76).abs() < 1e-9);
        assert_eq!(
            state.key_gaps,
            vec!["Low Process Digitization capability (score: 3.8)".to_string()]
        );
        assert!(state.strengths.is_empty());
        assert_eq!(state.pain_points.len(), 4);
        assert_eq!(state.maturity_levels[0].level, "Some modern tools");
    }

    #[test]
    fn test_missing_area_policy() {
        let neutral = TransformationPlanner::default()
            .assess_digital_maturity(&MaturityInput::default())
            .unwrap();
        assert_eq!(neutral.overall_maturity_score, 5.0);

        let strict = TransformationPlanner::new(MissingComponentPolicy::Reject);
        assert!(strict.assess_digital_maturity(&MaturityInput::default()).is_err());
    }

    #[test]
    fn test_priority_score_and_phases() {
        let planner = TransformationPlanner::default();
        let state = planner.assess_digital_maturity(&demo_maturity()).unwrap();
        let cloud = initiative(
            "Cloud",
            TechnologyCategory::CloudInfrastructure,
            850_000.0,
            Priority::Critical,
            Complexity::High,
            "Reduce infrastructure costs",
            8,
        );
        let portal = initiative(
            "Portal",
            TechnologyCategory::CustomerExperience,
            650_000.0,
            Priority::High,
            Complexity::Medium,
            "Improve customer satisfaction and revenue",
            18,
        );
        let mobile = initiative(
            "Mobile",
            TechnologyCategory::MobileSolutions,
            180_000.0,
            Priority::Low,
            Complexity::Low,
            "Productivity",
            20,
        );

        let readiness = 4.76 / 7.0;
        assert!((TransformationPlanner::priority_score(&cloud, &state) - 8.0 * readiness).abs() < 1e-9);
        assert!((TransformationPlanner::priority_score(&portal, &state) - 9.0 * readiness).abs() < 1e-9);

        let prioritized = TransformationPlanner::prioritize_initiatives(&[cloud, portal, mobile], &state);
        assert_eq!(prioritized[0].initiative.name, "Portal");

        let phases = TransformationPlanner::create_implementation_phases(&prioritized);
        assert_eq!(phases[0].initiatives, vec!["Cloud"]);
        assert_eq!(phases[2].initiatives, vec!["Portal"]);
        assert_eq!(phases[3].initiatives, vec!["Mobile"]);
    }

    #[test]
    fn test_business_case() {
        let initiatives = vec![
            initiative("Rpa", TechnologyCategory::Automation, 100.0, Priority::High, Complexity::Medium, "", 6),
            initiative("Cloud", TechnologyCategory::CloudInfrastructure, 100.0, Priority::High, Complexity::Medium, "", 6),
        ];
        let case = TransformationPlanner::calculate_business_case(&initiatives);

        assert!((case.benefit_breakdown.cost_savings - 50.0).abs() < 1e-9);
        assert!((case.estimated_annual_benefits - 85.0).abs() < 1e-9);
        assert!((case.roi_percentage - (-57.5)).abs() < 1e-9);
        assert!((case.payback_months.unwrap() - 200.0 / (85.0 / 12.0)).abs() < 1e-9);
        assert_eq!(TransformationPlanner::calculate_business_case(&[]).payback_months, None);
    }

    #[test]
    fn test_milestones_from_start_date() {
        let phases = vec![
            ImplementationPhase {
                name: PHASE_NAMES[0].to_string(),
                initiatives: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            },
            ImplementationPhase {
                name: PHASE_NAMES[1].to_string(),
                initiatives: Vec::new(),
            },
            ImplementationPhase {
                name: PHASE_NAMES[2].to_string(),
                initiatives: vec!["E".into()],
            },
        ];
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let milestones = TransformationPlanner::key_milestones(&phases, start);

        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[0].date, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(milestones[0].deliverables.len(), 3);
        assert_eq!(milestones[0].success_criteria, "Complete 4 initiatives in Foundation (0-6 months)");
        assert_eq!(milestones[1].date, NaiveDate::from_ymd_opt(2025, 9, 28).unwrap());
    }
}

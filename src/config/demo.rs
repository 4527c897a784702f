//! `--demo` 使用的內建示範資料。

use crate::analysis::benchmark::{BenchmarkConfig, GapFactors, MetricObservation};
use crate::analysis::budget::{BudgetCategory, CostType};
use crate::analysis::customer_insight::Sentiment;
use crate::analysis::due_diligence::FinancialMetrics;
use crate::analysis::forecast::MarketConditions;
use crate::analysis::transformation::{
    Complexity, MaturityInput, Priority, TechnologyCategory, TransformationInitiative,
};
use crate::analysis::{
    AnalysisInputs, BenchmarkInput, BenefitItem, BudgetInput, CostBenefitInput, CostItem,
    CustomerFeedback, CustomerInsightInput, CustomerSegment, DueDiligenceInput, ForecastAssumptions,
    ForecastInput, HistoricalData, TransformationInput,
};
use crate::prompt::model::{CompanySize, ExecutiveRole, IndustryType, PromptContext};
use std::collections::HashMap;

fn factor_map(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn due_diligence() -> DueDiligenceInput {
    DueDiligenceInput {
        target_company: "TechCorp Solutions".to_string(),
        deal_value: 250.0,
        metrics: FinancialMetrics {
            revenue_3yr_cagr: 15.2,
            ebitda_margin: 22.5,
            debt_to_equity: 1.2,
            current_ratio: 2.1,
            roe: 18.5,
            free_cash_flow_margin: 12.0,
        },
        strategic_factors: factor_map(&[
            ("market_expansion", 8.5),
            ("product_synergies", 7.0),
            ("cost_synergies", 6.5),
            ("technology_capabilities", 9.0),
            ("customer_base_overlap", 4.0),
            ("cultural_alignment", 7.5),
        ]),
        risk_factors: factor_map(&[
            ("integration_complexity", 6.0),
            ("regulatory_hurdles", 3.0),
            ("customer_retention", 5.0),
            ("key_person_dependency", 7.5),
            ("technology_obsolescence", 4.0),
            ("market_competition", 6.5),
        ]),
        revenue: 100.0,
        ebitda: 22.5,
    }
}

pub fn budget() -> BudgetInput {
    let category = |name: &str, allocation: f64, roi: f64, priority: f64, cost_type: CostType| BudgetCategory {
        name: name.to_string(),
        current_allocation: allocation,
        roi,
        priority_score: priority,
        cost_type,
    };

    BudgetInput {
        total_budget: 1_000_000.0,
        categories: vec![
            category("Sales & Marketing", 0.30, 2.5, 8.0, CostType::Variable),
            category("Product Development", 0.25, 4.2, 9.0, CostType::Variable),
            category("Operations", 0.20, 1.8, 7.0, CostType::Fixed),
            category("Customer Success", 0.10, 3.1, 8.5, CostType::Variable),
            category("Administrative", 0.10, 0.5, 4.0, CostType::Fixed),
            category("Training & Development", 0.05, 3.8, 6.5, CostType::Discretionary),
        ],
    }
}

pub fn cost_benefit() -> CostBenefitInput {
    CostBenefitInput {
        project_name: "Digital Transformation Project".to_string(),
        discount_rate: 0.10,
        analysis_period_years: 3,
        costs: vec![
            CostItem::new("Software Licensing", 50_000.0, 0, "capital", false),
            CostItem::new("Implementation Services", 80_000.0, 1, "one_time", false),
            CostItem::new("Training & Change Management", 25_000.0, 2, "one_time", false),
            CostItem::new("Monthly Maintenance", 3_000.0, 3, "operational", true),
            CostItem::new("Additional Staff", 8_000.0, 3, "operational", true),
        ],
        benefits: vec![
            BenefitItem::new("Process Automation Savings", 15_000.0, 6, "cost_savings", true, 0.9),
            BenefitItem::new("Improved Productivity", 12_000.0, 4, "productivity", true, 0.8),
            BenefitItem::new("Reduced Error Costs", 5_000.0, 8, "cost_savings", true, 0.85),
            BenefitItem::new("New Revenue Opportunities", 20_000.0, 12, "revenue", true, 0.7),
            BenefitItem::new("Compliance Cost Avoidance", 30_000.0, 6, "cost_savings", false, 0.95),
        ],
    }
}

pub fn forecast() -> ForecastInput {
    let quarter = |period: &str, revenue: f64, expenses: f64, ebitda: f64, cash_flow: f64| HistoricalData {
        period: period.to_string(),
        revenue,
        expenses,
        ebitda,
        cash_flow,
    };

    ForecastInput {
        company_name: "TechCorp Inc".to_string(),
        base_date: None,
        history: vec![
            quarter("2022-Q1", 850_000.0, 680_000.0, 170_000.0, 140_000.0),
            quarter("2022-Q2", 920_000.0, 720_000.0, 200_000.0, 165_000.0),
            quarter("2022-Q3", 980_000.0, 750_000.0, 230_000.0, 195_000.0),
            quarter("2022-Q4", 1_100_000.0, 825_000.0, 275_000.0, 230_000.0),
            quarter("2023-Q1", 950_000.0, 750_000.0, 200_000.0, 170_000.0),
            quarter("2023-Q2", 1_050_000.0, 800_000.0, 250_000.0, 210_000.0),
            quarter("2023-Q3", 1_150_000.0, 850_000.0, 300_000.0, 255_000.0),
            quarter("2023-Q4", 1_300_000.0, 975_000.0, 325_000.0, 270_000.0),
        ],
        assumptions: ForecastAssumptions {
            revenue_growth_rate: 0.15,
            expense_ratio: 0.72,
            seasonal_factor: [(1, 0.88), (2, 0.98), (3, 1.05), (4, 1.18)].into_iter().collect(),
            market_conditions: MarketConditions::Growth,
            confidence_interval: 0.80,
        },
    }
}

pub fn benchmark() -> BenchmarkInput {
    let observation = |metric: &str, value: f64, benchmark: f64, lower_is_better: bool, factors: [f64; 4]| {
        MetricObservation {
            metric: metric.to_string(),
            value,
            benchmark,
            lower_is_better,
            factors: GapFactors {
                financial_impact: factors[0],
                competitive_importance: factors[1],
                implementation_feasibility: factors[2],
                resource_requirements: factors[3],
            },
        }
    };

    BenchmarkInput {
        company_name: "TechCorp Solutions".to_string(),
        context: PromptContext::new(IndustryType::Technology, ExecutiveRole::Cfo, CompanySize::MidMarket)
            .with_focus("margin improvement"),
        config: BenchmarkConfig {
            investor_communication: true,
            ..BenchmarkConfig::default()
        },
        improvement_areas: None,
        observations: vec![
            observation("gross_margin", 62.0, 70.0, false, [8.0, 7.0, 6.0, 4.0]),
            observation("revenue_growth", 18.0, 15.0, false, [7.0, 8.0, 5.0, 5.0]),
            observation("customer_acquisition_cost", 1_450.0, 1_200.0, true, [6.0, 6.5, 7.0, 3.0]),
            observation("r_and_d_intensity", 14.0, 18.0, false, [6.5, 8.5, 5.0, 7.0]),
            observation("net_revenue_retention", 104.0, 110.0, false, [8.5, 8.0, 6.5, 5.5]),
        ],
    }
}

pub fn customer_insight() -> CustomerInsightInput {
    let segment = |name: &str,
                   size: u64,
                   revenue: f64,
                   growth: f64,
                   satisfaction: f64,
                   churn: f64,
                   ltv: f64,
                   characteristics: &[&str],
                   pain_points: &[&str],
                   preferences: &[&str]| CustomerSegment {
        name: name.to_string(),
        size,
        revenue_contribution: revenue,
        growth_rate: growth,
        satisfaction_score: satisfaction,
        churn_rate: churn,
        avg_lifetime_value: ltv,
        key_characteristics: strings(characteristics),
        pain_points: strings(pain_points),
        preferences: strings(preferences),
    };

    let segments = vec![
        segment(
            "Enterprise Clients", 145, 2_800_000.0, 0.12, 8.2, 0.08, 85_000.0,
            &["Large organizations", "Complex needs", "Budget authority"],
            &["Long implementation times", "Integration complexity"],
            &["Dedicated support", "Custom solutions", "Proven ROI"],
        ),
        segment(
            "Mid-Market", 320, 1_950_000.0, 0.18, 7.6, 0.12, 35_000.0,
            &["Growing businesses", "Efficiency focused", "Technology adopters"],
            &["Limited IT resources", "Cost sensitivity"],
            &["Easy setup", "Scalable solutions", "Good value"],
        ),
        segment(
            "Small Business", 1250, 1_200_000.0, 0.25, 7.1, 0.18, 12_000.0,
            &["Resource constrained", "Simple needs", "Price sensitive"],
            &["Learning curve", "Support availability"],
            &["Self-service", "Affordable pricing", "Quick results"],
        ),
        segment(
            "Startups", 890, 450_000.0, 0.42, 6.8, 0.25, 8_500.0,
            &["Innovation focused", "Rapid growth", "Limited budget"],
            &["Changing requirements", "Cash flow concerns"],
            &["Flexible terms", "Growth potential", "Modern features"],
        ),
    ];

    use Sentiment::{Negative, Neutral, Positive};
    let entries: [(&str, &str, Sentiment, &str, &str, f64); 12] = [
        ("Enterprise Clients", "survey", Positive, "service", "Excellent customer support and dedicated account management", 9.0),
        ("Enterprise Clients", "interview", Negative, "product", "Integration with our ERP system was very complex and time-consuming", 8.5),
        ("Mid-Market", "review", Positive, "product", "Great features and easy to use interface, good value for money", 7.0),
        ("Mid-Market", "survey", Neutral, "pricing", "Pricing is reasonable but would like more flexibility in packages", 6.0),
        ("Small Business", "support", Negative, "service", "Response time is too slow, need faster support for critical issues", 8.0),
        ("Small Business", "review", Positive, "experience", "Simple setup process, was up and running quickly", 6.5),
        ("Startups", "survey", Negative, "pricing", "Too expensive for a startup, need more affordable options", 7.5),
        ("Startups", "interview", Positive, "product", "Love the modern interface and innovative features", 6.0),
        ("Enterprise Clients", "survey", Neutral, "product", "Product functionality is good but missing some advanced features we need", 7.0),
        ("Mid-Market", "support", Positive, "service", "Support team was very helpful in resolving our technical issue", 6.5),
        ("Small Business", "review", Negative, "experience", "Learning curve was steeper than expected, need better onboarding", 7.0),
        ("Startups", "survey", Positive, "product", "Excellent product that scales with our growing business needs", 8.0),
    ];
    let feedback = entries
        .iter()
        .map(|(segment, channel, sentiment, category, text, importance)| {
            CustomerFeedback::new(segment, channel, Some(*sentiment), category, text, *importance)
        })
        .collect();

    CustomerInsightInput { segments, feedback }
}

pub fn transformation() -> TransformationInput {
    let initiative = |name: &str,
                      category: TechnologyCategory,
                      description: &str,
                      business_value: &str,
                      investment: f64,
                      months: u32,
                      complexity: Complexity,
                      priority: Priority,
                      dependencies: &[&str],
                      metrics: &[&str],
                      risks: &[&str]| TransformationInitiative {
        name: name.to_string(),
        category,
        description: description.to_string(),
        business_value: business_value.to_string(),
        investment_required: investment,
        timeline_months: months,
        complexity,
        priority,
        dependencies: strings(dependencies),
        success_metrics: strings(metrics),
        risks: strings(risks),
    };

    TransformationInput {
        company_name: "TechCorp Solutions".to_string(),
        maturity: MaturityInput {
            technology_stack: Some(4.2),
            process_digitization: Some(3.8),
            data_capability: Some(5.1),
            talent_readiness: Some(4.5),
            change_readiness: Some(6.2),
        },
        start_date: None,
        initiatives: vec![
            initiative(
                "Cloud Infrastructure Migration",
                TechnologyCategory::CloudInfrastructure,
                "Migrate core systems to cloud platform for scalability and reliability",
                "Reduce infrastructure costs by 30% and improve system reliability",
                850_000.0, 8, Complexity::High, Priority::Critical,
                &["Security framework update", "Data migration planning"],
                &["99.9% uptime", "30% cost reduction", "50% faster deployments"],
                &["Data migration complexity", "Temporary system downtime"],
            ),
            initiative(
                "Process Automation Platform",
                TechnologyCategory::Automation,
                "Implement RPA and workflow automation for key business processes",
                "Eliminate 40% of manual tasks and reduce processing time by 60%",
                420_000.0, 6, Complexity::Medium, Priority::High,
                &["Process mapping", "Cloud infrastructure"],
                &["40% FTE reduction", "60% faster processing", "95% accuracy"],
                &["Employee resistance", "Process complexity"],
            ),
            initiative(
                "Customer Experience Portal",
                TechnologyCategory::CustomerExperience,
                "Build unified customer portal with self-service capabilities",
                "Improve customer satisfaction by 25% and reduce support costs",
                650_000.0, 10, Complexity::Medium, Priority::High,
                &["Customer data integration", "Authentication system"],
                &["25% CSAT improvement", "50% self-service adoption", "20% support cost reduction"],
                &["User adoption", "Integration complexity"],
            ),
            initiative(
                "Advanced Analytics Platform",
                TechnologyCategory::DataAnalytics,
                "Deploy modern analytics and business intelligence capabilities",
                "Enable data-driven decisions and predictive insights",
                380_000.0, 7, Complexity::Medium, Priority::Medium,
                &["Data warehouse modernization", "Cloud platform"],
                &["100% data visibility", "Real-time reporting", "Predictive model accuracy >85%"],
                &["Data quality issues", "User training needs"],
            ),
            initiative(
                "Cybersecurity Enhancement",
                TechnologyCategory::Cybersecurity,
                "Implement zero-trust security architecture and monitoring",
                "Reduce security risks and ensure compliance with regulations",
                320_000.0, 5, Complexity::High, Priority::Critical,
                &["Security policy update", "Staff training"],
                &["Zero security breaches", "100% compliance", "Reduced incident response time"],
                &["System complexity", "User experience impact"],
            ),
            initiative(
                "Mobile Workforce Solutions",
                TechnologyCategory::MobileSolutions,
                "Enable mobile access to key business applications",
                "Increase productivity and employee satisfaction",
                180_000.0, 4, Complexity::Low, Priority::Medium,
                &["Security framework", "Application modernization"],
                &["90% mobile adoption", "20% productivity increase", "Employee satisfaction >8.5"],
                &["Security concerns", "Device management"],
            ),
        ],
    }
}

/// 七項分析的完整示範輸入
pub fn demo_inputs() -> AnalysisInputs {
    AnalysisInputs {
        due_diligence: Some(due_diligence()),
        budget: Some(budget()),
        cost_benefit: Some(cost_benefit()),
        forecast: Some(forecast()),
        benchmark: Some(benchmark()),
        customer_insight: Some(customer_insight()),
        transformation: Some(transformation()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AnalysisKind;

    #[test]
    fn test_demo_covers_every_analysis() {
        let inputs = demo_inputs();
        for kind in AnalysisKind::ALL {
            assert!(inputs.has(kind), "demo missing {}", kind);
        }
    }

    #[test]
    fn test_demo_budget_allocations_sum_to_one() {
        let total: f64 = budget().categories.iter().map(|c| c.current_allocation).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}

//! 內建的績效標竿範本。

use crate::prompt::model::{PromptCategory, PromptTemplate};
use crate::prompt::registry::PromptRegistry;

pub const COMPREHENSIVE_BENCHMARK_ID: &str = "comprehensive_benchmark_analysis";
pub const INDUSTRY_BENCHMARK_ID: &str = "industry_benchmark_analysis";
pub const IMPROVEMENT_PLANNING_ID: &str = "performance_improvement_planning";

pub fn comprehensive_benchmark_template() -> PromptTemplate {
    PromptTemplate::new(
        "Comprehensive Performance Benchmark Analysis",
        PromptCategory::FinancialAnalysis,
        COMPREHENSIVE_BENCHMARK_PROMPT,
    )
    .with_id(COMPREHENSIVE_BENCHMARK_ID)
    .with_variable("benchmark_scope", "industry peers")
    .with_variable("time_period", "3 years")
    .with_adaptation(
        "financial_services",
        "Include regulatory capital efficiency, cost-to-income ratios, and credit quality metrics. Address Basel III compliance and stress testing results.",
    )
    .with_adaptation(
        "technology",
        "Focus on innovation metrics, platform scalability, developer productivity, and cybersecurity investments. Include digital transformation benchmarks.",
    )
    .with_adaptation(
        "healthcare",
        "Include patient outcomes, clinical quality metrics, and value-based care performance. Address regulatory compliance and safety standards.",
    )
    .with_adaptation(
        "cfo",
        "Emphasize financial ratio analysis, capital efficiency, and investor communication implications. Focus on margin improvement and cost optimization.",
    )
    .with_adaptation(
        "ceo",
        "Frame for board presentation with strategic positioning and competitive advantage implications. Include stakeholder value creation focus.",
    )
    .with_criteria(&[
        "Comprehensive multi-dimensional benchmarking analysis",
        "Quantitative performance gap identification and prioritization",
        "Actionable improvement recommendations with business cases",
        "Implementation roadmap with success metrics",
        "Stakeholder communication and transparency framework",
    ])
    .with_tags(&["benchmarking", "performance_analysis", "competitive_analysis", "improvement_planning"])
}

/// `{company_size}` 與 `{industry}` 由提示情境帶入
pub fn industry_benchmark_template() -> PromptTemplate {
    PromptTemplate::new(
        "Industry Benchmark and Competitive Positioning",
        PromptCategory::FinancialAnalysis,
        INDUSTRY_BENCHMARK_PROMPT,
    )
    .with_id(INDUSTRY_BENCHMARK_ID)
    .with_criteria(&[
        "Comprehensive industry and peer analysis",
        "Quantitative performance positioning with quartile rankings",
        "Clear competitive advantage and opportunity identification",
        "Strategic positioning recommendations",
        "Stakeholder communication framework",
    ])
    .with_tags(&["industry_analysis", "peer_benchmarking", "competitive_positioning", "strategic_analysis"])
}

pub fn improvement_planning_template() -> PromptTemplate {
    PromptTemplate::new(
        "Performance Improvement and Value Creation Planning",
        PromptCategory::FinancialAnalysis,
        IMPROVEMENT_PLANNING_PROMPT,
    )
    .with_id(IMPROVEMENT_PLANNING_ID)
    .with_variable("improvement_areas", "operational efficiency and customer satisfaction")
    .with_criteria(&[
        "Comprehensive performance gap analysis with quantification",
        "Clear value creation business case with financial modeling",
        "Detailed implementation roadmap with phasing and milestones",
        "Robust performance monitoring and governance framework",
        "Stakeholder engagement and change management strategy",
    ])
    .with_tags(&["performance_improvement", "value_creation", "operational_excellence", "transformation_planning"])
}

/// 以固定 id 註冊三個標竿範本，回傳 id
pub fn register_benchmark_templates(registry: &mut PromptRegistry) -> Vec<String> {
    let ids = vec![
        registry.register(comprehensive_benchmark_template()),
        registry.register(industry_benchmark_template()),
        registry.register(improvement_planning_template()),
    ];
    tracing::info!("📚 Registered {} benchmark templates", ids.len());
    ids
}

const COMPREHENSIVE_BENCHMARK_PROMPT: &str = r#"As {role} conducting performance benchmarking analysis against {benchmark_scope} over a {time_period} period, evaluate our competitive position and identify performance improvement opportunities.

**PERFORMANCE BENCHMARKING FRAMEWORK:**

1. **FINANCIAL PERFORMANCE BENCHMARKING**
   
   **Profitability Metrics:**
   - Revenue growth rate vs. industry average
   - EBITDA margin vs. peer median
   - Net profit margin comparison
   - Return on Assets (ROA) percentile ranking
   - Return on Equity (ROE) peer positioning
   - Return on Invested Capital (ROIC) analysis
   
   **Efficiency Metrics:**
   - Asset turnover vs. industry benchmarks
   - Working capital efficiency comparison
   - Cash conversion cycle analysis
   - Operating leverage vs. peers
   - Cost structure benchmarking
   - Productivity metrics comparison
   
   **Financial Strength Metrics:**
   - Debt-to-equity ratio comparison
   - Interest coverage ratio benchmarking
   - Current and quick ratio analysis
   - Credit rating relative position
   - Cash flow strength vs. peers
   - Financial flexibility assessment

2. **OPERATIONAL PERFORMANCE BENCHMARKING**
   
   **Customer Metrics:**
   - Customer acquisition cost (CAC) comparison
   - Customer lifetime value (CLV) benchmarking
   - Customer retention rate analysis
   - Net Promoter Score (NPS) vs. industry
   - Customer satisfaction benchmarking
   - Market share position analysis
   
   **Operational Efficiency:**
   - Revenue per employee comparison
   - Operating expense ratios benchmarking
   - Technology spending as % of revenue
   - R&D investment vs. industry average
   - Capital intensity comparison
   - Quality and service metrics

3. **STRATEGIC POSITIONING BENCHMARKING**
   
   **Market Position:**
   - Market share and growth comparison
   - Brand strength and recognition metrics
   - Competitive advantage sustainability
   - Innovation index and patent portfolio
   - Geographic diversification analysis
   - Product portfolio breadth vs. peers
   
   **Investment and Growth:**
   - Capital allocation effectiveness
   - M&A activity and success rates
   - Digital transformation progress
   - ESG and sustainability metrics
   - Talent acquisition and retention
   - Strategic partnership development

4. **PERFORMANCE GAP ANALYSIS**
   
   **Gap Identification:**
   - Performance gaps vs. top quartile performers
   - Underperforming metric prioritization
   - Root cause analysis of performance gaps
   - Capability and resource gap assessment
   - Best practice identification and analysis
   
   **Gap Quantification:**
   - Financial impact of closing performance gaps
   - Value creation potential from improvement
   - Investment required to close gaps
   - Timeline for performance improvement
   - Risk assessment of improvement initiatives

5. **IMPROVEMENT ACTION PLANNING**
   
   **Priority Initiative Development:**
   - High-impact improvement opportunities
   - Quick wins vs. long-term initiatives
   - Resource allocation and investment requirements
   - Success metrics and performance targets
   - Implementation timeline and milestones
   
   **Performance Monitoring Framework:**
   - KPI dashboard and tracking system
   - Benchmarking refresh schedule
   - Performance review and adjustment process
   - Stakeholder reporting and communication
   - Continuous improvement integration

**STRATEGIC RECOMMENDATIONS:**
- Priority performance improvement areas
- Investment and resource allocation guidance
- Competitive positioning enhancement strategies
- Performance monitoring and governance framework
- Stakeholder communication and transparency plan

{industry_context}
{role_focus}
{regulatory_considerations}

Provide actionable insights that drive measurable performance improvement and competitive advantage.

{communication_guidance}
"#;

const INDUSTRY_BENCHMARK_PROMPT: &str = r#"Conduct comprehensive industry benchmarking analysis positioning our {company_size} {industry} organization against industry leaders and peer companies.

**INDUSTRY BENCHMARKING FRAMEWORK:**

1. **INDUSTRY LANDSCAPE ANALYSIS**
   - Industry structure and competitive dynamics
   - Market leaders and their competitive advantages
   - Industry growth trends and future outlook
   - Technology disruption and innovation trends
   - Regulatory environment and compliance requirements

2. **PEER GROUP IDENTIFICATION AND ANALYSIS**
   
   **Primary Peer Group (Direct Competitors):**
   - Similar business model and market focus
   - Comparable size and scale operations
   - Geographic overlap and market presence
   - Product/service portfolio similarity
   - Customer segment alignment
   
   **Aspirational Peer Group (Industry Leaders):**
   - Market leadership position
   - Superior financial performance
   - Best-in-class operational metrics
   - Innovation and transformation leaders
   - Strong brand and market recognition

3. **COMPREHENSIVE PERFORMANCE COMPARISON**
   
   **Financial Performance Quartiles:**
   - Revenue growth (1st, 2nd, 3rd, 4th quartile positioning)
   - Profitability margins (EBITDA, net margin benchmarking)
   - Return metrics (ROA, ROE, ROIC peer comparison)
   - Cash flow generation and quality analysis
   - Balance sheet strength and financial flexibility
   
   **Operational Excellence Metrics:**
   - Productivity and efficiency benchmarks
   - Customer satisfaction and loyalty metrics
   - Quality and service delivery standards
   - Innovation and R&D investment levels
   - Digital transformation and technology adoption

4. **COMPETITIVE ADVANTAGE ASSESSMENT**
   
   **Strengths Identification:**
   - Areas of superior performance vs. peers
   - Sustainable competitive advantages
   - Unique capabilities and resources
   - Market position and brand strength
   - Financial and operational excellence areas
   
   **Improvement Opportunities:**
   - Performance gaps vs. industry leaders
   - Underperforming metrics and root causes
   - Capability gaps and development needs
   - Strategic positioning weaknesses
   - Operational efficiency opportunities

5. **STRATEGIC POSITIONING RECOMMENDATIONS**
   - Competitive differentiation strategies
   - Performance improvement priorities
   - Investment allocation for competitive advantage
   - Market positioning and brand enhancement
   - Partnership and ecosystem development

**INVESTOR AND STAKEHOLDER COMMUNICATION:**
- Performance narrative and competitive positioning
- Industry context and market dynamics explanation
- Improvement initiative communication
- Long-term value creation strategy
- Transparency and disclosure framework

{industry_context}
{role_focus}
{regulatory_considerations}

Focus on actionable insights that enhance competitive positioning and drive superior performance.
"#;

const IMPROVEMENT_PLANNING_PROMPT: &str = r#"Develop comprehensive performance improvement strategy based on benchmarking analysis, targeting {improvement_areas} with quantified value creation potential.

**PERFORMANCE IMPROVEMENT FRAMEWORK:**

1. **PERFORMANCE GAP PRIORITIZATION**
   
   **Gap Assessment Matrix:**
   - Performance gap size and significance
   - Financial impact and value creation potential
   - Implementation complexity and feasibility
   - Resource requirements and investment needs
   - Time horizon and achievement timeline
   
   **Priority Ranking Methodology:**
   - High impact, low complexity (quick wins)
   - High impact, high complexity (strategic initiatives)
   - Medium impact opportunities (efficiency gains)
   - Long-term transformation initiatives
   - Defensive improvement necessities

2. **VALUE CREATION QUANTIFICATION**
   
   **Financial Impact Analysis:**
   - Revenue enhancement opportunities and sizing
   - Cost reduction potential and implementation costs
   - Margin improvement and profitability impact
   - Cash flow generation and timing analysis
   - Return on investment and payback analysis
   
   **Strategic Value Assessment:**
   - Competitive advantage creation and sustainability
   - Market position improvement and brand enhancement
   - Capability building and platform development
   - Option value and future opportunity creation
   - Risk reduction and business resilience

3. **IMPROVEMENT INITIATIVE DEVELOPMENT**
   
   **Revenue Enhancement Initiatives:**
   - Customer acquisition and retention improvement
   - Pricing optimization and revenue management
   - Product/service portfolio enhancement
   - Market expansion and channel development
   - Cross-selling and upselling optimization
   
   **Operational Excellence Initiatives:**
   - Process automation and digitization
   - Supply chain optimization and efficiency
   - Quality improvement and error reduction
   - Productivity enhancement and skill development
   - Cost structure optimization and rationalization
   
   **Strategic Transformation Initiatives:**
   - Digital transformation and technology upgrade
   - Business model innovation and development
   - Organizational design and culture change
   - Partnership and ecosystem development
   - Innovation and R&D capability building

4. **IMPLEMENTATION ROADMAP AND GOVERNANCE**
   
   **Phased Implementation Plan:**
   - Phase 1: Quick wins and foundational improvements (0-6 months)
   - Phase 2: Core improvement initiatives (6-18 months)
   - Phase 3: Strategic transformation projects (18+ months)
   - Resource allocation and capability development
   - Risk management and mitigation planning
   
   **Performance Monitoring and Control:**
   - KPI framework and measurement system
   - Performance tracking and reporting cadence
   - Course correction and adjustment mechanisms
   - Success celebration and learning integration
   - Continuous improvement culture development

5. **STAKEHOLDER ENGAGEMENT AND COMMUNICATION**
   - Leadership alignment and commitment
   - Employee engagement and change management
   - Customer communication and expectation management
   - Investor relations and progress reporting
   - Board oversight and governance framework

**VALUE CREATION SUMMARY:**
- Total value creation potential quantification
- Investment requirements and resource allocation
- Implementation timeline and milestone planning
- Success metrics and performance targets
- Risk assessment and mitigation strategies

{industry_context}
{role_focus}
{improvement_areas} specific implementation guidance and best practices.

Provide comprehensive performance improvement strategy with clear business case and implementation roadmap.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::model::{CompanySize, ExecutiveRole, IndustryType, PromptContext};
    use crate::prompt::render::placeholders;
    use std::collections::BTreeMap;

    #[test]
    fn test_registers_with_stable_ids() {
        let mut registry = PromptRegistry::new();
        let ids = register_benchmark_templates(&mut registry);

        assert_eq!(ids, vec![COMPREHENSIVE_BENCHMARK_ID, INDUSTRY_BENCHMARK_ID, IMPROVEMENT_PLANNING_ID]);
        assert_eq!(registry.list(Some(PromptCategory::FinancialAnalysis)).len(), 3);
    }

    #[test]
    fn test_template_placeholders() {
        let names = placeholders(COMPREHENSIVE_BENCHMARK_PROMPT).unwrap();
        for expected in ["role", "benchmark_scope", "time_period", "industry_context", "communication_guidance"] {
            assert!(names.contains(expected), "missing {}", expected);
        }
        assert!(placeholders(IMPROVEMENT_PLANNING_PROMPT)
            .unwrap()
            .contains("improvement_areas"));
    }

    #[test]
    fn test_industry_prompt_uses_context() {
        let mut registry = PromptRegistry::new();
        register_benchmark_templates(&mut registry);
        let context = PromptContext::new(IndustryType::Retail, ExecutiveRole::Coo, CompanySize::MidMarket);

        let prompt = registry
            .generate_prompt(INDUSTRY_BENCHMARK_ID, &context, &BTreeMap::<String, String>::new())
            .unwrap();
        assert!(prompt.contains("our Mid Market Retail organization"));
    }
}

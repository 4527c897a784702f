//! 依產業、角色、法遵、急迫性與機密等級調整提示內容。

use crate::prompt::model::{Confidentiality, ExecutiveRole, IndustryType, PromptContext, UrgencyLevel};
use serde::{Deserialize, Serialize};

/// 產業術語、背景與法規提醒
#[derive(Debug, Clone, Copy)]
pub struct IndustryFramework {
    /// (generic 名稱, 產業用語)，替換 `{generic_<名稱>}`
    pub terminology: &'static [(&'static str, &'static str)],
    pub context_addition: &'static str,
    pub regulatory_note: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct RolePerspective {
    pub focus_areas: &'static [&'static str],
    pub decision_criteria: &'static str,
    pub communication_style: &'static str,
}

pub fn industry_framework(industry: IndustryType) -> Option<IndustryFramework> {
    let framework = match industry {
        IndustryType::FinancialServices => IndustryFramework {
            terminology: &[
                ("customers", "clients"),
                ("products", "financial products and services"),
                ("market", "financial markets"),
                ("competitors", "financial institutions"),
            ],
            context_addition: "Consider regulatory capital requirements, liquidity ratios, and stress testing scenarios.",
            regulatory_note: "Ensure compliance with Basel III, Dodd-Frank, MiFID II, and relevant local banking regulations.",
        },
        IndustryType::Healthcare => IndustryFramework {
            terminology: &[
                ("customers", "patients"),
                ("products", "medical services and treatments"),
                ("market", "healthcare market"),
                ("competitors", "healthcare providers"),
            ],
            context_addition: "Consider patient safety, clinical outcomes, and healthcare delivery efficiency.",
            regulatory_note: "Ensure compliance with HIPAA, FDA regulations, Medicare/Medicaid requirements, and clinical safety standards.",
        },
        IndustryType::Technology => IndustryFramework {
            terminology: &[
                ("customers", "users"),
                ("products", "technology solutions"),
                ("market", "technology ecosystem"),
                ("competitors", "technology companies"),
            ],
            context_addition: "Consider scalability, technical debt, cybersecurity, and innovation velocity.",
            regulatory_note: "Consider data privacy regulations (GDPR, CCPA), cybersecurity requirements, and platform compliance.",
        },
        IndustryType::Manufacturing => IndustryFramework {
            terminology: &[
                ("customers", "customers and supply chain partners"),
                ("products", "manufactured goods"),
                ("market", "manufacturing sector"),
                ("competitors", "manufacturing companies"),
            ],
            context_addition: "Consider operational efficiency, supply chain resilience, and quality management.",
            regulatory_note: "Ensure compliance with safety standards, environmental regulations, and industry-specific quality requirements.",
        },
        IndustryType::Retail => IndustryFramework {
            terminology: &[
                ("customers", "consumers"),
                ("products", "merchandise and services"),
                ("market", "retail market"),
                ("competitors", "retailers"),
            ],
            context_addition: "Consider consumer behavior, seasonal trends, inventory management, and omnichannel strategy.",
            regulatory_note: "Consider consumer protection laws, data privacy requirements, and labor regulations.",
        },
        IndustryType::Energy | IndustryType::Consulting | IndustryType::General => return None,
    };
    Some(framework)
}

pub fn role_perspective(role: ExecutiveRole) -> Option<RolePerspective> {
    let perspective = match role {
        ExecutiveRole::Ceo => RolePerspective {
            focus_areas: &["strategic vision", "stakeholder value", "competitive positioning", "organizational culture"],
            decision_criteria: "Evaluate based on strategic impact, stakeholder value creation, and long-term competitive advantage.",
            communication_style: "Frame recommendations for board presentation and external stakeholder communication.",
        },
        ExecutiveRole::Cfo => RolePerspective {
            focus_areas: &["financial performance", "risk management", "capital allocation", "investor relations"],
            decision_criteria: "Prioritize financial impact, ROI, risk-adjusted returns, and capital efficiency.",
            communication_style: "Provide quantitative analysis with clear financial metrics and risk assessments.",
        },
        ExecutiveRole::Coo => RolePerspective {
            focus_areas: &["operational efficiency", "process optimization", "quality management", "execution"],
            decision_criteria: "Focus on operational impact, execution feasibility, resource requirements, and performance metrics.",
            communication_style: "Emphasize implementation details, resource needs, and operational KPIs.",
        },
        ExecutiveRole::Cto => RolePerspective {
            focus_areas: &["technology strategy", "innovation", "digital transformation", "technical architecture"],
            decision_criteria: "Evaluate technical feasibility, scalability, security implications, and innovation potential.",
            communication_style: "Balance technical depth with business impact and strategic alignment.",
        },
        ExecutiveRole::BoardDirector => RolePerspective {
            focus_areas: &["governance", "oversight", "strategic guidance", "risk management"],
            decision_criteria: "Focus on governance implications, strategic alignment, and fiduciary responsibilities.",
            communication_style: "Provide high-level strategic perspective suitable for board discussions.",
        },
        ExecutiveRole::VpStrategy | ExecutiveRole::VpOperations => return None,
    };
    Some(perspective)
}

pub fn compliance_requirements(industry: IndustryType) -> &'static [&'static str] {
    match industry {
        IndustryType::FinancialServices => &[
            "Basel III capital requirements",
            "Anti-money laundering (AML) regulations",
            "Know Your Customer (KYC) requirements",
            "Securities regulations",
            "Consumer protection laws",
        ],
        IndustryType::Healthcare => &[
            "HIPAA privacy requirements",
            "FDA approval processes",
            "Clinical safety standards",
            "Medicare/Medicaid compliance",
            "Healthcare quality measures",
        ],
        IndustryType::Technology => &[
            "GDPR data privacy requirements",
            "CCPA consumer privacy laws",
            "Cybersecurity frameworks",
            "Platform compliance standards",
            "Intellectual property protections",
        ],
        _ => &[],
    }
}

fn urgency_prefix(urgency: UrgencyLevel) -> &'static str {
    match urgency {
        UrgencyLevel::Critical => "URGENT: Provide immediate actionable recommendations. ",
        UrgencyLevel::High => "High priority: Focus on time-sensitive decisions and actions. ",
        UrgencyLevel::Normal => "",
        UrgencyLevel::Low => "Consider long-term implications and strategic positioning. ",
    }
}

fn confidentiality_suffix(level: Confidentiality) -> &'static str {
    match level {
        Confidentiality::Restricted => "\n\nNote: This analysis involves highly sensitive information. Ensure all recommendations protect confidential data and competitive advantages.",
        Confidentiality::Confidential => "\n\nNote: Maintain confidentiality of all proprietary information in your analysis.",
        Confidentiality::Internal => "\n\nNote: This analysis is for internal use and should not reference external benchmarks without approval.",
        Confidentiality::Public => "",
    }
}

type Condition = Box<dyn Fn(&PromptContext) -> bool + Send + Sync>;
type Transformation = Box<dyn Fn(String, &PromptContext) -> String + Send + Sync>;

/// 自訂調整規則，priority 高者先套用
pub struct AdaptationRule {
    pub description: String,
    pub priority: i32,
    condition: Condition,
    transformation: Transformation,
}

impl AdaptationRule {
    pub fn new<C, T>(description: &str, priority: i32, condition: C, transformation: T) -> Self
    where
        C: Fn(&PromptContext) -> bool + Send + Sync + 'static,
        T: Fn(String, &PromptContext) -> String + Send + Sync + 'static,
    {
        Self {
            description: description.to_string(),
            priority,
            condition: Box::new(condition),
            transformation: Box::new(transformation),
        }
    }
}

impl std::fmt::Debug for AdaptationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptationRule")
            .field("description", &self.description)
            .field("priority", &self.priority)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptationSummary {
    pub industry_focus: String,
    pub role_perspective: Vec<String>,
    pub compliance_considerations: Vec<String>,
    pub urgency_adjustment: String,
    pub confidentiality_level: String,
}

#[derive(Debug, Default)]
pub struct ContextAdapter {
    rules: Vec<AdaptationRule>,
}

impl ContextAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_rule(&mut self, rule: AdaptationRule) {
        tracing::debug!("Registering adaptation rule '{}' (priority {})", rule.description, rule.priority);
        self.rules.push(rule);
        // 穩定排序，同優先度維持註冊順序
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// 產業 → 角色 → 法遵 → 自訂規則 → 急迫性前綴 → 機密等級後綴
    pub fn adapt_prompt(&self, base_prompt: &str, context: &PromptContext) -> String {
        let mut prompt = base_prompt.to_string();

        prompt = apply_industry(prompt, context.industry);
        prompt = apply_role(prompt, context.role);
        prompt = apply_compliance(prompt, context.industry);

        for rule in &self.rules {
            if (rule.condition)(context) {
                tracing::debug!("Applying adaptation rule '{}'", rule.description);
                prompt = (rule.transformation)(prompt, context);
            }
        }

        let mut adapted = String::with_capacity(prompt.len() + 200);
        adapted.push_str(urgency_prefix(context.urgency_level));
        adapted.push_str(&prompt);
        adapted.push_str(confidentiality_suffix(context.confidentiality));
        adapted
    }

    pub fn adaptation_summary(&self, context: &PromptContext) -> AdaptationSummary {
        let compliance = compliance_requirements(context.industry);
        AdaptationSummary {
            industry_focus: industry_framework(context.industry)
                .map(|f| f.context_addition.to_string())
                .unwrap_or_else(|| "Standard business analysis".to_string()),
            role_perspective: role_perspective(context.role)
                .map(|p| p.focus_areas.iter().map(|s| s.to_string()).collect())
                .unwrap_or_else(|| vec!["General executive perspective".to_string()]),
            compliance_considerations: if compliance.is_empty() {
                vec!["Standard business practices".to_string()]
            } else {
                compliance.iter().map(|s| s.to_string()).collect()
            },
            urgency_adjustment: format!("Analysis urgency level: {}", context.urgency_level),
            confidentiality_level: format!(
                "Information classification: {}",
                context.confidentiality
            ),
        }
    }
}

fn apply_industry(mut prompt: String, industry: IndustryType) -> String {
    let Some(framework) = industry_framework(industry) else {
        return prompt;
    };
    for (generic, specific) in framework.terminology {
        prompt = prompt.replace(&format!("{{generic_{}}}", generic), specific);
    }
    prompt
        .replace("{industry_context}", framework.context_addition)
        .replace("{regulatory_considerations}", framework.regulatory_note)
}

fn apply_role(prompt: String, role: ExecutiveRole) -> String {
    let Some(perspective) = role_perspective(role) else {
        return prompt;
    };
    let focus = format!("Focus particularly on: {}", perspective.focus_areas.join(", "));
    prompt
        .replace("{role_focus}", &focus)
        .replace("{decision_framework}", perspective.decision_criteria)
        .replace("{communication_guidance}", perspective.communication_style)
}

fn apply_compliance(prompt: String, industry: IndustryType) -> String {
    let requirements = compliance_requirements(industry);
    if requirements.is_empty() || !prompt.contains("{compliance_note}") {
        return prompt;
    }
    let note = format!(
        "Ensure all recommendations comply with: {}",
        requirements.join(", ")
    );
    prompt.replace("{compliance_note}", &note)
}

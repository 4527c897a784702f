use crate::utils::error::{AdvisoryError, Result};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 以 snake_case 字串往返的列舉；未知值回傳 `AdvisoryError::UnknownVariant`
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// "financial_services" -> "Financial Services"
            pub fn title(&self) -> String {
                title_case(self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AdvisoryError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(AdvisoryError::UnknownVariant {
                        kind: $kind.to_string(),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum!(IndustryType, "industry", {
    FinancialServices => "financial_services",
    Healthcare => "healthcare",
    Technology => "technology",
    Manufacturing => "manufacturing",
    Retail => "retail",
    Energy => "energy",
    Consulting => "consulting",
    General => "general",
});

string_enum!(ExecutiveRole, "role", {
    Ceo => "ceo",
    Cfo => "cfo",
    Coo => "coo",
    Cto => "cto",
    BoardDirector => "board_director",
    VpStrategy => "vp_strategy",
    VpOperations => "vp_operations",
});

string_enum!(PromptCategory, "category", {
    StrategicAnalysis => "strategic_analysis",
    FinancialAnalysis => "financial_analysis",
    LeadershipCommunication => "leadership_communication",
    MarketIntelligence => "market_intelligence",
    OperationalExcellence => "operational_excellence",
    AiGovernance => "ai_governance",
});

string_enum!(CompanySize, "company_size", {
    Startup => "startup",
    MidMarket => "mid_market",
    Enterprise => "enterprise",
    Fortune500 => "fortune_500",
});

string_enum!(UrgencyLevel, "urgency_level", {
    Low => "low",
    Normal => "normal",
    High => "high",
    Critical => "critical",
});

string_enum!(Confidentiality, "confidentiality", {
    Public => "public",
    Internal => "internal",
    Confidential => "confidential",
    Restricted => "restricted",
});

impl Default for UrgencyLevel {
    fn default() -> Self {
        UrgencyLevel::Normal
    }
}

impl Default for Confidentiality {
    fn default() -> Self {
        Confidentiality::Internal
    }
}

/// 底線轉空白並將每個字首大寫
pub fn title_case(raw: &str) -> String {
    raw.split(|c| c == '_' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn default_region() -> String {
    "global".to_string()
}

/// 產生提示時的高階主管情境
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptContext {
    pub industry: IndustryType,
    pub role: ExecutiveRole,
    pub company_size: CompanySize,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub specific_focus: Option<String>,
    #[serde(default)]
    pub urgency_level: UrgencyLevel,
    #[serde(default)]
    pub confidentiality: Confidentiality,
}

impl PromptContext {
    pub fn new(industry: IndustryType, role: ExecutiveRole, company_size: CompanySize) -> Self {
        Self {
            industry,
            role,
            company_size,
            region: default_region(),
            specific_focus: None,
            urgency_level: UrgencyLevel::default(),
            confidentiality: Confidentiality::default(),
        }
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    pub fn with_focus(mut self, focus: &str) -> Self {
        self.specific_focus = Some(focus.to_string());
        self
    }

    pub fn with_urgency(mut self, urgency: UrgencyLevel) -> Self {
        self.urgency_level = urgency;
        self
    }

    pub fn with_confidentiality(mut self, confidentiality: Confidentiality) -> Self {
        self.confidentiality = confidentiality;
        self
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub category: PromptCategory,
    pub base_prompt: String,
    /// 範本預設變數
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// 產業、角色或 `產業_角色` 專屬的補充指引
    #[serde(default)]
    pub context_adaptations: BTreeMap<String, String>,
    #[serde(default)]
    pub quality_criteria: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PromptTemplate {
    pub fn new(name: &str, category: PromptCategory, base_prompt: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            category,
            base_prompt: base_prompt.to_string(),
            variables: BTreeMap::new(),
            context_adaptations: BTreeMap::new(),
            quality_criteria: Vec::new(),
            created_at: Utc::now(),
            version: default_version(),
            tags: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_variable(mut self, key: &str, value: &str) -> Self {
        self.variables.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_adaptation(mut self, key: &str, guidance: &str) -> Self {
        self.context_adaptations
            .insert(key.to_string(), guidance.to_string());
        self
    }

    pub fn with_criteria(mut self, criteria: &[&str]) -> Self {
        self.quality_criteria = criteria.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// 依序查找 `產業_角色`、產業、角色的補充指引
    pub fn adaptation_for(&self, context: &PromptContext) -> Option<&str> {
        let combined = format!("{}_{}", context.industry, context.role);
        self.context_adaptations
            .get(&combined)
            .or_else(|| self.context_adaptations.get(context.industry.as_str()))
            .or_else(|| self.context_adaptations.get(context.role.as_str()))
            .map(String::as_str)
    }
}

/// 一次提示產生與回應的紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptExecution {
    pub id: String,
    pub prompt_id: String,
    pub category: PromptCategory,
    pub context: PromptContext,
    pub generated_prompt: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub quality_score: Option<f64>,
    pub execution_time: NaiveDateTime,
    #[serde(default)]
    pub feedback: Option<serde_json::Value>,
}

impl PromptExecution {
    pub fn new(template: &PromptTemplate, context: PromptContext, generated_prompt: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt_id: template.id.clone(),
            category: template.category,
            context,
            generated_prompt,
            response: String::new(),
            quality_score: None,
            execution_time: Local::now().naive_local(),
            feedback: None,
        }
    }

    pub fn at(mut self, execution_time: NaiveDateTime) -> Self {
        self.execution_time = execution_time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_round_trip_and_unknown_value() {
        assert_eq!("fortune_500".parse::<CompanySize>().unwrap(), CompanySize::Fortune500);
        assert_eq!(ExecutiveRole::BoardDirector.as_str(), "board_director");

        let err = "aerospace".parse::<IndustryType>().unwrap_err();
        assert!(matches!(err, AdvisoryError::UnknownVariant { ref kind, .. } if kind == "industry"));

        let json = serde_json::to_string(&IndustryType::FinancialServices).unwrap();
        assert_eq!(json, "\"financial_services\"");
        assert!(serde_json::from_str::<PromptCategory>("\"poetry\"").is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(IndustryType::FinancialServices.title(), "Financial Services");
        assert_eq!(CompanySize::Fortune500.title(), "Fortune 500");
        assert_eq!(ExecutiveRole::Ceo.title(), "Ceo");
        assert_eq!(title_case("north america"), "North America");
    }

    #[test]
    fn test_adaptation_lookup_order() {
        let template = PromptTemplate::new("T", PromptCategory::FinancialAnalysis, "body")
            .with_adaptation("technology", "tech")
            .with_adaptation("cfo", "cfo")
            .with_adaptation("technology_cfo", "tech cfo");

        let tech_cfo = PromptContext::new(IndustryType::Technology, ExecutiveRole::Cfo, CompanySize::Enterprise);
        let tech_ceo = PromptContext::new(IndustryType::Technology, ExecutiveRole::Ceo, CompanySize::Enterprise);
        let retail_cfo = PromptContext::new(IndustryType::Retail, ExecutiveRole::Cfo, CompanySize::Enterprise);
        let retail_coo = PromptContext::new(IndustryType::Retail, ExecutiveRole::Coo, CompanySize::Enterprise);

        assert_eq!(template.adaptation_for(&tech_cfo), Some("tech cfo"));
        assert_eq!(template.adaptation_for(&tech_ceo), Some("tech"));
        assert_eq!(template.adaptation_for(&retail_cfo), Some("cfo"));
        assert_eq!(template.adaptation_for(&retail_coo), None);
    }

    #[test]
    fn test_context_defaults_from_json() {
        let context: PromptContext = serde_json::from_str(
            r#"{"industry":"healthcare","role":"coo","company_size":"mid_market"}"#,
        )
        .unwrap();

        assert_eq!(context.region, "global");
        assert_eq!(context.urgency_level, UrgencyLevel::Normal);
        assert_eq!(context.confidentiality, Confidentiality::Internal);
    }
}

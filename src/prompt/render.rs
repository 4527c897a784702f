//! `{name}` 佔位符替換。

use crate::prompt::model::PromptContext;
use crate::utils::error::{AdvisoryError, Result};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 由情境調整器負責填入的佔位符，渲染時保留原樣
pub const ADAPTER_PLACEHOLDERS: [&str; 6] = [
    "industry_context",
    "regulatory_considerations",
    "role_focus",
    "decision_framework",
    "communication_guidance",
    "compliance_note",
];

/// 提供具名範本變數
pub trait TemplateVars {
    fn template_vars(&self) -> BTreeMap<String, String>;
}

impl TemplateVars for BTreeMap<String, String> {
    fn template_vars(&self) -> BTreeMap<String, String> {
        self.clone()
    }
}

impl TemplateVars for HashMap<String, String> {
    fn template_vars(&self) -> BTreeMap<String, String> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl TemplateVars for [(&str, &str)] {
    fn template_vars(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// 情境衍生的變數：產業、角色、公司規模轉為標題格式
impl TemplateVars for PromptContext {
    fn template_vars(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("industry".to_string(), self.industry.title());
        vars.insert("role".to_string(), self.role.title());
        vars.insert("company_size".to_string(), self.company_size.title());
        vars.insert("region".to_string(), super::model::title_case(&self.region));
        vars.insert(
            "urgency_level".to_string(),
            self.urgency_level.as_str().to_string(),
        );
        vars.insert(
            "confidentiality".to_string(),
            self.confidentiality.as_str().to_string(),
        );
        if let Some(focus) = &self.specific_focus {
            vars.insert("specific_focus".to_string(), focus.clone());
        }
        vars
    }
}

fn placeholder_regex() -> Result<Regex> {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| AdvisoryError::ProcessingError {
        message: format!("Invalid placeholder pattern: {}", e),
    })
}

pub fn is_adapter_placeholder(name: &str) -> bool {
    ADAPTER_PLACEHOLDERS.contains(&name) || name.starts_with("generic_")
}

/// 文字中出現的所有佔位符名稱
pub fn placeholders(text: &str) -> Result<BTreeSet<String>> {
    let re = placeholder_regex()?;
    Ok(re
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect())
}

/// 替換 `vars` 中有的佔位符，其餘原樣保留；`required` 中缺少任一個即失敗
pub fn render_template(
    template_name: &str,
    text: &str,
    vars: &BTreeMap<String, String>,
    required: &[&str],
) -> Result<String> {
    if let Some(missing) = required.iter().find(|name| !vars.contains_key(**name)) {
        return Err(AdvisoryError::MissingTemplateVariable {
            template: template_name.to_string(),
            variable: missing.to_string(),
        });
    }

    let re = placeholder_regex()?;
    let rendered = re.replace_all(text, |caps: &Captures| match vars.get(&caps[1]) {
        Some(value) => value.clone(),
        None => caps[0].to_string(),
    });

    Ok(rendered.into_owned())
}

/// 渲染後仍未解析、且不屬於情境調整器的佔位符
pub fn unresolved_placeholders(text: &str) -> Result<Vec<String>> {
    Ok(placeholders(text)?
        .into_iter()
        .filter(|name| !is_adapter_placeholder(name))
        .collect())
}

use crate::prompt::adapter::ContextAdapter;
use crate::prompt::model::{
    ExecutiveRole, IndustryType, PromptCategory, PromptContext, PromptExecution, PromptTemplate,
};
use crate::prompt::render::{render_template, unresolved_placeholders, TemplateVars};
use crate::utils::error::{AdvisoryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

const POPULAR_TEMPLATE_LIMIT: usize = 10;

/// 執行紀錄的篩選條件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageFilter {
    pub category: Option<PromptCategory>,
    pub industry: Option<IndustryType>,
    pub role: Option<ExecutiveRole>,
}

impl UsageFilter {
    fn matches(&self, execution: &PromptExecution) -> bool {
        self.category.map_or(true, |c| execution.category == c)
            && self.industry.map_or(true, |i| execution.context.industry == i)
            && self.role.map_or(true, |r| execution.context.role == r)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryUsage {
    pub total_executions: usize,
    pub average_quality_score: Option<f64>,
    /// (template id, 次數)，次數遞減
    pub popular_templates: Vec<(String, usize)>,
    pub execution_count_by_day: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
struct TemplateExport<'a> {
    templates: Vec<&'a PromptTemplate>,
    export_timestamp: String,
}

/// 匯入時類別先以字串讀取，未知值回傳 `UnknownVariant`
#[derive(Debug, Deserialize)]
struct TemplateImport {
    #[serde(default)]
    templates: Vec<ImportedTemplate>,
}

#[derive(Debug, Deserialize)]
struct ImportedTemplate {
    #[serde(default)]
    id: Option<String>,
    name: String,
    category: String,
    base_prompt: String,
    #[serde(default)]
    variables: BTreeMap<String, String>,
    #[serde(default)]
    context_adaptations: BTreeMap<String, String>,
    #[serde(default)]
    quality_criteria: Vec<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// 範本與執行紀錄的集中管理
#[derive(Debug, Default)]
pub struct PromptRegistry {
    templates: HashMap<String, PromptTemplate>,
    executions: Vec<PromptExecution>,
    adapter: ContextAdapter,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adapter(&self) -> &ContextAdapter {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut ContextAdapter {
        &mut self.adapter
    }

    /// 相同 id 會覆蓋舊範本
    pub fn register(&mut self, template: PromptTemplate) -> String {
        let id = template.id.clone();
        tracing::debug!("📝 Registering template '{}' ({})", template.name, id);
        if self.templates.insert(id.clone(), template).is_some() {
            tracing::warn!("Template {} replaced", id);
        }
        id
    }

    pub fn get(&self, id: &str) -> Result<&PromptTemplate> {
        self.templates
            .get(id)
            .ok_or_else(|| AdvisoryError::TemplateNotFound { id: id.to_string() })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// 依名稱排序
    pub fn list(&self, category: Option<PromptCategory>) -> Vec<&PromptTemplate> {
        let mut templates: Vec<&PromptTemplate> = self
            .templates
            .values()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        templates
    }

    /// 變數優先序：範本預設 < 呼叫端 < 情境；之後交給情境調整器
    pub fn generate_prompt<V: TemplateVars + ?Sized>(
        &self,
        id: &str,
        context: &PromptContext,
        vars: &V,
    ) -> Result<String> {
        self.generate_prompt_with(id, context, vars, &[])
    }

    pub fn generate_prompt_with<V: TemplateVars + ?Sized>(
        &self,
        id: &str,
        context: &PromptContext,
        vars: &V,
        required: &[&str],
    ) -> Result<String> {
        let template = self.get(id)?;

        let mut all_vars = template.variables.clone();
        all_vars.extend(vars.template_vars());
        all_vars.extend(context.template_vars());

        let mut body = template.base_prompt.clone();
        if let Some(guidance) = template.adaptation_for(context) {
            tracing::debug!("Appending context guidance for {}/{}", context.industry, context.role);
            body.push_str("\n\n");
            body.push_str(guidance);
        }

        let rendered = render_template(&template.name, &body, &all_vars, required)?;
        let adapted = self.adapter.adapt_prompt(&rendered, context);

        let leftovers = unresolved_placeholders(&adapted)?;
        if !leftovers.is_empty() {
            tracing::warn!(
                "Template '{}' left unresolved placeholders: {}",
                template.name,
                leftovers.join(", ")
            );
        }

        Ok(adapted)
    }

    /// 產生提示並記錄一筆執行
    pub fn execute_prompt<V: TemplateVars + ?Sized>(
        &mut self,
        id: &str,
        context: &PromptContext,
        vars: &V,
    ) -> Result<&PromptExecution> {
        let generated = self.generate_prompt(id, context, vars)?;
        let template = self.get(id)?;
        let execution = PromptExecution::new(template, context.clone(), generated);
        tracing::info!("▶️ Executed template '{}' as {}", template.name, execution.id);
        self.executions.push(execution);
        self.executions
            .last()
            .ok_or_else(|| AdvisoryError::ProcessingError {
                message: "Execution was not recorded".to_string(),
            })
    }

    /// 找不到執行紀錄時回傳 false
    pub fn update_execution_response(
        &mut self,
        execution_id: &str,
        response: &str,
        quality_score: Option<f64>,
    ) -> bool {
        match self.executions.iter_mut().find(|e| e.id == execution_id) {
            Some(execution) => {
                execution.response = response.to_string();
                execution.quality_score = quality_score;
                true
            }
            None => false,
        }
    }

    pub fn executions(&self) -> &[PromptExecution] {
        &self.executions
    }

    pub fn usage_analytics(&self, filter: UsageFilter) -> RegistryUsage {
        let filtered: Vec<&PromptExecution> = self
            .executions
            .iter()
            .filter(|e| filter.matches(e))
            .collect();

        let scores: Vec<f64> = filtered.iter().filter_map(|e| e.quality_score).collect();
        let average_quality_score =
            (!scores.is_empty()).then(|| crate::core::stats::mean(&scores));

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut by_day: BTreeMap<String, usize> = BTreeMap::new();
        for execution in &filtered {
            *counts.entry(execution.prompt_id.as_str()).or_insert(0) += 1;
            *by_day
                .entry(execution.execution_time.format("%Y-%m-%d").to_string())
                .or_insert(0) += 1;
        }

        let mut popular_templates: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(id, count)| (id.to_string(), count))
            .collect();
        popular_templates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        popular_templates.truncate(POPULAR_TEMPLATE_LIMIT);

        RegistryUsage {
            total_executions: filtered.len(),
            average_quality_score,
            popular_templates,
            execution_count_by_day: by_day,
        }
    }

    pub fn export_templates(&self, category: Option<PromptCategory>) -> Result<String> {
        let export = TemplateExport {
            templates: self.list(category),
            export_timestamp: Utc::now().to_rfc3339(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// 回傳匯入的 template id；任何一筆失敗則整批不寫入
    pub fn import_templates(&mut self, json: &str) -> Result<Vec<String>> {
        let data: TemplateImport = serde_json::from_str(json)?;

        let templates = data
            .templates
            .into_iter()
            .map(|raw| -> Result<PromptTemplate> {
                let category: PromptCategory = raw.category.parse()?;
                Ok(PromptTemplate {
                    id: raw.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                    name: raw.name,
                    category,
                    base_prompt: raw.base_prompt,
                    variables: raw.variables,
                    context_adaptations: raw.context_adaptations,
                    quality_criteria: raw.quality_criteria,
                    created_at: raw.created_at.unwrap_or_else(Utc::now),
                    version: raw.version.unwrap_or_else(|| "1.0.0".to_string()),
                    tags: raw.tags,
                })
            })
            .collect::<Result<Vec<PromptTemplate>>>()?;

        tracing::info!("📥 Importing {} templates", templates.len());
        Ok(templates.into_iter().map(|t| self.register(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::adapter::AdaptationRule;
    use crate::prompt::model::{CompanySize, Confidentiality};
    use chrono::NaiveDate;

    fn context() -> PromptContext {
        PromptContext::new(IndustryType::Technology, ExecutiveRole::Cfo, CompanySize::MidMarket)
            .with_confidentiality(Confidentiality::Public)
    }

    fn registry() -> PromptRegistry {
        let mut registry = PromptRegistry::new();
        registry.register(
            PromptTemplate::new("Zeta", PromptCategory::FinancialAnalysis, "As {role} at a {company_size} firm, review {topic} over {period}.")
                .with_id("zeta")
                .with_variable("period", "3 years")
                .with_variable("topic", "costs"),
        );
        registry.register(
            PromptTemplate::new("Alpha", PromptCategory::StrategicAnalysis, "Plan for {industry}.")
                .with_id("alpha")
                .with_adaptation("technology", "Include platform scalability."),
        );
        registry
    }

    #[test]
    fn test_variable_precedence() {
        let registry = registry();
        let vars = [("topic", "margins"), ("role", "ignored")];
        let prompt = registry.generate_prompt("zeta", &context(), &vars[..]).unwrap();

        assert_eq!(prompt, "As Cfo at a Mid Market firm, review margins over 3 years.");
    }

    #[test]
    fn test_custom_rule_applies_to_generated_prompt() {
        let mut registry = registry();
        registry.adapter_mut().register_rule(AdaptationRule::new(
            "cite sources",
            1,
            |c| c.role == ExecutiveRole::Cfo,
            |p, _| format!("{} Cite sources.", p),
        ));

        let prompt = registry
            .generate_prompt("zeta", &context(), &BTreeMap::<String, String>::new())
            .unwrap();
        assert_eq!(
            prompt,
            "As Cfo at a Mid Market firm, review costs over 3 years. Cite sources."
        );
    }

    #[test]
    fn test_context_guidance_is_appended() {
        let registry = registry();
        let prompt = registry
            .generate_prompt("alpha", &context(), &BTreeMap::<String, String>::new())
            .unwrap();
        assert_eq!(prompt, "Plan for Technology.\n\nInclude platform scalability.");
    }

    #[test]
    fn test_missing_template() {
        let registry = registry();
        let err = registry
            .generate_prompt("nope", &context(), &BTreeMap::<String, String>::new())
            .unwrap_err();
        assert!(matches!(err, AdvisoryError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let registry = registry();
        let names: Vec<&str> = registry.list(None).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
        assert_eq!(registry.list(Some(PromptCategory::FinancialAnalysis)).len(), 1);
        assert!(registry.list(Some(PromptCategory::AiGovernance)).is_empty());
    }

    #[test]
    fn test_execution_tracking_and_usage() {
        let mut registry = registry();
        let first = registry
            .execute_prompt("zeta", &context(), &BTreeMap::<String, String>::new())
            .unwrap()
            .id
            .clone();
        registry
            .execute_prompt("zeta", &context(), &BTreeMap::<String, String>::new())
            .unwrap();
        registry
            .execute_prompt("alpha", &context(), &BTreeMap::<String, String>::new())
            .unwrap();

        assert!(registry.update_execution_response(&first, "answer", Some(8.0)));
        assert!(!registry.update_execution_response("missing", "answer", None));

        let usage = registry.usage_analytics(UsageFilter::default());
        assert_eq!(usage.total_executions, 3);
        assert_eq!(usage.average_quality_score, Some(8.0));
        assert_eq!(usage.popular_templates[0], ("zeta".to_string(), 2));

        let strategic = registry.usage_analytics(UsageFilter {
            category: Some(PromptCategory::StrategicAnalysis),
            ..Default::default()
        });
        assert_eq!(strategic.total_executions, 1);
        assert_eq!(strategic.average_quality_score, None);
    }

    #[test]
    fn test_usage_counts_by_day() {
        let mut registry = registry();
        let template = registry.get("zeta").unwrap().clone();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for hour in [9, 15] {
            let execution = PromptExecution::new(&template, context(), String::new())
                .at(day.and_hms_opt(hour, 0, 0).unwrap());
            registry.executions.push(execution);
        }

        let usage = registry.usage_analytics(UsageFilter::default());
        assert_eq!(usage.execution_count_by_day["2024-05-01"], 2);
    }

    #[test]
    fn test_import_rejects_unknown_category() {
        let mut registry = PromptRegistry::new();
        let json = r#"{"templates":[{"name":"X","category":"poetry","base_prompt":"hi"}]}"#;
        let err = registry.import_templates(json).unwrap_err();

        assert!(matches!(err, AdvisoryError::UnknownVariant { ref value, .. } if value == "poetry"));
        assert!(registry.is_empty());
    }
}

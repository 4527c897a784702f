use exec_advisory::prompt::library::{register_benchmark_templates, COMPREHENSIVE_BENCHMARK_ID};
use exec_advisory::prompt::model::{
    CompanySize, Confidentiality, ExecutiveRole, IndustryType, PromptCategory, PromptContext,
    UrgencyLevel,
};
use exec_advisory::prompt::quality::QualityContext;
use exec_advisory::utils::error::AdvisoryError;
use exec_advisory::{PromptRegistry, QualityValidator, UsageAnalytics};

fn context() -> PromptContext {
    PromptContext::new(IndustryType::FinancialServices, ExecutiveRole::Cfo, CompanySize::Enterprise)
        .with_urgency(UrgencyLevel::Critical)
        .with_confidentiality(Confidentiality::Confidential)
}

#[test]
fn test_registry_export_import_round_trip() {
    let mut source = PromptRegistry::new();
    register_benchmark_templates(&mut source);
    let exported = source
        .export_templates(Some(PromptCategory::FinancialAnalysis))
        .unwrap();

    let mut target = PromptRegistry::new();
    let imported = target.import_templates(&exported).unwrap();

    assert_eq!(imported.len(), 3);
    let original = source.get(COMPREHENSIVE_BENCHMARK_ID).unwrap();
    let copy = target.get(COMPREHENSIVE_BENCHMARK_ID).unwrap();
    assert_eq!(copy.name, original.name);
    assert_eq!(copy.base_prompt, original.base_prompt);
    assert_eq!(copy.context_adaptations, original.context_adaptations);
    assert_eq!(copy.variables, original.variables);
}

#[test]
fn test_import_rejects_unknown_category() {
    let json = r#"{"templates": [{"name": "Odd", "category": "poetry", "base_prompt": "Hi"}]}"#;
    let mut registry = PromptRegistry::new();

    let err = registry.import_templates(json).unwrap_err();
    assert!(matches!(err, AdvisoryError::UnknownVariant { .. }));
    assert!(registry.is_empty());
}

#[test]
fn test_execute_assess_and_analyze() {
    let mut registry = PromptRegistry::new();
    register_benchmark_templates(&mut registry);
    let vars = [("benchmark_scope", "industry peers"), ("time_period", "3 years")];

    let execution = registry
        .execute_prompt(COMPREHENSIVE_BENCHMARK_ID, &context(), &vars[..])
        .unwrap()
        .clone();
    assert!(execution.generated_prompt.starts_with("URGENT"));
    assert!(execution.generated_prompt.contains("Maintain confidentiality"));

    let mut validator = QualityValidator::new();
    let quality_context = QualityContext {
        industry: Some(IndustryType::FinancialServices),
    };
    let score = validator
        .validate_content(&execution.generated_prompt, &quality_context, Some(&execution.id))
        .overall_score;
    assert!((0.0..=10.0).contains(&score));
    assert!(registry.update_execution_response(&execution.id, "Response text", Some(score)));

    let mut analytics = UsageAnalytics::new();
    for recorded in registry.executions() {
        analytics.record_execution(recorded.clone(), Some("analyst"));
    }

    let summary = analytics.usage_summary(None, None);
    assert_eq!(summary.total_executions, 1);
    assert_eq!(summary.unique_users, 1);
    assert_eq!(summary.most_popular_category, Some(PromptCategory::FinancialAnalysis));

    let report = analytics.analytics_report(None, None);
    assert_eq!(report.usage_summary.total_executions, 1);
    assert!(report.category_performance.contains_key(&PromptCategory::FinancialAnalysis));
}

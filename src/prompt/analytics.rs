//! 提示執行紀錄的使用統計與效能洞察。

use crate::core::stats;
use crate::prompt::model::{ExecutiveRole, IndustryType, PromptCategory, PromptExecution};
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const RECENT_QUALITY_WINDOW: usize = 50;
const RECENT_USAGE_WINDOW: usize = 100;
const PEAK_CONCENTRATION: f64 = 0.3;
const LOW_CATEGORY_SCORE: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceBenchmarks {
    pub min_quality_score: f64,
    /// 秒
    pub max_response_time: f64,
    pub target_success_rate: f64,
}

impl Default for PerformanceBenchmarks {
    fn default() -> Self {
        Self {
            min_quality_score: 7.0,
            max_response_time: 5.0,
            target_success_rate: 0.85,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub total_executions: usize,
    pub unique_users: usize,
    pub average_quality_score: f64,
    pub success_rate: f64,
    pub peak_usage_hour: u32,
    pub most_popular_category: Option<PromptCategory>,
    pub top_industries: Vec<(IndustryType, usize)>,
    pub top_roles: Vec<(ExecutiveRole, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: usize,
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub std_dev: f64,
}

impl CategoryStats {
    fn from_scores(scores: &[f64]) -> Self {
        Self {
            count: scores.len(),
            average_score: stats::mean(scores),
            min_score: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max_score: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            std_dev: stats::sample_std_dev(scores),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl PerformanceRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            PerformanceRating::Excellent
        } else if score >= 7.0 {
            PerformanceRating::Good
        } else if score >= 6.0 {
            PerformanceRating::Fair
        } else {
            PerformanceRating::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectivenessRating {
    HighlyEffective,
    Effective,
    ModeratelyEffective,
    NeedsImprovement,
}

impl EffectivenessRating {
    /// 品質佔 0.7、一致性（換算為 0..10）佔 0.3
    pub fn from_quality(average_quality: f64, consistency: f64) -> Self {
        let score = average_quality * 0.7 + consistency * 10.0 * 0.3;
        if score >= 8.0 {
            EffectivenessRating::HighlyEffective
        } else if score >= 7.0 {
            EffectivenessRating::Effective
        } else if score >= 6.0 {
            EffectivenessRating::ModeratelyEffective
        } else {
            EffectivenessRating::NeedsImprovement
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryInsight {
    pub total_executions: usize,
    pub average_quality: f64,
    pub performance_rating: PerformanceRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEffectiveness {
    pub total_executions: usize,
    pub average_quality: f64,
    pub consistency: f64,
    pub effectiveness_rating: EffectivenessRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightArea {
    Quality,
    UsagePatterns,
    CategoryPerformance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Optimization,
    Trend,
    Issue,
    Opportunity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInsight {
    pub category: InsightArea,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub description: String,
    pub impact: ImpactLevel,
    pub recommendation: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: NaiveDateTime,
    pub period_start: Option<NaiveDateTime>,
    pub period_end: Option<NaiveDateTime>,
    pub total_executions_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub report_metadata: ReportMetadata,
    pub usage_summary: UsageMetrics,
    pub category_performance: BTreeMap<PromptCategory, CategoryStats>,
    pub industry_insights: BTreeMap<IndustryType, IndustryInsight>,
    pub role_effectiveness: BTreeMap<ExecutiveRole, RoleEffectiveness>,
    pub performance_insights: Vec<PerformanceInsight>,
    pub recommendations: Vec<String>,
}

/// 出現次數最多者；同票時取排序最前者
fn most_frequent<K: Ord + Copy>(counts: &BTreeMap<K, usize>) -> Option<K> {
    counts
        .iter()
        .fold(None, |best: Option<(K, usize)>, (key, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((*key, *count)),
        })
        .map(|(key, _)| key)
}

fn top_n<K: Ord + Copy>(counts: BTreeMap<K, usize>, n: usize) -> Vec<(K, usize)> {
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

fn count_by<K: Ord, F: Fn(&PromptExecution) -> K>(executions: &[&PromptExecution], key: F) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for execution in executions {
        *counts.entry(key(*execution)).or_insert(0) += 1;
    }
    counts
}

fn quality_scores(executions: &[&PromptExecution]) -> Vec<f64> {
    executions.iter().filter_map(|e| e.quality_score).collect()
}

#[derive(Debug, Default)]
pub struct UsageAnalytics {
    execution_history: Vec<PromptExecution>,
    user_sessions: BTreeMap<String, Vec<NaiveDateTime>>,
    benchmarks: PerformanceBenchmarks,
}

impl UsageAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[PromptExecution] {
        &self.execution_history
    }

    pub fn record_execution(&mut self, execution: PromptExecution, user_id: Option<&str>) {
        if let Some(user) = user_id {
            self.user_sessions
                .entry(user.to_string())
                .or_default()
                .push(execution.execution_time);
        }
        tracing::debug!("Recorded execution {} for analytics", execution.id);
        self.execution_history.push(execution);
    }

    fn filter_by_date(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Vec<&PromptExecution> {
        self.execution_history
            .iter()
            .filter(|e| start.map_or(true, |s| e.execution_time >= s))
            .filter(|e| end.map_or(true, |t| e.execution_time <= t))
            .collect()
    }

    fn unique_users_between(&self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> usize {
        self.user_sessions
            .values()
            .filter(|sessions| {
                sessions.iter().any(|t| {
                    start.map_or(true, |s| *t >= s) && end.map_or(true, |e| *t <= e)
                })
            })
            .count()
    }

    /// 成功率以品質分數達 `min_quality_score` 計
    pub fn usage_summary(&self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> UsageMetrics {
        let executions = self.filter_by_date(start, end);
        if executions.is_empty() {
            return UsageMetrics::default();
        }

        let total = executions.len();
        let scores = quality_scores(&executions);
        let successful = scores
            .iter()
            .filter(|s| **s >= self.benchmarks.min_quality_score)
            .count();

        UsageMetrics {
            total_executions: total,
            unique_users: self.unique_users_between(start, end),
            average_quality_score: stats::mean(&scores),
            success_rate: successful as f64 / total as f64,
            peak_usage_hour: most_frequent(&count_by(&executions, |e| e.execution_time.hour())).unwrap_or(0),
            most_popular_category: most_frequent(&count_by(&executions, |e| e.category)),
            top_industries: top_n(count_by(&executions, |e| e.context.industry), 5),
            top_roles: top_n(count_by(&executions, |e| e.context.role), 5),
        }
    }

    pub fn category_performance(
        &self,
        category: Option<PromptCategory>,
        days: i64,
    ) -> BTreeMap<PromptCategory, CategoryStats> {
        let since = Local::now().naive_local() - Duration::days(days);
        self.category_performance_since(category, Some(since))
    }

    pub fn category_performance_since(
        &self,
        category: Option<PromptCategory>,
        since: Option<NaiveDateTime>,
    ) -> BTreeMap<PromptCategory, CategoryStats> {
        let mut scores: BTreeMap<PromptCategory, Vec<f64>> = BTreeMap::new();
        for execution in self.filter_by_date(since, None) {
            if category.is_some_and(|c| c != execution.category) {
                continue;
            }
            if let Some(score) = execution.quality_score {
                scores.entry(execution.category).or_default().push(score);
            }
        }

        scores
            .into_iter()
            .map(|(cat, values)| (cat, CategoryStats::from_scores(&values)))
            .collect()
    }

    pub fn industry_insights(&self, industry: Option<IndustryType>) -> BTreeMap<IndustryType, IndustryInsight> {
        let mut grouped: BTreeMap<IndustryType, Vec<&PromptExecution>> = BTreeMap::new();
        for execution in &self.execution_history {
            if industry.is_some_and(|i| i != execution.context.industry) {
                continue;
            }
            grouped.entry(execution.context.industry).or_default().push(execution);
        }

        grouped
            .into_iter()
            .map(|(ind, executions)| {
                let average_quality = stats::mean(&quality_scores(&executions));
                (
                    ind,
                    IndustryInsight {
                        total_executions: executions.len(),
                        average_quality,
                        performance_rating: PerformanceRating::from_score(average_quality),
                    },
                )
            })
            .collect()
    }

    /// 一致性 = 1 - 標準差 / 10，少於兩筆分數時為 1.0
    pub fn role_effectiveness(&self) -> BTreeMap<ExecutiveRole, RoleEffectiveness> {
        let mut grouped: BTreeMap<ExecutiveRole, Vec<&PromptExecution>> = BTreeMap::new();
        for execution in &self.execution_history {
            grouped.entry(execution.context.role).or_default().push(execution);
        }

        grouped
            .into_iter()
            .map(|(role, executions)| {
                let scores = quality_scores(&executions);
                let average_quality = stats::mean(&scores);
                let consistency = if scores.len() > 1 {
                    1.0 - stats::sample_std_dev(&scores) / 10.0
                } else {
                    1.0
                };
                (
                    role,
                    RoleEffectiveness {
                        total_executions: executions.len(),
                        average_quality,
                        consistency,
                        effectiveness_rating: EffectivenessRating::from_quality(average_quality, consistency),
                    },
                )
            })
            .collect()
    }

    pub fn performance_insights(&self, min_executions: usize) -> Vec<PerformanceInsight> {
        self.performance_insights_with(min_executions, &self.category_performance(None, 30))
    }

    fn performance_insights_with(
        &self,
        min_executions: usize,
        category_stats: &BTreeMap<PromptCategory, CategoryStats>,
    ) -> Vec<PerformanceInsight> {
        let mut insights = Vec::new();
        let history = &self.execution_history;
        let target = self.benchmarks.min_quality_score;

        let recent_start = history.len().saturating_sub(RECENT_QUALITY_WINDOW);
        let recent_scores: Vec<f64> = history[recent_start..]
            .iter()
            .filter_map(|e| e.quality_score)
            .collect();
        if recent_scores.len() >= min_executions {
            let avg_recent = stats::mean(&recent_scores);
            if avg_recent < target {
                insights.push(PerformanceInsight {
                    category: InsightArea::Quality,
                    insight_type: InsightType::Issue,
                    description: format!(
                        "Average quality score ({:.1}) below target ({:.1})",
                        avg_recent, target
                    ),
                    impact: ImpactLevel::High,
                    recommendation: "Review and optimize underperforming prompt templates".to_string(),
                    data: serde_json::json!({ "current_avg": avg_recent, "target": target }),
                });
            }
        }

        let usage_start = history.len().saturating_sub(RECENT_USAGE_WINDOW);
        let recent_usage: Vec<&PromptExecution> = history[usage_start..].iter().collect();
        let by_hour = count_by(&recent_usage, |e| e.execution_time.hour());
        if let Some(peak_hour) = most_frequent(&by_hour) {
            let peak = by_hour.get(&peak_hour).copied().unwrap_or(0) as f64;
            let concentration = peak / recent_usage.len() as f64;
            if concentration > PEAK_CONCENTRATION {
                insights.push(PerformanceInsight {
                    category: InsightArea::UsagePatterns,
                    insight_type: InsightType::Optimization,
                    description: format!(
                        "High usage concentration at hour {} ({:.1}%)",
                        peak_hour,
                        concentration * 100.0
                    ),
                    impact: ImpactLevel::Medium,
                    recommendation: "Consider load balancing or capacity planning for peak hours".to_string(),
                    data: serde_json::json!({ "peak_hour": peak_hour, "concentration": concentration }),
                });
            }
        }

        for (category, cat_stats) in category_stats {
            if cat_stats.count >= min_executions && cat_stats.average_score < LOW_CATEGORY_SCORE {
                insights.push(PerformanceInsight {
                    category: InsightArea::CategoryPerformance,
                    insight_type: InsightType::Issue,
                    description: format!(
                        "Low performance in {} category (avg: {:.1})",
                        category, cat_stats.average_score
                    ),
                    impact: ImpactLevel::Medium,
                    recommendation: format!("Review and enhance {} prompt templates", category),
                    data: serde_json::to_value(cat_stats).unwrap_or(serde_json::Value::Null),
                });
            }
        }

        insights
    }

    pub fn optimization_recommendations(insights: &[PerformanceInsight]) -> Vec<String> {
        let has = |area: InsightArea| insights.iter().any(|i| i.category == area);
        let mut recommendations = Vec::new();

        if has(InsightArea::Quality) {
            recommendations.push("Implement systematic quality improvement program for underperforming prompts".to_string());
        }
        if has(InsightArea::UsagePatterns) {
            recommendations.push("Optimize system capacity and load distribution based on usage patterns".to_string());
        }
        if has(InsightArea::CategoryPerformance) {
            recommendations.push("Focus on category-specific template enhancements and training".to_string());
        }
        if insights.len() > 5 {
            recommendations.push("Conduct comprehensive prompt library audit and optimization".to_string());
        }
        recommendations
    }

    pub fn analytics_report(&self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> AnalyticsReport {
        let category_performance = self.category_performance(None, 30);
        let performance_insights = self.performance_insights_with(10, &category_performance);
        let recommendations = Self::optimization_recommendations(&performance_insights);

        tracing::info!(
            "📈 Analytics report over {} executions, {} insights",
            self.execution_history.len(),
            performance_insights.len()
        );

        AnalyticsReport {
            report_metadata: ReportMetadata {
                generated_at: Local::now().naive_local(),
                period_start: start,
                period_end: end,
                total_executions_analyzed: self.execution_history.len(),
            },
            usage_summary: self.usage_summary(start, end),
            category_performance,
            industry_insights: self.industry_insights(None),
            role_effectiveness: self.role_effectiveness(),
            performance_insights,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::model::{CompanySize, PromptContext, PromptTemplate};
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn execution(
        category: PromptCategory,
        industry: IndustryType,
        role: ExecutiveRole,
        score: Option<f64>,
        hour: u32,
    ) -> PromptExecution {
        let template = PromptTemplate::new("t", category, "body");
        let context = PromptContext::new(industry, role, CompanySize::Enterprise);
        let mut exec = PromptExecution::new(&template, context, "prompt".to_string()).at(at(hour));
        exec.quality_score = score;
        exec
    }

    fn sample() -> UsageAnalytics {
        let mut analytics = UsageAnalytics::new();
        analytics.record_execution(
            execution(PromptCategory::FinancialAnalysis, IndustryType::Technology, ExecutiveRole::Cfo, Some(8.0), 9),
            Some("alice"),
        );
        analytics.record_execution(
            execution(PromptCategory::FinancialAnalysis, IndustryType::Technology, ExecutiveRole::Cfo, Some(6.0), 9),
            Some("alice"),
        );
        analytics.record_execution(
            execution(PromptCategory::StrategicAnalysis, IndustryType::Healthcare, ExecutiveRole::Ceo, None, 14),
            Some("bob"),
        );
        analytics
    }

    #[test]
    fn test_usage_summary() {
        let summary = sample().usage_summary(None, None);

        assert_eq!(summary.total_executions, 3);
        assert_eq!(summary.unique_users, 2);
        assert_eq!(summary.average_quality_score, 7.0);
        assert!((summary.success_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.peak_usage_hour, 9);
        assert_eq!(summary.most_popular_category, Some(PromptCategory::FinancialAnalysis));
        assert_eq!(summary.top_industries[0], (IndustryType::Technology, 2));
    }

    #[test]
    fn test_empty_window_is_default() {
        let summary = sample().usage_summary(Some(at(23)), None);
        assert_eq!(summary, UsageMetrics::default());
    }

    #[test]
    fn test_category_performance_and_ratings() {
        let analytics = sample();
        let perf = analytics.category_performance_since(None, None);
        let fin = &perf[&PromptCategory::FinancialAnalysis];
        assert_eq!(fin.count, 2);
        assert_eq!((fin.min_score, fin.max_score), (6.0, 8.0));
        assert!(!perf.contains_key(&PromptCategory::StrategicAnalysis));

        let industries = analytics.industry_insights(None);
        assert_eq!(industries[&IndustryType::Technology].performance_rating, PerformanceRating::Good);
        assert_eq!(industries[&IndustryType::Healthcare].performance_rating, PerformanceRating::Poor);
    }

    #[test]
    fn test_role_consistency() {
        let roles = sample().role_effectiveness();
        let cfo = &roles[&ExecutiveRole::Cfo];
        let expected = 1.0 - stats::sample_std_dev(&[8.0, 6.0]) / 10.0;
        assert!((cfo.consistency - expected).abs() < 1e-12);
        assert_eq!(roles[&ExecutiveRole::Ceo].consistency, 1.0);
        assert_eq!(
            EffectivenessRating::from_quality(9.0, 1.0),
            EffectivenessRating::HighlyEffective
        );
    }

    #[test]
    fn test_insights_flag_low_quality_and_peak_hour() {
        let mut analytics = UsageAnalytics::new();
        for _ in 0..10 {
            analytics.record_execution(
                execution(PromptCategory::AiGovernance, IndustryType::Energy, ExecutiveRole::Coo, Some(5.0), 10),
                None,
            );
        }
        let stats = analytics.category_performance_since(None, None);
        let insights = analytics.performance_insights_with(10, &stats);

        let areas: Vec<InsightArea> = insights.iter().map(|i| i.category).collect();
        assert_eq!(
            areas,
            vec![InsightArea::Quality, InsightArea::UsagePatterns, InsightArea::CategoryPerformance]
        );
        assert_eq!(UsageAnalytics::optimization_recommendations(&insights).len(), 3);
    }
}

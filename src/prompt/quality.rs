//! 以關鍵字啟發式評估高階主管內容品質。

use crate::core::keywords::{count_matches, mentions_any};
use crate::core::scoring::clamp_score;
use crate::core::stats;
use crate::prompt::model::IndustryType;
use crate::utils::error::{AdvisoryError, Result};
use chrono::{Duration, Local, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PASS_THRESHOLD: f64 = 7.0;
const RECOMMENDATION_THRESHOLD: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityDimension {
    StrategicRelevance,
    ExecutiveAppropriateness,
    Actionability,
    BusinessImpact,
    Clarity,
    Completeness,
    Accuracy,
    Compliance,
    StakeholderAlignment,
    TimeSensitivity,
}

impl QualityDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityDimension::StrategicRelevance => "strategic_relevance",
            QualityDimension::ExecutiveAppropriateness => "executive_appropriateness",
            QualityDimension::Actionability => "actionability",
            QualityDimension::BusinessImpact => "business_impact",
            QualityDimension::Clarity => "clarity",
            QualityDimension::Completeness => "completeness",
            QualityDimension::Accuracy => "accuracy",
            QualityDimension::Compliance => "compliance",
            QualityDimension::StakeholderAlignment => "stakeholder_alignment",
            QualityDimension::TimeSensitivity => "time_sensitivity",
        }
    }

    fn improvement_advice(&self) -> Option<&'static str> {
        match self {
            QualityDimension::StrategicRelevance => Some("Enhance strategic focus by connecting recommendations to long-term business objectives and competitive positioning."),
            QualityDimension::ExecutiveAppropriateness => Some("Adjust tone for executive audience - focus on business impact rather than technical details."),
            QualityDimension::Actionability => Some("Add specific action items with clear timelines and responsibility assignments."),
            QualityDimension::BusinessImpact => Some("Quantify business impact with specific metrics, financial projections, or KPIs."),
            QualityDimension::Clarity => Some("Improve clarity with better structure, shorter sentences, and executive summaries."),
            QualityDimension::Completeness => Some("Ensure comprehensive analysis including risks, benefits, and implementation considerations."),
            QualityDimension::Compliance => Some("Address regulatory and compliance requirements relevant to your industry."),
            _ => None,
        }
    }
}

/// 評估時可用的情境
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityContext {
    pub industry: Option<IndustryType>,
}

type Evaluator = Box<dyn Fn(&str, &QualityContext) -> Result<f64> + Send + Sync>;

pub struct QualityMetric {
    pub dimension: QualityDimension,
    pub weight: f64,
    pub description: String,
    pub min_threshold: f64,
    evaluator: Evaluator,
}

impl QualityMetric {
    pub fn new<F>(dimension: QualityDimension, weight: f64, min_threshold: f64, description: &str, evaluator: F) -> Self
    where
        F: Fn(&str, &QualityContext) -> Result<f64> + Send + Sync + 'static,
    {
        Self {
            dimension,
            weight,
            description: description.to_string(),
            min_threshold,
            evaluator: Box::new(evaluator),
        }
    }
}

impl std::fmt::Debug for QualityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityMetric")
            .field("dimension", &self.dimension)
            .field("weight", &self.weight)
            .field("min_threshold", &self.min_threshold)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub content_id: String,
    pub overall_score: f64,
    pub dimension_scores: BTreeMap<QualityDimension, f64>,
    pub passed_threshold: bool,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
    pub assessed_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTrend {
    pub average: f64,
    pub trend: TrendDirection,
}

#[derive(Debug)]
pub struct QualityValidator {
    metrics: Vec<QualityMetric>,
    history: Vec<QualityAssessment>,
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityValidator {
    /// 內建七個維度
    pub fn new() -> Self {
        let mut validator = Self::empty();
        validator.register_metric(QualityMetric::new(QualityDimension::StrategicRelevance, 0.20, 7.0, "Alignment with strategic business objectives", evaluate_strategic_relevance));
        validator.register_metric(QualityMetric::new(QualityDimension::ExecutiveAppropriateness, 0.18, 7.0, "Appropriate tone and complexity for executive audience", evaluate_executive_appropriateness));
        validator.register_metric(QualityMetric::new(QualityDimension::Actionability, 0.16, 6.0, "Contains clear, actionable recommendations", evaluate_actionability));
        validator.register_metric(QualityMetric::new(QualityDimension::BusinessImpact, 0.15, 6.0, "Addresses significant business impact and value creation", evaluate_business_impact));
        validator.register_metric(QualityMetric::new(QualityDimension::Clarity, 0.12, 7.0, "Clear communication and logical structure", evaluate_clarity));
        validator.register_metric(QualityMetric::new(QualityDimension::Completeness, 0.10, 6.0, "Comprehensive coverage of key aspects", evaluate_completeness));
        validator.register_metric(QualityMetric::new(QualityDimension::Compliance, 0.09, 8.0, "Adherence to regulatory and policy requirements", evaluate_compliance));
        validator
    }

    pub fn empty() -> Self {
        Self {
            metrics: Vec::new(),
            history: Vec::new(),
        }
    }

    /// 同維度會取代既有指標
    pub fn register_metric(&mut self, metric: QualityMetric) {
        match self.metrics.iter_mut().find(|m| m.dimension == metric.dimension) {
            Some(existing) => *existing = metric,
            None => self.metrics.push(metric),
        }
    }

    pub fn metrics(&self) -> &[QualityMetric] {
        &self.metrics
    }

    pub fn history(&self) -> &[QualityAssessment] {
        &self.history
    }

    pub fn validate_content(
        &mut self,
        content: &str,
        context: &QualityContext,
        content_id: Option<&str>,
    ) -> &QualityAssessment {
        let assessed_at = Local::now().naive_local();
        let content_id = content_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("content_{}", assessed_at.and_utc().timestamp_millis()));

        let mut dimension_scores = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut weighted_sum = 0.0;

        for metric in &self.metrics {
            match (metric.evaluator)(content, context) {
                Ok(raw) => {
                    let score = clamp_score(raw);
                    dimension_scores.insert(metric.dimension, score);
                    weighted_sum += score * metric.weight;
                    if score < metric.min_threshold {
                        warnings.push(format!(
                            "{} score ({:.1}) below threshold ({:.1})",
                            metric.dimension.as_str(),
                            score,
                            metric.min_threshold
                        ));
                    }
                }
                Err(e) => {
                    warnings.push(format!("Error evaluating {}: {}", metric.dimension.as_str(), e));
                    dimension_scores.insert(metric.dimension, 0.0);
                }
            }
        }

        let total_weight: f64 = self.metrics.iter().map(|m| m.weight).sum();
        let overall_score = stats::safe_ratio(weighted_sum, total_weight, 0.0);
        let passed_threshold = overall_score >= PASS_THRESHOLD && warnings.is_empty();

        let recommendations = dimension_scores
            .iter()
            .filter(|(_, score)| **score < RECOMMENDATION_THRESHOLD)
            .filter_map(|(dimension, _)| dimension.improvement_advice())
            .map(str::to_string)
            .collect();

        tracing::debug!(
            "Quality assessment {}: overall {:.2}, {} warnings",
            content_id,
            overall_score,
            warnings.len()
        );

        self.history.push(QualityAssessment {
            content_id,
            overall_score,
            dimension_scores,
            passed_threshold,
            recommendations,
            warnings,
            assessed_at,
        });
        &self.history[self.history.len() - 1]
    }

    pub fn quality_trends(&self, days: i64) -> BTreeMap<QualityDimension, DimensionTrend> {
        self.quality_trends_at(days, Local::now().naive_local())
    }

    /// 最近 `days` 天內的平均與走向（最後一筆高於第一筆為 improving）
    pub fn quality_trends_at(&self, days: i64, now: NaiveDateTime) -> BTreeMap<QualityDimension, DimensionTrend> {
        let cutoff = now - Duration::days(days);
        let recent: Vec<&QualityAssessment> = self
            .history
            .iter()
            .filter(|a| a.assessed_at > cutoff)
            .collect();

        let mut trends = BTreeMap::new();
        if recent.is_empty() {
            return trends;
        }

        for metric in &self.metrics {
            let scores: Vec<f64> = recent
                .iter()
                .map(|a| a.dimension_scores.get(&metric.dimension).copied().unwrap_or(0.0))
                .collect();
            let trend = match (scores.first(), scores.last()) {
                (Some(first), Some(last)) if scores.len() > 1 && last > first => TrendDirection::Improving,
                _ => TrendDirection::Stable,
            };
            trends.insert(
                metric.dimension,
                DimensionTrend {
                    average: stats::mean(&scores),
                    trend,
                },
            );
        }
        trends
    }
}

fn regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AdvisoryError::ProcessingError {
        message: format!("Invalid quality pattern '{}': {}", pattern, e),
    })
}

fn evaluate_strategic_relevance(content: &str, _: &QualityContext) -> Result<f64> {
    let mut score = 5.0;

    let strategic = count_matches(
        content,
        &[
            "strategic", "strategy", "competitive advantage", "market position", "long-term",
            "vision", "mission", "objectives", "goals", "stakeholders", "value creation",
            "transformation", "growth",
        ],
    );
    score += (strategic as f64 * 0.3).min(3.0);

    if mentions_any(content, &["swot", "porter", "competitive analysis", "market analysis", "scenario planning"]) {
        score += 1.0;
    }
    if mentions_any(content, &["forecast", "projection", "trend", "outlook", "future", "emerging"]) {
        score += 0.5;
    }
    Ok(score.min(10.0))
}

fn evaluate_executive_appropriateness(content: &str, _: &QualityContext) -> Result<f64> {
    let mut score = 5.0;

    let executive = count_matches(
        content,
        &[
            "recommend", "propose", "decision", "leadership", "governance", "oversight",
            "accountability", "responsibility", "authority",
        ],
    );
    score += (executive as f64 * 0.2).min(2.0);

    if count_matches(content, &["algorithm", "implementation", "coding", "debugging", "API"]) > 3 {
        score -= 1.0;
    }
    if mentions_any(content, &["ROI", "revenue", "profit", "cost", "investment", "return"]) {
        score += 1.0;
    }
    if mentions_any(content, &["board", "shareholders", "investors", "customers", "employees"]) {
        score += 1.0;
    }
    Ok(score.min(10.0))
}

fn evaluate_actionability(content: &str, _: &QualityContext) -> Result<f64> {
    let mut score = 3.0;

    let actions = count_matches(
        content,
        &[
            "implement", "establish", "develop", "create", "launch", "initiate", "execute",
            "deploy", "adopt", "invest", "acquire", "divest",
        ],
    );
    score += (actions as f64 * 0.3).min(3.0);

    if regex(r"\d+\.\s")?.is_match(content) || regex(r"•\s")?.is_match(content) {
        score += 1.0;
    }
    if mentions_any(content, &["immediate", "short-term", "long-term", "Q1", "Q2", "Q3", "Q4", "month", "year"]) {
        score += 1.0;
    }
    if mentions_any(content, &["team", "department", "role", "owner", "accountable"]) {
        score += 1.0;
    }
    Ok(score.min(10.0))
}

fn evaluate_business_impact(content: &str, _: &QualityContext) -> Result<f64> {
    let mut score = 4.0;

    if regex(r"\$[\d,]+|\d+%|\d+\s*(million|billion)")?.is_match(content) {
        score += 2.0;
    }

    let areas = count_matches(
        content,
        &[
            "revenue", "profitability", "market share", "efficiency", "cost reduction",
            "customer satisfaction", "employee engagement", "competitive position",
        ],
    );
    score += (areas as f64 * 0.4).min(2.0);

    if mentions_any(content, &["risk", "threat", "opportunity", "challenge", "mitigation"]) {
        score += 1.0;
    }
    Ok(score.min(10.0))
}

fn evaluate_clarity(content: &str, _: &QualityContext) -> Result<f64> {
    let sentences: Vec<&str> = content.split('.').filter(|s| !s.trim().is_empty()).collect();
    if sentences.is_empty() {
        return Ok(2.0);
    }

    let mut score: f64 = 5.0;
    let words: usize = sentences.iter().map(|s| s.split_whitespace().count()).sum();
    let avg_sentence_length = words as f64 / sentences.len() as f64;
    if (15.0..=25.0).contains(&avg_sentence_length) {
        score += 1.0;
    } else if avg_sentence_length > 35.0 {
        score -= 1.0;
    }

    if regex(r"\n\s*\n")?.is_match(content) {
        score += 0.5;
    }
    if regex(r"(?m)[•\-\*]\s|^\d+\.\s")?.is_match(content) {
        score += 0.5;
    }
    if regex(r"\b[A-Z]{2,}\b")?.find_iter(content).count() > 10 {
        score -= 1.0;
    }
    Ok(score.min(10.0))
}

fn evaluate_completeness(content: &str, _: &QualityContext) -> Result<f64> {
    let lower = content.to_lowercase();
    let mut score = 4.0;

    let components = [
        "current state", "analysis", "recommendation", "implementation", "timeline",
        "resources", "risks", "benefits", "next steps",
    ];
    let present = components
        .iter()
        .filter(|component| component.split_whitespace().any(|word| lower.contains(word)))
        .count();
    score += (present as f64 * 0.4).min(4.0);

    let word_count = content.split_whitespace().count();
    if word_count < 100 {
        score -= 2.0;
    } else if word_count > 500 {
        score += 1.0;
    }
    Ok(score.min(10.0))
}

fn evaluate_compliance(content: &str, context: &QualityContext) -> Result<f64> {
    let lower = content.to_lowercase();
    let mut score: f64 = 7.0;

    let regulated = matches!(
        context.industry,
        Some(IndustryType::FinancialServices) | Some(IndustryType::Healthcare)
    );
    if regulated && !mentions_any(&lower, &["compliance", "regulation", "regulatory", "legal", "policy"]) {
        score -= 2.0;
    }
    if lower.contains("risk") && (lower.contains("disclaimer") || lower.contains("consideration")) {
        score += 0.5;
    }
    Ok(score.min(10.0))
}

//! 顧客洞察彙整：區隔績效、意見主題、情緒分布與建議。

use crate::core::keywords::{count_matches, mentions_any};
use crate::domain::model::AnalysisKind;
use crate::domain::ports::Report;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const POSITIVE_WORDS: [&str; 9] = [
    "excellent", "great", "love", "amazing", "perfect", "outstanding", "satisfied", "happy", "recommend",
];
const NEGATIVE_WORDS: [&str; 9] = [
    "terrible", "awful", "hate", "worst", "disappointed", "frustrated", "angry", "poor", "bad",
];

pub const THEMES: [(&str, &[&str]); 8] = [
    ("pricing", &["price", "cost", "expensive", "cheap", "value", "pricing", "affordable"]),
    ("product_quality", &["quality", "defect", "broken", "durable", "reliable", "functionality"]),
    ("customer_service", &["service", "support", "staff", "representative", "help", "response"]),
    ("user_experience", &["experience", "interface", "easy", "difficult", "intuitive", "confusing"]),
    ("delivery", &["shipping", "delivery", "fast", "slow", "delayed", "on-time"]),
    ("features", &["feature", "functionality", "capability", "missing", "need", "want"]),
    ("performance", &["speed", "slow", "fast", "performance", "efficiency", "lag"]),
    ("communication", &["communication", "information", "updates", "notification", "inform"]),
];

const JOURNEY_INSIGHTS: [(&str, [&str; 2]); 7] = [
    ("awareness", ["Brand recognition needs improvement", "Digital marketing effectiveness varies by segment"]),
    ("consideration", ["Product comparison tools requested", "Pricing transparency important"]),
    ("purchase", ["Checkout process optimization needed", "Payment options expansion requested"]),
    ("onboarding", ["Simplified setup process desired", "Training materials effectiveness varies"]),
    ("engagement", ["Regular communication preferred", "Self-service options important"]),
    ("support", ["Response time critical", "Multi-channel support expected"]),
    ("renewal", ["Value demonstration crucial", "Loyalty programs effective"]),
];

const FREQUENT_THEME_SHARE: f64 = 0.2;
const NEGATIVE_THEME_SHARE: f64 = 0.4;
const POSITIVE_THEME_SHARE: f64 = 0.3;
const FEATURE_REQUEST_SHARE: f64 = 0.15;
const MIN_FEEDBACK_VOLUME: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// 正負面關鍵字數較多者勝出，相同時為中性
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let positive = count_matches(text, &POSITIVE_WORDS);
    let negative = count_matches(text, &NEGATIVE_WORDS);
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

fn default_satisfaction() -> f64 {
    7.0
}

fn default_churn() -> f64 {
    0.05
}

fn default_importance() -> f64 {
    5.0
}

/// 成長率與流失率以小數表示（0.12 = 12%）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegment {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub revenue_contribution: f64,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default = "default_satisfaction")]
    pub satisfaction_score: f64,
    #[serde(default = "default_churn")]
    pub churn_rate: f64,
    #[serde(default)]
    pub avg_lifetime_value: f64,
    #[serde(default)]
    pub key_characteristics: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
}

impl CustomerSegment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: 0,
            revenue_contribution: 0.0,
            growth_rate: 0.0,
            satisfaction_score: default_satisfaction(),
            churn_rate: default_churn(),
            avg_lifetime_value: 0.0,
            key_characteristics: Vec::new(),
            pain_points: Vec::new(),
            preferences: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerFeedback {
    pub segment: String,
    /// survey / interview / review / support
    pub channel: String,
    /// 未標註時依文字判斷
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    pub category: String,
    pub feedback_text: String,
    #[serde(default = "default_importance")]
    pub importance_score: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl CustomerFeedback {
    pub fn new(segment: &str, channel: &str, sentiment: Option<Sentiment>, category: &str, text: &str, importance: f64) -> Self {
        Self {
            segment: segment.to_string(),
            channel: channel.to_string(),
            sentiment,
            category: category.to_string(),
            feedback_text: text.to_string(),
            importance_score: importance,
            date: None,
        }
    }

    pub fn resolved_sentiment(&self) -> Sentiment {
        self.sentiment
            .unwrap_or_else(|| analyze_sentiment(&self.feedback_text))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    pub name: String,
    pub customer_share_pct: f64,
    pub revenue_share_pct: f64,
    pub revenue_per_customer: f64,
    pub satisfaction_score: f64,
    pub churn_rate_pct: f64,
    pub growth_rate_pct: f64,
    pub lifetime_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentPerformance {
    pub total_customers: u64,
    pub total_revenue: f64,
    pub segment_performance: Vec<SegmentMetrics>,
    pub top_performers: Vec<String>,
    pub at_risk_segments: Vec<String>,
    pub growth_opportunities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeCount {
    pub theme: String,
    pub mentions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyStage {
    pub stage: String,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInsightReport {
    pub segments: Vec<CustomerSegment>,
    pub segment_performance: SegmentPerformance,
    pub themes: Vec<ThemeCount>,
    pub key_insights: Vec<String>,
    pub sentiment_analysis: Option<SentimentDistribution>,
    pub priority_issues: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommendations: Vec<String>,
    pub customer_journey_insights: Vec<JourneyStage>,
    pub total_feedback: usize,
}

impl Report for CustomerInsightReport {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::CustomerInsight
    }

    fn export_stem(&self) -> String {
        "customer_insights".to_string()
    }

    fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Total Segments: {}", self.segments.len()),
            format!("Total Customers: {}", self.segment_performance.total_customers),
            format!("Total Revenue: ${:.0}", self.segment_performance.total_revenue),
        ];
        if let Some(sentiment) = &self.sentiment_analysis {
            lines.push(format!(
                "Sentiment: {:.1}% positive, {:.1}% neutral, {:.1}% negative",
                sentiment.positive * 100.0,
                sentiment.neutral * 100.0,
                sentiment.negative * 100.0
            ));
        }
        lines.extend(self.key_insights.iter().map(|i| format!("Insight: {}", i)));
        lines.extend(self.priority_issues.iter().map(|i| format!("Issue: {}", i)));
        lines.extend(self.recommendations.iter().map(|r| format!("Recommendation: {}", r)));
        lines
    }
}

/// 主題與其出現於幾則意見（依宣告順序）
pub fn extract_themes<'a, I>(feedback: I) -> Vec<(&'static str, usize)>
where
    I: IntoIterator<Item = &'a CustomerFeedback> + Clone,
{
    THEMES
        .iter()
        .map(|(theme, keywords)| {
            let count = feedback
                .clone()
                .into_iter()
                .filter(|f| mentions_any(&f.feedback_text, keywords))
                .count();
            (*theme, count)
        })
        .collect()
}

pub fn analyze_segment_performance(segments: &[CustomerSegment]) -> SegmentPerformance {
    if segments.is_empty() {
        return SegmentPerformance::default();
    }

    let total_customers: u64 = segments.iter().map(|s| s.size).sum();
    let total_revenue: f64 = segments.iter().map(|s| s.revenue_contribution).sum();
    let mut performance = SegmentPerformance {
        total_customers,
        total_revenue,
        ..Default::default()
    };

    for segment in segments {
        let share = |part: f64, whole: f64| if whole > 0.0 { part / whole * 100.0 } else { 0.0 };
        performance.segment_performance.push(SegmentMetrics {
            name: segment.name.clone(),
            customer_share_pct: share(segment.size as f64, total_customers as f64),
            revenue_share_pct: share(segment.revenue_contribution, total_revenue),
            revenue_per_customer: if segment.size > 0 {
                segment.revenue_contribution / segment.size as f64
            } else {
                0.0
            },
            satisfaction_score: segment.satisfaction_score,
            churn_rate_pct: segment.churn_rate * 100.0,
            growth_rate_pct: segment.growth_rate * 100.0,
            lifetime_value: segment.avg_lifetime_value,
        });

        if segment.satisfaction_score >= 8.0 && segment.churn_rate <= 0.05 {
            performance.top_performers.push(segment.name.clone());
        }
        if segment.churn_rate >= 0.15 || segment.satisfaction_score <= 6.0 {
            performance.at_risk_segments.push(segment.name.clone());
        }
        if segment.growth_rate >= 0.20 && segment.satisfaction_score >= 7.0 {
            performance.growth_opportunities.push(segment.name.clone());
        }
    }
    performance
}

/// 提及率 >= 20% 的主題；其中負面 >= 40% 時標示為高度負面
pub fn identify_priority_issues(feedback: &[CustomerFeedback], segments: &[CustomerSegment]) -> Vec<String> {
    let mut issues = Vec::new();
    let negative = feedback
        .iter()
        .filter(|f| f.resolved_sentiment() == Sentiment::Negative);
    let negative_themes: BTreeMap<&str, usize> = extract_themes(negative).into_iter().collect();

    for (theme, count) in extract_themes(feedback) {
        if count == 0 || (count as f64) < feedback.len() as f64 * FREQUENT_THEME_SHARE {
            continue;
        }
        let negative_count = negative_themes.get(theme).copied().unwrap_or(0);
        if negative_count as f64 >= count as f64 * NEGATIVE_THEME_SHARE {
            issues.push(format!(
                "High negative sentiment around {} ({}/{} negative)",
                theme, negative_count, count
            ));
        } else {
            issues.push(format!("Frequently mentioned {} needs attention ({} mentions)", theme, count));
        }
    }

    for segment in segments {
        if segment.churn_rate >= 0.15 {
            issues.push(format!(
                "High churn rate in {} segment ({:.1}%)",
                segment.name,
                segment.churn_rate * 100.0
            ));
        }
        if segment.satisfaction_score <= 6.0 {
            issues.push(format!(
                "Low satisfaction in {} segment (score: {:.1})",
                segment.name, segment.satisfaction_score
            ));
        }
    }
    issues
}

pub fn identify_opportunities(feedback: &[CustomerFeedback], segments: &[CustomerSegment]) -> Vec<String> {
    let mut opportunities = Vec::new();

    let positive: Vec<&CustomerFeedback> = feedback
        .iter()
        .filter(|f| f.resolved_sentiment() == Sentiment::Positive)
        .collect();
    let mut positive_themes = extract_themes(positive.iter().copied());
    positive_themes.sort_by(|a, b| b.1.cmp(&a.1));
    for (theme, count) in positive_themes.into_iter().take(3) {
        if count > 0 && count as f64 >= positive.len() as f64 * POSITIVE_THEME_SHARE {
            opportunities.push(format!("Leverage strength in {} for competitive advantage", theme));
        }
    }

    for segment in segments
        .iter()
        .filter(|s| s.avg_lifetime_value > 0.0 && s.growth_rate > 0.15)
    {
        opportunities.push(format!(
            "Expand in high-growth {} segment (growth: {:.1}%)",
            segment.name,
            segment.growth_rate * 100.0
        ));
    }

    let feature_requests = feedback
        .iter()
        .filter(|f| mentions_any(&f.feedback_text, &["need", "want"]))
        .count();
    if feature_requests > 0 && feature_requests as f64 >= feedback.len() as f64 * FEATURE_REQUEST_SHARE {
        opportunities.push(format!(
            "Product enhancement opportunities identified from {} customer requests",
            feature_requests
        ));
    }

    for segment in segments.iter().filter(|s| s.satisfaction_score >= 8.0) {
        opportunities.push(format!("Cross-selling potential in satisfied {} segment", segment.name));
    }
    opportunities
}

fn first_two(names: &[String]) -> String {
    names.iter().take(2).cloned().collect::<Vec<_>>().join(", ")
}

pub fn generate_recommendations(
    priority_issues: &[String],
    segment_performance: &SegmentPerformance,
    sentiment: Option<&SentimentDistribution>,
    opportunities: &[String],
    total_feedback: usize,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !priority_issues.is_empty() {
        recommendations.push("Immediate action required: Address top customer pain points to prevent churn".to_string());
    }
    if !segment_performance.at_risk_segments.is_empty() {
        recommendations.push(format!(
            "Implement retention programs for at-risk segments: {}",
            first_two(&segment_performance.at_risk_segments)
        ));
    }
    if !segment_performance.growth_opportunities.is_empty() {
        recommendations.push(format!(
            "Increase investment in high-growth segments: {}",
            first_two(&segment_performance.growth_opportunities)
        ));
    }
    if !segment_performance.top_performers.is_empty() {
        recommendations.push(format!(
            "Scale successful strategies from top-performing segments: {}",
            first_two(&segment_performance.top_performers)
        ));
    }

    let negative_pct = sentiment.map_or(0.0, |s| s.negative * 100.0);
    if negative_pct > 30.0 {
        recommendations.push("Urgent: Implement comprehensive customer experience improvement program".to_string());
    } else if negative_pct > 20.0 {
        recommendations.push("Focus on service quality improvements to reduce negative sentiment".to_string());
    }

    if !opportunities.is_empty() {
        recommendations.push("Prioritize top growth opportunities for competitive advantage".to_string());
    }
    if total_feedback < MIN_FEEDBACK_VOLUME {
        recommendations.push("Increase customer feedback collection to improve insight quality".to_string());
    }
    recommendations
}

pub fn sentiment_distribution(feedback: &[CustomerFeedback]) -> Option<SentimentDistribution> {
    if feedback.is_empty() {
        return None;
    }
    let total = feedback.len() as f64;
    let share = |target: Sentiment| {
        feedback
            .iter()
            .filter(|f| f.resolved_sentiment() == target)
            .count() as f64
            / total
    };
    Some(SentimentDistribution {
        positive: share(Sentiment::Positive),
        neutral: share(Sentiment::Neutral),
        negative: share(Sentiment::Negative),
    })
}

pub fn synthesize_insights(segments: &[CustomerSegment], feedback: &[CustomerFeedback]) -> CustomerInsightReport {
    tracing::info!(
        "👥 Synthesizing insights from {} segments and {} feedback items",
        segments.len(),
        feedback.len()
    );

    let segment_performance = analyze_segment_performance(segments);
    let sentiment_analysis = sentiment_distribution(feedback);
    let themes = extract_themes(feedback);
    let priority_issues = identify_priority_issues(feedback, segments);
    let opportunities = identify_opportunities(feedback, segments);

    let mut key_insights = Vec::new();
    if let Some(top) = segments
        .iter()
        .reduce(|best, s| if s.revenue_contribution > best.revenue_contribution { s } else { best })
    {
        key_insights.push(format!(
            "Top revenue segment: {} contributes ${:.0}",
            top.name, top.revenue_contribution
        ));
        if !segment_performance.at_risk_segments.is_empty() {
            key_insights.push(format!(
                "At-risk segments identified: {} segments need immediate attention",
                segment_performance.at_risk_segments.len()
            ));
        }
    }
    if let Some(sentiment) = &sentiment_analysis {
        key_insights.push(format!(
            "Customer sentiment: {:.1}% positive, {:.1}% negative",
            sentiment.positive * 100.0,
            sentiment.negative * 100.0
        ));
    }
    if let Some((theme, count)) = themes
        .iter()
        .copied()
        .reduce(|best, t| if t.1 > best.1 { t } else { best })
    {
        key_insights.push(format!("Most discussed topic: {} mentioned in {} feedback items", theme, count));
    }

    let recommendations = generate_recommendations(
        &priority_issues,
        &segment_performance,
        sentiment_analysis.as_ref(),
        &opportunities,
        feedback.len(),
    );

    tracing::debug!(
        "{} priority issues, {} opportunities",
        priority_issues.len(),
        opportunities.len()
    );

    CustomerInsightReport {
        segments: segments.to_vec(),
        segment_performance,
        themes: themes
            .into_iter()
            .map(|(theme, mentions)| ThemeCount {
                theme: theme.to_string(),
                mentions,
            })
            .collect(),
        key_insights,
        sentiment_analysis,
        priority_issues,
        opportunities,
        recommendations,
        customer_journey_insights: JOURNEY_INSIGHTS
            .iter()
            .map(|(stage, insights)| JourneyStage {
                stage: stage.to_string(),
                insights: insights.iter().map(|i| i.to_string()).collect(),
            })
            .collect(),
        total_feedback: feedback.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(name: &str, revenue: f64, growth: f64, satisfaction: f64, churn: f64, ltv: f64) -> CustomerSegment {
        CustomerSegment {
            size: 100,
            revenue_contribution: revenue,
            growth_rate: growth,
            satisfaction_score: satisfaction,
            churn_rate: churn,
            avg_lifetime_value: ltv,
            ..CustomerSegment::new(name)
        }
    }

    fn feedback(sentiment: Option<Sentiment>, text: &str) -> CustomerFeedback {
        CustomerFeedback::new("Any", "survey", sentiment, "product", text, 5.0)
    }

    #[test]
    fn test_keyword_sentiment() {
        assert_eq!(analyze_sentiment("Excellent support, love it"), Sentiment::Positive);
        assert_eq!(analyze_sentiment("Terrible and frustrated"), Sentiment::Negative);
        assert_eq!(analyze_sentiment("Great but bad"), Sentiment::Neutral);
        assert_eq!(feedback(None, "Awful onboarding").resolved_sentiment(), Sentiment::Negative);
        assert_eq!(
            feedback(Some(Sentiment::Positive), "Awful onboarding").resolved_sentiment(),
            Sentiment::Positive
        );
    }

    #[test]
    fn test_segment_categories() {
        let segments = vec![
            segment("Enterprise", 300.0, 0.10, 8.5, 0.04, 5000.0),
            segment("Startups", 100.0, 0.40, 6.0, 0.25, 800.0),
            segment("SMB", 100.0, 0.25, 7.5, 0.10, 0.0),
        ];
        let perf = analyze_segment_performance(&segments);

        assert_eq!(perf.total_customers, 300);
        assert_eq!(perf.top_performers, vec!["Enterprise"]);
        assert_eq!(perf.at_risk_segments, vec!["Startups"]);
        assert_eq!(perf.growth_opportunities, vec!["SMB"]);
        assert!((perf.segment_performance[0].revenue_share_pct - 60.0).abs() < 1e-9);
        assert_eq!(analyze_segment_performance(&[]), SegmentPerformance::default());
    }

    #[test]
    fn test_priority_issues_from_negative_theme() {
        let items = vec![
            feedback(Some(Sentiment::Negative), "Too expensive for us"),
            feedback(Some(Sentiment::Negative), "The price is high"),
            feedback(Some(Sentiment::Positive), "Lovely colours"),
        ];
        let issues = identify_priority_issues(&items, &[]);
        assert_eq!(issues, vec!["High negative sentiment around pricing (2/2 negative)".to_string()]);
    }

    #[test]
    fn test_no_feedback_produces_no_theme_noise() {
        assert!(identify_priority_issues(&[], &[]).is_empty());
        assert!(identify_opportunities(&[], &[]).is_empty());
        assert!(sentiment_distribution(&[]).is_none());
    }

    #[test]
    fn test_synthesize_insights() {
        let segments = vec![
            segment("Enterprise", 2_800_000.0, 0.12, 8.2, 0.08, 85_000.0),
            segment("Startups", 450_000.0, 0.42, 6.8, 0.25, 8_500.0),
        ];
        let items = vec![
            feedback(Some(Sentiment::Positive), "Excellent customer support"),
            feedback(Some(Sentiment::Negative), "Response time is too slow, need faster support"),
            feedback(Some(Sentiment::Neutral), "Pricing is reasonable"),
        ];
        let report = synthesize_insights(&segments, &items);

        assert_eq!(report.key_insights[0], "Top revenue segment: Enterprise contributes $2800000");
        assert!(report
            .opportunities
            .contains(&"Expand in high-growth Startups segment (growth: 42.0%)".to_string()));
        assert!(report
            .recommendations
            .contains(&"Urgent: Implement comprehensive customer experience improvement program".to_string()));
        assert_eq!(report.customer_journey_insights.len(), 7);
        assert_eq!(report.themes[2].theme, "customer_service");
        assert_eq!(report.themes[2].mentions, 2);
    }
}

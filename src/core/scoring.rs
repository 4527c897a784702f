use crate::core::stats;
use crate::utils::error::{AdvisoryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;
pub const NEUTRAL_SCORE: f64 = 5.0;
pub const STRENGTH_THRESHOLD: f64 = 7.0;
pub const CONCERN_THRESHOLD: f64 = 5.0;

/// 夾在 [0, 10]；NaN 視為 0
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        SCORE_MIN
    } else {
        value.clamp(SCORE_MIN, SCORE_MAX)
    }
}

/// `score = clamp(raw * scale + offset, 0, 10)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentTransform {
    pub scale: f64,
    pub offset: f64,
}

impl ComponentTransform {
    pub const IDENTITY: ComponentTransform = ComponentTransform {
        scale: 1.0,
        offset: 0.0,
    };

    pub const fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    pub const fn scaled(scale: f64) -> Self {
        Self { scale, offset: 0.0 }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        clamp_score(raw * self.scale + self.offset)
    }
}

/// 缺少元件時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingComponentPolicy {
    /// 以中性分數 5.0 代替
    #[default]
    Neutral,
    /// 回傳 `AdvisoryError::MissingComponent`
    Reject,
}

#[derive(Debug, Clone)]
struct ComponentSpec {
    name: String,
    transform: ComponentTransform,
    weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub name: String,
    pub score: f64,
    /// 輸入缺漏而採用中性分數
    #[serde(default)]
    pub defaulted: bool,
}

/// 加權評分結果，元件依宣告順序排列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub components: Vec<ComponentScore>,
    pub overall: f64,
}

impl ScoreCard {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.score)
    }

    pub fn names_where<F: Fn(f64) -> bool>(&self, predicate: F) -> Vec<String> {
        self.components
            .iter()
            .filter(|c| predicate(c.score))
            .map(|c| c.name.clone())
            .collect()
    }

    /// 分數 >= 7 的元件
    pub fn strengths(&self) -> Vec<String> {
        self.names_where(|s| s >= STRENGTH_THRESHOLD)
    }

    /// 分數 < 5 的元件
    pub fn concerns(&self) -> Vec<String> {
        self.names_where(|s| s < CONCERN_THRESHOLD)
    }

    pub fn scores(&self) -> Vec<f64> {
        self.components.iter().map(|c| c.score).collect()
    }
}

/// 將具名原始指標轉成 0-10 分數並彙總
#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    components: Vec<ComponentSpec>,
    policy: MissingComponentPolicy,
}

impl WeightedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component(mut self, name: &str, transform: ComponentTransform) -> Self {
        self.components.push(ComponentSpec {
            name: name.to_string(),
            transform,
            weight: None,
        });
        self
    }

    pub fn weighted_component(
        mut self,
        name: &str,
        transform: ComponentTransform,
        weight: f64,
    ) -> Self {
        self.components.push(ComponentSpec {
            name: name.to_string(),
            transform,
            weight: Some(weight),
        });
        self
    }

    pub fn with_policy(mut self, policy: MissingComponentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 以查詢函式取得原始值並評分
    pub fn score_with<F>(&self, lookup: F) -> Result<ScoreCard>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut components = Vec::with_capacity(self.components.len());

        for entry in &self.components {
            let scored = match lookup(&entry.name) {
                Some(raw) => ComponentScore {
                    name: entry.name.clone(),
                    score: entry.transform.apply(raw),
                    defaulted: false,
                },
                None => match self.policy {
                    MissingComponentPolicy::Neutral => {
                        tracing::debug!(
                            "Component '{}' missing, using neutral score {}",
                            entry.name,
                            NEUTRAL_SCORE
                        );
                        ComponentScore {
                            name: entry.name.clone(),
                            score: NEUTRAL_SCORE,
                            defaulted: true,
                        }
                    }
                    MissingComponentPolicy::Reject => {
                        return Err(AdvisoryError::MissingComponent {
                            component: entry.name.clone(),
                        })
                    }
                },
            };
            components.push(scored);
        }

        let overall = self.aggregate(&components);
        Ok(ScoreCard {
            components,
            overall,
        })
    }

    pub fn score_map(&self, raw: &HashMap<String, f64>) -> Result<ScoreCard> {
        for key in raw.keys() {
            if !self.components.iter().any(|c| &c.name == key) {
                tracing::warn!("Ignoring unknown score component '{}'", key);
            }
        }
        self.score_with(|name| raw.get(name).copied())
    }

    fn aggregate(&self, components: &[ComponentScore]) -> f64 {
        let weighted = self.components.iter().all(|c| c.weight.is_some());
        if weighted && !self.components.is_empty() {
            self.components
                .iter()
                .zip(components)
                .map(|(entry, scored)| scored.score * entry.weight.unwrap_or(0.0))
                .sum()
        } else {
            stats::mean(&components.iter().map(|c| c.score).collect::<Vec<_>>())
        }
    }
}

type Predicate<I> = Box<dyn Fn(&I) -> bool + Send + Sync>;

/// 依序檢查門檻，第一個符合者勝出
pub struct TierClassifier<I, T: Copy> {
    rules: Vec<(Predicate<I>, T)>,
    fallback: T,
}

impl<I, T: Copy> TierClassifier<I, T> {
    pub fn new(fallback: T) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn rule<F>(mut self, tier: T, predicate: F) -> Self
    where
        F: Fn(&I) -> bool + Send + Sync + 'static,
    {
        self.rules.push((Box::new(predicate), tier));
        self
    }

    pub fn classify(&self, input: &I) -> T {
        self.rules
            .iter()
            .find(|(predicate, _)| predicate(input))
            .map(|(_, tier)| *tier)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn liquidity_scorer() -> WeightedScorer {
        WeightedScorer::new()
            .component("liquidity", ComponentTransform::scaled(5.0))
            .component("leverage", ComponentTransform::new(-2.0, 10.0))
    }

    #[test]
    fn test_transform_and_mean() {
        let card = liquidity_scorer()
            .score_with(|name| match name {
                "liquidity" => Some(2.1),
                "leverage" => Some(1.2),
                _ => None,
            })
            .unwrap();

        assert_eq!(card.get("liquidity"), Some(10.0));
        assert!((card.get("leverage").unwrap() - 7.6).abs() < 1e-12);
        assert!((card.overall - 8.8).abs() < 1e-12);
        assert_eq!(card.strengths(), vec!["liquidity", "leverage"]);
        assert!(card.concerns().is_empty());
    }

    #[test]
    fn test_missing_component_defaults_to_neutral() {
        let card = liquidity_scorer()
            .score_with(|name| (name == "liquidity").then_some(1.0))
            .unwrap();

        let leverage = &card.components[1];
        assert_eq!(leverage.score, NEUTRAL_SCORE);
        assert!(leverage.defaulted);
    }

    #[test]
    fn test_missing_component_rejected_when_strict() {
        let err = liquidity_scorer()
            .with_policy(MissingComponentPolicy::Reject)
            .score_with(|_| None)
            .unwrap_err();

        assert!(matches!(err, AdvisoryError::MissingComponent { component } if component == "liquidity"));
    }

    #[test]
    fn test_explicit_weights() {
        let scorer = WeightedScorer::new()
            .weighted_component("financial", ComponentTransform::IDENTITY, 0.4)
            .weighted_component("strategic", ComponentTransform::IDENTITY, 0.35)
            .weighted_component("risk", ComponentTransform::IDENTITY, 0.25);

        let raw: HashMap<String, f64> = [
            ("financial".to_string(), 8.0),
            ("strategic".to_string(), 6.0),
            ("risk".to_string(), 4.0),
        ]
        .into_iter()
        .collect();

        let card = scorer.score_map(&raw).unwrap();
        assert!((card.overall - (3.2 + 2.1 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_classifier_first_match_wins() {
        let classifier = TierClassifier::new("low")
            .rule("high", |s: &f64| *s >= 8.0)
            .rule("mid", |s: &f64| *s >= 5.0);

        assert_eq!(classifier.classify(&9.0), "high");
        assert_eq!(classifier.classify(&8.0), "high");
        assert_eq!(classifier.classify(&5.0), "mid");
        assert_eq!(classifier.classify(&4.99), "low");
    }

    proptest! {
        #[test]
        fn prop_component_scores_are_clamped(raw in proptest::num::f64::ANY, scale in -100.0f64..100.0, offset in -50.0f64..50.0) {
            let score = ComponentTransform::new(scale, offset).apply(raw);
            prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&score));
        }
    }
}

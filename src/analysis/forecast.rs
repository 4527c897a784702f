//! 季度財務預測：基準情境、三種替代情境與蒙地卡羅信賴區間。

use crate::core::sampler::{Band, MonteCarloSampler, Perturbation};
use super::due_diligence::slug;
use crate::core::stats;
use crate::core::time_value::Projector;
use crate::domain::model::AnalysisKind;
use crate::domain::ports::Report;
use crate::utils::error::{AdvisoryError, Result};
use chrono::{Datelike, Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FORECAST_QUARTERS: usize = 8;
pub const DEFAULT_BASELINE_REVENUE: f64 = 1_000_000.0;
const DEFAULT_EBITDA_MARGIN: f64 = 0.20;
const DAYS_PER_QUARTER: u64 = 90;
const BASE_CASH_CONVERSION: f64 = 0.85;

const REVENUE_NOISE: Perturbation = Perturbation::new(-0.05, 0.05);
const EXPENSE_NOISE: Perturbation = Perturbation::new(-0.03, 0.03);
const CASH_CONVERSION_RANGE: Perturbation = Perturbation::new(0.75, 0.95);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalData {
    pub period: String,
    pub revenue: f64,
    pub expenses: f64,
    pub ebitda: f64,
    pub cash_flow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketConditions {
    Growth,
    #[default]
    Stable,
    Decline,
}

impl MarketConditions {
    pub fn multiplier(&self) -> f64 {
        match self {
            MarketConditions::Growth => 1.05,
            MarketConditions::Stable => 1.0,
            MarketConditions::Decline => 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastAssumptions {
    /// 年成長率
    pub revenue_growth_rate: f64,
    pub expense_ratio: f64,
    /// 日曆季 (1-4) 的季節乘數
    pub seasonal_factor: BTreeMap<u32, f64>,
    pub market_conditions: MarketConditions,
    pub confidence_interval: f64,
}

impl Default for ForecastAssumptions {
    fn default() -> Self {
        Self {
            revenue_growth_rate: 0.10,
            expense_ratio: 0.75,
            seasonal_factor: [(1, 0.9), (2, 0.95), (3, 1.0), (4, 1.15)]
                .into_iter()
                .collect(),
            market_conditions: MarketConditions::Stable,
            confidence_interval: 0.80,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTrends {
    pub growth_rate: f64,
    pub volatility: f64,
    pub seasonality: BTreeMap<u32, f64>,
    pub avg_revenue: f64,
    pub avg_margin: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSeries {
    pub revenue: Vec<f64>,
    pub expenses: Vec<f64>,
    pub ebitda: Vec<f64>,
    pub cash_flow: Vec<f64>,
}

impl ScenarioSeries {
    /// 依營收與費用乘數推導情境，EBITDA 與現金流重新計算
    fn derive(base: &ScenarioSeries, revenue_factor: f64, expense_factor: f64, cash_conversion: f64) -> Self {
        let revenue: Vec<f64> = base.revenue.iter().map(|r| r * revenue_factor).collect();
        let expenses: Vec<f64> = base.expenses.iter().map(|e| e * expense_factor).collect();
        let ebitda: Vec<f64> = revenue.iter().zip(&expenses).map(|(r, e)| r - e).collect();
        let cash_flow = ebitda.iter().map(|e| e * cash_conversion).collect();
        Self {
            revenue,
            expenses,
            ebitda,
            cash_flow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBands {
    pub revenue: Vec<Band>,
    pub ebitda: Vec<Band>,
    pub cash_flow: Vec<Band>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastKeyMetrics {
    pub total_revenue_forecast: f64,
    pub total_ebitda_forecast: f64,
    pub avg_margin_percent: f64,
    pub revenue_cagr_percent: f64,
    pub final_quarter_revenue: f64,
    pub cash_flow_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub company_name: String,
    pub base_date: NaiveDate,
    pub forecast_periods: Vec<String>,
    pub historical_trends: HistoricalTrends,
    pub base_forecast: ScenarioSeries,
    pub scenario_analysis: BTreeMap<String, ScenarioSeries>,
    pub confidence_bands: ConfidenceBands,
    pub key_metrics: ForecastKeyMetrics,
    pub risks_opportunities: Vec<String>,
}

impl Report for ForecastReport {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Forecast
    }

    fn export_stem(&self) -> String {
        format!(
            "financial_forecast_{}",
            slug(&self.company_name)
        )
    }

    fn summary(&self) -> Vec<String> {
        let m = &self.key_metrics;
        let mut lines = vec![
            format!(
                "Forecast for {} ({} quarters)",
                self.company_name,
                self.forecast_periods.len()
            ),
            format!("Total Revenue Forecast: ${:.0}", m.total_revenue_forecast),
            format!("Total EBITDA Forecast: ${:.0}", m.total_ebitda_forecast),
            format!("Average EBITDA Margin: {:.1}%", m.avg_margin_percent),
            format!("Revenue CAGR: {:.1}%", m.revenue_cagr_percent),
        ];
        for name in ["pessimistic", "conservative", "base", "optimistic"] {
            if let Some(series) = self.scenario_analysis.get(name) {
                lines.push(format!(
                    "Scenario {}: ${:.0}",
                    name,
                    series.revenue.iter().sum::<f64>()
                ));
            }
        }
        lines.extend(self.risks_opportunities.iter().cloned());
        lines
    }
}

#[derive(Debug, Clone)]
pub struct ForecastAnalyzer {
    quarters: usize,
    simulations: usize,
}

impl Default for ForecastAnalyzer {
    fn default() -> Self {
        Self {
            quarters: FORECAST_QUARTERS,
            simulations: crate::core::sampler::DEFAULT_SIMULATIONS,
        }
    }
}

impl ForecastAnalyzer {
    pub fn new(simulations: usize) -> Self {
        Self {
            simulations,
            ..Default::default()
        }
    }

    pub fn analyze_historical_trends(&self, history: &[HistoricalData]) -> HistoricalTrends {
        if history.is_empty() {
            return HistoricalTrends::default();
        }

        let revenues: Vec<f64> = history.iter().map(|d| d.revenue).collect();
        let growth_rates: Vec<f64> = revenues
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();
        let avg_revenue = stats::mean(&revenues);

        let mut seasonality = BTreeMap::new();
        if history.len() >= 4 && avg_revenue != 0.0 {
            let mut buckets: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
            for (i, data) in history.iter().enumerate() {
                let quarter = (i % 4) as u32 + 1;
                buckets
                    .entry(quarter)
                    .or_default()
                    .push(data.revenue / avg_revenue);
            }
            for (quarter, ratios) in buckets {
                seasonality.insert(quarter, stats::mean(&ratios));
            }
        }

        let margin_sum: f64 = history
            .iter()
            .filter(|d| d.revenue > 0.0)
            .map(|d| d.ebitda / d.revenue)
            .sum();

        HistoricalTrends {
            growth_rate: stats::mean(&growth_rates),
            volatility: stats::sample_std_dev(&growth_rates),
            seasonality,
            avg_revenue,
            avg_margin: margin_sum / history.len() as f64,
        }
    }

    /// 第 q 季（從 1 起算）的日期：base_date + 90*q 天
    fn quarter_date(base_date: NaiveDate, quarter: usize) -> Result<NaiveDate> {
        base_date
            .checked_add_days(Days::new(DAYS_PER_QUARTER * quarter as u64))
            .ok_or_else(|| AdvisoryError::ProcessingError {
                message: format!("Forecast date overflow from {}", base_date),
            })
    }

    fn calendar_quarter(date: NaiveDate) -> u32 {
        (date.month() - 1) / 3 + 1
    }

    pub fn forecast_periods(&self, base_date: NaiveDate) -> Result<Vec<String>> {
        (1..=self.quarters)
            .map(|q| {
                let date = Self::quarter_date(base_date, q)?;
                Ok(format!("{}-Q{}", date.year(), Self::calendar_quarter(date)))
            })
            .collect()
    }

    pub fn generate_base_forecast(
        &self,
        history: &[HistoricalData],
        assumptions: &ForecastAssumptions,
        base_date: NaiveDate,
    ) -> Result<ScenarioSeries> {
        let last_revenue = history
            .last()
            .map(|d| d.revenue)
            .unwrap_or(DEFAULT_BASELINE_REVENUE);

        let seasons = (1..=self.quarters)
            .map(|q| Self::quarter_date(base_date, q).map(Self::calendar_quarter))
            .collect::<Result<Vec<u32>>>()?;

        let revenue = Projector::new(last_revenue, assumptions.revenue_growth_rate / 4.0)
            .with_seasonality(assumptions.seasonal_factor.clone())
            .with_market_multiplier(assumptions.market_conditions.multiplier())
            .project(self.quarters, |period| seasons[period - 1]);

        let expenses: Vec<f64> = revenue
            .iter()
            .map(|r| r * assumptions.expense_ratio)
            .collect();
        let ebitda: Vec<f64> = revenue.iter().zip(&expenses).map(|(r, e)| r - e).collect();
        let cash_flow = ebitda.iter().map(|e| e * BASE_CASH_CONVERSION).collect();

        Ok(ScenarioSeries {
            revenue,
            expenses,
            ebitda,
            cash_flow,
        })
    }

    /// optimistic / pessimistic / conservative 三種情境
    pub fn generate_scenarios(&self, base: &ScenarioSeries) -> BTreeMap<String, ScenarioSeries> {
        let mut scenarios = BTreeMap::new();
        scenarios.insert(
            "optimistic".to_string(),
            ScenarioSeries::derive(base, 1.15, 0.92, 0.90),
        );
        scenarios.insert(
            "pessimistic".to_string(),
            ScenarioSeries::derive(base, 0.85, 1.05, 0.75),
        );
        scenarios.insert(
            "conservative".to_string(),
            ScenarioSeries::derive(base, 0.95, 1.0, 0.82),
        );
        scenarios
    }

    pub fn confidence_bands<R: Rng + ?Sized>(
        &self,
        base: &ScenarioSeries,
        confidence: f64,
        rng: &mut R,
    ) -> ConfidenceBands {
        let sampler = MonteCarloSampler::new(self.simulations, confidence);
        let [revenue, ebitda, cash_flow] = sampler.bands(base.revenue.len(), rng, |q, rng| {
            let sim_revenue = base.revenue[q] * (1.0 + REVENUE_NOISE.sample(rng));
            let sim_expenses = base.expenses[q] * (1.0 + EXPENSE_NOISE.sample(rng));
            let sim_ebitda = sim_revenue - sim_expenses;
            let sim_cash_flow = sim_ebitda * CASH_CONVERSION_RANGE.sample(rng);
            [sim_revenue, sim_ebitda, sim_cash_flow]
        });

        ConfidenceBands {
            revenue,
            ebitda,
            cash_flow,
        }
    }

    pub fn key_metrics(base: &ScenarioSeries) -> ForecastKeyMetrics {
        let total_revenue: f64 = base.revenue.iter().sum();
        let total_ebitda: f64 = base.ebitda.iter().sum();
        let final_revenue = base.revenue.last().copied().unwrap_or(0.0);
        let initial_revenue = base.revenue.first().copied().unwrap_or(1.0);

        // 八季視為兩年
        let cagr = if initial_revenue > 0.0 {
            ((final_revenue / initial_revenue).powf(0.5) - 1.0) * 100.0
        } else {
            0.0
        };

        ForecastKeyMetrics {
            total_revenue_forecast: total_revenue,
            total_ebitda_forecast: total_ebitda,
            avg_margin_percent: stats::safe_ratio(total_ebitda, total_revenue, 0.0) * 100.0,
            revenue_cagr_percent: cagr,
            final_quarter_revenue: final_revenue,
            cash_flow_total: base.cash_flow.iter().sum(),
        }
    }

    pub fn identify_risks_opportunities(
        base: &ScenarioSeries,
        market: MarketConditions,
    ) -> Vec<String> {
        let mut items = Vec::new();

        let annualized_growth: Vec<f64> = base
            .revenue
            .windows(2)
            .map(|w| (w[1] / w[0] - 1.0) * 4.0)
            .collect();
        let avg_growth = stats::mean(&annualized_growth);

        if avg_growth > 0.20 {
            items.push(
                "OPPORTUNITY: High revenue growth projected - ensure operational scalability"
                    .to_string(),
            );
        } else if avg_growth < 0.05 {
            items.push(
                "RISK: Low revenue growth - consider market expansion strategies".to_string(),
            );
        }

        let margins: Vec<f64> = base
            .revenue
            .iter()
            .zip(&base.ebitda)
            .filter(|(r, _)| **r > 0.0)
            .map(|(r, e)| e / r)
            .collect();
        let avg_margin = stats::mean(&margins);

        if avg_margin < 0.15 {
            items.push("RISK: Low EBITDA margins - focus on cost optimization".to_string());
        } else if avg_margin > 0.30 {
            items.push(
                "OPPORTUNITY: Strong margins - potential for increased investment".to_string(),
            );
        }

        let negative_quarters = base.cash_flow.iter().filter(|cf| **cf < 0.0).count();
        if negative_quarters > 0 {
            items.push(format!(
                "RISK: {} quarters with negative cash flow - monitor liquidity",
                negative_quarters
            ));
        }

        match market {
            MarketConditions::Decline => items.push(
                "RISK: Declining market conditions - develop defensive strategies".to_string(),
            ),
            MarketConditions::Growth => items.push(
                "OPPORTUNITY: Growing market - consider aggressive expansion".to_string(),
            ),
            MarketConditions::Stable => {}
        }

        items
    }

    pub fn generate_forecast<R: Rng + ?Sized>(
        &self,
        company_name: &str,
        history: &[HistoricalData],
        assumptions: &ForecastAssumptions,
        base_date: NaiveDate,
        rng: &mut R,
    ) -> Result<ForecastReport> {
        tracing::info!(
            "📈 Forecasting {} quarters for {} from {}",
            self.quarters,
            company_name,
            base_date
        );
        if history.is_empty() {
            tracing::warn!(
                "No historical data, using baseline revenue ${:.0} and {:.0}% margin",
                DEFAULT_BASELINE_REVENUE,
                DEFAULT_EBITDA_MARGIN * 100.0
            );
        }

        let historical_trends = self.analyze_historical_trends(history);
        let forecast_periods = self.forecast_periods(base_date)?;
        let base_forecast = self.generate_base_forecast(history, assumptions, base_date)?;

        let mut scenario_analysis = self.generate_scenarios(&base_forecast);
        scenario_analysis.insert("base".to_string(), base_forecast.clone());

        let confidence_bands =
            self.confidence_bands(&base_forecast, assumptions.confidence_interval, rng);
        let key_metrics = Self::key_metrics(&base_forecast);
        let risks_opportunities =
            Self::identify_risks_opportunities(&base_forecast, assumptions.market_conditions);

        tracing::debug!(
            "Forecast CAGR {:.2}%, {} risk/opportunity items",
            key_metrics.revenue_cagr_percent,
            risks_opportunities.len()
        );

        Ok(ForecastReport {
            company_name: company_name.to_string(),
            base_date,
            forecast_periods,
            historical_trends,
            base_forecast,
            scenario_analysis,
            confidence_bands,
            key_metrics,
            risks_opportunities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::rng_from_seed;

    fn history() -> Vec<HistoricalData> {
        [
            ("2023-Q1", 950_000.0, 750_000.0, 200_000.0),
            ("2023-Q2", 1_050_000.0, 800_000.0, 250_000.0),
            ("2023-Q3", 1_150_000.0, 850_000.0, 300_000.0),
            ("2023-Q4", 1_300_000.0, 975_000.0, 325_000.0),
        ]
        .into_iter()
        .map(|(period, revenue, expenses, ebitda)| HistoricalData {
            period: period.to_string(),
            revenue,
            expenses,
            ebitda,
            cash_flow: ebitda * 0.85,
        })
        .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_labels_follow_base_date() {
        let analyzer = ForecastAnalyzer::default();
        let periods = analyzer.forecast_periods(date(2024, 1, 1)).unwrap();

        assert_eq!(periods.len(), FORECAST_QUARTERS);
        assert_eq!(periods[0], "2024-Q1");
        assert_eq!(periods[1], "2024-Q2");
        assert_eq!(periods[3], "2024-Q4");
        assert_eq!(periods[4], "2025-Q1");
    }

    #[test]
    fn test_default_baseline_without_history() {
        let analyzer = ForecastAnalyzer::default();
        let assumptions = ForecastAssumptions {
            seasonal_factor: BTreeMap::new(),
            ..Default::default()
        };

        let base = analyzer
            .generate_base_forecast(&[], &assumptions, date(2024, 1, 1))
            .unwrap();
        assert!((base.revenue[0] - DEFAULT_BASELINE_REVENUE * 1.025).abs() < 1e-6);
        assert!((base.expenses[0] - base.revenue[0] * 0.75).abs() < 1e-6);
        assert!((base.cash_flow[0] - base.ebitda[0] * 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_optimistic_scenario_scales_base_revenue() {
        let analyzer = ForecastAnalyzer::default();
        let base = analyzer
            .generate_base_forecast(&history(), &ForecastAssumptions::default(), date(2024, 1, 1))
            .unwrap();
        let scenarios = analyzer.generate_scenarios(&base);

        let optimistic = &scenarios["optimistic"];
        for (o, b) in optimistic.revenue.iter().zip(&base.revenue) {
            assert_eq!(*o, b * 1.15);
        }
        assert_eq!(scenarios["conservative"].expenses, base.expenses);
    }

    #[test]
    fn test_historical_trends() {
        let analyzer = ForecastAnalyzer::default();
        let trends = analyzer.analyze_historical_trends(&history());

        assert!(trends.growth_rate > 0.0);
        assert!(trends.volatility > 0.0);
        assert_eq!(trends.seasonality.len(), 4);
        assert_eq!(trends.avg_revenue, 1_112_500.0);

        let empty = analyzer.analyze_historical_trends(&[]);
        assert_eq!(empty.growth_rate, 0.0);
        assert!(empty.seasonality.is_empty());
    }

    #[test]
    fn test_seeded_forecast_is_reproducible() {
        let analyzer = ForecastAnalyzer::default();
        let run = || {
            let mut rng = rng_from_seed(Some(2024));
            analyzer
                .generate_forecast(
                    "TechCorp Inc",
                    &history(),
                    &ForecastAssumptions::default(),
                    date(2024, 1, 1),
                    &mut rng,
                )
                .unwrap()
        };

        let first = run();
        assert_eq!(first, run());
        assert_eq!(first.confidence_bands.revenue.len(), FORECAST_QUARTERS);
        for band in &first.confidence_bands.revenue {
            assert!(band.lower <= band.upper);
        }
        assert_eq!(first.scenario_analysis.len(), 4);
    }

    #[test]
    fn test_risks_for_declining_market_with_thin_margins() {
        let base = ScenarioSeries {
            revenue: vec![100.0, 100.0, 100.0],
            expenses: vec![95.0, 95.0, 105.0],
            ebitda: vec![5.0, 5.0, -5.0],
            cash_flow: vec![4.0, 4.0, -4.0],
        };

        let items = ForecastAnalyzer::identify_risks_opportunities(&base, MarketConditions::Decline);
        assert_eq!(
            items,
            vec![
                "RISK: Low revenue growth - consider market expansion strategies".to_string(),
                "RISK: Low EBITDA margins - focus on cost optimization".to_string(),
                "RISK: 1 quarters with negative cash flow - monitor liquidity".to_string(),
                "RISK: Declining market conditions - develop defensive strategies".to_string(),
            ]
        );
    }

    #[test]
    fn test_cagr_over_two_years() {
        let base = ScenarioSeries {
            revenue: vec![100.0, 0.0, 121.0],
            ..Default::default()
        };
        let metrics = ForecastAnalyzer::key_metrics(&base);
        assert!((metrics.revenue_cagr_percent - 10.0).abs() < 1e-9);
    }
}

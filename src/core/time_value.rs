use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 以固定每期利率折現
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discounter {
    pub periodic_rate: f64,
}

impl Discounter {
    pub fn new(periodic_rate: f64) -> Self {
        Self { periodic_rate }
    }

    /// 年利率轉為月利率（r / 12）
    pub fn monthly_from_annual(annual_rate: f64) -> Self {
        Self::new(annual_rate / 12.0)
    }

    /// `pv = fv / (1 + r)^n`，n <= 0 時直接回傳 fv
    pub fn present_value(&self, future_value: f64, periods: i64) -> f64 {
        if periods <= 0 {
            return future_value;
        }
        future_value / (1.0 + self.periodic_rate).powf(periods as f64)
    }

    /// 期間 [start, end) 每期固定金額的現值總和
    pub fn annuity_present_value(&self, amount: f64, start: i64, end: i64) -> f64 {
        (start..end)
            .map(|period| self.present_value(amount, period))
            .sum()
    }
}

/// 一次性或週期性的現金項目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashItem {
    pub amount: f64,
    pub start_period: i64,
    pub recurring: bool,
}

impl CashItem {
    pub fn present_value(&self, discounter: &Discounter, horizon: i64) -> f64 {
        if self.recurring {
            discounter.annuity_present_value(self.amount, self.start_period, horizon)
        } else {
            discounter.present_value(self.amount, self.start_period)
        }
    }

    /// 將金額累加到現金流陣列（`sign` 為 1.0 或 -1.0）
    pub fn apply_to_cash_flow(&self, cash_flow: &mut [f64], sign: f64) {
        if self.start_period < 0 {
            return;
        }
        let start = self.start_period as usize;
        if start >= cash_flow.len() {
            return;
        }
        if self.recurring {
            for slot in &mut cash_flow[start..] {
                *slot += sign * self.amount;
            }
        } else {
            cash_flow[start] += sign * self.amount;
        }
    }
}

/// 每期成長、季節性與市場乘數的投影
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    pub principal: f64,
    pub growth_per_period: f64,
    /// 以期內序號（例如季 1-4）查詢的季節乘數，缺少時為 1.0
    pub seasonal: BTreeMap<u32, f64>,
    pub market_multiplier: f64,
}

impl Projector {
    pub fn new(principal: f64, growth_per_period: f64) -> Self {
        Self {
            principal,
            growth_per_period,
            seasonal: BTreeMap::new(),
            market_multiplier: 1.0,
        }
    }

    pub fn with_seasonality(mut self, seasonal: BTreeMap<u32, f64>) -> Self {
        self.seasonal = seasonal;
        self
    }

    pub fn with_market_multiplier(mut self, multiplier: f64) -> Self {
        self.market_multiplier = multiplier;
        self
    }

    /// `season_of(i)` 回傳第 i 期（從 1 起算）的季節序號
    pub fn project<F>(&self, periods: usize, season_of: F) -> Vec<f64>
    where
        F: Fn(usize) -> u32,
    {
        let mut current = self.principal;
        let mut series = Vec::with_capacity(periods);

        for period in 1..=periods {
            current *= 1.0 + self.growth_per_period;
            let seasonal = self
                .seasonal
                .get(&season_of(period))
                .copied()
                .unwrap_or(1.0);
            series.push(current * seasonal * self.market_multiplier);
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_value_monthly_ten_percent() {
        let discounter = Discounter::monthly_from_annual(0.10);
        let pv = discounter.present_value(1000.0, 12);
        assert!((pv - 905.1).abs() < 0.5, "pv = {}", pv);
        assert_eq!(pv, 1000.0 / (1.0 + 0.10 / 12.0f64).powf(12.0));
    }

    #[test]
    fn test_present_value_non_positive_periods() {
        let discounter = Discounter::new(0.05);
        assert_eq!(discounter.present_value(250.0, 0), 250.0);
        assert_eq!(discounter.present_value(250.0, -3), 250.0);
    }

    #[test]
    fn test_projected_series_discounts_per_period() {
        let discounter = Discounter::new(0.10);
        let series = Projector::new(100.0, 0.10).project(2, |_| 1);
        let discounted: Vec<f64> = series
            .iter()
            .enumerate()
            .map(|(i, value)| discounter.present_value(*value, i as i64 + 1))
            .collect();

        for value in discounted {
            assert!((value - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_annuity_sums_each_period() {
        let discounter = Discounter::new(0.01);
        let expected: f64 = (3..6).map(|n| 100.0 / 1.01f64.powf(n as f64)).sum();
        assert_eq!(discounter.annuity_present_value(100.0, 3, 6), expected);
        assert_eq!(discounter.annuity_present_value(100.0, 6, 6), 0.0);
    }

    #[test]
    fn test_cash_item_applies_recurring_flow() {
        let mut flow = vec![0.0; 6];
        CashItem {
            amount: 10.0,
            start_period: 3,
            recurring: true,
        }
        .apply_to_cash_flow(&mut flow, -1.0);
        CashItem {
            amount: 50.0,
            start_period: 0,
            recurring: false,
        }
        .apply_to_cash_flow(&mut flow, -1.0);

        assert_eq!(flow, vec![-50.0, 0.0, 0.0, -10.0, -10.0, -10.0]);
    }

    #[test]
    fn test_projector_growth_and_seasonality() {
        let seasonal: BTreeMap<u32, f64> = [(1, 0.5), (2, 2.0)].into_iter().collect();
        let series = Projector::new(100.0, 0.1)
            .with_seasonality(seasonal)
            .project(3, |period| ((period - 1) % 2 + 1) as u32);

        assert!((series[0] - 55.0).abs() < 1e-9);
        assert!((series[1] - 242.0).abs() < 1e-9);
        assert!((series[2] - 66.55).abs() < 1e-9);
    }
}

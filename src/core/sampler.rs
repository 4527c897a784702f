use crate::core::stats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIMULATIONS: usize = 100;

/// 均勻分布擾動範圍 [low, high)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub low: f64,
    pub high: f64,
}

impl Perturbation {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.high > self.low {
            rng.gen_range(self.low..self.high)
        } else {
            self.low
        }
    }
}

/// 信賴區間上下界
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

/// 有種子時可重現，否則使用系統熵
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloSampler {
    pub simulations: usize,
    pub confidence: f64,
}

impl Default for MonteCarloSampler {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            confidence: 0.80,
        }
    }
}

impl MonteCarloSampler {
    pub fn new(simulations: usize, confidence: f64) -> Self {
        Self {
            simulations,
            confidence,
        }
    }

    /// (1 - c) / 2 與 1 - (1 - c) / 2
    pub fn percentiles(&self) -> (f64, f64) {
        let lower = (1.0 - self.confidence) / 2.0;
        (lower, 1.0 - lower)
    }

    /// 對每一期執行 `simulations` 次 `simulate`，每次回傳 K 個指標值，
    /// 結果為 `[指標][期] -> Band`
    pub fn bands<R, F, const K: usize>(
        &self,
        periods: usize,
        rng: &mut R,
        mut simulate: F,
    ) -> [Vec<Band>; K]
    where
        R: Rng + ?Sized,
        F: FnMut(usize, &mut R) -> [f64; K],
    {
        let (lower_p, upper_p) = self.percentiles();
        let mut out: [Vec<Band>; K] = std::array::from_fn(|_| Vec::with_capacity(periods));

        for period in 0..periods {
            let mut samples: [Vec<f64>; K] =
                std::array::from_fn(|_| Vec::with_capacity(self.simulations));

            for _ in 0..self.simulations {
                let values = simulate(period, rng);
                for (metric, value) in values.into_iter().enumerate() {
                    samples[metric].push(value);
                }
            }

            for (metric, values) in samples.iter_mut().enumerate() {
                values.sort_by(|a, b| a.total_cmp(b));
                let lower = stats::percentile_of_sorted(values, lower_p).unwrap_or(0.0);
                let upper = stats::percentile_of_sorted(values, upper_p).unwrap_or(0.0);
                out[metric].push(Band { lower, upper });
            }
        }

        tracing::debug!(
            "Monte Carlo: {} periods x {} simulations at {:.0}% confidence",
            periods,
            self.simulations,
            self.confidence * 100.0
        );

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sampler_is_reproducible() {
        let sampler = MonteCarloSampler::default();
        let noise = Perturbation::new(-0.05, 0.05);

        let run = |seed| {
            let mut rng = rng_from_seed(Some(seed));
            sampler.bands(4, &mut rng, |_, rng| [100.0 * (1.0 + noise.sample(rng))])
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_bands_are_ordered_and_within_range() {
        let sampler = MonteCarloSampler::new(200, 0.8);
        let mut rng = rng_from_seed(Some(7));
        let noise = Perturbation::new(-0.05, 0.05);

        let [revenue, margin] = sampler.bands(3, &mut rng, |_, rng| {
            [1000.0 * (1.0 + noise.sample(rng)), noise.sample(rng)]
        });

        assert_eq!(revenue.len(), 3);
        for band in revenue.iter() {
            assert!(band.lower <= band.upper);
            assert!(band.lower >= 950.0 && band.upper < 1050.0);
        }
        for band in margin.iter() {
            assert!(band.lower >= -0.05 && band.upper < 0.05);
        }
    }

    #[test]
    fn test_degenerate_perturbation_returns_low() {
        let mut rng = rng_from_seed(Some(1));
        assert_eq!(Perturbation::new(0.9, 0.9).sample(&mut rng), 0.9);
    }
}

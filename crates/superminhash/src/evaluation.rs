//! Accuracy simulation for signatures.
//!
//! Each sample builds two signatures over `set_size` random items, of which
//! the first `modified` differ between the two collections, and records the
//! error of the similarity estimate against the true Jaccard similarity.

use std::time::Instant;

use itertools::Itertools;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use rayon::prelude::{IntoParallelIterator, ParallelIterator};
use thiserror::Error;
use tracing::info;

use crate::{Signature, SignatureError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("simulation requires at least one sample")]
    NoSamples,

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Signature length.
    pub length: usize,
    /// Number of items in each of the two collections.
    pub set_size: usize,
    /// Number of items that only occur in one of the two collections.
    pub modified: usize,
}

impl SimulationConfig {
    /// `|A ∩ B| / |A ∪ B|` for the simulated collections.
    pub fn expected_similarity(&self) -> f64 {
        let modified = self.modified.min(self.set_size);
        let union = self.set_size + modified;
        if union == 0 {
            return 1.0;
        }
        (self.set_size - modified) as f64 / union as f64
    }
}

/// SimulationResult holds all relevant statistical information we care about.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    pub config: SimulationConfig,
    pub expected: f64,
    /// Estimate minus expected similarity, one observation per sample.
    pub error: Stats,
}

impl SimulationResult {
    pub fn bias(&self) -> f64 {
        self.error.mean
    }

    pub fn stddev(&self) -> f64 {
        self.error.std
    }
}

/// Runs `samples` independent trials in parallel.
///
/// Sample `i` draws its items from a generator seeded with `seed + i`, so a
/// simulation is reproducible.
pub fn simulate(
    config: &SimulationConfig,
    samples: usize,
    seed: u64,
) -> Result<SimulationResult, SimulationError> {
    let expected = config.expected_similarity();
    let errors = (0..samples as u64)
        .into_par_iter()
        .map(|sample| -> Result<f64, SignatureError> {
            let mut rnd = StdRng::seed_from_u64(seed.wrapping_add(sample));
            let mut a = Signature::new(config.length)?;
            let mut b = Signature::new(config.length)?;
            for i in 0..config.set_size {
                let item = rnd.next_u64();
                a.push_hash(item);
                if i < config.modified {
                    b.push_hash(rnd.next_u64());
                } else {
                    b.push_hash(item);
                }
            }
            Ok(a.similarity(&b)? - expected)
        })
        .collect::<Result<Vec<_>, SignatureError>>()?;
    Ok(SimulationResult {
        config: *config,
        expected,
        error: Stats::from_values(errors).ok_or(SimulationError::NoSamples)?,
    })
}

pub fn run_simulations(
    configs: &[SimulationConfig],
    samples: usize,
    seed: u64,
) -> Result<Vec<SimulationResult>, SimulationError> {
    info!(configs = configs.len(), samples, "running simulations");
    configs
        .iter()
        .map(|config| {
            let t = Instant::now();
            let result = simulate(config, samples, seed)?;
            info!(
                length = config.length,
                set_size = config.set_size,
                modified = config.modified,
                bias = result.bias(),
                stddev = result.stddev(),
                elapsed_secs = t.elapsed().as_secs_f32(),
                "simulation done"
            );
            Ok(result)
        })
        .collect()
}

pub fn write_simulation_results<F: std::io::Write>(
    results: &[SimulationResult],
    mut f: F,
) -> std::io::Result<()> {
    writeln!(
        f,
        "length;set_size;modified;expected;error.n;error.mean;error.var;error.std;error.median;error.min;error.max"
    )?;
    for result in results {
        let SimulationConfig {
            length,
            set_size,
            modified,
        } = result.config;
        let stats = &result.error;
        writeln!(
            f,
            "{length};{set_size};{modified};{};{};{};{};{};{};{};{}",
            result.expected,
            stats.n,
            stats.mean,
            stats.var,
            stats.std,
            stats.median,
            stats.min,
            stats.max
        )?;
    }
    Ok(())
}

/// Signature lengths growing geometrically by `factor`, starting at 8.
///
/// Panics unless `factor > 1`, since the series would never pass `max`.
pub fn geo_lengths(factor: f64, max: usize) -> Vec<usize> {
    assert!(factor > 1.0, "geo_lengths requires a growing series, got factor {factor}");
    (0..)
        .map(|i| (8f64 * factor.powi(i)) as usize)
        .dedup()
        .take_while(|n| *n <= max)
        .collect_vec()
}

#[derive(Clone, Debug)]
pub struct Stats {
    pub n: usize,
    pub mean: f64,
    pub var: f64,
    pub std: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    /// Summarizes the observations, or returns `None` if there are none.
    pub fn from_values(values: Vec<f64>) -> Option<Self> {
        let sorted = values.into_iter().sorted_by(f64::total_cmp).collect_vec();
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let var = sorted.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        Some(Self {
            n,
            mean,
            var,
            std: var.sqrt(),
            median: sorted[n / 2],
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats() {
        let stats = Stats::from_values(vec![3.0, 1.0, 2.0, 6.0]).unwrap();
        assert_eq!(stats.n, 4);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.var, 3.5);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 6.0);
        assert!(Stats::from_values(vec![]).is_none());
    }

    #[test]
    fn test_expected_similarity() {
        let config = |set_size, modified| SimulationConfig {
            length: 8,
            set_size,
            modified,
        };
        assert_eq!(config(1000, 200).expected_similarity(), 800.0 / 1200.0);
        assert_eq!(config(10, 0).expected_similarity(), 1.0);
        assert_eq!(config(10, 10).expected_similarity(), 0.0);
        assert_eq!(config(0, 0).expected_similarity(), 1.0);
    }

    #[test]
    fn test_geo_lengths() {
        assert_eq!(geo_lengths(2.0, 100), vec![8, 16, 32, 64]);
        assert_eq!(geo_lengths(1.1, 10), vec![8, 9, 10]);
    }

    #[test]
    #[should_panic(expected = "growing series")]
    fn test_geo_lengths_rejects_constant_factor() {
        geo_lengths(1.0, 100);
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let config = SimulationConfig {
            length: 32,
            set_size: 100,
            modified: 10,
        };
        let a = simulate(&config, 8, 7).unwrap();
        let b = simulate(&config, 8, 7).unwrap();
        assert_eq!(a.error.mean, b.error.mean);
        assert_eq!(a.error.max, b.error.max);
    }

    #[test]
    fn test_simulation_rejects_invalid_length() {
        let config = SimulationConfig {
            length: 0,
            set_size: 10,
            modified: 1,
        };
        assert!(matches!(
            simulate(&config, 4, 0),
            Err(SimulationError::Signature(SignatureError::InvalidLength {
                length: 0,
                ..
            }))
        ));
    }

    #[test]
    fn test_simulation_requires_samples() {
        let config = SimulationConfig {
            length: 16,
            set_size: 10,
            modified: 1,
        };
        assert_eq!(simulate(&config, 0, 0).unwrap_err(), SimulationError::NoSamples);
        assert_eq!(
            run_simulations(&[config], 0, 0).unwrap_err(),
            SimulationError::NoSamples
        );
    }

    #[test]
    fn test_error_shrinks_with_length() {
        let configs = [64, 256, 1024].map(|length| SimulationConfig {
            length,
            set_size: 500,
            modified: 100,
        });
        let results = run_simulations(&configs, 32, 42).unwrap();
        for result in &results {
            // Standard deviations are ~0.06, ~0.03 and ~0.015.
            assert!(result.bias().abs() < 0.05, "{result:?}");
        }
        assert!(results[0].stddev() > results[2].stddev(), "{results:?}");
        assert!(results[2].stddev() < 0.04, "{results:?}");

        let mut csv = Vec::new();
        write_simulation_results(&results, &mut csv).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.lines().nth(1).unwrap().starts_with("64;500;100;"));
    }
}

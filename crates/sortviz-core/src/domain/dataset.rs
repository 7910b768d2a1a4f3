//! Test dataset generation.
//!
//! Benchmarks and teaching runs need input data of a given size and shape.
//! The [`DatasetGenerator`] trait is the seam the client depends on;
//! [`RandomDatasetGenerator`] is the default implementation.
//!
//! # Shapes
//!
//! | Distribution | How values are produced                                        |
//! |--------------|----------------------------------------------------------------|
//! | `Random`     | Uniform in `[min, max)`                                        |
//! | `Sorted`     | Linear ramp from `min`, about 10 % of positions nudged by ±1 step |
//! | `Reverse`    | The `Sorted` ramp, reversed                                    |
//! | `Duplicate`  | Drawn from a pool of `max(3, 30 % of size)` distinct values    |
//! | `Normal`     | Box–Muller, mean at mid-range, σ = range / 6, clamped          |
//!
//! `Integer` datasets round every value; `Double` datasets keep two decimals.
//! `Person` datasets ignore the distribution and produce records whose scores
//! are unique while fewer than 100 have been handed out.

use std::collections::HashSet;
use std::f64::consts::PI;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::protocol::messages::{DataType, DataValue, Distribution, Person};

const FIRST_NAMES: [&str; 10] = [
    "Ada", "Alan", "Grace", "Linus", "Barbara", "Ken", "Edsger", "Donald", "Frances", "Niklaus",
];
const LAST_NAMES: [&str; 10] = [
    "Lovelace", "Turing", "Hopper", "Torvalds", "Liskov", "Thompson", "Dijkstra", "Knuth", "Allen",
    "Wirth",
];
const EMAIL_DOMAINS: [&str; 5] = ["gmail.com", "yahoo.com", "hotmail.com", "outlook.com", "example.org"];

/// Parameters describing a dataset to generate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetParams {
    pub size: usize,
    pub value_type: DataType,
    pub distribution: Distribution,
    pub min: f64,
    pub max: f64,
}

impl Default for DatasetParams {
    /// 100 random integers in `[1, 1000)`.
    fn default() -> Self {
        Self {
            size: 100,
            value_type: DataType::Integer,
            distribution: Distribution::Random,
            min: 1.0,
            max: 1000.0,
        }
    }
}

impl DatasetParams {
    /// Checks that the parameters describe a non-empty dataset over a
    /// non-empty range that reaches above zero.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the parameters are rejected.
    pub fn validate(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("dataset size must be at least 1".to_string());
        }
        if self.value_type != DataType::Person && self.min >= self.max {
            return Err(format!(
                "minimum value ({}) must be less than maximum value ({})",
                self.min, self.max
            ));
        }
        // Values are never negative, so a range entirely below zero is empty.
        if self.value_type != DataType::Person && self.max <= 0.0 {
            return Err(format!("maximum value ({}) must be greater than 0", self.max));
        }
        Ok(())
    }
}

/// Produces datasets from [`DatasetParams`].
///
/// Implementations must be `Send + Sync` so a single generator can be shared
/// by the client and its tests through an `Arc<dyn DatasetGenerator>`.
pub trait DatasetGenerator: Send + Sync {
    fn generate(&self, params: &DatasetParams) -> Vec<DataValue>;
}

/// Default [`DatasetGenerator`] backed by a [`StdRng`].
pub struct RandomDatasetGenerator {
    rng: Mutex<StdRng>,
}

impl RandomDatasetGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a generator that produces the same datasets on every run.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomDatasetGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetGenerator for RandomDatasetGenerator {
    fn generate(&self, params: &DatasetParams) -> Vec<DataValue> {
        if params.size == 0 {
            return Vec::new();
        }

        // A poisoned lock only means another thread panicked mid-draw; the
        // RNG state itself is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let rng = &mut *rng;

        if params.value_type == DataType::Person {
            return person_records(rng, params.size);
        }

        let (min, max) = normalized_range(params.min, params.max);
        if (min, max) != (params.min, params.max) {
            debug!(
                requested_min = params.min,
                requested_max = params.max,
                min,
                max,
                "dataset range adjusted"
            );
        }
        let raw = match params.distribution {
            Distribution::Random | Distribution::Custom => uniform(rng, params.size, min, max),
            Distribution::Sorted => nearly_sorted(rng, params.size, min, max),
            Distribution::Reverse => {
                let mut values = nearly_sorted(rng, params.size, min, max);
                values.reverse();
                values
            }
            Distribution::Duplicate => duplicates(rng, params.size, min, max),
            Distribution::Normal => normal(rng, params.size, min, max),
        };

        raw.into_iter()
            .map(|v| match params.value_type {
                DataType::Integer => DataValue::Int(v.round() as i64),
                _ => DataValue::Float((v * 100.0).round() / 100.0),
            })
            .collect()
    }
}

// ── Shapes ────────────────────────────────────────────────────────────────────

/// Negative minimums are raised to zero and an inverted range is swapped.
fn normalized_range(min: f64, max: f64) -> (f64, f64) {
    let min = min.max(0.0);
    if max < min {
        (max.max(0.0), min)
    } else {
        (min, max)
    }
}

fn draw(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

fn uniform(rng: &mut StdRng, size: usize, min: f64, max: f64) -> Vec<f64> {
    (0..size).map(|_| draw(rng, min, max)).collect()
}

fn nearly_sorted(rng: &mut StdRng, size: usize, min: f64, max: f64) -> Vec<f64> {
    let step = (max - min) / size as f64;
    let mut values: Vec<f64> = (0..size).map(|i| min + i as f64 * step).collect();

    let perturbations = (size as f64 * 0.1).ceil() as usize;
    for _ in 0..perturbations {
        let index = rng.gen_range(0..size);
        let nudge = (rng.gen::<f64>() - 0.5) * step * 2.0;
        values[index] = (values[index] + nudge).clamp(min, max);
    }
    values
}

fn duplicates(rng: &mut StdRng, size: usize, min: f64, max: f64) -> Vec<f64> {
    let distinct = (size * 3 / 10).max(3);
    let pool: Vec<f64> = (0..distinct).map(|_| draw(rng, min, max)).collect();
    (0..size).map(|_| pool[rng.gen_range(0..pool.len())]).collect()
}

fn normal(rng: &mut StdRng, size: usize, min: f64, max: f64) -> Vec<f64> {
    let mean = (min + max) / 2.0;
    let std_dev = (max - min) / 6.0;
    (0..size)
        .map(|_| {
            // `1.0 - gen()` lies in (0, 1], so the logarithm is finite.
            let u = 1.0 - rng.gen::<f64>();
            let v = rng.gen::<f64>();
            let z = (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos();
            (mean + z * std_dev).clamp(min, max)
        })
        .collect()
}

fn person_records(rng: &mut StdRng, size: usize) -> Vec<DataValue> {
    let mut used_scores = HashSet::new();
    (0..size)
        .map(|i| {
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            let domain = EMAIL_DOMAINS[rng.gen_range(0..EMAIL_DOMAINS.len())];

            let mut score = rng.gen_range(0..100u32);
            while used_scores.contains(&score) && used_scores.len() < 100 {
                score = rng.gen_range(0..100u32);
            }
            used_scores.insert(score);

            DataValue::Record(Person {
                id: i as u32 + 1,
                name: format!("{first} {last}"),
                age: rng.gen_range(18..68),
                score: f64::from(score),
                email: format!("{}.{}@{domain}", first.to_lowercase(), last.to_lowercase()),
            })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Synthetic solve-time sequences covering the hash-rate regimes the engine
//! has to survive.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::SimError;

/// Smallest solve time a generator emits.
pub const MIN_SAMPLE_SECS: f64 = 1.0;

/// A named hash-rate regime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    NormalOperation,
    HashRateSpike,
    HashRateDrop,
    BlockStealing,
    Oscillating,
    GradualChange,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::NormalOperation,
        Scenario::HashRateSpike,
        Scenario::HashRateDrop,
        Scenario::BlockStealing,
        Scenario::Oscillating,
        Scenario::GradualChange,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::NormalOperation => "normal_operation",
            Self::HashRateSpike => "hash_rate_spike",
            Self::HashRateDrop => "hash_rate_drop",
            Self::BlockStealing => "block_stealing",
            Self::Oscillating => "oscillating",
            Self::GradualChange => "gradual_change",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NormalOperation => "Steady hash rate operation",
            Self::HashRateSpike => "10x hash rate increase",
            Self::HashRateDrop => "10x hash rate decrease",
            Self::BlockStealing => "Block stealing attempt",
            Self::Oscillating => "Oscillating hash rate",
            Self::GradualChange => "Gradual hash rate change",
        }
    }

    pub fn expected_behavior(&self) -> &'static str {
        match self {
            Self::NormalOperation => "Stable difficulty adjustment",
            Self::HashRateSpike => "Emergency response, rapid difficulty increase",
            Self::HashRateDrop => "Emergency response, rapid difficulty decrease",
            Self::BlockStealing => "Bounded increase through the normal path",
            Self::Oscillating => "Smoothing, reduced oscillations",
            Self::GradualChange => "Smooth adaptation, no emergency mode",
        }
    }

    /// Solve times for blocks 1..=n, every one at least [`MIN_SAMPLE_SECS`].
    pub fn generate<R: Rng>(&self, target_time: f64, rng: &mut R) -> Vec<f64> {
        let t = target_time;
        let mut samples = Vec::with_capacity(200);
        match self {
            Self::NormalOperation => {
                extend_normal(&mut samples, rng, t, 0.1 * t, 200);
            }
            Self::HashRateSpike => {
                extend_normal(&mut samples, rng, t, 0.1 * t, 50);
                extend_normal(&mut samples, rng, t / 10.0, t / 100.0, 50);
                extend_normal(&mut samples, rng, t, 0.1 * t, 100);
            }
            Self::HashRateDrop => {
                extend_normal(&mut samples, rng, t, 0.1 * t, 50);
                extend_normal(&mut samples, rng, 10.0 * t, t, 50);
                extend_normal(&mut samples, rng, t, 0.1 * t, 100);
            }
            Self::BlockStealing => {
                extend_normal(&mut samples, rng, t, 0.1 * t, 50);
                samples.extend(std::iter::repeat(t / 20.0).take(5));
                extend_normal(&mut samples, rng, t, 0.1 * t, 100);
            }
            Self::Oscillating => {
                samples.extend((0..200).map(|i| if i % 2 == 0 { t / 2.0 } else { 1.5 * t }));
            }
            Self::GradualChange => {
                samples.extend(ramp(t, t / 3.0, 100));
                samples.extend(ramp(t / 3.0, t, 100));
            }
        }
        for s in &mut samples {
            *s = s.max(MIN_SAMPLE_SECS);
        }
        samples
    }
}

/// `n` evenly spaced values from `start` to `end`, both included.
fn ramp(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| start + step * i as f64)
}

fn extend_normal<R: Rng>(out: &mut Vec<f64>, rng: &mut R, mean: f64, std_dev: f64, n: usize) {
    out.extend((0..n).map(|_| {
        let z: f64 = rng.sample(StandardNormal);
        mean + std_dev * z
    }));
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|sc| sc.name() == wanted)
            .ok_or_else(|| SimError::UnknownScenario(s.to_string()))
    }
}

//! RNG oracle for combat rolls.
//!
//! Every chance roll in the engine goes through [`RngOracle::chance`], which
//! implements the single "success if draw < chance" rule. Percent-scaled
//! chances are normalized to probabilities before rolling.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws.
///
/// Implementations are shared across the worker pool, so draws take `&self`.
pub trait RngOracle: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn random_f64(&self) -> f64;

    /// Uniform integer in `[min, max]` inclusive. Returns `min` when `max <= min`.
    fn random_range(&self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = f64::from(max - min + 1);
        let offset = (self.random_f64() * span) as i32;
        (min + offset).min(max)
    }

    /// Rolls a probability in `[0, 1]`.
    fn chance(&self, probability: f64) -> bool {
        self.random_f64() < probability
    }

    /// Rolls a percentage in `[0, 100]`.
    fn chance_percent(&self, percent: f64) -> bool {
        self.chance(percent / 100.0)
    }
}

/// Seedable standard RNG guarded by a mutex.
#[derive(Debug)]
pub struct StdRngOracle {
    rng: Mutex<StdRng>,
}

impl StdRngOracle {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl RngOracle for StdRngOracle {
    fn random_f64(&self) -> f64 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.r#gen::<f64>()
    }

    fn random_range(&self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.gen_range(min..=max)
    }
}

/// Replays scripted draws, then a fallback value once the script runs out.
///
/// Used by tests that need a specific roll to succeed or fail.
#[derive(Debug)]
pub struct SequenceRng {
    draws: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl SequenceRng {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: Mutex::new(draws.into_iter().collect()),
            fallback: 0.5,
        }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            draws: Mutex::new(VecDeque::new()),
            fallback: value,
        }
    }

    pub fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = value;
        self
    }

    pub fn remaining(&self) -> usize {
        self.draws
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl RngOracle for SequenceRng {
    fn random_f64(&self) -> f64 {
        self.draws
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

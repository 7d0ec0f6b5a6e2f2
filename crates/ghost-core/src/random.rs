//! Injectable randomness for target placement and clue sampling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of the two kinds of draws the engine needs.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform draw in `[0, bound)`. A zero bound yields 0.
    fn next_index(&mut self, bound: usize) -> usize;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}

/// Seedable source used by sessions and bots unless a test injects another.
pub type StdSource = RngSource<StdRng>;

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }
}

/// Replays fixed draws so tests can assert exact targets and colours.
///
/// Unit draws are clamped into `[0, 1)` and index draws are reduced modulo the
/// requested bound. An exhausted script yields 0 for either kind.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    units: VecDeque<f64>,
    indices: VecDeque<usize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units<I: IntoIterator<Item = f64>>(mut self, units: I) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_indices<I: IntoIterator<Item = usize>>(mut self, indices: I) -> Self {
        self.indices.extend(indices);
        self
    }

    pub fn push_unit(&mut self, unit: f64) {
        self.units.push_back(unit);
    }

    pub fn push_index(&mut self, index: usize) {
        self.indices.push_back(index);
    }

    pub fn remaining_units(&self) -> usize {
        self.units.len()
    }

    pub fn remaining_indices(&self) -> usize {
        self.indices.len()
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        match self.units.pop_front() {
            Some(unit) if unit.is_finite() => unit.clamp(0.0, 1.0 - f64::EPSILON),
            _ => 0.0,
        }
    }

    fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.indices.pop_front().unwrap_or(0) % bound
    }
}

//! Bayes-rule updates over a flat, row-major probability vector.

use crate::model::cell::Cell;
use crate::model::color::ClueColor;
use crate::model::distance::manhattan_distance;
use crate::model::grid::Grid;
use crate::sensor::Likelihood;
use tracing::{Level, event};

/// Maximum deviation of the total mass from 1.0 after any update.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// How an observation was folded into the belief.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Posterior was renormalized by the evidence total.
    Normalized,
    /// Evidence carried no mass anywhere; the belief restarted uniform.
    ResetToUniform,
}

/// Probability that the target occupies each grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefState {
    grid: Grid,
    probs: Vec<f64>,
}

impl BeliefState {
    /// Every cell receives `1 / N`.
    pub fn uniform(grid: Grid) -> Self {
        let count = grid.cell_count();
        Self {
            grid,
            probs: vec![1.0 / count as f64; count],
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Probability mass at `cell`; cells outside the grid hold none.
    pub fn probability(&self, cell: Cell) -> f64 {
        self.grid
            .index_of(cell)
            .map(|index| self.probs[index])
            .unwrap_or(0.0)
    }

    /// Row-major probabilities, one per cell.
    pub fn probabilities(&self) -> &[f64] {
        &self.probs
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, f64)> + '_ {
        self.grid.cells().zip(self.probs.iter().copied())
    }

    pub fn total_mass(&self) -> f64 {
        self.probs.iter().sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.total_mass() - 1.0).abs() <= NORMALIZATION_TOLERANCE
            && self.probs.iter().all(|p| *p >= 0.0)
    }

    /// Folds the observation `color` seen at `probe` into a new belief.
    pub fn incorporate<L: Likelihood + ?Sized>(
        &self,
        probe: Cell,
        color: ClueColor,
        model: &L,
    ) -> Self {
        self.incorporate_with_outcome(probe, color, model).0
    }

    /// Like [`BeliefState::incorporate`], also reporting whether the evidence
    /// was degenerate.
    pub fn incorporate_with_outcome<L: Likelihood + ?Sized>(
        &self,
        probe: Cell,
        color: ClueColor,
        model: &L,
    ) -> (Self, UpdateOutcome) {
        let mut posterior = Vec::with_capacity(self.probs.len());
        let mut total = 0.0;
        for (cell, prior) in self.iter() {
            let likelihood = model.likelihood(color, manhattan_distance(cell, probe));
            let mass = prior * likelihood;
            total += mass;
            posterior.push(mass);
        }

        if !(total.is_finite() && total > 0.0) {
            event!(
                target: "ghost_core::belief",
                Level::DEBUG,
                probe = %probe,
                color = %color,
                total,
                "observation carried no likelihood mass; resetting to uniform"
            );
            return (Self::uniform(self.grid), UpdateOutcome::ResetToUniform);
        }

        for mass in &mut posterior {
            *mass /= total;
        }

        let next = Self {
            grid: self.grid,
            probs: posterior,
        };
        event!(
            target: "ghost_core::belief",
            Level::TRACE,
            probe = %probe,
            color = %color,
            evidence = total,
            "belief updated"
        );
        (next, UpdateOutcome::Normalized)
    }

    /// Cell holding the largest probability; ties go to the lowest linear index.
    pub fn most_likely_cell(&self) -> Cell {
        let mut best_index = 0;
        let mut best = f64::NEG_INFINITY;
        for (index, prob) in self.probs.iter().enumerate() {
            if *prob > best {
                best = *prob;
                best_index = index;
            }
        }
        self.grid.cell_at(best_index).unwrap_or_default()
    }

    /// All cells by descending probability, lowest index first among equals.
    pub fn ranked_cells(&self) -> Vec<(Cell, f64)> {
        let mut ranked: Vec<(Cell, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

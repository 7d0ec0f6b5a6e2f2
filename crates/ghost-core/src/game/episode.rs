//! Stateless episode operations handed to the presentation layer.

use crate::belief::BeliefState;
use crate::model::cell::Cell;
use crate::model::color::ClueColor;
use crate::model::distance::{DistanceBucket, manhattan_distance};
use crate::model::grid::Grid;
use crate::random::RandomSource;
use crate::sensor::ObservationModel;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("cell {cell} is outside the {rows}x{cols} grid")]
    OutOfBounds { cell: Cell, rows: usize, cols: usize },
}

impl ProbeError {
    pub(crate) fn out_of_bounds(grid: Grid, cell: Cell) -> Self {
        ProbeError::OutOfBounds {
            cell,
            rows: grid.rows(),
            cols: grid.cols(),
        }
    }
}

/// Places the target uniformly at random and starts from a uniform belief.
pub fn new_episode<S: RandomSource + ?Sized>(grid: Grid, rng: &mut S) -> (Cell, BeliefState) {
    let index = rng.next_index(grid.cell_count());
    let target = grid.cell_at(index).unwrap_or_default();
    (target, BeliefState::uniform(grid))
}

/// Samples a clue at `probe_cell` from its true distance to `target` and folds
/// it into `belief`.
pub fn probe<S: RandomSource + ?Sized>(
    target: Cell,
    belief: &BeliefState,
    probe_cell: Cell,
    model: &ObservationModel,
    rng: &mut S,
) -> Result<(ClueColor, BeliefState), ProbeError> {
    let grid = belief.grid();
    if !grid.contains(probe_cell) {
        return Err(ProbeError::out_of_bounds(grid, probe_cell));
    }

    let bucket = DistanceBucket::from_distance(manhattan_distance(probe_cell, target));
    let color = model.sample(bucket, rng);
    let next = belief.incorporate(probe_cell, color, model);
    Ok((color, next))
}

pub fn most_likely_cell(belief: &BeliefState) -> Cell {
    belief.most_likely_cell()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::NORMALIZATION_TOLERANCE;
    use crate::random::{RngSource, ScriptedSource};

    #[test]
    fn new_episode_places_target_from_index_draw() {
        let mut rng = ScriptedSource::new().with_indices([53]);
        let (target, belief) = new_episode(Grid::standard(), &mut rng);
        assert_eq!(target, Cell::new(5, 4));
        assert_eq!(belief, BeliefState::uniform(Grid::standard()));
    }

    #[test]
    fn targets_cover_the_grid() {
        let grid = Grid::new(2, 2).unwrap();
        let mut rng = RngSource::seeded(3);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let (target, _) = new_episode(grid, &mut rng);
            seen[grid.index_of(target).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn probe_on_target_with_low_threshold_reads_red() {
        let model = ObservationModel::standard();
        let target = Cell::new(5, 4);
        let belief = BeliefState::uniform(Grid::standard());
        let mut rng = ScriptedSource::new().with_units([0.1]);

        let (color, next) = probe(target, &belief, target, &model, &mut rng).unwrap();
        assert_eq!(color, ClueColor::Red);
        assert_eq!(most_likely_cell(&next), target);
    }

    #[test]
    fn probe_uses_true_distance_bucket() {
        let model = ObservationModel::standard();
        let target = Cell::new(0, 0);
        let belief = BeliefState::uniform(Grid::standard());
        // Distance 19 → ">=5" row: 0.5 lands in green.
        let mut rng = ScriptedSource::new().with_units([0.5]);
        let (color, next) = probe(target, &belief, Cell::new(11, 8), &model, &mut rng).unwrap();
        assert_eq!(color, ClueColor::Green);
        assert!((next.total_mass() - 1.0).abs() <= NORMALIZATION_TOLERANCE);
    }

    #[test]
    fn out_of_bounds_probe_is_rejected() {
        let model = ObservationModel::standard();
        let belief = BeliefState::uniform(Grid::standard());
        let mut rng = ScriptedSource::new().with_units([0.1]);
        let err = probe(Cell::new(0, 0), &belief, Cell::new(12, 3), &model, &mut rng)
            .expect_err("outside grid");
        assert_eq!(
            err,
            ProbeError::OutOfBounds {
                cell: Cell::new(12, 3),
                rows: 9,
                cols: 12
            }
        );
        assert_eq!(rng.remaining_units(), 1, "no draw on rejected probe");
    }
}

use super::BeliefState;
use crate::model::cell::Cell;
use serde::Serialize;

/// Mass below this is treated as ruled out when counting support.
const SUPPORT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeliefMetrics {
    /// Shannon entropy in nats.
    pub entropy: f64,
    /// Entropy divided by `ln(N)`; 1.0 for a uniform belief.
    pub normalized_entropy: f64,
    pub peak_probability: f64,
    pub most_likely: Cell,
    pub support: usize,
}

impl BeliefMetrics {
    pub fn from_belief(belief: &BeliefState) -> Self {
        let mut entropy = 0.0;
        let mut support = 0;
        for prob in belief.probabilities() {
            if *prob > 0.0 {
                entropy -= prob * prob.ln();
            }
            if *prob > SUPPORT_EPSILON {
                support += 1;
            }
        }

        let max_entropy = (belief.probabilities().len() as f64).ln();
        let normalized_entropy = if max_entropy > 0.0 {
            entropy / max_entropy
        } else {
            0.0
        };

        let most_likely = belief.most_likely_cell();
        Self {
            entropy,
            normalized_entropy,
            peak_probability: belief.probability(most_likely),
            most_likely,
            support,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::color::ClueColor;
    use crate::model::grid::Grid;
    use crate::sensor::ObservationModel;

    #[test]
    fn uniform_belief_has_maximal_entropy() {
        let metrics = BeliefMetrics::from_belief(&BeliefState::uniform(Grid::standard()));
        assert!((metrics.entropy - 108f64.ln()).abs() < 1e-9);
        assert!((metrics.normalized_entropy - 1.0).abs() < 1e-9);
        assert_eq!(metrics.support, 108);
        assert_eq!(metrics.most_likely, Cell::new(0, 0));
    }

    #[test]
    fn evidence_lowers_entropy() {
        let model = ObservationModel::standard();
        let belief = BeliefState::uniform(Grid::standard())
            .incorporate(Cell::new(5, 4), ClueColor::Red, &model)
            .incorporate(Cell::new(5, 5), ClueColor::Orange, &model);
        let metrics = BeliefMetrics::from_belief(&belief);
        assert!(metrics.normalized_entropy < 1.0);
        assert_eq!(metrics.peak_probability, belief.probability(metrics.most_likely));
    }

    #[test]
    fn single_cell_grid_has_zero_entropy() {
        let metrics = BeliefMetrics::from_belief(&BeliefState::uniform(Grid::new(1, 1).unwrap()));
        assert_eq!(metrics.entropy, 0.0);
        assert_eq!(metrics.normalized_entropy, 0.0);
        assert_eq!(metrics.peak_probability, 1.0);
    }
}

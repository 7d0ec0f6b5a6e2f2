use ghost_core::belief::{BeliefState, NORMALIZATION_TOLERANCE};
use ghost_core::game::config::SessionConfig;
use ghost_core::game::episode::{most_likely_cell, new_episode, probe};
use ghost_core::game::session::{GameSession, SessionStatus};
use ghost_core::model::cell::Cell;
use ghost_core::model::color::ClueColor;
use ghost_core::model::distance::{DistanceBucket, manhattan_distance};
use ghost_core::model::grid::Grid;
use ghost_core::random::{RandomSource, RngSource, ScriptedSource};
use ghost_core::sensor::ObservationModel;

fn assert_distribution(belief: &BeliefState) {
    let total: f64 = belief.probabilities().iter().sum();
    assert!(
        (total - 1.0).abs() <= NORMALIZATION_TOLERANCE,
        "posterior sums to {total}"
    );
    assert!(belief.probabilities().iter().all(|p| *p >= 0.0 && p.is_finite()));
}

#[test]
fn probing_the_target_red_makes_it_the_unique_peak() {
    let grid = Grid::standard();
    let target = Cell::new(5, 4);
    let model = ObservationModel::standard();
    let prior = BeliefState::uniform(grid);

    let raised = prior.probability(target) * model.likelihood(ClueColor::Red, 0);
    assert!((raised - prior.probability(target) * 0.8).abs() < 1e-15);

    let posterior = prior.incorporate(target, ClueColor::Red, &model);
    assert_distribution(&posterior);
    let peak = posterior.probability(target);
    let runner_up = posterior
        .iter()
        .filter(|(cell, _)| *cell != target)
        .map(|(_, p)| p)
        .fold(0.0_f64, f64::max);
    assert!(peak > runner_up);
    assert_eq!(most_likely_cell(&posterior), target);
}

#[test]
fn any_single_clue_keeps_108_non_negative_values_summing_to_one() {
    let grid = Grid::standard();
    let model = ObservationModel::standard();
    for color in ClueColor::ALL {
        for probe_cell in [Cell::new(0, 0), Cell::new(5, 4), Cell::new(11, 8)] {
            let posterior = BeliefState::uniform(grid).incorporate(probe_cell, color, &model);
            assert_eq!(posterior.probabilities().len(), 108);
            assert_distribution(&posterior);
        }
    }
}

#[test]
fn random_probe_sequences_stay_normalized() {
    let grid = Grid::standard();
    let model = ObservationModel::standard();
    let mut rng = RngSource::seeded(20240611);

    for _ in 0..25 {
        let (target, mut belief) = new_episode(grid, &mut rng);
        for _ in 0..40 {
            let index = rng.next_index(grid.cell_count());
            let cell = grid.cell_at(index).expect("index in range");
            let (_, next) = probe(target, &belief, cell, &model, &mut rng).expect("valid probe");
            assert_distribution(&next);
            belief = next;
        }
    }
}

#[test]
fn update_is_a_pure_function_of_its_inputs() {
    let grid = Grid::standard();
    let model = ObservationModel::standard();
    let belief = BeliefState::uniform(grid)
        .incorporate(Cell::new(1, 1), ClueColor::Yellow, &model)
        .incorporate(Cell::new(9, 7), ClueColor::Green, &model);

    let first = belief.incorporate(Cell::new(4, 4), ClueColor::Orange, &model);
    let second = belief.incorporate(Cell::new(4, 4), ClueColor::Orange, &model);
    for (a, b) in first.probabilities().iter().zip(second.probabilities()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn sampling_and_scoring_share_the_same_buckets() {
    let model = ObservationModel::standard();
    let target = Cell::new(5, 4);
    for probe_cell in Grid::standard().cells() {
        let distance = manhattan_distance(probe_cell, target);
        let bucket = DistanceBucket::from_distance(distance);
        for color in ClueColor::ALL {
            assert_eq!(
                model.likelihood(color, distance),
                model.distribution(bucket)[color.index()]
            );
        }
    }
}

#[test]
fn scripted_session_finds_the_ghost() {
    let target_index = Grid::standard()
        .index_of(Cell::new(8, 2))
        .expect("target inside grid");
    let rng = ScriptedSource::new()
        .with_indices([target_index])
        .with_units([0.0, 0.0, 0.0]);
    let mut session = GameSession::new(SessionConfig::default(), rng).expect("session");

    session.probe(Cell::new(8, 2)).expect("probe");
    assert_eq!(session.clue_at(Cell::new(8, 2)), Some(ClueColor::Red));
    let guess = session.most_likely_cell();
    assert_eq!(guess, Cell::new(8, 2));
    session.bust(guess).expect("bust");
    assert_eq!(session.status(), SessionStatus::Won);
}

use crate::policy::{Action, Policy, PolicyContext};
use ghost_core::belief::BeliefMetrics;
use ghost_core::game::session::{GameSession, SessionStatus};
use ghost_core::model::cell::Cell;
use ghost_core::random::RandomSource;
use tracing::{Level, event};

/// Result of driving one session to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeOutcome {
    pub status: SessionStatus,
    pub probes: u32,
    pub busts: u32,
    pub credits_left: u32,
    pub target: Option<Cell>,
    /// Posterior mass on the true target when the episode ended.
    pub target_probability: Option<f64>,
    pub final_metrics: BeliefMetrics,
    pub rejected_actions: u32,
}

/// Lets `policy` act on `session` until the session finishes.
///
/// A rejected action is replaced by a bust on the best remaining candidate so
/// every step consumes either a fresh cell or a bust attempt.
pub fn play_episode<S: RandomSource>(
    session: &mut GameSession<S>,
    policy: &mut dyn Policy,
) -> EpisodeOutcome {
    policy.reset();
    let max_steps =
        session.grid().cell_count() + session.config().max_bust_attempts as usize + 1;
    let mut rejected_actions = 0u32;

    for _ in 0..max_steps {
        if session.status().is_finished() {
            break;
        }

        let action = {
            let ctx = PolicyContext::from_session(session);
            policy.choose_action(&ctx)
        };

        let result = match action {
            Action::Probe(cell) => session.probe(cell).map(|_| ()),
            Action::Bust(cell) => session.bust(cell).map(|_| ()),
        };

        if let Err(err) = result {
            rejected_actions += 1;
            event!(
                target: "ghost_bot::episode",
                Level::WARN,
                policy = policy.name(),
                action = action.kind(),
                cell = %action.cell(),
                error = %err,
                "policy chose a rejected action"
            );
            let (fallback, _) = PolicyContext::from_session(session).best_bust_candidate();
            if session.bust(fallback).is_err() {
                break;
            }
        }
    }

    let target = session.reveal_target();
    let outcome = EpisodeOutcome {
        status: session.status(),
        probes: session.probes_made(),
        busts: session.busts_made(),
        credits_left: session.credits(),
        target,
        target_probability: target.map(|cell| session.belief().probability(cell)),
        final_metrics: BeliefMetrics::from_belief(session.belief()),
        rejected_actions,
    };

    event!(
        target: "ghost_bot::episode",
        Level::INFO,
        policy = policy.name(),
        status = %outcome.status,
        probes = outcome.probes,
        busts = outcome.busts,
        entropy = outcome.final_metrics.entropy,
        rejected = rejected_actions,
        "episode finished"
    );

    outcome
}

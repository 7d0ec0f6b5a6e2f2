use super::{Action, Policy, PolicyContext, log_decision};

/// Probes wherever the belief is highest and busts once it is confident.
#[derive(Debug, Clone)]
pub struct GreedyPolicy {
    confidence: f64,
}

impl GreedyPolicy {
    pub const DEFAULT_CONFIDENCE: f64 = 0.5;

    pub fn new(confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            Self::DEFAULT_CONFIDENCE
        };
        Self { confidence }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Default for GreedyPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONFIDENCE)
    }
}

impl Policy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose_action(&mut self, ctx: &PolicyContext) -> Action {
        let (best, probability) = ctx.best_bust_candidate();

        // Spending the last credit ends the game, so it is never spent on a probe.
        if ctx.credits <= 1 {
            let action = Action::Bust(best);
            log_decision(self.name(), ctx, action, "last_credit");
            return action;
        }

        if probability >= self.confidence {
            let action = Action::Bust(best);
            log_decision(self.name(), ctx, action, "confident");
            return action;
        }

        let next_probe = ctx
            .belief
            .ranked_cells()
            .into_iter()
            .find(|(cell, _)| !ctx.is_probed(*cell));

        let (action, reason) = match next_probe {
            Some((cell, _)) => (Action::Probe(cell), "highest_unprobed"),
            None => (Action::Bust(best), "board_exhausted"),
        };
        log_decision(self.name(), ctx, action, reason);
        action
    }
}

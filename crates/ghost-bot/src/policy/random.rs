use super::{Action, Policy, PolicyContext, log_decision};
use ghost_core::model::cell::Cell;
use ghost_core::random::{RandomSource, RngSource, StdSource};

/// Probes uniformly at random for a fixed budget, then busts the likeliest cells.
#[derive(Debug, Clone)]
pub struct RandomPolicy<S = StdSource> {
    rng: S,
    probe_budget: u32,
    probes_used: u32,
}

impl RandomPolicy<StdSource> {
    pub fn seeded(seed: u64, probe_budget: u32) -> Self {
        Self::new(RngSource::seeded(seed), probe_budget)
    }
}

impl<S: RandomSource> RandomPolicy<S> {
    pub fn new(rng: S, probe_budget: u32) -> Self {
        Self {
            rng,
            probe_budget,
            probes_used: 0,
        }
    }

    pub fn probes_used(&self) -> u32 {
        self.probes_used
    }

    /// Why probing has stopped, if it has.
    fn stop_reason(&self, ctx: &PolicyContext) -> Option<&'static str> {
        if ctx.credits <= 1 {
            Some("last_credit")
        } else if self.probes_used >= self.probe_budget {
            Some("budget_spent")
        } else {
            None
        }
    }
}

impl<S: RandomSource + Send> Policy for RandomPolicy<S> {
    fn name(&self) -> &'static str {
        "random"
    }

    fn reset(&mut self) {
        self.probes_used = 0;
    }

    fn choose_action(&mut self, ctx: &PolicyContext) -> Action {
        let (best, _) = ctx.best_bust_candidate();
        if let Some(reason) = self.stop_reason(ctx) {
            let action = Action::Bust(best);
            log_decision(self.name(), ctx, action, reason);
            return action;
        }

        let unprobed: Vec<Cell> = ctx
            .belief
            .grid()
            .cells()
            .filter(|cell| !ctx.is_probed(*cell))
            .collect();
        if unprobed.is_empty() {
            let action = Action::Bust(best);
            log_decision(self.name(), ctx, action, "board_exhausted");
            return action;
        }

        let pick = unprobed[self.rng.next_index(unprobed.len())];
        self.probes_used += 1;
        let action = Action::Probe(pick);
        log_decision(self.name(), ctx, action, "uniform_probe");
        action
    }
}

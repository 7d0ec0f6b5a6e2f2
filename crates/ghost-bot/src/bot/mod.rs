mod params;
mod runner;

pub use params::{BotKind, BotParams, DEFAULT_PROBE_BUDGET, ParseBotKindError};
pub use runner::{EpisodeOutcome, play_episode};

use crate::policy::{GreedyPolicy, Policy, RandomPolicy};

/// Instantiates the policy for `kind`; `seed` drives any internal randomness.
pub fn build_policy(kind: BotKind, params: &BotParams, seed: u64) -> Box<dyn Policy> {
    match kind {
        BotKind::Greedy => Box::new(GreedyPolicy::new(params.confidence)),
        BotKind::Random => Box::new(RandomPolicy::seeded(seed, params.probe_budget)),
    }
}

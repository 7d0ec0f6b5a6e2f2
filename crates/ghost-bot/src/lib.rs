pub mod bot;
pub mod policy;

pub use bot::{BotKind, BotParams, EpisodeOutcome, build_policy, play_episode};
pub use policy::{Action, GreedyPolicy, Policy, PolicyContext, RandomPolicy};

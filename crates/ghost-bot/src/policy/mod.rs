mod greedy;
mod random;

pub use greedy::GreedyPolicy;
pub use random::RandomPolicy;

use ghost_core::belief::BeliefState;
use ghost_core::game::session::GameSession;
use ghost_core::model::cell::Cell;
use ghost_core::model::color::ClueColor;
use ghost_core::random::RandomSource;
use tracing::{Level, event};

/// A move a player can make on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Probe(Cell),
    Bust(Cell),
}

impl Action {
    pub const fn cell(self) -> Cell {
        match self {
            Action::Probe(cell) | Action::Bust(cell) => cell,
        }
    }

    pub const fn kind(self) -> &'static str {
        match self {
            Action::Probe(_) => "probe",
            Action::Bust(_) => "bust",
        }
    }
}

/// Read-only view of a session handed to policies.
pub struct PolicyContext<'a> {
    pub belief: &'a BeliefState,
    /// Revealed clues in row-major order.
    pub clues: &'a [Option<ClueColor>],
    pub missed_busts: &'a [Cell],
    pub credits: u32,
    pub remaining_busts: u32,
}

impl<'a> PolicyContext<'a> {
    pub fn from_session<S: RandomSource>(session: &'a GameSession<S>) -> Self {
        Self {
            belief: session.belief(),
            clues: session.clues(),
            missed_busts: session.missed_busts(),
            credits: session.credits(),
            remaining_busts: session.remaining_busts(),
        }
    }

    pub fn is_probed(&self, cell: Cell) -> bool {
        self.belief
            .grid()
            .index_of(cell)
            .and_then(|index| self.clues.get(index).copied().flatten())
            .is_some()
    }

    pub fn was_missed(&self, cell: Cell) -> bool {
        self.missed_busts.contains(&cell)
    }

    /// Most likely cell not already ruled out by a missed bust.
    pub fn best_bust_candidate(&self) -> (Cell, f64) {
        let ranked = self.belief.ranked_cells();
        ranked
            .iter()
            .copied()
            .find(|(cell, _)| !self.was_missed(*cell))
            .or_else(|| ranked.first().copied())
            .unwrap_or_default()
    }
}

/// Decision-making interface shared by every automated player.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// Clears per-episode state before a new episode starts.
    fn reset(&mut self) {}

    fn choose_action(&mut self, ctx: &PolicyContext) -> Action;
}

pub(crate) fn log_decision(
    policy: &'static str,
    ctx: &PolicyContext,
    action: Action,
    reason: &str,
) {
    if !tracing::enabled!(target: "ghost_bot::decision", Level::DEBUG) {
        return;
    }

    let cell = action.cell();
    event!(
        target: "ghost_bot::decision",
        Level::DEBUG,
        policy,
        action = action.kind(),
        cell = %cell,
        probability = ctx.belief.probability(cell),
        credits = ctx.credits,
        remaining_busts = ctx.remaining_busts,
        reason,
    );
}

//! Single-player session bookkeeping layered over the episode operations.

use super::config::{ConfigError, SessionConfig};
use super::episode::{self, ProbeError};
use crate::belief::BeliefState;
use crate::model::cell::Cell;
use crate::model::color::ClueColor;
use crate::model::grid::Grid;
use crate::random::{RandomSource, RngSource, StdSource};
use crate::sensor::ObservationModel;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Won,
    Lost,
}

impl SessionStatus {
    pub const fn is_finished(self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Won => "won",
            SessionStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected actions. A rejection never changes the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cell {cell} is outside the {rows}x{cols} grid")]
    OutOfBounds { cell: Cell, rows: usize, cols: usize },
    #[error("cell {0} has already been probed")]
    AlreadyProbed(Cell),
    #[error("no credits remaining")]
    NoCredits,
    #[error("session is already finished ({0})")]
    Finished(SessionStatus),
}

impl From<ProbeError> for SessionError {
    fn from(value: ProbeError) -> Self {
        match value {
            ProbeError::OutOfBounds { cell, rows, cols } => {
                SessionError::OutOfBounds { cell, rows, cols }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeReport {
    pub cell: Cell,
    pub color: ClueColor,
    pub credits_remaining: u32,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BustOutcome {
    Hit,
    Miss { remaining: u32 },
}

/// One player's game: hidden target, belief, revealed clues, credits and
/// bust attempts.
///
/// A probe that spends the last credit loses the session, as does a missed
/// bust that spends the last attempt. Busting the target wins.
#[derive(Debug, Clone)]
pub struct GameSession<S = StdSource> {
    config: SessionConfig,
    grid: Grid,
    model: ObservationModel,
    rng: S,
    target: Cell,
    belief: BeliefState,
    clues: Vec<Option<ClueColor>>,
    missed_busts: Vec<Cell>,
    credits: u32,
    remaining_busts: u32,
    probes_made: u32,
    status: SessionStatus,
}

impl GameSession<StdSource> {
    pub fn with_seed(config: SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, RngSource::seeded(seed))
    }

    pub fn from_entropy(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::new(config, RngSource::from_entropy())
    }
}

impl<S: RandomSource> GameSession<S> {
    pub fn new(config: SessionConfig, mut rng: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid()?;
        let (target, belief) = episode::new_episode(grid, &mut rng);

        event!(
            target: "ghost_core::session",
            Level::DEBUG,
            grid = %grid,
            credits = config.starting_credits,
            busts = config.max_bust_attempts,
            "session started"
        );

        Ok(Self {
            config,
            grid,
            model: ObservationModel::standard(),
            rng,
            target,
            belief,
            clues: vec![None; grid.cell_count()],
            missed_busts: Vec::new(),
            credits: config.starting_credits,
            remaining_busts: config.max_bust_attempts,
            probes_made: 0,
            status: SessionStatus::InProgress,
        })
    }

    /// Spends one credit to reveal a clue at `cell` and update the belief.
    pub fn probe(&mut self, cell: Cell) -> Result<ProbeReport, SessionError> {
        self.ensure_in_progress()?;
        let index = self
            .grid
            .index_of(cell)
            .ok_or_else(|| SessionError::from(ProbeError::out_of_bounds(self.grid, cell)))?;
        if self.clues[index].is_some() {
            return Err(SessionError::AlreadyProbed(cell));
        }
        if self.credits == 0 {
            return Err(SessionError::NoCredits);
        }

        let (color, belief) =
            episode::probe(self.target, &self.belief, cell, &self.model, &mut self.rng)?;
        self.belief = belief;
        self.clues[index] = Some(color);
        self.credits -= 1;
        self.probes_made += 1;
        if self.credits == 0 {
            self.status = SessionStatus::Lost;
        }

        event!(
            target: "ghost_core::session",
            Level::DEBUG,
            cell = %cell,
            color = %color,
            credits = self.credits,
            status = %self.status,
            "probe"
        );

        Ok(ProbeReport {
            cell,
            color,
            credits_remaining: self.credits,
            status: self.status,
        })
    }

    /// Guesses the target location, consuming an attempt on a miss.
    pub fn bust(&mut self, cell: Cell) -> Result<BustOutcome, SessionError> {
        self.ensure_in_progress()?;
        if !self.grid.contains(cell) {
            return Err(ProbeError::out_of_bounds(self.grid, cell).into());
        }

        let outcome = if cell == self.target {
            self.status = SessionStatus::Won;
            BustOutcome::Hit
        } else {
            self.remaining_busts = self.remaining_busts.saturating_sub(1);
            self.missed_busts.push(cell);
            if self.remaining_busts == 0 {
                self.status = SessionStatus::Lost;
            }
            BustOutcome::Miss {
                remaining: self.remaining_busts,
            }
        };

        event!(
            target: "ghost_core::session",
            Level::DEBUG,
            cell = %cell,
            hit = matches!(outcome, BustOutcome::Hit),
            remaining = self.remaining_busts,
            status = %self.status,
            "bust"
        );

        Ok(outcome)
    }

    /// Starts a fresh episode with the same configuration.
    pub fn restart(&mut self) {
        let (target, belief) = episode::new_episode(self.grid, &mut self.rng);
        self.target = target;
        self.belief = belief;
        self.clues.iter_mut().for_each(|clue| *clue = None);
        self.missed_busts.clear();
        self.credits = self.config.starting_credits;
        self.remaining_busts = self.config.max_bust_attempts;
        self.probes_made = 0;
        self.status = SessionStatus::InProgress;
        event!(target: "ghost_core::session", Level::DEBUG, "session restarted");
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn belief(&self) -> &BeliefState {
        &self.belief
    }

    pub fn most_likely_cell(&self) -> Cell {
        episode::most_likely_cell(&self.belief)
    }

    pub fn clue_at(&self, cell: Cell) -> Option<ClueColor> {
        self.grid
            .index_of(cell)
            .and_then(|index| self.clues[index])
    }

    /// Revealed clues in row-major order.
    pub fn clues(&self) -> &[Option<ClueColor>] {
        &self.clues
    }

    pub fn is_probed(&self, cell: Cell) -> bool {
        self.clue_at(cell).is_some()
    }

    pub fn unprobed_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.grid
            .cells()
            .zip(self.clues.iter())
            .filter(|(_, clue)| clue.is_none())
            .map(|(cell, _)| cell)
    }

    pub fn missed_busts(&self) -> &[Cell] {
        &self.missed_busts
    }

    pub fn credits(&self) -> u32 {
        self.credits
    }

    pub fn remaining_busts(&self) -> u32 {
        self.remaining_busts
    }

    pub fn probes_made(&self) -> u32 {
        self.probes_made
    }

    pub fn busts_made(&self) -> u32 {
        let hit = u32::from(self.status == SessionStatus::Won);
        self.missed_busts.len() as u32 + hit
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// End-of-game disclosure; hidden while the session is in progress.
    pub fn reveal_target(&self) -> Option<Cell> {
        self.status.is_finished().then_some(self.target)
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.status.is_finished() {
            return Err(SessionError::Finished(self.status));
        }
        Ok(())
    }

}

//! Caller-supplied session parameters.

use crate::model::grid::Grid;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

pub const DEFAULT_STARTING_CREDITS: u32 = 50;
pub const DEFAULT_MAX_BUST_ATTEMPTS: u32 = 2;
/// Largest board a session will allocate belief and clue storage for.
pub const MAX_CELLS: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub rows: usize,
    pub cols: usize,
    pub starting_credits: u32,
    pub max_bust_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: Grid::STANDARD_ROWS,
            cols: Grid::STANDARD_COLS,
            starting_credits: DEFAULT_STARTING_CREDITS,
            max_bust_attempts: DEFAULT_MAX_BUST_ATTEMPTS,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `GHOST_ROWS`, `GHOST_COLS`, `GHOST_CREDITS` and
    /// `GHOST_BUSTS`. Unparseable or out-of-range values keep the default.
    pub fn from_env() -> Self {
        Self::from_reader(|key| env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base = Self::default();
        Self {
            rows: parse_positive(read("GHOST_ROWS"), base.rows),
            cols: parse_positive(read("GHOST_COLS"), base.cols),
            starting_credits: read("GHOST_CREDITS")
                .and_then(|raw| raw.trim().parse::<u32>().ok())
                .unwrap_or(base.starting_credits),
            max_bust_attempts: parse_positive(read("GHOST_BUSTS"), base.max_bust_attempts),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::invalid("rows", "must be positive"));
        }
        if self.cols == 0 {
            return Err(ConfigError::invalid("cols", "must be positive"));
        }
        if self.max_bust_attempts == 0 {
            return Err(ConfigError::invalid("max_bust_attempts", "must be positive"));
        }
        let grid = self.grid()?;
        if grid.cell_count() > MAX_CELLS {
            return Err(ConfigError::invalid(
                "rows",
                format!(
                    "{}x{} exceeds the {MAX_CELLS}-cell limit",
                    self.rows, self.cols
                ),
            ));
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<Grid, ConfigError> {
        Grid::new(self.rows, self.cols).ok_or_else(|| {
            ConfigError::invalid(
                "rows",
                format!("{}x{} is not a usable grid", self.rows, self.cols),
            )
        })
    }
}

fn parse_positive<T>(raw: Option<String>, fallback: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.and_then(|value| value.trim().parse::<T>().ok())
        .filter(|value| *value > T::default())
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field}: {message}")]
    InvalidField { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

use crate::policy::GreedyPolicy;
use core::fmt;
use core::str::FromStr;

pub const DEFAULT_PROBE_BUDGET: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotKind {
    Greedy,
    Random,
}

impl BotKind {
    pub const ALL: [BotKind; 2] = [BotKind::Greedy, BotKind::Random];

    pub const fn as_str(self) -> &'static str {
        match self {
            BotKind::Greedy => "greedy",
            BotKind::Random => "random",
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBotKindError(pub String);

impl fmt::Display for ParseBotKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown bot kind '{}'. Valid kinds: greedy, random", self.0)
    }
}

impl std::error::Error for ParseBotKindError {}

impl FromStr for BotKind {
    type Err = ParseBotKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" | "default" => Ok(BotKind::Greedy),
            "random" | "baseline" => Ok(BotKind::Random),
            other => Err(ParseBotKindError(other.to_string())),
        }
    }
}

/// Tunables shared by the bundled policies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotParams {
    /// Belief mass at which the greedy policy stops probing and busts.
    pub confidence: f64,
    /// Number of probes the random policy spends before busting.
    pub probe_budget: u32,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            confidence: GreedyPolicy::DEFAULT_CONFIDENCE,
            probe_budget: DEFAULT_PROBE_BUDGET,
        }
    }
}

impl BotParams {
    /// Defaults overridden by `GHOST_BOT_CONFIDENCE` and `GHOST_BOT_PROBE_BUDGET`.
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let confidence = read("GHOST_BOT_CONFIDENCE")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
            .unwrap_or(GreedyPolicy::DEFAULT_CONFIDENCE);

        let probe_budget = read("GHOST_BOT_PROBE_BUDGET")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_PROBE_BUDGET);

        Self {
            confidence,
            probe_budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_accepts_aliases() {
        assert_eq!("Greedy".parse::<BotKind>(), Ok(BotKind::Greedy));
        assert_eq!("baseline".parse::<BotKind>(), Ok(BotKind::Random));
        assert!("oracle".parse::<BotKind>().is_err());
        for kind in BotKind::ALL {
            assert_eq!(kind.as_str().parse::<BotKind>(), Ok(kind));
        }
    }

    #[test]
    fn params_reader_filters_out_of_range_values() {
        let params = BotParams::from_reader(|key| match key {
            "GHOST_BOT_CONFIDENCE" => Some("1.5".to_string()),
            "GHOST_BOT_PROBE_BUDGET" => Some("3".to_string()),
            _ => None,
        });
        assert_eq!(params.confidence, GreedyPolicy::DEFAULT_CONFIDENCE);
        assert_eq!(params.probe_budget, 3);
    }
}

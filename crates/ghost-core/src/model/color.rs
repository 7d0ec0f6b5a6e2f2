use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clue colour revealed by a probe, ordered from "hot" to "cold".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ClueColor {
    Red = 0,
    Orange = 1,
    Yellow = 2,
    Green = 3,
}

impl ClueColor {
    pub const COUNT: usize = 4;

    /// Fixed enumeration order used when walking cumulative probability mass.
    pub const ALL: [ClueColor; Self::COUNT] = [
        ClueColor::Red,
        ClueColor::Orange,
        ClueColor::Yellow,
        ClueColor::Green,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ClueColor::Red),
            1 => Some(ClueColor::Orange),
            2 => Some(ClueColor::Yellow),
            3 => Some(ClueColor::Green),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ClueColor::Red => "red",
            ClueColor::Orange => "orange",
            ClueColor::Yellow => "yellow",
            ClueColor::Green => "green",
        }
    }
}

impl fmt::Display for ClueColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown clue colour '{0}'")]
pub struct ParseColorError(pub String);

impl FromStr for ClueColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(ClueColor::Red),
            "orange" => Ok(ClueColor::Orange),
            "yellow" => Ok(ClueColor::Yellow),
            "green" => Ok(ClueColor::Green),
            other => Err(ParseColorError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClueColor;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Red".parse::<ClueColor>(), Ok(ClueColor::Red));
        assert_eq!(" green ".parse::<ClueColor>(), Ok(ClueColor::Green));
        assert!("purple".parse::<ClueColor>().is_err());
    }

    #[test]
    fn index_roundtrip() {
        for (i, color) in ClueColor::ALL.iter().enumerate() {
            assert_eq!(ClueColor::from_index(i), Some(*color));
            assert_eq!(color.index(), i);
        }
        assert_eq!(ClueColor::from_index(4), None);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ClueColor::Orange).unwrap();
        assert_eq!(json, "\"orange\"");
    }
}

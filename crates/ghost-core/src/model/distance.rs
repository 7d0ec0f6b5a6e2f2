//! Grid geometry shared by clue sampling and belief updates.

use super::cell::Cell;
use core::fmt;
use serde::{Deserialize, Serialize};

/// `|a.col - b.col| + |a.row - b.row|`.
pub const fn manhattan_distance(a: Cell, b: Cell) -> usize {
    a.col.abs_diff(b.col) + a.row.abs_diff(b.row)
}

/// Coarse distance category indexing the observation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DistanceBucket {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    FiveOrMore = 5,
}

impl DistanceBucket {
    pub const COUNT: usize = 6;

    pub const ALL: [DistanceBucket; Self::COUNT] = [
        DistanceBucket::Zero,
        DistanceBucket::One,
        DistanceBucket::Two,
        DistanceBucket::Three,
        DistanceBucket::Four,
        DistanceBucket::FiveOrMore,
    ];

    pub const fn from_distance(distance: usize) -> Self {
        match distance {
            0 => DistanceBucket::Zero,
            1 => DistanceBucket::One,
            2 => DistanceBucket::Two,
            3 => DistanceBucket::Three,
            4 => DistanceBucket::Four,
            _ => DistanceBucket::FiveOrMore,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DistanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DistanceBucket::Zero => "0",
            DistanceBucket::One => "1",
            DistanceBucket::Two => "2",
            DistanceBucket::Three => "3",
            DistanceBucket::Four => "4",
            DistanceBucket::FiveOrMore => ">=5",
        };
        f.write_str(label)
    }
}

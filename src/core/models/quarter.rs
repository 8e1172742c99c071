//! Offering quarters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of offering slots in an academic year
pub const QUARTERS_PER_YEAR: usize = 3;

/// One of the three offering slots of an academic year
///
/// Courses are assumed to be offered in the same slots every year, so an
/// absolute quarter index (0-based from the first quarter of the plan) maps
/// cyclically onto a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quarter {
    /// First slot (1)
    Fall,
    /// Second slot (2)
    Winter,
    /// Third slot (3)
    Spring,
}

impl Quarter {
    /// All slots in academic order
    pub const ALL: [Self; QUARTERS_PER_YEAR] = [Self::Fall, Self::Winter, Self::Spring];

    /// Map an absolute quarter index onto its offering slot
    ///
    /// Index 0 is Fall, 1 is Winter, 2 is Spring, 3 is Fall again.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % QUARTERS_PER_YEAR]
    }

    /// Slot number as used in catalogs (1 = Fall, 2 = Winter, 3 = Spring)
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Fall => 1,
            Self::Winter => 2,
            Self::Spring => 3,
        }
    }

    /// Look up a slot by its catalog number
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Fall),
            2 => Some(Self::Winter),
            3 => Some(Self::Spring),
            _ => None,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fall => "Fall",
            Self::Winter => "Winter",
            Self::Spring => "Spring",
        };
        f.write_str(label)
    }
}

/// Human-readable label for an absolute quarter index, e.g. "year 2 Winter"
#[must_use]
pub fn quarter_label(index: usize) -> String {
    format!(
        "year {} {}",
        index / QUARTERS_PER_YEAR + 1,
        Quarter::from_index(index)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_wraps_cyclically() {
        assert_eq!(Quarter::from_index(0), Quarter::Fall);
        assert_eq!(Quarter::from_index(1), Quarter::Winter);
        assert_eq!(Quarter::from_index(2), Quarter::Spring);
        assert_eq!(Quarter::from_index(3), Quarter::Fall);
        assert_eq!(Quarter::from_index(7), Quarter::Winter);
    }

    #[test]
    fn test_number_round_trip() {
        for quarter in Quarter::ALL {
            assert_eq!(Quarter::from_number(quarter.number()), Some(quarter));
        }
        assert_eq!(Quarter::from_number(0), None);
        assert_eq!(Quarter::from_number(4), None);
    }

    #[test]
    fn test_quarter_label() {
        assert_eq!(quarter_label(0), "year 1 Fall");
        assert_eq!(quarter_label(5), "year 2 Spring");
    }
}

// Shared enums: rewrite direction and mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a direction or mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEnumError {
    #[error("unknown or unsupported rewrite direction: {0}")]
    UnknownDirection(String),
    #[error("unknown or unsupported rewrite mode: {0}")]
    UnknownMode(String),
}

/// Direction in which rule applications are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Matches are located scanning left to right; earlier rewrites feed later ones.
    #[default]
    LeftToRight,
    /// Matches are located scanning right to left.
    RightToLeft,
    /// All matches are located on the unrewritten input.
    Simultaneous,
}

impl Direction {
    /// Short name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::LeftToRight => "ltr",
            Direction::RightToLeft => "rtl",
            Direction::Simultaneous => "sim",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ltr" | "left_to_right" | "left-to-right" => Ok(Direction::LeftToRight),
            "rtl" | "right_to_left" | "right-to-left" => Ok(Direction::RightToLeft),
            "sim" | "simultaneous" => Ok(Direction::Simultaneous),
            _ => Err(ParseEnumError::UnknownDirection(s.to_string())),
        }
    }
}

/// Whether a matching context must be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every match in context is rewritten.
    #[default]
    Obligatory,
    /// Each match in context may or may not be rewritten.
    Optional,
}

impl Mode {
    /// Short name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Obligatory => "obligatory",
            Mode::Optional => "optional",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "obl" | "obligatory" => Ok(Mode::Obligatory),
            "opt" | "optional" => Ok(Mode::Optional),
            _ => Err(ParseEnumError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_direction_aliases() {
        assert_eq!("ltr".parse::<Direction>().unwrap(), Direction::LeftToRight);
        assert_eq!("RTL".parse::<Direction>().unwrap(), Direction::RightToLeft);
        assert_eq!(
            "simultaneous".parse::<Direction>().unwrap(),
            Direction::Simultaneous
        );
        assert_eq!(
            "left_to_right".parse::<Direction>().unwrap(),
            Direction::LeftToRight
        );
    }

    #[test]
    fn reject_unknown_direction() {
        let err = "upward".parse::<Direction>().unwrap_err();
        assert_eq!(err, ParseEnumError::UnknownDirection("upward".to_string()));
    }

    #[test]
    fn parse_mode_aliases() {
        assert_eq!("obl".parse::<Mode>().unwrap(), Mode::Obligatory);
        assert_eq!("optional".parse::<Mode>().unwrap(), Mode::Optional);
        assert!("sometimes".parse::<Mode>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for dir in [
            Direction::LeftToRight,
            Direction::RightToLeft,
            Direction::Simultaneous,
        ] {
            assert_eq!(dir.to_string().parse::<Direction>().unwrap(), dir);
        }
        for mode in [Mode::Obligatory, Mode::Optional] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(Direction::default(), Direction::LeftToRight);
        assert_eq!(Mode::default(), Mode::Obligatory);
    }
}

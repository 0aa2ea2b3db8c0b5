//! Closed label sets for task conditions and recorded events.
//!
//! The experiment has four task conditions (a resting baseline followed by
//! three task difficulty levels). They are the classification target, so
//! every per-class table in the crate is laid out in [`Condition::ALL`] order.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Experimental task condition attached to a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Condition {
    Baseline,
    One,
    Two,
    Three,
}

impl Condition {
    /// Canonical ordering shared by every per-class table.
    pub const ALL: [Condition; 4] = [
        Condition::Baseline,
        Condition::One,
        Condition::Two,
        Condition::Three,
    ];

    /// Number of conditions.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this condition in [`Condition::ALL`].
    pub fn index(self) -> usize {
        match self {
            Condition::Baseline => 0,
            Condition::One => 1,
            Condition::Two => 2,
            Condition::Three => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Map an EEGLAB condition name to a condition.
    ///
    /// EEGLAB stores the resting condition as `"open"` (eyes open); the
    /// task levels are stored as their digit.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name.trim() {
            "open" | "baseline" => Ok(Condition::Baseline),
            "1" => Ok(Condition::One),
            "2" => Ok(Condition::Two),
            "3" => Ok(Condition::Three),
            other => Err(Error::UnknownLabel(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Condition::Baseline => "baseline",
            Condition::One => "1",
            Condition::Two => "2",
            Condition::Three => "3",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::from_name(s)
    }
}

impl TryFrom<String> for Condition {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Condition::from_name(&value)
    }
}

impl From<Condition> for String {
    fn from(value: Condition) -> Self {
        value.name().to_string()
    }
}

/// Kind of an event marker recorded during the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ExperimentStart,
    ExperimentEnd,
    SlideStart,
    SlideEnd,
    LeftClick,
    MiddleClick,
    RightClick,
    EmotivBlink,
    EmotivError,
}

impl EventKind {
    /// Map an EEGLAB event type code to an event kind.
    pub fn from_code(code: &str) -> Result<Self, Error> {
        match code.trim() {
            "0" => Ok(EventKind::ExperimentStart),
            "1" => Ok(EventKind::ExperimentEnd),
            "3" => Ok(EventKind::SlideStart),
            "4" => Ok(EventKind::SlideEnd),
            "100" => Ok(EventKind::LeftClick),
            "101" => Ok(EventKind::MiddleClick),
            "102" => Ok(EventKind::RightClick),
            "200" => Ok(EventKind::EmotivBlink),
            "255" => Ok(EventKind::EmotivError),
            other => Err(Error::UnknownLabel(other.to_string())),
        }
    }
}

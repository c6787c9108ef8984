use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single voter's score for a candidate, guaranteed to lie in
/// `Score::MIN..=Score::MAX`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

/// A score outside the permitted range was submitted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("score {0} is outside the range {}..={}", Score::MIN, Score::MAX)]
pub struct InvalidScore(pub i64);

impl Score {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 10;

    /// Validate a raw score.
    pub fn new(raw: i64) -> Result<Self, InvalidScore> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&raw) {
            // Range already checked, the cast cannot truncate.
            Ok(Self(raw as u8))
        } else {
            Err(InvalidScore(raw))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = InvalidScore;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Running count and sum of the scores a candidate has received.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTally {
    pub votes: u64,
    pub sum: u64,
}

impl ScoreTally {
    pub fn from_parts(votes: u64, sum: u64) -> Self {
        Self { votes, sum }
    }

    /// Arithmetic mean of the tallied scores.
    ///
    /// A candidate nobody has rated yet has a mean of `0.0`; this is a defined
    /// value, not an error.
    pub fn mean(&self) -> f64 {
        if self.votes == 0 {
            0.0
        } else {
            self.sum as f64 / self.votes as f64
        }
    }
}

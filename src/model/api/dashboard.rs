use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Headline numbers for elevated voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    /// The voting day the daily figures refer to.
    pub date: NaiveDate,
    pub active_candidates: u64,
    /// Voters without elevated rights.
    pub standard_voters: u64,
    pub total_ratings: u64,
    pub ratings_today: u64,
    /// Distinct voters who rated anyone today.
    pub voters_today: u64,
}

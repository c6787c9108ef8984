use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use team_draft::ScoreTally;

use crate::model::{api::id::ApiId, db::candidate::Candidate};

/// A request to add a candidate to the pool.
#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
}

/// API-friendly representation of a candidate, as shown to voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDesc {
    pub id: ApiId,
    pub name: String,
}

impl From<Candidate> for CandidateDesc {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id.into(),
            name: candidate.candidate.name,
        }
    }
}

/// A candidate together with their all-time rating statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: ApiId,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub total_votes: u64,
    /// `0.0` until the candidate has been rated.
    pub mean_score: f64,
}

impl CandidateSummary {
    pub fn new(candidate: Candidate, tally: ScoreTally) -> Self {
        Self {
            id: candidate.id.into(),
            name: candidate.candidate.name,
            active: candidate.candidate.active,
            created_at: candidate.candidate.created_at,
            total_votes: tally.votes,
            mean_score: tally.mean(),
        }
    }
}

/// The ID of a freshly registered candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registered {
    pub id: ApiId,
}

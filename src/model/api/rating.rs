use serde::{Deserialize, Serialize};

use crate::model::api::id::ApiId;

/// A voter's score for one candidate.
///
/// The score is taken as a plain integer so that out-of-range values reach
/// validation and are reported as such, rather than failing to parse.
#[derive(Debug, Serialize, Deserialize)]
pub struct RatingSpec {
    pub candidate_id: ApiId,
    pub score: i64,
}

use std::collections::{HashMap, HashSet};
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use mongodb::{
    bson::{self, doc, serde_helpers::chrono_datetime_as_bson_datetime, Document},
    options::UpdateOptions,
};
use rocket::futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use team_draft::{Score, ScoreTally, VotingDay};

use crate::{
    error::{Error, Result},
    model::mongodb::{is_duplicate_key_error, Coll, Id},
};

/// Core rating data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingCore {
    pub voter_id: Id,
    pub candidate_id: Id,
    pub score: Score,
    /// When the rating was cast; decides which voting day it counts for.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl RatingCore {
    /// A rating cast now.
    pub fn new(voter_id: Id, candidate_id: Id, score: Score) -> Self {
        Self {
            voter_id,
            candidate_id,
            score,
            created_at: Utc::now(),
        }
    }

    /// Filter matching the rating slot this rating occupies.
    fn pair(&self) -> Document {
        doc! {
            "voter_id": self.voter_id,
            "candidate_id": self.candidate_id,
        }
    }
}

/// A rating without an ID.
pub type NewRating = RatingCore;

/// A rating from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub rating: RatingCore,
}

impl Deref for Rating {
    type Target = RatingCore;

    fn deref(&self) -> &Self::Target {
        &self.rating
    }
}

impl DerefMut for Rating {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.rating
    }
}

/// One row of the per-candidate tally aggregation.
#[derive(Deserialize)]
struct TallyRow {
    #[serde(rename = "_id")]
    candidate_id: Id,
    votes: i64,
    sum: i64,
}

impl From<TallyRow> for ScoreTally {
    fn from(row: TallyRow) -> Self {
        ScoreTally::from_parts(row.votes.max(0) as u64, row.sum.max(0) as u64)
    }
}

/// Filter matching ratings cast during the given day.
fn cast_on(day: &VotingDay) -> Document {
    doc! {
        "created_at": {
            "$gte": bson::DateTime::from_chrono(day.start()),
            "$lt": bson::DateTime::from_chrono(day.end()),
        }
    }
}

impl Rating {
    /// Store a rating.
    ///
    /// Without `allow_revote`, a second rating for the same voter and
    /// candidate is rejected with [`Error::DuplicateVote`]. With it, the
    /// existing rating is replaced, counting for the day of the new
    /// `created_at`.
    pub async fn record(
        ratings: &Coll<NewRating>,
        rating: NewRating,
        allow_revote: bool,
    ) -> Result<()> {
        if !allow_revote {
            return match ratings.insert_one(&rating, None).await {
                Ok(_) => Ok(()),
                Err(err) if is_duplicate_key_error(&err) => Err(Error::DuplicateVote {
                    voter: rating.voter_id,
                    candidate: rating.candidate_id,
                }),
                Err(err) => Err(err.into()),
            };
        }

        let update = doc! {
            "$set": {
                "score": i32::from(rating.score.value()),
                "created_at": bson::DateTime::from_chrono(rating.created_at),
            }
        };
        let upsert = UpdateOptions::builder().upsert(true).build();
        let result = ratings
            .update_one(rating.pair(), update.clone(), upsert.clone())
            .await;
        match result {
            Ok(result) => {
                debug!(
                    "Rating by {} of {} {}",
                    rating.voter_id,
                    rating.candidate_id,
                    if result.upserted_id.is_some() {
                        "inserted"
                    } else {
                        "replaced"
                    }
                );
                Ok(())
            }
            // Two concurrent upserts of a new pair can both try to insert;
            // the loser finds the winner's document on retry.
            Err(err) if is_duplicate_key_error(&err) => {
                warn!(
                    "Concurrent rating by {} of {}, retrying",
                    rating.voter_id, rating.candidate_id
                );
                ratings.update_one(rating.pair(), update, upsert).await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// IDs of the candidates the voter rated during the given day.
    pub async fn rated_on(
        ratings: &Coll<Rating>,
        voter: Id,
        day: &VotingDay,
    ) -> Result<HashSet<Id>> {
        let mut filter = cast_on(day);
        filter.insert("voter_id", voter);
        let rated: HashSet<Id> = ratings
            .find(filter, None)
            .await?
            .map_ok(|rating| rating.candidate_id)
            .try_collect()
            .await?;
        Ok(rated)
    }

    /// All-time tally of one candidate's ratings.
    pub async fn tally_for(ratings: &Coll<Rating>, candidate: Id) -> Result<ScoreTally> {
        let filter = doc! { "candidate_id": candidate };
        let mut tallies = Self::aggregate_tallies(ratings, filter).await?;
        Ok(tallies.remove(&candidate).unwrap_or_default())
    }

    /// All-time mean score of one candidate; `0.0` if nobody has rated them.
    pub async fn mean_score(ratings: &Coll<Rating>, candidate: Id) -> Result<f64> {
        Ok(Self::tally_for(ratings, candidate).await?.mean())
    }

    /// All-time tallies of every rated candidate. Candidates with no ratings
    /// are absent.
    pub async fn tallies(ratings: &Coll<Rating>) -> Result<HashMap<Id, ScoreTally>> {
        Self::aggregate_tallies(ratings, Document::new()).await
    }

    async fn aggregate_tallies(
        ratings: &Coll<Rating>,
        filter: Document,
    ) -> Result<HashMap<Id, ScoreTally>> {
        let pipeline = [
            doc! { "$match": filter },
            doc! {
                "$group": {
                    "_id": "$candidate_id",
                    "votes": { "$sum": 1 },
                    "sum": { "$sum": "$score" },
                }
            },
        ];
        let rows: Vec<Document> = ratings.aggregate(pipeline, None).await?.try_collect().await?;
        rows.into_iter()
            .map(|row| -> Result<(Id, ScoreTally)> {
                let row: TallyRow = bson::from_document(row)?;
                Ok((row.candidate_id, row.into()))
            })
            .collect()
    }

    /// Total number of ratings ever cast.
    pub async fn count(ratings: &Coll<Rating>) -> Result<u64> {
        Ok(ratings.count_documents(None, None).await?)
    }

    /// Number of ratings cast during the given day.
    pub async fn count_on(ratings: &Coll<Rating>, day: &VotingDay) -> Result<u64> {
        Ok(ratings.count_documents(cast_on(day), None).await?)
    }

    /// Number of distinct voters who cast a rating during the given day.
    pub async fn voters_on(ratings: &Coll<Rating>, day: &VotingDay) -> Result<u64> {
        let voters = ratings.distinct("voter_id", cast_on(day), None).await?;
        Ok(voters.len() as u64)
    }
}

use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime},
    options::FindOptions,
};
use rocket::{futures::TryStreamExt, http::Status};
use serde::{Deserialize, Serialize};
use team_draft::Entrant;

use crate::{
    error::{Error, Result},
    model::mongodb::{inserted_id, is_duplicate_key_error, Coll, Id},
};

/// Core candidate data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    /// Unique display name.
    pub name: String,
    /// Only active candidates are rated and drafted.
    pub active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl CandidateCore {
    /// Create a new, active candidate.
    pub fn new(name: String) -> Self {
        Self {
            name,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

impl Entrant for Candidate {
    type Id = Id;

    fn id(&self) -> Id {
        self.id
    }

    fn name(&self) -> &str {
        &self.candidate.name
    }
}

impl Candidate {
    /// Insert a new active candidate, relying on the unique name index to
    /// reject duplicates.
    pub async fn register(candidates: &Coll<NewCandidate>, name: &str) -> Result<Id> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Status(
                Status::BadRequest,
                "Candidate name must not be blank".to_string(),
            ));
        }

        let candidate = NewCandidate::new(name.to_string());
        match candidates.insert_one(&candidate, None).await {
            Ok(result) => inserted_id(&result),
            Err(err) if is_duplicate_key_error(&err) => Err(Error::DuplicateName(candidate.name)),
            Err(err) => Err(err.into()),
        }
    }

    /// All active candidates, ordered by name.
    pub async fn active(candidates: &Coll<Candidate>) -> Result<Vec<Candidate>> {
        let by_name = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let active: Vec<Candidate> = candidates
            .find(doc! { "active": true }, by_name)
            .await?
            .try_collect()
            .await?;
        Ok(active)
    }

    /// Look up a candidate by ID, whether active or not.
    pub async fn find(candidates: &Coll<Candidate>, id: Id) -> Result<Candidate> {
        candidates
            .find_one(id.as_doc(), None)
            .await?
            .ok_or_else(|| Error::not_found(format!("Candidate {id}")))
    }

    /// Look up an active candidate by ID; inactive candidates count as missing.
    pub async fn find_active(candidates: &Coll<Candidate>, id: Id) -> Result<Candidate> {
        let filter = doc! {
            "_id": id,
            "active": true,
        };
        candidates
            .find_one(filter, None)
            .await?
            .ok_or_else(|| Error::not_found(format!("Active candidate {id}")))
    }

    /// Activate or deactivate a candidate. Their ratings are kept either way.
    pub async fn set_active(candidates: &Coll<Candidate>, id: Id, active: bool) -> Result<()> {
        let result = candidates
            .update_one(id.as_doc(), doc! { "$set": { "active": active } }, None)
            .await?;
        if result.matched_count == 0 {
            Err(Error::not_found(format!("Candidate {id}")))
        } else {
            Ok(())
        }
    }

    /// Number of active candidates.
    pub async fn count_active(candidates: &Coll<Candidate>) -> Result<u64> {
        Ok(candidates
            .count_documents(doc! { "active": true }, None)
            .await?)
    }
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    /// Names for a full squad of example candidates.
    pub const SQUAD: [&str; 8] = [
        "Careca", "Eder", "Falcao", "Junior", "Leandro", "Oscar", "Socrates", "Zico",
    ];
}

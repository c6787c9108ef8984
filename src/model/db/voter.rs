use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::{
        auth::Rights,
        mongodb::{inserted_id, is_duplicate_key_error, Coll, Id},
    },
};

/// Core voter data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    /// Unique sign-in handle.
    pub handle: String,
    pub display_name: String,
    /// Elevated voters manage candidates and see the final draft.
    pub elevated: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl VoterCore {
    /// Create a new voter, registered now.
    pub fn new(handle: String, display_name: String, elevated: bool) -> Self {
        Self {
            handle,
            display_name,
            elevated,
            created_at: Utc::now(),
        }
    }

    pub fn rights(&self) -> Rights {
        Rights::of(self.elevated)
    }
}

/// A voter without an ID.
pub type NewVoter = VoterCore;

/// A voter from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

impl DerefMut for Voter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.voter
    }
}

impl Voter {
    /// Insert a new voter, relying on the unique handle index to reject
    /// duplicates.
    pub async fn register(voters: &Coll<NewVoter>, voter: NewVoter) -> Result<Id> {
        let handle = voter.handle.trim();
        if handle.is_empty() {
            return Err(Error::Status(
                Status::BadRequest,
                "Voter handle must not be blank".to_string(),
            ));
        }
        let voter = NewVoter {
            handle: handle.to_string(),
            ..voter
        };

        match voters.insert_one(&voter, None).await {
            Ok(result) => inserted_id(&result),
            Err(err) if is_duplicate_key_error(&err) => Err(Error::DuplicateHandle(voter.handle)),
            Err(err) => Err(err.into()),
        }
    }

    /// Number of voters who are not elevated.
    pub async fn count_standard(voters: &Coll<Voter>) -> Result<u64> {
        Ok(voters
            .count_documents(doc! { "elevated": false }, None)
            .await?)
    }
}

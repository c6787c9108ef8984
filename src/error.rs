use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use log::{error, warn};
use mongodb::{bson::de::Error as BsonError, error::Error as DbError};
use rocket::{http::Status, response::Responder, Request};
use team_draft::InvalidScore;
use thiserror::Error;

use crate::model::mongodb::Id;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Bson(#[from] BsonError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),
    #[error("Voter {voter} has already rated candidate {candidate}")]
    DuplicateVote { voter: Id, candidate: Id },
    #[error("Candidate name already in use: {0}")]
    DuplicateName(String),
    #[error("Voter handle already in use: {0}")]
    DuplicateHandle(String),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: String) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::Bson(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::InvalidScore(_) => Status::UnprocessableEntity,
            Self::DuplicateVote { .. } | Self::DuplicateName(_) | Self::DuplicateHandle(_) => {
                Status::Conflict
            }
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.class().is_server_error() {
            error!("{} {}: {self}", req.method(), req.uri());
        } else {
            warn!("{} {}: {self}", req.method(), req.uri());
        }
        Err(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_are_client_errors() {
        let id = Id::new();
        let errors = [
            Error::InvalidScore(InvalidScore(11)),
            Error::DuplicateVote {
                voter: id,
                candidate: id,
            },
            Error::DuplicateName("Zico".to_string()),
            Error::DuplicateHandle("zico10".to_string()),
        ];
        for err in errors {
            assert!(err.status().class().is_client_error(), "{err}");
        }
    }

    #[test]
    fn status_kinds() {
        assert_eq!(
            Error::InvalidScore(InvalidScore(-1)).status(),
            Status::UnprocessableEntity
        );
        assert_eq!(
            Error::DuplicateName("Zico".to_string()).status(),
            Status::Conflict
        );
        assert_eq!(
            Error::not_found("Candidate 1".to_string()).status(),
            Status::NotFound
        );
        assert_eq!(
            Error::not_found("Candidate 1".to_string()).to_string(),
            "Candidate 1 not found"
        );
        let expired: JwtError = JwtErrorKind::ExpiredSignature.into();
        assert_eq!(Error::Jwt(expired).status(), Status::Unauthorized);
    }
}

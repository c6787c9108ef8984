use serde::{Deserialize, Serialize};
use team_draft::{Ranked, Team};

use crate::model::{api::id::ApiId, mongodb::Id};

/// Who the teams are being computed for.
///
/// Both views are built the same way; the mode records which gate the caller
/// passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamsMode {
    /// For a standard voter who has completed today's ratings.
    Partial,
    /// For an elevated voter, at any time.
    Final,
}

/// The full draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamListing {
    pub mode: TeamsMode,
    pub teams: Vec<Team<ApiId>>,
}

impl TeamListing {
    pub fn new(mode: TeamsMode, teams: Vec<Team<Id>>) -> Self {
        let teams = teams
            .into_iter()
            .map(|team| Team {
                members: team
                    .members
                    .into_iter()
                    .map(|member| Ranked {
                        id: member.id.into(),
                        name: member.name,
                        mean_score: member.mean_score,
                    })
                    .collect(),
                mean_score: team.mean_score,
            })
            .collect();
        Self { mode, teams }
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::{serde_json, Value};

    use super::*;

    #[test]
    fn mode_is_lowercase() {
        let listing = TeamListing::new(TeamsMode::Partial, vec![]);
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["mode"], "partial");
        assert_eq!(
            serde_json::to_value(TeamsMode::Final).unwrap(),
            Value::from("final")
        );
    }

    #[test]
    fn ids_become_strings() {
        let id = Id::new();
        let team = Team {
            members: vec![Ranked {
                id,
                name: "Zico".to_string(),
                mean_score: 9.5,
            }],
            mean_score: 9.5,
        };
        let listing = TeamListing::new(TeamsMode::Final, vec![team]);
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["teams"][0]["members"][0]["id"], id.to_string());
        assert_eq!(json["teams"][0]["mean_score"], 9.5);
    }
}

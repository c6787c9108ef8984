//! Serpentine team allocation.
//!
//! Candidates are ranked by mean score (highest first, ties broken by name)
//! and dealt to teams in passes. Even passes deal left to right, odd passes
//! right to left, so each team alternately draws from the strong and weak end
//! of what is left. Candidates beyond the last full pass are dealt round-robin
//! from team 0.

use std::cmp::Ordering;

use log::debug;
use serde::{Deserialize, Serialize};

/// Number of teams the draft produces.
pub const TEAM_COUNT: usize = 4;

/// A candidate together with its mean score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked<K> {
    pub id: K,
    pub name: String,
    pub mean_score: f64,
}

/// One team of the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team<K> {
    pub members: Vec<Ranked<K>>,
    /// Mean of the members' mean scores; `0.0` for an empty team.
    pub mean_score: f64,
}

impl<K> Team<K> {
    fn from_members(members: Vec<Ranked<K>>) -> Self {
        let mean_score = if members.is_empty() {
            0.0
        } else {
            members.iter().map(|m| m.mean_score).sum::<f64>() / members.len() as f64
        };
        Self {
            members,
            mean_score,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Ranking order: mean score descending, then name ascending, then id.
fn rank_order<K: Ord>(a: &Ranked<K>, b: &Ranked<K>) -> Ordering {
    b.mean_score
        .total_cmp(&a.mean_score)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// The team that the candidate at `index` in the ranking is dealt to.
fn team_for(index: usize, candidate_count: usize, team_count: usize) -> usize {
    let full_passes_end = candidate_count - candidate_count % team_count;
    let position = index % team_count;
    if index >= full_passes_end {
        return position;
    }
    if (index / team_count) % 2 == 0 {
        position
    } else {
        team_count - 1 - position
    }
}

/// Split `candidates` into `team_count` balanced teams.
///
/// Every candidate lands in exactly one team, team sizes differ by at most
/// one, and identical input always produces identical output. An empty input
/// yields `team_count` empty teams.
///
/// `team_count` must be greater than zero.
pub fn allocate<K>(candidates: &[Ranked<K>], team_count: usize) -> Vec<Team<K>>
where
    K: Clone + Ord,
{
    let mut ranked = candidates.to_vec();
    ranked.sort_by(rank_order);

    let count = ranked.len();
    let mut members: Vec<Vec<Ranked<K>>> = (0..team_count).map(|_| Vec::new()).collect();
    for (index, candidate) in ranked.into_iter().enumerate() {
        members[team_for(index, count, team_count)].push(candidate);
    }

    let teams: Vec<Team<K>> = members.into_iter().map(Team::from_members).collect();
    debug!(
        "Allocated {count} candidates into {team_count} teams with means {:?}",
        teams.iter().map(|t| t.mean_score).collect::<Vec<_>>()
    );
    teams
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn ranked(scores: &[f64]) -> Vec<Ranked<usize>> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &mean_score)| Ranked {
                id: i,
                name: format!("{}", (b'A' + i as u8) as char),
                mean_score,
            })
            .collect()
    }

    fn names<K>(team: &Team<K>) -> Vec<&str> {
        team.members.iter().map(|m| m.name.as_str()).collect()
    }

    fn spread<K>(teams: &[Team<K>]) -> f64 {
        let max = teams.iter().map(|t| t.mean_score).fold(f64::MIN, f64::max);
        let min = teams.iter().map(|t| t.mean_score).fold(f64::MAX, f64::min);
        max - min
    }

    #[test]
    fn two_full_passes_snake() {
        let candidates = ranked(&[10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0]);
        let teams = allocate(&candidates, TEAM_COUNT);

        assert_eq!(teams.len(), 4);
        assert_eq!(names(&teams[0]), ["A", "H"]);
        assert_eq!(names(&teams[1]), ["B", "G"]);
        assert_eq!(names(&teams[2]), ["C", "F"]);
        assert_eq!(names(&teams[3]), ["D", "E"]);
        for team in &teams {
            assert_eq!(team.len(), 2);
            assert!((team.mean_score - 6.5).abs() < 1e-12);
        }

        // Compare against slicing the ranking into consecutive chunks.
        let chunked: Vec<Team<usize>> = candidates
            .chunks(2)
            .map(|chunk| Team::from_members(chunk.to_vec()))
            .collect();
        assert!(spread(&chunked) > 5.0);
        assert!(spread(&teams) < 1e-9);
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut candidates = ranked(&[3.0, 10.0, 6.0, 8.0, 4.0, 9.0, 5.0, 7.0]);
        let teams = allocate(&candidates, TEAM_COUNT);
        candidates.reverse();
        assert_eq!(allocate(&candidates, TEAM_COUNT), teams);
        assert_eq!(teams[0].members[0].mean_score, 10.0);
        assert_eq!(teams[0].members[1].mean_score, 3.0);
    }

    #[test]
    fn empty_pool_gives_empty_teams() {
        let teams = allocate::<usize>(&[], TEAM_COUNT);
        assert_eq!(teams.len(), 4);
        for team in teams {
            assert!(team.is_empty());
            assert_eq!(team.mean_score, 0.0);
        }
    }

    #[test]
    fn leftovers_go_round_robin_from_team_zero() {
        let scores: Vec<f64> = (0..25).map(|i| (25 - i) as f64 / 2.5).collect();
        let candidates = ranked(&scores);
        let teams = allocate(&candidates, TEAM_COUNT);

        let sizes: Vec<usize> = teams.iter().map(Team::len).collect();
        assert_eq!(sizes, [7, 6, 6, 6]);

        let mut seen = HashSet::new();
        for team in &teams {
            for member in &team.members {
                assert!(seen.insert(member.id), "{} assigned twice", member.name);
            }
        }
        assert_eq!(seen.len(), 25);

        // The lowest ranked candidate is the single leftover.
        assert_eq!(teams[0].members.last().unwrap().id, 24);
    }

    #[test]
    fn sizes_differ_by_at_most_one() {
        for count in 0..40 {
            let scores: Vec<f64> = (0..count).map(|i| (i % 11) as f64).collect();
            let candidates: Vec<Ranked<usize>> = scores
                .iter()
                .enumerate()
                .map(|(i, &mean_score)| Ranked {
                    id: i,
                    name: format!("player-{i:02}"),
                    mean_score,
                })
                .collect();
            let teams = allocate(&candidates, TEAM_COUNT);
            let max = teams.iter().map(Team::len).max().unwrap();
            let min = teams.iter().map(Team::len).min().unwrap();
            assert!(max - min <= 1, "{count} candidates: sizes {min}..{max}");
            assert_eq!(teams.iter().map(Team::len).sum::<usize>(), count);
        }
    }

    #[test]
    fn ties_break_by_name() {
        let candidates = vec![
            Ranked {
                id: 1,
                name: "Carla".to_string(),
                mean_score: 5.0,
            },
            Ranked {
                id: 2,
                name: "Bruno".to_string(),
                mean_score: 5.0,
            },
            Ranked {
                id: 3,
                name: "Alice".to_string(),
                mean_score: 5.0,
            },
        ];
        let teams = allocate(&candidates, TEAM_COUNT);
        assert_eq!(names(&teams[0]), ["Alice"]);
        assert_eq!(names(&teams[1]), ["Bruno"]);
        assert_eq!(names(&teams[2]), ["Carla"]);
        assert!(teams[3].is_empty());
    }

    #[test]
    fn odd_pass_runs_right_to_left() {
        assert_eq!(
            (0..8).map(|i| team_for(i, 8, 4)).collect::<Vec<_>>(),
            [0, 1, 2, 3, 3, 2, 1, 0]
        );
        // Six candidates: one full pass, then two leftovers dealt from team 0.
        assert_eq!(
            (0..6).map(|i| team_for(i, 6, 4)).collect::<Vec<_>>(),
            [0, 1, 2, 3, 0, 1]
        );
    }
}

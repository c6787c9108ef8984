//! The daily voting gate: which active candidates a voter still has to rate on
//! a given day, and whether they have finished.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Anything that can be rated and drafted.
pub trait Entrant {
    type Id: Copy + Eq + Hash;

    fn id(&self) -> Self::Id;
    fn name(&self) -> &str;
}

/// Active candidates not in `rated`, ordered by name so that the next
/// candidate to rate is reproducible.
pub fn remaining_for<'a, C: Entrant>(active: &'a [C], rated: &HashSet<C::Id>) -> Vec<&'a C> {
    let mut remaining: Vec<&C> = active.iter().filter(|c| !rated.contains(&c.id())).collect();
    remaining.sort_by(|a, b| a.name().cmp(b.name()));
    remaining
}

/// Has the voter rated every active candidate?
///
/// An empty pool never counts as completed.
pub fn has_completed<C: Entrant>(active: &[C], rated: &HashSet<C::Id>) -> bool {
    !active.is_empty() && active.iter().all(|c| rated.contains(&c.id()))
}

/// How far through the active pool a voter is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Active candidates rated on the day in question.
    pub rated: usize,
    /// All active candidates.
    pub total: usize,
}

impl Progress {
    pub fn of<C: Entrant>(active: &[C], rated: &HashSet<C::Id>) -> Self {
        Self {
            rated: active.iter().filter(|c| rated.contains(&c.id())).count(),
            total: active.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Player(u32, &'static str);

    impl Entrant for Player {
        type Id = u32;

        fn id(&self) -> u32 {
            self.0
        }

        fn name(&self) -> &str {
            self.1
        }
    }

    fn pool() -> Vec<Player> {
        vec![Player(1, "Zico"), Player(2, "Ana"), Player(3, "Marta")]
    }

    #[test]
    fn remaining_is_sorted_by_name() {
        let pool = pool();
        let rated = HashSet::new();
        let names: Vec<_> = remaining_for(&pool, &rated).iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Ana", "Marta", "Zico"]);
    }

    #[test]
    fn rated_candidates_are_excluded() {
        let pool = pool();
        let rated = HashSet::from([2]);
        let names: Vec<_> = remaining_for(&pool, &rated).iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Marta", "Zico"]);
        assert!(!has_completed(&pool, &rated));
        assert_eq!(Progress::of(&pool, &rated), Progress { rated: 1, total: 3 });
    }

    #[test]
    fn completed_when_everything_rated() {
        let pool = pool();
        let rated = HashSet::from([1, 2, 3]);
        assert!(remaining_for(&pool, &rated).is_empty());
        assert!(has_completed(&pool, &rated));
        assert_eq!(Progress::of(&pool, &rated), Progress { rated: 3, total: 3 });
    }

    #[test]
    fn empty_pool_is_never_completed() {
        let pool: Vec<Player> = Vec::new();
        let rated = HashSet::from([7]);
        assert!(remaining_for(&pool, &rated).is_empty());
        assert!(!has_completed(&pool, &rated));
        assert_eq!(Progress::of(&pool, &rated), Progress { rated: 0, total: 0 });
    }

    #[test]
    fn new_candidate_revokes_completion() {
        let mut pool = pool();
        let rated = HashSet::from([1, 2, 3]);
        assert!(has_completed(&pool, &rated));
        pool.push(Player(4, "Bia"));
        assert!(!has_completed(&pool, &rated));
        assert_eq!(remaining_for(&pool, &rated)[0].name(), "Bia");
    }

    #[test]
    fn ratings_for_inactive_candidates_do_not_count() {
        let pool = pool();
        let rated = HashSet::from([1, 99]);
        assert_eq!(Progress::of(&pool, &rated).rated, 1);
    }
}

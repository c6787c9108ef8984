//! The operations behind the HTTP routes.
//!
//! Each operation takes the collections it reads or writes and, where "today"
//! matters, an explicit [`VotingDay`]. Derived state (remaining candidates,
//! completion, means, teams) is recomputed from the stored ratings on every
//! call and never cached.

use std::collections::HashSet;

use log::{debug, info};
use rocket::tokio::try_join;
use team_draft::{allocate, gate, Progress, Ranked, Score, VotingDay, TEAM_COUNT};

use crate::{
    error::Result,
    model::{
        api::{
            candidate::CandidateSummary,
            dashboard::Dashboard,
            team::{TeamListing, TeamsMode},
        },
        db::{
            candidate::{Candidate, NewCandidate},
            rating::{NewRating, Rating},
            voter::{NewVoter, Voter},
        },
        mongodb::{Coll, Id},
    },
};

/// Record a voter's score for an active candidate.
///
/// The score is validated before anything is read or written.
pub async fn submit_rating(
    candidates: &Coll<Candidate>,
    ratings: &Coll<NewRating>,
    voter: Id,
    candidate: Id,
    score: i64,
    allow_revote: bool,
) -> Result<()> {
    let score = Score::new(score)?;
    let candidate = Candidate::find_active(candidates, candidate).await?;
    Rating::record(ratings, NewRating::new(voter, candidate.id, score), allow_revote).await?;
    info!("Voter {voter} rated {} ({}) {score}", candidate.name, candidate.id);
    Ok(())
}

/// Active candidates and the IDs of those the voter rated on `day`.
async fn gate_inputs(
    candidates: &Coll<Candidate>,
    ratings: &Coll<Rating>,
    voter: Id,
    day: &VotingDay,
) -> Result<(Vec<Candidate>, HashSet<Id>)> {
    try_join!(
        Candidate::active(candidates),
        Rating::rated_on(ratings, voter, day)
    )
}

/// Active candidates the voter has not rated on `day`, ordered by name.
pub async fn remaining_for(
    candidates: &Coll<Candidate>,
    ratings: &Coll<Rating>,
    voter: Id,
    day: &VotingDay,
) -> Result<Vec<Candidate>> {
    let (active, rated) = gate_inputs(candidates, ratings, voter, day).await?;
    Ok(gate::remaining_for(&active, &rated)
        .into_iter()
        .cloned()
        .collect())
}

/// The first of [`remaining_for`], if any.
pub async fn next_candidate_to_rate(
    candidates: &Coll<Candidate>,
    ratings: &Coll<Rating>,
    voter: Id,
    day: &VotingDay,
) -> Result<Option<Candidate>> {
    Ok(remaining_for(candidates, ratings, voter, day)
        .await?
        .into_iter()
        .next())
}

pub async fn voting_progress(
    candidates: &Coll<Candidate>,
    ratings: &Coll<Rating>,
    voter: Id,
    day: &VotingDay,
) -> Result<Progress> {
    let (active, rated) = gate_inputs(candidates, ratings, voter, day).await?;
    Ok(Progress::of(&active, &rated))
}

/// Has the voter rated every active candidate on `day`? Never true while the
/// pool is empty.
pub async fn has_completed_today(
    candidates: &Coll<Candidate>,
    ratings: &Coll<Rating>,
    voter: Id,
    day: &VotingDay,
) -> Result<bool> {
    let (active, rated) = gate_inputs(candidates, ratings, voter, day).await?;
    Ok(gate::has_completed(&active, &rated))
}

/// Draft all active candidates into [`TEAM_COUNT`] teams by all-time mean
/// score. Candidates nobody has rated yet count with a mean of `0.0`.
pub async fn compute_teams(
    candidates: &Coll<Candidate>,
    ratings: &Coll<Rating>,
    mode: TeamsMode,
) -> Result<TeamListing> {
    let (active, tallies) = try_join!(Candidate::active(candidates), Rating::tallies(ratings))?;
    let ranked: Vec<Ranked<Id>> = active
        .into_iter()
        .map(|candidate| Ranked {
            mean_score: tallies
                .get(&candidate.id)
                .map(|tally| tally.mean())
                .unwrap_or(0.0),
            id: candidate.id,
            name: candidate.candidate.name,
        })
        .collect();

    debug!("Computing {mode:?} teams from {} candidates", ranked.len());
    Ok(TeamListing::new(mode, allocate(&ranked, TEAM_COUNT)))
}

/// Every active candidate with their all-time statistics, ordered by name.
pub async fn list_active_candidates(
    candidates: &Coll<Candidate>,
    ratings: &Coll<Rating>,
) -> Result<Vec<CandidateSummary>> {
    let (active, mut tallies) =
        try_join!(Candidate::active(candidates), Rating::tallies(ratings))?;
    Ok(active
        .into_iter()
        .map(|candidate| {
            let tally = tallies.remove(&candidate.id).unwrap_or_default();
            CandidateSummary::new(candidate, tally)
        })
        .collect())
}

/// One candidate, active or not, with their all-time statistics.
pub async fn candidate_summary(
    candidates: &Coll<Candidate>,
    ratings: &Coll<Rating>,
    id: Id,
) -> Result<CandidateSummary> {
    let candidate = Candidate::find(candidates, id).await?;
    let tally = Rating::tally_for(ratings, id).await?;
    Ok(CandidateSummary::new(candidate, tally))
}

pub async fn register_candidate(candidates: &Coll<NewCandidate>, name: &str) -> Result<Id> {
    let id = Candidate::register(candidates, name).await?;
    info!("Registered candidate {} ({id})", name.trim());
    Ok(id)
}

pub async fn register_voter(
    voters: &Coll<NewVoter>,
    handle: String,
    display_name: String,
    elevated: bool,
) -> Result<Id> {
    let voter = NewVoter::new(handle, display_name, elevated);
    let rights = voter.rights();
    let id = Voter::register(voters, voter).await?;
    info!("Registered {rights} voter {id}");
    Ok(id)
}

/// Soft (de)activation; a deactivated candidate keeps their ratings but is
/// neither rated nor drafted.
pub async fn set_candidate_active(
    candidates: &Coll<Candidate>,
    id: Id,
    active: bool,
) -> Result<()> {
    Candidate::set_active(candidates, id, active).await?;
    info!(
        "Candidate {id} {}",
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}

pub async fn dashboard(
    candidates: &Coll<Candidate>,
    voters: &Coll<Voter>,
    ratings: &Coll<Rating>,
    day: &VotingDay,
) -> Result<Dashboard> {
    let (active_candidates, standard_voters, total_ratings, ratings_today, voters_today) =
        try_join!(
            Candidate::count_active(candidates),
            Voter::count_standard(voters),
            Rating::count(ratings),
            Rating::count_on(ratings, day),
            Rating::voters_on(ratings, day)
        )?;
    Ok(Dashboard {
        date: day.date(),
        active_candidates,
        standard_voters,
        total_ratings,
        ratings_today,
        voters_today,
    })
}

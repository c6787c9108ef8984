use rocket::{http::Status, serde::json::Json, Route, State};
use team_draft::Progress;

use crate::{
    error::{Error, Result},
    model::{
        api::{
            candidate::CandidateDesc,
            rating::RatingSpec,
            team::{TeamListing, TeamsMode},
        },
        auth::{AuthToken, Standard},
        db::{
            candidate::Candidate,
            rating::{NewRating, Rating},
        },
        draft,
        mongodb::Coll,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![
        next_candidate,
        progress,
        completed,
        submit_rating,
        partial_teams,
    ]
}

/// The next candidate to rate today, or `null` once the voter is done.
#[get("/voter/candidates/next")]
async fn next_candidate(
    token: AuthToken<Standard>,
    config: &State<Config>,
    candidates: Coll<Candidate>,
    ratings: Coll<Rating>,
) -> Result<Json<Option<CandidateDesc>>> {
    let next =
        draft::next_candidate_to_rate(&candidates, &ratings, token.id, &config.today()).await?;
    Ok(Json(next.map(CandidateDesc::from)))
}

#[get("/voter/progress")]
async fn progress(
    token: AuthToken<Standard>,
    config: &State<Config>,
    candidates: Coll<Candidate>,
    ratings: Coll<Rating>,
) -> Result<Json<Progress>> {
    let progress = draft::voting_progress(&candidates, &ratings, token.id, &config.today()).await?;
    Ok(Json(progress))
}

#[get("/voter/completed")]
async fn completed(
    token: AuthToken<Standard>,
    config: &State<Config>,
    candidates: Coll<Candidate>,
    ratings: Coll<Rating>,
) -> Result<Json<bool>> {
    let completed =
        draft::has_completed_today(&candidates, &ratings, token.id, &config.today()).await?;
    Ok(Json(completed))
}

#[post("/voter/ratings", data = "<rating>", format = "json")]
async fn submit_rating(
    token: AuthToken<Standard>,
    rating: Json<RatingSpec>,
    config: &State<Config>,
    candidates: Coll<Candidate>,
    new_ratings: Coll<NewRating>,
) -> Result<()> {
    draft::submit_rating(
        &candidates,
        &new_ratings,
        token.id,
        *rating.candidate_id,
        rating.score,
        config.allow_revote(),
    )
    .await
}

/// The teams as they stand, for voters who have rated everyone today.
#[get("/voter/teams")]
async fn partial_teams(
    token: AuthToken<Standard>,
    config: &State<Config>,
    candidates: Coll<Candidate>,
    ratings: Coll<Rating>,
) -> Result<Json<TeamListing>> {
    if !draft::has_completed_today(&candidates, &ratings, token.id, &config.today()).await? {
        return Err(Error::Status(
            Status::Forbidden,
            format!("Voter {} has not rated every candidate today", token.id),
        ));
    }
    let listing = draft::compute_teams(&candidates, &ratings, TeamsMode::Partial).await?;
    Ok(Json(listing))
}

#[cfg(test)]
mod tests {
    use mongodb::Database;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::{
        model::{
            api::id::ApiId,
            db::candidate::NewCandidate,
            mongodb::Id,
        },
        AuthCookie,
    };

    use super::*;

    async fn add_candidates(db: &Database, names: &[&str]) -> Vec<ApiId> {
        let new_candidates = Coll::<NewCandidate>::from_db(db);
        let mut ids = Vec::new();
        for name in names {
            let id = draft::register_candidate(&new_candidates, name).await.unwrap();
            ids.push(id.into());
        }
        ids
    }

    async fn rate(client: &Client, auth: &AuthCookie, candidate_id: ApiId, score: i64) -> Status {
        client
            .post(uri!(submit_rating))
            .header(ContentType::JSON)
            .cookie(auth.clone())
            .body(serde_json::to_string(&RatingSpec::example(candidate_id, score)).unwrap())
            .dispatch()
            .await
            .status()
    }

    async fn next(client: &Client, auth: &AuthCookie) -> Option<CandidateDesc> {
        let response = client
            .get(uri!(next_candidate))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        response.into_json::<Option<CandidateDesc>>().await.unwrap()
    }

    #[backend_test(voter)]
    async fn rate_everyone_then_see_teams(client: Client, db: Database, auth: AuthCookie) {
        add_candidates(&db, &["Zico", "Eder"]).await;

        // Teams are hidden until the voter is done.
        let response = client
            .get(uri!(partial_teams))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());

        let mut rated = Vec::new();
        while let Some(candidate) = next(&client, &auth).await {
            assert_eq!(Status::Ok, rate(&client, &auth, candidate.id, 8).await);
            rated.push(candidate.name);
        }
        assert_eq!(rated, vec!["Eder", "Zico"]);

        let response = client
            .get(uri!(progress))
            .cookie(auth.clone())
            .dispatch()
            .await;
        let progress = response.into_json::<Progress>().await.unwrap();
        assert_eq!(progress, Progress { rated: 2, total: 2 });

        let response = client
            .get(uri!(completed))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(response.into_json::<bool>().await, Some(true));

        let response = client
            .get(uri!(partial_teams))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let listing = response.into_json::<TeamListing>().await.unwrap();
        assert_eq!(listing.mode, TeamsMode::Partial);
        assert_eq!(listing.teams.iter().map(|t| t.len()).sum::<usize>(), 2);
    }

    #[backend_test(voter)]
    async fn bad_ratings_rejected(
        client: Client,
        db: Database,
        auth: AuthCookie,
        ratings: Coll<Rating>,
    ) {
        let ids = add_candidates(&db, &["Zico"]).await;

        assert_eq!(Status::UnprocessableEntity, rate(&client, &auth, ids[0], 11).await);
        assert_eq!(Status::UnprocessableEntity, rate(&client, &auth, ids[0], -1).await);
        assert_eq!(Status::NotFound, rate(&client, &auth, Id::new().into(), 5).await);

        assert_eq!(Status::Ok, rate(&client, &auth, ids[0], 0).await);
        assert_eq!(Status::Conflict, rate(&client, &auth, ids[0], 10).await);

        assert_eq!(Rating::count(&ratings).await.unwrap(), 1);
        assert_eq!(Rating::mean_score(&ratings, *ids[0]).await.unwrap(), 0.0);
    }

    #[backend_test(voter)]
    async fn nothing_to_rate(client: Client, auth: AuthCookie) {
        assert!(next(&client, &auth).await.is_none());

        let response = client
            .get(uri!(completed))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(response.into_json::<bool>().await, Some(false));
    }

    #[backend_test]
    async fn requires_sign_in(client: Client) {
        let response = client.get(uri!(progress)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn elevated_voters_do_not_rate(client: Client, auth: AuthCookie) {
        let response = client
            .get(uri!(next_candidate))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }
}

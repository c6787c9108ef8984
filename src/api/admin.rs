use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::{
            candidate::{CandidateSpec, CandidateSummary, Registered},
            dashboard::Dashboard,
            team::{TeamListing, TeamsMode},
        },
        auth::{AuthToken, Elevated},
        db::{
            candidate::{Candidate, NewCandidate},
            rating::Rating,
            voter::Voter,
        },
        draft,
        mongodb::{Coll, Id},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![
        get_candidates,
        get_candidate,
        create_candidate,
        activate_candidate,
        deactivate_candidate,
        final_teams,
        get_dashboard,
    ]
}

#[get("/candidates")]
async fn get_candidates(
    _token: AuthToken<Elevated>,
    candidates: Coll<Candidate>,
    ratings: Coll<Rating>,
) -> Result<Json<Vec<CandidateSummary>>> {
    let summaries = draft::list_active_candidates(&candidates, &ratings).await?;
    Ok(Json(summaries))
}

#[get("/candidates/<candidate_id>")]
async fn get_candidate(
    _token: AuthToken<Elevated>,
    candidate_id: Id,
    candidates: Coll<Candidate>,
    ratings: Coll<Rating>,
) -> Result<Json<CandidateSummary>> {
    let summary = draft::candidate_summary(&candidates, &ratings, candidate_id).await?;
    Ok(Json(summary))
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn create_candidate(
    _token: AuthToken<Elevated>,
    spec: Json<CandidateSpec>,
    new_candidates: Coll<NewCandidate>,
) -> Result<Json<Registered>> {
    let id = draft::register_candidate(&new_candidates, &spec.name).await?;
    Ok(Json(Registered { id: id.into() }))
}

#[post("/candidates/<candidate_id>/activate")]
async fn activate_candidate(
    _token: AuthToken<Elevated>,
    candidate_id: Id,
    candidates: Coll<Candidate>,
) -> Result<()> {
    draft::set_candidate_active(&candidates, candidate_id, true).await
}

#[post("/candidates/<candidate_id>/deactivate")]
async fn deactivate_candidate(
    _token: AuthToken<Elevated>,
    candidate_id: Id,
    candidates: Coll<Candidate>,
) -> Result<()> {
    draft::set_candidate_active(&candidates, candidate_id, false).await
}

#[get("/teams")]
async fn final_teams(
    _token: AuthToken<Elevated>,
    candidates: Coll<Candidate>,
    ratings: Coll<Rating>,
) -> Result<Json<TeamListing>> {
    let listing = draft::compute_teams(&candidates, &ratings, TeamsMode::Final).await?;
    Ok(Json(listing))
}

#[get("/dashboard")]
async fn get_dashboard(
    _token: AuthToken<Elevated>,
    config: &State<Config>,
    candidates: Coll<Candidate>,
    voters: Coll<Voter>,
    ratings: Coll<Rating>,
) -> Result<Json<Dashboard>> {
    let dashboard = draft::dashboard(&candidates, &voters, &ratings, &config.today()).await?;
    Ok(Json(dashboard))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::{
        model::{
            api::id::ApiId,
            db::rating::NewRating,
        },
        AuthCookie,
    };

    use super::*;

    async fn create(
        client: &Client,
        auth: &AuthCookie,
        name: &str,
    ) -> (Status, Option<Registered>) {
        let spec = CandidateSpec {
            name: name.to_string(),
        };
        let response = client
            .post(uri!(create_candidate))
            .header(ContentType::JSON)
            .cookie(auth.clone())
            .body(serde_json::to_string(&spec).unwrap())
            .dispatch()
            .await;
        (response.status(), response.into_json().await)
    }

    async fn list(client: &Client, auth: &AuthCookie) -> Vec<CandidateSummary> {
        let response = client
            .get(uri!(get_candidates))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        response.into_json().await.unwrap()
    }

    #[backend_test(admin)]
    async fn manage_candidates(client: Client, auth: AuthCookie) {
        let (status, zico) = create(&client, &auth, &CandidateSpec::example().name).await;
        assert_eq!(Status::Ok, status);
        let zico: ApiId = zico.unwrap().id;
        create(&client, &auth, "Eder").await;

        let (status, _) = create(&client, &auth, "Zico").await;
        assert_eq!(Status::Conflict, status);
        let (status, _) = create(&client, &auth, " ").await;
        assert_eq!(Status::BadRequest, status);

        let names: Vec<_> = list(&client, &auth).await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Eder", "Zico"]);

        let response = client
            .post(uri!(deactivate_candidate(*zico)))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(list(&client, &auth).await.len(), 1);

        // Still reachable directly.
        let response = client
            .get(uri!(get_candidate(*zico)))
            .cookie(auth.clone())
            .dispatch()
            .await;
        let summary: CandidateSummary = response.into_json().await.unwrap();
        assert_eq!(summary.id, zico);
        assert!(!summary.active);

        let response = client
            .post(uri!(activate_candidate(*zico)))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(list(&client, &auth).await.len(), 2);

        let response = client
            .post(uri!(activate_candidate(Id::new())))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn final_teams_at_any_time(
        client: Client,
        auth: AuthCookie,
        candidates: Coll<Candidate>,
        new_ratings: Coll<NewRating>,
    ) {
        let mut ids = Vec::new();
        for name in ["Zico", "Eder", "Falcao", "Junior", "Oscar"] {
            let (_, registered) = create(&client, &auth, name).await;
            ids.push(registered.unwrap().id);
        }
        draft::submit_rating(&candidates, &new_ratings, Id::new(), *ids[0], 10, false)
            .await
            .unwrap();

        let response = client
            .get(uri!(final_teams))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let listing: TeamListing = response.into_json().await.unwrap();
        assert_eq!(listing.mode, TeamsMode::Final);
        let sizes: Vec<_> = listing.teams.iter().map(|t| t.len()).collect();
        assert_eq!(sizes, vec![2, 1, 1, 1]);
        assert_eq!(listing.teams[0].members[0].id, ids[0]);
    }

    #[backend_test(admin)]
    async fn dashboard_counts(client: Client, auth: AuthCookie) {
        create(&client, &auth, "Zico").await;

        let response = client
            .get(uri!(get_dashboard))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let dashboard: Dashboard = response.into_json().await.unwrap();
        assert_eq!(dashboard.active_candidates, 1);
        assert_eq!(dashboard.standard_voters, 0);
        assert_eq!(dashboard.total_ratings, 0);
        assert_eq!(dashboard.voters_today, 0);
    }

    #[backend_test(voter)]
    async fn standard_voters_cannot_manage(client: Client, auth: AuthCookie) {
        let (status, _) = create(&client, &auth, "Zico").await;
        assert_eq!(Status::NotFound, status);

        let response = client
            .get(uri!(final_teams))
            .cookie(auth.clone())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }
}

use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{IdentityRequest, VoteReceipt, VoteRequest},
    auth::AuthToken,
    gateway::{Receipt, Tally},
};
use crate::orchestrator::VoteOrchestrator;

pub fn routes() -> Vec<Route> {
    routes![submit_vote, register_identity, results]
}

#[post("/api/submitVote", data = "<vote>", format = "json")]
pub async fn submit_vote(
    token: AuthToken,
    vote: Json<VoteRequest>,
    orchestrator: &State<VoteOrchestrator>,
) -> Result<Json<VoteReceipt>> {
    orchestrator
        .submit_vote(token.voter_id(), &vote.election_id, vote.candidate_index)
        .await
        .map(Json)
}

#[post("/api/register-ens", data = "<identity>", format = "json")]
pub async fn register_identity(
    token: AuthToken,
    identity: Json<IdentityRequest>,
    orchestrator: &State<VoteOrchestrator>,
) -> Result<Json<Receipt>> {
    orchestrator
        .register_identity(token.voter_id(), &identity.ens_name)
        .await
        .map(Json)
}

#[get("/api/results")]
pub async fn results(
    _token: AuthToken,
    orchestrator: &State<VoteOrchestrator>,
) -> Result<Json<Tally>> {
    orchestrator.get_results().await.map(Json)
}

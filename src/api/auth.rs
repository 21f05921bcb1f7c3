use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{Credentials, SelfView, Session},
    auth::AuthToken,
};
use crate::orchestrator::VoteOrchestrator;

pub fn routes() -> Vec<Route> {
    routes![register, login, me]
}

#[post("/api/register", data = "<credentials>", format = "json")]
pub async fn register(
    credentials: Json<Credentials>,
    orchestrator: &State<VoteOrchestrator>,
) -> Result<Json<Session>> {
    orchestrator.register(&credentials).await.map(Json)
}

#[post("/api/login", data = "<credentials>", format = "json")]
pub async fn login(
    credentials: Json<Credentials>,
    orchestrator: &State<VoteOrchestrator>,
) -> Result<Json<Session>> {
    orchestrator.login(&credentials).await.map(Json)
}

#[get("/api/me")]
pub async fn me(
    token: AuthToken,
    orchestrator: &State<VoteOrchestrator>,
) -> Result<Json<SelfView>> {
    orchestrator.get_self(token.voter_id()).await.map(Json)
}

use chrono::{DateTime, Utc};
use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

pub fn routes() -> Vec<Route> {
    routes![health]
}

/// Liveness report.
#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub ts: DateTime<Utc>,
}

#[get("/health")]
pub fn health() -> Json<Health> {
    Json(Health {
        ok: true,
        ts: Utc::now(),
    })
}

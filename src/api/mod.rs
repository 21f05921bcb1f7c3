use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::{ErrorBody, ErrorKind};

pub mod auth;
mod public;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(public::routes());
    routes.extend(auth::routes());
    routes.extend(voting::routes());
    routes
}

/// Failures raised before a handler runs (unparseable bodies, missing tokens,
/// unknown routes) get the same JSON error shape as handler failures.
pub fn catchers() -> Vec<Catcher> {
    catchers![bad_request, unauthorized, not_found, unprocessable, internal_error]
}

fn body(kind: ErrorKind, message: &str) -> (Status, Json<ErrorBody>) {
    (
        kind.status(),
        Json(ErrorBody {
            kind,
            message: message.to_string(),
        }),
    )
}

#[catch(400)]
fn bad_request() -> (Status, Json<ErrorBody>) {
    body(ErrorKind::InvalidRequest, "Malformed request")
}

#[catch(401)]
fn unauthorized() -> (Status, Json<ErrorBody>) {
    body(ErrorKind::Unauthenticated, "Authentication failed")
}

#[catch(404)]
fn not_found(req: &Request) -> (Status, Json<ErrorBody>) {
    (
        Status::NotFound,
        Json(ErrorBody {
            kind: ErrorKind::InvalidRequest,
            message: format!("No route for {} {}", req.method(), req.uri().path()),
        }),
    )
}

#[catch(422)]
fn unprocessable() -> (Status, Json<ErrorBody>) {
    body(ErrorKind::InvalidRequest, "Request body has missing or invalid fields")
}

#[catch(500)]
fn internal_error() -> (Status, Json<ErrorBody>) {
    body(ErrorKind::Internal, "Internal server error")
}

#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing, OrchestratorFairing};
use crate::logging::LoggerFairing;
use crate::orchestrator::VoteOrchestrator;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod orchestrator;

/// The production server: configuration, database and remote services are
/// all loaded during ignition.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(OrchestratorFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// A server around an already-assembled orchestrator.
pub fn rocket_for_orchestrator(orchestrator: VoteOrchestrator) -> Rocket<Build> {
    let tokens = orchestrator.tokens().clone();
    rocket::build()
        .attach(LoggerFairing)
        .manage(tokens)
        .manage(orchestrator)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

#[cfg(test)]
pub(crate) use test_fixtures::{Fixtures, VoterSession};

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use log::{error, info};
use mongodb::{Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    auth::TokenService,
    gateway::{HttpServices, ServiceUrls},
    mongodb::ensure_indexes_exist,
    storage::{MongoVoteLedger, MongoVoterDirectory},
    wallet::KeyCustody,
};
use crate::orchestrator::{IdentityCheckPolicy, VoteOrchestrator};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    blockchain_service_url: String,
    encryption_service_url: String,
    results_service_url: String,
    service_timeout_ms: u64,
    #[serde(default)]
    identity_check: IdentityCheckPolicy,
    // secrets
    jwt_secret: String,
    wallet_master_key: String,
}

impl Config {
    /// Valid lifetime of session tokens in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Base URLs of the remote services.
    pub fn service_urls(&self) -> ServiceUrls {
        ServiceUrls {
            blockchain: self.blockchain_service_url.clone(),
            encryption: self.encryption_service_url.clone(),
            results: self.results_service_url.clone(),
        }
    }

    /// Upper bound on any single remote call.
    pub fn service_timeout(&self) -> StdDuration {
        StdDuration::from_millis(self.service_timeout_ms)
    }

    /// Whether a vote may proceed when the identity check reaches no verdict.
    pub fn identity_check(&self) -> IdentityCheckPolicy {
        self.identity_check
    }

    /// Secret key used to sign session tokens.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Hex-encoded AES-256 key sealing every wallet secret.
    pub fn wallet_master_key(&self) -> &str {
        &self.wallet_master_key
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
}

/// Name of the database holding voters and votes.
const DATABASE_NAME: &str = "ballot_gateway";

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(DATABASE_NAME);

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to connect to database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// A fairing that assembles the vote orchestrator from the loaded config and
/// database, and places it and the token service into managed state.
///
/// Must be attached after [`ConfigFairing`] and [`DatabaseFairing`].
pub struct OrchestratorFairing;

#[rocket::async_trait]
impl Fairing for OrchestratorFairing {
    fn info(&self) -> Info {
        Info {
            name: "Vote orchestrator",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let (Some(config), Some(db)) = (rocket.state::<Config>(), rocket.state::<Database>())
        else {
            error!("Vote orchestrator requires the config and database to be loaded first");
            return Err(rocket);
        };

        // A missing or weak master key is fatal: no wallet could be opened.
        let custody = match KeyCustody::from_hex(config.wallet_master_key()) {
            Ok(custody) => custody,
            Err(e) => {
                error!("Refusing to start with the configured wallet master key: {e}");
                return Err(rocket);
            }
        };

        let services = match HttpServices::new(config.service_urls(), config.service_timeout()) {
            Ok(services) => services,
            Err(e) => {
                error!("Failed to build the remote service client: {e}");
                return Err(rocket);
            }
        };

        let tokens = TokenService::new(config.jwt_secret(), config.auth_ttl());
        let orchestrator = VoteOrchestrator::new(
            Arc::new(MongoVoterDirectory::from_db(db)),
            Arc::new(MongoVoteLedger::from_db(db)),
            Arc::new(services),
            custody,
            tokens.clone(),
        )
        .with_identity_check(config.identity_check())
        .with_service_timeout(config.service_timeout());
        info!(
            "Vote orchestrator ready, identity check is {:?}",
            config.identity_check()
        );

        Ok(rocket.manage(tokens).manage(orchestrator))
    }
}

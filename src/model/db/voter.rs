use argon2::Config as Argon2Config;
use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::wallet::{KeyCustody, WalletKey};

/// A registered voter, as stored in the voter directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    /// Voter unique ID: the email they registered with.
    #[serde(rename = "_id")]
    pub id: String,
    /// Argon2 encoded hash of the voter's password.
    pub password_hash: String,
    /// Public wallet address, fixed at registration.
    pub wallet_address: String,
    /// The wallet's secret key, sealed under the master key.
    pub wallet_key_sealed: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub registered_at: DateTime<Utc>,
}

impl Voter {
    /// Create a new voter with a freshly generated wallet.
    ///
    /// The password is hashed and the wallet secret sealed before either is
    /// stored in the returned record.
    pub fn register(email: &str, password: &str, custody: &KeyCustody) -> Result<Self> {
        let wallet = WalletKey::generate();
        let wallet_key_sealed = custody.seal(&wallet.secret())?;

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(password.as_bytes(), &salt, &Argon2Config::default())
                .map_err(|e| Error::CryptoFailure(e.to_string()))?;

        Ok(Self {
            id: email.to_string(),
            password_hash,
            wallet_address: wallet.address(),
            wallet_key_sealed,
            registered_at: Utc::now(),
        })
    }

    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

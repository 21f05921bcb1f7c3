use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Email and password, as submitted to register or log in. Never stored.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Check the credentials are acceptable for a new registration.
    pub fn validate_for_registration(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(Error::invalid_request("email and password are required"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(Error::invalid_request(format!(
                "'{email}' is not an email address"
            ))),
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;
    use crate::model::db::Voter;

    impl Credentials {
        pub fn example() -> Self {
            Self {
                email: Voter::EXAMPLE_EMAIL.to_string(),
                password: Voter::EXAMPLE_PASSWORD.to_string(),
            }
        }

        pub fn wrong_password() -> Self {
            Self {
                email: Voter::EXAMPLE_EMAIL.to_string(),
                password: "not the password".to_string(),
            }
        }
    }
}

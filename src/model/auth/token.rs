use chrono::{serde::ts_seconds, DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scheme prefix of the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Token claims: the voter the token was issued to, plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "sub")]
    voter_id: String,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

/// Issues and validates signed, stateless session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Valid lifetime of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for the given voter, valid from now.
    pub fn issue(&self, voter_id: &str) -> Result<String> {
        self.issue_at(voter_id, Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`.
    pub fn issue_at(&self, voter_id: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            voter_id: voter_id.to_string(),
            expire_at: issued_at + self.ttl,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::CryptoFailure(format!("token signing failed: {e}")))
    }

    /// Check the signature and expiry of a token, returning the voter it was issued to.
    pub fn validate(&self, token: &str) -> Result<String> {
        jsonwebtoken::decode(token, &self.decoding, &self.validation)
            .map(|data: TokenData<Claims>| data.claims.voter_id)
            .map_err(|e| Error::unauthenticated(format!("rejected token: {e}")))
    }
}

/// A validated bearer token, identifying the voter making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    voter_id: String,
}

impl AuthToken {
    pub fn voter_id(&self) -> &str {
        &self.voter_id
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Read `Authorization: Bearer <token>` and validate it.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Outcome::Success(tokens) = req.guard::<&State<TokenService>>().await else {
            return Outcome::Failure((
                Status::InternalServerError,
                Error::CryptoFailure("token service is not managed".to_string()),
            ));
        };

        let token = match req
            .headers()
            .get_one("Authorization")
            .and_then(|header| header.strip_prefix(BEARER_PREFIX))
        {
            Some(token) => token,
            None => {
                return Outcome::Failure((
                    Status::Unauthorized,
                    Error::unauthenticated("missing bearer token"),
                ))
            }
        };

        match tokens.validate(token) {
            Ok(voter_id) => Outcome::Success(AuthToken { voter_id }),
            Err(e) => Outcome::Failure((Status::Unauthorized, e)),
        }
    }
}

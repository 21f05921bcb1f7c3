use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use rocket::serde::json::{serde_json, Value};
use serde::de::DeserializeOwned;

use super::{
    wire::{
        DecryptResultsRequest, EncryptVoteRequest, RegisterIdentityRequest, SubmitVoteRequest,
    },
    ElectionServices, EncryptedResults, EncryptedVote, GatewayError, GatewayResult,
    IdentityStatus, Receipt, Tally,
};

/// Base URLs of the remote services.
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    /// Ledger service: identity lookup/registration, vote submission, encrypted results.
    pub blockchain: String,
    /// Vote encryption service.
    pub encryption: String,
    /// Results decryption/tally service.
    pub results: String,
}

/// [`ElectionServices`] over HTTP+JSON.
#[derive(Clone)]
pub struct HttpServices {
    client: Client,
    urls: ServiceUrls,
}

impl HttpServices {
    /// Create a client whose every request is bounded by `timeout`.
    pub fn new(urls: ServiceUrls, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { client, urls })
    }

    /// Send a request, requiring a success status and a body of type `T`.
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> GatewayResult<T> {
        Self::accepted(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Send a request whose response is passed on uninterpreted.
    ///
    /// Any success status counts, whatever the body: the service has already
    /// acted on the request.
    async fn send_opaque(request: RequestBuilder) -> GatewayResult<Value> {
        let body = Self::accepted(request).await?.text().await?;
        Ok(opaque(&body))
    }

    async fn accepted(request: RequestBuilder) -> GatewayResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

/// JSON when the body parses as JSON, the raw text otherwise, and `null`
/// when there is no body at all.
fn opaque(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Join a base URL and an endpoint path.
fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[rocket::async_trait]
impl ElectionServices for HttpServices {
    async fn verify_identity(&self, wallet_address: &str) -> GatewayResult<IdentityStatus> {
        let url = endpoint(&self.urls.blockchain, "getENSVoter");
        Self::send(self.client.get(url).query(&[("address", wallet_address)])).await
    }

    async fn encrypt_vote(
        &self,
        candidate_index: u32,
        election_id: &str,
    ) -> GatewayResult<EncryptedVote> {
        let url = endpoint(&self.urls.encryption, "encryptVote");
        let body = EncryptVoteRequest {
            candidate_index,
            election_id,
        };
        Self::send(self.client.post(url).json(&body)).await
    }

    async fn submit_vote(
        &self,
        wallet_address: &str,
        encrypted_vote: &str,
        election_id: &str,
    ) -> GatewayResult<Receipt> {
        let url = endpoint(&self.urls.blockchain, "submitVote");
        let body = SubmitVoteRequest {
            election_id,
            encrypted_vote,
            wallet_address,
        };
        Self::send_opaque(self.client.post(url).json(&body)).await
    }

    async fn register_identity_with_key(
        &self,
        name: &str,
        private_key_hex: &str,
    ) -> GatewayResult<Receipt> {
        let url = endpoint(&self.urls.blockchain, "registerENSWithPK");
        let body = RegisterIdentityRequest {
            ens_name: name,
            private_key: private_key_hex,
        };
        Self::send_opaque(self.client.post(url).json(&body)).await
    }

    async fn fetch_encrypted_results(&self) -> GatewayResult<EncryptedResults> {
        let url = endpoint(&self.urls.blockchain, "getEncryptedResults");
        Self::send(self.client.get(url)).await
    }

    async fn decrypt_results(&self, encrypted_results: &[String]) -> GatewayResult<Tally> {
        let url = endpoint(&self.urls.results, "decryptResults");
        let body = DecryptResultsRequest { encrypted_results };
        Self::send_opaque(self.client.post(url).json(&body)).await
    }
}

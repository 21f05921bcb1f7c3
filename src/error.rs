use log::{debug, error};
use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::Responder,
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::request_id;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure an inbound call can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("A voter is already registered with email '{0}'")]
    VoterAlreadyRegistered(String),
    #[error("Unknown voter '{0}'")]
    UnknownVoter(String),
    #[error("Voter has already voted in election '{0}'")]
    AlreadyVoted(String),
    #[error("Wallet identity is not verified")]
    IdentityNotVerified,
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),
    #[error("Vote encryption unavailable: {0}")]
    EncryptionUnavailable(String),
    #[error("Ledger submission failed: {0}")]
    LedgerSubmissionFailed(String),
    #[error("Identity registration failed: {0}")]
    IdentityRegistrationFailed(String),
    #[error("Results unavailable: {0}")]
    ResultsUnavailable(String),
    #[error("Cryptographic failure: {0}")]
    CryptoFailure(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Machine-readable error classification, sent to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Unauthenticated,
    InvalidRequest,
    VoterAlreadyRegistered,
    UnknownVoter,
    AlreadyVoted,
    IdentityNotVerified,
    WalletUnavailable,
    EncryptionUnavailable,
    LedgerSubmissionFailed,
    IdentityRegistrationFailed,
    ResultsUnavailable,
    CryptoFailure,
    StorageUnavailable,
    /// Failures outside any handler, such as a panic.
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> Status {
        match self {
            Self::Unauthenticated | Self::UnknownVoter => Status::Unauthorized,
            Self::InvalidRequest => Status::BadRequest,
            Self::VoterAlreadyRegistered | Self::AlreadyVoted => Status::Conflict,
            Self::IdentityNotVerified => Status::PreconditionFailed,
            Self::EncryptionUnavailable
            | Self::LedgerSubmissionFailed
            | Self::IdentityRegistrationFailed
            | Self::ResultsUnavailable => Status::BadGateway,
            Self::WalletUnavailable
            | Self::CryptoFailure
            | Self::StorageUnavailable
            | Self::Internal => Status::InternalServerError,
        }
    }
}

impl Error {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::VoterAlreadyRegistered(_) => ErrorKind::VoterAlreadyRegistered,
            Self::UnknownVoter(_) => ErrorKind::UnknownVoter,
            Self::AlreadyVoted(_) => ErrorKind::AlreadyVoted,
            Self::IdentityNotVerified => ErrorKind::IdentityNotVerified,
            Self::WalletUnavailable(_) => ErrorKind::WalletUnavailable,
            Self::EncryptionUnavailable(_) => ErrorKind::EncryptionUnavailable,
            Self::LedgerSubmissionFailed(_) => ErrorKind::LedgerSubmissionFailed,
            Self::IdentityRegistrationFailed(_) => ErrorKind::IdentityRegistrationFailed,
            Self::ResultsUnavailable(_) => ErrorKind::ResultsUnavailable,
            Self::CryptoFailure(_) => ErrorKind::CryptoFailure,
            Self::Db(_) => ErrorKind::StorageUnavailable,
        }
    }

    /// The message shown to callers.
    ///
    /// Internal failures get a fixed message so that no key material, driver
    /// output or internal identifiers reach the response body.
    pub fn safe_message(&self) -> String {
        match self {
            Self::WalletUnavailable(_) => "The voter's wallet could not be unlocked".to_string(),
            Self::CryptoFailure(_) => "Internal cryptographic failure".to_string(),
            Self::Db(_) => "Storage is temporarily unavailable".to_string(),
            Self::Unauthenticated(_) => "Authentication failed".to_string(),
            Self::UnknownVoter(_) => "The authenticated voter is not registered".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error body returned for every failed inbound call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.safe_message(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let kind = self.kind();
        let id = request_id(req);
        match kind.status().class() {
            rocket::http::StatusClass::ServerError => error!("req{id}: {self}"),
            _ => debug!("req{id}: {self}"),
        }
        (kind.status(), Json(ErrorBody::from(&self))).respond_to(req)
    }
}

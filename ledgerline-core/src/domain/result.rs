//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every variant is terminal for the invocation that produced it. The
/// display strings are what callers of `invoke` see.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Incorrect number of arguments. Expecting {expected}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("Expecting integer value for asset holding: {0:?}")]
    InvalidAmount(String),

    #[error("Failed to get state for {key}")]
    LookupFailed { key: String, reason: String },

    #[error("Nil amount for {0}")]
    AccountNotFound(String),

    #[error("Failed to put state for {key}")]
    WriteFailed { key: String, reason: String },

    #[error("Failed to delete state for {key}")]
    DeleteFailed { key: String, reason: String },

    #[error("Stored balance for {key} is not an integer: {value:?}")]
    CorruptBalance { key: String, value: String },

    #[error("Balance of {0} would overflow")]
    BalanceOverflow(String),

    #[error("Couldn't retrieve caller certificate")]
    CertificateUnavailable,

    #[error("Couldn't parse certificate: {0}")]
    CertificateParse(String),

    #[error("Error retrieving peer address")]
    PeerAddressUnavailable,

    #[error("Error calling ecert API: {0}")]
    RegistrarCall(String),

    #[error("Could not read body: {0}")]
    BodyRead(String),

    #[error("Could not retrieve ecert for user: {user}")]
    CertificateDecode { user: String, reason: String },

    #[error("Could not decode certificate: {0}")]
    Decode(String),

    #[error("Malformed common name {common_name:?}: {reason}")]
    MalformedCommonName { common_name: String, reason: String },

    #[error("Could not encode response: {0}")]
    Encode(String),

    #[error("Received unknown function invocation: {0}")]
    UnknownOperation(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Check the number of positional arguments
    pub fn check_args(args: &[String], expected: usize) -> Result<()> {
        if args.len() != expected {
            return Err(Self::ArgumentCount {
                expected,
                got: args.len(),
            });
        }
        Ok(())
    }

    /// Stable name of the variant, free of keys, values and usernames
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArgumentCount { .. } => "argument_count",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::LookupFailed { .. } => "lookup_failed",
            Self::AccountNotFound(_) => "account_not_found",
            Self::WriteFailed { .. } => "write_failed",
            Self::DeleteFailed { .. } => "delete_failed",
            Self::CorruptBalance { .. } => "corrupt_balance",
            Self::BalanceOverflow(_) => "balance_overflow",
            Self::CertificateUnavailable => "certificate_unavailable",
            Self::CertificateParse(_) => "certificate_parse",
            Self::PeerAddressUnavailable => "peer_address_unavailable",
            Self::RegistrarCall(_) => "registrar_call",
            Self::BodyRead(_) => "body_read",
            Self::CertificateDecode { .. } => "certificate_decode",
            Self::Decode(_) => "decode",
            Self::MalformedCommonName { .. } => "malformed_common_name",
            Self::Encode(_) => "encode",
            Self::UnknownOperation(_) => "unknown_operation",
            Self::Store(_) => "store",
        }
    }

    /// Render as the small `{"Error": "..."}` object query callers expect
    pub fn to_json(&self) -> String {
        serde_json::json!({ "Error": self.to_string() }).to_string()
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

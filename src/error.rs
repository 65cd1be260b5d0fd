//! Error types for the trader

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the trader
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // RPC errors
    #[error("RPC error: {0}")]
    Rpc(String),

    // Transport errors
    #[error("Stream connection failed: {0}")]
    StreamConnection(String),

    #[error("Stream closed: {0}")]
    StreamClosed(String),

    #[error("Stream decode error: {0}")]
    StreamDecode(String),

    // Pump.fun protocol errors
    #[error("Bonding curve decode failed: {0}")]
    BondingCurveDecode(String),

    #[error("Bonding curve not found for mint {0}")]
    BondingCurveNotFound(String),

    #[error("Price calculation overflow")]
    PriceOverflow,

    // Trading errors
    #[error("Transaction send failed: {0}")]
    TransactionSend(String),

    #[error("Insufficient balance: {available}SOL available, {required}SOL required")]
    InsufficientBalance { available: f64, required: f64 },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Rpc(_) | Error::TransactionSend(_) | Error::StreamConnection(_)
        )
    }

    /// Check if this error belongs to the streaming connection.
    ///
    /// Transport faults end the session and go through the reconnect path;
    /// every other fault is contained inside the trade cycle that raised it.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::StreamConnection(_) | Error::StreamClosed(_)
        )
    }
}

// Conversion from solana_client errors
impl From<solana_client::client_error::ClientError> for Error {
    fn from(e: solana_client::client_error::ClientError) -> Self {
        Error::Rpc(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the workflow layer.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Wallet(WalletError),

    #[error(transparent)]
    Network(NetworkError),

    #[error(transparent)]
    Transaction(TransactionError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

impl From<TransactionError> for CoreError {
    fn from(e: TransactionError) -> Self {
        CoreError::Transaction(e)
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn missing(field: &str) -> Self {
        ConfigError::MissingField {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Signing key errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid private key format: expected hex string")]
    InvalidKeyFormat,

    #[error("Private key has wrong length: expected 64 hex chars, got {length}")]
    InvalidKeyLength { length: usize },
}

/// RPC and query errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("RPC request to {endpoint} failed: {reason}")]
    Rpc { endpoint: String, reason: String },

    #[error("Balance query failed: {reason}")]
    BalanceQuery { reason: String },
}

/// Transaction submission and confirmation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction submission failed: {reason}")]
    Submit { reason: String },

    #[error("Transaction {hash} reverted")]
    Reverted { hash: String },

    #[error("Transaction {hash} was not confirmed")]
    Timeout { hash: String },

    #[error("Waiting for transaction {hash} failed: {reason}")]
    Receipt { hash: String, reason: String },
}

//! Custom error types for the application.
//!
//! Provides structured error handling with meaningful error messages
//! and proper error categorization for each domain:
//!
//! - [`WalletError`] - EIP-1193 provider and JSON-RPC request errors
//! - [`SessionError`] - Session operations (connect, refresh, toggle)
//! - [`ConfigError`] - Startup configuration errors

use thiserror::Error;

/// Wallet-related errors for MetaMask/EIP-1193 integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Browser window not available
    #[error("Browser window not available")]
    NoWindow,
    /// MetaMask or compatible wallet not installed
    #[error("MetaMask not installed. Please install MetaMask extension.")]
    NotInstalled,
    /// Failed to create request object
    #[error("Failed to create wallet request")]
    RequestCreationFailed,
    /// Request to wallet was rejected by user or by the node
    #[error("Wallet request rejected: {0}")]
    RequestRejected(String),
    /// No account returned from wallet
    #[error("No account returned from wallet")]
    NoAccount,
    /// Wallet answered with something we could not decode
    #[error("Invalid wallet response: {0}")]
    InvalidResponse(String),
    /// Request did not complete in time
    #[error("Wallet request timed out")]
    Timeout,
}

/// Errors surfaced by the session operations.
///
/// Every operation on [`SessionController`](crate::core::SessionController)
/// returns one of these instead of panicking; the UI turns them into
/// activity log entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No injected wallet provider in this page.
    #[error("No wallet found. Please install MetaMask to continue.")]
    ProviderUnavailable,
    /// Wallet is connected to a different chain.
    #[error("Wrong network (chain_id={actual}). Please switch to chain_id={expected}.")]
    WrongNetwork { expected: u64, actual: u64 },
    /// Operation needs a bound contract handle.
    #[error("Not connected. Connect a wallet on the required network first.")]
    NotConnected,
    /// A toggle is already waiting for confirmation.
    #[error("A pause update is already in flight")]
    ToggleInFlight,
    /// A newer connect or account change started while this one ran.
    #[error("Connection superseded by a newer account change")]
    Superseded,
    /// Submission or confirmation of a transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    /// Any other provider failure (rejected account request, bad response).
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Startup configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration text is not valid TOML for [`AppConfig`](crate::config::AppConfig).
    #[error("invalid configuration: {0}")]
    Parse(String),
    /// Contract address is absent.
    #[error("contract address is not configured")]
    MissingAddress,
    /// Contract address is not a 20-byte hex address.
    #[error("invalid contract address {0:?}")]
    InvalidAddress(String),
    /// Configured chain differs from the one this client is built for.
    #[error("configured chain_id={actual} but this client only supports chain_id={expected}")]
    UnsupportedChain { expected: u64, actual: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_error_converts_into_session_error() {
        let err: SessionError = WalletError::NoAccount.into();
        assert_eq!(err, SessionError::Wallet(WalletError::NoAccount));
        assert_eq!(err.to_string(), "No account returned from wallet");
    }

    #[test]
    fn test_wrong_network_message_names_both_chains() {
        let err = SessionError::WrongNetwork {
            expected: 137,
            actual: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("chain_id=1"));
        assert!(msg.contains("chain_id=137"));
    }
}

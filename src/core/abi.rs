//! Calldata for the two contract functions this client uses.

use alloy_sol_types::{SolCall, sol};

use crate::core::error::WalletError;

sol! {
    /// View function returning the current flag.
    function pauseMintingState() external view returns (bool);

    /// Write function setting the flag.
    function setPauseMinting(bool paused) external;
}

/// Calldata for `pauseMintingState()`.
pub fn encode_pause_state_call() -> Vec<u8> {
    pauseMintingStateCall {}.abi_encode()
}

/// Calldata for `setPauseMinting(paused)`.
pub fn encode_set_pause_call(paused: bool) -> Vec<u8> {
    setPauseMintingCall { paused }.abi_encode()
}

/// Decode the return data of `pauseMintingState()`.
pub fn decode_pause_state(data: &[u8]) -> Result<bool, WalletError> {
    pauseMintingStateCall::abi_decode_returns_validate(data)
        .map_err(|e| WalletError::InvalidResponse(format!("bad pauseMintingState() return: {e}")))
}

/// Encode bytes as a `0x`-prefixed JSON-RPC data string.
pub fn to_hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decode a `0x`-prefixed JSON-RPC data string.
pub fn from_hex_data(raw: &str) -> Result<Vec<u8>, WalletError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|e| WalletError::InvalidResponse(format!("bad hex data: {e}")))
}

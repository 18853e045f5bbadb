//! Network guard.
//!
//! Decides whether the chain a wallet reports is the one this client is
//! built for. A mismatch is never patched in place: the session is thrown
//! away and the page reloaded.

/// Outcome of a network check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkVerdict {
    /// Chain matches, keep the session.
    Continue,
    /// Chain differs, discard the session and reload.
    Reset,
}

/// Compare a reported chain id against the required one.
pub fn check(chain_id: u64, required: u64) -> NetworkVerdict {
    if chain_id == required {
        NetworkVerdict::Continue
    } else {
        NetworkVerdict::Reset
    }
}

/// Parse an EIP-1193 chain id quantity (`"0x89"`).
///
/// Decimal strings are accepted too.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Convert chain ID to network name
pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "Ethereum",
        11155111 => "Sepolia",
        42161 => "Arbitrum",
        10 => "Optimism",
        8453 => "Base",
        137 => "Polygon",
        80002 => "Polygon Amoy",
        56 => "BNB Chain",
        43114 => "Avalanche",
        _ => "Unknown",
    }
}

use alloy_primitives::{Address, B256};

use crate::config::eth_address;
use crate::core::network::chain_name;

/// Last known value of the contract's "minting paused" flag.
///
/// "Not loaded yet" and "loaded, flag is false" are different states and
/// must never be collapsed into one falsy value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PauseState {
    /// Never read under any binding.
    #[default]
    Unknown,
    /// Read from the contract under the current binding.
    Synced(bool),
    /// Read under a binding that no longer exists. Display only.
    Stale(bool),
}

impl PauseState {
    /// Value that operations may rely on.
    pub fn synced(&self) -> Option<bool> {
        match self {
            PauseState::Synced(paused) => Some(*paused),
            _ => None,
        }
    }

    /// Last value seen, trusted or not.
    pub fn last_known(&self) -> Option<bool> {
        match self {
            PauseState::Synced(paused) | PauseState::Stale(paused) => Some(*paused),
            PauseState::Unknown => None,
        }
    }

    /// Demote a synced value after its binding went away.
    pub fn into_stale(self) -> Self {
        match self {
            PauseState::Synced(paused) => PauseState::Stale(paused),
            other => other,
        }
    }

    pub fn label(&self) -> String {
        match self {
            PauseState::Unknown => "UNKNOWN".to_string(),
            PauseState::Synced(paused) => bool_label(*paused).to_string(),
            PauseState::Stale(paused) => format!("{} (stale)", bool_label(*paused)),
        }
    }
}

fn bool_label(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// How a pause update ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleStatus {
    Confirmed,
    Failed,
}

/// A pause update in flight. Dropped from the session once it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingToggle {
    /// Value the user asked for.
    pub intended: bool,
    /// Known once the wallet accepted the transaction.
    pub tx_hash: Option<B256>,
}

impl PendingToggle {
    pub fn describe(&self) -> String {
        match self.tx_hash {
            None => format!("Pending: {} awaiting wallet signature", bool_label(self.intended)),
            Some(hash) => format!(
                "Pending: {} waiting for confirmation ({})",
                bool_label(self.intended),
                hash
            ),
        }
    }
}

/// Connection phase of the session, without the contract handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkStatus {
    #[default]
    Disconnected,
    Connecting,
    /// Wallet answered but sits on another chain.
    WrongNetwork { chain_id: u64 },
    /// Account bound, network checked, contract handle available.
    Bound,
}

/// Snapshot of the session published to the UI after every update.
///
/// Holds no provider or contract objects so it can live in a reactive
/// signal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionView {
    pub link: LinkStatus,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub pause_state: PauseState,
    pub pending: Option<PendingToggle>,
    pub generation: u64,
}

impl SessionView {
    /// Check if a contract handle is bound
    pub fn is_bound(&self) -> bool {
        matches!(self.link, LinkStatus::Bound)
    }

    /// Whether the pause selector should accept input.
    pub fn can_toggle(&self) -> bool {
        self.is_bound() && self.pending.is_none()
    }

    /// Not while a bind or a toggle is in flight.
    pub fn can_connect(&self) -> bool {
        !matches!(self.link, LinkStatus::Connecting) && self.pending.is_none()
    }

    /// Format account for display (0x1234...5678)
    pub fn display_name(&self) -> String {
        match (self.link, self.account) {
            (LinkStatus::Connecting, _) => "connecting...".to_string(),
            (_, Some(address)) => short_address(&address),
            (_, None) => "not connected".to_string(),
        }
    }

    /// Network name with chain id, or "unknown".
    pub fn network_label(&self) -> String {
        let chain_id = match self.link {
            LinkStatus::WrongNetwork { chain_id } => Some(chain_id),
            _ => self.chain_id,
        };
        match chain_id {
            Some(id) => format!("{} ({})", chain_name(id), id),
            None => "unknown".to_string(),
        }
    }
}

/// Shorten a checksummed address to `0x1234...5678`.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    if full.len() >= eth_address::FULL_LEN {
        format!(
            "{}...{}",
            &full[..eth_address::PREFIX_LEN],
            &full[eth_address::SUFFIX_START..]
        )
    } else {
        full
    }
}

//! Wallet and contract capability traits.
//!
//! The session logic only talks to these traits. The browser build
//! implements them over `window.ethereum` ([`Eip1193Provider`]); tests and
//! the `mock` build use an in-memory wallet.
//!
//! All futures are `!Send`: everything runs on the page's single thread.
//!
//! [`Eip1193Provider`]: crate::core::eip1193::Eip1193Provider

use std::rc::Rc;

use alloy_primitives::{Address, B256};

use crate::core::error::WalletError;

/// The four provider lifecycle events the session listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalletEventKind {
    AccountsChanged,
    ChainChanged,
    Connect,
    Disconnect,
}

impl WalletEventKind {
    pub const ALL: [WalletEventKind; 4] = [
        WalletEventKind::AccountsChanged,
        WalletEventKind::ChainChanged,
        WalletEventKind::Connect,
        WalletEventKind::Disconnect,
    ];

    /// EIP-1193 event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            WalletEventKind::AccountsChanged => "accountsChanged",
            WalletEventKind::ChainChanged => "chainChanged",
            WalletEventKind::Connect => "connect",
            WalletEventKind::Disconnect => "disconnect",
        }
    }
}

/// A decoded provider event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// Accounts exposed to the page, most recently used first.
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    Connect { chain_id: Option<u64> },
    Disconnect,
}

impl WalletEvent {
    pub fn kind(&self) -> WalletEventKind {
        match self {
            WalletEvent::AccountsChanged(_) => WalletEventKind::AccountsChanged,
            WalletEvent::ChainChanged(_) => WalletEventKind::ChainChanged,
            WalletEvent::Connect { .. } => WalletEventKind::Connect,
            WalletEvent::Disconnect => WalletEventKind::Disconnect,
        }
    }
}

/// Callback invoked for every decoded event.
pub type Listener = Rc<dyn Fn(WalletEvent)>;

/// Inclusion report for a submitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    /// `false` when the transaction was mined but reverted.
    pub succeeded: bool,
}

/// A submitted transaction that can be awaited.
#[allow(async_fn_in_trait)]
pub trait PendingTransaction {
    fn tx_hash(&self) -> B256;

    /// Wait until the transaction is included in a block.
    async fn await_confirmation(self) -> Result<ConfirmationReceipt, WalletError>;
}

/// Contract handle: `{address, interface, signer}`.
///
/// A handle belongs to one signer for its whole lifetime.
#[allow(async_fn_in_trait)]
pub trait PauseContract: Clone + 'static {
    type Transaction: PendingTransaction;

    fn address(&self) -> Address;

    /// Account transactions are sent from.
    fn signer(&self) -> Address;

    /// `pauseMintingState() -> bool`
    async fn read_pause_state(&self) -> Result<bool, WalletError>;

    /// `setPauseMinting(bool)`, returns once the wallet accepted the transaction.
    async fn set_pause_state(&self, paused: bool) -> Result<Self::Transaction, WalletError>;
}

/// Injected wallet provider.
#[allow(async_fn_in_trait)]
pub trait WalletProvider: Clone + 'static {
    type Contract: PauseContract;

    /// Handle returned by [`subscribe`](Self::subscribe) and consumed by
    /// [`unsubscribe`](Self::unsubscribe). It identifies the exact
    /// callback that was registered.
    type Subscription;

    /// Ask the user to expose accounts (may open the wallet popup).
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Chain the wallet is currently connected to.
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Build a contract handle signing as `signer`.
    fn contract(&self, address: Address, signer: Address) -> Self::Contract;

    fn subscribe(
        &self,
        kind: WalletEventKind,
        listener: Listener,
    ) -> Result<Self::Subscription, WalletError>;

    fn unsubscribe(&self, subscription: Self::Subscription) -> Result<(), WalletError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let names: Vec<_> = WalletEventKind::ALL.iter().map(|k| k.event_name()).collect();
        assert_eq!(names, vec!["accountsChanged", "chainChanged", "connect", "disconnect"]);
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(
            WalletEvent::AccountsChanged(vec![]).kind(),
            WalletEventKind::AccountsChanged
        );
        assert_eq!(WalletEvent::ChainChanged(1).kind(), WalletEventKind::ChainChanged);
        assert_eq!(
            WalletEvent::Connect { chain_id: None }.kind(),
            WalletEventKind::Connect
        );
        assert_eq!(WalletEvent::Disconnect.kind(), WalletEventKind::Disconnect);
    }
}

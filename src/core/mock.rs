//! In-memory wallet and contract.
//!
//! Used by the unit tests and by the `mock` build, which runs the UI
//! without a browser extension. Events are delivered synchronously from
//! [`MockWallet::emit`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use alloy_primitives::{Address, B256, address, keccak256};

use crate::config::ContractConfig;
use crate::core::error::WalletError;
use crate::core::provider::{
    ConfirmationReceipt, Listener, PauseContract, PendingTransaction, WalletEvent,
    WalletEventKind, WalletProvider,
};

/// Contract address used by [`test_config`].
pub const MOCK_CONTRACT: Address = address!("0x5fbdb2315678afecb367f032d93f642f64180aa3");

/// Configuration pointing at [`MOCK_CONTRACT`] on Polygon.
pub fn test_config() -> ContractConfig {
    ContractConfig {
        address: MOCK_CONTRACT,
        chain_id: 137,
    }
}

/// How the next submitted transaction should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockFailure {
    /// User rejects the transaction in the wallet.
    RejectSubmission,
    /// Mined, but reverted.
    Revert,
    /// Never mined before the confirmation deadline.
    Timeout,
}

/// One `setPauseMinting` call seen by the mock chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submission {
    pub from: Address,
    pub paused: bool,
}

#[derive(Default, Debug)]
struct ChainState {
    paused: Cell<bool>,
    submissions: RefCell<Vec<Submission>>,
    reads: Cell<usize>,
    /// Every `pauseMintingState()` call fails while set.
    reads_fail: Cell<bool>,
    next_failure: Cell<Option<MockFailure>>,
    /// Value another actor writes right after our transaction is mined.
    interference: Cell<Option<bool>>,
    block_number: Cell<u64>,
}

struct WalletState {
    accounts: RefCell<Vec<Address>>,
    chain_id: Cell<u64>,
    /// Scheduler yields before each upcoming `eth_chainId` answers.
    chain_id_delays: RefCell<VecDeque<usize>>,
    reject_accounts: Cell<bool>,
    reject_chain_id: Cell<bool>,
    listeners: RefCell<Vec<(u64, WalletEventKind, Listener)>>,
    next_listener_id: Cell<u64>,
    chain: Rc<ChainState>,
}

/// In-memory [`WalletProvider`].
#[derive(Clone)]
pub struct MockWallet {
    inner: Rc<WalletState>,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>, chain_id: u64) -> Self {
        Self {
            inner: Rc::new(WalletState {
                accounts: RefCell::new(accounts),
                chain_id: Cell::new(chain_id),
                chain_id_delays: RefCell::new(VecDeque::new()),
                reject_accounts: Cell::new(false),
                reject_chain_id: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                chain: Rc::new(ChainState::default()),
            }),
        }
    }

    /// Change the accounts returned by the next `eth_requestAccounts`.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.inner.accounts.borrow_mut() = accounts;
    }

    /// Change the chain reported by the wallet. Does not emit an event.
    pub fn set_chain_id(&self, chain_id: u64) {
        self.inner.chain_id.set(chain_id);
    }

    pub fn reject_account_requests(&self, reject: bool) {
        self.inner.reject_accounts.set(reject);
    }

    pub fn reject_chain_id_requests(&self, reject: bool) {
        self.inner.reject_chain_id.set(reject);
    }

    /// Make the next `eth_chainId` yield `yields` times before answering.
    /// The chain id is read when it answers, not when it was asked.
    pub fn delay_next_chain_id(&self, yields: usize) {
        self.inner.chain_id_delays.borrow_mut().push_back(yields);
    }

    /// Set the on-chain flag directly, as another admin would.
    pub fn set_paused(&self, paused: bool) {
        self.inner.chain.paused.set(paused);
    }

    pub fn paused(&self) -> bool {
        self.inner.chain.paused.get()
    }

    /// Make every `pauseMintingState()` read fail until cleared.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.chain.reads_fail.set(fail);
    }

    pub fn fail_next(&self, failure: MockFailure) {
        self.inner.chain.next_failure.set(Some(failure));
    }

    /// Have another actor write `paused` right after our next transaction.
    pub fn interfere_after_next(&self, paused: bool) {
        self.inner.chain.interference.set(Some(paused));
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.inner.chain.submissions.borrow().clone()
    }

    /// Number of `pauseMintingState()` calls served.
    pub fn reads(&self) -> usize {
        self.inner.chain.reads.get()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Deliver an event to every listener subscribed to its kind.
    pub fn emit(&self, event: WalletEvent) {
        let kind = event.kind();
        let targets: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();
        for listener in targets {
            listener(event.clone());
        }
    }
}

/// Handle for one registered mock listener.
#[derive(Debug, PartialEq, Eq)]
pub struct MockSubscription {
    id: u64,
    kind: WalletEventKind,
}

impl WalletProvider for MockWallet {
    type Contract = MockContract;
    type Subscription = MockSubscription;

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.inner.reject_accounts.get() {
            return Err(WalletError::RequestRejected(
                "User rejected the request.".to_string(),
            ));
        }
        Ok(self.inner.accounts.borrow().clone())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let delay = self.inner.chain_id_delays.borrow_mut().pop_front();
        for _ in 0..delay.unwrap_or(0) {
            YieldNow::default().await;
        }
        if self.inner.reject_chain_id.get() {
            return Err(WalletError::RequestRejected(
                "eth_chainId refused".to_string(),
            ));
        }
        Ok(self.inner.chain_id.get())
    }

    fn contract(&self, address: Address, signer: Address) -> MockContract {
        MockContract {
            chain: Rc::clone(&self.inner.chain),
            address,
            signer,
        }
    }

    fn subscribe(
        &self,
        kind: WalletEventKind,
        listener: Listener,
    ) -> Result<MockSubscription, WalletError> {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, kind, listener));
        Ok(MockSubscription { id, kind })
    }

    fn unsubscribe(&self, subscription: MockSubscription) -> Result<(), WalletError> {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(id, kind, _)| !(*id == subscription.id && *kind == subscription.kind));
        Ok(())
    }
}

/// In-memory [`PauseContract`].
#[derive(Clone, Debug)]
pub struct MockContract {
    chain: Rc<ChainState>,
    address: Address,
    signer: Address,
}

impl PauseContract for MockContract {
    type Transaction = MockTransaction;

    fn address(&self) -> Address {
        self.address
    }

    fn signer(&self) -> Address {
        self.signer
    }

    async fn read_pause_state(&self) -> Result<bool, WalletError> {
        self.chain.reads.set(self.chain.reads.get() + 1);
        if self.chain.reads_fail.get() {
            return Err(WalletError::Timeout);
        }
        Ok(self.chain.paused.get())
    }

    async fn set_pause_state(&self, paused: bool) -> Result<MockTransaction, WalletError> {
        let failure = self.chain.next_failure.take();
        if failure == Some(MockFailure::RejectSubmission) {
            return Err(WalletError::RequestRejected(
                "User denied transaction signature.".to_string(),
            ));
        }

        let mut submissions = self.chain.submissions.borrow_mut();
        submissions.push(Submission {
            from: self.signer,
            paused,
        });
        let nonce = submissions.len() as u64;

        Ok(MockTransaction {
            chain: Rc::clone(&self.chain),
            tx_hash: keccak256(nonce.to_be_bytes()),
            paused,
            failure,
        })
    }
}

/// Transaction that is "mined" when awaited.
pub struct MockTransaction {
    chain: Rc<ChainState>,
    tx_hash: B256,
    paused: bool,
    failure: Option<MockFailure>,
}

impl PendingTransaction for MockTransaction {
    fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    async fn await_confirmation(self) -> Result<ConfirmationReceipt, WalletError> {
        if self.failure == Some(MockFailure::Timeout) {
            return Err(WalletError::Timeout);
        }

        let block_number = self.chain.block_number.get() + 1;
        self.chain.block_number.set(block_number);

        let succeeded = self.failure != Some(MockFailure::Revert);
        if succeeded {
            self.chain.paused.set(self.paused);
            if let Some(other) = self.chain.interference.take() {
                self.chain.paused.set(other);
            }
        }

        Ok(ConfirmationReceipt {
            tx_hash: self.tx_hash,
            block_number: Some(block_number),
            succeeded,
        })
    }
}

/// Returns `Pending` once, letting other futures in the same task run.
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: Address = address!("0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1");

    #[tokio::test]
    async fn test_transaction_applies_on_confirmation() {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        let contract = wallet.contract(MOCK_CONTRACT, ACCOUNT);

        let tx = contract.set_pause_state(true).await.unwrap();
        assert!(!wallet.paused());

        let receipt = tx.await_confirmation().await.unwrap();
        assert!(receipt.succeeded);
        assert_eq!(receipt.block_number, Some(1));
        assert!(wallet.paused());
        assert_eq!(
            wallet.submissions(),
            vec![Submission {
                from: ACCOUNT,
                paused: true
            }]
        );
    }

    #[tokio::test]
    async fn test_reverted_transaction_keeps_state() {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        let contract = wallet.contract(MOCK_CONTRACT, ACCOUNT);
        wallet.fail_next(MockFailure::Revert);

        let receipt = contract
            .set_pause_state(true)
            .await
            .unwrap()
            .await_confirmation()
            .await
            .unwrap();
        assert!(!receipt.succeeded);
        assert!(!wallet.paused());
    }

    #[test]
    fn test_unsubscribe_removes_only_that_listener() {
        let wallet = MockWallet::new(vec![], 137);
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        let first = wallet
            .subscribe(
                WalletEventKind::Disconnect,
                Rc::new(move |_| counter.set(counter.get() + 1)),
            )
            .unwrap();
        let counter = Rc::clone(&hits);
        let _second = wallet
            .subscribe(
                WalletEventKind::Disconnect,
                Rc::new(move |_| counter.set(counter.get() + 10)),
            )
            .unwrap();

        wallet.unsubscribe(first).unwrap();
        wallet.emit(WalletEvent::Disconnect);
        assert_eq!(hits.get(), 10);
        assert_eq!(wallet.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_reads_are_counted() {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        let contract = wallet.contract(MOCK_CONTRACT, ACCOUNT);

        wallet.fail_reads(true);
        assert_eq!(contract.read_pause_state().await, Err(WalletError::Timeout));
        wallet.fail_reads(false);
        assert_eq!(contract.read_pause_state().await, Ok(false));
        assert_eq!(wallet.reads(), 2);
    }
}

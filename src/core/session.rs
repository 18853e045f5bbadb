//! Session state and its reducer.
//!
//! [`Session`] holds what the client believes about the wallet and the
//! contract. It only changes through [`Session::apply`], so every event
//! handler's effect is a [`SessionAction`] that can be tested on its own.

use alloy_primitives::{Address, B256};

use crate::models::{LinkStatus, PauseState, PendingToggle, SessionView, ToggleStatus};

/// Connection phase. The contract handle only exists in `Bound`, which
/// keeps "handle present iff account bound and network accepted" true by
/// construction.
#[derive(Clone, Debug)]
pub enum Link<C> {
    Disconnected,
    Connecting,
    WrongNetwork {
        chain_id: u64,
    },
    Bound {
        account: Address,
        chain_id: u64,
        contract: C,
    },
}

/// A single state transition.
#[derive(Clone, Debug)]
pub enum SessionAction<C> {
    /// A connect or rebind started.
    Connecting,
    /// Binder produced a contract handle for `account`, for the bind
    /// started under `generation`.
    Bound {
        generation: u64,
        account: Address,
        chain_id: u64,
        contract: C,
    },
    /// Binder refused the wallet's chain, for the bind started under
    /// `generation`.
    NetworkRejected { generation: u64, chain_id: u64 },
    /// Authoritative read of the flag, taken under `generation`.
    PauseStateLoaded { generation: u64, paused: bool },
    /// A write was mined but the flag could not be read back.
    PauseStateInvalidated,
    /// A toggle was accepted and is about to be submitted.
    ToggleStarted { intended: bool },
    /// The wallet accepted the transaction.
    ToggleSubmitted { tx_hash: B256 },
    /// The transaction finished one way or the other.
    ToggleResolved { status: ToggleStatus },
    /// `chainChanged` reported the required chain again.
    ChainObserved(u64),
    Disconnected,
    /// Wrong chain observed, everything goes.
    Reset,
}

/// Client-side view of the wallet/contract session.
#[derive(Clone, Debug)]
pub struct Session<C> {
    link: Link<C>,
    pause_state: PauseState,
    pending: Option<PendingToggle>,
    generation: u64,
}

impl<C> Default for Session<C> {
    fn default() -> Self {
        Self {
            link: Link::Disconnected,
            pause_state: PauseState::Unknown,
            pending: None,
            generation: 0,
        }
    }
}

impl<C> Session<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(&self) -> &Link<C> {
        &self.link
    }

    pub fn account(&self) -> Option<Address> {
        match &self.link {
            Link::Bound { account, .. } => Some(*account),
            _ => None,
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        match &self.link {
            Link::Bound { chain_id, .. } | Link::WrongNetwork { chain_id } => Some(*chain_id),
            _ => None,
        }
    }

    pub fn contract(&self) -> Option<&C> {
        match &self.link {
            Link::Bound { contract, .. } => Some(contract),
            _ => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.link, Link::Bound { .. })
    }

    pub fn pause_state(&self) -> PauseState {
        self.pause_state
    }

    pub fn pending(&self) -> Option<&PendingToggle> {
        self.pending.as_ref()
    }

    /// Counter bumped whenever the binding changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one action. Returns `false` when the action was ignored.
    pub fn apply(&mut self, action: SessionAction<C>) -> bool {
        match action {
            SessionAction::Connecting => {
                self.rebind(Link::Connecting);
            }
            SessionAction::Bound {
                generation,
                account,
                chain_id,
                contract,
            } => {
                if !self.is_current_bind(generation) {
                    return false;
                }
                self.rebind(Link::Bound {
                    account,
                    chain_id,
                    contract,
                });
            }
            SessionAction::NetworkRejected {
                generation,
                chain_id,
            } => {
                if !self.is_current_bind(generation) {
                    return false;
                }
                self.rebind(Link::WrongNetwork { chain_id });
            }
            SessionAction::PauseStateLoaded { generation, paused } => {
                if generation != self.generation || !self.is_bound() {
                    log::debug!(
                        "dropping pause state read from generation {} (current {})",
                        generation,
                        self.generation
                    );
                    return false;
                }
                self.pause_state = PauseState::Synced(paused);
            }
            SessionAction::PauseStateInvalidated => {
                let demoted = self.pause_state.into_stale();
                if demoted == self.pause_state {
                    return false;
                }
                self.pause_state = demoted;
            }
            SessionAction::ToggleStarted { intended } => {
                if self.pending.is_some() {
                    return false;
                }
                self.pending = Some(PendingToggle {
                    intended,
                    tx_hash: None,
                });
            }
            SessionAction::ToggleSubmitted { tx_hash } => match self.pending.as_mut() {
                Some(pending) => pending.tx_hash = Some(tx_hash),
                None => return false,
            },
            SessionAction::ToggleResolved { status } => match self.pending.take() {
                Some(pending) => {
                    log::debug!(
                        "pause update to {} resolved as {:?}",
                        pending.intended,
                        status
                    );
                }
                None => return false,
            },
            SessionAction::ChainObserved(observed) => match &mut self.link {
                Link::Bound { chain_id, .. } => *chain_id = observed,
                _ => return false,
            },
            SessionAction::Disconnected => {
                self.rebind(Link::Disconnected);
            }
            SessionAction::Reset => {
                *self = Self {
                    generation: self.generation + 1,
                    ..Self::default()
                };
            }
        }
        true
    }

    /// A bind result applies only if nothing rebound since it started.
    fn is_current_bind(&self, generation: u64) -> bool {
        if generation != self.generation {
            log::debug!(
                "dropping bind result from generation {} (current {})",
                generation,
                self.generation
            );
            return false;
        }
        true
    }

    /// Replace the link. Reads taken under the old link no longer apply.
    fn rebind(&mut self, link: Link<C>) {
        self.link = link;
        self.generation += 1;
        self.pause_state = self.pause_state.into_stale();
    }

    /// Snapshot for the UI.
    pub fn view(&self) -> SessionView {
        let link = match &self.link {
            Link::Disconnected => LinkStatus::Disconnected,
            Link::Connecting => LinkStatus::Connecting,
            Link::WrongNetwork { chain_id } => LinkStatus::WrongNetwork {
                chain_id: *chain_id,
            },
            Link::Bound { .. } => LinkStatus::Bound,
        };
        SessionView {
            link,
            account: self.account(),
            chain_id: self.chain_id(),
            pause_state: self.pause_state,
            pending: self.pending,
            generation: self.generation,
        }
    }
}

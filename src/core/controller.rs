//! Session controller.
//!
//! Owns the [`Session`] and is the only thing that dispatches
//! [`SessionAction`]s into it. The UI holds the controller behind an `Rc`
//! and calls its async operations from `spawn_local`.
//!
//! Borrows of the session are never held across an `.await`; every
//! mutation is a synchronous reducer step.

use std::cell::RefCell;

use alloy_primitives::Address;

use crate::config::ContractConfig;
use crate::core::binder::{Binding, ProviderBinder};
use crate::core::error::SessionError;
use crate::core::provider::{PauseContract, WalletProvider};
use crate::core::session::{Session, SessionAction};
use crate::models::SessionView;

type Observer = Box<dyn Fn(&SessionView)>;

pub struct SessionController<W: WalletProvider> {
    binder: ProviderBinder<W>,
    session: RefCell<Session<W::Contract>>,
    observer: RefCell<Option<Observer>>,
}

impl<W: WalletProvider> SessionController<W> {
    pub fn new(provider: Option<W>, config: &ContractConfig) -> Self {
        Self {
            binder: ProviderBinder::new(provider, config),
            session: RefCell::new(Session::new()),
            observer: RefCell::new(None),
        }
    }

    /// Injected provider, if any.
    pub fn provider(&self) -> Option<&W> {
        self.binder.provider().ok()
    }

    pub fn required_chain_id(&self) -> u64 {
        self.binder.required_chain_id()
    }

    /// Register the callback receiving a snapshot after every update.
    pub fn on_change(&self, observer: impl Fn(&SessionView) + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
    }

    pub fn view(&self) -> SessionView {
        self.session.borrow().view()
    }

    /// Apply an action and publish the new snapshot.
    pub fn dispatch(&self, action: SessionAction<W::Contract>) -> bool {
        let (applied, view) = {
            let mut session = self.session.borrow_mut();
            let applied = session.apply(action);
            (applied, session.view())
        };
        if applied && let Some(observer) = self.observer.borrow().as_ref() {
            observer(&view);
        }
        applied
    }

    /// Read-only access to the session, for assertions and rendering.
    pub(crate) fn with_session<R>(&self, f: impl FnOnce(&Session<W::Contract>) -> R) -> R {
        f(&self.session.borrow())
    }

    /// Current contract handle with the generation it belongs to.
    pub(crate) fn bound_contract(&self) -> Result<(W::Contract, u64), SessionError> {
        let session = self.session.borrow();
        let contract = session.contract().cloned().ok_or(SessionError::NotConnected)?;
        Ok((contract, session.generation()))
    }

    /// Connect action: request accounts, check the network, bind the
    /// contract, then load the pause flag.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        let generation = self.begin_bind();
        let result = self.binder.connect().await;
        self.finish_bind(generation, result).await
    }

    /// Bind an account delivered by `accountsChanged`.
    pub async fn rebind(&self, account: Address) -> Result<Address, SessionError> {
        log::info!("account changed to {}, rebinding", account);
        let generation = self.begin_bind();
        let result = self.binder.bind(account).await;
        self.finish_bind(generation, result).await
    }

    /// Enter `Connecting` and return the generation the bind runs under.
    fn begin_bind(&self) -> u64 {
        self.dispatch(SessionAction::Connecting);
        self.with_session(|s| s.generation())
    }

    /// Apply a bind result, unless another bind started after it.
    async fn finish_bind(
        &self,
        generation: u64,
        result: Result<Binding<W::Contract>, SessionError>,
    ) -> Result<Address, SessionError> {
        let current = self.with_session(|s| s.generation()) == generation;
        match result {
            Ok(binding) => {
                let account = binding.account;
                let applied = self.dispatch(SessionAction::Bound {
                    generation,
                    account,
                    chain_id: binding.chain_id,
                    contract: binding.contract,
                });
                if !applied {
                    log::info!("bind of {} superseded by a newer one", account);
                    return Err(SessionError::Superseded);
                }
                log::info!("connected {} on chain_id={}", account, binding.chain_id);
                if let Err(e) = self.refresh().await {
                    log::warn!("initial pause state read failed: {}", e);
                }
                Ok(account)
            }
            Err(SessionError::WrongNetwork { expected, actual }) => {
                self.dispatch(SessionAction::NetworkRejected {
                    generation,
                    chain_id: actual,
                });
                Err(SessionError::WrongNetwork { expected, actual })
            }
            Err(e) => {
                log::warn!("connect failed: {}", e);
                if current {
                    self.dispatch(SessionAction::Disconnected);
                }
                Err(e)
            }
        }
    }

    /// Refresh action: re-read the flag from the bound contract.
    pub async fn refresh(&self) -> Result<bool, SessionError> {
        let (contract, generation) = self.bound_contract()?;
        let paused = contract.read_pause_state().await?;
        log::debug!("pauseMintingState() = {} (generation {})", paused, generation);
        self.dispatch(SessionAction::PauseStateLoaded { generation, paused });
        Ok(paused)
    }

    /// Forget the binding after the wallet disconnected.
    pub fn disconnect(&self) {
        log::info!("wallet disconnected");
        self.dispatch(SessionAction::Disconnected);
    }
}

//! Event bridge between the wallet provider and the session.
//!
//! [`EventBridge`] keeps the exact subscription handles the provider gave
//! back and hands the same handles to `unsubscribe`, so teardown removes
//! the callbacks that were actually registered.
//!
//! The reaction to each event lives on
//! [`SessionController::handle_event`] and is reported as a [`Reaction`]
//! for the caller to act on.

use std::rc::Rc;

use crate::core::controller::SessionController;
use crate::core::error::{SessionError, WalletError};
use crate::core::network::{self, NetworkVerdict};
use crate::core::provider::{Listener, WalletEvent, WalletEventKind, WalletProvider};
use crate::core::session::{Link, SessionAction};

/// Something the caller has to do after an event was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    None,
    /// Discard everything and reload the page.
    Reload,
}

/// All four provider listeners, attached and detached as a unit.
pub struct EventBridge<W: WalletProvider> {
    provider: W,
    subscriptions: Vec<W::Subscription>,
}

impl<W: WalletProvider> EventBridge<W> {
    /// Subscribe `sink` to every [`WalletEventKind`].
    ///
    /// If any subscription fails, the ones already made are removed again.
    pub fn attach(provider: &W, sink: impl Fn(WalletEvent) + 'static) -> Result<Self, WalletError> {
        let sink: Listener = Rc::new(sink);
        let mut bridge = Self {
            provider: provider.clone(),
            subscriptions: Vec::with_capacity(WalletEventKind::ALL.len()),
        };
        for kind in WalletEventKind::ALL {
            let subscription = provider.subscribe(kind, Rc::clone(&sink))?;
            bridge.subscriptions.push(subscription);
        }
        log::debug!("attached {} wallet listeners", bridge.subscriptions.len());
        Ok(bridge)
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Remove every listener this bridge registered.
    pub fn detach(mut self) {
        self.detach_all();
    }

    fn detach_all(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for subscription in self.subscriptions.drain(..) {
            if let Err(e) = self.provider.unsubscribe(subscription) {
                log::warn!("failed to remove wallet listener: {}", e);
            }
        }
        log::debug!("detached wallet listeners");
    }
}

impl<W: WalletProvider> Drop for EventBridge<W> {
    fn drop(&mut self) {
        self.detach_all();
    }
}

impl<W: WalletProvider> SessionController<W> {
    /// React to one provider event.
    ///
    /// | event | reaction |
    /// |---|---|
    /// | `accountsChanged` | rebind to the first account, empty list means disconnect; the latest event wins |
    /// | `chainChanged` | network guard, reload on mismatch |
    /// | `connect` | logged only |
    /// | `disconnect` | clear the account |
    pub async fn handle_event(&self, event: WalletEvent) -> Result<Reaction, SessionError> {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(&account) => match self.rebind(account).await {
                    Ok(_) | Err(SessionError::Superseded) => Ok(Reaction::None),
                    Err(e) => Err(e),
                },
                None => {
                    self.disconnect();
                    Ok(Reaction::None)
                }
            },
            WalletEvent::ChainChanged(chain_id) => Ok(self.handle_chain_changed(chain_id)),
            WalletEvent::Connect { chain_id } => {
                log::info!("wallet connected (chain_id={:?})", chain_id);
                Ok(Reaction::None)
            }
            WalletEvent::Disconnect => {
                self.disconnect();
                Ok(Reaction::None)
            }
        }
    }

    fn handle_chain_changed(&self, chain_id: u64) -> Reaction {
        log::info!("network changed to chain_id={}", chain_id);
        match network::check(chain_id, self.required_chain_id()) {
            NetworkVerdict::Reset => {
                log::warn!("chain_id={} is not supported, resetting session", chain_id);
                self.dispatch(SessionAction::Reset);
                Reaction::Reload
            }
            NetworkVerdict::Continue => {
                let was_rejected =
                    self.with_session(|s| matches!(s.link(), Link::WrongNetwork { .. }));
                if was_rejected {
                    // User switched to the right chain: start over from a clean page.
                    self.dispatch(SessionAction::Reset);
                    Reaction::Reload
                } else {
                    self.dispatch(SessionAction::ChainObserved(chain_id));
                    Reaction::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::{MockWallet, test_config};
    use crate::core::provider::PauseContract;
    use crate::models::{LinkStatus, PauseState};
    use alloy_primitives::{Address, address};
    use std::cell::RefCell;

    const ACCOUNT: Address = address!("0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1");
    const OTHER: Address = address!("0xb2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2");

    async fn connected() -> (MockWallet, Rc<SessionController<MockWallet>>) {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        let controller = Rc::new(SessionController::new(
            Some(wallet.clone()),
            &test_config(),
        ));
        controller.connect().await.unwrap();
        (wallet, controller)
    }

    /// Attach a bridge whose sink queues events, then feed them to the
    /// controller the way the UI's `spawn_local` would.
    fn queued_bridge(wallet: &MockWallet) -> (EventBridge<MockWallet>, Rc<RefCell<Vec<WalletEvent>>>) {
        let queue = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&queue);
        let bridge = EventBridge::attach(wallet, move |event| sink.borrow_mut().push(event)).unwrap();
        (bridge, queue)
    }

    async fn drain(
        controller: &SessionController<MockWallet>,
        queue: &RefCell<Vec<WalletEvent>>,
    ) -> Vec<Result<Reaction, SessionError>> {
        let events: Vec<_> = queue.borrow_mut().drain(..).collect();
        let mut results = Vec::new();
        for event in events {
            results.push(controller.handle_event(event).await);
        }
        results
    }

    #[test]
    fn test_attach_registers_all_four_listeners() {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        let (bridge, _) = queued_bridge(&wallet);
        assert!(bridge.is_attached());
        assert_eq!(wallet.listener_count(), 4);
    }

    #[test]
    fn test_detach_removes_the_registered_listeners() {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        let (bridge, queue) = queued_bridge(&wallet);

        wallet.emit(WalletEvent::Disconnect);
        assert_eq!(queue.borrow().len(), 1);

        bridge.detach();
        assert_eq!(wallet.listener_count(), 0);

        wallet.emit(WalletEvent::Disconnect);
        wallet.emit(WalletEvent::AccountsChanged(vec![OTHER]));
        wallet.emit(WalletEvent::ChainChanged(1));
        assert_eq!(queue.borrow().len(), 1);
    }

    #[test]
    fn test_drop_detaches() {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        {
            let _bridge = queued_bridge(&wallet);
            assert_eq!(wallet.listener_count(), 4);
        }
        assert_eq!(wallet.listener_count(), 0);
    }

    #[test]
    fn test_detach_leaves_foreign_listeners_alone() {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        let _foreign = wallet
            .subscribe(WalletEventKind::Disconnect, Rc::new(|_| {}))
            .unwrap();
        let (bridge, _) = queued_bridge(&wallet);
        bridge.detach();
        assert_eq!(wallet.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_no_mutation_after_teardown() {
        let (wallet, controller) = connected().await;
        let (bridge, queue) = queued_bridge(&wallet);
        bridge.detach();

        wallet.emit(WalletEvent::Disconnect);
        drain(&controller, &queue).await;
        assert_eq!(controller.view().account, Some(ACCOUNT));
        assert!(controller.view().is_bound());
    }

    #[tokio::test]
    async fn test_disconnect_event_clears_account() {
        let (wallet, controller) = connected().await;
        let (_bridge, queue) = queued_bridge(&wallet);

        wallet.emit(WalletEvent::Disconnect);
        let results = drain(&controller, &queue).await;
        assert_eq!(results, vec![Ok(Reaction::None)]);

        let view = controller.view();
        assert_eq!(view.account, None);
        assert_eq!(view.link, LinkStatus::Disconnected);
        assert_eq!(view.pause_state, PauseState::Stale(false));
        assert_eq!(
            controller.request_toggle(true).await,
            Err(SessionError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_accounts_changed_rebinds_first_account() {
        let (wallet, controller) = connected().await;
        let (_bridge, queue) = queued_bridge(&wallet);

        wallet.emit(WalletEvent::AccountsChanged(vec![OTHER, ACCOUNT]));
        drain(&controller, &queue).await;

        assert_eq!(controller.view().account, Some(OTHER));
        let signer = controller.with_session(|s| s.contract().map(|c| c.signer()));
        assert_eq!(signer, Some(OTHER));
        assert_eq!(controller.view().pause_state, PauseState::Synced(false));
    }

    #[tokio::test]
    async fn test_rapid_account_changes_settle_on_the_last() {
        let (wallet, controller) = connected().await;

        wallet.delay_next_chain_id(2);
        let (first, second) = tokio::join!(
            controller.handle_event(WalletEvent::AccountsChanged(vec![ACCOUNT])),
            controller.handle_event(WalletEvent::AccountsChanged(vec![OTHER]))
        );

        assert_eq!(first, Ok(Reaction::None));
        assert_eq!(second, Ok(Reaction::None));
        assert_eq!(controller.view().account, Some(OTHER));
        let signer = controller.with_session(|s| s.contract().map(|c| c.signer()));
        assert_eq!(signer, Some(OTHER));
    }

    #[tokio::test]
    async fn test_empty_accounts_changed_is_a_disconnect() {
        let (_wallet, controller) = connected().await;
        let result = controller
            .handle_event(WalletEvent::AccountsChanged(vec![]))
            .await;
        assert_eq!(result, Ok(Reaction::None));
        assert_eq!(controller.view().account, None);
    }

    #[tokio::test]
    async fn test_accounts_changed_on_wrong_network() {
        let (wallet, controller) = connected().await;
        wallet.set_chain_id(1);
        let result = controller
            .handle_event(WalletEvent::AccountsChanged(vec![OTHER]))
            .await;
        assert_eq!(
            result,
            Err(SessionError::WrongNetwork {
                expected: 137,
                actual: 1
            })
        );
        assert!(!controller.view().is_bound());
    }

    #[tokio::test]
    async fn test_chain_changed_to_other_network_reloads() {
        let (_wallet, controller) = connected().await;
        let result = controller.handle_event(WalletEvent::ChainChanged(1)).await;
        assert_eq!(result, Ok(Reaction::Reload));
        assert_eq!(controller.view().link, LinkStatus::Disconnected);
        assert_eq!(controller.view().pause_state, PauseState::Unknown);
    }

    #[tokio::test]
    async fn test_chain_changed_to_required_network_keeps_session() {
        let (_wallet, controller) = connected().await;
        let result = controller.handle_event(WalletEvent::ChainChanged(137)).await;
        assert_eq!(result, Ok(Reaction::None));
        assert!(controller.view().is_bound());
    }

    #[tokio::test]
    async fn test_switching_away_from_wrong_network_reloads() {
        let wallet = MockWallet::new(vec![ACCOUNT], 1);
        let controller = SessionController::new(Some(wallet.clone()), &test_config());
        assert!(controller.connect().await.is_err());

        wallet.set_chain_id(137);
        let result = controller.handle_event(WalletEvent::ChainChanged(137)).await;
        assert_eq!(result, Ok(Reaction::Reload));
    }

    #[tokio::test]
    async fn test_connect_event_changes_nothing() {
        let (_wallet, controller) = connected().await;
        let before = controller.view();
        let result = controller
            .handle_event(WalletEvent::Connect {
                chain_id: Some(137),
            })
            .await;
        assert_eq!(result, Ok(Reaction::None));
        assert_eq!(controller.view(), before);
    }
}

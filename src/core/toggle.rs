//! Toggle operation: the only path that writes the pause flag.
//!
//! The stored flag is never taken from the request. After the
//! transaction is confirmed the flag is read back from the contract, since
//! another admin may have written it in between.

use alloy_primitives::B256;

use crate::core::controller::SessionController;
use crate::core::error::SessionError;
use crate::core::provider::{ConfirmationReceipt, PauseContract, PendingTransaction, WalletProvider};
use crate::core::session::SessionAction;
use crate::models::ToggleStatus;

/// What a toggle request ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Flag already had the requested value; nothing was sent.
    Unchanged { paused: bool },
    /// Transaction mined. `paused` is the value read back afterwards, or
    /// `None` when the read failed or the session was dropped before it.
    /// In both cases the stored flag is no longer `Synced`.
    Confirmed { tx_hash: B256, paused: Option<bool> },
}

impl<W: WalletProvider> SessionController<W> {
    /// Set the pause flag to `intended`.
    ///
    /// Repeating a request for the value already on chain is a no-op and
    /// never reaches the wallet.
    pub async fn request_toggle(&self, intended: bool) -> Result<ToggleOutcome, SessionError> {
        let (contract, _) = self.bound_contract()?;
        let (in_flight, current) =
            self.with_session(|s| (s.pending().is_some(), s.pause_state().synced()));
        if in_flight {
            return Err(SessionError::ToggleInFlight);
        }

        if current == Some(intended) {
            log::debug!("pause flag already {}, nothing to send", intended);
            return Ok(ToggleOutcome::Unchanged { paused: intended });
        }

        self.dispatch(SessionAction::ToggleStarted { intended });

        let receipt = match self.submit_and_confirm(&contract, intended).await {
            Ok(receipt) => receipt,
            Err(e) => {
                log::warn!("pause update to {} failed: {}", intended, e);
                self.dispatch(SessionAction::ToggleResolved {
                    status: ToggleStatus::Failed,
                });
                return Err(e);
            }
        };

        // Read back through whatever handle is bound now.
        let paused = match self.refresh().await {
            Ok(paused) => Some(paused),
            Err(e) => {
                log::warn!(
                    "transaction {} confirmed but pause state could not be re-read: {}",
                    receipt.tx_hash,
                    e
                );
                self.dispatch(SessionAction::PauseStateInvalidated);
                None
            }
        };
        self.dispatch(SessionAction::ToggleResolved {
            status: ToggleStatus::Confirmed,
        });

        Ok(ToggleOutcome::Confirmed {
            tx_hash: receipt.tx_hash,
            paused,
        })
    }

    async fn submit_and_confirm(
        &self,
        contract: &W::Contract,
        intended: bool,
    ) -> Result<ConfirmationReceipt, SessionError> {
        let tx = contract
            .set_pause_state(intended)
            .await
            .map_err(|e| SessionError::TransactionFailed(e.to_string()))?;

        let tx_hash = tx.tx_hash();
        log::info!(
            "setPauseMinting({}) submitted from {}: {}",
            intended,
            contract.signer(),
            tx_hash
        );
        self.dispatch(SessionAction::ToggleSubmitted { tx_hash });

        let receipt = tx
            .await_confirmation()
            .await
            .map_err(|e| SessionError::TransactionFailed(e.to_string()))?;

        if !receipt.succeeded {
            return Err(SessionError::TransactionFailed(format!(
                "transaction {tx_hash} reverted"
            )));
        }

        log::info!(
            "transaction {} confirmed in block {:?}",
            tx_hash,
            receipt.block_number
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::{MockFailure, MockWallet, Submission, test_config};
    use crate::models::PauseState;
    use alloy_primitives::{Address, address};

    const ACCOUNT: Address = address!("0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1");
    const OTHER: Address = address!("0xb2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2");

    async fn connected(paused: bool) -> (MockWallet, SessionController<MockWallet>) {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        wallet.set_paused(paused);
        let controller = SessionController::new(Some(wallet.clone()), &test_config());
        controller.connect().await.unwrap();
        (wallet, controller)
    }

    #[tokio::test]
    async fn test_toggle_before_connect() {
        let wallet = MockWallet::new(vec![ACCOUNT], 137);
        let controller = SessionController::new(Some(wallet.clone()), &test_config());
        assert_eq!(
            controller.request_toggle(true).await,
            Err(SessionError::NotConnected)
        );
        assert!(wallet.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_same_value_submits_nothing() {
        for paused in [false, true] {
            let (wallet, controller) = connected(paused).await;
            assert_eq!(
                controller.request_toggle(paused).await,
                Ok(ToggleOutcome::Unchanged { paused })
            );
            assert!(wallet.submissions().is_empty());
        }
    }

    #[tokio::test]
    async fn test_false_to_true() {
        let (wallet, controller) = connected(false).await;
        let outcome = controller.request_toggle(true).await.unwrap();
        assert!(matches!(
            outcome,
            ToggleOutcome::Confirmed {
                paused: Some(true),
                ..
            }
        ));
        assert_eq!(controller.view().pause_state, PauseState::Synced(true));
        assert!(controller.view().pending.is_none());
        assert!(wallet.paused());
    }

    #[tokio::test]
    async fn test_true_to_false_stores_false() {
        let (wallet, controller) = connected(true).await;
        let outcome = controller.request_toggle(false).await.unwrap();
        assert!(matches!(
            outcome,
            ToggleOutcome::Confirmed {
                paused: Some(false),
                ..
            }
        ));
        assert_eq!(controller.view().pause_state, PauseState::Synced(false));
        assert!(!wallet.paused());
        assert_eq!(
            wallet.submissions(),
            vec![Submission {
                from: ACCOUNT,
                paused: false
            }]
        );
    }

    #[tokio::test]
    async fn test_stored_state_follows_chain_not_request() {
        let (wallet, controller) = connected(false).await;
        wallet.interfere_after_next(false);

        let outcome = controller.request_toggle(true).await.unwrap();
        assert!(matches!(
            outcome,
            ToggleOutcome::Confirmed {
                paused: Some(false),
                ..
            }
        ));
        assert_eq!(controller.view().pause_state, PauseState::Synced(false));
    }

    #[tokio::test]
    async fn test_select_true_twice_scenario() {
        let (wallet, controller) = connected(false).await;
        assert_eq!(controller.view().pause_state, PauseState::Synced(false));

        controller.request_toggle(true).await.unwrap();
        assert_eq!(
            wallet.submissions(),
            vec![Submission {
                from: ACCOUNT,
                paused: true
            }]
        );
        assert_eq!(controller.view().pause_state, PauseState::Synced(true));

        assert_eq!(
            controller.request_toggle(true).await,
            Ok(ToggleOutcome::Unchanged { paused: true })
        );
        assert_eq!(wallet.submissions().len(), 1);
        assert_eq!(controller.view().pause_state, PauseState::Synced(true));
    }

    #[tokio::test]
    async fn test_rejected_submission_keeps_state() {
        let (wallet, controller) = connected(false).await;
        wallet.fail_next(MockFailure::RejectSubmission);

        let err = controller.request_toggle(true).await.unwrap_err();
        assert!(matches!(err, SessionError::TransactionFailed(_)));
        assert_eq!(controller.view().pause_state, PauseState::Synced(false));
        assert!(controller.view().pending.is_none());
        assert!(wallet.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_revert_keeps_state() {
        let (wallet, controller) = connected(false).await;
        wallet.fail_next(MockFailure::Revert);

        let err = controller.request_toggle(true).await.unwrap_err();
        assert!(matches!(err, SessionError::TransactionFailed(msg) if msg.contains("reverted")));
        assert_eq!(controller.view().pause_state, PauseState::Synced(false));
        assert!(!wallet.paused());
    }

    #[tokio::test]
    async fn test_confirmation_timeout_is_a_failure() {
        let (wallet, controller) = connected(true).await;
        wallet.fail_next(MockFailure::Timeout);

        let err = controller.request_toggle(false).await.unwrap_err();
        assert_eq!(
            err,
            SessionError::TransactionFailed("Wallet request timed out".to_string())
        );
        assert_eq!(controller.view().pause_state, PauseState::Synced(true));
        assert!(controller.view().pending.is_none());
    }

    #[tokio::test]
    async fn test_second_toggle_while_pending_is_refused() {
        let (_wallet, controller) = connected(false).await;
        controller.dispatch(SessionAction::ToggleStarted { intended: true });
        assert_eq!(
            controller.request_toggle(false).await,
            Err(SessionError::ToggleInFlight)
        );
    }

    #[tokio::test]
    async fn test_toggle_after_disconnect_fails() {
        let (wallet, controller) = connected(false).await;
        controller.disconnect();
        assert_eq!(controller.view().account, None);
        assert_eq!(
            controller.request_toggle(true).await,
            Err(SessionError::NotConnected)
        );
        assert!(wallet.submissions().is_empty());

        controller.connect().await.unwrap();
        assert!(controller.request_toggle(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_toggle_after_account_change_signs_as_new_account() {
        let (wallet, controller) = connected(false).await;
        controller.rebind(OTHER).await.unwrap();

        controller.request_toggle(true).await.unwrap();
        assert_eq!(
            wallet.submissions(),
            vec![Submission {
                from: OTHER,
                paused: true
            }]
        );
        assert_eq!(controller.view().pause_state, PauseState::Synced(true));
    }

    #[tokio::test]
    async fn test_failed_read_back_leaves_flag_unsynced() {
        let (wallet, controller) = connected(false).await;
        wallet.fail_reads(true);

        let outcome = controller.request_toggle(true).await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::Confirmed { paused: None, .. }));
        assert!(wallet.paused());
        assert_eq!(controller.view().pause_state, PauseState::Stale(false));
        assert!(controller.view().pending.is_none());

        // An unsynced flag never short-circuits, so going back is submitted.
        let outcome = controller.request_toggle(false).await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::Confirmed { paused: None, .. }));
        assert_eq!(wallet.submissions().len(), 2);
        assert!(!wallet.paused());

        wallet.fail_reads(false);
        assert_eq!(controller.refresh().await, Ok(false));
        assert_eq!(controller.view().pause_state, PauseState::Synced(false));
    }
}

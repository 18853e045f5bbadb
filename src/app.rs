//! Root application module.
//!
//! Contains the App component, AppContext definition, and the wiring
//! between the session controller and Leptos signals.

use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::components::{Console, handle_connect};
use crate::config::{AppConfig, ContractConfig, MAX_ACTIVITY_LOG};
use crate::core::{ConfigError, EventBridge, Reaction, SessionController, WalletEvent};
use crate::models::{ActivityLevel, ActivityLog, SessionView, short_address};
use crate::utils::dom;

// ============================================================================
// Wallet selection
// ============================================================================

/// Wallet implementation compiled into this build.
#[cfg(not(feature = "mock"))]
pub type ActiveWallet = crate::core::eip1193::Eip1193Provider;

/// Wallet implementation compiled into this build.
#[cfg(feature = "mock")]
pub type ActiveWallet = crate::core::mock::MockWallet;

pub type Controller = Rc<SessionController<ActiveWallet>>;

#[cfg(not(feature = "mock"))]
fn locate_wallet() -> Option<ActiveWallet> {
    match ActiveWallet::detect() {
        Ok(provider) => Some(provider),
        Err(e) => {
            log::warn!("no wallet provider: {}", e);
            None
        }
    }
}

#[cfg(feature = "mock")]
fn locate_wallet() -> Option<ActiveWallet> {
    use alloy_primitives::address;

    log::info!("running against the in-memory wallet");
    Some(ActiveWallet::new(
        vec![address!("0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1")],
        crate::config::REQUIRED_CHAIN_ID,
    ))
}

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide reactive context.
///
/// The controller is the source of truth; `session` mirrors its snapshot
/// after every reducer step so components can subscribe to it.
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Latest session snapshot.
    pub session: RwSignal<SessionView>,

    /// Messages shown under the controls.
    pub activity: RwSignal<ActivityLog>,

    controller: StoredValue<Controller, LocalStorage>,
    bridge: StoredValue<Option<EventBridge<ActiveWallet>>, LocalStorage>,
}

impl AppContext {
    pub fn new(contract: &ContractConfig) -> Self {
        let session = RwSignal::new(SessionView::default());
        let activity = RwSignal::new(ActivityLog::new(MAX_ACTIVITY_LOG));

        let controller = Rc::new(SessionController::new(locate_wallet(), contract));
        controller.on_change(move |view| session.set(view.clone()));

        Self {
            session,
            activity,
            controller: StoredValue::new_local(controller),
            bridge: StoredValue::new_local(None),
        }
    }

    pub fn controller(&self) -> Controller {
        self.controller.get_value()
    }

    pub fn has_wallet(&self) -> bool {
        self.controller.with_value(|c| c.provider().is_some())
    }

    pub fn log(&self, level: ActivityLevel, message: impl Into<String>) {
        let message = message.into();
        self.activity.update(|log| log.push(level, message));
    }

    /// Subscribe to the provider's lifecycle events.
    ///
    /// The bridge lives in the reactive owner, so disposing the root
    /// removes the listeners again.
    pub fn attach_bridge(&self) {
        let controller = self.controller();
        let Some(provider) = controller.provider().cloned() else {
            self.log(
                ActivityLevel::Warn,
                "No wallet found. Please install MetaMask to continue.",
            );
            return;
        };

        let ctx = *self;
        let weak = Rc::downgrade(&controller);
        let attached = EventBridge::attach(&provider, move |event| {
            if let Some(controller) = weak.upgrade() {
                spawn_local(ctx.on_wallet_event(controller, event));
            }
        });

        match attached {
            Ok(bridge) => self.bridge.set_value(Some(bridge)),
            Err(e) => {
                log::error!("failed to attach wallet listeners: {}", e);
                self.log(ActivityLevel::Error, format!("Wallet listeners unavailable: {}", e));
            }
        }
    }

    async fn on_wallet_event(self, controller: Controller, event: WalletEvent) {
        self.log(ActivityLevel::Info, describe_event(&event));
        match controller.handle_event(event).await {
            Ok(Reaction::None) => {}
            Ok(Reaction::Reload) => {
                self.bridge.update_value(|bridge| {
                    if let Some(bridge) = bridge.take() {
                        bridge.detach();
                    }
                });
                dom::reload();
            }
            Err(e) => self.log(ActivityLevel::Error, e.to_string()),
        }
    }
}

fn describe_event(event: &WalletEvent) -> String {
    match event {
        WalletEvent::AccountsChanged(accounts) => match accounts.first() {
            Some(account) => format!("Account changed: {}", short_address(account)),
            None => "Wallet locked or all accounts removed".to_string(),
        },
        WalletEvent::ChainChanged(chain_id) => format!("Network changed (chain_id={})", chain_id),
        WalletEvent::Connect { chain_id } => match chain_id {
            Some(id) => format!("Wallet connected to chain_id={}", id),
            None => "Wallet connected".to_string(),
        },
        WalletEvent::Disconnect => "Wallet disconnected".to_string(),
    }
}

// ============================================================================
// App
// ============================================================================

/// Root application component.
///
/// A configuration error replaces the whole UI; otherwise the context is
/// provided, the wallet listeners are attached and a first connect is
/// started before the console renders.
#[component]
pub fn App(config: Result<AppConfig, ConfigError>) -> impl IntoView {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            return view! { <ConfigErrorScreen message=e.to_string() /> }.into_any();
        }
    };

    log::info!(
        "operating {} on chain_id={}",
        config.contract.address,
        config.contract.chain_id
    );

    let ctx = AppContext::new(&config.contract);
    provide_context(ctx);
    ctx.attach_bridge();
    if ctx.has_wallet() {
        handle_connect(ctx);
    }

    view! { <Console contract=config.contract.address /> }.into_any()
}

#[component]
fn ConfigErrorScreen(message: String) -> impl IntoView {
    view! {
        <div style="
            display: flex;
            flex-direction: column;
            align-items: center;
            justify-content: center;
            height: 100vh;
            padding: 2rem;
            background: #0a0e27;
            color: #e0e0e0;
            font-family: 'Courier New', monospace;
        ">
            <div style="max-width: 600px; text-align: center;">
                <h1 style="color: #ff6b6b; margin-bottom: 1rem;">
                    "Configuration error"
                </h1>
                <p style="color: #a0a0a0; margin-bottom: 2rem;">
                    "Set the contract address in assets/config.toml or PAUSE_CONTRACT_ADDRESS and rebuild."
                </p>
                <pre style="
                    text-align: left;
                    background: #151a35;
                    padding: 1rem;
                    border-radius: 4px;
                    color: #ff6b6b;
                    white-space: pre-wrap;
                ">{message}</pre>
            </div>
        </div>
    }
}

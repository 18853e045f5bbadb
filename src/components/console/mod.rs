//! Pause console: connect button, pause selector, refresh button and the
//! activity log.

mod activity;

use alloy_primitives::Address;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::app::AppContext;
use crate::components::Status;
use crate::config::{APP_NAME, APP_VERSION};
use crate::core::ToggleOutcome;
use crate::models::{ActivityLevel, LinkStatus, PauseState, short_address};

use activity::ActivityList;

stylance::import_crate_style!(css, "src/components/console/console.module.css");

fn flag_label(paused: bool) -> &'static str {
    if paused { "TRUE" } else { "FALSE" }
}

// ============================================================================
// Handlers
// ============================================================================

/// Run the connect action; also used once at mount.
pub fn handle_connect(ctx: AppContext) {
    spawn_local(async move {
        let controller = ctx.controller();
        ctx.log(ActivityLevel::Info, "Connecting to wallet...");

        match controller.connect().await {
            Ok(account) => {
                ctx.log(
                    ActivityLevel::Success,
                    format!("Connected: {}", short_address(&account)),
                );
                match controller.view().pause_state {
                    PauseState::Synced(paused) => ctx.log(
                        ActivityLevel::Info,
                        format!("Minting paused: {}", flag_label(paused)),
                    ),
                    _ => ctx.log(
                        ActivityLevel::Warn,
                        "Could not read the pause flag. Try refreshing.",
                    ),
                }
            }
            Err(e) => ctx.log(ActivityLevel::Error, format!("Connection failed: {}", e)),
        }
    });
}

fn handle_refresh(ctx: AppContext) {
    spawn_local(async move {
        match ctx.controller().refresh().await {
            Ok(paused) => ctx.log(
                ActivityLevel::Info,
                format!("Minting paused: {}", flag_label(paused)),
            ),
            Err(e) => ctx.log(ActivityLevel::Error, format!("Refresh failed: {}", e)),
        }
    });
}

fn handle_toggle(ctx: AppContext, intended: bool) {
    spawn_local(async move {
        ctx.log(
            ActivityLevel::Info,
            format!("Setting minting paused to {}...", flag_label(intended)),
        );

        match ctx.controller().request_toggle(intended).await {
            Ok(ToggleOutcome::Unchanged { paused }) => ctx.log(
                ActivityLevel::Info,
                format!("Minting paused is already {}; nothing sent.", flag_label(paused)),
            ),
            Ok(ToggleOutcome::Confirmed {
                tx_hash,
                paused: Some(paused),
            }) => ctx.log(
                ActivityLevel::Success,
                format!(
                    "Confirmed {}: minting paused is now {}",
                    tx_hash,
                    flag_label(paused)
                ),
            ),
            Ok(ToggleOutcome::Confirmed {
                tx_hash,
                paused: None,
            }) => ctx.log(
                ActivityLevel::Warn,
                format!("Confirmed {}, but the new state could not be read.", tx_hash),
            ),
            Err(e) => ctx.log(ActivityLevel::Error, e.to_string()),
        }
    });
}

// ============================================================================
// Component
// ============================================================================

/// Main console view for operating the pause flag of `contract`.
#[component]
pub fn Console(contract: Address) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");

    let connect_label = Signal::derive(move || {
        ctx.session.with(|s| match s.link {
            LinkStatus::Connecting => "Connecting...",
            LinkStatus::Bound => "Reconnect",
            _ => "Connect wallet",
        })
    });
    let can_toggle = Signal::derive(move || ctx.session.with(|s| s.can_toggle()));
    let can_refresh = Signal::derive(move || ctx.session.with(|s| s.is_bound()));

    // The selector mirrors the stored flag, never the last pick.
    let selected = Signal::derive(move || {
        ctx.session.with(|s| match s.pause_state.last_known() {
            Some(paused) => flag_label(paused).to_lowercase(),
            None => String::new(),
        })
    });

    let pending = move || {
        ctx.session.with(|s| s.pending).map(|p| {
            view! { <div class=css::pending>{p.describe()}</div> }
        })
    };
    let can_connect = Signal::derive(move || ctx.session.with(|s| s.can_connect()));

    let on_select = move |ev: leptos::ev::Event| {
        let Some(target) = ev.target() else { return };
        let select = target.unchecked_into::<web_sys::HtmlSelectElement>();
        match select.value().as_str() {
            "true" => handle_toggle(ctx, true),
            "false" => handle_toggle(ctx, false),
            _ => {}
        }
    };

    view! {
        <div class=css::console>
            <Status />

            <main class=css::body>
                <h1 class=css::title>{APP_NAME}</h1>
                <div class=css::contract>
                    "Contract: "
                    <span title=contract.to_string()>{short_address(&contract)}</span>
                </div>

                <div class=css::controls>
                    <button
                        class=css::button
                        on:click=move |_| handle_connect(ctx)
                        prop:disabled=move || !can_connect.get()
                    >
                        {connect_label}
                    </button>

                    <label class=css::field>
                        <span class=css::fieldLabel>"Pause minting"</span>
                        <select
                            class=css::select
                            on:change=on_select
                            prop:value=selected
                            prop:disabled=move || !can_toggle.get()
                        >
                            <option value="" disabled=true>"unknown"</option>
                            <option value="false">"FALSE"</option>
                            <option value="true">"TRUE"</option>
                        </select>
                    </label>

                    <button
                        class=css::button
                        on:click=move |_| handle_refresh(ctx)
                        prop:disabled=move || !can_refresh.get()
                    >
                        "Refresh"
                    </button>
                </div>

                {pending}

                <ActivityList />
            </main>

            <footer class=css::footer>{format!("{} v{}", APP_NAME, APP_VERSION)}</footer>
        </div>
    }
}

//! Status bar component.
//!
//! Displays the connected account, the network, and the last known value
//! of the pause flag.

use leptos::prelude::*;

use crate::app::AppContext;
use crate::models::{LinkStatus, PauseState};

stylance::import_crate_style!(css, "src/components/status/status.module.css");

fn pause_class(state: PauseState) -> &'static str {
    match state {
        PauseState::Synced(true) => css::valueRed,
        PauseState::Synced(false) => css::valueGreen,
        PauseState::Stale(_) | PauseState::Unknown => css::valueDim,
    }
}

/// Status bar displaying account, network and pause information.
///
/// | Field | Source |
/// |-------|--------|
/// | Account | `SessionView::display_name` |
/// | Network | `SessionView::network_label`, red on a rejected chain |
/// | Paused | `PauseState::label` |
#[component]
pub fn Status() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");

    let account = Signal::derive(move || ctx.session.with(|s| s.display_name()));
    let network = Signal::derive(move || ctx.session.with(|s| s.network_label()));
    let network_class = Signal::derive(move || {
        ctx.session.with(|s| match s.link {
            LinkStatus::WrongNetwork { .. } => css::valueRed,
            _ => css::value,
        })
    });
    let paused = Signal::derive(move || ctx.session.with(|s| s.pause_state.label()));
    let paused_class = Signal::derive(move || ctx.session.with(|s| pause_class(s.pause_state)));

    view! {
        <header class=css::bar>
            <div class=css::section>
                <span class=css::label>
                    <span class=css::labelText>"Account:"</span>
                    <span class=css::value>{account}</span>
                </span>

                <span class=css::labelCyan>
                    <span class=css::labelText>"Network:"</span>
                    <span class=network_class>{network}</span>
                </span>

                <span class=css::labelPurple>
                    <span class=css::labelText>"Minting paused:"</span>
                    <span class=paused_class>{paused}</span>
                </span>
            </div>
        </header>
    }
}

//! Data models and types for the application.
//!
//! Contains domain types for:
//! - [`SessionView`], [`PauseState`], [`PendingToggle`] - Wallet/contract session state
//! - [`ActivityLog`] - Bounded log of session activity

mod activity;
mod wallet;

pub use activity::{ActivityLevel, ActivityLog};
pub use wallet::{LinkStatus, PauseState, PendingToggle, SessionView, ToggleStatus, short_address};

//! Core session logic for the pause console.
//!
//! This module provides:
//! - [`SessionController`] driving connect, refresh and toggle
//! - [`EventBridge`] wiring provider events into the session
//! - [`provider::WalletProvider`] and [`provider::PauseContract`] capability traits, with the
//!   browser implementation in [`eip1193`]

pub mod abi;
mod binder;
mod controller;
pub mod eip1193;
pub mod error;
mod events;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod network;
pub mod provider;
pub mod session;
mod toggle;

pub use controller::SessionController;
pub use error::ConfigError;
pub use events::{EventBridge, Reaction};
pub use provider::WalletEvent;
pub use toggle::ToggleOutcome;

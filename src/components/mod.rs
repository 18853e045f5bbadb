//! UI components built with Leptos.
//!
//! - [`console`] - Connect, pause selector, refresh and activity log
//! - [`status`] - Status bar showing account, network and pause state

pub mod console;
pub mod status;

pub use console::{Console, handle_connect};
pub use status::Status;

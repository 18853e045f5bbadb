//! Browser helpers.
//!
//! Provides:
//! - [`dom::window`], [`dom::reload`] - window access and page reload
//! - [`race_with_timeout`] - promise racing for bounded wallet requests

pub mod dom;
mod web;

pub use web::{RaceResult, error_message, race_with_timeout};

//! DOM and Web API utility functions.

use web_sys::Window;

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Reload the page, dropping all in-memory state.
pub fn reload() {
    if let Some(window) = window()
        && let Err(e) = window.location().reload()
    {
        log::error!("page reload failed: {:?}", e);
    }
}

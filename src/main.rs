mod app;
mod components;
mod config;
mod core;
mod models;
mod utils;

use app::App;
use config::AppConfig;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::load();
    let level = config
        .as_ref()
        .map(|c| c.log_level)
        .unwrap_or(log::Level::Info);
    wasm_logger::init(wasm_logger::Config::new(level));
    log::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let root = document()
        .get_element_by_id("app")
        .expect("Failed to find #app element")
        .unchecked_into::<web_sys::HtmlElement>();

    mount_to(root, move || view! { <App config=config /> }).forget();
}

use leptos::prelude::*;

use crate::app::AppContext;
use crate::models::ActivityLevel;

stylance::import_crate_style!(css, "src/components/console/console.module.css");

fn level_class(level: ActivityLevel) -> &'static str {
    match level {
        ActivityLevel::Info => css::textYellow,
        ActivityLevel::Success => css::textGreen,
        ActivityLevel::Warn => css::textOrange,
        ActivityLevel::Error => css::textRed,
    }
}

/// Activity log, newest entry last.
#[component]
pub fn ActivityList() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");

    view! {
        <section class=css::activity>
            <For
                each=move || ctx.activity.with(|log| log.to_vec())
                key=|entry| entry.id
                children=|entry| view! {
                    <div class=format!("{} {}", css::line, level_class(entry.level))>
                        {entry.message}
                    </div>
                }
            />
        </section>
    }
}

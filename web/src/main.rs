use dioxus::logger::tracing::Level;
use dioxus::prelude::*;

use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;
use ui::core::analytics::SessionSink;
use ui::core::settings::GameSettings;
use ui::views::{Home, NBack, Results, SpeedMatch, Stroop};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(WebNavbar)]
    #[route("/")]
    Home {},
    #[route("/game/nback")]
    NBack {},
    #[route("/game/stroop")]
    Stroop {},
    #[route("/game/speed-match")]
    SpeedMatch {},
    #[route("/results")]
    Results {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");
const THEME_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

fn nav_home(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::Home {}, "{label}" })
}
fn nav_nback(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::NBack {}, "{label}" })
}
fn nav_stroop(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::Stroop {}, "{label}" })
}
fn nav_speed_match(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::SpeedMatch {}, "{label}" })
}
fn nav_results(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::Results {}, "{label}" })
}

fn main() {
    if let Err(err) = dioxus::logger::init(Level::INFO) {
        eprintln!("logger already initialised: {err}");
    }
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    ui::i18n::init();

    let lang_code = use_signal(|| "en-US".to_string());
    use_context_provider(|| lang_code);

    let settings = use_signal(GameSettings::load_or_default);
    use_context_provider(|| settings);
    use_context_provider(SessionSink::local);

    register_nav(NavBuilder {
        home: nav_home,
        nback: nav_nback,
        stroop: nav_stroop,
        speed_match: nav_speed_match,
        results: nav_results,
    });

    rsx! {
        document::Style { "{THEME_CSS_INLINE}" }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        Router::<Route> {}
    }
}

/// Web layout: shared navbar above the routed page.
#[component]
fn WebNavbar() -> Element {
    rsx! {
        AppNavbar { }
        Outlet::<Route> {}
    }
}

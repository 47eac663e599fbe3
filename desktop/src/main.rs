#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

#[cfg(feature = "desktop")]
use dioxus::desktop::{tao::window::WindowBuilder, Config};
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
    #[layout(DesktopNavbar)]
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

// Shared theme embedded at compile time; desktop ships no separate stylesheet.
const MAIN_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

#[cfg(feature = "desktop")]
fn main() {
    init_logging();

    LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title(format!("Brainplay – v{}", env!("CARGO_PKG_VERSION")))
                        .with_maximized(true),
                ),
        )
        .launch(App);
}

#[cfg(all(feature = "server", not(feature = "desktop")))]
fn main() {
    init_logging();
    LaunchBuilder::server().launch(App);
}

fn init_logging() {
    if let Err(err) = dioxus::logger::init(Level::INFO) {
        eprintln!("logger already initialised: {err}");
    }
}

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

#[component]
fn App() -> Element {
    ui::i18n::init();

    // AppNavbar writes the selected language here; the keyed wrapper below remounts on change.
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

    // Some window managers ignore the initial maximize request.
    #[cfg(feature = "desktop")]
    {
        let win = dioxus::desktop::use_window();
        use_effect(move || {
            win.set_maximized(true);
        });
    }

    rsx! {
        document::Style { "{MAIN_CSS_INLINE}" }

        div {
            key: "{lang_code()}",
            Router::<Route> { }
        }
    }
}

#[component]
fn DesktopNavbar() -> Element {
    rsx! {
        AppNavbar { }
        Outlet::<Route> {}
    }
}

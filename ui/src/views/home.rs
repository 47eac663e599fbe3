use dioxus::prelude::*;

use crate::components::SettingsPanel;

#[component]
pub fn Home() -> Element {
    // Re-render on language change.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        section { class: "page page-home",
            h1 { {crate::t!("home-title")} }
            p { {crate::t!("home-tagline")} }
            p { {crate::t!("home-intro")} }

            ul { class: "page-home__features",
                li { {crate::t!("home-feature-nback")} }
                li { {crate::t!("home-feature-stroop")} }
                li { {crate::t!("home-feature-speed-match")} }
                li { {crate::t!("home-feature-local")} }
            }
            p { class: "page-home__cta", {crate::t!("home-cta")} }

            SettingsPanel {}
        }
    }
}

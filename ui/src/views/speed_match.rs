use dioxus::prelude::*;

use crate::tasks::speed_match::SpeedMatchView;

#[component]
pub fn SpeedMatch() -> Element {
    // Hidden marker keeps this page subscribed to the language signal.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{_lang_marker}" }
        section { class: "page page-speed-match",
            h1 { {crate::t!("page-speed-match-title")} }
            p { {crate::t!("page-speed-match-intro")} }
            SpeedMatchView {}
        }
    }
}

use dioxus::prelude::*;

use crate::tasks::nback::NBackView;

#[component]
pub fn NBack() -> Element {
    // Hidden marker keeps this page subscribed to the language signal.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    rsx! {
        div { style: "display:none", "{_lang_marker}" }
        section { class: "page page-nback",
            h1 { {crate::t!("page-nback-title")} }
            p { {crate::t!("page-nback-intro")} }
            NBackView {}
        }
    }
}

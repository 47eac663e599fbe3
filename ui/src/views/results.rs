use dioxus::prelude::*;
use tracing::warn;

use crate::core::analytics::GameKind;
use crate::core::format;
use crate::core::storage::Store;
use crate::results::{ResultsDetailPanel, ResultsList, ResultsState};
use crate::t;

#[component]
pub fn Results() -> Element {
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    let mut results = use_signal(ResultsState::load);
    let mut selected_id = use_signal(|| Option::<String>::None);

    let selected = {
        let state = results.read();
        selected_id().and_then(|id| state.find(&id).cloned())
    };

    let best_scores: Vec<(GameKind, usize, String)> = {
        let state = results.read();
        GameKind::ALL
            .iter()
            .map(|&game| {
                let best = state
                    .best_score(game)
                    .map(format::format_points)
                    .unwrap_or_else(|| "—".to_string());
                (game, state.count(game), best)
            })
            .collect()
    };

    let on_refresh = move |_| {
        results.set(ResultsState::load());
    };

    let on_clear = move |_| match Store::local().and_then(|store| store.clear_sessions()) {
        Ok(()) => {
            selected_id.set(None);
            results.set(ResultsState::load());
        }
        Err(err) => {
            warn!("failed to clear sessions: {err}");
            results.with_mut(|state| state.error = Some(format!("Couldn't clear sessions: {err}")));
        }
    };

    rsx! {
        div { style: "display:none", "{_lang_marker}" }
        section { class: "page page-results",
            h1 { {t!("page-results-title")} }
            p { {t!("page-results-intro")} }

            div { class: "results__toolbar",
                button { r#type: "button", class: "button", onclick: on_refresh, {t!("results-refresh")} }
                button { r#type: "button", class: "button button--danger", onclick: on_clear, {t!("results-clear")} }
            }

            ul { class: "results__best",
                for (game, count, best) in best_scores {
                    li { key: "{game.id()}", class: "results__best-item",
                        span { class: "results__best-game", "{game.label()}" }
                        span { class: "results__best-count", {t!("results-session-count", count = count)} }
                        span { class: "results__best-score", "{best}" }
                    }
                }
            }

            div { class: "results__panels",
                ResultsList { results, selected_id }
                ResultsDetailPanel { session: selected }
            }
        }
    }
}

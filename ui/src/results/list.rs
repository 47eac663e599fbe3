use dioxus::prelude::*;

use crate::core::format;
use crate::results::{format_date_badge, format_timestamp, metric_snippets, ResultsState};

#[component]
pub fn ResultsList(results: Signal<ResultsState>, selected_id: Signal<Option<String>>) -> Element {
    let state = results();
    let active_id = selected_id();

    let entries: Vec<ListEntry> = state
        .sessions
        .iter()
        .map(|session| ListEntry {
            id: session.id.clone(),
            is_active: active_id.as_deref() == Some(session.id.as_str()),
            badge: session.created_at_time().map(format_date_badge),
            timestamp: format_timestamp(session),
            game_label: session.game.label().to_string(),
            score: format::format_points(session.score),
            metrics: metric_snippets(session),
        })
        .collect();

    rsx! {
        section { class: "results-card results-list",
            div { class: "results-card__header",
                h2 { "Recent sessions" }
                if !state.sessions.is_empty() {
                    span { class: "results-card__meta", "{state.sessions.len()} recorded" }
                }
            }

            if let Some(err) = state.error.as_ref() {
                p { class: "results-card__error", "⚠️ {err}" }
            }

            if state.sessions.is_empty() {
                p { class: "results-card__placeholder",
                    "Finished games will appear here."
                }
            } else {
                ul { class: "results-list__items",
                    for entry in entries.into_iter() {
                        {render_list_entry(entry, selected_id)}
                    }
                }
            }
        }
    }
}

#[derive(Clone)]
struct ListEntry {
    id: String,
    is_active: bool,
    badge: Option<String>,
    timestamp: String,
    game_label: String,
    score: String,
    metrics: Vec<(String, String)>,
}

fn render_list_entry(entry: ListEntry, mut selected_id: Signal<Option<String>>) -> Element {
    let ListEntry {
        id,
        is_active,
        badge,
        timestamp,
        game_label,
        score,
        metrics,
    } = entry;

    let button_id = id.clone();

    rsx! {
        li {
            key: "{id}",
            class: format!(
                "results-list__item {}",
                if is_active { "results-list__item--active" } else { "" }
            ),
            button {
                r#type: "button",
                class: "results-list__button",
                onclick: move |_| selected_id.set(Some(button_id.clone())),

                span { class: "results-list__heading",
                    if let Some(badge) = badge {
                        span { class: "results-list__badge", "{badge}" }
                    }
                    span { class: "results-list__task", "{game_label}" }
                    span { class: "results-list__score", "{score}" }
                }
                span { class: "results-list__timestamp", "{timestamp}" }

                div { class: "results-list__metrics",
                    for (label, value) in metrics.iter() {
                        span { class: "results-list__metric",
                            span { class: "results-list__metric-label", "{label}" }
                            span { class: "results-list__metric-value", "{value}" }
                        }
                    }
                }
            }
        }
    }
}

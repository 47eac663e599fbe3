use dioxus::prelude::*;
use tracing::{info, warn};

use crate::core::settings::GameSettings;
use crate::core::storage::Store;
use crate::t;
use crate::tasks::RepeatPolicy;

/// Edits the per-game settings and persists them next to the session log.
///
/// When the app root provides a `Signal<GameSettings>`, saving also updates
/// it so the next game picks the new values up.
#[component]
pub fn SettingsPanel() -> Element {
    let shared = try_use_context::<Signal<GameSettings>>();
    let mut draft = use_signal(|| {
        shared
            .map(|settings| settings())
            .unwrap_or_else(GameSettings::load_or_default)
    });
    let mut notice = use_signal(|| Option::<String>::None);

    let on_save = move |_| {
        let settings = draft();
        if let Err(err) = settings.validate() {
            notice.set(Some(t!("settings-invalid", reason = err.to_string())));
            return;
        }
        match Store::local().and_then(|store| settings.save(&store)) {
            Ok(()) => {
                if let Some(mut shared) = shared {
                    shared.set(settings);
                }
                info!("settings saved");
                notice.set(Some(t!("settings-saved")));
            }
            Err(err) => {
                warn!("failed to save settings: {err}");
                notice.set(Some(err.to_string()));
            }
        }
    };

    let current = draft();
    let policy_value = match current.nback.repeat_policy {
        RepeatPolicy::Reject => "reject",
        RepeatPolicy::Rescore => "rescore",
    };

    rsx! {
        section { class: "settings-panel",
            h2 { {t!("settings-title")} }

            div { class: "settings-panel__grid",
                label { r#for: "settings-nback-level", {t!("settings-nback-level")} }
                input {
                    id: "settings-nback-level",
                    r#type: "number",
                    min: "1",
                    value: "{current.nback.n}",
                    oninput: move |evt| {
                        if let Ok(n) = evt.value().parse::<usize>() {
                            draft.with_mut(|s| s.nback.n = n);
                        }
                    },
                }

                label { r#for: "settings-nback-rounds", {t!("settings-nback-rounds")} }
                input {
                    id: "settings-nback-rounds",
                    r#type: "number",
                    min: "1",
                    value: "{current.nback.total_rounds}",
                    oninput: move |evt| {
                        if let Ok(rounds) = evt.value().parse::<usize>() {
                            draft.with_mut(|s| s.nback.total_rounds = rounds);
                        }
                    },
                }

                label { r#for: "settings-stroop-rounds", {t!("settings-stroop-rounds")} }
                input {
                    id: "settings-stroop-rounds",
                    r#type: "number",
                    min: "1",
                    value: "{current.stroop.total_rounds}",
                    oninput: move |evt| {
                        if let Ok(rounds) = evt.value().parse::<usize>() {
                            draft.with_mut(|s| s.stroop.total_rounds = rounds);
                        }
                    },
                }

                label { r#for: "settings-speed-match-duration", {t!("settings-speed-match-duration")} }
                input {
                    id: "settings-speed-match-duration",
                    r#type: "number",
                    min: "1",
                    value: "{current.speed_match.duration_secs}",
                    oninput: move |evt| {
                        if let Ok(secs) = evt.value().parse::<u32>() {
                            draft.with_mut(|s| s.speed_match.duration_secs = secs);
                        }
                    },
                }

                label { r#for: "settings-repeat-policy", {t!("settings-repeat-policy")} }
                select {
                    id: "settings-repeat-policy",
                    value: "{policy_value}",
                    oninput: move |evt| {
                        let policy = match evt.value().as_str() {
                            "rescore" => RepeatPolicy::Rescore,
                            _ => RepeatPolicy::Reject,
                        };
                        let updated = draft().with_repeat_policy(policy);
                        draft.set(updated);
                    },
                    option { value: "reject", {t!("settings-repeat-reject")} }
                    option { value: "rescore", {t!("settings-repeat-rescore")} }
                }
            }

            button {
                r#type: "button",
                class: "button button--primary",
                onclick: on_save,
                {t!("settings-save")}
            }
            if let Some(text) = notice() {
                p { class: "settings-panel__notice", "{text}" }
            }
        }
    }
}

use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::core::analytics::{GameKind, SessionSink};
use crate::core::format;
use crate::core::settings::GameSettings;
use crate::core::timing::{self, InstantStamp};
use crate::tasks::{event_slot, report_session, schedule_event, EventSlot};

use super::engine::{InkColor, StroopAnswer, StroopEngine};
use super::metrics::StroopMetrics;

/// Time allowed to answer before the trial moves on unanswered.
const TRIAL_WINDOW_MS: u64 = 2500;
/// Pause after an answer so the feedback is readable.
const FEEDBACK_MS: u64 = 400;

#[component]
pub fn StroopView() -> Element {
    let settings = try_use_context::<Signal<GameSettings>>();
    let sink = try_use_context::<SessionSink>().unwrap_or_else(SessionSink::local);

    let engine = use_signal(<StroopEngine>::default);
    let run_id = use_signal(|| 0u64);
    let last_answer = use_signal(|| Option::<StroopAnswer>::None);
    let last_metrics = use_signal(|| Option::<StroopMetrics>::None);
    let status_line = use_signal(|| "Press start, then pick the ink colour.".to_string());
    let last_error = use_signal(|| Option::<String>::None);

    let sender_slot: EventSlot<StroopEvent> = use_hook(event_slot);

    let coroutine = {
        let sender_slot = sender_slot.clone();

        use_coroutine(move |mut rx: UnboundedReceiver<StroopEvent>| {
            let sender_slot = sender_slot.clone();
            let sink = sink.clone();
            let mut engine_signal = engine;
            let mut run_signal = run_id;
            let mut answer_signal = last_answer;
            let mut metrics_signal = last_metrics;
            let mut status_signal = status_line;
            let mut error_signal = last_error;

            async move {
                while let Some(event) = rx.next().await {
                    match event {
                        StroopEvent::Start => {
                            let config = match settings {
                                Some(settings) => settings.read().stroop.clone(),
                                None => GameSettings::load_or_default().stroop,
                            };
                            let next_run = run_signal() + 1;
                            run_signal.set(next_run);
                            error_signal.set(None);
                            metrics_signal.set(None);
                            answer_signal.set(None);

                            match StroopEngine::new(config) {
                                Ok(fresh) => engine_signal.set(fresh),
                                Err(err) => {
                                    warn!("refusing to start: {err}");
                                    error_signal.set(Some(err.to_string()));
                                    continue;
                                }
                            }
                            if engine_signal
                                .with_mut(|eng| eng.start_game(timing::now()))
                                .is_some()
                            {
                                status_signal.set("Name the ink, not the word.".to_string());
                                schedule_event(
                                    &sender_slot,
                                    TRIAL_WINDOW_MS,
                                    StroopEvent::Advance {
                                        run_id: next_run,
                                        round: 1,
                                    },
                                );
                            }
                        }
                        StroopEvent::Abort => {
                            run_signal.set(run_signal() + 1);
                            engine_signal.with_mut(|eng| eng.abort());
                            answer_signal.set(None);
                            status_signal.set("Run aborted.".to_string());
                        }
                        StroopEvent::Answer { color, at } => {
                            match engine_signal.with_mut(|eng| eng.submit_answer(color, at)) {
                                Ok(answer) => {
                                    answer_signal.set(Some(answer));
                                    let round = engine_signal.with(|eng| eng.stats().round);
                                    schedule_event(
                                        &sender_slot,
                                        FEEDBACK_MS,
                                        StroopEvent::Advance {
                                            run_id: run_signal(),
                                            round,
                                        },
                                    );
                                }
                                Err(err) => debug!("answer rejected: {err}"),
                            }
                        }
                        StroopEvent::Advance { run_id, round } => {
                            // A trial answered early has already moved on; its window timer is stale.
                            if run_id != run_signal()
                                || engine_signal.with(|eng| eng.stats().round) != round
                            {
                                continue;
                            }

                            answer_signal.set(None);
                            match engine_signal.with_mut(|eng| eng.next_round(timing::now())) {
                                Ok(Some(_)) => {
                                    schedule_event(
                                        &sender_slot,
                                        TRIAL_WINDOW_MS,
                                        StroopEvent::Advance {
                                            run_id,
                                            round: round + 1,
                                        },
                                    );
                                }
                                Ok(None) => {
                                    let metrics = engine_signal.with(|eng| eng.metrics());
                                    match report_session(
                                        &sink,
                                        GameKind::Stroop,
                                        metrics.score,
                                        &metrics,
                                    ) {
                                        Ok(()) => status_signal
                                            .set("Session complete. Summary saved.".to_string()),
                                        Err(err) => error_signal.set(Some(err)),
                                    }
                                    metrics_signal.set(Some(metrics));
                                }
                                Err(err) => warn!("stroop advance ignored: {err}"),
                            }
                        }
                    }
                }
            }
        })
    };

    sender_slot.borrow_mut().replace(coroutine.tx());

    let send_event = move |event: StroopEvent| coroutine.send(event);
    let answer = move |color: InkColor| {
        send_event(StroopEvent::Answer {
            color,
            at: timing::now(),
        })
    };

    let (stats, current, awaiting) =
        engine.with(|eng| (eng.stats(), eng.current(), eng.awaiting_answer()));
    let is_running = engine.with(|eng| eng.state().is_playing());
    let feedback = last_answer().map(|answer| {
        if answer.is_correct {
            format!(
                "Correct {} in {}",
                format::format_points(answer.points),
                format::format_ms(answer.reaction_time_ms)
            )
        } else {
            format!("Wrong {}", format::format_points(answer.points))
        }
    });

    let latest_metrics = last_metrics();
    let error_message = last_error();

    rsx! {
        article { class: "task task-stroop",
            div { class: "task__header",
                h2 { "Stroop" }
                p { "Pick the colour of the ink the word is printed in. Faster correct answers earn a bonus." }
            }

            div { class: "task__controls",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: is_running,
                    onclick: move |_| send_event(StroopEvent::Start),
                    "Start"
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: !is_running,
                    onclick: move |_| send_event(StroopEvent::Abort),
                    "Abort"
                }
                span { class: "task__progress", "Round {stats.round}/{stats.total}" }
                span { class: "task__score", "Score {stats.score}" }
            }

            div { class: "stroop-stage", aria_live: "assertive",
                if let Some(trial) = current {
                    span {
                        class: "stroop-word",
                        style: "color: {trial.color.css()}",
                        "{trial.text.name().to_uppercase()}"
                    }
                } else {
                    span { class: "stroop-word stroop-word--idle", "·" }
                }
            }

            div { class: "task__answers stroop-palette",
                for color in InkColor::PALETTE {
                    button {
                        key: "{color.name()}",
                        r#type: "button",
                        class: "button stroop-palette__swatch",
                        style: "background-color: {color.css()}",
                        disabled: !awaiting,
                        onclick: move |_| answer(color),
                        "{color.name()}"
                    }
                }
            }

            p { class: "task__status", {status_line()} }
            if let Some(text) = feedback {
                p { class: "task__feedback", "{text}" }
            }

            if let Some(metrics) = latest_metrics {
                div { class: "task__metrics",
                    h3 { "Session metrics" }
                    ul {
                        li { "Score: {format::format_points(metrics.score)}" }
                        li { "Accuracy: {metrics.accuracy}%" }
                        li { "Mean RT: {format::format_ms(metrics.mean_rt_ms)}" }
                        li { "Median RT: {format::format_ms(metrics.median_rt_ms)}" }
                        li { "Congruent mean RT: {format::format_ms(metrics.congruent_mean_rt_ms)}" }
                        li { "Incongruent mean RT: {format::format_ms(metrics.incongruent_mean_rt_ms)}" }
                        li { "Interference: {format::format_ms(metrics.interference_ms)}" }
                    }
                }
            } else {
                div { class: "task__metrics task__metrics--placeholder",
                    p { "Metrics will appear after the current run finishes." }
                }
            }

            if let Some(err) = error_message {
                div { class: "task__error", "⚠️ {err}" }
            }
        }
    }
}

#[derive(Debug, Clone)]
enum StroopEvent {
    Start,
    Abort,
    Answer { color: InkColor, at: InstantStamp },
    Advance { run_id: u64, round: usize },
}

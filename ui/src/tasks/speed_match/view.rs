use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::core::analytics::{GameKind, SessionSink};
use crate::core::format;
use crate::core::settings::GameSettings;
use crate::core::timing::{self, Countdown};
use crate::tasks::{event_slot, report_session, schedule_event, EventSlot};

use super::engine::{SpeedMatchAnswer, SpeedMatchEngine};
use super::metrics::SpeedMatchMetrics;

const TICK_MS: u64 = 250;

#[component]
pub fn SpeedMatchView() -> Element {
    let settings = try_use_context::<Signal<GameSettings>>();
    let sink = try_use_context::<SessionSink>().unwrap_or_else(SessionSink::local);

    let engine = use_signal(<SpeedMatchEngine>::default);
    let countdown = use_signal(|| Countdown::new(0));
    let remaining = use_signal(|| 0u32);
    let run_id = use_signal(|| 0u64);
    let last_answer = use_signal(|| Option::<SpeedMatchAnswer>::None);
    let last_metrics = use_signal(|| Option::<SpeedMatchMetrics>::None);
    let status_line = use_signal(|| "Press start to begin.".to_string());
    let last_error = use_signal(|| Option::<String>::None);

    let sender_slot: EventSlot<SpeedMatchEvent> = use_hook(event_slot);

    let coroutine = {
        let sender_slot = sender_slot.clone();

        use_coroutine(move |mut rx: UnboundedReceiver<SpeedMatchEvent>| {
            let sender_slot = sender_slot.clone();
            let sink = sink.clone();
            let mut engine_signal = engine;
            let mut countdown_signal = countdown;
            let mut remaining_signal = remaining;
            let mut run_signal = run_id;
            let mut answer_signal = last_answer;
            let mut metrics_signal = last_metrics;
            let mut status_signal = status_line;
            let mut error_signal = last_error;

            async move {
                while let Some(event) = rx.next().await {
                    match event {
                        SpeedMatchEvent::Start => {
                            let config = match settings {
                                Some(settings) => settings.read().speed_match.clone(),
                                None => GameSettings::load_or_default().speed_match,
                            };
                            let next_run = run_signal() + 1;
                            run_signal.set(next_run);
                            error_signal.set(None);
                            metrics_signal.set(None);
                            answer_signal.set(None);

                            let duration_secs = config.duration_secs;
                            match SpeedMatchEngine::new(config) {
                                Ok(fresh) => engine_signal.set(fresh),
                                Err(err) => {
                                    warn!("refusing to start: {err}");
                                    error_signal.set(Some(err.to_string()));
                                    continue;
                                }
                            }

                            let mut clock = Countdown::new(duration_secs);
                            clock.start(timing::now());
                            remaining_signal.set(duration_secs);
                            countdown_signal.set(clock);
                            engine_signal.with_mut(|eng| eng.start_game());
                            status_signal.set("Is the symbol among the options?".to_string());
                            schedule_event(
                                &sender_slot,
                                TICK_MS,
                                SpeedMatchEvent::Tick { run_id: next_run },
                            );
                        }
                        SpeedMatchEvent::Abort => {
                            run_signal.set(run_signal() + 1);
                            engine_signal.with_mut(|eng| eng.abort());
                            countdown_signal.with_mut(|clock| clock.stop());
                            remaining_signal.set(0);
                            answer_signal.set(None);
                            status_signal.set("Run aborted.".to_string());
                        }
                        SpeedMatchEvent::Tick { run_id } => {
                            if run_id != run_signal() {
                                continue;
                            }
                            let now = timing::now();
                            let (left, expired) = countdown_signal
                                .with(|clock| (clock.remaining_secs(now), clock.expired(now)));
                            if left != remaining_signal() {
                                remaining_signal.set(left);
                            }
                            if !expired {
                                schedule_event(&sender_slot, TICK_MS, SpeedMatchEvent::Tick { run_id });
                                continue;
                            }

                            countdown_signal.with_mut(|clock| clock.stop());
                            engine_signal.with_mut(|eng| eng.end_game());
                            answer_signal.set(None);
                            let metrics = engine_signal.with(|eng| eng.metrics());
                            match report_session(
                                &sink,
                                GameKind::SpeedMatch,
                                metrics.score,
                                &metrics,
                            ) {
                                Ok(()) => status_signal
                                    .set("Time's up. Summary saved.".to_string()),
                                Err(err) => error_signal.set(Some(err)),
                            }
                            metrics_signal.set(Some(metrics));
                        }
                        SpeedMatchEvent::Answer(says_present) => {
                            let result = engine_signal.with_mut(|eng| {
                                let answer = eng.submit_answer(says_present)?;
                                eng.next_set()?;
                                Ok::<_, crate::tasks::GameError>(answer)
                            });
                            match result {
                                Ok(answer) => answer_signal.set(Some(answer)),
                                Err(err) => debug!("answer rejected: {err}"),
                            }
                        }
                    }
                }
            }
        })
    };

    sender_slot.borrow_mut().replace(coroutine.tx());

    let send_event = move |event: SpeedMatchEvent| coroutine.send(event);

    let (stats, current, state) = engine.with(|eng| (eng.stats(), eng.current(), eng.state()));
    let is_running = state.is_playing();
    let seconds_left = remaining();
    let feedback = last_answer().map(|answer| {
        if answer.correct {
            format!("Correct {}", format::format_points(answer.points))
        } else {
            format!("Wrong {}", format::format_points(answer.points))
        }
    });

    let latest_metrics = last_metrics();
    let error_message = last_error();

    rsx! {
        article { class: "task task-speed-match",
            div { class: "task__header",
                h2 { "Speed Match" }
                p { "Answer as many sets as you can. Is the symbol on top among the five below?" }
            }

            div { class: "task__controls",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: is_running,
                    onclick: move |_| send_event(SpeedMatchEvent::Start),
                    "Start"
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: !is_running,
                    onclick: move |_| send_event(SpeedMatchEvent::Abort),
                    "Abort"
                }
                span { class: "task__progress", "Time left {seconds_left}s" }
                span { class: "task__score", "Score {stats.score}" }
            }

            div {
                class: "speed-match-stage",
                tabindex: 0,
                aria_label: "Speed match symbols",
                onkeydown: move |evt| {
                    match evt.key().to_string().as_str() {
                        "ArrowRight" => send_event(SpeedMatchEvent::Answer(true)),
                        "ArrowLeft" => send_event(SpeedMatchEvent::Answer(false)),
                        _ => {}
                    }
                },
                if let Some(set) = current {
                    div { class: "speed-match-reference", "{set.reference}" }
                    div { class: "speed-match-options",
                        for (index, symbol) in set.options.iter().enumerate() {
                            span { key: "{index}", class: "speed-match-options__symbol", "{symbol}" }
                        }
                    }
                } else {
                    div { class: "speed-match-reference speed-match-reference--idle", "?" }
                }
            }

            div { class: "task__answers",
                button {
                    r#type: "button",
                    class: "button",
                    disabled: !is_running,
                    onclick: move |_| send_event(SpeedMatchEvent::Answer(false)),
                    "Not there (←)"
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: !is_running,
                    onclick: move |_| send_event(SpeedMatchEvent::Answer(true)),
                    "It's there (→)"
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
                        li { "Matches: {metrics.matches}" }
                        li { "Errors: {metrics.errors}" }
                        li { "Accuracy: {metrics.accuracy}%" }
                        li { "Answers per minute: {format::format_number(metrics.answers_per_minute, 1)}" }
                    }
                }
            } else {
                div { class: "task__metrics task__metrics--placeholder",
                    p { "Metrics will appear when the countdown ends." }
                }
            }

            if let Some(err) = error_message {
                div { class: "task__error", "⚠️ {err}" }
            }
        }
    }
}

#[derive(Debug, Clone)]
enum SpeedMatchEvent {
    Start,
    Abort,
    Tick { run_id: u64 },
    Answer(bool),
}

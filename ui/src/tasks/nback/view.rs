use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::core::analytics::{GameKind, SessionSink};
use crate::core::format;
use crate::core::settings::GameSettings;
use crate::core::timing::{self, RoundTicker};
use crate::tasks::{event_slot, report_session, schedule_event, EventSlot};

use super::engine::{MatchChannel, NBackEngine, SubmitOutcome, GRID_CELLS};
use super::metrics::NBackMetrics;

/// How long each round stays on screen.
const ROUND_INTERVAL_MS: u64 = 3000;

#[component]
pub fn NBackView() -> Element {
    let settings = try_use_context::<Signal<GameSettings>>();
    let sink = try_use_context::<SessionSink>().unwrap_or_else(SessionSink::local);

    let engine = use_signal(<NBackEngine>::default);
    let ticker = use_signal(|| RoundTicker::new(ROUND_INTERVAL_MS));
    let run_id = use_signal(|| 0u64);
    let last_claim = use_signal(|| Option::<(MatchChannel, SubmitOutcome)>::None);
    let last_metrics = use_signal(|| Option::<NBackMetrics>::None);
    let status_line = use_signal(|| "Press start to begin.".to_string());
    let last_error = use_signal(|| Option::<String>::None);

    let sender_slot: EventSlot<NBackEvent> = use_hook(event_slot);

    let coroutine = {
        let sender_slot = sender_slot.clone();

        use_coroutine(move |mut rx: UnboundedReceiver<NBackEvent>| {
            let sender_slot = sender_slot.clone();
            let sink = sink.clone();
            let mut engine_signal = engine;
            let mut ticker_signal = ticker;
            let mut run_signal = run_id;
            let mut claim_signal = last_claim;
            let mut metrics_signal = last_metrics;
            let mut status_signal = status_line;
            let mut error_signal = last_error;

            async move {
                while let Some(event) = rx.next().await {
                    match event {
                        NBackEvent::Start => {
                            let config = match settings {
                                Some(settings) => settings.read().nback.clone(),
                                None => GameSettings::load_or_default().nback,
                            };
                            let next_run = run_signal() + 1;
                            run_signal.set(next_run);
                            error_signal.set(None);
                            metrics_signal.set(None);
                            claim_signal.set(None);

                            match NBackEngine::new(config) {
                                Ok(fresh) => engine_signal.set(fresh),
                                Err(err) => {
                                    warn!("refusing to start: {err}");
                                    error_signal.set(Some(err.to_string()));
                                    continue;
                                }
                            }
                            let first = engine_signal.with_mut(|eng| eng.start_game());
                            if first.is_some() {
                                status_signal.set("Remember what you see.".to_string());
                                ticker_signal.with_mut(|t| t.restart(timing::now()));
                                schedule_event(
                                    &sender_slot,
                                    ROUND_INTERVAL_MS,
                                    NBackEvent::Tick { run_id: next_run },
                                );
                            }
                        }
                        NBackEvent::Abort => {
                            run_signal.set(run_signal() + 1);
                            engine_signal.with_mut(|eng| eng.abort());
                            ticker_signal.with_mut(|t| t.stop());
                            claim_signal.set(None);
                            status_signal.set("Run aborted.".to_string());
                        }
                        NBackEvent::Tick { run_id } => {
                            if run_id != run_signal() {
                                continue;
                            }
                            let now = timing::now();
                            let (due, remaining) =
                                ticker_signal.with(|t| (t.due(now), t.remaining_ms(now)));
                            if !due {
                                schedule_event(
                                    &sender_slot,
                                    remaining.max(1),
                                    NBackEvent::Tick { run_id },
                                );
                                continue;
                            }

                            let advanced = engine_signal.with_mut(|eng| {
                                match eng.evaluate_round() {
                                    Ok(review) if !review.missed.is_empty() => {
                                        debug!(penalty = review.penalty, "missed matches");
                                    }
                                    Ok(_) => {}
                                    Err(err) => warn!("round evaluation skipped: {err}"),
                                }
                                eng.next_round()
                            });
                            claim_signal.set(None);

                            match advanced {
                                Ok(Some(_)) => {
                                    ticker_signal.with_mut(|t| t.restart(now));
                                    schedule_event(
                                        &sender_slot,
                                        ROUND_INTERVAL_MS,
                                        NBackEvent::Tick { run_id },
                                    );
                                }
                                Ok(None) => {
                                    ticker_signal.with_mut(|t| t.stop());
                                    let metrics = engine_signal.with(|eng| eng.metrics());
                                    match report_session(
                                        &sink,
                                        GameKind::DualNBack,
                                        metrics.score,
                                        &metrics,
                                    ) {
                                        Ok(()) => status_signal
                                            .set("Session complete. Summary saved.".to_string()),
                                        Err(err) => error_signal.set(Some(err)),
                                    }
                                    metrics_signal.set(Some(metrics));
                                }
                                Err(err) => {
                                    warn!("n-back tick ignored: {err}");
                                }
                            }
                        }
                        NBackEvent::Claim(channel) => {
                            match engine_signal.with_mut(|eng| eng.submit_match(channel)) {
                                Ok(outcome) => claim_signal.set(Some((channel, outcome))),
                                Err(err) => debug!("claim rejected: {err}"),
                            }
                        }
                    }
                }
            }
        })
    };

    sender_slot.borrow_mut().replace(coroutine.tx());

    let send_event = move |event: NBackEvent| coroutine.send(event);

    let (state, stats, current) =
        engine.with(|eng| (eng.state(), eng.stats(), eng.current().copied()));
    let is_running = state.is_playing();
    let active_cell = current.map(|round| round.position);
    let letter = current
        .map(|round| round.letter.to_string())
        .unwrap_or_default();
    let claim_text = last_claim().map(|(channel, outcome)| claim_feedback(channel, outcome));

    let latest_metrics = last_metrics();
    let error_message = last_error();

    rsx! {
        article { class: "task task-nback",
            div { class: "task__header",
                h2 { "Dual {stats.level}-Back" }
                p {
                    "Press A when the square sits where it was {stats.level} rounds ago, "
                    "and L when the letter repeats from {stats.level} rounds ago."
                }
            }

            div { class: "task__controls",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: is_running,
                    onclick: move |_| send_event(NBackEvent::Start),
                    "Start"
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: !is_running,
                    onclick: move |_| send_event(NBackEvent::Abort),
                    "Abort"
                }
                span { class: "task__progress", "Round {stats.round}/{stats.total}" }
                span { class: "task__score", "Score {stats.score}" }
            }

            div {
                class: "nback-board",
                tabindex: 0,
                aria_label: "Dual n-back board",
                onkeydown: move |evt| {
                    match evt.key().to_string().to_lowercase().as_str() {
                        "a" => send_event(NBackEvent::Claim(MatchChannel::Position)),
                        "l" => send_event(NBackEvent::Claim(MatchChannel::Audio)),
                        _ => {}
                    }
                },
                div { class: "nback-grid",
                    for cell in 0..GRID_CELLS {
                        div {
                            key: "{cell}",
                            class: format!(
                                "nback-grid__cell {}",
                                if active_cell == Some(cell) { "nback-grid__cell--active" } else { "" }
                            ),
                        }
                    }
                }
                div { class: "nback-letter", aria_live: "assertive", "{letter}" }
            }

            div { class: "task__answers",
                button {
                    r#type: "button",
                    class: "button",
                    disabled: !is_running,
                    onclick: move |_| send_event(NBackEvent::Claim(MatchChannel::Position)),
                    "Position match (A)"
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: !is_running,
                    onclick: move |_| send_event(NBackEvent::Claim(MatchChannel::Audio)),
                    "Letter match (L)"
                }
            }

            p { class: "task__status", {status_line()} }
            if let Some(text) = claim_text {
                p { class: "task__feedback", "{text}" }
            }

            if let Some(metrics) = latest_metrics {
                div { class: "task__metrics",
                    h3 { "Session metrics" }
                    ul {
                        li { "Score: {format::format_points(metrics.score)}" }
                        li { "Accuracy: {format::format_percent(metrics.accuracy)}" }
                        li { "Hits: {metrics.total_hits()}" }
                        li { "Position d′: {format::format_number(metrics.position.d_prime, 2)}" }
                        li { "Letter d′: {format::format_number(metrics.audio.d_prime, 2)}" }
                        li { "Position false alarms: {metrics.position.false_alarms}" }
                        li { "Letter false alarms: {metrics.audio.false_alarms}" }
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

fn claim_feedback(channel: MatchChannel, outcome: SubmitOutcome) -> String {
    let label = match channel {
        MatchChannel::Position => "Position",
        MatchChannel::Audio => "Letter",
    };
    match outcome {
        SubmitOutcome::Hit => format!("{label}: hit! {}", format::format_points(outcome.points())),
        SubmitOutcome::FalseAlarm => format!(
            "{label}: no match there {}",
            format::format_points(outcome.points())
        ),
        SubmitOutcome::Ignored => format!("{label}: too early to compare."),
    }
}

#[derive(Debug, Clone)]
enum NBackEvent {
    Start,
    Abort,
    Tick { run_id: u64 },
    Claim(MatchChannel),
}

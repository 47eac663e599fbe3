use dioxus::prelude::*;

use crate::core::analytics::{GameKind, GameSession};
use crate::core::format;
use crate::results::format_timestamp;
use crate::tasks::{
    nback::{ChannelMetrics, NBackMetrics},
    speed_match::SpeedMatchMetrics,
    stroop::StroopMetrics,
};

#[component]
pub fn ResultsDetailPanel(session: Option<GameSession>) -> Element {
    rsx! {
        section { class: "results-card results-detail",
            div { class: "results-card__header",
                h2 { "Details" }
            }

            match session {
                Some(session) => render_session(&session),
                None => rsx! {
                    p { class: "results-card__placeholder",
                        "Select a session to review its metrics."
                    }
                },
            }
        }
    }
}

fn render_session(session: &GameSession) -> Element {
    let timestamp = format_timestamp(session);
    let content = match session.game {
        GameKind::DualNBack => session
            .metrics_as::<NBackMetrics>()
            .map(|metrics| render_nback(&metrics)),
        GameKind::Stroop => session
            .metrics_as::<StroopMetrics>()
            .map(|metrics| render_stroop(&metrics)),
        GameKind::SpeedMatch => session
            .metrics_as::<SpeedMatchMetrics>()
            .map(|metrics| render_speed_match(&metrics)),
    };

    rsx! {
        div { class: "results-detail__summary",
            h3 { "{session.game.label()}" }
            span { class: "results-detail__timestamp", "{timestamp}" }
            span { class: "results-detail__device", "{session.platform}" }
            span { class: "results-detail__score", "Score {format::format_points(session.score)}" }
        }

        match content {
            Some(content) => content,
            None => rsx! {
                p { class: "results-card__placeholder", "Unable to decode metrics for this session." }
            },
        }
    }
}

fn metric_row(label: &str, value: String) -> Element {
    rsx! {
        li {
            span { class: "results-detail__metric-label", "{label}" }
            span { class: "results-detail__metric-value", "{value}" }
        }
    }
}

fn channel_rows(name: &str, channel: &ChannelMetrics) -> Element {
    rsx! {
        {metric_row(&format!("{name} hits"), channel.hits.to_string())}
        {metric_row(&format!("{name} misses"), channel.misses.to_string())}
        {metric_row(&format!("{name} false alarms"), channel.false_alarms.to_string())}
        {metric_row(&format!("{name} d′"), format::format_number(channel.d_prime, 2))}
        {metric_row(&format!("{name} criterion"), format::format_number(channel.criterion, 2))}
    }
}

fn render_nback(metrics: &NBackMetrics) -> Element {
    rsx! {
        ul { class: "results-detail__grid",
            {metric_row("Level", format!("{}-back", metrics.level))}
            {metric_row("Rounds", metrics.rounds.to_string())}
            {metric_row("Accuracy", format::format_percent(metrics.accuracy))}
            {channel_rows("Position", &metrics.position)}
            {channel_rows("Letter", &metrics.audio)}
        }
    }
}

fn render_stroop(metrics: &StroopMetrics) -> Element {
    rsx! {
        ul { class: "results-detail__grid",
            {metric_row("Rounds", metrics.rounds.to_string())}
            {metric_row("Answered", metrics.answered.to_string())}
            {metric_row("Accuracy", format!("{}%", metrics.accuracy))}
            {metric_row("Mean RT", format::format_ms(metrics.mean_rt_ms))}
            {metric_row("Median RT", format::format_ms(metrics.median_rt_ms))}
            {metric_row("Congruent accuracy", format::format_percent(metrics.congruent_accuracy))}
            {metric_row("Incongruent accuracy", format::format_percent(metrics.incongruent_accuracy))}
            {metric_row("Congruent mean RT", format::format_ms(metrics.congruent_mean_rt_ms))}
            {metric_row("Incongruent mean RT", format::format_ms(metrics.incongruent_mean_rt_ms))}
            {metric_row("Interference", format::format_ms(metrics.interference_ms))}
        }
    }
}

fn render_speed_match(metrics: &SpeedMatchMetrics) -> Element {
    rsx! {
        ul { class: "results-detail__grid",
            {metric_row("Duration", format!("{} s", metrics.duration_secs))}
            {metric_row("Sets shown", metrics.sets_shown.to_string())}
            {metric_row("Matches", metrics.matches.to_string())}
            {metric_row("Errors", metrics.errors.to_string())}
            {metric_row("Accuracy", format!("{}%", metrics.accuracy))}
            {metric_row("Answers per minute", format::format_number(metrics.answers_per_minute, 1))}
        }
    }
}

use time::{macros::format_description, OffsetDateTime};

use crate::core::analytics::{GameKind, GameSession};
use crate::core::format;
use crate::tasks::{nback::NBackMetrics, speed_match::SpeedMatchMetrics, stroop::StroopMetrics};

pub(crate) fn format_timestamp(session: &GameSession) -> String {
    let iso = session.created_at.as_str();
    let (date, time_segment) = iso.split_once('T').unwrap_or((iso, ""));

    let primary_time = time_segment
        .split(['.', 'Z', '+'])
        .next()
        .unwrap_or(time_segment);
    let time_display: String = primary_time.chars().take(5).collect();

    if time_display.is_empty() {
        date.to_string()
    } else {
        format!("{date} · {time_display}")
    }
}

pub(crate) fn format_date_badge(date: OffsetDateTime) -> String {
    date.format(&format_description!(
        "[month repr:short] [day padding:none]"
    ))
    .unwrap_or_else(|_| "—".to_string())
}

/// Label/value pairs shown for a session in the list.
pub(crate) fn metric_snippets(session: &GameSession) -> Vec<(String, String)> {
    let unavailable = || vec![("Metrics".to_string(), "Unavailable".to_string())];

    match session.game {
        GameKind::DualNBack => session
            .metrics_as::<NBackMetrics>()
            .map(|metrics| {
                vec![
                    ("Level".into(), format!("{}-back", metrics.level)),
                    ("Accuracy".into(), format::format_percent(metrics.accuracy)),
                    ("Hits".into(), metrics.total_hits().to_string()),
                ]
            })
            .unwrap_or_else(unavailable),
        GameKind::Stroop => session
            .metrics_as::<StroopMetrics>()
            .map(|metrics| {
                vec![
                    ("Accuracy".into(), format!("{}%", metrics.accuracy)),
                    ("Mean RT".into(), format::format_ms(metrics.mean_rt_ms)),
                    ("Interference".into(), format::format_ms(metrics.interference_ms)),
                ]
            })
            .unwrap_or_else(unavailable),
        GameKind::SpeedMatch => session
            .metrics_as::<SpeedMatchMetrics>()
            .map(|metrics| {
                vec![
                    ("Matches".into(), metrics.matches.to_string()),
                    ("Errors".into(), metrics.errors.to_string()),
                    ("Accuracy".into(), format!("{}%", metrics.accuracy)),
                ]
            })
            .unwrap_or_else(unavailable),
    }
}

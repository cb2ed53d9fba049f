use time::Duration;

/// Formats seconds from the timeline start as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_clock(seconds: u32) -> String {
    let duration = Duration::seconds(i64::from(seconds));
    let hours = duration.whole_hours();
    let minutes = duration.whole_minutes() % 60;
    let seconds = duration.whole_seconds() % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// `HH:MM:SS - HH:MM:SS` for a half-open range.
pub fn format_range(start_seconds: u32, end_seconds: u32) -> String {
    format!(
        "{} - {}",
        format_clock(start_seconds),
        format_clock(end_seconds)
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct RulerMark {
    pub label: String,
    /// Fraction of the timeline width, `0.0..=1.0`.
    pub offset: f64,
}

/// Hour marks every `step_hours`, including both ends of the span.
pub fn ruler_marks(total_hours: u32, step_hours: u32) -> Vec<RulerMark> {
    if total_hours == 0 {
        return Vec::new();
    }
    let step = step_hours.max(1);
    (0..=total_hours)
        .step_by(step as usize)
        .map(|hour| RulerMark {
            label: format!("{hour:02}:00"),
            offset: f64::from(hour) / f64::from(total_hours),
        })
        .collect()
}

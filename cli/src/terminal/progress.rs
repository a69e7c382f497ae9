use std::time::Duration;

use edgeprobe_core::scanner::ProgressCallback;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TEMPLATE: &str =
    "{spinner:.blue} {msg} [{bar:32.green/bright_black}] {pos}/{len} ({elapsed})";

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICK_STRINGS)
        .progress_chars("━╸━")
}

/// A span carrying a progress bar of `len` steps. Instrument the phase's
/// future with it to show the bar while the phase runs.
pub fn phase_span(message: &str, len: usize) -> Span {
    let span = info_span!("phase", indicatif.pb_show = true);
    span.pb_set_style(&style());
    span.pb_set_length(len as u64);
    span.pb_set_message(message);
    span
}

/// Moves the span's bar to the reported position.
pub fn reporter(span: &Span) -> ProgressCallback {
    let span = span.clone();
    Box::new(move |done| span.pb_set_position(done as u64))
}

/// Human-readable elapsed time.
pub fn elapsed(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}

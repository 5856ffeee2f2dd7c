//! Formatting helpers for run summaries.

use chrono::TimeDelta;

const MIB: f64 = 1024.0 * 1024.0;

/// Size in MiB with two decimals (10485760 -> "10.00").
#[must_use]
pub fn format_mib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / MIB)
}

/// Formats an elapsed time as `H:MM:SS`, with a `.ffffff` microsecond part
/// when it is not zero and a leading `N day(s), ` for long spans.
/// Negative spans are clamped to zero.
#[must_use]
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let elapsed = elapsed.max(TimeDelta::zero());
    let total_seconds = elapsed.num_seconds();
    let micros = elapsed.subsec_nanos() / 1_000;

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    if days > 0 {
        let unit = if days == 1 { "day" } else { "days" };
        out.push_str(&format!("{days} {unit}, "));
    }
    out.push_str(&format!("{hours}:{minutes:02}:{seconds:02}"));
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

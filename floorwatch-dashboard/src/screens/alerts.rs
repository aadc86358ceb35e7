use floorwatch_kernel::pagination::load_more_prefix;
use floorwatch_kernel::{Alert, AlertCounts};
use std::fmt::Write;
use std::num::NonZeroUsize;
use time::OffsetDateTime;

/// Alert feed, most severe first, showing the first `pages_loaded` pages.
pub fn render_alerts(
    alerts: &[Alert],
    page_size: NonZeroUsize,
    pages_loaded: usize,
    now: OffsetDateTime,
) -> String {
    let mut out = String::new();
    let counts = AlertCounts::from_alerts(alerts);
    let _ = writeln!(
        out,
        "Alerts: {}  (HIGH {}  MEDIUM {}  LOW {})",
        counts.total(),
        counts.high,
        counts.medium,
        counts.low
    );

    if alerts.is_empty() {
        let _ = writeln!(out, "No active alerts.");
        return out;
    }

    let view = load_more_prefix(alerts, page_size, pages_loaded.max(1));
    for alert in view.items {
        let _ = writeln!(out, "[{}] {}", alert.severity, alert.message);
        let _ = writeln!(out, "    {}", alert.machine);
        let _ = writeln!(out, "    {}", alert.details);
        let _ = writeln!(out, "    {}", alert.time_label(now));
    }
    if view.has_more {
        let _ = writeln!(
            out,
            "Showing {} of {}. Use --page {} to load more.",
            view.items.len(),
            alerts.len(),
            pages_loaded.max(1) + 1
        );
    }
    out
}

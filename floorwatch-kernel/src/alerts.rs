//! Alert derivation from failure flags.
//!
//! Stateless: every fetch rebuilds the whole list. One alert per
//! (eligible record, raised flag); a record with three flags yields three
//! alerts. Only H and M machines are eligible.

use crate::models::{FailureKind, MachineRecord};
use serde::Serialize;
use std::fmt;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort rank: HIGH(0) < MEDIUM(1) < LOW(2)
    pub fn rank(&self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity and headline for each failure cause
pub fn rule(kind: FailureKind) -> (Severity, &'static str) {
    match kind {
        FailureKind::ToolWear => (Severity::High, "Tool Wear Failure detected"),
        FailureKind::HeatDissipation => (Severity::Medium, "Heat Dissipation Failure alert"),
        FailureKind::Power => (Severity::High, "Power Failure warning"),
        FailureKind::Overstrain => (Severity::Medium, "Overstrain Failure warning"),
        FailureKind::Random => (Severity::Low, "Random Failure notice"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub machine: String,
    pub product_id: String,
    pub failure: FailureKind,
    pub severity: Severity,
    pub message: String,
    pub details: String,
    #[serde(with = "time::serde::rfc3339")]
    pub raised_at: OffsetDateTime,
}

impl Alert {
    /// Relative age, ex: "2 minutes ago"
    pub fn time_label(&self, now: OffsetDateTime) -> String {
        relative_label(now - self.raised_at)
    }
}

fn relative_label(age: Duration) -> String {
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };

    if age < Duration::minutes(1) {
        "just now".to_string()
    } else if age < Duration::hours(1) {
        plural(age.whole_minutes(), "minute")
    } else if age < Duration::days(1) {
        plural(age.whole_hours(), "hour")
    } else {
        plural(age.whole_days(), "day")
    }
}

fn measure(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

fn details(kind: FailureKind, record: &MachineRecord) -> String {
    match kind {
        FailureKind::ToolWear => format!(
            "Abnormal tool wear detected. Current wear: {} min, Speed: {} rpm",
            measure(record.tool_wear),
            measure(record.rotational_speed)
        ),
        FailureKind::HeatDissipation => format!(
            "Temperature critical: Air temp {}K, Process temp {}K",
            measure(record.air_temperature),
            measure(record.process_temperature)
        ),
        FailureKind::Power => format!(
            "Emergency power issue detected. Torque: {}Nm at {} rpm",
            measure(record.torque),
            measure(record.rotational_speed)
        ),
        FailureKind::Overstrain => format!(
            "Machine overstrain detected. Current torque: {}Nm exceeds normal range",
            measure(record.torque)
        ),
        FailureKind::Random => {
            "Unexpected behavior detected. Maintenance inspection required".to_string()
        }
    }
}

/// Build the alert feed for a record set, most severe first.
pub fn derive_alerts(records: &[MachineRecord], raised_at: OffsetDateTime) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = records
        .iter()
        .filter(|r| r.is_alert_eligible())
        .flat_map(|record| {
            record.failures.active().map(move |kind| {
                let (severity, message) = rule(kind);
                Alert {
                    id: Uuid::new_v4(),
                    machine: record.label(),
                    product_id: record.product_id.clone(),
                    failure: kind,
                    severity,
                    message: message.to_string(),
                    details: details(kind, record),
                    raised_at,
                }
            })
        })
        .collect();

    sort_by_severity(&mut alerts);
    alerts
}

/// Stable: alerts of equal severity keep their relative order.
pub fn sort_by_severity(alerts: &mut [Alert]) {
    alerts.sort_by_key(|a| a.severity.rank());
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AlertCounts {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        alerts.iter().fold(Self::default(), |mut counts, alert| {
            match alert.severity {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

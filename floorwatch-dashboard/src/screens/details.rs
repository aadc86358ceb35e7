use super::measure;
use floorwatch_kernel::{paginate, Alert, AreaBucket, MachineRecord};
use std::fmt::Write;
use std::num::NonZeroUsize;
use time::OffsetDateTime;

fn machine_line(record: &MachineRecord) -> String {
    let machine_type = record.machine_type.map(|t| t.code()).unwrap_or("?");
    let status = if record.machine_failure { "FAILED" } else { "OK" };
    format!(
        "{} [{}] air {}K  process {}K  speed {} rpm  torque {} Nm  wear {} min  {}",
        record.product_id,
        machine_type,
        measure(record.air_temperature, 1),
        measure(record.process_temperature, 1),
        measure(record.rotational_speed, 0),
        measure(record.torque, 1),
        measure(record.tool_wear, 0),
        status
    )
}

/// Machine list of one area, paged with a previous/next footer
pub fn render_area(bucket: &AreaBucket<'_>, page_size: NonZeroUsize, page: usize) -> String {
    let area = bucket.area;
    let mut out = String::new();
    let _ = writeln!(out, "{} (Floor {}, Area {})", area.name, area.floor, area.id);
    if !area.description.is_empty() {
        let _ = writeln!(out, "{}", area.description);
    }
    let _ = writeln!(
        out,
        "Machines: {}  Failures: {}",
        bucket.machine_count(),
        bucket.failure_count()
    );

    if bucket.machines.is_empty() {
        let _ = writeln!(out, "No machines in this area.");
        return out;
    }

    let view = paginate(&bucket.machines, page_size, page);
    for record in view.items {
        let _ = writeln!(out, "  {}", machine_line(record));
    }
    let _ = writeln!(
        out,
        "Page {}/{}{}{}",
        view.page,
        view.total_pages,
        if view.has_previous { "  [previous]" } else { "" },
        if view.has_next { "  [next]" } else { "" }
    );
    out
}

/// Single machine with its active alerts
pub fn render_machine(record: &MachineRecord, alerts: &[Alert], now: OffsetDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.label());
    if let Some(udi) = &record.udi {
        let _ = writeln!(out, "UDI: {udi}");
    }
    let _ = writeln!(out, "{}", machine_line(record));

    let causes: Vec<&str> = record.failures.active().map(|k| k.code()).collect();
    if !causes.is_empty() {
        let _ = writeln!(out, "Failure flags: {}", causes.join(", "));
    }
    if !record.flags_consistent() {
        let _ = writeln!(out, "Note: machine failure flag disagrees with the cause flags");
    }
    for alert in alerts {
        let _ = writeln!(
            out,
            "  [{}] {} ({})",
            alert.severity,
            alert.message,
            alert.time_label(now)
        );
        let _ = writeln!(out, "      {}", alert.details);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorwatch_kernel::models::RawMachine;
    use floorwatch_kernel::{derive_alerts, group_by_area, Topology};

    fn machine(id: &str) -> MachineRecord {
        MachineRecord::from(RawMachine {
            product_id: Some(id.into()),
            machine_type: Some("H".into()),
            rotational_speed: Some("1551".into()),
            area: Some("6".into()),
            floor: Some("1".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_area_pages() {
        let topology = Topology::default();
        let records: Vec<_> = (1..=12).map(|i| machine(&format!("H{i}"))).collect();
        let grouping = group_by_area(&records, &topology);
        let bucket = grouping.bucket(6, 1).unwrap();
        let size = NonZeroUsize::new(5).unwrap();

        let first = render_area(bucket, size, 1);
        assert!(first.starts_with("Maintenance Workshop (Floor 1, Area 6)\n"));
        assert!(first.contains("Machines: 12  Failures: 0\n"));
        assert!(first.contains("  H1 [H] air N/AK"));
        assert!(first.ends_with("Page 1/3  [next]\n"));

        let last = render_area(bucket, size, 3);
        assert!(last.contains("  H12 [H]"));
        assert!(!last.contains("  H10 [H]"));
        assert!(last.ends_with("Page 3/3  [previous]\n"));
    }

    #[test]
    fn test_machine_with_alerts() {
        let mut record = machine("H29424");
        record.failures.power = true;
        record.machine_failure = true;
        let now = OffsetDateTime::now_utc();
        let alerts = derive_alerts(std::slice::from_ref(&record), now);

        let text = render_machine(&record, &alerts, now);
        assert!(text.starts_with("H Machine H29424 (Floor 1, Area 6)\n"));
        assert!(text.contains("Failure flags: PWF\n"));
        assert!(text.contains("  [HIGH] Power Failure warning (just now)\n"));
        assert!(text.contains("Emergency power issue detected. Torque: N/ANm at 1551 rpm"));
        assert!(!text.contains("Note:"));
    }
}

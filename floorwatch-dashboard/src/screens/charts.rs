use super::measure;
use floorwatch_kernel::stats::{
    self, average_by_range, capacity_distribution, failure_type_counts, histogram,
    machine_statistics, sample_every, speed_torque_comparison, temperature_comparison, Bucket,
    MachineAverage, PairedReading, AIR_TEMPERATURE_RANGES, SPEED_RANGES,
};
use floorwatch_kernel::{FailureKind, FixtureRecord, MachineType};
use std::fmt::Write;

/// Tool wear scatter keeps one row in this many
pub const TOOL_WEAR_SAMPLE_STEP: usize = 50;

/// Average rotational speed per machine, ascending, plus the fleet average
pub fn render_rpm(averages: &[MachineAverage]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rotational speed by machine");
    if averages.is_empty() {
        let _ = writeln!(out, "No speed readings.");
        return out;
    }
    for avg in averages {
        let _ = writeln!(
            out,
            "  {:<10} {:>8.1} rpm  ({} samples)",
            avg.product_id, avg.average, avg.samples
        );
    }
    let _ = writeln!(
        out,
        "Average Factory RPM: {}",
        measure(stats::fleet_average(averages), 1)
    );
    out
}

/// All chart panels built from the CSV fixture
pub fn render_fixture(rows: &[FixtureRecord]) -> String {
    let mut out = String::new();

    let summary = machine_statistics(rows);
    let _ = writeln!(out, "Machine statistics");
    let _ = writeln!(out, "  Total machines: {}", summary.total);
    let _ = writeln!(
        out,
        "  Avg air temperature: {}K",
        measure(summary.average_air_temperature, 2)
    );
    let _ = writeln!(
        out,
        "  Avg process temperature: {}K",
        measure(summary.average_process_temperature, 2)
    );
    let _ = writeln!(
        out,
        "  Max rotational speed: {} RPM",
        measure(summary.max_rotational_speed, 1)
    );
    let _ = writeln!(out, "  Min torque: {} Nm", measure(summary.min_torque, 2));
    let _ = writeln!(out, "  Failure rate: {:.1}%", summary.failure_percentage);

    let failures = failure_type_counts(rows.iter().map(|r| r.failures));
    let _ = writeln!(out, "Failure types");
    for (kind, count) in failures.entries() {
        let _ = writeln!(
            out,
            "  {} {:<26} {:>6}  ({:.1}%)",
            kind.code(),
            kind.name(),
            count,
            stats::percentage(count, failures.total())
        );
    }

    let capacity = capacity_distribution(rows.iter().map(|r| r.machine_type));
    let _ = writeln!(out, "Machine types");
    for machine_type in MachineType::ALL {
        let _ = writeln!(
            out,
            "  {}: {:.1}%",
            machine_type.capacity_label(),
            capacity.percentage(machine_type)
        );
    }

    let temps = histogram(
        rows.iter().map(|r| r.air_temperature),
        &Bucket::parse_all(&AIR_TEMPERATURE_RANGES),
    );
    let _ = writeln!(out, "Air temperature distribution");
    for bucket in &temps.buckets {
        let _ = writeln!(
            out,
            "  {}K: {} ({:.1}%)",
            bucket.bucket.label,
            bucket.count,
            stats::percentage(bucket.count, temps.total())
        );
    }
    if temps.outside > 0 {
        let _ = writeln!(out, "  outside ranges: {}", temps.outside);
    }

    let torque = average_by_range(
        rows.iter().map(|r| (r.rotational_speed, r.torque)),
        &Bucket::parse_all(&SPEED_RANGES),
    );
    let _ = writeln!(out, "Average torque by speed");
    for range in &torque {
        let _ = writeln!(out, "  {} RPM: {} Nm", range.bucket.label, measure(range.average, 2));
    }

    let _ = writeln!(out, "Temperature Comparison (air / process)");
    write_pairs(&mut out, &temperature_comparison(rows), "K", 1);
    let _ = writeln!(out, "Rotational Speed vs. Torque");
    write_pairs(&mut out, &speed_torque_comparison(rows), "rpm / Nm", 1);

    let samples = sample_every(rows, TOOL_WEAR_SAMPLE_STEP);
    let _ = writeln!(out, "Tool wear (every {TOOL_WEAR_SAMPLE_STEP}th row)");
    for row in samples {
        let _ = writeln!(
            out,
            "  {:<10} {} min",
            row.product_id.as_deref().unwrap_or("?"),
            measure(row.tool_wear, 0)
        );
    }

    out
}

fn write_pairs(out: &mut String, readings: &[PairedReading], unit: &str, decimals: usize) {
    for reading in readings {
        let _ = writeln!(
            out,
            "  {:<4} {} / {} {unit}",
            reading.label,
            measure(reading.first, decimals),
            measure(reading.second, decimals)
        );
    }
}

/// Failure kinds with at least one occurrence, for the pie legend
pub fn nonzero_failures(rows: &[FixtureRecord]) -> Vec<(FailureKind, usize)> {
    failure_type_counts(rows.iter().map(|r| r.failures))
        .entries()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
}

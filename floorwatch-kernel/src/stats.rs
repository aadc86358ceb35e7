/**
 * AGGREGATE STATISTICS - Pure reductions behind the chart screens
 *
 * ROLE: Means, extrema, histograms and per-machine averages over record sets.
 * Works on both API records and fixture rows through the `Telemetry`
 * accessor trait; the two sources are never merged.
 *
 * MISSING VALUES: every reduction skips values that did not parse. A
 * reduction with nothing left returns `None` (or 0 for counts), never NaN.
 */

use crate::fixture::FixtureRecord;
use crate::models::{FailureFlags, FailureKind, MachineRecord, MachineType};
use serde::Serialize;
use std::collections::HashMap;

/// Ranges of the air temperature histogram, in kelvin
pub const AIR_TEMPERATURE_RANGES: [&str; 5] =
    ["200-250", "251-300", "301-350", "351-400", "401-450"];

/// Ranges of the torque-by-speed chart, in rpm
pub const SPEED_RANGES: [&str; 6] = [
    "0-500",
    "501-1000",
    "1001-1500",
    "1501-2000",
    "2001-2500",
    "2501-3000",
];

/// Field accessors shared by every record source
pub trait Telemetry {
    fn product_id(&self) -> Option<&str>;
    fn machine_type(&self) -> Option<MachineType>;
    fn air_temperature(&self) -> Option<f64>;
    fn process_temperature(&self) -> Option<f64>;
    fn rotational_speed(&self) -> Option<f64>;
    fn torque(&self) -> Option<f64>;
    fn tool_wear(&self) -> Option<f64>;
    fn machine_failure(&self) -> bool;
    fn failures(&self) -> FailureFlags;
}

impl Telemetry for MachineRecord {
    fn product_id(&self) -> Option<&str> {
        Some(self.product_id.as_str())
    }
    fn machine_type(&self) -> Option<MachineType> {
        self.machine_type
    }
    fn air_temperature(&self) -> Option<f64> {
        self.air_temperature
    }
    fn process_temperature(&self) -> Option<f64> {
        self.process_temperature
    }
    fn rotational_speed(&self) -> Option<f64> {
        self.rotational_speed
    }
    fn torque(&self) -> Option<f64> {
        self.torque
    }
    fn tool_wear(&self) -> Option<f64> {
        self.tool_wear
    }
    fn machine_failure(&self) -> bool {
        self.machine_failure
    }
    fn failures(&self) -> FailureFlags {
        self.failures
    }
}

impl Telemetry for FixtureRecord {
    fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }
    fn machine_type(&self) -> Option<MachineType> {
        self.machine_type
    }
    fn air_temperature(&self) -> Option<f64> {
        self.air_temperature
    }
    fn process_temperature(&self) -> Option<f64> {
        self.process_temperature
    }
    fn rotational_speed(&self) -> Option<f64> {
        self.rotational_speed
    }
    fn torque(&self) -> Option<f64> {
        self.torque
    }
    fn tool_wear(&self) -> Option<f64> {
        self.tool_wear
    }
    fn machine_failure(&self) -> bool {
        self.machine_failure
    }
    fn failures(&self) -> FailureFlags {
        self.failures
    }
}

pub fn count<T>(items: &[T]) -> usize {
    items.len()
}

/// Arithmetic mean of the present, finite values
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn min<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    min_max(values).map(|(lo, _)| lo)
}

pub fn max<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    min_max(values).map(|(_, hi)| hi)
}

pub fn min_max<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

/// Share of `part` in `total`, in percent. 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Inclusive numeric range with its display label, ex: "251-300"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub start: f64,
    pub end: f64,
}

impl Bucket {
    /// Parse `"start-end"`. Both bounds must be numbers with start <= end.
    pub fn parse(label: &str) -> Option<Self> {
        let (start, end) = label.split_once('-')?;
        let start: f64 = start.trim().parse().ok()?;
        let end: f64 = end.trim().parse().ok()?;
        (start.is_finite() && end.is_finite() && start <= end).then(|| Bucket {
            label: label.to_string(),
            start,
            end,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.start <= value && value <= self.end
    }

    /// Parse a list of labels, dropping the ones that do not parse
    pub fn parse_all(labels: &[&str]) -> Vec<Bucket> {
        labels.iter().filter_map(|l| Bucket::parse(l)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub bucket: Bucket,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub buckets: Vec<BucketCount>,
    /// Present values that fell in no bucket
    pub outside: usize,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum::<usize>()
    }

    pub fn count_for(&self, label: &str) -> Option<usize> {
        self.buckets
            .iter()
            .find(|b| b.bucket.label == label)
            .map(|b| b.count)
    }
}

/// Each value lands in the first bucket containing it, or in `outside`.
pub fn histogram<I>(values: I, buckets: &[Bucket]) -> Histogram
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut counts: Vec<BucketCount> = buckets
        .iter()
        .map(|b| BucketCount {
            bucket: b.clone(),
            count: 0,
        })
        .collect();
    let mut outside = 0;

    for value in values.into_iter().flatten() {
        match counts.iter_mut().find(|c| c.bucket.contains(value)) {
            Some(slot) => slot.count += 1,
            None => outside += 1,
        }
    }

    Histogram {
        buckets: counts,
        outside,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineAverage {
    pub product_id: String,
    pub average: f64,
    pub samples: usize,
}

/// Mean rotational speed per product id, ascending by mean.
///
/// Records with an empty id or no speed are skipped. Equal means keep the
/// order in which their ids first appeared.
pub fn average_speed_by_machine<T: Telemetry>(records: &[T]) -> Vec<MachineAverage> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();

    for record in records {
        let Some(id) = record.product_id().filter(|id| !id.is_empty()) else {
            continue;
        };
        let Some(speed) = record.rotational_speed() else {
            continue;
        };
        let slot = *index.entry(id).or_insert_with(|| {
            groups.push((id, 0.0, 0));
            groups.len() - 1
        });
        groups[slot].1 += speed;
        groups[slot].2 += 1;
    }

    let mut averages: Vec<MachineAverage> = groups
        .into_iter()
        .map(|(id, sum, samples)| MachineAverage {
            product_id: id.to_string(),
            average: sum / samples as f64,
            samples,
        })
        .filter(|a| a.average.is_finite())
        .collect();

    averages.sort_by(|a, b| a.average.total_cmp(&b.average));
    averages
}

/// Mean of the per-machine averages ("average factory RPM")
pub fn fleet_average(averages: &[MachineAverage]) -> Option<f64> {
    mean(averages.iter().map(|a| Some(a.average)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureCounts {
    pub twf: usize,
    pub hdf: usize,
    pub pwf: usize,
    pub osf: usize,
    pub rnf: usize,
}

impl FailureCounts {
    pub fn get(&self, kind: FailureKind) -> usize {
        match kind {
            FailureKind::ToolWear => self.twf,
            FailureKind::HeatDissipation => self.hdf,
            FailureKind::Power => self.pwf,
            FailureKind::Overstrain => self.osf,
            FailureKind::Random => self.rnf,
        }
    }

    pub fn total(&self) -> usize {
        FailureKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    /// `(kind, count)` pairs in scan order
    pub fn entries(&self) -> [(FailureKind, usize); 5] {
        FailureKind::ALL.map(|k| (k, self.get(k)))
    }
}

/// Per-cause failure counts for the failure pie chart
pub fn failure_type_counts<I>(flags: I) -> FailureCounts
where
    I: IntoIterator<Item = FailureFlags>,
{
    flags.into_iter().fold(FailureCounts::default(), |mut counts, f| {
        counts.twf += usize::from(f.tool_wear);
        counts.hdf += usize::from(f.heat_dissipation);
        counts.pwf += usize::from(f.power);
        counts.osf += usize::from(f.overstrain);
        counts.rnf += usize::from(f.random);
        counts
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapacityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Records with no recognised type, excluded from the percentages
    pub unknown: usize,
}

impl CapacityDistribution {
    pub fn count(&self, machine_type: MachineType) -> usize {
        match machine_type {
            MachineType::High => self.high,
            MachineType::Medium => self.medium,
            MachineType::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    pub fn percentage(&self, machine_type: MachineType) -> f64 {
        percentage(self.count(machine_type), self.total())
    }
}

pub fn capacity_distribution<I>(types: I) -> CapacityDistribution
where
    I: IntoIterator<Item = Option<MachineType>>,
{
    types
        .into_iter()
        .fold(CapacityDistribution::default(), |mut dist, t| {
            match t {
                Some(MachineType::High) => dist.high += 1,
                Some(MachineType::Medium) => dist.medium += 1,
                Some(MachineType::Low) => dist.low += 1,
                None => dist.unknown += 1,
            }
            dist
        })
}

/// Headline figures of the machine status screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineStatistics {
    pub total: usize,
    pub average_air_temperature: Option<f64>,
    pub average_process_temperature: Option<f64>,
    pub machine_failures: usize,
    pub failures: FailureCounts,
    pub max_rotational_speed: Option<f64>,
    pub min_torque: Option<f64>,
    /// `machine_failures` over `total`, in percent
    pub failure_percentage: f64,
}

pub fn machine_statistics<T: Telemetry>(records: &[T]) -> MachineStatistics {
    let total = count(records);
    let machine_failures = records.iter().filter(|r| r.machine_failure()).count();

    MachineStatistics {
        total,
        average_air_temperature: mean(records.iter().map(Telemetry::air_temperature)),
        average_process_temperature: mean(records.iter().map(Telemetry::process_temperature)),
        machine_failures,
        failures: failure_type_counts(records.iter().map(Telemetry::failures)),
        max_rotational_speed: max(records.iter().map(Telemetry::rotational_speed)),
        min_torque: min(records.iter().map(Telemetry::torque)),
        failure_percentage: percentage(machine_failures, total),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeAverage {
    pub bucket: Bucket,
    /// `None` when no pair fell in the range
    pub average: Option<f64>,
    pub samples: usize,
}

/// Mean of `value` per range of `key`, ordered by range start.
///
/// Pairs with a missing key or value are skipped. Each pair counts toward the
/// first range containing its key.
pub fn average_by_range<I>(pairs: I, buckets: &[Bucket]) -> Vec<RangeAverage>
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let mut sums: Vec<(f64, usize)> = vec![(0.0, 0); buckets.len()];

    for (key, value) in pairs {
        let (Some(key), Some(value)) = (key, value) else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        if let Some(i) = buckets.iter().position(|b| b.contains(key)) {
            sums[i].0 += value;
            sums[i].1 += 1;
        }
    }

    let mut ranges: Vec<RangeAverage> = buckets
        .iter()
        .zip(sums)
        .map(|(bucket, (sum, samples))| RangeAverage {
            bucket: bucket.clone(),
            average: (samples > 0).then(|| sum / samples as f64),
            samples,
        })
        .collect();
    ranges.sort_by(|a, b| a.bucket.start.total_cmp(&b.bucket.start));
    ranges
}

/// Items whose index is a multiple of `n`. `n == 0` keeps nothing.
pub fn sample_every<T>(items: &[T], n: usize) -> Vec<&T> {
    if n == 0 {
        return Vec::new();
    }
    items.iter().step_by(n).collect()
}

/// Rows shown by the side-by-side comparison charts
pub const COMPARISON_ROWS: usize = 10;

/// Two readings of one row, labelled `M1`, `M2`, ... by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedReading {
    pub label: String,
    pub first: Option<f64>,
    pub second: Option<f64>,
}

/// Pair two readings over the first `n` items.
pub fn paired_readings<T, A, B>(items: &[T], n: usize, first: A, second: B) -> Vec<PairedReading>
where
    A: Fn(&T) -> Option<f64>,
    B: Fn(&T) -> Option<f64>,
{
    items
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, item)| PairedReading {
            label: format!("M{}", i + 1),
            first: first(item),
            second: second(item),
        })
        .collect()
}

/// Air vs process temperature of the first `COMPARISON_ROWS` items
pub fn temperature_comparison<T: Telemetry>(items: &[T]) -> Vec<PairedReading> {
    paired_readings(items, COMPARISON_ROWS, T::air_temperature, T::process_temperature)
}

/// Rotational speed vs torque of the first `COMPARISON_ROWS` items
pub fn speed_torque_comparison<T: Telemetry>(items: &[T]) -> Vec<PairedReading> {
    paired_readings(items, COMPARISON_ROWS, T::rotational_speed, T::torque)
}

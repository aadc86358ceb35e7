/**
 * SPATIAL GROUPER - Machine placement onto the factory map
 *
 * ROLE: Partition the fetched records into one bucket per Area, and roll the
 * buckets up into per-area and per-floor counts for the map screen.
 *
 * MATCHING: a record belongs to an Area when its `area` and `floor` text
 * equal the Area's id and floor rendered as decimal text. No trimming and no
 * numeric coercion ("01" is not "1"). The first matching Area wins.
 *
 * UNMATCHED: records placed nowhere are kept in `AreaGrouping::unmatched`
 * so topology drift shows up as a count instead of silently vanishing.
 */

use crate::models::MachineRecord;
use crate::topology::{Area, Topology};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AreaBucket<'a> {
    pub area: &'a Area,
    pub machines: Vec<&'a MachineRecord>,
}

impl<'a> AreaBucket<'a> {
    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    /// Machines whose `machine_failure` flag is raised
    pub fn failure_count(&self) -> usize {
        self.machines.iter().filter(|m| m.machine_failure).count()
    }

    pub fn summary(&self) -> AreaSummary {
        AreaSummary {
            area_id: self.area.id,
            name: self.area.name.clone(),
            floor: self.area.floor,
            machine_count: self.machine_count(),
            failure_count: self.failure_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaSummary {
    pub area_id: u32,
    pub name: String,
    pub floor: u32,
    pub machine_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FloorSummary {
    pub floor: u32,
    pub machine_count: usize,
    pub failure_count: usize,
}

/// Result of placing a record set onto a topology
#[derive(Debug, Clone)]
pub struct AreaGrouping<'a> {
    /// One bucket per Area, in topology order
    pub buckets: Vec<AreaBucket<'a>>,
    /// Records matching no Area
    pub unmatched: Vec<&'a MachineRecord>,
}

impl<'a> AreaGrouping<'a> {
    pub fn bucket(&self, area_id: u32, floor: u32) -> Option<&AreaBucket<'a>> {
        self.buckets
            .iter()
            .find(|b| b.area.id == area_id && b.area.floor == floor)
    }

    /// Sum over every Area on the given floor
    pub fn floor_summary(&self, floor: u32) -> FloorSummary {
        let on_floor = self.buckets.iter().filter(|b| b.area.floor == floor);
        let (machine_count, failure_count) = on_floor.fold((0, 0), |(machines, failures), b| {
            (machines + b.machine_count(), failures + b.failure_count())
        });
        FloorSummary {
            floor,
            machine_count,
            failure_count,
        }
    }

    /// One summary per distinct floor of the topology, ascending
    pub fn floor_summaries(&self) -> Vec<FloorSummary> {
        let mut floors: Vec<u32> = self.buckets.iter().map(|b| b.area.floor).collect();
        floors.sort_unstable();
        floors.dedup();
        floors.into_iter().map(|f| self.floor_summary(f)).collect()
    }

    pub fn area_summaries(&self) -> Vec<AreaSummary> {
        self.buckets.iter().map(AreaBucket::summary).collect()
    }

    pub fn matched_count(&self) -> usize {
        self.buckets.iter().map(AreaBucket::machine_count).sum()
    }

    /// Matched plus unmatched; always the size of the input
    pub fn total_count(&self) -> usize {
        self.matched_count() + self.unmatched.len()
    }
}

pub fn group_by_area<'a>(records: &'a [MachineRecord], topology: &'a Topology) -> AreaGrouping<'a> {
    let keys: Vec<(String, String)> = topology.areas().iter().map(Area::placement_key).collect();
    let mut buckets: Vec<AreaBucket<'a>> = topology
        .areas()
        .iter()
        .map(|area| AreaBucket {
            area,
            machines: Vec::new(),
        })
        .collect();
    let mut unmatched = Vec::new();

    for record in records {
        let slot = keys
            .iter()
            .position(|(area, floor)| *area == record.area && *floor == record.floor);
        match slot {
            Some(index) => buckets[index].machines.push(record),
            None => unmatched.push(record),
        }
    }

    if !unmatched.is_empty() {
        warn!(
            unmatched = unmatched.len(),
            total = records.len(),
            "machines placed outside every known area"
        );
    }

    AreaGrouping { buckets, unmatched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureFlags, MachineType};
    use crate::topology::AreaKind;

    fn machine(id: &str, area: &str, floor: &str, failed: bool) -> MachineRecord {
        MachineRecord {
            product_id: id.to_string(),
            udi: None,
            machine_type: Some(MachineType::Medium),
            air_temperature: None,
            process_temperature: None,
            rotational_speed: None,
            torque: None,
            tool_wear: None,
            machine_failure: failed,
            failures: FailureFlags::default(),
            floor: floor.to_string(),
            area: area.to_string(),
        }
    }

    #[test]
    fn test_groups_by_area_and_floor() {
        let topology = Topology::default();
        let records = vec![
            machine("A", "1", "1", false),
            machine("B", "1", "1", true),
            machine("C", "3", "2", true),
            machine("D", "3", "1", false), // area 3 lives on floor 2
        ];
        let grouping = group_by_area(&records, &topology);

        assert_eq!(grouping.buckets.len(), 8);
        assert_eq!(grouping.bucket(1, 1).unwrap().machine_count(), 2);
        assert_eq!(grouping.bucket(1, 1).unwrap().failure_count(), 1);
        assert_eq!(grouping.bucket(3, 2).unwrap().machine_count(), 1);
        assert_eq!(grouping.bucket(2, 1).unwrap().machine_count(), 0);
        assert_eq!(grouping.unmatched.len(), 1);
        assert_eq!(grouping.unmatched[0].product_id, "D");
    }

    #[test]
    fn test_exact_string_matching() {
        let topology = Topology::default();
        let records = vec![
            machine("A", "01", "1", false),
            machine("B", "1 ", "1", false),
            machine("C", "1", "1.0", false),
        ];
        let grouping = group_by_area(&records, &topology);
        assert_eq!(grouping.matched_count(), 0);
        assert_eq!(grouping.unmatched.len(), 3);
    }

    #[test]
    fn test_grouping_conserves_records() {
        let topology = Topology::default();
        let records: Vec<_> = (0..40)
            .map(|i| {
                let area = (i % 11).to_string();
                let floor = (i % 3).to_string();
                machine(&format!("M{i}"), &area, &floor, i % 4 == 0)
            })
            .collect();
        let grouping = group_by_area(&records, &topology);

        assert_eq!(grouping.total_count(), records.len());
        let mut seen: Vec<&str> = grouping
            .buckets
            .iter()
            .flat_map(|b| b.machines.iter())
            .chain(grouping.unmatched.iter())
            .map(|m| m.product_id.as_str())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), records.len());
    }

    #[test]
    fn test_floor_summaries() {
        let topology = Topology::default();
        let records = vec![
            machine("A", "1", "1", true),
            machine("B", "5", "1", false),
            machine("C", "6", "1", true),
            machine("D", "8", "2", true),
            machine("E", "9", "9", true),
        ];
        let grouping = group_by_area(&records, &topology);

        assert_eq!(
            grouping.floor_summaries(),
            vec![
                FloorSummary { floor: 1, machine_count: 3, failure_count: 2 },
                FloorSummary { floor: 2, machine_count: 1, failure_count: 1 },
            ]
        );
        assert_eq!(grouping.floor_summary(7).machine_count, 0);
    }

    #[test]
    fn test_empty_topology_sends_everything_to_unmatched() {
        let topology = Topology::new(vec![]).unwrap();
        let records = vec![machine("A", "1", "1", false)];
        let grouping = group_by_area(&records, &topology);
        assert!(grouping.buckets.is_empty());
        assert_eq!(grouping.unmatched.len(), 1);
    }

    #[test]
    fn test_area_summary() {
        let topology =
            Topology::new(vec![Area::new(4, "Paint", AreaKind::Workspace, "", 3)]).unwrap();
        let records = vec![machine("A", "4", "3", true)];
        let grouping = group_by_area(&records, &topology);
        assert_eq!(
            grouping.area_summaries(),
            vec![AreaSummary {
                area_id: 4,
                name: "Paint".into(),
                floor: 3,
                machine_count: 1,
                failure_count: 1,
            }]
        );
    }
}

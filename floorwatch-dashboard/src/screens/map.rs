use floorwatch_kernel::{AreaGrouping, Topology};
use std::fmt::Write;

/// Factory map for one floor: floor totals, one line per area, unplaced count.
pub fn render_map(grouping: &AreaGrouping<'_>, topology: &Topology, floor: u32) -> String {
    let mut out = String::new();
    let floors = topology.floors();

    if !floors.contains(&floor) {
        let _ = writeln!(out, "Floor {floor} has no areas. Known floors: {}", join(&floors));
        return out;
    }

    let summary = grouping.floor_summary(floor);
    let _ = writeln!(
        out,
        "Floor {floor}  machines: {}  failures: {}",
        summary.machine_count, summary.failure_count
    );

    for area in topology.areas_on_floor(floor) {
        let (machines, failures) = grouping
            .bucket(area.id, area.floor)
            .map(|b| (b.machine_count(), b.failure_count()))
            .unwrap_or((0, 0));
        let _ = writeln!(
            out,
            "  [{}] {} ({})  machines: {machines}  failures: {failures}",
            area.id,
            area.name,
            area.kind.as_str()
        );
    }

    let others: Vec<u32> = floors.into_iter().filter(|f| *f != floor).collect();
    if !others.is_empty() {
        let _ = writeln!(out, "Other floors: {}", join(&others));
    }
    if !grouping.unmatched.is_empty() {
        let _ = writeln!(out, "Unplaced machines: {}", grouping.unmatched.len());
    }
    out
}

fn join(floors: &[u32]) -> String {
    floors.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorwatch_kernel::group_by_area;
    use floorwatch_kernel::models::RawMachine;
    use floorwatch_kernel::MachineRecord;

    fn machine(id: &str, area: &str, floor: &str, failed: bool) -> MachineRecord {
        MachineRecord::from(RawMachine {
            product_id: Some(id.into()),
            area: Some(area.into()),
            floor: Some(floor.into()),
            machine_failure: Some(if failed { "1" } else { "0" }.into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_render_floor() {
        let topology = Topology::default();
        let records = vec![
            machine("A", "1", "1", true),
            machine("B", "1", "1", false),
            machine("C", "4", "9", false),
        ];
        let grouping = group_by_area(&records, &topology);
        let text = render_map(&grouping, &topology, 1);

        assert!(text.starts_with("Floor 1  machines: 2  failures: 1\n"));
        assert!(
            text.contains("  [1] Main Production Floor (workspace)  machines: 2  failures: 1\n")
        );
        assert!(text.contains("  [7] Restrooms (restroom)  machines: 0  failures: 0\n"));
        assert!(text.contains("Other floors: 2\n"));
        assert!(text.contains("Unplaced machines: 1\n"));
    }

    #[test]
    fn test_unknown_floor() {
        let topology = Topology::default();
        let grouping = group_by_area(&[], &topology);
        assert_eq!(
            render_map(&grouping, &topology, 5),
            "Floor 5 has no areas. Known floors: 1, 2\n"
        );
    }
}

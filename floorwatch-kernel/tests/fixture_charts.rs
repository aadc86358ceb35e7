use floorwatch_devkit::{write_fixture, FixtureCsvBuilder};
use floorwatch_kernel::load_fixture;
use floorwatch_kernel::models::{FailureKind, MachineType};
use floorwatch_kernel::stats::{
    average_by_range, capacity_distribution, failure_type_counts, histogram, machine_statistics,
    sample_every, Bucket, AIR_TEMPERATURE_RANGES, SPEED_RANGES,
};

fn fixture() -> FixtureCsvBuilder {
    FixtureCsvBuilder::new()
        .machine("M14860", "M", 298.0, 1551.0, 42.0, 0.0, [false; 5])
        .machine("L47181", "L", 275.0, 1408.0, 46.0, 3.0, [false, true, false, false, false])
        .machine("L47182", "L", 302.0, 2861.0, 4.0, 5.0, [false, false, true, true, false])
        .machine("H29424", "H", 320.0, 1750.0, 30.0, 7.0, [true, false, false, false, false])
        .raw_row(&["5", "L47184", "X", "n/a", "", "abc"])
}

#[tokio::test]
async fn test_fixture_to_charts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), &fixture()).unwrap();
    let rows = load_fixture(&path).await.unwrap();
    assert_eq!(rows.len(), 5);

    let failures = failure_type_counts(rows.iter().map(|r| r.failures));
    assert_eq!(failures.get(FailureKind::ToolWear), 1);
    assert_eq!(failures.get(FailureKind::Power), 1);
    assert_eq!(failures.total(), 4);

    let temps = histogram(
        rows.iter().map(|r| r.air_temperature),
        &Bucket::parse_all(&AIR_TEMPERATURE_RANGES),
    );
    assert_eq!(temps.count_for("251-300"), Some(2));
    assert_eq!(temps.count_for("301-350"), Some(2));
    assert_eq!(temps.outside, 0);

    let torque_by_speed = average_by_range(
        rows.iter().map(|r| (r.rotational_speed, r.torque)),
        &Bucket::parse_all(&SPEED_RANGES),
    );
    assert_eq!(torque_by_speed.len(), 6);
    assert_eq!(torque_by_speed[0].bucket.label, "0-500");
    assert_eq!(torque_by_speed[0].average, None);
    assert_eq!(torque_by_speed[2].average, Some(46.0));
    assert_eq!(torque_by_speed[3].average, Some(36.0));
    assert_eq!(torque_by_speed[5].average, Some(4.0));

    let split = capacity_distribution(rows.iter().map(|r| r.machine_type));
    assert_eq!(split.count(MachineType::Low), 2);
    assert_eq!(split.unknown, 1);
    assert_eq!(split.percentage(MachineType::Low), 50.0);

    let stats = machine_statistics(&rows);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.machine_failures, 3);
    assert_eq!(stats.failure_percentage, 60.0);
    assert_eq!(stats.max_rotational_speed, Some(2861.0));
    assert_eq!(stats.min_torque, Some(4.0));

    assert_eq!(sample_every(&rows, 50).len(), 1);
}

//! Static CSV fixture feeding the chart-only screens.
//!
//! Separate from the live machines API: its columns carry their own names
//! (`"Rotational speed [rpm]"`, `"TWF"`, ...) and nothing here assumes both
//! sources describe the same machines.

use crate::error::IngestError;
use crate::ingest::{parse_csv_rows, CsvRow};
use crate::models::{parse_flag, parse_measure, FailureFlags, MachineType};
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub const COL_UDI: &str = "UDI";
pub const COL_PRODUCT_ID: &str = "Product ID";
pub const COL_TYPE: &str = "Type";
pub const COL_AIR_TEMPERATURE: &str = "Air temperature [K]";
pub const COL_PROCESS_TEMPERATURE: &str = "Process temperature [K]";
pub const COL_ROTATIONAL_SPEED: &str = "Rotational speed [rpm]";
pub const COL_TORQUE: &str = "Torque [Nm]";
pub const COL_TOOL_WEAR: &str = "Tool wear [min]";
pub const COL_MACHINE_FAILURE: &str = "Machine failure";
pub const COL_TWF: &str = "TWF";
pub const COL_HDF: &str = "HDF";
pub const COL_PWF: &str = "PWF";
pub const COL_OSF: &str = "OSF";
pub const COL_RNF: &str = "RNF";

/// One row of the fixture, typed. Every column is optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureRecord {
    pub udi: Option<String>,
    pub product_id: Option<String>,
    pub machine_type: Option<MachineType>,
    pub air_temperature: Option<f64>,
    pub process_temperature: Option<f64>,
    pub rotational_speed: Option<f64>,
    pub torque: Option<f64>,
    pub tool_wear: Option<f64>,
    pub machine_failure: bool,
    pub failures: FailureFlags,
}

impl FixtureRecord {
    pub fn from_row(row: &CsvRow) -> Self {
        let text = |column: &str| {
            row.get(column)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        FixtureRecord {
            udi: text(COL_UDI),
            product_id: text(COL_PRODUCT_ID),
            machine_type: row.get(COL_TYPE).and_then(MachineType::from_code),
            air_temperature: parse_measure(row.get(COL_AIR_TEMPERATURE)),
            process_temperature: parse_measure(row.get(COL_PROCESS_TEMPERATURE)),
            rotational_speed: parse_measure(row.get(COL_ROTATIONAL_SPEED)),
            torque: parse_measure(row.get(COL_TORQUE)),
            tool_wear: parse_measure(row.get(COL_TOOL_WEAR)),
            machine_failure: parse_flag(row.get(COL_MACHINE_FAILURE)),
            failures: FailureFlags {
                tool_wear: parse_flag(row.get(COL_TWF)),
                heat_dissipation: parse_flag(row.get(COL_HDF)),
                power: parse_flag(row.get(COL_PWF)),
                overstrain: parse_flag(row.get(COL_OSF)),
                random: parse_flag(row.get(COL_RNF)),
            },
        }
    }
}

pub fn parse_fixture<D: AsRef<[u8]>>(data: D) -> Result<Vec<FixtureRecord>, IngestError> {
    Ok(parse_csv_rows(data)?.iter().map(FixtureRecord::from_row).collect())
}

/// Read and type the fixture file
pub async fn load_fixture<P: AsRef<Path>>(path: P) -> Result<Vec<FixtureRecord>, IngestError> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await?;
    let records = parse_fixture(&data)?;
    info!(path = %path.display(), records = records.len(), "loaded csv fixture");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "UDI,Product ID,Type,Air temperature [K],Process temperature [K],\
    Rotational speed [rpm],Torque [Nm],Tool wear [min],Machine failure,TWF,HDF,PWF,OSF,RNF\n\
1,M14860,M,298.1,308.6,1551,42.8,0,0,0,0,0,0,0\n\
2,L47181,L,298.2,308.7,1408,46.3,3,1,0,1,0,0,0\n\
3,L47182,L,n/a,308.5,1498,,5,0,0,0,0,0,0\n";

    #[test]
    fn test_from_row_maps_bracketed_columns() {
        let records = parse_fixture(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].udi.as_deref(), Some("1"));
        assert_eq!(records[0].machine_type, Some(MachineType::Medium));
        assert_eq!(records[0].rotational_speed, Some(1551.0));
        assert_eq!(records[1].failures.heat_dissipation, true);
        assert!(records[1].machine_failure);
        assert_eq!(records[2].air_temperature, None);
        assert_eq!(records[2].torque, None);
    }

    #[test]
    fn test_missing_columns_are_missing_values() {
        let records = parse_fixture("UDI,TWF\n7,1\n").unwrap();
        assert_eq!(records[0].udi.as_deref(), Some("7"));
        assert!(records[0].failures.tool_wear);
        assert_eq!(records[0].rotational_speed, None);
        assert_eq!(records[0].product_id, None);
    }

    #[tokio::test]
    async fn test_load_fixture_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let records = load_fixture(file.path()).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_bad_byte_degrades_one_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data: &[u8] =
            b"Product ID,Rotational speed [rpm],Torque [Nm]\n\
              M1,1500,40\nM2,1600,4\xff2\nM3,1700,44\n";
        file.write_all(data).unwrap();

        let records = load_fixture(file.path()).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].product_id.as_deref(), Some("M2"));
        assert_eq!(records[1].rotational_speed, Some(1600.0));
        assert_eq!(records[1].torque, None);
        assert_eq!(records[0].torque, Some(40.0));
        assert_eq!(records[2].torque, Some(44.0));
    }

    #[tokio::test]
    async fn test_load_missing_fixture_is_io_error() {
        let err = load_fixture("/nonexistent/machine_data.csv").await.unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Capacity class of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    #[serde(rename = "H")]
    High,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Low,
}

impl MachineType {
    pub const ALL: [MachineType; 3] = [MachineType::High, MachineType::Medium, MachineType::Low];

    /// Exact, case-sensitive match on the one-letter code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "H" => Some(MachineType::High),
            "M" => Some(MachineType::Medium),
            "L" => Some(MachineType::Low),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MachineType::High => "H",
            MachineType::Medium => "M",
            MachineType::Low => "L",
        }
    }

    pub fn capacity_label(&self) -> &'static str {
        match self {
            MachineType::High => "High Capacity",
            MachineType::Medium => "Medium Capacity",
            MachineType::Low => "Low Capacity",
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The five independent failure causes, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    ToolWear,
    HeatDissipation,
    Power,
    Overstrain,
    Random,
}

impl FailureKind {
    pub const ALL: [FailureKind; 5] = [
        FailureKind::ToolWear,
        FailureKind::HeatDissipation,
        FailureKind::Power,
        FailureKind::Overstrain,
        FailureKind::Random,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::ToolWear => "TWF",
            FailureKind::HeatDissipation => "HDF",
            FailureKind::Power => "PWF",
            FailureKind::Overstrain => "OSF",
            FailureKind::Random => "RNF",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::ToolWear => "Tool Wear Failure",
            FailureKind::HeatDissipation => "Heat Dissipation Failure",
            FailureKind::Power => "Power Failure",
            FailureKind::Overstrain => "Overstrain Failure",
            FailureKind::Random => "Random Failure",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureFlags {
    pub tool_wear: bool,
    pub heat_dissipation: bool,
    pub power: bool,
    pub overstrain: bool,
    pub random: bool,
}

impl FailureFlags {
    pub fn is_set(&self, kind: FailureKind) -> bool {
        match kind {
            FailureKind::ToolWear => self.tool_wear,
            FailureKind::HeatDissipation => self.heat_dissipation,
            FailureKind::Power => self.power,
            FailureKind::Overstrain => self.overstrain,
            FailureKind::Random => self.random,
        }
    }

    /// Active flags in scan order (TWF, HDF, PWF, OSF, RNF)
    pub fn active(&self) -> impl Iterator<Item = FailureKind> + '_ {
        FailureKind::ALL.into_iter().filter(move |k| self.is_set(*k))
    }

    pub fn any(&self) -> bool {
        self.active().next().is_some()
    }
}

/// One telemetry snapshot for one physical unit, as typed by ingestion.
///
/// Numeric fields are `None` when the source text did not parse. `floor` and
/// `area` keep the text they arrived with; area matching compares them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineRecord {
    pub product_id: String,
    pub udi: Option<String>,
    pub machine_type: Option<MachineType>,
    pub air_temperature: Option<f64>,
    pub process_temperature: Option<f64>,
    pub rotational_speed: Option<f64>,
    pub torque: Option<f64>,
    pub tool_wear: Option<f64>,
    pub machine_failure: bool,
    pub failures: FailureFlags,
    pub floor: String,
    pub area: String,
}

impl MachineRecord {
    /// Display label, ex: "H Machine M14860 (Floor 1, Area 2)"
    pub fn label(&self) -> String {
        let machine_type = self.machine_type.map(|t| t.code()).unwrap_or("Unknown");
        format!(
            "{} Machine {} (Floor {}, Area {})",
            machine_type, self.product_id, self.floor, self.area
        )
    }

    /// Only high and medium capacity machines raise alerts.
    pub fn is_alert_eligible(&self) -> bool {
        matches!(self.machine_type, Some(MachineType::High) | Some(MachineType::Medium))
    }

    /// Whether `machine_failure` agrees with the five cause flags.
    /// The source never guarantees it; nothing here relies on it.
    pub fn flags_consistent(&self) -> bool {
        self.machine_failure == self.failures.any()
    }
}

impl From<RawMachine> for MachineRecord {
    fn from(raw: RawMachine) -> Self {
        MachineRecord {
            product_id: raw.product_id.unwrap_or_default(),
            udi: raw.udi.filter(|u| !u.trim().is_empty()),
            machine_type: raw.machine_type.as_deref().and_then(MachineType::from_code),
            air_temperature: parse_measure(raw.air_temperature.as_deref()),
            process_temperature: parse_measure(raw.process_temperature.as_deref()),
            rotational_speed: parse_measure(raw.rotational_speed.as_deref()),
            torque: parse_measure(raw.torque.as_deref()),
            tool_wear: parse_measure(raw.tool_wear.as_deref()),
            machine_failure: parse_flag(raw.machine_failure.as_deref()),
            failures: FailureFlags {
                tool_wear: parse_flag(raw.twf.as_deref()),
                heat_dissipation: parse_flag(raw.hdf.as_deref()),
                power: parse_flag(raw.pwf.as_deref()),
                overstrain: parse_flag(raw.osf.as_deref()),
                random: parse_flag(raw.rnf.as_deref()),
            },
            floor: raw.floor.unwrap_or_default(),
            area: raw.area.unwrap_or_default(),
        }
    }
}

/// Wire shape of one entry of `GET /machines`. Every field is read as text.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMachine {
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub machine_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub air_temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub process_temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rotational_speed: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub torque: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tool_wear: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub machine_failure: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub udi: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub twf: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hdf: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pwf: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub osf: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rnf: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub area: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub floor: Option<String>,
}

// strings, numbers and booleans all become text; null and nested values are missing
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if b { "1" } else { "0" }.to_string()),
        _ => None,
    }))
}

/// Locale-independent decimal parse. Empty, garbage or non-finite text is missing.
pub fn parse_measure(text: Option<&str>) -> Option<f64> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A flag is raised only by the exact text "1".
pub fn parse_flag(text: Option<&str>) -> bool {
    matches!(text.map(str::trim), Some("1"))
}

/*!
Builders de données de test

- `RecordBuilder`: une entrée du machines API (JSON camelCase, champs texte)
- `FixtureCsvBuilder`: un fichier CSV au format de la fixture statique
*/

use serde_json::{json, Map, Value};

/// Entrée `GET /machines`, valeurs réalistes par défaut
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    fields: Map<String, Value>,
}

impl RecordBuilder {
    pub fn new(product_id: &str) -> Self {
        let base = json!({
            "productId": product_id,
            "type": "M",
            "airTemperature": "298.1",
            "processTemperature": "308.6",
            "rotationalSpeed": "1551",
            "torque": "42.8",
            "toolWear": "0",
            "machineFailure": "0",
            "twf": "0",
            "hdf": "0",
            "pwf": "0",
            "osf": "0",
            "rnf": "0",
            "area": "1",
            "floor": "1",
        });
        let fields = match base {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { fields }
    }

    /// Définit un champ brut (n'importe quelle valeur JSON)
    pub fn set<V: Into<Value>>(mut self, field: &str, value: V) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Retire un champ du payload
    pub fn without(mut self, field: &str) -> Self {
        self.fields.remove(field);
        self
    }

    pub fn udi(self, udi: &str) -> Self {
        self.set("udi", udi)
    }

    pub fn machine_type(self, code: &str) -> Self {
        self.set("type", code)
    }

    pub fn placed(self, area: &str, floor: &str) -> Self {
        self.set("area", area).set("floor", floor)
    }

    pub fn speed(self, rpm: &str) -> Self {
        self.set("rotationalSpeed", rpm)
    }

    pub fn torque(self, nm: &str) -> Self {
        self.set("torque", nm)
    }

    /// Lève `machineFailure` sans toucher aux causes
    pub fn failed(self) -> Self {
        self.set("machineFailure", "1")
    }

    /// Lève une cause (`"twf"`, `"hdf"`, `"pwf"`, `"osf"`, `"rnf"`) et `machineFailure`
    pub fn flag(self, cause: &str) -> Self {
        self.set(cause, "1").failed()
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

/// Payload `GET /machines` pour une liste d'entrées
pub fn machines_payload(records: &[Value]) -> String {
    Value::Array(records.to_vec()).to_string()
}

pub const FIXTURE_HEADER: [&str; 14] = [
    "UDI",
    "Product ID",
    "Type",
    "Air temperature [K]",
    "Process temperature [K]",
    "Rotational speed [rpm]",
    "Torque [Nm]",
    "Tool wear [min]",
    "Machine failure",
    "TWF",
    "HDF",
    "PWF",
    "OSF",
    "RNF",
];

/// CSV au format de la fixture; les cellules contenant `,` ou `"` sont quotées
#[derive(Debug, Clone, Default)]
pub struct FixtureCsvBuilder {
    rows: Vec<Vec<String>>,
}

impl FixtureCsvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ligne typique: `(product_id, type, air, speed, torque, tool_wear, failures TWF..RNF)`
    #[allow(clippy::too_many_arguments)]
    pub fn machine(
        mut self,
        product_id: &str,
        machine_type: &str,
        air_temperature: f64,
        rotational_speed: f64,
        torque: f64,
        tool_wear: f64,
        failures: [bool; 5],
    ) -> Self {
        let udi = (self.rows.len() + 1).to_string();
        let flag = |b: bool| if b { "1" } else { "0" }.to_string();
        let mut row = vec![
            udi,
            product_id.to_string(),
            machine_type.to_string(),
            air_temperature.to_string(),
            (air_temperature + 10.0).to_string(),
            rotational_speed.to_string(),
            torque.to_string(),
            tool_wear.to_string(),
            flag(failures.iter().any(|f| *f)),
        ];
        row.extend(failures.iter().map(|f| flag(*f)));
        self.rows.push(row);
        self
    }

    /// Ligne brute, cellules telles quelles (lignes courtes acceptées)
    pub fn raw_row(mut self, cells: &[&str]) -> Self {
        self.rows.push(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn build(&self) -> String {
        let mut out = FIXTURE_HEADER.join(",");
        out.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|c| quote(c)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

fn quote(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = RecordBuilder::new("H29424")
            .machine_type("H")
            .placed("8", "2")
            .flag("pwf")
            .without("toolWear")
            .build();

        assert_eq!(record["productId"], "H29424");
        assert_eq!(record["type"], "H");
        assert_eq!(record["area"], "8");
        assert_eq!(record["pwf"], "1");
        assert_eq!(record["machineFailure"], "1");
        assert!(record.get("toolWear").is_none());
    }

    #[test]
    fn test_fixture_builder() {
        let csv = FixtureCsvBuilder::new()
            .machine("M14860", "M", 300.0, 1551.0, 42.8, 0.0, [false; 5])
            .raw_row(&["2", "L,47181"])
            .build();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("UDI,Product ID,Type"));
        assert_eq!(lines[1], "1,M14860,M,300,310,1551,42.8,0,0,0,0,0,0,0");
        assert_eq!(lines[2], "2,\"L,47181\"");
    }

    #[test]
    fn test_machines_payload() {
        let payload = machines_payload(&[RecordBuilder::new("A").build()]);
        assert!(payload.starts_with('['));
        assert!(payload.contains("\"productId\":\"A\""));
    }
}

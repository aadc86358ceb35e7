use crate::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    Workspace,
    Meeting,
    Restroom,
    Utility,
    Office,
}

impl AreaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaKind::Workspace => "workspace",
            AreaKind::Meeting => "meeting",
            AreaKind::Restroom => "restroom",
            AreaKind::Utility => "utility",
            AreaKind::Office => "office",
        }
    }
}

/// A named zone on a floor. Machines attach to it by placement text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AreaKind,
    #[serde(default)]
    pub description: String,
    pub floor: u32,
}

impl Area {
    pub fn new(id: u32, name: &str, kind: AreaKind, description: &str, floor: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            description: description.to_string(),
            floor,
        }
    }

    /// `(area, floor)` placement text a record must carry to belong here
    pub fn placement_key(&self) -> (String, String) {
        (self.id.to_string(), self.floor.to_string())
    }
}

/// Immutable area table, fixed at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    areas: Vec<Area>,
}

impl Topology {
    /// Rejects two areas sharing the same `(id, floor)`, which would make
    /// placement ambiguous.
    pub fn new(areas: Vec<Area>) -> Result<Self, TopologyError> {
        let mut seen = HashSet::new();
        for area in &areas {
            if !seen.insert((area.id, area.floor)) {
                return Err(TopologyError::DuplicateArea {
                    id: area.id,
                    floor: area.floor,
                });
            }
        }
        Ok(Self { areas })
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn area(&self, id: u32) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// Distinct floors, ascending
    pub fn floors(&self) -> Vec<u32> {
        let mut floors: Vec<u32> = self.areas.iter().map(|a| a.floor).collect();
        floors.sort_unstable();
        floors.dedup();
        floors
    }

    pub fn areas_on_floor(&self, floor: u32) -> impl Iterator<Item = &Area> {
        self.areas.iter().filter(move |a| a.floor == floor)
    }
}

impl Default for Topology {
    /// The factory layout shipped with the dashboard (two floors, eight areas)
    fn default() -> Self {
        use AreaKind::*;
        Self {
            areas: vec![
                Area::new(
                    1,
                    "Main Production Floor",
                    Workspace,
                    "Large open area with primary production machinery",
                    1,
                ),
                Area::new(
                    2,
                    "Quality Control Lab",
                    Workspace,
                    "Specialized area for product testing and quality assurance",
                    1,
                ),
                Area::new(
                    3,
                    "Conference Room A",
                    Meeting,
                    "Large meeting room for team gatherings and client presentations",
                    2,
                ),
                Area::new(
                    4,
                    "Executive Offices",
                    Office,
                    "Private offices for company executives",
                    2,
                ),
                Area::new(
                    5,
                    "Break Room",
                    Utility,
                    "Communal area for employee breaks and meals",
                    1,
                ),
                Area::new(
                    6,
                    "Maintenance Workshop",
                    Utility,
                    "Area for machine repairs and maintenance",
                    1,
                ),
                Area::new(7, "Restrooms", Restroom, "Employee restrooms", 1),
                Area::new(8, "R&D Lab", Workspace, "Research and development laboratory", 2),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topology() {
        let topology = Topology::default();
        assert_eq!(topology.areas().len(), 8);
        assert_eq!(topology.floors(), vec![1, 2]);
        assert_eq!(topology.areas_on_floor(2).count(), 3);
        assert_eq!(topology.area(8).map(|a| a.name.as_str()), Some("R&D Lab"));
        assert!(Topology::new(topology.areas().to_vec()).is_ok());
    }

    #[test]
    fn test_duplicate_area_rejected() {
        let areas = vec![
            Area::new(1, "A", AreaKind::Workspace, "", 1),
            Area::new(1, "B", AreaKind::Office, "", 1),
        ];
        assert_eq!(
            Topology::new(areas),
            Err(TopologyError::DuplicateArea { id: 1, floor: 1 })
        );
    }

    #[test]
    fn test_same_id_on_other_floor_allowed() {
        let areas = vec![
            Area::new(1, "A", AreaKind::Workspace, "", 1),
            Area::new(1, "B", AreaKind::Office, "", 2),
        ];
        assert!(Topology::new(areas).is_ok());
    }

    #[test]
    fn test_area_from_yaml() {
        let area: Area =
            serde_yaml::from_str("id: 9\nname: Paint Shop\ntype: workspace\nfloor: 3\n").unwrap();
        assert_eq!(area.kind, AreaKind::Workspace);
        assert_eq!(area.description, "");
        assert_eq!(area.placement_key(), ("9".to_string(), "3".to_string()));
    }
}

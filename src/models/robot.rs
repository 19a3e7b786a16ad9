use serde::{Deserialize, Serialize};

/// Operational status of a fleet robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotStatus {
    #[serde(rename = "ATIVO")]
    Active,
    #[serde(rename = "INATIVO")]
    Inactive,
    #[serde(rename = "MANUTENCAO")]
    Maintenance,
    #[serde(rename = "EM_OPERACAO")]
    InOperation,
}

impl RobotStatus {
    /// Display label for list rows and filter chips.
    pub fn label(&self) -> &'static str {
        match self {
            RobotStatus::Active => "Active",
            RobotStatus::Inactive => "Inactive",
            RobotStatus::Maintenance => "Maintenance",
            RobotStatus::InOperation => "In operation",
        }
    }

    /// All statuses in filter-chip order.
    pub fn all() -> &'static [RobotStatus] {
        &[
            RobotStatus::Active,
            RobotStatus::Inactive,
            RobotStatus::Maintenance,
            RobotStatus::InOperation,
        ]
    }

    /// The status an activate/deactivate toggle moves to.
    /// Robots in maintenance or mid-operation are left alone.
    pub fn toggled(&self) -> Option<RobotStatus> {
        match self {
            RobotStatus::Active => Some(RobotStatus::Inactive),
            RobotStatus::Inactive => Some(RobotStatus::Active),
            RobotStatus::Maintenance | RobotStatus::InOperation => None,
        }
    }
}

/// A fleet robot as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    pub id: i64,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "modelo")]
    pub model: String,
    pub status: RobotStatus,
    #[serde(rename = "localizacao")]
    pub location: Option<String>,
    #[serde(rename = "nivelBateria")]
    pub battery_level: Option<i32>,
}

impl Robot {
    /// Case-insensitive search over code and model.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let q = query.to_lowercase();
        self.code.to_lowercase().contains(&q) || self.model.to_lowercase().contains(&q)
    }

    pub fn battery_display(&self) -> String {
        match self.battery_level {
            Some(level) => format!("{}%", level),
            None => "-".to_string(),
        }
    }

    pub fn location_display(&self) -> &str {
        self.location.as_deref().unwrap_or("-")
    }
}

/// Abbreviated robot reference embedded in sensor events and deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "codigo")]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_robot_wire_format() {
        let json = r#"{"id":7,"codigo":"RBT-007","modelo":"CargoMax 3","status":"EM_OPERACAO","localizacao":"Setor B - Doca 4","nivelBateria":62}"#;
        let robot: Robot = serde_json::from_str(json).expect("robot JSON should parse");
        assert_eq!(robot.code, "RBT-007");
        assert_eq!(robot.model, "CargoMax 3");
        assert_eq!(robot.status, RobotStatus::InOperation);
        assert_eq!(robot.location.as_deref(), Some("Setor B - Doca 4"));
        assert_eq!(robot.battery_level, Some(62));
    }

    #[test]
    fn test_status_serializes_to_wire_name() {
        assert_eq!(
            serde_json::to_string(&RobotStatus::Maintenance).unwrap(),
            "\"MANUTENCAO\""
        );
        assert_eq!(
            serde_json::to_string(&RobotStatus::Active).unwrap(),
            "\"ATIVO\""
        );
    }

    #[test]
    fn test_toggled_only_for_active_inactive() {
        assert_eq!(RobotStatus::Active.toggled(), Some(RobotStatus::Inactive));
        assert_eq!(RobotStatus::Inactive.toggled(), Some(RobotStatus::Active));
        assert_eq!(RobotStatus::Maintenance.toggled(), None);
        assert_eq!(RobotStatus::InOperation.toggled(), None);
    }

    #[test]
    fn test_matches_search() {
        let robot = Robot {
            id: 1,
            code: "RBT-001".to_string(),
            model: "CargoMax 3".to_string(),
            status: RobotStatus::Active,
            location: None,
            battery_level: None,
        };
        assert!(robot.matches_search(""));
        assert!(robot.matches_search("rbt-0"));
        assert!(robot.matches_search("cargomax"));
        assert!(!robot.matches_search("picker"));
    }
}

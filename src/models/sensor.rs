use serde::{Deserialize, Serialize};

use super::RobotRef;

/// Sensor types reported by the backend, in filter-chip order.
/// The backend sends these as free-form strings; this list mirrors the
/// types the fleet actually carries.
pub const SENSOR_TYPES: [&str; 7] = [
    "Proximidade",
    "Temperatura",
    "Umidade",
    "Movimento",
    "Peso",
    "Obstáculo",
    "Luminosidade",
];

/// Severity of a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorStatus {
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "ALERTA")]
    Alert,
    #[serde(rename = "CRITICO")]
    Critical,
}

impl SensorStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SensorStatus::Normal => "Normal",
            SensorStatus::Alert => "Alert",
            SensorStatus::Critical => "Critical",
        }
    }
}

/// A sensor reading or alert reported by a robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEvent {
    pub id: i64,
    #[serde(rename = "robo")]
    pub robot: RobotRef,
    #[serde(rename = "tipoSensor")]
    pub sensor_type: String,
    #[serde(rename = "leitura")]
    pub reading: Option<f64>,
    pub status: SensorStatus,
    #[serde(rename = "dataHora")]
    pub timestamp: Option<String>,
    #[serde(rename = "localizacao")]
    pub location: Option<String>,
}

impl SensorEvent {
    /// Case-insensitive search over the reporting robot's code.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.robot
            .code
            .to_lowercase()
            .contains(&query.to_lowercase())
    }

    pub fn reading_display(&self) -> String {
        match self.reading {
            Some(value) => format!("{:.1}", value),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sensor_event_wire_format() {
        let json = r#"{"id":42,"robo":{"id":7,"codigo":"RBT-007"},"tipoSensor":"Temperatura","leitura":78.4,"status":"CRITICO","dataHora":"2025-06-12T14:03:00Z","localizacao":"Setor A"}"#;
        let event: SensorEvent = serde_json::from_str(json).expect("event JSON should parse");
        assert_eq!(event.robot.code, "RBT-007");
        assert_eq!(event.sensor_type, "Temperatura");
        assert_eq!(event.status, SensorStatus::Critical);
        assert_eq!(event.reading, Some(78.4));
    }

    #[test]
    fn test_parse_event_without_reading() {
        // Obstacle events carry no numeric reading
        let json = r#"{"id":43,"robo":{"codigo":"RBT-002"},"tipoSensor":"Obstáculo","leitura":null,"status":"ALERTA","dataHora":null,"localizacao":null}"#;
        let event: SensorEvent = serde_json::from_str(json).expect("event JSON should parse");
        assert_eq!(event.reading, None);
        assert_eq!(event.reading_display(), "-");
        assert_eq!(event.robot.id, None);
    }

    #[test]
    fn test_matches_search_on_robot_code() {
        let event = SensorEvent {
            id: 1,
            robot: RobotRef {
                id: Some(3),
                code: "RBT-003".to_string(),
            },
            sensor_type: "Peso".to_string(),
            reading: Some(12.0),
            status: SensorStatus::Normal,
            timestamp: None,
            location: None,
        };
        assert!(event.matches_search("rbt-003"));
        assert!(!event.matches_search("rbt-009"));
    }
}

use serde::{Deserialize, Serialize};

use super::RobotRef;

/// Lifecycle status of a delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "EM_ANDAMENTO")]
    InProgress,
    #[serde(rename = "CONCLUIDA")]
    Completed,
    #[serde(rename = "CANCELADA")]
    Cancelled,
    #[serde(rename = "ATRASADA")]
    Late,
}

impl DeliveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::InProgress => "In progress",
            DeliveryStatus::Completed => "Completed",
            DeliveryStatus::Cancelled => "Cancelled",
            DeliveryStatus::Late => "Late",
        }
    }

    /// All statuses in filter-chip order.
    pub fn all() -> &'static [DeliveryStatus] {
        &[
            DeliveryStatus::Pending,
            DeliveryStatus::InProgress,
            DeliveryStatus::Completed,
            DeliveryStatus::Cancelled,
            DeliveryStatus::Late,
        ]
    }

    /// The status the advance action moves to: pending orders start,
    /// in-progress orders complete. Terminal states have no action.
    pub fn advanced(&self) -> Option<DeliveryStatus> {
        match self {
            DeliveryStatus::Pending => Some(DeliveryStatus::InProgress),
            DeliveryStatus::InProgress => Some(DeliveryStatus::Completed),
            DeliveryStatus::Completed | DeliveryStatus::Cancelled | DeliveryStatus::Late => None,
        }
    }

    /// Hint shown next to the advance action for the current status.
    pub fn advance_label(&self) -> Option<&'static str> {
        match self {
            DeliveryStatus::Pending => Some("start"),
            DeliveryStatus::InProgress => Some("complete"),
            _ => None,
        }
    }
}

/// A delivery order carried out by a robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: i64,
    #[serde(rename = "codigoPedido")]
    pub order_code: String,
    #[serde(rename = "robo")]
    pub robot: RobotRef,
    #[serde(rename = "origem")]
    pub origin: String,
    #[serde(rename = "destino")]
    pub destination: String,
    #[serde(rename = "distancia")]
    pub distance_km: Option<f64>,
    pub status: DeliveryStatus,
    #[serde(rename = "dataInicio")]
    pub started_at: Option<String>,
    #[serde(rename = "dataFim")]
    pub finished_at: Option<String>,
    #[serde(rename = "observacoes")]
    pub notes: Option<String>,
}

impl Delivery {
    /// Case-insensitive search over the order code.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.order_code
            .to_lowercase()
            .contains(&query.to_lowercase())
    }

    pub fn route_display(&self) -> String {
        format!("{} -> {}", self.origin, self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delivery_wire_format() {
        let json = r#"{"id":12,"codigoPedido":"PED-2031","robo":{"id":3,"codigo":"RBT-003"},"origem":"CD Norte","destino":"Loja 18","distancia":4.7,"status":"EM_ANDAMENTO","dataInicio":"2025-06-12T09:00:00Z","dataFim":null,"observacoes":"Carga frágil"}"#;
        let delivery: Delivery = serde_json::from_str(json).expect("delivery JSON should parse");
        assert_eq!(delivery.order_code, "PED-2031");
        assert_eq!(delivery.status, DeliveryStatus::InProgress);
        assert_eq!(delivery.distance_km, Some(4.7));
        assert_eq!(delivery.finished_at, None);
        assert_eq!(delivery.notes.as_deref(), Some("Carga frágil"));
    }

    #[test]
    fn test_advance_transitions() {
        assert_eq!(
            DeliveryStatus::Pending.advanced(),
            Some(DeliveryStatus::InProgress)
        );
        assert_eq!(
            DeliveryStatus::InProgress.advanced(),
            Some(DeliveryStatus::Completed)
        );
        assert_eq!(DeliveryStatus::Completed.advanced(), None);
        assert_eq!(DeliveryStatus::Cancelled.advanced(), None);
        assert_eq!(DeliveryStatus::Late.advanced(), None);
    }

    #[test]
    fn test_status_serializes_to_wire_name() {
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::InProgress).unwrap(),
            "\"EM_ANDAMENTO\""
        );
    }
}

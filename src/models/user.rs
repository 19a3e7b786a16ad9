use serde::{Deserialize, Serialize};

/// Account role. Admins additionally see the user management screen;
/// the backend enforces the actual authorization on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "USUARIO")]
    Operator,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Operator => "Operator",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// An operator account as returned by the backend. The login response may
/// omit profile fields the list endpoint includes, so everything beyond
/// username and role is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "nomeCompleto", default)]
    pub full_name: Option<String>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "tipoUsuario")]
    pub role: Role,
}

impl User {
    /// Preferred display name: full name when the server sent one.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Body for user create/update requests. Password is required on create,
/// optional on update; the serializer omits it when unset so an edit
/// without a new password leaves the old one in place.
#[derive(Debug, Clone, Serialize)]
pub struct UserPayload {
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "telefone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "tipoUsuario")]
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sparse_login_profile() {
        // The login response can carry only id, username, and role
        let json = r#"{"id":1,"username":"alice","tipoUsuario":"ADMIN"}"#;
        let user: User = serde_json::from_str(json).expect("user JSON should parse");
        assert_eq!(user.id, Some(1));
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_admin());
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn test_parse_full_profile() {
        let json = r#"{"id":4,"nomeCompleto":"Bruna Lima","username":"bruna","email":"bruna@example.com","telefone":"11987654321","tipoUsuario":"USUARIO"}"#;
        let user: User = serde_json::from_str(json).expect("user JSON should parse");
        assert_eq!(user.display_name(), "Bruna Lima");
        assert_eq!(user.role, Role::Operator);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_profile_round_trip() {
        let user = User {
            id: Some(9),
            full_name: Some("Carla Souza".to_string()),
            username: "carla".to_string(),
            email: Some("carla@example.com".to_string()),
            phone: None,
            role: Role::Admin,
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_payload_omits_unset_password_and_phone() {
        let payload = UserPayload {
            full_name: "Dora Reis".to_string(),
            username: "dora".to_string(),
            email: "dora@example.com".to_string(),
            phone: None,
            role: Role::Operator,
            password: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("telefone"));
        assert!(json.contains("\"nomeCompleto\":\"Dora Reis\""));
        assert!(json.contains("\"tipoUsuario\":\"USUARIO\""));
    }
}

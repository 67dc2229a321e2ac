//! Auth API DTOs and the authenticated identity

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Login request body for `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
///
/// Some backends echo the user record; the client never relies on it and
/// always probes `/profile` afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<Value>,
}

/// Response of the session probe `GET /profile`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(rename = "profileType")]
    pub profile_type: String,
    #[serde(default)]
    pub profile: Value,
}

/// Role tag of the logged-in account (display only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Affiliate,
    Vendor,
    Other(String),
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        Role::parse(&tag)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl Role {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "admin" | "superadmin" => Role::Admin,
            "affiliate" => Role::Affiliate,
            "vendor" => Role::Vendor,
            _ => Role::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Affiliate => "affiliate",
            Role::Vendor => "vendor",
            Role::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity derived from the profile probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub role: Role,
    pub display_name: String,
    pub email: Option<String>,
    /// Raw profile as returned by the backend; its shape varies by role
    pub profile: Value,
}

/// Name keys per profile type, most specific first
const AFFILIATE_NAME_KEYS: &[&str] = &["name_affiliate", "name", "username"];
const VENDOR_NAME_KEYS: &[&str] = &["name_vendor", "name", "username"];
const DEFAULT_NAME_KEYS: &[&str] = &["name", "username", "name_admin"];

impl Identity {
    pub fn from_profile(resp: ProfileResponse) -> Self {
        let role = Role::parse(&resp.profile_type);
        let keys = match role {
            Role::Affiliate => AFFILIATE_NAME_KEYS,
            Role::Vendor => VENDOR_NAME_KEYS,
            _ => DEFAULT_NAME_KEYS,
        };

        let email = string_field(&resp.profile, &["email"]);
        let display_name = string_field(&resp.profile, keys)
            .or_else(|| email.clone())
            .unwrap_or_else(|| role.to_string());

        Self {
            role,
            display_name,
            email,
            profile: resp.profile,
        }
    }
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_from_affiliate_profile() {
        let resp: ProfileResponse = serde_json::from_value(json!({
            "profileType": "Affiliate",
            "profile": { "name_affiliate": "Budi", "email": "budi@example.com" }
        }))
        .unwrap();

        let identity = Identity::from_profile(resp);
        assert_eq!(identity.role, Role::Affiliate);
        assert_eq!(identity.display_name, "Budi");
        assert_eq!(identity.email.as_deref(), Some("budi@example.com"));
    }

    #[test]
    fn test_identity_falls_back_to_email() {
        let resp = ProfileResponse {
            profile_type: "admin".into(),
            profile: json!({ "email": "root@example.com" }),
        };
        let identity = Identity::from_profile(resp);
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.display_name, "root@example.com");
    }

    #[test]
    fn test_unknown_role_is_kept() {
        assert_eq!(Role::parse("Finance"), Role::Other("Finance".into()));
        assert_eq!(Role::parse(" VENDOR "), Role::Vendor);
    }
}

//! User model

use serde::{Deserialize, Serialize};

use super::Entity;

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "user" => Some(UserRole::User),
            _ => None,
        }
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database ID
    pub id: i64,
    /// Login name, unique
    pub username: String,
    /// Password hash (never serialized)
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Name shown in the toolbar
    pub display_name: String,
    #[serde(default)]
    pub role: UserRole,
    /// Stored image reference (`images/<file>`)
    #[serde(default)]
    pub avatar: Option<String>,
    /// Rotated on logout; tokens carrying an older nonce are rejected
    #[serde(skip_serializing, default)]
    pub session_nonce: String,
}

impl User {
    /// Create a regular user
    pub fn new(username: String, password_hash: String, display_name: String) -> Self {
        Self {
            id: 0,
            username,
            password: password_hash,
            display_name,
            role: UserRole::User,
            avatar: None,
            session_nonce: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Create an admin user
    pub fn admin(username: String, password_hash: String, display_name: String) -> Self {
        Self {
            role: UserRole::Admin,
            ..Self::new(username, password_hash, display_name)
        }
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Body returned by login and registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    /// Access token, also set as a cookie
    pub token: String,
}

impl Entity for User {
    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("curator"), None);
    }

    #[test]
    fn test_secrets_not_serialized() {
        let user = User::admin("root".into(), "salt$hash".into(), "Root".into());
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["role"], "admin");
        assert_eq!(json["displayName"], "Root");
        assert!(json.get("password").is_none());
        assert!(json.get("sessionNonce").is_none());

        let back: User = serde_json::from_value(json).unwrap();
        assert!(back.password.is_empty());
        assert!(back.is_admin());
    }
}

//! User data types
//!
//! Managers own coaching reports; reps are the subject of them.

use serde::{Deserialize, Serialize};

/// Role of a user in the coaching hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Manager,
    Rep,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Rep => "rep",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manager" => Ok(Self::Manager),
            "rep" => Ok(Self::Rep),
            other => Err(format!("Unknown user role: {}", other)),
        }
    }
}

/// Full user record as stored
///
/// Passwords are stored and compared as plain text, matching the demo
/// login flow. Never serialize this type to a client; use [`UserProfile`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub manager_id: Option<String>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            manager_id: self.manager_id.clone(),
        }
    }
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub manager_id: Option<String>,
}

/// Fields required to create a user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub manager_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("manager".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert_eq!("REP".parse::<UserRole>().unwrap(), UserRole::Rep);
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_profile_omits_password() {
        let user = User {
            id: "REP-01".to_string(),
            username: "mjohnson".to_string(),
            email: "mjohnson@healthcorp.com".to_string(),
            password: "password123".to_string(),
            name: "Michael Johnson".to_string(),
            role: UserRole::Rep,
            manager_id: Some("MGR-99".to_string()),
        };

        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(json.contains("\"role\":\"rep\""));
        assert!(!json.contains("password"));
    }
}

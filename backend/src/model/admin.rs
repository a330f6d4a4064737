//! Administrative entities: groups, roles, users and nodes.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Name of the built-in administrator account.
pub const SUPER_USER: &str = "ercole";
/// Group granting administrative rights.
pub const ADMIN_GROUP: &str = "admin";
/// Group assigned to users that must change a generated password.
pub const LIMITED_GROUP: &str = "limited";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Group {
    pub name: String,
    pub roles: Vec<String>,
}

impl Group {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub location: String,
    pub permission: String,
}

impl Role {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name is required"));
        }
        Ok(())
    }
}

/// User account. The password is accepted on input and never echoed back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub groups: Vec<String>,
    pub provider: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.username == SUPER_USER || self.groups.iter().any(|g| g == ADMIN_GROUP)
    }
}

/// Body of `PUT /admins/users/{username}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct UserGroupsUpdate {
    pub groups: Vec<String>,
}

/// Body of `PUT /users/{username}/change-password`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirmed_password: String,
}

/// Navigation node of the frontend menu, gated by roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Node {
    pub name: String,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Node {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_detection() {
        let super_user = User {
            username: SUPER_USER.to_string(),
            ..Default::default()
        };
        assert!(super_user.is_admin());

        let mut user = User {
            username: "mario".to_string(),
            ..Default::default()
        };
        assert!(!user.is_admin());
        user.groups.push(ADMIN_GROUP.to_string());
        assert!(user.is_admin());
    }

    #[test]
    fn test_password_is_not_serialized() {
        let user = User {
            username: "mario".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());

        let decoded: User =
            serde_json::from_str(r#"{"username":"mario","password":"secret"}"#).unwrap();
        assert_eq!(decoded.password, "secret");
    }

    #[test]
    fn test_group_requires_name() {
        assert!(Group::default().validate().is_err());
        assert!(Group {
            name: "Test".to_string(),
            roles: vec![]
        }
        .validate()
        .is_ok());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account record as stored in the users table. The password never leaves
/// this struct unhashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: String, password_hash: String, roles: Vec<String>) -> Self {
        let roles = if roles.is_empty() {
            vec!["User".to_string()]
        } else {
            roles
        };

        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            roles,
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_defaults_to_the_user_role() {
        let user = User::new("a@b.com".into(), "hash".into(), Vec::new());
        assert_eq!(user.roles, vec!["User".to_string()]);
        assert!(user.is_active);
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn explicit_roles_are_kept() {
        let user = User::new("a@b.com".into(), "hash".into(), vec!["Admin".into()]);
        assert_eq!(user.roles, vec!["Admin".to_string()]);
    }
}

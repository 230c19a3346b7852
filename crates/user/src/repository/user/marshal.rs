use crate::model::User;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use std::collections::HashMap;

pub(super) fn user_to_item(user: &User) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        ("id".to_string(), AttributeValue::S(user.id.clone())),
        ("email".to_string(), AttributeValue::S(user.email.clone())),
        (
            "password_hash".to_string(),
            AttributeValue::S(user.password_hash.clone()),
        ),
        (
            "roles".to_string(),
            AttributeValue::Ss(user.roles.clone()),
        ),
        (
            "is_active".to_string(),
            AttributeValue::Bool(user.is_active),
        ),
        (
            "created_at".to_string(),
            AttributeValue::S(user.created_at.to_rfc3339()),
        ),
    ]);

    // Absent until the first login.
    if let Some(last_login_at) = user.last_login_at {
        item.insert(
            "last_login_at".to_string(),
            AttributeValue::S(last_login_at.to_rfc3339()),
        );
    }

    item
}

pub(super) fn item_to_user(
    item: &HashMap<String, AttributeValue>,
) -> Result<User, RepositoryError> {
    Ok(User {
        id: get_s(item, "id")?,
        email: get_s(item, "email")?,
        password_hash: get_s(item, "password_hash")?,
        roles: get_ss(item, "roles")?,
        is_active: get_bool(item, "is_active")?,
        created_at: get_ts(item, "created_at")?,
        last_login_at: match item.get("last_login_at") {
            Some(_) => Some(get_ts(item, "last_login_at")?),
            None => None,
        },
    })
}

fn get_s(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::Corrupt(format!("missing string attribute '{key}'")))
}

fn get_ss(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<Vec<String>, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_ss().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::Corrupt(format!("missing string set attribute '{key}'")))
}

fn get_bool(item: &HashMap<String, AttributeValue>, key: &str) -> Result<bool, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| RepositoryError::Corrupt(format!("missing boolean attribute '{key}'")))
}

fn get_ts(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let raw = get_s(item, key)?;

    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Corrupt(format!("attribute '{key}' is not a timestamp: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marshal_round_trip() {
        let user = User::new("a@b.com".into(), "$2b$04$hash".into(), Vec::new());
        let item = user_to_item(&user);
        let restored = item_to_user(&item).unwrap();

        assert_eq!(restored.id, user.id);
        assert_eq!(restored.email, user.email);
        assert_eq!(restored.roles, user.roles);
        assert!(restored.last_login_at.is_none());
    }

    #[test]
    fn last_login_is_omitted_until_set() {
        let user = User::new("a@b.com".into(), "hash".into(), Vec::new());
        assert!(!user_to_item(&user).contains_key("last_login_at"));
    }

    #[test]
    fn missing_email_maps_to_corrupt() {
        let user = User::new("a@b.com".into(), "hash".into(), Vec::new());
        let mut item = user_to_item(&user);
        item.remove("email");

        assert!(matches!(
            item_to_user(&item),
            Err(RepositoryError::Corrupt(_))
        ));
    }
}

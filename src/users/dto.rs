use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{User, UserSummary};

/// Outbound user shape. Built by projection, so hash and salt cannot leak.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<OffsetDateTime>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            created: u.created,
            updated: u.updated,
        }
    }
}

impl From<UserSummary> for PublicUser {
    fn from(u: UserSummary) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            created: u.created,
            updated: u.updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_has_no_sensitive_fields() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            hashed_password: "$argon2id$v=19$...".into(),
            salt: "c2FsdHNhbHQ".into(),
            created: OffsetDateTime::now_utc(),
            updated: None,
        };
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("_id"));
        assert_eq!(obj["email"], "ada@example.com");
        assert!(!obj.contains_key("hashed_password"));
        assert!(!obj.contains_key("salt"));
        assert!(!obj.contains_key("updated"));
    }
}

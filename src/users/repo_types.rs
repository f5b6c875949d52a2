use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{auth::password::hash_password, errors::StoreError};

/// User record as stored. Not serializable: every outbound shape is a
/// projection (see `dto::PublicUser`).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub hashed_password: String, // argon2 hash, never leaves the server
    pub salt: String,
    pub created: OffsetDateTime,
    pub updated: Option<OffsetDateTime>, // unset until the first update
}

/// Row shape returned by the list query.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub updated: Option<OffsetDateTime>,
    pub created: OffsetDateTime,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            updated: u.updated,
            created: u.created,
        }
    }
}

/// Sign-up input. Fields are optional so that missing ones surface as
/// validation messages rather than body rejections.
#[derive(Debug, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Fields a client may change on an existing user.
#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Validated, hashed sign-up ready for insertion.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub salt: String,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_name(name: Option<String>) -> Result<String, StoreError> {
    let name = name.map(|n| n.trim().to_string()).unwrap_or_default();
    if name.is_empty() {
        return Err(StoreError::Validation("Name is required".into()));
    }
    Ok(name)
}

fn check_email(email: Option<String>) -> Result<String, StoreError> {
    let email = email
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    if email.is_empty() {
        return Err(StoreError::Validation("Email is required".into()));
    }
    if !is_valid_email(&email) {
        return Err(StoreError::Validation(
            "Please fill a valid email address".into(),
        ));
    }
    Ok(email)
}

fn check_password(password: Option<&str>) -> Result<&str, StoreError> {
    match password {
        None | Some("") => Err(StoreError::Validation("Password is required".into())),
        Some(p) => Ok(p),
    }
}

impl NewUser {
    pub fn prepare(self) -> Result<NewUserRecord, StoreError> {
        let name = check_name(self.name)?;
        let email = check_email(self.email)?;
        let password = check_password(self.password.as_deref())?;
        let creds = hash_password(password).map_err(|e| StoreError::Hashing(e.to_string()))?;
        Ok(NewUserRecord {
            name,
            email,
            hashed_password: creds.hashed_password,
            salt: creds.salt,
        })
    }
}

impl User {
    /// Shallow merge: fields present in the patch overwrite, absent ones are
    /// kept. Stamps `updated`.
    pub fn merge(&mut self, patch: UserPatch) -> Result<(), StoreError> {
        if patch.name.is_some() {
            self.name = check_name(patch.name)?;
        }
        if patch.email.is_some() {
            self.email = check_email(patch.email)?;
        }
        if let Some(password) = patch.password.as_deref() {
            let creds = hash_password(check_password(Some(password))?)
                .map_err(|e| StoreError::Hashing(e.to_string()))?;
            self.hashed_password = creds.hashed_password;
            self.salt = creds.salt;
        }
        self.updated = Some(next_stamp(self.updated));
        Ok(())
    }
}

/// Current time at microsecond precision (what Postgres keeps), bumped past
/// `prev` so `updated` always moves forward.
pub(crate) fn next_stamp(prev: Option<OffsetDateTime>) -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    let now = now
        .replace_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now);
    match prev {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

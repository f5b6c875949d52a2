use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::{
    errors::StoreError,
    users::repo_types::{NewUser, User, UserPatch, UserSummary},
};

/// Access to the user document store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, input: NewUser) -> Result<User, StoreError>;
    async fn list_all(&self) -> Result<Vec<UserSummary>, StoreError>;
    /// Malformed ids resolve to `Ok(None)`.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;
    async fn update(&self, user: User, patch: UserPatch) -> Result<User, StoreError>;
    /// Returns the deleted snapshot.
    async fn remove(&self, user: User) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: NewUser) -> Result<User, StoreError> {
        let record = input.prepare()?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, hashed_password, salt)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, hashed_password, salt, created, updated
            "#,
        )
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.hashed_password)
        .bind(&record.salt)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        debug!(user_id = %user.id, "user inserted");
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<UserSummary>, StoreError> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, name, email, updated, created
            FROM users
            ORDER BY created ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            debug!(%id, "malformed user id");
            return Ok(None);
        };
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, hashed_password, salt, created, updated
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(user)
    }

    async fn update(&self, mut user: User, patch: UserPatch) -> Result<User, StoreError> {
        user.merge(patch)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, hashed_password = $4, salt = $5, updated = $6
            WHERE id = $1
            RETURNING id, name, email, hashed_password, salt, created, updated
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.salt)
        .bind(user.updated)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        debug!(user_id = %user.id, "user updated");
        Ok(user)
    }

    async fn remove(&self, user: User) -> Result<User, StoreError> {
        let deleted = sqlx::query_as::<_, User>(
            r#"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, name, email, hashed_password, salt, created, updated
            "#,
        )
        .bind(user.id)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        debug!(user_id = %deleted.id, "user deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::error_message;

    fn ada(email: &str) -> NewUser {
        NewUser {
            name: Some("Ada".into()),
            email: Some(email.into()),
            password: Some("p".into()),
        }
    }

    // Needs a live Postgres at DATABASE_URL; run with `--ignored`.
    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn duplicate_email_is_reported_by_field(pool: PgPool) {
        let repo = PgUserRepository::new(pool);
        repo.create(ada("ada@example.com")).await.unwrap();

        let err = repo.create(ada(" ADA@example.com ")).await.unwrap_err();
        assert!(
            matches!(&err, StoreError::Duplicate { field } if field == "email"),
            "got {err:?}"
        );
        assert_eq!(error_message(&err), "Email already exists");
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn update_onto_taken_email_is_a_duplicate(pool: PgPool) {
        let repo = PgUserRepository::new(pool);
        repo.create(ada("ada@example.com")).await.unwrap();
        let grace = repo.create(ada("grace@example.com")).await.unwrap();

        let err = repo
            .update(
                grace,
                UserPatch {
                    email: Some("ada@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(error_message(&err), "Email already exists");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn malformed_and_missing_ids_resolve_to_none(pool: PgPool) {
        let repo = PgUserRepository::new(pool);
        assert!(repo.find_by_id("not-a-uuid").await.unwrap().is_none());
        assert!(repo
            .find_by_id(&Uuid::new_v4().to_string())
            .await
            .unwrap()
            .is_none());
    }
}

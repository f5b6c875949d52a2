//! In-memory user store backing `AppState::fake()`.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    errors::StoreError,
    users::{
        repo::UserRepository,
        repo_types::{NewUser, User, UserPatch, UserSummary},
    },
};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    /// Reads the stored record, sensitive fields included.
    pub async fn stored(&self, id: Uuid) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    fn email_taken(users: &[User], email: &str, except: Option<Uuid>) -> bool {
        users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, input: NewUser) -> Result<User, StoreError> {
        let record = input.prepare()?;
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &record.email, None) {
            return Err(StoreError::Duplicate {
                field: "email".into(),
            });
        }
        let user = User {
            id: Uuid::new_v4(),
            name: record.name,
            email: record.email,
            hashed_password: record.hashed_password,
            salt: record.salt,
            created: OffsetDateTime::now_utc(),
            updated: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<UserSummary>, StoreError> {
        Ok(self.users.read().await.iter().map(UserSummary::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.stored(id).await)
    }

    async fn update(&self, mut user: User, patch: UserPatch) -> Result<User, StoreError> {
        user.merge(patch)?;
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &user.email, Some(user.id)) {
            return Err(StoreError::Duplicate {
                field: "email".into(),
            });
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn remove(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let pos = users
            .iter()
            .position(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;
        Ok(users.remove(pos))
    }
}

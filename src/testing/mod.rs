//! In-process test doubles and environment setup shared by unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::database::models::{User, UserRole};
use crate::database::repository::{NewUser, UserStore};

/// Point the config singleton at test-friendly values. Must run before the
/// first CONFIG access in the process; every test touching config calls this
/// first so whichever thread wins has already set the variables.
pub fn init_test_env() {
    std::env::set_var("JWT_SECRET", "test-secret-key");
    // Minimum bcrypt cost keeps hashing tests fast
    std::env::set_var("BCRYPT_COST", "4");
}

pub fn user_with_password(email: &str, password: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        display_name: "Ada L.".to_string(),
        email: email.to_string(),
        password_hash: bcrypt::hash(password, 4).unwrap(),
        role: UserRole::User,
        reset_token: None,
        reset_token_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory `UserStore` mirroring the Postgres repository's behaviour
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl MemoryUserStore {
    pub fn add(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn get_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self.get_by_email(email))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            display_name: new_user.display_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.add(user.clone());
        Ok(user)
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.reset_token = Some(token.to_string());
            user.reset_token_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn clear_reset_token(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.reset_token = None;
            user.reset_token_expires_at = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

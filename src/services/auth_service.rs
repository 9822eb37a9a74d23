use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims, JwtError};
use crate::config;
use crate::database::models::user::derive_display_name;
use crate::database::models::{User, UserRole, UserSummary};
use crate::database::repository::{NewUser, UserStore};
use crate::validation::{LoginInput, RegistrationInput, ResetPasswordInput};

const RESET_TOKEN_LEN: usize = 48;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

/// Token plus user payload returned by register and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserSummary,
}

pub struct AuthService<S: UserStore> {
    users: S,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(users: S) -> Self {
        Self { users }
    }

    pub async fn register(&self, input: RegistrationInput) -> Result<AuthSession, AuthError> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let cost = config::config().security.bcrypt_cost;
        let password_hash = bcrypt::hash(&input.password, cost)?;
        let display_name = derive_display_name(&input.first_name, &input.last_name);

        let user = self
            .users
            .insert(NewUser {
                first_name: input.first_name,
                last_name: input.last_name,
                display_name,
                email: input.email,
                password_hash,
                role: UserRole::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "user registered");
        self.issue_session(&user)
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        // Unknown email and bad password produce the same error on purpose
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(&input.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(&user)
    }

    pub async fn get_me(&self, user_id: Uuid) -> Result<UserSummary, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.summary())
    }

    /// Stores a fresh reset token when the account exists. Callers respond
    /// identically either way so the endpoint cannot be used to probe emails.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::debug!("password reset requested for unknown email");
                return Ok(());
            }
        };

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LEN)
            .map(char::from)
            .collect();

        let ttl = config::config().security.reset_token_ttl_mins;
        let expires_at = Utc::now() + Duration::minutes(ttl);

        self.users
            .set_reset_token(user.id, &token, expires_at)
            .await?;

        // Mail delivery is not wired up; the link lands in the logs instead
        tracing::debug!(user_id = %user.id, %token, "password reset token issued");
        Ok(())
    }

    pub async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_reset_token(&input.token)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let expires_at = user
            .reset_token_expires_at
            .ok_or(AuthError::InvalidResetToken)?;
        if expires_at < Utc::now() {
            return Err(AuthError::InvalidResetToken);
        }

        let cost = config::config().security.bcrypt_cost;
        let password_hash = bcrypt::hash(&input.new_password, cost)?;

        self.users.update_password(user.id, &password_hash).await?;
        self.users.clear_reset_token(user.id).await?;

        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(())
    }

    fn issue_session(&self, user: &User) -> Result<AuthSession, AuthError> {
        let claims = Claims::new(user.id, user.email.clone(), user.role);
        let token = generate_jwt(&claims)?;

        Ok(AuthSession {
            token,
            user: user.summary(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{init_test_env, user_with_password, MemoryUserStore};
    use crate::validation;

    fn service(store: MemoryUserStore) -> AuthService<MemoryUserStore> {
        AuthService::new(store)
    }

    fn registration(email: &str) -> RegistrationInput {
        validation::registration(
            Some("Ada"),
            Some("Lovelace"),
            Some(email),
            Some("Sup3r-Secret"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn register_creates_user_with_hashed_password_and_token() {
        init_test_env();
        let store = MemoryUserStore::default();
        let svc = service(store.clone());

        let session = svc.register(registration("ada@example.com")).await.unwrap();

        assert!(!session.token.is_empty());
        assert_eq!(session.user.email, "ada@example.com");
        assert_eq!(session.user.display_name, "Ada L.");

        let stored = store.get_by_email("ada@example.com").unwrap();
        assert_ne!(stored.password_hash, "Sup3r-Secret");
        assert!(bcrypt::verify("Sup3r-Secret", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        init_test_env();
        let svc = service(MemoryUserStore::default());

        svc.register(registration("ada@example.com")).await.unwrap();
        let err = svc
            .register(registration("ada@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn login_rejects_unknown_email_and_wrong_password_identically() {
        init_test_env();
        let store = MemoryUserStore::default();
        store.add(user_with_password("ada@example.com", "Sup3r-Secret"));
        let svc = service(store);

        let err = svc
            .login(validation::login(Some("nobody@example.com"), Some("Sup3r-Secret")).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = svc
            .login(validation::login(Some("ada@example.com"), Some("Wrong-Pass1")).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_credentials() {
        init_test_env();
        let store = MemoryUserStore::default();
        store.add(user_with_password("ada@example.com", "Sup3r-Secret"));
        let svc = service(store);

        let session = svc
            .login(validation::login(Some("ada@example.com"), Some("Sup3r-Secret")).unwrap())
            .await
            .unwrap();

        assert_eq!(session.user.email, "ada@example.com");
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn get_me_returns_user_or_not_found() {
        init_test_env();
        let store = MemoryUserStore::default();
        let user = user_with_password("ada@example.com", "Sup3r-Secret");
        let user_id = user.id;
        store.add(user);
        let svc = service(store);

        let me = svc.get_me(user_id).await.unwrap();
        assert_eq!(me.email, "ada@example.com");

        let err = svc.get_me(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn forgot_password_is_silent_for_unknown_email() {
        init_test_env();
        let svc = service(MemoryUserStore::default());
        assert!(svc.forgot_password("nobody@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn forgot_password_stores_token_with_future_expiry() {
        init_test_env();
        let store = MemoryUserStore::default();
        store.add(user_with_password("ada@example.com", "Sup3r-Secret"));
        let svc = service(store.clone());

        svc.forgot_password("ada@example.com").await.unwrap();

        let stored = store.get_by_email("ada@example.com").unwrap();
        let token = stored.reset_token.expect("token should be stored");
        assert_eq!(token.len(), RESET_TOKEN_LEN);
        assert!(stored.reset_token_expires_at.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn reset_password_rejects_unknown_and_expired_tokens() {
        init_test_env();
        let store = MemoryUserStore::default();
        let mut user = user_with_password("ada@example.com", "Sup3r-Secret");
        user.reset_token = Some("expired-token".to_string());
        user.reset_token_expires_at = Some(Utc::now() - Duration::minutes(5));
        store.add(user);
        let svc = service(store);

        let err = svc
            .reset_password(
                validation::reset_password(Some("missing-token"), Some("N3w-Password")).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidResetToken));

        let err = svc
            .reset_password(
                validation::reset_password(Some("expired-token"), Some("N3w-Password")).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidResetToken));
    }

    #[tokio::test]
    async fn reset_password_updates_hash_and_clears_token() {
        init_test_env();
        let store = MemoryUserStore::default();
        let mut user = user_with_password("ada@example.com", "Sup3r-Secret");
        user.reset_token = Some("valid-token".to_string());
        user.reset_token_expires_at = Some(Utc::now() + Duration::minutes(30));
        store.add(user);
        let svc = service(store.clone());

        svc.reset_password(
            validation::reset_password(Some("valid-token"), Some("N3w-Password")).unwrap(),
        )
        .await
        .unwrap();

        let stored = store.get_by_email("ada@example.com").unwrap();
        assert!(stored.reset_token.is_none());
        assert!(stored.reset_token_expires_at.is_none());
        assert!(bcrypt::verify("N3w-Password", &stored.password_hash).unwrap());
    }
}

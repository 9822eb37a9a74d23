pub mod auth_service;
pub mod turnstile;

pub use auth_service::{AuthError, AuthService, AuthSession};

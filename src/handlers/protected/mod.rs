pub mod auth;
pub mod debts;

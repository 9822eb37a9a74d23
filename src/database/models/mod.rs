pub mod debt;
pub mod user;

pub use debt::{Debt, DebtStatus, DebtWithParties};
pub use user::{User, UserRole, UserSummary};

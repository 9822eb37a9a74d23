pub mod debts;
pub mod users;

pub use debts::{DebtChanges, DebtQueryFilter, NewDebt, PaidDebtSide, PgDebtRepository};
pub use users::{NewUser, PgUserRepository, UserStore};

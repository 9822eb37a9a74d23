mod login;
mod password;
mod register;

pub use login::login;
pub use password::{forgot_password, reset_password};
pub use register::register;

//! Request validation. Each function checks one payload shape, collects
//! per-field messages, and returns the normalized input on success. Failures
//! surface as a single `VALIDATION_ERROR` response with a field-error map.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::repository::{DebtChanges, NewDebt};
use crate::error::ApiError;

const AMOUNT_MIN: i64 = 1;
const AMOUNT_MAX: i64 = 10_000_000;
const DESCRIPTION_MAX: usize = 100;
const NAME_MAX: usize = 20;
const EMAIL_MAX: usize = 100;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 100;

type FieldErrors = HashMap<String, String>;

fn fail(errors: FieldErrors) -> ApiError {
    ApiError::validation_error("Validation failed", Some(errors))
}

#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

pub fn registration(
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<RegistrationInput, ApiError> {
    let mut errors = FieldErrors::new();

    let first_name = check_name("first_name", "First name", first_name, &mut errors);
    let last_name = check_name("last_name", "Last name", last_name, &mut errors);
    let email = check_email(email, &mut errors);
    let password = check_password("password", password, &mut errors);

    match (first_name, last_name, email, password) {
        (Some(first_name), Some(last_name), Some(email), Some(password))
            if errors.is_empty() =>
        {
            Ok(RegistrationInput {
                first_name,
                last_name,
                email,
                password,
            })
        }
        _ => Err(fail(errors)),
    }
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub fn login(email: Option<&str>, password: Option<&str>) -> Result<LoginInput, ApiError> {
    let mut errors = FieldErrors::new();

    let email = check_email(email, &mut errors);

    let password = match password {
        Some(p) if !p.is_empty() => Some(p.to_string()),
        _ => {
            errors.insert("password".to_string(), "Password is required".to_string());
            None
        }
    };

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(LoginInput { email, password }),
        _ => Err(fail(errors)),
    }
}

pub fn forgot_password(email: Option<&str>) -> Result<String, ApiError> {
    let mut errors = FieldErrors::new();

    match check_email(email, &mut errors) {
        Some(email) if errors.is_empty() => Ok(email),
        _ => Err(fail(errors)),
    }
}

#[derive(Debug, Clone)]
pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
}

pub fn reset_password(
    token: Option<&str>,
    new_password: Option<&str>,
) -> Result<ResetPasswordInput, ApiError> {
    let mut errors = FieldErrors::new();

    let token = match token.map(str::trim) {
        Some(t) if !t.is_empty() => Some(t.to_string()),
        _ => {
            errors.insert("token".to_string(), "Token is required".to_string());
            None
        }
    };

    let new_password = check_password("new_password", new_password, &mut errors);

    match (token, new_password) {
        (Some(token), Some(new_password)) if errors.is_empty() => Ok(ResetPasswordInput {
            token,
            new_password,
        }),
        _ => Err(fail(errors)),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn debt_create(
    debtor: Option<&str>,
    creditor: Option<&str>,
    amount: Option<Decimal>,
    description: Option<&str>,
    debt_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NewDebt, ApiError> {
    let mut errors = FieldErrors::new();

    let debtor_id = check_party("debtor", "Debtor", debtor, &mut errors);
    let creditor_id = check_party("creditor", "Creditor", creditor, &mut errors);

    if let (Some(d), Some(c)) = (debtor_id, creditor_id) {
        if d == c {
            errors.insert(
                "creditor".to_string(),
                "Debtor and creditor must be different users.".to_string(),
            );
        }
    }

    let amount = check_amount(amount, true, &mut errors);
    let description = check_description(description, true, &mut errors);

    let debt_date = debt_date.unwrap_or(today);
    if debt_date > today {
        errors.insert(
            "debt_date".to_string(),
            "Debt date cannot be in the future".to_string(),
        );
    }

    if let Some(due) = due_date {
        if due < debt_date {
            errors.insert(
                "due_date".to_string(),
                "Due date must be equal to or after the debt date".to_string(),
            );
        }
    }

    match (debtor_id, creditor_id, amount, description) {
        (Some(debtor_id), Some(creditor_id), Some(amount), Some(description))
            if errors.is_empty() =>
        {
            Ok(NewDebt {
                debtor_id,
                creditor_id,
                amount,
                description,
                debt_date,
                due_date,
            })
        }
        _ => Err(fail(errors)),
    }
}

pub fn debt_update(
    amount: Option<Decimal>,
    description: Option<&str>,
    due_date: Option<NaiveDate>,
    existing_debt_date: NaiveDate,
) -> Result<DebtChanges, ApiError> {
    if amount.is_none() && description.is_none() && due_date.is_none() {
        return Err(ApiError::validation_error(
            "You must provide at least one field to update",
            None,
        ));
    }

    let mut errors = FieldErrors::new();

    let amount = check_amount(amount, false, &mut errors);
    let description = check_description(description, false, &mut errors);

    if let Some(due) = due_date {
        if due < existing_debt_date {
            errors.insert(
                "due_date".to_string(),
                "Due date must be equal to or after the debt date".to_string(),
            );
        }
    }

    if !errors.is_empty() {
        return Err(fail(errors));
    }

    Ok(DebtChanges {
        amount,
        description,
        due_date,
    })
}

// ---- field checks ----

fn check_name(
    field: &str,
    label: &str,
    value: Option<&str>,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        Some(_) => {
            errors.insert(
                field.to_string(),
                format!("{label} must be at least 1 character"),
            );
            return None;
        }
        None => {
            errors.insert(field.to_string(), format!("{label} is required"));
            return None;
        }
    };

    if value.chars().count() > NAME_MAX {
        errors.insert(
            field.to_string(),
            format!("{label} must be at most {NAME_MAX} characters"),
        );
        return None;
    }

    let valid = value
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'');
    if !valid {
        errors.insert(
            field.to_string(),
            format!("{label} can only contain letters, spaces, hyphens, and apostrophes"),
        );
        return None;
    }

    Some(value.to_string())
}

fn check_email(value: Option<&str>, errors: &mut FieldErrors) -> Option<String> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_lowercase(),
        _ => {
            errors.insert("email".to_string(), "Email is required".to_string());
            return None;
        }
    };

    if value.chars().count() > EMAIL_MAX {
        errors.insert(
            "email".to_string(),
            format!("Email must be at most {EMAIL_MAX} characters"),
        );
        return None;
    }

    if !is_plausible_email(&value) {
        errors.insert("email".to_string(), "Invalid email format".to_string());
        return None;
    }

    Some(value)
}

/// Structural check only: one @, non-empty local part, dotted domain
fn is_plausible_email(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };

    if local.is_empty() || domain.is_empty() || value.contains(char::is_whitespace) {
        return false;
    }

    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn check_password(field: &str, value: Option<&str>, errors: &mut FieldErrors) -> Option<String> {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.insert(field.to_string(), "Password is required".to_string());
            return None;
        }
    };

    let len = value.chars().count();
    if len < PASSWORD_MIN {
        errors.insert(
            field.to_string(),
            format!("Password must be at least {PASSWORD_MIN} characters"),
        );
        return None;
    }
    if len > PASSWORD_MAX {
        errors.insert(
            field.to_string(),
            format!("Password must be at most {PASSWORD_MAX} characters"),
        );
        return None;
    }

    let has_lower = value.chars().any(|c| c.is_lowercase());
    let has_upper = value.chars().any(|c| c.is_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| !c.is_alphanumeric());

    if !(has_lower && has_upper && has_digit && has_special) {
        errors.insert(
            field.to_string(),
            "Password must contain at least one uppercase letter, one lowercase letter, \
             one number, and one special character"
                .to_string(),
        );
        return None;
    }

    Some(value.to_string())
}

fn check_party(
    field: &str,
    label: &str,
    value: Option<&str>,
    errors: &mut FieldErrors,
) -> Option<Uuid> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.insert(field.to_string(), format!("{label} is required"));
            return None;
        }
    };

    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.insert(field.to_string(), format!("{label} must be a valid user id"));
            None
        }
    }
}

fn check_amount(
    value: Option<Decimal>,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<Decimal> {
    let value = match value {
        Some(v) => v,
        None => {
            if required {
                errors.insert("amount".to_string(), "Amount is required".to_string());
            }
            return None;
        }
    };

    if value < Decimal::from(AMOUNT_MIN) {
        errors.insert("amount".to_string(), "Amount must be positive".to_string());
        return None;
    }
    if value > Decimal::from(AMOUNT_MAX) {
        errors.insert(
            "amount".to_string(),
            "Amount must be less than 10 million".to_string(),
        );
        return None;
    }

    Some(value)
}

fn check_description(
    value: Option<&str>,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        Some(_) => {
            errors.insert(
                "description".to_string(),
                "Description must have 1 character at least".to_string(),
            );
            return None;
        }
        None => {
            if required {
                errors.insert(
                    "description".to_string(),
                    "Description is required".to_string(),
                );
            }
            return None;
        }
    };

    if value.chars().count() > DESCRIPTION_MAX {
        errors.insert(
            "description".to_string(),
            format!("Description must be under {DESCRIPTION_MAX} characters"),
        );
        return None;
    }

    Some(value.to_string())
}

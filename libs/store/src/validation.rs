//! Input validation utilities

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate display name
pub fn validate_display_name(display_name: &str) -> Result<(), String> {
    if display_name.trim().is_empty() {
        return Err("Display name is required".to_string());
    }

    if display_name.chars().count() > 64 {
        return Err("Display name must be at most 64 characters long".to_string());
    }

    Ok(())
}

/// Validate a stored password hash; hashing itself happens upstream
pub fn validate_hashed_password(hashed_password: &str) -> Result<(), String> {
    if hashed_password.is_empty() {
        return Err("Hashed password is required".to_string());
    }

    if hashed_password.len() > 255 {
        return Err("Hashed password must be at most 255 characters long".to_string());
    }

    Ok(())
}

/// Validate session, activation or verification token
pub fn validate_token(token: &str) -> Result<(), String> {
    if token.is_empty() {
        return Err("Token is required".to_string());
    }

    if token.len() > 255 {
        return Err("Token must be at most 255 characters long".to_string());
    }

    if token.chars().any(char::is_whitespace) {
        return Err("Token cannot contain whitespace".to_string());
    }

    Ok(())
}

/// Validate a non-negative counter
pub fn validate_count(field: &str, value: i32) -> Result<(), String> {
    if value < 0 {
        return Err(format!("{} cannot be negative", field));
    }

    Ok(())
}

/// Validate a `YYYYMMDD` date key
pub fn validate_date_key(date: i32) -> Result<NaiveDate, String> {
    let (year, month, day) = (date / 10_000, (date / 100 % 100) as u32, (date % 100) as u32);

    if !(1000..=9999).contains(&year) {
        return Err(format!("Date {} is not in YYYYMMDD form", date));
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Date {} is not a calendar date", date))
}

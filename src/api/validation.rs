//! Input validation for form submissions.
//!
//! Validators return `Result<(), String>` so handlers can collect failures
//! per field with the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Loose syntactic email check: something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// ISO date as stored: YYYY-MM-DD
    static ref ISO_DATE_REGEX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

/// Content types accepted for uploaded logo assets
const ACCEPTED_ASSET_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "application/pdf",
    "image/vnd.adobe.photoshop",
    "image/tiff",
];

/// Validate a sponsor or company name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().chars().count() < 2 {
        return Err("Name must be at least 2 characters.".to_string());
    }
    Ok(())
}

/// Validate a contact person's name
pub fn validate_contact_name(name: &str) -> Result<(), String> {
    if name.trim().chars().count() < 2 {
        return Err("Contact name must be at least 2 characters.".to_string());
    }
    Ok(())
}

/// Validate email syntax
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email address is required.".to_string());
    }
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address.".to_string());
    }
    Ok(())
}

pub fn validate_contact_number(number: &str) -> Result<(), String> {
    if number.trim().is_empty() {
        return Err("Please enter a contact number.".to_string());
    }
    Ok(())
}

/// Parse and validate a custom tier amount: a non-negative integer.
pub fn validate_custom_amount(raw: &str) -> Result<i64, String> {
    let amount: i64 = raw
        .trim()
        .parse()
        .map_err(|_| "Custom amount must be a whole number.".to_string())?;
    if amount < 0 {
        return Err("Custom amount cannot be negative.".to_string());
    }
    Ok(amount)
}

/// A custom tier requires a justification note.
pub fn validate_custom_note(note: Option<&str>) -> Result<(), String> {
    match note {
        Some(n) if !n.trim().is_empty() => Ok(()),
        _ => Err("A note is required for custom amounts.".to_string()),
    }
}

/// Validate an optional ISO date field (blank is treated as absent)
pub fn validate_date(date: &Option<String>, field_name: &str) -> Result<(), String> {
    if let Some(d) = date {
        let d = d.trim();
        if d.is_empty() {
            return Ok(());
        }
        if !ISO_DATE_REGEX.is_match(d)
            || chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err()
        {
            return Err(format!("{} must be a valid date (YYYY-MM-DD).", field_name));
        }
    }
    Ok(())
}

/// Check an uploaded asset's content type against the accepted set
pub fn is_accepted_asset_type(content_type: &str) -> bool {
    ACCEPTED_ASSET_TYPES.contains(&content_type)
}

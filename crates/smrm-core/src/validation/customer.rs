//! Customer profile checks.

use chrono::NaiveDate;

use super::{char_len, Validation};
use crate::models::{CustomerInput, Gender};
use crate::util::{calc_age_on, date_string, parse_date, today};

const MAX_NAME_LEN: usize = 100;
const MAX_AGE: i32 = 150;
const PHONE_LEN: std::ops::RangeInclusive<usize> = 7..=15;

/// Validate a customer candidate against today's date.
pub fn validate_customer(customer: &CustomerInput) -> Validation {
    validate_customer_on(customer, today())
}

/// Validate a customer candidate as of `today`.
pub fn validate_customer_on(customer: &CustomerInput, today: NaiveDate) -> Validation {
    let mut errors = Vec::new();

    if customer.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    } else if char_len(&customer.name) > MAX_NAME_LEN {
        errors.push(format!("Name must be at most {} characters", MAX_NAME_LEN));
    }

    if let Some(birth) = filled(&customer.birth_date) {
        match parse_date(birth) {
            None => errors.push("Birth date format is invalid".to_string()),
            // Stored dates are YYYY-MM-DD, so text order is date order
            Some(_) if birth > date_string(today).as_str() => {
                errors.push("Birth date must be in the past".to_string())
            }
            Some(_) => {
                let age = calc_age_on(birth, today).unwrap_or(-1);
                if !(0..=MAX_AGE).contains(&age) {
                    errors.push(format!("Birth date is out of range (age 0-{})", MAX_AGE));
                }
            }
        }
    }

    if let Some(gender) = filled(&customer.gender) {
        if gender.parse::<Gender>().is_err() {
            errors.push("Gender value is invalid".to_string());
        }
    }

    if let Some(kana) = filled(&customer.name_kana) {
        if !kana.chars().all(is_kana_char) {
            errors.push("Name kana must be written in hiragana".to_string());
        } else if char_len(kana) > MAX_NAME_LEN {
            errors.push(format!("Name kana must be at most {} characters", MAX_NAME_LEN));
        }
    }

    if let Some(phone) = filled(&customer.phone) {
        if !phone.chars().all(|c| c.is_ascii_digit() || c == '-') {
            errors.push("Phone must contain only digits and hyphens".to_string());
        } else if !PHONE_LEN.contains(&phone.len()) {
            errors.push("Phone must be 7-15 characters".to_string());
        }
    }

    Validation::from_errors(errors)
}

/// Hiragana block, the prolonged sound mark, or whitespace.
fn is_kana_char(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30FC}' | '\u{3000}') || c.is_whitespace()
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

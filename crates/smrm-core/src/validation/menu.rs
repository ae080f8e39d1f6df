//! Treatment menu checks.

use super::{char_len, is_filled, loose_integer_in, Validation};
use crate::models::MenuInput;

pub const MAX_MENU_NAME_LEN: usize = 100;
pub const MAX_MENU_DURATION: i64 = 480;

pub fn validate_treatment_menu(menu: &MenuInput) -> Validation {
    let mut errors = Vec::new();

    if menu.name.trim().is_empty() {
        errors.push("Menu name is required".to_string());
    } else if char_len(&menu.name) > MAX_MENU_NAME_LEN {
        errors.push(format!(
            "Menu name must be at most {} characters",
            MAX_MENU_NAME_LEN
        ));
    }

    let duration = menu.default_duration.as_ref();
    if is_filled(duration) && loose_integer_in(duration, 1, MAX_MENU_DURATION).is_none() {
        errors.push(format!(
            "Duration must be an integer from 1 to {}",
            MAX_MENU_DURATION
        ));
    }

    Validation::from_errors(errors)
}

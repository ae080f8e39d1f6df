//! Treatment record and body condition checks.

use super::{char_len, is_blank, is_filled, loose_integer_in, Validation};
use crate::models::{BodyConditionInput, RecordInput};

pub const MAX_NARRATIVE_LEN: usize = 2000;
pub const MAX_LEVEL: i64 = 10;

/// At least one narrative field must carry text; each is length-bounded.
/// A duration, when given, is a whole number of minutes.
pub fn validate_treatment_record(record: &RecordInput) -> Validation {
    let mut errors = Vec::new();
    let fields = [
        ("Chief complaint", record.chief_complaint.as_deref()),
        ("Findings", record.body_findings.as_deref()),
        ("Treatment content", record.treatment_content.as_deref()),
        ("After notes", record.after_notes.as_deref()),
    ];

    if fields.iter().all(|(_, value)| is_blank(*value)) {
        errors.push(
            "Enter at least one of chief complaint, findings, treatment content or after notes"
                .to_string(),
        );
    }

    for (label, value) in fields {
        if value.map_or(false, |v| char_len(v) > MAX_NARRATIVE_LEN) {
            errors.push(format!(
                "{} must be at most {} characters",
                label, MAX_NARRATIVE_LEN
            ));
        }
    }

    let duration = record.duration.as_ref();
    if is_filled(duration) && loose_integer_in(duration, 0, u32::MAX as i64).is_none() {
        errors.push("Duration must be a whole number of minutes".to_string());
    }

    Validation::from_errors(errors)
}

/// Levels, when given, are integers 0-10; areas, when given, is a list.
pub fn validate_body_condition(condition: &BodyConditionInput) -> Validation {
    let mut errors = Vec::new();
    let levels = [
        ("Pain level", condition.pain_level.as_ref()),
        ("Stiffness level", condition.stiffness_level.as_ref()),
        ("Fatigue level", condition.fatigue_level.as_ref()),
    ];

    for (label, value) in levels {
        if is_filled(value) && loose_integer_in(value, 0, MAX_LEVEL).is_none() {
            errors.push(format!("{} must be an integer from 0 to {}", label, MAX_LEVEL));
        }
    }

    if let Some(areas) = &condition.areas {
        if !areas.is_null() && !areas.is_array() {
            errors.push("Areas must be a list".to_string());
        }
    }

    Validation::from_errors(errors)
}

//! Visit recording and edit.

use serde_json::Value;
use tracing::info;

use super::{clean, Intake, IntakeError, IntakeResult};
use crate::models::{BodyCondition, RecordInput, TreatmentRecord};
use crate::util::to_stored_timestamp;
use crate::validation::{
    loose_integer_in, validate_body_condition, validate_treatment_record, ValidationError,
    MAX_LEVEL,
};

impl Intake<'_> {
    /// Record a visit for an existing customer.
    pub fn record_visit(&self, customer_id: &str, input: &RecordInput) -> IntakeResult<TreatmentRecord> {
        validate_treatment_record(input)
            .and(validate_body_condition(&input.body_condition))
            .into_result()?;
        if self.db.get_customer(customer_id)?.is_none() {
            return Err(IntakeError::NotFound(customer_id.to_string()));
        }

        let mut record = TreatmentRecord::new(customer_id.to_string());
        if let Some(visited_at) = visit_time(input)? {
            record.visited_at = visited_at;
        }
        self.apply_visit(&mut record, input);

        let condition = &input.body_condition;
        record.body_condition = BodyCondition {
            pain_level: level(condition.pain_level.as_ref()).unwrap_or(0),
            stiffness_level: level(condition.stiffness_level.as_ref()).unwrap_or(0),
            fatigue_level: level(condition.fatigue_level.as_ref()).unwrap_or(0),
            areas: areas(condition.areas.as_ref()),
            notes: clean(&condition.notes),
        };

        self.db.insert_record(&record)?;
        info!(record_id = %record.id, customer_id, "Recorded visit");
        Ok(record)
    }

    /// Replace a visit's narrative and menu.
    ///
    /// Blank levels keep their stored values; areas and condition notes are kept
    /// as stored.
    pub fn edit_visit(&self, record_id: &str, input: &RecordInput) -> IntakeResult<TreatmentRecord> {
        validate_treatment_record(input)
            .and(validate_body_condition(&input.body_condition))
            .into_result()?;

        let mut record = self
            .db
            .get_record(record_id)?
            .ok_or_else(|| IntakeError::NotFound(record_id.to_string()))?;

        if let Some(visited_at) = visit_time(input)? {
            record.visited_at = visited_at;
        }
        self.apply_visit(&mut record, input);

        let condition = &input.body_condition;
        let stored = &mut record.body_condition;
        stored.pain_level = level(condition.pain_level.as_ref()).unwrap_or(stored.pain_level);
        stored.stiffness_level =
            level(condition.stiffness_level.as_ref()).unwrap_or(stored.stiffness_level);
        stored.fatigue_level =
            level(condition.fatigue_level.as_ref()).unwrap_or(stored.fatigue_level);

        record.touch();
        self.db.update_record(&record)?;
        Ok(record)
    }

    fn apply_visit(&self, record: &mut TreatmentRecord, input: &RecordInput) {
        record.chief_complaint = clean(&input.chief_complaint);
        record.body_findings = clean(&input.body_findings);
        record.treatment_content = clean(&input.treatment_content);
        record.after_notes = clean(&input.after_notes);

        record.treatment_menu_id = clean(&input.treatment_menu_id);
        // The catalog name wins over whatever label the form carried
        let catalog_name = record.treatment_menu_id.as_deref().and_then(|id| {
            self.db
                .load_treatment_menus()
                .into_iter()
                .find(|menu| menu.id == id)
                .map(|menu| menu.name)
        });
        record.treatment_menu = catalog_name.or_else(|| clean(&input.treatment_menu));
        record.duration = loose_integer_in(input.duration.as_ref(), 0, u32::MAX as i64)
            .map(|minutes| minutes as u32);
    }
}

/// Stored visit time from the form; `None` when left blank.
fn visit_time(input: &RecordInput) -> Result<Option<String>, ValidationError> {
    match clean(&input.visited_at) {
        None => Ok(None),
        Some(raw) => to_stored_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| ValidationError {
                errors: vec!["Visit time is invalid".to_string()],
            }),
    }
}

fn level(value: Option<&Value>) -> Option<u8> {
    loose_integer_in(value, 0, MAX_LEVEL).map(|v| v as u8)
}

fn areas(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

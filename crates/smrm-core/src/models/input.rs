//! Unvalidated form candidates handed over by the UI.
//!
//! Text arrives as typed; numeric form values stay loose JSON so validation
//! can reject strings like `"abc"` instead of failing to decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Customer registration or edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInput {
    /// Left blank on registration; blank on edit keeps the existing code
    pub customer_code: Option<String>,
    pub name: String,
    pub name_kana: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub referral_source: Option<String>,
    pub visit_motivation: Option<String>,
    pub first_visit_date: Option<String>,
    pub practitioner: Option<String>,
    pub memo: Option<String>,
    pub allergies: Vec<AllergyInput>,
    pub medical_history: Vec<MedicalHistoryInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AllergyInput {
    pub allergen: String,
    pub severity: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MedicalHistoryInput {
    pub condition: String,
    pub note: Option<String>,
}

/// Visit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordInput {
    /// Local `YYYY-MM-DDTHH:MM` or RFC 3339; blank means now (or unchanged on edit)
    pub visited_at: Option<String>,
    pub chief_complaint: Option<String>,
    pub body_findings: Option<String>,
    pub treatment_content: Option<String>,
    pub after_notes: Option<String>,
    pub treatment_menu_id: Option<String>,
    pub treatment_menu: Option<String>,
    pub duration: Option<Value>,
    pub body_condition: BodyConditionInput,
}

/// Body condition sliders and tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyConditionInput {
    pub pain_level: Option<Value>,
    pub stiffness_level: Option<Value>,
    pub fatigue_level: Option<Value>,
    pub areas: Option<Value>,
    pub notes: Option<String>,
}

/// One row of the menu catalog editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuInput {
    pub id: Option<String>,
    pub name: String,
    pub default_duration: Option<Value>,
}

//! Treatment record models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_level, lenient_minutes, lenient_strings, null_as_default};

/// A single visit record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TreatmentRecord {
    /// Unique record ID
    pub id: String,
    /// Owning customer ID
    pub customer_id: String,
    /// Visit timestamp (RFC 3339)
    pub visited_at: String,
    pub chief_complaint: Option<String>,
    pub body_findings: Option<String>,
    pub treatment_content: Option<String>,
    pub after_notes: Option<String>,
    /// Catalog menu ID at the time of the visit
    pub treatment_menu_id: Option<String>,
    /// Menu name copied from the catalog; survives menu rename/delete
    pub treatment_menu: Option<String>,
    /// Duration in minutes
    #[serde(deserialize_with = "lenient_minutes")]
    pub duration: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub body_condition: BodyCondition,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
    /// Fields written by other versions, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body condition captured with a visit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyCondition {
    #[serde(deserialize_with = "lenient_level")]
    pub pain_level: u8,
    #[serde(deserialize_with = "lenient_level")]
    pub stiffness_level: u8,
    #[serde(deserialize_with = "lenient_level")]
    pub fatigue_level: u8,
    /// Named body-area tags
    #[serde(deserialize_with = "lenient_strings")]
    pub areas: Vec<String>,
    pub notes: Option<String>,
}

impl TreatmentRecord {
    /// Create a new record for a customer, visited now.
    pub fn new(customer_id: String) -> Self {
        let now = crate::util::timestamp_now();
        Self {
            id: crate::util::generate_uuid(),
            customer_id,
            visited_at: now.clone(),
            created_at: now.clone(),
            updated_at: now,
            ..Default::default()
        }
    }

    /// The four narrative fields in form order.
    pub fn narrative(&self) -> [Option<&str>; 4] {
        [
            self.chief_complaint.as_deref(),
            self.body_findings.as_deref(),
            self.treatment_content.as_deref(),
            self.after_notes.as_deref(),
        ]
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = crate::util::timestamp_now();
    }
}

//! Customer models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_option, null_as_default};

/// A customer profile.
///
/// Every field except `id` tolerates being absent in stored or imported JSON so
/// that bundles written by older releases still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    /// Local UUID, immutable once assigned
    pub id: String,
    /// Human-readable sequential code (`C0001`..`C9999`)
    pub customer_code: Option<String>,
    /// Full name
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Phonetic reading (hiragana)
    pub name_kana: Option<String>,
    /// Birth date as `YYYY-MM-DD`
    pub birth_date: Option<String>,
    #[serde(deserialize_with = "lenient_option")]
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub referral_source: Option<String>,
    pub visit_motivation: Option<String>,
    /// First visit as `YYYY-MM-DD`
    pub first_visit_date: Option<String>,
    /// Assigned practitioner
    pub practitioner: Option<String>,
    pub memo: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub allergies: Vec<Allergy>,
    #[serde(deserialize_with = "null_as_default")]
    pub medical_history: Vec<MedicalHistory>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
    /// Fields written by other versions, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    /// Create a new customer with a fresh id and no code.
    pub fn new(name: String) -> Self {
        let now = crate::util::timestamp_now();
        Self {
            id: crate::util::generate_uuid(),
            name,
            created_at: now.clone(),
            updated_at: now,
            ..Default::default()
        }
    }

    /// Age in whole years on `today`, if a parseable birth date is set.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth = self.birth_date.as_deref()?;
        crate::util::calc_age_on(birth, today)
    }

    /// Whether the card should carry an allergy badge.
    pub fn has_allergies(&self) -> bool {
        !self.allergies.is_empty()
    }

    /// Code for display, `---` when unassigned.
    pub fn display_code(&self) -> &str {
        self.customer_code.as_deref().unwrap_or("---")
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = crate::util::timestamp_now();
    }
}

/// Gender enumeration accepted by the registration form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allergy severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Returned when a string names no known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// One allergy entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "AllergyRepr")]
pub struct Allergy {
    pub allergen: String,
    pub severity: Option<Severity>,
    pub note: Option<String>,
}

impl Allergy {
    pub fn new(allergen: impl Into<String>) -> Self {
        Self {
            allergen: allergen.into(),
            severity: None,
            note: None,
        }
    }
}

/// Stored shapes of an allergy entry; old data holds bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum AllergyRepr {
    Plain(String),
    Entry {
        #[serde(default, deserialize_with = "null_as_default")]
        allergen: String,
        #[serde(default, deserialize_with = "lenient_option")]
        severity: Option<Severity>,
        #[serde(default)]
        note: Option<String>,
    },
}

impl From<AllergyRepr> for Allergy {
    fn from(repr: AllergyRepr) -> Self {
        match repr {
            AllergyRepr::Plain(allergen) => Allergy::new(allergen),
            AllergyRepr::Entry {
                allergen,
                severity,
                note,
            } => Allergy {
                allergen,
                severity,
                note,
            },
        }
    }
}

/// One medical-history entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "MedicalHistoryRepr")]
pub struct MedicalHistory {
    pub condition: String,
    pub note: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MedicalHistoryRepr {
    Plain(String),
    Entry {
        #[serde(default, deserialize_with = "null_as_default")]
        condition: String,
        #[serde(default)]
        note: Option<String>,
    },
}

impl From<MedicalHistoryRepr> for MedicalHistory {
    fn from(repr: MedicalHistoryRepr) -> Self {
        match repr {
            MedicalHistoryRepr::Plain(condition) => MedicalHistory {
                condition,
                note: None,
            },
            MedicalHistoryRepr::Entry { condition, note } => MedicalHistory { condition, note },
        }
    }
}

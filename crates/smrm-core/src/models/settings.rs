//! Application settings singletons.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{lenient_option, UnknownVariant};

/// Fixed key of the display settings record.
pub const DISPLAY_SETTINGS_ID: &str = "display_settings";
/// Fixed key of the image settings record.
pub const IMAGE_SETTINGS_ID: &str = "image_settings";
/// Fixed key of the treatment menu catalog record.
pub const TREATMENT_MENUS_ID: &str = "treatment_menus";

const CUSTOMER_FIELDS: &[&str] = &[
    "code",
    "kana",
    "phone",
    "email",
    "address",
    "occupation",
    "firstVisit",
    "practitioner",
    "memo",
    "allergies",
    "histories",
    "photo",
];

const TREATMENT_FIELDS: &[&str] = &["menu", "duration", "bodyCondition", "photo"];

/// Per-section visibility toggles for optional fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplaySettings {
    #[serde(default)]
    pub id: String,
    /// section -> field -> visible
    #[serde(default)]
    pub fields: BTreeMap<String, BTreeMap<String, bool>>,
}

impl Default for DisplaySettings {
    /// Every optional field visible.
    fn default() -> Self {
        let section = |names: &[&str]| {
            names
                .iter()
                .map(|name| (name.to_string(), true))
                .collect::<BTreeMap<_, _>>()
        };

        let mut fields = BTreeMap::new();
        fields.insert("customer".to_string(), section(CUSTOMER_FIELDS));
        fields.insert("treatment".to_string(), section(TREATMENT_FIELDS));

        Self {
            id: DISPLAY_SETTINGS_ID.to_string(),
            fields,
        }
    }
}

impl DisplaySettings {
    /// Anything not explicitly switched off is visible.
    pub fn is_visible(&self, section: &str, field: &str) -> bool {
        self.fields
            .get(section)
            .and_then(|fields| fields.get(field))
            .copied()
            .unwrap_or(true)
    }

    pub fn set_visible(&mut self, section: &str, field: &str, visible: bool) {
        self.fields
            .entry(section.to_string())
            .or_default()
            .insert(field.to_string(), visible);
    }
}

/// Image compression preset names.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImagePreset {
    High,
    #[default]
    Standard,
    Compact,
}

/// Re-encode parameters for a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionProfile {
    /// Longest side in pixels after resizing
    pub max_long_side: u32,
    /// JPEG quality in 0.0..=1.0
    pub jpeg_quality: f32,
}

impl ImagePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImagePreset::High => "high",
            ImagePreset::Standard => "standard",
            ImagePreset::Compact => "compact",
        }
    }

    pub fn profile(&self) -> CompressionProfile {
        match self {
            ImagePreset::High => CompressionProfile {
                max_long_side: 2048,
                jpeg_quality: 0.92,
            },
            ImagePreset::Standard => CompressionProfile {
                max_long_side: 1200,
                jpeg_quality: 0.80,
            },
            ImagePreset::Compact => CompressionProfile {
                max_long_side: 800,
                jpeg_quality: 0.60,
            },
        }
    }
}

impl FromStr for ImagePreset {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(ImagePreset::High),
            "standard" => Ok(ImagePreset::Standard),
            "compact" => Ok(ImagePreset::Compact),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Selected image compression preset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageSettings {
    #[serde(default)]
    pub id: String,
    /// Unknown or missing presets read as `standard`
    #[serde(default, deserialize_with = "lenient_option")]
    pub preset: Option<ImagePreset>,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            id: IMAGE_SETTINGS_ID.to_string(),
            preset: Some(ImagePreset::Standard),
        }
    }
}

impl ImageSettings {
    pub fn with_preset(preset: ImagePreset) -> Self {
        Self {
            preset: Some(preset),
            ..Self::default()
        }
    }

    /// Effective preset.
    pub fn preset(&self) -> ImagePreset {
        self.preset.unwrap_or_default()
    }
}

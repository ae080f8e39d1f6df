//! Media attachment models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{null_as_default, UnknownVariant};

/// Only re-encoded JPEG payloads are stored.
pub const MEDIA_MIME_TYPE: &str = "image/jpeg";

/// Which kind of entity owns a media item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParentType {
    Customer,
    TreatmentRecord,
}

impl ParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentType::Customer => "customer",
            ParentType::TreatmentRecord => "treatment_record",
        }
    }
}

impl FromStr for ParentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(ParentType::Customer),
            "treatment_record" => Ok(ParentType::TreatmentRecord),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored image attached to a customer or a treatment record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    /// Owning entity ID
    pub parent_id: String,
    pub parent_type: ParentType,
    /// Original file name as picked by the user
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_name: String,
    #[serde(default = "default_mime_type", deserialize_with = "mime_type_or_default")]
    pub mime_type: String,
    /// Full-size payload (data URL)
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_url: String,
    /// Thumbnail payload (data URL)
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Fields written by other versions, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_mime_type() -> String {
    MEDIA_MIME_TYPE.to_string()
}

fn mime_type_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_mime_type))
}

impl MediaItem {
    /// Create a new media item from already re-encoded payloads.
    pub fn new(
        parent_id: String,
        parent_type: ParentType,
        file_name: String,
        data_url: String,
        thumbnail: String,
    ) -> Self {
        Self {
            id: crate::util::generate_uuid(),
            parent_id,
            parent_type,
            file_name,
            mime_type: default_mime_type(),
            data_url,
            thumbnail,
            memo: String::new(),
            created_at: crate::util::timestamp_now(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ParentType::TreatmentRecord).unwrap(),
            "\"treatment_record\""
        );
        assert_eq!("customer".parse::<ParentType>(), Ok(ParentType::Customer));
        assert!("record".parse::<ParentType>().is_err());
    }

    #[test]
    fn test_new_media_is_jpeg() {
        let item = MediaItem::new(
            "c1".into(),
            ParentType::Customer,
            "face.png".into(),
            "data:image/jpeg;base64,AAA".into(),
            "data:image/jpeg;base64,BBB".into(),
        );
        assert_eq!(item.mime_type, "image/jpeg");
        assert!(item.memo.is_empty());
    }

    #[test]
    fn test_null_strings_decode() {
        let json = r#"{
            "id": "m1",
            "parentId": "c1",
            "parentType": "customer",
            "memo": null,
            "mimeType": null,
            "thumbnail": null,
            "width": 640
        }"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert!(item.memo.is_empty());
        assert!(item.thumbnail.is_empty());
        assert_eq!(item.mime_type, MEDIA_MIME_TYPE);
        assert_eq!(item.extra["width"], 640);
    }
}

//! Full-snapshot export.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::APP_NAME;
use crate::db::{Database, DbResult};
use crate::models::{Customer, DisplaySettings, ImageSettings, MediaItem, TreatmentMenu, TreatmentRecord};
use crate::util::timestamp_now;

/// The export file format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    pub app_name: String,
    pub exported_at: String,
    pub customers: Vec<Customer>,
    pub treatment_records: Vec<TreatmentRecord>,
    pub media: Vec<MediaItem>,
    pub display_settings: DisplaySettings,
    pub treatment_menus: Vec<TreatmentMenu>,
    pub image_settings: ImageSettings,
}

impl ExportBundle {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct Exporter<'a> {
    db: &'a Database,
    version: String,
}

impl<'a> Exporter<'a> {
    pub fn new(db: &'a Database, version: impl Into<String>) -> Self {
        Self {
            db,
            version: version.into(),
        }
    }

    /// Snapshot of every collection and setting.
    ///
    /// Records are gathered customer by customer, so records whose customer
    /// no longer exists are not exported.
    pub fn bundle(&self) -> DbResult<ExportBundle> {
        let customers: Vec<Customer> = self.db.get_all()?;
        let mut treatment_records = Vec::new();
        for customer in &customers {
            treatment_records.extend(self.db.list_records_for_customer(&customer.id)?);
        }
        let media: Vec<MediaItem> = self.db.get_all()?;

        info!(
            customers = customers.len(),
            records = treatment_records.len(),
            media = media.len(),
            "Exported snapshot"
        );

        Ok(ExportBundle {
            version: self.version.clone(),
            app_name: APP_NAME.to_string(),
            exported_at: timestamp_now(),
            customers,
            treatment_records,
            media,
            display_settings: self.db.load_display_settings(),
            treatment_menus: self.db.load_treatment_menus(),
            image_settings: self.db.load_image_settings(),
        })
    }

    /// Pretty-printed bundle JSON.
    pub fn to_json(&self) -> DbResult<String> {
        Ok(self.bundle()?.to_json_pretty()?)
    }
}

/// `smrm_export_YYYYMMDD_HHMMSS.json` in local time.
pub fn export_file_name(at: DateTime<Local>) -> String {
    format!("smrm_export_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// File name for an export taken now.
pub fn suggested_file_name() -> String {
    export_file_name(Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParentType;
    use chrono::TimeZone;

    #[test]
    fn test_export_file_name() {
        let at = Local.with_ymd_and_hms(2026, 2, 8, 9, 5, 3).unwrap();
        assert_eq!(export_file_name(at), "smrm_export_20260208_090503.json");
    }

    #[test]
    fn test_bundle_contents() {
        let db = Database::open_in_memory().unwrap();
        let customer = Customer::new("Hanako".into());
        db.insert_customer(&customer).unwrap();
        db.insert_record(&TreatmentRecord::new(customer.id.clone())).unwrap();
        db.insert_record(&TreatmentRecord::new("orphan".into())).unwrap();
        db.insert_media(&MediaItem::new(
            customer.id.clone(),
            ParentType::Customer,
            "a.jpg".into(),
            String::new(),
            String::new(),
        ))
        .unwrap();

        let bundle = Exporter::new(&db, "1.2.0").bundle().unwrap();
        assert_eq!(bundle.app_name, "smrm");
        assert_eq!(bundle.version, "1.2.0");
        assert_eq!(bundle.customers.len(), 1);
        assert_eq!(bundle.treatment_records.len(), 1);
        assert_eq!(bundle.media.len(), 1);
        assert_eq!(bundle.display_settings, DisplaySettings::default());
        assert!(bundle.treatment_menus.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let db = Database::open_in_memory().unwrap();
        let json = Exporter::new(&db, "1.0.0").to_json().unwrap();
        assert!(json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "version",
            "appName",
            "exportedAt",
            "customers",
            "treatmentRecords",
            "media",
            "displaySettings",
            "treatmentMenus",
            "imageSettings",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["imageSettings"]["preset"], "standard");
    }
}

//! App settings singletons.
//!
//! Loaders never fail: a missing or unreadable record yields the default, and
//! so does a storage engine that cannot be opened at all.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Collection, Database, DbResult, Document};
use crate::models::{
    sort_catalog, DisplaySettings, ImageSettings, TreatmentMenu, DISPLAY_SETTINGS_ID,
    IMAGE_SETTINGS_ID, TREATMENT_MENUS_ID,
};

/// Stored shape of the treatment menu catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MenuCatalog {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub menus: Vec<TreatmentMenu>,
}

impl Document for DisplaySettings {
    const COLLECTION: Collection = Collection::AppSettings;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Document for ImageSettings {
    const COLLECTION: Collection = Collection::AppSettings;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Document for MenuCatalog {
    const COLLECTION: Collection = Collection::AppSettings;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Database {
    pub fn load_display_settings(&self) -> DisplaySettings {
        self.load_setting(DISPLAY_SETTINGS_ID).unwrap_or_default()
    }

    /// Persist display settings under the fixed id.
    pub fn save_display_settings(&self, settings: &DisplaySettings) -> DbResult<()> {
        let settings = DisplaySettings {
            id: DISPLAY_SETTINGS_ID.to_string(),
            ..settings.clone()
        };
        self.put(&settings)
    }

    pub fn load_image_settings(&self) -> ImageSettings {
        self.load_setting(IMAGE_SETTINGS_ID).unwrap_or_default()
    }

    /// Persist image settings under the fixed id.
    pub fn save_image_settings(&self, settings: &ImageSettings) -> DbResult<()> {
        let settings = ImageSettings {
            id: IMAGE_SETTINGS_ID.to_string(),
            ..settings.clone()
        };
        self.put(&settings)
    }

    /// The menu catalog as stored; empty when absent.
    pub fn load_treatment_menus(&self) -> Vec<TreatmentMenu> {
        self.load_setting::<MenuCatalog>(TREATMENT_MENUS_ID)
            .map(|catalog| catalog.menus)
            .unwrap_or_default()
    }

    /// The catalog in display order.
    pub fn list_treatment_menus(&self) -> Vec<TreatmentMenu> {
        let mut menus = self.load_treatment_menus();
        sort_catalog(&mut menus);
        menus
    }

    pub fn save_treatment_menus(&self, menus: &[TreatmentMenu]) -> DbResult<()> {
        self.put(&MenuCatalog {
            id: TREATMENT_MENUS_ID.to_string(),
            menus: menus.to_vec(),
        })
    }

    fn load_setting<T: Document>(&self, id: &str) -> Option<T> {
        match self.get::<T>(id) {
            Ok(found) => found,
            Err(e) => {
                warn!(setting = id, error = %e, "Unreadable setting, using default");
                None
            }
        }
    }
}

/// Display settings from the database at `path`, defaults if it cannot be opened.
pub fn display_settings_at<P: AsRef<Path>>(path: P) -> DisplaySettings {
    match Database::open(path) {
        Ok(db) => db.load_display_settings(),
        Err(e) => {
            warn!(error = %e, "Storage unavailable, using default display settings");
            DisplaySettings::default()
        }
    }
}

/// Image settings from the database at `path`, defaults if it cannot be opened.
pub fn image_settings_at<P: AsRef<Path>>(path: P) -> ImageSettings {
    match Database::open(path) {
        Ok(db) => db.load_image_settings(),
        Err(e) => {
            warn!(error = %e, "Storage unavailable, using default image settings");
            ImageSettings::default()
        }
    }
}

//! Merge import.
//!
//! Items are inserted one statement at a time with no enclosing transaction:
//! a bad item is counted as skipped and the batch carries on. Items are stored
//! exactly as they appear in the bundle. Local data always wins on id
//! collisions; settings in the bundle overwrite the local ones.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{merge_menus_by_name, next_sort_order};
use crate::db::{Collection, Database, DbError};
use crate::models::{DisplaySettings, ImageSettings, TreatmentMenu, TreatmentRecord};
use crate::validation::validate_import_data;

const CUSTOMER_BATCH: usize = 10;
const RECORD_BATCH: usize = 50;
const MEDIA_BATCH: usize = 10;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Malformed import file: {0}")]
    Malformed(String),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPhase {
    Preparing,
    Customers,
    Records,
    Media,
    Done,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::Preparing => "preparing",
            ImportPhase::Customers => "customers",
            ImportPhase::Records => "records",
            ImportPhase::Media => "media",
            ImportPhase::Done => "done",
        }
    }
}

/// Progress report; `processed` never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportProgress {
    pub phase: ImportPhase,
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported_customers: usize,
    pub skipped_customers: usize,
    pub imported_records: usize,
    pub skipped_records: usize,
    pub imported_media: usize,
    pub skipped_media: usize,
    /// Catalog entries added by the merge
    pub menus_added: usize,
}

/// A parsed bundle that passed the structural check.
#[derive(Debug, Clone)]
pub struct ParsedImport {
    data: Map<String, Value>,
}

impl ParsedImport {
    /// Parse and check bundle text.
    pub fn parse(text: &str) -> ImportResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> ImportResult<Self> {
        let check = validate_import_data(&value);
        match value {
            Value::Object(data) if check.valid => Ok(Self { data }),
            _ => Err(ImportError::Malformed(
                check.error.unwrap_or_else(|| "Not a JSON object".to_string()),
            )),
        }
    }

    fn items(&self, key: &str) -> &[Value] {
        self.data
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn customer_count(&self) -> usize {
        self.items("customers").len()
    }

    pub fn record_count(&self) -> usize {
        self.items("treatmentRecords").len()
    }

    pub fn media_count(&self) -> usize {
        self.items("media").len()
    }

    fn setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.data.get(key).filter(|v| !v.is_null())?;
        match serde_json::from_value(value.clone()) {
            Ok(setting) => Some(setting),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed setting in import");
                None
            }
        }
    }
}

type ProgressFn<'a> = Box<dyn FnMut(ImportProgress) + 'a>;

pub struct Importer<'a> {
    db: &'a Database,
    progress: Option<ProgressFn<'a>>,
    processed: usize,
    total: usize,
}

impl<'a> Importer<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            progress: None,
            processed: 0,
            total: 0,
        }
    }

    /// Report progress to `callback` during the import.
    pub fn with_progress(mut self, callback: impl FnMut(ImportProgress) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Parse, check and merge bundle text.
    pub fn import_text(&mut self, text: &str) -> ImportResult<ImportSummary> {
        let parsed = ParsedImport::parse(text)?;
        self.import(&parsed)
    }

    /// Merge a checked bundle into the store.
    pub fn import(&mut self, bundle: &ParsedImport) -> ImportResult<ImportSummary> {
        let mut summary = ImportSummary::default();
        self.processed = 0;
        self.total = bundle.customer_count() + bundle.record_count() + bundle.media_count();
        info!(total = self.total, "Starting import");
        self.report(ImportPhase::Preparing);

        self.report(ImportPhase::Customers);
        for item in bundle.items("customers") {
            let imported = self.insert_new(Collection::Customers, item, true);
            tally(imported, &mut summary.imported_customers, &mut summary.skipped_customers);
            self.advance(ImportPhase::Customers, CUSTOMER_BATCH);
        }

        self.report(ImportPhase::Records);
        let mut records = Vec::new();
        for item in bundle.items("treatmentRecords") {
            if let Ok(record) = serde_json::from_value::<TreatmentRecord>(item.clone()) {
                records.push(record);
            }
            let imported = self.insert_new(Collection::TreatmentRecords, item, true);
            tally(imported, &mut summary.imported_records, &mut summary.skipped_records);
            self.advance(ImportPhase::Records, RECORD_BATCH);
        }

        if bundle.data.get("media").map_or(false, Value::is_array) {
            self.report(ImportPhase::Media);
            for item in bundle.items("media") {
                let imported = self.insert_new(Collection::Media, item, false);
                tally(imported, &mut summary.imported_media, &mut summary.skipped_media);
                self.advance(ImportPhase::Media, MEDIA_BATCH);
            }
        }

        summary.menus_added = self.merge_menus(bundle, &records)?;

        if let Some(settings) = bundle.setting::<DisplaySettings>("displaySettings") {
            self.db.save_display_settings(&settings)?;
        }
        if let Some(settings) = bundle.setting::<ImageSettings>("imageSettings") {
            self.db.save_image_settings(&settings)?;
        }

        self.report(ImportPhase::Done);
        info!(
            customers = summary.imported_customers,
            records = summary.imported_records,
            media = summary.imported_media,
            menus = summary.menus_added,
            "Import finished"
        );
        Ok(summary)
    }

    /// Store one item as given unless its id is missing or already present.
    ///
    /// `check_first` looks the id up before writing; otherwise the write is
    /// attempted and a duplicate key counts as skipped.
    fn insert_new(&self, collection: Collection, item: &Value, check_first: bool) -> bool {
        let Some(id) = item
            .as_object()
            .and_then(|object| object.get("id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
        else {
            debug!(%collection, "Skipping item without an id");
            return false;
        };

        if check_first {
            match self.db.contains(collection, id) {
                Ok(true) => return false,
                Ok(false) => {}
                Err(e) => {
                    warn!(%collection, id, error = %e, "Lookup failed");
                    return false;
                }
            }
        }

        match self.db.add_raw(collection, id, item) {
            Ok(()) => true,
            Err(DbError::DuplicateKey { .. }) => false,
            Err(e) => {
                warn!(%collection, id, error = %e, "Skipping item");
                false
            }
        }
    }

    /// Merge imported menus by name, add menus only named by records, and
    /// save the catalog if it changed. Returns the number of entries added.
    fn merge_menus(&self, bundle: &ParsedImport, records: &[TreatmentRecord]) -> ImportResult<usize> {
        let existing = self.db.load_treatment_menus();

        let imported: Vec<TreatmentMenu> = bundle
            .items("treatmentMenus")
            .iter()
            .filter_map(|item| serde_json::from_value::<TreatmentMenu>(item.clone()).ok())
            .filter(|menu| !menu.name.trim().is_empty())
            .collect();
        let mut merged = merge_menus_by_name(&existing, &imported);

        for record in records {
            let Some(name) = record.treatment_menu.as_deref().filter(|n| !n.is_empty()) else {
                continue;
            };
            if merged.iter().any(|menu| menu.name == name) {
                continue;
            }
            let sort_order = next_sort_order(&merged);
            merged.push(TreatmentMenu::new(
                name.to_string(),
                record.duration.filter(|d| *d > 0),
                sort_order,
            ));
        }

        if merged == existing {
            return Ok(0);
        }
        self.db.save_treatment_menus(&merged)?;
        Ok(merged.len() - existing.len())
    }

    fn advance(&mut self, phase: ImportPhase, batch: usize) {
        self.processed += 1;
        if self.processed % batch == 0 {
            self.report(phase);
        }
    }

    fn report(&mut self, phase: ImportPhase) {
        let progress = ImportProgress {
            phase,
            processed: self.processed,
            total: self.total,
        };
        if let Some(callback) = self.progress.as_mut() {
            callback(progress);
        }
    }
}

fn tally(imported: bool, imported_count: &mut usize, skipped_count: &mut usize) {
    if imported {
        *imported_count += 1;
    } else {
        *skipped_count += 1;
    }
}

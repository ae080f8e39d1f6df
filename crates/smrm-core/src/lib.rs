//! SMRM Core Library
//!
//! On-device store for customer profiles and treatment visit records, with a
//! JSON backup format for moving data between devices.
//!
//! # Architecture
//!
//! ```text
//!   UI form ──► Validation ──► Intake ──┐
//!                                       ▼
//!                               Domain Repository ──► Store Adapter ──► SQLite
//!                                       ▲
//!   backup.json ──► parse + check ──► Importer
//!
//!   SQLite ──► Exporter ──► smrm_export_YYYYMMDD_HHMMSS.json
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite document store, typed repository and cascades
//! - [`models`]: Domain types (Customer, TreatmentRecord, MediaItem, settings)
//! - [`validation`]: Pure checks on form candidates and import bundles
//! - [`intake`]: Registration, visit recording, photo staging, menu editing
//! - [`history`]: Per-customer timeline and customer cards
//! - [`transfer`]: Export and merge import
//! - [`config`]: TOML configuration
//! - [`util`]: Identifiers, dates and formatting

pub mod config;
pub mod db;
pub mod history;
pub mod intake;
pub mod models;
pub mod transfer;
pub mod util;
pub mod validation;

// Re-export commonly used types
pub use config::CoreConfig;
pub use db::{Collection, Database};
pub use history::{History, SortDirection};
pub use intake::{Intake, MediaStaging};
pub use models::{Customer, MediaItem, ParentType, TreatmentMenu, TreatmentRecord};
pub use transfer::{Exporter, Importer, APP_NAME};
pub use validation::Validation;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use models::{CustomerInput, DisplaySettings, ImagePreset, ImageSettings, MenuInput, RecordInput};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum SmrmError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed import file: {0}")]
    MalformedImport(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for SmrmError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(id) => SmrmError::NotFound(id),
            other => SmrmError::DatabaseError(other.to_string()),
        }
    }
}

impl From<validation::ValidationError> for SmrmError {
    fn from(e: validation::ValidationError) -> Self {
        SmrmError::InvalidInput(e.errors.join("\n"))
    }
}

impl From<intake::IntakeError> for SmrmError {
    fn from(e: intake::IntakeError) -> Self {
        match e {
            intake::IntakeError::Validation(e) => e.into(),
            intake::IntakeError::Db(e) => e.into(),
            intake::IntakeError::NotFound(id) => SmrmError::NotFound(id),
            other => SmrmError::InvalidInput(other.to_string()),
        }
    }
}

impl From<transfer::ImportError> for SmrmError {
    fn from(e: transfer::ImportError) -> Self {
        match e {
            transfer::ImportError::Malformed(reason) => SmrmError::MalformedImport(reason),
            transfer::ImportError::Db(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for SmrmError {
    fn from(e: serde_json::Error) -> Self {
        SmrmError::SerializationError(e.to_string())
    }
}

impl From<util::CodeError> for SmrmError {
    fn from(e: util::CodeError) -> Self {
        SmrmError::InvalidInput(e.to_string())
    }
}

impl From<anyhow::Error> for SmrmError {
    fn from(e: anyhow::Error) -> Self {
        SmrmError::ConfigError(format!("{:#}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for SmrmError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        SmrmError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path with default configuration.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<SmrmCore>, SmrmError> {
    let db = Database::open(&path)?;
    Ok(SmrmCore::with_database(db, CoreConfig::default()))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<SmrmCore>, SmrmError> {
    let db = Database::open_in_memory()?;
    Ok(SmrmCore::with_database(db, CoreConfig::default()))
}

/// Open the database named by the configuration file, or by the per-user
/// config when no path is given.
#[uniffi::export]
pub fn open_with_config(config_path: Option<String>) -> Result<Arc<SmrmCore>, SmrmError> {
    let config = CoreConfig::resolve(config_path.as_deref().map(std::path::Path::new))?;
    let path = config.database_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SmrmError::ConfigError(format!("{}: {}", parent.display(), e)))?;
    }
    let db = Database::open(&path)?;
    Ok(SmrmCore::with_database(db, config))
}

/// Target size for an image whose longer side must fit `max_side`.
#[uniffi::export]
pub fn scaled_dimensions(width: u32, height: u32, max_side: u32) -> FfiDimensions {
    let (width, height) = util::scaled_dimensions(width, height, max_side);
    FfiDimensions { width, height }
}

/// Compression parameters for a preset name; unknown names mean `standard`.
#[uniffi::export]
pub fn resolve_image_preset(preset: Option<String>) -> FfiImageProfile {
    util::resolve_image_preset(preset.as_deref()).into()
}

/// Suggested file name for an export taken now.
#[uniffi::export]
pub fn export_file_name() -> String {
    transfer::suggested_file_name()
}

/// Escape text for insertion into HTML.
#[uniffi::export]
pub fn escape_html(input: String) -> String {
    util::escape_html(&input)
}

/// `YYYY/MM/DD HH:MM`, or `---` when the input does not parse.
#[uniffi::export]
pub fn format_date_time(input: String) -> String {
    util::format_date_time(&input)
}

/// `YYYY/MM/DD`, or `---` when the input does not parse.
#[uniffi::export]
pub fn format_date(input: String) -> String {
    util::format_date(&input)
}

/// Age in whole years today.
#[uniffi::export]
pub fn calc_age(birth_date: String) -> Option<i32> {
    util::calc_age(&birth_date)
}

/// Next free customer code after the highest in `existing`.
#[uniffi::export]
pub fn generate_customer_code(existing: Vec<String>) -> Result<String, SmrmError> {
    Ok(util::generate_customer_code(&existing)?)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
///
/// Entities cross the boundary as camelCase JSON, the same shape they take in
/// export files.
#[derive(uniffi::Object)]
pub struct SmrmCore {
    db: Arc<Mutex<Database>>,
    config: CoreConfig,
    /// Photo staging buffers keyed by form id
    staging: Mutex<HashMap<String, MediaStaging>>,
}

impl SmrmCore {
    fn with_database(db: Database, config: CoreConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
            staging: Mutex::new(HashMap::new()),
        })
    }
}

#[uniffi::export]
impl SmrmCore {
    // =========================================================================
    // Customer Operations
    // =========================================================================

    /// Register a customer from form input; returns the stored customer.
    pub fn create_customer(&self, input_json: String) -> Result<String, SmrmError> {
        let input: CustomerInput = from_json(&input_json)?;
        let db = self.db.lock()?;
        let customer = Intake::new(&db).register_customer(&input)?;
        to_json(&customer)
    }

    /// Replace a customer's editable fields.
    pub fn update_customer(&self, id: String, input_json: String) -> Result<String, SmrmError> {
        let input: CustomerInput = from_json(&input_json)?;
        let db = self.db.lock()?;
        let customer = Intake::new(&db).edit_customer(&id, &input)?;
        to_json(&customer)
    }

    pub fn get_customer(&self, id: String) -> Result<Option<String>, SmrmError> {
        let db = self.db.lock()?;
        db.get_customer(&id)?.map(|c| to_json(&c)).transpose()
    }

    /// All customers in code order.
    pub fn list_customers(&self) -> Result<String, SmrmError> {
        let db = self.db.lock()?;
        to_json(&db.list_customers()?)
    }

    /// Customer cards matching `query` (name, kana or code).
    pub fn search_customers(&self, query: String) -> Result<String, SmrmError> {
        let db = self.db.lock()?;
        let cards = History::new(&db).customer_cards(&query, util::today())?;
        to_json(&cards)
    }

    pub fn customer_card(&self, id: String) -> Result<Option<String>, SmrmError> {
        let db = self.db.lock()?;
        History::new(&db)
            .customer_card(&id, util::today())?
            .map(|card| to_json(&card))
            .transpose()
    }

    /// Delete a customer with all of their records and photos.
    pub fn delete_customer(&self, id: String) -> Result<bool, SmrmError> {
        let db = self.db.lock()?;
        Ok(db.delete_customer_cascade(&id)?)
    }

    // =========================================================================
    // Treatment Record Operations
    // =========================================================================

    /// Record a visit for `customer_id`; returns the stored record.
    pub fn create_record(&self, customer_id: String, input_json: String) -> Result<String, SmrmError> {
        let input: RecordInput = from_json(&input_json)?;
        let db = self.db.lock()?;
        let record = Intake::new(&db).record_visit(&customer_id, &input)?;
        to_json(&record)
    }

    pub fn update_record(&self, id: String, input_json: String) -> Result<String, SmrmError> {
        let input: RecordInput = from_json(&input_json)?;
        let db = self.db.lock()?;
        let record = Intake::new(&db).edit_visit(&id, &input)?;
        to_json(&record)
    }

    pub fn get_record(&self, id: String) -> Result<Option<String>, SmrmError> {
        let db = self.db.lock()?;
        db.get_record(&id)?.map(|r| to_json(&r)).transpose()
    }

    /// Delete a record and its photos.
    pub fn delete_record(&self, id: String) -> Result<bool, SmrmError> {
        let db = self.db.lock()?;
        Ok(db.delete_record_cascade(&id)?)
    }

    /// One page of a customer's visit history.
    pub fn history_page(
        &self,
        customer_id: String,
        ascending: bool,
        page: u32,
    ) -> Result<String, SmrmError> {
        let direction = if ascending {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        let db = self.db.lock()?;
        let page = History::new(&db).page(
            &customer_id,
            direction,
            page as usize,
            self.config.history.page_size,
        )?;
        to_json(&page)
    }

    /// The latest visits shown beside the visit form.
    pub fn recent_visits(&self, customer_id: String) -> Result<String, SmrmError> {
        let db = self.db.lock()?;
        to_json(&History::new(&db).recent(&customer_id, history::RECENT_VISITS)?)
    }

    pub fn previous_after_notes(&self, customer_id: String) -> Result<Option<String>, SmrmError> {
        let db = self.db.lock()?;
        Ok(History::new(&db).previous_after_notes(&customer_id)?)
    }

    // =========================================================================
    // Generic Collection Access
    // =========================================================================

    /// All documents of a collection, in insertion order.
    pub fn read_all(&self, collection: String) -> Result<String, SmrmError> {
        let collection = parse_collection(&collection)?;
        let db = self.db.lock()?;
        match collection {
            Collection::Customers => to_json(&db.get_all::<Customer>()?),
            Collection::TreatmentRecords => to_json(&db.get_all::<TreatmentRecord>()?),
            Collection::Media => to_json(&db.get_all::<MediaItem>()?),
            Collection::AppSettings => Err(SmrmError::InvalidInput(
                "Settings are read through their own calls".to_string(),
            )),
        }
    }

    /// Documents whose indexed field equals `value`, in insertion order.
    pub fn read_by_index(
        &self,
        collection: String,
        index: String,
        value: String,
    ) -> Result<String, SmrmError> {
        let collection = parse_collection(&collection)?;
        let db = self.db.lock()?;
        match collection {
            Collection::Customers => to_json(&db.get_by_index::<Customer>(&index, &value)?),
            Collection::TreatmentRecords => {
                to_json(&db.get_by_index::<TreatmentRecord>(&index, &value)?)
            }
            Collection::Media => to_json(&db.get_by_index::<MediaItem>(&index, &value)?),
            Collection::AppSettings => Err(SmrmError::InvalidInput(format!(
                "Unknown index {} on app_settings",
                index
            ))),
        }
    }

    // =========================================================================
    // Media Operations
    // =========================================================================

    /// Stage a re-encoded photo for the form `form_id`.
    ///
    /// Returns false when the source file is not an image.
    pub fn stage_photo(
        &self,
        form_id: String,
        file_name: String,
        source_mime_type: String,
        data_url: String,
        thumbnail: String,
    ) -> Result<bool, SmrmError> {
        let mut staging = self.staging.lock()?;
        let buffer = staging
            .entry(form_id)
            .or_insert_with(|| MediaStaging::new(self.config.media.max_per_record));
        Ok(buffer.stage(&file_name, &source_mime_type, data_url, thumbnail)?)
    }

    /// Drop the staged photo at `index`; false when there is none.
    pub fn unstage_photo(&self, form_id: String, index: u32) -> Result<bool, SmrmError> {
        let mut staging = self.staging.lock()?;
        Ok(staging
            .get_mut(&form_id)
            .and_then(|buffer| buffer.remove(index as usize))
            .is_some())
    }

    pub fn staged_photo_count(&self, form_id: String) -> Result<u32, SmrmError> {
        let staging = self.staging.lock()?;
        Ok(staging.get(&form_id).map_or(0, |buffer| buffer.len() as u32))
    }

    /// Save every photo staged for `form_id` under its parent.
    pub fn commit_staged_photos(
        &self,
        form_id: String,
        parent_id: String,
        parent_type: String,
    ) -> Result<u32, SmrmError> {
        let parent_type: ParentType = parent_type
            .parse()
            .map_err(|e: models::UnknownVariant| SmrmError::InvalidInput(e.to_string()))?;
        let mut staging = self.staging.lock()?;
        let Some(buffer) = staging.get_mut(&form_id) else {
            return Ok(0);
        };
        let db = self.db.lock()?;
        // A failed commit leaves the photos staged for a retry
        let saved = buffer.commit(&db, &parent_id, parent_type)?;
        staging.remove(&form_id);
        Ok(saved.len() as u32)
    }

    /// Forget the photos staged for `form_id`.
    pub fn discard_staged_photos(&self, form_id: String) -> Result<(), SmrmError> {
        self.staging.lock()?.remove(&form_id);
        Ok(())
    }

    pub fn list_media(&self, parent_id: String) -> Result<String, SmrmError> {
        let db = self.db.lock()?;
        to_json(&db.list_media_for_parent(&parent_id)?)
    }

    pub fn delete_media(&self, id: String) -> Result<bool, SmrmError> {
        let db = self.db.lock()?;
        Ok(db.delete_media(&id)?)
    }

    // =========================================================================
    // Settings Operations
    // =========================================================================

    pub fn display_settings(&self) -> Result<String, SmrmError> {
        let db = self.db.lock()?;
        to_json(&db.load_display_settings())
    }

    pub fn save_display_settings(&self, settings_json: String) -> Result<(), SmrmError> {
        let settings: DisplaySettings = from_json(&settings_json)?;
        let db = self.db.lock()?;
        Ok(db.save_display_settings(&settings)?)
    }

    /// Selected compression preset name.
    pub fn image_preset(&self) -> Result<String, SmrmError> {
        let db = self.db.lock()?;
        Ok(db.load_image_settings().preset().as_str().to_string())
    }

    pub fn set_image_preset(&self, preset: String) -> Result<(), SmrmError> {
        let preset: ImagePreset = preset
            .parse()
            .map_err(|e: models::UnknownVariant| SmrmError::InvalidInput(e.to_string()))?;
        let db = self.db.lock()?;
        Ok(db.save_image_settings(&ImageSettings::with_preset(preset))?)
    }

    /// Menu catalog in display order.
    pub fn list_treatment_menus(&self) -> Result<String, SmrmError> {
        let db = self.db.lock()?;
        to_json(&db.list_treatment_menus())
    }

    /// Replace the catalog with the edited rows; returns the saved catalog.
    pub fn save_treatment_menus(&self, rows_json: String) -> Result<String, SmrmError> {
        let rows: Vec<MenuInput> = from_json(&rows_json)?;
        let db = self.db.lock()?;
        let menus = Intake::new(&db).save_menu_catalog(&rows)?;
        to_json(&menus)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    pub fn validate_customer(&self, input_json: String) -> Result<FfiValidation, SmrmError> {
        let input: CustomerInput = from_json(&input_json)?;
        Ok(validation::validate_customer(&input).into())
    }

    /// Narrative and body condition checks together.
    pub fn validate_treatment_record(&self, input_json: String) -> Result<FfiValidation, SmrmError> {
        let input: RecordInput = from_json(&input_json)?;
        let outcome = validation::validate_treatment_record(&input)
            .and(validation::validate_body_condition(&input.body_condition));
        Ok(outcome.into())
    }

    pub fn validate_treatment_menu(&self, input_json: String) -> Result<FfiValidation, SmrmError> {
        let input: MenuInput = from_json(&input_json)?;
        Ok(validation::validate_treatment_menu(&input).into())
    }

    // =========================================================================
    // Export / Import
    // =========================================================================

    /// Full snapshot as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, SmrmError> {
        let db = self.db.lock()?;
        Ok(Exporter::new(&db, self.config.app_version.clone()).to_json()?)
    }

    /// Check a file and count what it holds without writing anything.
    pub fn preview_import(&self, text: String) -> Result<FfiImportPreview, SmrmError> {
        let parsed = transfer::ParsedImport::parse(&text)?;
        Ok(FfiImportPreview {
            customers: parsed.customer_count() as u64,
            treatment_records: parsed.record_count() as u64,
            media: parsed.media_count() as u64,
        })
    }

    /// Merge an export file into the store.
    pub fn import_json(&self, text: String) -> Result<FfiImportSummary, SmrmError> {
        let parsed = transfer::ParsedImport::parse(&text)?;
        let db = self.db.lock()?;
        let summary = Importer::new(&db).import(&parsed)?;
        Ok(summary.into())
    }

    /// Merge an export file, reporting progress to `listener`.
    pub fn import_json_with_progress(
        &self,
        text: String,
        listener: Box<dyn ImportProgressListener>,
    ) -> Result<FfiImportSummary, SmrmError> {
        let parsed = transfer::ParsedImport::parse(&text)?;
        let db = self.db.lock()?;
        let summary = Importer::new(&db)
            .with_progress(move |progress| {
                listener.on_progress(
                    progress.phase.as_str().to_string(),
                    progress.processed as u64,
                    progress.total as u64,
                )
            })
            .import(&parsed)?;
        Ok(summary.into())
    }

    /// Remove every customer, record, photo and setting.
    pub fn delete_all_data(&self) -> Result<(), SmrmError> {
        let db = self.db.lock()?;
        Ok(db.delete_all_data()?)
    }
}

fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, SmrmError> {
    serde_json::from_str(text).map_err(|e| SmrmError::InvalidInput(e.to_string()))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, SmrmError> {
    Ok(serde_json::to_string(value)?)
}

fn parse_collection(name: &str) -> Result<Collection, SmrmError> {
    Collection::from_name(name)
        .ok_or_else(|| SmrmError::InvalidInput(format!("Unknown collection: {}", name)))
}

// =========================================================================
// FFI Callbacks
// =========================================================================

/// Receives import progress; `processed` never decreases.
#[uniffi::export(callback_interface)]
pub trait ImportProgressListener: Send + Sync {
    fn on_progress(&self, phase: String, processed: u64, total: u64);
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe validation outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl From<Validation> for FfiValidation {
    fn from(v: Validation) -> Self {
        Self {
            valid: v.valid,
            errors: v.errors,
        }
    }
}

/// FFI-safe import result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportSummary {
    pub imported_customers: u64,
    pub skipped_customers: u64,
    pub imported_records: u64,
    pub skipped_records: u64,
    pub imported_media: u64,
    pub skipped_media: u64,
    pub menus_added: u64,
}

impl From<transfer::ImportSummary> for FfiImportSummary {
    fn from(s: transfer::ImportSummary) -> Self {
        Self {
            imported_customers: s.imported_customers as u64,
            skipped_customers: s.skipped_customers as u64,
            imported_records: s.imported_records as u64,
            skipped_records: s.skipped_records as u64,
            imported_media: s.imported_media as u64,
            skipped_media: s.skipped_media as u64,
            menus_added: s.menus_added as u64,
        }
    }
}

/// Item counts of an import file.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportPreview {
    pub customers: u64,
    pub treatment_records: u64,
    pub media: u64,
}

#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiDimensions {
    pub width: u32,
    pub height: u32,
}

/// FFI-safe compression profile.
#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiImageProfile {
    pub max_long_side: u32,
    pub jpeg_quality: f32,
}

impl From<models::CompressionProfile> for FfiImageProfile {
    fn from(p: models::CompressionProfile) -> Self {
        Self {
            max_long_side: p.max_long_side,
            jpeg_quality: p.jpeg_quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_flow_through_facade() {
        let core = open_database_in_memory().unwrap();
        let created = core
            .create_customer(r#"{"name": "Hanako", "phone": "090-1234-5678"}"#.into())
            .unwrap();
        let customer: Customer = serde_json::from_str(&created).unwrap();
        assert_eq!(customer.customer_code.as_deref(), Some("C0001"));

        let record = core
            .create_record(customer.id.clone(), r#"{"chiefComplaint": "Stiff neck"}"#.into())
            .unwrap();
        let record: TreatmentRecord = serde_json::from_str(&record).unwrap();

        let by_index = core
            .read_by_index("treatment_records".into(), "customerId".into(), customer.id.clone())
            .unwrap();
        assert!(by_index.contains(&record.id));

        assert!(core.delete_customer(customer.id.clone()).unwrap());
        assert!(core.get_record(record.id).unwrap().is_none());
    }

    #[test]
    fn test_validation_errors_surface_as_invalid_input() {
        let core = open_database_in_memory().unwrap();
        let err = core.create_customer(r#"{"name": "  "}"#.into()).unwrap_err();
        assert!(matches!(err, SmrmError::InvalidInput(_)));

        let outcome = core
            .validate_treatment_record(r#"{"bodyCondition": {"painLevel": 11}}"#.into())
            .unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn test_unknown_collection_and_index() {
        let core = open_database_in_memory().unwrap();
        assert!(matches!(
            core.read_all("patients".into()),
            Err(SmrmError::InvalidInput(_))
        ));
        assert!(matches!(
            core.read_by_index("media".into(), "fileName".into(), "a.jpg".into()),
            Err(SmrmError::DatabaseError(_))
        ));
    }

    #[test]
    fn test_staging_commit() {
        let core = open_database_in_memory().unwrap();
        let form = "customer-form".to_string();
        assert!(core
            .stage_photo(form.clone(), "a.png".into(), "image/png".into(), "data:a".into(), "t".into())
            .unwrap());
        assert!(!core
            .stage_photo(form.clone(), "a.pdf".into(), "application/pdf".into(), String::new(), String::new())
            .unwrap());
        assert_eq!(core.staged_photo_count(form.clone()).unwrap(), 1);

        let saved = core
            .commit_staged_photos(form.clone(), "c1".into(), "customer".into())
            .unwrap();
        assert_eq!(saved, 1);
        assert_eq!(core.staged_photo_count(form).unwrap(), 0);
        assert!(core.list_media("c1".into()).unwrap().contains("a.png"));
    }

    #[test]
    fn test_failed_staging_commit_can_be_retried() {
        let core = open_database_in_memory().unwrap();
        let form = "record-form".to_string();
        for name in ["a.png", "b.png"] {
            core.stage_photo(form.clone(), name.into(), "image/png".into(), "data:a".into(), "t".into())
                .unwrap();
        }
        let taken = core.staging.lock().unwrap()[&form].items()[1].id.clone();
        let blocker = serde_json::json!({"id": taken, "parentId": "x", "parentType": "customer"});
        core.db
            .lock()
            .unwrap()
            .add_raw(db::Collection::Media, &taken, &blocker)
            .unwrap();

        assert!(core
            .commit_staged_photos(form.clone(), "r1".into(), "treatment_record".into())
            .is_err());
        assert_eq!(core.staged_photo_count(form.clone()).unwrap(), 2);

        core.db
            .lock()
            .unwrap()
            .delete(db::Collection::Media, &taken)
            .unwrap();
        let saved = core
            .commit_staged_photos(form.clone(), "r1".into(), "treatment_record".into())
            .unwrap();
        assert_eq!(saved, 2);
        assert_eq!(core.staged_photo_count(form).unwrap(), 0);
    }

    #[test]
    fn test_import_rejects_foreign_file() {
        let core = open_database_in_memory().unwrap();
        let err = core
            .import_json(r#"{"appName": "other", "customers": [], "treatmentRecords": []}"#.into())
            .unwrap_err();
        assert!(matches!(err, SmrmError::MalformedImport(_)));
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(escape_html("<b>\"A&B\"</b>".into()), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        assert_eq!(format_date("2025-06-01".into()), "2025/06/01");
        assert_eq!(format_date(String::new()), "---");
        assert_eq!(format_date_time("not a date".into()), "---");
        assert_eq!(calc_age("garbage".into()), None);
        assert!(calc_age("1990-01-01".into()).unwrap() >= 36);

        assert_eq!(generate_customer_code(vec![]).unwrap(), "C0001");
        assert_eq!(
            generate_customer_code(vec!["C0007".into(), "X".into()]).unwrap(),
            "C0008"
        );
        assert!(matches!(
            generate_customer_code(vec!["C9999".into()]),
            Err(SmrmError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_image_preset_settings() {
        let core = open_database_in_memory().unwrap();
        assert_eq!(core.image_preset().unwrap(), "standard");
        core.set_image_preset("compact".into()).unwrap();
        assert_eq!(core.image_preset().unwrap(), "compact");
        assert!(core.set_image_preset("huge".into()).is_err());
        assert_eq!(resolve_image_preset(None).max_long_side, 1200);
        let dims = scaled_dimensions(4000, 3000, 1200);
        assert_eq!((dims.width, dims.height), (1200, 900));
    }
}

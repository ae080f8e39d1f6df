//! Per-form photo staging.
//!
//! Photos picked in a form are re-encoded by the UI and held here until the
//! owning customer or record is saved, then committed in one go.

use tracing::debug;

use super::{IntakeError, IntakeResult};
use crate::db::{Database, DbResult};
use crate::models::{MediaItem, ParentType, MEDIA_MIME_TYPE};
use crate::util::{generate_uuid, timestamp_now};

/// A re-encoded photo waiting for its parent to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedMedia {
    pub id: String,
    pub file_name: String,
    pub data_url: String,
    pub thumbnail: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MediaStaging {
    max_items: usize,
    items: Vec<StagedMedia>,
}

impl MediaStaging {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            items: Vec::new(),
        }
    }

    /// Stage one photo.
    ///
    /// Returns `Ok(false)` for non-image files, which are skipped, and
    /// `StagingFull` once the cap is reached.
    pub fn stage(
        &mut self,
        file_name: &str,
        source_mime_type: &str,
        data_url: String,
        thumbnail: String,
    ) -> IntakeResult<bool> {
        if !source_mime_type.starts_with("image/") {
            debug!(file_name, source_mime_type, "Skipping non-image file");
            return Ok(false);
        }
        if self.items.len() >= self.max_items {
            return Err(IntakeError::StagingFull {
                max: self.max_items,
            });
        }

        self.items.push(StagedMedia {
            id: generate_uuid(),
            file_name: file_name.to_string(),
            data_url,
            thumbnail,
            created_at: timestamp_now(),
        });
        Ok(true)
    }

    /// Drop the photo at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<StagedMedia> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn items(&self) -> &[StagedMedia] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Persist every staged photo under `parent_id` and empty the buffer.
    ///
    /// All photos are written in one transaction. On error nothing is saved
    /// and the buffer keeps its items.
    pub fn commit(
        &mut self,
        db: &Database,
        parent_id: &str,
        parent_type: ParentType,
    ) -> DbResult<Vec<MediaItem>> {
        let saved = db.atomically(|db| {
            let mut saved = Vec::with_capacity(self.items.len());
            for staged in &self.items {
                let item = MediaItem {
                    id: staged.id.clone(),
                    parent_id: parent_id.to_string(),
                    parent_type,
                    file_name: staged.file_name.clone(),
                    mime_type: MEDIA_MIME_TYPE.to_string(),
                    data_url: staged.data_url.clone(),
                    thumbnail: staged.thumbnail.clone(),
                    memo: String::new(),
                    created_at: staged.created_at.clone(),
                    extra: Default::default(),
                };
                db.insert_media(&item)?;
                saved.push(item);
            }
            Ok(saved)
        })?;
        self.items.clear();
        Ok(saved)
    }
}

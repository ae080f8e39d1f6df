//! Media database operations.

use super::{Collection, Database, DbResult, Document};
use crate::models::{MediaItem, ParentType};

impl Document for MediaItem {
    const COLLECTION: Collection = Collection::Media;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Database {
    /// Insert a media item.
    pub fn insert_media(&self, item: &MediaItem) -> DbResult<()> {
        self.add(item)
    }

    pub fn get_media(&self, id: &str) -> DbResult<Option<MediaItem>> {
        self.get(id)
    }

    /// Delete a single media item.
    pub fn delete_media(&self, id: &str) -> DbResult<bool> {
        self.delete(Collection::Media, id)
    }

    /// Media owned by a customer or record, insertion order.
    pub fn list_media_for_parent(&self, parent_id: &str) -> DbResult<Vec<MediaItem>> {
        self.get_by_index("parentId", parent_id)
    }

    pub fn list_media_by_type(&self, parent_type: ParentType) -> DbResult<Vec<MediaItem>> {
        self.get_by_index("parentType", parent_type.as_str())
    }

    /// The customer photo with the earliest `createdAt`; ties go to the first inserted.
    pub fn representative_photo(&self, customer_id: &str) -> DbResult<Option<MediaItem>> {
        let photos = self.list_media_for_parent(customer_id)?;
        // min_by keeps the first of equal elements
        Ok(photos
            .into_iter()
            .filter(|m| m.parent_type == ParentType::Customer)
            .min_by(|a, b| a.created_at.cmp(&b.created_at)))
    }
}

//! Treatment record database operations.

use tracing::info;

use super::{Collection, Database, DbError, DbResult, Document};
use crate::models::TreatmentRecord;

impl Document for TreatmentRecord {
    const COLLECTION: Collection = Collection::TreatmentRecords;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Database {
    /// Insert a new treatment record.
    pub fn insert_record(&self, record: &TreatmentRecord) -> DbResult<()> {
        self.add(record)
    }

    /// Replace an existing record by id.
    pub fn update_record(&self, record: &TreatmentRecord) -> DbResult<()> {
        if !self.contains(Collection::TreatmentRecords, &record.id)? {
            return Err(DbError::NotFound(record.id.clone()));
        }
        self.put(record)
    }

    /// Get a record by id.
    pub fn get_record(&self, id: &str) -> DbResult<Option<TreatmentRecord>> {
        self.get(id)
    }

    /// Records of one customer, insertion order.
    pub fn list_records_for_customer(&self, customer_id: &str) -> DbResult<Vec<TreatmentRecord>> {
        self.get_by_index("customerId", customer_id)
    }

    /// Delete a record and its media. Returns false if it did not exist.
    pub fn delete_record_cascade(&self, record_id: &str) -> DbResult<bool> {
        let existed = self.atomically(|db| db.remove_record_tree(record_id))?;
        if existed {
            info!(record_id, "Deleted treatment record with cascade");
        }
        Ok(existed)
    }

    /// Media first, then the record. Runs inside the caller's transaction.
    pub(crate) fn remove_record_tree(&self, record_id: &str) -> DbResult<bool> {
        self.remove_media_of(record_id)?;
        self.delete(Collection::TreatmentRecords, record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaItem, ParentType};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_records_for_customer() {
        let db = setup_db();
        let first = TreatmentRecord::new("c1".into());
        let other = TreatmentRecord::new("c2".into());
        let second = TreatmentRecord::new("c1".into());
        for r in [&first, &other, &second] {
            db.insert_record(r).unwrap();
        }

        let ids: Vec<_> = db
            .list_records_for_customer("c1")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn test_orphan_record_allowed() {
        let db = setup_db();
        let record = TreatmentRecord::new("no-such-customer".into());
        db.insert_record(&record).unwrap();
        assert!(db.get_record(&record.id).unwrap().is_some());
    }

    #[test]
    fn test_update_record() {
        let db = setup_db();
        let mut record = TreatmentRecord::new("c1".into());
        db.insert_record(&record).unwrap();

        record.after_notes = Some("Drink water".into());
        db.update_record(&record).unwrap();
        assert_eq!(db.get_record(&record.id).unwrap().unwrap(), record);

        let missing = TreatmentRecord::new("c1".into());
        assert!(matches!(db.update_record(&missing), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_delete_record_cascade() {
        let db = setup_db();
        let record = TreatmentRecord::new("c1".into());
        db.insert_record(&record).unwrap();
        for i in 0..3 {
            db.insert_media(&MediaItem::new(
                record.id.clone(),
                ParentType::TreatmentRecord,
                format!("{}.jpg", i),
                "data:image/jpeg;base64,AA".into(),
                String::new(),
            ))
            .unwrap();
        }

        assert!(db.delete_record_cascade(&record.id).unwrap());
        assert!(db.get_record(&record.id).unwrap().is_none());
        assert_eq!(db.count(Collection::Media).unwrap(), 0);
        assert!(!db.delete_record_cascade(&record.id).unwrap());
    }
}

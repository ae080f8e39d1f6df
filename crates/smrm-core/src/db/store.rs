//! Collection-generic document store.
//!
//! The adapter knows nothing about customers or records: it maps a key to a
//! JSON document per collection and answers equality lookups on the declared
//! secondary indexes. Results always come back in insertion order.

use std::fmt;

use rusqlite::{ErrorCode, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{Database, DbError, DbResult};

/// The four persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Customers,
    TreatmentRecords,
    Media,
    AppSettings,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Customers,
        Collection::TreatmentRecords,
        Collection::Media,
        Collection::AppSettings,
    ];

    /// Table name, also the collection's public name.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::TreatmentRecords => "treatment_records",
            Collection::Media => "media",
            Collection::AppSettings => "app_settings",
        }
    }

    /// Look a collection up by its public name.
    pub fn from_name(name: &str) -> Option<Collection> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Secondary indexes as (index name, JSON path). Paths must match schema.rs.
    pub fn indexes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Collection::Customers => &[
                ("name", "$.name"),
                ("nameKana", "$.nameKana"),
                ("customerCode", "$.customerCode"),
            ],
            Collection::TreatmentRecords => &[
                ("customerId", "$.customerId"),
                ("visitedAt", "$.visitedAt"),
            ],
            Collection::Media => &[("parentId", "$.parentId"), ("parentType", "$.parentType")],
            Collection::AppSettings => &[],
        }
    }

    fn index_path(&self, index: &str) -> DbResult<&'static str> {
        self.indexes()
            .iter()
            .find(|(name, _)| *name == index)
            .map(|(_, path)| *path)
            .ok_or_else(|| DbError::UnknownIndex {
                collection: self.name(),
                index: index.to_string(),
            })
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value stored in a collection under its own key.
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    /// Primary key.
    fn key(&self) -> &str;
}

impl Database {
    /// Insert a new document; fails with `DuplicateKey` if the key exists.
    pub fn add<T: Document>(&self, doc: &T) -> DbResult<()> {
        let json = serde_json::to_string(doc)?;
        self.insert_json(T::COLLECTION, doc.key(), &json)
    }

    /// Insert a JSON document as given, unknown fields included.
    pub fn add_raw(&self, collection: Collection, key: &str, doc: &Value) -> DbResult<()> {
        let json = serde_json::to_string(doc)?;
        self.insert_json(collection, key, &json)
    }

    fn insert_json(&self, collection: Collection, key: &str, json: &str) -> DbResult<()> {
        let table = collection.name();
        let result = self.conn.execute(
            &format!("INSERT INTO {} (id, doc) VALUES (?1, ?2)", table),
            [key, json],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(DbError::DuplicateKey {
                    collection: table,
                    key: key.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or replace a document. Replacing keeps its insertion position.
    pub fn put<T: Document>(&self, doc: &T) -> DbResult<()> {
        let json = serde_json::to_string(doc)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, doc) VALUES (?1, ?2) \
                 ON CONFLICT(id) DO UPDATE SET doc = excluded.doc",
                T::COLLECTION.name()
            ),
            [doc.key(), json.as_str()],
        )?;
        Ok(())
    }

    /// Get a document by key; `None` when absent.
    pub fn get<T: Document>(&self, key: &str) -> DbResult<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT doc FROM {} WHERE id = ?", T::COLLECTION.name()),
                [key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    /// All documents of a collection.
    pub fn get_all<T: Document>(&self) -> DbResult<Vec<T>> {
        let sql = format!("SELECT doc FROM {} ORDER BY seq", T::COLLECTION.name());
        self.query_docs(&sql, [])
    }

    /// All documents whose indexed field equals `value`.
    pub fn get_by_index<T: Document>(&self, index: &str, value: &str) -> DbResult<Vec<T>> {
        let collection = T::COLLECTION;
        let path = collection.index_path(index)?;
        // Literal path so the planner can match the expression index
        let sql = format!(
            "SELECT doc FROM {} WHERE json_extract(doc, '{}') = ?1 ORDER BY seq",
            collection.name(),
            path
        );
        self.query_docs(&sql, [value])
    }

    /// Keys of the documents whose indexed field equals `value`, in insertion
    /// order. Works on documents that no longer decode into their model.
    pub fn keys_by_index(
        &self,
        collection: Collection,
        index: &str,
        value: &str,
    ) -> DbResult<Vec<String>> {
        let path = collection.index_path(index)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {} WHERE json_extract(doc, '{}') = ?1 ORDER BY seq",
            collection.name(),
            path
        ))?;
        let keys = stmt
            .query_map([value], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: Collection) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", collection.name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Whether a key exists.
    pub fn contains(&self, collection: Collection, key: &str) -> DbResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?", collection.name()),
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Delete a document; returns whether it existed.
    pub fn delete(&self, collection: Collection, key: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?", collection.name()),
            [key],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete every document of a collection.
    pub fn clear(&self, collection: Collection) -> DbResult<()> {
        self.conn
            .execute(&format!("DELETE FROM {}", collection.name()), [])?;
        Ok(())
    }

    fn query_docs<T: DeserializeOwned, P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> DbResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;

        // One unreadable document must not hide the rest of the collection
        let mut docs = Vec::new();
        for row in rows {
            match serde_json::from_str(&row?) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!(error = %e, "Skipping unreadable document"),
            }
        }
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Note {
        id: String,
        customer_id: String,
        visited_at: String,
    }

    impl Document for Note {
        const COLLECTION: Collection = Collection::TreatmentRecords;

        fn key(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, customer: &str) -> Note {
        Note {
            id: id.into(),
            customer_id: customer.into(),
            visited_at: "2025-01-01T00:00:00.000Z".into(),
        }
    }

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let db = setup_db();
        db.add(&note("n1", "c1")).unwrap();

        let loaded: Note = db.get("n1").unwrap().unwrap();
        assert_eq!(loaded, note("n1", "c1"));
        assert!(db.get::<Note>("missing").unwrap().is_none());
    }

    #[test]
    fn test_add_duplicate_key() {
        let db = setup_db();
        db.add(&note("n1", "c1")).unwrap();

        let err = db.add(&note("n1", "c2")).unwrap_err();
        assert!(matches!(
            err,
            DbError::DuplicateKey { collection: "treatment_records", ref key } if key == "n1"
        ));
        // Original is untouched
        assert_eq!(db.get::<Note>("n1").unwrap().unwrap().customer_id, "c1");
    }

    #[test]
    fn test_add_raw_keeps_unknown_fields() {
        let db = setup_db();
        let doc = serde_json::json!({
            "id": "n1",
            "customerId": "c1",
            "visitedAt": "2025-01-01T00:00:00.000Z",
            "lineId": "kept"
        });
        db.add_raw(Collection::TreatmentRecords, "n1", &doc).unwrap();

        let stored: String = db
            .conn()
            .query_row(
                "SELECT doc FROM treatment_records WHERE id = 'n1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        let stored: Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, doc);

        let err = db
            .add_raw(Collection::TreatmentRecords, "n1", &doc)
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateKey { .. }));
    }

    #[test]
    fn test_unreadable_document_does_not_hide_others() {
        let db = setup_db();
        db.add(&note("n1", "c1")).unwrap();
        db.add_raw(
            Collection::TreatmentRecords,
            "n2",
            &serde_json::json!({"id": "n2", "customerId": 7}),
        )
        .unwrap();
        db.add(&note("n3", "c1")).unwrap();

        let all: Vec<Note> = db.get_all().unwrap();
        let ids: Vec<_> = all.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n3"]);
        assert_eq!(db.count(Collection::TreatmentRecords).unwrap(), 3);

        let keys = db
            .keys_by_index(Collection::TreatmentRecords, "customerId", "c1")
            .unwrap();
        assert_eq!(keys, vec!["n1", "n3"]);
    }

    #[test]
    fn test_put_upserts_in_place() {
        let db = setup_db();
        db.add(&note("n1", "c1")).unwrap();
        db.add(&note("n2", "c1")).unwrap();

        db.put(&note("n1", "c9")).unwrap();
        db.put(&note("n3", "c1")).unwrap();

        let all: Vec<Note> = db.get_all().unwrap();
        let ids: Vec<_> = all.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2", "n3"]);
        assert_eq!(all[0].customer_id, "c9");
    }

    #[test]
    fn test_get_by_index_insertion_order() {
        let db = setup_db();
        db.add(&note("n2", "c1")).unwrap();
        db.add(&note("n1", "c2")).unwrap();
        db.add(&note("n3", "c1")).unwrap();

        let found: Vec<Note> = db.get_by_index("customerId", "c1").unwrap();
        let ids: Vec<_> = found.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n2", "n3"]);

        let none: Vec<Note> = db.get_by_index("customerId", "c404").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_unknown_index() {
        let db = setup_db();
        let result = db.get_by_index::<Note>("parentId", "x");
        assert!(matches!(result, Err(DbError::UnknownIndex { .. })));
    }

    #[test]
    fn test_delete_and_clear() {
        let db = setup_db();
        db.add(&note("n1", "c1")).unwrap();
        db.add(&note("n2", "c1")).unwrap();

        assert!(db.delete(Collection::TreatmentRecords, "n1").unwrap());
        assert!(!db.delete(Collection::TreatmentRecords, "n1").unwrap());
        assert!(!db.contains(Collection::TreatmentRecords, "n1").unwrap());
        assert_eq!(db.count(Collection::TreatmentRecords).unwrap(), 1);

        db.clear(Collection::TreatmentRecords).unwrap();
        assert_eq!(db.count(Collection::TreatmentRecords).unwrap(), 0);
    }

    #[test]
    fn test_index_paths_match_schema() {
        let db = setup_db();
        for collection in Collection::ALL {
            for (_, path) in collection.indexes() {
                let sql: Option<String> = db
                    .conn()
                    .query_row(
                        "SELECT sql FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 \
                         AND sql LIKE '%' || ?2 || '%'",
                        [collection.name(), path],
                        |row| row.get(0),
                    )
                    .optional()
                    .unwrap();
                assert!(sql.is_some(), "no index for {} {}", collection, path);
            }
        }
    }
}

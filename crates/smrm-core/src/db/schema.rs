//! SQLite schema definition.
//!
//! Each collection is a document table: one JSON document per row keyed by its
//! `id`, with `seq` recording insertion order. Secondary indexes are expression
//! indexes over JSON paths, so lookups must use the exact same expression.

/// Complete database schema for the SMRM store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Customers
-- ============================================================================

CREATE TABLE IF NOT EXISTS customers (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    doc TEXT NOT NULL CHECK (json_valid(doc))
);

CREATE INDEX IF NOT EXISTS idx_customers_name ON customers(json_extract(doc, '$.name'));
CREATE INDEX IF NOT EXISTS idx_customers_name_kana ON customers(json_extract(doc, '$.nameKana'));
CREATE INDEX IF NOT EXISTS idx_customers_code ON customers(json_extract(doc, '$.customerCode'));

-- ============================================================================
-- Treatment Records
-- ============================================================================

CREATE TABLE IF NOT EXISTS treatment_records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    doc TEXT NOT NULL CHECK (json_valid(doc))
);

CREATE INDEX IF NOT EXISTS idx_records_customer ON treatment_records(json_extract(doc, '$.customerId'));
CREATE INDEX IF NOT EXISTS idx_records_visited_at ON treatment_records(json_extract(doc, '$.visitedAt'));

-- ============================================================================
-- Media
-- ============================================================================

CREATE TABLE IF NOT EXISTS media (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    doc TEXT NOT NULL CHECK (json_valid(doc))
);

CREATE INDEX IF NOT EXISTS idx_media_parent ON media(json_extract(doc, '$.parentId'));
CREATE INDEX IF NOT EXISTS idx_media_parent_type ON media(json_extract(doc, '$.parentType'));

-- ============================================================================
-- App Settings (singletons keyed by fixed name)
-- ============================================================================

CREATE TABLE IF NOT EXISTS app_settings (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    doc TEXT NOT NULL CHECK (json_valid(doc))
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_rejects_invalid_json() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO customers (id, doc) VALUES ('c1', 'not json')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expression_index_used() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let plan: Vec<String> = conn
            .prepare(
                "EXPLAIN QUERY PLAN SELECT doc FROM treatment_records \
                 WHERE json_extract(doc, '$.customerId') = 'c1'",
            )
            .unwrap()
            .query_map([], |row| row.get::<_, String>(3))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(plan.iter().any(|detail| detail.contains("idx_records_customer")));
    }
}

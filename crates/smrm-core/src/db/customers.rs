//! Customer database operations.

use std::cmp::Ordering;

use tracing::info;

use super::{Collection, Database, DbError, DbResult, Document};
use crate::models::Customer;

impl Document for Customer {
    const COLLECTION: Collection = Collection::Customers;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Database {
    /// Insert a new customer.
    pub fn insert_customer(&self, customer: &Customer) -> DbResult<()> {
        self.add(customer)
    }

    /// Replace an existing customer by id.
    pub fn update_customer(&self, customer: &Customer) -> DbResult<()> {
        if !self.contains(Collection::Customers, &customer.id)? {
            return Err(DbError::NotFound(customer.id.clone()));
        }
        self.put(customer)
    }

    /// Get a customer by id.
    pub fn get_customer(&self, id: &str) -> DbResult<Option<Customer>> {
        self.get(id)
    }

    /// All customers ordered by customer code; customers without a code last.
    pub fn list_customers(&self) -> DbResult<Vec<Customer>> {
        let mut customers: Vec<Customer> = self.get_all()?;
        customers.sort_by(|a, b| compare_codes(a, b));
        Ok(customers)
    }

    /// Every assigned customer code, in insertion order.
    pub fn customer_codes(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT json_extract(doc, '$.customerCode') FROM customers \
             WHERE json_extract(doc, '$.customerCode') IS NOT NULL ORDER BY seq",
        )?;
        let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(codes)
    }

    /// Case-insensitive substring search over name, kana and code.
    ///
    /// A blank query returns the full list.
    pub fn search_customers(&self, query: &str) -> DbResult<Vec<Customer>> {
        let needle = query.trim().to_lowercase();
        let customers = self.list_customers()?;
        if needle.is_empty() {
            return Ok(customers);
        }

        Ok(customers
            .into_iter()
            .filter(|c| {
                [Some(c.name.as_str()), c.name_kana.as_deref(), c.customer_code.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// Delete a customer with all of its records and media.
    ///
    /// Returns false if the customer did not exist.
    pub fn delete_customer_cascade(&self, customer_id: &str) -> DbResult<bool> {
        let (existed, records) = self.atomically(|db| {
            let records =
                db.keys_by_index(Collection::TreatmentRecords, "customerId", customer_id)?;
            for record_id in &records {
                db.remove_record_tree(record_id)?;
            }
            db.remove_media_of(customer_id)?;
            let existed = db.delete(Collection::Customers, customer_id)?;
            Ok((existed, records.len()))
        })?;

        if existed {
            info!(customer_id, records, "Deleted customer with cascade");
        }
        Ok(existed)
    }

    /// Delete all media owned by `parent_id`. Runs inside the caller's transaction.
    pub(crate) fn remove_media_of(&self, parent_id: &str) -> DbResult<usize> {
        let media = self.keys_by_index(Collection::Media, "parentId", parent_id)?;
        for media_id in &media {
            self.delete(Collection::Media, media_id)?;
        }
        Ok(media.len())
    }
}

/// A missing code compares as the empty string, so uncoded customers come first.
fn compare_codes(a: &Customer, b: &Customer) -> Ordering {
    let a = a.customer_code.as_deref().unwrap_or("");
    let b = b.customer_code.as_deref().unwrap_or("");
    a.cmp(b)
}

//! Read-side views: per-customer timeline, recent visits and customer cards.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{Database, DbResult};
use crate::models::{Customer, MediaItem, TreatmentRecord};
use crate::util::{month_label, parse_local_datetime, INVALID_DATE};

/// Visits shown on the recording screen.
pub const RECENT_VISITS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Newest first
    #[default]
    Desc,
    Asc,
}

/// One visit with its photos.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub record: TreatmentRecord,
    pub media: Vec<MediaItem>,
    /// `YYYY-MM` of the visit, `---` when unparseable
    pub month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    /// The page actually served, after clamping
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
}

/// Summary shown on a customer list card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCard {
    pub customer: Customer,
    pub age: Option<i32>,
    pub has_allergies: bool,
    pub photo_thumbnail: Option<String>,
}

pub struct History<'a> {
    db: &'a Database,
}

impl<'a> History<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// One page of a customer's visits. Out-of-range pages are clamped.
    pub fn page(
        &self,
        customer_id: &str,
        direction: SortDirection,
        page: usize,
        page_size: usize,
    ) -> DbResult<HistoryPage> {
        let records = self.sorted_records(customer_id, direction)?;
        let page_size = page_size.max(1);
        let total_records = records.len();
        let total_pages = total_records.div_ceil(page_size);
        let page = page.clamp(1, total_pages.max(1));

        let entries = records
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(|record| self.entry(record))
            .collect::<DbResult<Vec<_>>>()?;

        Ok(HistoryPage {
            entries,
            page,
            total_pages,
            total_records,
        })
    }

    /// The latest visits, newest first.
    pub fn recent(&self, customer_id: &str, limit: usize) -> DbResult<Vec<HistoryEntry>> {
        self.sorted_records(customer_id, SortDirection::Desc)?
            .into_iter()
            .take(limit)
            .map(|record| self.entry(record))
            .collect()
    }

    /// After-visit notes of the latest visit, if it has any.
    pub fn previous_after_notes(&self, customer_id: &str) -> DbResult<Option<String>> {
        Ok(self
            .sorted_records(customer_id, SortDirection::Desc)?
            .into_iter()
            .next()
            .and_then(|record| record.after_notes)
            .filter(|notes| !notes.is_empty()))
    }

    /// Card for one customer as of `today`.
    pub fn customer_card(&self, customer_id: &str, today: NaiveDate) -> DbResult<Option<CustomerCard>> {
        match self.db.get_customer(customer_id)? {
            Some(customer) => self.card(customer, today).map(Some),
            None => Ok(None),
        }
    }

    /// Cards for every customer matching `query`, in code order.
    pub fn customer_cards(&self, query: &str, today: NaiveDate) -> DbResult<Vec<CustomerCard>> {
        self.db
            .search_customers(query)?
            .into_iter()
            .map(|customer| self.card(customer, today))
            .collect()
    }

    fn card(&self, customer: Customer, today: NaiveDate) -> DbResult<CustomerCard> {
        let photo_thumbnail = self
            .db
            .representative_photo(&customer.id)?
            .map(|photo| photo.thumbnail);
        Ok(CustomerCard {
            age: customer.age_on(today),
            has_allergies: customer.has_allergies(),
            photo_thumbnail,
            customer,
        })
    }

    fn entry(&self, record: TreatmentRecord) -> DbResult<HistoryEntry> {
        let media = self.db.list_media_for_parent(&record.id)?;
        let month = month_label(&record.visited_at).unwrap_or_else(|| INVALID_DATE.to_string());
        Ok(HistoryEntry {
            record,
            media,
            month,
        })
    }

    fn sorted_records(
        &self,
        customer_id: &str,
        direction: SortDirection,
    ) -> DbResult<Vec<TreatmentRecord>> {
        let mut records = self.db.list_records_for_customer(customer_id)?;
        // Stable sort: equal visit times keep insertion order either way
        records.sort_by(|a, b| {
            let ordering = compare_visits(a, b);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        Ok(records)
    }
}

fn compare_visits(a: &TreatmentRecord, b: &TreatmentRecord) -> Ordering {
    parse_local_datetime(&a.visited_at).cmp(&parse_local_datetime(&b.visited_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParentType;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_visit(db: &Database, customer_id: &str, visited_at: &str, notes: Option<&str>) -> TreatmentRecord {
        let mut record = TreatmentRecord::new(customer_id.into());
        record.visited_at = visited_at.into();
        record.after_notes = notes.map(String::from);
        db.insert_record(&record).unwrap();
        record
    }

    fn day(n: u32) -> String {
        format!("2025-01-{:02}T12:00:00.000Z", n)
    }

    #[test]
    fn test_pagination_and_clamping() {
        let db = setup_db();
        for n in 1..=25 {
            add_visit(&db, "c1", &day(n), None);
        }
        let history = History::new(&db);

        let first = history.page("c1", SortDirection::Desc, 1, 20).unwrap();
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.total_records, 25);
        assert_eq!(first.entries.len(), 20);
        assert_eq!(first.entries[0].record.visited_at, day(25));

        let last = history.page("c1", SortDirection::Desc, 9, 20).unwrap();
        assert_eq!(last.page, 2);
        assert_eq!(last.entries.len(), 5);
        assert_eq!(last.entries[4].record.visited_at, day(1));

        let asc = history.page("c1", SortDirection::Asc, 0, 20).unwrap();
        assert_eq!(asc.page, 1);
        assert_eq!(asc.entries[0].record.visited_at, day(1));
        assert_eq!(asc.entries[0].month, "2025-01");
    }

    #[test]
    fn test_empty_history() {
        let db = setup_db();
        let page = History::new(&db).page("c1", SortDirection::Desc, 3, 20).unwrap();
        assert!(page.entries.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_entries_carry_media() {
        let db = setup_db();
        let record = add_visit(&db, "c1", &day(1), None);
        db.insert_media(&MediaItem::new(
            record.id.clone(),
            ParentType::TreatmentRecord,
            "a.jpg".into(),
            "data:image/jpeg;base64,AA".into(),
            String::new(),
        ))
        .unwrap();

        let page = History::new(&db).page("c1", SortDirection::Desc, 1, 20).unwrap();
        assert_eq!(page.entries[0].media.len(), 1);
    }

    #[test]
    fn test_recent_and_previous_notes() {
        let db = setup_db();
        add_visit(&db, "c1", &day(3), Some("Drink water"));
        add_visit(&db, "c1", &day(1), Some("Old note"));
        add_visit(&db, "c1", &day(2), None);
        add_visit(&db, "c1", &day(4), Some("Latest"));
        let history = History::new(&db);

        let recent = history.recent("c1", RECENT_VISITS).unwrap();
        let days: Vec<_> = recent.iter().map(|e| e.record.visited_at.clone()).collect();
        assert_eq!(days, vec![day(4), day(3), day(2)]);

        assert_eq!(history.previous_after_notes("c1").unwrap().as_deref(), Some("Latest"));
        add_visit(&db, "c1", &day(5), None);
        assert!(history.previous_after_notes("c1").unwrap().is_none());
        assert!(history.previous_after_notes("nobody").unwrap().is_none());
    }

    #[test]
    fn test_customer_card() {
        let db = setup_db();
        let mut customer = Customer::new("Hanako".into());
        customer.birth_date = Some("1990-03-01".into());
        customer.allergies = vec![crate::models::Allergy::new("pollen")];
        db.insert_customer(&customer).unwrap();
        let mut photo = MediaItem::new(
            customer.id.clone(),
            ParentType::Customer,
            "face.jpg".into(),
            "data:image/jpeg;base64,AA".into(),
            "data:image/jpeg;base64,TT".into(),
        );
        photo.created_at = day(1);
        db.insert_media(&photo).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        let history = History::new(&db);
        let card = history.customer_card(&customer.id, today).unwrap().unwrap();
        assert_eq!(card.age, Some(35));
        assert!(card.has_allergies);
        assert_eq!(card.photo_thumbnail.as_deref(), Some("data:image/jpeg;base64,TT"));

        assert!(history.customer_card("missing", today).unwrap().is_none());
        assert_eq!(history.customer_cards("hana", today).unwrap().len(), 1);
    }
}

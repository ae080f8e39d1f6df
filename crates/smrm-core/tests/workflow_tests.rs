//! End-to-end tests of the customer and visit workflow.

use chrono::NaiveDate;
use serde_json::json;
use smrm_core::db::{Collection, Database};
use smrm_core::history::{History, SortDirection};
use smrm_core::intake::{Intake, IntakeError, MediaStaging};
use smrm_core::models::{CustomerInput, MenuInput, ParentType, RecordInput};

fn named(name: &str) -> CustomerInput {
    CustomerInput {
        name: name.into(),
        ..Default::default()
    }
}

fn complaint(text: &str, visited_at: &str) -> RecordInput {
    RecordInput {
        chief_complaint: Some(text.into()),
        visited_at: Some(visited_at.into()),
        ..Default::default()
    }
}

#[test]
fn test_first_customer_gets_c0001_and_cascade_delete() {
    let db = Database::open_in_memory().unwrap();
    let intake = Intake::new(&db);

    let customer = intake.register_customer(&named("テスト太郎")).unwrap();
    assert_eq!(customer.customer_code.as_deref(), Some("C0001"));

    let mut staging = MediaStaging::new(5);
    staging
        .stage("face.jpg", "image/jpeg", "data:image/jpeg;base64,AA".into(), "t".into())
        .unwrap();
    staging
        .commit(&db, &customer.id, ParentType::Customer)
        .unwrap();

    let record = intake
        .record_visit(&customer.id, &complaint("Shoulder pain", "2025-06-01T10:00"))
        .unwrap();
    staging
        .stage("back.png", "image/png", "data:image/jpeg;base64,BB".into(), "t".into())
        .unwrap();
    staging
        .commit(&db, &record.id, ParentType::TreatmentRecord)
        .unwrap();

    let other = intake.register_customer(&named("Other")).unwrap();
    assert_eq!(other.customer_code.as_deref(), Some("C0002"));
    intake
        .record_visit(&other.id, &complaint("Headache", "2025-06-02T10:00"))
        .unwrap();

    assert!(db.delete_customer_cascade(&customer.id).unwrap());

    assert!(db.get_customer(&customer.id).unwrap().is_none());
    assert!(db.get_record(&record.id).unwrap().is_none());
    assert!(db.list_media_for_parent(&customer.id).unwrap().is_empty());
    assert!(db.list_media_for_parent(&record.id).unwrap().is_empty());

    // The other customer is untouched
    assert_eq!(db.count(Collection::Customers).unwrap(), 1);
    assert_eq!(db.count(Collection::TreatmentRecords).unwrap(), 1);
    assert_eq!(db.count(Collection::Media).unwrap(), 0);
}

#[test]
fn test_rejected_input_writes_nothing() {
    let db = Database::open_in_memory().unwrap();
    let intake = Intake::new(&db);

    let bad = CustomerInput {
        phone: Some("12ab".into()),
        ..named("")
    };
    match intake.register_customer(&bad) {
        Err(IntakeError::Validation(e)) => assert_eq!(e.errors.len(), 2),
        other => panic!("expected validation error, got {:?}", other),
    }

    let customer = intake.register_customer(&named("Hanako")).unwrap();
    let empty_visit = RecordInput {
        body_condition: serde_json::from_value(json!({"painLevel": "abc"})).unwrap(),
        ..Default::default()
    };
    assert!(matches!(
        intake.record_visit(&customer.id, &empty_visit),
        Err(IntakeError::Validation(_))
    ));
    assert!(matches!(
        intake.record_visit("missing", &complaint("Neck", "2025-06-01T10:00")),
        Err(IntakeError::NotFound(_))
    ));

    assert_eq!(db.count(Collection::Customers).unwrap(), 1);
    assert_eq!(db.count(Collection::TreatmentRecords).unwrap(), 0);
}

#[test]
fn test_visits_use_catalog_menu_and_show_in_history() {
    let db = Database::open_in_memory().unwrap();
    let intake = Intake::new(&db);

    let menus = intake
        .save_menu_catalog(&[
            MenuInput {
                id: None,
                name: "Body care 60".into(),
                default_duration: Some(json!(60)),
            },
            MenuInput {
                id: None,
                name: "Head spa".into(),
                default_duration: Some(json!("30")),
            },
        ])
        .unwrap();
    assert_eq!(db.list_treatment_menus(), menus);

    let customer = intake.register_customer(&named("Hanako")).unwrap();
    for day in 1..=4 {
        let mut input = complaint("Tired", &format!("2025-03-0{}T09:30", day));
        input.treatment_menu_id = Some(menus[1].id.clone());
        input.duration = Some(json!(30));
        input.after_notes = Some(format!("Note {}", day));
        intake.record_visit(&customer.id, &input).unwrap();
    }

    let history = History::new(&db);
    let page = history.page(&customer.id, SortDirection::Desc, 1, 3).unwrap();
    assert_eq!(page.total_records, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.entries.len(), 3);
    assert_eq!(page.entries[0].record.treatment_menu.as_deref(), Some("Head spa"));
    assert_eq!(page.entries[0].record.duration, Some(30));
    assert_eq!(page.entries[0].month, "2025-03");

    assert_eq!(
        history.previous_after_notes(&customer.id).unwrap().as_deref(),
        Some("Note 4")
    );

    let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let cards = history.customer_cards("HANA", today).unwrap();
    assert_eq!(cards.len(), 1);
    assert!(!cards[0].has_allergies);
    assert!(cards[0].photo_thumbnail.is_none());
}

#[test]
fn test_delete_all_data() {
    let db = Database::open_in_memory().unwrap();
    let intake = Intake::new(&db);
    let customer = intake.register_customer(&named("Hanako")).unwrap();
    intake
        .record_visit(&customer.id, &complaint("Neck", "2025-06-01T10:00"))
        .unwrap();

    db.delete_all_data().unwrap();

    for collection in Collection::ALL {
        assert_eq!(db.count(collection).unwrap(), 0);
    }
    // Codes start over once the store is empty
    let again = intake.register_customer(&named("Hanako")).unwrap();
    assert_eq!(again.customer_code.as_deref(), Some("C0001"));
}

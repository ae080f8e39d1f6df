//! Structural check of an import bundle.

use serde::Serialize;
use serde_json::Value;

/// First structural defect of a bundle, if any.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportCheck {
    pub valid: bool,
    pub error: Option<String>,
}

impl ImportCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn fail(message: &str) -> Self {
        Self {
            valid: false,
            error: Some(message.to_string()),
        }
    }
}

/// Accept only `smrm` bundles with array-shaped collections.
pub fn validate_import_data(data: &Value) -> ImportCheck {
    let Some(object) = data.as_object() else {
        return ImportCheck::fail("Not a JSON object");
    };
    if object.get("appName").and_then(Value::as_str) != Some(crate::APP_NAME) {
        return ImportCheck::fail("This file is not an smrm export");
    }
    if !object.get("customers").map_or(false, Value::is_array) {
        return ImportCheck::fail("The customers field is invalid");
    }
    if !object.get("treatmentRecords").map_or(false, Value::is_array) {
        return ImportCheck::fail("The treatmentRecords field is invalid");
    }
    if let Some(menus) = object.get("treatmentMenus") {
        if !menus.is_array() {
            return ImportCheck::fail("The treatmentMenus field is invalid");
        }
    }
    ImportCheck::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({"appName": "smrm", "customers": [], "treatmentRecords": []})
    }

    #[test]
    fn test_accepts_minimal_bundle() {
        assert_eq!(validate_import_data(&minimal()), ImportCheck::ok());
    }

    #[test]
    fn test_rejects_non_object() {
        for data in [json!(null), json!([]), json!("smrm"), json!(3)] {
            let check = validate_import_data(&data);
            assert!(!check.valid);
            assert_eq!(check.error.as_deref(), Some("Not a JSON object"));
        }
    }

    #[test]
    fn test_rejects_wrong_app() {
        let mut data = minimal();
        data["appName"] = json!("other");
        assert_eq!(
            validate_import_data(&data).error.as_deref(),
            Some("This file is not an smrm export")
        );
    }

    #[test]
    fn test_checks_run_in_order() {
        let data = json!({"appName": "smrm", "customers": {}, "treatmentRecords": 1});
        assert_eq!(
            validate_import_data(&data).error.as_deref(),
            Some("The customers field is invalid")
        );

        let data = json!({"appName": "smrm", "customers": []});
        assert_eq!(
            validate_import_data(&data).error.as_deref(),
            Some("The treatmentRecords field is invalid")
        );
    }

    #[test]
    fn test_treatment_menus_optional_but_array() {
        let mut data = minimal();
        data["treatmentMenus"] = json!([]);
        assert!(validate_import_data(&data).valid);

        data["treatmentMenus"] = json!("menus");
        assert!(!validate_import_data(&data).valid);
    }
}

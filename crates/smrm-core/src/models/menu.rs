//! Treatment menu catalog models.

use serde::{Deserialize, Serialize};

/// One entry of the treatment menu catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TreatmentMenu {
    /// Menu ID; empty when an imported entry carried none
    pub id: String,
    /// Display name, unique within the catalog
    pub name: String,
    /// Default duration in minutes
    pub default_duration: Option<u32>,
    /// Display order; old data may lack it
    pub sort_order: Option<i64>,
}

impl TreatmentMenu {
    /// Create a new menu entry with a fresh ID.
    pub fn new(name: String, default_duration: Option<u32>, sort_order: i64) -> Self {
        Self {
            id: crate::util::generate_uuid(),
            name,
            default_duration,
            sort_order: Some(sort_order),
        }
    }

    /// Sort key used for display (missing orders sort as 0).
    pub fn display_order(&self) -> i64 {
        self.sort_order.unwrap_or(0)
    }
}

/// Sort a catalog into display order. Stable, so equal orders keep stored order.
pub fn sort_catalog(menus: &mut [TreatmentMenu]) {
    menus.sort_by_key(TreatmentMenu::display_order);
}

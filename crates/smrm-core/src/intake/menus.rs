//! Menu catalog editing.

use std::collections::HashSet;

use super::{clean, Intake, IntakeResult};
use crate::models::{MenuInput, TreatmentMenu};
use crate::util::generate_uuid;
use crate::validation::{loose_integer_in, validate_treatment_menu, Validation, MAX_MENU_DURATION};

impl Intake<'_> {
    /// Replace the catalog with the editor rows.
    ///
    /// Rows with a blank name are dropped; the rest are numbered from 0 in the
    /// order given.
    pub fn save_menu_catalog(&self, rows: &[MenuInput]) -> IntakeResult<Vec<TreatmentMenu>> {
        let rows: Vec<&MenuInput> = rows.iter().filter(|r| !r.name.trim().is_empty()).collect();

        let mut seen = HashSet::new();
        let mut check = Validation::from_errors(Vec::new());
        for row in &rows {
            check = check.and(validate_treatment_menu(row));
            let name = row.name.trim();
            if !seen.insert(name) {
                check = check.and(Validation::from_errors(vec![format!(
                    "Menu name is duplicated: {}",
                    name
                )]));
            }
        }
        check.into_result()?;

        let menus: Vec<TreatmentMenu> = rows
            .into_iter()
            .enumerate()
            .map(|(order, row)| TreatmentMenu {
                id: clean(&row.id).unwrap_or_else(generate_uuid),
                name: row.name.trim().to_string(),
                default_duration: loose_integer_in(
                    row.default_duration.as_ref(),
                    1,
                    MAX_MENU_DURATION,
                )
                .map(|d| d as u32),
                sort_order: Some(order as i64),
            })
            .collect();

        self.db.save_treatment_menus(&menus)?;
        Ok(menus)
    }
}

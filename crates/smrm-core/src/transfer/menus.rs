//! Name-keyed menu catalog merge.

use std::collections::HashSet;

use crate::models::TreatmentMenu;
use crate::util::generate_uuid;

/// Sort order one past the highest in `menus`; missing orders count as -1.
pub fn next_sort_order(menus: &[TreatmentMenu]) -> i64 {
    menus
        .iter()
        .map(|m| m.sort_order.unwrap_or(-1))
        .max()
        .unwrap_or(-1)
        + 1
}

/// Append imported menus whose names are not yet in the catalog.
///
/// Existing entries are kept as they are, ids included. New entries keep their
/// own id (or get a fresh one) and are numbered after the current maximum.
/// Neither input is modified.
pub fn merge_menus_by_name(
    existing: &[TreatmentMenu],
    imported: &[TreatmentMenu],
) -> Vec<TreatmentMenu> {
    let mut merged = existing.to_vec();
    let mut names: HashSet<String> = merged.iter().map(|m| m.name.clone()).collect();
    let mut sort_order = next_sort_order(&merged);

    for menu in imported {
        if names.contains(&menu.name) {
            continue;
        }
        names.insert(menu.name.clone());
        merged.push(TreatmentMenu {
            id: if menu.id.is_empty() {
                generate_uuid()
            } else {
                menu.id.clone()
            },
            name: menu.name.clone(),
            default_duration: menu.default_duration,
            sort_order: Some(sort_order),
        });
        sort_order += 1;
    }

    merged
}

//! Shipping precedence resolution.
//!
//! The shipping result set is a raw union of three source tables tagged
//! "TSC", "TSCH" and "TSCSR". The same waybill can appear in more than one
//! of them; exactly one row may survive per waybill. Precedence is
//! lexicographic on the tag (so "TSC" beats "TSCH" beats "TSCSR") and rows
//! without a waybill are dropped entirely — a null key would never join
//! anyway.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::db::models::ShippingRow;

/// Collapse the unioned shipping rows to one winner per waybill.
///
/// Output preserves first-seen waybill order, which keeps the whole
/// pipeline deterministic for identical inputs.
pub fn resolve_precedence(rows: Vec<ShippingRow>) -> Vec<ShippingRow> {
    let mut winners: HashMap<String, ShippingRow> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for row in rows {
        let Some(waybill) = row.romaneio_atual.clone() else {
            continue;
        };
        match winners.entry(waybill) {
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                slot.insert(row);
            }
            Entry::Occupied(mut slot) => {
                if row.tabela < slot.get().tabela {
                    slot.insert(row);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|waybill| winners.remove(&waybill))
        .collect()
}

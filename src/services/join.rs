//! Join engine: widen the yard rows with reference and shipping data.
//!
//! Two left joins, hash-keyed: yard plate → reference plate, then yard
//! waybill → shipping waybill. Every yard row survives; unmatched columns
//! stay null. Null keys never match anything (standard SQL semantics).
//! Inputs are expected deduplicated — references are DISTINCT at the
//! source, shipping rows go through precedence resolution first — so a
//! first-entry-wins lookup is all that is needed here.

use std::collections::HashMap;

use crate::db::models::{ReferenceRow, ShippingRow, YardRow};
use crate::models::WideRow;

/// Produce the denormalized row set, preserving yard-row order.
pub fn join_rows(
    main: Vec<YardRow>,
    reference: &[ReferenceRow],
    shipping: &[ShippingRow],
) -> Vec<WideRow> {
    let mut ref_by_placa: HashMap<&str, &ReferenceRow> = HashMap::new();
    for r in reference {
        ref_by_placa.entry(r.placa_controle.as_str()).or_insert(r);
    }

    let mut ship_by_waybill: HashMap<&str, &ShippingRow> = HashMap::new();
    for s in shipping {
        if let Some(waybill) = s.romaneio_atual.as_deref() {
            ship_by_waybill.entry(waybill).or_insert(s);
        }
    }

    main.into_iter()
        .map(|row| {
            let referencia = ref_by_placa
                .get(row.placa.as_str())
                .and_then(|r| r.referencia.clone());
            let ship = row
                .num_romaneio
                .as_deref()
                .and_then(|waybill| ship_by_waybill.get(waybill));

            WideRow {
                controle_patio_id: row.controle_patio_id,
                date_insert: row.date_insert,
                data_prevista_entrada: row.data_prevista_entrada,
                data_efetiva_entrada: row.data_efetiva_entrada,
                data_prevista_saida: row.data_prevista_saida,
                data_efetiva_saida: row.data_efetiva_saida,
                situacao_id: row.situacao_id,
                num_romaneio: row.num_romaneio,
                placa: row.placa,
                placa_2: row.placa_2,
                placa_3: row.placa_3,
                motorista: row.motorista,
                referencia,
                negociador: ship.and_then(|s| s.negociador.clone()),
                pais_origem: ship.and_then(|s| s.pais_origem.clone()),
                pais_destino: ship.and_then(|s| s.pais_destino.clone()),
            }
        })
        .collect()
}

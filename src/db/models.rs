//! Row types returned by the data source adapter.
//!
//! These mirror the three result sets of the yard queries, nothing more. Any
//! adapter producing these shapes is a valid data source; the pipeline never
//! looks behind them.

use chrono::NaiveDateTime;

/// One yard-control entry, already joined (at the source) with its equipment
/// code and up to two trailer compositions.
///
/// A trailer column is only populated when the entry's actual-entry
/// timestamp fell inside the coupling's engage/disengage window, with an
/// open-ended disengage treated as "still coupled".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YardRow {
    pub date_insert: Option<NaiveDateTime>,
    pub controle_patio_id: i64,
    pub data_prevista_entrada: Option<NaiveDateTime>,
    /// Raw text; parsed leniently by the view builder.
    pub data_prevista_saida: Option<String>,
    pub data_efetiva_entrada: Option<NaiveDateTime>,
    /// Raw text; parsed leniently by the view builder.
    pub data_efetiva_saida: Option<String>,
    pub situacao_id: i32,
    pub num_romaneio: Option<String>,
    pub equipamento_id: i64,
    pub placa: String,
    pub placa_2: Option<String>,
    pub placa_3: Option<String>,
    pub motorista: Option<String>,
}

/// Plate → active external reference code. The source restricts this set to
/// references with a non-null day field, so every row here is current.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceRow {
    pub placa_controle: String,
    pub referencia: Option<String>,
}

/// Waybill → negotiator and route, tagged with the source table it came
/// from ("TSC", "TSCH" or "TSCSR"). The adapter returns the raw union of the
/// three tables; precedence between duplicate waybills is resolved by
/// [`crate::services::shipping::resolve_precedence`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShippingRow {
    pub shipping_code_id: Option<i64>,
    pub negociador: Option<String>,
    pub pais_origem: Option<String>,
    pub pais_destino: Option<String>,
    pub romaneio_atual: Option<String>,
    pub tabela: String,
}

/// The three result sets of one raw fetch, taken as a unit.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    pub main: Vec<YardRow>,
    pub reference: Vec<ReferenceRow>,
    pub shipping: Vec<ShippingRow>,
}

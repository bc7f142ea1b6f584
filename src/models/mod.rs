//! Core domain types for the yard departure monitor.
//!
//! Everything in here is plain data: the priority ladder, the directional
//! classification, the denormalized row produced by the join engine and the
//! display-ready row consumed by the presentation layer. Display rows
//! serialize with the dashboard column headers as JSON keys; those same keys
//! are the on-disk snapshot format.

pub mod time;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Urgency tier derived from the time remaining until the planned departure.
///
/// The ladder is evaluated against `time_to_exit` in seconds: more than two
/// hours of margin is `Normal`, between 30 minutes and two hours `Atencao`,
/// 30 minutes or less `Urgencia`, already late `Critica`. Rows without a
/// departure forecast are `Baixa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prioridade {
    #[serde(rename = "BAIXA")]
    Baixa,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "ATENÇÃO")]
    Atencao,
    #[serde(rename = "URGÊNCIA")]
    Urgencia,
    #[serde(rename = "CRÍTICA")]
    Critica,
}

impl Prioridade {
    /// Display label, as shown on the dashboard.
    pub fn as_str(&self) -> &'static str {
        match self {
            Prioridade::Baixa => "BAIXA",
            Prioridade::Normal => "NORMAL",
            Prioridade::Atencao => "ATENÇÃO",
            Prioridade::Urgencia => "URGÊNCIA",
            Prioridade::Critica => "CRÍTICA",
        }
    }
}

impl fmt::Display for Prioridade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional classification of a shipment.
///
/// `Nac` when origin and destination country match, `Rn` for inbound trips
/// ending in Brasil, `Rs` for everything else. Unknown when either country
/// is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rumo {
    #[serde(rename = "NAC")]
    Nac,
    #[serde(rename = "RN")]
    Rn,
    #[serde(rename = "RS")]
    Rs,
}

impl Rumo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rumo::Nac => "NAC",
            Rumo::Rn => "RN",
            Rumo::Rs => "RS",
        }
    }
}

impl fmt::Display for Rumo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One denormalized row: a yard-control entry joined with its reference and
/// shipping data. Output of the join engine, input to the view builder.
///
/// The exit timestamps stay as raw text here; parsing them (leniently, per
/// cell) is the view builder's first derivation step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideRow {
    pub controle_patio_id: i64,
    pub date_insert: Option<NaiveDateTime>,
    pub data_prevista_entrada: Option<NaiveDateTime>,
    pub data_efetiva_entrada: Option<NaiveDateTime>,
    pub data_prevista_saida: Option<String>,
    pub data_efetiva_saida: Option<String>,
    pub situacao_id: i32,
    pub num_romaneio: Option<String>,
    pub placa: String,
    pub placa_2: Option<String>,
    pub placa_3: Option<String>,
    pub motorista: Option<String>,
    // Columns from the reference join; null when the plate has no active
    // reference.
    pub referencia: Option<String>,
    // Columns from the shipping join; null when the waybill is unknown.
    pub negociador: Option<String>,
    pub pais_origem: Option<String>,
    pub pais_destino: Option<String>,
}

/// One display-ready row of the dashboard table.
///
/// Field names serialize to the dashboard column headers. All optional
/// source values are already collapsed to empty strings and all dates are
/// pre-rendered; the presentation layer can show this verbatim. The priority
/// tier stays an enum so the frontend can map it to colors without string
/// matching on our side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    #[serde(rename = "CAVALO")]
    pub cavalo: String,
    #[serde(rename = "CARRETA")]
    pub carreta: String,
    #[serde(rename = "2ª CARRETA")]
    pub segunda_carreta: String,
    #[serde(rename = "NEGOCIADOR")]
    pub negociador: String,
    #[serde(rename = "RUMO")]
    pub rumo: String,
    #[serde(rename = "ENTRADA")]
    pub entrada: String,
    #[serde(rename = "TEMPO NO PÁTIO")]
    pub tempo_no_patio: String,
    #[serde(rename = "PREVISÃO SAÍDA")]
    pub previsao_saida: String,
    #[serde(rename = "TEMPO ATÉ SAÍDA")]
    pub tempo_ate_saida: String,
    #[serde(rename = "PRIORIDADE")]
    pub prioridade: Prioridade,
    #[serde(rename = "MOTORISTA")]
    pub motorista: String,
    #[serde(rename = "REFERÊNCIA ATUAL")]
    pub referencia_atual: String,
}

/// Result of one view derivation: the actionable rows in display order plus
/// the distinct-plate count shown in the dashboard banner.
#[derive(Debug, Clone, PartialEq)]
pub struct PatioView {
    pub rows: Vec<DisplayRow>,
    pub qtd_placas: usize,
}

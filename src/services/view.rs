//! View derivation for the yard dashboard.
//!
//! Pure function of the denormalized rows and an injected "now": no clock
//! reads, no I/O, no ambient state. Each row derives independently and a
//! bad cell (unparseable date, missing country) degrades to null for that
//! row only — nothing here can abort a batch.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::models::time;
use crate::models::{DisplayRow, PatioView, Prioridade, Rumo, WideRow};

/// Status codes of yard entries that are awaiting departure.
const ACTIONABLE_STATUS: [i32; 2] = [2, 3];

/// Above this many seconds of margin the departure is just `NORMAL`.
const NORMAL_ABOVE_SECS: i64 = 7200;

/// Between this and [`NORMAL_ABOVE_SECS`] the departure needs attention.
const ATTENTION_ABOVE_SECS: i64 = 1800;

/// Derive the display table from the denormalized rows.
///
/// Applies the actionable filter (no exit yet, status 2 or 3, departure
/// forecast present), projects to the display schema, sorts by the rendered
/// departure forecast (missing keys last) and counts distinct primary
/// plates.
pub fn build_view(rows: &[WideRow], now: DateTime<Tz>) -> PatioView {
    let derived: Vec<DerivedRow<'_>> = rows
        .iter()
        .map(|row| derive_row(row, now))
        .filter(DerivedRow::actionable)
        .collect();

    let qtd_placas = derived
        .iter()
        .map(|d| d.row.placa.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut out: Vec<DisplayRow> = derived.into_iter().map(DerivedRow::into_display).collect();
    out.sort_by(|a, b| compare_display_keys(&a.previsao_saida, &b.previsao_saida));

    PatioView {
        rows: out,
        qtd_placas,
    }
}

/// One row with every computed column, before projection.
struct DerivedRow<'a> {
    row: &'a WideRow,
    saida_prevista: Option<DateTime<Tz>>,
    saida_efetiva: Option<DateTime<Tz>>,
    entrada_efetiva: Option<DateTime<Tz>>,
    tempo_ate_saida: Option<i64>,
    tempo_no_patio: Option<i64>,
    prioridade: Prioridade,
    rumo: Option<Rumo>,
}

fn derive_row<'a>(row: &'a WideRow, now: DateTime<Tz>) -> DerivedRow<'a> {
    let saida_prevista = row
        .data_prevista_saida
        .as_deref()
        .and_then(time::parse_to_business);
    let saida_efetiva = row
        .data_efetiva_saida
        .as_deref()
        .and_then(time::parse_to_business);
    let entrada_efetiva = row.data_efetiva_entrada.and_then(time::localize);

    let tempo_ate_saida = compute_tempo_ate_saida(saida_prevista, saida_efetiva, now);
    let prioridade = classify_prioridade(saida_prevista.is_some(), tempo_ate_saida);

    // Time already spent in the yard only makes sense while the vehicle is
    // still here.
    let tempo_no_patio = if saida_efetiva.is_none() {
        entrada_efetiva.map(|entrada| (now - entrada).num_seconds())
    } else {
        None
    };

    let rumo = classify_rumo(row.pais_origem.as_deref(), row.pais_destino.as_deref());

    DerivedRow {
        row,
        saida_prevista,
        saida_efetiva,
        entrada_efetiva,
        tempo_ate_saida,
        tempo_no_patio,
        prioridade,
        rumo,
    }
}

/// Signed seconds until (or since) departure.
///
/// For vehicles that already left, the reference is the forecast when one
/// exists, otherwise the actual exit itself; negative means it left later
/// than referenced. For vehicles still in the yard with a forecast, the
/// margin is forecast minus now; negative means overdue.
fn compute_tempo_ate_saida(
    saida_prevista: Option<DateTime<Tz>>,
    saida_efetiva: Option<DateTime<Tz>>,
    now: DateTime<Tz>,
) -> Option<i64> {
    match (saida_efetiva, saida_prevista) {
        (Some(efetiva), prevista) => {
            let referencia = prevista.unwrap_or(efetiva);
            Some((referencia - efetiva).num_seconds())
        }
        (None, Some(prevista)) => Some((prevista - now).num_seconds()),
        (None, None) => None,
    }
}

/// Priority ladder, evaluated in source order.
///
/// A zero-second margin counts as urgent, not late: `CRÍTICA` is reserved
/// for strictly negative margins.
fn classify_prioridade(has_forecast: bool, tempo: Option<i64>) -> Prioridade {
    if !has_forecast {
        return Prioridade::Baixa;
    }
    let Some(t) = tempo else {
        return Prioridade::Baixa;
    };

    if t > NORMAL_ABOVE_SECS {
        Prioridade::Normal
    } else if t > ATTENTION_ABOVE_SECS {
        Prioridade::Atencao
    } else if t > 0 {
        Prioridade::Urgencia
    } else if t < 0 {
        Prioridade::Critica
    } else {
        Prioridade::Urgencia
    }
}

fn classify_rumo(origem: Option<&str>, destino: Option<&str>) -> Option<Rumo> {
    let (origem, destino) = (origem?, destino?);
    if origem == destino {
        Some(Rumo::Nac)
    } else if destino == "Brasil" {
        Some(Rumo::Rn)
    } else {
        Some(Rumo::Rs)
    }
}

/// Uppercased first whitespace-delimited token, or empty.
fn first_name_upper(name: Option<&str>) -> String {
    name.and_then(|n| n.split_whitespace().next())
        .map(str::to_uppercase)
        .unwrap_or_default()
}

fn upper_or_empty(value: Option<&str>) -> String {
    value.map(str::to_uppercase).unwrap_or_default()
}

/// Missing sort keys go last; otherwise plain string order. `sort_by` is
/// stable, so equal keys keep their incoming order.
fn compare_display_keys(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

impl<'a> DerivedRow<'a> {
    /// Actionable: still in the yard, in an awaiting-departure status, with
    /// a departure forecast to measure against.
    fn actionable(&self) -> bool {
        self.saida_efetiva.is_none()
            && ACTIONABLE_STATUS.contains(&self.row.situacao_id)
            && self.saida_prevista.is_some()
    }

    fn into_display(self) -> DisplayRow {
        DisplayRow {
            cavalo: self.row.placa.clone(),
            carreta: self.row.placa_2.clone().unwrap_or_default(),
            segunda_carreta: self.row.placa_3.clone().unwrap_or_default(),
            negociador: self.row.negociador.clone().unwrap_or_default(),
            rumo: self.rumo.map(|r| r.as_str().to_string()).unwrap_or_default(),
            entrada: self
                .entrada_efetiva
                .map(time::display_date)
                .unwrap_or_default(),
            tempo_no_patio: self
                .tempo_no_patio
                .map(time::format_duration)
                .unwrap_or_default(),
            previsao_saida: self
                .saida_prevista
                .map(time::display_date)
                .unwrap_or_default(),
            tempo_ate_saida: self
                .tempo_ate_saida
                .map(time::format_duration)
                .unwrap_or_default(),
            prioridade: self.prioridade,
            motorista: first_name_upper(self.row.motorista.as_deref()),
            referencia_atual: upper_or_empty(self.row.referencia.as_deref()),
        }
    }
}

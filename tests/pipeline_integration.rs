//! End-to-end pipeline tests over the in-memory data source: fetch, join,
//! derive, persist, serve-from-cache, survive a restart, survive an outage.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tempfile::TempDir;

use patio_monitor::cache::SnapshotStore;
use patio_monitor::db::models::{ReferenceRow, ShippingRow, YardRow};
use patio_monitor::db::repositories::LocalRepository;
use patio_monitor::models::time::BUSINESS_TZ;
use patio_monitor::models::Prioridade;
use patio_monitor::services::{RefreshOrchestrator, RefreshOutcome};

fn now() -> DateTime<Tz> {
    BUSINESS_TZ.with_ymd_and_hms(2024, 8, 15, 12, 0, 0).unwrap()
}

fn fmt(dt: DateTime<Tz>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn yard_row(placa: &str, waybill: Option<&str>, forecast_offset_min: i64) -> YardRow {
    YardRow {
        placa: placa.to_string(),
        situacao_id: 2,
        num_romaneio: waybill.map(str::to_string),
        data_prevista_saida: Some(fmt(now() + ChronoDuration::minutes(forecast_offset_min))),
        data_efetiva_entrada: Some((now() - ChronoDuration::hours(4)).naive_local()),
        motorista: Some("ana paula souza".to_string()),
        ..Default::default()
    }
}

fn shipping_row(waybill: &str, tabela: &str, negociador: &str, destino: &str) -> ShippingRow {
    ShippingRow {
        romaneio_atual: Some(waybill.to_string()),
        tabela: tabela.to_string(),
        negociador: Some(negociador.to_string()),
        pais_origem: Some("Brasil".to_string()),
        pais_destino: Some(destino.to_string()),
        ..Default::default()
    }
}

/// Three plates in three priority bands, one duplicated waybill across the
/// shipping tables, one trailer composition, one vehicle already departed.
fn seeded_repo() -> Arc<LocalRepository> {
    let repo = Arc::new(LocalRepository::new());

    let mut with_trailer = yard_row("CAV0A01", Some("700"), 10);
    with_trailer.placa_2 = Some("TRL1B02".to_string());

    let mut departed = yard_row("CAV0D04", None, -300);
    departed.data_efetiva_saida = Some(fmt(now() - ChronoDuration::hours(1)));

    repo.seed(
        vec![
            with_trailer,
            yard_row("CAV0B02", Some("701"), 90),
            yard_row("CAV0C03", None, -30),
            departed,
        ],
        vec![ReferenceRow {
            placa_controle: "CAV0A01".to_string(),
            referencia: Some("viagem-77".to_string()),
        }],
        vec![
            // Same waybill in two tables: the TSC row must win.
            shipping_row("700", "TSCH", "PERDEDOR", "Chile"),
            shipping_row("700", "TSC", "CARLA", "Argentina"),
            shipping_row("701", "TSCSR", "MARCOS", "Brasil"),
        ],
    );
    repo.set_last_update(Some(
        NaiveDate::from_ymd_opt(2024, 8, 15)
            .unwrap()
            .and_hms_opt(11, 55, 0)
            .unwrap(),
    ));
    repo
}

fn orchestrator(repo: Arc<LocalRepository>, dir: &TempDir) -> RefreshOrchestrator {
    RefreshOrchestrator::new(repo, SnapshotStore::new(dir.path().join("snapshot.json")))
        .with_source_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn full_pipeline_derives_the_expected_table() {
    let dir = TempDir::new().unwrap();
    let repo = seeded_repo();
    let orch = orchestrator(repo, &dir);

    let state = orch.run_cycle_at(false, now()).await;
    assert_eq!(state.outcome, RefreshOutcome::Refreshed);

    // Departed vehicle filtered; three actionable rows sorted by forecast.
    assert_eq!(state.rows.len(), 3);
    assert_eq!(state.qtd_placas, 3);
    let placas: Vec<_> = state.rows.iter().map(|r| r.cavalo.as_str()).collect();
    assert_eq!(placas, vec!["CAV0C03", "CAV0A01", "CAV0B02"]);

    // Overdue row, 30 minutes late.
    let overdue = &state.rows[0];
    assert_eq!(overdue.prioridade, Prioridade::Critica);
    assert_eq!(overdue.tempo_ate_saida, "-30min");
    assert_eq!(overdue.rumo, "");
    assert_eq!(overdue.negociador, "");

    // Imminent departure with trailer, deduplicated shipping and reference.
    let imminent = &state.rows[1];
    assert_eq!(imminent.prioridade, Prioridade::Urgencia);
    assert_eq!(imminent.carreta, "TRL1B02");
    assert_eq!(imminent.negociador, "CARLA");
    assert_eq!(imminent.rumo, "RS");
    assert_eq!(imminent.referencia_atual, "VIAGEM-77");
    assert_eq!(imminent.motorista, "ANA");
    assert_eq!(imminent.tempo_no_patio, "4h");

    // Comfortable margin, inbound to Brasil.
    let comfortable = &state.rows[2];
    assert_eq!(comfortable.prioridade, Prioridade::Atencao);
    assert_eq!(comfortable.tempo_ate_saida, "1h 30min");
    assert_eq!(comfortable.rumo, "NAC");

    assert_eq!(
        state.last_update,
        Some(
            NaiveDate::from_ymd_opt(2024, 8, 15)
                .unwrap()
                .and_hms_opt(11, 55, 0)
                .unwrap()
        ),
    );
}

#[tokio::test]
async fn snapshot_file_matches_the_persisted_contract() {
    let dir = TempDir::new().unwrap();
    let orch = orchestrator(seeded_repo(), &dir);
    orch.run_cycle_at(false, now()).await;

    let raw = std::fs::read_to_string(dir.path().join("snapshot.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert!(value["saved_at"].is_string());
    assert!(value["last_update"].is_string());
    assert_eq!(value["qtd_placas"], 3);
    let rows = value["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    for key in [
        "CAVALO",
        "CARRETA",
        "2ª CARRETA",
        "NEGOCIADOR",
        "RUMO",
        "ENTRADA",
        "TEMPO NO PÁTIO",
        "PREVISÃO SAÍDA",
        "TEMPO ATÉ SAÍDA",
        "PRIORIDADE",
        "MOTORISTA",
        "REFERÊNCIA ATUAL",
    ] {
        assert!(rows[0].get(key).is_some(), "missing column {key}");
    }

    // Parsed back, the snapshot is fresh relative to its own save time.
    let snapshot = orch.persisted_snapshot().unwrap();
    let saved_at: DateTime<Utc> = snapshot.saved_at;
    assert_eq!(saved_at, now().with_timezone(&Utc));
}

#[tokio::test]
async fn restart_then_outage_keeps_the_last_good_table() {
    let dir = TempDir::new().unwrap();
    let repo = seeded_repo();

    let first = orchestrator(repo.clone(), &dir);
    let initial = first.run_cycle_at(false, now()).await;
    drop(first);

    // Fresh process: cache comes straight off disk, no fetch.
    let second = orchestrator(repo.clone(), &dir);
    let warm = second
        .run_cycle_at(false, now() + ChronoDuration::minutes(3))
        .await;
    assert_eq!(warm.outcome, RefreshOutcome::ServedCached);
    assert_eq!(warm.rows, initial.rows);
    assert_eq!(repo.fetch_count(), 1);

    // Source goes down and the cache expires: stale rows stay on screen.
    repo.set_failing(true);
    let stale = second
        .run_cycle_at(false, now() + ChronoDuration::minutes(30))
        .await;
    assert!(matches!(stale.outcome, RefreshOutcome::RefreshFailed { .. }));
    assert_eq!(stale.rows, initial.rows);

    // Source recovers: a forced refresh replaces the snapshot.
    repo.set_failing(false);
    let recovered = second
        .run_cycle_at(true, now() + ChronoDuration::minutes(31))
        .await;
    assert_eq!(recovered.outcome, RefreshOutcome::Refreshed);
    assert_eq!(repo.fetch_count(), 2);
}

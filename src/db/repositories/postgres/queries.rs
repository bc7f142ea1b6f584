//! Raw SQL executed against the operational store.
//!
//! These queries are the collaborator contract: read-only, returning the
//! three tabular schemas plus one scalar. Column aliases are lowercase so
//! the result rows map directly onto the `QueryableByName` structs. The two
//! exit-date columns are cast to text on purpose — they historically carry
//! free-form values and are parsed leniently on our side.

/// Yard-control entries joined with their equipment code and up to two
/// trailer compositions. A trailer link only holds when the actual entry
/// fell inside the coupling's engage/disengage window (open-ended disengage
/// counts as still coupled).
pub const MAIN_QUERY: &str = r#"
    WITH cpv AS (
        SELECT
            cp."DATE_INSERT" AS date_insert,
            cp."CONTROLE_PATIO_ID"::bigint AS controle_patio_id,
            cp."DATA_PREVISTA_ENTRADA" AS data_prevista_entrada,
            cp."DATA_PREVISTA_SAIDA"::text AS data_prevista_saida,
            cp."DATA_EFETIVA_ENTRADA" AS data_efetiva_entrada,
            cp."DATA_EFETIVA_SAIDA"::text AS data_efetiva_saida,
            cp."SITUACAO_ID"::integer AS situacao_id,
            cp."NUM_ROMANEIO"::text AS num_romaneio,
            cp."EQUIPAMENTO_ID"::bigint AS equipamento_id,
            cp."MOTORISTA" AS motorista,
            e."COD_EQUIPAMENTO" AS placa
        FROM manutencao.controle_patio cp
        JOIN almoxarifado.equipamento e
          ON cp."EQUIPAMENTO_ID" = e."EQUIPAMENTO_ID"
        WHERE cp."DATE_INSERT" >= '2024-08-01'
    ),
    completo AS (
        SELECT cpv.*, vc."PLACA_2" AS placa_2
        FROM cpv
        LEFT JOIN veiculo.veiculo_composicao vc
          ON cpv.placa = vc."PLACA_1"
         AND cpv.data_efetiva_entrada
             BETWEEN vc."DATA_HORA_ENGATE" AND COALESCE(vc."DATA_HORA_DESENGATE", NOW())
    )
    SELECT completo.*, vc."PLACA_2" AS placa_3
    FROM completo
    LEFT JOIN veiculo.veiculo_composicao vc
      ON completo.placa_2 = vc."PLACA_1"
     AND completo.data_efetiva_entrada
         BETWEEN vc."DATA_HORA_ENGATE" AND COALESCE(vc."DATA_HORA_DESENGATE", NOW());
"#;

/// Active references only: entries with a null day field are history.
pub const REF_QUERY: &str = r#"
    SELECT DISTINCT
        rf."PLACA_CONTROLE" AS placa_controle,
        rf."REFERENCIA" AS referencia
    FROM oper.rank_frota rf
    WHERE rf."DIA" IS NOT NULL;
"#;

/// Union of the three shipping tables, tagged with their source. Duplicate
/// waybills across tables are resolved in Rust by
/// [`crate::services::shipping::resolve_precedence`], so no window-function
/// dedup happens here.
pub const SHIPPING_QUERY: &str = r#"
    SELECT
        "SHIPPING_CODE_ID"::bigint AS shipping_code_id,
        "NEGOCIADOR" AS negociador,
        "PAIS_ORIGEM_SHIPPING" AS pais_origem,
        "PAIS_DESTINO_SHIPPING" AS pais_destino,
        "ROMANEIO_ATUAL"::text AS romaneio_atual,
        'TSC' AS tabela
    FROM customizacoes_932.tracking_shipping_code
    UNION ALL
    SELECT
        "SHIPPING_CODE_ID"::bigint AS shipping_code_id,
        "NEGOCIADOR" AS negociador,
        "PAIS_ORIGEM_SHIPPING" AS pais_origem,
        "PAIS_DESTINO_SHIPPING" AS pais_destino,
        "ROMANEIO_ATUAL"::text AS romaneio_atual,
        'TSCH' AS tabela
    FROM customizacoes_932.tracking_shipping_code_historico
    WHERE "DATA_INICIO_CARGA" >= '2024-08-01'
    UNION ALL
    SELECT
        "SHIPPING_CODE_ID"::bigint AS shipping_code_id,
        "NEGOCIADOR" AS negociador,
        "PAIS_ORIGEM_SHIPPING" AS pais_origem,
        "PAIS_DESTINO_SHIPPING" AS pais_destino,
        "ROMANEIO_ATUAL"::text AS romaneio_atual,
        'TSCSR' AS tabela
    FROM customizacoes_932.tracking_shipping_code_sem_romaneio
    WHERE "DATA_INICIO_CARGA" >= '2024-08-01';
"#;

/// Scalar freshness probe: newest insert on the yard-control table.
pub const LAST_UPDATE_QUERY: &str = r#"
    SELECT MAX(cp."DATE_INSERT") AS last_update
    FROM manutencao.controle_patio cp;
"#;

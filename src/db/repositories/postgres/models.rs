//! Diesel row mappings for the raw SQL result sets.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text, Timestamp};

use crate::db::models::{ReferenceRow, ShippingRow, YardRow};

#[derive(QueryableByName)]
pub struct YardRecord {
    #[diesel(sql_type = Nullable<Timestamp>)]
    pub date_insert: Option<NaiveDateTime>,
    #[diesel(sql_type = BigInt)]
    pub controle_patio_id: i64,
    #[diesel(sql_type = Nullable<Timestamp>)]
    pub data_prevista_entrada: Option<NaiveDateTime>,
    #[diesel(sql_type = Nullable<Text>)]
    pub data_prevista_saida: Option<String>,
    #[diesel(sql_type = Nullable<Timestamp>)]
    pub data_efetiva_entrada: Option<NaiveDateTime>,
    #[diesel(sql_type = Nullable<Text>)]
    pub data_efetiva_saida: Option<String>,
    #[diesel(sql_type = Integer)]
    pub situacao_id: i32,
    #[diesel(sql_type = Nullable<Text>)]
    pub num_romaneio: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub equipamento_id: i64,
    #[diesel(sql_type = Nullable<Text>)]
    pub motorista: Option<String>,
    #[diesel(sql_type = Text)]
    pub placa: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub placa_2: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub placa_3: Option<String>,
}

impl From<YardRecord> for YardRow {
    fn from(r: YardRecord) -> Self {
        YardRow {
            date_insert: r.date_insert,
            controle_patio_id: r.controle_patio_id,
            data_prevista_entrada: r.data_prevista_entrada,
            data_prevista_saida: r.data_prevista_saida,
            data_efetiva_entrada: r.data_efetiva_entrada,
            data_efetiva_saida: r.data_efetiva_saida,
            situacao_id: r.situacao_id,
            num_romaneio: r.num_romaneio,
            equipamento_id: r.equipamento_id,
            placa: r.placa,
            placa_2: r.placa_2,
            placa_3: r.placa_3,
            motorista: r.motorista,
        }
    }
}

#[derive(QueryableByName)]
pub struct ReferenceRecord {
    #[diesel(sql_type = Text)]
    pub placa_controle: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub referencia: Option<String>,
}

impl From<ReferenceRecord> for ReferenceRow {
    fn from(r: ReferenceRecord) -> Self {
        ReferenceRow {
            placa_controle: r.placa_controle,
            referencia: r.referencia,
        }
    }
}

#[derive(QueryableByName)]
pub struct ShippingRecord {
    #[diesel(sql_type = Nullable<BigInt>)]
    pub shipping_code_id: Option<i64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub negociador: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub pais_origem: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub pais_destino: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub romaneio_atual: Option<String>,
    #[diesel(sql_type = Text)]
    pub tabela: String,
}

impl From<ShippingRecord> for ShippingRow {
    fn from(r: ShippingRecord) -> Self {
        ShippingRow {
            shipping_code_id: r.shipping_code_id,
            negociador: r.negociador,
            pais_origem: r.pais_origem,
            pais_destino: r.pais_destino,
            romaneio_atual: r.romaneio_atual,
            tabela: r.tabela,
        }
    }
}

#[derive(QueryableByName)]
pub struct LastUpdateRecord {
    #[diesel(sql_type = Nullable<Timestamp>)]
    pub last_update: Option<NaiveDateTime>,
}

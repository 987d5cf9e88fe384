//! Postgres cell decoding into [`Value`].

use crate::error::PgRowsError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::Value;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::error::Error;
use tokio_postgres::{
    Row,
    types::{FromSql, Kind, Type},
};
use uuid::Uuid;

/// How a column of a given Postgres type is read off a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Oid,
    Float4,
    Float8,
    Numeric,
    Text,
    Json,
    Uuid,
    Bytea,
    Date,
    Timestamp,
    TimestampTz,
    TextArray,
    Enum,
}

impl CellKind {
    pub fn of(ty: &Type) -> Option<Self> {
        if let Kind::Enum(_) = ty.kind() {
            return Some(CellKind::Enum);
        }

        TYPE_KINDS
            .iter()
            .find(|(known, _)| known == ty)
            .map(|(_, kind)| *kind)
    }
}

const TYPE_KINDS: &[(Type, CellKind)] = &[
    (Type::BOOL, CellKind::Bool),
    (Type::INT2, CellKind::Int2),
    (Type::INT4, CellKind::Int4),
    (Type::INT8, CellKind::Int8),
    (Type::OID, CellKind::Oid),
    (Type::FLOAT4, CellKind::Float4),
    (Type::FLOAT8, CellKind::Float8),
    (Type::NUMERIC, CellKind::Numeric),
    (Type::TEXT, CellKind::Text),
    (Type::VARCHAR, CellKind::Text),
    (Type::BPCHAR, CellKind::Text),
    (Type::NAME, CellKind::Text),
    (Type::UNKNOWN, CellKind::Text),
    (Type::JSON, CellKind::Json),
    (Type::JSONB, CellKind::Json),
    (Type::UUID, CellKind::Uuid),
    (Type::BYTEA, CellKind::Bytea),
    (Type::DATE, CellKind::Date),
    (Type::TIMESTAMP, CellKind::Timestamp),
    (Type::TIMESTAMPTZ, CellKind::TimestampTz),
    (Type::TEXT_ARRAY, CellKind::TextArray),
    (Type::VARCHAR_ARRAY, CellKind::TextArray),
    (Type::BPCHAR_ARRAY, CellKind::TextArray),
    (Type::NAME_ARRAY, CellKind::TextArray),
];

/// Label of a Postgres enum value, read as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLabel(pub String);

impl<'a> FromSql<'a> for EnumLabel {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(EnumLabel(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}

pub(crate) fn numeric_value(decimal: Decimal) -> Value {
    decimal
        .to_f64()
        .map(Value::Float)
        .unwrap_or_else(|| Value::String(decimal.to_string()))
}

pub(crate) fn timestamp_value(naive: NaiveDateTime) -> Value {
    Value::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Reads cell `index` of `row`. SQL NULL becomes [`Value::Null`].
pub fn decode_cell(row: &Row, index: usize) -> Result<Value, PgRowsError> {
    let column = &row.columns()[index];
    let ty = column.type_();
    let kind = CellKind::of(ty).ok_or_else(|| PgRowsError::UnsupportedType {
        column: column.name().to_string(),
        ty: ty.name().to_string(),
    })?;

    let decode_err = |source| PgRowsError::Decode {
        column: column.name().to_string(),
        source,
    };

    let value = match kind {
        CellKind::Bool => row.try_get::<_, Option<bool>>(index).map(Value::from),
        CellKind::Int2 => row.try_get::<_, Option<i16>>(index).map(Value::from),
        CellKind::Int4 => row.try_get::<_, Option<i32>>(index).map(Value::from),
        CellKind::Int8 => row.try_get::<_, Option<i64>>(index).map(Value::from),
        CellKind::Oid => row.try_get::<_, Option<u32>>(index).map(Value::from),
        CellKind::Float4 => row.try_get::<_, Option<f32>>(index).map(Value::from),
        CellKind::Float8 => row.try_get::<_, Option<f64>>(index).map(Value::from),
        CellKind::Numeric => row
            .try_get::<_, Option<Decimal>>(index)
            .map(|v| v.map_or(Value::Null, numeric_value)),
        CellKind::Text => row.try_get::<_, Option<String>>(index).map(Value::from),
        CellKind::Json => row
            .try_get::<_, Option<serde_json::Value>>(index)
            .map(Value::from),
        CellKind::Uuid => row.try_get::<_, Option<Uuid>>(index).map(Value::from),
        CellKind::Bytea => row.try_get::<_, Option<Vec<u8>>>(index).map(Value::from),
        CellKind::Date => row.try_get::<_, Option<NaiveDate>>(index).map(Value::from),
        CellKind::Timestamp => row
            .try_get::<_, Option<NaiveDateTime>>(index)
            .map(|v| v.map_or(Value::Null, timestamp_value)),
        CellKind::TimestampTz => row
            .try_get::<_, Option<DateTime<Utc>>>(index)
            .map(Value::from),
        CellKind::TextArray => row
            .try_get::<_, Option<Vec<String>>>(index)
            .map(Value::from),
        CellKind::Enum => row.try_get::<_, Option<EnumLabel>>(index).map(|v| {
            v.map_or(Value::Null, |label| {
                Value::Enum(ty.name().to_string(), label.0)
            })
        }),
    };

    value.map_err(decode_err)
}

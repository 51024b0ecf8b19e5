//! The generic (portable) type catalog and its codecs.
//!
//! Dialect catalogs start from [`TypeCatalog::generic`] and substitute named
//! fields; see `types::pg` and `types::oracle`.

use super::{Codec, TypePack, read_array};
use crate::error::{SqlError, SqlResult};
use crate::wire::{RowAccess, WireKind, WireValue};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

#[cfg(feature = "rust_decimal")]
use rust_decimal::Decimal;
#[cfg(feature = "rust_decimal")]
use rust_decimal::prelude::ToPrimitive;

/// Coerce any numeric wire value to `i64` when it is exactly representable.
fn integral(value: &WireValue) -> Option<i64> {
    match value {
        WireValue::SmallInt(v) => Some(i64::from(*v)),
        WireValue::Int(v) => Some(i64::from(*v)),
        WireValue::BigInt(v) => Some(*v),
        WireValue::Real(v) => {
            let i = *v as i64;
            (i as f32 == *v).then_some(i)
        }
        WireValue::Double(v) => {
            let i = *v as i64;
            (i as f64 == *v).then_some(i)
        }
        #[cfg(feature = "rust_decimal")]
        WireValue::Decimal(v) if v.is_integer() => v.to_i64(),
        _ => None,
    }
}

/// Coerce any numeric wire value to `f64`.
fn floating(value: &WireValue) -> Option<f64> {
    match value {
        WireValue::Real(v) => Some(f64::from(*v)),
        WireValue::Double(v) => Some(*v),
        WireValue::SmallInt(v) => Some(f64::from(*v)),
        WireValue::Int(v) => Some(f64::from(*v)),
        WireValue::BigInt(v) => Some(*v as f64),
        #[cfg(feature = "rust_decimal")]
        WireValue::Decimal(v) => v.to_f64(),
        _ => None,
    }
}

const NUMERIC_KINDS: &[WireKind] = &[
    WireKind::SmallInt,
    WireKind::Int,
    WireKind::BigInt,
    WireKind::Real,
    WireKind::Double,
];

pub struct BoolCodec {
    pub name: &'static str,
}

impl Codec<bool> for BoolCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Bool
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[
            WireKind::Bool,
            WireKind::SmallInt,
            WireKind::Int,
            WireKind::BigInt,
        ]
    }
    fn decode(&self, value: &WireValue) -> Option<bool> {
        match value {
            WireValue::Bool(b) => Some(*b),
            other => match integral(other) {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
        }
    }
    fn write(&self, value: &bool) -> SqlResult<WireValue> {
        Ok(WireValue::Bool(*value))
    }
}

pub struct SmallIntCodec {
    pub name: &'static str,
}

impl Codec<i16> for SmallIntCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::SmallInt
    }
    fn accepted(&self) -> &'static [WireKind] {
        NUMERIC_KINDS
    }
    fn decode(&self, value: &WireValue) -> Option<i16> {
        integral(value).and_then(|v| i16::try_from(v).ok())
    }
    fn write(&self, value: &i16) -> SqlResult<WireValue> {
        Ok(WireValue::SmallInt(*value))
    }
}

pub struct IntegerCodec {
    pub name: &'static str,
}

impl Codec<i32> for IntegerCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Int
    }
    fn accepted(&self) -> &'static [WireKind] {
        NUMERIC_KINDS
    }
    fn decode(&self, value: &WireValue) -> Option<i32> {
        integral(value).and_then(|v| i32::try_from(v).ok())
    }
    fn write(&self, value: &i32) -> SqlResult<WireValue> {
        Ok(WireValue::Int(*value))
    }
}

pub struct BigIntCodec {
    pub name: &'static str,
}

impl Codec<i64> for BigIntCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::BigInt
    }
    fn accepted(&self) -> &'static [WireKind] {
        NUMERIC_KINDS
    }
    fn decode(&self, value: &WireValue) -> Option<i64> {
        integral(value)
    }
    fn write(&self, value: &i64) -> SqlResult<WireValue> {
        Ok(WireValue::BigInt(*value))
    }
}

pub struct RealCodec {
    pub name: &'static str,
}

impl Codec<f32> for RealCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Real
    }
    fn accepted(&self) -> &'static [WireKind] {
        NUMERIC_KINDS
    }
    fn decode(&self, value: &WireValue) -> Option<f32> {
        floating(value).map(|v| v as f32)
    }
    fn write(&self, value: &f32) -> SqlResult<WireValue> {
        Ok(WireValue::Real(*value))
    }
}

pub struct DoubleCodec {
    pub name: &'static str,
}

impl Codec<f64> for DoubleCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Double
    }
    fn accepted(&self) -> &'static [WireKind] {
        NUMERIC_KINDS
    }
    fn decode(&self, value: &WireValue) -> Option<f64> {
        floating(value)
    }
    fn write(&self, value: &f64) -> SqlResult<WireValue> {
        Ok(WireValue::Double(*value))
    }
}

pub struct TextCodec {
    pub name: &'static str,
}

impl Codec<String> for TextCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Text
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Text]
    }
    fn decode(&self, value: &WireValue) -> Option<String> {
        match value {
            WireValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
    fn write(&self, value: &String) -> SqlResult<WireValue> {
        Ok(WireValue::Text(value.clone()))
    }
}

pub struct BytesCodec {
    pub name: &'static str,
}

impl Codec<Bytes> for BytesCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Bytes
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Bytes]
    }
    fn decode(&self, value: &WireValue) -> Option<Bytes> {
        match value {
            WireValue::Bytes(b) => Some(b.clone()),
            _ => None,
        }
    }
    fn write(&self, value: &Bytes) -> SqlResult<WireValue> {
        Ok(WireValue::Bytes(value.clone()))
    }
}

pub struct DateCodec {
    pub name: &'static str,
}

impl Codec<NaiveDate> for DateCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Date
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Date, WireKind::Timestamp]
    }
    fn decode(&self, value: &WireValue) -> Option<NaiveDate> {
        match value {
            WireValue::Date(d) => Some(*d),
            WireValue::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }
    fn write(&self, value: &NaiveDate) -> SqlResult<WireValue> {
        Ok(WireValue::Date(*value))
    }
}

pub struct TimeCodec {
    pub name: &'static str,
}

impl Codec<NaiveTime> for TimeCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Time
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Time, WireKind::Timestamp]
    }
    fn decode(&self, value: &WireValue) -> Option<NaiveTime> {
        match value {
            WireValue::Time(t) => Some(*t),
            WireValue::Timestamp(ts) => Some(ts.time()),
            _ => None,
        }
    }
    fn write(&self, value: &NaiveTime) -> SqlResult<WireValue> {
        Ok(WireValue::Time(*value))
    }
}

pub struct TimestampCodec {
    pub name: &'static str,
}

impl Codec<NaiveDateTime> for TimestampCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Timestamp
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Timestamp, WireKind::TimestampTz, WireKind::Date]
    }
    fn decode(&self, value: &WireValue) -> Option<NaiveDateTime> {
        match value {
            WireValue::Timestamp(ts) => Some(*ts),
            WireValue::TimestampTz(ts) => Some(ts.naive_utc()),
            WireValue::Date(d) => d.and_hms_opt(0, 0, 0),
            _ => None,
        }
    }
    fn write(&self, value: &NaiveDateTime) -> SqlResult<WireValue> {
        Ok(WireValue::Timestamp(*value))
    }
}

pub struct TimestampTzCodec {
    pub name: &'static str,
}

impl Codec<DateTime<Utc>> for TimestampTzCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::TimestampTz
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::TimestampTz, WireKind::Timestamp]
    }
    fn decode(&self, value: &WireValue) -> Option<DateTime<Utc>> {
        match value {
            WireValue::TimestampTz(ts) => Some(*ts),
            WireValue::Timestamp(ts) => Some(DateTime::from_naive_utc_and_offset(*ts, Utc)),
            _ => None,
        }
    }
    fn write(&self, value: &DateTime<Utc>) -> SqlResult<WireValue> {
        Ok(WireValue::TimestampTz(*value))
    }
}

pub struct UuidCodec {
    pub name: &'static str,
}

impl Codec<Uuid> for UuidCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Uuid
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Uuid, WireKind::Text]
    }
    fn decode(&self, value: &WireValue) -> Option<Uuid> {
        match value {
            WireValue::Uuid(u) => Some(*u),
            WireValue::Text(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
    fn write(&self, value: &Uuid) -> SqlResult<WireValue> {
        Ok(WireValue::Uuid(*value))
    }
}

pub struct JsonCodec {
    pub name: &'static str,
}

impl Codec<serde_json::Value> for JsonCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Json
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Json, WireKind::Text]
    }
    fn decode(&self, value: &WireValue) -> Option<serde_json::Value> {
        match value {
            WireValue::Json(v) => Some(v.clone()),
            WireValue::Text(s) => serde_json::from_str(s).ok(),
            _ => None,
        }
    }
    fn write(&self, value: &serde_json::Value) -> SqlResult<WireValue> {
        Ok(WireValue::Json(value.clone()))
    }
}

#[cfg(feature = "rust_decimal")]
pub struct DecimalCodec {
    pub name: &'static str,
}

#[cfg(feature = "rust_decimal")]
impl Codec<Decimal> for DecimalCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Decimal
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[
            WireKind::Decimal,
            WireKind::SmallInt,
            WireKind::Int,
            WireKind::BigInt,
            WireKind::Text,
        ]
    }
    fn decode(&self, value: &WireValue) -> Option<Decimal> {
        match value {
            WireValue::Decimal(d) => Some(*d),
            WireValue::SmallInt(v) => Some(Decimal::from(*v)),
            WireValue::Int(v) => Some(Decimal::from(*v)),
            WireValue::BigInt(v) => Some(Decimal::from(*v)),
            WireValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
    fn write(&self, value: &Decimal) -> SqlResult<WireValue> {
        Ok(WireValue::Decimal(*value))
    }
}

/// Array of nullable elements, delegating element conversion to the element
/// codec. Reading goes through the driver array cursor with a scoped drain.
pub struct ArrayCodec<E> {
    elem: Arc<dyn Codec<E>>,
    name: String,
    elem_name: String,
}

impl<E> ArrayCodec<E> {
    pub fn new(elem: Arc<dyn Codec<E>>) -> Self {
        let elem_name = elem.wire_name().to_string();
        Self {
            name: format!("{elem_name}[]"),
            elem_name,
            elem,
        }
    }
}

impl<E> Codec<Vec<Option<E>>> for ArrayCodec<E> {
    fn wire_name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Array
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Array]
    }
    fn decode(&self, value: &WireValue) -> Option<Vec<Option<E>>> {
        match value {
            WireValue::Array { items, .. } => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if item.is_null() {
                        out.push(None);
                    } else {
                        out.push(Some(self.elem.decode(item)?));
                    }
                }
                Some(out)
            }
            _ => None,
        }
    }
    fn write(&self, value: &Vec<Option<E>>) -> SqlResult<WireValue> {
        let mut items = Vec::with_capacity(value.len());
        for elem in value {
            items.push(match elem {
                Some(e) => self.elem.write(e)?,
                None => WireValue::Null,
            });
        }
        Ok(WireValue::Array {
            element: self.elem_name.clone(),
            items,
        })
    }
    fn read(&self, row: &dyn RowAccess, index: usize) -> SqlResult<Option<Vec<Option<E>>>> {
        let Some(cursor) = row.get_array(index)? else {
            return Ok(None);
        };
        let elem = &self.elem;
        read_array(cursor, |value| match elem.decode(value) {
            Some(e) => Ok(Some(e)),
            None => Err(SqlError::type_mismatch(
                index,
                value.kind(),
                self.elem_name.clone(),
                elem.accepted(),
                None,
            )),
        })
        .map(Some)
    }
}

/// The portable type catalog: one [`TypePack`] per logical type.
#[derive(Clone)]
pub struct TypeCatalog {
    pub boolean: TypePack<bool>,
    pub small_int: TypePack<i16>,
    pub integer: TypePack<i32>,
    pub big_int: TypePack<i64>,
    pub real: TypePack<f32>,
    pub double: TypePack<f64>,
    pub varchar: TypePack<String>,
    pub bytes: TypePack<Bytes>,
    pub date: TypePack<NaiveDate>,
    pub time: TypePack<NaiveTime>,
    pub timestamp: TypePack<NaiveDateTime>,
    pub timestamp_tz: TypePack<DateTime<Utc>>,
    pub uuid: TypePack<Uuid>,
    pub json: TypePack<serde_json::Value>,
    #[cfg(feature = "rust_decimal")]
    pub decimal: TypePack<Decimal>,
    pub int_array: TypePack<Vec<Option<i32>>>,
    pub big_int_array: TypePack<Vec<Option<i64>>>,
    pub text_array: TypePack<Vec<Option<String>>>,
}

impl TypeCatalog {
    /// Build the portable catalog.
    pub fn generic() -> Self {
        Self {
            boolean: TypePack::new(BoolCodec { name: "boolean" }),
            small_int: TypePack::new(SmallIntCodec { name: "smallint" }),
            integer: TypePack::new(IntegerCodec { name: "integer" }),
            big_int: TypePack::new(BigIntCodec { name: "bigint" }),
            real: TypePack::new(RealCodec { name: "real" }),
            double: TypePack::new(DoubleCodec {
                name: "double precision",
            }),
            varchar: TypePack::new(TextCodec { name: "varchar" }),
            bytes: TypePack::new(BytesCodec { name: "blob" }),
            date: TypePack::new(DateCodec { name: "date" }),
            time: TypePack::new(TimeCodec { name: "time" }),
            timestamp: TypePack::new(TimestampCodec { name: "timestamp" }),
            timestamp_tz: TypePack::new(TimestampTzCodec {
                name: "timestamp with time zone",
            }),
            uuid: TypePack::new(UuidCodec { name: "uuid" }),
            json: TypePack::new(JsonCodec { name: "json" }),
            #[cfg(feature = "rust_decimal")]
            decimal: TypePack::new(DecimalCodec { name: "numeric" }),
            int_array: TypePack::new(ArrayCodec::new(Arc::new(IntegerCodec { name: "integer" }))),
            big_int_array: TypePack::new(ArrayCodec::new(Arc::new(BigIntCodec {
                name: "bigint",
            }))),
            text_array: TypePack::new(ArrayCodec::new(Arc::new(TextCodec { name: "varchar" }))),
        }
    }
}

/// The shared generic catalog instance.
pub fn generic() -> &'static TypeCatalog {
    static CATALOG: OnceLock<TypeCatalog> = OnceLock::new();
    CATALOG.get_or_init(TypeCatalog::generic)
}

//! PostgreSQL type catalog.
//!
//! Starts from the generic catalog and substitutes the fields PostgreSQL
//! special-cases; everything not named here delegates to the shared generic
//! codecs. The extras (boolean arrays, bit strings, JSONB) have no portable
//! counterpart and live outside the base table.

use super::catalog::{ArrayCodec, BoolCodec, BytesCodec, JsonCodec, TextCodec, TimestampTzCodec};
use super::{Codec, TypeCatalog, TypePack};
use crate::error::SqlResult;
use crate::wire::{WireKind, WireValue};
use bit_vec::BitVec;
use std::sync::{Arc, OnceLock};

/// PostgreSQL bit string (`varbit`).
pub struct BitsCodec {
    pub name: &'static str,
}

impl Codec<BitVec> for BitsCodec {
    fn wire_name(&self) -> &str {
        self.name
    }
    fn kind(&self) -> WireKind {
        WireKind::Bits
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Bits, WireKind::Text]
    }
    fn decode(&self, value: &WireValue) -> Option<BitVec> {
        match value {
            WireValue::Bits(bits) => Some(bits.clone()),
            WireValue::Text(s) => {
                let mut bits = BitVec::with_capacity(s.len());
                for ch in s.chars() {
                    match ch {
                        '0' => bits.push(false),
                        '1' => bits.push(true),
                        _ => return None,
                    }
                }
                Some(bits)
            }
            _ => None,
        }
    }
    fn write(&self, value: &BitVec) -> SqlResult<WireValue> {
        Ok(WireValue::Bits(value.clone()))
    }
}

/// The PostgreSQL catalog: the overridden base table plus Pg-only types.
#[derive(Clone)]
pub struct PgTypeCatalog {
    pub base: TypeCatalog,
    pub boolean_array: TypePack<Vec<Option<bool>>>,
    pub bits: TypePack<BitVec>,
    pub jsonb: TypePack<serde_json::Value>,
}

impl PgTypeCatalog {
    pub fn new() -> Self {
        Self {
            base: TypeCatalog {
                varchar: TypePack::new(TextCodec { name: "text" }),
                bytes: TypePack::new(BytesCodec { name: "bytea" }),
                timestamp_tz: TypePack::new(TimestampTzCodec {
                    name: "timestamptz",
                }),
                ..super::generic().clone()
            },
            boolean_array: TypePack::new(ArrayCodec::new(Arc::new(BoolCodec { name: "boolean" }))),
            bits: TypePack::new(BitsCodec { name: "varbit" }),
            jsonb: TypePack::new(JsonCodec { name: "jsonb" }),
        }
    }
}

impl Default for PgTypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// The shared PostgreSQL catalog instance.
pub fn types() -> &'static PgTypeCatalog {
    static CATALOG: OnceLock<PgTypeCatalog> = OnceLock::new();
    CATALOG.get_or_init(PgTypeCatalog::new)
}

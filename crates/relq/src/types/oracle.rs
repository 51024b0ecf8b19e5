//! Oracle type catalog.
//!
//! Booleans travel as `NUMBER(1)`, text is `VARCHAR2`, floating point maps to
//! the binary float types, and large text goes through CLOB locators that must
//! be freed deterministically after the read.

use super::catalog::{BytesCodec, DoubleCodec, RealCodec, TextCodec};
use super::{Codec, TypeCatalog, TypePack, read_lob};
use crate::error::{SqlError, SqlResult};
use crate::wire::{RowAccess, WireKind, WireValue};
use std::sync::OnceLock;

/// Boolean as `NUMBER(1)`: reads 0/1 (or a driver-level bool), writes 0/1.
pub struct NumberBoolCodec;

impl Codec<bool> for NumberBoolCodec {
    fn wire_name(&self) -> &str {
        "number(1)"
    }
    fn kind(&self) -> WireKind {
        WireKind::SmallInt
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
            WireValue::SmallInt(0) | WireValue::Int(0) | WireValue::BigInt(0) => Some(false),
            WireValue::SmallInt(1) | WireValue::Int(1) | WireValue::BigInt(1) => Some(true),
            _ => None,
        }
    }
    fn write(&self, value: &bool) -> SqlResult<WireValue> {
        Ok(WireValue::SmallInt(i16::from(*value)))
    }
}

/// CLOB text: prefers the locator path (stream then `free`, with error
/// aggregation), falling back to inline text when the driver has no locator.
pub struct ClobCodec {
    inline: TextCodec,
}

impl ClobCodec {
    pub fn new() -> Self {
        Self {
            inline: TextCodec { name: "clob" },
        }
    }
}

impl Default for ClobCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec<String> for ClobCodec {
    fn wire_name(&self) -> &str {
        "clob"
    }
    fn kind(&self) -> WireKind {
        WireKind::Text
    }
    fn accepted(&self) -> &'static [WireKind] {
        &[WireKind::Text]
    }
    fn decode(&self, value: &WireValue) -> Option<String> {
        self.inline.decode(value)
    }
    fn write(&self, value: &String) -> SqlResult<WireValue> {
        Ok(WireValue::Text(value.clone()))
    }
    fn read(&self, row: &dyn RowAccess, index: usize) -> SqlResult<Option<String>> {
        match row.get_lob(index) {
            Ok(Some(lob)) => read_lob(lob).map(Some),
            Ok(None) => Ok(None),
            Err(SqlError::TypedRead(_)) => self.inline.read(row, index),
            Err(other) => Err(other),
        }
    }
}

/// The Oracle catalog: the overridden base table plus the CLOB pack.
#[derive(Clone)]
pub struct OracleTypeCatalog {
    pub base: TypeCatalog,
    pub clob: TypePack<String>,
}

impl OracleTypeCatalog {
    pub fn new() -> Self {
        Self {
            base: TypeCatalog {
                boolean: TypePack::new(NumberBoolCodec),
                varchar: TypePack::new(TextCodec { name: "varchar2" }),
                bytes: TypePack::new(BytesCodec { name: "blob" }),
                real: TypePack::new(RealCodec {
                    name: "binary_float",
                }),
                double: TypePack::new(DoubleCodec {
                    name: "binary_double",
                }),
                ..super::generic().clone()
            },
            clob: TypePack::new(ClobCodec::new()),
        }
    }
}

impl Default for OracleTypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// The shared Oracle catalog instance.
pub fn types() -> &'static OracleTypeCatalog {
    static CATALOG: OnceLock<OracleTypeCatalog> = OnceLock::new();
    CATALOG.get_or_init(OracleTypeCatalog::new)
}

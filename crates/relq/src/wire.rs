//! The database-client boundary.
//!
//! relq does not talk to a database itself. Statements render to SQL text plus an
//! ordered list of [`WireValue`]s, and result rows come back through the
//! [`RowAccess`] trait. A driver adapter implements these traits; the crate ships
//! an in-memory implementation ([`MemoryRow`]) for tests and offline use.

use crate::error::{SqlError, SqlResult};
use bit_vec::BitVec;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Cap applied to parameter previews embedded in SQL comments.
const PREVIEW_CAP: usize = 100;

/// A value in its driver-level representation.
///
/// This is what gets bound to a placeholder and what a row cursor hands back
/// before the type catalog converts it to a native value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WireValue {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Text(String),
    Bytes(Bytes),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
    /// Bit string; serialized for debug snapshots as a `0`/`1` string.
    Bits(#[serde(serialize_with = "serialize_bits")] BitVec),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
    /// A typed array: the element wire-type name plus the element values.
    Array {
        element: String,
        items: Vec<WireValue>,
    },
}

/// The shape of a [`WireValue`], used for typed-getter requests and for
/// coercion diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WireKind {
    Null,
    Bool,
    SmallInt,
    Int,
    BigInt,
    Real,
    Double,
    Text,
    Bytes,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
    Bits,
    #[cfg(feature = "rust_decimal")]
    Decimal,
    Array,
}

impl WireKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::SmallInt => "smallint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Real => "real",
            Self::Double => "double",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::Uuid => "uuid",
            Self::Json => "json",
            Self::Bits => "bits",
            #[cfg(feature = "rust_decimal")]
            Self::Decimal => "decimal",
            Self::Array => "array",
        }
    }
}

impl std::fmt::Display for WireKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WireValue {
    pub fn kind(&self) -> WireKind {
        match self {
            Self::Null => WireKind::Null,
            Self::Bool(_) => WireKind::Bool,
            Self::SmallInt(_) => WireKind::SmallInt,
            Self::Int(_) => WireKind::Int,
            Self::BigInt(_) => WireKind::BigInt,
            Self::Real(_) => WireKind::Real,
            Self::Double(_) => WireKind::Double,
            Self::Text(_) => WireKind::Text,
            Self::Bytes(_) => WireKind::Bytes,
            Self::Date(_) => WireKind::Date,
            Self::Time(_) => WireKind::Time,
            Self::Timestamp(_) => WireKind::Timestamp,
            Self::TimestampTz(_) => WireKind::TimestampTz,
            Self::Uuid(_) => WireKind::Uuid,
            Self::Json(_) => WireKind::Json,
            Self::Bits(_) => WireKind::Bits,
            #[cfg(feature = "rust_decimal")]
            Self::Decimal(_) => WireKind::Decimal,
            Self::Array { .. } => WireKind::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A short human-readable preview for SQL debug comments.
    ///
    /// Long text and binary values are cut at 100 characters with a trailing
    /// ellipsis; this string is never used for execution.
    pub fn preview(&self) -> String {
        let full = match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(v) => v.to_string(),
            Self::SmallInt(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::BigInt(v) => v.to_string(),
            Self::Real(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::Text(v) => format!("'{v}'"),
            Self::Bytes(v) => format!("{} bytes: {:02x?}", v.len(), &v[..v.len().min(16)]),
            Self::Date(v) => v.to_string(),
            Self::Time(v) => v.to_string(),
            Self::Timestamp(v) => v.to_string(),
            Self::TimestampTz(v) => v.to_rfc3339(),
            Self::Uuid(v) => v.to_string(),
            Self::Json(v) => v.to_string(),
            Self::Bits(v) => {
                let mut s = String::with_capacity(v.len());
                for bit in v.iter() {
                    s.push(if bit { '1' } else { '0' });
                }
                s
            }
            #[cfg(feature = "rust_decimal")]
            Self::Decimal(v) => v.to_string(),
            Self::Array { element, items } => format!("{element}[{}]", items.len()),
        };
        truncate_preview(&full)
    }
}

fn serialize_bits<S>(bits: &BitVec, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut s = String::with_capacity(bits.len());
    for bit in bits.iter() {
        s.push(if bit { '1' } else { '0' });
    }
    serializer.serialize_str(&s)
}

/// Truncate a preview string to the comment cap, appending `...` when cut.
pub(crate) fn truncate_preview(s: &str) -> String {
    if s.chars().count() <= PREVIEW_CAP {
        return s.to_string();
    }
    let cut: String = s.chars().take(PREVIEW_CAP).collect();
    format!("{cut}...")
}

/// Positional access to one result row.
///
/// `get` is the opaque path: whatever the driver materialized. `get_as` is the
/// typed path: a driver that can produce the requested shape directly should
/// override it; `Ok(None)` is the NULL indicator, and [`SqlError::TypedRead`]
/// signals that the shape is not supported so the reader falls back to `get`
/// plus runtime coercion.
pub trait RowAccess {
    /// Number of columns in the row.
    fn column_count(&self) -> usize;

    /// Fetch the value at `index` (0-based) as the driver materialized it.
    fn get(&self, index: usize) -> SqlResult<WireValue>;

    /// Fetch the value at `index` in the requested shape.
    fn get_as(&self, index: usize, kind: WireKind) -> SqlResult<Option<WireValue>> {
        let value = self.get(index)?;
        if value.is_null() {
            return Ok(None);
        }
        if value.kind() == kind {
            Ok(Some(value))
        } else {
            Err(SqlError::TypedRead(kind))
        }
    }

    /// Open an array cursor over the value at `index`.
    ///
    /// Returns `Ok(None)` for SQL NULL. The caller owns the cursor and must
    /// close it on every path.
    fn get_array(&self, index: usize) -> SqlResult<Option<Box<dyn ArrayCursor>>> {
        match self.get(index)? {
            WireValue::Null => Ok(None),
            WireValue::Array { items, .. } => Ok(Some(Box::new(MemoryArrayCursor::new(items)))),
            other => Err(SqlError::type_mismatch(
                index,
                other.kind(),
                "array",
                &[WireKind::Array],
                None,
            )),
        }
    }

    /// Open a LOB handle over the value at `index`, if the driver represents the
    /// column as a locator instead of inline data. Default: no LOB support.
    fn get_lob(&self, _index: usize) -> SqlResult<Option<Box<dyn LobHandle>>> {
        Err(SqlError::TypedRead(WireKind::Text))
    }
}

/// A driver-native array cursor. Must be closed deterministically; see
/// [`crate::types::read_array`] for the scoped drain that guarantees it.
pub trait ArrayCursor {
    /// Next element, `Ok(None)` when exhausted.
    fn next_value(&mut self) -> SqlResult<Option<WireValue>>;

    /// Release the underlying driver resource. Idempotent.
    fn close(&mut self) -> SqlResult<()>;
}

/// A large-object locator (CLOB-style). The reader pulls the character data and
/// must call `free` on every path, aggregating errors if both steps fail.
pub trait LobHandle {
    /// Declared length in characters.
    fn length(&self) -> SqlResult<u64>;

    /// Pull the full character stream.
    fn read_text(&mut self) -> SqlResult<String>;

    /// Release the locator. Idempotent.
    fn free(&mut self) -> SqlResult<()>;
}

/// An in-memory row, usable as a synthetic cursor in tests and offline tooling.
#[derive(Debug, Clone, Default)]
pub struct MemoryRow {
    values: Vec<WireValue>,
}

impl MemoryRow {
    pub fn new(values: Vec<WireValue>) -> Self {
        Self { values }
    }
}

impl RowAccess for MemoryRow {
    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> SqlResult<WireValue> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| SqlError::usage(format!("column index {index} out of range")))
    }
}

/// Array cursor over an in-memory element list.
#[derive(Debug)]
pub struct MemoryArrayCursor {
    items: std::vec::IntoIter<WireValue>,
    closed: bool,
}

impl MemoryArrayCursor {
    pub fn new(items: Vec<WireValue>) -> Self {
        Self {
            items: items.into_iter(),
            closed: false,
        }
    }
}

impl ArrayCursor for MemoryArrayCursor {
    fn next_value(&mut self) -> SqlResult<Option<WireValue>> {
        if self.closed {
            return Err(SqlError::usage("array cursor already closed"));
        }
        Ok(self.items.next())
    }

    fn close(&mut self) -> SqlResult<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_caps_long_text() {
        let text = "x".repeat(300);
        let preview = WireValue::Text(text).preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 103);
    }

    #[test]
    fn preview_short_values_untouched() {
        assert_eq!(WireValue::BigInt(42).preview(), "42");
        assert_eq!(WireValue::Text("hi".into()).preview(), "'hi'");
        assert_eq!(WireValue::Null.preview(), "NULL");
    }

    #[test]
    fn memory_row_typed_get_reports_null() {
        let row = MemoryRow::new(vec![WireValue::Null, WireValue::Int(7)]);
        assert_eq!(row.get_as(0, WireKind::Int).unwrap(), None);
        assert_eq!(
            row.get_as(1, WireKind::Int).unwrap(),
            Some(WireValue::Int(7))
        );
    }

    #[test]
    fn memory_row_typed_get_rejects_other_shapes() {
        let row = MemoryRow::new(vec![WireValue::Text("7".into())]);
        let err = row.get_as(0, WireKind::Int).unwrap_err();
        assert!(matches!(err, SqlError::TypedRead(WireKind::Int)));
    }

    #[test]
    fn memory_array_cursor_drains_and_closes() {
        let mut cursor =
            MemoryArrayCursor::new(vec![WireValue::Int(1), WireValue::Null, WireValue::Int(3)]);
        assert_eq!(cursor.next_value().unwrap(), Some(WireValue::Int(1)));
        assert_eq!(cursor.next_value().unwrap(), Some(WireValue::Null));
        assert_eq!(cursor.next_value().unwrap(), Some(WireValue::Int(3)));
        assert_eq!(cursor.next_value().unwrap(), None);
        cursor.close().unwrap();
        assert!(cursor.next_value().is_err());
    }
}

//! The bidirectional type-conversion registry.
//!
//! Every logical data type is a [`Codec`]: a reader from the wire representation
//! to a native value and a writer back. [`SqlType`] pairs a codec with a
//! nullability flag; [`TypePack`] holds the two paired variants of one codec.
//! Catalogs (generic, PostgreSQL, Oracle) are plain structs of packs, so dialect
//! overrides are visible field by field.

mod catalog;
pub mod oracle;
pub mod pg;

pub use catalog::{TypeCatalog, generic};

use crate::error::{SqlError, SqlResult};
use crate::wire::{ArrayCursor, LobHandle, RowAccess, WireKind, WireValue};
use std::sync::Arc;

/// Wire conversion logic for one logical data type.
///
/// `read` implements the fallback chain: the typed getter first (its `None` is
/// the NULL indicator), then the opaque getter plus runtime coercion over
/// `accepted` shapes, raising a descriptive mismatch when nothing applies.
pub trait Codec<T>: Send + Sync {
    /// Driver-level type name, used for binding metadata and debug comments.
    fn wire_name(&self) -> &str;

    /// Preferred wire shape requested from the typed getter.
    fn kind(&self) -> WireKind;

    /// Wire shapes this codec can coerce from.
    fn accepted(&self) -> &'static [WireKind];

    /// Coerce one non-NULL wire value to a native value. `None` = no rule.
    fn decode(&self, value: &WireValue) -> Option<T>;

    /// Convert a native value to its wire representation.
    fn write(&self, value: &T) -> SqlResult<WireValue>;

    /// Read column `index` from a row, `Ok(None)` = SQL NULL.
    fn read(&self, row: &dyn RowAccess, index: usize) -> SqlResult<Option<T>> {
        match row.get_as(index, self.kind()) {
            Ok(None) => Ok(None),
            Ok(Some(value)) => match self.decode(&value) {
                Some(native) => Ok(Some(native)),
                None => Err(SqlError::type_mismatch(
                    index,
                    value.kind(),
                    self.wire_name(),
                    self.accepted(),
                    None,
                )),
            },
            Err(typed_err) => {
                let raw = row.get(index)?;
                if raw.is_null() {
                    return Ok(None);
                }
                match self.decode(&raw) {
                    Some(native) => Ok(Some(native)),
                    None => Err(SqlError::type_mismatch(
                        index,
                        raw.kind(),
                        self.wire_name(),
                        self.accepted(),
                        Some(typed_err),
                    )),
                }
            }
        }
    }
}

/// A bound parameter value: the wire value, its wire-type name, and a short
/// preview used for debug comments.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: WireValue,
    pub wire_name: String,
    pub preview: String,
}

/// One logical data type: a shared codec plus a nullability flag.
///
/// `nullable()` / `not_null()` flip the flag and share the codec, so
/// `t.nullable().nullable() == t.nullable()` and round-tripping the flag keeps
/// the same reader.
pub struct SqlType<T> {
    codec: Arc<dyn Codec<T>>,
    nullable: bool,
}

impl<T> Clone for SqlType<T> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            nullable: self.nullable,
        }
    }
}

impl<T> PartialEq for SqlType<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.codec, &other.codec) && self.nullable == other.nullable
    }
}

impl<T> std::fmt::Debug for SqlType<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlType")
            .field("wire_name", &self.codec.wire_name())
            .field("nullable", &self.nullable)
            .finish()
    }
}

impl<T> SqlType<T> {
    pub fn new(codec: Arc<dyn Codec<T>>) -> Self {
        Self {
            codec,
            nullable: false,
        }
    }

    /// The nullable variant of this type (idempotent).
    pub fn nullable(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            nullable: true,
        }
    }

    /// The non-nullable variant of this type (idempotent).
    pub fn not_null(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            nullable: false,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn wire_name(&self) -> &str {
        self.codec.wire_name()
    }

    /// Whether two types share the same underlying conversion logic.
    pub fn shares_codec(&self, other: &SqlType<T>) -> bool {
        Arc::ptr_eq(&self.codec, &other.codec)
    }

    /// Read column `index`; SQL NULL is an explicit `None`, never a sentinel
    /// native value.
    pub fn read_opt(&self, row: &dyn RowAccess, index: usize) -> SqlResult<Option<T>> {
        self.codec.read(row, index)
    }

    /// Read column `index` through the non-nullable channel; NULL is an error.
    pub fn read(&self, row: &dyn RowAccess, index: usize) -> SqlResult<T> {
        self.codec
            .read(row, index)?
            .ok_or_else(|| SqlError::UnexpectedNull {
                index,
                wire_name: self.codec.wire_name().to_string(),
            })
    }

    /// Bind a native value as a parameter.
    pub fn bind(&self, value: &T) -> SqlResult<Bound> {
        let wire = self.codec.write(value)?;
        Ok(Bound {
            preview: wire.preview(),
            wire_name: self.codec.wire_name().to_string(),
            value: wire,
        })
    }

    /// Bind an optional native value; `None` binds a typed NULL and requires
    /// the nullable variant.
    pub fn bind_opt(&self, value: Option<&T>) -> SqlResult<Bound> {
        match value {
            Some(v) => self.bind(v),
            None if self.nullable => Ok(self.null_bound()),
            None => Err(SqlError::value(format!(
                "cannot bind NULL through non-nullable {}",
                self.codec.wire_name()
            ))),
        }
    }

    /// A typed NULL parameter.
    pub fn null_bound(&self) -> Bound {
        Bound {
            value: WireValue::Null,
            wire_name: self.codec.wire_name().to_string(),
            preview: "NULL".to_string(),
        }
    }
}

/// The paired {not-null, nullable} variants of one codec.
pub struct TypePack<T> {
    pub not_null: SqlType<T>,
    pub nullable: SqlType<T>,
}

impl<T> Clone for TypePack<T> {
    fn clone(&self) -> Self {
        Self {
            not_null: self.not_null.clone(),
            nullable: self.nullable.clone(),
        }
    }
}

impl<T> TypePack<T> {
    pub fn new(codec: impl Codec<T> + 'static) -> Self {
        let codec: Arc<dyn Codec<T>> = Arc::new(codec);
        Self {
            not_null: SqlType::new(Arc::clone(&codec)),
            nullable: SqlType::new(codec).nullable(),
        }
    }
}

/// Drain a driver array cursor, guaranteeing `close` on every exit path.
///
/// If both an element read and the close fail, the failures are aggregated into
/// one reported error instead of the close masking the read.
pub fn read_array<E>(
    mut cursor: Box<dyn ArrayCursor>,
    mut read_elem: impl FnMut(&WireValue) -> SqlResult<Option<E>>,
) -> SqlResult<Vec<Option<E>>> {
    let mut out = Vec::new();
    let mut failure: Option<SqlError> = None;
    loop {
        match cursor.next_value() {
            Ok(Some(value)) => {
                if value.is_null() {
                    out.push(None);
                    continue;
                }
                match read_elem(&value) {
                    Ok(elem) => out.push(elem),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    match (failure, cursor.close()) {
        (None, Ok(())) => Ok(out),
        (Some(e), Ok(())) => Err(e),
        (None, Err(close_err)) => Err(close_err),
        (Some(e), Err(close_err)) => Err(SqlError::aggregate(vec![e, close_err])),
    }
}

/// Pull the character data out of a LOB handle, guaranteeing `free` on every
/// exit path with the same aggregation rule as [`read_array`].
pub fn read_lob(mut lob: Box<dyn LobHandle>) -> SqlResult<String> {
    let read = lob.read_text();
    match (read, lob.free()) {
        (Ok(text), Ok(())) => Ok(text),
        (Ok(_), Err(free_err)) => Err(free_err),
        (Err(read_err), Ok(())) => Err(read_err),
        (Err(read_err), Err(free_err)) => Err(SqlError::aggregate(vec![read_err, free_err])),
    }
}

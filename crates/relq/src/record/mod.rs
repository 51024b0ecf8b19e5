//! Declarative row-to-record mapping.
//!
//! A record is a plain value-holder struct whose fields are
//! [`RecordField`]s. Each field is three-state (unset / set-to-null /
//! set-to-value), which is what lets one record drive INSERT (omit unset
//! primary keys so the database generates them), UPDATE (unset fields
//! untouched) and DELETE (key only).
//!
//! Mapping metadata is declared once per type in [`Record::describe`] and
//! cached process-wide behind a copy-on-write snapshot: readers clone an
//! immutable map reference, writers lock, re-check and install a new snapshot.

#[cfg(test)]
mod tests;

use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::expr::source::Table;
use crate::ident::{Ident, IntoIdent};
use crate::stmt::{ColumnValueMap, Delete, Insert, Select, Update};
use crate::types::SqlType;
use crate::wire::RowAccess;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// The three states of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState<T> {
    /// Never set; distinct from an explicit NULL.
    Unset,
    /// Explicitly set to SQL NULL.
    Null,
    /// Set to a value.
    Value(T),
}

impl<T> Default for FieldState<T> {
    fn default() -> Self {
        Self::Unset
    }
}

/// One column's slot in a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField<T> {
    state: FieldState<T>,
}

impl<T> Default for RecordField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordField<T> {
    pub fn new() -> Self {
        Self {
            state: FieldState::Unset,
        }
    }

    /// Whether a value (including an explicit NULL) has been set.
    pub fn has_value(&self) -> bool {
        !matches!(self.state, FieldState::Unset)
    }

    /// The current value. `None` both for unset and for explicit NULL; use
    /// [`has_value`](Self::has_value) to tell them apart.
    pub fn get(&self) -> Option<&T> {
        match &self.state {
            FieldState::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn state(&self) -> &FieldState<T> {
        &self.state
    }

    pub fn set(&mut self, value: T) {
        self.state = FieldState::Value(value);
    }

    /// Set to an explicit SQL NULL.
    pub fn set_null(&mut self) {
        self.state = FieldState::Null;
    }

    /// Set from an optional value: `None` is an explicit NULL, not unset.
    pub fn set_opt(&mut self, value: Option<T>) {
        self.state = match value {
            Some(v) => FieldState::Value(v),
            None => FieldState::Null,
        };
    }

    /// Reset to the fresh, never-set state.
    pub fn drop_value(&mut self) {
        self.state = FieldState::Unset;
    }

    /// Whether this field contributes a column to an INSERT: always for
    /// ordinary columns, only when set for primary-key columns.
    pub fn is_data_for_insert(&self, primary_key: bool) -> bool {
        !primary_key || self.has_value()
    }

    /// Whether this field contributes a SET column to an UPDATE.
    pub fn is_data_for_update(&self) -> bool {
        self.has_value()
    }
}

/// Metadata for one mapped column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: Ident,
    pub primary_key: bool,
    pub wire_name: String,
}

/// Per-record-type mapping metadata, derived once and cached.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInfo {
    pub table: Ident,
    pub fields: Vec<FieldInfo>,
}

impl RecordInfo {
    pub fn new(table: impl IntoIdent) -> SqlResult<Self> {
        Ok(Self {
            table: table.into_ident()?,
            fields: Vec::new(),
        })
    }

    pub fn key<T>(mut self, name: impl IntoIdent, ty: &SqlType<T>) -> SqlResult<Self> {
        self.fields.push(FieldInfo {
            name: name.into_ident()?,
            primary_key: true,
            wire_name: ty.wire_name().to_string(),
        });
        Ok(self)
    }

    pub fn field<T>(mut self, name: impl IntoIdent, ty: &SqlType<T>) -> SqlResult<Self> {
        self.fields.push(FieldInfo {
            name: name.into_ident()?,
            primary_key: false,
            wire_name: ty.wire_name().to_string(),
        });
        Ok(self)
    }
}

/// A mapped value-holder type.
pub trait Record: 'static {
    /// Table and field metadata; called once per type, then cached.
    fn describe() -> SqlResult<RecordInfo>
    where
        Self: Sized;

    /// Visit the fields in declaration order for statement building.
    fn write_fields(&self, w: &mut RecordWriter) -> SqlResult<()>;

    /// Load the fields from a row, positionally, in declaration order.
    fn load(&mut self, reader: &mut RowReader) -> SqlResult<()>;
}

type InfoMap = HashMap<TypeId, Arc<RecordInfo>>;

fn info_cache() -> &'static RwLock<Arc<InfoMap>> {
    static CACHE: OnceLock<RwLock<Arc<InfoMap>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(Arc::new(HashMap::new())))
}

/// The cached metadata for `R`, building and installing it on first use.
pub fn record_info<R: Record>() -> SqlResult<Arc<RecordInfo>> {
    let id = TypeId::of::<R>();

    // Fast path: clone the current snapshot without holding the lock across
    // any work.
    let snapshot = info_cache()
        .read()
        .map_err(|_| SqlError::usage("record metadata cache poisoned"))?
        .clone();
    if let Some(info) = snapshot.get(&id) {
        return Ok(Arc::clone(info));
    }

    let mut guard = info_cache()
        .write()
        .map_err(|_| SqlError::usage("record metadata cache poisoned"))?;
    // Another thread may have installed it between the read and the write.
    if let Some(info) = guard.get(&id) {
        return Ok(Arc::clone(info));
    }
    let info = Arc::new(R::describe()?);
    let mut next: InfoMap = (**guard).clone();
    next.insert(id, Arc::clone(&info));
    *guard = Arc::new(next);
    Ok(info)
}

/// What a record walk is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Insert,
    Update,
    Key,
}

/// Collects column/value pairs and key conditions from a record's fields.
pub struct RecordWriter {
    mode: WriteMode,
    values: ColumnValueMap,
    key: Vec<Expr>,
}

impl RecordWriter {
    fn new(mode: WriteMode) -> Self {
        Self {
            mode,
            values: ColumnValueMap::new(),
            key: Vec::new(),
        }
    }

    /// Report one field. Call once per field, in declaration order.
    pub fn field<T>(
        &mut self,
        name: impl IntoIdent,
        primary_key: bool,
        ty: &SqlType<T>,
        field: &RecordField<T>,
    ) -> SqlResult<()> {
        let name = name.into_ident()?;
        let bind_value = |ty: &SqlType<T>| -> SqlResult<Expr> {
            Ok(Expr::Param(match field.state() {
                FieldState::Value(v) => ty.bind(v)?,
                _ => ty.nullable().null_bound(),
            }))
        };
        match self.mode {
            WriteMode::Insert => {
                if field.is_data_for_insert(primary_key) {
                    self.values.set(name, bind_value(ty)?)?;
                }
            }
            WriteMode::Update => {
                if primary_key {
                    self.push_key(name, ty, field)?;
                } else if field.is_data_for_update() {
                    self.values.set(name, bind_value(ty)?)?;
                }
            }
            WriteMode::Key => {
                if primary_key {
                    self.push_key(name, ty, field)?;
                }
            }
        }
        Ok(())
    }

    fn push_key<T>(
        &mut self,
        name: Ident,
        ty: &SqlType<T>,
        field: &RecordField<T>,
    ) -> SqlResult<()> {
        let value = match field.state() {
            FieldState::Value(v) => ty.bind(v)?,
            _ => {
                return Err(SqlError::usage(format!(
                    "primary-key column {} has no value",
                    name.last_part()
                )));
            }
        };
        let column = Expr::Column {
            qualifier: None,
            name,
        };
        self.key.push(Expr::eq(column, Expr::Param(value)));
        Ok(())
    }

    fn key_condition(mut self) -> SqlResult<Expr> {
        match self.key.len() {
            0 => Err(SqlError::usage("record has no primary-key column")),
            1 => Ok(self.key.remove(0)),
            _ => Ok(Expr::and(self.key)),
        }
    }
}

/// Positional row reader for [`Record::load`].
pub struct RowReader<'a> {
    row: &'a dyn RowAccess,
    index: usize,
}

impl<'a> RowReader<'a> {
    pub fn new(row: &'a dyn RowAccess) -> Self {
        Self { row, index: 0 }
    }

    /// Read the next column into `field`: a SQL NULL becomes the explicit
    /// NULL state, never a sentinel value.
    pub fn field<T>(&mut self, ty: &SqlType<T>, field: &mut RecordField<T>) -> SqlResult<()> {
        let value = ty.nullable().read_opt(self.row, self.index)?;
        self.index += 1;
        field.set_opt(value);
        Ok(())
    }
}

/// SELECT all mapped columns of `R` from its table, in declaration order
/// (matching [`Record::load`]).
pub fn select_record<R: Record>() -> SqlResult<Select> {
    let info = record_info::<R>()?;
    let table = Table::new(info.table.clone())?;
    let mut select = Select::new();
    for field in &info.fields {
        select = select.column(table.col(field.name.clone())?);
    }
    Ok(select.from(table.source()))
}

/// INSERT built from a record's set fields; unset primary keys are omitted so
/// the database can generate them.
pub fn insert_record<R: Record>(record: &R) -> SqlResult<Insert> {
    let info = record_info::<R>()?;
    let table = Table::new(info.table.clone())?;
    let mut writer = RecordWriter::new(WriteMode::Insert);
    record.write_fields(&mut writer)?;
    let mut insert = Insert::new(table);
    insert.values = writer.values;
    Ok(insert)
}

/// UPDATE built from a record: set fields become the SET list, primary-key
/// fields become the WHERE condition.
pub fn update_record<R: Record>(record: &R) -> SqlResult<Update> {
    let info = record_info::<R>()?;
    let table = Table::new(info.table.clone())?;
    let mut writer = RecordWriter::new(WriteMode::Update);
    record.write_fields(&mut writer)?;
    let values = std::mem::take(&mut writer.values);
    let condition = writer.key_condition()?;
    let mut update = Update::new(table);
    update.set = values;
    Ok(update.and_where(condition))
}

/// DELETE built from a record's primary-key fields.
pub fn delete_record<R: Record>(record: &R) -> SqlResult<Delete> {
    let info = record_info::<R>()?;
    let table = Table::new(info.table.clone())?;
    let mut writer = RecordWriter::new(WriteMode::Key);
    record.write_fields(&mut writer)?;
    let condition = writer.key_condition()?;
    Ok(Delete::new(table).and_where(condition))
}

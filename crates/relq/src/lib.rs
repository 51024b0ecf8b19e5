//! # relq
//!
//! A dialect-aware, typed SQL query-building DSL.
//!
//! ## Features
//!
//! - **Expression trees**: statements are composed from typed AST nodes, then
//!   rendered to SQL text plus an ordered parameter list in one walk
//! - **Dialect pluggable**: a portable dialect plus PostgreSQL and Oracle,
//!   differing in placeholders, limit/offset strategy, quoting and type
//!   catalogs
//! - **Typed conversions**: every logical type is a codec (wire value ↔
//!   native value) with paired nullable/non-null variants
//! - **Safe defaults**: DELETE requires WHERE, UPDATE requires SET, the
//!   portable dialect refuses non-portable clauses
//! - **Record mapping**: declarative three-state field delegates drive
//!   INSERT/UPDATE/DELETE from plain value-holder structs
//!
//! Execution is out of scope: the crate produces [`RenderedQuery`] for a
//! statement executor and reads result rows back through the [`wire`]
//! boundary traits.
//!
//! ## Example
//!
//! ```ignore
//! use relq::{Expr, Select, SqlContext, Statement, Table, typed};
//!
//! let ctx = SqlContext::generic();
//! let users = Table::new("users")?;
//! let ty = &ctx.types().big_int.not_null;
//!
//! let query = Select::columns([Expr::column("id")?, Expr::column("name")?])
//!     .from(users.source())
//!     .and_where(Expr::eq(Expr::column("id")?, typed::bind(&42i64, ty)?))
//!     .to_query(&ctx)?;
//!
//! assert_eq!(query.sql, "SELECT id, name FROM users WHERE id = ?");
//! # Ok::<(), relq::SqlError>(())
//! ```

pub mod ctx;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod ident;
pub mod record;
pub mod render;
pub mod stmt;
pub mod types;
pub mod wire;

pub use ctx::{KeywordCase, RenderOptions, SqlContext};
pub use dialect::{Dialect, GenericDialect, OracleDialect, PgDialect};
pub use error::{SqlError, SqlResult};
pub use expr::case::{CaseBuilder, CaseWhen};
pub use expr::source::{Join, JoinKind, Source, Table};
pub use expr::typed::{self, Column, TypedExpr};
pub use expr::{ArithOp, BoolOp, Expr, Literal};
pub use ident::{Ident, IntoIdent};
pub use record::{
    FieldState, Record, RecordField, RecordInfo, RowReader, delete_record, insert_record,
    record_info, select_record, update_record,
};
pub use render::{Part, Render, RenderedQuery, SqlBuilder, render_item};
pub use stmt::{
    ColumnValueMap, Delete, Fetch, FetchCount, Insert, Nulls, OrderItem, Select, SelectItem,
    Statement, Union, Update,
};
pub use types::{Bound, Codec, SqlType, TypeCatalog, TypePack};
pub use wire::{ArrayCursor, LobHandle, MemoryRow, RowAccess, WireKind, WireValue};

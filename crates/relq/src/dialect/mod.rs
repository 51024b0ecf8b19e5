//! SQL dialects.
//!
//! A [`Dialect`] bundles everything that differs between database targets:
//! placeholder syntax, reserved words, the limit/offset strategy and the type
//! catalog. Statement and expression nodes never branch on a dialect name;
//! they go through this trait.

mod generic;
mod oracle;
mod pg;

pub use generic::GenericDialect;
pub use oracle::OracleDialect;
pub use pg::PgDialect;

use crate::error::{SqlError, SqlResult};
use crate::render::SqlBuilder;
use crate::stmt::Fetch;
use crate::types::TypeCatalog;

/// A concrete SQL-syntax and type-system variant.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Append the placeholder for the 1-based parameter `index`.
    fn push_placeholder(&self, out: &mut String, index: usize);

    /// Whether `word` must be quoted when used as a plain identifier.
    fn is_reserved(&self, word: &str) -> bool {
        let upper = word.to_ascii_uppercase();
        RESERVED_WORDS.binary_search(&upper.as_str()).is_ok()
    }

    /// The dialect's type catalog (base table view).
    fn types(&self) -> &TypeCatalog;

    /// Whether result-count / offset clauses exist in this dialect.
    fn supports_fetch(&self) -> bool {
        false
    }

    /// Whether INSERT can hand back generated values (RETURNING-like).
    fn supports_returning(&self) -> bool {
        false
    }

    /// Render the dialect's limit/offset clause.
    fn render_fetch(&self, _b: &mut SqlBuilder, _fetch: &Fetch) -> SqlResult<()> {
        Err(SqlError::unsupported("limit/offset", self.name()))
    }
}

/// Reserved words that force identifier quoting (sorted, uppercase).
///
/// A deliberately portable set: the union of the common core of the targeted
/// dialects, not any one vendor's full list.
pub(crate) static RESERVED_WORDS: &[&str] = &[
    "ALL",
    "AND",
    "ANY",
    "AS",
    "ASC",
    "BETWEEN",
    "BY",
    "CASE",
    "CHECK",
    "COLUMN",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "DEFAULT",
    "DELETE",
    "DESC",
    "DISTINCT",
    "DROP",
    "ELSE",
    "END",
    "EXCEPT",
    "EXISTS",
    "FETCH",
    "FOR",
    "FOREIGN",
    "FROM",
    "FULL",
    "GRANT",
    "GROUP",
    "HAVING",
    "IN",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTO",
    "IS",
    "JOIN",
    "LEFT",
    "LIKE",
    "LIMIT",
    "NOT",
    "NULL",
    "OFFSET",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "REFERENCES",
    "RIGHT",
    "SELECT",
    "SET",
    "TABLE",
    "THEN",
    "TO",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "USER",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
    "WITH",
];

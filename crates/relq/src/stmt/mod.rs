//! Statement holders: SELECT, INSERT, UPDATE, DELETE, UNION.
//!
//! Statements are plain structs with named fields in canonical clause order.
//! Builder methods can be called in any order; the rendered clause order is
//! always conventional SQL order.

mod delete;
mod insert;
mod select;
mod union;
mod update;

#[cfg(test)]
mod tests;

pub use delete::Delete;
pub use insert::Insert;
pub use select::{Select, SelectItem};
pub use union::Union;
pub use update::Update;

use crate::ctx::SqlContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::ident::{Ident, IntoIdent};
use crate::render::{Part, Render, RenderedQuery, SqlBuilder, render_item};
use crate::wire::WireValue;

/// A whole executable statement.
pub trait Statement: Render {
    /// Render to SQL text plus the ordered parameter list.
    fn to_query(&self, ctx: &SqlContext) -> SqlResult<RenderedQuery> {
        render_item(self, ctx)
    }

    /// The ordered parameter list alone. Derived from the same walk that
    /// renders the text, so it always matches the placeholder order.
    fn parameters(&self, ctx: &SqlContext) -> SqlResult<Vec<WireValue>> {
        Ok(self.to_query(ctx)?.params)
    }
}

/// Row-count expression of a fetch clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCount {
    Rows(u64),
    /// Percentage of the result set; Oracle only.
    Percent(u32),
}

/// Dialect-gated limit/offset clause. Constructed through the statement
/// builders, which consult the context's dialect before accepting it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetch {
    pub count: Option<FetchCount>,
    pub offset: Option<u64>,
    /// Keep ties with the last fetched row; Oracle only.
    pub with_ties: bool,
}

/// Verify the context's dialect supports limit/offset at all.
pub(crate) fn check_fetch(ctx: &SqlContext, operation: &str) -> SqlResult<()> {
    let dialect = ctx.dialect();
    if dialect.supports_fetch() {
        Ok(())
    } else {
        Err(SqlError::unsupported(operation, dialect.name()))
    }
}

/// NULL placement in an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: Expr,
    pub descending: bool,
    pub nulls: Option<Nulls>,
}

impl OrderItem {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            descending: false,
            nulls: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            descending: true,
            nulls: None,
        }
    }

    pub fn nulls(mut self, nulls: Nulls) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

impl Render for OrderItem {
    fn render(&self, b: &mut SqlBuilder, _part: Part) -> SqlResult<()> {
        self.expr.render(b, Part::OptionalParens)?;
        if self.descending {
            b.push_keyword("DESC");
        }
        if let Some(nulls) = self.nulls {
            b.push_keyword(match nulls {
                Nulls::First => "NULLS FIRST",
                Nulls::Last => "NULLS LAST",
            });
        }
        Ok(())
    }
}

/// An insertion-order-preserving column-to-value mapping, used by INSERT and
/// UPDATE. Setting a column that is already present replaces its value in
/// place; render order is insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValueMap {
    entries: Vec<(Ident, Expr)>,
}

impl ColumnValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl IntoIdent, value: Expr) -> SqlResult<&mut Self> {
        let column = column.into_ident()?;
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column, value)),
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &Expr)> {
        self.entries.iter().map(|(c, v)| (c, v))
    }
}

/// Merge a new condition into an optional WHERE tree with AND semantics.
pub(crate) fn merge_condition(slot: &mut Option<Expr>, condition: Expr) {
    *slot = Some(match slot.take() {
        None => condition,
        Some(Expr::Group {
            op: crate::expr::BoolOp::And,
            mut items,
        }) => {
            items.push(condition);
            Expr::and(items)
        }
        Some(existing) => Expr::and(vec![existing, condition]),
    });
}

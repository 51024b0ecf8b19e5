//! INSERT statements.

use super::{ColumnValueMap, Select, Statement};
use crate::ctx::SqlContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::expr::source::Table;
use crate::ident::{Ident, IntoIdent};
use crate::render::{Part, Render, SqlBuilder};

/// An INSERT statement: column/value pairs or an insert-from-select.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: Table,
    pub values: ColumnValueMap,
    /// Insert-from-select: explicit column list plus the source query.
    pub query: Option<(Vec<Ident>, Box<Select>)>,
    /// Generated values to hand back; dialect-gated (RETURNING).
    pub returning: Vec<Expr>,
}

impl Insert {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            values: ColumnValueMap::new(),
            query: None,
            returning: Vec::new(),
        }
    }

    /// Set one column's value expression. Replaces an earlier value for the
    /// same column; otherwise appends in call order.
    pub fn set(mut self, column: impl IntoIdent, value: Expr) -> SqlResult<Self> {
        self.values.set(column, value)?;
        Ok(self)
    }

    /// Insert the rows produced by a query instead of a VALUES tuple.
    pub fn from_select(
        mut self,
        columns: impl IntoIterator<Item = impl IntoIdent>,
        query: Select,
    ) -> SqlResult<Self> {
        let columns = columns
            .into_iter()
            .map(IntoIdent::into_ident)
            .collect::<SqlResult<Vec<_>>>()?;
        self.query = Some((columns, Box::new(query)));
        Ok(self)
    }

    /// Hand back a generated value. Refused by dialects without a
    /// RETURNING-like capability.
    pub fn returning(mut self, ctx: &SqlContext, expr: Expr) -> SqlResult<Self> {
        let dialect = ctx.dialect();
        if !dialect.supports_returning() {
            return Err(SqlError::unsupported("RETURNING", dialect.name()));
        }
        self.returning.push(expr);
        Ok(self)
    }

    fn render_body(&self, b: &mut SqlBuilder) -> SqlResult<()> {
        b.push_keyword("INSERT INTO");
        b.push_ident(&self.table.name);
        match (&self.query, self.values.is_empty()) {
            (Some(_), false) => {
                return Err(SqlError::usage(
                    "INSERT cannot combine VALUES with a source query",
                ));
            }
            (None, true) => {
                return Err(SqlError::usage("INSERT requires values or a source query"));
            }
            (Some((columns, query)), true) => {
                if !columns.is_empty() {
                    b.pad();
                    b.push_char('(');
                    for (i, column) in columns.iter().enumerate() {
                        if i > 0 {
                            b.push_raw(", ");
                        }
                        b.push_ident(column);
                    }
                    b.push_char(')');
                }
                b.clause_sep();
                query.render(b, Part::None)?;
            }
            (None, false) => {
                b.pad();
                b.push_char('(');
                for (i, (column, _)) in self.values.iter().enumerate() {
                    if i > 0 {
                        b.push_raw(", ");
                    }
                    b.push_ident(column);
                }
                b.push_char(')');
                b.clause_sep();
                b.push_keyword("VALUES");
                b.pad();
                b.push_char('(');
                for (i, (_, value)) in self.values.iter().enumerate() {
                    if i > 0 {
                        b.push_raw(", ");
                    }
                    value.render(b, Part::None)?;
                }
                b.push_char(')');
            }
        }
        if !self.returning.is_empty() {
            b.clause_sep();
            b.push_keyword("RETURNING");
            for (i, expr) in self.returning.iter().enumerate() {
                if i > 0 {
                    b.push_raw(",");
                }
                expr.render(b, Part::OptionalParens)?;
            }
        }
        Ok(())
    }
}

impl Render for Insert {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        b.wrapped(part == Part::RequiredParens, |b| self.render_body(b))
    }
}

impl Statement for Insert {}

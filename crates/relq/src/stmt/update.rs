//! UPDATE statements.

use super::{ColumnValueMap, Statement, merge_condition};
use crate::ctx::SqlContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::expr::source::Table;
use crate::ident::IntoIdent;
use crate::render::{Part, Render, SqlBuilder};

/// An UPDATE statement. The SET list renders in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: Table,
    pub set: ColumnValueMap,
    pub where_clause: Option<Expr>,
    /// Dialect-gated (RETURNING).
    pub returning: Vec<Expr>,
}

impl Update {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            set: ColumnValueMap::new(),
            where_clause: None,
            returning: Vec::new(),
        }
    }

    /// Set one column. Replaces an earlier assignment of the same column;
    /// otherwise appends in call order.
    pub fn set(mut self, column: impl IntoIdent, value: Expr) -> SqlResult<Self> {
        self.set.set(column, value)?;
        Ok(self)
    }

    /// AND a condition into the WHERE clause.
    pub fn and_where(mut self, condition: Expr) -> Self {
        merge_condition(&mut self.where_clause, condition);
        self
    }

    /// Hand back an updated value. Refused by dialects without a
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
        if self.set.is_empty() {
            return Err(SqlError::usage("UPDATE requires at least one SET column"));
        }
        b.push_keyword("UPDATE");
        b.push_ident(&self.table.name);
        b.clause_sep();
        b.push_keyword("SET");
        for (i, (column, value)) in self.set.iter().enumerate() {
            if i > 0 {
                b.push_raw(",");
            }
            b.push_ident(column);
            b.push("=");
            value.render(b, Part::OptionalParens)?;
        }
        if let Some(where_clause) = &self.where_clause {
            b.clause_sep();
            b.push_keyword("WHERE");
            where_clause.render(b, Part::None)?;
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

impl Render for Update {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        b.wrapped(part == Part::RequiredParens, |b| self.render_body(b))
    }
}

impl Statement for Update {}

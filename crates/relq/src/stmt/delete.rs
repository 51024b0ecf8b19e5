//! DELETE statements.

use super::{Statement, merge_condition};
use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::expr::source::Table;
use crate::render::{Part, Render, SqlBuilder};

/// A DELETE statement. Deleting without a WHERE clause requires the explicit
/// `all_rows` opt-in, so a forgotten condition cannot wipe a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: Table,
    pub where_clause: Option<Expr>,
    pub all_rows: bool,
}

impl Delete {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            where_clause: None,
            all_rows: false,
        }
    }

    /// AND a condition into the WHERE clause.
    pub fn and_where(mut self, condition: Expr) -> Self {
        merge_condition(&mut self.where_clause, condition);
        self
    }

    /// Explicitly allow deleting every row.
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    fn render_body(&self, b: &mut SqlBuilder) -> SqlResult<()> {
        if self.where_clause.is_none() && !self.all_rows {
            return Err(SqlError::usage(
                "DELETE without WHERE requires all_rows()",
            ));
        }
        b.push_keyword("DELETE FROM");
        b.push_ident(&self.table.name);
        if let Some(where_clause) = &self.where_clause {
            b.clause_sep();
            b.push_keyword("WHERE");
            where_clause.render(b, Part::None)?;
        }
        Ok(())
    }
}

impl Render for Delete {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        b.wrapped(part == Part::RequiredParens, |b| self.render_body(b))
    }
}

impl Statement for Delete {}

//! SELECT statements.

use super::{Fetch, FetchCount, OrderItem, Statement, check_fetch, merge_condition};
use crate::ctx::SqlContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::expr::source::Source;
use crate::ident::{Ident, IntoIdent};
use crate::render::{Part, Render, SqlBuilder};

/// One item of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<Ident>,
}

impl SelectItem {
    pub fn plain(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: impl IntoIdent) -> SqlResult<Self> {
        Ok(Self {
            expr,
            alias: Some(alias.into_ident()?),
        })
    }

    /// The name this item exposes to an enclosing query: the alias, or the
    /// column's own name for plain column references.
    pub fn output_name(&self) -> Option<&Ident> {
        if let Some(alias) = &self.alias {
            return Some(alias);
        }
        match &self.expr {
            Expr::Column { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl Render for SelectItem {
    fn render(&self, b: &mut SqlBuilder, _part: Part) -> SqlResult<()> {
        self.expr.render(b, Part::OptionalParens)?;
        if let Some(alias) = &self.alias {
            b.push_keyword("AS");
            b.push_ident(alias);
        }
        Ok(())
    }
}

/// A SELECT statement. Fields are in canonical clause order and render in that
/// order regardless of builder-call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    pub from: Option<Source>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderItem>,
    pub fetch: Option<Fetch>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    /// A multi-column SELECT over the given expressions.
    pub fn columns(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            items: exprs.into_iter().map(SelectItem::plain).collect(),
            ..Self::default()
        }
    }

    /// A single-column SELECT over one expression.
    pub fn value(expr: Expr) -> Self {
        Self::columns([expr])
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn column(mut self, expr: Expr) -> Self {
        self.items.push(SelectItem::plain(expr));
        self
    }

    pub fn column_as(mut self, expr: Expr, alias: impl IntoIdent) -> SqlResult<Self> {
        self.items.push(SelectItem::aliased(expr, alias)?);
        Ok(self)
    }

    pub fn from(mut self, source: Source) -> Self {
        self.from = Some(source);
        self
    }

    /// AND a condition into the WHERE clause.
    pub fn and_where(mut self, condition: Expr) -> Self {
        merge_condition(&mut self.where_clause, condition);
        self
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    /// AND a condition into the HAVING clause.
    pub fn and_having(mut self, condition: Expr) -> Self {
        merge_condition(&mut self.having, condition);
        self
    }

    pub fn order_by(mut self, item: OrderItem) -> Self {
        self.order_by.push(item);
        self
    }

    /// Cap the result count. Refused by dialects without a limit/offset
    /// strategy.
    pub fn limit(mut self, ctx: &SqlContext, rows: u64) -> SqlResult<Self> {
        check_fetch(ctx, "LIMIT")?;
        self.fetch.get_or_insert_with(Fetch::default).count = Some(FetchCount::Rows(rows));
        Ok(self)
    }

    /// Cap the result count as a percentage (Oracle).
    pub fn limit_percent(mut self, ctx: &SqlContext, percent: u32) -> SqlResult<Self> {
        check_fetch(ctx, "FETCH ... PERCENT")?;
        self.fetch.get_or_insert_with(Fetch::default).count = Some(FetchCount::Percent(percent));
        Ok(self)
    }

    /// Skip leading rows. Refused by dialects without a limit/offset strategy.
    pub fn offset(mut self, ctx: &SqlContext, rows: u64) -> SqlResult<Self> {
        check_fetch(ctx, "OFFSET")?;
        self.fetch.get_or_insert_with(Fetch::default).offset = Some(rows);
        Ok(self)
    }

    /// Keep ties with the last fetched row (Oracle).
    pub fn with_ties(mut self, ctx: &SqlContext) -> SqlResult<Self> {
        check_fetch(ctx, "FETCH ... WITH TIES")?;
        self.fetch.get_or_insert_with(Fetch::default).with_ties = true;
        Ok(self)
    }

    fn render_body(&self, b: &mut SqlBuilder) -> SqlResult<()> {
        if self.items.is_empty() {
            return Err(SqlError::usage("SELECT requires at least one column"));
        }
        b.push_keyword("SELECT");
        if self.distinct {
            b.push_keyword("DISTINCT");
        }
        let break_items = b.pretty() && self.items.iter().any(|i| i.expr.is_multiline());
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                b.push_raw(",");
                if break_items {
                    b.newline();
                } else {
                    b.pad();
                }
            }
            item.render(b, Part::None)?;
        }
        if let Some(from) = &self.from {
            b.clause_sep();
            b.push_keyword("FROM");
            from.render(b, Part::None)?;
        }
        if let Some(where_clause) = &self.where_clause {
            b.clause_sep();
            b.push_keyword("WHERE");
            if b.pretty() && where_clause.is_multiline() {
                b.indented(|b| {
                    b.newline();
                    where_clause.render(b, Part::None)
                })?;
            } else {
                where_clause.render(b, Part::None)?;
            }
        }
        if !self.group_by.is_empty() {
            b.clause_sep();
            b.push_keyword("GROUP BY");
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    b.push_raw(",");
                }
                expr.render(b, Part::OptionalParens)?;
            }
        }
        if let Some(having) = &self.having {
            b.clause_sep();
            b.push_keyword("HAVING");
            having.render(b, Part::None)?;
        }
        if !self.order_by.is_empty() {
            b.clause_sep();
            b.push_keyword("ORDER BY");
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    b.push_raw(",");
                }
                item.render(b, Part::None)?;
            }
        }
        if let Some(fetch) = &self.fetch {
            b.dialect().render_fetch(b, fetch)?;
        }
        Ok(())
    }
}

impl Render for Select {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        b.wrapped(part == Part::RequiredParens, |b| self.render_body(b))
    }
}

impl Statement for Select {}

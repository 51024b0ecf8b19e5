//! UNION statements.

use super::{Fetch, FetchCount, Select, Statement, check_fetch};
use crate::ctx::SqlContext;
use crate::error::{SqlError, SqlResult};
use crate::render::{Part, Render, SqlBuilder};

/// N selects joined by UNION or UNION ALL. Each branch renders in its own
/// parentheses; the optional fetch clause applies to the union as a whole and
/// renders after all branches.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub branches: Vec<Select>,
    pub all: bool,
    pub fetch: Option<Fetch>,
}

impl Union {
    pub fn new(first: Select) -> Self {
        Self {
            branches: vec![first],
            all: false,
            fetch: None,
        }
    }

    pub fn add(mut self, branch: Select) -> Self {
        self.branches.push(branch);
        self
    }

    /// Use UNION ALL (keep duplicates).
    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }

    /// Cap the union's result count; dialect-gated like the SELECT version.
    pub fn limit(mut self, ctx: &SqlContext, rows: u64) -> SqlResult<Self> {
        check_fetch(ctx, "LIMIT")?;
        self.fetch.get_or_insert_with(Fetch::default).count = Some(FetchCount::Rows(rows));
        Ok(self)
    }

    /// Skip leading rows of the union; dialect-gated.
    pub fn offset(mut self, ctx: &SqlContext, rows: u64) -> SqlResult<Self> {
        check_fetch(ctx, "OFFSET")?;
        self.fetch.get_or_insert_with(Fetch::default).offset = Some(rows);
        Ok(self)
    }

    fn render_body(&self, b: &mut SqlBuilder) -> SqlResult<()> {
        if self.branches.is_empty() {
            return Err(SqlError::usage("UNION requires at least one branch"));
        }
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                b.clause_sep();
                b.push_keyword(if self.all { "UNION ALL" } else { "UNION" });
                b.clause_sep();
            }
            branch.render(b, Part::RequiredParens)?;
        }
        if let Some(fetch) = &self.fetch {
            b.dialect().render_fetch(b, fetch)?;
        }
        Ok(())
    }
}

impl Render for Union {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        b.wrapped(part == Part::RequiredParens, |b| self.render_body(b))
    }
}

impl Statement for Union {}

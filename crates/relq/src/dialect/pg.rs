//! PostgreSQL dialect: `$n` placeholders, `LIMIT` / `OFFSET` lines.

use super::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::render::SqlBuilder;
use crate::stmt::{Fetch, FetchCount};
use crate::types::{Bound, TypeCatalog, pg};

#[derive(Debug, Clone, Copy, Default)]
pub struct PgDialect;

impl PgDialect {
    fn bind_count(&self, n: u64) -> SqlResult<Bound> {
        let n =
            i64::try_from(n).map_err(|_| SqlError::value(format!("row count {n} out of range")))?;
        self.types().big_int.not_null.bind(&n)
    }
}

impl Dialect for PgDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn push_placeholder(&self, out: &mut String, index: usize) {
        out.push('$');
        out.push_str(&index.to_string());
    }

    fn types(&self) -> &TypeCatalog {
        &pg::types().base
    }

    fn supports_fetch(&self) -> bool {
        true
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn render_fetch(&self, b: &mut SqlBuilder, fetch: &Fetch) -> SqlResult<()> {
        if fetch.with_ties {
            return Err(SqlError::unsupported("FETCH ... WITH TIES", self.name()));
        }
        if let Some(count) = &fetch.count {
            let bound = match count {
                FetchCount::Rows(n) => self.bind_count(*n)?,
                FetchCount::Percent(_) => {
                    return Err(SqlError::unsupported("percentage limit", self.name()));
                }
            };
            b.clause_sep();
            b.push_keyword("LIMIT");
            b.push_param(&bound);
        }
        if let Some(offset) = fetch.offset {
            let bound = self.bind_count(offset)?;
            b.clause_sep();
            b.push_keyword("OFFSET");
            b.push_param(&bound);
        }
        Ok(())
    }
}

//! Oracle dialect: `:n` placeholders, `OFFSET ... FETCH` row limiting.

use super::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::render::SqlBuilder;
use crate::stmt::{Fetch, FetchCount};
use crate::types::{Bound, TypeCatalog, oracle};

#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl OracleDialect {
    fn bind_count(&self, n: u64) -> SqlResult<Bound> {
        let n =
            i64::try_from(n).map_err(|_| SqlError::value(format!("row count {n} out of range")))?;
        self.types().big_int.not_null.bind(&n)
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn push_placeholder(&self, out: &mut String, index: usize) {
        out.push(':');
        out.push_str(&index.to_string());
    }

    fn types(&self) -> &TypeCatalog {
        &oracle::types().base
    }

    fn supports_fetch(&self) -> bool {
        true
    }

    fn render_fetch(&self, b: &mut SqlBuilder, fetch: &Fetch) -> SqlResult<()> {
        if let Some(offset) = fetch.offset {
            let bound = self.bind_count(offset)?;
            b.clause_sep();
            b.push_keyword("OFFSET");
            b.push_param(&bound);
            b.push_keyword("ROWS");
        }
        if let Some(count) = &fetch.count {
            b.clause_sep();
            b.push_keyword("FETCH");
            // FIRST when it stands alone, NEXT after an OFFSET.
            b.push_keyword(if fetch.offset.is_some() {
                "NEXT"
            } else {
                "FIRST"
            });
            match count {
                FetchCount::Rows(n) => {
                    let bound = self.bind_count(*n)?;
                    b.push_param(&bound);
                }
                FetchCount::Percent(p) => {
                    b.push(&p.to_string());
                    b.push_keyword("PERCENT");
                }
            }
            b.push_keyword("ROWS");
            b.push_keyword(if fetch.with_ties { "WITH TIES" } else { "ONLY" });
        }
        Ok(())
    }
}

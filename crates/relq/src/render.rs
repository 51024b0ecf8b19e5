//! SQL text rendering.
//!
//! [`SqlBuilder`] accumulates SQL text and the ordered parameter list in a
//! single walk over the AST, so placeholder order and parameter order cannot
//! diverge. Spacing, keyword casing, identifier quoting, bracket wrapping,
//! indentation and comment emission are all centralized here; nodes only
//! describe structure.

use crate::ctx::{KeywordCase, SqlContext};
use crate::error::SqlResult;
use crate::ident::Ident;
use crate::types::Bound;
use crate::wire::WireValue;
use serde::Serialize;

/// How a node should wrap itself when embedded as a sub-part of a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Part {
    /// Top-level or a position where brackets are never needed.
    #[default]
    None,
    /// Wrap in parentheses if the node is compound (precedence safety).
    OptionalParens,
    /// Always wrap in parentheses (subqueries, union branches).
    RequiredParens,
}

/// A node that can append its SQL text (and, recursively, its parameters) to a
/// builder.
pub trait Render {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()>;
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        (**self).render(b, part)
    }
}

impl<T: Render + ?Sized> Render for Box<T> {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        self.as_ref().render(b, part)
    }
}

/// Rendered SQL text plus its ordered parameter list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedQuery {
    pub sql: String,
    pub params: Vec<WireValue>,
}

/// The accumulating text buffer.
pub struct SqlBuilder<'a> {
    ctx: &'a SqlContext,
    sql: String,
    params: Vec<WireValue>,
    indent: usize,
}

impl<'a> SqlBuilder<'a> {
    pub fn new(ctx: &'a SqlContext) -> Self {
        Self {
            ctx,
            sql: String::new(),
            params: Vec::new(),
            indent: 0,
        }
    }

    pub fn ctx(&self) -> &'a SqlContext {
        self.ctx
    }

    /// The active dialect, borrowed from the context (not from the builder, so
    /// it can be held across mutating appends).
    pub fn dialect(&self) -> &'a dyn crate::dialect::Dialect {
        self.ctx.dialect()
    }

    pub fn pretty(&self) -> bool {
        self.ctx.options().pretty
    }

    pub fn comments_enabled(&self) -> bool {
        self.ctx.options().comments
    }

    fn at_boundary(&self) -> bool {
        match self.sql.chars().last() {
            None => true,
            Some(c) => c.is_whitespace() || c == '(',
        }
    }

    /// Insert a single space unless the buffer already ends at a boundary.
    pub fn pad(&mut self) {
        if !self.at_boundary() {
            self.sql.push(' ');
        }
    }

    /// Append text without spacing.
    pub fn push_raw(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn push_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Append text with a leading space when needed.
    pub fn push(&mut self, s: &str) {
        self.pad();
        self.sql.push_str(s);
    }

    /// Append a keyword with the configured casing.
    pub fn push_keyword(&mut self, keyword: &str) {
        self.pad();
        match self.ctx.options().keyword_case {
            KeywordCase::Upper => self.sql.push_str(keyword),
            KeywordCase::Lower => {
                for c in keyword.chars() {
                    self.sql.push(c.to_ascii_lowercase());
                }
            }
        }
    }

    /// Append an identifier, quoting per the active dialect.
    pub fn push_ident(&mut self, ident: &Ident) {
        self.pad();
        let dialect = self.ctx.dialect();
        ident.write_sql(&mut self.sql, dialect);
    }

    /// Append a placeholder and record the bound parameter. The placeholder
    /// index is the parameter's 1-based position in the collected list.
    pub fn push_param(&mut self, bound: &Bound) {
        self.pad();
        self.params.push(bound.value.clone());
        let index = self.params.len();
        self.ctx.dialect().push_placeholder(&mut self.sql, index);
        if self.comments_enabled() {
            let text = format!("{}: {}", bound.wire_name, bound.preview);
            self.push_comment(&text);
        }
    }

    /// Append a block comment when the render target allows comments.
    pub fn push_comment(&mut self, text: &str) {
        if !self.comments_enabled() {
            return;
        }
        self.pad();
        self.sql.push_str("/* ");
        // A literal `*/` inside the text would terminate the comment early.
        self.sql.push_str(&text.replace("*/", "* /"));
        self.sql.push_str(" */");
    }

    /// Separator between statement clauses: a fresh indented line in pretty
    /// mode, a single space otherwise.
    pub fn clause_sep(&mut self) {
        if self.pretty() {
            self.newline();
        } else {
            self.pad();
        }
    }

    /// Break onto a fresh line at the current indent (pretty mode only).
    pub fn newline(&mut self) {
        if !self.pretty() {
            self.pad();
            return;
        }
        if !self.sql.is_empty() {
            self.sql.push('\n');
        }
        for _ in 0..self.indent {
            self.sql.push(' ');
        }
    }

    /// Run `f` with the indent increased one step.
    pub fn indented<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.indent += 2;
        let result = f(self);
        self.indent -= 2;
        result
    }

    /// Run `f` inside parentheses when `wrap` is set.
    pub fn wrapped(
        &mut self,
        wrap: bool,
        f: impl FnOnce(&mut Self) -> SqlResult<()>,
    ) -> SqlResult<()> {
        if wrap {
            self.pad();
            self.sql.push('(');
            f(self)?;
            self.sql.push(')');
            Ok(())
        } else {
            f(self)
        }
    }

    /// Current parameter count (1-based index of the next placeholder minus one).
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn finish(self) -> RenderedQuery {
        tracing::debug!(
            target: "relq::render",
            dialect = self.ctx.dialect().name(),
            params = self.params.len(),
            sql = %truncate_log(&self.sql),
            "rendered statement"
        );
        RenderedQuery {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Truncate long SQL for log output.
fn truncate_log(sql: &str) -> String {
    const CAP: usize = 200;
    if sql.chars().count() <= CAP {
        return sql.to_string();
    }
    let cut: String = sql.chars().take(CAP).collect();
    format!("{cut}...")
}

/// Render any AST node into SQL text plus its ordered parameter list.
///
/// Works for whole statements and for standalone fragments alike, which makes
/// it useful for inspecting one expression in isolation.
pub fn render_item<R: Render + ?Sized>(item: &R, ctx: &SqlContext) -> SqlResult<RenderedQuery> {
    let mut b = SqlBuilder::new(ctx);
    item.render(&mut b, Part::None)?;
    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::RenderOptions;

    struct Fragment;

    impl Render for Fragment {
        fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
            b.wrapped(part != Part::None, |b| {
                b.push_keyword("SELECT");
                b.push("1");
                Ok(())
            })
        }
    }

    #[test]
    fn spacing_is_single_and_clean() {
        let ctx = SqlContext::generic();
        let mut b = SqlBuilder::new(&ctx);
        b.push_keyword("SELECT");
        b.push_keyword("DISTINCT");
        b.push("a");
        b.push_raw(",");
        b.push("b");
        assert_eq!(b.finish().sql, "SELECT DISTINCT a, b");
    }

    #[test]
    fn no_space_after_open_paren() {
        let ctx = SqlContext::generic();
        let mut b = SqlBuilder::new(&ctx);
        b.push("f");
        b.push_raw("(");
        b.push("x");
        b.push_raw(")");
        assert_eq!(b.finish().sql, "f(x)");
    }

    #[test]
    fn keyword_lowercasing() {
        let ctx = SqlContext::generic().with_options(RenderOptions {
            keyword_case: KeywordCase::Lower,
            ..RenderOptions::default()
        });
        let rendered = render_item(&Fragment, &ctx).unwrap();
        assert_eq!(rendered.sql, "select 1");
    }

    #[test]
    fn comments_only_when_enabled() {
        let ctx = SqlContext::generic();
        let mut b = SqlBuilder::new(&ctx);
        b.push("x");
        b.push_comment("hidden");
        assert_eq!(b.finish().sql, "x");

        let ctx = SqlContext::generic().with_options(RenderOptions::default().with_comments());
        let mut b = SqlBuilder::new(&ctx);
        b.push("x");
        b.push_comment("shown */ end");
        assert_eq!(b.finish().sql, "x /* shown * / end */");
    }

    #[test]
    fn required_parens_wrap() {
        let ctx = SqlContext::generic();
        let mut b = SqlBuilder::new(&ctx);
        Fragment.render(&mut b, Part::RequiredParens).unwrap();
        assert_eq!(b.finish().sql, "(SELECT 1)");
    }
}

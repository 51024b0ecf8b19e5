//! The expression AST.
//!
//! [`Expr`] covers everything that can appear inside a clause: columns, bound
//! parameters, literals, boolean groups, predicates, CASE, functions,
//! arithmetic and subqueries. Nodes know how to render themselves through the
//! [`Render`] contract; the bracket decision for an embedded node is driven by
//! the [`Part`] the parent passes down.

pub mod case;
pub mod source;
pub mod typed;

#[cfg(test)]
mod tests;

use crate::error::SqlResult;
use crate::ident::{Ident, IntoIdent};
use crate::render::{Part, Render, SqlBuilder};
use crate::stmt::Select;
use crate::types::Bound;

/// Boolean group operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Two-operand arithmetic / concatenation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat,
}

impl ArithOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Concat => "||",
        }
    }
}

/// An inline literal. Parameters are almost always the better choice; literals
/// exist for constants that are part of the statement shape itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

/// One `WHEN ... THEN ...` branch of a CASE expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub when: Expr,
    pub then: Expr,
}

/// Function names that render with a space before their argument list
/// (`ANY (...)`) instead of tight parens (`COUNT(...)`).
static SPACED_FUNCTIONS: &[&str] = &["ALL", "ANY", "SOME"];

/// An SQL expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column reference, optionally qualified by its owner's reference face.
    Column {
        qualifier: Option<Ident>,
        name: Ident,
    },
    /// A bound parameter.
    Param(Bound),
    /// An inline literal.
    Literal(Literal),
    /// A typed NULL literal; the wire name only surfaces in debug comments.
    Null { wire_name: String },
    /// N-ary AND/OR of boolean sub-expressions.
    Group { op: BoolOp, items: Vec<Expr> },
    /// Binary comparison.
    Compare {
        lhs: Box<Expr>,
        op: &'static str,
        rhs: Box<Expr>,
    },
    /// Range test; `negated` renders `NOT BETWEEN` in place.
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    /// List membership test; `negated` renders `NOT IN` in place.
    InList {
        expr: Box<Expr>,
        items: Vec<Expr>,
        negated: bool,
    },
    /// Subquery membership test.
    InSelect {
        expr: Box<Expr>,
        query: Box<Select>,
        negated: bool,
    },
    /// NULL test; `negated` renders `IS NOT NULL` in place.
    NullTest { expr: Box<Expr>, negated: bool },
    /// Subquery existence test.
    Exists { query: Box<Select>, negated: bool },
    /// Logical negation of an arbitrary boolean expression.
    Not(Box<Expr>),
    /// CASE WHEN ... THEN ... [ELSE ...] END.
    Case {
        branches: Vec<CaseBranch>,
        otherwise: Option<Box<Expr>>,
    },
    /// Named function call.
    Func { name: String, args: Vec<Expr> },
    /// Two-operand arithmetic or concatenation.
    Arith {
        lhs: Box<Expr>,
        op: ArithOp,
        rhs: Box<Expr>,
    },
    /// A scalar subquery; always parenthesized.
    Subquery(Box<Select>),
    /// Verbatim SQL fragment without parameters.
    Raw(String),
    /// Constant true predicate.
    True,
    /// Constant false predicate.
    False,
    /// An expression with attached leading/trailing comments.
    Commented {
        leading: Option<String>,
        trailing: Option<String>,
        inner: Box<Expr>,
    },
}

impl Expr {
    /// A column reference; dotted names qualify (`users.id`).
    pub fn column(name: impl IntoIdent) -> SqlResult<Self> {
        Ok(Self::Column {
            qualifier: None,
            name: name.into_ident()?,
        })
    }

    pub(crate) fn qualified_column(qualifier: Ident, name: Ident) -> Self {
        Self::Column {
            qualifier: Some(qualifier),
            name,
        }
    }

    pub fn int(value: i64) -> Self {
        Self::Literal(Literal::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::Literal(Literal::Float(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Literal(Literal::Text(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    /// AND group; flattens nothing, folds nothing.
    pub fn and(items: Vec<Expr>) -> Self {
        Self::Group {
            op: BoolOp::And,
            items,
        }
    }

    /// OR group.
    pub fn or(items: Vec<Expr>) -> Self {
        Self::Group {
            op: BoolOp::Or,
            items,
        }
    }

    pub fn not(expr: Expr) -> Self {
        Self::Not(Box::new(expr))
    }

    fn compare(lhs: Expr, op: &'static str, rhs: Expr) -> Self {
        Self::Compare {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::compare(lhs, "=", rhs)
    }

    pub fn ne(lhs: Expr, rhs: Expr) -> Self {
        Self::compare(lhs, "<>", rhs)
    }

    pub fn gt(lhs: Expr, rhs: Expr) -> Self {
        Self::compare(lhs, ">", rhs)
    }

    pub fn gte(lhs: Expr, rhs: Expr) -> Self {
        Self::compare(lhs, ">=", rhs)
    }

    pub fn lt(lhs: Expr, rhs: Expr) -> Self {
        Self::compare(lhs, "<", rhs)
    }

    pub fn lte(lhs: Expr, rhs: Expr) -> Self {
        Self::compare(lhs, "<=", rhs)
    }

    pub fn like(lhs: Expr, rhs: Expr) -> Self {
        Self::compare(lhs, "LIKE", rhs)
    }

    pub fn not_like(lhs: Expr, rhs: Expr) -> Self {
        Self::compare(lhs, "NOT LIKE", rhs)
    }

    pub fn between(expr: Expr, low: Expr, high: Expr) -> Self {
        Self::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
            negated: false,
        }
    }

    pub fn not_between(expr: Expr, low: Expr, high: Expr) -> Self {
        Self::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
            negated: true,
        }
    }

    /// `expr IN (items...)`. An empty list folds to the constant false
    /// predicate, so the statement stays valid.
    pub fn in_list(expr: Expr, items: Vec<Expr>) -> Self {
        if items.is_empty() {
            return Self::False;
        }
        Self::InList {
            expr: Box::new(expr),
            items,
            negated: false,
        }
    }

    /// `expr NOT IN (items...)`. An empty list folds to the constant true
    /// predicate.
    pub fn not_in(expr: Expr, items: Vec<Expr>) -> Self {
        if items.is_empty() {
            return Self::True;
        }
        Self::InList {
            expr: Box::new(expr),
            items,
            negated: true,
        }
    }

    pub fn in_select(expr: Expr, query: Select) -> Self {
        Self::InSelect {
            expr: Box::new(expr),
            query: Box::new(query),
            negated: false,
        }
    }

    pub fn not_in_select(expr: Expr, query: Select) -> Self {
        Self::InSelect {
            expr: Box::new(expr),
            query: Box::new(query),
            negated: true,
        }
    }

    pub fn is_null(expr: Expr) -> Self {
        Self::NullTest {
            expr: Box::new(expr),
            negated: false,
        }
    }

    pub fn is_not_null(expr: Expr) -> Self {
        Self::NullTest {
            expr: Box::new(expr),
            negated: true,
        }
    }

    pub fn exists(query: Select) -> Self {
        Self::Exists {
            query: Box::new(query),
            negated: false,
        }
    }

    pub fn not_exists(query: Select) -> Self {
        Self::Exists {
            query: Box::new(query),
            negated: true,
        }
    }

    /// Named function call: `NAME(arg, ...)`; quantifier names (`ALL`, `ANY`,
    /// `SOME`) render with a space before the argument list.
    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Func {
            name: name.into(),
            args,
        }
    }

    fn arith(lhs: Expr, op: ArithOp, rhs: Expr) -> Self {
        Self::Arith {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(lhs, ArithOp::Add, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(lhs, ArithOp::Sub, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(lhs, ArithOp::Mul, rhs)
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(lhs, ArithOp::Div, rhs)
    }

    pub fn concat(lhs: Expr, rhs: Expr) -> Self {
        Self::arith(lhs, ArithOp::Concat, rhs)
    }

    pub fn subquery(query: Select) -> Self {
        Self::Subquery(Box::new(query))
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Attach a leading comment; emitted only when the render target allows
    /// comments.
    pub fn commented(self, leading: impl Into<String>) -> Self {
        match self {
            Self::Commented {
                trailing, inner, ..
            } => Self::Commented {
                leading: Some(leading.into()),
                trailing,
                inner,
            },
            other => Self::Commented {
                leading: Some(leading.into()),
                trailing: None,
                inner: Box::new(other),
            },
        }
    }

    /// Attach a trailing comment.
    pub fn with_trailing_comment(self, trailing: impl Into<String>) -> Self {
        match self {
            Self::Commented { leading, inner, .. } => Self::Commented {
                leading,
                trailing: Some(trailing.into()),
                inner,
            },
            other => Self::Commented {
                leading: None,
                trailing: Some(trailing.into()),
                inner: Box::new(other),
            },
        }
    }

    /// Hint for the renderer: break this node over several lines in pretty
    /// mode.
    pub fn is_multiline(&self) -> bool {
        match self {
            Self::Group { items, .. } => items.len() > 2 || items.iter().any(Expr::is_multiline),
            Self::Case { .. } => true,
            Self::Subquery(_) | Self::InSelect { .. } | Self::Exists { .. } => true,
            Self::Commented { inner, .. } => inner.is_multiline(),
            _ => false,
        }
    }

    /// Whether this node must parenthesize itself under
    /// [`Part::OptionalParens`] to keep precedence.
    fn compound(&self) -> bool {
        match self {
            Self::Group { items, .. } => items.len() > 1,
            Self::Arith { .. } => true,
            Self::Commented { inner, .. } => inner.compound(),
            _ => false,
        }
    }
}

impl Render for Expr {
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        let wrap = match part {
            Part::None => false,
            Part::OptionalParens => self.compound(),
            // A subquery brings its own parens.
            Part::RequiredParens => !matches!(self, Self::Subquery(_)),
        };
        b.wrapped(wrap, |b| self.render_bare(b))
    }
}

impl Expr {
    fn render_bare(&self, b: &mut SqlBuilder) -> SqlResult<()> {
        match self {
            Self::Column { qualifier, name } => {
                b.pad();
                match qualifier {
                    Some(q) => {
                        let mut full = q.clone();
                        full.parts.extend(name.parts.iter().cloned());
                        b.push_ident(&full);
                    }
                    None => b.push_ident(name),
                }
                Ok(())
            }
            Self::Param(bound) => {
                b.push_param(bound);
                Ok(())
            }
            Self::Literal(lit) => {
                match lit {
                    Literal::Int(v) => b.push(&v.to_string()),
                    Literal::Float(v) => b.push(&v.to_string()),
                    Literal::Text(v) => {
                        b.pad();
                        b.push_char('\'');
                        for c in v.chars() {
                            if c == '\'' {
                                b.push_raw("''");
                            } else {
                                b.push_char(c);
                            }
                        }
                        b.push_char('\'');
                    }
                    Literal::Bool(v) => b.push_keyword(if *v { "TRUE" } else { "FALSE" }),
                }
                Ok(())
            }
            Self::Null { wire_name } => {
                b.push_keyword("NULL");
                b.push_comment(wire_name);
                Ok(())
            }
            Self::Group { op, items } => {
                if items.is_empty() {
                    return match op {
                        BoolOp::And => Expr::True.render_bare(b),
                        BoolOp::Or => Expr::False.render_bare(b),
                    };
                }
                if items.len() == 1 {
                    return items[0].render(b, Part::None);
                }
                let break_lines = b.pretty() && self.is_multiline();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        if break_lines {
                            b.newline();
                        }
                        b.push_keyword(op.keyword());
                    }
                    item.render(b, Part::OptionalParens)?;
                }
                Ok(())
            }
            Self::Compare { lhs, op, rhs } => {
                lhs.render(b, Part::OptionalParens)?;
                b.push(op);
                rhs.render(b, Part::OptionalParens)
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                expr.render(b, Part::OptionalParens)?;
                b.push_keyword(if *negated { "NOT BETWEEN" } else { "BETWEEN" });
                low.render(b, Part::OptionalParens)?;
                b.push_keyword("AND");
                high.render(b, Part::OptionalParens)
            }
            Self::InList {
                expr,
                items,
                negated,
            } => {
                expr.render(b, Part::OptionalParens)?;
                b.push_keyword(if *negated { "NOT IN" } else { "IN" });
                b.pad();
                b.push_char('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        b.push_raw(", ");
                    }
                    item.render(b, Part::None)?;
                }
                b.push_char(')');
                Ok(())
            }
            Self::InSelect {
                expr,
                query,
                negated,
            } => {
                expr.render(b, Part::OptionalParens)?;
                b.push_keyword(if *negated { "NOT IN" } else { "IN" });
                query.render(b, Part::RequiredParens)
            }
            Self::NullTest { expr, negated } => {
                expr.render(b, Part::OptionalParens)?;
                b.push_keyword(if *negated { "IS NOT NULL" } else { "IS NULL" });
                Ok(())
            }
            Self::Exists { query, negated } => {
                if *negated {
                    b.push_keyword("NOT");
                }
                b.push_keyword("EXISTS");
                query.render(b, Part::RequiredParens)
            }
            Self::Not(inner) => {
                b.push_keyword("NOT");
                inner.render(b, Part::OptionalParens)
            }
            Self::Case {
                branches,
                otherwise,
            } => {
                let pretty = b.pretty();
                b.push_keyword("CASE");
                b.indented(|b| -> SqlResult<()> {
                    for branch in branches {
                        if pretty {
                            b.newline();
                        }
                        b.push_keyword("WHEN");
                        branch.when.render(b, Part::None)?;
                        b.push_keyword("THEN");
                        branch.then.render(b, Part::None)?;
                    }
                    if let Some(otherwise) = otherwise {
                        if pretty {
                            b.newline();
                        }
                        b.push_keyword("ELSE");
                        otherwise.render(b, Part::None)?;
                    }
                    Ok(())
                })?;
                if pretty {
                    b.newline();
                }
                b.push_keyword("END");
                Ok(())
            }
            Self::Func { name, args } => {
                b.push(name);
                if SPACED_FUNCTIONS.contains(&name.to_ascii_uppercase().as_str()) {
                    b.push_raw(" (");
                } else {
                    b.push_raw("(");
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        b.push_raw(", ");
                    }
                    arg.render(b, Part::None)?;
                }
                b.push_char(')');
                Ok(())
            }
            Self::Arith { lhs, op, rhs } => {
                lhs.render(b, Part::OptionalParens)?;
                b.push(op.symbol());
                rhs.render(b, Part::OptionalParens)
            }
            Self::Subquery(query) => query.render(b, Part::RequiredParens),
            Self::Raw(sql) => {
                b.push(sql);
                Ok(())
            }
            Self::True => {
                b.push("1=1");
                Ok(())
            }
            Self::False => {
                b.push("1=0");
                Ok(())
            }
            Self::Commented {
                leading,
                trailing,
                inner,
            } => {
                if let Some(text) = leading {
                    b.push_comment(text);
                }
                inner.render_bare(b)?;
                if let Some(text) = trailing {
                    b.push_comment(text);
                }
                Ok(())
            }
        }
    }
}

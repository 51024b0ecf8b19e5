//! FROM-position items: tables, subqueries, joins and their aliases.
//!
//! A source has two render faces. The definition face (`users AS u`,
//! `(SELECT ...) AS t`) appears once, in FROM position; the reference face (the
//! alias or table name) is what qualified column references are built from.
//! Column qualifiers are resolved from the reference face at construction time,
//! so an aliased source hands out `alias.column` references automatically.

use super::Expr;
use crate::error::{SqlError, SqlResult};
use crate::ident::{Ident, IntoIdent};
use crate::render::{Part, Render, SqlBuilder};
use crate::stmt::Select;

/// A physical table, optionally with its declared column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: Ident,
    pub columns: Vec<Ident>,
}

impl Table {
    pub fn new(name: impl IntoIdent) -> SqlResult<Self> {
        Ok(Self {
            name: name.into_ident()?,
            columns: Vec::new(),
        })
    }

    /// A table with declared columns; joins concatenate these lists.
    pub fn with_columns(
        name: impl IntoIdent,
        columns: impl IntoIterator<Item = impl IntoIdent>,
    ) -> SqlResult<Self> {
        let columns = columns
            .into_iter()
            .map(IntoIdent::into_ident)
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(Self {
            name: name.into_ident()?,
            columns,
        })
    }

    /// A column reference qualified by this table's name.
    pub fn col(&self, name: impl IntoIdent) -> SqlResult<Expr> {
        Ok(Expr::qualified_column(self.name.clone(), name.into_ident()?))
    }

    pub fn source(self) -> Source {
        Source::Table(self)
    }
}

/// Join operation keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// A join of two sources. The column list is the concatenation of both sides,
/// left first, computed once at construction and never deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub left: Source,
    pub right: Source,
    pub on: Option<Expr>,
    pub columns: Vec<Ident>,
}

impl Join {
    pub fn new(kind: JoinKind, left: Source, right: Source, on: Option<Expr>) -> Self {
        let mut columns = left.columns();
        columns.extend(right.columns());
        Self {
            kind,
            left,
            right,
            on,
            columns,
        }
    }
}

/// A FROM-position item.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(Table),
    /// A subquery; FROM position requires an alias.
    Query { query: Box<Select>, alias: Ident },
    Join(Box<Join>),
    /// An aliased source: definition face `inner AS alias`, reference face
    /// `alias`.
    Aliased { inner: Box<Source>, alias: Ident },
}

impl Source {
    /// A subquery source; the alias is validated and fixed here, not per
    /// render.
    pub fn query(query: Select, alias: impl IntoIdent) -> SqlResult<Self> {
        Ok(Self::Query {
            query: Box::new(query),
            alias: alias.into_ident()?,
        })
    }

    /// Wrap this source under an alias.
    pub fn alias(self, alias: impl IntoIdent) -> SqlResult<Self> {
        Ok(Self::Aliased {
            inner: Box::new(self),
            alias: alias.into_ident()?,
        })
    }

    pub fn join(self, kind: JoinKind, right: Source, on: Option<Expr>) -> Self {
        Self::Join(Box::new(Join::new(kind, self, right, on)))
    }

    pub fn inner_join(self, right: Source, on: Expr) -> Self {
        self.join(JoinKind::Inner, right, Some(on))
    }

    pub fn left_join(self, right: Source, on: Expr) -> Self {
        self.join(JoinKind::Left, right, Some(on))
    }

    pub fn right_join(self, right: Source, on: Expr) -> Self {
        self.join(JoinKind::Right, right, Some(on))
    }

    pub fn full_join(self, right: Source, on: Expr) -> Self {
        self.join(JoinKind::Full, right, Some(on))
    }

    /// The reference face: what qualified column references use. Joins have no
    /// single reference face.
    pub fn reference(&self) -> Option<&Ident> {
        match self {
            Self::Table(table) => Some(&table.name),
            Self::Query { alias, .. } => Some(alias),
            Self::Join(_) => None,
            Self::Aliased { alias, .. } => Some(alias),
        }
    }

    /// Declared column names: a table's own list, or for joins the left list
    /// followed by the right list.
    pub fn columns(&self) -> Vec<Ident> {
        match self {
            Self::Table(table) => table.columns.clone(),
            Self::Query { query, .. } => query
                .items
                .iter()
                .filter_map(|item| item.output_name().cloned())
                .collect(),
            Self::Join(join) => join.columns.clone(),
            Self::Aliased { inner, .. } => inner.columns(),
        }
    }

    /// A column reference qualified by this source's reference face.
    pub fn col(&self, name: impl IntoIdent) -> SqlResult<Expr> {
        let name = name.into_ident()?;
        match self.reference() {
            Some(qualifier) => Ok(Expr::qualified_column(qualifier.clone(), name)),
            None => Err(SqlError::usage(
                "a join has no single name to qualify columns with; \
                 qualify through one of its sides",
            )),
        }
    }
}

impl Render for Source {
    /// Renders the definition face.
    fn render(&self, b: &mut SqlBuilder, part: Part) -> SqlResult<()> {
        match self {
            Self::Table(table) => b.wrapped(part == Part::RequiredParens, |b| {
                b.push_ident(&table.name);
                Ok(())
            }),
            Self::Query { query, alias } => {
                query.render(b, Part::RequiredParens)?;
                b.push_keyword("AS");
                b.push_ident(alias);
                Ok(())
            }
            Self::Join(join) => b.wrapped(part == Part::RequiredParens, |b| {
                join.left.render(b, Part::None)?;
                b.push_keyword(join.kind.keyword());
                join.right.render(b, Part::None)?;
                if let Some(on) = &join.on {
                    b.push_keyword("ON");
                    on.render(b, Part::None)?;
                }
                Ok(())
            }),
            Self::Aliased { inner, alias } => {
                // A nested join under an alias needs its own brackets.
                let inner_part = match inner.as_ref() {
                    Source::Join(_) => Part::RequiredParens,
                    _ => Part::None,
                };
                inner.render(b, inner_part)?;
                b.push_keyword("AS");
                b.push_ident(alias);
                Ok(())
            }
        }
    }
}

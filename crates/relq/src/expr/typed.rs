//! The typed facade over the untyped expression AST.
//!
//! A [`Column`] pairs a column reference with its [`SqlType`], so comparisons
//! bind parameters with the right wire conversion and result rows read back
//! through the right reader. [`TypedExpr`] carries a result type alongside an
//! arbitrary expression (CASE builders produce these).

use super::Expr;
use super::source::Source;
use crate::error::{SqlError, SqlResult};
use crate::ident::{Ident, IntoIdent};
use crate::stmt::OrderItem;
use crate::types::SqlType;
use crate::wire::RowAccess;

/// An expression with a known result type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr<T> {
    pub expr: Expr,
    pub ty: SqlType<T>,
}

impl<T> TypedExpr<T> {
    pub fn new(expr: Expr, ty: SqlType<T>) -> Self {
        Self { expr, ty }
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }

    /// Read this expression's value from the row position it was selected
    /// into.
    pub fn read_opt(&self, row: &dyn RowAccess, index: usize) -> SqlResult<Option<T>> {
        self.ty.read_opt(row, index)
    }
}

/// Bind a native value as a typed parameter expression.
pub fn bind<T>(value: &T, ty: &SqlType<T>) -> SqlResult<Expr> {
    Ok(Expr::Param(ty.bind(value)?))
}

/// Bind an optional native value; `None` binds a typed NULL parameter.
pub fn bind_opt<T>(value: Option<&T>, ty: &SqlType<T>) -> SqlResult<Expr> {
    Ok(Expr::Param(ty.bind_opt(value)?))
}

/// A typed NULL literal (renders as the NULL keyword, not a placeholder).
pub fn null<T>(ty: &SqlType<T>) -> Expr {
    Expr::Null {
        wire_name: ty.wire_name().to_string(),
    }
}

/// A typed column: name, optional qualifier, and the column's data type.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<T> {
    pub name: Ident,
    pub qualifier: Option<Ident>,
    pub ty: SqlType<T>,
}

impl<T> Column<T> {
    pub fn new(name: impl IntoIdent, ty: &SqlType<T>) -> SqlResult<Self> {
        Ok(Self {
            name: name.into_ident()?,
            qualifier: None,
            ty: ty.clone(),
        })
    }

    /// A column qualified by the reference face of `source`.
    pub fn in_source(source: &Source, name: impl IntoIdent, ty: &SqlType<T>) -> SqlResult<Self> {
        let qualifier = source
            .reference()
            .cloned()
            .ok_or_else(|| SqlError::usage("cannot qualify a column by a bare join"))?;
        Ok(Self {
            name: name.into_ident()?,
            qualifier: Some(qualifier),
            ty: ty.clone(),
        })
    }

    /// The column as a bare (untyped) expression.
    pub fn expr(&self) -> Expr {
        match &self.qualifier {
            Some(q) => Expr::qualified_column(q.clone(), self.name.clone()),
            None => Expr::Column {
                qualifier: None,
                name: self.name.clone(),
            },
        }
    }

    /// The column as a typed expression.
    pub fn typed(&self) -> TypedExpr<T> {
        TypedExpr::new(self.expr(), self.ty.clone())
    }

    /// Bind a native value with this column's type (for SET/VALUES maps and
    /// hand-built comparisons).
    pub fn assign(&self, value: &T) -> SqlResult<Expr> {
        bind(value, &self.ty)
    }

    /// Bind an optional native value; requires the nullable variant for `None`.
    pub fn assign_opt(&self, value: Option<&T>) -> SqlResult<Expr> {
        bind_opt(value, &self.ty)
    }

    pub fn eq(&self, value: &T) -> SqlResult<Expr> {
        Ok(Expr::eq(self.expr(), self.assign(value)?))
    }

    pub fn ne(&self, value: &T) -> SqlResult<Expr> {
        Ok(Expr::ne(self.expr(), self.assign(value)?))
    }

    pub fn gt(&self, value: &T) -> SqlResult<Expr> {
        Ok(Expr::gt(self.expr(), self.assign(value)?))
    }

    pub fn gte(&self, value: &T) -> SqlResult<Expr> {
        Ok(Expr::gte(self.expr(), self.assign(value)?))
    }

    pub fn lt(&self, value: &T) -> SqlResult<Expr> {
        Ok(Expr::lt(self.expr(), self.assign(value)?))
    }

    pub fn lte(&self, value: &T) -> SqlResult<Expr> {
        Ok(Expr::lte(self.expr(), self.assign(value)?))
    }

    pub fn between(&self, low: &T, high: &T) -> SqlResult<Expr> {
        Ok(Expr::between(
            self.expr(),
            self.assign(low)?,
            self.assign(high)?,
        ))
    }

    pub fn not_between(&self, low: &T, high: &T) -> SqlResult<Expr> {
        Ok(Expr::not_between(
            self.expr(),
            self.assign(low)?,
            self.assign(high)?,
        ))
    }

    /// `column IN (values...)`; an empty slice folds to the constant false
    /// predicate.
    pub fn in_values(&self, values: &[T]) -> SqlResult<Expr> {
        let items = values
            .iter()
            .map(|v| self.assign(v))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(Expr::in_list(self.expr(), items))
    }

    /// `column NOT IN (values...)`; an empty slice folds to the constant true
    /// predicate.
    pub fn not_in_values(&self, values: &[T]) -> SqlResult<Expr> {
        let items = values
            .iter()
            .map(|v| self.assign(v))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(Expr::not_in(self.expr(), items))
    }

    pub fn is_null(&self) -> Expr {
        Expr::is_null(self.expr())
    }

    pub fn is_not_null(&self) -> Expr {
        Expr::is_not_null(self.expr())
    }

    pub fn asc(&self) -> OrderItem {
        OrderItem::asc(self.expr())
    }

    pub fn desc(&self) -> OrderItem {
        OrderItem::desc(self.expr())
    }

    /// Read this column from `row` at `index`, NULL as `None`.
    pub fn read_opt(&self, row: &dyn RowAccess, index: usize) -> SqlResult<Option<T>> {
        self.ty.read_opt(row, index)
    }

    /// Read this column from `row` at `index` through the non-nullable
    /// channel.
    pub fn read(&self, row: &dyn RowAccess, index: usize) -> SqlResult<T> {
        self.ty.read(row, index)
    }
}

impl Column<String> {
    pub fn like(&self, pattern: &str) -> SqlResult<Expr> {
        Ok(Expr::like(self.expr(), self.assign(&pattern.to_string())?))
    }

    pub fn not_like(&self, pattern: &str) -> SqlResult<Expr> {
        Ok(Expr::not_like(
            self.expr(),
            self.assign(&pattern.to_string())?,
        ))
    }
}

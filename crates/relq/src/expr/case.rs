//! Staged CASE expression builder.
//!
//! The stage types make the WHEN/THEN protocol explicit: [`CaseBuilder::when`]
//! hands out a [`CaseWhen`] that can only be completed by one of the `then`
//! methods, which commits the branch and returns the builder. Adding a branch
//! with a nullable result promotes the accumulated result type to its nullable
//! variant, mirroring how SQL CASE nullability is the union of all branches.

use super::typed::{TypedExpr, null};
use super::{CaseBranch, Expr};
use crate::error::{SqlError, SqlResult};
use crate::types::SqlType;

/// Accumulates WHEN/THEN branches for a CASE expression of result type `T`.
#[derive(Debug, Clone)]
pub struct CaseBuilder<T> {
    ty: SqlType<T>,
    branches: Vec<CaseBranch>,
    otherwise: Option<Expr>,
}

impl<T> CaseBuilder<T> {
    /// Start a CASE whose branches produce values of `ty`.
    pub fn new(ty: &SqlType<T>) -> Self {
        Self {
            ty: ty.clone(),
            branches: Vec::new(),
            otherwise: None,
        }
    }

    /// Open the next WHEN branch; the returned stage must be completed with a
    /// `then` call before the builder is usable again.
    pub fn when(self, condition: Expr) -> CaseWhen<T> {
        CaseWhen {
            builder: self,
            condition,
        }
    }

    /// Commit the ELSE branch with a bound value.
    pub fn otherwise(mut self, value: &T) -> SqlResult<Self> {
        self.otherwise = Some(Expr::Param(self.ty.bind(value)?));
        Ok(self)
    }

    /// Commit the ELSE branch with a typed NULL; promotes the result type to
    /// nullable.
    pub fn otherwise_null(mut self) -> Self {
        self.ty = self.ty.nullable();
        self.otherwise = Some(null(&self.ty));
        self
    }

    /// Commit the ELSE branch with an arbitrary expression.
    pub fn otherwise_expr(mut self, expr: Expr) -> Self {
        self.otherwise = Some(expr);
        self
    }

    /// Finish the CASE. A builder with no committed WHEN branch is a usage
    /// error, never a silently degenerate expression.
    pub fn end(self) -> SqlResult<TypedExpr<T>> {
        if self.branches.is_empty() {
            return Err(SqlError::usage(
                "CASE requires at least one WHEN ... THEN branch",
            ));
        }
        let expr = Expr::Case {
            branches: self.branches,
            otherwise: self.otherwise.map(Box::new),
        };
        Ok(TypedExpr::new(expr, self.ty))
    }
}

/// An open WHEN branch waiting for its THEN value.
#[derive(Debug, Clone)]
pub struct CaseWhen<T> {
    builder: CaseBuilder<T>,
    condition: Expr,
}

impl<T> CaseWhen<T> {
    /// Commit the branch with a bound value.
    pub fn then(mut self, value: &T) -> SqlResult<CaseBuilder<T>> {
        let then = Expr::Param(self.builder.ty.bind(value)?);
        self.builder.branches.push(CaseBranch {
            when: self.condition,
            then,
        });
        Ok(self.builder)
    }

    /// Commit the branch with an optional value; `None` promotes the result
    /// type to nullable and binds a typed NULL.
    pub fn then_opt(mut self, value: Option<&T>) -> SqlResult<CaseBuilder<T>> {
        if value.is_none() {
            self.builder.ty = self.builder.ty.nullable();
        }
        let then = Expr::Param(self.builder.ty.bind_opt(value)?);
        self.builder.branches.push(CaseBranch {
            when: self.condition,
            then,
        });
        Ok(self.builder)
    }

    /// Commit the branch with a typed NULL; promotes the result type to
    /// nullable.
    pub fn then_null(mut self) -> CaseBuilder<T> {
        self.builder.ty = self.builder.ty.nullable();
        let then = null(&self.builder.ty);
        self.builder.branches.push(CaseBranch {
            when: self.condition,
            then,
        });
        self.builder
    }

    /// Commit the branch with an arbitrary expression of the result type.
    pub fn then_expr(mut self, expr: Expr) -> CaseBuilder<T> {
        self.builder.branches.push(CaseBranch {
            when: self.condition,
            then: expr,
        });
        self.builder
    }

    /// Commit the branch with a typed expression; a nullable-typed branch
    /// promotes the whole builder to the nullable result type.
    pub fn then_typed(mut self, expr: TypedExpr<T>) -> CaseBuilder<T> {
        if expr.ty.is_nullable() {
            self.builder.ty = self.builder.ty.nullable();
        }
        self.builder.branches.push(CaseBranch {
            when: self.condition,
            then: expr.expr,
        });
        self.builder
    }
}

use super::case::CaseBuilder;
use super::source::{JoinKind, Source, Table};
use super::typed::{Column, bind, null};
use super::*;
use crate::ctx::{RenderOptions, SqlContext};
use crate::render::render_item;
use crate::stmt::Select;
use crate::types::generic;
use crate::wire::WireValue;
use pretty_assertions::assert_eq;

fn sql(expr: &Expr) -> String {
    render_item(expr, &SqlContext::generic()).unwrap().sql
}

fn col(name: &str) -> Expr {
    Expr::column(name).unwrap()
}

fn int_param(v: i64) -> Expr {
    bind(&v, &generic().big_int.not_null).unwrap()
}

fn text_param(v: &str) -> Expr {
    bind(&v.to_string(), &generic().varchar.not_null).unwrap()
}

#[test]
fn simple_comparison() {
    let expr = Expr::eq(col("status"), text_param("active"));
    assert_eq!(sql(&expr), "status = ?");
}

#[test]
fn and_group_joins_without_brackets_on_leaves() {
    let expr = Expr::and(vec![
        Expr::eq(col("status"), text_param("active")),
        Expr::gt(col("age"), int_param(18)),
    ]);
    assert_eq!(sql(&expr), "status = ? AND age > ?");
}

#[test]
fn nested_opposite_group_is_bracketed() {
    let expr = Expr::and(vec![
        Expr::eq(col("status"), text_param("active")),
        Expr::or(vec![
            Expr::eq(col("role"), text_param("admin")),
            Expr::eq(col("role"), text_param("superuser")),
        ]),
    ]);
    assert_eq!(sql(&expr), "status = ? AND (role = ? OR role = ?)");
}

#[test]
fn nested_same_kind_group_wraps_a_single_layer() {
    let expr = Expr::and(vec![
        Expr::eq(col("a"), int_param(1)),
        Expr::and(vec![
            Expr::eq(col("b"), int_param(2)),
            Expr::eq(col("c"), int_param(3)),
        ]),
    ]);
    let rendered = sql(&expr);
    assert_eq!(rendered, "a = ? AND (b = ? AND c = ?)");
    // One optional layer only, never doubled brackets.
    assert!(!rendered.contains("(("));
}

#[test]
fn single_item_group_renders_bare() {
    let expr = Expr::or(vec![Expr::eq(col("a"), int_param(1))]);
    assert_eq!(sql(&expr), "a = ?");
}

#[test]
fn empty_groups_fold_to_constants() {
    assert_eq!(sql(&Expr::and(vec![])), "1=1");
    assert_eq!(sql(&Expr::or(vec![])), "1=0");
}

#[test]
fn not_brackets_compound_operands_only() {
    let group = Expr::or(vec![
        Expr::eq(col("a"), int_param(1)),
        Expr::eq(col("b"), int_param(2)),
    ]);
    assert_eq!(sql(&Expr::not(group)), "NOT (a = ? OR b = ?)");
    assert_eq!(sql(&Expr::not(Expr::eq(col("a"), int_param(1)))), "NOT a = ?");
}

#[test]
fn between_negation_renders_in_place() {
    let expr = Expr::not_between(col("age"), int_param(18), int_param(65));
    assert_eq!(sql(&expr), "age NOT BETWEEN ? AND ?");
}

#[test]
fn in_list_renders_and_folds_when_empty() {
    let expr = Expr::in_list(col("id"), vec![int_param(1), int_param(2)]);
    assert_eq!(sql(&expr), "id IN (?, ?)");
    assert_eq!(sql(&Expr::in_list(col("id"), vec![])), "1=0");
    assert_eq!(sql(&Expr::not_in(col("id"), vec![])), "1=1");
}

#[test]
fn null_test_negation_renders_in_place() {
    assert_eq!(sql(&Expr::is_null(col("deleted_at"))), "deleted_at IS NULL");
    assert_eq!(
        sql(&Expr::is_not_null(col("deleted_at"))),
        "deleted_at IS NOT NULL"
    );
}

#[test]
fn function_call_is_tight_except_quantifiers() {
    assert_eq!(sql(&Expr::func("COUNT", vec![col("id")])), "COUNT(id)");
    assert_eq!(
        sql(&Expr::func("COALESCE", vec![col("nick"), col("name")])),
        "COALESCE(nick, name)"
    );
    assert_eq!(sql(&Expr::func("ANY", vec![col("roles")])), "ANY (roles)");
    assert_eq!(sql(&Expr::func("ALL", vec![col("limits")])), "ALL (limits)");
}

#[test]
fn arithmetic_brackets_nested_operations() {
    let expr = Expr::add(col("a"), Expr::mul(col("b"), col("c")));
    assert_eq!(sql(&expr), "a + (b * c)");
    assert_eq!(sql(&Expr::concat(col("first"), col("last"))), "first || last");
}

#[test]
fn text_literal_escapes_quotes() {
    assert_eq!(sql(&Expr::text("O'Brien")), "'O''Brien'");
    assert_eq!(sql(&Expr::int(42)), "42");
    assert_eq!(sql(&Expr::bool(true)), "TRUE");
}

#[test]
fn typed_null_renders_as_keyword() {
    let expr = null(&generic().integer.nullable);
    assert_eq!(sql(&expr), "NULL");
}

#[test]
fn parameters_collect_in_render_order() {
    let expr = Expr::and(vec![
        Expr::eq(col("a"), int_param(1)),
        Expr::between(col("b"), int_param(2), int_param(3)),
        Expr::in_list(col("c"), vec![int_param(4), int_param(5)]),
    ]);
    let rendered = render_item(&expr, &SqlContext::generic()).unwrap();
    assert_eq!(rendered.sql.matches('?').count(), 5);
    assert_eq!(
        rendered.params,
        vec![
            WireValue::BigInt(1),
            WireValue::BigInt(2),
            WireValue::BigInt(3),
            WireValue::BigInt(4),
            WireValue::BigInt(5),
        ]
    );
}

#[test]
fn comments_are_invisible_unless_enabled() {
    let expr = Expr::eq(col("id"), int_param(1)).commented("tenant filter");
    assert_eq!(sql(&expr), "id = ?");

    let ctx = SqlContext::generic().with_options(RenderOptions::default().with_comments());
    let rendered = render_item(&expr, &ctx).unwrap();
    assert_eq!(rendered.sql, "/* tenant filter */ id = ? /* bigint: 1 */");
}

#[test]
fn pretty_mode_breaks_large_groups() {
    let ctx = SqlContext::generic().with_options(RenderOptions::pretty());
    let expr = Expr::and(vec![
        Expr::eq(col("a"), int_param(1)),
        Expr::eq(col("b"), int_param(2)),
        Expr::eq(col("c"), int_param(3)),
    ]);
    assert!(expr.is_multiline());
    let rendered = render_item(&expr, &ctx).unwrap();
    assert_eq!(rendered.sql, "a = ?\nAND b = ?\nAND c = ?");
}

#[test]
fn case_renders_branches_then_else() {
    let built = CaseBuilder::new(&generic().varchar.not_null)
        .when(Expr::gt(col("age"), int_param(65)))
        .then(&"senior".to_string())
        .unwrap()
        .when(Expr::gt(col("age"), int_param(18)))
        .then(&"adult".to_string())
        .unwrap()
        .otherwise(&"minor".to_string())
        .unwrap()
        .end()
        .unwrap();
    assert!(!built.ty.is_nullable());
    assert_eq!(
        sql(&built.into_expr()),
        "CASE WHEN age > ? THEN ? WHEN age > ? THEN ? ELSE ? END"
    );
}

#[test]
fn case_without_branches_is_an_error() {
    let err = CaseBuilder::new(&generic().varchar.not_null).end().unwrap_err();
    assert!(matches!(err, crate::error::SqlError::Usage(_)));
}

#[test]
fn case_nullable_branch_promotes_result_type() {
    let built = CaseBuilder::new(&generic().varchar.not_null)
        .when(Expr::gt(col("age"), int_param(18)))
        .then(&"adult".to_string())
        .unwrap()
        .when(Expr::is_null(col("age")))
        .then_null()
        .end()
        .unwrap();
    assert!(built.ty.is_nullable());
    assert_eq!(built.ty, generic().varchar.nullable);
}

#[test]
fn case_otherwise_null_promotes_result_type() {
    let built = CaseBuilder::new(&generic().integer.not_null)
        .when(Expr::eq(col("kind"), text_param("a")))
        .then(&1)
        .unwrap()
        .otherwise_null()
        .end()
        .unwrap();
    assert!(built.ty.is_nullable());
}

#[test]
fn table_alias_has_two_faces() {
    let source = Table::new("users").unwrap().source().alias("u").unwrap();
    // Reference face: what column qualifiers use.
    assert_eq!(sql(&source.col("id").unwrap()), "u.id");
    // Definition face: what FROM renders.
    let rendered = render_item(&source, &SqlContext::generic()).unwrap();
    assert_eq!(rendered.sql, "users AS u");
}

#[test]
fn subquery_source_defines_with_brackets_and_alias() {
    let inner = Select::columns([col("id")])
        .from(Table::new("orders").unwrap().source());
    let source = Source::query(inner, "o").unwrap();
    assert_eq!(sql(&source.col("id").unwrap()), "o.id");
    let rendered = render_item(&source, &SqlContext::generic()).unwrap();
    assert_eq!(rendered.sql, "(SELECT id FROM orders) AS o");
}

#[test]
fn join_renders_condition_and_concatenates_columns() {
    let users = Table::with_columns("users", ["id", "name"]).unwrap();
    let orders = Table::with_columns("orders", ["id", "user_id"]).unwrap();
    let on = Expr::eq(
        users.col("id").unwrap(),
        orders.col("user_id").unwrap(),
    );
    let join = users.source().inner_join(orders.source(), on);

    let names: Vec<String> = join
        .columns()
        .iter()
        .map(|c| c.last_part().to_string())
        .collect();
    assert_eq!(names, ["id", "name", "id", "user_id"]);

    let rendered = render_item(&join, &SqlContext::generic()).unwrap();
    assert_eq!(
        rendered.sql,
        "users INNER JOIN orders ON users.id = orders.user_id"
    );
}

#[test]
fn join_has_no_single_reference_face() {
    let join = Table::new("a")
        .unwrap()
        .source()
        .join(JoinKind::Left, Table::new("b").unwrap().source(), None);
    assert!(join.col("id").is_err());
}

#[test]
fn typed_column_comparisons_bind_with_the_column_type() {
    let id = Column::new("id", &generic().big_int.not_null).unwrap();
    let rendered = render_item(&id.eq(&42).unwrap(), &SqlContext::generic()).unwrap();
    assert_eq!(rendered.sql, "id = ?");
    assert_eq!(rendered.params, vec![WireValue::BigInt(42)]);
}

#[test]
fn typed_column_in_values_folds_empty() {
    let id = Column::new("id", &generic().big_int.not_null).unwrap();
    assert_eq!(sql(&id.in_values(&[]).unwrap()), "1=0");
    assert_eq!(sql(&id.not_in_values(&[]).unwrap()), "1=1");
    assert_eq!(sql(&id.in_values(&[1, 2]).unwrap()), "id IN (?, ?)");
}

#[test]
fn exists_renders_subquery_in_brackets() {
    let sub = Select::value(Expr::int(1)).from(Table::new("orders").unwrap().source());
    assert_eq!(sql(&Expr::exists(sub.clone())), "EXISTS (SELECT 1 FROM orders)");
    assert_eq!(
        sql(&Expr::not_exists(sub)),
        "NOT EXISTS (SELECT 1 FROM orders)"
    );
}

#[test]
fn in_select_renders_subquery_in_brackets() {
    let sub = Select::value(col("user_id")).from(Table::new("orders").unwrap().source());
    let expr = Expr::in_select(col("id"), sub);
    assert_eq!(sql(&expr), "id IN (SELECT user_id FROM orders)");
}

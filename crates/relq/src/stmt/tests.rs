use super::*;
use crate::ctx::{RenderOptions, SqlContext};
use crate::expr::source::Table;
use crate::expr::typed::bind;
use crate::types::generic;
use crate::wire::WireValue;
use pretty_assertions::assert_eq;

fn col(name: &str) -> Expr {
    Expr::column(name).unwrap()
}

fn int_param(v: i64) -> Expr {
    bind(&v, &generic().big_int.not_null).unwrap()
}

fn text_param(v: &str) -> Expr {
    bind(&v.to_string(), &generic().varchar.not_null).unwrap()
}

fn users() -> Table {
    Table::new("users").unwrap()
}

#[test]
fn simple_select_renders_token_sequence_and_params() {
    let ctx = SqlContext::generic();
    let query = Select::columns([col("id"), col("name")])
        .from(users().source())
        .and_where(Expr::eq(col("id"), int_param(42)))
        .to_query(&ctx)
        .unwrap();
    assert_eq!(query.sql, "SELECT id, name FROM users WHERE id = ?");
    assert_eq!(query.params, vec![WireValue::BigInt(42)]);
}

#[test]
fn select_clauses_render_in_canonical_order_regardless_of_call_order() {
    let ctx = SqlContext::generic();
    // WHERE added before FROM; the rendered order is still conventional.
    let query = Select::new()
        .and_where(Expr::eq(col("id"), int_param(1)))
        .column(col("id"))
        .from(users().source())
        .to_query(&ctx)
        .unwrap();
    assert_eq!(query.sql, "SELECT id FROM users WHERE id = ?");
}

#[test]
fn select_distinct_group_having_order() {
    let ctx = SqlContext::generic();
    let query = Select::columns([col("status"), Expr::func("COUNT", vec![col("id")])])
        .distinct()
        .from(users().source())
        .group_by(col("status"))
        .and_having(Expr::gt(Expr::func("COUNT", vec![col("id")]), int_param(10)))
        .order_by(OrderItem::desc(col("status")).nulls(Nulls::Last))
        .to_query(&ctx)
        .unwrap();
    assert_eq!(
        query.sql,
        "SELECT DISTINCT status, COUNT(id) FROM users GROUP BY status \
         HAVING COUNT(id) > ? ORDER BY status DESC NULLS LAST"
    );
}

#[test]
fn generic_dialect_rejects_limit_and_offset() {
    let ctx = SqlContext::generic();
    let err = Select::value(col("id")).limit(&ctx, 10).unwrap_err();
    assert!(err.is_unsupported());
    let err = Select::value(col("id")).offset(&ctx, 10).unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn pg_limit_offset_renders_as_bound_clauses() {
    let ctx = SqlContext::pg();
    let query = Select::columns([col("id"), col("name")])
        .from(users().source())
        .and_where(Expr::eq(col("id"), int_param(42)))
        .limit(&ctx, 10)
        .unwrap()
        .offset(&ctx, 20)
        .unwrap()
        .to_query(&ctx)
        .unwrap();
    assert_eq!(
        query.sql,
        "SELECT id, name FROM users WHERE id = $1 LIMIT $2 OFFSET $3"
    );
    assert_eq!(
        query.params,
        vec![
            WireValue::BigInt(42),
            WireValue::BigInt(10),
            WireValue::BigInt(20),
        ]
    );
}

#[test]
fn oracle_fetch_renders_offset_then_fetch_next() {
    let ctx = SqlContext::oracle();
    let query = Select::value(col("id"))
        .from(users().source())
        .limit(&ctx, 10)
        .unwrap()
        .offset(&ctx, 20)
        .unwrap()
        .to_query(&ctx)
        .unwrap();
    assert_eq!(
        query.sql,
        "SELECT id FROM users OFFSET :1 ROWS FETCH NEXT :2 ROWS ONLY"
    );
    assert_eq!(
        query.params,
        vec![WireValue::BigInt(20), WireValue::BigInt(10)]
    );
}

#[test]
fn oracle_fetch_first_without_offset() {
    let ctx = SqlContext::oracle();
    let query = Select::value(col("id"))
        .from(users().source())
        .limit(&ctx, 5)
        .unwrap()
        .to_query(&ctx)
        .unwrap();
    assert_eq!(query.sql, "SELECT id FROM users FETCH FIRST :1 ROWS ONLY");
}

#[test]
fn oracle_percent_with_ties() {
    let ctx = SqlContext::oracle();
    let query = Select::value(col("id"))
        .from(users().source())
        .order_by(OrderItem::desc(col("score")))
        .limit_percent(&ctx, 10)
        .unwrap()
        .with_ties(&ctx)
        .unwrap()
        .to_query(&ctx)
        .unwrap();
    assert_eq!(
        query.sql,
        "SELECT id FROM users ORDER BY score DESC FETCH FIRST 10 PERCENT ROWS WITH TIES"
    );
    assert!(query.params.is_empty());
}

#[test]
fn pg_rejects_oracle_only_fetch_options() {
    let pg = SqlContext::pg();
    let stmt = Select::value(col("id"))
        .from(users().source())
        .limit_percent(&pg, 10)
        .unwrap();
    // Accepted structurally, refused by the Pg strategy at render time.
    assert!(stmt.to_query(&pg).is_err());
}

#[test]
fn insert_renders_columns_and_values_in_insertion_order() {
    let ctx = SqlContext::generic();
    let query = Insert::new(users())
        .set("name", text_param("alice"))
        .unwrap()
        .set("age", int_param(33))
        .unwrap()
        .to_query(&ctx)
        .unwrap();
    assert_eq!(query.sql, "INSERT INTO users (name, age) VALUES (?, ?)");
    assert_eq!(
        query.params,
        vec![WireValue::Text("alice".into()), WireValue::BigInt(33)]
    );
}

#[test]
fn insert_set_replaces_in_place() {
    let ctx = SqlContext::generic();
    let query = Insert::new(users())
        .set("name", text_param("alice"))
        .unwrap()
        .set("age", int_param(33))
        .unwrap()
        .set("name", text_param("bob"))
        .unwrap()
        .to_query(&ctx)
        .unwrap();
    // Same column order, updated value.
    assert_eq!(query.sql, "INSERT INTO users (name, age) VALUES (?, ?)");
    assert_eq!(
        query.params,
        vec![WireValue::Text("bob".into()), WireValue::BigInt(33)]
    );
}

#[test]
fn insert_without_values_is_an_error() {
    let ctx = SqlContext::generic();
    assert!(Insert::new(users()).to_query(&ctx).is_err());
}

#[test]
fn insert_from_select() {
    let ctx = SqlContext::generic();
    let source = Select::value(col("id"))
        .from(users().source())
        .and_where(Expr::eq(col("active"), int_param(0)));
    let query = Insert::new(Table::new("archive").unwrap())
        .from_select(["id"], source)
        .unwrap()
        .to_query(&ctx)
        .unwrap();
    assert_eq!(
        query.sql,
        "INSERT INTO archive (id) SELECT id FROM users WHERE active = ?"
    );
}

#[test]
fn returning_is_dialect_gated() {
    let generic_ctx = SqlContext::generic();
    let pg = SqlContext::pg();
    assert!(
        Insert::new(users())
            .returning(&generic_ctx, col("id"))
            .unwrap_err()
            .is_unsupported()
    );
    let query = Insert::new(users())
        .set("name", text_param("alice"))
        .unwrap()
        .returning(&pg, col("id"))
        .unwrap()
        .to_query(&pg)
        .unwrap();
    assert_eq!(
        query.sql,
        "INSERT INTO users (name) VALUES ($1) RETURNING id"
    );
}

#[test]
fn update_set_renders_in_insertion_order() {
    let ctx = SqlContext::generic();
    let query = Update::new(users())
        .set("name", text_param("alice"))
        .unwrap()
        .set("age", int_param(34))
        .unwrap()
        .and_where(Expr::eq(col("id"), int_param(7)))
        .to_query(&ctx)
        .unwrap();
    assert_eq!(query.sql, "UPDATE users SET name = ?, age = ? WHERE id = ?");
    assert_eq!(
        query.params,
        vec![
            WireValue::Text("alice".into()),
            WireValue::BigInt(34),
            WireValue::BigInt(7),
        ]
    );
}

#[test]
fn update_without_set_is_an_error() {
    let ctx = SqlContext::generic();
    let err = Update::new(users())
        .and_where(Expr::eq(col("id"), int_param(1)))
        .to_query(&ctx)
        .unwrap_err();
    assert!(matches!(err, SqlError::Usage(_)));
}

#[test]
fn delete_requires_where_or_explicit_opt_in() {
    let ctx = SqlContext::generic();
    assert!(Delete::new(users()).to_query(&ctx).is_err());

    let query = Delete::new(users()).all_rows().to_query(&ctx).unwrap();
    assert_eq!(query.sql, "DELETE FROM users");

    let query = Delete::new(users())
        .and_where(Expr::eq(col("id"), int_param(9)))
        .to_query(&ctx)
        .unwrap();
    assert_eq!(query.sql, "DELETE FROM users WHERE id = ?");
}

#[test]
fn union_brackets_each_branch() {
    let ctx = SqlContext::generic();
    let a = Select::value(col("id")).from(Table::new("a").unwrap().source());
    let b = Select::value(col("id")).from(Table::new("b").unwrap().source());
    let query = Union::new(a.clone()).add(b.clone()).to_query(&ctx).unwrap();
    assert_eq!(query.sql, "(SELECT id FROM a) UNION (SELECT id FROM b)");

    let query = Union::new(a).add(b).all().to_query(&ctx).unwrap();
    assert_eq!(query.sql, "(SELECT id FROM a) UNION ALL (SELECT id FROM b)");
}

#[test]
fn union_fetch_applies_to_the_whole_union() {
    let ctx = SqlContext::pg();
    let a = Select::value(col("id")).from(Table::new("a").unwrap().source());
    let b = Select::value(col("id")).from(Table::new("b").unwrap().source());
    let query = Union::new(a)
        .add(b)
        .limit(&ctx, 10)
        .unwrap()
        .to_query(&ctx)
        .unwrap();
    assert_eq!(
        query.sql,
        "(SELECT id FROM a) UNION (SELECT id FROM b) LIMIT $1"
    );
    assert_eq!(query.params, vec![WireValue::BigInt(10)]);
}

#[test]
fn union_limit_is_dialect_gated() {
    let ctx = SqlContext::generic();
    let a = Select::value(col("id")).from(Table::new("a").unwrap().source());
    assert!(Union::new(a).limit(&ctx, 10).unwrap_err().is_unsupported());
}

#[test]
fn parameters_walk_matches_placeholder_order() {
    let ctx = SqlContext::generic();
    let stmt = Select::columns([col("id"), col("name")])
        .from(users().source())
        .and_where(Expr::eq(col("id"), int_param(42)))
        .and_where(Expr::between(col("age"), int_param(18), int_param(65)));
    let query = stmt.to_query(&ctx).unwrap();
    let params = stmt.parameters(&ctx).unwrap();
    assert_eq!(query.params, params);
    assert_eq!(query.sql.matches('?').count(), params.len());
}

/// Placeholder count equals parameter count for every combination of optional
/// fragments.
#[test]
fn placeholder_alignment_across_fragment_combinations() {
    let ctx = SqlContext::generic();
    for with_where in [false, true] {
        for with_group in [false, true] {
            for with_having in [false, true] {
                for with_order in [false, true] {
                    let mut stmt = Select::value(col("status")).from(users().source());
                    if with_where {
                        stmt = stmt.and_where(Expr::eq(col("id"), int_param(1)));
                    }
                    if with_group {
                        stmt = stmt.group_by(col("status"));
                    }
                    if with_having {
                        stmt = stmt
                            .and_having(Expr::gt(Expr::func("COUNT", vec![col("id")]), int_param(2)));
                    }
                    if with_order {
                        stmt = stmt.order_by(OrderItem::asc(col("status")));
                    }
                    let query = stmt.to_query(&ctx).unwrap();
                    assert_eq!(
                        query.sql.matches('?').count(),
                        query.params.len(),
                        "fragments: where={with_where} group={with_group} \
                         having={with_having} order={with_order}"
                    );
                }
            }
        }
    }
}

#[test]
fn pretty_mode_breaks_clauses_onto_lines() {
    let ctx = SqlContext::generic().with_options(RenderOptions::pretty());
    let query = Select::columns([col("id"), col("name")])
        .from(users().source())
        .and_where(Expr::and(vec![
            Expr::eq(col("status"), text_param("active")),
            Expr::gt(col("age"), int_param(18)),
            Expr::is_not_null(col("email")),
        ]))
        .to_query(&ctx)
        .unwrap();
    assert_eq!(
        query.sql,
        "SELECT id, name\nFROM users\nWHERE\n  status = ?\n  AND age > ?\n  AND email IS NOT NULL"
    );
}

#[test]
fn select_without_columns_is_an_error() {
    let ctx = SqlContext::generic();
    assert!(Select::new().from(users().source()).to_query(&ctx).is_err());
}

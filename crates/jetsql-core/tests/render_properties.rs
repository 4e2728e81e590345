//! Properties every rendered statement must satisfy, checked across the
//! three dialects.

mod common;
use common::*;

use jetsql_core::prelude::*;
use jetsql_derive::Table;

#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
pub struct Film {
    #[column(primary_key)]
    pub film_id: i32,
    pub title: String,
    pub length: i32,
    pub rental_rate: f64,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
pub struct Actor {
    #[column(primary_key)]
    pub actor_id: i32,
    pub film_id: i32,
    pub last_name: String,
}

// ===================================================================
// Parenthesization
// ===================================================================

#[test]
fn test_binary_operators_always_parenthesize() {
    let film = Film::table();
    let stmt = select(&film.film_id).where_clause(
        film.length
            .add(1)
            .mul(2)
            .gt(100)
            .or(film.title.like("A%").and(film.rental_rate.lt(2.5))),
    );
    let (sql, _) = render(&stmt, &PostgresDialect::new());
    assert!(sql.ends_with(
        "WHERE ((((film.length + $1) * $2) > $3) \
         OR ((film.title LIKE $4) AND (film.rental_rate < $5)));"
    ));
}

#[test]
fn test_unary_not_wraps_its_operand() {
    let film = Film::table();
    let stmt = select(&film.film_id).where_clause(film.length.gt(1).not());
    let (sql, _) = render(&stmt, &SqliteDialect::new());
    assert!(sql.ends_with("WHERE (NOT (film.length > ?));"), "{sql}");
}

// ===================================================================
// Placeholders, debug equivalence and idempotence
// ===================================================================

#[test]
fn test_render_contract_for_select() {
    let film = Film::table();
    let actor = Actor::table();
    let stmt = film
        .inner_join(&actor, actor.film_id.eq(&film.film_id))
        .select((&film.title, count(&actor.actor_id).as_("actors")))
        .where_clause(film.length.between(60, 120).and(actor.last_name.not_eq("Doe")))
        .group_by(&film.title)
        .having(count(&actor.actor_id).gt(2))
        .order_by(film.title.asc())
        .limit(10)
        .offset(20);
    assert_render_contract(&stmt);
}

#[test]
fn test_render_contract_for_insert_update_delete() {
    let film = Film::table();
    let insert = film
        .insert(film.mutable_columns())
        .values(("Alien", 117, 2.99))
        .values(("Heat", 170, 3.99));
    assert_render_contract(&insert);

    let update = film
        .update((&film.title, &film.length))
        .set(("Aliens", 137))
        .where_clause(film.film_id.eq(1));
    assert_render_contract(&update);

    let delete = film.delete().where_clause(film.film_id.in_list([1, 2, 3]));
    assert_render_contract(&delete);
}

#[test]
fn test_placeholders_inside_subqueries_keep_counting() {
    let film = Film::table();
    let actor = Actor::table();
    let stmt = select(&film.title)
        .from(&film)
        .where_clause(
            film.film_id
                .in_query(
                    select(&actor.film_id)
                        .from(&actor)
                        .where_clause(actor.last_name.eq("Doe")),
                )
                .and(film.length.gt(90)),
        );
    let (sql, args) = render(&stmt, &PostgresDialect::new());
    assert_eq!(dollar_ordinals(&sql), vec![1, 2]);
    assert_eq!(args, vec![SqlValue::Text("Doe".into()), SqlValue::Int(90)]);
    assert_render_contract(&stmt);
}

// ===================================================================
// Named arguments in raw fragments
// ===================================================================

#[test]
fn test_repeated_raw_argument_binds_each_occurrence() {
    let stmt = raw_statement("SELECT :arg + col + :arg FROM t").arg(":arg", 11);
    for dialect in dialects() {
        let (_, args) = render(&stmt, dialect);
        assert_eq!(args, vec![SqlValue::Int(11), SqlValue::Int(11)]);
    }
    assert_eq!(
        render(&stmt, &MySqlDialect::new()).0,
        "SELECT ? + col + ? FROM t;"
    );
}

// ===================================================================
// Mandatory WHERE
// ===================================================================

#[test]
fn test_delete_without_where_is_rejected() {
    let film = Film::table();
    for dialect in dialects() {
        let err = render_err(&film.delete(), dialect);
        assert_eq!(
            err,
            BuildError::MissingClause {
                statement: "DELETE",
                clause: "WHERE"
            }
        );
    }
}

#[test]
fn test_update_without_where_is_rejected() {
    let film = Film::table();
    let stmt = film.update(&film.title).set(("x",));
    for dialect in dialects() {
        assert_eq!(render_err(&stmt, dialect).kind(), FaultKind::MissingClause);
        assert!(stmt.debug_sql(dialect).is_err());
    }
}

// ===================================================================
// Set operations
// ===================================================================

#[test]
fn test_union_with_limit_wraps_branches() {
    let film = Film::table();
    let actor = Actor::table();
    let stmt = union(
        select(&film.film_id).from(&film),
        select(&actor.film_id).from(&actor),
    )
    .limit(1);
    let (sql, args) = render(&stmt, &PostgresDialect::new());
    assert_eq!(
        sql,
        "(\n    SELECT film.film_id AS \"film.film_id\"\n    FROM film\n)\n\
         UNION\n\
         (\n    SELECT actor.film_id AS \"actor.film_id\"\n    FROM actor\n)\n\
         LIMIT $1;"
    );
    assert_eq!(args, vec![SqlValue::Int(1)]);
}

#[test]
fn test_union_order_by_uses_output_column_names() {
    let film = Film::table();
    let stmt = union_all(
        select(&film.title).from(&film).where_clause(film.length.lt(60)),
        select(&film.title).from(&film).where_clause(film.length.gt(180)),
    )
    .order_by(film.title.asc());
    for dialect in dialects() {
        let (sql, _) = render(&stmt, dialect);
        assert!(sql.ends_with("\nORDER BY \"film.title\" ASC;"), "{sql}");
        assert!(!sql.contains("ORDER BY film.title"), "{sql}");
    }
    assert_render_contract(&stmt);
}

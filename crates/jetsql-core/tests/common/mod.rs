#![allow(dead_code)]

use jetsql_core::prelude::*;

static MYSQL: MySqlDialect = MySqlDialect::new();
static POSTGRES: PostgresDialect = PostgresDialect::new();
static SQLITE: SqliteDialect = SqliteDialect::new();

pub fn dialects() -> [&'static dyn Dialect; 3] {
    [&MYSQL, &POSTGRES, &SQLITE]
}

pub fn render(stmt: &impl Statement, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
    stmt.sql(dialect)
        .unwrap_or_else(|e| panic!("Failed to render for {}: {e}", dialect.name()))
}

pub fn render_err(stmt: &impl Statement, dialect: &dyn Dialect) -> BuildError {
    stmt.sql(dialect)
        .expect_err(&format!("Expected a build error for {}", dialect.name()))
}

/// Ordinals of the `$n` placeholders in `sql`, in order of appearance.
pub fn dollar_ordinals(sql: &str) -> Vec<usize> {
    let mut ordinals = Vec::new();
    let mut chars = sql.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            continue;
        }
        let mut digits = String::new();
        while let Some(&(_, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            digits.push(d);
            chars.next();
        }
        if let Ok(n) = digits.parse() {
            ordinals.push(n);
        }
    }
    ordinals
}

/// Substitutes every placeholder of `sql` with the inlined argument, the
/// way `debug_sql` would have written it.
pub fn inline_args(sql: &str, args: &[SqlValue], dialect: &dyn Dialect) -> String {
    if dialect.argument_placeholder(1) == "?" {
        let mut out = String::new();
        let mut args = args.iter();
        for c in sql.chars() {
            if c == '?' {
                out.push_str(&dialect.inline_value(args.next().expect("missing arg")));
            } else {
                out.push(c);
            }
        }
        return out;
    }
    let mut out = sql.to_owned();
    for (i, arg) in args.iter().enumerate().rev() {
        out = out.replace(&format!("${}", i + 1), &dialect.inline_value(arg));
    }
    out
}

/// Asserts the render contract for every dialect: placeholders match the
/// arguments, debug output is the inlined form and rendering is repeatable.
pub fn assert_render_contract(stmt: &impl Statement) {
    for dialect in dialects() {
        let (sql, args) = render(stmt, dialect);
        if dialect.argument_placeholder(1) == "?" {
            assert_eq!(sql.matches('?').count(), args.len(), "{sql}");
        } else {
            let expected: Vec<usize> = (1..=args.len()).collect();
            assert_eq!(dollar_ordinals(&sql), expected, "{sql}");
        }
        let debug = stmt.debug_sql(dialect).expect("debug render");
        assert_eq!(debug, inline_args(&sql, &args, dialect));
        assert_eq!(render(stmt, dialect), (sql, args));
    }
}

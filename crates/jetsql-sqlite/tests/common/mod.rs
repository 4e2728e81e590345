#![allow(dead_code)]

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub async fn create_test_pool(ddl: &[&str]) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    for statement in ddl {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to run: {statement}\nError: {e:?}"));
    }
    pool
}

use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Number of embedded migrations not yet recorded as applied.
pub async fn pending_count(pool: &DbPool) -> Result<usize, sqlx::Error> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok(MIGRATOR.iter().count());
    }

    let applied: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;

    Ok(MIGRATOR.iter().filter(|migration| !applied.contains(&migration.version)).count())
}

#[cfg(test)]
mod tests {
    use super::{pending_count, run_pending};
    use crate::connect_in_memory;

    const PLATFORM_TABLES: &[&str] = &[
        "users",
        "categories",
        "ventures",
        "funding_requests",
        "contact_requests",
        "chats",
        "messages",
        "user_session",
    ];

    #[tokio::test]
    async fn migrations_create_platform_tables() {
        let pool = connect_in_memory().await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for table in PLATFORM_TABLES {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .expect("query sqlite_master");
            assert_eq!(count, 1, "expected table `{table}` after migrations");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn pending_count_drops_to_zero_after_run() {
        let pool = connect_in_memory().await.expect("connect");

        assert!(pending_count(&pool).await.expect("count before") > 0);
        run_pending(&pool).await.expect("run migrations");
        assert_eq!(pending_count(&pool).await.expect("count after"), 0);

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_in_memory().await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run should be a no-op");
        pool.close().await;
    }

    #[tokio::test]
    async fn users_role_is_constrained() {
        let pool = connect_in_memory().await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let result = sqlx::query("INSERT INTO users (name, email, role) VALUES ('X', 'x@x.io', 'hacker')")
            .execute(&pool)
            .await;
        assert!(result.is_err(), "unknown roles should violate the CHECK constraint");

        pool.close().await;
    }
}

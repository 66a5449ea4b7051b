use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

mod athletes;
mod completion;
mod exercises;
mod notes;
mod sets;
mod teams;
mod workouts;

pub use athletes::*;
pub use completion::*;
pub use exercises::*;
pub use notes::*;
pub use sets::*;
pub use teams::*;
pub use workouts::*;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Which credentials the pool is opened with.
///
/// `Elevated` is the service role: read-write, and it owns the schema, so
/// migrations run on connect. `Restricted` opens the database read-only;
/// any write issued through it fails inside SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbAccess {
    Restricted,
    #[default]
    Elevated,
}

impl FromStr for DbAccess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restricted" | "anon" => Ok(DbAccess::Restricted),
            "elevated" | "service" | "service_role" => Ok(DbAccess::Elevated),
            other => Err(format!("unknown database access mode '{}'", other)),
        }
    }
}

pub async fn connect(database_url: &str, access: DbAccess) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .foreign_keys(true)
        .read_only(access == DbAccess::Restricted)
        .create_if_missing(access == DbAccess::Elevated);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    if access == DbAccess::Elevated {
        MIGRATOR.run(&pool).await?;
    }

    Ok(pool)
}

pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Create an in-memory SQLite pool with the schema applied.
    pub async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid in-memory url")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        MIGRATOR.run(&pool).await.expect("Failed to run migrations");

        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_access_mode() {
        assert_eq!("restricted".parse::<DbAccess>(), Ok(DbAccess::Restricted));
        assert_eq!("Service_Role".parse::<DbAccess>(), Ok(DbAccess::Elevated));
        assert!("root".parse::<DbAccess>().is_err());
    }

    #[tokio::test]
    async fn test_ping_and_unique_violation_detection() {
        let pool = test_support::test_pool().await;
        ping(&pool).await.expect("ping");

        sqlx::query("INSERT INTO teams (id, name, created_at) VALUES ('t1', 'A', 'now')")
            .execute(&pool)
            .await
            .unwrap();
        let err = sqlx::query("INSERT INTO teams (id, name, created_at) VALUES ('t1', 'B', 'now')")
            .execute(&pool)
            .await
            .unwrap_err();

        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}

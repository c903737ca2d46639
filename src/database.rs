use sqlx::{
    mysql::MySqlRow, postgres::PgRow, sqlite::SqliteRow, MySql, Pool, Postgres, Row, Sqlite,
};
use std::{str::FromStr, time::Duration};
use crate::{
    config::Config,
    error::AppResult,
    models::{NewUser, UserRow},
};

#[derive(Clone)]
pub enum DatabasePool {
    Sqlite(Pool<Sqlite>),
    Postgres(Pool<Postgres>),
    MySQL(Pool<MySql>),
}

impl DatabasePool {
    pub async fn new(config: &Config) -> AppResult<Self> {
        let database_url = config.database_url();

        match config.database.db_type.as_str() {
            "sqlite" => {
                let options = sqlx::sqlite::SqliteConnectOptions::from_str(&database_url)?
                    .create_if_missing(true);

                // An in-memory database exists per connection, so it must stay on one
                let max_connections = if config.database.name == ":memory:" {
                    1
                } else {
                    config.database.max_connections
                };

                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(max_connections)
                    .min_connections(config.database.min_connections)
                    .acquire_timeout(Duration::from_secs(30))
                    .connect_with(options)
                    .await?;

                Ok(DatabasePool::Sqlite(pool))
            }
            "postgresql" => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.database.max_connections)
                    .min_connections(config.database.min_connections)
                    .acquire_timeout(Duration::from_secs(30))
                    .connect(&database_url)
                    .await?;

                Ok(DatabasePool::Postgres(pool))
            }
            _ => {
                let pool = sqlx::mysql::MySqlPoolOptions::new()
                    .max_connections(config.database.max_connections)
                    .min_connections(config.database.min_connections)
                    .acquire_timeout(Duration::from_secs(30))
                    .connect(&database_url)
                    .await?;

                Ok(DatabasePool::MySQL(pool))
            }
        }
    }

    pub async fn health_check(&self) -> AppResult<bool> {
        let health: i64 = match self {
            DatabasePool::Sqlite(pool) => {
                sqlx::query("SELECT 1 AS health")
                    .fetch_one(pool)
                    .await?
                    .try_get("health")?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("SELECT 1::bigint AS health")
                    .fetch_one(pool)
                    .await?
                    .try_get("health")?
            }
            DatabasePool::MySQL(pool) => {
                sqlx::query("SELECT CAST(1 AS SIGNED) AS health")
                    .fetch_one(pool)
                    .await?
                    .try_get("health")?
            }
        };

        Ok(health == 1)
    }

    // Users table statements. Ids arrive as the raw path segment and are bound
    // verbatim; a segment that names no row simply matches nothing.

    pub async fn list_users(&self) -> AppResult<Vec<UserRow>> {
        match self {
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query("SELECT id, name, email, vec FROM users")
                    .fetch_all(pool)
                    .await?;
                rows.iter().map(sqlite_user_row).collect()
            }
            DatabasePool::Postgres(pool) => {
                let rows = sqlx::query("SELECT id::bigint AS id, name, email, vec FROM users")
                    .fetch_all(pool)
                    .await?;
                rows.iter().map(pg_user_row).collect()
            }
            DatabasePool::MySQL(pool) => {
                let rows = sqlx::query("SELECT id, name, email, vec FROM users")
                    .fetch_all(pool)
                    .await?;
                rows.iter().map(mysql_user_row).collect()
            }
        }
    }

    pub async fn get_user(&self, id: &str) -> AppResult<Option<UserRow>> {
        match self {
            DatabasePool::Sqlite(pool) => {
                let row = sqlx::query("SELECT id, name, email, vec FROM users WHERE id = ?")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(sqlite_user_row).transpose()
            }
            DatabasePool::Postgres(pool) => {
                let row = sqlx::query("SELECT id::bigint AS id, name, email, vec FROM users WHERE id::text = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(pg_user_row).transpose()
            }
            DatabasePool::MySQL(pool) => {
                let row = sqlx::query("SELECT id, name, email, vec FROM users WHERE id = ?")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
                row.as_ref().map(mysql_user_row).transpose()
            }
        }
    }

    pub async fn create_user(&self, user: &NewUser) -> AppResult<i64> {
        match self {
            DatabasePool::Sqlite(pool) => {
                let result = sqlx::query("INSERT INTO users (name, email, vec) VALUES (?, ?, ?)")
                    .bind(&user.name)
                    .bind(&user.email)
                    .bind(&user.vec)
                    .execute(pool)
                    .await?;
                Ok(result.last_insert_rowid())
            }
            DatabasePool::Postgres(pool) => {
                let row = sqlx::query(
                    "INSERT INTO users (name, email, vec) VALUES ($1, $2, $3) RETURNING id::bigint AS id",
                )
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.vec)
                .fetch_one(pool)
                .await?;
                Ok(row.try_get("id")?)
            }
            DatabasePool::MySQL(pool) => {
                let result = sqlx::query("INSERT INTO users (name, email, vec) VALUES (?, ?, ?)")
                    .bind(&user.name)
                    .bind(&user.email)
                    .bind(&user.vec)
                    .execute(pool)
                    .await?;
                Ok(result.last_insert_id() as i64)
            }
        }
    }

    /// Full replace of name, email and vec. Returns the number of rows touched.
    pub async fn update_user(&self, id: &str, user: &NewUser) -> AppResult<u64> {
        let affected = match self {
            DatabasePool::Sqlite(pool) => {
                sqlx::query("UPDATE users SET name = ?, email = ?, vec = ? WHERE id = ?")
                    .bind(&user.name)
                    .bind(&user.email)
                    .bind(&user.vec)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("UPDATE users SET name = $1, email = $2, vec = $3 WHERE id::text = $4")
                    .bind(&user.name)
                    .bind(&user.email)
                    .bind(&user.vec)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
            DatabasePool::MySQL(pool) => {
                sqlx::query("UPDATE users SET name = ?, email = ?, vec = ? WHERE id = ?")
                    .bind(&user.name)
                    .bind(&user.email)
                    .bind(&user.vec)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
        };

        Ok(affected)
    }

    /// Returns the number of rows removed; zero is not an error.
    pub async fn delete_user(&self, id: &str) -> AppResult<u64> {
        let affected = match self {
            DatabasePool::Sqlite(pool) => {
                sqlx::query("DELETE FROM users WHERE id = ?")
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("DELETE FROM users WHERE id::text = $1")
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
            DatabasePool::MySQL(pool) => {
                sqlx::query("DELETE FROM users WHERE id = ?")
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
        };

        Ok(affected)
    }
}

fn sqlite_user_row(row: &SqliteRow) -> AppResult<UserRow> {
    Ok(UserRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        vec: row.try_get("vec")?,
    })
}

fn pg_user_row(row: &PgRow) -> AppResult<UserRow> {
    Ok(UserRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        vec: row.try_get("vec")?,
    })
}

fn mysql_user_row(row: &MySqlRow) -> AppResult<UserRow> {
    Ok(UserRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        vec: row.try_get("vec")?,
    })
}

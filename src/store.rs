//! Database bootstrap: create the target database when missing and open the pool.

use crate::config::Settings;
use crate::error::{AppError, ConfigError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Ensure the database named in `database_url` exists, creating it through the `postgres`
/// maintenance database if not. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url).map_err(|e| ConfigError::InvalidValue {
        key: "DATABASE_URL",
        reason: e.to_string(),
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Open the connection pool described by `settings`.
pub async fn connect(settings: &Settings) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    Ok(pool)
}

/// Returns the maintenance-database URL and the target database name. The path is the first
/// `/` after the authority; any query string is kept on the maintenance URL. A URL without a
/// database path yields an empty name.
fn split_database_url(url: &str) -> Result<(String, String), ConfigError> {
    let authority_start = url.find("://").map(|i| i + 3).ok_or_else(|| ConfigError::InvalidValue {
        key: "DATABASE_URL",
        reason: "missing scheme".into(),
    })?;
    let (head, query) = match url.find('?') {
        Some(q) => (&url[..q], &url[q..]),
        None => (url, ""),
    };
    let Some(path_start) = head
        .get(authority_start..)
        .and_then(|rest| rest.find('/'))
        .map(|i| authority_start + i + 1)
    else {
        return Ok((url.to_string(), String::new()));
    };
    let db_name = head[path_start..].trim();
    Ok((format!("{}postgres{}", &head[..path_start], query), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

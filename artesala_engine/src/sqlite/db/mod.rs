//! # SQLite database methods
//!
//! This module contains the "low-level" SQLite interactions.
//!
//! All of them are simple functions (rather than stateful structs) that accept a `&mut SqliteConnection` argument.
//! Callers obtain a connection from a pool, or open a transaction, and pass `&mut *tx` through without any other
//! changes. Atomicity is therefore decided at the call site, not in here.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod bookings;
pub mod rooms;
pub mod slots;

const SQLITE_DB_URL: &str = "sqlite://data/artesala.db";

pub fn db_url() -> String {
    let result = env::var("ASP_DATABASE_URL").unwrap_or_else(|_| {
        info!("ASP_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str) -> Result<SqlitePool, SqlxError> {
    // The overlap trigger guards inserts; cascade deletes need foreign keys on for every connection.
    let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
    // SQLite allows a single writer at a time, and the pool's transactions begin deferred. On a wider pool, a
    // transaction that reads before it writes can fail its lock upgrade with SQLITE_BUSY when a sibling
    // connection holds the write lock. One connection serialises everything instead.
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
    Ok(pool)
}

//! Database and configuration models.

use diesel::prelude::*;

pub mod config;
pub mod user;

/// Result row of a `SELECT COUNT(*) AS count` statement.
#[derive(QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub count: i64,
}

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Management
//!
//! This module provides database functionality for the multi-tenant Eventra
//! booking server. It handles manager accounts, service catalogs, availability
//! calendars, bookings, broadcast requests, and reviews over a `SQLite` pool.

mod availability;
mod bookings;
mod broadcasts;
mod managers;
mod reviews;
mod services;

pub use bookings::BookingStatusCount;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for all persistent collections
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or the
    /// schema migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let db = Self::connect(database_url).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Open a connection pool without touching the schema
    ///
    /// For deployments that manage migrations out of band
    /// (`AUTO_MIGRATE=false`).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established
    pub async fn connect(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        Ok(Self { pool })
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Check database connectivity
    ///
    /// # Errors
    ///
    /// Returns an error if the probe query fails
    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        // Manager accounts
        self.migrate_managers().await?;

        // Service catalog
        self.migrate_services().await?;

        // Availability calendar
        self.migrate_availability().await?;

        // Bookings
        self.migrate_bookings().await?;

        // Broadcast requests
        self.migrate_broadcasts().await?;

        // Reviews
        self.migrate_reviews().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) async fn create_test_db() -> Result<Database> {
        // Use a simple in-memory database - each connection gets its own isolated instance
        Database::new("sqlite::memory:").await
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = create_test_db().await.unwrap();
        db.migrate().await.unwrap();
        db.ping().await.unwrap();
    }
}

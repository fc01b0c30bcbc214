// ABOUTME: System-wide constants and configuration values for the Eventra API
// ABOUTME: Contains service categories, limits, and environment variable readers

//! Constants module
//!
//! Application constants grouped by domain. The service category set lives
//! here as the single source consumed by both the catalog validator and the
//! public category listing.

use std::env;

/// Service categories a manager can offer.
///
/// Shared by service creation validation and the public `/categories` listing
/// so the two can never disagree.
pub const SERVICE_CATEGORIES: &[&str] = &[
    "Catering",
    "Photography",
    "Videography",
    "Decoration",
    "Music & DJ",
    "Venue",
    "Makeup & Styling",
    "Event Planning",
    "Lighting",
    "Transportation",
];

/// Check whether a category belongs to the shared category set
#[must_use]
pub fn is_known_category(category: &str) -> bool {
    SERVICE_CATEGORIES.contains(&category)
}

/// Business limits and defaults
pub mod limits {
    /// Default lifetime of an open broadcast request, in days
    pub const DEFAULT_BROADCAST_TTL_DAYS: i64 = 7;

    /// Default sweep interval of the broadcast expiry reaper, in seconds
    pub const DEFAULT_REAPER_INTERVAL_SECS: u64 = 300;

    /// Default number of days an expired broadcast is retained before deletion
    pub const DEFAULT_EXPIRED_RETENTION_DAYS: i64 = 30;

    /// Default JWT session expiry, in hours
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

    /// Default page size for booking listings
    pub const DEFAULT_BOOKINGS_LIMIT: i64 = 50;

    /// Largest page size a booking listing will serve
    pub const MAX_BOOKINGS_LIMIT: i64 = 200;

    /// Review ratings are clamped to this inclusive range
    pub const RATING_MIN: i64 = 1;
    /// Upper bound of the review rating range
    pub const RATING_MAX: i64 = 5;

    /// bcrypt work factor for password hashing
    pub const BCRYPT_COST: u32 = 10;
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080)
    }

    /// Get log level from environment or default
    #[must_use]
    pub fn log_level() -> String {
        env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
    }

    /// Get database URL from environment or default
    #[must_use]
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/eventra.db".to_string())
    }

    /// Get JWT secret from environment, if set
    #[must_use]
    pub fn jwt_secret() -> Option<String> {
        env::var("JWT_SECRET").ok()
    }

    /// Get JWT expiry hours from environment or default
    #[must_use]
    pub fn jwt_expiry_hours() -> i64 {
        env::var("JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(super::limits::DEFAULT_JWT_EXPIRY_HOURS)
    }

    /// Get broadcast request TTL in days from environment or default
    #[must_use]
    pub fn broadcast_ttl_days() -> i64 {
        env::var("BROADCAST_TTL_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(super::limits::DEFAULT_BROADCAST_TTL_DAYS)
    }

    /// Get reaper sweep interval in seconds from environment or default
    #[must_use]
    pub fn reaper_interval_secs() -> u64 {
        env::var("REAPER_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(super::limits::DEFAULT_REAPER_INTERVAL_SECS)
    }

    /// Get expired-broadcast retention in days from environment or default
    #[must_use]
    pub fn expired_retention_days() -> i64 {
        env::var("EXPIRED_RETENTION_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(super::limits::DEFAULT_EXPIRED_RETENTION_DAYS)
    }

    /// Whether confirming a booking marks every slot of the day as booked
    /// rather than only the slot matching the booking time
    #[must_use]
    pub fn mark_whole_day_on_confirm() -> bool {
        env::var("EVENTRA_MARK_WHOLE_DAY_ON_CONFIRM")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    }
}

/// Service identity used in logs and the health endpoint
pub mod service_names {
    /// Canonical service name
    pub const EVENTRA_SERVER: &str = "eventra-server";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_set_membership() {
        assert!(is_known_category("Catering"));
        assert!(is_known_category("Music & DJ"));
        assert!(!is_known_category("catering"));
        assert!(!is_known_category("Skydiving"));
    }

    #[test]
    fn test_categories_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for category in SERVICE_CATEGORIES {
            assert!(seen.insert(category), "duplicate category: {category}");
        }
    }
}

//! Paginator configuration.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SCHEMATA_PAGE_LIMIT` | 50 |
//! | `SCHEMATA_PAGE_LIMIT_MAX` | 500 |
//! | `SCHEMATA_SYSTEM_USER` | `system` |

use std::env;

use tracing::{debug, info};

use schemata_core::{defaults, Error, PageRequest, Principal, Result};

pub const PAGE_LIMIT_ENV: &str = "SCHEMATA_PAGE_LIMIT";
pub const PAGE_LIMIT_MAX_ENV: &str = "SCHEMATA_PAGE_LIMIT_MAX";
pub const SYSTEM_USER_ENV: &str = "SCHEMATA_SYSTEM_USER";

/// Tunables for [`ContentTypePaginator`](crate::ContentTypePaginator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size applied by [`PaginationConfig::page_request`].
    pub default_limit: i64,
    /// Requests asking for more are capped here.
    pub max_limit: i64,
    /// User id of the credential for privileged entry-count lookups.
    pub system_user_id: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: defaults::PAGE_LIMIT,
            max_limit: defaults::PAGE_LIMIT_MAX,
            system_user_id: defaults::SYSTEM_USER_ID.to_string(),
        }
    }
}

impl PaginationConfig {
    /// Load `.env` (if present), then read the environment.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_env()
    }

    /// Read the process environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(PAGE_LIMIT_ENV) {
            config.default_limit = parse_limit(PAGE_LIMIT_ENV, &raw)?;
        }
        if let Some(raw) = lookup(PAGE_LIMIT_MAX_ENV) {
            config.max_limit = parse_limit(PAGE_LIMIT_MAX_ENV, &raw)?;
        }
        if let Some(raw) = lookup(SYSTEM_USER_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.system_user_id = trimmed.to_string();
            }
        }
        config.validate()?;

        info!(
            subsystem = "pagination",
            component = "config",
            default_limit = config.default_limit,
            max_limit = config.max_limit,
            system_user = %config.system_user_id,
            "Pagination configuration loaded"
        );
        Ok(config)
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_max_limit(mut self, limit: i64) -> Self {
        self.max_limit = limit;
        self
    }

    pub fn with_system_user(mut self, user_id: impl Into<String>) -> Self {
        self.system_user_id = user_id.into();
        self
    }

    /// Check limits are positive and consistent.
    pub fn validate(&self) -> Result<()> {
        if self.default_limit <= 0 {
            return Err(Error::Config(format!(
                "default_limit must be positive, got {}",
                self.default_limit
            )));
        }
        if self.max_limit <= 0 {
            return Err(Error::Config(format!(
                "max_limit must be positive, got {}",
                self.max_limit
            )));
        }
        if self.default_limit > self.max_limit {
            return Err(Error::Config(format!(
                "default_limit ({}) exceeds max_limit ({})",
                self.default_limit, self.max_limit
            )));
        }
        if self.system_user_id.trim().is_empty() {
            return Err(Error::Config("system_user_id cannot be empty".to_string()));
        }
        Ok(())
    }

    /// The privileged credential for entry-count lookups.
    pub fn system_principal(&self) -> Principal {
        Principal::system_as(self.system_user_id.clone())
    }

    /// A blank request using this configuration's default page size.
    pub fn page_request(&self, filter: impl Into<String>) -> PageRequest {
        PageRequest::new(filter).with_limit(self.default_limit)
    }
}

fn parse_limit(key: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{} is not a valid number: {:?}", key, raw)))
}

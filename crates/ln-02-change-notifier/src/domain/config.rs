//! Configuration for the change notifier
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LN_ENABLE_SUBSCRIBE_TO_ALL` | `false` | Allow subscribers to receive every create/remove |
//! | `LN_MAX_TRACKED_ACCOUNTS` | `100` | Cap on fully tracked accounts per session |
//! | `LN_DELIVERY_WORKERS` | `2` | Delivery worker tasks |
//! | `LN_DELIVERY_QUEUE_CAPACITY` | `1024` | Pending batches per worker |
//! | `LN_FILTER_EXPECTED_ITEMS` | `10000` | Membership filter projection |
//! | `LN_FILTER_FPR` | `0.01` | Membership filter false positive target |

use std::env;
use std::str::FromStr;

use ln_01_membership_filter::FilterParameters;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Default cap on accounts a session tracks through `get_full_accounts`.
pub const DEFAULT_MAX_TRACKED_ACCOUNTS: usize = 100;

/// Default number of delivery workers.
pub const DEFAULT_DELIVERY_WORKERS: usize = 2;

/// Default bounded queue capacity per worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Delivery pool sizing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Worker tasks; each owns one queue
    pub workers: usize,
    /// Batches a worker queue holds before new ones are dropped
    pub queue_capacity: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_DELIVERY_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl DeliveryConfig {
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.workers == 0 {
            return Err(NotifyError::InvalidConfig(
                "delivery workers cannot be 0".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(NotifyError::InvalidConfig(
                "delivery queue capacity cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server-wide notifier configuration, shared by every session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Capability flag gating `notify_all_creates_removes`
    pub enable_subscribe_to_all: bool,
    /// Parameters for each session's membership filter
    pub filter: FilterParameters,
    /// Cap on `watched_accounts`
    pub max_tracked_accounts: usize,
    pub delivery: DeliveryConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enable_subscribe_to_all: false,
            filter: FilterParameters::default(),
            max_tracked_accounts: DEFAULT_MAX_TRACKED_ACCOUNTS,
            delivery: DeliveryConfig::default(),
        }
    }
}

impl NotifierConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for unset ones. A set but unparsable variable is an error.
    pub fn from_env() -> Result<Self, NotifyError> {
        let defaults = Self::default();

        let config = Self {
            enable_subscribe_to_all: env_flag(
                "LN_ENABLE_SUBSCRIBE_TO_ALL",
                defaults.enable_subscribe_to_all,
            )?,
            filter: FilterParameters {
                projected_element_count: env_parse(
                    "LN_FILTER_EXPECTED_ITEMS",
                    defaults.filter.projected_element_count,
                )?,
                false_positive_rate: env_parse(
                    "LN_FILTER_FPR",
                    defaults.filter.false_positive_rate,
                )?,
                ..defaults.filter
            },
            max_tracked_accounts: env_parse(
                "LN_MAX_TRACKED_ACCOUNTS",
                defaults.max_tracked_accounts,
            )?,
            delivery: DeliveryConfig {
                workers: env_parse("LN_DELIVERY_WORKERS", defaults.delivery.workers)?,
                queue_capacity: env_parse(
                    "LN_DELIVERY_QUEUE_CAPACITY",
                    defaults.delivery.queue_capacity,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NotifyError> {
        self.filter.validate()?;
        self.delivery.validate()?;
        Ok(())
    }

    pub fn with_subscribe_to_all(mut self, enabled: bool) -> Self {
        self.enable_subscribe_to_all = enabled;
        self
    }

    pub fn with_filter(mut self, filter: FilterParameters) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_max_tracked_accounts(mut self, max: usize) -> Self {
        self.max_tracked_accounts = max;
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.delivery = delivery;
        self
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, NotifyError> {
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> Result<bool, NotifyError> {
    match env::var(key) {
        Ok(raw) => parse_flag(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, NotifyError> {
    raw.trim()
        .parse()
        .map_err(|_| NotifyError::InvalidConfig(format!("{key}: cannot parse {raw:?}")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, NotifyError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(NotifyError::InvalidConfig(format!(
            "{key}: expected a boolean, got {raw:?}"
        ))),
    }
}

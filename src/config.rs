//! Runtime tuning knobs, resolved from the environment at startup.

use std::env;

/// Channel capacities for the system's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemConfig {
    /// Inbound message mailbox of the order router.
    pub mailbox_capacity: usize,
    /// Request channel of the order store task.
    pub store_capacity: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 32,
            store_capacity: 32,
        }
    }
}

impl SystemConfig {
    /// Reads `ORDERS_MAILBOX_CAPACITY` and `ORDERS_STORE_CAPACITY`,
    /// keeping the defaults for anything unset, unparsable, or zero.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mailbox_capacity: env_capacity("ORDERS_MAILBOX_CAPACITY")
                .unwrap_or(defaults.mailbox_capacity),
            store_capacity: env_capacity("ORDERS_STORE_CAPACITY")
                .unwrap_or(defaults.store_capacity),
        }
    }
}

fn env_capacity(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|capacity| *capacity > 0)
}

//! Combine policy: which detected fast paths are honored at all.
//!
//! `HalfClose` has no flag and is always honored when the inner connection
//! provides it.

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilitySet};
use crate::error::{Result, StrandConnError};

/// Environment variable overriding [`CombinePolicy::bulk_receive`].
pub const ENV_BULK_RECEIVE: &str = "STRANDCONN_BULK_RECEIVE";
/// Environment variable overriding [`CombinePolicy::bulk_send`].
pub const ENV_BULK_SEND: &str = "STRANDCONN_BULK_SEND";

/// Per-capability enable flags consulted by [`crate::combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinePolicy {
    /// Honor `BulkReceive` when the inner connection supports it.
    pub bulk_receive: bool,
    /// Honor `BulkSend` when the inner connection supports it.
    pub bulk_send: bool,
}

impl CombinePolicy {
    /// Platform default.
    ///
    /// On linux the bulk-receive path is enabled. The bulk-send path stays
    /// disabled everywhere: the kernel fast path behind it only applies when
    /// the sink is a unix-domain socket, which a boolean flag cannot check.
    pub fn platform_default() -> Self {
        Self {
            bulk_receive: cfg!(target_os = "linux"),
            bulk_send: false,
        }
    }

    pub fn all() -> Self {
        Self {
            bulk_receive: true,
            bulk_send: true,
        }
    }

    pub fn none() -> Self {
        Self {
            bulk_receive: false,
            bulk_send: false,
        }
    }

    /// Whether `cap` is honored when detected.
    pub fn enabled(&self, cap: Capability) -> bool {
        match cap {
            Capability::BulkReceive => self.bulk_receive,
            Capability::BulkSend => self.bulk_send,
            Capability::HalfClose => true,
        }
    }

    /// Drop every capability this policy disables from `detected`.
    pub fn gate(&self, detected: CapabilitySet) -> CapabilitySet {
        detected
            .iter()
            .filter(|cap| self.enabled(*cap))
            .collect()
    }

    /// Platform default overlaid with the `STRANDCONN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Platform default overlaid with values produced by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut policy = Self::platform_default();
        if let Some(value) = lookup(ENV_BULK_RECEIVE) {
            policy.bulk_receive = parse_flag(ENV_BULK_RECEIVE, &value)?;
            tracing::debug!(key = ENV_BULK_RECEIVE, value = policy.bulk_receive, "policy override");
        }
        if let Some(value) = lookup(ENV_BULK_SEND) {
            policy.bulk_send = parse_flag(ENV_BULK_SEND, &value)?;
            tracing::debug!(key = ENV_BULK_SEND, value = policy.bulk_send, "policy override");
        }
        Ok(policy)
    }
}

impl Default for CombinePolicy {
    fn default() -> Self {
        Self::platform_default()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(StrandConnError::InvalidPolicyValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

//! Store behavior configuration.
//!
//! # Responsibility
//! - Carry the tunables a `Session` is opened with.
//! - Decide the orphan-address policy left open by the domain rules.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// What happens to an address row whose owning student drops or replaces it.
///
/// Deleting a student always deletes its address; this policy only covers
/// the case where the student itself survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Keep the detached address row.
    #[default]
    Retain,
    /// Delete the detached address row in the same transaction.
    Delete,
}

impl Display for OrphanPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retain => f.write_str("retain"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

impl FromStr for OrphanPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "delete" => Ok(Self::Delete),
            other => Err(format!(
                "unsupported orphan policy `{other}`; expected retain|delete"
            )),
        }
    }
}

/// Session-level store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub orphan_policy: OrphanPolicy,
    /// Enables the read-through address identity cache.
    pub address_cache: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            orphan_policy: OrphanPolicy::Retain,
            address_cache: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OrphanPolicy, StoreConfig};

    #[test]
    fn orphan_policy_parses_case_insensitively() {
        assert_eq!(" Delete ".parse::<OrphanPolicy>(), Ok(OrphanPolicy::Delete));
        assert!("cascade".parse::<OrphanPolicy>().is_err());
    }

    #[test]
    fn defaults_retain_orphans_and_enable_cache() {
        let config = StoreConfig::default();
        assert_eq!(config.orphan_policy, OrphanPolicy::Retain);
        assert!(config.address_cache);
    }
}

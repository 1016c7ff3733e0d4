use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const QUERY_TIMEOUT_VAR: &str = "LOCAL_NOTIFICATION_QUERY_TIMEOUT_MS";
pub const RESOURCES_VAR: &str = "LOCAL_NOTIFICATION_RESOURCES";
pub const LOG_VAR: &str = "LOCAL_NOTIFICATION_LOG";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Upper bound on the blocking wait of a query. `None` waits forever.
    pub query_timeout: Option<Duration>,
    /// Directory searched for `<name>.png` when the platform has no bundle.
    pub resource_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(QUERY_TIMEOUT_VAR) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{QUERY_TIMEOUT_VAR} must be milliseconds, got `{raw}`"))?;
            config.query_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }
        if let Some(dir) = lookup(RESOURCES_VAR) {
            let dir = PathBuf::from(dir.trim());
            anyhow::ensure!(
                dir.is_dir(),
                "{RESOURCES_VAR} `{}` is not a directory",
                dir.display()
            );
            config.resource_dir = Some(dir);
        }
        if let Some(filter) = lookup(LOG_VAR) {
            if !filter.trim().is_empty() {
                config.log_filter = filter.trim().to_string();
            }
        }
        Ok(config)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            resource_dir: None,
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_wait_forever() {
        let config = BridgeConfig::from_lookup(lookup_from(&[])).expect("config");
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.query_timeout, None);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn zero_timeout_disables_the_bound() {
        let config =
            BridgeConfig::from_lookup(lookup_from(&[(QUERY_TIMEOUT_VAR, "0")])).expect("config");
        assert_eq!(config.query_timeout, None);

        let config = BridgeConfig::from_lookup(lookup_from(&[(QUERY_TIMEOUT_VAR, " 1500 ")]))
            .expect("config");
        assert_eq!(config.query_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(BridgeConfig::from_lookup(lookup_from(&[(QUERY_TIMEOUT_VAR, "soon")])).is_err());
        assert!(BridgeConfig::from_lookup(lookup_from(&[(
            RESOURCES_VAR,
            "/definitely/not/a/real/dir"
        )]))
        .is_err());
    }

    #[test]
    fn reads_resource_dir_and_log_filter() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().to_string_lossy().to_string();
        let config = BridgeConfig::from_lookup(lookup_from(&[
            (RESOURCES_VAR, dir.as_str()),
            (LOG_VAR, "notif_core=debug"),
        ]))
        .expect("config");
        assert_eq!(config.resource_dir.as_deref(), Some(temp.path()));
        assert_eq!(config.log_filter, "notif_core=debug");
    }
}

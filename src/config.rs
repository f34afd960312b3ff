//! Push layer configuration.
//!
//! Every field has a default, so a partial (or absent) `push.json` is fine.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PushError, PushResult};

pub const DEFAULT_QUEUE_CAPACITY: usize = 20;
pub const DEFAULT_IMAGE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MESSAGE_TYPE: &str = "promo";
pub const DEFAULT_QUEUE_FILE_NAME: &str = "notification_queue.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushConfig {
    /// Maximum number of deferred notifications kept on disk.
    pub queue_capacity: usize,
    pub image_connect_timeout_ms: u64,
    pub image_read_timeout_ms: u64,
    /// Message type assumed when a push carries no `type` key.
    pub default_message_type: String,
    pub queue_file_name: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            image_connect_timeout_ms: DEFAULT_IMAGE_TIMEOUT_MS,
            image_read_timeout_ms: DEFAULT_IMAGE_TIMEOUT_MS,
            default_message_type: DEFAULT_MESSAGE_TYPE.to_string(),
            queue_file_name: DEFAULT_QUEUE_FILE_NAME.to_string(),
        }
    }
}

impl PushConfig {
    pub fn from_json_str(raw: &str) -> PushResult<Self> {
        let config: PushConfig = serde_json::from_str(raw)?;
        Ok(config.normalized())
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> PushResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw)
                .map_err(|e| PushError::Config(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("[CONFIG] {} not found, using defaults", path.display());
                Ok(Self::default())
            },
            Err(e) => Err(e.into()),
        }
    }

    pub fn image_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.image_connect_timeout_ms)
    }

    pub fn image_read_timeout(&self) -> Duration {
        Duration::from_millis(self.image_read_timeout_ms)
    }

    fn normalized(mut self) -> Self {
        if self.queue_capacity == 0 {
            log::warn!("[CONFIG] queueCapacity of 0 is invalid, using 1");
            self.queue_capacity = 1;
        }
        if self.default_message_type.trim().is_empty() {
            self.default_message_type = DEFAULT_MESSAGE_TYPE.to_string();
        }
        if self.queue_file_name.trim().is_empty() {
            self.queue_file_name = DEFAULT_QUEUE_FILE_NAME.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PushConfig::default();
        assert_eq!(config.queue_capacity, 20);
        assert_eq!(config.image_connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.image_read_timeout(), Duration::from_secs(5));
        assert_eq!(config.default_message_type, "promo");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PushConfig::from_json_str(r#"{"queueCapacity": 5}"#).unwrap();
        assert_eq!(config.queue_capacity, 5);
        assert_eq!(config.image_read_timeout_ms, 5_000);
        assert_eq!(config.queue_file_name, "notification_queue.json");
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let config = PushConfig::from_json_str(r#"{"queueCapacity": 0}"#).unwrap();
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PushConfig::load(&dir.path().join("push.json")).unwrap();
        assert_eq!(config, PushConfig::default());
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("push.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(PushConfig::load(&path), Err(PushError::Config(_))));
    }
}

use serde::{Deserialize, Serialize};

/// Backend type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Drive v2 style REST API
    Drive {
        #[serde(default = "default_api_base")]
        api_base: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// In-memory storage (for testing)
    Memory,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Drive {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

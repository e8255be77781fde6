use std::sync::Arc;
use std::time::Duration;

use crate::backend::{
    client::BackendClient, config::BackendConfig, drive::DriveClient, memory::MemoryBackend,
};
use crate::common::{Error, Result};

pub struct BackendStore;

impl BackendStore {
    /// Create a backend client from configuration
    pub fn from_config(config: &BackendConfig) -> Result<Arc<dyn BackendClient>> {
        match config {
            BackendConfig::Drive {
                api_base,
                timeout_secs,
            } => {
                if api_base.trim().is_empty() {
                    return Err(Error::Config("Drive backend requires an api_base".to_string()));
                }
                let client = DriveClient::new(api_base, Duration::from_secs(*timeout_secs))?;
                Ok(Arc::new(client))
            }
            BackendConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
        }
    }
}

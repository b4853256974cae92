use crate::domain::model::Config;
use crate::domain::ports::ConfigSource;
use crate::utils::error::{JrcError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Fixed set of configuration documents, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigSource {
    configs: HashMap<String, Config>,
}

impl InMemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, config: Value) -> Self {
        self.configs.insert(name.into(), Config::new(config));
        self
    }
}

#[async_trait]
impl ConfigSource for InMemoryConfigSource {
    async fn get_config(&self, name: &str) -> Result<Config> {
        self.configs
            .get(name)
            .cloned()
            .ok_or_else(|| JrcError::MissingConfigError {
                field: format!("config/{}", name),
            })
    }
}

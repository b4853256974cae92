use crate::domain::model::Config;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Anything that can hand out named configuration documents.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn get_config(&self, name: &str) -> Result<Config>;
}

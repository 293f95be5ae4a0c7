// Store trait for the persisted connection configuration
use crate::domain::connection::ConnectionConfig;
use async_trait::async_trait;

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The saved configuration, or `None` if nothing was ever saved.
    async fn load(&self) -> anyhow::Result<Option<ConnectionConfig>>;

    /// Persist `config`, replacing whatever was saved before.
    async fn save(&self, config: &ConnectionConfig) -> anyhow::Result<()>;
}

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tc_core::{ChangeCommand, Result};

/// Operations the web layer needs from the shaping tool.
///
/// Implemented by [`crate::TcsetBackend`] for real hosts; tests plug in an
/// in-memory fake.
#[async_trait]
pub trait ShapingBackend: Send + Sync {
    /// Current rule set for one interface (the value `tcshow` keys by name)
    async fn show(&self, iface: &str) -> Result<Value>;

    /// Apply or overwrite the rule described by `cmd`
    async fn change(&self, cmd: &ChangeCommand) -> Result<()>;

    /// Remove every rule on `iface`
    async fn delete_all(&self, iface: &str) -> Result<()>;

    /// Load a full settings document from a file on disk
    async fn import(&self, path: &Path) -> Result<()>;
}

use serde_json::Value;
use std::sync::Arc;
use tc_core::{
    BANDWIDTH_UNITS, ChangeCommand, GuiConfig, RateUnit, Result, RuleForm, Snapshot, TcError,
};
use tc_shaper::{ImportFile, ShapingBackend};

use crate::error::ApiError;
use crate::metrics::ToolMetrics;

/// Everything the main page needs
#[derive(Debug, Clone)]
pub struct MainView {
    pub units: Vec<RateUnit>,
    pub standard_unit: RateUnit,
    pub settings: Snapshot,
    pub interfaces: Vec<String>,
}

/// Result of an add-rule request. The snapshot is returned either way.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub applied: bool,
    pub snapshot: Snapshot,
}

/// Turns requests into shaping tool calls and reports the live state back.
///
/// Holds no rule state of its own: every answer comes from a fresh query.
pub struct RuleController {
    config: GuiConfig,
    backend: Arc<dyn ShapingBackend>,
    metrics: ToolMetrics,
}

impl RuleController {
    pub fn new(config: GuiConfig, backend: Arc<dyn ShapingBackend>, metrics: ToolMetrics) -> Self {
        metrics.set_interfaces(config.interfaces.len());
        Self {
            config,
            backend,
            metrics,
        }
    }

    pub fn metrics(&self) -> &ToolMetrics {
        &self.metrics
    }

    pub async fn show_main(&self) -> Result<MainView> {
        Ok(MainView {
            units: BANDWIDTH_UNITS.to_vec(),
            standard_unit: RateUnit::default(),
            settings: self.query_snapshot().await?,
            interfaces: self.config.interfaces.clone(),
        })
    }

    /// Replace every rule with the JSON document in `raw`.
    ///
    /// Nothing is deleted unless `raw` parses. A rejected import is the
    /// caller's fault (400); a failed query afterwards is not.
    pub async fn import_settings(
        &self,
        raw: Option<&str>,
    ) -> std::result::Result<Snapshot, ApiError> {
        let raw = raw.ok_or_else(|| TcError::invalid_input("missing field: Settings"))?;
        let settings: Value = serde_json::from_str(raw)
            .map_err(|e| TcError::invalid_input(format!("settings are not valid JSON: {}", e)))?;

        self.delete_all().await;

        let file = ImportFile::write(&settings)?;
        let imported = self.backend.import(file.path()).await;
        self.metrics.record("tcset", imported.is_ok());
        drop(file);
        imported.map_err(|e| {
            if e.is_external_tool() {
                ApiError::bad_request(e)
            } else {
                ApiError::from(e)
            }
        })?;

        tracing::info!("imported settings");
        Ok(self.query_snapshot().await?)
    }

    pub async fn remove_all(&self) -> Result<Snapshot> {
        let failures = self.delete_all().await;
        if failures.is_empty() {
            tracing::info!("cleared all rules");
        }
        self.query_snapshot().await
    }

    /// Apply one rule. A rejected rule still yields the current snapshot.
    pub async fn add_rule(&self, form: &RuleForm) -> Result<RuleOutcome> {
        if form.interface.as_deref().is_none_or(str::is_empty) {
            return Err(TcError::invalid_input("missing field: Interface"));
        }

        let applied = match ChangeCommand::from_form(form) {
            Ok(cmd) => {
                tracing::info!(command = %cmd, "applying rule");
                let changed = self.backend.change(&cmd).await;
                self.metrics.record("tcset", changed.is_ok());
                match changed {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "rule rejected by tcset");
                        false
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "rule rejected before running tcset");
                false
            }
        };

        Ok(RuleOutcome {
            applied,
            snapshot: self.query_snapshot().await?,
        })
    }

    /// Ask the tool for the current rules of every configured interface
    pub async fn query_snapshot(&self) -> Result<Snapshot> {
        let mut snapshot = Snapshot::new();
        for iface in &self.config.interfaces {
            let rule = self.backend.show(iface).await;
            self.metrics.record("tcshow", rule.is_ok());
            snapshot.insert(iface.clone(), rule?);
        }

        tracing::debug!(settings = ?snapshot, "queried settings");
        Ok(snapshot)
    }

    /// Delete rules on every interface. Failures are logged and returned,
    /// never raised.
    pub async fn delete_all(&self) -> Vec<(String, TcError)> {
        let mut failures = Vec::new();
        for iface in &self.config.interfaces {
            let deleted = self.backend.delete_all(iface).await;
            self.metrics.record("tcdel", deleted.is_ok());
            if let Err(e) = deleted {
                tracing::warn!(iface = %iface, error = %e, "failed to delete rules");
                failures.push((iface.clone(), e));
            }
        }
        failures
    }
}

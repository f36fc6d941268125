use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tc_core::{ChangeCommand, GuiConfig, Result, TcError};
use tc_shaper::ShapingBackend;

use crate::controller::RuleController;
use crate::metrics::ToolMetrics;

#[derive(Default)]
struct FakeState {
    rules: HashMap<String, Value>,
    calls: Vec<String>,
    last_import: Option<PathBuf>,
    fail_show: bool,
    fail_show_exit: bool,
    fail_change: bool,
    fail_delete: bool,
    fail_import: bool,
}

/// In-memory stand-in for the tcconfig tools
#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

fn tool_error(command: String) -> TcError {
    TcError::ExternalTool {
        command,
        status: "exit status: 1".to_string(),
        output: "fake failure".to_string(),
    }
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn last_import_path(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().last_import.clone()
    }

    pub(crate) fn fail_show(&self, fail: bool) {
        self.state.lock().unwrap().fail_show = fail;
    }

    /// Make `tcshow` exit non-zero instead of printing bad output
    pub(crate) fn fail_show_exit(&self, fail: bool) {
        self.state.lock().unwrap().fail_show_exit = fail;
    }

    pub(crate) fn fail_change(&self, fail: bool) {
        self.state.lock().unwrap().fail_change = fail;
    }

    pub(crate) fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub(crate) fn fail_import(&self, fail: bool) {
        self.state.lock().unwrap().fail_import = fail;
    }
}

#[async_trait]
impl ShapingBackend for FakeBackend {
    async fn show(&self, iface: &str) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        let command = format!("tcshow {}", iface);
        state.calls.push(command.clone());
        if state.fail_show_exit {
            return Err(tool_error(command));
        }
        if state.fail_show {
            return Err(TcError::MalformedOutput {
                iface: iface.to_string(),
                reason: "fake failure".to_string(),
            });
        }
        Ok(state.rules.get(iface).cloned().unwrap_or_else(|| json!({})))
    }

    async fn change(&self, cmd: &ChangeCommand) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(cmd.to_string());
        if state.fail_change {
            return Err(tool_error(cmd.to_string()));
        }
        let rule = serde_json::to_value(&cmd.rule)?;
        state
            .rules
            .insert(cmd.interface.clone(), json!({ "outgoing": rule }));
        Ok(())
    }

    async fn delete_all(&self, iface: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let command = format!("tcdel --all {}", iface);
        state.calls.push(command.clone());
        if state.fail_delete {
            return Err(tool_error(command));
        }
        state.rules.remove(iface);
        Ok(())
    }

    async fn import(&self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let mut state = self.state.lock().unwrap();
        let command = format!("tcset --import-setting {}", path.display());
        state.calls.push(command.clone());
        state.last_import = Some(path.to_path_buf());
        if state.fail_import {
            return Err(tool_error(command));
        }
        let settings: Value = serde_json::from_str(&content)?;
        if let Some(map) = settings.as_object() {
            for (iface, rule) in map {
                state.rules.insert(iface.clone(), rule.clone());
            }
        }
        Ok(())
    }
}

pub(crate) fn controller(interfaces: &[&str], fake: FakeBackend) -> RuleController {
    let config = GuiConfig::new(interfaces.iter().map(|s| s.to_string()).collect());
    RuleController::new(config, Arc::new(fake), ToolMetrics::new().unwrap())
}

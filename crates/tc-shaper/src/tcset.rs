use crate::backend::ShapingBackend;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::Output;
use tc_core::{ChangeCommand, Result, TcError, ToolPaths};
use tokio::process::Command;

/// Runs the real tcconfig binaries as child processes
#[derive(Debug, Clone, Default)]
pub struct TcsetBackend {
    tools: ToolPaths,
}

impl TcsetBackend {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<Output> {
        let command = render_command(program, args);
        tracing::debug!(%command, "running shaping tool");

        let output = Command::new(program).args(args).output().await?;

        if !output.status.success() {
            let combined = combined_output(&output);
            tracing::warn!(%command, status = %output.status, output = %combined, "shaping tool failed");
            return Err(TcError::ExternalTool {
                command,
                status: output.status.to_string(),
                output: combined,
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl ShapingBackend for TcsetBackend {
    async fn show(&self, iface: &str) -> Result<Value> {
        let output = self.run(&self.tools.tcshow, &[iface.to_string()]).await?;
        parse_show_output(iface, &String::from_utf8_lossy(&output.stdout))
    }

    async fn change(&self, cmd: &ChangeCommand) -> Result<()> {
        self.run(&self.tools.tcset, &cmd.argv()).await?;
        Ok(())
    }

    async fn delete_all(&self, iface: &str) -> Result<()> {
        let args = ["--all".to_string(), iface.to_string()];
        self.run(&self.tools.tcdel, &args).await?;
        Ok(())
    }

    async fn import(&self, path: &Path) -> Result<()> {
        let args = [
            "--import-setting".to_string(),
            path.to_string_lossy().into_owned(),
        ];
        self.run(&self.tools.tcset, &args).await?;
        Ok(())
    }
}

/// Extract the entry for `iface` from a `tcshow` JSON document
pub fn parse_show_output(iface: &str, stdout: &str) -> Result<Value> {
    let parsed: Value = serde_json::from_str(stdout).map_err(|e| TcError::MalformedOutput {
        iface: iface.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .get(iface)
        .cloned()
        .ok_or_else(|| TcError::MalformedOutput {
            iface: iface.to_string(),
            reason: "interface missing from output".to_string(),
        })
}

fn render_command(program: &str, args: &[String]) -> String {
    let mut command = program.to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{}{}", stdout, stderr).trim().to_string()
}

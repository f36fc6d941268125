use crate::diagnostics::{Check, Finding};
use tc_core::ToolPaths;
use tokio::process::Command;

/// Checks that the tcconfig binaries can be executed
pub struct ToolDiagnostics {
    tools: ToolPaths,
}

impl ToolDiagnostics {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    pub async fn diagnose(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        for program in self.tools.all() {
            findings.push(probe(program).await);
        }
        findings
    }
}

/// A binary that runs but rejects `--version` is only suspicious; one that
/// cannot be spawned makes every request fail.
async fn probe(program: &str) -> Finding {
    let check = Check::Tool(program.to_string());
    match Command::new(program).arg("--version").output().await {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            Finding::ok(check, version.lines().next().unwrap_or("").trim())
        }
        Ok(output) => Finding::warning(
            check,
            format!(
                "--version exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        )
        .hint("reinstall tcconfig"),
        Err(e) => Finding::failed(check, format!("cannot run: {}", e))
            .hint("install tcconfig: pip install tcconfig"),
    }
}

pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Shaping needs CAP_NET_ADMIN; tcgui insists on root
pub fn check_privileges() -> Finding {
    let euid = nix::unistd::geteuid();
    if euid.is_root() {
        Finding::ok(Check::Privileges, "running as root")
    } else {
        Finding::failed(Check::Privileges, format!("running as euid {}", euid))
            .hint("run tcgui with sudo")
    }
}

pub mod diagnostics;
pub mod interfaces;
pub mod tools;

pub use diagnostics::{Check, Finding, Report, Severity};
pub use interfaces::InterfaceDiagnostics;
pub use tools::{ToolDiagnostics, check_privileges, is_root};

use tc_core::GuiConfig;
use tc_shaper::ShapingBackend;

/// Preflight checks for the host tcgui runs on
pub struct Doctor {
    tools: ToolDiagnostics,
}

impl Doctor {
    pub fn new(config: &GuiConfig) -> Self {
        Self {
            tools: ToolDiagnostics::new(config.tools.clone()),
        }
    }

    pub async fn run_all(&self, backend: &dyn ShapingBackend, interfaces: &[String]) -> Report {
        let mut report = Report::new();
        report.push(check_privileges());
        report.extend(self.tools.diagnose().await);
        report.extend(
            InterfaceDiagnostics::new(backend, interfaces)
                .diagnose()
                .await,
        );
        report
    }

    /// Tool checks only; cheap enough to run on every startup
    pub async fn check_tools(&self) -> Report {
        let mut report = Report::new();
        report.extend(self.tools.diagnose().await);
        report
    }
}

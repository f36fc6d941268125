use crate::diagnostics::{Check, Finding};
use tc_shaper::ShapingBackend;

/// Runs `tcshow` against each managed interface
pub struct InterfaceDiagnostics<'a> {
    backend: &'a dyn ShapingBackend,
    interfaces: &'a [String],
}

impl<'a> InterfaceDiagnostics<'a> {
    pub fn new(backend: &'a dyn ShapingBackend, interfaces: &'a [String]) -> Self {
        Self {
            backend,
            interfaces,
        }
    }

    pub async fn diagnose(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        for iface in self.interfaces {
            let check = Check::Interface(iface.clone());
            let finding = match self.backend.show(iface).await {
                Ok(_) => Finding::ok(check, "tcshow returned settings"),
                Err(e) => Finding::failed(check, e.to_string())
                    .hint(format!("check that it exists: ip link show {}", iface)),
            };
            findings.push(finding);
        }

        findings
    }
}

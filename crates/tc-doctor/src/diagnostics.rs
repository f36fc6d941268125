use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    /// Usable, but something looks off
    Warning,
    /// tcgui will not work until this is fixed
    Failed,
}

impl Severity {
    fn tag(&self) -> &'static str {
        match self {
            Self::Ok => " ok ",
            Self::Warning => "warn",
            Self::Failed => "FAIL",
        }
    }
}

/// What a finding is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Privileges,
    Tool(String),
    Interface(String),
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Privileges => f.write_str("privileges"),
            Self::Tool(program) => write!(f, "tool {}", program),
            Self::Interface(iface) => write!(f, "interface {}", iface),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Finding {
    pub check: Check,
    pub severity: Severity,
    pub detail: String,
    pub hint: Option<String>,
}

impl Finding {
    pub fn ok(check: Check, detail: impl Into<String>) -> Self {
        Self::with_severity(check, Severity::Ok, detail)
    }

    pub fn warning(check: Check, detail: impl Into<String>) -> Self {
        Self::with_severity(check, Severity::Warning, detail)
    }

    pub fn failed(check: Check, detail: impl Into<String>) -> Self {
        Self::with_severity(check, Severity::Failed, detail)
    }

    fn with_severity(check: Check, severity: Severity, detail: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            detail: detail.into(),
            hint: None,
        }
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Startup path: findings go to the log instead of stdout
    pub fn log(&self) {
        let check = self.check.to_string();
        match self.severity {
            Severity::Ok => tracing::debug!(check = %check, "{}", self.detail),
            Severity::Warning => tracing::warn!(check = %check, hint = ?self.hint, "{}", self.detail),
            Severity::Failed => tracing::error!(check = %check, hint = ?self.hint, "{}", self.detail),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity.tag(), self.check, self.detail)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n       -> {}", hint)?;
        }
        Ok(())
    }
}

/// Everything `tcgui doctor` found, in the order the checks ran
#[derive(Debug, Default)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Failed)
    }

    /// True when nothing would stop the server from shaping traffic
    pub fn is_ready(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in &self.findings {
            writeln!(f, "{}", finding)?;
        }

        let failed = self.failures().count();
        if failed == 0 {
            writeln!(f, "\ntcgui is ready")
        } else {
            writeln!(f, "\n{} check(s) failed", failed)
        }
    }
}

use crate::error::{Result, TcError};
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 5000;

/// Binary names for the shaping tool suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub tcset: String,
    pub tcshow: String,
    pub tcdel: String,
}

impl ToolPaths {
    pub fn new() -> Self {
        Self {
            tcset: "tcset".to_string(),
            tcshow: "tcshow".to_string(),
            tcdel: "tcdel".to_string(),
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.tcset, &self.tcshow, &self.tcdel]
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::new()
    }
}

/// Startup configuration. Built once, then shared read-only.
#[derive(Debug, Clone)]
pub struct GuiConfig {
    pub interfaces: Vec<String>,
    pub pattern: Option<Regex>,
    pub bind: SocketAddr,
    pub debug: bool,
    pub tools: ToolPaths,
}

impl GuiConfig {
    pub fn new(interfaces: Vec<String>) -> Self {
        Self {
            interfaces,
            pattern: None,
            bind: SocketAddr::new(DEFAULT_IP, DEFAULT_PORT),
            debug: false,
            tools: ToolPaths::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: Option<Regex>) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Split a space-separated device list ("eth0 eth1") into names
pub fn split_dev_list(list: &str) -> Vec<String> {
    list.split_whitespace().map(str::to_string).collect()
}

pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| TcError::Config(format!("invalid interface regex: {}", e)))
}

/// Pick the active interface set.
///
/// An explicit device list wins over the discovered links. The pattern, when
/// set, filters whichever list is used. An empty result is an error.
pub fn resolve_interfaces(
    devices: Option<&[String]>,
    pattern: Option<&Regex>,
    discovered: &[String],
) -> Result<Vec<String>> {
    let candidates = devices.unwrap_or(discovered);

    let mut interfaces: Vec<String> = Vec::new();
    for name in candidates {
        if pattern.is_some_and(|re| !re.is_match(name)) {
            continue;
        }
        if !interfaces.contains(name) {
            interfaces.push(name.clone());
        }
    }

    if interfaces.is_empty() {
        return Err(TcError::Config(
            "no interfaces selected; set --dev/TCGUI_DEV or --regex/TCGUI_REGEX".to_string(),
        ));
    }

    Ok(interfaces)
}

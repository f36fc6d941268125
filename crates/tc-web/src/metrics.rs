use anyhow::Result;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus counters for shaping tool invocations
#[derive(Clone)]
pub struct ToolMetrics {
    registry: Arc<Registry>,

    invocations: IntCounterVec,
    interfaces: IntGauge,
}

impl ToolMetrics {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let invocations = IntCounterVec::new(
            Opts::new(
                "tcgui_tool_invocations_total",
                "Shaping tool invocations by tool and outcome",
            ),
            &["tool", "outcome"],
        )?;
        registry.register(Box::new(invocations.clone()))?;

        let interfaces = IntGauge::new("tcgui_interfaces", "Number of managed interfaces")?;
        registry.register(Box::new(interfaces.clone()))?;

        Ok(Self {
            registry,
            invocations,
            interfaces,
        })
    }

    pub fn record(&self, tool: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        self.invocations.with_label_values(&[tool, outcome]).inc();
    }

    pub fn count(&self, tool: &str, ok: bool) -> u64 {
        let outcome = if ok { "ok" } else { "failed" };
        self.invocations.with_label_values(&[tool, outcome]).get()
    }

    pub fn set_interfaces(&self, count: usize) {
        self.interfaces.set(count as i64);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

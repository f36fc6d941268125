use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Live rule set for every configured interface, as reported by `tcshow`.
///
/// Entries keep the order interfaces were configured in. The values are the
/// tool's own JSON, untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    rules: Map<String, Value>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, iface: impl Into<String>, rule: Value) {
        self.rules.insert(iface.into(), rule);
    }

    pub fn get(&self, iface: &str) -> Option<&Value> {
        self.rules.get(iface)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serialize with four-space indentation
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        to_indented_json(&self.rules)
    }
}

/// Pretty-print any value with four-space indentation
pub fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

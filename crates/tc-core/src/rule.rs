use crate::error::{Result, TcError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bandwidth units accepted by `tcset --rate`, in display order
pub const BANDWIDTH_UNITS: [RateUnit; 5] = [
    RateUnit::Bps,
    RateUnit::Kbps,
    RateUnit::Mbps,
    RateUnit::Gbps,
    RateUnit::Tbps,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateUnit {
    /// Bits per second
    Bps,
    /// Kilobits per second
    Kbps,
    /// Megabits per second
    #[default]
    Mbps,
    /// Gigabits per second
    Gbps,
    /// Terabits per second
    Tbps,
}

impl RateUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bps => "bps",
            Self::Kbps => "kbps",
            Self::Mbps => "mbps",
            Self::Gbps => "gbps",
            Self::Tbps => "tbps",
        }
    }
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateUnit {
    type Err = TcError;

    fn from_str(s: &str) -> Result<Self> {
        BANDWIDTH_UNITS
            .iter()
            .copied()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| TcError::invalid_input(format!("unknown rate unit: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Source,
    Destination,
}

impl NetworkType {
    /// Anything other than "source" selects the destination filter
    pub fn from_form(value: &str) -> Self {
        if value == "source" {
            Self::Source
        } else {
            Self::Destination
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Self::Source => "--src-network",
            Self::Destination => "--dst-network",
        }
    }
}

/// Raw add-rule form submission. Every field may be missing or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleForm {
    #[serde(rename = "Interface")]
    pub interface: Option<String>,
    #[serde(rename = "Direction", default)]
    pub direction: String,
    #[serde(rename = "Network", default)]
    pub network: String,
    #[serde(rename = "NetworkType", default)]
    pub network_type: String,
    #[serde(rename = "Delay", default)]
    pub delay: String,
    #[serde(rename = "DelayVariance", default)]
    pub delay_variance: String,
    #[serde(rename = "Loss", default)]
    pub loss: String,
    #[serde(rename = "Duplicate", default)]
    pub duplicate: String,
    #[serde(rename = "Reorder", default)]
    pub reorder: String,
    #[serde(rename = "Corrupt", default)]
    pub corrupt: String,
    #[serde(rename = "Rate", default)]
    pub rate: String,
    #[serde(default)]
    pub rate_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkFilter {
    pub network: String,
    pub kind: NetworkType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub value: String,
    pub unit: RateUnit,
}

/// Delay in milliseconds. Variance only exists alongside a base delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delay {
    pub millis: String,
    pub variance: Option<String>,
}

/// Traffic-shaping attributes for one interface. `None` means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub direction: Option<String>,
    pub network: Option<NetworkFilter>,
    pub rate: Option<Rate>,
    pub delay: Option<Delay>,
    pub loss: Option<String>,
    pub duplicate: Option<String>,
    pub reorder: Option<String>,
    pub corrupt: Option<String>,
}

fn provided(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Rule {
    /// Normalize a form submission: empty strings become `None`.
    ///
    /// A variance without a delay is dropped. An empty unit falls back to
    /// the default unit; an unknown unit is rejected.
    pub fn from_form(form: &RuleForm) -> Result<Self> {
        let rate = match provided(&form.rate) {
            Some(value) => {
                let unit = if form.rate_unit.is_empty() {
                    RateUnit::default()
                } else {
                    form.rate_unit.parse()?
                };
                Some(Rate { value, unit })
            }
            None => None,
        };

        let delay = provided(&form.delay).map(|millis| Delay {
            millis,
            variance: provided(&form.delay_variance),
        });

        Ok(Self {
            direction: provided(&form.direction),
            network: provided(&form.network).map(|network| NetworkFilter {
                network,
                kind: NetworkType::from_form(&form.network_type),
            }),
            rate,
            delay,
            loss: provided(&form.loss),
            duplicate: provided(&form.duplicate),
            reorder: provided(&form.reorder),
            corrupt: provided(&form.corrupt),
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Flags for `tcset --change`, in the order the tool expects them
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(direction) = &self.direction {
            args.push("--direction".to_string());
            args.push(direction.clone());
        }
        if let Some(filter) = &self.network {
            args.push(filter.kind.flag().to_string());
            args.push(filter.network.clone());
        }
        if let Some(rate) = &self.rate {
            args.push("--rate".to_string());
            args.push(format!("{}{}", rate.value, rate.unit));
        }
        if let Some(delay) = &self.delay {
            args.push("--delay".to_string());
            args.push(format!("{}ms", delay.millis));
            if let Some(variance) = &delay.variance {
                args.push("--delay-distro".to_string());
                args.push(format!("{}ms", variance));
            }
        }

        let percentages = [
            ("--loss", &self.loss),
            ("--duplicate", &self.duplicate),
            ("--reordering", &self.reorder),
            ("--corrupt", &self.corrupt),
        ];
        for (flag, value) in percentages {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }

        args
    }
}

/// A fully built `tcset --change <iface> ...` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCommand {
    pub interface: String,
    pub rule: Rule,
}

impl ChangeCommand {
    pub fn new(interface: impl Into<String>, rule: Rule) -> Self {
        Self {
            interface: interface.into(),
            rule,
        }
    }

    /// Build from a form submission. A missing or empty interface is rejected.
    pub fn from_form(form: &RuleForm) -> Result<Self> {
        let interface = form
            .interface
            .as_deref()
            .filter(|iface| !iface.is_empty())
            .ok_or_else(|| TcError::invalid_input("missing field: Interface"))?;

        Ok(Self::new(interface, Rule::from_form(form)?))
    }

    /// Arguments after the `tcset` binary name
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec!["--change".to_string(), self.interface.clone()];
        argv.extend(self.rule.to_args());
        argv
    }
}

impl fmt::Display for ChangeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcset {}", self.argv().join(" "))
    }
}

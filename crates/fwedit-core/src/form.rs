// ── Rule form helpers ──
//
// Client-side checks and conversions used by the create/edit drawer
// before a rule reaches the editor: field validation, port preset
// handling, predefined rule templates, and address list normalisation.

use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::CoreError;
use crate::model::{
    ALL_IPV4, ALL_IPV6, FirewallRule, RuleAction, RuleAddresses, RuleProtocol, is_prefix_list,
};

pub const IP_ERROR_MESSAGE: &str = "Must be a valid IPv4 or IPv6 range.";
pub const EMPTY_IP_MESSAGE: &str = "Please enter an IP address.";
pub const CUSTOM_PORTS_ERROR_MESSAGE: &str =
    "Ports must be an integer, range of integers, or a comma-separated list of integers.";

/// Port string meaning "every port".
pub const ALL_PORTS: &str = "1-65535";

const MAX_PORT_ENDPOINTS: usize = 15;

// ── Port validation ──────────────────────────────────────────────────

/// Validate a custom port specification such as `"22, 80, 8000-8100"`.
///
/// Single ports count as one endpoint, ranges as two; at most 15 are
/// accepted.
pub fn is_custom_ports_valid(ports: &str) -> bool {
    let mut endpoints = 0;
    for entry in ports.split(',').map(str::trim) {
        if let Some((start, end)) = entry.split_once('-') {
            match (parse_port(start), parse_port(end)) {
                (Some(start), Some(end)) if start < end => endpoints += 2,
                _ => return false,
            }
        } else if parse_port(entry).is_some() {
            endpoints += 1;
        } else {
            return false;
        }
    }
    endpoints <= MAX_PORT_ENDPOINTS
}

fn parse_port(raw: &str) -> Option<u16> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok().filter(|port| *port >= 1)
}

// ── Port presets ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortPreset {
    pub label: &'static str,
    pub value: &'static str,
}

pub const PRESET_CUSTOM: PortPreset = PortPreset {
    label: "Custom",
    value: "CUSTOM",
};
pub const PRESET_ALL: PortPreset = PortPreset {
    label: "All Ports",
    value: "ALL",
};

pub const PORT_PRESETS: [PortPreset; 7] = [
    PortPreset {
        label: "22 (SSH)",
        value: "22",
    },
    PortPreset {
        label: "80 (HTTP)",
        value: "80",
    },
    PortPreset {
        label: "443 (HTTPS)",
        value: "443",
    },
    PortPreset {
        label: "3306 (MySQL)",
        value: "3306",
    },
    PortPreset {
        label: "53 (DNS)",
        value: "53",
    },
    PRESET_CUSTOM,
    PRESET_ALL,
];

fn preset_for(value: &str) -> Option<PortPreset> {
    PORT_PRESETS.iter().copied().find(|p| p.value == value)
}

/// Combine selected preset values with free-form input into the port
/// string the backend expects.
///
/// `ALL` wins outright. Otherwise entries are de-duplicated and sorted by
/// their leading port number.
pub fn items_to_port_string(selected: &[&str], custom_input: &str) -> String {
    if selected.contains(&PRESET_ALL.value) {
        return ALL_PORTS.into();
    }

    let mut ports: Vec<String> = Vec::new();
    let presets = selected
        .iter()
        .filter(|value| **value != PRESET_CUSTOM.value)
        .map(|value| (*value).to_owned());
    let custom = custom_input
        .split(',')
        .map(str::trim)
        .filter(|port| !port.is_empty())
        .map(str::to_owned);
    for port in presets.chain(custom) {
        if !ports.contains(&port) {
            ports.push(port);
        }
    }

    ports.sort_by_key(|port| (leading_number(port), port.clone()));
    ports.join(", ")
}

fn leading_number(port: &str) -> u32 {
    port.split('-')
        .next()
        .and_then(|start| start.trim().parse().ok())
        .unwrap_or(u32::MAX)
}

/// Inverse of [`items_to_port_string`]: split a port string into the
/// presets it contains and the leftover custom input.
pub fn port_string_to_items(ports: Option<&str>) -> (Vec<PortPreset>, String) {
    let Some(ports) = ports.filter(|p| !p.is_empty()) else {
        return (Vec::new(), String::new());
    };
    if ports.contains(ALL_PORTS) {
        return (vec![PRESET_ALL], String::new());
    }

    let mut items: Vec<PortPreset> = Vec::new();
    let mut custom: Vec<&str> = Vec::new();
    for port in ports.split(',').map(str::trim) {
        match preset_for(port) {
            Some(preset) if items.contains(&preset) => {}
            Some(preset) => items.push(preset),
            None => custom.push(port),
        }
    }
    if !custom.is_empty() {
        items.push(PRESET_CUSTOM);
    }
    (items, custom.join(", "))
}

// ── Predefined rules ─────────────────────────────────────────────────

/// Common single-port TCP rules open to every address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FirewallPreset {
    Ssh,
    Http,
    Https,
    Mysql,
    Dns,
}

impl FirewallPreset {
    pub fn port(self) -> &'static str {
        match self {
            Self::Ssh => "22",
            Self::Http => "80",
            Self::Https => "443",
            Self::Mysql => "3306",
            Self::Dns => "53",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ssh => "SSH",
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
            Self::Mysql => "MySQL",
            Self::Dns => "DNS",
        }
    }

    /// The inbound rule this preset stands for.
    pub fn rule(self) -> FirewallRule {
        FirewallRule {
            action: RuleAction::Accept,
            protocol: RuleProtocol::Tcp,
            ports: Some(self.port().into()),
            addresses: Some(RuleAddresses::all()),
            label: Some(format!("accept-inbound-{}", self.label().to_uppercase())),
            description: None,
            ruleset: None,
        }
    }

    /// Recognise a rule that matches a preset (TCP, all addresses, the
    /// preset's port).
    pub fn from_rule(rule: &FirewallRule) -> Option<Self> {
        if rule.protocol != RuleProtocol::Tcp {
            return None;
        }
        if !rule.addresses.as_ref().is_some_and(RuleAddresses::allows_all_ips) {
            return None;
        }
        let ports = rule.ports.as_deref()?;
        Self::iter().find(|preset| preset.port() == ports)
    }
}

/// Table label for a rule's type: the preset name, or "Custom".
pub fn rule_type_label(rule: &FirewallRule) -> &'static str {
    FirewallPreset::from_rule(rule).map_or("Custom", FirewallPreset::label)
}

// ── Addresses ────────────────────────────────────────────────────────

/// Address selector of the rule form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum AddressChoice {
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
    #[serde(rename = "allIPv4")]
    #[strum(serialize = "allIPv4")]
    AllIpv4,
    #[serde(rename = "allIPv6")]
    #[strum(serialize = "allIPv6")]
    AllIpv6,
    #[serde(rename = "ip/netmask")]
    #[strum(serialize = "ip/netmask")]
    IpNetmask,
}

impl AddressChoice {
    /// Pick the selector that reproduces an existing address set.
    pub fn for_addresses(addresses: Option<&RuleAddresses>) -> Self {
        let Some(addresses) = addresses else {
            return Self::IpNetmask;
        };
        if addresses.allows_all_ips() {
            Self::All
        } else if addresses.allows_all_ipv4() && addresses.allows_no_ipv6() {
            Self::AllIpv4
        } else if addresses.allows_all_ipv6() && addresses.allows_no_ipv4() {
            Self::AllIpv6
        } else {
            Self::IpNetmask
        }
    }

    /// Addresses payload for this selection; `ips` is only read for
    /// [`AddressChoice::IpNetmask`].
    pub fn to_addresses(self, ips: &[String]) -> RuleAddresses {
        match self {
            Self::All => RuleAddresses::all(),
            Self::AllIpv4 => RuleAddresses {
                ipv4: Some(vec![ALL_IPV4.into()]),
                ipv6: None,
            },
            Self::AllIpv6 => RuleAddresses {
                ipv4: None,
                ipv6: Some(vec![ALL_IPV6.into()]),
            },
            Self::IpNetmask => classify_ips(ips),
        }
    }
}

/// One line of the combined IPv4 + IPv6 address editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRow {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append `/32` or `/128` to bare addresses. Unparseable entries are
/// returned untouched for validation to flag.
pub fn enforce_ip_masks(ips: &[String]) -> Vec<String> {
    ips.iter()
        .map(|ip| {
            if ip.contains('/') {
                return ip.clone();
            }
            match ip.parse::<IpAddr>() {
                Ok(IpAddr::V4(_)) => format!("{ip}/32"),
                Ok(IpAddr::V6(_)) => format!("{ip}/128"),
                Err(_) => ip.clone(),
            }
        })
        .collect()
}

/// Attach an error to every address that is not a valid IP or CIDR
/// range. Prefix-list references are accepted as-is.
pub fn validate_ips(ips: &[String], allow_empty: bool) -> Vec<AddressRow> {
    ips.iter()
        .map(|address| {
            let error = if address.is_empty() {
                (!allow_empty).then(|| EMPTY_IP_MESSAGE.to_owned())
            } else if is_prefix_list(address) || is_ip_or_range(address) {
                None
            } else {
                Some(IP_ERROR_MESSAGE.to_owned())
            };
            AddressRow {
                address: address.clone(),
                error,
            }
        })
        .collect()
}

fn is_ip_or_range(address: &str) -> bool {
    address.parse::<IpNet>().is_ok() || address.parse::<IpAddr>().is_ok()
}

/// Split addresses by family, dropping anything unparseable.
pub fn classify_ips(ips: &[String]) -> RuleAddresses {
    let mut addresses = RuleAddresses::default();
    for ip in ips {
        let base = ip.split('/').next().unwrap_or_default();
        let bucket = match base.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => &mut addresses.ipv4,
            Ok(IpAddr::V6(_)) => &mut addresses.ipv6,
            Err(_) => continue,
        };
        bucket.get_or_insert_with(Vec::new).push(ip.clone());
    }
    addresses
}

// ── Form validation ──────────────────────────────────────────────────

/// Values of the create/edit rule form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleForm {
    #[serde(default)]
    pub action: Option<RuleAction>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub protocol: Option<RuleProtocol>,
    #[serde(default)]
    pub ports: String,
    #[serde(default)]
    pub addresses: Option<AddressChoice>,
}

impl RuleForm {
    /// Prefill the form from an existing rule.
    pub fn from_rule(rule: &FirewallRule) -> Self {
        Self {
            action: Some(rule.action),
            label: rule.label.clone().unwrap_or_default(),
            description: rule.description.clone().unwrap_or_default(),
            protocol: Some(rule.protocol),
            ports: rule.ports.clone().unwrap_or_default(),
            addresses: Some(AddressChoice::for_addresses(rule.addresses.as_ref())),
        }
    }

    pub fn validate(&self) -> FormErrors {
        validate_rule_form(self)
    }
}

/// Per-field messages; `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }

    /// `(field, message)` pairs in form order.
    pub fn messages(&self) -> Vec<(&'static str, &str)> {
        [
            ("label", &self.label),
            ("description", &self.description),
            ("protocol", &self.protocol),
            ("addresses", &self.addresses),
            ("ports", &self.ports),
        ]
        .into_iter()
        .filter_map(|(field, msg)| msg.as_deref().map(|m| (field, m)))
        .collect()
    }

    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Ok(());
        }
        let message = self
            .messages()
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        Err(CoreError::Validation { message })
    }
}

pub fn validate_rule_form(form: &RuleForm) -> FormErrors {
    let mut errors = FormErrors {
        label: validate_label(&form.label),
        ..FormErrors::default()
    };

    if form.description.chars().count() > 100 {
        errors.description = Some("Description must be 1-100 characters.".into());
    }
    if form.protocol.is_none() {
        errors.protocol = Some("Protocol is required.".into());
    }
    if form.addresses.is_none() {
        errors.addresses = Some("Sources is a required field.".into());
    }

    let portless = form.protocol.filter(|p| p.forbids_ports());
    if let Some(protocol) = portless {
        if !form.ports.is_empty() {
            errors.ports = Some(format!("Ports are not allowed for {protocol} protocols."));
        }
    } else if form.ports.is_empty() {
        errors.ports = Some("Ports is a required field.".into());
    } else if !is_custom_ports_valid(&form.ports) {
        errors.ports = Some(CUSTOM_PORTS_ERROR_MESSAGE.into());
    }

    errors
}

fn validate_label(label: &str) -> Option<String> {
    if label.is_empty() {
        return Some("Label is required.".into());
    }
    let len = label.chars().count();
    if !(3..=32).contains(&len) {
        return Some("Label must be 3-32 characters.".into());
    }
    if !label.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Some("Label must begin with a letter.".into());
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Some(
            "Label must include only ASCII letters, numbers, underscores, periods, and dashes."
                .into(),
        );
    }
    None
}

// ── Firewall rule domain types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Catch-all IPv4 range.
pub const ALL_IPV4: &str = "0.0.0.0/0";
/// Catch-all IPv6 range.
pub const ALL_IPV6: &str = "::/0";

const PREFIX_LIST_MARKER: &str = "pl:";

/// What a rule (or a category's default policy) does with matching traffic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum RuleAction {
    Accept,
    Drop,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum RuleProtocol {
    Tcp,
    Udp,
    Icmp,
    Ipencap,
}

impl RuleProtocol {
    /// ICMP and IPENCAP carry no port numbers; the backend rejects a
    /// `ports` value for them.
    pub fn forbids_ports(self) -> bool {
        matches!(self, Self::Icmp | Self::Ipencap)
    }
}

/// Rule direction. Each category is edited in its own revision store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Inbound,
    Outbound,
}

/// Source (inbound) or destination (outbound) addresses of a rule.
///
/// Entries are CIDR strings or opaque prefix-list references (`pl:...`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAddresses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Vec<String>>,
}

impl RuleAddresses {
    pub fn all() -> Self {
        Self {
            ipv4: Some(vec![ALL_IPV4.into()]),
            ipv6: Some(vec![ALL_IPV6.into()]),
        }
    }

    pub fn ipv4(&self) -> &[String] {
        self.ipv4.as_deref().unwrap_or_default()
    }

    pub fn ipv6(&self) -> &[String] {
        self.ipv6.as_deref().unwrap_or_default()
    }

    pub fn allows_all_ipv4(&self) -> bool {
        self.ipv4().iter().any(|ip| ip == ALL_IPV4)
    }

    pub fn allows_all_ipv6(&self) -> bool {
        self.ipv6().iter().any(|ip| ip == ALL_IPV6)
    }

    pub fn allows_all_ips(&self) -> bool {
        self.allows_all_ipv4() && self.allows_all_ipv6()
    }

    pub fn allows_no_ipv4(&self) -> bool {
        self.ipv4().is_empty()
    }

    pub fn allows_no_ipv6(&self) -> bool {
        self.ipv6().is_empty()
    }

    /// Human-readable summary: "All IPv4"/"All IPv6" first, then the
    /// individual entries, truncated after three with a `+N` suffix.
    pub fn label(&self) -> String {
        let all_v4 = self.allows_all_ipv4();
        let all_v6 = self.allows_all_ipv6();

        let mut parts: Vec<&str> = Vec::new();
        if all_v4 {
            parts.push("All IPv4");
        }
        if all_v6 {
            parts.push("All IPv6");
        }
        if !all_v4 {
            parts.extend(self.ipv4().iter().map(String::as_str));
        }
        if !all_v6 {
            parts.extend(self.ipv6().iter().map(String::as_str));
        }

        if parts.is_empty() {
            return "None".into();
        }
        truncate_and_join(&parts, 3)
    }

    /// Map each referenced prefix list to the address families using it.
    pub fn prefix_list_references(&self) -> BTreeMap<String, PrefixListReference> {
        let mut refs: BTreeMap<String, PrefixListReference> = BTreeMap::new();
        for ip in self.ipv4().iter().filter(|ip| is_prefix_list(ip)) {
            refs.entry(ip.clone()).or_default().in_ipv4_rule = true;
        }
        for ip in self.ipv6().iter().filter(|ip| is_prefix_list(ip)) {
            refs.entry(ip.clone()).or_default().in_ipv6_rule = true;
        }
        refs
    }
}

/// Which address families of a rule reference a given prefix list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixListReference {
    pub in_ipv4_rule: bool,
    pub in_ipv6_rule: bool,
}

impl PrefixListReference {
    /// Display tag such as `(IPv4, IPv6)`.
    pub fn tag(self) -> &'static str {
        match (self.in_ipv4_rule, self.in_ipv6_rule) {
            (true, true) => "(IPv4, IPv6)",
            (false, true) => "(IPv6)",
            _ => "(IPv4)",
        }
    }
}

pub fn is_prefix_list(address: &str) -> bool {
    address.starts_with(PREFIX_LIST_MARKER)
}

fn truncate_and_join(parts: &[&str], max: usize) -> String {
    if parts.len() <= max {
        return parts.join(", ");
    }
    let (shown, rest) = parts.split_at(max);
    format!("{}, plus {} more", shown.join(", "), rest.len())
}

/// One firewall rule, in the shape the backend accepts and returns.
///
/// Immutable by convention: edits go through [`FirewallRule::merged`],
/// which yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    pub action: RuleAction,
    pub protocol: RuleProtocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<RuleAddresses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reference to a backend-managed rule set, carried opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<u64>,
}

impl FirewallRule {
    /// Apply every field present in `patch` on top of this rule.
    pub fn merged(&self, patch: &RulePatch) -> Self {
        Self {
            action: patch.action.unwrap_or(self.action),
            protocol: patch.protocol.unwrap_or(self.protocol),
            ports: patch.ports.clone().or_else(|| self.ports.clone()),
            addresses: patch.addresses.clone().or_else(|| self.addresses.clone()),
            label: patch.label.clone().or_else(|| self.label.clone()),
            description: patch
                .description
                .clone()
                .or_else(|| self.description.clone()),
            ruleset: patch.ruleset.or(self.ruleset),
        }
    }

    pub fn addresses_label(&self) -> String {
        self.addresses
            .as_ref()
            .map_or_else(|| "None".into(), RuleAddresses::label)
    }
}

/// Partial rule submitted by the edit drawer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<RuleAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<RuleProtocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<RuleAddresses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<u64>,
}

/// The server-side rule document for one firewall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRules {
    #[serde(default)]
    pub inbound: Vec<FirewallRule>,
    #[serde(default)]
    pub outbound: Vec<FirewallRule>,
    pub inbound_policy: RuleAction,
    pub outbound_policy: RuleAction,
}

impl FirewallRules {
    pub fn rules(&self, category: Category) -> &[FirewallRule] {
        match category {
            Category::Inbound => &self.inbound,
            Category::Outbound => &self.outbound,
        }
    }

    pub fn policy(&self, category: Category) -> RuleAction {
        match category {
            Category::Inbound => self.inbound_policy,
            Category::Outbound => self.outbound_policy,
        }
    }
}

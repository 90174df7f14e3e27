// ── Backend error reconciliation ──
//
// The backend reports rule validation failures as flat field paths:
//
//     rules.<category>[<idx>].<ports|protocol|addresses>[.<ipv4|ipv6>[<n>]]
//
// Each component is located by the first matching substring rather
// than a strict grammar. A path that stops matching degrades to a
// general (unscoped) error instead of failing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::form::{AddressRow, IP_ERROR_MESSAGE};
use crate::model::{FieldError, FirewallRule, FormField, IpFamily, IpRef, RuleAddresses};

static CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"inbound|outbound").expect("category pattern is valid"));
static RULE_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("index pattern is valid"));
static FORM_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ports|protocol|addresses").expect("form field pattern is valid")
});
static IP_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ipv4|ipv6").expect("ip family pattern is valid"));
static BRACKETED_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\d+)\]").expect("bracket pattern is valid"));

/// One entry of a backend error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub reason: String,
}

impl ApiError {
    pub fn general(reason: impl Into<String>) -> Self {
        Self {
            field: None,
            reason: reason.into(),
        }
    }
}

/// Parse a backend field path into a rule-scoped error.
///
/// Returns `None` when the category, rule index or form field cannot be
/// found; the caller treats the error as general. An IP family without
/// a readable bracketed index yields an error with no `ip` reference.
pub fn parse_field_error(field: &str, reason: &str) -> Option<FieldError> {
    let category = CATEGORY.find(field)?.as_str().parse().ok()?;
    let idx = RULE_INDEX.find(field)?.as_str().parse().ok()?;
    let form_field = FORM_FIELD.find(field)?.as_str().parse().ok()?;

    let ip = IP_FAMILY.find(field).and_then(|family_match| {
        let family: IpFamily = family_match.as_str().parse().ok()?;
        let rest = field.get(family_match.end()..)?;
        let caps = BRACKETED_INDEX.captures(rest)?;
        let idx = caps.get(1)?.as_str().parse().ok()?;
        Some(IpRef { family, idx })
    });

    Some(FieldError {
        category,
        idx,
        form_field,
        ip,
        reason: reason.to_owned(),
    })
}

impl FieldError {
    /// Scope a backend error; `None` for errors without a field.
    pub fn from_api_error(err: &ApiError) -> Option<Self> {
        parse_field_error(err.field.as_deref()?, &err.reason)
    }
}

// ── Mapping errors back onto the edit form ───────────────────────────

/// Index into the combined address list, where all IPv4 entries are
/// listed before the IPv6 ones.
pub fn combined_address_index(addresses: Option<&RuleAddresses>, ip: IpRef) -> usize {
    match ip.family {
        IpFamily::Ipv4 => ip.idx,
        IpFamily::Ipv6 => addresses.map_or(0, |a| a.ipv4().len()) + ip.idx,
    }
}

/// Build the address editor rows for a rule, marking the entries that
/// backend errors point at. References past the end of the list are
/// ignored.
pub fn address_rows(rule: &FirewallRule, errors: &[FieldError]) -> Vec<AddressRow> {
    let addresses = rule.addresses.as_ref();
    let mut rows: Vec<AddressRow> = addresses
        .map(|a| a.ipv4().iter().chain(a.ipv6()).cloned().collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|address| AddressRow {
            address,
            error: None,
        })
        .collect();

    for error in errors {
        let Some(ip) = error.ip else { continue };
        if error.form_field != FormField::Addresses {
            continue;
        }
        let index = combined_address_index(addresses, ip);
        if let Some(row) = rows.get_mut(index) {
            row.error = Some(IP_ERROR_MESSAGE.to_owned());
        }
    }
    rows
}

/// Errors for the non-address form fields, last one per field wins.
pub fn field_errors(errors: &[FieldError]) -> BTreeMap<FormField, String> {
    errors
        .iter()
        .filter(|e| e.form_field != FormField::Addresses)
        .map(|e| (e.form_field, e.reason.clone()))
        .collect()
}

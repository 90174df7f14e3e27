// ── Rule-scoped validation errors ──
//
// A backend validation error that could be traced to one rule. Built by
// `reconcile::parse_field_error`, attached to revisions by `SET_ERROR`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::rule::Category;

/// Rule form field a backend error points at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FormField {
    Ports,
    Protocol,
    Addresses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IpFamily {
    Ipv4,
    Ipv6,
}

/// Position of one address entry inside `addresses.ipv4` / `addresses.ipv6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRef {
    #[serde(rename = "type")]
    pub family: IpFamily,
    pub idx: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub category: Category,
    /// Index into the submitted rule list of `category`.
    pub idx: usize,
    pub form_field: FormField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<IpRef>,
    pub reason: String,
}

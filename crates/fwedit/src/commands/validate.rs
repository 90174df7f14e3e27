//! `validate` handler: the rule form checks, applied to one rule.

use std::fmt::Write;

use serde::Serialize;
use tabled::Tabled;

use fwedit_core::form::{
    AddressChoice, AddressRow, FormErrors, RuleForm, enforce_ip_masks, rule_type_label,
    validate_ips,
};
use fwedit_core::FirewallRule;

use crate::cli::ValidateArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct ValidateView {
    valid: bool,
    rule_type: &'static str,
    errors: FormErrors,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    addresses: Vec<AddressRow>,
}

#[derive(Tabled)]
struct AddressTableRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl ValidateView {
    fn build(rule: &FirewallRule, enforce_masks: bool) -> Self {
        let form = RuleForm::from_rule(rule);
        let errors = form.validate();

        let addresses = if form.addresses == Some(AddressChoice::IpNetmask) {
            let ips: Vec<String> = rule
                .addresses
                .as_ref()
                .map(|a| a.ipv4().iter().chain(a.ipv6()).cloned().collect())
                .unwrap_or_default();
            let ips = if enforce_masks {
                enforce_ip_masks(&ips)
            } else {
                ips
            };
            validate_ips(&ips, false)
        } else {
            Vec::new()
        };

        Self {
            valid: errors.is_empty() && addresses.iter().all(|row| row.error.is_none()),
            rule_type: rule_type_label(rule),
            errors,
            addresses,
        }
    }

    fn detail(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Type:   {}", self.rule_type);
        let _ = write!(out, "Valid:  {}", if self.valid { "yes" } else { "no" });
        for (field, message) in self.errors.messages() {
            let _ = write!(out, "\n  {field}: {message}");
        }
        if !self.addresses.is_empty() {
            let rows: Vec<AddressTableRow> = self
                .addresses
                .iter()
                .map(|row| AddressTableRow {
                    address: row.address.clone(),
                    error: row.error.clone().unwrap_or_default(),
                })
                .collect();
            let _ = write!(out, "\n{}", output::render_table(&rows));
        }
        out
    }

    fn plain(&self) -> String {
        if self.valid {
            return "valid".into();
        }
        self.errors
            .messages()
            .into_iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .chain(
                self.addresses
                    .iter()
                    .filter_map(|row| row.error.as_ref().map(|e| format!("{}: {e}", row.address))),
            )
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn into_result(self) -> Result<(), CliError> {
        self.errors.into_result()?;
        let invalid: Vec<String> = self
            .addresses
            .into_iter()
            .filter(|row| row.error.is_some())
            .map(|row| row.address)
            .collect();
        if invalid.is_empty() {
            return Ok(());
        }
        Err(CliError::Validation {
            field: "addresses".into(),
            reason: format!("invalid entries: {}", invalid.join(", ")),
        })
    }
}

pub fn handle(args: &ValidateArgs, settings: &Settings) -> Result<(), CliError> {
    let rule = util::read_rule(&args.rule)?;
    let view = ValidateView::build(&rule, settings.enforce_ip_masks);

    let out = output::render_single(
        settings.output,
        &view,
        ValidateView::detail,
        ValidateView::plain,
    );
    output::print_output(&out, settings.quiet);
    view.into_result()
}

//! Tax cascade calculation
//!
//! Tax rules are applied strictly in order. A row charged on the previous
//! row total reads the running total left by the row before it, so rows can
//! never be evaluated independently of each other.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::AccountMapping;
use crate::types::*;
use crate::utils::money::{is_positive, percent_of, round_money};

/// How a tax row derives its amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChargeType {
    /// Rate applied to the invoice net total
    #[default]
    #[serde(rename = "On Net Total")]
    OnNetTotal,
    /// Rate applied to the running total after the previous row
    #[serde(rename = "On Previous Row Total")]
    OnPreviousRowTotal,
    /// Fixed amount taken verbatim from the rule
    #[serde(rename = "Actual")]
    Actual,
    /// Any charge type this engine does not know; contributes nothing
    #[serde(other)]
    Unsupported,
}

/// Whether a tax row increases or reduces the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AddDeduct {
    #[default]
    Add,
    Deduct,
}

/// One row of a tax template, as configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    #[serde(default)]
    pub charge_type: ChargeType,
    #[serde(default)]
    pub account_head: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "zero")]
    pub rate: BigDecimal,
    #[serde(default, alias = "add_deduct_tax")]
    pub add_deduct: AddDeduct,
    /// Fixed amount for `Actual` rows
    #[serde(default)]
    pub tax_amount: Option<BigDecimal>,
}

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

impl TaxRule {
    /// Percentage rule charged on the net total
    pub fn on_net_total(account_head: impl Into<String>, description: impl Into<String>, rate: BigDecimal) -> Self {
        Self {
            charge_type: ChargeType::OnNetTotal,
            account_head: account_head.into(),
            description: description.into(),
            rate,
            add_deduct: AddDeduct::Add,
            tax_amount: None,
        }
    }

    /// Percentage rule charged on the previous row's running total
    pub fn on_previous_row_total(
        account_head: impl Into<String>,
        description: impl Into<String>,
        rate: BigDecimal,
    ) -> Self {
        Self {
            charge_type: ChargeType::OnPreviousRowTotal,
            ..Self::on_net_total(account_head, description, rate)
        }
    }

    /// Fixed-amount rule
    pub fn actual(account_head: impl Into<String>, description: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            charge_type: ChargeType::Actual,
            tax_amount: Some(amount),
            ..Self::on_net_total(account_head, description, zero())
        }
    }

    /// Mark the rule as a deduction
    pub fn deduct(mut self) -> Self {
        self.add_deduct = AddDeduct::Deduct;
        self
    }

    fn rate_in_range(&self) -> bool {
        self.rate >= zero() && self.rate <= BigDecimal::from(100)
    }

    fn check_rate(&self, row: usize) -> PostingResult<()> {
        if self.charge_type == ChargeType::Actual || self.rate_in_range() {
            Ok(())
        } else {
            Err(PostingError::invalid_rate(row, &self.rate))
        }
    }
}

/// A computed tax row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    pub charge_type: ChargeType,
    pub account_head: String,
    pub description: String,
    pub rate: BigDecimal,
    pub add_deduct: AddDeduct,
    /// Signed amount; negative for deductions
    pub tax_amount: BigDecimal,
    /// Running total after this row
    pub running_total: BigDecimal,
}

/// Outcome of applying a tax cascade to a net total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    pub taxes: Vec<TaxLine>,
    pub total_taxes: BigDecimal,
    pub grand_total: BigDecimal,
}

impl TaxResult {
    /// Apply the ordered tax rules to `net_total`
    pub fn apply(net_total: &BigDecimal, tax_rules: &[TaxRule]) -> PostingResult<Self> {
        if !is_positive(net_total) {
            return Err(PostingError::InvalidAmount {
                field: "net_total",
                value: net_total.clone(),
            });
        }

        let mut taxes = Vec::with_capacity(tax_rules.len());
        // Unrounded; only the base for `OnPreviousRowTotal` rows
        let mut base_total = net_total.clone();
        // Reported totals accumulate the rounded row amounts, so they always
        // add up to exactly what gets posted.
        let mut running_total = round_money(net_total);
        let mut total_taxes = zero();

        for (row, rule) in tax_rules.iter().enumerate() {
            rule.check_rate(row)?;

            let magnitude = match rule.charge_type {
                ChargeType::OnNetTotal => percent_of(&rule.rate, net_total),
                ChargeType::OnPreviousRowTotal => percent_of(&rule.rate, &base_total),
                ChargeType::Actual => rule.tax_amount.clone().unwrap_or_else(zero),
                ChargeType::Unsupported => zero(),
            };

            let tax_amount = match rule.add_deduct {
                AddDeduct::Add => magnitude,
                AddDeduct::Deduct => -magnitude.abs(),
            };

            base_total += &tax_amount;

            let tax_amount = round_money(&tax_amount);
            running_total += &tax_amount;
            total_taxes += &tax_amount;

            taxes.push(TaxLine {
                charge_type: rule.charge_type,
                account_head: rule.account_head.clone(),
                description: rule.description.clone(),
                rate: rule.rate.clone(),
                add_deduct: rule.add_deduct,
                tax_amount,
                running_total: running_total.clone(),
            });
        }

        Ok(Self {
            taxes,
            total_taxes: round_money(&total_taxes),
            grand_total: running_total,
        })
    }

    /// Result for an invoice without taxes
    pub fn untaxed(net_total: &BigDecimal) -> PostingResult<Self> {
        Self::apply(net_total, &[])
    }
}

/// Tax amount for a single standalone row
///
/// Returns zero for a non-positive base instead of failing.
pub fn single_row_tax(
    base_amount: &BigDecimal,
    rate: &BigDecimal,
    add_deduct: AddDeduct,
) -> PostingResult<BigDecimal> {
    if !is_positive(base_amount) {
        return Ok(round_money(&zero()));
    }

    let rule = TaxRule {
        rate: rate.clone(),
        add_deduct,
        ..TaxRule::on_net_total("", "", zero())
    };
    rule.check_rate(0)?;

    let amount = percent_of(rate, base_amount);
    let signed = match add_deduct {
        AddDeduct::Add => amount,
        AddDeduct::Deduct => -amount.abs(),
    };
    Ok(round_money(&signed))
}

/// Named, ordered list of tax rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTemplate {
    pub name: String,
    #[serde(default)]
    pub taxes: Vec<TaxRule>,
}

impl TaxTemplate {
    pub fn new(name: impl Into<String>, taxes: Vec<TaxRule>) -> Self {
        Self {
            name: name.into(),
            taxes,
        }
    }

    /// Check the template is postable: every row has an account head and a sane rate
    pub fn validate(&self) -> PostingResult<()> {
        for (row, rule) in self.taxes.iter().enumerate() {
            if rule.account_head.trim().is_empty() {
                return Err(PostingError::MissingField("account_head"));
            }
            rule.check_rate(row)?;
        }
        Ok(())
    }
}

/// Registry of tax templates, applied by name
#[derive(Debug, Default)]
pub struct TaxCalculator {
    templates: HashMap<String, TaxTemplate>,
}

impl TaxCalculator {
    /// Create an empty calculator
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator preloaded with the standard VAT and withholding templates
    pub fn with_standard_templates(accounts: &AccountMapping) -> Self {
        let mut calculator = Self::new();
        for template in standard_templates(accounts) {
            calculator.templates.insert(template.name.clone(), template);
        }
        calculator
    }

    /// Register (or replace) a template after validating it
    pub fn register_template(&mut self, template: TaxTemplate) -> PostingResult<()> {
        template.validate()?;
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn template(&self, name: &str) -> Option<&TaxTemplate> {
        self.templates.get(name)
    }

    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Apply a registered template to a net total
    pub fn apply_template(&self, net_total: &BigDecimal, name: &str) -> PostingResult<TaxResult> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| PostingError::MissingInput(format!("tax template '{name}'")))?;

        TaxResult::apply(net_total, &template.taxes)
    }
}

/// Output VAT 11% (optionally with 2% withholding) and input VAT 11% for purchases
pub fn standard_templates(accounts: &AccountMapping) -> Vec<TaxTemplate> {
    let vat = TaxRule::on_net_total(&accounts.output_vat, "PPN 11%", BigDecimal::from(11));
    let withholding =
        TaxRule::on_net_total(&accounts.withholding_tax, "PPh 23 2%", BigDecimal::from(2)).deduct();
    let input_vat =
        TaxRule::on_net_total(&accounts.input_vat, "PPN Masukan 11%", BigDecimal::from(11));

    vec![
        TaxTemplate::new("PPN 11%", vec![vat.clone()]),
        TaxTemplate::new("PPN 11% + PPh 23 2%", vec![vat, withholding]),
        TaxTemplate::new("PPN Masukan 11%", vec![input_vat]),
    ]
}

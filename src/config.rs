//! Posting configuration: the chart-of-accounts mapping and tax templates

use serde::Deserialize;

use crate::tax::TaxTemplate;

/// Accounts the ledger builders post to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountMapping {
    /// Trade receivables, debited for the sales grand total
    #[serde(default = "default_receivable")]
    pub receivable: String,
    /// Sales revenue, credited for the pre-discount total
    #[serde(default = "default_revenue")]
    pub revenue: String,
    /// Contra-revenue account for sales discounts
    #[serde(default = "default_sales_discount")]
    pub sales_discount: String,
    /// Inventory, debited for the post-discount purchase cost
    #[serde(default = "default_inventory")]
    pub inventory: String,
    /// Trade payables, credited for the purchase grand total
    #[serde(default = "default_payable")]
    pub payable: String,
    /// Output VAT used by the standard sales templates
    #[serde(default = "default_output_vat")]
    pub output_vat: String,
    /// Prepaid input VAT used for purchases
    #[serde(default = "default_input_vat")]
    pub input_vat: String,
    /// Withholding tax used by the standard templates
    #[serde(default = "default_withholding_tax")]
    pub withholding_tax: String,
}

fn default_receivable() -> String {
    "1210 - Piutang Usaha".to_string()
}

fn default_revenue() -> String {
    "4100 - Pendapatan Penjualan".to_string()
}

fn default_sales_discount() -> String {
    "4300 - Potongan Penjualan".to_string()
}

fn default_inventory() -> String {
    "1310 - Persediaan".to_string()
}

fn default_payable() -> String {
    "2110 - Hutang Usaha".to_string()
}

fn default_output_vat() -> String {
    "2210 - Hutang PPN".to_string()
}

fn default_input_vat() -> String {
    "1410 - Pajak Dibayar Dimuka".to_string()
}

fn default_withholding_tax() -> String {
    "2230 - Hutang PPh 23".to_string()
}

impl Default for AccountMapping {
    fn default() -> Self {
        Self {
            receivable: default_receivable(),
            revenue: default_revenue(),
            sales_discount: default_sales_discount(),
            inventory: default_inventory(),
            payable: default_payable(),
            output_vat: default_output_vat(),
            input_vat: default_input_vat(),
            withholding_tax: default_withholding_tax(),
        }
    }
}

/// Posting engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostingConfig {
    #[serde(default)]
    pub accounts: AccountMapping,
    /// Extra tax templates registered alongside the standard ones
    #[serde(default)]
    pub tax_templates: Vec<TaxTemplate>,
}

impl PostingConfig {
    /// Loads configuration from `config/posting.toml` and `POSTING__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or does not match the schema.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/posting").required(false))
            .add_source(config::Environment::with_prefix("POSTING").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from an inline TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or does not match the schema.
    pub fn from_toml_str(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

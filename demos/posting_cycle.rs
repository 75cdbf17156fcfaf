//! Post, inspect and cancel a sales and a purchase invoice

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use invoice_posting::{
    DiscountResult, Invoice, LedgerSet, MemoryStore, PostingConfig, PostingContext,
    PostingGateway, PostingService, PurchaseInvoice, PurchaseItem, SalesInvoice,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_lines(set: &LedgerSet) {
    for line in &set.lines {
        println!(
            "  {:<32} Dr {:>14} Cr {:>14}  {}",
            line.account, line.debit, line.credit, line.remarks
        );
    }
    println!(
        "  {:<32} Dr {:>14} Cr {:>14}  balanced: {}\n",
        "Total", set.total_debit, set.total_credit, set.is_balanced
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoice_posting=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PostingConfig::load()?;
    let mut service = PostingService::try_with_config(MemoryStore::new(), config)?;
    let accounts = service.builder().accounts().clone();

    println!("Tax templates: {:?}\n", service.tax_calculator().template_names());

    let submitted = PostingContext::new(
        "demo@example.com",
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .ok_or("invalid date")?,
    );
    let cancelled = PostingContext::new(
        "demo@example.com",
        NaiveDate::from_ymd_opt(2024, 1, 20)
            .and_then(|d| d.and_hms_opt(16, 30, 0))
            .ok_or("invalid date")?,
    );

    // 1. Sales invoice: 10% discount, VAT with withholding
    let subtotal = BigDecimal::from(1_000_000);
    let discount = DiscountResult::resolve(&subtotal, Some(&BigDecimal::from(10)), None)?;
    let taxes = service
        .tax_calculator()
        .apply_template(&discount.net_total, "PPN 11% + PPh 23 2%")?;
    let sales = Invoice::Sales(SalesInvoice::assemble(
        "SI-2024-00001",
        "CUST-001",
        submitted.date(),
        &subtotal,
        &discount,
        &taxes,
    ));

    println!("Posting {}", sales.voucher());
    let posted = service.on_invoice_submitted(&sales, &submitted).await?;
    print_lines(&posted);

    // 2. Purchase invoice: fixed discount, input VAT
    let subtotal = BigDecimal::from(500_000);
    let discount = DiscountResult::resolve(&subtotal, None, Some(&BigDecimal::from(50_000)))?;
    let taxes = service
        .tax_calculator()
        .apply_template(&discount.net_total, "PPN Masukan 11%")?;
    let purchase = PurchaseInvoice::assemble(
        "PI-2024-00001",
        "SUPP-001",
        submitted.date(),
        &subtotal,
        &discount,
        &taxes,
        vec![PurchaseItem {
            item_code: "ITEM-001".to_string(),
            qty: BigDecimal::from(10),
            rate: BigDecimal::from(50_000),
        }],
    );
    println!(
        "Posting {} (valuation rate {})",
        purchase.voucher(),
        purchase.valuation_rate()
    );
    let purchase = Invoice::Purchase(purchase);
    let posted = service.on_invoice_submitted(&purchase, &submitted).await?;
    print_lines(&posted);

    // 3. Cancel the sales invoice
    let outcome = service
        .on_invoice_cancelled(&sales.voucher(), &cancelled)
        .await?;
    println!("{}", outcome.message());
    let (reversal, report) = outcome.into_result()?;
    print_lines(&reversal);

    for (account, balance) in &report.per_account_balance {
        println!("  {account:<32} net {balance}");
    }
    println!();

    // 4. Balances after the cycle
    for account in [&accounts.receivable, &accounts.inventory, &accounts.payable] {
        let balance = service.account_balance(account, None).await?;
        println!("  {account:<32} {balance:>14}");
    }

    Ok(())
}

//! Integration tests for invoice-posting

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use invoice_posting::{
    utils::validation::validate_discount_input, CancellationOutcome, DiscountResult, Invoice,
    LedgerStore, MemoryStore, PostingConfig, PostingContext, PostingError, PostingGateway,
    PostingService, PurchaseInvoice, PurchaseItem, SalesInvoice, TaxResult, TaxRule, VoucherRef,
    VoucherType,
};
use std::str::FromStr;

fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn ctx(day: u32) -> PostingContext {
    PostingContext::new("finance@example.com", date(day).and_hms_opt(10, 0, 0).unwrap())
}

fn sales_invoice(
    service: &PostingService<MemoryStore>,
    name: &str,
    subtotal: &BigDecimal,
    discount_pct: Option<&BigDecimal>,
    discount_amt: Option<&BigDecimal>,
    template: &str,
) -> Invoice {
    let discount = DiscountResult::resolve(subtotal, discount_pct, discount_amt).unwrap();
    let taxes = service
        .tax_calculator()
        .apply_template(&discount.net_total, template)
        .unwrap();
    Invoice::Sales(SalesInvoice::assemble(
        name, "CUST-001", date(15), subtotal, &discount, &taxes,
    ))
}

#[tokio::test]
async fn test_complete_sales_cycle() {
    let store = MemoryStore::new();
    let mut service = PostingService::new(store.clone());
    let accounts = service.builder().accounts().clone();

    let invoice = sales_invoice(
        &service,
        "SI-2024-00001",
        &BigDecimal::from(1_000_000),
        Some(&BigDecimal::from(10)),
        None,
        "PPN 11%",
    );

    let posted = service.on_invoice_submitted(&invoice, &ctx(15)).await.unwrap();
    assert!(posted.is_balanced);
    assert_eq!(posted.total_debit, dec("1099000"));

    assert_eq!(
        service.account_balance(&accounts.receivable, None).await.unwrap(),
        dec("999000")
    );
    assert_eq!(
        service.account_balance(&accounts.revenue, None).await.unwrap(),
        dec("-1000000")
    );
    assert_eq!(
        service.account_balance(&accounts.output_vat, None).await.unwrap(),
        dec("-99000")
    );

    let outcome = service
        .on_invoice_cancelled(&invoice.voucher(), &ctx(20))
        .await
        .unwrap();
    assert_eq!(
        outcome.message(),
        "Sales Invoice SI-2024-00001 cancelled successfully"
    );

    let (reversal, report) = outcome.into_result().unwrap();
    assert!(report.is_valid);
    assert_eq!(reversal.len(), posted.len());
    assert!(reversal.lines.iter().all(|l| l.remarks.starts_with("Reversal: ")));

    for account in [
        &accounts.receivable,
        &accounts.revenue,
        &accounts.sales_discount,
        &accounts.output_vat,
    ] {
        assert_eq!(
            service.account_balance(account, None).await.unwrap(),
            BigDecimal::from(0),
            "{account} should net to zero"
        );
    }

    // Before the cancellation date only the original posting is visible
    assert_eq!(
        service
            .account_balance(&accounts.receivable, Some(date(19)))
            .await
            .unwrap(),
        dec("999000")
    );
    assert_eq!(store.batches().unwrap().len(), 2);
}

#[tokio::test]
async fn test_complete_purchase_cycle() {
    let mut service = PostingService::new(MemoryStore::new());
    let accounts = service.builder().accounts().clone();

    let subtotal = BigDecimal::from(500_000);
    let discount =
        DiscountResult::resolve(&subtotal, None, Some(&BigDecimal::from(50_000))).unwrap();
    assert_eq!(discount.discount_percentage, dec("10.00"));

    let taxes = service
        .tax_calculator()
        .apply_template(&discount.net_total, "PPN Masukan 11%")
        .unwrap();
    let invoice = Invoice::Purchase(PurchaseInvoice::assemble(
        "PI-2024-00001",
        "SUPP-001",
        date(15),
        &subtotal,
        &discount,
        &taxes,
        vec![PurchaseItem {
            item_code: "ITEM-001".to_string(),
            qty: BigDecimal::from(10),
            rate: BigDecimal::from(50_000),
        }],
    ));

    let posted = service.on_invoice_submitted(&invoice, &ctx(15)).await.unwrap();
    assert_eq!(posted.len(), 3);
    assert_eq!(posted.total_debit, dec("499500"));

    if let Invoice::Purchase(purchase) = &invoice {
        assert_eq!(purchase.valuation_rate(), dec("45000"));
    }

    assert_eq!(
        service.account_balance(&accounts.inventory, None).await.unwrap(),
        dec("450000")
    );
    assert_eq!(
        service.account_balance(&accounts.input_vat, None).await.unwrap(),
        dec("49500")
    );
    assert_eq!(
        service.account_balance(&accounts.payable, None).await.unwrap(),
        dec("-499500")
    );

    let outcome = service
        .on_invoice_cancelled(&invoice.voucher(), &ctx(16))
        .await
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(
        service.account_balance(&accounts.payable, None).await.unwrap(),
        BigDecimal::from(0)
    );
}

#[tokio::test]
async fn test_withholding_tax_on_sales() {
    let mut service = PostingService::new(MemoryStore::new());
    let accounts = service.builder().accounts().clone();

    let invoice = sales_invoice(
        &service,
        "SI-2024-00002",
        &BigDecimal::from(1_000_000),
        Some(&BigDecimal::from(10)),
        None,
        "PPN 11% + PPh 23 2%",
    );

    let posted = service.on_invoice_submitted(&invoice, &ctx(15)).await.unwrap();
    assert!(posted.is_balanced);

    assert_eq!(
        service.account_balance(&accounts.receivable, None).await.unwrap(),
        dec("981000")
    );
    // Withheld tax sits on the debit side
    assert_eq!(
        service
            .account_balance(&accounts.withholding_tax, None)
            .await
            .unwrap(),
        dec("18000")
    );
}

#[tokio::test]
async fn test_withholding_template_on_odd_cents() {
    let mut service = PostingService::new(MemoryStore::new());
    let accounts = service.builder().accounts().clone();

    let invoice = sales_invoice(
        &service,
        "SI-2024-00005",
        &dec("100.05"),
        None,
        None,
        "PPN 11% + PPh 23 2%",
    );
    if let Invoice::Sales(sales) = &invoice {
        assert_eq!(sales.taxes[1].running_total, dec("109.06"));
        assert_eq!(sales.grand_total, dec("109.06"));
    }

    let posted = service.on_invoice_submitted(&invoice, &ctx(15)).await.unwrap();
    assert_eq!(posted.total_debit, dec("111.06"));
    assert_eq!(posted.total_credit, dec("111.06"));
    assert_eq!(
        service.account_balance(&accounts.receivable, None).await.unwrap(),
        dec("109.06")
    );
    assert_eq!(
        service.account_balance(&accounts.output_vat, None).await.unwrap(),
        dec("-11.01")
    );
}

#[tokio::test]
async fn test_cancel_unknown_and_repeated() {
    let mut service = PostingService::new(MemoryStore::new());

    let unknown = VoucherRef::sales("SI-9999");
    let err = service
        .on_invoice_cancelled(&unknown, &ctx(20))
        .await
        .unwrap_err();
    assert_eq!(err, PostingError::NothingToCancel(unknown));

    let invoice = sales_invoice(
        &service,
        "SI-2024-00003",
        &BigDecimal::from(250_000),
        None,
        None,
        "PPN 11%",
    );
    service.on_invoice_submitted(&invoice, &ctx(15)).await.unwrap();
    service
        .on_invoice_cancelled(&invoice.voucher(), &ctx(20))
        .await
        .unwrap();

    let err = service
        .on_invoice_cancelled(&invoice.voucher(), &ctx(21))
        .await
        .unwrap_err();
    assert!(matches!(err, PostingError::NothingToCancel(_)));
}

#[tokio::test]
async fn test_resubmitting_posted_invoice_is_refused() {
    let store = MemoryStore::new();
    let mut service = PostingService::new(store.clone());
    let receivable = service.builder().accounts().receivable.clone();

    let invoice = sales_invoice(
        &service,
        "SI-2024-00004",
        &BigDecimal::from(1_000),
        None,
        None,
        "PPN 11%",
    );
    service.on_invoice_submitted(&invoice, &ctx(15)).await.unwrap();

    let err = service
        .on_invoice_submitted(&invoice, &ctx(16))
        .await
        .unwrap_err();
    assert_eq!(err, PostingError::AlreadyPosted(invoice.voucher()));
    assert_eq!(
        service.account_balance(&receivable, None).await.unwrap(),
        dec("1110")
    );

    // A single cancel still clears the whole posting
    service
        .on_invoice_cancelled(&invoice.voucher(), &ctx(17))
        .await
        .unwrap();
    assert_eq!(
        service.account_balance(&receivable, None).await.unwrap(),
        BigDecimal::from(0)
    );
    assert_eq!(store.batches().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cancellation_only_touches_its_voucher() {
    let store = MemoryStore::new();
    let mut service = PostingService::new(store.clone());
    let receivable = service.builder().accounts().receivable.clone();

    let first = sales_invoice(
        &service,
        "SI-2024-00010",
        &BigDecimal::from(100_000),
        None,
        None,
        "PPN 11%",
    );
    let second = sales_invoice(
        &service,
        "SI-2024-00011",
        &BigDecimal::from(200_000),
        None,
        None,
        "PPN 11%",
    );

    service.on_invoice_submitted(&first, &ctx(15)).await.unwrap();
    service.on_invoice_submitted(&second, &ctx(15)).await.unwrap();
    service
        .on_invoice_cancelled(&first.voucher(), &ctx(16))
        .await
        .unwrap();

    assert_eq!(
        service.account_balance(&receivable, None).await.unwrap(),
        dec("222000")
    );
    assert_eq!(store.active_lines(&second.voucher()).await.unwrap().len(), 3);
    assert!(store.active_lines(&first.voucher()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tampered_stored_lines_fail_cancellation_without_persisting() {
    let mut store = MemoryStore::new();
    let mut service = PostingService::new(store.clone());

    // An unbalanced hand-written posting cannot be reversed into a balanced set
    let voucher = VoucherRef::new(VoucherType::SalesInvoice, "SI-BROKEN");
    let mut lines = service
        .builder()
        .build_sales(
            &SalesInvoice::assemble(
                "SI-BROKEN",
                "CUST-001",
                date(15),
                &BigDecimal::from(100),
                &DiscountResult::none(&BigDecimal::from(100)),
                &TaxResult::untaxed(&BigDecimal::from(100)).unwrap(),
            ),
            None,
        )
        .unwrap()
        .lines;
    lines[0].debit = BigDecimal::from(90);
    store.save_lines(&lines).await.unwrap();

    let outcome = service.on_invoice_cancelled(&voucher, &ctx(20)).await.unwrap();
    match &outcome {
        CancellationOutcome::Failed { message, error } => {
            assert!(message.starts_with("Cancellation failed"));
            assert!(matches!(error, PostingError::UnbalancedLedger { .. }));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    assert_eq!(store.batches().unwrap().len(), 1);
    assert_eq!(store.active_lines(&voucher).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_inconsistent_invoice_is_rejected() {
    let store = MemoryStore::new();
    let mut service = PostingService::new(store.clone());

    let subtotal = BigDecimal::from(1_000);
    let discount = DiscountResult::resolve(&subtotal, Some(&BigDecimal::from(5)), None).unwrap();
    let vat = TaxRule::on_net_total("2210 - Hutang PPN", "PPN 11%", BigDecimal::from(11));
    let taxes = TaxResult::apply(&discount.net_total, &[vat]).unwrap();

    let mut invoice =
        SalesInvoice::assemble("SI-2024-00020", "CUST-001", date(15), &subtotal, &discount, &taxes);
    invoice.customer = String::new();

    let err = service
        .on_invoice_submitted(&Invoice::Sales(invoice), &ctx(15))
        .await
        .unwrap_err();
    assert_eq!(err, PostingError::MissingField("customer"));
    assert!(store.batches().unwrap().is_empty());
}

#[tokio::test]
async fn test_configured_accounts_and_templates() {
    let config = PostingConfig::from_toml_str(
        r#"
        [accounts]
        receivable = "1100 - Accounts Receivable"
        revenue = "4000 - Sales"

        [[tax_templates]]
        name = "VAT 20%"

        [[tax_templates.taxes]]
        charge_type = "On Net Total"
        account_head = "2200 - VAT Payable"
        description = "VAT 20%"
        rate = "20"
        "#,
    )
    .unwrap();

    let mut service = PostingService::try_with_config(MemoryStore::new(), config).unwrap();
    let invoice = sales_invoice(
        &service,
        "SI-2024-00030",
        &BigDecimal::from(1_000),
        None,
        None,
        "VAT 20%",
    );

    let posted = service.on_invoice_submitted(&invoice, &ctx(15)).await.unwrap();
    let accounts: Vec<&str> = posted.lines.iter().map(|l| l.account.as_str()).collect();
    assert_eq!(
        accounts,
        vec!["1100 - Accounts Receivable", "4000 - Sales", "2200 - VAT Payable"]
    );
    assert_eq!(posted.total_credit, dec("1200"));
}

#[test]
fn test_discount_input_validation() {
    let subtotal = BigDecimal::from(1_000_000);

    assert!(validate_discount_input(&subtotal, Some(&BigDecimal::from(10)), None).is_ok());
    assert!(validate_discount_input(&subtotal, None, Some(&subtotal)).is_ok());

    assert!(matches!(
        validate_discount_input(&subtotal, Some(&BigDecimal::from(101)), None).unwrap_err(),
        PostingError::InvalidRange {
            field: "discount_percentage",
            ..
        }
    ));
    assert!(matches!(
        validate_discount_input(&BigDecimal::from(0), None, None).unwrap_err(),
        PostingError::InvalidAmount {
            field: "subtotal",
            ..
        }
    ));
}

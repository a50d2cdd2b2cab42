use chrono::NaiveDate;
use ebwandler::convert::convert;
use ebwandler::core::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn supplier() -> SourceParty {
    SourcePartyBuilder::new("ACME GmbH")
        .vat_id("ATU12345678")
        .address("Hauptstraße 1", "1010", "Wien", "AT")
        .email("rechnung@acme.at")
        .build()
}

fn customer() -> SourceParty {
    SourcePartyBuilder::new("Kunde AG")
        .vat_id("ATU87654321")
        .address("Ringstraße 5", "8010", "Graz", "AT")
        .build()
}

fn standard_20() -> TaxCategoryRef {
    TaxCategoryBuilder::vat("S").percent(dec!(20)).build()
}

fn transfer(instruction_id: &str) -> PaymentMeansCandidate {
    PaymentMeansCandidate::new("30")
        .with_channel("IBAN")
        .with_instruction_id(instruction_id)
        .with_account(FinancialAccount::iban("AT611904300234573201").with_bic("BKAUATWW"))
}

/// One line of 100.00 at 20 % VAT, paid by credit transfer.
fn invoice(instruction_id: &str) -> SourceDocumentBuilder {
    SourceDocumentBuilder::new("RE-2024-001", date(2024, 6, 15))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            SourceLineBuilder::new("1", "Beratung", dec!(1), "C62")
                .price(dec!(100))
                .line_extension(dec!(100))
                .tax(standard_20())
                .build(),
        )
        .add_tax_subtotal(
            TaxSubtotalBuilder::vat("S")
                .percent(dec!(20))
                .taxable_amount(dec!(100))
                .build(),
        )
        .add_payment_means(transfer(instruction_id))
        .add_payment_terms(PaymentTerms::due(date(2024, 7, 15)))
        .monetary_total(MonetaryTotal {
            line_extension_amount: Some(dec!(100)),
            tax_exclusive_amount: Some(dec!(100)),
            tax_inclusive_amount: Some(dec!(120)),
            payable_amount: dec!(120),
            ..MonetaryTotal::default()
        })
}

fn bank_transfer(doc: &TargetDocument) -> &BankTransfer {
    match &doc.payment_method.as_ref().unwrap().kind {
        PaymentMethodKind::BankTransfer(t) => t,
        other => panic!("expected bank transfer, got {other:?}"),
    }
}

// --- End to end ---

#[test]
fn clean_invoice_converts_without_diagnostics() {
    let doc = invoice("REF123").build().unwrap();
    let conversion = convert(&doc, &Settings::default());
    assert!(conversion.diagnostics.is_empty(), "{:?}", conversion.diagnostics);

    let target = conversion.into_result().unwrap();
    assert_eq!(target.document_type, TargetDocumentType::Invoice);
    assert_eq!(target.invoice_number, "RE-2024-001");
    assert_eq!(target.tax.total_vat(), dec!(20.00));
    assert_eq!(
        target.tax.vat,
        vec![VatItem {
            taxed_amount: dec!(100),
            tax: LineTax::VatRate(dec!(20)),
            amount: dec!(20.00),
        }]
    );

    let transfer = bank_transfer(&target);
    assert_eq!(transfer.payment_reference.as_deref(), Some("REF123"));
    assert_eq!(transfer.beneficiary_account.iban.as_deref(), Some("AT611904300234573201"));
    assert_eq!(transfer.beneficiary_account.bic.as_deref(), Some("BKAUATWW"));
    assert_eq!(transfer.beneficiary_account.bank_account_owner.as_deref(), Some("ACME GmbH"));

    let conditions = target.payment_conditions.unwrap();
    assert_eq!(conditions.due_date, Some(date(2024, 7, 15)));
    assert!(conditions.discounts.is_empty());

    assert_eq!(target.items.len(), 1);
    assert_eq!(target.items[0].line_item_amount, dec!(100));
    assert_eq!(target.total_gross_amount, dec!(120));
    assert_eq!(target.biller.address.street.as_deref(), Some("Hauptstraße 1"));
}

#[test]
fn long_payment_reference_is_truncated_with_one_warning() {
    let long = "R".repeat(40);
    let doc = invoice(&long).build().unwrap();
    let conversion = convert(&doc, &Settings::default());

    assert_eq!(conversion.diagnostics.len(), 1);
    let warning = &conversion.diagnostics.as_slice()[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert!(warning.message.contains(&long));

    let target = conversion.into_result().unwrap();
    assert_eq!(bank_transfer(&target).payment_reference.as_deref(), Some(&long[..35]));
}

#[test]
fn every_target_version_accepts_the_clean_invoice() {
    let doc = invoice("REF123").build().unwrap();
    for version in TargetVersion::ALL {
        let conversion = convert(&doc, &Settings::default().target(version));
        assert!(conversion.is_accepted(), "{version}: {:?}", conversion.diagnostics);
    }
}

// --- Payment ---

#[test]
fn unsupported_then_valid_transfer() {
    let doc = SourceDocumentBuilder::new("RE-2", date(2024, 6, 15))
        .supplier(supplier())
        .customer(customer())
        .add_payment_means(PaymentMeansCandidate::new("97"))
        .add_payment_means(transfer("REF9"))
        .payable_amount(dec!(50))
        .build()
        .unwrap();
    let conversion = convert(&doc, &Settings::default());

    assert_eq!(conversion.diagnostics.error_count(), 1);
    assert_eq!(conversion.diagnostics.as_slice()[0].field, "payment_means[0].code");
    let target = conversion.document.as_ref().unwrap();
    assert_eq!(bank_transfer(target).payment_reference.as_deref(), Some("REF9"));
}

#[test]
fn later_payment_means_are_ignored_with_warning() {
    let doc = invoice("REF123")
        .add_payment_means(PaymentMeansCandidate::new("49"))
        .build()
        .unwrap();
    let conversion = convert(&doc, &Settings::default());
    assert_eq!(conversion.diagnostics.len(), 1);
    assert_eq!(conversion.diagnostics.as_slice()[0].field, "payment_means[1]");
    assert!(conversion.is_accepted());
}

#[test]
fn invoice_without_payment_means_is_rejected() {
    let doc = SourceDocumentBuilder::new("RE-3", date(2024, 6, 15))
        .supplier(supplier())
        .customer(customer())
        .payable_amount(dec!(10))
        .build()
        .unwrap();
    let err = convert(&doc, &Settings::default()).into_result().unwrap_err();
    assert!(matches!(err, ConvertError::Rejected(_)));
    assert_eq!(err.to_string(), "conversion rejected with 1 error(s)");
}

#[test]
fn optional_payment_method() {
    let doc = SourceDocumentBuilder::new("RE-4", date(2024, 6, 15))
        .supplier(supplier())
        .customer(customer())
        .build()
        .unwrap();
    let target = convert(&doc, &Settings::default().payment_method_mandatory(false))
        .into_result()
        .unwrap();
    assert!(target.payment_method.is_none());
}

#[test]
fn sepa_direct_debit_depends_on_version() {
    let doc = SourceDocumentBuilder::new("RE-5", date(2024, 6, 15))
        .supplier(supplier())
        .customer(customer())
        .add_payment_means(PaymentMeansCandidate::new("59"))
        .payable_amount(dec!(10))
        .build()
        .unwrap();

    let v61 = convert(&doc, &Settings::default()).into_result().unwrap();
    assert!(matches!(
        v61.payment_method.unwrap().kind,
        PaymentMethodKind::SepaDirectDebit(_)
    ));

    let v40 = convert(&doc, &Settings::default().target(TargetVersion::V40))
        .into_result()
        .unwrap();
    assert_eq!(v40.payment_method.unwrap().kind, PaymentMethodKind::DirectDebit);
}

// --- Tax ---

#[test]
fn line_without_percent_takes_subtotal_rate() {
    let doc = invoice("REF123")
        .add_line(
            SourceLineBuilder::new("2", "Reisezeit", dec!(2), "HUR")
                .price(dec!(10))
                .tax(TaxCategoryBuilder::vat("S").build())
                .build(),
        )
        .build()
        .unwrap();
    let conversion = convert(&doc, &Settings::default());
    assert!(conversion.diagnostics.is_empty(), "{:?}", conversion.diagnostics);
    let target = conversion.into_result().unwrap();
    assert_eq!(target.items[1].tax, LineTax::VatRate(dec!(20)));
    assert_eq!(target.items[1].line_item_amount, dec!(20));
}

#[test]
fn exempt_lines_get_the_default_reason() {
    let exempt = TaxCategoryBuilder::vat("E").build();
    let doc = SourceDocumentBuilder::new("RE-6", date(2024, 6, 15))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            SourceLineBuilder::new("1", "Schulung", dec!(1), "C62")
                .price(dec!(500))
                .tax(exempt.clone())
                .build(),
        )
        .add_tax_subtotal(
            TaxSubtotalBuilder::for_category(exempt)
                .taxable_amount(dec!(500))
                .build(),
        )
        .add_payment_means(transfer("REF6"))
        .payable_amount(dec!(500))
        .build()
        .unwrap();
    let target = convert(&doc, &Settings::default()).into_result().unwrap();
    let reason = LineTax::Exemption {
        reason: "Tax Exemption".into(),
    };
    assert_eq!(target.items[0].tax, reason);
    assert_eq!(target.tax.vat[0].tax, reason);
    assert_eq!(target.tax.total_vat(), dec!(0));
}

#[test]
fn subtotal_without_percent_derives_it() {
    let doc = SourceDocumentBuilder::new("RE-7", date(2024, 6, 15))
        .supplier(supplier())
        .customer(customer())
        .add_tax_subtotal(
            TaxSubtotalBuilder::vat("AA")
                .taxable_amount(dec!(80))
                .tax_amount(dec!(8))
                .build(),
        )
        .add_payment_means(transfer("REF7"))
        .payable_amount(dec!(88))
        .build()
        .unwrap();
    let target = convert(&doc, &Settings::default()).into_result().unwrap();
    assert_eq!(target.tax.vat[0].tax, LineTax::VatRate(dec!(10)));
}

// --- Pre-check ---

#[test]
fn precheck_failure_yields_no_document() {
    let doc = invoice("REF123").type_code(Some("999")).build().unwrap();
    let conversion = convert(&doc, &Settings::default());
    assert!(conversion.document.is_none());
    assert_eq!(conversion.diagnostics.len(), 1);

    let err = conversion.into_result().unwrap_err();
    assert!(matches!(err, ConvertError::PreCheck(_)));
    assert_eq!(err.diagnostics().unwrap().error_count(), 1);
}

#[test]
fn federal_government_settings() {
    let doc = invoice("REF123")
        .profile_id("urn:fdc:peppol.eu:2017:poacc:billing:01:1.0")
        .order_reference("4500012345")
        .delivery_date(date(2024, 6, 10))
        .build()
        .unwrap();
    let conversion = convert(&doc, &Settings::federal_government());
    assert!(conversion.diagnostics.is_empty(), "{:?}", conversion.diagnostics);
    let target = conversion.into_result().unwrap();
    assert_eq!(target.order_reference.as_deref(), Some("4500012345"));
    assert_eq!(target.delivery, Some(TargetDelivery::Date(date(2024, 6, 10))));
    assert_eq!(
        target.items[0].order_position,
        Some(OrderPositionReference {
            order_id: "4500012345".into(),
            order_position_number: None,
        })
    );

    let missing = invoice("REF123").build().unwrap();
    let conversion = convert(&missing, &Settings::federal_government());
    assert!(conversion.document.is_none());
}

// --- Credit notes ---

#[test]
fn credit_note_with_transfer() {
    let doc = SourceDocumentBuilder::credit_note("GS-1", date(2024, 6, 20))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            SourceLineBuilder::new("1", "Retoure", dec!(1), "C62")
                .price(dec!(50))
                .tax(standard_20())
                .build(),
        )
        .add_tax_subtotal(
            TaxSubtotalBuilder::vat("S")
                .percent(dec!(20))
                .taxable_amount(dec!(50))
                .tax_amount(dec!(10))
                .build(),
        )
        .add_payment_means(transfer("GS-1"))
        .payable_amount(dec!(60))
        .build()
        .unwrap();
    let target = convert(&doc, &Settings::default()).into_result().unwrap();
    assert_eq!(target.document_type, TargetDocumentType::CreditMemo);
    assert_eq!(target.tax.total_vat(), dec!(10));
    assert_eq!(bank_transfer(&target).payment_reference.as_deref(), Some("GS-1"));
}

// --- Diagnostics rendering ---

#[test]
fn diagnostics_render_in_order() {
    let doc = invoice("REF123")
        .add_payment_terms(PaymentTerms::due(date(2024, 8, 1)).with_penalty_percent(dec!(5)))
        .build()
        .unwrap();
    let conversion = convert(&doc, &Settings::default());
    let rendered = conversion
        .diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r"
    [WARNING] payment_terms[1].due_date: more than one payment due date found: keeping 2024-07-15, ignoring 2024-08-01
    [WARNING] payment_terms[1].penalty_surcharge_percent: penalty surcharge of 5 % is not supported and was ignored
    ");
}

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use ebwandler::convert::convert;
use ebwandler::core::*;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn build_document(lines: usize) -> SourceDocument {
    let mut builder = SourceDocumentBuilder::new("BENCH-001", test_date())
        .supplier(
            SourcePartyBuilder::new("Benchmark GmbH")
                .vat_id("ATU12345678")
                .address("Hauptstraße 1", "1010", "Wien", "AT")
                .build(),
        )
        .customer(
            SourcePartyBuilder::new("Kunde AG")
                .vat_id("ATU87654321")
                .address("Ringstraße 5", "8010", "Graz", "AT")
                .build(),
        )
        .add_tax_subtotal(TaxSubtotalBuilder::vat("S").percent(dec!(20)).taxable_amount(dec!(18.98)).build())
        .add_payment_means(
            PaymentMeansCandidate::new("58")
                .with_instruction_id("BENCH-001")
                .with_account(FinancialAccount::iban("AT611904300234573201").with_bic("BKAUATWW")),
        )
        .add_payment_terms(PaymentTerms::due(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()))
        .add_payment_terms(PaymentTerms::discount(dec!(2), NaiveDate::from_ymd_opt(2024, 6, 25)));

    for i in 1..=lines {
        builder = builder.add_line(
            SourceLineBuilder::new(i.to_string(), format!("Item {i}"), dec!(2), "C62")
                .price(dec!(9.99))
                .tax(TaxCategoryBuilder::vat("S").build())
                .add_allowance_charge(AdjustmentEntry::reduction(dec!(1)).with_reason("Rabatt"))
                .build(),
        );
    }

    builder.payable_amount(dec!(0)).build().unwrap()
}

fn bench_convert_10_lines(c: &mut Criterion) {
    let doc = build_document(10);
    let settings = Settings::default();
    c.bench_function("convert_10_lines", |b| {
        b.iter(|| black_box(convert(black_box(&doc), &settings)));
    });
}

fn bench_convert_1000_lines(c: &mut Criterion) {
    let doc = build_document(1000);
    let settings = Settings::default().target(TargetVersion::V43);
    c.bench_function("convert_1000_lines_v43", |b| {
        b.iter(|| black_box(convert(black_box(&doc), &settings)));
    });
}

criterion_group!(benches, bench_convert_10_lines, bench_convert_1000_lines);
criterion_main!(benches);

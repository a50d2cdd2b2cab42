//! The reconciliation engine.
//!
//! [`convert`] runs the pre-check and then every component in a fixed order
//! over one source document, collecting diagnostics on the way:
//!
//! 1. [`precheck`]: UBL version, profile and type code. Errors here abort.
//! 2. [`tax`]: tax subtotals are reconciled into VAT items and a rate map.
//! 3. [`party`]: biller and invoice recipient.
//! 4. [`line`]: list line items, using the rate map.
//! 5. [`adjustment`]: document level reductions and surcharges.
//! 6. [`payment`] and [`terms`]: payment method and payment conditions.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ebwandler::core::*;
//! use ebwandler::convert::convert;
//!
//! let doc = SourceDocumentBuilder::new("INV-1", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
//!     .ubl_version_id(Some("1.0"))
//!     .supplier(SourcePartyBuilder::new("S").build())
//!     .customer(SourcePartyBuilder::new("C").build())
//!     .build()
//!     .unwrap();
//!
//! let conversion = convert(&doc, &Settings::default());
//! assert!(conversion.document.is_none());
//! assert!(matches!(conversion.into_result(), Err(ConvertError::PreCheck(_))));
//! ```

pub mod adjustment;
pub mod line;
pub mod party;
pub mod payment;
pub mod precheck;
pub mod tax;
pub mod terms;

use rust_decimal::Decimal;
use tracing::{debug, debug_span, warn};

use crate::core::*;
use adjustment::{normalize, Level, Polarity};
use line::{map_line, LineContext};
use party::map_party;
use payment::resolve_payment;
use precheck::precheck;
use tax::reconcile_taxes;
use terms::merge_terms;

/// Outcome of one conversion run.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// `None` if the pre-check failed.
    pub document: Option<TargetDocument>,
    /// Every finding, in the order it was recorded.
    pub diagnostics: Diagnostics,
}

impl Conversion {
    /// `true` if a document was produced and no ERROR was recorded.
    pub fn is_accepted(&self) -> bool {
        self.document.is_some() && !self.diagnostics.has_errors()
    }

    /// The target document, unless the pre-check failed or an ERROR was
    /// recorded. Warnings are dropped.
    pub fn into_result(self) -> Result<TargetDocument, ConvertError> {
        match self.document {
            None => Err(ConvertError::PreCheck(self.diagnostics)),
            Some(_) if self.diagnostics.has_errors() => Err(ConvertError::Rejected(self.diagnostics)),
            Some(doc) => Ok(doc),
        }
    }
}

/// Convert a UBL source document into an ebInterface target document.
pub fn convert(doc: &SourceDocument, settings: &Settings) -> Conversion {
    let span = debug_span!("convert", id = %doc.id, target = %settings.target);
    let _enter = span.enter();

    let mut diags = Diagnostics::new();
    if !precheck(doc, settings, &mut diags) {
        warn!(errors = diags.error_count(), "pre-check failed");
        return Conversion {
            document: None,
            diagnostics: diags,
        };
    }

    let shape = settings.shape();
    let polarity = if shape.unified_adjustment_list {
        Polarity::FirstEntry
    } else {
        Polarity::PerEntry
    };

    let taxes = reconcile_taxes(&doc.tax_subtotals, &mut diags);

    let biller = map_party(
        &doc.supplier,
        "supplier",
        settings.fallback_supplier_email.as_deref(),
        &mut diags,
    );
    let invoice_recipient = map_party(&doc.customer, "customer", None, &mut diags);

    let order_reference = order_reference(doc, settings, &mut diags);
    let ctx = LineContext {
        rates: &taxes.rates,
        polarity,
        order_reference: order_reference.as_deref(),
    };
    let items: Vec<ListLineItem> = doc
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| map_line(i, line, &ctx, &mut diags))
        .collect();

    let document_base = doc.monetary_total.line_extension_amount.unwrap_or_else(|| {
        items
            .iter()
            .try_fold(Decimal::ZERO, |sum, i| sum.checked_add(i.line_item_amount))
            .unwrap_or_else(|| {
                diags.error("lines", "sum of line amounts overflows, using 0 as base");
                Decimal::ZERO
            })
    });
    let adjustments = normalize(
        &doc.allowance_charges,
        document_base,
        polarity,
        Level::Document,
        "allowance_charges",
        &mut diags,
    );
    let reduction_and_surcharge = (!adjustments.is_empty()).then(|| ReductionAndSurchargeDetails {
        reductions: adjustments.reductions,
        surcharges: adjustments.surcharges,
    });

    let payable = doc.monetary_total.payable_amount;
    let payment = resolve_payment(doc, settings, &mut diags);
    let payment_conditions = merge_terms(&doc.payment_terms, payment.due_date, doc.due_date, payable, &mut diags);

    let delivery = delivery(doc, settings, &mut diags);

    let prepaid_amount = doc.monetary_total.prepaid_amount.filter(|p| !p.is_zero());
    let total_gross_amount = doc.monetary_total.tax_inclusive_amount.unwrap_or_else(|| {
        payable
            .checked_add(prepaid_amount.unwrap_or(Decimal::ZERO))
            .unwrap_or_else(|| {
                diags.error(
                    "monetary_total.prepaid_amount",
                    "payable plus prepaid amount overflows, using the payable amount",
                );
                payable
            })
    });

    let document = TargetDocument {
        document_type: match doc.kind {
            DocumentKind::Invoice => TargetDocumentType::Invoice,
            DocumentKind::CreditNote => TargetDocumentType::CreditMemo,
        },
        invoice_number: doc.id.trim().to_string(),
        invoice_date: doc.issue_date,
        invoice_currency: doc.currency_code.trim().to_string(),
        comment: join_lines(&doc.notes),
        delivery,
        biller,
        invoice_recipient,
        order_reference,
        items,
        reduction_and_surcharge,
        tax: taxes.tax,
        total_gross_amount,
        prepaid_amount,
        payable_amount: payable,
        payment_method: payment.method,
        payment_conditions,
    };

    debug!(
        errors = diags.error_count(),
        warnings = diags.warning_count(),
        "conversion finished"
    );
    Conversion {
        document: Some(document),
        diagnostics: diags,
    }
}

fn order_reference(doc: &SourceDocument, settings: &Settings, diags: &mut Diagnostics) -> Option<String> {
    let reference = doc
        .order_reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    match reference {
        None => {
            let on_lines = doc
                .lines
                .iter()
                .any(|l| l.order_reference.as_deref().is_some_and(|r| !r.trim().is_empty()));
            if settings.order_reference_mandatory && !on_lines {
                diags.error("order_reference", "order reference is missing");
            }
            None
        }
        Some(r) => {
            if let Some(max) = settings.order_reference_max_len {
                let len = r.chars().count();
                if len > max {
                    diags.error(
                        "order_reference",
                        format!("order reference '{r}' is {len} characters long, at most {max} are allowed"),
                    );
                }
            }
            Some(r.to_string())
        }
    }
}

fn delivery(doc: &SourceDocument, settings: &Settings, diags: &mut Diagnostics) -> Option<TargetDelivery> {
    let from_period = || {
        doc.invoice_period
            .as_ref()
            .and_then(|p| Some(TargetDelivery::Period {
                from: p.start?,
                to: p.end?,
            }))
    };
    let from_lines = || doc.lines.iter().find_map(|l| l.delivery_date).map(TargetDelivery::Date);

    let delivery = doc
        .delivery
        .as_ref()
        .and_then(|d| d.actual_date)
        .map(TargetDelivery::Date)
        .or_else(from_period)
        .or_else(from_lines);

    if delivery.is_none() && settings.delivery_date_mandatory {
        diags.error("delivery", "delivery date or period is missing");
    }
    delivery
}

fn join_lines(values: &[String]) -> Option<String> {
    let joined = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base() -> SourceDocumentBuilder {
        SourceDocumentBuilder::new("INV-1", date(2024, 3, 1))
            .supplier(SourcePartyBuilder::new("S").vat_id("ATU1").build())
            .customer(SourcePartyBuilder::new("C").vat_id("ATU2").build())
            .add_payment_means(PaymentMeansCandidate::new("58").with_account(FinancialAccount::iban("AT611904300234573201")))
            .payable_amount(dec!(0))
    }

    #[test]
    fn mandatory_order_reference_too_long() {
        let settings = Settings::default().order_reference_mandatory(true, Some(5));
        let doc = base().order_reference("PO-123456").build().unwrap();
        let c = convert(&doc, &settings);
        assert_eq!(c.diagnostics.error_count(), 1);
        assert_eq!(c.document.as_ref().unwrap().order_reference.as_deref(), Some("PO-123456"));
        assert!(!c.is_accepted());
    }

    #[test]
    fn mandatory_order_reference_satisfied_by_line() {
        let settings = Settings::default().order_reference_mandatory(true, None);
        let line = SourceLineBuilder::new("1", "X", dec!(1), "C62")
            .price(dec!(0))
            .tax(TaxCategoryBuilder::vat("S").percent(dec!(20)).build())
            .order_line(Some("PO-9"), "1")
            .build();
        let doc = base().add_line(line).build().unwrap();
        let c = convert(&doc, &settings);
        assert!(c.diagnostics.is_empty(), "{:?}", c.diagnostics);
    }

    #[test]
    fn delivery_falls_back_to_period_then_lines() {
        let doc = base().invoice_period(date(2024, 2, 1), date(2024, 2, 29)).build().unwrap();
        let c = convert(&doc, &Settings::default());
        assert_eq!(
            c.document.unwrap().delivery,
            Some(TargetDelivery::Period {
                from: date(2024, 2, 1),
                to: date(2024, 2, 29)
            })
        );

        let line = SourceLineBuilder::new("1", "X", dec!(1), "C62")
            .price(dec!(0))
            .tax(TaxCategoryBuilder::vat("S").percent(dec!(20)).build())
            .delivery_date(date(2024, 2, 20))
            .build();
        let doc = base().add_line(line).build().unwrap();
        let c = convert(&doc, &Settings::default());
        assert_eq!(c.document.unwrap().delivery, Some(TargetDelivery::Date(date(2024, 2, 20))));
    }

    #[test]
    fn mandatory_delivery_missing() {
        let c = convert(&base().build().unwrap(), &Settings::default().delivery_date_mandatory(true));
        assert_eq!(c.diagnostics.as_slice()[0].field, "delivery");
    }

    #[test]
    fn document_adjustments_use_line_total_as_base() {
        let line = SourceLineBuilder::new("1", "X", dec!(2), "C62")
            .price(dec!(50))
            .tax(TaxCategoryBuilder::vat("S").percent(dec!(20)).build())
            .build();
        let doc = base()
            .add_line(line)
            .add_allowance_charge(
                AdjustmentEntry::reduction(dec!(10)).with_tax(TaxCategoryBuilder::vat("S").percent(dec!(20)).build()),
            )
            .build()
            .unwrap();
        let target = convert(&doc, &Settings::default()).into_result().unwrap();
        let details = target.reduction_and_surcharge.unwrap();
        assert_eq!(details.reductions[0].base_amount, dec!(100));
        assert_eq!(details.reductions[0].vat_rate, Some(dec!(20)));
    }

    #[test]
    fn gross_amount_falls_back_to_payable_plus_prepaid() {
        let doc = base()
            .monetary_total(MonetaryTotal {
                prepaid_amount: Some(dec!(20)),
                payable_amount: dec!(100),
                ..MonetaryTotal::default()
            })
            .build()
            .unwrap();
        let target = convert(&doc, &Settings::default()).into_result().unwrap();
        assert_eq!(target.total_gross_amount, dec!(120));
        assert_eq!(target.prepaid_amount, Some(dec!(20)));
    }

    #[test]
    fn extreme_amounts_are_reported_not_panicking() {
        let tax = TaxCategoryBuilder::vat("S").percent(dec!(20)).build();
        let doc = base()
            .add_line(SourceLineBuilder::new("1", "X", Decimal::MAX, "C62").price(dec!(2)).tax(tax.clone()).build())
            .add_line(SourceLineBuilder::new("2", "Y", dec!(1), "C62").price(Decimal::MAX).tax(tax.clone()).build())
            .add_line(SourceLineBuilder::new("3", "Z", dec!(1), "C62").price(Decimal::MAX).tax(tax).build())
            .add_tax_subtotal(
                TaxSubtotalBuilder::vat("S")
                    .percent(dec!(0.01))
                    .tax_amount(dec!(100000000000000000000000000))
                    .build(),
            )
            .monetary_total(MonetaryTotal {
                prepaid_amount: Some(Decimal::MAX),
                payable_amount: Decimal::MAX,
                ..MonetaryTotal::default()
            })
            .build()
            .unwrap();
        let c = convert(&doc, &Settings::default());
        let fields: Vec<_> = c.diagnostics.errors().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "tax_subtotals[0].taxable_amount",
                "tax_subtotals[0].taxable_amount",
                "lines[0].quantity",
                "lines",
                "monetary_total.prepaid_amount",
            ]
        );
        let target = c.document.unwrap();
        assert_eq!(target.total_gross_amount, Decimal::MAX);
        assert_eq!(target.items[1].line_item_amount, Decimal::MAX);
    }

    #[test]
    fn credit_note_maps_to_credit_memo() {
        let doc = SourceDocumentBuilder::credit_note("CN-1", date(2024, 3, 1))
            .supplier(SourcePartyBuilder::new("S").vat_id("ATU1").build())
            .customer(SourcePartyBuilder::new("C").vat_id("ATU2").build())
            .note("Gutschrift")
            .note("zu INV-1")
            .build()
            .unwrap();
        let target = convert(&doc, &Settings::default()).into_result().unwrap();
        assert_eq!(target.document_type, TargetDocumentType::CreditMemo);
        assert_eq!(target.comment.as_deref(), Some("Gutschrift\nzu INV-1"));
        assert_eq!(target.payment_method.unwrap().kind, PaymentMethodKind::NoPayment);
    }
}

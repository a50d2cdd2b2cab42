//! Payment terms merging.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::core::rounding::{checked_mul_div, round_amount};
use crate::core::*;

const DUE_DATE_CONFLICT: &str = "more than one payment due date found";

/// Due date seen so far; the first one wins.
#[derive(Debug, Default)]
struct DueDate(Option<NaiveDate>);

impl DueDate {
    fn offer(&mut self, date: NaiveDate, field: &str, diags: &mut Diagnostics) {
        match self.0 {
            None => self.0 = Some(date),
            Some(existing) if existing == date => {}
            Some(existing) => diags.warn(
                field,
                format!("{DUE_DATE_CONFLICT}: keeping {existing}, ignoring {date}"),
            ),
        }
    }
}

/// Merge the payment terms of a document into payment conditions.
///
/// `initial_due` is the due date taken from the chosen payment means,
/// `fallback_due` the document's top-level due date, consulted after all
/// terms entries. Conditions are only returned when a due date is known.
pub fn merge_terms(
    terms: &[PaymentTerms],
    initial_due: Option<NaiveDate>,
    fallback_due: Option<NaiveDate>,
    payable: Decimal,
    diags: &mut Diagnostics,
) -> Option<PaymentConditions> {
    let mut due = DueDate(initial_due);
    let mut comments: Vec<&str> = Vec::new();
    let mut minimum_payment: Option<Decimal> = None;
    let mut discounts = Vec::new();

    for (i, entry) in terms.iter().enumerate() {
        let field = format!("payment_terms[{i}]");
        comments.extend(entry.notes.iter().map(|n| n.trim()).filter(|n| !n.is_empty()));

        if let Some(date) = entry.due_date {
            due.offer(date, &format!("{field}.due_date"), diags);
        }

        if let Some(pct) = entry.payment_percent {
            if pct > Decimal::ZERO && pct < dec!(100) {
                match minimum_payment {
                    None => match checked_mul_div(payable, pct, dec!(100)) {
                        Some(amount) => minimum_payment = Some(round_amount(amount)),
                        None => diags.error(
                            format!("{field}.payment_percent"),
                            "minimum payment cannot be computed, the calculation overflows",
                        ),
                    },
                    Some(existing) => diags.warn(
                        format!("{field}.payment_percent"),
                        format!("minimum payment already set to {existing}, ignoring {pct} %"),
                    ),
                }
            }
        }

        if entry.due_date.is_none() {
            if let Some(pct) = entry.settlement_discount_percent {
                match entry.settlement_period_end {
                    Some(end) => discounts.push(Discount {
                        payment_date: end,
                        percentage: pct,
                        amount: entry.settlement_discount_amount,
                    }),
                    None => diags.warn(
                        format!("{field}.settlement_period_end"),
                        format!("settlement discount of {pct} % has no end date and was dropped"),
                    ),
                }
            }
        }

        if let Some(pct) = entry.penalty_surcharge_percent {
            diags.warn(
                format!("{field}.penalty_surcharge_percent"),
                format!("penalty surcharge of {pct} % is not supported and was ignored"),
            );
        }
    }

    if let Some(date) = fallback_due {
        due.offer(date, "due_date", diags);
    }

    let Some(due_date) = due.0 else {
        if !discounts.is_empty() {
            diags.error("payment_terms", "discount without due date");
        }
        return None;
    };

    debug!(%due_date, discounts = discounts.len(), "payment conditions merged");
    let comment = comments.join("\n");
    Some(PaymentConditions {
        due_date: Some(due_date),
        minimum_payment,
        discounts,
        comment: (!comment.is_empty()).then_some(comment),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_due_date() {
        let mut d = Diagnostics::new();
        let c = merge_terms(&[PaymentTerms::due(date(2024, 7, 1))], None, None, dec!(100), &mut d).unwrap();
        assert_eq!(c.due_date, Some(date(2024, 7, 1)));
        assert!(c.discounts.is_empty());
        assert!(d.is_empty());
    }

    #[test]
    fn conflicting_due_dates_keep_first() {
        let mut d = Diagnostics::new();
        let c = merge_terms(
            &[PaymentTerms::due(date(2024, 7, 1)), PaymentTerms::due(date(2024, 8, 1))],
            None,
            None,
            dec!(100),
            &mut d,
        )
        .unwrap();
        assert_eq!(c.due_date, Some(date(2024, 7, 1)));
        assert_eq!(d.len(), 1);
        assert!(d.as_slice()[0].message.starts_with(DUE_DATE_CONFLICT));
        assert_eq!(d.as_slice()[0].field, "payment_terms[1].due_date");
    }

    #[test]
    fn equal_due_dates_are_silent() {
        let mut d = Diagnostics::new();
        merge_terms(
            &[PaymentTerms::due(date(2024, 7, 1))],
            Some(date(2024, 7, 1)),
            Some(date(2024, 7, 1)),
            dec!(100),
            &mut d,
        );
        assert!(d.is_empty());
    }

    #[test]
    fn payment_means_due_date_wins_over_terms() {
        let mut d = Diagnostics::new();
        let c = merge_terms(
            &[PaymentTerms::due(date(2024, 9, 1))],
            Some(date(2024, 7, 1)),
            None,
            dec!(100),
            &mut d,
        )
        .unwrap();
        assert_eq!(c.due_date, Some(date(2024, 7, 1)));
        assert_eq!(d.warning_count(), 1);
    }

    #[test]
    fn top_level_due_date_is_fallback() {
        let mut d = Diagnostics::new();
        let c = merge_terms(&[], None, Some(date(2024, 7, 1)), dec!(100), &mut d).unwrap();
        assert_eq!(c.due_date, Some(date(2024, 7, 1)));
    }

    #[test]
    fn minimum_payment_from_percent() {
        let mut d = Diagnostics::new();
        let c = merge_terms(
            &[PaymentTerms::due(date(2024, 7, 1)).with_payment_percent(dec!(33.333))],
            None,
            None,
            dec!(200),
            &mut d,
        )
        .unwrap();
        assert_eq!(c.minimum_payment, Some(dec!(66.67)));
    }

    #[test]
    fn overflowing_minimum_payment_is_error() {
        let mut d = Diagnostics::new();
        let c = merge_terms(
            &[PaymentTerms::due(date(2024, 7, 1)).with_payment_percent(dec!(50))],
            None,
            None,
            Decimal::MAX,
            &mut d,
        )
        .unwrap();
        assert_eq!(c.minimum_payment, None);
        assert_eq!(d.error_count(), 1);
        assert_eq!(d.as_slice()[0].field, "payment_terms[0].payment_percent");
    }

    #[test]
    fn full_payment_percent_sets_no_minimum() {
        let mut d = Diagnostics::new();
        let c = merge_terms(
            &[PaymentTerms::due(date(2024, 7, 1)).with_payment_percent(dec!(100))],
            None,
            None,
            dec!(200),
            &mut d,
        )
        .unwrap();
        assert_eq!(c.minimum_payment, None);
    }

    #[test]
    fn discount_entry_recorded() {
        let mut d = Diagnostics::new();
        let c = merge_terms(
            &[
                PaymentTerms::due(date(2024, 7, 31)).with_note("30 Tage netto"),
                PaymentTerms::discount(dec!(2), Some(date(2024, 7, 10)))
                    .with_discount_amount(dec!(2.40))
                    .with_note("2 % Skonto"),
            ],
            None,
            None,
            dec!(120),
            &mut d,
        )
        .unwrap();
        assert!(d.is_empty());
        assert_eq!(
            c.discounts,
            vec![Discount {
                payment_date: date(2024, 7, 10),
                percentage: dec!(2),
                amount: Some(dec!(2.40)),
            }]
        );
        assert_eq!(c.comment.as_deref(), Some("30 Tage netto\n2 % Skonto"));
    }

    #[test]
    fn discount_without_end_date_dropped() {
        let mut d = Diagnostics::new();
        let c = merge_terms(
            &[PaymentTerms::due(date(2024, 7, 31)), PaymentTerms::discount(dec!(3), None)],
            None,
            None,
            dec!(120),
            &mut d,
        )
        .unwrap();
        assert!(c.discounts.is_empty());
        assert_eq!(d.warning_count(), 1);
    }

    #[test]
    fn discount_without_due_date_is_error() {
        let mut d = Diagnostics::new();
        let c = merge_terms(
            &[PaymentTerms::discount(dec!(3), Some(date(2024, 7, 10)))],
            None,
            None,
            dec!(120),
            &mut d,
        );
        assert!(c.is_none());
        assert_eq!(d.error_count(), 1);
        assert_eq!(d.as_slice()[0].message, "discount without due date");
    }

    #[test]
    fn no_due_date_no_conditions() {
        let mut d = Diagnostics::new();
        assert!(merge_terms(&[PaymentTerms::default().with_note("x")], None, None, dec!(1), &mut d).is_none());
        assert!(d.is_empty());
    }

    #[test]
    fn penalty_always_warns() {
        let mut d = Diagnostics::new();
        merge_terms(
            &[PaymentTerms::due(date(2024, 7, 31)).with_penalty_percent(dec!(5))],
            None,
            None,
            dec!(120),
            &mut d,
        );
        assert_eq!(d.warning_count(), 1);
        assert_eq!(d.as_slice()[0].field, "payment_terms[0].penalty_surcharge_percent");
    }
}

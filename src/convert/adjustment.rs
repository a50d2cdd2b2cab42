//! Reduction / surcharge normalization.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::*;

/// How entries are assigned to the reduction and surcharge lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// The first entry fixes the direction of the whole list. Entries of the
    /// other direction are filed under it with their sign flipped.
    FirstEntry,
    /// Every entry is filed under its own direction.
    PerEntry,
}

/// Where the adjustments are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Line,
    /// Document level entries also need a VAT rate.
    Document,
}

/// Reductions and surcharges after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedAdjustments {
    pub reductions: Vec<Adjustment>,
    pub surcharges: Vec<Adjustment>,
    /// Running base after each entry, in input order.
    pub running_bases: Vec<Decimal>,
}

impl NormalizedAdjustments {
    /// Base after the last entry, or `start` if there were none.
    pub fn final_base(&self, start: Decimal) -> Decimal {
        self.running_bases.last().copied().unwrap_or(start)
    }

    /// Net effect on the base: surcharges minus reductions. `None` if the
    /// sum overflows.
    pub fn net(&self) -> Option<Decimal> {
        let sum = |list: &[Adjustment]| {
            list.iter()
                .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(a.amount))
        };
        sum(&self.surcharges)?.checked_sub(sum(&self.reductions)?)
    }

    pub fn is_empty(&self) -> bool {
        self.reductions.is_empty() && self.surcharges.is_empty()
    }
}

struct Fold {
    /// `Some(true)` once the list is fixed to surcharges.
    direction: Option<bool>,
    base: Decimal,
    out: NormalizedAdjustments,
}

/// Normalize `entries` against a starting base amount.
///
/// `field` is the path of the entry list, used for diagnostics.
pub fn normalize(
    entries: &[AdjustmentEntry],
    start_base: Decimal,
    polarity: Polarity,
    level: Level,
    field: &str,
    diags: &mut Diagnostics,
) -> NormalizedAdjustments {
    let init = Fold {
        direction: None,
        base: start_base,
        out: NormalizedAdjustments::default(),
    };

    let fold = entries.iter().enumerate().fold(init, |mut acc, (i, entry)| {
        let as_charge = match polarity {
            Polarity::FirstEntry => *acc.direction.get_or_insert(entry.is_charge),
            Polarity::PerEntry => entry.is_charge,
        };
        let sign = if as_charge == entry.is_charge {
            Decimal::ONE
        } else {
            Decimal::NEGATIVE_ONE
        };

        let entry_field = format!("{field}[{i}]");
        let vat_rate = match level {
            Level::Line => None,
            Level::Document => document_vat_rate(entry, &entry_field, diags),
        };

        let percentage = entry.multiplier_factor.and_then(|f| {
            let pct = f.checked_mul(dec!(100)).map(|p| sign * p);
            if pct.is_none() {
                diags.error(
                    format!("{entry_field}.multiplier_factor"),
                    format!("multiplier factor {f} is out of range and was dropped"),
                );
            }
            pct
        });

        let adjustment = Adjustment {
            base_amount: entry.base_amount.unwrap_or(acc.base),
            percentage,
            amount: sign * entry.amount,
            vat_rate,
            comment: join_reasons(&entry.reasons),
        };

        let next = if as_charge {
            acc.base.checked_add(adjustment.amount)
        } else {
            acc.base.checked_sub(adjustment.amount)
        };
        match next {
            Some(base) => acc.base = base,
            None => diags.error(
                format!("{entry_field}.amount"),
                "running base overflows, amount not applied to the base",
            ),
        }
        if as_charge {
            acc.out.surcharges.push(adjustment);
        } else {
            acc.out.reductions.push(adjustment);
        }
        acc.out.running_bases.push(acc.base);
        acc
    });

    fold.out
}

fn document_vat_rate(entry: &AdjustmentEntry, field: &str, diags: &mut Diagnostics) -> Option<Decimal> {
    if let Some(percent) = entry.tax_categories.iter().find_map(|c| c.percent) {
        return Some(percent);
    }
    diags.error(
        format!("{field}.tax_categories"),
        "no tax rate for allowance/charge",
    );
    None
}

fn join_reasons(reasons: &[String]) -> Option<String> {
    let joined = reasons
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!joined.is_empty()).then_some(joined)
}

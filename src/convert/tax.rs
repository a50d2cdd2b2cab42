//! Tax bucket reconciliation and classification.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::core::rounding::{checked_mul_div, round_amount, round_percent};
use crate::core::*;

/// Tax scheme ids that are treated as VAT. "GST" is used by the A-NZ
/// invoicing profile for the same concept.
pub const VAT_SCHEME_IDS: &[&str] = &["VAT", "GST"];

/// UNCL5305 categories that denote a tax exemption (zero rate by definition).
pub const EXEMPTION_CATEGORY_IDS: &[&str] = &["E", "AE", "K", "G", "O"];

/// Reason used for exemptions whose source carries none.
pub const DEFAULT_EXEMPTION_REASON: &str = "Tax Exemption";

pub fn is_vat_scheme(scheme: &SchemedId) -> bool {
    VAT_SCHEME_IDS.contains(&scheme.value.trim())
}

pub fn is_exemption_category(category: &SchemedId) -> bool {
    EXEMPTION_CATEGORY_IDS.contains(&category.value.trim())
}

/// Map key identifying a tax category within a tax scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaxCategoryKey {
    pub scheme: SchemedId,
    pub category: SchemedId,
}

impl TaxCategoryKey {
    /// Key of a category reference, if both ids are present and non-blank.
    pub fn of(category: &TaxCategoryRef) -> Option<Self> {
        let scheme = category.tax_scheme.as_ref().filter(|s| !s.is_blank())?;
        let id = category.id.as_ref().filter(|c| !c.is_blank())?;
        Some(Self {
            scheme: scheme.clone(),
            category: id.clone(),
        })
    }
}

/// Percentage, taxable base and tax amount of one tax entry, any of which
/// may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxTriple {
    pub percent: Option<Decimal>,
    pub taxable: Option<Decimal>,
    pub amount: Option<Decimal>,
}

impl TaxTriple {
    /// Derive whichever value is missing from the two known ones.
    ///
    /// Percentages and amounts are rounded half-up to two decimals. A zero
    /// taxable base yields a zero percentage; a zero percentage never
    /// determines a base. A value whose derivation overflows is reported
    /// at `field` and stays unknown.
    pub fn reconcile(self, field: &str, diags: &mut Diagnostics) -> Self {
        let mut t = self;
        let overflow = |what: &str, diags: &mut Diagnostics| -> Option<Decimal> {
            diags.error(
                format!("{field}.{what}"),
                format!("{what} cannot be derived, the calculation overflows"),
            );
            None
        };
        if t.percent.is_none() {
            if let (Some(amount), Some(taxable)) = (t.amount, t.taxable) {
                t.percent = if taxable.is_zero() {
                    Some(Decimal::ZERO)
                } else {
                    checked_mul_div(amount, dec!(100), taxable)
                        .map(round_percent)
                        .or_else(|| overflow("percent", diags))
                };
            }
        }
        if t.taxable.is_none() {
            if let (Some(percent), Some(amount)) = (t.percent, t.amount) {
                if !percent.is_zero() {
                    t.taxable = checked_mul_div(amount, dec!(100), percent)
                        .map(round_amount)
                        .or_else(|| overflow("taxable_amount", diags));
                }
            }
        }
        if t.amount.is_none() {
            if let (Some(percent), Some(taxable)) = (t.percent, t.taxable) {
                t.amount = if percent.is_zero() {
                    Some(Decimal::ZERO)
                } else {
                    checked_mul_div(taxable, percent, dec!(100))
                        .map(round_amount)
                        .or_else(|| overflow("tax_amount", diags))
                };
            }
        }
        t
    }
}

/// One declared tax subtotal with a usable category key.
#[derive(Debug, Clone)]
pub struct TaxBucket {
    pub key: TaxCategoryKey,
    pub exempt: bool,
    pub values: TaxTriple,
    pub exemption_reason: Option<String>,
}

impl TaxBucket {
    /// Build a bucket from a subtotal. Missing scheme or category ids are
    /// reported and yield `None`.
    pub fn from_subtotal(
        subtotal: &TaxSubtotal,
        field: &str,
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        let category = &subtotal.category;
        if category.tax_scheme.as_ref().is_none_or(SchemedId::is_blank) {
            diags.error(
                format!("{field}.category.tax_scheme"),
                "tax subtotal has no tax scheme id",
            );
            return None;
        }
        if category.id.as_ref().is_none_or(SchemedId::is_blank) {
            diags.error(
                format!("{field}.category.id"),
                "tax subtotal has no tax category id",
            );
            return None;
        }
        let key = TaxCategoryKey::of(category)?;
        let exempt = is_exemption_category(&key.category);
        Some(Self {
            exempt,
            values: TaxTriple {
                percent: subtotal.percent.or(category.percent),
                taxable: subtotal.taxable_amount,
                amount: subtotal.tax_amount,
            },
            exemption_reason: category.exemption_reason.clone(),
            key,
        })
    }
}

/// Category key to percentage, built from the document's tax subtotals and
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTaxMap {
    rates: HashMap<TaxCategoryKey, Decimal>,
}

impl ResolvedTaxMap {
    pub fn get(&self, key: &TaxCategoryKey) -> Option<Decimal> {
        self.rates.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Result of processing all document-level tax subtotals.
#[derive(Debug, Clone, Default)]
pub struct TaxReconciliation {
    pub tax: Tax,
    pub rates: ResolvedTaxMap,
}

/// Reconcile every tax subtotal in declaration order.
pub fn reconcile_taxes(subtotals: &[TaxSubtotal], diags: &mut Diagnostics) -> TaxReconciliation {
    let mut rates: HashMap<TaxCategoryKey, Decimal> = HashMap::new();
    let mut vat = Vec::new();
    let mut other: Vec<(String, Decimal)> = Vec::new();

    for (i, subtotal) in subtotals.iter().enumerate() {
        let field = format!("tax_subtotals[{i}]");
        let Some(bucket) = TaxBucket::from_subtotal(subtotal, &field, diags) else {
            continue;
        };

        if !is_vat_scheme(&bucket.key.scheme) {
            // Summed as declared, no derivation.
            if let Some(percent) = bucket.values.percent {
                record_rate(&mut rates, &bucket.key, percent, &field, diags);
            }
            let amount = bucket.values.amount.unwrap_or_else(|| {
                diags.warn(
                    format!("{field}.tax_amount"),
                    format!(
                        "tax amount of other tax '{}' missing, using 0",
                        bucket.key.scheme.value
                    ),
                );
                Decimal::ZERO
            });
            let name = bucket.key.scheme.value.trim().to_string();
            match other.iter_mut().find(|(n, _)| *n == name) {
                Some((_, sum)) => match sum.checked_add(amount) {
                    Some(total) => *sum = total,
                    None => diags.error(
                        format!("{field}.tax_amount"),
                        format!("sum of other tax '{name}' overflows, amount ignored"),
                    ),
                },
                None => other.push((name, amount)),
            }
            continue;
        }

        if bucket.exempt {
            let declared = bucket.values.percent.unwrap_or(Decimal::ZERO);
            if !declared.is_zero() {
                debug!(%declared, category = %bucket.key.category.value, "exempt category forced to 0 %");
            }
            record_rate(&mut rates, &bucket.key, Decimal::ZERO, &field, diags);
            let taxable = bucket.values.taxable.unwrap_or_else(|| {
                diags.warn(
                    format!("{field}.taxable_amount"),
                    "taxable amount of tax exemption missing, using 0",
                );
                Decimal::ZERO
            });
            let reason = bucket
                .exemption_reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_EXEMPTION_REASON)
                .to_string();
            vat.push(VatItem {
                taxed_amount: taxable,
                tax: LineTax::Exemption { reason },
                amount: Decimal::ZERO,
            });
            continue;
        }

        let values = bucket.values.reconcile(&field, diags);
        if let Some(percent) = values.percent {
            record_rate(&mut rates, &bucket.key, percent, &field, diags);
        }
        match (values.percent, values.taxable) {
            (None, _) => diags.error(format!("{field}.percent"), "tax percent missing"),
            (Some(_), None) => {
                diags.error(format!("{field}.taxable_amount"), "taxable amount missing")
            }
            (Some(percent), Some(taxable)) => {
                let amount = values.amount.unwrap_or(Decimal::ZERO);
                debug!(%percent, %taxable, %amount, "VAT bucket resolved");
                vat.push(VatItem {
                    taxed_amount: taxable,
                    tax: LineTax::VatRate(percent),
                    amount,
                });
            }
        }
    }

    TaxReconciliation {
        tax: Tax {
            vat,
            other_tax: other
                .into_iter()
                .map(|(comment, amount)| OtherTax { comment, amount })
                .collect(),
        },
        rates: ResolvedTaxMap { rates },
    }
}

fn record_rate(
    rates: &mut HashMap<TaxCategoryKey, Decimal>,
    key: &TaxCategoryKey,
    percent: Decimal,
    field: &str,
    diags: &mut Diagnostics,
) {
    match rates.get(key) {
        Some(existing) if *existing != percent => diags.warn(
            format!("{field}.percent"),
            format!(
                "tax category '{}' already resolved to {existing} %, ignoring {percent} %",
                key.category.value
            ),
        ),
        Some(_) => {}
        None => {
            rates.insert(key.clone(), percent);
        }
    }
}

/// Tax treatment of a line, falling back to the resolved document rates.
///
/// Exempt categories are always 0 %. A non-exempt line without its own
/// percent takes the document rate for its category, or 0 % with a warning.
pub fn line_tax(
    category: &TaxCategoryRef,
    rates: &ResolvedTaxMap,
    field: &str,
    diags: &mut Diagnostics,
) -> LineTax {
    let exempt = category.id.as_ref().is_some_and(is_exemption_category);
    if exempt {
        let reason = category
            .exemption_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_EXEMPTION_REASON);
        return LineTax::Exemption {
            reason: reason.to_string(),
        };
    }

    if let Some(percent) = category.percent {
        return LineTax::VatRate(percent);
    }

    match TaxCategoryKey::of(category).and_then(|key| rates.get(&key)) {
        Some(percent) => LineTax::VatRate(percent),
        None => {
            diags.warn(
                format!("{field}.percent"),
                "tax percent missing and no matching tax subtotal, defaulting to 0 %",
            );
            LineTax::VatRate(Decimal::ZERO)
        }
    }
}

//! Line item mapping.

use rust_decimal::Decimal;
use tracing::trace;

use super::adjustment::{normalize, Level, Polarity};
use super::tax::{line_tax, ResolvedTaxMap};
use crate::core::rounding::{checked_mul_div, round_amount};
use crate::core::*;

/// UN/ECE Rec 20 "one", used when a line declares no unit.
pub const DEFAULT_UNIT: &str = "C62";

/// Document-wide inputs shared by every line.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub rates: &'a ResolvedTaxMap,
    pub polarity: Polarity,
    /// Document order reference, used when a line has none of its own.
    pub order_reference: Option<&'a str>,
}

/// Map the line at `index` into an ebInterface list line item.
pub fn map_line(index: usize, line: &SourceLine, ctx: &LineContext<'_>, diags: &mut Diagnostics) -> ListLineItem {
    let field = format!("lines[{index}]");

    let position_number = line
        .id
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(u32::MAX));

    let unit = match line.unit_code.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(u) => u.to_string(),
        None => {
            diags.warn(
                format!("{field}.unit_code"),
                format!("quantity has no unit, using '{DEFAULT_UNIT}'"),
            );
            DEFAULT_UNIT.to_string()
        }
    };

    let quantity = line.quantity;
    let base_quantity = line
        .price
        .as_ref()
        .and_then(|p| p.base_quantity)
        .filter(|q| !q.is_zero());
    let unit_price = match &line.price {
        Some(price) => price.amount,
        None => {
            let derived = match line.line_extension_amount {
                Some(amount) if !quantity.is_zero() => amount.checked_div(quantity).unwrap_or_else(|| {
                    diags.error(format!("{field}.price"), "unit price cannot be derived, the calculation overflows");
                    Decimal::ZERO
                }),
                _ => Decimal::ZERO,
            };
            diags.warn(
                format!("{field}.price"),
                format!("line has no price, using {}", derived.normalize()),
            );
            derived
        }
    };

    let gross = match checked_mul_div(quantity, unit_price, base_quantity.unwrap_or(Decimal::ONE)) {
        Some(gross) => round_amount(gross),
        None => {
            diags.error(
                format!("{field}.quantity"),
                "quantity times unit price overflows, using 0 as base",
            );
            Decimal::ZERO
        }
    };
    let adjustments = normalize(
        &line.allowance_charges,
        gross,
        ctx.polarity,
        Level::Line,
        &format!("{field}.allowance_charges"),
        diags,
    );
    let line_item_amount = line
        .line_extension_amount
        .unwrap_or_else(|| round_amount(adjustments.final_base(gross)));

    let tax = match &line.item.tax_category {
        Some(category) => line_tax(category, ctx.rates, &format!("{field}.item.tax_category"), diags),
        None => {
            diags.error(format!("{field}.item.tax_category"), "line has no tax category");
            LineTax::VatRate(Decimal::ZERO)
        }
    };

    let description: Vec<String> = line
        .item
        .name
        .iter()
        .chain(&line.item.descriptions)
        .chain(&line.notes)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if description.is_empty() {
        diags.warn(format!("{field}.item.name"), "line has no item name or description");
    }

    let article_number = line
        .item
        .sellers_item_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .or_else(|| {
            line.item
                .standard_item_id
                .as_ref()
                .filter(|id| !id.is_blank())
                .map(|id| id.value.trim().to_string())
        });

    let order_position = line
        .order_reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .or(ctx.order_reference)
        .map(|order_id| OrderPositionReference {
            order_id: order_id.to_string(),
            order_position_number: line
                .order_line_id
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        });

    trace!(position_number, %line_item_amount, "line mapped");
    ListLineItem {
        position_number,
        description,
        article_number,
        quantity,
        unit,
        unit_price,
        base_quantity,
        tax,
        reductions: adjustments.reductions,
        surcharges: adjustments.surcharges,
        line_item_amount,
        order_position,
        delivery_date: line.delivery_date,
    }
}

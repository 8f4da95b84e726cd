use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::types::{Discount, DiscountKind, LineItem, Totals};

/// Round to 2 decimal places, midpoint away from zero (commercial rounding).
///
/// Decimal arithmetic makes this exact: `round_to_two(dec!(2.005))` is
/// `2.01` without the epsilon bias a binary float implementation needs.
/// Idempotent: rounding an already-rounded value is a no-op.
pub fn round_to_two(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a loose numeric string, coercing anything unparseable to zero.
///
/// This is the deliberate leniency policy for form input: malformed numbers
/// degrade to 0 and the validators reject the zero later, rather than the
/// arithmetic ever failing.
pub fn parse_amount(input: &str) -> Decimal {
    input.trim().parse().unwrap_or(Decimal::ZERO)
}

/// Line total: quantity × unit price, in full precision.
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    quantity * unit_price
}

/// Sum of line totals over the full ordered sequence; empty yields zero.
/// No rounding happens here; accumulation stays in full precision until
/// [`compose_totals`].
pub fn subtotal(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(|item| line_total(item.quantity, item.unit_price))
        .sum()
}

/// Discount amount for a given subtotal. Percentage discounts are a share
/// of the subtotal; fixed discounts are taken verbatim and are not capped,
/// so a fixed discount larger than the subtotal drives the total negative.
pub fn discount_amount(subtotal: Decimal, discount: Option<Discount>) -> Decimal {
    match discount {
        Some(Discount {
            amount,
            kind: DiscountKind::Percentage,
        }) => subtotal * amount / dec!(100),
        Some(Discount {
            amount,
            kind: DiscountKind::Fixed,
        }) => amount,
        None => Decimal::ZERO,
    }
}

/// Tax amount: a percentage of the taxable base.
pub fn tax_amount(taxable_base: Decimal, rate_percent: Decimal) -> Decimal {
    taxable_base * rate_percent / dec!(100)
}

/// Compose full invoice totals.
///
/// The discount applies to the subtotal first; tax is then computed on the
/// taxable remainder (`subtotal - discount_amount`). Each of the four
/// outputs is rounded to 2 decimal places independently. Pure and
/// idempotent; re-invoke after any input change rather than patching a
/// cached value.
pub fn compose_totals(items: &[LineItem], tax_rate: Decimal, discount: Option<Discount>) -> Totals {
    let sub = subtotal(items);
    let disc = discount_amount(sub, discount);
    let taxable_base = sub - disc;
    let tax = tax_amount(taxable_base, tax_rate);
    let total = sub + tax - disc;

    Totals {
        subtotal: round_to_two(sub),
        tax_amount: round_to_two(tax),
        discount_amount: round_to_two(disc),
        total: round_to_two(total),
    }
}

/// Format an amount for display with a currency symbol, always 2 dp.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    format!("{symbol}{:.2}", amount)
}

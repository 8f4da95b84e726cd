use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::calc;

/// One billable row on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Derived: always `quantity * unit_price`. Recomputed on every mutation
    /// of quantity or unit price.
    pub line_total: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            line_total: quantity * unit_price,
        }
    }

    /// Build a line item from loose form input. Unparseable or empty numeric
    /// fields coerce to zero rather than failing; validation later rejects
    /// zero quantities and prices.
    pub fn from_input(description: impl Into<String>, quantity: &str, unit_price: &str) -> Self {
        Self::new(
            description,
            calc::parse_amount(quantity),
            calc::parse_amount(unit_price),
        )
    }

    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
        self.line_total = self.quantity * self.unit_price;
    }

    pub fn set_unit_price(&mut self, unit_price: Decimal) {
        self.unit_price = unit_price;
        self.line_total = self.quantity * self.unit_price;
    }
}

/// How a document-level discount is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// A flat currency amount, subtracted verbatim.
    Fixed,
    /// A percentage of the subtotal.
    Percentage,
}

/// Document-level discount, applied to the subtotal before tax.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub amount: Decimal,
    pub kind: DiscountKind,
}

impl Discount {
    pub fn fixed(amount: Decimal) -> Self {
        Self {
            amount,
            kind: DiscountKind::Fixed,
        }
    }

    pub fn percentage(amount: Decimal) -> Self {
        Self {
            amount,
            kind: DiscountKind::Percentage,
        }
    }
}

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

/// Composed invoice totals, each rounded to 2 decimal places.
///
/// Every field is rounded independently from the full-precision
/// intermediates, so `subtotal + tax_amount - discount_amount` can differ
/// from `total` by a cent. Tax is computed on `subtotal - discount_amount`,
/// not on the raw subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

/// An invoice document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Record identity, assigned when the invoice is persisted.
    pub id: String,
    /// Formatted invoice number, e.g. "INV-2026-0001".
    pub number: String,
    /// Weak reference to a client record. Deleting the client leaves this
    /// id dangling; the invoice keeps its own copy of nothing else.
    pub client_id: String,
    pub issue_date: NaiveDate,
    /// Must be on or after `issue_date`.
    pub due_date: NaiveDate,
    /// Ordered; must be non-empty for the invoice to validate.
    pub items: Vec<LineItem>,
    /// Tax rate as a percentage, e.g. `dec!(18)` for 18%.
    pub tax_rate: Decimal,
    pub discount: Option<Discount>,
    /// Cached totals, set by [`Invoice::recalculate`].
    pub totals: Option<Totals>,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Refresh derived line totals and the cached totals block. Call after
    /// any change to items, tax rate, or discount; the composition is
    /// idempotent and has no hidden state, so re-running it is always safe.
    pub fn recalculate(&mut self) {
        for item in &mut self.items {
            item.line_total = item.quantity * item.unit_price;
        }
        self.totals = Some(calc::compose_totals(
            &self.items,
            self.tax_rate,
            self.discount,
        ));
    }
}

/// A client record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    /// Optional 15-character GST identification number,
    /// e.g. "22AAAAA0000A1Z5".
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Process-wide company settings. Single instance, read-mostly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub company_name: String,
    pub company_email: String,
    pub company_address: String,
    pub company_phone: String,
    pub country_code: String,
    pub company_tax_id: String,
    /// Default tax rate applied to new invoices, as a percentage.
    pub default_tax_rate: Decimal,
    pub currency_symbol: String,
    pub invoice_terms: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: "Your Company Name".into(),
            company_email: "info@yourcompany.com".into(),
            company_address: "123 Business Street, City, State 12345".into(),
            company_phone: String::new(),
            country_code: "+1".into(),
            company_tax_id: String::new(),
            default_tax_rate: dec!(18),
            currency_symbol: "$".into(),
            invoice_terms: "Payment due within 30 days. Thank you for your business!".into(),
        }
    }
}

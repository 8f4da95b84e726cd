use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use super::error::BillingError;
use super::types::*;
use super::validation;

/// Builder for constructing validated invoices with computed totals.
///
/// ```
/// use billcraft::core::*;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new(
///     "INV-2026-0001",
///     "client-1",
///     NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
/// )
/// .add_item(LineItem::new("Consulting", dec!(10), dec!(150)))
/// .tax_rate(dec!(18))
/// .build()
/// .unwrap();
///
/// assert_eq!(invoice.totals.unwrap().total, dec!(1770.00));
/// ```
pub struct InvoiceBuilder {
    id: Option<String>,
    number: String,
    client_id: String,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    items: Vec<LineItem>,
    tax_rate: Decimal,
    discount: Option<Discount>,
    status: InvoiceStatus,
    notes: Option<String>,
}

impl InvoiceBuilder {
    pub fn new(
        number: impl Into<String>,
        client_id: impl Into<String>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            number: number.into(),
            client_id: client_id.into(),
            issue_date,
            due_date,
            items: Vec::new(),
            tax_rate: Decimal::ZERO,
            discount: None,
            status: InvoiceStatus::Unpaid,
            notes: None,
        }
    }

    /// Record id. When omitted, the repository assigns one at persist time.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn add_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn tax_rate(mut self, rate_percent: Decimal) -> Self {
        self.tax_rate = rate_percent;
        self
    }

    pub fn discount(mut self, discount: Discount) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Build the invoice, computing totals and running validation.
    /// Reports all validation errors, not just the first.
    pub fn build(self) -> Result<Invoice, BillingError> {
        let invoice = self.assemble();
        let report = validation::validate_invoice(&invoice);
        if !report.is_valid() {
            return Err(BillingError::Validation(report.messages().join("; ")));
        }
        Ok(invoice)
    }

    /// Build without validation, useful for drafts or importing external
    /// data. Totals are still computed.
    pub fn build_unchecked(self) -> Invoice {
        self.assemble()
    }

    fn assemble(self) -> Invoice {
        let mut invoice = Invoice {
            id: self.id.unwrap_or_default(),
            number: self.number,
            client_id: self.client_id,
            issue_date: self.issue_date,
            due_date: self.due_date,
            items: self.items,
            tax_rate: self.tax_rate,
            discount: self.discount,
            totals: None,
            status: self.status,
            notes: self.notes,
            created_at: Utc::now(),
            updated_at: None,
        };
        invoice.recalculate();
        invoice
    }
}

/// Builder for client records.
pub struct ClientBuilder {
    id: Option<String>,
    name: String,
    email: String,
    address: String,
    tax_id: Option<String>,
}

impl ClientBuilder {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            address: address.into(),
            tax_id: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    /// Build the client, running validation.
    pub fn build(self) -> Result<Client, BillingError> {
        let client = self.assemble();
        let report = validation::validate_client(&client);
        if !report.is_valid() {
            return Err(BillingError::Validation(report.messages().join("; ")));
        }
        Ok(client)
    }

    pub fn build_unchecked(self) -> Client {
        self.assemble()
    }

    fn assemble(self) -> Client {
        Client {
            id: self.id.unwrap_or_default(),
            name: self.name,
            email: self.email,
            address: self.address,
            tax_id: self.tax_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

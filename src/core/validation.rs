use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::{Client, Invoice};

/// Validation outcome for a client record.
///
/// Field-keyed and sparse: a field appears in `errors` only when it has a
/// problem, so a valid address leaves no `address` key behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientReport {
    pub errors: BTreeMap<String, String>,
}

impl ClientReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Flatten to display strings, one per failing field.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect()
    }
}

/// Validation outcome for an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceReport {
    pub errors: BTreeMap<String, String>,
    /// Per-item errors, sparse: only indices with at least one error are
    /// present, and an index disappears entirely once its item is fixed.
    pub item_errors: BTreeMap<usize, BTreeMap<String, String>>,
}

impl InvoiceReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.item_errors.is_empty()
    }

    /// Flatten to display strings, item errors path-keyed as
    /// `items[2].quantity`.
    pub fn messages(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        for (index, fields) in &self.item_errors {
            for (field, message) in fields {
                out.push(format!("items[{index}].{field}: {message}"));
            }
        }
        out
    }
}

/// RFC-lite email shape check: `localpart@domain.tld`, no whitespace, a dot
/// somewhere in the domain with characters on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// GST identification number format: 15 characters: 2 digits, 5 letters,
/// 4 digits, 1 letter, 1 of [1-9A-Z], a literal 'Z', and 1 alphanumeric.
/// Checked case-insensitively.
pub fn is_valid_tax_id(tax_id: &str) -> bool {
    let code: Vec<char> = tax_id.trim().to_ascii_uppercase().chars().collect();
    if code.len() != 15 {
        return false;
    }
    let alnum = |c: char| c.is_ascii_digit() || c.is_ascii_uppercase();

    code[0..2].iter().all(|c| c.is_ascii_digit())
        && code[2..7].iter().all(|c| c.is_ascii_uppercase())
        && code[7..11].iter().all(|c| c.is_ascii_digit())
        && code[11].is_ascii_uppercase()
        && (code[12].is_ascii_uppercase() || matches!(code[12], '1'..='9'))
        && code[13] == 'Z'
        && alnum(code[14])
}

/// Validate a client record. Pure: never mutates input, safe to call
/// repeatedly and from multiple threads.
pub fn validate_client(client: &Client) -> ClientReport {
    let mut report = ClientReport::default();

    if client.name.trim().is_empty() {
        report
            .errors
            .insert("name".into(), "client name is required".into());
    }

    if client.email.trim().is_empty() {
        report
            .errors
            .insert("email".into(), "email is required".into());
    } else if !is_valid_email(client.email.trim()) {
        report
            .errors
            .insert("email".into(), "invalid email format".into());
    }

    if client.address.trim().is_empty() {
        report
            .errors
            .insert("address".into(), "address is required".into());
    }

    // Tax id is optional, but when present it must match the GST format.
    if let Some(tax_id) = &client.tax_id {
        if !tax_id.trim().is_empty() && !is_valid_tax_id(tax_id) {
            report.errors.insert(
                "tax_id".into(),
                "invalid GST format (e.g. 22AAAAA0000A1Z5)".into(),
            );
        }
    }

    report
}

/// Validate an invoice. Pure; collects all problems rather than stopping at
/// the first.
pub fn validate_invoice(invoice: &Invoice) -> InvoiceReport {
    let mut report = InvoiceReport::default();

    if invoice.client_id.trim().is_empty() {
        report
            .errors
            .insert("client_id".into(), "a client must be selected".into());
    }

    // Issue and due dates are guaranteed present by the type system
    // (NaiveDate is always a valid date); only their ordering can be wrong.
    if invoice.due_date < invoice.issue_date {
        report.errors.insert(
            "due_date".into(),
            "due date must be on or after the invoice date".into(),
        );
    }

    if invoice.items.is_empty() {
        report
            .errors
            .insert("items".into(), "invoice must have at least one item".into());
    } else {
        for (index, item) in invoice.items.iter().enumerate() {
            let mut fields = BTreeMap::new();
            if item.description.trim().is_empty() {
                fields.insert("description".into(), "description is required".into());
            }
            if item.quantity <= Decimal::ZERO {
                fields.insert("quantity".into(), "quantity must be greater than 0".into());
            }
            if item.unit_price <= Decimal::ZERO {
                fields.insert("unit_price".into(), "price must be greater than 0".into());
            }
            if !fields.is_empty() {
                report.item_errors.insert(index, fields);
            }
        }
    }

    if invoice.tax_rate < Decimal::ZERO || invoice.tax_rate > dec!(100) {
        report.errors.insert(
            "tax_rate".into(),
            "tax rate must be between 0 and 100".into(),
        );
    }

    // No upper bound on discounts; a fixed discount may exceed the subtotal.
    if let Some(discount) = &invoice.discount {
        if discount.amount < Decimal::ZERO {
            report
                .errors
                .insert("discount".into(), "discount cannot be negative".into());
        }
    }

    report
}

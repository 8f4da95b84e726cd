use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, Utc};

use super::error::BillingError;

/// Default prefix for generated invoice numbers.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Persistence seam for the invoice counter.
///
/// `compare_and_swap` is the only mutation path [`InvoiceNumberGenerator`]
/// uses when consuming a number, so two writers racing on the same store
/// cannot both claim the same counter value; one of them loses the swap
/// and retries. Atomicity is only as strong as the implementation behind
/// this trait.
pub trait CounterStore {
    fn get(&self) -> Result<u64, BillingError>;
    fn set(&self, value: u64) -> Result<(), BillingError>;
    /// Write `new` only if the stored value is still `current`. Returns
    /// whether the swap happened.
    fn compare_and_swap(&self, current: u64, new: u64) -> Result<bool, BillingError>;
}

/// In-process counter backed by an atomic. Starts at 0; the first generated
/// number is `…-0001`.
#[derive(Debug, Default)]
pub struct InMemoryCounter(AtomicU64);

impl InMemoryCounter {
    pub fn new(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }
}

impl CounterStore for InMemoryCounter {
    fn get(&self) -> Result<u64, BillingError> {
        Ok(self.0.load(Ordering::SeqCst))
    }

    fn set(&self, value: u64) -> Result<(), BillingError> {
        self.0.store(value, Ordering::SeqCst);
        Ok(())
    }

    fn compare_and_swap(&self, current: u64, new: u64) -> Result<bool, BillingError> {
        Ok(self
            .0
            .compare_exchange(current, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok())
    }
}

/// Generates invoice numbers in the `PREFIX-YYYY-NNNN` format,
/// e.g. "INV-2026-0001", "INV-2026-0002".
///
/// The counter is monotonic and scoped to nothing but itself: the year in
/// the formatted string is the calendar year at generation time, and the
/// counter never resets implicitly when the year rolls over. Call
/// [`InvoiceNumberGenerator::reset`] explicitly if a yearly restart is
/// wanted.
pub struct InvoiceNumberGenerator<S> {
    store: S,
    prefix: String,
}

impl<S: CounterStore> InvoiceNumberGenerator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            prefix: DEFAULT_INVOICE_PREFIX.into(),
        }
    }

    pub fn with_prefix(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Consume the next number, formatted with the current calendar year.
    /// Increments the persisted counter by exactly one.
    pub fn generate(&self) -> Result<String, BillingError> {
        self.generate_for_year(Utc::now().year())
    }

    /// As [`InvoiceNumberGenerator::generate`], with an explicit year. The
    /// year only affects the formatted string, never the counter.
    pub fn generate_for_year(&self, year: i32) -> Result<String, BillingError> {
        loop {
            let current = self.store.get()?;
            let next = current
                .checked_add(1)
                .ok_or_else(|| BillingError::Numbering("invoice counter overflow".into()))?;
            if self.store.compare_and_swap(current, next)? {
                return Ok(format_invoice_number(&self.prefix, year, next));
            }
            // Lost the race; reread and try again.
        }
    }

    /// The number the next [`InvoiceNumberGenerator::generate`] call would
    /// return, without consuming it.
    pub fn preview(&self) -> Result<String, BillingError> {
        self.preview_for_year(Utc::now().year())
    }

    pub fn preview_for_year(&self, year: i32) -> Result<String, BillingError> {
        let next = self
            .store
            .get()?
            .checked_add(1)
            .ok_or_else(|| BillingError::Numbering("invoice counter overflow".into()))?;
        Ok(format_invoice_number(&self.prefix, year, next))
    }

    /// Explicit counter reset, e.g. at a new year. Never invoked implicitly.
    pub fn reset(&self, value: u64) -> Result<(), BillingError> {
        self.store.set(value)
    }
}

/// Format `PREFIX-YYYY-NNNN`. The counter is zero-padded to 4 digits and
/// grows wider past 9999.
pub fn format_invoice_number(prefix: &str, year: i32, counter: u64) -> String {
    format!("{prefix}-{year:04}-{counter:04}")
}

/// Check the three-part dashed shape: non-empty prefix, 4-digit year, and a
/// numeric suffix of at least 4 digits.
pub fn is_valid_invoice_number(number: &str) -> bool {
    let mut parts = number.split('-');
    let (Some(prefix), Some(year), Some(counter), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    !prefix.is_empty()
        && year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && counter.len() >= 4
        && counter.chars().all(|c| c.is_ascii_digit())
}

/// Parse the numeric suffix out of a syntactically valid invoice number;
/// `None` for anything malformed.
pub fn extract_counter(number: &str) -> Option<u64> {
    if !is_valid_invoice_number(number) {
        return None;
    }
    number.rsplit('-').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_numbering() {
        let seq = InvoiceNumberGenerator::new(InMemoryCounter::default());
        assert_eq!(seq.generate_for_year(2026).unwrap(), "INV-2026-0001");
        assert_eq!(seq.generate_for_year(2026).unwrap(), "INV-2026-0002");
        assert_eq!(seq.generate_for_year(2026).unwrap(), "INV-2026-0003");
    }

    #[test]
    fn preview_does_not_consume() {
        let seq = InvoiceNumberGenerator::new(InMemoryCounter::default());
        assert_eq!(seq.preview_for_year(2026).unwrap(), "INV-2026-0001");
        assert_eq!(seq.preview_for_year(2026).unwrap(), "INV-2026-0001");
        assert_eq!(seq.generate_for_year(2026).unwrap(), "INV-2026-0001");
        assert_eq!(seq.preview_for_year(2026).unwrap(), "INV-2026-0002");
    }

    #[test]
    fn counter_survives_year_change() {
        let seq = InvoiceNumberGenerator::new(InMemoryCounter::new(41));
        assert_eq!(seq.generate_for_year(2025).unwrap(), "INV-2025-0042");
        // New year, same counter. No implicit reset.
        assert_eq!(seq.generate_for_year(2026).unwrap(), "INV-2026-0043");
    }

    #[test]
    fn explicit_reset() {
        let seq = InvoiceNumberGenerator::new(InMemoryCounter::new(500));
        seq.reset(0).unwrap();
        assert_eq!(seq.generate_for_year(2026).unwrap(), "INV-2026-0001");
    }

    #[test]
    fn padding_grows_past_9999() {
        let seq = InvoiceNumberGenerator::new(InMemoryCounter::new(9999));
        let number = seq.generate_for_year(2026).unwrap();
        assert_eq!(number, "INV-2026-10000");
        assert!(is_valid_invoice_number(&number));
        assert_eq!(extract_counter(&number), Some(10000));
    }

    #[test]
    fn exhausted_counter_errors_instead_of_wrapping() {
        let seq = InvoiceNumberGenerator::new(InMemoryCounter::new(u64::MAX));
        assert!(matches!(
            seq.generate_for_year(2026),
            Err(BillingError::Numbering(_))
        ));
        assert!(matches!(
            seq.preview_for_year(2026),
            Err(BillingError::Numbering(_))
        ));
    }

    #[test]
    fn custom_prefix() {
        let seq = InvoiceNumberGenerator::with_prefix(InMemoryCounter::default(), "RCPT");
        assert_eq!(seq.generate_for_year(2026).unwrap(), "RCPT-2026-0001");
    }

    #[test]
    fn shape_validation() {
        assert!(is_valid_invoice_number("INV-2026-0001"));
        assert!(is_valid_invoice_number("INV-2026-12345"));
        assert!(!is_valid_invoice_number(""));
        assert!(!is_valid_invoice_number("INV-2026"));
        assert!(!is_valid_invoice_number("INV-26-0001"));
        assert!(!is_valid_invoice_number("INV-2026-001"));
        assert!(!is_valid_invoice_number("INV-2026-00a1"));
        assert!(!is_valid_invoice_number("-2026-0001"));
        assert!(!is_valid_invoice_number("INV-2026-0001-extra"));
    }

    #[test]
    fn extract_rejects_invalid() {
        assert_eq!(extract_counter("INV-2026-0042"), Some(42));
        assert_eq!(extract_counter("garbage"), None);
        assert_eq!(extract_counter("INV-2026-"), None);
    }
}

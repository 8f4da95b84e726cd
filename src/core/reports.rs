use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calc::round_to_two;
use super::types::{Invoice, InvoiceStatus};

/// Aggregate revenue figures over a set of invoices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueStats {
    pub total_revenue: Decimal,
    pub paid_revenue: Decimal,
    pub unpaid_revenue: Decimal,
    pub paid_count: usize,
    pub unpaid_count: usize,
}

/// Revenue from paid invoices issued in the given calendar month.
/// Invoices with no cached totals count as zero.
pub fn monthly_revenue(invoices: &[Invoice], year: i32, month: u32) -> Decimal {
    let sum: Decimal = invoices
        .iter()
        .filter(|inv| {
            inv.status == InvoiceStatus::Paid
                && inv.issue_date.year() == year
                && inv.issue_date.month() == month
        })
        .filter_map(|inv| inv.totals.as_ref().map(|t| t.total))
        .sum();
    round_to_two(sum)
}

/// Paid/unpaid revenue split with counts.
pub fn revenue_stats(invoices: &[Invoice]) -> RevenueStats {
    let mut stats = RevenueStats::default();
    for invoice in invoices {
        let amount = invoice
            .totals
            .as_ref()
            .map(|t| t.total)
            .unwrap_or(Decimal::ZERO);
        match invoice.status {
            InvoiceStatus::Paid => {
                stats.paid_revenue += amount;
                stats.paid_count += 1;
            }
            InvoiceStatus::Unpaid => {
                stats.unpaid_revenue += amount;
                stats.unpaid_count += 1;
            }
        }
    }
    stats.total_revenue = round_to_two(stats.paid_revenue + stats.unpaid_revenue);
    stats.paid_revenue = round_to_two(stats.paid_revenue);
    stats.unpaid_revenue = round_to_two(stats.unpaid_revenue);
    stats
}

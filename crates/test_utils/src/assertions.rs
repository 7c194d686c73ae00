//! Custom Test Assertions
//!
//! Invariant checks over invoices and consumption that give more meaningful
//! failure messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::round_display;
use domain_billing::Invoice;
use domain_catalog::Client;

/// Asserts that an invoice total equals the rounded sum of its line totals
///
/// # Panics
///
/// Panics if the totals disagree or any line total differs from its breakdown.
pub fn assert_invoice_consistent(invoice: &Invoice) {
    let lines: Decimal = invoice.lines().iter().map(|line| line.line_total()).sum();
    assert_eq!(
        round_display(invoice.total_amount()),
        round_display(lines),
        "Invoice {} total {} does not match line sum {}",
        invoice.number,
        invoice.total_amount(),
        lines
    );

    for line in invoice.lines() {
        let breakdown: Decimal = line.breakdown().iter().map(|charge| charge.cost).sum();
        assert_eq!(
            line.line_total(),
            breakdown,
            "Invoice {} line for {} does not match its breakdown",
            invoice.number,
            line.instance_id
        );
    }
}

/// Asserts that invoice numbers strictly increase in the given order
pub fn assert_strictly_increasing(invoices: &[Invoice]) {
    for pair in invoices.windows(2) {
        assert!(
            pair[0].number < pair[1].number,
            "Invoice numbers not strictly increasing: {} then {}",
            pair[0].number,
            pair[1].number
        );
    }
}

/// Counts a client's consumption events that are still unbilled
pub fn unbilled_count(client: &Client) -> usize {
    client
        .instances()
        .iter()
        .map(|instance| instance.unbilled().count())
        .sum()
}

/// Asserts that every consumption event of the client is billed
pub fn assert_fully_billed(client: &Client) {
    let pending = unbilled_count(client);
    assert_eq!(pending, 0, "Client {} still has {} unbilled events", client.nit, pending);
}

/// Asserts that two decimals are equal within a tolerance
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Decimals differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

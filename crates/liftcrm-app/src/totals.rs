// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::{Decimal, RoundingStrategy};

pub const REFERENCE_PREFIX: &str = "INV";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Discount is a percentage of the subtotal. Each figure is rounded to
    /// cents before it feeds the next one, mirroring the stored invoice.
    pub fn compute(row_totals: impl IntoIterator<Item = Decimal>, discount_percent: Decimal) -> Self {
        let subtotal = cents(
            row_totals
                .into_iter()
                .fold(Decimal::ZERO, |sum, total| sum.saturating_add(total)),
        );
        let discount_amount = cents(
            subtotal
                .checked_mul(discount_percent)
                .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO),
        );
        Self {
            subtotal,
            discount_amount,
            total: cents(subtotal.saturating_sub(discount_amount)),
        }
    }
}

fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Reference that follows `last` (`INV041` -> `INV042`). A missing or
/// foreign-format reference starts the sequence at `INV001`.
pub fn next_reference(last: Option<&str>) -> String {
    let last_number = last
        .and_then(|reference| reference.strip_prefix(REFERENCE_PREFIX))
        .and_then(|digits| digits.parse::<u64>().ok())
        .unwrap_or(0);
    format!("{REFERENCE_PREFIX}{:03}", last_number.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::{InvoiceTotals, next_reference};
    use rust_decimal::Decimal;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("valid decimal literal")
    }

    #[test]
    fn totals_apply_percentage_discount() {
        let totals = InvoiceTotals::compute([dec("236.00"), dec("590.00")], dec("10"));
        assert_eq!(totals.subtotal, dec("826.00"));
        assert_eq!(totals.discount_amount, dec("82.60"));
        assert_eq!(totals.total, dec("743.40"));
    }

    #[test]
    fn empty_invoice_totals_are_zero() {
        let totals = InvoiceTotals::compute(Vec::new(), dec("5"));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn discount_amount_rounds_to_cents() {
        let totals = InvoiceTotals::compute([dec("99.99")], dec("12.5"));
        assert_eq!(totals.discount_amount, dec("12.50"));
        assert_eq!(totals.total, dec("87.49"));
    }

    #[test]
    fn reference_sequence_is_zero_padded() {
        assert_eq!(next_reference(None), "INV001");
        assert_eq!(next_reference(Some("INV041")), "INV042");
        assert_eq!(next_reference(Some("INV999")), "INV1000");
        assert_eq!(next_reference(Some("QT-7")), "INV001");
    }
}

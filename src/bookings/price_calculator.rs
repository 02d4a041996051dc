use rust_decimal::Decimal;

/// Service for calculating booking prices
pub struct PriceCalculator;

impl PriceCalculator {
    /// Line total for one allocation: quantity × unit price at allocation time
    pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_price
    }

    /// Subtotal for a booking: sum of all allocation line totals
    pub fn subtotal(line_totals: &[Decimal]) -> Decimal {
        line_totals.iter().sum()
    }

    /// Final total net of the coupon discount, floored at zero
    pub fn apply_discount(subtotal: Decimal, discount: Decimal) -> Decimal {
        (subtotal - discount).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total_basic() {
        assert_eq!(PriceCalculator::line_total(2, dec!(1000)), dec!(2000));
    }

    #[test]
    fn test_line_total_single_unit() {
        assert_eq!(PriceCalculator::line_total(1, dec!(1350.50)), dec!(1350.50));
    }

    #[test]
    fn test_subtotal_multiple_lines() {
        let lines = vec![dec!(1000), dec!(1000), dec!(1500)];
        assert_eq!(PriceCalculator::subtotal(&lines), dec!(3500));
    }

    #[test]
    fn test_subtotal_empty() {
        let lines: Vec<Decimal> = vec![];
        assert_eq!(PriceCalculator::subtotal(&lines), dec!(0));
    }

    #[test]
    fn test_discount_applied() {
        assert_eq!(PriceCalculator::apply_discount(dec!(2000), dec!(100)), dec!(1900));
    }

    #[test]
    fn test_discount_floored_at_zero() {
        assert_eq!(PriceCalculator::apply_discount(dec!(50), dec!(100)), dec!(0));
    }

    #[test]
    fn test_zero_discount_is_identity() {
        assert_eq!(PriceCalculator::apply_discount(dec!(2000), dec!(0)), dec!(2000));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Totals net of any discount are never negative
    #[test]
    fn prop_total_never_negative() {
        proptest!(|(
            subtotal_cents in 0u32..=10_000_000u32,
            discount_cents in 0u32..=10_000_000u32
        )| {
            let subtotal = Decimal::from(subtotal_cents) / Decimal::from(100);
            let discount = Decimal::from(discount_cents) / Decimal::from(100);
            let total = PriceCalculator::apply_discount(subtotal, discount);
            prop_assert!(total >= Decimal::ZERO, "Total must be non-negative, got {}", total);
        });
    }

    /// Subtotal equals the sum of its line totals for any line set
    #[test]
    fn prop_subtotal_matches_lines() {
        proptest!(|(
            lines in prop::collection::vec((1i32..=10, 1u32..=100_000u32), 1..=30)
        )| {
            let line_totals: Vec<Decimal> = lines
                .iter()
                .map(|&(qty, price_cents)| {
                    let price = Decimal::from(price_cents) / Decimal::from(100);
                    PriceCalculator::line_total(qty, price)
                })
                .collect();

            let subtotal = PriceCalculator::subtotal(&line_totals);
            let expected: Decimal = line_totals.iter().sum();
            prop_assert_eq!(subtotal, expected);
        });
    }

    /// When the discount does not exceed the subtotal, the exact difference
    /// is preserved
    #[test]
    fn prop_discount_exact_when_not_floored() {
        proptest!(|(
            subtotal_cents in 0u32..=10_000_000u32,
            discount_cents in 0u32..=10_000_000u32
        )| {
            prop_assume!(discount_cents <= subtotal_cents);
            let subtotal = Decimal::from(subtotal_cents) / Decimal::from(100);
            let discount = Decimal::from(discount_cents) / Decimal::from(100);
            prop_assert_eq!(
                PriceCalculator::apply_discount(subtotal, discount),
                subtotal - discount
            );
        });
    }
}

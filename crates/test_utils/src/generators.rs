//! Property-Based Test Data Generators
//!
//! Proptest strategies for domain values.

use core_kernel::{BillingPeriod, Currency, Money};
use domain_dues::PaymentMethod;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// A positive peso amount within realistic club fee bounds
pub fn money_amount() -> impl Strategy<Value = Money> {
    (1u32..10_000_000).prop_map(|amount| Money::new(Decimal::from(amount), Currency::COP))
}

/// Any valid billing period in a recent year range
pub fn billing_period() -> impl Strategy<Value = BillingPeriod> {
    (1u32..=12, 2020i32..2030)
        .prop_map(|(month, year)| BillingPeriod::new(month, year).expect("month in range"))
}

/// Any payment method
pub fn payment_method() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::MobileTransfer),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::Other),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_amounts_are_positive(amount in money_amount()) {
            prop_assert!(amount.is_positive());
        }

        #[test]
        fn generated_periods_are_valid(period in billing_period()) {
            prop_assert!((1..=12).contains(&period.month()));
        }
    }
}

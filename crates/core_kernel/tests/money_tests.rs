//! Money behavior tests

use core_kernel::{Currency, Money, MoneyError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn balance_conservation_over_payment_sequence() {
    // amount_paid + balance must equal the principal after every step
    let principal = Money::new(dec!(100000), Currency::COP);
    let payments = [dec!(15000), dec!(25000), dec!(60000)];

    let mut paid = Money::zero(Currency::COP);
    let mut balance = principal;

    for p in payments {
        let amount = Money::new(p, Currency::COP);
        paid = paid + amount;
        balance = (principal - paid).floor_zero();
        assert_eq!(paid + balance, principal);
    }

    assert!(balance.is_zero());
}

#[test]
fn overshoot_clamps_to_zero_not_negative() {
    let principal = Money::new(dec!(50000), Currency::COP);
    let paid = Money::new(dec!(50001), Currency::COP);

    let balance = (principal - paid).floor_zero();
    assert!(balance.is_zero());
    assert!(!balance.is_negative());
}

#[test]
fn percentage_handles_zero_expected() {
    let collected = Money::zero(Currency::COP);
    let expected = Money::zero(Currency::COP);
    assert_eq!(collected.percentage_of(&expected), Decimal::ZERO);
}

#[test]
fn mixed_currency_arithmetic_is_rejected() {
    let cop = Money::new(dec!(100), Currency::COP);
    let eur = Money::new(dec!(100), Currency::EUR);

    assert!(matches!(
        cop.checked_sub(&eur),
        Err(MoneyError::CurrencyMismatch(_, _))
    ));
}

#[test]
fn display_uses_currency_symbol() {
    let m = Money::new(dec!(35000), Currency::COP);
    assert_eq!(m.to_string(), "$ 35000");
}

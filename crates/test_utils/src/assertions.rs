//! Custom Assertion Helpers
//!
//! Domain-aware assertions with failure messages that name the violated
//! rule rather than just the differing values.

use domain_dues::Due;
use rust_decimal::Decimal;

/// Asserts the accounting identity `amount_paid + balance == amount`
pub fn assert_due_balanced(due: &Due) {
    let recomposed = due
        .amount_paid
        .checked_add(&due.balance)
        .expect("due fields share one currency");
    assert_eq!(
        recomposed, due.amount,
        "due {} violates paid + balance == amount: {} + {} != {}",
        due.id, due.amount_paid, due.balance, due.amount
    );
    assert!(
        !due.balance.is_negative(),
        "due {} has a negative balance: {}",
        due.id,
        due.balance
    );
}

/// Asserts a Money value carries exactly the given decimal amount
pub fn assert_amount(money: core_kernel::Money, expected: Decimal) {
    assert_eq!(
        money.amount(),
        expected,
        "expected amount {expected}, got {money}"
    );
}

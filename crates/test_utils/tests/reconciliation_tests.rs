//! End-to-end reconciliation scenarios
//!
//! Drives the real generation, ledger, recorder, and reporting services
//! over the in-memory adapters and checks the accounting rules hold across
//! whole workflows.

use chrono::{Duration, NaiveDate};
use core_kernel::{today, BillingPeriod, Currency, Money};
use domain_dues::{
    CashGrouping, CashQuery, ConfigStore, DueStatus, DueStore, DuesError, GenerateRequest,
    NewPayment, PaymentFilter, PaymentMethod, RECEIPT_COUNTER_KEY,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::{assert_due_balanced, DueBuilder, DuesWorld, MoneyFixtures, PlayerBuilder};

fn cop(amount: Decimal) -> Money {
    Money::new(amount, Currency::COP)
}

fn pay(due_id: core_kernel::DueId, amount: Decimal) -> NewPayment {
    NewPayment {
        due_id,
        amount: cop(amount),
        method: PaymentMethod::Cash,
        notes: None,
    }
}

mod generation_tests {
    use super::*;

    #[tokio::test]
    async fn test_generates_one_due_per_active_player() {
        let world = DuesWorld::with_players(3);
        world
            .directory
            .add(PlayerBuilder::new().with_first_name("Benched").inactive().build());

        let outcome = world
            .generator
            .generate(GenerateRequest::default())
            .await
            .unwrap();

        assert_eq!(outcome.generated, 3);
        assert_eq!(outcome.existing, 0);

        let dues = world.dues.for_period(outcome.period).await.unwrap();
        assert_eq!(dues.len(), 3);
        for due in &dues {
            assert_eq!(due.status, DueStatus::Pending);
            assert_eq!(due.amount, MoneyFixtures::standard_fee());
            assert_due_balanced(due);
        }
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let world = DuesWorld::with_players(4);
        let period = BillingPeriod::new(3, 2026).unwrap();
        let request = GenerateRequest {
            period: Some(period),
            due_date: None,
        };

        let first = world.generator.generate(request.clone()).await.unwrap();
        assert_eq!(first.generated, 4);

        let second = world.generator.generate(request).await.unwrap();
        assert_eq!(second.generated, 0);
        assert_eq!(second.existing, 4);
        assert_eq!(world.dues.for_period(period).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_skips_players_already_billed() {
        let world = DuesWorld::with_players(1);
        let early_bird = world.add_player(PlayerBuilder::new().with_first_name("Eager").build());
        let period = BillingPeriod::new(3, 2026).unwrap();

        // one player billed by hand before the monthly run
        world
            .dues
            .insert(
                &DueBuilder::new()
                    .for_player(early_bird.id)
                    .in_period(period)
                    .build(),
            )
            .await
            .unwrap();

        let outcome = world
            .generator
            .generate(GenerateRequest {
                period: Some(period),
                due_date: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome.generated, 1);
        assert_eq!(outcome.existing, 1);
    }

    #[tokio::test]
    async fn test_empty_roster_is_rejected() {
        let world = DuesWorld::new();
        let error = world
            .generator
            .generate(GenerateRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(error, DuesError::NoActivePlayers));
    }

    #[tokio::test]
    async fn test_fee_comes_from_the_player_category() {
        let world = DuesWorld::new();
        let senior = world.add_player(
            PlayerBuilder::new()
                .in_category("Mayores", MoneyFixtures::senior_fee())
                .build(),
        );

        let outcome = world
            .generator
            .generate(GenerateRequest::default())
            .await
            .unwrap();
        assert_eq!(outcome.generated, 1);

        let dues = world.dues.for_player(senior.id).await.unwrap();
        assert_eq!(dues[0].amount, MoneyFixtures::senior_fee());
    }
}

mod payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_partial_then_full_settlement() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        let (_, due) = world
            .recorder
            .record(pay(due_id, dec!(20000)), world.treasurer)
            .await
            .unwrap();
        assert_eq!(due.status, DueStatus::Partial);
        assert_eq!(due.balance, cop(dec!(30000)));
        assert_due_balanced(&due);

        let (_, due) = world
            .recorder
            .record(pay(due_id, dec!(30000)), world.treasurer)
            .await
            .unwrap();
        assert_eq!(due.status, DueStatus::Paid);
        assert!(due.balance.is_zero());
        assert_due_balanced(&due);

        // settled dues accept no more money
        let error = world
            .recorder
            .record(pay(due_id, dec!(1000)), world.treasurer)
            .await
            .unwrap_err();
        assert!(matches!(error, DuesError::ExceedsBalance { .. }));
    }

    #[tokio::test]
    async fn test_overshoot_is_rejected_and_state_untouched() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        world
            .recorder
            .record(pay(due_id, dec!(40000)), world.treasurer)
            .await
            .unwrap();

        let error = world
            .recorder
            .record(pay(due_id, dec!(20000)), world.treasurer)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            DuesError::ExceedsBalance { available, .. } if available == cop(dec!(10000))
        ));

        let due = world.ledger.due(due_id).await.unwrap();
        assert_eq!(due.status, DueStatus::Partial);
        assert_eq!(due.balance, cop(dec!(10000)));
        assert_due_balanced(&due);
    }

    #[tokio::test]
    async fn test_non_positive_amounts_are_rejected() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        let error = world
            .recorder
            .record(pay(due_id, dec!(0)), world.treasurer)
            .await
            .unwrap_err();
        assert!(matches!(error, DuesError::InvalidOperation(_)));

        let error = world
            .recorder
            .record(pay(due_id, dec!(-5000)), world.treasurer)
            .await
            .unwrap_err();
        assert!(matches!(error, DuesError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn test_balance_conserved_across_many_payments() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        for amount in [dec!(5000), dec!(12500), dec!(7500), dec!(25000)] {
            let (_, due) = world
                .recorder
                .record(pay(due_id, amount), world.treasurer)
                .await
                .unwrap();
            assert_due_balanced(&due);
        }

        let due = world.ledger.due(due_id).await.unwrap();
        assert_eq!(due.status, DueStatus::Paid);
        assert_eq!(due.amount_paid, cop(dec!(50000)));
    }

    #[tokio::test]
    async fn test_receipt_numbers_are_sequential_from_one() {
        let world = DuesWorld::with_players(3);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let dues = world.dues.list(&Default::default()).await.unwrap();

        // counter key absent: the first draw initializes it at 1
        let mut receipts = Vec::new();
        for due in &dues {
            let (payment, _) = world
                .recorder
                .record(pay(due.id, dec!(10000)), world.treasurer)
                .await
                .unwrap();
            receipts.push(payment.receipt_number.as_str().to_string());
        }
        receipts.sort();
        assert_eq!(receipts, vec!["REC-000001", "REC-000002", "REC-000003"]);

        let counter = world.config.get(RECEIPT_COUNTER_KEY).await.unwrap().unwrap();
        assert_eq!(counter.value, "3");
    }

    #[tokio::test]
    async fn test_payment_listing_excludes_voided_by_default() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        let (keep, _) = world
            .recorder
            .record(pay(due_id, dec!(10000)), world.treasurer)
            .await
            .unwrap();
        let (voided, _) = world
            .recorder
            .record(pay(due_id, dec!(10000)), world.treasurer)
            .await
            .unwrap();
        world
            .recorder
            .void(voided.id, "wrong due", world.treasurer)
            .await
            .unwrap();

        let visible = world.recorder.list(&PaymentFilter::default()).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, keep.id);

        let all = world
            .recorder
            .list(&PaymentFilter {
                include_voided: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_day_and_method_shortcuts() {
        let world = DuesWorld::with_players(2);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let dues = world.dues.list(&Default::default()).await.unwrap();

        world
            .recorder
            .record(pay(dues[0].id, dec!(10000)), world.treasurer)
            .await
            .unwrap();
        world
            .recorder
            .record(
                NewPayment {
                    due_id: dues[1].id,
                    amount: cop(dec!(20000)),
                    method: PaymentMethod::BankTransfer,
                    notes: None,
                },
                world.treasurer,
            )
            .await
            .unwrap();

        let today_payments = world.recorder.payments_on(today()).await.unwrap();
        assert_eq!(today_payments.len(), 2);
        assert!(world
            .recorder
            .payments_on(today() - Duration::days(1))
            .await
            .unwrap()
            .is_empty());

        let transfers = world
            .recorder
            .payments_by_method(PaymentMethod::BankTransfer)
            .await
            .unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].amount, cop(dec!(20000)));
    }
}

mod void_tests {
    use super::*;

    #[tokio::test]
    async fn test_void_restores_the_due_exactly() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        let (payment, after_payment) = world
            .recorder
            .record(pay(due_id, dec!(40000)), world.treasurer)
            .await
            .unwrap();
        assert_eq!(after_payment.status, DueStatus::Partial);

        let (voided, after_void) = world
            .recorder
            .void(payment.id, "typo in amount", world.treasurer)
            .await
            .unwrap();
        assert!(voided.voided);
        assert_eq!(voided.void_reason.as_deref(), Some("typo in amount"));
        assert_eq!(after_void.status, DueStatus::Pending);
        assert!(after_void.amount_paid.is_zero());
        assert_eq!(after_void.balance, cop(dec!(50000)));
        assert_due_balanced(&after_void);
    }

    #[tokio::test]
    async fn test_voiding_one_of_two_payments_leaves_partial() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        world
            .recorder
            .record(pay(due_id, dec!(20000)), world.treasurer)
            .await
            .unwrap();
        let (second, _) = world
            .recorder
            .record(pay(due_id, dec!(15000)), world.treasurer)
            .await
            .unwrap();

        let (_, due) = world
            .recorder
            .void(second.id, "duplicate entry", world.treasurer)
            .await
            .unwrap();
        assert_eq!(due.status, DueStatus::Partial);
        assert_eq!(due.amount_paid, cop(dec!(20000)));
        assert_eq!(due.balance, cop(dec!(30000)));
    }

    #[tokio::test]
    async fn test_void_is_not_repeatable() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        let (payment, _) = world
            .recorder
            .record(pay(due_id, dec!(10000)), world.treasurer)
            .await
            .unwrap();
        world
            .recorder
            .void(payment.id, "first", world.treasurer)
            .await
            .unwrap();

        let error = world
            .recorder
            .void(payment.id, "second", world.treasurer)
            .await
            .unwrap_err();
        assert!(matches!(error, DuesError::AlreadyVoided(_)));

        // the due was not reversed twice
        let due = world.ledger.due(due_id).await.unwrap();
        assert!(due.amount_paid.is_zero());
        assert_due_balanced(&due);
    }

    #[tokio::test]
    async fn test_voided_payment_keeps_its_receipt_number() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        let (payment, _) = world
            .recorder
            .record(pay(due_id, dec!(10000)), world.treasurer)
            .await
            .unwrap();
        let receipt = payment.receipt_number.clone();
        let (voided, _) = world
            .recorder
            .void(payment.id, "test", world.treasurer)
            .await
            .unwrap();
        assert_eq!(voided.receipt_number, receipt);

        // and the next payment draws a fresh number, never reusing it
        let (next, _) = world
            .recorder
            .record(pay(due_id, dec!(10000)), world.treasurer)
            .await
            .unwrap();
        assert_ne!(next.receipt_number, receipt);
    }
}

mod overdue_tests {
    use super::*;

    async fn world_with_stale_due(days_late: i64) -> (DuesWorld, core_kernel::DueId) {
        let world = DuesWorld::with_players(1);
        world
            .generator
            .generate(GenerateRequest {
                period: None,
                due_date: Some(today() - Duration::days(days_late)),
            })
            .await
            .unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;
        (world, due_id)
    }

    #[tokio::test]
    async fn test_sweep_marks_dues_past_tolerance() {
        let (world, due_id) = world_with_stale_due(10).await;

        let updated = world.ledger.sweep_overdue().await.unwrap();
        assert_eq!(updated, 1);
        assert_eq!(
            world.ledger.due(due_id).await.unwrap().status,
            DueStatus::Overdue
        );
    }

    #[tokio::test]
    async fn test_sweep_respects_the_tolerance_window() {
        // three days late with the default five-day tolerance: still pending
        let (world, due_id) = world_with_stale_due(3).await;

        let updated = world.ledger.sweep_overdue().await.unwrap();
        assert_eq!(updated, 0);
        assert_eq!(
            world.ledger.due(due_id).await.unwrap().status,
            DueStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_configured_tolerance_overrides_default() {
        let (world, _) = world_with_stale_due(3).await;
        world.set_tolerance_days(1).await;

        let updated = world.ledger.sweep_overdue().await.unwrap();
        assert_eq!(updated, 1);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let (world, _) = world_with_stale_due(10).await;

        assert_eq!(world.ledger.sweep_overdue().await.unwrap(), 1);
        assert_eq!(world.ledger.sweep_overdue().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overdue_listing_does_not_need_the_sweep() {
        let (world, due_id) = world_with_stale_due(10).await;

        // no sweep has run, the stored status is still pending
        let overdue = world.ledger.list_overdue().await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, due_id);
        assert_eq!(overdue[0].status, DueStatus::Pending);
    }

    #[tokio::test]
    async fn test_settled_dues_never_go_overdue() {
        let (world, due_id) = world_with_stale_due(10).await;
        world
            .recorder
            .record(pay(due_id, dec!(50000)), world.treasurer)
            .await
            .unwrap();

        assert_eq!(world.ledger.sweep_overdue().await.unwrap(), 0);
        assert!(world.ledger.list_overdue().await.unwrap().is_empty());
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_due_with_payments_cannot_be_deleted() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        let (payment, _) = world
            .recorder
            .record(pay(due_id, dec!(10000)), world.treasurer)
            .await
            .unwrap();
        let error = world.ledger.delete_due(due_id).await.unwrap_err();
        assert!(matches!(error, DuesError::InvalidOperation(_)));

        // voiding does not erase history, deletion stays blocked
        world
            .recorder
            .void(payment.id, "test", world.treasurer)
            .await
            .unwrap();
        assert!(world.ledger.delete_due(due_id).await.is_err());
    }

    #[tokio::test]
    async fn test_untouched_due_can_be_deleted() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        world.ledger.delete_due(due_id).await.unwrap();
        assert!(matches!(
            world.ledger.due(due_id).await.unwrap_err(),
            DuesError::DueNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_reschedule_moves_the_deadline() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;

        let new_date = NaiveDate::from_ymd_opt(2027, 1, 15).unwrap();
        let due = world.ledger.reschedule(due_id, new_date).await.unwrap();
        assert_eq!(due.due_date, new_date);
        assert!(due.version > 0);
    }

    #[tokio::test]
    async fn test_receipt_attachment_round_trip() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;
        let (payment, _) = world
            .recorder
            .record(pay(due_id, dec!(10000)), world.treasurer)
            .await
            .unwrap();

        let bytes = b"%PDF-1.4 receipt scan";
        let metadata = world
            .recorder
            .attach_receipt(payment.id, "receipt.pdf", "application/pdf", bytes)
            .await
            .unwrap();
        assert_eq!(metadata.size_bytes, bytes.len() as i64);

        let stored = world.recorder.attachment(metadata.id).await.unwrap();
        assert_eq!(stored.decode().unwrap(), bytes);
        assert_eq!(stored.payment_id, payment.id);

        let listed = world
            .recorder
            .attachments_for_payment(payment.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }
}

mod reporting_tests {
    use super::*;

    #[tokio::test]
    async fn test_arrears_groups_and_sorts_debtors() {
        let world = DuesWorld::new();
        let heavy = world.add_player(PlayerBuilder::new().with_first_name("Carlos").build());
        let light = world.add_player(PlayerBuilder::new().with_first_name("Luisa").build());
        let past = today() - Duration::days(20);

        // Carlos owes 20000 + 15000 across two months, Luisa owes 10000
        let march = BillingPeriod::new(3, 2026).unwrap();
        let april = BillingPeriod::new(4, 2026).unwrap();
        for (player, period, amount) in [
            (heavy.id, march, dec!(20000)),
            (heavy.id, april, dec!(15000)),
            (light.id, march, dec!(10000)),
        ] {
            world
                .dues
                .insert(
                    &DueBuilder::new()
                        .for_player(player)
                        .in_period(period)
                        .with_amount(cop(amount))
                        .due_on(past)
                        .build(),
                )
                .await
                .unwrap();
        }

        let report = world.reports.arrears_report().await.unwrap();
        assert_eq!(report.total_debtors, 2);
        assert_eq!(report.total_debt, cop(dec!(45000)));
        assert_eq!(report.debtors[0].player_id, heavy.id);
        assert_eq!(report.debtors[0].total_debt, cop(dec!(35000)));
        assert_eq!(report.debtors[0].dues.len(), 2);
        assert_eq!(report.debtors[0].player_name, "Carlos Reyes");
        assert_eq!(report.debtors[1].total_debt, cop(dec!(10000)));
    }

    #[tokio::test]
    async fn test_arrears_ignores_settled_and_on_time_dues() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;
        world
            .recorder
            .record(pay(due_id, dec!(50000)), world.treasurer)
            .await
            .unwrap();

        let report = world.reports.arrears_report().await.unwrap();
        assert_eq!(report.total_debtors, 0);
        assert!(report.total_debt.is_zero());
    }

    #[tokio::test]
    async fn test_period_summary_buckets() {
        let world = DuesWorld::with_players(3);
        let period = BillingPeriod::current();
        world
            .generator
            .generate(GenerateRequest {
                period: Some(period),
                due_date: Some(today() + Duration::days(10)),
            })
            .await
            .unwrap();
        let dues = world.dues.list(&Default::default()).await.unwrap();

        world
            .recorder
            .record(pay(dues[0].id, dec!(50000)), world.treasurer)
            .await
            .unwrap();
        world
            .recorder
            .record(pay(dues[1].id, dec!(20000)), world.treasurer)
            .await
            .unwrap();

        let summary = world.ledger.period_summary(period).await.unwrap();
        assert_eq!(summary.total_dues, 3);
        assert_eq!(summary.paid, 1);
        assert_eq!(summary.partial_on_time, 1);
        assert_eq!(summary.pending_on_time, 1);
        assert_eq!(summary.past_due, 0);
        assert_eq!(summary.expected, cop(dec!(150000)));
        assert_eq!(summary.collected, cop(dec!(70000)));
        // 70000/150000 rounds to 47%, 1/3 rounds to 33%
        assert_eq!(summary.percent_collected, dec!(47));
        assert_eq!(summary.percent_compliance, dec!(33));
    }

    #[tokio::test]
    async fn test_cash_report_groups_by_method() {
        let world = DuesWorld::with_players(2);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let dues = world.dues.list(&Default::default()).await.unwrap();

        world
            .recorder
            .record(pay(dues[0].id, dec!(30000)), world.treasurer)
            .await
            .unwrap();
        world
            .recorder
            .record(
                NewPayment {
                    due_id: dues[1].id,
                    amount: cop(dec!(20000)),
                    method: PaymentMethod::BankTransfer,
                    notes: None,
                },
                world.treasurer,
            )
            .await
            .unwrap();

        let report = world
            .reports
            .cash_report(CashQuery {
                from: None,
                to: None,
                period: None,
                group_by: CashGrouping::Method,
            })
            .await
            .unwrap();

        assert_eq!(report.total_payments, 2);
        assert_eq!(report.total_collected, cop(dec!(50000)));
        assert_eq!(report.groups.len(), 2);
        let cash = report.groups.iter().find(|g| g.key == "cash").unwrap();
        assert_eq!(cash.total, cop(dec!(30000)));
        assert_eq!(cash.count, 1);
    }

    #[tokio::test]
    async fn test_cash_report_period_wins_over_date_range() {
        let world = DuesWorld::with_players(1);
        let last_month = BillingPeriod::current().previous();
        world
            .generator
            .generate(GenerateRequest {
                period: Some(last_month),
                due_date: None,
            })
            .await
            .unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;
        world
            .recorder
            .record(pay(due_id, dec!(10000)), world.treasurer)
            .await
            .unwrap();

        // the date range alone would exclude today's payment
        let report = world
            .reports
            .cash_report(CashQuery {
                from: Some(today() - Duration::days(90)),
                to: Some(today() - Duration::days(60)),
                period: Some(last_month),
                group_by: CashGrouping::Day,
            })
            .await
            .unwrap();
        assert_eq!(report.total_payments, 1);
    }

    #[tokio::test]
    async fn test_income_projection_counts_by_status() {
        let world = DuesWorld::with_players(2);
        let period = BillingPeriod::current();
        world
            .generator
            .generate(GenerateRequest {
                period: Some(period),
                due_date: None,
            })
            .await
            .unwrap();
        let dues = world.dues.list(&Default::default()).await.unwrap();
        world
            .recorder
            .record(pay(dues[0].id, dec!(50000)), world.treasurer)
            .await
            .unwrap();

        let projection = world.reports.income_projection(period).await.unwrap();
        assert_eq!(projection.total_dues, 2);
        assert_eq!(projection.paid, 1);
        assert_eq!(projection.pending, 1);
        assert_eq!(projection.expected, cop(dec!(100000)));
        assert_eq!(projection.collected, cop(dec!(50000)));
        assert_eq!(projection.percent_collection, dec!(50));
        assert_eq!(projection.percent_compliance, dec!(50));
    }

    #[tokio::test]
    async fn test_compliance_by_category_splits_fees() {
        let world = DuesWorld::new();
        world.add_player(PlayerBuilder::new().build());
        world.add_player(
            PlayerBuilder::new()
                .in_category("Mayores", MoneyFixtures::senior_fee())
                .build(),
        );
        let period = BillingPeriod::current();
        world
            .generator
            .generate(GenerateRequest {
                period: Some(period),
                due_date: None,
            })
            .await
            .unwrap();

        let report = world.reports.compliance_by_category(period).await.unwrap();
        assert_eq!(report.categories.len(), 2);
        let seniors = report
            .categories
            .iter()
            .find(|c| c.category_name == "Mayores")
            .unwrap();
        assert_eq!(seniors.total_dues, 1);
        assert_eq!(seniors.expected, MoneyFixtures::senior_fee());
        assert_eq!(seniors.percent_collection, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_general_statistics_counts_roster_and_month() {
        let world = DuesWorld::with_players(2);
        world
            .directory
            .add(PlayerBuilder::new().with_first_name("Retired").inactive().build());
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let due_id = world.dues.list(&Default::default()).await.unwrap()[0].id;
        world
            .recorder
            .record(pay(due_id, dec!(50000)), world.treasurer)
            .await
            .unwrap();

        let stats = world.reports.general_statistics().await.unwrap();
        assert_eq!(stats.players_total, 3);
        assert_eq!(stats.players_active, 2);
        assert_eq!(stats.players_inactive, 1);
        assert_eq!(stats.dues_total, 2);
        assert_eq!(stats.paid, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.collected, cop(dec!(50000)));
    }
}

mod config_tests {
    use super::*;
    use domain_dues::{ConfigEntry, ConfigValueType};

    #[tokio::test]
    async fn test_counter_initializes_at_one_and_increments() {
        let world = DuesWorld::new();
        assert_eq!(world.config.increment_counter("seq").await.unwrap(), 1);
        assert_eq!(world.config.increment_counter("seq").await.unwrap(), 2);
        assert_eq!(world.config.increment_counter("seq").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_key_is_rejected() {
        let world = DuesWorld::new();
        let entry = ConfigEntry::new("club_name", "Atlético", ConfigValueType::Text);
        world.config.insert(&entry).await.unwrap();
        assert!(world.config.insert(&entry).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_set_value_requires_existing_key() {
        let world = DuesWorld::new();
        let error = world.config.set_value("missing", "1").await.unwrap_err();
        assert!(error.is_not_found());

        let entry = ConfigEntry::new("club_name", "Atlético", ConfigValueType::Text);
        world.config.insert(&entry).await.unwrap();
        let updated = world.config.set_value("club_name", "Deportivo").await.unwrap();
        assert_eq!(updated.value, "Deportivo");
    }
}

mod concurrency_tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use core_kernel::{PortError, UserId};
    use domain_dues::{
        Due, DueLedger, DueStore, Payment, PaymentStore, ReceiptNumber,
    };
    use test_utils::{MemoryConfigStore, MemoryDueStore, MemoryPaymentStore};

    /// Payment store where another writer lands a competing payment on the
    /// due between the ledger's read and its first write, so the first
    /// insert always hits a version conflict.
    struct ContendedPaymentStore {
        inner: MemoryPaymentStore,
        dues: Arc<MemoryDueStore>,
        competing: Money,
        fired: AtomicBool,
    }

    impl ContendedPaymentStore {
        fn new(dues: Arc<MemoryDueStore>, competing: Money) -> Self {
            Self {
                inner: MemoryPaymentStore::new(dues.clone()),
                dues,
                competing,
                fired: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl PaymentStore for ContendedPaymentStore {
        async fn insert_with_due(&self, payment: &Payment, due: &Due) -> Result<Due, PortError> {
            if !self.fired.swap(true, Ordering::SeqCst) {
                let mut current = self.dues.find(due.id).await?.expect("due exists");
                current
                    .apply_payment(self.competing)
                    .expect("competing payment fits the balance");
                self.dues.update(&current).await?;
            }
            self.inner.insert_with_due(payment, due).await
        }

        async fn update_with_due(&self, payment: &Payment, due: &Due) -> Result<Due, PortError> {
            self.inner.update_with_due(payment, due).await
        }

        async fn find(&self, id: core_kernel::PaymentId) -> Result<Option<Payment>, PortError> {
            self.inner.find(id).await
        }

        async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, PortError> {
            self.inner.list(filter).await
        }

        async fn for_due(&self, due_id: core_kernel::DueId) -> Result<Vec<Payment>, PortError> {
            self.inner.for_due(due_id).await
        }

        async fn count_for_due(&self, due_id: core_kernel::DueId) -> Result<u64, PortError> {
            self.inner.count_for_due(due_id).await
        }
    }

    async fn contended_ledger(
        principal: Decimal,
        competing: Decimal,
    ) -> (DueLedger, Arc<ContendedPaymentStore>, Due) {
        let dues = Arc::new(MemoryDueStore::new());
        let store = Arc::new(ContendedPaymentStore::new(dues.clone(), cop(competing)));
        let due = DueBuilder::new().with_amount(cop(principal)).build();
        dues.insert(&due).await.unwrap();
        let ledger = DueLedger::new(
            dues,
            store.clone(),
            Arc::new(MemoryConfigStore::new()),
        );
        (ledger, store, due)
    }

    fn posted(due: &Due, amount: Decimal) -> Payment {
        Payment::new(
            due.id,
            due.player_id,
            cop(amount),
            PaymentMethod::Cash,
            ReceiptNumber::from_sequence(1),
            UserId::new(),
        )
    }

    #[tokio::test]
    async fn test_stale_update_is_rejected() {
        let world = DuesWorld::with_players(1);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let stale = world.dues.list(&Default::default()).await.unwrap()[0].clone();

        // another writer bumps the version first
        let mut winner = stale.clone();
        winner.reschedule(today() + Duration::days(60));
        world.dues.update(&winner).await.unwrap();

        let mut loser = stale;
        loser.reschedule(today() + Duration::days(90));
        let error = world.dues.update(&loser).await.unwrap_err();
        assert!(error.is_concurrency_conflict());
    }

    #[tokio::test]
    async fn test_ledger_retries_once_after_a_conflict() {
        // a 10000 competitor moves the version after the ledger's read; the
        // first write conflicts and the retry re-reads and lands
        let (ledger, store, due) = contended_ledger(dec!(50000), dec!(10000)).await;

        let payment = posted(&due, dec!(20000));
        let after = ledger.post_payment(&payment).await.unwrap();

        assert!(store.fired.load(Ordering::SeqCst));
        assert_eq!(after.status, DueStatus::Partial);
        assert_eq!(after.amount_paid, cop(dec!(30000)));
        assert_eq!(after.balance, cop(dec!(20000)));
        assert_due_balanced(&after);
        assert!(store.find(payment.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_retry_rejects_overshoot_against_the_fresh_balance() {
        // both writers validated against the full 50000; the competitor's
        // 30000 lands first, so the retry sees 20000 left and must refuse
        // instead of overdrawing the due
        let (ledger, store, due) = contended_ledger(dec!(50000), dec!(30000)).await;

        let payment = posted(&due, dec!(30000));
        let error = ledger.post_payment(&payment).await.unwrap_err();
        assert!(matches!(
            error,
            DuesError::ExceedsBalance { available, .. } if available == cop(dec!(20000))
        ));

        // only the competitor's money is on the books
        let stored = ledger.due(due.id).await.unwrap();
        assert_eq!(stored.amount_paid, cop(dec!(30000)));
        assert_eq!(stored.balance, cop(dec!(20000)));
        assert_due_balanced(&stored);
        assert!(store.find(payment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_recordings_draw_distinct_receipts() {
        let world = DuesWorld::with_players(5);
        world.generator.generate(GenerateRequest::default()).await.unwrap();
        let dues = world.dues.list(&Default::default()).await.unwrap();

        let mut handles = Vec::new();
        for due in dues {
            let recorder = world.recorder.clone();
            let treasurer = world.treasurer;
            handles.push(tokio::spawn(async move {
                let (payment, _) = recorder
                    .record(pay(due.id, dec!(10000)), treasurer)
                    .await
                    .unwrap();
                payment.receipt_number.as_str().to_string()
            }));
        }

        let mut receipts = BTreeSet::new();
        for handle in handles {
            receipts.insert(handle.await.unwrap());
        }
        assert_eq!(receipts.len(), 5);
        let counter = world.config.get(RECEIPT_COUNTER_KEY).await.unwrap().unwrap();
        assert_eq!(counter.value, "5");
    }
}

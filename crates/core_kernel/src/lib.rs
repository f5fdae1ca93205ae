//! Core Kernel - Foundational types and utilities for the club dues system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Billing periods and calendar-date helpers
//! - Common identifiers and value objects
//! - The shared port error type for storage adapters

pub mod money;
pub mod period;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use period::{BillingPeriod, PeriodError, today};
pub use identifiers::{
    PlayerId, CategoryId, DueId, PaymentId, AttachmentId, UserId,
};
pub use ports::PortError;

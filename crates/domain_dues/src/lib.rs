//! Dues Domain - monthly dues, payments, and financial reporting
//!
//! The reconciliation core of the club backend. Dues are generated monthly
//! per active player, payments settle them under an optimistic concurrency
//! protocol, mistakes are voided rather than edited, and reports aggregate
//! the result for the treasurer.
//!
//! Services:
//! - [`DueGenerator`]: idempotent monthly due generation from the roster
//! - [`DueLedger`]: payment application/reversal, overdue sweep, summaries
//! - [`PaymentRecorder`]: payment validation, receipt numbers, voiding,
//!   receipt attachments
//! - [`ReportingEngine`]: cash, arrears, projection, compliance, dashboard

pub mod attachment;
pub mod due;
pub mod error;
pub mod generator;
pub mod ledger;
pub mod payment;
pub mod ports;
pub mod recorder;
pub mod reports;
pub mod settings;

pub use attachment::{
    mime_type_allowed, AttachmentMetadata, ReceiptAttachment, ALLOWED_MIME_TYPES,
    MAX_ATTACHMENT_BYTES,
};
pub use due::{Due, DueStatus};
pub use error::{DuesError, ErrorKind};
pub use generator::{DueGenerator, GenerateRequest, GenerationOutcome};
pub use ledger::{DueLedger, PeriodSummary};
pub use payment::{Payment, PaymentMethod, ReceiptNumber};
pub use ports::{
    AttachmentStore, ConfigStore, DueFilter, DueStore, PaymentFilter, PaymentStore,
};
pub use recorder::{NewPayment, PaymentRecorder};
pub use reports::{
    ArrearsReport, CashGroup, CashGrouping, CashQuery, CashReport, CashScope,
    CategoryCompliance, CategoryComplianceReport, ClubStatistics, DebtorEntry, DueDebt,
    IncomeProjection, PaymentLine, ReportingEngine,
};
pub use settings::{
    ConfigEntry, ConfigValueType, DEFAULT_TOLERANCE_DAYS, RECEIPT_COUNTER_KEY,
    TOLERANCE_DAYS_KEY,
};

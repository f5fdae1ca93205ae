//! Request and response types for the HTTP API
//!
//! Money is flattened to `amount` + `currency` fields on the wire; the
//! report types from the domain are already wire-shaped and are returned
//! as-is.

pub mod config;
pub mod dues;
pub mod payments;
pub mod reports;

pub use config::{ConfigResponse, CreateConfigRequest, UpdateConfigRequest};
pub use dues::{
    DueResponse, GenerateDuesRequest, GenerationResponse, ListDuesQuery, RescheduleRequest,
    SweepResponse,
};
pub use payments::{
    AttachmentUploadRequest, ListPaymentsQuery, PaymentResponse, RecordPaymentRequest,
    RecordPaymentResponse, VoidPaymentRequest,
};
pub use reports::CashQueryParams;

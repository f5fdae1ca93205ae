//! Repository implementations for the storage ports
//!
//! One repository per aggregate, each holding a `PgPool` clone and
//! implementing the corresponding domain port trait.

pub mod attachments;
pub mod config;
pub mod dues;
pub mod payments;
pub mod roster;

pub use attachments::AttachmentRepository;
pub use config::ConfigRepository;
pub use dues::DueRepository;
pub use payments::PaymentRepository;
pub use roster::PlayerRepository;

//! Roster Domain - players and categories
//!
//! The dues core never mutates the roster: it only needs to know which
//! players are active and what monthly fee their category fixes. This crate
//! provides those read models and the `PlayerDirectory` port the rest of the
//! system consumes.

pub mod player;
pub mod category;
pub mod ports;
pub mod error;

pub use player::{Player, ActivePlayer};
pub use category::Category;
pub use ports::PlayerDirectory;
pub use error::RosterError;

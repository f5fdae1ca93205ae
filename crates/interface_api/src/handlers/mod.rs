//! HTTP request handlers
//!
//! Thin layer over the domain services: handlers validate input, check
//! roles, call one service method, and map the result to a response DTO.

pub mod config;
pub mod dues;
pub mod health;
pub mod payments;
pub mod reports;

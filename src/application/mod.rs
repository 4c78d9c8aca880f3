//! Application layer - Driver registry and resolution.
//!
//! This layer sits between hosts and the gateway port: it owns the mapping
//! from provider names to driver instances and hands out `PaymentGateway`
//! trait objects without exposing concrete driver types.

pub mod manager;

pub use manager::{DriverFactory, GatewayManager};

//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `coinpayments` - Signed driver for the CoinPayments merchant API
//! - `cpg` - Bearer-token driver for CPG deployments
//! - `events` - Event sink implementations (recording, tokio channel)
//! - `http` - Inbound webhook endpoint
//! - `mock` - Scriptable gateway for tests

pub mod coinpayments;
pub mod cpg;
pub mod events;
pub mod http;
pub mod mock;

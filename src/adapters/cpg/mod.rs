//! CPG gateway adapter.
//!
//! Talks to a CPG deployment's merchant API with bearer-token auth and
//! verifies inbound webhooks with a hex-encoded HMAC shared secret.

mod driver;
mod mapping;
mod wire;

pub use driver::{CpgConfig, CpgDriver};

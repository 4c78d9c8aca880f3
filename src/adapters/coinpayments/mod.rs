//! CoinPayments gateway adapter.
//!
//! Signed-API driver for the CoinPayments v2 merchant API: HMAC request
//! signing, webhook verification, and the provider's currency/status
//! vocabulary mapped into the canonical model.

mod driver;
mod mapping;
mod wire;

pub use driver::{CoinPaymentsConfig, CoinPaymentsDriver, SANDBOX_PAYMENT_ADDRESS};

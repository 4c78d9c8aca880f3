//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (errors, state machine trait)
//! - `currency` - Currency definitions and the lookup catalog
//! - `invoice` - Invoice entity, lifecycle status and events
//! - `signing` - HMAC request signing and webhook verification

pub mod currency;
pub mod foundation;
pub mod invoice;
pub mod signing;

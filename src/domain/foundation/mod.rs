//! Foundation module - Shared domain primitives.
//!
//! Contains the validation error type and the state machine trait that the
//! rest of the CoinBridge domain builds on.

mod errors;
mod state_machine;

pub use errors::ValidationError;
pub use state_machine::StateMachine;

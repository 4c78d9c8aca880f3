//! Request signing primitives.

mod signer;

pub use signer::{constant_time_compare, RequestSignature, RequestSigner};

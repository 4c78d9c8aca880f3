//! Mock gateway adapter for testing.

mod mock_gateway;

pub use mock_gateway::{MethodCall, MockGateway};

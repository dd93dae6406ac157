pub mod actions;
pub mod assertions;
pub mod setup;
pub mod tokens;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::TestResponse;
pub use assertions::ResponseAssertion;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
#[allow(unused_imports)]
pub use tokens::{backend_token, cookie_header, decode_claims, expired_token, valid_token};

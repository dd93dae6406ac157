// Public API - what other modules can use
pub use cache::QueryCache;
pub use client::BackendClient;
pub use types::{Upstream, UpstreamRequest, UpstreamResponse};

// Internal modules
mod cache;
mod client;
mod types;

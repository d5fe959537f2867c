pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{UpstreamClient, UpstreamSettings};
pub use error::UpstreamError;
pub use normalize::{normalize, strip_html};
pub use types::{RawResult, UpstreamLocation};

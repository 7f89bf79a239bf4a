//! HTTP client for the A&A Consult server.
//!
//! [`ApiClient`] reads the product catalog and implements
//! [`aaconsult_core::transport::Transport`], so it can deliver contact
//! requests for a [`ContactRequestFlow`](aaconsult_core::flow::ContactRequestFlow).

mod client;

pub mod error;

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
pub use error::{Error, Result};

//! Core types and the contact-request flow for the A&A Consult catalog.
//!
//! This crate is deliberately free of HTTP dependencies. The network call that
//! delivers a contact request goes through the [`transport::Transport`] trait,
//! implemented by `aaconsult-client` and by fakes in tests.

pub mod catalog;
pub mod contact;
pub mod error;
pub mod flow;
pub mod product;
pub mod transport;
pub mod validate;

pub use error::{Error, Result};

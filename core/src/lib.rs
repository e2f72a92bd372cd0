//! Core components for signing provider API requests.
//!
//! This crate provides the foundational types shared by the ec2sign signers.
//!
//! ## Overview
//!
//! - **Error**: one error type with an [`ErrorKind`] for every failure a signer can report
//! - **Traits**: [`SignRequest`] for signing an `http` request in place and
//!   [`SigningCredential`] for validating credentials
//! - **SigningRequest**: a mutable view over `http::request::Parts` used while signing
//!
//! ## Utilities
//!
//! - [`hash`]: SHA256 and HMAC-SHA256 helpers
//! - [`time`]: timestamp formatting and parsing
//! - [`utils`]: redaction of secrets in debug output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod api;
pub use api::{SignRequest, SigningCredential};
mod request;
pub use request::{SigningMethod, SigningRequest};

//! HTTP request handlers.
//!
//! - [`extract`]: document upload, validation, staging and content extraction
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Result`]; [`crate::errors::Error`] converts to a status code
//! and a plain-text body.

pub mod extract;

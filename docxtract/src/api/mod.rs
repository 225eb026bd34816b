//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Response data structures
//!
//! The service exposes a single endpoint, `POST /extract`, which accepts a Word document as a
//! multipart upload and returns its content as JSON.

pub mod handlers;
pub mod models;

//! API response data models.

pub mod extract;

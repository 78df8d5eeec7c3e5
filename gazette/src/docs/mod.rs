//! Developer documentation for Gazette.
//!
//! This module exists only to render documentation with rustdoc; no code
//! should go here.

pub mod api;

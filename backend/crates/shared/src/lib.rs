//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every other crate agrees on:
//! - The unified error type and its HTTP mapping
//! - Typed integer identifiers for database rows
//!
//! Keep this crate small. Only things with the same meaning in every
//! domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;

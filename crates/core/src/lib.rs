//! Product Compare Core - Shared types library.
//!
//! This crate provides common types used across all Product Compare components:
//! - `catalog` - Catalog API client and the comparison store
//! - `cli` - Command-line front end for browsing and comparing products
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs and prices, the product record, sort keys
//! - [`compare`] - The bounded comparison selection and its mode state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod compare;
pub mod types;

pub use compare::*;
pub use types::*;

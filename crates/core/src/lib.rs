//! Catalog Cache Core - Shared types library.
//!
//! This crate provides the types shared by the catalog cache components:
//! - `proxy` - HTTP service that syncs and re-serves the product snapshot
//! - `cli` - Command-line tools for one-shot syncs and connection checks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no filesystem access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product model, Shopify global IDs, prices, and the credential context

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

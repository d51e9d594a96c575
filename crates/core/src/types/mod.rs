//! Core types for the catalog cache.
//!
//! This module provides type-safe wrappers for the cached catalog and the
//! credentials used to reach it.

pub mod credential;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use credential::{CredentialContext, CredentialError, DEFAULT_API_VERSION};
pub use id::*;
pub use price::Price;
pub use product::{Image, Product, Variant};
pub use status::ProductStatus;

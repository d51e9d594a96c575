//! Business logic services for the catalog proxy.
//!
//! # Services
//!
//! - `sync` - Fetch the catalog from Shopify and persist the snapshot; serve
//!   the cached snapshot back

pub mod sync;

pub use sync::{SyncError, SyncReport, SyncService};

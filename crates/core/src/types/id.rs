//! Newtype IDs for Shopify global IDs.
//!
//! Shopify identifies every node with a global ID of the form
//! `gid://shopify/{Resource}/{number}`. Use the `define_gid!` macro to create
//! type-safe wrappers that prevent accidentally mixing IDs from different
//! resource types.

/// Prefix shared by every Shopify global ID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Macro to define a type-safe Shopify global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Accessors: `new()`, `as_str()`, `numeric_id()`
/// - `From<String>` and `Into<String>` implementations
///
/// The wrapped value is kept verbatim so a snapshot written to disk matches
/// what the upstream API returned.
///
/// # Example
///
/// ```rust
/// # use catalog_cache_core::define_gid;
/// define_gid!(CollectionGid, "Collection");
///
/// let id = CollectionGid::new("gid://shopify/Collection/42");
/// assert_eq!(id.numeric_id(), Some(42));
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Shopify resource name this ID refers to.
            pub const RESOURCE: &'static str = $resource;

            /// Wrap a global ID string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw global ID.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Extract the trailing numeric ID, if the value is a well-formed
            /// global ID for this resource.
            #[must_use]
            pub fn numeric_id(&self) -> Option<u64> {
                self.0
                    .strip_prefix($crate::types::id::GID_PREFIX)?
                    .strip_prefix(Self::RESOURCE)?
                    .strip_prefix('/')?
                    .split('?')
                    .next()?
                    .parse()
                    .ok()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_gid!(ProductGid, "Product");
define_gid!(VariantGid, "ProductVariant");
define_gid!(ImageGid, "ProductImage");

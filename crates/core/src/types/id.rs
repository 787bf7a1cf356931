//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create ID wrappers that cannot be mixed up:
//! a catalog item id is never accepted where a user id is expected.

/// Macro to define a type-safe ID wrapper over an integer representation.
///
/// Creates a newtype wrapper with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`, so the persisted
///   form is the bare integer
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `get()`
/// - `From` conversions in both directions and `FromStr`
///
/// # Example
///
/// ```rust
/// # use keynest_core::define_id;
/// define_id!(SkuId, u32);
/// define_id!(OrderNumber, i64);
///
/// let sku = SkuId::new(7);
/// assert_eq!(sku.get(), 7);
/// assert_eq!("7".parse::<SkuId>().unwrap(), sku);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $repr:ty) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            /// Create a new ID from its integer value.
            #[must_use]
            pub const fn new(id: $repr) -> Self {
                Self(id)
            }

            /// Get the underlying integer value.
            #[must_use]
            pub const fn get(&self) -> $repr {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<$repr>().map(Self)
            }
        }

        impl From<$repr> for $name {
            fn from(id: $repr) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $repr {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Catalog ids are small positive integers assigned by the catalog owner.
define_id!(CatalogId, u32);
// User ids are derived from a millisecond timestamp at sign-up.
define_id!(UserId, i64);

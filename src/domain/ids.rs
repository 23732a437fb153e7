//! Opaque row identities allocated by the store.

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

row_id!(
    /// Identity of a catalog item.
    ItemId,
    "item"
);
row_id!(
    /// Identity of an order header.
    OrderId,
    "order"
);
row_id!(OrderLineId, "line");
row_id!(
    /// Identity of an authenticated principal, issued by the auth collaborator.
    PrincipalId,
    "user"
);

//! Value kinds.
//!
//! `Kind` is the discriminant of a [`Value`](crate::Value). The thirteen
//! concrete kinds map one-to-one onto the value variants; `Kind::Any` is a
//! wildcard used only by function signatures and never describes a
//! constructed value.

use std::fmt;

/// The active variant of a [`Value`](crate::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Bool,
    Int64,
    Uint64,
    Double,
    String,
    Bytes,
    Message,
    Duration,
    Timestamp,
    List,
    Map,
    UnknownSet,
    Error,
    /// Wildcard for function descriptors. Never the kind of a value.
    Any,
}

impl Kind {
    /// Every kind a value can actually carry, in discriminant order.
    pub const VALUE_KINDS: [Kind; 13] = [
        Kind::Bool,
        Kind::Int64,
        Kind::Uint64,
        Kind::Double,
        Kind::String,
        Kind::Bytes,
        Kind::Message,
        Kind::Duration,
        Kind::Timestamp,
        Kind::List,
        Kind::Map,
        Kind::UnknownSet,
        Kind::Error,
    ];

    /// Stable, human-readable name used in diagnostics and error messages.
    ///
    /// # Example
    /// ```
    /// use cel_core_value::Kind;
    /// assert_eq!(Kind::Int64.type_name(), "int64");
    /// assert_eq!(Kind::List.type_name(), "CelList");
    /// ```
    pub fn type_name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int64 => "int64",
            Kind::Uint64 => "uint64",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Message => "Message",
            Kind::Duration => "Duration",
            Kind::Timestamp => "Timestamp",
            Kind::List => "CelList",
            Kind::Map => "CelMap",
            Kind::UnknownSet => "UnknownSet",
            Kind::Error => "CelError",
            Kind::Any => "Any type",
        }
    }

    /// Returns true if values of this kind borrow arena-owned data.
    pub fn is_pointer(self) -> bool {
        matches!(
            self,
            Kind::Message | Kind::List | Kind::Map | Kind::UnknownSet | Kind::Error
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

//! List and map capability traits.
//!
//! `CelList` and `CelMap` are read-only views that the value union points
//! at. Concrete adapters live outside this crate (over native containers,
//! repeated proto fields, and so on); this module only ships slice-backed
//! adapters that allocate in an [`Arena`].

use std::fmt;

use thiserror::Error;

use crate::arena::Arena;
use crate::kind::Kind;
use crate::value::Value;

/// An ordered, fixed-size sequence of values.
pub trait CelList<'a>: fmt::Debug + Sync {
    /// Number of elements.
    fn size(&self) -> usize;

    /// Element at `index`.
    ///
    /// `index < self.size()` is a precondition; what happens otherwise is up
    /// to the implementation.
    fn get(&self, index: usize) -> Value<'a>;

    /// Override only if cheaper than `size()`. Must agree with it.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<'a> dyn CelList<'a> + 'a {
    /// Iterate over the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = Value<'a>> + '_ {
        (0..self.size()).map(move |i| self.get(i))
    }
}

/// A keyed collection of values.
///
/// Keys are int64, uint64 or string values. Implementations are responsible
/// for enforcing that; the trait cannot.
pub trait CelMap<'a>: fmt::Debug + Sync {
    /// Number of entries.
    fn size(&self) -> usize;

    /// Override only if cheaper than `size()`. Must agree with it.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The value stored under `key`, or `None` if the key is absent.
    ///
    /// `key` may borrow from storage shorter-lived than the map.
    fn get(&self, key: Value<'_>) -> Option<Value<'a>>;

    /// The keys, as an arena-owned list.
    fn list_keys(&self) -> &'a dyn CelList<'a>;

    fn contains_key(&self, key: Value<'_>) -> bool {
        self.get(key).is_some()
    }
}

/// A value usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey<'a> {
    Int64(i64),
    Uint64(u64),
    String(&'a str),
}

impl<'a> MapKey<'a> {
    /// The key for `value`, or `None` if its kind cannot key a map.
    pub fn from_value(value: &Value<'a>) -> Option<Self> {
        match value {
            Value::Int64(v) => Some(MapKey::Int64(*v)),
            Value::Uint64(v) => Some(MapKey::Uint64(*v)),
            Value::String(s) => Some(MapKey::String(s.value())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value<'a> {
        match *self {
            MapKey::Int64(v) => Value::Int64(v),
            MapKey::Uint64(v) => Value::Uint64(v),
            MapKey::String(s) => Value::create_string_view(s),
        }
    }
}

impl fmt::Display for MapKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_value(), f)
    }
}

/// Errors building a [`SliceMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The key's kind cannot key a map.
    #[error("unsupported map key type {kind}: keys must be int64, uint64 or string")]
    InvalidKeyKind { kind: Kind },

    /// Two entries share a key.
    #[error("duplicate map key: {key}")]
    DuplicateKey { key: String },
}

/// A list over an arena-allocated slice.
///
/// `get` panics when the index is out of range.
#[derive(Debug, Clone, Copy)]
pub struct SliceList<'a> {
    elements: &'a [Value<'a>],
}

impl<'a> SliceList<'a> {
    /// View an existing slice.
    pub fn new(elements: &'a [Value<'a>]) -> Self {
        Self { elements }
    }

    /// Copy `elements` into `arena` and allocate the list there.
    pub fn new_in(arena: &'a Arena, elements: &[Value<'a>]) -> &'a Self {
        arena.alloc(Self::new(arena.alloc_slice(elements)))
    }

    pub fn as_slice(&self) -> &'a [Value<'a>] {
        self.elements
    }
}

impl<'a> CelList<'a> for SliceList<'a> {
    fn size(&self) -> usize {
        self.elements.len()
    }

    fn get(&self, index: usize) -> Value<'a> {
        self.elements[index]
    }

    fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A map over arena-allocated entries sorted by key.
#[derive(Debug, Clone, Copy)]
pub struct SliceMap<'a> {
    entries: &'a [(MapKey<'a>, Value<'a>)],
    keys: &'a SliceList<'a>,
}

impl<'a> SliceMap<'a> {
    /// Build a map from `(key, value)` pairs, allocating it in `arena`.
    ///
    /// Fails if a key is not int64, uint64 or string, or if a key repeats.
    /// String keys must already live in the arena (or longer).
    pub fn new_in(
        arena: &'a Arena,
        entries: impl IntoIterator<Item = (Value<'a>, Value<'a>)>,
    ) -> Result<&'a Self, MapError> {
        let mut sorted = entries
            .into_iter()
            .map(|(key, value)| match MapKey::from_value(&key) {
                Some(key) => Ok((key, value)),
                None => Err(MapError::InvalidKeyKind { kind: key.kind() }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(pair) = sorted.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(MapError::DuplicateKey {
                key: pair[0].0.to_string(),
            });
        }

        let entries = arena.alloc_slice(&sorted);
        let keys = arena.alloc_from_iter(entries.iter().map(|(key, _)| key.to_value()));
        Ok(arena.alloc(Self {
            entries,
            keys: arena.alloc(SliceList::new(keys)),
        }))
    }

    /// An empty map.
    pub fn empty_in(arena: &'a Arena) -> &'a Self {
        arena.alloc(Self {
            entries: &[],
            keys: arena.alloc(SliceList::new(&[])),
        })
    }
}

impl<'a> CelMap<'a> for SliceMap<'a> {
    fn size(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, key: Value<'_>) -> Option<Value<'a>> {
        let key = MapKey::from_value(&key)?;
        self.entries
            .binary_search_by(|(probe, _)| probe.cmp(&key))
            .ok()
            .map(|index| self.entries[index].1)
    }

    fn list_keys(&self) -> &'a dyn CelList<'a> {
        self.keys
    }
}

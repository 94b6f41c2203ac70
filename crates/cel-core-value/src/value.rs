//! The CEL runtime value union.
//!
//! `Value` is a small `Copy` descriptor. Primitive kinds are stored inline;
//! the pointer kinds (message, list, map, unknown set, error) borrow data
//! owned by an [`Arena`] for the lifetime `'a`.
//!
//! Two extraction families exist:
//!
//! - `*_or_die` accessors for code that has already branched on
//!   [`Value::kind`]. Calling the wrong one is a contract violation and
//!   panics with the expected and encountered kind names.
//! - [`Value::get_value`] / [`FromValue`](crate::FromValue) for call sites
//!   that prefer a checked, non-panicking extraction.
//!
//! Evaluation failures are *not* panics: they are `Value::Error` values, see
//! the [`error`](crate::error) module.

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use prost_reflect::prost_types;
use prost_reflect::{DynamicMessage, ReflectMessage};

use crate::arena::Arena;
use crate::containers::{CelList, CelMap};
use crate::error::{CelError, UnknownSet};
use crate::holder::{BytesHolder, StringHolder};
use crate::kind::Kind;
use crate::time::{self, TimeDecodeError};
use crate::visitor::{FromValue, NullCheck, ValueVisitor};
use crate::wkt;

/// A CEL runtime value.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    String(StringHolder<'a>),
    Bytes(BytesHolder<'a>),
    /// A structured message. `None` is the CEL `null` value.
    Message(Option<&'a DynamicMessage>),
    Duration(TimeDelta),
    Timestamp(DateTime<Utc>),
    List(&'a dyn CelList<'a>),
    Map(&'a dyn CelMap<'a>),
    UnknownSet(&'a UnknownSet<'a>),
    Error(&'a CelError<'a>),
}

impl Default for Value<'_> {
    /// The null value.
    fn default() -> Self {
        Value::null()
    }
}

// ==================== Contract Violations ====================

#[cold]
#[track_caller]
pub(crate) fn type_mismatch(expected: Kind, encountered: Kind) -> ! {
    tracing::error!(%expected, %encountered, "value accessor called on the wrong kind");
    panic!("Type mismatch: expected {expected}, encountered {encountered}");
}

#[track_caller]
fn non_null<T: ?Sized>(ptr: Option<&T>, kind: Kind) -> &T {
    debug_assert!(kind.is_pointer(), "{kind} is stored inline");
    match ptr {
        Some(ptr) => ptr,
        None => {
            tracing::error!(%kind, "null pointer supplied to value factory");
            panic!("Null pointer supplied for {kind}");
        }
    }
}

// ==================== Factories ====================

impl<'a> Value<'a> {
    /// The null value: a message-kind value with no message.
    pub fn null() -> Self {
        Value::Message(None)
    }

    pub fn create_bool(value: bool) -> Self {
        Value::Bool(value)
    }

    pub fn create_int64(value: i64) -> Self {
        Value::Int64(value)
    }

    pub fn create_uint64(value: u64) -> Self {
        Value::Uint64(value)
    }

    pub fn create_double(value: f64) -> Self {
        Value::Double(value)
    }

    pub fn create_string(holder: StringHolder<'a>) -> Self {
        Value::String(holder)
    }

    pub fn create_string_view(value: &'a str) -> Self {
        Value::String(StringHolder::new(value))
    }

    pub fn create_bytes(holder: BytesHolder<'a>) -> Self {
        Value::Bytes(holder)
    }

    pub fn create_bytes_view(value: &'a [u8]) -> Self {
        Value::Bytes(BytesHolder::new(value))
    }

    /// Wrap a structured message.
    ///
    /// Well-known types are normalized into their CEL kind instead of being
    /// stored as messages: `Duration`, `Timestamp`, the scalar wrappers, and
    /// the JSON types `Value`, `Struct` and `ListValue`. Any data the
    /// normalized value needs is copied into `arena`. `None` yields null.
    pub fn create_message(message: Option<&'a DynamicMessage>, arena: &'a Arena) -> Self {
        match message {
            Some(message) => wkt::normalize_message(message, arena),
            None => Value::null(),
        }
    }

    pub fn create_duration(value: TimeDelta) -> Self {
        Value::Duration(value)
    }

    /// Decode a wire-format duration.
    pub fn create_duration_proto(value: &prost_types::Duration) -> Result<Self, TimeDecodeError> {
        time::decode_duration(value).map(Value::Duration)
    }

    pub fn create_timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }

    /// Decode a wire-format timestamp.
    pub fn create_timestamp_proto(
        value: &prost_types::Timestamp,
    ) -> Result<Self, TimeDecodeError> {
        time::decode_timestamp(value).map(Value::Timestamp)
    }

    /// # Panics
    /// If `value` is `None`.
    #[track_caller]
    pub fn create_list(value: Option<&'a dyn CelList<'a>>) -> Self {
        Value::List(non_null(value, Kind::List))
    }

    /// # Panics
    /// If `value` is `None`.
    #[track_caller]
    pub fn create_map(value: Option<&'a dyn CelMap<'a>>) -> Self {
        Value::Map(non_null(value, Kind::Map))
    }

    /// # Panics
    /// If `value` is `None`.
    #[track_caller]
    pub fn create_unknown_set(value: Option<&'a UnknownSet<'a>>) -> Self {
        Value::UnknownSet(non_null(value, Kind::UnknownSet))
    }

    /// # Panics
    /// If `value` is `None`.
    #[track_caller]
    pub fn create_error(value: Option<&'a CelError<'a>>) -> Self {
        Value::Error(non_null(value, Kind::Error))
    }
}

// ==================== Type Information ====================

impl<'a> Value<'a> {
    /// The kind of the stored value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int64(_) => Kind::Int64,
            Value::Uint64(_) => Kind::Uint64,
            Value::Double(_) => Kind::Double,
            Value::String(_) => Kind::String,
            Value::Bytes(_) => Kind::Bytes,
            Value::Message(_) => Kind::Message,
            Value::Duration(_) => Kind::Duration,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::UnknownSet(_) => Kind::UnknownSet,
            Value::Error(_) => Kind::Error,
        }
    }

    /// Diagnostic name of `kind`.
    pub fn type_name(kind: Kind) -> &'static str {
        kind.type_name()
    }

    /// Invoke the visitor method matching the active kind.
    pub fn visit<V: ValueVisitor<'a>>(&self, visitor: V) -> V::Output {
        match *self {
            Value::Bool(v) => visitor.visit_bool(v),
            Value::Int64(v) => visitor.visit_int64(v),
            Value::Uint64(v) => visitor.visit_uint64(v),
            Value::Double(v) => visitor.visit_double(v),
            Value::String(v) => visitor.visit_string(v),
            Value::Bytes(v) => visitor.visit_bytes(v),
            Value::Message(v) => visitor.visit_message(v),
            Value::Duration(v) => visitor.visit_duration(v),
            Value::Timestamp(v) => visitor.visit_timestamp(v),
            Value::List(v) => visitor.visit_list(v),
            Value::Map(v) => visitor.visit_map(v),
            Value::UnknownSet(v) => visitor.visit_unknown_set(v),
            Value::Error(v) => visitor.visit_error(v),
        }
    }

    /// Assign the payload to `out` if it has type `T`.
    ///
    /// Returns false and leaves `out` untouched otherwise.
    pub fn get_value<T: FromValue<'a>>(&self, out: &mut T) -> bool {
        match T::from_value(self) {
            Some(value) => {
                *out = value;
                true
            }
            None => false,
        }
    }

    /// True only for a message-kind value without a message.
    pub fn is_null(&self) -> bool {
        self.visit(NullCheck)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int64(&self) -> bool {
        matches!(self, Value::Int64(_))
    }

    pub fn is_uint64(&self) -> bool {
        matches!(self, Value::Uint64(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    pub fn is_message(&self) -> bool {
        matches!(self, Value::Message(_))
    }

    pub fn is_duration(&self) -> bool {
        matches!(self, Value::Duration(_))
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, Value::Timestamp(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_unknown_set(&self) -> bool {
        matches!(self, Value::UnknownSet(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

// ==================== Checked Accessors ====================

impl<'a> Value<'a> {
    #[track_caller]
    fn get_or_die<T: FromValue<'a>>(&self, expected: Kind) -> T {
        match T::from_value(self) {
            Some(value) => value,
            None => type_mismatch(expected, self.kind()),
        }
    }

    #[track_caller]
    pub fn bool_or_die(&self) -> bool {
        self.get_or_die(Kind::Bool)
    }

    #[track_caller]
    pub fn int64_or_die(&self) -> i64 {
        self.get_or_die(Kind::Int64)
    }

    #[track_caller]
    pub fn uint64_or_die(&self) -> u64 {
        self.get_or_die(Kind::Uint64)
    }

    #[track_caller]
    pub fn double_or_die(&self) -> f64 {
        self.get_or_die(Kind::Double)
    }

    #[track_caller]
    pub fn string_or_die(&self) -> StringHolder<'a> {
        self.get_or_die(Kind::String)
    }

    #[track_caller]
    pub fn bytes_or_die(&self) -> BytesHolder<'a> {
        self.get_or_die(Kind::Bytes)
    }

    /// The stored message; `None` for the null value.
    #[track_caller]
    pub fn message_or_die(&self) -> Option<&'a DynamicMessage> {
        self.get_or_die(Kind::Message)
    }

    #[track_caller]
    pub fn duration_or_die(&self) -> TimeDelta {
        self.get_or_die(Kind::Duration)
    }

    #[track_caller]
    pub fn timestamp_or_die(&self) -> DateTime<Utc> {
        self.get_or_die(Kind::Timestamp)
    }

    #[track_caller]
    pub fn list_or_die(&self) -> &'a dyn CelList<'a> {
        self.get_or_die(Kind::List)
    }

    #[track_caller]
    pub fn map_or_die(&self) -> &'a dyn CelMap<'a> {
        self.get_or_die(Kind::Map)
    }

    #[track_caller]
    pub fn unknown_set_or_die(&self) -> &'a UnknownSet<'a> {
        self.get_or_die(Kind::UnknownSet)
    }

    #[track_caller]
    pub fn error_or_die(&self) -> &'a CelError<'a> {
        self.get_or_die(Kind::Error)
    }
}

// ==================== Equality ====================

fn messages_equal(a: &DynamicMessage, b: &DynamicMessage) -> bool {
    std::ptr::eq(a, b) || a == b
}

fn lists_equal<'a>(a: &dyn CelList<'a>, b: &dyn CelList<'a>) -> bool {
    a.size() == b.size() && (0..a.size()).all(|i| a.get(i) == b.get(i))
}

fn maps_equal<'a>(a: &dyn CelMap<'a>, b: &dyn CelMap<'a>) -> bool {
    if a.size() != b.size() {
        return false;
    }
    let keys = a.list_keys();
    (0..keys.size()).all(|i| {
        let key = keys.get(i);
        match (a.get(key), b.get(key)) {
            (Some(va), Some(vb)) => va == vb,
            _ => false,
        }
    })
}

impl PartialEq for Value<'_> {
    /// Kinds must match: a string and a bytes value with the same content are
    /// not equal. Doubles follow IEEE 754, so NaN is unequal to itself.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Message(a), Value::Message(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => messages_equal(a, b),
                _ => false,
            },
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => lists_equal(*a, *b),
            (Value::Map(a), Value::Map(b)) => maps_equal(*a, *b),
            (Value::UnknownSet(a), Value::UnknownSet(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

// ==================== Display ====================

fn write_duration(f: &mut fmt::Formatter<'_>, d: &TimeDelta) -> fmt::Result {
    let sign = if *d < TimeDelta::zero() { "-" } else { "" };
    let abs = d.abs();
    let seconds = abs.num_seconds();
    let nanos = abs.subsec_nanos();
    if nanos == 0 {
        write!(f, "{sign}{seconds}s")
    } else {
        let frac = format!("{nanos:09}");
        write!(f, "{sign}{seconds}.{}s", frac.trim_end_matches('0'))
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}u"),
            Value::Double(v) => {
                if v.is_nan() {
                    write!(f, "NaN")
                } else if v.is_infinite() {
                    if v.is_sign_positive() {
                        write!(f, "+infinity")
                    } else {
                        write!(f, "-infinity")
                    }
                } else if v.fract() == 0.0 {
                    write!(f, "{v}.0")
                } else {
                    write!(f, "{v}")
                }
            }
            Value::String(v) => write!(f, "{:?}", v.value()),
            Value::Bytes(v) => write!(f, "b\"{v}\""),
            Value::Message(None) => write!(f, "null"),
            Value::Message(Some(m)) => write!(f, "{}{{...}}", m.descriptor().full_name()),
            Value::Duration(d) => {
                write!(f, "duration(")?;
                write_duration(f, d)?;
                write!(f, ")")
            }
            Value::Timestamp(t) => write!(
                f,
                "timestamp({})",
                t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ),
            Value::List(list) => {
                write!(f, "[")?;
                for i in 0..list.size() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", list.get(i))?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                let keys = map.list_keys();
                write!(f, "{{")?;
                for i in 0..keys.size() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let key = keys.get(i);
                    match map.get(key) {
                        Some(value) => write!(f, "{key}: {value}")?,
                        None => write!(f, "{key}: <missing>")?,
                    }
                }
                write!(f, "}}")
            }
            Value::UnknownSet(set) => write!(f, "unknown({})", set.paths().join(", ")),
            Value::Error(e) => write!(f, "error({e})"),
        }
    }
}

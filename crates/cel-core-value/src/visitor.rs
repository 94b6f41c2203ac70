//! Kind-directed dispatch over a [`Value`].
//!
//! [`Value::visit`] calls exactly one `visit_*` method, chosen by the active
//! kind. Every method returns the visitor's `Output`, so all handlers agree
//! on the result type. Methods a visitor does not care about fall through to
//! [`ValueVisitor::visit_unhandled`].
//!
//! ```
//! use cel_core_value::{Kind, Value, ValueVisitor};
//!
//! struct IsNumeric;
//!
//! impl<'a> ValueVisitor<'a> for IsNumeric {
//!     type Output = bool;
//!
//!     fn visit_unhandled(self, _kind: Kind) -> bool {
//!         false
//!     }
//!     fn visit_int64(self, _value: i64) -> bool {
//!         true
//!     }
//!     fn visit_uint64(self, _value: u64) -> bool {
//!         true
//!     }
//!     fn visit_double(self, _value: f64) -> bool {
//!         true
//!     }
//! }
//!
//! assert!(Value::create_uint64(1).visit(IsNumeric));
//! assert!(!Value::create_string_view("1").visit(IsNumeric));
//! ```

use std::marker::PhantomData;

use chrono::{DateTime, TimeDelta, Utc};
use prost_reflect::DynamicMessage;

use crate::containers::{CelList, CelMap};
use crate::error::{CelError, UnknownSet};
use crate::holder::{BytesHolder, StringHolder};
use crate::kind::Kind;
use crate::value::Value;

/// Handler invoked by [`Value::visit`].
pub trait ValueVisitor<'a>: Sized {
    type Output;

    /// Called for every kind whose method is not overridden.
    fn visit_unhandled(self, kind: Kind) -> Self::Output;

    fn visit_bool(self, _value: bool) -> Self::Output {
        self.visit_unhandled(Kind::Bool)
    }

    fn visit_int64(self, _value: i64) -> Self::Output {
        self.visit_unhandled(Kind::Int64)
    }

    fn visit_uint64(self, _value: u64) -> Self::Output {
        self.visit_unhandled(Kind::Uint64)
    }

    fn visit_double(self, _value: f64) -> Self::Output {
        self.visit_unhandled(Kind::Double)
    }

    fn visit_string(self, _value: StringHolder<'a>) -> Self::Output {
        self.visit_unhandled(Kind::String)
    }

    fn visit_bytes(self, _value: BytesHolder<'a>) -> Self::Output {
        self.visit_unhandled(Kind::Bytes)
    }

    fn visit_message(self, _value: Option<&'a DynamicMessage>) -> Self::Output {
        self.visit_unhandled(Kind::Message)
    }

    fn visit_duration(self, _value: TimeDelta) -> Self::Output {
        self.visit_unhandled(Kind::Duration)
    }

    fn visit_timestamp(self, _value: DateTime<Utc>) -> Self::Output {
        self.visit_unhandled(Kind::Timestamp)
    }

    fn visit_list(self, _value: &'a dyn CelList<'a>) -> Self::Output {
        self.visit_unhandled(Kind::List)
    }

    fn visit_map(self, _value: &'a dyn CelMap<'a>) -> Self::Output {
        self.visit_unhandled(Kind::Map)
    }

    fn visit_unknown_set(self, _value: &'a UnknownSet<'a>) -> Self::Output {
        self.visit_unhandled(Kind::UnknownSet)
    }

    fn visit_error(self, _value: &'a CelError<'a>) -> Self::Output {
        self.visit_unhandled(Kind::Error)
    }
}

/// Payload types that can be extracted from a [`Value`].
///
/// Implemented for exactly the payload type of each kind. Extraction never
/// converts between kinds: an `i64` is not extracted from a `Uint64` value.
pub trait FromValue<'a>: Sized {
    /// The payload if `value` holds this type, else `None`.
    fn from_value(value: &Value<'a>) -> Option<Self>;
}

/// Visitor that yields the payload of one kind.
struct Extract<T>(PhantomData<T>);

macro_rules! extract_payload {
    ($lt:lifetime, $ty:ty, $method:ident) => {
        impl<$lt> ValueVisitor<$lt> for Extract<$ty> {
            type Output = Option<$ty>;

            fn visit_unhandled(self, _kind: Kind) -> Self::Output {
                None
            }

            fn $method(self, value: $ty) -> Self::Output {
                Some(value)
            }
        }

        impl<$lt> FromValue<$lt> for $ty {
            fn from_value(value: &Value<$lt>) -> Option<Self> {
                value.visit(Extract::<$ty>(PhantomData))
            }
        }
    };
}

extract_payload!('a, bool, visit_bool);
extract_payload!('a, i64, visit_int64);
extract_payload!('a, u64, visit_uint64);
extract_payload!('a, f64, visit_double);
extract_payload!('a, StringHolder<'a>, visit_string);
extract_payload!('a, BytesHolder<'a>, visit_bytes);
extract_payload!('a, Option<&'a DynamicMessage>, visit_message);
extract_payload!('a, TimeDelta, visit_duration);
extract_payload!('a, DateTime<Utc>, visit_timestamp);
extract_payload!('a, &'a dyn CelList<'a>, visit_list);
extract_payload!('a, &'a dyn CelMap<'a>, visit_map);
extract_payload!('a, &'a UnknownSet<'a>, visit_unknown_set);
extract_payload!('a, &'a CelError<'a>, visit_error);

/// True only for a message-kind value without a message.
pub(crate) struct NullCheck;

impl<'a> ValueVisitor<'a> for NullCheck {
    type Output = bool;

    fn visit_unhandled(self, _kind: Kind) -> bool {
        false
    }

    fn visit_message(self, value: Option<&'a DynamicMessage>) -> bool {
        value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::containers::SliceList;
    use crate::error::create_no_matching_overload_error;

    /// Reports which handler ran.
    struct KindOf;

    impl<'a> ValueVisitor<'a> for KindOf {
        type Output = Kind;

        fn visit_unhandled(self, kind: Kind) -> Kind {
            kind
        }
    }

    #[test]
    fn test_visit_dispatches_on_active_kind() {
        let arena = Arena::new();
        let list = SliceList::new_in(&arena, &[]);
        let values = [
            Value::create_bool(false),
            Value::create_int64(1),
            Value::create_uint64(1),
            Value::create_double(1.0),
            Value::create_string_view("s"),
            Value::create_bytes_view(b"b"),
            Value::null(),
            Value::create_duration(TimeDelta::seconds(1)),
            Value::create_timestamp(DateTime::from_timestamp(0, 0).unwrap()),
            Value::create_list(Some(list)),
            create_no_matching_overload_error(&arena),
        ];
        for value in values {
            assert_eq!(value.visit(KindOf), value.kind());
        }
    }

    #[test]
    fn test_from_value_is_kind_exact() {
        let value = Value::create_uint64(5);
        assert_eq!(u64::from_value(&value), Some(5));
        assert_eq!(i64::from_value(&value), None);
        assert_eq!(f64::from_value(&value), None);
    }

    #[test]
    fn test_from_value_borrowed_payloads() {
        let arena = Arena::new();
        let list = SliceList::new_in(&arena, &[Value::create_int64(1)]);
        let value = Value::create_list(Some(list));

        let extracted: &dyn CelList<'_> = FromValue::from_value(&value).unwrap();
        assert_eq!(extracted.size(), 1);
        let error: Option<&CelError<'_>> = FromValue::from_value(&value);
        assert!(error.is_none());
    }

    #[test]
    fn test_null_check_only_for_null_message() {
        let arena = Arena::new();
        assert!(Value::null().visit(NullCheck));
        assert!(!Value::create_int64(0).visit(NullCheck));
        assert!(!create_no_matching_overload_error(&arena).visit(NullCheck));
    }
}

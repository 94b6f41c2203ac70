//! Runtime value model for the Common Expression Language.
//!
//! This crate provides the value union that an evaluator passes between
//! expression nodes, the capability traits for list and map values, and the
//! protocol for representing evaluation failures and unknown attributes as
//! ordinary values.
//!
//! # Quick Start
//!
//! ```
//! use cel_core_value::{
//!     create_no_such_key_error, check_no_such_key_error, Arena, CelMap, Kind, SliceMap, Value,
//! };
//!
//! let arena = Arena::new();
//! let map = SliceMap::new_in(
//!     &arena,
//!     [(Value::create_string_view("limit"), Value::create_int64(10))],
//! )
//! .unwrap();
//! let value = Value::create_map(Some(map));
//! assert_eq!(value.kind(), Kind::Map);
//!
//! let lookup = |key: &str| match value.map_or_die().get(Value::create_string_view(key)) {
//!     Some(found) => found,
//!     None => create_no_such_key_error(&arena, key),
//! };
//! assert_eq!(lookup("limit").int64_or_die(), 10);
//! assert!(check_no_such_key_error(&lookup("offset")));
//! ```
//!
//! # Lifetimes
//!
//! A [`Value<'a>`](Value) is `Copy` and borrows its out-of-line data from an
//! [`Arena`] for `'a`. Strings and bytes may also borrow from any other
//! source that lives at least as long.

mod arena;
mod containers;
pub mod error;
mod holder;
mod kind;
mod status;
pub mod time;
mod value;
mod visitor;
mod wkt;

pub use arena::{Arena, ArenaOptions};
pub use containers::{CelList, CelMap, MapError, MapKey, SliceList, SliceMap};
pub use error::{
    check_no_matching_overload_error, check_no_such_field_error, check_no_such_key_error,
    create_error_value, create_error_value_default, create_missing_attribute_error,
    create_no_matching_overload_error, create_no_such_field_error, create_no_such_key_error,
    create_unknown_function_result_error, create_unknown_value_error,
    get_unknown_paths_set_or_die, is_missing_attribute_error, is_unknown_function_result,
    is_unknown_value_error, missing_attribute_path, CelError, UnknownSet, NO_POSITION,
};
pub use holder::{BytesHolder, StringHolder};
pub use kind::Kind;
pub use status::{Status, StatusCode};
pub use time::TimeDecodeError;
pub use value::Value;
pub use visitor::{FromValue, ValueVisitor};

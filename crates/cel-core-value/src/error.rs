//! Error and unknown-value protocol.
//!
//! Evaluation failures travel as ordinary [`Value::Error`] values so that
//! short-circuiting and combination logic can live in the evaluator. Every
//! error is produced by one of the constructors in this module; each records
//! which constructor made it, and the recognizer predicates match on that
//! record rather than on the message text.
//!
//! Unknown values reuse the error channel but are not failures. Callers must
//! test [`is_unknown_value_error`] and [`is_unknown_function_result`] before
//! deciding to surface an error.
//!
//! ```
//! use cel_core_value::{create_unknown_value_error, get_unknown_paths_set_or_die,
//!     is_unknown_value_error, Arena};
//!
//! let arena = Arena::new();
//! let value = create_unknown_value_error(&arena, "request.auth.claims");
//! assert!(value.is_error());
//! assert!(is_unknown_value_error(&value));
//! assert!(get_unknown_paths_set_or_die(&value).contains("request.auth.claims"));
//! ```

use std::collections::BTreeSet;

use thiserror::Error;

use crate::arena::Arena;
use crate::kind::Kind;
use crate::status::{Status, StatusCode};
use crate::value::Value;

/// Position value meaning "no source position".
pub const NO_POSITION: i32 = -1;

const NO_MATCHING_OVERLOAD: &str = "No matching overloads found";
const NO_SUCH_FIELD: &str = "no_such_field";
const NO_SUCH_KEY: &str = "Key not found in map";
const UNKNOWN_VALUE: &str = "Unknown value";
const UNKNOWN_FUNCTION_RESULT: &str = "Unknown function result";
const MISSING_ATTRIBUTE: &str = "MissingAttributeError";

/// Which constructor produced a [`CelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ErrorTag<'a> {
    Generic,
    NoMatchingOverload,
    NoSuchField,
    NoSuchKey,
    UnknownValue(&'a UnknownSet<'a>),
    UnknownFunctionResult,
    MissingAttribute(&'a str),
}

/// A structured evaluation failure carried by an error-kind value.
///
/// Only the constructors in this module create one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{code}: {message}")]
pub struct CelError<'a> {
    code: StatusCode,
    message: &'a str,
    position: Option<i32>,
    tag: ErrorTag<'a>,
}

impl<'a> CelError<'a> {
    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &'a str {
        self.message
    }

    /// Offset into the expression source, when the producer knew it.
    pub fn position(&self) -> Option<i32> {
        self.position
    }

    /// An owned copy that outlives the arena.
    pub fn to_status(&self) -> Status {
        Status {
            code: self.code,
            message: self.message.to_string(),
            position: self.position,
        }
    }
}

/// A set of attribute paths whose values were not available.
///
/// Paths are stored sorted and deduplicated in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownSet<'a> {
    paths: &'a [&'a str],
}

impl<'a> UnknownSet<'a> {
    /// Copy `paths` into `arena` as a set.
    pub fn new_in<'p>(arena: &'a Arena, paths: impl IntoIterator<Item = &'p str>) -> &'a Self {
        let mut sorted: Vec<&str> = paths.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();
        let copied: Vec<&'a str> = sorted.into_iter().map(|path| arena.alloc_str(path)).collect();
        arena.alloc(Self {
            paths: arena.alloc_slice(&copied),
        })
    }

    pub fn paths(&self) -> &'a [&'a str] {
        self.paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.binary_search(&path).is_ok()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

// ==================== Constructors ====================

fn alloc_error<'a>(
    arena: &'a Arena,
    code: StatusCode,
    message: &str,
    position: Option<i32>,
    tag: ErrorTag<'a>,
) -> Value<'a> {
    let error = arena.alloc(CelError {
        code,
        message: arena.alloc_str(message),
        position,
        tag,
    });
    Value::create_error(Some(error))
}

/// A generic error value.
///
/// `position` is the offset of the failing expression in its source, or
/// [`NO_POSITION`].
pub fn create_error_value<'a>(
    arena: &'a Arena,
    message: &str,
    code: StatusCode,
    position: i32,
) -> Value<'a> {
    let position = (position != NO_POSITION).then_some(position);
    alloc_error(arena, code, message, position, ErrorTag::Generic)
}

/// A generic error value with code `Unknown` and no position.
pub fn create_error_value_default<'a>(arena: &'a Arena, message: &str) -> Value<'a> {
    create_error_value(arena, message, StatusCode::Unknown, NO_POSITION)
}

/// No function overload matched the argument kinds.
pub fn create_no_matching_overload_error(arena: &Arena) -> Value<'_> {
    alloc_error(
        arena,
        StatusCode::Unknown,
        NO_MATCHING_OVERLOAD,
        None,
        ErrorTag::NoMatchingOverload,
    )
}

/// A field access failed.
pub fn create_no_such_field_error(arena: &Arena) -> Value<'_> {
    alloc_error(
        arena,
        StatusCode::NotFound,
        NO_SUCH_FIELD,
        None,
        ErrorTag::NoSuchField,
    )
}

/// A map or field lookup missed `key`.
pub fn create_no_such_key_error<'a>(arena: &'a Arena, key: &str) -> Value<'a> {
    alloc_error(
        arena,
        StatusCode::NotFound,
        &format!("{NO_SUCH_KEY} : {key}"),
        None,
        ErrorTag::NoSuchKey,
    )
}

/// Evaluation reached an attribute the caller declared unknown.
pub fn create_unknown_value_error<'a>(arena: &'a Arena, unknown_path: &str) -> Value<'a> {
    let unknowns = UnknownSet::new_in(arena, [unknown_path]);
    alloc_error(
        arena,
        StatusCode::Unavailable,
        &format!("{UNKNOWN_VALUE} {unknown_path}"),
        None,
        ErrorTag::UnknownValue(unknowns),
    )
}

/// A function result is itself unknown.
pub fn create_unknown_function_result_error<'a>(arena: &'a Arena, help_message: &str) -> Value<'a> {
    alloc_error(
        arena,
        StatusCode::Unavailable,
        &format!("{UNKNOWN_FUNCTION_RESULT}: {help_message}"),
        None,
        ErrorTag::UnknownFunctionResult,
    )
}

/// Evaluation touched an attribute the caller declared missing.
pub fn create_missing_attribute_error<'a>(arena: &'a Arena, missing_path: &str) -> Value<'a> {
    let path = arena.alloc_str(missing_path);
    alloc_error(
        arena,
        StatusCode::InvalidArgument,
        &format!("{MISSING_ATTRIBUTE}: {missing_path}"),
        None,
        ErrorTag::MissingAttribute(path),
    )
}

// ==================== Recognizers ====================

fn tag_of<'a>(value: &Value<'a>) -> Option<ErrorTag<'a>> {
    match value {
        Value::Error(error) => Some(error.tag),
        _ => None,
    }
}

/// True for values made by [`create_no_matching_overload_error`].
pub fn check_no_matching_overload_error(value: &Value<'_>) -> bool {
    matches!(tag_of(value), Some(ErrorTag::NoMatchingOverload))
}

/// True for values made by [`create_no_such_field_error`].
pub fn check_no_such_field_error(value: &Value<'_>) -> bool {
    matches!(tag_of(value), Some(ErrorTag::NoSuchField))
}

/// True for values made by [`create_no_such_key_error`].
pub fn check_no_such_key_error(value: &Value<'_>) -> bool {
    matches!(tag_of(value), Some(ErrorTag::NoSuchKey))
}

/// True for values made by [`create_unknown_value_error`].
pub fn is_unknown_value_error(value: &Value<'_>) -> bool {
    matches!(tag_of(value), Some(ErrorTag::UnknownValue(_)))
}

/// True for values made by [`create_unknown_function_result_error`].
pub fn is_unknown_function_result(value: &Value<'_>) -> bool {
    matches!(tag_of(value), Some(ErrorTag::UnknownFunctionResult))
}

/// True for values made by [`create_missing_attribute_error`].
pub fn is_missing_attribute_error(value: &Value<'_>) -> bool {
    matches!(tag_of(value), Some(ErrorTag::MissingAttribute(_)))
}

/// The attribute path of a missing-attribute error.
pub fn missing_attribute_path<'a>(value: &Value<'a>) -> Option<&'a str> {
    match tag_of(value) {
        Some(ErrorTag::MissingAttribute(path)) => Some(path),
        _ => None,
    }
}

/// The unknown attribute paths of an unknown-value error.
///
/// # Panics
/// If `value` does not satisfy [`is_unknown_value_error`].
#[track_caller]
pub fn get_unknown_paths_set_or_die<'a>(value: &Value<'a>) -> BTreeSet<&'a str> {
    match tag_of(value) {
        Some(ErrorTag::UnknownValue(unknowns)) => unknowns.paths().iter().copied().collect(),
        _ => {
            let encountered = describe(value);
            tracing::error!(%encountered, "unknown paths requested from a value that is not an unknown value error");
            panic!("Type mismatch: expected unknown value error, encountered {encountered}");
        }
    }
}

fn describe(value: &Value<'_>) -> String {
    match value {
        Value::Error(error) => format!("{} `{}`", Kind::Error, error.message),
        other => other.kind().to_string(),
    }
}

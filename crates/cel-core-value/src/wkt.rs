//! Well-known type normalization for message values.
//!
//! CEL treats several protobuf well-known types as primitives. When a
//! message of one of these types is wrapped, it is converted into the
//! matching value kind; every other message is kept as a message value.

use std::borrow::Cow;

use prost_reflect::{DynamicMessage, MapKey as ProtoMapKey, ReflectMessage, Value as ProtoValue};
use prost_reflect::prost_types;

use crate::arena::Arena;
use crate::containers::{SliceList, SliceMap};
use crate::error::{create_error_value, NO_POSITION};
use crate::status::StatusCode;
use crate::time;
use crate::value::Value;

/// Convert `message` into a value, unwrapping well-known types.
pub(crate) fn normalize_message<'a>(message: &'a DynamicMessage, arena: &'a Arena) -> Value<'a> {
    let descriptor = message.descriptor();
    let type_name = descriptor.full_name();
    let value = match type_name {
        "google.protobuf.Duration" => unwrap_duration(message, arena),
        "google.protobuf.Timestamp" => unwrap_timestamp(message, arena),
        "google.protobuf.BoolValue" => Value::Bool(field_bool(message, "value").unwrap_or(false)),
        "google.protobuf.Int32Value" | "google.protobuf.Int64Value" => {
            Value::Int64(field_i64(message, "value").unwrap_or(0))
        }
        "google.protobuf.UInt32Value" | "google.protobuf.UInt64Value" => {
            Value::Uint64(field_u64(message, "value").unwrap_or(0))
        }
        "google.protobuf.FloatValue" | "google.protobuf.DoubleValue" => {
            Value::Double(field_f64(message, "value").unwrap_or(0.0))
        }
        "google.protobuf.StringValue" => {
            let text = field(message, "value");
            let text = match text.as_deref() {
                Some(ProtoValue::String(s)) => s.as_str(),
                _ => "",
            };
            Value::create_string_view(arena.alloc_str(text))
        }
        "google.protobuf.BytesValue" => {
            let bytes = field(message, "value");
            let bytes: &[u8] = match bytes.as_deref() {
                Some(ProtoValue::Bytes(b)) => b.as_ref(),
                _ => &[],
            };
            Value::create_bytes_view(arena.alloc_bytes(bytes))
        }
        "google.protobuf.Value" => unwrap_json_value(message, arena),
        "google.protobuf.Struct" => unwrap_struct(message, arena),
        "google.protobuf.ListValue" => unwrap_list_value(message, arena),
        _ => return Value::Message(Some(message)),
    };
    tracing::debug!(
        message_type = %type_name,
        kind = %value.kind(),
        "normalized well-known message"
    );
    value
}

// ==================== Field Access ====================

fn field<'m>(message: &'m DynamicMessage, name: &str) -> Option<Cow<'m, ProtoValue>> {
    let field = message.descriptor().get_field_by_name(name)?;
    Some(message.get_field(&field))
}

fn set_field<'m>(message: &'m DynamicMessage, name: &str) -> Option<Cow<'m, ProtoValue>> {
    let field = message.descriptor().get_field_by_name(name)?;
    message.has_field(&field).then(|| message.get_field(&field))
}

fn field_i64(message: &DynamicMessage, name: &str) -> Option<i64> {
    match field(message, name)?.as_ref() {
        ProtoValue::I64(v) => Some(*v),
        ProtoValue::I32(v) => Some(i64::from(*v)),
        _ => None,
    }
}

fn field_i32(message: &DynamicMessage, name: &str) -> Option<i32> {
    match field(message, name)?.as_ref() {
        ProtoValue::I32(v) => Some(*v),
        _ => None,
    }
}

fn field_u64(message: &DynamicMessage, name: &str) -> Option<u64> {
    match field(message, name)?.as_ref() {
        ProtoValue::U64(v) => Some(*v),
        ProtoValue::U32(v) => Some(u64::from(*v)),
        _ => None,
    }
}

fn field_f64(message: &DynamicMessage, name: &str) -> Option<f64> {
    match field(message, name)?.as_ref() {
        ProtoValue::F64(v) => Some(*v),
        ProtoValue::F32(v) => Some(f64::from(*v)),
        _ => None,
    }
}

fn field_bool(message: &DynamicMessage, name: &str) -> Option<bool> {
    match field(message, name)?.as_ref() {
        ProtoValue::Bool(v) => Some(*v),
        _ => None,
    }
}

// ==================== Duration / Timestamp ====================

fn unwrap_duration<'a>(message: &DynamicMessage, arena: &'a Arena) -> Value<'a> {
    let proto = prost_types::Duration {
        seconds: field_i64(message, "seconds").unwrap_or(0),
        nanos: field_i32(message, "nanos").unwrap_or(0),
    };
    match time::decode_duration(&proto) {
        Ok(duration) => Value::Duration(duration),
        Err(err) => create_error_value(arena, &err.to_string(), StatusCode::InvalidArgument, NO_POSITION),
    }
}

fn unwrap_timestamp<'a>(message: &DynamicMessage, arena: &'a Arena) -> Value<'a> {
    let proto = prost_types::Timestamp {
        seconds: field_i64(message, "seconds").unwrap_or(0),
        nanos: field_i32(message, "nanos").unwrap_or(0),
    };
    match time::decode_timestamp(&proto) {
        Ok(timestamp) => Value::Timestamp(timestamp),
        Err(err) => create_error_value(arena, &err.to_string(), StatusCode::InvalidArgument, NO_POSITION),
    }
}

// ==================== google.protobuf.Value / Struct / ListValue ====================

/// Unwrap a `google.protobuf.Value` to its active member.
fn unwrap_json_value<'a>(message: &DynamicMessage, arena: &'a Arena) -> Value<'a> {
    if set_field(message, "null_value").is_some() {
        return Value::null();
    }
    if let Some(value) = set_field(message, "bool_value") {
        if let ProtoValue::Bool(b) = value.as_ref() {
            return Value::Bool(*b);
        }
    }
    if let Some(value) = set_field(message, "number_value") {
        if let ProtoValue::F64(d) = value.as_ref() {
            return Value::Double(*d);
        }
    }
    if let Some(value) = set_field(message, "string_value") {
        if let ProtoValue::String(s) = value.as_ref() {
            return Value::create_string_view(arena.alloc_str(s));
        }
    }
    if let Some(value) = set_field(message, "struct_value") {
        if let ProtoValue::Message(m) = value.as_ref() {
            return unwrap_struct(m, arena);
        }
    }
    if let Some(value) = set_field(message, "list_value") {
        if let ProtoValue::Message(m) = value.as_ref() {
            return unwrap_list_value(m, arena);
        }
    }
    // An empty `Value` has no member set and reads as null.
    Value::null()
}

/// Unwrap a `google.protobuf.Struct` into a string-keyed map.
fn unwrap_struct<'a>(message: &DynamicMessage, arena: &'a Arena) -> Value<'a> {
    let mut entries = Vec::new();
    if let Some(fields) = field(message, "fields") {
        if let ProtoValue::Map(fields) = fields.as_ref() {
            for (key, value) in fields {
                if let (ProtoMapKey::String(key), ProtoValue::Message(value)) = (key, value) {
                    entries.push((
                        Value::create_string_view(arena.alloc_str(key)),
                        unwrap_json_value(value, arena),
                    ));
                }
            }
        }
    }
    match SliceMap::new_in(arena, entries) {
        Ok(map) => Value::create_map(Some(map)),
        Err(err) => create_error_value(arena, &err.to_string(), StatusCode::InvalidArgument, NO_POSITION),
    }
}

/// Unwrap a `google.protobuf.ListValue` into a list.
fn unwrap_list_value<'a>(message: &DynamicMessage, arena: &'a Arena) -> Value<'a> {
    let mut elements = Vec::new();
    if let Some(values) = field(message, "values") {
        if let ProtoValue::List(values) = values.as_ref() {
            for value in values {
                if let ProtoValue::Message(value) = value {
                    elements.push(unwrap_json_value(value, arena));
                }
            }
        }
    }
    Value::create_list(Some(SliceList::new_in(arena, &elements)))
}

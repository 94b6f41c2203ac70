//! Message wrapping tests for cel-core-value.

mod common;

use std::collections::HashMap;

use cel_core_value::{is_unknown_value_error, Arena, Kind, Value};
use chrono::TimeDelta;
use common::{new_message, resource_pool};
use prost_reflect::prost::bytes::Bytes;
use prost_reflect::{DynamicMessage, MapKey as ProtoMapKey, Value as ProtoValue};

#[test]
fn null_message_is_null() {
    let arena = Arena::new();
    let value = Value::create_message(None, &arena);
    assert_eq!(value.kind(), Kind::Message);
    assert!(value.is_null());
    assert_eq!(value.message_or_die(), None);
    assert_eq!(value, Value::null());
}

#[test]
fn plain_message_is_kept_by_reference() {
    let arena = Arena::new();
    let message = new_message("google.protobuf.FieldMask");
    let value = Value::create_message(Some(&message), &arena);

    assert!(value.is_message());
    assert!(!value.is_null());
    let stored = value.message_or_die().expect("message present");
    assert!(std::ptr::eq(stored, &message));
    assert_eq!(value.to_string(), "google.protobuf.FieldMask{...}");
}

#[test]
fn equal_messages_compare_equal() {
    let arena = Arena::new();
    let mut a = new_message("google.protobuf.FieldMask");
    let mut b = new_message("google.protobuf.FieldMask");
    let paths = ProtoValue::List(vec![ProtoValue::String("name".to_string())]);
    a.set_field_by_name("paths", paths.clone());
    b.set_field_by_name("paths", paths);

    let empty = new_message("google.protobuf.FieldMask");
    assert_eq!(
        Value::create_message(Some(&a), &arena),
        Value::create_message(Some(&b), &arena)
    );
    assert_ne!(
        Value::create_message(Some(&a), &arena),
        Value::create_message(Some(&empty), &arena)
    );
    assert_ne!(Value::create_message(Some(&empty), &arena), Value::null());
}

fn resource_with_labels(pool: &prost_reflect::DescriptorPool, count: i64) -> DynamicMessage {
    // A fresh HashMap per message, so iteration order differs between copies.
    let labels: HashMap<ProtoMapKey, ProtoValue> = (0..count)
        .map(|i| (ProtoMapKey::String(format!("label-{i}")), ProtoValue::I64(i)))
        .collect();
    let descriptor = pool
        .get_message_by_name("demo.Resource")
        .expect("demo.Resource in pool");
    let mut message = DynamicMessage::new(descriptor);
    message.set_field_by_name("labels", ProtoValue::Map(labels));
    message
}

#[test]
fn messages_with_map_fields_compare_by_content() {
    let arena = Arena::new();
    let pool = resource_pool();
    for _ in 0..20 {
        let a = resource_with_labels(&pool, 16);
        let b = resource_with_labels(&pool, 16);
        assert_eq!(
            Value::create_message(Some(&a), &arena),
            Value::create_message(Some(&b), &arena)
        );
    }

    let fewer = resource_with_labels(&pool, 15);
    let full = resource_with_labels(&pool, 16);
    assert_ne!(
        Value::create_message(Some(&full), &arena),
        Value::create_message(Some(&fewer), &arena)
    );
}

#[test]
fn duration_message_becomes_duration() {
    let arena = Arena::new();
    let mut message = new_message("google.protobuf.Duration");
    message.set_field_by_name("seconds", ProtoValue::I64(-3));
    message.set_field_by_name("nanos", ProtoValue::I32(-500_000_000));

    let value = Value::create_message(Some(&message), &arena);
    assert_eq!(value.kind(), Kind::Duration);
    assert_eq!(value.duration_or_die(), TimeDelta::milliseconds(-3500));
}

#[test]
fn timestamp_message_becomes_timestamp() {
    let arena = Arena::new();
    let mut message = new_message("google.protobuf.Timestamp");
    message.set_field_by_name("seconds", ProtoValue::I64(1_700_000_000));
    message.set_field_by_name("nanos", ProtoValue::I32(42));

    let timestamp = Value::create_message(Some(&message), &arena).timestamp_or_die();
    assert_eq!(timestamp.timestamp(), 1_700_000_000);
    assert_eq!(timestamp.timestamp_subsec_nanos(), 42);
}

#[test]
fn invalid_timestamp_message_becomes_error() {
    let arena = Arena::new();
    let mut message = new_message("google.protobuf.Timestamp");
    message.set_field_by_name("nanos", ProtoValue::I32(-1));

    let value = Value::create_message(Some(&message), &arena);
    assert!(value.is_error());
    assert!(!is_unknown_value_error(&value));
}

#[test]
fn wrapper_messages_become_primitives() {
    let arena = Arena::new();

    let mut int64 = new_message("google.protobuf.Int64Value");
    int64.set_field_by_name("value", ProtoValue::I64(i64::MIN));
    assert_eq!(
        Value::create_message(Some(&int64), &arena).int64_or_die(),
        i64::MIN
    );

    let mut uint64 = new_message("google.protobuf.UInt64Value");
    uint64.set_field_by_name("value", ProtoValue::U64(u64::MAX));
    assert_eq!(
        Value::create_message(Some(&uint64), &arena).uint64_or_die(),
        u64::MAX
    );

    let mut double = new_message("google.protobuf.DoubleValue");
    double.set_field_by_name("value", ProtoValue::F64(2.5));
    assert_eq!(
        Value::create_message(Some(&double), &arena).double_or_die(),
        2.5
    );

    let mut boolean = new_message("google.protobuf.BoolValue");
    boolean.set_field_by_name("value", ProtoValue::Bool(true));
    assert!(Value::create_message(Some(&boolean), &arena).bool_or_die());
}

#[test]
fn string_and_bytes_wrappers_stay_distinct() {
    let arena = Arena::new();

    let mut text = new_message("google.protobuf.StringValue");
    text.set_field_by_name("value", ProtoValue::String("ab".to_string()));
    let mut bytes = new_message("google.protobuf.BytesValue");
    bytes.set_field_by_name("value", ProtoValue::Bytes(Bytes::from_static(b"ab")));

    let text = Value::create_message(Some(&text), &arena);
    let bytes = Value::create_message(Some(&bytes), &arena);
    assert_eq!(text.string_or_die().value(), "ab");
    assert_eq!(bytes.bytes_or_die().value(), b"ab");
    assert_ne!(text, bytes);
}

#[test]
fn json_value_members_become_matching_kinds() {
    let arena = Arena::new();

    let mut text = new_message("google.protobuf.Value");
    text.set_field_by_name("string_value", ProtoValue::String("cel".to_string()));
    assert_eq!(
        Value::create_message(Some(&text), &arena),
        Value::create_string_view("cel")
    );

    let mut flag = new_message("google.protobuf.Value");
    flag.set_field_by_name("bool_value", ProtoValue::Bool(true));
    assert_eq!(
        Value::create_message(Some(&flag), &arena),
        Value::create_bool(true)
    );

    let mut null = new_message("google.protobuf.Value");
    null.set_field_by_name("null_value", ProtoValue::EnumNumber(0));
    assert!(Value::create_message(Some(&null), &arena).is_null());
}

#[test]
fn empty_struct_becomes_empty_map() {
    let arena = Arena::new();
    let message = new_message("google.protobuf.Struct");
    let value = Value::create_message(Some(&message), &arena);
    assert!(value.is_map());
    assert_eq!(value.map_or_die().size(), 0);
    assert_eq!(value.to_string(), "{}");
}

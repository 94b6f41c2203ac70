//! Common test utilities for cel-core-value integration tests.

use std::panic::{self, AssertUnwindSafe};

use cel_core_value::{
    create_error_value, Arena, Kind, SliceList, SliceMap, StatusCode, UnknownSet, Value,
};
use prost_reflect::prost_types::field_descriptor_proto::{Label, Type};
use prost_reflect::prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, MessageOptions,
};
use prost_reflect::{DescriptorPool, DynamicMessage};

/// An empty message of a type from the well-known-type pool.
#[allow(dead_code)]
pub fn new_message(full_name: &str) -> DynamicMessage {
    let descriptor = DescriptorPool::global()
        .get_message_by_name(full_name)
        .unwrap_or_else(|| panic!("no message type '{}' in the global pool", full_name));
    DynamicMessage::new(descriptor)
}

fn field(name: &str, number: i32, label: Label, kind: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(kind as i32),
        json_name: Some(name.to_string()),
        ..Default::default()
    }
}

/// A pool holding `demo.Resource { map<string, int64> labels = 1; }`.
#[allow(dead_code)]
pub fn resource_pool() -> DescriptorPool {
    let entry = DescriptorProto {
        name: Some("LabelsEntry".to_string()),
        field: vec![
            field("key", 1, Label::Optional, Type::String),
            field("value", 2, Label::Optional, Type::Int64),
        ],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };
    let labels = FieldDescriptorProto {
        type_name: Some(".demo.Resource.LabelsEntry".to_string()),
        ..field("labels", 1, Label::Repeated, Type::Message)
    };
    let resource = DescriptorProto {
        name: Some("Resource".to_string()),
        field: vec![labels],
        nested_type: vec![entry],
        ..Default::default()
    };
    let file = FileDescriptorProto {
        name: Some("demo/resource.proto".to_string()),
        package: Some("demo".to_string()),
        message_type: vec![resource],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    };
    DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
        .expect("valid resource descriptors")
}

/// One value of every kind, in `Kind::VALUE_KINDS` order.
#[allow(dead_code)]
pub fn one_of_each<'a>(arena: &'a Arena, message: &'a DynamicMessage) -> Vec<Value<'a>> {
    let list = SliceList::new_in(arena, &[Value::create_int64(1)]);
    let map = SliceMap::new_in(arena, [(Value::create_int64(1), Value::create_bool(true))])
        .expect("valid map");
    let unknowns = UnknownSet::new_in(arena, ["request.user"]);
    vec![
        Value::create_bool(true),
        Value::create_int64(-1),
        Value::create_uint64(1),
        Value::create_double(0.5),
        Value::create_string_view(arena.alloc_str("text")),
        Value::create_bytes_view(arena.alloc_bytes(b"\x00\xff")),
        Value::create_message(Some(message), arena),
        Value::create_duration(chrono::TimeDelta::seconds(3)),
        Value::create_timestamp(chrono::DateTime::from_timestamp(0, 0).expect("epoch")),
        Value::create_list(Some(list)),
        Value::create_map(Some(map)),
        Value::create_unknown_set(Some(unknowns)),
        create_error_value(arena, "boom", StatusCode::Internal, 3),
    ]
}

/// Call the `*_or_die` accessor for `kind`, discarding the result.
#[allow(dead_code)]
pub fn call_or_die(value: &Value<'_>, kind: Kind) {
    match kind {
        Kind::Bool => {
            value.bool_or_die();
        }
        Kind::Int64 => {
            value.int64_or_die();
        }
        Kind::Uint64 => {
            value.uint64_or_die();
        }
        Kind::Double => {
            value.double_or_die();
        }
        Kind::String => {
            value.string_or_die();
        }
        Kind::Bytes => {
            value.bytes_or_die();
        }
        Kind::Message => {
            value.message_or_die();
        }
        Kind::Duration => {
            value.duration_or_die();
        }
        Kind::Timestamp => {
            value.timestamp_or_die();
        }
        Kind::List => {
            value.list_or_die();
        }
        Kind::Map => {
            value.map_or_die();
        }
        Kind::UnknownSet => {
            value.unknown_set_or_die();
        }
        Kind::Error => {
            value.error_or_die();
        }
        Kind::Any => panic!("Any is not a value kind"),
    }
}

/// Run `f` and return its panic message, or `None` if it returned normally.
#[allow(dead_code)]
pub fn panic_message<F: FnOnce()>(f: F) -> Option<String> {
    let payload = panic::catch_unwind(AssertUnwindSafe(f)).err()?;
    if let Some(message) = payload.downcast_ref::<String>() {
        return Some(message.clone());
    }
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
}

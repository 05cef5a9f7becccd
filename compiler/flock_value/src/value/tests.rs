use flock_ir::{DeviceId, FunctionId, SharedInterner};
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_type_names() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let field = Field::new(DeviceId::new(1), Value::Number(0.0))
        .unwrap_or_else(|e| panic!("{e}"));

    let cases = [
        (Value::Number(1.5), "number"),
        (Value::Bool(true), "bool"),
        (Value::string("hi"), "string"),
        (Value::tuple(vec![]), "tuple"),
        (
            Value::closure(FunctionId::new(0), vec![(x, Value::Bool(false))]),
            "closure",
        ),
        (Value::Field(field), "field"),
    ];
    for (value, name) in cases {
        assert_eq!(value.type_name(), name);
    }
}

#[test]
fn test_display() {
    let tuple = Value::tuple(vec![
        Value::Number(1.0),
        Value::Bool(false),
        Value::string("a"),
    ]);
    assert_eq!(tuple.to_string(), "[1, false, \"a\"]");
    assert_eq!(Value::Number(2.5).to_string(), "2.5");
}

#[test]
fn test_device_value() {
    assert_eq!(Value::device(DeviceId::new(7)), Value::Number(7.0));
}

#[test]
fn test_accessors() {
    assert_eq!(Value::Number(3.0).as_number(), Some(3.0));
    assert_eq!(Value::Bool(true).as_number(), None);
    assert_eq!(Value::Bool(true).as_bool(), Some(true));
    assert!(Value::string("x").as_field().is_none());
    assert!(!Value::Number(0.0).is_field());
}

#[test]
fn test_structural_equality_across_allocations() {
    assert_eq!(
        Value::tuple(vec![Value::Number(1.0)]),
        Value::tuple(vec![Value::Number(1.0)])
    );
    assert_ne!(Value::string("a"), Value::string("b"));
    assert_ne!(Value::Number(1.0), Value::Bool(true));
}

#[test]
fn test_bincode_roundtrip_keeps_nested_values() {
    let original = Value::tuple(vec![Value::string("rssi"), Value::Number(-42.0)]);
    let bytes = bincode::serialize(&original).unwrap_or_else(|e| panic!("{e}"));
    let back: Value = bincode::deserialize(&bytes).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(back, original);
}

#[test]
fn test_contains_field_looks_through_tuples_and_captures() {
    let interner = SharedInterner::new();
    let f = interner.intern("f");
    let field = Value::Field(
        Field::new(DeviceId::new(1), Value::Number(1.0)).unwrap_or_else(|e| panic!("{e}")),
    );

    assert!(field.contains_field());
    assert!(Value::tuple(vec![Value::Number(0.0), Value::tuple(vec![field.clone()])]).contains_field());
    assert!(Value::closure(FunctionId::new(0), vec![(f, field)]).contains_field());
    assert!(!Value::tuple(vec![Value::string("a"), Value::Bool(true)]).contains_field());
    assert!(!Value::Number(1.0).contains_field());
}

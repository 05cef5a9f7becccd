use flock_ir::SharedInterner;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_scope_define_lookup() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let mut scope = Scope::new();
    scope.define(x, Value::Number(42.0));
    assert_eq!(scope.lookup(x), Some(Value::Number(42.0)));
}

#[test]
fn test_block_frame_sees_enclosing_bindings() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let y = interner.intern("y");

    let mut env = Environment::new();
    env.define(x, Value::Number(1.0));
    env.push_scope();
    env.push_scope();
    env.define(y, Value::Number(2.0));

    assert_eq!(env.lookup(x), Some(Value::Number(1.0)));
    assert_eq!(env.lookup(y), Some(Value::Number(2.0)));
    assert_eq!(env.depth(), 3);
}

#[test]
fn test_block_inside_function_stops_at_function_frame() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let p = interner.intern("p");

    let mut env = Environment::new();
    env.define(x, Value::Number(1.0));
    env.push_function_scope();
    env.define(p, Value::Bool(true));
    env.push_scope();

    assert_eq!(env.lookup(p), Some(Value::Bool(true)));
    assert_eq!(env.lookup(x), None);
    assert_eq!(env.capture(), vec![(p, Value::Bool(true))]);
}

#[test]
fn test_environment_push_pop() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let y = interner.intern("y");

    let mut env = Environment::new();
    env.define(x, Value::Number(1.0));

    env.push_scope();
    env.define(x, Value::Number(2.0));
    env.define(y, Value::Bool(true));
    assert_eq!(env.lookup(x), Some(Value::Number(2.0)));
    assert_eq!(env.depth(), 2);

    env.pop_scope();
    assert_eq!(env.lookup(x), Some(Value::Number(1.0)));
    assert_eq!(env.lookup(y), None);
}

#[test]
fn test_function_scope_hides_caller_bindings() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let mut env = Environment::new();
    env.define(x, Value::Number(1.0));
    env.push_function_scope();
    assert_eq!(env.lookup(x), None);
    env.pop_scope();
    assert_eq!(env.lookup(x), Some(Value::Number(1.0)));
}

#[test]
fn test_top_level_frame_is_never_popped() {
    let mut env = Environment::new();
    env.pop_scope();
    env.pop_scope();
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_capture_prefers_inner_bindings_and_is_sorted() {
    let interner = SharedInterner::default();
    let b = interner.intern("b");
    let a = interner.intern("a");

    let mut env = Environment::new();
    env.define(a, Value::Number(1.0));
    env.define(b, Value::Number(1.0));
    env.push_scope();
    env.define(a, Value::Number(2.0));

    let captures = env.capture();
    assert_eq!(
        captures,
        vec![(b, Value::Number(1.0)), (a, Value::Number(2.0))]
    );
}

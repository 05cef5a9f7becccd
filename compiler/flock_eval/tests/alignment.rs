//! Multi-device rounds: neighbor alignment, state across rounds and the
//! device driver.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::sync::Arc;

use flock_eval::{
    run_round, run_rounds_parallel, Device, DeviceState, EvalErrorKind, EvalLimits, ExportTree,
    Field, OperatorRegistry, SharedExport, SharedRegistry, Value,
};
use flock_ir::{CodePath, Construct, DeviceId, PathEntry, PathTag, Program, ProgramBuilder};
use pretty_assertions::assert_eq;

fn id(n: u64) -> DeviceId {
    DeviceId::new(n)
}

fn swarm(program: Program, ids: &[u64]) -> Vec<Device> {
    let program = Arc::new(program);
    let registry = SharedRegistry::new(OperatorRegistry::builtin());
    ids.iter()
        .map(|&n| Device::new(id(n), Arc::clone(&program), registry.clone()))
        .collect()
}

/// Deliver every device's latest export to every other device.
fn exchange_all(devices: &mut [Device]) {
    let published: Vec<(DeviceId, SharedExport)> = devices
        .iter()
        .map(|d| (d.id(), d.export().clone()))
        .collect();
    for device in devices.iter_mut() {
        for (from, export) in &published {
            if *from != device.id() {
                device.receive(*from, export.clone());
            }
        }
    }
}

fn run_all(devices: &mut [Device]) -> Vec<Value> {
    devices
        .iter_mut()
        .map(|d| d.run_round().unwrap().root_value().cloned().unwrap())
        .collect()
}

fn field_keys(value: &Value) -> Vec<u64> {
    let field = value.as_field().unwrap();
    let mut keys: Vec<u64> = field.keys().map(DeviceId::raw).collect();
    keys.sort_unstable();
    keys
}

#[test]
fn nbr_gathers_neighbor_values() {
    let mut b = ProgramBuilder::new();
    let me = b.self_id();
    let root = b.nbr(me);
    let mut devices = swarm(b.finish(root).unwrap(), &[1, 2, 3]);

    // Nothing has been received yet: only the local entry.
    for value in run_all(&mut devices) {
        assert_eq!(value.as_field().unwrap().len(), 1);
    }

    exchange_all(&mut devices);
    let values = run_all(&mut devices);
    let field = values[0].as_field().unwrap();
    assert_eq!(field_keys(&values[0]), vec![1, 2, 3]);
    assert_eq!(field.get(id(2)), Some(&Value::Number(2.0)));
    assert_eq!(field.get(id(3)), Some(&Value::Number(3.0)));
}

#[test]
fn branches_partition_neighbors() {
    // if self < 3 { nbr(self) } else { nbr(self) }, with one shared node
    let mut b = ProgramBuilder::new();
    let me = b.self_id();
    let three = b.number(3.0);
    let cond = b.op("<", &[me, three]);
    let who = b.self_id();
    let share = b.nbr(who);
    let root = b.if_(cond, share, share);
    let mut devices = swarm(b.finish(root).unwrap(), &[1, 2, 3, 4]);

    run_all(&mut devices);
    exchange_all(&mut devices);
    let values = run_all(&mut devices);

    assert_eq!(field_keys(&values[0]), vec![1, 2]);
    assert_eq!(field_keys(&values[1]), vec![1, 2]);
    assert_eq!(field_keys(&values[2]), vec![3, 4]);
    assert_eq!(field_keys(&values[3]), vec![3, 4]);
}

#[test]
fn different_callees_at_one_site_do_not_align() {
    // Two closures over one shared `nbr(self)` node, picked per device and
    // applied from a single call site.
    let mut b = ProgramBuilder::new();
    let who = b.self_id();
    let share = b.nbr(who);
    let left = b.lambda(&[], share);
    let right = b.lambda(&[], share);
    let me = b.self_id();
    let limit = b.number(2.0);
    let cond = b.op("<", &[me, limit]);
    let choose = b.if_(cond, left, right);
    let bind = b.let_("f", choose);
    let f = b.ident("f");
    let call = b.call_value(f, &[]);
    let root = b.block(&[bind, call]);
    let mut devices = swarm(b.finish(root).unwrap(), &[1, 2, 3]);

    run_all(&mut devices);
    exchange_all(&mut devices);
    let values = run_all(&mut devices);

    assert_eq!(field_keys(&values[0]), vec![1]);
    assert_eq!(field_keys(&values[1]), vec![2, 3]);
    assert_eq!(field_keys(&values[2]), vec![2, 3]);
}

#[test]
fn lifted_operator_over_neighbor_field() {
    // nbr(self) * 10
    let mut b = ProgramBuilder::new();
    let me = b.self_id();
    let field = b.nbr(me);
    let ten = b.number(10.0);
    let root = b.op("*", &[field, ten]);
    let mut devices = swarm(b.finish(root).unwrap(), &[1, 2]);

    run_all(&mut devices);
    exchange_all(&mut devices);
    let values = run_all(&mut devices);
    let field = values[1].as_field().unwrap();
    assert_eq!(field.local(), id(2));
    assert_eq!(field.local_value(), &Value::Number(20.0));
    assert_eq!(field.get(id(1)), Some(&Value::Number(10.0)));
}

#[test]
fn rep_counts_rounds() {
    let mut b = ProgramBuilder::new();
    let zero = b.number(0.0);
    let n = b.ident("n");
    let one = b.number(1.0);
    let next = b.op("+", &[n, one]);
    let root = b.rep("n", zero, next);
    let mut devices = swarm(b.finish(root).unwrap(), &[1]);

    let counts: Vec<Value> = (0..4).map(|_| run_all(&mut devices).remove(0)).collect();
    assert_eq!(
        counts,
        vec![
            Value::Number(0.0),
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
        ]
    );
}

#[test]
fn rep_state_is_per_branch() {
    // if sense("up") { rep(n <- 0) n + 1 } else { rep(n <- 0) n + 1 }, one shared node
    let mut b = ProgramBuilder::new();
    let up = b.sense("up");
    let zero = b.number(0.0);
    let n = b.ident("n");
    let one = b.number(1.0);
    let next = b.op("+", &[n, one]);
    let counter = b.rep("n", zero, next);
    let root = b.if_(up, counter, counter);
    let mut devices = swarm(b.finish(root).unwrap(), &[1]);
    let device = &mut devices[0];

    device.set_sensor("up", Value::Bool(true));
    device.run_round().unwrap();
    device.run_round().unwrap();
    device.set_sensor("up", Value::Bool(false));
    let switched = device.run_round().unwrap();
    // The else arm has no prior state of its own.
    assert_eq!(switched.root_value(), Some(&Value::Number(0.0)));
}

#[test]
fn failed_round_keeps_prior_export() {
    // rep(n <- 0) { if sense("ok") { n + 1 } else { missing } }
    let mut b = ProgramBuilder::new();
    let zero = b.number(0.0);
    let ok = b.sense("ok");
    let n = b.ident("n");
    let one = b.number(1.0);
    let next = b.op("+", &[n, one]);
    let missing = b.ident("missing");
    let body = b.if_(ok, next, missing);
    let root = b.rep("n", zero, body);
    let mut devices = swarm(b.finish(root).unwrap(), &[5]);
    let device = &mut devices[0];

    device.set_sensor("ok", Value::Bool(true));
    device.run_round().unwrap();
    let before = device.run_round().unwrap();
    assert_eq!(before.root_value(), Some(&Value::Number(1.0)));

    device.set_sensor("ok", Value::Bool(false));
    let err = device.run_round().unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UnboundVariable { .. }));
    assert_eq!(device.export(), &before);

    device.set_sensor("ok", Value::Bool(true));
    let after = device.run_round().unwrap();
    assert_eq!(after.root_value(), Some(&Value::Number(2.0)));
}

#[test]
fn field_valued_neighbor_entry_is_excluded() {
    let mut b = ProgramBuilder::new();
    let one = b.number(1.0);
    let root = b.nbr(one);
    let program = b.finish(root).unwrap();

    let nbr_path: CodePath = [PathEntry::new(PathTag::new(Construct::Nbr, root), 0)]
        .into_iter()
        .collect();
    let mut good = ExportTree::new();
    good.insert(&nbr_path, Value::Number(1.0)).unwrap();
    let mut bad = ExportTree::new();
    let stray = Field::new(id(3), Value::Number(1.0)).unwrap();
    bad.insert(&nbr_path, Value::Field(stray)).unwrap();

    let mut state = DeviceState::new(id(1));
    state.neighbors = [
        (id(2), SharedExport::from(good)),
        (id(3), SharedExport::from(bad)),
    ]
    .into_iter()
    .collect();
    let tree = run_round(&program, &OperatorRegistry::builtin(), EvalLimits::default(), &state)
        .unwrap();
    assert_eq!(field_keys(tree.root_value().unwrap()), vec![1, 2]);
}

#[test]
fn forgotten_neighbor_leaves_the_field() {
    let mut b = ProgramBuilder::new();
    let me = b.self_id();
    let root = b.nbr(me);
    let mut devices = swarm(b.finish(root).unwrap(), &[1, 2]);

    run_all(&mut devices);
    exchange_all(&mut devices);
    devices[0].forget(id(2));
    let values = run_all(&mut devices);
    assert_eq!(field_keys(&values[0]), vec![1]);
    assert_eq!(field_keys(&values[1]), vec![1, 2]);
}

fn neighbor_and_counter() -> Program {
    let mut b = ProgramBuilder::new();
    let me = b.self_id();
    let shared = b.nbr(me);
    let zero = b.number(0.0);
    let n = b.ident("n");
    let one = b.number(1.0);
    let next = b.op("+", &[n, one]);
    let counter = b.rep("n", zero, next);
    let root = b.tuple(&[shared, counter]);
    b.finish(root).unwrap()
}

#[test]
fn rounds_are_deterministic() {
    let mut devices = swarm(neighbor_and_counter(), &[1, 2, 3]);
    run_all(&mut devices);
    exchange_all(&mut devices);

    let program = neighbor_and_counter();
    let registry = OperatorRegistry::builtin();
    let state = devices[2].state();
    let first = run_round(&program, &registry, EvalLimits::default(), state).unwrap();
    let second = run_round(&program, &registry, EvalLimits::default(), state).unwrap();
    assert_eq!(
        bincode::serialize(&first).unwrap(),
        bincode::serialize(&second).unwrap()
    );
    assert_eq!(first.len(), 3);
}

#[test]
fn parallel_rounds_match_sequential() {
    let build = || {
        let mut b = ProgramBuilder::new();
        let me = b.self_id();
        let field = b.nbr(me);
        let two = b.number(2.0);
        let root = b.op("+", &[field, two]);
        b.finish(root).unwrap()
    };
    let ids: Vec<u64> = (1..=8).collect();
    let mut parallel = swarm(build(), &ids);
    let mut sequential = swarm(build(), &ids);

    for _ in 0..3 {
        let par: Vec<SharedExport> = run_rounds_parallel(&mut parallel)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        let seq: Vec<SharedExport> = sequential
            .iter_mut()
            .map(|d| d.run_round().unwrap())
            .collect();
        assert_eq!(par, seq);
        exchange_all(&mut parallel);
        exchange_all(&mut sequential);
    }
}

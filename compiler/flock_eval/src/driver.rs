//! Round driver and device state.
//!
//! `run_round` is the whole evaluation contract: it takes a device's inputs
//! for one round and returns the export tree the round produced. `Device`
//! wraps that contract with the state a device keeps between rounds, and
//! `run_rounds_parallel` evaluates independent devices on the rayon pool.

use std::sync::Arc;

use flock_ir::{DeviceId, Program};
use flock_value::{EvalError, ExportTree, NeighborHistory, SharedExport, Value};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::context::ExecutionContext;
use crate::limits::EvalLimits;
use crate::registry::OperatorRegistry;
use crate::shared::SharedRegistry;

/// A device's inputs to one round.
#[derive(Clone, Debug)]
pub struct DeviceState {
    pub id: DeviceId,
    /// Export tree of the device's last completed round.
    pub prior: SharedExport,
    /// Latest export tree received from each neighbor.
    pub neighbors: NeighborHistory,
    /// Current sensor readings, by sensor name.
    pub sensors: FxHashMap<String, Value>,
}

impl DeviceState {
    /// State of a device that has not run a round yet.
    pub fn new(id: DeviceId) -> Self {
        DeviceState {
            id,
            prior: SharedExport::default(),
            neighbors: NeighborHistory::new(),
            sensors: FxHashMap::default(),
        }
    }
}

/// Evaluate one round of `program` for the device described by `state`.
///
/// The round's value is exported at the root path. On failure nothing is
/// published: `state` is only read, so the device's prior export and
/// neighbor history stay as they were.
#[tracing::instrument(level = "debug", skip_all, fields(device = %state.id))]
pub fn run_round(
    program: &Program,
    registry: &OperatorRegistry,
    limits: EvalLimits,
    state: &DeviceState,
) -> Result<ExportTree, EvalError> {
    let mut context = ExecutionContext::new(program, registry, limits, state);
    let outcome = context
        .eval(program.root())
        .and_then(|value| context.export(&value));
    match outcome {
        Ok(()) => {
            let exports = context.finish();
            tracing::debug!(exports = exports.len(), "round complete");
            Ok(exports)
        }
        Err(err) => {
            tracing::debug!(error = %err, "round failed");
            Err(err)
        }
    }
}

/// A device and the state it keeps between rounds.
pub struct Device {
    program: Arc<Program>,
    registry: SharedRegistry<OperatorRegistry>,
    limits: EvalLimits,
    state: DeviceState,
}

impl Device {
    pub fn new(
        id: DeviceId,
        program: Arc<Program>,
        registry: SharedRegistry<OperatorRegistry>,
    ) -> Self {
        Device {
            program,
            registry,
            limits: EvalLimits::default(),
            state: DeviceState::new(id),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    pub fn id(&self) -> DeviceId {
        self.state.id
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Export tree of the last completed round; empty before the first.
    pub fn export(&self) -> &SharedExport {
        &self.state.prior
    }

    pub fn neighbors(&self) -> &NeighborHistory {
        &self.state.neighbors
    }

    /// Swap in a new neighbor history snapshot.
    pub fn replace_neighbors(&mut self, history: NeighborHistory) {
        self.state.neighbors = history;
    }

    /// Record the latest export tree received from `neighbor`.
    pub fn receive(&mut self, neighbor: DeviceId, export: SharedExport) {
        self.state.neighbors = self.state.neighbors.with_neighbor(neighbor, export);
    }

    /// Drop `neighbor` from the history, e.g. when it leaves communication range.
    pub fn forget(&mut self, neighbor: DeviceId) {
        self.state.neighbors = self.state.neighbors.without_neighbor(neighbor);
    }

    pub fn set_sensor(&mut self, name: impl Into<String>, value: Value) {
        self.state.sensors.insert(name.into(), value);
    }

    /// Run one round. The prior export is replaced only if the round succeeds.
    pub fn run_round(&mut self) -> Result<SharedExport, EvalError> {
        let exports = run_round(&self.program, &self.registry, self.limits, &self.state)?;
        let exports = SharedExport::new(exports);
        self.state.prior = exports.clone();
        Ok(exports)
    }
}

/// Run one round on every device in parallel.
///
/// Devices share nothing mutable: each evaluates against its own state, so
/// results are the same as running them one after another.
pub fn run_rounds_parallel(devices: &mut [Device]) -> Vec<Result<SharedExport, EvalError>> {
    devices.par_iter_mut().map(Device::run_round).collect()
}

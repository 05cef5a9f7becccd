//! Neighbor field assembly for `nbr`.

use flock_ir::{CodePath, DeviceId};
use flock_value::{Field, FieldBuilder, Value};

/// Build the field of a `nbr` construct from the local value and the
/// neighbor values found at the same path.
///
/// A neighbor whose value cannot be a field entry is misaligned and left
/// out; the round goes on.
pub fn neighbor_field(
    mut builder: FieldBuilder,
    neighbors: Vec<(DeviceId, &Value)>,
    path: &CodePath,
) -> Field {
    for (neighbor, value) in neighbors {
        if let Err(err) = builder.neighbor(neighbor, value.clone()) {
            tracing::trace!(%neighbor, %path, error = %err, "excluding misaligned neighbor");
        }
    }
    builder.build()
}

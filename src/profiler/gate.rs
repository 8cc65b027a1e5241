use crate::profiler::{Instrumented, Marker, OperationKey, BASELINE_OPERATIONS};
use std::any::TypeId;
use std::collections::HashMap;

/// Per-type table of which operations are timed
///
/// Built once when a type is first wrapped. An operation is timed if its
/// declaration carries [`Marker::Profiled`], and the baseline identity
/// operations (`eq`, `hash`, `fmt`) are always timed whatever their marker.
#[derive(Debug, Clone)]
pub struct ProfiledCallGate {
    type_id: TypeId,
    type_name: &'static str,
    table: HashMap<&'static str, bool>,
    marked: usize,
}

impl ProfiledCallGate {
    /// Precomputes the gate for `T`
    pub fn for_type<T: Instrumented + ?Sized + 'static>() -> Self {
        let mut table = HashMap::new();
        let mut marked = 0;

        for operation in T::OPERATIONS {
            let profiled = operation.marker == Marker::Profiled;
            if profiled {
                marked += 1;
            }
            table.insert(operation.name, profiled);
        }

        for name in BASELINE_OPERATIONS {
            table.insert(*name, true);
        }

        Self {
            type_id: TypeId::of::<T>(),
            type_name: T::type_name(),
            table,
            marked,
        }
    }

    /// Name of the gated type, used as the first half of ledger keys
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Ledger key of one of the gated type's operations
    pub fn key(&self, operation: &'static str) -> OperationKey {
        OperationKey::new(self.type_id, self.type_name, operation)
    }

    /// Looks up an operation
    ///
    /// # Returns
    ///
    /// * `Some(true)` - The operation is timed
    /// * `Some(false)` - The operation is known but not timed
    /// * `None` - The type does not declare the operation
    pub fn lookup(&self, operation: &str) -> Option<bool> {
        self.table.get(operation).copied()
    }

    pub fn is_profiled(&self, operation: &str) -> bool {
        self.lookup(operation).unwrap_or(false)
    }

    /// Returns true if at least one declared operation carries the marker
    ///
    /// Baseline operations do not count.
    pub fn has_marked_operations(&self) -> bool {
        self.marked > 0
    }
}

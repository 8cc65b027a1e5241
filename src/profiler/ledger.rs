use crate::profiler::Instrumented;
use dashmap::DashMap;
use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Identifies a timed operation: the wrapped type and the operation name
///
/// Types are told apart by `TypeId`; the name is only used for display and
/// ordering, so two types sharing a display name still get separate totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
    pub type_name: &'static str,
    pub operation: &'static str,
    type_id: TypeId,
}

impl OperationKey {
    /// Key of `operation` on the instrumented type `T`
    pub fn of<T: Instrumented + ?Sized + 'static>(operation: &'static str) -> Self {
        Self::new(TypeId::of::<T>(), T::type_name(), operation)
    }

    pub fn new(type_id: TypeId, type_name: &'static str, operation: &'static str) -> Self {
        Self {
            type_name,
            operation,
            type_id,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.operation)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    elapsed: Duration,
    samples: u64,
}

/// Cumulative time spent per operation
///
/// Safe to share between any number of interceptors and threads; each
/// `record` is a single atomic upsert on the key's shard.
#[derive(Debug, Default)]
pub struct TimingLedger {
    totals: DashMap<OperationKey, Totals>,
}

impl TimingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sample to the running total of `key`
    pub fn record(&self, key: OperationKey, elapsed: Duration) {
        let mut totals = self.totals.entry(key).or_default();
        totals.elapsed += elapsed;
        totals.samples += 1;
    }

    /// Cumulative duration of one key, if it was ever recorded
    pub fn total(&self, key: &OperationKey) -> Option<Duration> {
        self.totals.get(key).map(|totals| totals.elapsed)
    }

    /// Number of samples recorded for one key
    pub fn samples(&self, key: &OperationKey) -> u64 {
        self.totals.get(key).map_or(0, |totals| totals.samples)
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Copies every key's cumulative duration, ordered by key
    pub fn snapshot(&self) -> BTreeMap<OperationKey, Duration> {
        self.totals
            .iter()
            .map(|entry| (*entry.key(), entry.value().elapsed))
            .collect()
    }
}

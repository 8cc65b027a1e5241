//! Call-timing instrumentation
//!
//! Types opt in by implementing [`Instrumented`], a static table of their
//! operations and which of them carry the profiling marker. [`Profiler::wrap`]
//! turns a value into a [`TimingInterceptor`] that times the marked
//! operations into a shared [`TimingLedger`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wordcrawl::profiler::{Instrumented, Operation, Profiler};
//! use wordcrawl::SystemClock;
//!
//! struct Indexer;
//!
//! impl Indexer {
//!     fn build(&self) -> usize {
//!         42
//!     }
//! }
//!
//! impl Instrumented for Indexer {
//!     const OPERATIONS: &'static [Operation] = &[Operation::profiled("build")];
//! }
//!
//! let profiler = Profiler::new(Arc::new(SystemClock));
//! let indexer = profiler.wrap(Indexer).unwrap();
//! assert_eq!(indexer.call("build", |i| i.build()).unwrap(), 42);
//! assert!(!profiler.ledger().is_empty());
//! ```

mod gate;
mod interceptor;
mod ledger;
mod report;

pub use gate::ProfiledCallGate;
pub use interceptor::TimingInterceptor;
pub use ledger::{OperationKey, TimingLedger};
pub use report::write_report;

use crate::clock::Clock;
use crate::ProfilerError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::any::TypeId;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Operations every value has, timed whether or not they are marked
pub const BASELINE_OPERATIONS: &[&str] = &["eq", "hash", "fmt"];

/// Whether an operation's declaration carries the profiling marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Profiled,
    Unmarked,
}

/// Declaration of one operation of an instrumented type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub marker: Marker,
}

impl Operation {
    pub const fn profiled(name: &'static str) -> Self {
        Self {
            name,
            marker: Marker::Profiled,
        }
    }

    pub const fn unmarked(name: &'static str) -> Self {
        Self {
            name,
            marker: Marker::Unmarked,
        }
    }
}

/// A type whose operations can be timed
pub trait Instrumented {
    /// Every operation callable through an interceptor
    const OPERATIONS: &'static [Operation];

    /// Name used in ledger keys
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Wraps values for timing and owns the shared ledger
pub struct Profiler {
    clock: Arc<dyn Clock>,
    ledger: Arc<TimingLedger>,
    started_at: DateTime<Utc>,
    gates: DashMap<TypeId, Arc<ProfiledCallGate>>,
}

impl Profiler {
    /// Creates a profiler; its run starts now
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            clock,
            ledger: Arc::new(TimingLedger::new()),
            started_at,
            gates: DashMap::new(),
        }
    }

    /// Wraps `target` so its marked operations are timed
    ///
    /// The gate for `T` is computed on the first wrap and reused afterwards.
    ///
    /// # Returns
    ///
    /// * `Ok(TimingInterceptor<T>)` - The wrapped value
    /// * `Err(ProfilerError::NoProfiledOperations)` - `T` marks nothing
    pub fn wrap<T: Instrumented + 'static>(
        &self,
        target: T,
    ) -> Result<TimingInterceptor<T>, ProfilerError> {
        let gate = Arc::clone(
            self.gates
                .entry(TypeId::of::<T>())
                .or_insert_with(|| Arc::new(ProfiledCallGate::for_type::<T>()))
                .value(),
        );

        if !gate.has_marked_operations() {
            return Err(ProfilerError::NoProfiledOperations {
                type_name: gate.type_name(),
            });
        }

        tracing::debug!("Profiling {}", gate.type_name());

        Ok(TimingInterceptor::new(
            target,
            gate,
            Arc::clone(&self.clock),
            Arc::clone(&self.ledger),
        ))
    }

    pub fn ledger(&self) -> &Arc<TimingLedger> {
        &self.ledger
    }

    /// Writes the report of this run to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_report(writer, self.started_at, &self.ledger.snapshot())
    }

    /// Appends the report of this run to the file at `path`
    pub fn write_data(&self, path: &Path) -> Result<(), ProfilerError> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        self.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }
}

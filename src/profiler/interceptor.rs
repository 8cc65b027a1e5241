use crate::clock::Clock;
use crate::parser::{PageSource, ParsedPage};
use crate::profiler::{Instrumented, OperationKey, ProfiledCallGate, TimingLedger};
use crate::{CrawlError, ProfilerError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Transparent timing wrapper around one target object
///
/// Calls go through [`TimingInterceptor::call`] (or `call_async`) with the
/// operation's name. The target's result, success or failure, is handed back
/// untouched; the only error the interceptor adds is
/// [`ProfilerError::Dispatch`] for operations the target never declared.
pub struct TimingInterceptor<T> {
    target: T,
    gate: Arc<ProfiledCallGate>,
    clock: Arc<dyn Clock>,
    ledger: Arc<TimingLedger>,
}

/// Pending timing sample; recorded when dropped, so unwinding still counts
struct Sample<'a> {
    clock: &'a dyn Clock,
    ledger: &'a TimingLedger,
    key: OperationKey,
    profiled: bool,
    start: DateTime<Utc>,
}

impl Drop for Sample<'_> {
    fn drop(&mut self) {
        if !self.profiled {
            return;
        }
        let elapsed = (self.clock.now() - self.start)
            .to_std()
            .unwrap_or_default();
        self.ledger.record(self.key, elapsed);
    }
}

impl<T> TimingInterceptor<T> {
    pub(crate) fn new(
        target: T,
        gate: Arc<ProfiledCallGate>,
        clock: Arc<dyn Clock>,
        ledger: Arc<TimingLedger>,
    ) -> Self {
        Self {
            target,
            gate,
            clock,
            ledger,
        }
    }

    /// The wrapped value, for calls that bypass timing entirely
    pub fn get_ref(&self) -> &T {
        &self.target
    }

    /// Invokes `operation` on the target
    ///
    /// # Returns
    ///
    /// * `Ok(R)` - Whatever `f` returned, including the target's own errors
    /// * `Err(ProfilerError::Dispatch)` - `operation` is not declared by the target
    pub fn call<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R, ProfilerError> {
        let _sample = self.begin(operation)?;
        Ok(f(&self.target))
    }

    /// Like [`call`](Self::call), for operations returning a future
    ///
    /// The sample spans until the future completes.
    pub async fn call_async<'a, R, F, Fut>(
        &'a self,
        operation: &'static str,
        f: F,
    ) -> Result<R, ProfilerError>
    where
        F: FnOnce(&'a T) -> Fut,
        Fut: Future<Output = R>,
    {
        let _sample = self.begin(operation)?;
        Ok(f(&self.target).await)
    }

    fn begin(&self, operation: &'static str) -> Result<Sample<'_>, ProfilerError> {
        let profiled = self
            .gate
            .lookup(operation)
            .ok_or(ProfilerError::Dispatch {
                type_name: self.gate.type_name(),
                operation,
            })?;
        Ok(self.sample(operation, profiled))
    }

    /// Baseline operations are always declared, so they cannot fail dispatch
    fn baseline<R>(&self, operation: &'static str, f: impl FnOnce(&T) -> R) -> R {
        let _sample = self.sample(operation, self.gate.is_profiled(operation));
        f(&self.target)
    }

    fn sample(&self, operation: &'static str, profiled: bool) -> Sample<'_> {
        Sample {
            clock: self.clock.as_ref(),
            ledger: self.ledger.as_ref(),
            key: self.gate.key(operation),
            profiled,
            start: self.clock.now(),
        }
    }
}

impl<T: PartialEq> PartialEq for TimingInterceptor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.baseline("eq", |target| *target == other.target)
    }
}

impl<T: Hash> Hash for TimingInterceptor<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.baseline("hash", |target| target.hash(state))
    }
}

impl<T: fmt::Display> fmt::Display for TimingInterceptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.baseline("fmt", |target| fmt::Display::fmt(target, f))
    }
}

impl<T: fmt::Debug> fmt::Debug for TimingInterceptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimingInterceptor")
            .field("target", &self.target)
            .field("type_name", &self.gate.type_name())
            .finish()
    }
}

#[async_trait]
impl<S> PageSource for TimingInterceptor<S>
where
    S: PageSource + Instrumented,
{
    async fn parse(&self, url: &str) -> crate::Result<ParsedPage> {
        self.call_async("parse", |source| source.parse(url))
            .await
            .map_err(|e| CrawlError::Internal(e.to_string()))?
    }
}

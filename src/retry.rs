//! The execution decorator: eager or retrying, always restoring.
//!
//! This is the engine behind every chained call. Given an
//! [`Execution`](crate::Execution), a [`Context`], and a [`Mode`], it either
//! runs the execution exactly once (eager) or polls it against a deadline
//! (retrying), and on unrecoverable failure raises a [`ChainError`] carrying
//! the full call-chain text.
//!
//! Retrying mode also swaps the driver's session-wide implicit-wait timeout
//! to the caller's budget for the duration of the attempt loop, so nested
//! lookups inside the execution are bounded by the same budget. That shared
//! setting is the one piece of mutable state this crate touches, and it is
//! managed as a scoped resource: [`decorate_execution`] acquires it before
//! the first attempt and restores it on *every* exit path - success, budget
//! exhausted, non-transient failure, even a panic inside the execution.
//!
//! # Retry policy
//!
//! Only failures the driver classifies as transient are retried, and only
//! while the deadline has not passed. The loop does not sleep between
//! attempts: the driver's own implicit wait already consumes time up to the
//! budget per attempt, so the outer loop exists to re-attempt after that
//! bounded wait expires without success (for example, to re-locate an
//! element that detached and reattached). A successful result is never
//! retried, whatever its value - conditional polling on values belongs to
//! assertion layers above this crate.
//!
//! # Examples
//!
//! ```
//! use slackwater::{decorate_execution, Context, DriverError, Mode, Period};
//! use slackwater::testing::FakeDriver;
//!
//! let driver = FakeDriver::new();
//! let ctx = Context::root().singular("click");
//!
//! let err = decorate_execution(
//!     &driver,
//!     &|| Err::<(), _>(DriverError::not_found("still rendering")),
//!     &ctx,
//!     Mode::Retrying(Period::millis(0)),
//! )
//! .unwrap_err();
//!
//! assert_eq!(err.chain(), "click()");
//! // The implicit wait was set to the budget, then restored to zero.
//! assert_eq!(driver.wait_calls().len(), 2);
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::context::{ChainError, Context};
use crate::driver::Driver;
use crate::execution::Execution;
use crate::period::Period;

/// How the decorator runs an execution.
///
/// A single handle type carries this flag instead of splitting into an
/// eager subtype and a retrying subtype; both modes satisfy the same
/// contract and differ only in what the decorator does with failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One attempt; any failure surfaces immediately.
    Eager,
    /// Poll until success or the budget elapses.
    Retrying(Period),
}

impl Mode {
    /// The mode implied by an optional budget: `None` is eager,
    /// `Some(period)` retries within that period.
    pub fn from_period(period: Option<Period>) -> Self {
        match period {
            Some(p) => Mode::Retrying(p),
            None => Mode::Eager,
        }
    }

    /// True for the retrying variant.
    pub fn is_retrying(&self) -> bool {
        matches!(self, Mode::Retrying(_))
    }
}

/// Scoped hold on the driver's shared implicit-wait setting.
///
/// Acquiring sets the timeout to the retry budget; dropping restores it to
/// zero. Restoration rides on `Drop` so that no exit path - early return,
/// `?`, panic - can leak the budget into unrelated later calls. A failed
/// restore cannot be propagated from `Drop`, so it is logged instead.
struct TimeoutGuard<'d> {
    driver: &'d dyn Driver,
}

impl<'d> TimeoutGuard<'d> {
    fn acquire(driver: &'d dyn Driver, budget: Duration) -> Result<Self, crate::DriverError> {
        driver.set_implicit_wait(budget)?;
        Ok(TimeoutGuard { driver })
    }
}

impl Drop for TimeoutGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.driver.set_implicit_wait(Duration::ZERO) {
            warn!(error = %err, "failed to restore implicit-wait timeout");
        }
    }
}

/// Run an execution under the given mode, decorating any surfaced failure
/// with the call-chain context.
///
/// # Eager mode
///
/// The execution runs exactly once. A failure - transient or not - is
/// immediately wrapped with the chain and returned; the shared timeout is
/// never touched.
///
/// # Retrying mode
///
/// The implicit-wait timeout is set to the budget, a deadline is computed,
/// and the execution is attempted in a loop:
///
/// - success returns the value;
/// - a transient failure before the deadline is discarded and re-attempted;
/// - a transient failure at or past the deadline surfaces decorated (the
///   budget is exhausted);
/// - a non-transient failure surfaces decorated immediately, since retrying
///   cannot make it succeed.
///
/// On every one of those exits the timeout is restored to zero exactly once.
/// A zero-length budget therefore behaves like eager mode plus the
/// set/restore side effect: one attempt, then surface.
pub fn decorate_execution<T, E>(
    driver: &dyn Driver,
    execution: &E,
    context: &Context,
    mode: Mode,
) -> Result<T, ChainError>
where
    E: Execution<T> + ?Sized,
{
    match mode {
        Mode::Eager => execution.attempt().map_err(|err| context.decorate(err)),
        Mode::Retrying(period) => {
            let budget = period.as_duration();
            let _guard = TimeoutGuard::acquire(driver, budget)
                .map_err(|err| context.decorate(err))?;
            let deadline = Instant::now() + budget;
            let mut attempts = 0u32;

            loop {
                attempts += 1;
                match execution.attempt() {
                    Ok(value) => {
                        trace!(attempts, "execution succeeded");
                        return Ok(value);
                    }
                    Err(err) if err.is_transient() && Instant::now() < deadline => {
                        debug!(attempts, error = %err, "transient failure, retrying");
                    }
                    Err(err) => {
                        debug!(
                            attempts,
                            transient = err.is_transient(),
                            error = %err,
                            "giving up"
                        );
                        return Err(context.decorate(err));
                    }
                }
            }
        }
    }
}

//! The capability abstraction for one primitive driver action.
//!
//! An [`Execution`] is "a zero-argument operation that produces a `T` or
//! fails with a [`DriverError`]". Fluent handles build one per chained call,
//! closing over the current element and the call's arguments, and hand it to
//! the execution decorator - which may run it once or many times, so the
//! trait takes `&self` and stays callable across attempts.
//!
//! Any `Fn() -> Result<T, DriverError>` closure is an execution:
//!
//! ```
//! use slackwater::{DriverError, Execution};
//!
//! let read = || Ok::<_, DriverError>("hello".to_string());
//! assert_eq!(read.attempt().unwrap(), "hello");
//! ```

use crate::driver::DriverError;

/// One primitive driver action, re-attemptable by the retry engine.
pub trait Execution<T> {
    /// Perform the action once.
    fn attempt(&self) -> Result<T, DriverError>;
}

impl<T, F> Execution<T> for F
where
    F: Fn() -> Result<T, DriverError>,
{
    fn attempt(&self) -> Result<T, DriverError> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_closure_is_an_execution() {
        let exec = || Ok::<_, DriverError>(7);
        assert_eq!(exec.attempt().unwrap(), 7);
    }

    #[test]
    fn test_execution_is_reattemptable() {
        let count = AtomicU32::new(0);
        let exec = || {
            count.fetch_add(1, Ordering::SeqCst);
            Ok::<_, DriverError>(())
        };

        exec.attempt().unwrap();
        exec.attempt().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_boxed_execution_dispatches() {
        let exec: Box<dyn Execution<i32>> = Box::new(|| Ok(41));
        assert_eq!(exec.attempt().unwrap(), 41);
    }
}

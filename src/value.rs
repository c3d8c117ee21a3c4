//! Lazily-evaluated values retrieved from the page.
//!
//! A [`DeferredValue`] pairs a retrieved (or not-yet-retrieved) value with
//! the [`Context`] of the fluent chain that produced it, so that whatever a
//! caller later does with the value can still report the full chain when it
//! goes wrong.
//!
//! Two shapes exist behind one type:
//!
//! - **computed** - the value was fetched eagerly at call time ("read what's
//!   there right now"); [`resolve`](DeferredValue::resolve) just hands it
//!   over.
//! - **pending** - the read was deferred; resolving runs the captured
//!   execution through the retry engine with whatever mode the originating
//!   handle had, so `el.within(p).text()` retries on a page that is still
//!   rendering.

use std::fmt;
use std::sync::Arc;

use crate::context::{ChainError, Context};
use crate::driver::Driver;
use crate::execution::Execution;
use crate::period::Period;
use crate::retry::{decorate_execution, Mode};

enum State<T> {
    Computed(T),
    Pending {
        driver: Arc<dyn Driver>,
        execution: Box<dyn Execution<T>>,
    },
}

/// A retrieved value (or a recipe for retrieving one) plus the call chain
/// that led to it.
///
/// # Examples
///
/// ```
/// use slackwater::prelude::*;
/// use slackwater::testing::{FakeDriver, FakeElement};
/// use std::sync::Arc;
///
/// let driver = Arc::new(FakeDriver::new());
/// driver.bind(
///     &Selector::id("title"),
///     Arc::new(FakeElement::new().with_text("Tide tables")),
/// );
///
/// let title = FluentDriver::new(driver)
///     .find_element(Selector::id("title"))
///     .unwrap()
///     .text();
///
/// assert!(!title.is_resolved());
/// assert_eq!(title.resolve().unwrap(), "Tide tables");
/// ```
pub struct DeferredValue<T> {
    state: State<T>,
    context: Context,
    period: Option<Period>,
}

impl<T> DeferredValue<T> {
    /// A value that was already fetched; resolving cannot fail.
    pub(crate) fn computed(value: T, context: Context) -> Self {
        DeferredValue {
            state: State::Computed(value),
            context,
            period: None,
        }
    }

    /// A read deferred until [`resolve`](DeferredValue::resolve), evaluated
    /// with the originating handle's mode.
    pub(crate) fn pending(
        driver: Arc<dyn Driver>,
        execution: Box<dyn Execution<T>>,
        context: Context,
        period: Option<Period>,
    ) -> Self {
        DeferredValue {
            state: State::Pending { driver, execution },
            context,
            period,
        }
    }

    /// True when the value was fetched eagerly and is already in hand.
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, State::Computed(_))
    }

    /// The call chain that produced this value.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Produce the value.
    ///
    /// A computed value is returned as-is. A pending read runs through the
    /// retry engine with the mode captured at creation; any failure is a
    /// [`ChainError`] carrying the chain text.
    pub fn resolve(self) -> Result<T, ChainError> {
        match self.state {
            State::Computed(value) => Ok(value),
            State::Pending { driver, execution } => decorate_execution(
                &*driver,
                &*execution,
                &self.context,
                Mode::from_period(self.period),
            ),
        }
    }
}

// Boxed executions are opaque; render the state tag and the chain instead
// of deriving.
impl<T: fmt::Debug> fmt::Debug for DeferredValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Computed(value) => format!("Computed({:?})", value),
            State::Pending { .. } => "Pending".to_string(),
        };
        f.debug_struct("DeferredValue")
            .field("state", &state)
            .field("context", &self.context.render())
            .finish()
    }
}

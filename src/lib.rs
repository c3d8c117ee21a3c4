//! # Slackwater
//!
//! > *Slack water: the brief calm while the tide turns.*
//!
//! A fluent, self-retrying overlay for browser-automation drivers.
//!
//! ## Philosophy
//!
//! Pages render asynchronously; automation scripts are written as if they
//! don't. **Slackwater** closes that gap at the call site instead of with
//! scattered sleeps:
//!
//! - **Eager by default** - every chained call makes exactly one attempt.
//! - **Patient on request** - `within(period)` turns the chain retrying:
//!   transient failures (element not there yet, not interactable yet, gone
//!   stale) are re-attempted until the budget elapses.
//! - **Loud on failure** - whatever finally fails carries the whole fluent
//!   call chain as its message, with the driver's original error preserved
//!   as the cause.
//!
//! ## Quick Example
//!
//! ```
//! use slackwater::prelude::*;
//! use slackwater::testing::{FakeDriver, FakeElement};
//! use std::sync::Arc;
//!
//! let driver = Arc::new(FakeDriver::new());
//! driver.bind(
//!     &Selector::id("search"),
//!     Arc::new(FakeElement::new().with_tag("input")),
//! );
//!
//! let browser = FluentDriver::new(driver);
//! let result = browser
//!     .within(Period::secs(5))
//!     .find_element(Selector::id("search"))
//!     .and_then(|el| el.send_keys("tide tables"))
//!     .and_then(|el| el.submit());
//!
//! assert!(result.is_ok());
//! ```
//!
//! When a chain fails, the error reads as the chain itself:
//!
//! ```
//! use slackwater::prelude::*;
//! use slackwater::testing::FakeDriver;
//! use std::sync::Arc;
//!
//! let browser = FluentDriver::new(Arc::new(FakeDriver::new()));
//! let err = browser
//!     .within(Period::millis(0))
//!     .find_element(Selector::id("missing"))
//!     .unwrap_err();
//!
//! assert_eq!(
//!     err.to_string(),
//!     "within(0 millis).find_element(id: missing) \
//!      -> element not found: no element matches id: missing"
//! );
//! ```
//!
//! The driver itself is out of scope: anything implementing the two traits
//! in [`driver`] can sit underneath, from a real WebDriver client to the
//! scriptable fakes in [`testing`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod context;
pub mod driver;
pub mod execution;
pub mod fluent;
pub mod period;
pub mod retry;
pub mod testing;
pub mod value;

// Re-exports
pub use context::{ChainError, Context};
pub use driver::{Dimension, Driver, DriverError, Element, ElementRef, ErrorKind, Point, Selector};
pub use execution::Execution;
pub use fluent::{FluentDriver, FluentElement};
pub use period::{Period, TimeUnit};
pub use retry::{decorate_execution, Mode};
pub use value::DeferredValue;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{ChainError, Context};
    pub use crate::driver::{
        Dimension, Driver, DriverError, Element, ElementRef, ErrorKind, Point, Selector,
    };
    pub use crate::execution::Execution;
    pub use crate::fluent::{FluentDriver, FluentElement};
    pub use crate::period::{Period, TimeUnit};
    pub use crate::retry::{decorate_execution, Mode};
    pub use crate::value::DeferredValue;
}

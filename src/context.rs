//! Call-chain context and chain-decorated errors.
//!
//! Every fluent call allocates a [`Context`] node pointing back at the
//! context of the handle it was called on. When something ultimately fails,
//! the whole chain renders as one line that reads like the sequence of calls
//! a human wrote - `find_element(id: login).within(5 seconds).click()` -
//! instead of a bare driver error from the last failing step.
//!
//! # Examples
//!
//! ```
//! use slackwater::Context;
//!
//! let root = Context::root();
//! let found = root.singular_full("find_element", Some("id: login".into()), None);
//! let clicked = found.singular("click");
//!
//! assert_eq!(clicked.render(), "find_element(id: login).click()");
//! ```
//!
//! ## Decorating a failure
//!
//! ```
//! use slackwater::{Context, DriverError};
//!
//! let ctx = Context::root().singular("click");
//! let err = ctx.decorate(DriverError::not_interactable("obscured"));
//!
//! assert_eq!(err.chain(), "click()");
//! assert!(err.cause().is_transient());
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::driver::DriverError;

/// One recorded fluent call: operation name plus optional locator and
/// argument descriptions, linked backward to its parent.
///
/// Parent linkage is an owned `Arc` reference and only ever points toward
/// the root, so a chain is acyclic and finite by construction.
#[derive(Debug)]
struct Frame {
    parent: Option<Arc<Frame>>,
    op: String,
    locator: Option<String>,
    argument: Option<String>,
}

/// The immutable record of the fluent calls made so far.
///
/// Contexts are cheap to clone (a single `Arc` bump) and never mutated:
/// each chained call produces a *child* context, leaving the parent - and
/// any siblings derived from it - untouched.
#[derive(Debug, Clone, Default)]
pub struct Context {
    node: Option<Arc<Frame>>,
}

impl Context {
    /// The empty chain, before any fluent call has been made.
    pub fn root() -> Self {
        Context { node: None }
    }

    /// Record a call with no locator or argument annotation.
    pub fn singular(&self, op: impl Into<String>) -> Self {
        self.singular_full(op, None, None)
    }

    /// Record a call, optionally annotated with a locator description
    /// (how the target was addressed) and an argument description (what was
    /// passed). Absent is distinct from empty: `None` renders nothing,
    /// `Some("")` renders an empty annotation.
    pub fn singular_full(
        &self,
        op: impl Into<String>,
        locator: Option<String>,
        argument: Option<String>,
    ) -> Self {
        Context {
            node: Some(Arc::new(Frame {
                parent: self.node.clone(),
                op: op.into(),
                locator,
                argument,
            })),
        }
    }

    /// True before any call has been recorded.
    pub fn is_root(&self) -> bool {
        self.node.is_none()
    }

    /// Number of calls recorded so far.
    pub fn len(&self) -> usize {
        let mut n = 0;
        let mut cursor = self.node.as_deref();
        while let Some(frame) = cursor {
            n += 1;
            cursor = frame.parent.as_deref();
        }
        n
    }

    /// True when no calls have been recorded.
    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// Render the full chain, root first, as the fluent call sequence.
    pub fn render(&self) -> String {
        let mut frames = Vec::new();
        let mut cursor = self.node.as_deref();
        while let Some(frame) = cursor {
            frames.push(frame);
            cursor = frame.parent.as_deref();
        }

        let mut out = String::new();
        for frame in frames.iter().rev() {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(&frame.op);
            out.push('(');
            match (&frame.locator, &frame.argument) {
                (Some(locator), Some(argument)) => {
                    out.push_str(locator);
                    out.push_str(", ");
                    out.push_str(argument);
                }
                (Some(locator), None) => out.push_str(locator),
                (None, Some(argument)) => out.push_str(argument),
                (None, None) => {}
            }
            out.push(')');
        }
        out
    }

    /// Wrap a driver failure together with this chain's rendered text.
    ///
    /// The original failure is preserved as the cause - never discarded,
    /// never flattened into the message and dropped.
    pub fn decorate(&self, cause: DriverError) -> ChainError {
        ChainError {
            chain: self.render(),
            cause,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A failure decorated with the fluent call chain that led to it.
///
/// This is the one failure shape surfaced to callers: budget-exhausted
/// retries, first-attempt eager failures, and non-transient short-circuits
/// all arrive here. The chain text is the primary diagnostic surface; the
/// underlying [`DriverError`] stays reachable through [`cause`] and
/// [`std::error::Error::source`].
///
/// [`cause`]: ChainError::cause
///
/// # Examples
///
/// ```
/// use slackwater::{Context, DriverError};
///
/// let ctx = Context::root()
///     .singular_full("find_element", Some("id: login".into()), None)
///     .singular("click");
/// let err = ctx.decorate(DriverError::not_found("gone"));
///
/// assert_eq!(
///     err.to_string(),
///     "find_element(id: login).click() -> element not found: gone"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainError {
    chain: String,
    cause: DriverError,
}

impl ChainError {
    /// The rendered call chain.
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// The underlying driver failure.
    pub fn cause(&self) -> &DriverError {
        &self.cause
    }

    /// Consume the error, returning the underlying driver failure.
    pub fn into_cause(self) -> DriverError {
        self.cause
    }

    /// True if the underlying failure was classified transient - i.e. this
    /// error represents an exhausted retry budget rather than a programming
    /// error.
    pub fn is_transient(&self) -> bool {
        self.cause.is_transient()
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chain.is_empty() {
            write!(f, "{}", self.cause)
        } else {
            write!(f, "{} -> {}", self.chain, self.cause)
        }
    }
}

impl StdError for ChainError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.cause)
    }
}

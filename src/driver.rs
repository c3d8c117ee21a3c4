//! The driver boundary: traits and value types for the underlying
//! browser-automation backend.
//!
//! Slackwater does not talk to a browser itself. It wraps *some* driver -
//! a WebDriver client, a CDP adapter, a fake - behind the [`Driver`] and
//! [`Element`] traits, and only asks three things of it:
//!
//! 1. it can locate elements by a [`Selector`],
//! 2. every primitive operation reports failure as a [`DriverError`] whose
//!    [`ErrorKind`] classifies it as transient or not,
//! 3. it exposes the session-wide implicit-wait timeout so the retry engine
//!    can bound nested lookups to the caller's budget.
//!
//! The classification set is closed on purpose: the retry engine branches on
//! an explicit match over these kinds, never on downcasting or string
//! inspection.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A locator expression handed to the driver.
///
/// Construction of anything fancier than these variants belongs to the
/// backend; slackwater only needs a value it can pass through and describe
/// in diagnostics.
///
/// # Examples
///
/// ```
/// use slackwater::Selector;
///
/// assert_eq!(Selector::id("login").to_string(), "id: login");
/// assert_eq!(Selector::css(".toolbar > button").to_string(), "css: .toolbar > button");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Match by `id` attribute.
    Id(String),
    /// Match by `name` attribute.
    Name(String),
    /// Match by CSS selector expression.
    Css(String),
    /// Match by XPath expression.
    XPath(String),
    /// Match an anchor by its exact link text.
    LinkText(String),
    /// Match by tag name.
    TagName(String),
    /// Match by class name.
    ClassName(String),
}

impl Selector {
    /// Locator matching by `id` attribute.
    pub fn id(value: impl Into<String>) -> Self {
        Selector::Id(value.into())
    }

    /// Locator matching by `name` attribute.
    pub fn name(value: impl Into<String>) -> Self {
        Selector::Name(value.into())
    }

    /// Locator matching by CSS selector.
    pub fn css(value: impl Into<String>) -> Self {
        Selector::Css(value.into())
    }

    /// Locator matching by XPath expression.
    pub fn xpath(value: impl Into<String>) -> Self {
        Selector::XPath(value.into())
    }

    /// Locator matching an anchor by its link text.
    pub fn link_text(value: impl Into<String>) -> Self {
        Selector::LinkText(value.into())
    }

    /// Locator matching by tag name.
    pub fn tag_name(value: impl Into<String>) -> Self {
        Selector::TagName(value.into())
    }

    /// Locator matching by class name.
    pub fn class_name(value: impl Into<String>) -> Self {
        Selector::ClassName(value.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(v) => write!(f, "id: {}", v),
            Selector::Name(v) => write!(f, "name: {}", v),
            Selector::Css(v) => write!(f, "css: {}", v),
            Selector::XPath(v) => write!(f, "xpath: {}", v),
            Selector::LinkText(v) => write!(f, "link text: {}", v),
            Selector::TagName(v) => write!(f, "tag name: {}", v),
            Selector::ClassName(v) => write!(f, "class name: {}", v),
        }
    }
}

/// An on-page coordinate pair, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal offset from the page origin.
    pub x: i64,
    /// Vertical offset from the page origin.
    pub y: i64,
}

impl Point {
    /// Create a point.
    pub fn new(x: i64, y: i64) -> Self {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A rendered element's width and height, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    /// Rendered width.
    pub width: u64,
    /// Rendered height.
    pub height: u64,
}

impl Dimension {
    /// Create a dimension.
    pub fn new(width: u64, height: u64) -> Self {
        Dimension { width, height }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Classification of a driver failure.
///
/// The retry engine recovers locally only from *transient* kinds - the page
/// simply hasn't caught up yet - and only while budget remains. Everything
/// else propagates immediately, since retrying cannot make an invalid
/// selector valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No element matched the selector (yet).
    NotFound,
    /// The element exists but cannot be interacted with (yet) - hidden,
    /// obscured, or disabled.
    NotInteractable,
    /// The element reference went stale - the node detached from the DOM,
    /// typically during a re-render.
    Stale,
    /// The selector expression itself is malformed.
    InvalidSelector,
    /// An argument to the operation was rejected by the driver.
    InvalidArgument,
    /// The backend does not support this operation.
    Unsupported,
}

impl ErrorKind {
    /// True for kinds that describe "condition not yet met" and are
    /// therefore eligible for retry.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound | ErrorKind::NotInteractable | ErrorKind::Stale
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "element not found"),
            ErrorKind::NotInteractable => write!(f, "element not interactable"),
            ErrorKind::Stale => write!(f, "stale element reference"),
            ErrorKind::InvalidSelector => write!(f, "invalid selector"),
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
            ErrorKind::Unsupported => write!(f, "unsupported operation"),
        }
    }
}

/// A failure reported by the driver backend.
///
/// Carries a closed [`ErrorKind`] classification plus a backend-supplied
/// message. The kind drives the retry decision; the message is for humans.
///
/// # Examples
///
/// ```
/// use slackwater::DriverError;
///
/// let err = DriverError::not_found("no element matches id: login");
/// assert!(err.is_transient());
///
/// let err = DriverError::invalid_selector("unbalanced bracket in css");
/// assert!(!err.is_transient());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    kind: ErrorKind,
    message: String,
}

impl DriverError {
    /// Create an error with an explicit kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        DriverError {
            kind,
            message: message.into(),
        }
    }

    /// No element matched the selector (transient).
    pub fn not_found(message: impl Into<String>) -> Self {
        DriverError::new(ErrorKind::NotFound, message)
    }

    /// The element is not (yet) interactable (transient).
    pub fn not_interactable(message: impl Into<String>) -> Self {
        DriverError::new(ErrorKind::NotInteractable, message)
    }

    /// The element reference went stale (transient).
    pub fn stale(message: impl Into<String>) -> Self {
        DriverError::new(ErrorKind::Stale, message)
    }

    /// The selector expression is malformed (non-transient).
    pub fn invalid_selector(message: impl Into<String>) -> Self {
        DriverError::new(ErrorKind::InvalidSelector, message)
    }

    /// An argument was rejected (non-transient).
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DriverError::new(ErrorKind::InvalidArgument, message)
    }

    /// The operation is unsupported by the backend (non-transient).
    pub fn unsupported(message: impl Into<String>) -> Self {
        DriverError::new(ErrorKind::Unsupported, message)
    }

    /// The failure classification.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The backend-supplied message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if the failure may resolve itself on retry.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for DriverError {}

/// Shared handle to a located element.
pub type ElementRef = Arc<dyn Element>;

/// One located element, as the backend sees it.
///
/// Every method is a single primitive round-trip; none of them retry.
/// Retry behavior is layered on top by the execution decorator.
pub trait Element {
    /// Click the element.
    fn click(&self) -> Result<(), DriverError>;

    /// Clear the element's value (text inputs, textareas).
    fn clear(&self) -> Result<(), DriverError>;

    /// Submit the form this element belongs to.
    fn submit(&self) -> Result<(), DriverError>;

    /// Type the given text into the element.
    fn send_keys(&self, text: &str) -> Result<(), DriverError>;

    /// Read an attribute value; `None` when the attribute is absent.
    fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;

    /// Read a computed CSS property value.
    fn css_value(&self, name: &str) -> Result<String, DriverError>;

    /// Read the element's visible text.
    fn text(&self) -> Result<String, DriverError>;

    /// Read the element's tag name.
    fn tag_name(&self) -> Result<String, DriverError>;

    /// Whether the element is currently selected/checked.
    fn is_selected(&self) -> Result<bool, DriverError>;

    /// Whether the element is enabled for interaction.
    fn is_enabled(&self) -> Result<bool, DriverError>;

    /// Whether the element is rendered visibly.
    fn is_displayed(&self) -> Result<bool, DriverError>;

    /// The element's on-page location.
    fn location(&self) -> Result<Point, DriverError>;

    /// The element's rendered size.
    fn size(&self) -> Result<Dimension, DriverError>;

    /// Locate a descendant element.
    fn find_element(&self, selector: &Selector) -> Result<ElementRef, DriverError>;

    /// Locate all matching descendants; an empty result is not a failure.
    fn find_elements(&self, selector: &Selector) -> Result<Vec<ElementRef>, DriverError>;
}

/// A driver session: the root scope for element lookup, plus the one piece
/// of shared mutable state this crate touches - the session-wide implicit
/// wait.
pub trait Driver {
    /// Locate an element from the document root.
    fn find_element(&self, selector: &Selector) -> Result<ElementRef, DriverError>;

    /// Locate all matching elements from the document root; an empty result
    /// is not a failure.
    fn find_elements(&self, selector: &Selector) -> Result<Vec<ElementRef>, DriverError>;

    /// Set the session-wide implicit-wait timeout.
    ///
    /// This is global, per driver session: whichever retrying call changed
    /// it must restore it before returning control to the caller.
    fn set_implicit_wait(&self, timeout: Duration) -> Result<(), DriverError>;
}

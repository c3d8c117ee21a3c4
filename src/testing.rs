//! Testing utilities: a scriptable fake driver and assertion helpers.
//!
//! Everything here stands in for a real browser backend so that retry
//! behavior, timeout discipline, and chain rendering can be verified without
//! a browser. The fakes are deliberately boring: they hold plain state,
//! record every call, and fail only when scripted to.
//!
//! # Examples
//!
//! ## Scripting a flaky element
//!
//! ```
//! use slackwater::prelude::*;
//! use slackwater::testing::{FakeDriver, FakeElement};
//! use std::sync::Arc;
//!
//! let driver = Arc::new(FakeDriver::new());
//! let button = Arc::new(FakeElement::new().with_tag("button"));
//! button.fail_next("click", DriverError::not_interactable("still animating"));
//! driver.bind(&Selector::id("go"), button.clone());
//!
//! // Retrying within a budget rides out the scripted failure.
//! let clicked = FluentDriver::new(driver)
//!     .within(Period::secs(1))
//!     .find_element(Selector::id("go"))
//!     .and_then(|el| el.click());
//!
//! assert!(clicked.is_ok());
//! assert_eq!(button.calls(), vec!["click", "click"]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::driver::{
    Dimension, Driver, DriverError, Element, ElementRef, Point, Selector,
};

struct Binding {
    misses_remaining: u32,
    element: ElementRef,
}

/// A fake driver session: selector bindings plus a record of every
/// implicit-wait change.
///
/// The wait-call log is the hook for verifying the timeout discipline: a
/// retrying call must record exactly the budget followed by zero.
pub struct FakeDriver {
    wait_calls: Mutex<Vec<Duration>>,
    bindings: Mutex<HashMap<String, Binding>>,
    list_bindings: Mutex<HashMap<String, Vec<ElementRef>>>,
}

impl FakeDriver {
    /// An empty session: no bindings, no recorded wait calls.
    pub fn new() -> Self {
        FakeDriver {
            wait_calls: Mutex::new(Vec::new()),
            bindings: Mutex::new(HashMap::new()),
            list_bindings: Mutex::new(HashMap::new()),
        }
    }

    /// Bind `selector` to `element`: lookups succeed immediately.
    pub fn bind(&self, selector: &Selector, element: ElementRef) {
        self.bindings.lock().unwrap().insert(
            selector.to_string(),
            Binding {
                misses_remaining: 0,
                element,
            },
        );
    }

    /// Bind `selector` to `element`, but report "not found" for the first
    /// `misses` lookups - an element that appears once the page settles.
    pub fn bind_after(&self, selector: &Selector, misses: u32, element: ElementRef) {
        self.bindings.lock().unwrap().insert(
            selector.to_string(),
            Binding {
                misses_remaining: misses,
                element,
            },
        );
    }

    /// Bind `selector` to a list of elements for `find_elements`.
    pub fn bind_all(&self, selector: &Selector, elements: Vec<ElementRef>) {
        self.list_bindings
            .lock()
            .unwrap()
            .insert(selector.to_string(), elements);
    }

    /// Every implicit-wait value set so far, in call order.
    pub fn wait_calls(&self) -> Vec<Duration> {
        self.wait_calls.lock().unwrap().clone()
    }
}

impl Default for FakeDriver {
    fn default() -> Self {
        FakeDriver::new()
    }
}

impl std::fmt::Debug for FakeDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeDriver")
            .field("wait_calls", &self.wait_calls())
            .finish()
    }
}

fn lookup(bindings: &Mutex<HashMap<String, Binding>>, selector: &Selector) -> Result<ElementRef, DriverError> {
    let key = selector.to_string();
    let mut bindings = bindings.lock().unwrap();
    match bindings.get_mut(&key) {
        Some(binding) => {
            if binding.misses_remaining > 0 {
                binding.misses_remaining -= 1;
                Err(DriverError::not_found(format!("no element matches {}", key)))
            } else {
                Ok(Arc::clone(&binding.element))
            }
        }
        None => Err(DriverError::not_found(format!("no element matches {}", key))),
    }
}

impl Driver for FakeDriver {
    fn find_element(&self, selector: &Selector) -> Result<ElementRef, DriverError> {
        lookup(&self.bindings, selector)
    }

    fn find_elements(&self, selector: &Selector) -> Result<Vec<ElementRef>, DriverError> {
        Ok(self
            .list_bindings
            .lock()
            .unwrap()
            .get(&selector.to_string())
            .cloned()
            .unwrap_or_default())
    }

    fn set_implicit_wait(&self, timeout: Duration) -> Result<(), DriverError> {
        self.wait_calls.lock().unwrap().push(timeout);
        Ok(())
    }
}

/// A fake element with builder-configured state, scripted failures, and a
/// call log.
///
/// `fail_next(op, error)` enqueues a failure consumed by the next invocation
/// of that operation; enqueue it several times to fail several attempts in a
/// row. Every primitive appends its name to [`calls`](FakeElement::calls),
/// whether it succeeded or not.
pub struct FakeElement {
    tag: String,
    text: Mutex<String>,
    attributes: Mutex<HashMap<String, String>>,
    css: Mutex<HashMap<String, String>>,
    selected: Mutex<bool>,
    enabled: Mutex<bool>,
    displayed: Mutex<bool>,
    location: Mutex<Point>,
    size: Mutex<Dimension>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, VecDeque<DriverError>>>,
    children: Mutex<HashMap<String, Binding>>,
    child_lists: Mutex<HashMap<String, Vec<ElementRef>>>,
}

impl FakeElement {
    /// A visible, enabled `<div>` with no text and no attributes.
    pub fn new() -> Self {
        FakeElement {
            tag: "div".to_string(),
            text: Mutex::new(String::new()),
            attributes: Mutex::new(HashMap::new()),
            css: Mutex::new(HashMap::new()),
            selected: Mutex::new(false),
            enabled: Mutex::new(true),
            displayed: Mutex::new(true),
            location: Mutex::new(Point::default()),
            size: Mutex::new(Dimension::default()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            children: Mutex::new(HashMap::new()),
            child_lists: Mutex::new(HashMap::new()),
        }
    }

    /// Set the tag name.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the visible text.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        *self.text.lock().unwrap() = text.into();
        self
    }

    /// Set an attribute value.
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .lock()
            .unwrap()
            .insert(name.into(), value.into());
        self
    }

    /// Set a computed CSS property value.
    pub fn with_css_value(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.lock().unwrap().insert(name.into(), value.into());
        self
    }

    /// Set the selected state.
    pub fn with_selected(self, selected: bool) -> Self {
        *self.selected.lock().unwrap() = selected;
        self
    }

    /// Set the enabled state.
    pub fn with_enabled(self, enabled: bool) -> Self {
        *self.enabled.lock().unwrap() = enabled;
        self
    }

    /// Set the displayed state.
    pub fn with_displayed(self, displayed: bool) -> Self {
        *self.displayed.lock().unwrap() = displayed;
        self
    }

    /// Set the on-page location.
    pub fn with_location(self, location: Point) -> Self {
        *self.location.lock().unwrap() = location;
        self
    }

    /// Set the rendered size.
    pub fn with_size(self, size: Dimension) -> Self {
        *self.size.lock().unwrap() = size;
        self
    }

    /// Enqueue a failure for the next invocation of `op` ("click",
    /// "text", "find_element", ...).
    pub fn fail_next(&self, op: &str, error: DriverError) {
        self.failures
            .lock()
            .unwrap()
            .entry(op.to_string())
            .or_default()
            .push_back(error);
    }

    /// Bind a child selector for descendant lookup.
    pub fn bind_child(&self, selector: &Selector, element: ElementRef) {
        self.children.lock().unwrap().insert(
            selector.to_string(),
            Binding {
                misses_remaining: 0,
                element,
            },
        );
    }

    /// Bind a child selector, missing the first `misses` lookups.
    pub fn bind_child_after(&self, selector: &Selector, misses: u32, element: ElementRef) {
        self.children.lock().unwrap().insert(
            selector.to_string(),
            Binding {
                misses_remaining: misses,
                element,
            },
        );
    }

    /// Bind a child selector to a list of descendants.
    pub fn bind_children(&self, selector: &Selector, elements: Vec<ElementRef>) {
        self.child_lists
            .lock()
            .unwrap()
            .insert(selector.to_string(), elements);
    }

    /// Every operation invoked on this element so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, op: &str) -> Result<(), DriverError> {
        self.calls.lock().unwrap().push(op.to_string());
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(|queue| queue.pop_front())
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for FakeElement {
    fn default() -> Self {
        FakeElement::new()
    }
}

impl std::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeElement")
            .field("tag", &self.tag)
            .field("calls", &self.calls())
            .finish()
    }
}

impl Element for FakeElement {
    fn click(&self) -> Result<(), DriverError> {
        self.enter("click")
    }

    fn clear(&self) -> Result<(), DriverError> {
        self.enter("clear")?;
        self.text.lock().unwrap().clear();
        Ok(())
    }

    fn submit(&self) -> Result<(), DriverError> {
        self.enter("submit")
    }

    fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        self.enter("send_keys")?;
        self.text.lock().unwrap().push_str(text);
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.enter("attribute")?;
        Ok(self.attributes.lock().unwrap().get(name).cloned())
    }

    fn css_value(&self, name: &str) -> Result<String, DriverError> {
        self.enter("css_value")?;
        Ok(self
            .css
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    fn text(&self) -> Result<String, DriverError> {
        self.enter("text")?;
        Ok(self.text.lock().unwrap().clone())
    }

    fn tag_name(&self) -> Result<String, DriverError> {
        self.enter("tag_name")?;
        Ok(self.tag.clone())
    }

    fn is_selected(&self) -> Result<bool, DriverError> {
        self.enter("is_selected")?;
        Ok(*self.selected.lock().unwrap())
    }

    fn is_enabled(&self) -> Result<bool, DriverError> {
        self.enter("is_enabled")?;
        Ok(*self.enabled.lock().unwrap())
    }

    fn is_displayed(&self) -> Result<bool, DriverError> {
        self.enter("is_displayed")?;
        Ok(*self.displayed.lock().unwrap())
    }

    fn location(&self) -> Result<Point, DriverError> {
        self.enter("location")?;
        Ok(*self.location.lock().unwrap())
    }

    fn size(&self) -> Result<Dimension, DriverError> {
        self.enter("size")?;
        Ok(*self.size.lock().unwrap())
    }

    fn find_element(&self, selector: &Selector) -> Result<ElementRef, DriverError> {
        self.enter("find_element")?;
        lookup(&self.children, selector)
    }

    fn find_elements(&self, selector: &Selector) -> Result<Vec<ElementRef>, DriverError> {
        self.enter("find_elements")?;
        Ok(self
            .child_lists
            .lock()
            .unwrap()
            .get(&selector.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

/// Assert that a [`ChainError`](crate::ChainError)'s rendered chain mentions
/// the given operations, in order.
///
/// # Examples
///
/// ```
/// use slackwater::{assert_chain, Context, DriverError};
///
/// let err = Context::root()
///     .singular_full("find_element", Some("id: go".into()), None)
///     .singular("click")
///     .decorate(DriverError::not_found("gone"));
///
/// assert_chain!(err, ["find_element", "click"]);
/// ```
#[macro_export]
macro_rules! assert_chain {
    ($err:expr, [$($op:expr),+ $(,)?]) => {{
        let err = &$err;
        let chain = err.chain();
        let mut from = 0usize;
        $(
            match chain[from..].find($op) {
                Some(pos) => {
                    from += pos + $op.len();
                }
                None => panic!(
                    "expected operation {:?} (in order) in chain {:?}",
                    $op, chain
                ),
            }
        )+
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_driver_records_wait_calls() {
        let driver = FakeDriver::new();
        driver.set_implicit_wait(Duration::from_millis(100)).unwrap();
        driver.set_implicit_wait(Duration::ZERO).unwrap();
        assert_eq!(
            driver.wait_calls(),
            vec![Duration::from_millis(100), Duration::ZERO]
        );
    }

    #[test]
    fn fake_driver_unbound_selector_is_not_found() {
        let driver = FakeDriver::new();
        let err = driver
            .find_element(&Selector::id("ghost"))
            .err()
            .expect("unbound selector should not be found");
        assert!(err.is_transient());
    }

    #[test]
    fn fake_driver_bind_after_misses_then_hits() {
        let driver = FakeDriver::new();
        driver.bind_after(&Selector::id("late"), 2, Arc::new(FakeElement::new()));

        assert!(driver.find_element(&Selector::id("late")).is_err());
        assert!(driver.find_element(&Selector::id("late")).is_err());
        assert!(driver.find_element(&Selector::id("late")).is_ok());
    }

    #[test]
    fn fake_element_scripted_failures_drain_in_order() {
        let el = FakeElement::new();
        el.fail_next("click", DriverError::not_interactable("first"));
        el.fail_next("click", DriverError::not_interactable("second"));

        assert_eq!(
            el.click().unwrap_err(),
            DriverError::not_interactable("first")
        );
        assert_eq!(
            el.click().unwrap_err(),
            DriverError::not_interactable("second")
        );
        assert!(el.click().is_ok());
        assert_eq!(el.calls(), vec!["click", "click", "click"]);
    }

    #[test]
    fn fake_element_state_accessors() {
        let el = FakeElement::new()
            .with_tag("input")
            .with_text("hello")
            .with_attribute("type", "text")
            .with_css_value("display", "block")
            .with_selected(true)
            .with_enabled(false)
            .with_displayed(false)
            .with_location(Point::new(3, 4))
            .with_size(Dimension::new(10, 20));

        assert_eq!(el.tag_name().unwrap(), "input");
        assert_eq!(el.text().unwrap(), "hello");
        assert_eq!(el.attribute("type").unwrap(), Some("text".to_string()));
        assert_eq!(el.attribute("missing").unwrap(), None);
        assert_eq!(el.css_value("display").unwrap(), "block");
        assert!(el.is_selected().unwrap());
        assert!(!el.is_enabled().unwrap());
        assert!(!el.is_displayed().unwrap());
        assert_eq!(el.location().unwrap(), Point::new(3, 4));
        assert_eq!(el.size().unwrap(), Dimension::new(10, 20));
    }

    #[test]
    fn fake_element_clear_and_send_keys_touch_text() {
        let el = FakeElement::new().with_text("old");
        el.clear().unwrap();
        el.send_keys("new").unwrap();
        assert_eq!(el.text().unwrap(), "new");
    }

    #[test]
    fn fake_element_child_bindings() {
        let el = FakeElement::new();
        el.bind_child(&Selector::css(".a"), Arc::new(FakeElement::new()));
        el.bind_child_after(&Selector::css(".b"), 1, Arc::new(FakeElement::new()));
        el.bind_children(
            &Selector::css("li"),
            vec![Arc::new(FakeElement::new()) as ElementRef],
        );

        assert!(el.find_element(&Selector::css(".a")).is_ok());
        assert!(el.find_element(&Selector::css(".b")).is_err());
        assert!(el.find_element(&Selector::css(".b")).is_ok());
        assert_eq!(el.find_elements(&Selector::css("li")).unwrap().len(), 1);
        assert!(el.find_elements(&Selector::css("none")).unwrap().is_empty());
    }

    #[test]
    #[should_panic(expected = "expected operation")]
    fn assert_chain_panics_on_out_of_order() {
        let err = crate::Context::root()
            .singular("click")
            .singular("submit")
            .decorate(DriverError::not_found("x"));
        assert_chain!(err, ["submit", "click"]);
    }
}

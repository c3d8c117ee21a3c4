//! The fluent handles: the user-facing chained surface.
//!
//! A [`FluentDriver`] wraps a driver session; a [`FluentElement`] wraps one
//! located element. Every chained method does the same four things:
//!
//! 1. build an [`Execution`](crate::Execution) closing over the current
//!    element and the call's arguments,
//! 2. extend the [`Context`] chain with a node naming the operation (and its
//!    locator or argument, where one exists),
//! 3. hand both to the execution decorator with this handle's [`Mode`],
//! 4. return a **new** handle carrying the extended context - same element,
//!    unless the operation was itself a lookup.
//!
//! Handles are immutable; two calls on the same handle produce two
//! independent chains. A handle is either *eager* (no period - one attempt
//! per call) or *retrying* (a [`Period`] budget - calls poll until the page
//! catches up). [`within`](FluentElement::within) switches a chain to
//! retrying from that point on, and derived handles inherit the mode until
//! [`without`](FluentElement::without) switches back.
//!
//! # Examples
//!
//! ```
//! use slackwater::prelude::*;
//! use slackwater::testing::{FakeDriver, FakeElement};
//! use std::sync::Arc;
//!
//! let driver = Arc::new(FakeDriver::new());
//! driver.bind(
//!     &Selector::id("save"),
//!     Arc::new(FakeElement::new().with_tag("button")),
//! );
//!
//! let browser = FluentDriver::new(driver);
//! let saved = browser
//!     .within(Period::secs(2))
//!     .find_element(Selector::id("save"))
//!     .and_then(|el| el.click());
//!
//! assert!(saved.is_ok());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::context::{ChainError, Context};
use crate::driver::{Dimension, Driver, ElementRef, Point, Selector};
use crate::period::Period;
use crate::retry::{decorate_execution, Mode};
use crate::value::DeferredValue;

fn quoted(text: &str) -> String {
    format!("'{}'", text)
}

/// Fluent wrapper around a driver session: the entry point of every chain.
#[derive(Clone)]
pub struct FluentDriver {
    driver: Arc<dyn Driver>,
    context: Context,
    period: Option<Period>,
}

impl FluentDriver {
    /// Wrap a driver session. The resulting handle is eager; attach a
    /// budget with [`within`](FluentDriver::within) to make it retry.
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        FluentDriver {
            driver,
            context: Context::root(),
            period: None,
        }
    }

    /// This handle's execution mode.
    pub fn mode(&self) -> Mode {
        Mode::from_period(self.period)
    }

    /// The call chain recorded so far.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// A retrying variant of this handle: calls made through it (and
    /// through handles derived from it) poll within `period`.
    pub fn within(&self, period: Period) -> Self {
        FluentDriver {
            driver: Arc::clone(&self.driver),
            context: self
                .context
                .singular_full("within", None, Some(period.to_string())),
            period: Some(period),
        }
    }

    /// An eager variant of this handle: drops any inherited retry budget.
    pub fn without(&self) -> Self {
        FluentDriver {
            driver: Arc::clone(&self.driver),
            context: self.context.singular("without"),
            period: None,
        }
    }

    /// Locate an element from the document root.
    ///
    /// On a retrying handle the lookup polls until the element appears or
    /// the budget elapses.
    pub fn find_element(&self, selector: Selector) -> Result<FluentElement, ChainError> {
        let context =
            self.context
                .singular_full("find_element", Some(selector.to_string()), None);
        let driver = Arc::clone(&self.driver);
        let exec = move || driver.find_element(&selector);
        let element = decorate_execution(&*self.driver, &exec, &context, self.mode())?;
        Ok(FluentElement {
            driver: Arc::clone(&self.driver),
            element,
            context,
            period: self.period,
        })
    }

    /// Locate all matching elements from the document root. An empty result
    /// is a success, not a failure, and is therefore never retried.
    pub fn find_elements(&self, selector: Selector) -> Result<Vec<FluentElement>, ChainError> {
        let context =
            self.context
                .singular_full("find_elements", Some(selector.to_string()), None);
        let driver = Arc::clone(&self.driver);
        let exec = move || driver.find_elements(&selector);
        let elements = decorate_execution(&*self.driver, &exec, &context, self.mode())?;
        Ok(elements
            .into_iter()
            .map(|element| FluentElement {
                driver: Arc::clone(&self.driver),
                element,
                context: context.clone(),
                period: self.period,
            })
            .collect())
    }
}

impl fmt::Debug for FluentDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentDriver")
            .field("context", &self.context.render())
            .field("period", &self.period)
            .finish()
    }
}

/// Fluent wrapper around one located element.
///
/// Action methods return a fresh handle so calls chain; read methods return
/// either a decorated value or a [`DeferredValue`] carrying the chain for
/// later diagnostics.
#[derive(Clone)]
pub struct FluentElement {
    driver: Arc<dyn Driver>,
    element: ElementRef,
    context: Context,
    period: Option<Period>,
}

impl FluentElement {
    /// This handle's execution mode.
    pub fn mode(&self) -> Mode {
        Mode::from_period(self.period)
    }

    /// The call chain recorded so far.
    pub fn context(&self) -> &Context {
        &self.context
    }

    fn derived(&self, context: Context) -> FluentElement {
        FluentElement {
            driver: Arc::clone(&self.driver),
            element: Arc::clone(&self.element),
            context,
            period: self.period,
        }
    }

    /// Run `exec` under this handle's mode against `context`.
    fn decorated<T, E>(&self, context: &Context, exec: &E) -> Result<T, ChainError>
    where
        E: crate::Execution<T> + ?Sized,
    {
        decorate_execution(&*self.driver, exec, context, self.mode())
    }

    /// A retrying variant of this handle, bounded by `period`.
    pub fn within(&self, period: Period) -> Self {
        FluentElement {
            driver: Arc::clone(&self.driver),
            element: Arc::clone(&self.element),
            context: self
                .context
                .singular_full("within", None, Some(period.to_string())),
            period: Some(period),
        }
    }

    /// An eager variant of this handle: drops the inherited retry budget,
    /// so subsequent calls make exactly one attempt each.
    pub fn without(&self) -> Self {
        FluentElement {
            driver: Arc::clone(&self.driver),
            element: Arc::clone(&self.element),
            context: self.context.singular("without"),
            period: None,
        }
    }

    /// Click the element.
    pub fn click(&self) -> Result<FluentElement, ChainError> {
        let context = self.context.singular("click");
        let element = Arc::clone(&self.element);
        self.decorated(&context, &move || element.click())?;
        Ok(self.derived(context))
    }

    /// Clear the element's value.
    pub fn clear_field(&self) -> Result<FluentElement, ChainError> {
        let context = self.context.singular("clear_field");
        let element = Arc::clone(&self.element);
        self.decorated(&context, &move || element.clear())?;
        Ok(self.derived(context))
    }

    /// Submit the form this element belongs to.
    pub fn submit(&self) -> Result<FluentElement, ChainError> {
        let context = self.context.singular("submit");
        let element = Arc::clone(&self.element);
        self.decorated(&context, &move || element.submit())?;
        Ok(self.derived(context))
    }

    /// Type text into the element.
    pub fn send_keys(&self, text: &str) -> Result<FluentElement, ChainError> {
        let context = self
            .context
            .singular_full("send_keys", None, Some(quoted(text)));
        let element = Arc::clone(&self.element);
        let text = text.to_string();
        self.decorated(&context, &move || element.send_keys(&text))?;
        Ok(self.derived(context))
    }

    /// Whether the element is selected/checked.
    pub fn is_selected(&self) -> Result<bool, ChainError> {
        let context = self.context.singular("is_selected");
        let element = Arc::clone(&self.element);
        self.decorated(&context, &move || element.is_selected())
    }

    /// Whether the element is enabled.
    pub fn is_enabled(&self) -> Result<bool, ChainError> {
        let context = self.context.singular("is_enabled");
        let element = Arc::clone(&self.element);
        self.decorated(&context, &move || element.is_enabled())
    }

    /// Whether the element is visibly rendered.
    pub fn is_displayed(&self) -> Result<bool, ChainError> {
        let context = self.context.singular("is_displayed");
        let element = Arc::clone(&self.element);
        self.decorated(&context, &move || element.is_displayed())
    }

    /// The element's on-page location.
    pub fn location(&self) -> Result<Point, ChainError> {
        let context = self.context.singular("location");
        let element = Arc::clone(&self.element);
        self.decorated(&context, &move || element.location())
    }

    /// The element's rendered size.
    pub fn size(&self) -> Result<Dimension, ChainError> {
        let context = self.context.singular("size");
        let element = Arc::clone(&self.element);
        self.decorated(&context, &move || element.size())
    }

    /// The element's visible text, as a deferred read: nothing touches the
    /// driver until the value is resolved, and on a retrying handle the
    /// resolve polls within the budget.
    pub fn text(&self) -> DeferredValue<String> {
        let context = self.context.singular("text");
        let element = Arc::clone(&self.element);
        DeferredValue::pending(
            Arc::clone(&self.driver),
            Box::new(move || element.text()),
            context,
            self.period,
        )
    }

    /// The element's tag name, as a deferred read.
    pub fn tag_name(&self) -> DeferredValue<String> {
        let context = self.context.singular("tag_name");
        let element = Arc::clone(&self.element);
        DeferredValue::pending(
            Arc::clone(&self.driver),
            Box::new(move || element.tag_name()),
            context,
            self.period,
        )
    }

    /// An attribute value, as a deferred read. Resolves to `None` when the
    /// attribute is absent.
    pub fn attribute(&self, name: &str) -> DeferredValue<Option<String>> {
        let context = self
            .context
            .singular_full("attribute", None, Some(name.to_string()));
        let element = Arc::clone(&self.element);
        let name = name.to_string();
        DeferredValue::pending(
            Arc::clone(&self.driver),
            Box::new(move || element.attribute(&name)),
            context,
            self.period,
        )
    }

    /// A computed CSS property value, as a deferred read.
    pub fn css_value(&self, name: &str) -> DeferredValue<String> {
        let context = self
            .context
            .singular_full("css_value", None, Some(name.to_string()));
        let element = Arc::clone(&self.element);
        let name = name.to_string();
        DeferredValue::pending(
            Arc::clone(&self.driver),
            Box::new(move || element.css_value(&name)),
            context,
            self.period,
        )
    }

    /// The text that is there right now: fetched immediately, bypassing the
    /// retry engine even on a retrying handle. The returned value still
    /// carries the chain for diagnostics.
    pub fn current_text(&self) -> Result<DeferredValue<String>, ChainError> {
        let context = self.context.singular("current_text");
        let value = self.element.text().map_err(|err| context.decorate(err))?;
        Ok(DeferredValue::computed(value, context))
    }

    /// The tag name, fetched immediately.
    pub fn current_tag_name(&self) -> Result<DeferredValue<String>, ChainError> {
        let context = self.context.singular("current_tag_name");
        let value = self
            .element
            .tag_name()
            .map_err(|err| context.decorate(err))?;
        Ok(DeferredValue::computed(value, context))
    }

    /// The location, fetched immediately.
    pub fn current_location(&self) -> Result<DeferredValue<Point>, ChainError> {
        let context = self.context.singular("current_location");
        let value = self
            .element
            .location()
            .map_err(|err| context.decorate(err))?;
        Ok(DeferredValue::computed(value, context))
    }

    /// The size, fetched immediately.
    pub fn current_size(&self) -> Result<DeferredValue<Dimension>, ChainError> {
        let context = self.context.singular("current_size");
        let value = self.element.size().map_err(|err| context.decorate(err))?;
        Ok(DeferredValue::computed(value, context))
    }

    /// The selected state, fetched immediately.
    pub fn current_selected(&self) -> Result<DeferredValue<bool>, ChainError> {
        let context = self.context.singular("current_selected");
        let value = self
            .element
            .is_selected()
            .map_err(|err| context.decorate(err))?;
        Ok(DeferredValue::computed(value, context))
    }

    /// The enabled state, fetched immediately.
    pub fn current_enabled(&self) -> Result<DeferredValue<bool>, ChainError> {
        let context = self.context.singular("current_enabled");
        let value = self
            .element
            .is_enabled()
            .map_err(|err| context.decorate(err))?;
        Ok(DeferredValue::computed(value, context))
    }

    /// The displayed state, fetched immediately.
    pub fn current_displayed(&self) -> Result<DeferredValue<bool>, ChainError> {
        let context = self.context.singular("current_displayed");
        let value = self
            .element
            .is_displayed()
            .map_err(|err| context.decorate(err))?;
        Ok(DeferredValue::computed(value, context))
    }

    /// Locate a descendant element. The child handle inherits this handle's
    /// mode, so a retrying chain stays retrying through lookups.
    pub fn find_element(&self, selector: Selector) -> Result<FluentElement, ChainError> {
        let context =
            self.context
                .singular_full("find_element", Some(selector.to_string()), None);
        let element = Arc::clone(&self.element);
        let exec = move || element.find_element(&selector);
        let found = self.decorated(&context, &exec)?;
        Ok(FluentElement {
            driver: Arc::clone(&self.driver),
            element: found,
            context,
            period: self.period,
        })
    }

    /// Locate all matching descendants. An empty result is a success and is
    /// never retried.
    pub fn find_elements(&self, selector: Selector) -> Result<Vec<FluentElement>, ChainError> {
        let context =
            self.context
                .singular_full("find_elements", Some(selector.to_string()), None);
        let element = Arc::clone(&self.element);
        let exec = move || element.find_elements(&selector);
        let found = self.decorated(&context, &exec)?;
        Ok(found
            .into_iter()
            .map(|element| FluentElement {
                driver: Arc::clone(&self.driver),
                element,
                context: context.clone(),
                period: self.period,
            })
            .collect())
    }
}

impl fmt::Debug for FluentElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentElement")
            .field("context", &self.context.render())
            .field("period", &self.period)
            .finish()
    }
}

//! End-to-end tests for the fluent surface: chain accumulation, dual-mode
//! dispatch, deferred reads, and chain-decorated diagnostics.

use std::sync::Arc;

use slackwater::testing::{FakeDriver, FakeElement};
use slackwater::{
    assert_chain, Dimension, Driver, DriverError, ElementRef, FluentDriver, Period, Point,
    Selector,
};

fn fixture() -> (Arc<FakeDriver>, Arc<FakeElement>, FluentDriver) {
    let driver = Arc::new(FakeDriver::new());
    let element = Arc::new(FakeElement::new());
    driver.bind(&Selector::id("go"), element.clone());
    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);
    (driver, element, browser)
}

// ============================================================================
// Chain accumulation
// ============================================================================

#[test]
fn every_call_appears_in_order_in_the_chain() {
    let (_driver, _element, browser) = fixture();

    let handle = browser
        .find_element(Selector::id("go"))
        .unwrap()
        .within(Period::secs(5))
        .click()
        .unwrap()
        .send_keys("abc")
        .unwrap()
        .submit()
        .unwrap();

    assert_eq!(
        handle.context().render(),
        "find_element(id: go).within(5 seconds).click().send_keys('abc').submit()"
    );
}

#[test]
fn failure_message_reads_as_the_fluent_chain() {
    let (_driver, element, browser) = fixture();
    element.fail_next("submit", DriverError::unsupported("not in a form"));

    let err = browser
        .find_element(Selector::id("go"))
        .unwrap()
        .click()
        .unwrap()
        .submit()
        .unwrap_err();

    assert_chain!(err, ["find_element", "click", "submit"]);
    assert_eq!(
        err.to_string(),
        "find_element(id: go).click().submit() -> unsupported operation: not in a form"
    );
    // The original failure is the cause, not a flattened string.
    assert_eq!(err.cause(), &DriverError::unsupported("not in a form"));
}

#[test]
fn sibling_chains_do_not_disturb_each_other_or_their_parent() {
    let (_driver, _element, browser) = fixture();
    let parent = browser.find_element(Selector::id("go")).unwrap();

    let left = parent.click().unwrap();
    let right = parent.clear_field().unwrap();

    assert_eq!(left.context().render(), "find_element(id: go).click()");
    assert_eq!(
        right.context().render(),
        "find_element(id: go).clear_field()"
    );
    assert_eq!(parent.context().render(), "find_element(id: go)");
}

// ============================================================================
// Decorated reads
// ============================================================================

#[test]
fn boolean_and_geometry_reads_are_decorated() {
    let driver = Arc::new(FakeDriver::new());
    let element = Arc::new(
        FakeElement::new()
            .with_selected(true)
            .with_enabled(true)
            .with_displayed(false)
            .with_location(Point::new(10, 20))
            .with_size(Dimension::new(300, 40)),
    );
    driver.bind(&Selector::css("#panel"), element);
    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);

    let handle = browser.find_element(Selector::css("#panel")).unwrap();
    assert!(handle.is_selected().unwrap());
    assert!(handle.is_enabled().unwrap());
    assert!(!handle.is_displayed().unwrap());
    assert_eq!(handle.location().unwrap(), Point::new(10, 20));
    assert_eq!(handle.size().unwrap(), Dimension::new(300, 40));
}

#[test]
fn read_failure_carries_the_chain() {
    let (_driver, element, browser) = fixture();
    element.fail_next("is_enabled", DriverError::stale("detached"));

    let err = browser
        .find_element(Selector::id("go"))
        .unwrap()
        .is_enabled()
        .unwrap_err();

    assert_chain!(err, ["find_element", "is_enabled"]);
}

// ============================================================================
// Deferred reads
// ============================================================================

#[test]
fn deferred_text_resolves_with_retry_under_a_budget() {
    let driver = Arc::new(FakeDriver::new());
    let element = Arc::new(FakeElement::new().with_text("ready"));
    element.fail_next("text", DriverError::stale("re-rendering"));
    element.fail_next("text", DriverError::stale("re-rendering"));
    driver.bind(&Selector::id("status"), element.clone());

    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);
    let text = browser
        .within(Period::secs(5))
        .find_element(Selector::id("status"))
        .unwrap()
        .text();

    assert_eq!(text.resolve().unwrap(), "ready");
    assert_eq!(element.calls(), vec!["text", "text", "text"]);
}

#[test]
fn deferred_text_on_an_eager_handle_fails_immediately() {
    let driver = Arc::new(FakeDriver::new());
    let element = Arc::new(FakeElement::new().with_text("ready"));
    element.fail_next("text", DriverError::stale("re-rendering"));
    driver.bind(&Selector::id("status"), element.clone());

    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);
    let text = browser.find_element(Selector::id("status")).unwrap().text();

    let err = text.resolve().unwrap_err();
    assert_chain!(err, ["find_element", "text"]);
    assert_eq!(element.calls(), vec!["text"]);
}

#[test]
fn attribute_distinguishes_absent_from_empty() {
    let driver = Arc::new(FakeDriver::new());
    let element = Arc::new(
        FakeElement::new()
            .with_attribute("href", "/home")
            .with_attribute("title", ""),
    );
    driver.bind(&Selector::css("a"), element);
    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);
    let handle = browser.find_element(Selector::css("a")).unwrap();

    assert_eq!(
        handle.attribute("href").resolve().unwrap(),
        Some("/home".to_string())
    );
    assert_eq!(
        handle.attribute("title").resolve().unwrap(),
        Some(String::new())
    );
    assert_eq!(handle.attribute("download").resolve().unwrap(), None);
}

#[test]
fn css_value_and_tag_name_resolve_lazily() {
    let driver = Arc::new(FakeDriver::new());
    let element = Arc::new(
        FakeElement::new()
            .with_tag("nav")
            .with_css_value("display", "flex"),
    );
    driver.bind(&Selector::tag_name("nav"), element.clone());
    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);
    let handle = browser.find_element(Selector::tag_name("nav")).unwrap();

    let tag = handle.tag_name();
    let display = handle.css_value("display");
    // Nothing fetched yet.
    assert!(element.calls().is_empty());

    assert_eq!(tag.resolve().unwrap(), "nav");
    assert_eq!(display.resolve().unwrap(), "flex");
    assert_eq!(element.calls(), vec!["tag_name", "css_value"]);
}

#[test]
fn current_reads_fetch_now_and_skip_the_engine() {
    let driver = Arc::new(FakeDriver::new());
    let element = Arc::new(
        FakeElement::new()
            .with_tag("p")
            .with_text("now")
            .with_location(Point::new(1, 2))
            .with_size(Dimension::new(3, 4)),
    );
    driver.bind(&Selector::css("p"), element.clone());
    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);

    // Even on a retrying handle these bypass the retry engine.
    let handle = browser
        .within(Period::secs(9))
        .find_element(Selector::css("p"))
        .unwrap();
    let waits_after_lookup = driver.wait_calls().len();

    assert_eq!(handle.current_text().unwrap().resolve().unwrap(), "now");
    assert_eq!(handle.current_tag_name().unwrap().resolve().unwrap(), "p");
    assert_eq!(
        handle.current_location().unwrap().resolve().unwrap(),
        Point::new(1, 2)
    );
    assert_eq!(
        handle.current_size().unwrap().resolve().unwrap(),
        Dimension::new(3, 4)
    );
    assert!(!handle.current_selected().unwrap().resolve().unwrap());
    assert!(handle.current_enabled().unwrap().resolve().unwrap());
    assert!(handle.current_displayed().unwrap().resolve().unwrap());

    // No additional implicit-wait traffic from any of those reads.
    assert_eq!(driver.wait_calls().len(), waits_after_lookup);
}

#[test]
fn current_read_failure_is_still_decorated() {
    let (_driver, element, browser) = fixture();
    element.fail_next("text", DriverError::stale("detached"));

    let err = browser
        .find_element(Selector::id("go"))
        .unwrap()
        .current_text()
        .unwrap_err();

    assert_chain!(err, ["find_element", "current_text"]);
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn descendant_lookup_chains_and_inherits_mode() {
    let driver = Arc::new(FakeDriver::new());
    let child = Arc::new(FakeElement::new().with_text("inner"));
    let parent = Arc::new(FakeElement::new());
    parent.bind_child_after(&Selector::css(".row"), 2, child);
    driver.bind(&Selector::id("table"), parent);

    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);
    let inner = browser
        .within(Period::secs(5))
        .find_element(Selector::id("table"))
        .unwrap()
        .find_element(Selector::css(".row"))
        .unwrap();

    assert_eq!(inner.text().resolve().unwrap(), "inner");
}

#[test]
fn find_elements_returns_empty_without_retrying() {
    let driver = Arc::new(FakeDriver::new());
    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);

    // An empty result is a success: the retrying variant must not poll.
    let items = browser
        .within(Period::secs(5))
        .find_elements(Selector::css(".never"))
        .unwrap();

    assert!(items.is_empty());
    // One swap/restore pair from the single decorated call.
    assert_eq!(driver.wait_calls().len(), 2);
}

#[test]
fn find_elements_wraps_each_result() {
    let driver = Arc::new(FakeDriver::new());
    driver.bind_all(
        &Selector::css("li"),
        vec![
            Arc::new(FakeElement::new().with_text("one")) as ElementRef,
            Arc::new(FakeElement::new().with_text("two")) as ElementRef,
        ],
    );
    let browser = FluentDriver::new(Arc::clone(&driver) as Arc<dyn Driver>);

    let texts: Vec<String> = browser
        .find_elements(Selector::css("li"))
        .unwrap()
        .into_iter()
        .map(|el| el.text().resolve().unwrap())
        .collect();

    assert_eq!(texts, vec!["one", "two"]);
}

//! Mobile and tablet presentation adjustments.
//!
//! Everything here is a side effect on the live DOM: layout passes run once
//! at startup when the device classifies as mobile or tablet, and a subset
//! re-runs on resize and orientation changes. A missing target element is
//! always a no-op.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Document, Element, HtmlElement, HtmlInputElement};

/// Viewport breakpoints, in px: 576 / 768 / 992 / 1200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScreenSize {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl ScreenSize {
    pub fn from_width(width: i32) -> ScreenSize {
        if width < 576 {
            ScreenSize::Xs
        } else if width < 768 {
            ScreenSize::Sm
        } else if width < 992 {
            ScreenSize::Md
        } else if width < 1200 {
            ScreenSize::Lg
        } else {
            ScreenSize::Xl
        }
    }

    pub fn current() -> ScreenSize {
        ScreenSize::from_width(viewport_width())
    }
}

/// Chart container height for a bucket, in px.
pub fn chart_height(size: ScreenSize) -> u32 {
    match size {
        ScreenSize::Xs => 250,
        ScreenSize::Sm => 300,
        _ => 400,
    }
}

/// Chart height while a mobile device is held in landscape.
const LANDSCAPE_CHART_HEIGHT: u32 = 200;

/// Minimum hit size for touch targets, per platform guidelines.
const MIN_TOUCH_TARGET_PX: f64 = 44.0;

/// Window within which a second tap counts as a double tap.
pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;

const RESIZE_DEBOUNCE_MS: i32 = 250;
const ORIENTATION_SETTLE_MS: i32 = 500;
const CHART_SETTLE_MS: i32 = 100;
const PRESS_REVERT_MS: i32 = 100;
const ROW_HIGHLIGHT_REVERT_MS: i32 = 150;

/// Device classification computed once at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub is_ios: bool,
    pub is_android: bool,
    pub is_touch: bool,
}

impl DeviceProfile {
    /// Classify from raw environment signals. Pure so it can be tested
    /// without a browser.
    pub fn classify(user_agent: &str, viewport_width: i32, touch_points: i32, has_touch_events: bool) -> DeviceProfile {
        let ua = user_agent.to_lowercase();
        let mobile_markers = [
            "android", "webos", "iphone", "ipad", "ipod", "blackberry", "iemobile", "opera mini",
        ];
        let is_mobile = mobile_markers.iter().any(|m| ua.contains(m));
        let is_ios = ua.contains("ipad") || ua.contains("iphone") || ua.contains("ipod");
        let is_android = ua.contains("android");
        DeviceProfile {
            is_mobile,
            is_tablet: (ua.contains("ipad") || is_android) && viewport_width >= 768,
            is_ios,
            is_android,
            is_touch: has_touch_events || touch_points > 0,
        }
    }

    /// Classify the current browser environment.
    pub fn detect() -> DeviceProfile {
        let Some(window) = web_sys::window() else {
            return DeviceProfile::classify("", 0, 0, false);
        };
        let navigator = window.navigator();
        let user_agent = navigator.user_agent().unwrap_or_default();
        let has_touch_events =
            js_sys::Reflect::has(&window, &JsValue::from_str("ontouchstart")).unwrap_or(false);
        DeviceProfile::classify(
            &user_agent,
            viewport_width(),
            navigator.max_touch_points(),
            has_touch_events,
        )
    }

    pub fn handheld(&self) -> bool {
        self.is_mobile || self.is_tablet
    }
}

/// Tracks touch-end timing for double-tap suppression.
#[derive(Debug, Default)]
pub struct DoubleTapGuard {
    last_touch_end_ms: Option<f64>,
}

impl DoubleTapGuard {
    /// Record a touch-end at `now_ms`. Returns true when the tap landed
    /// within the double-tap window of the previous one and must be
    /// suppressed.
    pub fn register(&mut self, now_ms: f64) -> bool {
        let suppress = matches!(
            self.last_touch_end_ms,
            Some(last) if now_ms - last <= DOUBLE_TAP_WINDOW_MS
        );
        self.last_touch_end_ms = Some(now_ms);
        suppress
    }
}

/// Optional hook into whatever charting library the page embeds. The
/// adapter is handed the container element and asked to fit its chart
/// instance to the new size.
pub trait ChartAdapter {
    fn resize(&self, container: &Element);
}

/// Install all mobile adjustments and the resize / orientation listeners.
/// Layout passes only run for handheld devices; the listeners are installed
/// unconditionally so a desktop window resized into a phone-sized viewport
/// still gets chart and modal sizing.
pub fn init(profile: DeviceProfile, charts: Option<Rc<dyn ChartAdapter>>) {
    let Some(document) = document() else {
        return;
    };

    if profile.handheld() {
        optimize_navigation(&document);
        optimize_tables(&document);
        optimize_modals(&document);
        optimize_charts(&document, charts.clone());
        optimize_forms(&document, profile);
        optimize_touch(&document);
        prevent_zoom(&document, profile);
        apply_orientation(&document, profile);
        expose_safe_area(&document, profile);
    }

    install_resize_listener(profile, charts.clone());
    install_orientation_listener(profile, charts);
}

fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

fn viewport_width() -> i32 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as i32
}

fn viewport_height() -> i32 {
    web_sys::window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as i32
}

fn is_landscape() -> bool {
    viewport_width() > viewport_height()
}

fn for_each_element(document: &Document, selector: &str, mut f: impl FnMut(&HtmlElement)) {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return;
    };
    for i in 0..nodes.length() {
        if let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
            f(&el);
        }
    }
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

// -- Navigation --

/// Collapse an expanded menu when a nav link is tapped or a tap lands
/// outside the navigation container.
fn optimize_navigation(document: &Document) {
    let (Ok(Some(navbar)), Ok(Some(collapse))) = (
        document.query_selector(".navbar"),
        document.query_selector(".navbar-collapse"),
    ) else {
        return;
    };

    {
        let collapse = collapse.clone();
        for_each_element(document, ".navbar-nav .nav-link", |link| {
            let collapse = collapse.clone();
            let closure = Closure::<dyn Fn()>::new(move || {
                if collapse.class_list().contains("show") {
                    let _ = collapse.class_list().remove_1("show");
                }
            });
            let _ = link.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        });
    }

    let closure = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let outside = match ev.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok()) {
            Some(node) => !navbar.contains(Some(&node)),
            None => true,
        };
        if outside && collapse.class_list().contains("show") {
            let _ = collapse.class_list().remove_1("show");
        }
    });
    let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

// -- Tables --

fn optimize_tables(document: &Document) {
    for_each_element(document, ".table-responsive", |table| {
        set_style(table, "-webkit-overflow-scrolling", "touch");
        add_scroll_indicator(table);
    });

    for_each_element(document, ".table-responsive tbody tr", |row| {
        set_style(row, "cursor", "pointer");

        let pressed = row.clone();
        let on_start = Closure::<dyn Fn()>::new(move || {
            set_style(&pressed, "background-color", "rgba(0,0,0,0.05)");
        });
        let _ = row.add_event_listener_with_callback("touchstart", on_start.as_ref().unchecked_ref());
        on_start.forget();

        let released = row.clone();
        let on_end = Closure::<dyn Fn()>::new(move || {
            let released = released.clone();
            run_after(ROW_HIGHLIGHT_REVERT_MS, move || {
                set_style(&released, "background-color", "");
            });
        });
        let _ = row.add_event_listener_with_callback("touchend", on_end.as_ref().unchecked_ref());
        on_end.forget();
    });
}

/// Attach a "swipe for more" hint that is visible only while the table's
/// content overflows its viewport, and hidden while the user scrolls.
fn add_scroll_indicator(container: &HtmlElement) {
    // Re-running the pass must not stack indicators.
    if let Ok(Some(_)) = container.query_selector(".scroll-indicator") {
        return;
    }
    let Some(document) = document() else {
        return;
    };
    let Ok(indicator) = document.create_element("div") else {
        return;
    };
    indicator.set_class_name("scroll-indicator");
    indicator.set_text_content(Some("Swipe to see more"));
    let Ok(indicator) = indicator.dyn_into::<HtmlElement>() else {
        return;
    };
    indicator.style().set_css_text(
        "position: absolute; top: 50%; right: 10px; transform: translateY(-50%); \
         background: rgba(0,0,0,0.7); color: white; padding: 5px 10px; \
         border-radius: 15px; font-size: 12px; z-index: 10; pointer-events: none; \
         opacity: 0; transition: opacity 0.3s;",
    );

    set_style(container, "position", "relative");
    let _ = container.append_child(&indicator);

    let check_target = container.clone();
    let check_indicator = indicator.clone();
    let check = move || {
        let needs_scroll = check_target.scroll_width() > check_target.client_width();
        set_style(&check_indicator, "opacity", if needs_scroll { "1" } else { "0" });
    };
    check();

    let on_resize = Closure::<dyn Fn()>::new(check);
    if let Some(window) = web_sys::window() {
        let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
    }
    on_resize.forget();

    let on_scroll = Closure::<dyn Fn()>::new(move || {
        set_style(&indicator, "opacity", "0");
    });
    let _ = container.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
    on_scroll.forget();
}

// -- Modals --

fn optimize_modals(document: &Document) {
    let size = ScreenSize::current();
    for_each_element(document, ".modal .modal-dialog", |dialog| {
        let classes = dialog.class_list();
        if size == ScreenSize::Xs {
            let _ = classes.remove_1("modal-fullscreen-sm-down");
            let _ = classes.add_1("modal-fullscreen");
        } else {
            let _ = classes.remove_1("modal-fullscreen");
            let _ = classes.add_1("modal-fullscreen-sm-down");
        }
    });
    for_each_element(document, ".modal .modal-body", |body| {
        set_style(body, "-webkit-overflow-scrolling", "touch");
    });
}

// -- Charts --

fn optimize_charts(document: &Document, charts: Option<Rc<dyn ChartAdapter>>) {
    let height = chart_height(ScreenSize::current());
    for_each_element(document, ".chart-container", |container| {
        set_style(container, "height", &format!("{}px", height));
        if let Some(adapter) = charts.clone() {
            let container: Element = container.clone().into();
            // Let layout settle before asking the chart to re-measure.
            run_after(CHART_SETTLE_MS, move || {
                adapter.resize(&container);
            });
        }
    });
}

// -- Forms --

fn optimize_forms(document: &Document, profile: DeviceProfile) {
    for_each_element(document, "input, select, textarea", |el| {
        let input_type = el
            .dyn_ref::<HtmlInputElement>()
            .map(|input| input.type_())
            .unwrap_or_default();

        // A font below 16px makes iOS zoom the page on focus.
        if profile.is_ios && input_type != "file" && input_type != "range" {
            set_style(el, "font-size", "16px");
        }

        match input_type.as_str() {
            "number" => {
                let _ = el.set_attribute("inputmode", "numeric");
                let _ = el.set_attribute("pattern", "[0-9]*");
            }
            "email" => {
                let _ = el.set_attribute("inputmode", "email");
            }
            "tel" => {
                let _ = el.set_attribute("inputmode", "tel");
            }
            _ => {}
        }
    });
}

// -- Touch targets --

fn optimize_touch(document: &Document) {
    let Some(window) = web_sys::window() else {
        return;
    };

    for_each_element(
        document,
        ".btn, .nav-link, .dropdown-item, .page-link, .list-group-item-action",
        |target| {
            let min_height = window
                .get_computed_style(target)
                .ok()
                .flatten()
                .and_then(|style| style.get_property_value("min-height").ok())
                .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
                .unwrap_or(0.0);
            if min_height < MIN_TOUCH_TARGET_PX {
                set_style(target, "min-height", "44px");
                set_style(target, "display", "flex");
                set_style(target, "align-items", "center");
                set_style(target, "justify-content", "center");
            }
        },
    );

    let passive = AddEventListenerOptions::new();
    passive.set_passive(true);

    let on_start = Closure::<dyn Fn(web_sys::TouchEvent)>::new(|ev: web_sys::TouchEvent| {
        if let Some(target) = pressed_target(&ev) {
            set_style(&target, "transform", "scale(0.98)");
            set_style(&target, "transition", "transform 0.1s");
        }
    });
    let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
        "touchstart",
        on_start.as_ref().unchecked_ref(),
        &passive,
    );
    on_start.forget();

    let on_end = Closure::<dyn Fn(web_sys::TouchEvent)>::new(|ev: web_sys::TouchEvent| {
        if let Some(target) = pressed_target(&ev) {
            run_after(PRESS_REVERT_MS, move || {
                set_style(&target, "transform", "");
            });
        }
    });
    let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
        "touchend",
        on_end.as_ref().unchecked_ref(),
        &passive,
    );
    on_end.forget();
}

fn pressed_target(ev: &web_sys::TouchEvent) -> Option<HtmlElement> {
    ev.target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(".btn, .card, .list-group-item").ok().flatten())
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

// -- Zoom prevention (iOS) --

fn prevent_zoom(document: &Document, profile: DeviceProfile) {
    if !profile.is_ios {
        return;
    }

    let guard = Rc::new(RefCell::new(DoubleTapGuard::default()));
    let on_touch_end = Closure::<dyn Fn(web_sys::TouchEvent)>::new(move |ev: web_sys::TouchEvent| {
        if guard.borrow_mut().register(js_sys::Date::now()) {
            ev.prevent_default();
        }
    });
    let _ = document
        .add_event_listener_with_callback("touchend", on_touch_end.as_ref().unchecked_ref());
    on_touch_end.forget();

    for gesture in ["gesturestart", "gesturechange", "gestureend"] {
        let on_gesture = Closure::<dyn Fn(web_sys::Event)>::new(|ev: web_sys::Event| {
            ev.prevent_default();
        });
        let _ = document.add_event_listener_with_callback(gesture, on_gesture.as_ref().unchecked_ref());
        on_gesture.forget();
    }
}

// -- Orientation --

fn apply_orientation(document: &Document, profile: DeviceProfile) {
    if !(is_landscape() && profile.is_mobile) {
        return;
    }
    for_each_element(document, ".chart-container", |chart| {
        set_style(chart, "height", &format!("{}px", LANDSCAPE_CHART_HEIGHT));
    });
    for_each_element(document, ".navbar-nav .nav-link", |link| {
        set_style(link, "padding", "0.5rem 1rem");
    });
}

// -- Safe areas (iOS notches) --

fn expose_safe_area(document: &Document, profile: DeviceProfile) {
    if !profile.is_ios {
        return;
    }
    if let Some(root) = document
        .document_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        let _ = root.style().set_property("--sat", "env(safe-area-inset-top)");
        let _ = root.style().set_property("--sab", "env(safe-area-inset-bottom)");
    }
}

// -- Re-entrant triggers --

fn run_after(delay_ms: i32, f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once(f);
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        delay_ms,
    );
    callback.forget();
}

fn resize_pass(charts: Option<Rc<dyn ChartAdapter>>) {
    if let Some(document) = document() {
        optimize_charts(&document, charts);
        optimize_modals(&document);
    }
}

/// Debounced resize: the pass runs once per 250ms quiet period; each new
/// resize event supersedes the pending timer.
fn install_resize_listener(_profile: DeviceProfile, charts: Option<Rc<dyn ChartAdapter>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

    let on_resize = Closure::<dyn Fn()>::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(handle) = pending.take() {
            window.clear_timeout_with_handle(handle);
        }
        let charts = charts.clone();
        let fired = pending.clone();
        let callback = Closure::once(move || {
            fired.set(None);
            resize_pass(charts);
        });
        if let Ok(handle) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            RESIZE_DEBOUNCE_MS,
        ) {
            pending.set(Some(handle));
        }
        callback.forget();
    });
    let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
    on_resize.forget();
}

/// Orientation changes wait a fixed settle delay so the viewport reports
/// its final dimensions, then re-apply orientation and sizing passes.
fn install_orientation_listener(profile: DeviceProfile, charts: Option<Rc<dyn ChartAdapter>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let on_change = Closure::<dyn Fn()>::new(move || {
        let charts = charts.clone();
        run_after(ORIENTATION_SETTLE_MS, move || {
            if let Some(document) = document() {
                apply_orientation(&document, profile);
            }
            resize_pass(charts);
        });
    });
    let _ = window
        .add_event_listener_with_callback("orientationchange", on_change.as_ref().unchecked_ref());
    on_change.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
                             AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";
    const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn buckets_follow_documented_breakpoints() {
        assert_eq!(ScreenSize::from_width(0), ScreenSize::Xs);
        assert_eq!(ScreenSize::from_width(575), ScreenSize::Xs);
        assert_eq!(ScreenSize::from_width(576), ScreenSize::Sm);
        assert_eq!(ScreenSize::from_width(767), ScreenSize::Sm);
        assert_eq!(ScreenSize::from_width(768), ScreenSize::Md);
        assert_eq!(ScreenSize::from_width(991), ScreenSize::Md);
        assert_eq!(ScreenSize::from_width(992), ScreenSize::Lg);
        assert_eq!(ScreenSize::from_width(1199), ScreenSize::Lg);
        assert_eq!(ScreenSize::from_width(1200), ScreenSize::Xl);
        assert_eq!(ScreenSize::from_width(5000), ScreenSize::Xl);
    }

    #[test]
    fn buckets_are_monotonic_in_width() {
        let mut previous = ScreenSize::from_width(0);
        for width in 1..2000 {
            let current = ScreenSize::from_width(width);
            assert!(current >= previous, "bucket regressed at width {}", width);
            previous = current;
        }
    }

    #[test]
    fn chart_heights_per_bucket() {
        assert_eq!(chart_height(ScreenSize::Xs), 250);
        assert_eq!(chart_height(ScreenSize::Sm), 300);
        assert_eq!(chart_height(ScreenSize::Md), 400);
        assert_eq!(chart_height(ScreenSize::Lg), 400);
        assert_eq!(chart_height(ScreenSize::Xl), 400);
    }

    #[test]
    fn double_tap_within_window_is_suppressed() {
        let mut guard = DoubleTapGuard::default();
        assert!(!guard.register(1000.0));
        assert!(guard.register(1250.0));
    }

    #[test]
    fn taps_outside_window_pass_through() {
        let mut guard = DoubleTapGuard::default();
        assert!(!guard.register(1000.0));
        assert!(!guard.register(1301.0));
        // The second tap still resets the window.
        assert!(guard.register(1500.0));
    }

    #[test]
    fn iphone_classifies_as_mobile_ios() {
        let profile = DeviceProfile::classify(IPHONE_UA, 390, 5, true);
        assert!(profile.is_mobile);
        assert!(profile.is_ios);
        assert!(!profile.is_android);
        assert!(!profile.is_tablet);
        assert!(profile.is_touch);
    }

    #[test]
    fn wide_android_classifies_as_tablet() {
        let profile = DeviceProfile::classify(ANDROID_UA, 800, 5, true);
        assert!(profile.is_mobile);
        assert!(profile.is_android);
        assert!(profile.is_tablet);
    }

    #[test]
    fn desktop_is_neither_mobile_nor_tablet() {
        let profile = DeviceProfile::classify(DESKTOP_UA, 1440, 0, false);
        assert!(!profile.is_mobile);
        assert!(!profile.is_tablet);
        assert!(!profile.is_touch);
        assert!(!profile.handheld());
    }
}

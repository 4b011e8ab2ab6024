use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, NodeList, Window,
};

use crate::error::BehaviorError;

pub fn browser_window() -> Result<Window, BehaviorError> {
    window().ok_or(BehaviorError::MissingWindow)
}

pub fn browser_document() -> Result<Document, BehaviorError> {
    browser_window()?
        .document()
        .ok_or(BehaviorError::MissingDocument)
}

pub fn scroll_y(win: &Window) -> f64 {
    win.scroll_y().unwrap_or(0.0)
}

pub fn viewport_width(win: &Window) -> f64 {
    win.inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0)
}

fn collect(nodes: NodeList) -> Vec<Element> {
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, BehaviorError> {
    document
        .query_selector_all(selector)
        .map(collect)
        .map_err(|err| BehaviorError::js("querySelectorAll", err))
}

pub fn query_all_in(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(collect)
        .unwrap_or_default()
}

pub fn set_class(element: &Element, class: &str, enabled: bool) {
    let class_list = element.class_list();
    let _ = if enabled {
        class_list.add_1(class)
    } else {
        class_list.remove_1(class)
    };
}

pub fn set_style(element: &Element, property: &str, value: &str) {
    if let Some(element) = element.dyn_ref::<HtmlElement>() {
        let _ = element.style().set_property(property, value);
    }
}

pub fn set_css_text(element: &Element, css: &str) {
    if let Some(element) = element.dyn_ref::<HtmlElement>() {
        element.style().set_css_text(css);
    }
}

pub fn has_property(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

pub fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), BehaviorError> {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        .map_err(|err| BehaviorError::js("addEventListener", err))?;
    callback.forget();
    Ok(())
}

pub fn listen_passive(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), BehaviorError> {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(|err| BehaviorError::js("addEventListener", err))?;
    callback.forget();
    Ok(())
}

pub fn request_frame(win: &Window, callback: impl FnOnce(f64) + 'static) -> Result<(), BehaviorError> {
    let callback = Closure::once_into_js(callback);
    win.request_animation_frame(callback.unchecked_ref::<Function>())
        .map(|_| ())
        .map_err(|err| BehaviorError::js("requestAnimationFrame", err))
}

pub fn intersection_observer(
    options: Option<&IntersectionObserverInit>,
    mut on_visible: impl FnMut(Element, &IntersectionObserver) + 'static,
) -> Result<IntersectionObserver, BehaviorError> {
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    on_visible(entry.target(), &observer);
                }
            }
        },
    );

    let observer = match options {
        Some(options) => {
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), options)
        }
        None => IntersectionObserver::new(callback.as_ref().unchecked_ref()),
    }
    .map_err(|err| BehaviorError::js("IntersectionObserver", err))?;
    callback.forget();
    Ok(observer)
}

/// Appends a throwaway `div` styled with `css`; the caller schedules its removal.
pub fn append_overlay(
    document: &Document,
    host: &Element,
    class: Option<&str>,
    css: &str,
) -> Result<Element, BehaviorError> {
    let overlay = document
        .create_element("div")
        .map_err(|err| BehaviorError::js("createElement", err))?;
    if let Some(class) = class {
        overlay.set_class_name(class);
    }
    set_css_text(&overlay, css);
    set_style(host, "position", "relative");
    set_style(host, "overflow", "hidden");
    host.append_child(&overlay)
        .map_err(|err| BehaviorError::js("appendChild", err))?;
    Ok(overlay)
}

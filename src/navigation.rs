pub const NAVBAR_ID: &str = "navbar";
pub const HAMBURGER_ID: &str = "hamburger";
pub const NAV_MENU_ID: &str = "nav-menu";
pub const NAV_LINK_SELECTOR: &str = ".nav-link";
pub const IN_PAGE_LINK_SELECTOR: &str = "a[href^=\"#\"]";
pub const SECTION_SELECTOR: &str = "section";
pub const SCROLLED_CLASS: &str = "scrolled";
pub const ACTIVE_LINK_CLASS: &str = "active";

pub fn navbar_scrolled(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionBand {
    pub id: Option<String>,
    pub top: f64,
    pub height: f64,
}

impl SectionBand {
    fn contains(&self, scroll_y: f64, lead: f64) -> bool {
        let band_top = self.top - lead;
        scroll_y >= band_top && scroll_y < band_top + self.height
    }
}

/// Id of the section whose trigger band holds `scroll_y`. Later sections win
/// when bands overlap.
pub fn current_section(sections: &[SectionBand], scroll_y: f64, lead: f64) -> Option<&str> {
    sections
        .iter()
        .filter(|section| section.contains(scroll_y, lead))
        .last()
        .and_then(|section| section.id.as_deref())
}

pub fn link_is_active(href: Option<&str>, current: Option<&str>) -> bool {
    match (href.and_then(anchor_id), current) {
        (Some(target), Some(current)) => target == current,
        _ => false,
    }
}

pub fn anchor_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub fn needs_fallback_scroll(native_smooth: bool, is_nav_link: bool, href: Option<&str>) -> bool {
    !native_smooth && !is_nav_link && href.and_then(anchor_id).is_some()
}

pub fn anchor_scroll_top(target_top: f64, navbar_offset: f64) -> f64 {
    target_top - navbar_offset
}

pub fn ease_in_out_quad(elapsed: f64, start: f64, distance: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return start + distance;
    }

    let t = elapsed.clamp(0.0, duration) / (duration / 2.0);
    if t < 1.0 {
        distance / 2.0 * t * t + start
    } else {
        let t = t - 1.0;
        -distance / 2.0 * (t * (t - 2.0) - 1.0) + start
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::bind;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::{cell::RefCell, rc::Rc};
    use wasm_bindgen::JsCast;
    use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

    use super::*;
    use crate::{
        chrome::ChromeHandle,
        config::{as_timer_millis, BehaviorConfig},
        dom,
        error::BehaviorError,
    };

    fn section_bands(sections: &[Element]) -> Vec<SectionBand> {
        sections
            .iter()
            .map(|section| SectionBand {
                id: section.get_attribute("id"),
                top: section
                    .dyn_ref::<HtmlElement>()
                    .map(|section| f64::from(section.offset_top()))
                    .unwrap_or_default(),
                height: f64::from(section.client_height()),
            })
            .collect()
    }

    fn highlight_current(links: &[Element], sections: &[Element], scroll_y: f64, lead: f64) {
        let bands = section_bands(sections);
        let current = current_section(&bands, scroll_y, lead);

        for link in links {
            let href = link.get_attribute("href");
            dom::set_class(link, ACTIVE_LINK_CLASS, link_is_active(href.as_deref(), current));
        }
    }

    fn supports_native_smooth_scroll(document: &Document) -> bool {
        document
            .document_element()
            .and_then(|root| root.dyn_into::<HtmlElement>().ok())
            .is_some_and(|root| dom::has_property(&root.style(), "scrollBehavior"))
    }

    fn animate_scroll(win: Window, start: f64, distance: f64, duration: f64, started_at: Option<f64>) {
        let frame_window = win.clone();
        let scheduled = dom::request_frame(&win, move |now| {
            let started_at = started_at.unwrap_or(now);
            let elapsed = now - started_at;
            frame_window.scroll_to_with_x_and_y(
                0.0,
                ease_in_out_quad(elapsed, start, distance, duration),
            );
            if elapsed < duration {
                animate_scroll(frame_window, start, distance, duration, Some(started_at));
            }
        });

        if let Err(err) = scheduled {
            log::warn!("smooth scroll fallback stopped: {err}");
        }
    }

    fn scroll_to_anchor(win: &Window, native_smooth: bool, top: f64, fallback_ms: u32) {
        if native_smooth {
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            win.scroll_to_with_scroll_to_options(&options);
        } else {
            let start = dom::scroll_y(win);
            animate_scroll(win.clone(), start, top - start, f64::from(fallback_ms), None);
        }
    }

    #[derive(Clone)]
    struct AnchorScroll {
        win: Window,
        document: Document,
        native_smooth: bool,
        offset: f64,
        fallback_ms: u32,
    }

    impl AnchorScroll {
        fn scroll_to(&self, target_id: &str) {
            let Some(target) = self
                .document
                .get_element_by_id(target_id)
                .and_then(|target| target.dyn_into::<HtmlElement>().ok())
            else {
                log::debug!("no section #{target_id}; not scrolling");
                return;
            };

            let top = anchor_scroll_top(f64::from(target.offset_top()), self.offset);
            scroll_to_anchor(&self.win, self.native_smooth, top, self.fallback_ms);
        }
    }

    fn bind_fallback_anchors(document: &Document, scroller: &AnchorScroll) -> Result<(), BehaviorError> {
        let mut bound = 0;
        for link in dom::query_all(document, IN_PAGE_LINK_SELECTOR)? {
            let href = link.get_attribute("href");
            let is_nav_link = link.matches(NAV_LINK_SELECTOR).unwrap_or(false);
            if !needs_fallback_scroll(scroller.native_smooth, is_nav_link, href.as_deref()) {
                continue;
            }

            let scroller = scroller.clone();
            dom::listen(&link, "click", move |event| {
                if let Some(target_id) = href.as_deref().and_then(anchor_id) {
                    event.prevent_default();
                    scroller.scroll_to(target_id);
                }
            })?;
            bound += 1;
        }
        log::debug!("eased scrolling bound to {bound} in-page links");
        Ok(())
    }

    pub fn bind(
        win: &Window,
        document: &Document,
        config: &BehaviorConfig,
        chrome: Rc<RefCell<ChromeHandle>>,
    ) -> Result<(), BehaviorError> {
        let navbar = document.get_element_by_id(NAVBAR_ID);
        let hamburger = document.get_element_by_id(HAMBURGER_ID);
        let nav_menu = document.get_element_by_id(NAV_MENU_ID);
        let links = Rc::new(dom::query_all(document, NAV_LINK_SELECTOR)?);
        let sections = Rc::new(dom::query_all(document, SECTION_SELECTOR)?);
        log::debug!(
            "navigation: navbar={} links={} sections={}",
            navbar.is_some(),
            links.len(),
            sections.len()
        );

        chrome
            .borrow_mut()
            .attach_menu(hamburger.clone(), nav_menu.clone());

        let threshold = config.scrolled_threshold_px;
        if let Some(navbar) = navbar.as_ref() {
            dom::set_class(navbar, SCROLLED_CLASS, navbar_scrolled(dom::scroll_y(win), threshold));
        }

        {
            let scroll_window = win.clone();
            let links = links.clone();
            let lead = config.section_lead_px;
            dom::listen(win, "scroll", move |_| {
                let scroll_y = dom::scroll_y(&scroll_window);
                if let Some(navbar) = navbar.as_ref() {
                    dom::set_class(navbar, SCROLLED_CLASS, navbar_scrolled(scroll_y, threshold));
                }
                highlight_current(&links, &sections, scroll_y, lead);
            })?;
        }

        if let Some(hamburger) = hamburger.as_ref() {
            let chrome = chrome.clone();
            dom::listen(hamburger, "click", move |_| chrome.borrow_mut().toggle_menu())?;
        }

        let scroller = AnchorScroll {
            win: win.clone(),
            document: document.clone(),
            native_smooth: supports_native_smooth_scroll(document),
            offset: config.anchor_offset_px,
            fallback_ms: as_timer_millis(config.scroll_fallback),
        };

        for link in links.iter() {
            let chrome = chrome.clone();
            let scroller = scroller.clone();
            let href = link.get_attribute("href");

            dom::listen(link, "click", move |event| {
                chrome.borrow_mut().close_menu();

                let Some(target_id) = href.as_deref().and_then(anchor_id) else {
                    return;
                };
                event.prevent_default();
                scroller.scroll_to(target_id);
            })?;
        }

        if !scroller.native_smooth {
            bind_fallback_anchors(document, &scroller)?;
        }

        let resize_window = win.clone();
        let breakpoint = config.mobile_breakpoint_px;
        dom::listen(win, "resize", move |_| {
            let width = dom::viewport_width(&resize_window);
            chrome.borrow_mut().on_resize(width, breakpoint);
        })
    }
}

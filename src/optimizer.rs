use url::Url;

pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";
pub const DEFERRED_SRC_ATTR: &str = "data-src";
pub const LAZY_CLASS: &str = "lazy";

#[derive(Debug, Default)]
pub struct FrameThrottle {
    pending: bool,
}

impl FrameThrottle {
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    pub fn frame_ran(&mut self) {
        self.pending = false;
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintKind {
    Preconnect,
    PreloadStyle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceHint {
    pub kind: HintKind,
    pub href: String,
}

impl ResourceHint {
    pub fn rel(&self) -> &'static str {
        match self.kind {
            HintKind::Preconnect => "preconnect",
            HintKind::PreloadStyle => "preload",
        }
    }

    pub fn as_type(&self) -> Option<&'static str> {
        match self.kind {
            HintKind::Preconnect => None,
            HintKind::PreloadStyle => Some("style"),
        }
    }
}

pub fn resource_hints(fonts: &[Url]) -> Vec<ResourceHint> {
    let mut origins: Vec<String> = Vec::new();
    for font in fonts {
        let origin = font.origin().ascii_serialization();
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }

    origins
        .into_iter()
        .map(|href| ResourceHint {
            kind: HintKind::Preconnect,
            href,
        })
        .chain(fonts.iter().map(|font| ResourceHint {
            kind: HintKind::PreloadStyle,
            href: font.to_string(),
        }))
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub use web::bind;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::{cell::RefCell, rc::Rc};
    use web_sys::{Document, Element, Window};

    use super::*;
    use crate::{config::BehaviorConfig, dom, error::BehaviorError};

    fn load_deferred(image: &Element) -> bool {
        let Some(src) = image.get_attribute(DEFERRED_SRC_ATTR) else {
            return false;
        };
        let _ = image.set_attribute("src", &src);
        dom::set_class(image, LAZY_CLASS, false);
        true
    }

    fn bind_lazy_images(win: &Window, document: &Document) -> Result<(), BehaviorError> {
        let images = dom::query_all(document, LAZY_IMAGE_SELECTOR)?;
        if images.is_empty() {
            return Ok(());
        }

        if !dom::has_property(win, "IntersectionObserver") {
            log::debug!("no IntersectionObserver; loading {} images eagerly", images.len());
            for image in &images {
                load_deferred(image);
            }
            return Ok(());
        }

        let observer = dom::intersection_observer(None, |image, observer| {
            if load_deferred(&image) {
                observer.unobserve(&image);
            }
        })?;
        for image in &images {
            observer.observe(image);
        }
        log::debug!("lazy images: observing {}", images.len());
        Ok(())
    }

    fn bind_scroll_throttle(win: &Window) -> Result<(), BehaviorError> {
        let throttle = Rc::new(RefCell::new(FrameThrottle::default()));
        let frame_window = win.clone();

        dom::listen_passive(win, "scroll", move |_| {
            if !throttle.borrow_mut().request() {
                return;
            }

            let frame_throttle = throttle.clone();
            // Frame body is the hook for batched scroll work; nothing runs here yet.
            let scheduled = dom::request_frame(&frame_window, move |_| {
                frame_throttle.borrow_mut().frame_ran();
            });
            if let Err(err) = scheduled {
                log::debug!("{err}");
                throttle.borrow_mut().frame_ran();
            }
        })
    }

    fn inject_hints(document: &Document, config: &BehaviorConfig) -> Result<(), BehaviorError> {
        let head = document.head().ok_or(BehaviorError::MissingNode("head"))?;

        for hint in resource_hints(&config.preload_fonts) {
            let link = document
                .create_element("link")
                .map_err(|err| BehaviorError::js("createElement", err))?;
            let _ = link.set_attribute("rel", hint.rel());
            let _ = link.set_attribute("href", &hint.href);
            if let Some(as_type) = hint.as_type() {
                let _ = link.set_attribute("as", as_type);
            }
            head.append_child(&link)
                .map_err(|err| BehaviorError::js("appendChild", err))?;
        }
        Ok(())
    }

    pub fn bind(win: &Window, document: &Document, config: &BehaviorConfig) -> Result<(), BehaviorError> {
        bind_lazy_images(win, document)?;
        bind_scroll_throttle(win)?;
        inject_hints(document, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_scrolls_schedules_one_frame() {
        let mut throttle = FrameThrottle::default();

        let scheduled = (0..25).filter(|_| throttle.request()).count();
        assert_eq!(scheduled, 1);
        assert!(throttle.is_pending());

        throttle.frame_ran();
        assert!(!throttle.is_pending());
        assert!(throttle.request());
        assert!(!throttle.request());
    }

    #[test]
    fn hints_preconnect_each_origin_once_then_preload() {
        let fonts = [
            Url::parse("https://fonts.googleapis.com/css2?family=Inter:wght@400&display=swap")
                .expect("valid URL"),
            Url::parse("https://fonts.googleapis.com/css2?family=Fira+Code&display=swap")
                .expect("valid URL"),
            Url::parse("https://cdn.example.com:8443/fonts.css").expect("valid URL"),
        ];

        let hints = resource_hints(&fonts);
        let summary: Vec<_> = hints
            .iter()
            .map(|hint| (hint.rel(), hint.as_type(), hint.href.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("preconnect", None, "https://fonts.googleapis.com"),
                ("preconnect", None, "https://cdn.example.com:8443"),
                (
                    "preload",
                    Some("style"),
                    "https://fonts.googleapis.com/css2?family=Inter:wght@400&display=swap"
                ),
                (
                    "preload",
                    Some("style"),
                    "https://fonts.googleapis.com/css2?family=Fira+Code&display=swap"
                ),
                ("preload", Some("style"), "https://cdn.example.com:8443/fonts.css"),
            ]
        );
    }

    #[test]
    fn no_fonts_means_no_hints() {
        assert!(resource_hints(&[]).is_empty());
    }
}

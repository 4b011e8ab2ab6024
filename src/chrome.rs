use crate::preference::Theme;

pub const MENU_OPEN_CLASS: &str = "active";
pub const SCROLL_LOCK_OVERFLOW: &str = "hidden";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageChrome {
    menu_open: bool,
    theme: Theme,
}

impl PageChrome {
    pub fn new(theme: Theme) -> Self {
        Self {
            menu_open: false,
            theme,
        }
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn scroll_locked(&self) -> bool {
        self.menu_open
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    pub fn close_menu(&mut self) -> bool {
        std::mem::replace(&mut self.menu_open, false)
    }

    pub fn on_resize(&mut self, viewport_width: f64, breakpoint: f64) -> bool {
        if viewport_width > breakpoint {
            self.close_menu()
        } else {
            false
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::ChromeHandle;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{Element, HtmlElement};

    use super::{PageChrome, MENU_OPEN_CLASS, SCROLL_LOCK_OVERFLOW};
    use crate::{dom, preference::DARK_THEME_CLASS, preference::Theme};

    pub struct ChromeHandle {
        state: PageChrome,
        body: HtmlElement,
        hamburger: Option<Element>,
        nav_menu: Option<Element>,
    }

    impl ChromeHandle {
        pub fn new(body: HtmlElement, theme: Theme) -> Self {
            let handle = Self {
                state: PageChrome::new(theme),
                body,
                hamburger: None,
                nav_menu: None,
            };
            handle.sync_theme();
            handle
        }

        pub fn attach_menu(&mut self, hamburger: Option<Element>, nav_menu: Option<Element>) {
            self.hamburger = hamburger;
            self.nav_menu = nav_menu;
            self.sync_menu();
        }

        pub fn toggle_menu(&mut self) {
            self.state.toggle_menu();
            self.sync_menu();
        }

        pub fn close_menu(&mut self) {
            self.state.close_menu();
            self.sync_menu();
        }

        pub fn on_resize(&mut self, viewport_width: f64, breakpoint: f64) {
            if self.state.on_resize(viewport_width, breakpoint) {
                log::debug!("viewport {viewport_width}px wide; mobile menu closed");
            }
            self.sync_menu();
        }

        pub fn toggle_theme(&mut self) -> Theme {
            let theme = self.state.toggle_theme();
            self.sync_theme();
            theme
        }

        fn sync_menu(&self) {
            let open = self.state.menu_open();
            for element in [&self.hamburger, &self.nav_menu].into_iter().flatten() {
                dom::set_class(element, MENU_OPEN_CLASS, open);
            }

            let overflow = if self.state.scroll_locked() {
                SCROLL_LOCK_OVERFLOW
            } else {
                ""
            };
            dom::set_style(&self.body, "overflow", overflow);
        }

        fn sync_theme(&self) {
            dom::set_class(&self.body, DARK_THEME_CLASS, self.state.theme().is_dark());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_lock_follows_menu() {
        let mut chrome = PageChrome::default();
        assert!(!chrome.scroll_locked());

        assert!(chrome.toggle_menu());
        assert!(chrome.menu_open());
        assert!(chrome.scroll_locked());

        assert!(!chrome.toggle_menu());
        assert!(!chrome.scroll_locked());
    }

    #[test]
    fn wide_resize_clears_open_menu_without_toggle() {
        let mut chrome = PageChrome::default();
        chrome.toggle_menu();

        assert!(!chrome.on_resize(768.0, 768.0));
        assert!(chrome.scroll_locked());

        assert!(chrome.on_resize(1024.0, 768.0));
        assert!(!chrome.menu_open());
        assert!(!chrome.scroll_locked());

        assert!(!chrome.on_resize(1280.0, 768.0));
        assert!(!chrome.menu_open());
    }

    #[test]
    fn link_click_close_is_idempotent() {
        let mut chrome = PageChrome::default();
        assert!(!chrome.close_menu());

        chrome.toggle_menu();
        assert!(chrome.close_menu());
        assert!(!chrome.close_menu());
        assert!(!chrome.scroll_locked());
    }

    #[test]
    fn theme_toggle_keeps_menu_untouched() {
        let mut chrome = PageChrome::new(Theme::Light);
        chrome.toggle_menu();

        assert_eq!(chrome.toggle_theme(), Theme::Dark);
        assert_eq!(chrome.theme(), Theme::Dark);
        assert!(chrome.menu_open());
        assert_eq!(chrome.toggle_theme(), Theme::Light);
    }
}

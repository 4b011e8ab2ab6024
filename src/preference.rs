pub const THEME_KEY: &str = "theme";
pub const DARK_THEME_CLASS: &str = "dark-theme";
pub const THEME_TOGGLE_SELECTOR: &str = ".theme-toggle";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{bind, read_stored_theme};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::{cell::RefCell, rc::Rc};
    use web_sys::{window, Document, Storage};

    use super::{Theme, THEME_KEY, THEME_TOGGLE_SELECTOR};
    use crate::{chrome::ChromeHandle, dom, error::BehaviorError};

    fn local_storage() -> Option<Storage> {
        window()?.local_storage().ok().flatten()
    }

    pub fn read_stored_theme() -> Option<Theme> {
        let value = local_storage()?.get_item(THEME_KEY).ok().flatten()?;
        Theme::from_str(&value)
    }

    fn system_prefers_dark() -> bool {
        window()
            .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .map(|mq| mq.matches())
            .unwrap_or(false)
    }

    fn persist_theme(theme: Theme) {
        if let Some(storage) = local_storage() {
            if let Err(err) = storage.set_item(THEME_KEY, theme.as_str()) {
                log::warn!("{}", BehaviorError::js("localStorage.setItem", err));
            }
        }
    }

    pub fn bind(document: &Document, chrome: Rc<RefCell<ChromeHandle>>) -> Result<(), BehaviorError> {
        // Inspected only; the page ships no automatic dark stylesheet.
        log::debug!("system prefers dark: {}", system_prefers_dark());

        let Some(toggle) = document
            .query_selector(THEME_TOGGLE_SELECTOR)
            .map_err(|err| BehaviorError::js("querySelector", err))?
        else {
            log::debug!("no {THEME_TOGGLE_SELECTOR}; theme toggle not bound");
            return Ok(());
        };

        dom::listen(&toggle, "click", move |_| {
            let next = chrome.borrow_mut().toggle_theme();
            persist_theme(next);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_round_trip() {
        for theme in [Theme::Light, Theme::Dark] {
            assert_eq!(Theme::from_str(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::from_str("Dark"), None);
        assert_eq!(Theme::from_str(""), None);
    }

    #[test]
    fn toggle_flips_between_two_states() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert!(Theme::Light.toggled().is_dark());
        assert_eq!(Theme::default(), Theme::Light);
    }
}

pub const TYPING_SELECTOR: &str = ".typing-animation";

#[derive(Debug)]
pub struct Typewriter {
    text: String,
    shown: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shown: 0,
        }
    }

    pub fn tick(&mut self) -> Option<&str> {
        let next = self.text[self.shown..].chars().next()?;
        self.shown += next.len_utf8();
        Some(&self.text[..self.shown])
    }

    #[cfg(test)]
    pub fn is_done(&self) -> bool {
        self.shown == self.text.len()
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::start;

#[cfg(target_arch = "wasm32")]
mod web {
    use gloo_timers::future::TimeoutFuture;
    use std::time::Duration;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::Element;

    use super::Typewriter;
    use crate::config::as_timer_millis;

    pub fn start(element: Element, text: String, delay: Duration) {
        let delay = as_timer_millis(delay);
        let mut writer = Typewriter::new(text);
        element.set_text_content(Some(""));

        spawn_local(async move {
            while let Some(prefix) = writer.tick() {
                if !element.is_connected() {
                    log::debug!("typing target detached; stopping");
                    return;
                }
                element.set_text_content(Some(prefix));
                TimeoutFuture::new(delay).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_one_character_per_tick() {
        let mut writer = Typewriter::new("Hi!");

        assert_eq!(writer.tick(), Some("H"));
        assert_eq!(writer.tick(), Some("Hi"));
        assert!(!writer.is_done());
        assert_eq!(writer.tick(), Some("Hi!"));
        assert!(writer.is_done());
        assert_eq!(writer.tick(), None);
        assert_eq!(writer.tick(), None);
    }

    #[test]
    fn multibyte_characters_are_never_split() {
        let mut writer = Typewriter::new("né✓");

        assert_eq!(writer.tick(), Some("n"));
        assert_eq!(writer.tick(), Some("né"));
        assert_eq!(writer.tick(), Some("né✓"));
        assert_eq!(writer.tick(), None);
    }

    #[test]
    fn empty_text_finishes_immediately() {
        let mut writer = Typewriter::new("");

        assert!(writer.is_done());
        assert_eq!(writer.tick(), None);
    }
}

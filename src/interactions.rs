use std::time::Duration;

pub const CONTACT_FORM_ID: &str = "contactForm";
pub const SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";
pub const SENDING_HTML: &str = "<span class=\"loading\"></span> Sending...";
pub const SENT_HTML: &str = "✓ Message Sent!";
pub const SENT_BACKGROUND: &str = "#10b981";

pub const PROJECT_CARD_SELECTOR: &str = ".project-card";
pub const PROJECT_LINK_SELECTOR: &str = ".project-link";
pub const HOVER_TRANSFORM: &str = "scale(1.1) rotate(5deg)";
pub const NEUTRAL_TRANSFORM: &str = "scale(1) rotate(0deg)";

pub const SKILL_TAG_SELECTOR: &str = ".skill-tag";
pub const TAG_RIPPLE_CLASS: &str = "ripple";
pub const TAG_RIPPLE_CSS: &str = "position: absolute; inset: 0; border-radius: 50%; \
     background: rgba(255, 255, 255, 0.3); transform: scale(0); \
     animation: ripple 0.6s linear; pointer-events: none;";

pub const BUTTON_SELECTOR: &str = ".btn";
pub const CLICK_RIPPLE_SIZE_PX: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Sending,
    Sent,
}

impl SubmitPhase {
    pub fn control_disabled(self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn label_html(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Sending => Some(SENDING_HTML),
            Self::Sent => Some(SENT_HTML),
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Self::Sent => SENT_BACKGROUND,
            Self::Idle | Self::Sending => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitTimeline {
    pub sending: Duration,
    pub sent_hold: Duration,
}

impl SubmitTimeline {
    pub fn phase_at(&self, elapsed: Duration) -> SubmitPhase {
        if elapsed < self.sending {
            SubmitPhase::Sending
        } else if elapsed < self.sending + self.sent_hold {
            SubmitPhase::Sent
        } else {
            SubmitPhase::Idle
        }
    }
}

pub fn click_point(client_x: f64, client_y: f64, rect_left: f64, rect_top: f64) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

pub fn click_ripple_css(x: f64, y: f64) -> String {
    let size = CLICK_RIPPLE_SIZE_PX;
    let half = size / 2.0;
    format!(
        "position: absolute; width: {size}px; height: {size}px; border-radius: 50%; \
         background: rgba(255, 255, 255, 0.3); left: {}px; top: {}px; transform: scale(0); \
         animation: buttonClick 0.6s ease-out; pointer-events: none;",
        x - half,
        y - half
    )
}

#[cfg(target_arch = "wasm32")]
pub use web::bind;

#[cfg(target_arch = "wasm32")]
mod web {
    use gloo_timers::{callback::Timeout, future::TimeoutFuture};
    use std::{cell::Cell, rc::Rc, time::Duration};
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, Element, HtmlButtonElement, HtmlFormElement, MouseEvent};

    use super::*;
    use crate::{
        config::{as_timer_millis, BehaviorConfig},
        dom,
        error::BehaviorError,
        reveal::stagger_delay,
    };

    fn apply_phase(button: &HtmlButtonElement, phase: SubmitPhase, original_label: &str) {
        match phase.label_html() {
            Some(html) => button.set_inner_html(html),
            None => button.set_text_content(Some(original_label)),
        }
        button.set_disabled(phase.control_disabled());
        dom::set_style(button, "background", phase.background());
    }

    fn bind_contact_form(document: &Document, timeline: SubmitTimeline) -> Result<(), BehaviorError> {
        let Some(form) = document
            .get_element_by_id(CONTACT_FORM_ID)
            .and_then(|form| form.dyn_into::<HtmlFormElement>().ok())
        else {
            log::debug!("no #{CONTACT_FORM_ID}; form simulation not bound");
            return Ok(());
        };

        let in_flight = Rc::new(Cell::new(false));
        let listen_target = form.clone();
        dom::listen(&listen_target, "submit", move |event| {
            event.prevent_default();
            if in_flight.get() {
                return;
            }

            let Some(button) = form
                .query_selector(SUBMIT_SELECTOR)
                .ok()
                .flatten()
                .and_then(|button| button.dyn_into::<HtmlButtonElement>().ok())
            else {
                return;
            };

            in_flight.set(true);
            let original_label = button.text_content().unwrap_or_default();
            apply_phase(&button, timeline.phase_at(Duration::ZERO), &original_label);

            let form = form.clone();
            let in_flight = in_flight.clone();
            spawn_local(async move {
                TimeoutFuture::new(as_timer_millis(timeline.sending)).await;
                if button.is_connected() {
                    apply_phase(&button, timeline.phase_at(timeline.sending), &original_label);
                    form.reset();

                    TimeoutFuture::new(as_timer_millis(timeline.sent_hold)).await;
                    if button.is_connected() {
                        let done = timeline.sending + timeline.sent_hold;
                        apply_phase(&button, timeline.phase_at(done), &original_label);
                    }
                }
                in_flight.set(false);
            });
        })
    }

    fn bind_project_hovers(document: &Document, stagger: Duration) -> Result<(), BehaviorError> {
        for card in dom::query_all(document, PROJECT_CARD_SELECTOR)? {
            let links = Rc::new(dom::query_all_in(&card, PROJECT_LINK_SELECTOR));
            // Bumped on leave so pending enter timers turn into no-ops.
            let hover_generation = Rc::new(Cell::new(0_u64));

            {
                let links = links.clone();
                let hover_generation = hover_generation.clone();
                dom::listen(&card, "mouseenter", move |_| {
                    let generation = hover_generation.get();
                    for (index, link) in links.iter().enumerate() {
                        let link = link.clone();
                        let hover_generation = hover_generation.clone();
                        Timeout::new(as_timer_millis(stagger_delay(index, stagger)), move || {
                            if hover_generation.get() == generation {
                                dom::set_style(&link, "transform", HOVER_TRANSFORM);
                            }
                        })
                        .forget();
                    }
                })?;
            }

            dom::listen(&card, "mouseleave", move |_| {
                hover_generation.set(hover_generation.get().wrapping_add(1));
                for link in links.iter() {
                    dom::set_style(link, "transform", NEUTRAL_TRANSFORM);
                }
            })?;
        }
        Ok(())
    }

    fn remove_later(overlay: Element, lifetime: Duration) {
        Timeout::new(as_timer_millis(lifetime), move || overlay.remove()).forget();
    }

    fn bind_tag_ripples(document: &Document, lifetime: Duration) -> Result<(), BehaviorError> {
        for tag in dom::query_all(document, SKILL_TAG_SELECTOR)? {
            let document = document.clone();
            let host = tag.clone();
            dom::listen(&tag, "mouseenter", move |_| {
                match dom::append_overlay(&document, &host, Some(TAG_RIPPLE_CLASS), TAG_RIPPLE_CSS) {
                    Ok(ripple) => remove_later(ripple, lifetime),
                    Err(err) => log::debug!("tag ripple skipped: {err}"),
                }
            })?;
        }
        Ok(())
    }

    fn bind_button_ripples(document: &Document, lifetime: Duration) -> Result<(), BehaviorError> {
        for button in dom::query_all(document, BUTTON_SELECTOR)? {
            let document = document.clone();
            let host = button.clone();
            dom::listen(&button, "click", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let rect = host.get_bounding_client_rect();
                let (x, y) = click_point(
                    f64::from(event.client_x()),
                    f64::from(event.client_y()),
                    rect.left(),
                    rect.top(),
                );

                match dom::append_overlay(&document, &host, None, &click_ripple_css(x, y)) {
                    Ok(circle) => remove_later(circle, lifetime),
                    Err(err) => log::debug!("click ripple skipped: {err}"),
                }
            })?;
        }
        Ok(())
    }

    pub fn bind(document: &Document, config: &BehaviorConfig) -> Result<(), BehaviorError> {
        bind_contact_form(
            document,
            SubmitTimeline {
                sending: config.submit_sending,
                sent_hold: config.submit_sent_hold,
            },
        )?;
        bind_project_hovers(document, config.link_stagger)?;
        bind_tag_ripples(document, config.ripple_lifetime)?;
        bind_button_ripples(document, config.ripple_lifetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_timeline() -> SubmitTimeline {
        SubmitTimeline {
            sending: Duration::from_millis(2_000),
            sent_hold: Duration::from_millis(3_000),
        }
    }

    #[test]
    fn submit_cycle_follows_fixed_delays() {
        let timeline = stock_timeline();

        let at_submit = timeline.phase_at(Duration::ZERO);
        assert_eq!(at_submit, SubmitPhase::Sending);
        assert!(at_submit.control_disabled());
        assert_eq!(at_submit.label_html(), Some(SENDING_HTML));

        let at_two_seconds = timeline.phase_at(Duration::from_millis(2_000));
        assert_eq!(at_two_seconds, SubmitPhase::Sent);
        assert!(at_two_seconds.control_disabled());
        assert_eq!(at_two_seconds.label_html(), Some(SENT_HTML));
        assert_eq!(at_two_seconds.background(), SENT_BACKGROUND);

        let at_five_seconds = timeline.phase_at(Duration::from_millis(5_000));
        assert_eq!(at_five_seconds, SubmitPhase::Idle);
        assert!(!at_five_seconds.control_disabled());
        assert_eq!(at_five_seconds.label_html(), None);
        assert_eq!(at_five_seconds.background(), "");
    }

    #[test]
    fn submit_phase_boundaries() {
        let timeline = stock_timeline();

        assert_eq!(timeline.phase_at(Duration::from_millis(1_999)), SubmitPhase::Sending);
        assert_eq!(timeline.phase_at(Duration::from_millis(4_999)), SubmitPhase::Sent);
        assert_eq!(timeline.phase_at(Duration::from_secs(60)), SubmitPhase::Idle);
    }

    #[test]
    fn click_ripple_is_centered_on_pointer() {
        let (x, y) = click_point(130.0, 245.0, 100.0, 200.0);
        assert_eq!((x, y), (30.0, 45.0));

        let css = click_ripple_css(x, y);
        assert!(css.contains("left: -20px;"));
        assert!(css.contains("top: -5px;"));
        assert!(css.contains("width: 100px;"));
        assert!(css.contains("animation: buttonClick 0.6s ease-out;"));
    }

    #[test]
    fn tag_ripple_fills_its_host() {
        assert!(TAG_RIPPLE_CSS.contains("inset: 0;"));
        assert!(TAG_RIPPLE_CSS.contains("animation: ripple 0.6s linear;"));
    }
}

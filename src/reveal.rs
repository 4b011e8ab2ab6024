use std::time::Duration;

pub const REVEAL_SELECTOR: &str = ".section-header, .timeline-item, .project-card, .about-text, \
     .education-card, .cert-item, .contact-item, .skill-category";
pub const REGISTERED_CLASS: &str = "animate-on-scroll";
pub const REVEALED_CLASS: &str = "animated";
pub const TIMELINE_CLASS: &str = "timeline-item";
pub const PROJECT_CARD_CLASS: &str = "project-card";
pub const SKILL_GROUP_CLASS: &str = "skill-category";
pub const SKILL_TAG_SELECTOR: &str = ".skill-tag";
pub const TIMELINE_CONTENT_SELECTOR: &str = ".timeline-content";
pub const SLIDE_IN_CLASS: &str = "slide-in-right";
pub const FLOATING_SELECTOR: &str = ".floating-card";
pub const COUNTER_SELECTOR: &str = ".stat-number";
pub const PULSE_TRANSFORM: &str = "scale(1.1)";
pub const REST_TRANSFORM: &str = "scale(1)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealRole {
    Timeline,
    ProjectCard { index: usize },
    SkillGroup,
    Plain,
}

impl RevealRole {
    pub fn classify(has_class: impl Fn(&str) -> bool, sibling_index: impl FnOnce() -> usize) -> Self {
        if has_class(TIMELINE_CLASS) {
            Self::Timeline
        } else if has_class(PROJECT_CARD_CLASS) {
            Self::ProjectCard {
                index: sibling_index(),
            }
        } else if has_class(SKILL_GROUP_CLASS) {
            Self::SkillGroup
        } else {
            Self::Plain
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Unseen,
    Revealed,
}

impl RevealState {
    pub fn reveal(&mut self) -> bool {
        std::mem::replace(self, Self::Revealed) == Self::Unseen
    }
}

#[derive(Debug)]
pub struct RevealTarget<N> {
    pub node: N,
    pub role: RevealRole,
    state: RevealState,
}

impl<N> RevealTarget<N> {
    pub fn new(node: N, role: RevealRole) -> Self {
        Self {
            node,
            role,
            state: RevealState::Unseen,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn on_intersect(&mut self) -> Option<RevealRole> {
        self.state.reveal().then_some(self.role)
    }
}

pub fn stagger_delay(index: usize, step: Duration) -> Duration {
    step.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

pub fn css_delay(delay: Duration) -> String {
    format!("{}ms", delay.as_millis())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseStep {
    pub grow_at: Duration,
    pub settle_at: Duration,
}

pub fn pulse_schedule(count: usize, stagger: Duration, hold: Duration) -> Vec<PulseStep> {
    (0..count)
        .map(|index| {
            let grow_at = stagger_delay(index, stagger);
            PulseStep {
                grow_at,
                settle_at: grow_at + hold,
            }
        })
        .collect()
}

pub fn parallax_offset(scroll_y: f64, ratio: f64) -> f64 {
    -(scroll_y * ratio)
}

pub fn parallax_transform(offset: f64) -> String {
    format!("translateY({offset}px)")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterFormat {
    Decimal,
    PlusSuffix,
    Integer,
}

impl CounterFormat {
    pub fn detect(text: &str) -> Self {
        if text.contains('.') {
            Self::Decimal
        } else if text.contains('+') {
            Self::PlusSuffix
        } else {
            Self::Integer
        }
    }

    pub fn render(self, value: f64) -> String {
        match self {
            Self::Decimal => format!("{value:.2}"),
            Self::PlusSuffix => format!("{}+", value.floor() as i64),
            Self::Integer => format!("{}", value.floor() as i64),
        }
    }
}

fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (offset, ch) in text.char_indices() {
        match ch {
            '+' | '-' if offset == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = offset + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    text[..end].trim_end_matches('.').parse().ok()
}

/// Frames of a counter ramping from zero to its target. The last frame is
/// always the exact target.
#[derive(Clone, Debug)]
pub struct CounterRamp {
    target: f64,
    steps: u32,
    step: u32,
    format: CounterFormat,
}

impl CounterRamp {
    pub fn parse(text: &str, steps: u32) -> Option<Self> {
        let target = leading_number(text)?;
        Some(Self {
            target,
            steps: steps.max(1),
            step: 0,
            format: CounterFormat::detect(text),
        })
    }

    #[cfg(test)]
    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Iterator for CounterRamp {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step >= self.steps {
            return None;
        }
        self.step += 1;

        let value = if self.step == self.steps {
            self.target
        } else {
            self.target * f64::from(self.step) / f64::from(self.steps)
        };
        Some(self.format.render(value))
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::bind;

#[cfg(target_arch = "wasm32")]
mod web {
    use gloo_timers::future::TimeoutFuture;
    use std::{cell::RefCell, rc::Rc, time::Duration};
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, Element, IntersectionObserverInit, Window};

    use super::*;
    use crate::{
        config::{as_timer_millis, BehaviorConfig},
        dom,
        error::BehaviorError,
    };

    #[derive(Clone, Copy)]
    struct RevealTimings {
        timeline_delay: Duration,
        card_stagger: Duration,
        tag_stagger: Duration,
        tag_pulse: Duration,
    }

    fn sibling_index(element: &Element) -> usize {
        let Some(parent) = element.parent_element() else {
            return 0;
        };
        let siblings = parent.children();
        (0..siblings.length())
            .filter_map(|index| siblings.item(index))
            .position(|sibling| &sibling == element)
            .unwrap_or(0)
    }

    fn pulse_tags(group: &Element, timings: RevealTimings) {
        let tags = dom::query_all_in(group, SKILL_TAG_SELECTOR);
        let schedule = pulse_schedule(tags.len(), timings.tag_stagger, timings.tag_pulse);

        for (tag, step) in tags.into_iter().zip(schedule) {
            spawn_local(async move {
                TimeoutFuture::new(as_timer_millis(step.grow_at)).await;
                if !tag.is_connected() {
                    return;
                }
                dom::set_style(&tag, "transform", PULSE_TRANSFORM);

                TimeoutFuture::new(as_timer_millis(step.settle_at - step.grow_at)).await;
                if tag.is_connected() {
                    dom::set_style(&tag, "transform", REST_TRANSFORM);
                }
            });
        }
    }

    fn animate(element: &Element, role: RevealRole, timings: RevealTimings) {
        match role {
            RevealRole::Timeline => {
                if let Some(content) = element.query_selector(TIMELINE_CONTENT_SELECTOR).ok().flatten() {
                    dom::set_style(&content, "animation-delay", &css_delay(timings.timeline_delay));
                    dom::set_class(&content, SLIDE_IN_CLASS, true);
                }
            }
            RevealRole::ProjectCard { index } => {
                let delay = stagger_delay(index, timings.card_stagger);
                dom::set_style(element, "animation-delay", &css_delay(delay));
            }
            RevealRole::SkillGroup => pulse_tags(element, timings),
            RevealRole::Plain => {}
        }
    }

    fn bind_reveals(document: &Document, config: &BehaviorConfig) -> Result<(), BehaviorError> {
        let timings = RevealTimings {
            timeline_delay: config.timeline_delay,
            card_stagger: config.card_stagger,
            tag_stagger: config.tag_stagger,
            tag_pulse: config.tag_pulse,
        };

        let elements = dom::query_all(document, REVEAL_SELECTOR)?;
        let targets: Vec<RevealTarget<Element>> = elements
            .into_iter()
            .map(|element| {
                let class_list = element.class_list();
                let role = RevealRole::classify(
                    |class| class_list.contains(class),
                    || sibling_index(&element),
                );
                dom::set_class(&element, REGISTERED_CLASS, true);
                RevealTarget::new(element, role)
            })
            .collect();
        log::debug!("reveal: observing {} elements", targets.len());

        let nodes: Vec<Element> = targets.iter().map(|target| target.node.clone()).collect();
        let targets = Rc::new(RefCell::new(targets));

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(config.reveal_threshold));
        options.set_root_margin(&config.reveal_root_margin);

        let observer = dom::intersection_observer(Some(&options), move |element, _| {
            dom::set_class(&element, REVEALED_CLASS, true);

            let role = targets
                .borrow_mut()
                .iter_mut()
                .find(|target| target.node == element)
                .and_then(RevealTarget::on_intersect);
            if let Some(role) = role {
                animate(&element, role, timings);
            }
        })?;

        for node in &nodes {
            observer.observe(node);
        }
        Ok(())
    }

    fn bind_parallax(win: &Window, document: &Document, ratio: f64) -> Result<(), BehaviorError> {
        let floating = dom::query_all(document, FLOATING_SELECTOR)?;
        if floating.is_empty() {
            return Ok(());
        }

        let scroll_window = win.clone();
        dom::listen(win, "scroll", move |_| {
            let transform = parallax_transform(parallax_offset(dom::scroll_y(&scroll_window), ratio));
            for element in &floating {
                dom::set_style(element, "transform", &transform);
            }
        })
    }

    fn run_counter(element: Element, steps: u32, frame: Duration) {
        let text = element.text_content().unwrap_or_default();
        let Some(ramp) = CounterRamp::parse(&text, steps) else {
            log::debug!("counter text {text:?} is not numeric; leaving it");
            return;
        };
        let frame = as_timer_millis(frame);

        spawn_local(async move {
            for value in ramp {
                TimeoutFuture::new(frame).await;
                if !element.is_connected() {
                    return;
                }
                element.set_text_content(Some(&value));
            }
        });
    }

    fn bind_counters(document: &Document, config: &BehaviorConfig) -> Result<(), BehaviorError> {
        let counters = dom::query_all(document, COUNTER_SELECTOR)?;
        if counters.is_empty() {
            return Ok(());
        }

        let states = Rc::new(RefCell::new(
            counters
                .iter()
                .map(|counter| (counter.clone(), RevealState::Unseen))
                .collect::<Vec<_>>(),
        ));
        let steps = config.counter_steps;
        let frame = config.counter_frame;

        let observer = dom::intersection_observer(None, move |element, observer| {
            observer.unobserve(&element);

            let first = states
                .borrow_mut()
                .iter_mut()
                .find(|(counter, _)| *counter == element)
                .is_some_and(|(_, state)| state.reveal());
            if first {
                run_counter(element, steps, frame);
            }
        })?;

        for counter in &counters {
            observer.observe(counter);
        }
        Ok(())
    }

    pub fn bind(win: &Window, document: &Document, config: &BehaviorConfig) -> Result<(), BehaviorError> {
        bind_reveals(document, config)?;
        bind_parallax(win, document, config.parallax_ratio)?;
        bind_counters(document, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes<'a>(names: &'a [&'a str]) -> impl Fn(&str) -> bool + 'a {
        move |class| names.iter().any(|name| *name == class)
    }

    #[test]
    fn roles_resolve_from_class_membership() {
        assert_eq!(
            RevealRole::classify(classes(&["timeline-item", "animate-on-scroll"]), || 9),
            RevealRole::Timeline
        );
        assert_eq!(
            RevealRole::classify(classes(&["project-card"]), || 4),
            RevealRole::ProjectCard { index: 4 }
        );
        assert_eq!(
            RevealRole::classify(classes(&["skill-category"]), || unreachable!()),
            RevealRole::SkillGroup
        );
        assert_eq!(
            RevealRole::classify(classes(&["section-header"]), || unreachable!()),
            RevealRole::Plain
        );
    }

    #[test]
    fn second_intersection_does_not_rerun_role() {
        let mut target = RevealTarget::new("card-2", RevealRole::ProjectCard { index: 2 });
        assert_eq!(target.state(), RevealState::Unseen);

        assert_eq!(
            target.on_intersect(),
            Some(RevealRole::ProjectCard { index: 2 })
        );
        assert_eq!(target.state(), RevealState::Revealed);
        assert_eq!(target.on_intersect(), None);
        assert_eq!(target.on_intersect(), None);
    }

    #[test]
    fn project_cards_cascade_by_sibling_index() {
        let step = Duration::from_millis(100);

        for index in 0..12 {
            let delay = stagger_delay(index, step);
            assert_eq!(delay, Duration::from_millis(100 * index as u64));
        }
        assert_eq!(css_delay(stagger_delay(0, step)), "0ms");
        assert_eq!(css_delay(stagger_delay(3, step)), "300ms");
        assert_eq!(css_delay(Duration::from_millis(200)), "200ms");
    }

    #[test]
    fn skill_pulse_grows_then_settles() {
        let schedule = pulse_schedule(3, Duration::from_millis(100), Duration::from_millis(200));

        let as_ms: Vec<_> = schedule
            .iter()
            .map(|step| (step.grow_at.as_millis(), step.settle_at.as_millis()))
            .collect();
        assert_eq!(as_ms, vec![(0, 200), (100, 300), (200, 400)]);
        assert!(pulse_schedule(0, Duration::from_millis(100), Duration::from_millis(200)).is_empty());
    }

    #[test]
    fn parallax_moves_against_scroll() {
        assert_eq!(parallax_offset(0.0, 0.5), 0.0);
        assert_eq!(parallax_offset(300.0, 0.5), -150.0);
        assert_eq!(parallax_transform(parallax_offset(300.0, 0.5)), "translateY(-150px)");
        assert_eq!(parallax_transform(-12.5), "translateY(-12.5px)");
    }

    fn frames(text: &str) -> Vec<String> {
        CounterRamp::parse(text, 60).expect("numeric counter").collect()
    }

    #[test]
    fn counters_land_exactly_on_their_original_text() {
        for text in ["99.50", "50+", "120"] {
            let frames = frames(text);
            assert_eq!(frames.len(), 60);
            assert_eq!(frames.last().map(String::as_str), Some(text));
        }
    }

    fn frame_value(frame: &str) -> f64 {
        frame.trim_end_matches('+').parse().expect("frame parses")
    }

    #[test]
    fn counter_frames_never_pass_the_target() {
        for text in ["99.50", "50+", "120"] {
            let ramp = CounterRamp::parse(text, 60).expect("numeric counter");
            let target = ramp.target();
            let mut previous = f64::NEG_INFINITY;

            for frame in ramp {
                let value = frame_value(&frame);
                assert!(value <= target, "{frame} passed {target}");
                assert!(value >= previous, "{frame} went backwards");
                previous = value;
            }
        }
    }

    #[test]
    fn counter_format_follows_original_punctuation() {
        assert_eq!(CounterFormat::detect("3.8"), CounterFormat::Decimal);
        assert_eq!(CounterFormat::detect("15+"), CounterFormat::PlusSuffix);
        assert_eq!(CounterFormat::detect("7"), CounterFormat::Integer);
        assert_eq!(CounterFormat::Decimal.render(1.0), "1.00");
        assert_eq!(CounterFormat::PlusSuffix.render(14.9), "14+");
        assert_eq!(CounterFormat::Integer.render(6.99), "6");
    }

    #[test]
    fn counter_parses_leading_number_only() {
        assert_eq!(CounterRamp::parse(" 4.0 GPA", 60).map(|r| r.target()), Some(4.0));
        assert_eq!(CounterRamp::parse("1,200", 60).map(|r| r.target()), Some(1.0));
        assert_eq!(CounterRamp::parse("12.", 60).map(|r| r.target()), Some(12.0));
        assert!(CounterRamp::parse("N/A", 60).is_none());
        assert!(CounterRamp::parse("", 60).is_none());
        assert!(CounterRamp::parse("+", 60).is_none());
    }

    #[test]
    fn zero_steps_still_produce_the_target() {
        let frames: Vec<_> = CounterRamp::parse("42", 0).expect("numeric").collect();
        assert_eq!(frames, vec!["42".to_string()]);
    }
}

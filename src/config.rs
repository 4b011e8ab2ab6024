use log::LevelFilter;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::error::BehaviorError;

pub const CONFIG_ELEMENT_ID: &str = "behavior-config";

const DEFAULT_SCROLLED_THRESHOLD_PX: f64 = 50.0;
const DEFAULT_ANCHOR_OFFSET_PX: f64 = 70.0;
const DEFAULT_SECTION_LEAD_PX: f64 = 100.0;
const DEFAULT_MOBILE_BREAKPOINT_PX: f64 = 768.0;
const DEFAULT_TYPING_DELAY_MS: u32 = 50;
const DEFAULT_REVEAL_THRESHOLD: f64 = 0.1;
const DEFAULT_REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";
const DEFAULT_PARALLAX_RATIO: f64 = 0.5;
const DEFAULT_COUNTER_STEPS: u32 = 60;
const DEFAULT_COUNTER_FRAME_MS: u32 = 16;
const DEFAULT_TIMELINE_DELAY_MS: u32 = 200;
const DEFAULT_CARD_STAGGER_MS: u32 = 100;
const DEFAULT_TAG_STAGGER_MS: u32 = 100;
const DEFAULT_TAG_PULSE_MS: u32 = 200;
const DEFAULT_LINK_STAGGER_MS: u32 = 100;
const DEFAULT_RIPPLE_MS: u32 = 600;
const DEFAULT_SUBMIT_SENDING_MS: u32 = 2_000;
const DEFAULT_SUBMIT_SENT_HOLD_MS: u32 = 3_000;
const DEFAULT_LOADED_DELAY_MS: u32 = 100;
const DEFAULT_SCROLL_FALLBACK_MS: u32 = 1_000;
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
const DEFAULT_PRELOAD_FONTS: &[&str] =
    &["https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap"];

const SCROLLED_THRESHOLD_PX_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const ANCHOR_OFFSET_PX_BOUNDS: (f64, f64) = (0.0, 400.0);
const MOBILE_BREAKPOINT_PX_BOUNDS: (f64, f64) = (240.0, 2_560.0);
const TYPING_DELAY_MS_BOUNDS: (u32, u32) = (10, 1_000);
const PARALLAX_RATIO_BOUNDS: (f64, f64) = (0.0, 2.0);
const COUNTER_STEPS_BOUNDS: (u32, u32) = (1, 600);
const COUNTER_FRAME_MS_BOUNDS: (u32, u32) = (4, 250);
const SUBMIT_SENDING_MS_BOUNDS: (u32, u32) = (0, 30_000);
const SUBMIT_SENT_HOLD_MS_BOUNDS: (u32, u32) = (0, 30_000);

#[derive(Clone, Debug, PartialEq)]
pub struct BehaviorConfig {
    pub scrolled_threshold_px: f64,
    pub anchor_offset_px: f64,
    pub section_lead_px: f64,
    pub mobile_breakpoint_px: f64,
    pub typing_delay: Duration,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    pub parallax_ratio: f64,
    pub counter_steps: u32,
    pub counter_frame: Duration,
    pub timeline_delay: Duration,
    pub card_stagger: Duration,
    pub tag_stagger: Duration,
    pub tag_pulse: Duration,
    pub link_stagger: Duration,
    pub ripple_lifetime: Duration,
    pub submit_sending: Duration,
    pub submit_sent_hold: Duration,
    pub loaded_delay: Duration,
    pub scroll_fallback: Duration,
    pub log_level: LevelFilter,
    pub preload_fonts: Vec<Url>,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            scrolled_threshold_px: DEFAULT_SCROLLED_THRESHOLD_PX,
            anchor_offset_px: DEFAULT_ANCHOR_OFFSET_PX,
            section_lead_px: DEFAULT_SECTION_LEAD_PX,
            mobile_breakpoint_px: DEFAULT_MOBILE_BREAKPOINT_PX,
            typing_delay: millis(DEFAULT_TYPING_DELAY_MS),
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            reveal_root_margin: DEFAULT_REVEAL_ROOT_MARGIN.to_string(),
            parallax_ratio: DEFAULT_PARALLAX_RATIO,
            counter_steps: DEFAULT_COUNTER_STEPS,
            counter_frame: millis(DEFAULT_COUNTER_FRAME_MS),
            timeline_delay: millis(DEFAULT_TIMELINE_DELAY_MS),
            card_stagger: millis(DEFAULT_CARD_STAGGER_MS),
            tag_stagger: millis(DEFAULT_TAG_STAGGER_MS),
            tag_pulse: millis(DEFAULT_TAG_PULSE_MS),
            link_stagger: millis(DEFAULT_LINK_STAGGER_MS),
            ripple_lifetime: millis(DEFAULT_RIPPLE_MS),
            submit_sending: millis(DEFAULT_SUBMIT_SENDING_MS),
            submit_sent_hold: millis(DEFAULT_SUBMIT_SENT_HOLD_MS),
            loaded_delay: millis(DEFAULT_LOADED_DELAY_MS),
            scroll_fallback: millis(DEFAULT_SCROLL_FALLBACK_MS),
            log_level: DEFAULT_LOG_LEVEL,
            preload_fonts: parse_font_urls(DEFAULT_PRELOAD_FONTS.iter().copied()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BehaviorOverrides {
    #[serde(deserialize_with = "lenient")]
    scrolled_threshold_px: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    anchor_offset_px: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    mobile_breakpoint_px: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    typing_delay_ms: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    parallax_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    counter_steps: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    counter_frame_ms: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    submit_sending_ms: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    submit_sent_hold_ms: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    log_level: Option<String>,
    #[serde(deserialize_with = "lenient")]
    preload_fonts: Option<Vec<String>>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            log::warn!("ignoring override {value}: {err}");
            Ok(None)
        }
    }
}

impl BehaviorConfig {
    pub fn from_json(raw: &str) -> Result<Self, BehaviorError> {
        let overrides: BehaviorOverrides = serde_json::from_str(raw)?;
        Ok(Self::default().with_overrides(overrides))
    }

    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };

        Self::from_json(raw).unwrap_or_else(|err| {
            log::warn!("ignoring #{CONFIG_ELEMENT_ID}: {err}");
            Self::default()
        })
    }

    fn with_overrides(self, overrides: BehaviorOverrides) -> Self {
        Self {
            scrolled_threshold_px: f64_with_bounds(
                overrides.scrolled_threshold_px,
                self.scrolled_threshold_px,
                SCROLLED_THRESHOLD_PX_BOUNDS,
            ),
            anchor_offset_px: f64_with_bounds(
                overrides.anchor_offset_px,
                self.anchor_offset_px,
                ANCHOR_OFFSET_PX_BOUNDS,
            ),
            mobile_breakpoint_px: f64_with_bounds(
                overrides.mobile_breakpoint_px,
                self.mobile_breakpoint_px,
                MOBILE_BREAKPOINT_PX_BOUNDS,
            ),
            typing_delay: millis(u32_with_bounds(
                overrides.typing_delay_ms,
                as_timer_millis(self.typing_delay),
                TYPING_DELAY_MS_BOUNDS,
            )),
            parallax_ratio: f64_with_bounds(
                overrides.parallax_ratio,
                self.parallax_ratio,
                PARALLAX_RATIO_BOUNDS,
            ),
            counter_steps: u32_with_bounds(
                overrides.counter_steps,
                self.counter_steps,
                COUNTER_STEPS_BOUNDS,
            ),
            counter_frame: millis(u32_with_bounds(
                overrides.counter_frame_ms,
                as_timer_millis(self.counter_frame),
                COUNTER_FRAME_MS_BOUNDS,
            )),
            submit_sending: millis(u32_with_bounds(
                overrides.submit_sending_ms,
                as_timer_millis(self.submit_sending),
                SUBMIT_SENDING_MS_BOUNDS,
            )),
            submit_sent_hold: millis(u32_with_bounds(
                overrides.submit_sent_hold_ms,
                as_timer_millis(self.submit_sent_hold),
                SUBMIT_SENT_HOLD_MS_BOUNDS,
            )),
            log_level: parse_log_level(overrides.log_level.as_deref(), self.log_level),
            preload_fonts: match overrides.preload_fonts {
                Some(fonts) => parse_font_urls(fonts.iter().map(String::as_str)),
                None => self.preload_fonts,
            },
            ..self
        }
    }
}

/// Milliseconds as the `u32` the browser timer APIs take.
pub fn as_timer_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

fn millis(value: u32) -> Duration {
    Duration::from_millis(u64::from(value))
}

fn u32_with_bounds(value: Option<u32>, default: u32, bounds: (u32, u32)) -> u32 {
    value
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn f64_with_bounds(value: Option<f64>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_log_level(value: Option<&str>, default: LevelFilter) -> LevelFilter {
    match value
        .map(str::trim)
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => default,
    }
}

fn parse_font_urls<'a>(values: impl Iterator<Item = &'a str>) -> Vec<Url> {
    values
        .filter_map(|value| match Url::parse(value.trim()) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
            _ => {
                log::warn!("dropping preload font url {value:?}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_page() {
        let config = BehaviorConfig::default();

        assert_eq!(config.scrolled_threshold_px, 50.0);
        assert_eq!(config.anchor_offset_px, 70.0);
        assert_eq!(config.section_lead_px, 100.0);
        assert_eq!(config.mobile_breakpoint_px, 768.0);
        assert_eq!(config.counter_steps, 60);
        assert_eq!(config.counter_frame, Duration::from_millis(16));
        assert_eq!(config.submit_sending, Duration::from_millis(2_000));
        assert_eq!(config.submit_sent_hold, Duration::from_millis(3_000));
        assert_eq!(config.preload_fonts.len(), 1);
        assert_eq!(
            config.preload_fonts[0].host_str(),
            Some("fonts.googleapis.com")
        );
    }

    #[test]
    fn overrides_inside_bounds_are_applied() {
        let config = BehaviorConfig::from_json(
            r#"{ "typingDelayMs": 80, "counterSteps": 30, "parallaxRatio": 0.25, "logLevel": "DEBUG" }"#,
        )
        .expect("valid config");

        assert_eq!(config.typing_delay, Duration::from_millis(80));
        assert_eq!(config.counter_steps, 30);
        assert_eq!(config.parallax_ratio, 0.25);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.counter_frame, Duration::from_millis(16));
    }

    #[test]
    fn out_of_range_overrides_fall_back_to_defaults() {
        let config = BehaviorConfig::from_json(
            r#"{ "typingDelayMs": 5, "counterSteps": 0, "mobileBreakpointPx": 10, "logLevel": "loud" }"#,
        )
        .expect("valid config");

        assert_eq!(config, BehaviorConfig::default());
    }

    #[test]
    fn mistyped_override_keeps_the_other_keys() {
        let config = BehaviorConfig::from_json_or_default(Some(
            r#"{ "counterSteps": 30, "typingDelayMs": -5, "parallaxRatio": "fast", "logLevel": 3 }"#,
        ));

        assert_eq!(config.counter_steps, 30);
        assert_eq!(config.typing_delay, Duration::from_millis(50));
        assert_eq!(config.parallax_ratio, 0.5);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn null_override_is_treated_as_absent() {
        let config = BehaviorConfig::from_json(r#"{ "counterSteps": null, "counterFrameMs": 20 }"#)
            .expect("valid config");

        assert_eq!(config.counter_steps, 60);
        assert_eq!(config.counter_frame, Duration::from_millis(20));
    }

    #[test]
    fn invalid_font_urls_are_dropped() {
        let config = BehaviorConfig::from_json(
            r#"{ "preloadFonts": ["ftp://fonts.example/a.css", "not a url", "https://fonts.example/b.css"] }"#,
        )
        .expect("valid config");

        assert_eq!(config.preload_fonts.len(), 1);
        assert_eq!(config.preload_fonts[0].as_str(), "https://fonts.example/b.css");
    }

    #[test]
    fn malformed_block_is_ignored() {
        assert!(BehaviorConfig::from_json("{ typingDelayMs: }").is_err());
        assert_eq!(
            BehaviorConfig::from_json_or_default(Some("{ typingDelayMs: }")),
            BehaviorConfig::default()
        );
        assert_eq!(
            BehaviorConfig::from_json_or_default(Some("   ")),
            BehaviorConfig::default()
        );
        assert_eq!(BehaviorConfig::from_json_or_default(None), BehaviorConfig::default());
    }

    #[test]
    fn timer_millis_saturates() {
        assert_eq!(as_timer_millis(Duration::from_millis(600)), 600);
        assert_eq!(as_timer_millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }
}

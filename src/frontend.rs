use gloo_timers::callback::Timeout;
use std::{cell::RefCell, rc::Rc};
use web_sys::Document;

use crate::{
    chrome::ChromeHandle,
    config::{as_timer_millis, BehaviorConfig, CONFIG_ELEMENT_ID},
    dom,
    error::BehaviorError,
    interactions, navigation, optimizer, preference, reveal, typing,
};

const LOADED_CLASS: &str = "loaded";
const KEYFRAMES_CSS: &str = r#"
    @keyframes ripple {
        to {
            transform: scale(4);
            opacity: 0;
        }
    }

    @keyframes buttonClick {
        to {
            transform: scale(2);
            opacity: 0;
        }
    }

    @keyframes slide-in-right {
        from {
            opacity: 0;
            transform: translateX(30px);
        }
        to {
            opacity: 1;
            transform: translateX(0);
        }
    }

    .slide-in-right {
        animation: slide-in-right 0.6s ease-out forwards;
    }
"#;

fn read_config(document: &Document) -> BehaviorConfig {
    let raw = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|block| block.text_content());
    BehaviorConfig::from_json_or_default(raw.as_deref())
}

fn inject_keyframes(document: &Document) -> Result<(), BehaviorError> {
    let head = document.head().ok_or(BehaviorError::MissingNode("head"))?;
    let style = document
        .create_element("style")
        .map_err(|err| BehaviorError::js("createElement", err))?;
    style.set_text_content(Some(KEYFRAMES_CSS));
    head.append_child(&style)
        .map_err(|err| BehaviorError::js("appendChild", err))?;
    Ok(())
}

fn start_typing(document: &Document, config: &BehaviorConfig) -> Result<(), BehaviorError> {
    let Some(title) = document
        .query_selector(typing::TYPING_SELECTOR)
        .map_err(|err| BehaviorError::js("querySelector", err))?
    else {
        return Ok(());
    };

    let text = title.text_content().unwrap_or_default();
    typing::start(title, text, config.typing_delay);
    Ok(())
}

fn watch_visibility(document: &Document) -> Result<(), BehaviorError> {
    let watched = document.clone();
    // Reserved for pausing animations while the tab is hidden.
    dom::listen(document, "visibilitychange", move |_| {
        if watched.hidden() {
            log::debug!("page hidden");
        } else {
            log::debug!("page visible");
        }
    })
}

fn report(component: &str, result: Result<(), BehaviorError>) {
    if let Err(err) = result {
        log::warn!("{component} not bound: {err}");
    }
}

fn start(document: &Document) -> Result<(), BehaviorError> {
    let win = dom::browser_window()?;
    let body = document.body().ok_or(BehaviorError::MissingNode("body"))?;
    let config = read_config(document);
    log::set_max_level(config.log_level);

    report("keyframes", inject_keyframes(document));

    let theme = preference::read_stored_theme().unwrap_or_default();
    let chrome = Rc::new(RefCell::new(ChromeHandle::new(body.clone(), theme)));

    report(
        "navigation",
        navigation::bind(&win, document, &config, chrome.clone()),
    );
    report("typing", start_typing(document, &config));
    report("reveal", reveal::bind(&win, document, &config));
    report("interactions", interactions::bind(document, &config));
    report("preference", preference::bind(document, chrome));
    report("optimizer", optimizer::bind(&win, document, &config));
    report("visibility", watch_visibility(document));

    Timeout::new(as_timer_millis(config.loaded_delay), move || {
        dom::set_class(&body, LOADED_CLASS, true);
    })
    .forget();

    log::info!("page behaviors bound (theme: {})", theme.as_str());
    Ok(())
}

pub fn run() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Trace);

    let document = match dom::browser_document() {
        Ok(document) => document,
        Err(err) => {
            log::error!("page behaviors not started: {err}");
            return;
        }
    };

    if document.ready_state() == "loading" {
        let mut pending = Some(document.clone());
        report(
            "startup",
            dom::listen(&document, "DOMContentLoaded", move |_| {
                if let Some(document) = pending.take() {
                    report("startup", start(&document));
                }
            }),
        );
    } else {
        report("startup", start(&document));
    }
}

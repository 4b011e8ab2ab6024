use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("no global window")]
    MissingWindow,
    #[error("window has no document")]
    MissingDocument,
    #[error("document has no {0}")]
    MissingNode(&'static str),
    #[error("{operation} failed: {message}")]
    Js {
        operation: &'static str,
        message: String,
    },
    #[error("invalid behavior config: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(target_arch = "wasm32")]
impl BehaviorError {
    pub fn js(operation: &'static str, value: wasm_bindgen::JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &wasm_bindgen::JsValue::from_str("message"))
                    .ok()
                    .and_then(|message| message.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));

        Self::Js { operation, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_keeps_decoder_message() {
        let decode = serde_json::from_str::<serde_json::Value>("{ nope").expect_err("malformed");
        let error = BehaviorError::from(decode);

        assert!(error.to_string().starts_with("invalid behavior config: "));
    }

    #[test]
    fn js_error_names_operation() {
        let error = BehaviorError::Js {
            operation: "IntersectionObserver::new",
            message: "not supported".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "IntersectionObserver::new failed: not supported"
        );
    }
}

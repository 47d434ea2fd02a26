use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures that disable a single effect. Missing page elements are not
/// errors; installers report those as `Ok(None)`.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("browser window is not available")]
    NoWindow,

    #[error("document is not available")]
    NoDocument,

    #[error("invalid effects config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("{context}: {message}")]
    Js { context: &'static str, message: String },
}

impl EffectError {
    /// Wrap a rejected JS call, keeping whatever text the value carries.
    pub fn js(context: &'static str, value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        EffectError::Js { context, message }
    }
}

use serde::Deserialize;
use web_sys::Document;

use crate::error::EffectError;

/// Id of the optional inline JSON block that overrides the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "effects-config";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct EffectsConfig {
    pub parallax: ParallaxConfig,
    pub video: VideoConfig,
    pub dissolve: DissolveConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Multiplier applied to `scrollY`; negative moves the background against the scroll.
    pub factor: f64,
    /// CSS custom property written on the root element.
    pub variable: String,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            factor: -0.25,
            variable: "--scroll-offset".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub element_id: String,
    /// Fraction of the element that has to be visible.
    pub threshold: f64,
    /// Viewport expansion on every side, in pixels.
    pub root_margin_px: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            element_id: "video".to_string(),
            threshold: 0.01,
            root_margin_px: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DissolveConfig {
    pub card_selector: String,
    pub label_selector: String,
    pub active_class: String,
    pub filter_attribute: String,
    /// Must stay in sync with the duration of the reverse SVG animations.
    pub cleanup_delay_ms: u32,
}

impl Default for DissolveConfig {
    fn default() -> Self {
        Self {
            card_selector: ".product".to_string(),
            label_selector: ".price span".to_string(),
            active_class: "dissolve-active".to_string(),
            filter_attribute: "data-filter".to_string(),
            cleanup_delay_ms: 1201,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub input_id: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            input_id: "email".to_string(),
        }
    }
}

impl EffectsConfig {
    pub fn from_json(raw: &str) -> Result<Self, EffectError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read overrides from `<script id="effects-config" type="application/json">`.
    /// A missing block means defaults; a malformed one is logged and ignored.
    pub fn from_document(document: &Document) -> Self {
        let raw = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|element| element.text_content());

        let Some(raw) = raw else {
            return Self::default();
        };
        if raw.trim().is_empty() {
            return Self::default();
        }

        match Self::from_json(&raw) {
            Ok(config) => {
                log::debug!("Loaded effects config overrides: {:?}", config);
                config
            }
            Err(e) => {
                log::warn!("Ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }
}

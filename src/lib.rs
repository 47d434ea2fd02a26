//! Cosmetic interaction effects for the storefront page: scroll parallax,
//! visibility-gated video, hover dissolve on product cards and a scrambling
//! email field. The page markup is static; this crate only attaches behavior.

pub mod components;
pub mod config;
pub mod effects;
pub mod error;
pub mod utils;

pub use components::effects_root::EffectsRoot;
pub use config::EffectsConfig;
pub use error::EffectError;

use web_sys::Element;

/// Id of the node the yew root is rendered into.
pub const MOUNT_ID: &str = "effects-root";

/// Find `#effects-root`, or append an empty one to `<body>`.
pub fn mount_point() -> Result<Element, EffectError> {
    let document = utils::dom::window()?
        .document()
        .ok_or(EffectError::NoDocument)?;
    if let Some(existing) = document.get_element_by_id(MOUNT_ID) {
        return Ok(existing);
    }

    let body = document.body().ok_or(EffectError::NoDocument)?;
    let mount = document
        .create_element("div")
        .map_err(|e| EffectError::js("create_element", e))?;
    mount.set_id(MOUNT_ID);
    body.append_child(&mount)
        .map_err(|e| EffectError::js("append_child", e))?;
    Ok(mount)
}

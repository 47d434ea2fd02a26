pub mod dissolve;
pub mod email_mask;
pub mod parallax;
pub mod video_gate;

use crate::config::EffectsConfig;
use crate::error::EffectError;
use crate::utils::dom;

/// Every installed effect. Dropping it detaches all of them.
#[derive(Default)]
pub struct InstalledEffects {
    parallax: Option<parallax::ParallaxHandle>,
    video: Option<video_gate::VideoGateHandle>,
    dissolve: Option<dissolve::DissolveHandle>,
    email: Option<email_mask::EmailMaskHandle>,
}

impl InstalledEffects {
    /// Attach all four effects to the current document. Each one is
    /// independent: a failure is logged and only that effect stays off.
    pub fn install() -> Self {
        let window = match dom::window() {
            Ok(window) => window,
            Err(e) => {
                log::warn!("Effects not installed: {}", e);
                return Self::default();
            }
        };
        let Some(document) = window.document() else {
            log::warn!("Effects not installed: {}", EffectError::NoDocument);
            return Self::default();
        };
        let config = EffectsConfig::from_document(&document);

        let effects = Self {
            parallax: report(
                "parallax",
                parallax::install(&window, &document, &config.parallax).map(Some),
            ),
            video: report("video gate", video_gate::install(&document, &config.video)),
            dissolve: report("dissolve", dissolve::install(&document, &config.dissolve)),
            email: report("email mask", email_mask::install(&document, &config.email)),
        };

        log::info!(
            "Effects installed: parallax={} video={} dissolve_cards={} email={}",
            effects.parallax.is_some(),
            effects.video.is_some(),
            effects.dissolve.as_ref().map_or(0, |d| d.card_count()),
            effects.email.is_some(),
        );
        effects
    }
}

fn report<T>(name: &str, result: Result<Option<T>, EffectError>) -> Option<T> {
    result.unwrap_or_else(|e| {
        log::warn!("Failed to install {}: {}", name, e);
        None
    })
}

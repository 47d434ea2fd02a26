use yew::prelude::*;

use crate::effects::InstalledEffects;

/// Renders nothing. Installs the page effects on mount and detaches them on unmount.
#[function_component(EffectsRoot)]
pub fn effects_root() -> Html {
    use_effect_with_deps(
        move |_| {
            let installed = InstalledEffects::install();
            move || {
                drop(installed);
                log::debug!("Effects detached");
            }
        },
        (),
    );

    html! {}
}

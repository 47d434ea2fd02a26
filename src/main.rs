use storefront_effects::{mount_point, EffectsRoot};

fn main() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

    match mount_point() {
        Ok(root) => {
            yew::Renderer::<EffectsRoot>::with_root(root).render();
        }
        Err(e) => log::error!("Cannot mount effects: {}", e),
    }
}

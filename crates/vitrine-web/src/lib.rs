//! Vitrine Web - page and desktop front end
//!
//! Runs the viewer inside `canvas.webgl` on the web, wiring the page buttons
//! to the scene, or in a native window with keyboard shortcuts.

pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod host;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    if let Err(e) = app::run() {
        tracing::error!("Viewer failed to start: {:#}", e);
    }
}

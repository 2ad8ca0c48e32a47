//! Page wiring: button listeners, CSS properties and sizes read from the DOM

use thiserror::Error;
use vitrine_core::{Effect, HostSize, UiAction, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, Window};

use crate::host::{HostEvent, HostQueue};

pub const CANVAS_SELECTOR: &str = "canvas.webgl";
pub const DARK_MODE_SELECTOR: &str = ".dark-mode";
pub const RESET_CAMERA_SELECTOR: &str = ".reset-camera";
pub const DISPLAY_INFOS_SELECTOR: &str = ".display-infos";
pub const HELPER_SELECTOR: &str = ".helper";
pub const SEE_PLAQUE_SELECTOR: &str = ".see-plaque";

#[derive(Error, Debug)]
pub enum DomError {
    #[error("no global window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("element {0} not found")]
    MissingElement(&'static str),
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError::Js(format!("{:?}", value))
    }
}

fn window() -> Result<Window, DomError> {
    web_sys::window().ok_or(DomError::NoWindow)
}

fn document() -> Result<Document, DomError> {
    window()?.document().ok_or(DomError::NoDocument)
}

fn element(document: &Document, selector: &'static str) -> Result<Element, DomError> {
    document
        .query_selector(selector)?
        .ok_or(DomError::MissingElement(selector))
}

fn html_element(document: &Document, selector: &'static str) -> Result<HtmlElement, DomError> {
    element(document, selector)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| DomError::Js(format!("{} is not an HTML element", selector)))
}

/// Push `event` onto the queue every time `target` fires `kind`. Listeners
/// live as long as the page.
fn listen(
    target: &EventTarget,
    kind: &str,
    queue: &HostQueue,
    event: impl Fn() -> Option<HostEvent> + 'static,
) -> Result<(), DomError> {
    let queue = queue.clone();
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
        if let Some(event) = event() {
            queue.push(event);
        }
    });
    target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn action(action: UiAction) -> impl Fn() -> Option<HostEvent> {
    move || Some(HostEvent::Action(action))
}

fn resized() -> Option<HostEvent> {
    host_size().ok().map(HostEvent::Resized)
}

/// Bind the page controls. Every element is looked up before any listener
/// is attached, so a missing one leaves all controls unbound.
pub fn install_listeners(queue: &HostQueue) -> Result<(), DomError> {
    let window = window()?;
    let document = document()?;

    let dark_mode = element(&document, DARK_MODE_SELECTOR)?;
    let reset_camera = element(&document, RESET_CAMERA_SELECTOR)?;
    let display_infos = element(&document, DISPLAY_INFOS_SELECTOR)?;
    let see_plaque = element(&document, SEE_PLAQUE_SELECTOR)?;
    element(&document, HELPER_SELECTOR)?;

    listen(&dark_mode, "click", queue, action(UiAction::ToggleDarkMode))?;
    listen(&reset_camera, "click", queue, action(UiAction::ResetCamera))?;
    listen(&display_infos, "mouseenter", queue, action(UiAction::ShowHelper))?;
    listen(&display_infos, "mouseleave", queue, action(UiAction::HideHelper))?;
    listen(&see_plaque, "click", queue, action(UiAction::SeePlaque))?;
    listen(&document, "click", queue, action(UiAction::LogCameraPosition))?;
    listen(&window, "resize", queue, resized)?;

    // The viewer may start after the page finished loading
    if document.ready_state() == "complete" {
        if let Some(event) = resized() {
            queue.push(event);
        }
    } else {
        listen(&window, "load", queue, resized)?;
    }

    tracing::info!("Page controls bound");
    Ok(())
}

pub fn host_size() -> Result<HostSize, DomError> {
    let window = window()?;
    let inner_width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let inner_height = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok(HostSize {
        inner_width: inner_width as f32,
        inner_height: inner_height as f32,
        device_pixel_ratio: window.device_pixel_ratio() as f32,
    })
}

/// Startup viewport, measured on the canvas element
pub fn canvas_viewport(max_pixel_ratio: f32) -> Result<Viewport, DomError> {
    let window = window()?;
    let canvas = element(&document()?, CANVAS_SELECTOR)?;
    Ok(Viewport::from_canvas(
        canvas.client_width() as f32,
        canvas.client_height() as f32,
        window.device_pixel_ratio() as f32,
        max_pixel_ratio,
    ))
}

/// `?model=` query parameter of the page URL
pub fn model_override() -> Option<String> {
    let href = window().ok()?.location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    url.search_params().get("model").filter(|m| !m.is_empty())
}

pub fn apply_effect(effect: &Effect) -> Result<(), DomError> {
    let document = document()?;
    match effect {
        Effect::SetCssProperty { name, value } => {
            let root = document
                .document_element()
                .ok_or(DomError::MissingElement(":root"))?
                .dyn_into::<HtmlElement>()
                .map_err(|_| DomError::Js("document root is not an HTML element".to_string()))?;
            root.style().set_property(name, value)?;
        }
        Effect::SetHelperVisible(visible) => {
            let helper = html_element(&document, HELPER_SELECTOR)?;
            helper
                .style()
                .set_property("display", if *visible { "flex" } else { "none" })?;
        }
        other => {
            tracing::debug!(?other, "Effect has no page counterpart");
        }
    }
    Ok(())
}

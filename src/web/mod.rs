use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlCanvasElement;
use winit::event_loop::EventLoop;
use winit::platform::web::{EventLoopExtWebSys, WindowBuilderExtWebSys};
use winit::window::WindowBuilder;

use crate::app::{logical_surface_size, ViewerApp};
use crate::config::ViewerConfig;
use crate::loader::{check_extension, ModelFile};
use crate::render::Renderer;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Binds the viewer to an existing `<canvas>` and starts its event loop.
/// `config_json` is an optional viewer configuration document.
#[wasm_bindgen]
pub fn start_viewer(canvas_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    start(canvas_id, config_json.as_deref()).map_err(to_js_error)
}

/// Validates a user-selected model file and returns its summary.
#[wasm_bindgen]
pub async fn load_model(file: web_sys::File) -> Result<String, JsValue> {
    read_model(file).await.map_err(to_js_error)
}

fn start(canvas_id: &str, config_json: Option<&str>) -> Result<()> {
    let config = match config_json {
        Some(text) => ViewerConfig::from_json_str(text).context("invalid viewer configuration")?,
        None => ViewerConfig::default(),
    };
    let canvas = find_canvas(canvas_id)?;
    suppress_context_menu(&canvas);

    let event_loop = EventLoop::new();
    let mut builder = WindowBuilder::new();
    if let Some(size) = logical_surface_size(canvas.client_width(), canvas.client_height()) {
        builder = builder.with_inner_size(size);
    }
    let window = builder
        .with_canvas(Some(canvas))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;

    spawn_local(async move {
        let renderer = match Renderer::new(Arc::new(window)).await {
            Ok(renderer) => renderer,
            Err(err) => {
                log::error!("failed to initialize renderer: {err}");
                return;
            }
        };
        let mut app = ViewerApp::new(renderer, config);
        event_loop.spawn(move |event, _target, control_flow| {
            control_flow.set_wait();
            if let Err(err) = app.handle_event(&event, control_flow) {
                log::error!("viewer stopped: {err:?}");
                control_flow.set_exit();
            }
        });
    });
    Ok(())
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement> {
    let document = web_sys::window()
        .and_then(|win| win.document())
        .ok_or_else(|| anyhow!("document not available"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow!("no element with id '{canvas_id}'"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("element '{canvas_id}' is not a canvas"))?;
    Ok(canvas)
}

// Right-drag pans, so the browser menu must not open on the canvas.
fn suppress_context_menu(canvas: &HtmlCanvasElement) {
    let handler = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(|event: web_sys::MouseEvent| {
        event.prevent_default();
    });
    canvas.set_oncontextmenu(Some(handler.as_ref().unchecked_ref()));
    // The canvas keeps the handler for the lifetime of the page.
    handler.forget();
}

async fn read_model(file: web_sys::File) -> Result<String> {
    let name = file.name();
    check_extension(&name)?;
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|err| anyhow!("failed to read {name}: {err:?}"))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let model = ModelFile::from_bytes(name, bytes)?;
    let summary = model.summary().to_string();
    log::info!("{summary}");
    Ok(summary)
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

//! JavaScript bindings.

#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::runner::{describe, init_scene_with_options, on_document_ready};
use crate::{create_paper_plane, RunnerOptions, SceneHandle};
use js_sys::Error;
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::prelude::*;

/// Id of the element the paper plane is mounted into on page load.
pub const CONTAINER_ID: &str = "three-plane";

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// WASM binding for a mounted scene.
#[wasm_bindgen]
pub struct WebSceneHandle {
    handle: SceneHandle,
}

#[wasm_bindgen]
impl WebSceneHandle {
    pub fn json(&self) -> Result<JsValue, JsValue> {
        as_json(&*self.handle.scene())
    }

    pub fn aspect(&self) -> f32 {
        self.handle.scene().camera.aspect
    }

    pub fn raster_width(&self) -> u32 {
        self.handle.scene().raster.width
    }

    pub fn raster_height(&self) -> u32 {
        self.handle.scene().raster.height
    }

    /// Returns the plane's XYZ Euler rotation in radians.
    pub fn rotation(&self) -> Vec<f32> {
        self.handle.scene().object.transform.rotation.to_vec()
    }

    /// Runs one frame at wall-clock time `now_ms`.
    pub fn advance(&self, now_ms: f64) -> Result<(), JsValue> {
        Ok(self.handle.advance(now_ms)?)
    }

    /// Stops the animation and removes the canvas from the page.
    pub fn dispose(self) {
        self.handle.dispose();
    }
}

fn as_json<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(JsValue::from_serde(value).map_err(|e| Error::new(&e.to_string()))?)
}

fn from_json<T: DeserializeOwned>(json: &JsValue) -> Result<T, JsValue> {
    Ok(json.into_serde().map_err(|e| Error::new(&e.to_string()))?)
}

/// Mounts a paper plane into the element `container_id`.
///
/// `options` is an optional JSON object overriding parts of the default
/// runner options. Returns `undefined` if the element does not exist.
#[wasm_bindgen(js_name = initScene)]
pub fn init_scene(container_id: &str, options: JsValue) -> Result<Option<WebSceneHandle>, JsValue> {
    let options: RunnerOptions = if options.is_undefined() || options.is_null() {
        RunnerOptions::default()
    } else {
        from_json(&options)?
    };

    let handle = init_scene_with_options(container_id, &options, create_paper_plane)?;

    Ok(handle.map(|handle| WebSceneHandle { handle }))
}

/// Returns a version string for the WASM module.
#[wasm_bindgen]
pub fn version() -> String {
    let revision = built_info::GIT_COMMIT_HASH
        .map(|hash| format!(" ({})", &hash[..hash.len().min(7)]))
        .unwrap_or_default();

    format!(
        "Paperplane v{}{} (WebGL2)",
        built_info::PKG_VERSION,
        revision
    )
}

/// Configures browser logging functionality.
///
/// This function is safe to call more than once and will do nothing should it
/// be called more than once; this lets it co-exist nicely with hot reloaders.
#[wasm_bindgen]
pub fn initialize_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init();
}

/// Mounts the paper plane into its container once the page is parsed.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    initialize_logging();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| Error::new("no document to mount into"))?;

    on_document_ready(&document, || {
        match init_scene_with_options(CONTAINER_ID, &RunnerOptions::default(), create_paper_plane) {
            Ok(Some(_handle)) => {} // keeps running after the handle is dropped
            Ok(None) => {}
            Err(err) => error!("failed to mount scene: {}", describe(&err)),
        }
    })?;

    Ok(())
}

//! Mounts a scene into a page element and keeps it animated.

#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::{Device, Object, Scene, Spin, SurfaceOptions};
use js_sys::Error;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlCanvasElement, WebGl2RenderingContext as Context,
    Window,
};

/// Everything configurable about a mounted scene.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct RunnerOptions {
    pub surface: SurfaceOptions,
    pub spin: Spin,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextAttributes {
    alpha: bool,
    antialias: bool,
    depth: bool,
    premultiplied_alpha: bool,
}

/// Converts a thrown JS value into an error, keeping real errors as-is.
pub(crate) fn into_error(value: JsValue) -> Error {
    value
        .dyn_into::<Error>()
        .unwrap_or_else(|value| Error::new(&format!("{:?}", value)))
}

pub(crate) fn describe(error: &Error) -> String {
    String::from(error.message())
}

fn client_size(element: &Element) -> (u32, u32) {
    (
        element.client_width().max(0) as u32,
        element.client_height().max(0) as u32,
    )
}

/// A canvas with a WebGL2 context, sized in CSS and backing-store pixels.
#[derive(Debug)]
pub struct RenderSurface {
    canvas: HtmlCanvasElement,
    context: Context,
}

impl RenderSurface {
    pub fn create(document: &Document, options: &SurfaceOptions) -> Result<Self, Error> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(into_error)?
            .dyn_into()
            .map_err(|_| Error::new("created element is not a canvas"))?;

        let attributes = JsValue::from_serde(&ContextAttributes {
            alpha: options.alpha,
            antialias: options.antialias,
            depth: true,
            premultiplied_alpha: true,
        })
        .map_err(|e| Error::new(&e.to_string()))?;

        let context = canvas
            .get_context_with_context_options("webgl2", &attributes)
            .map_err(into_error)?
            .ok_or_else(|| Error::new("WebGL2 is not supported"))?
            .dyn_into::<Context>()
            .map_err(|_| Error::new("context is not a WebGL2 context"))?;

        Ok(Self { canvas, context })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn set_size(&self, width: u32, height: u32) -> Result<(), Error> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        let style = self.canvas.style();

        style
            .set_property("width", &format!("{}px", width))
            .map_err(into_error)?;
        style
            .set_property("height", &format!("{}px", height))
            .map_err(into_error)?;

        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }
}

/// State shared between the frame loop and the event listeners.
#[derive(Debug)]
struct Runtime {
    container: Element,
    surface: RenderSurface,
    device: Device,
    scene: Scene,
    spin: Spin,
}

impl Runtime {
    fn frame(&mut self, now_ms: f64) -> Result<(), Error> {
        self.scene.advance(&self.spin, now_ms);

        self.device.update(&mut self.scene)?;
        self.device.render()
    }

    fn resize(&mut self) -> Result<(), Error> {
        let (width, height) = client_size(&self.container);

        self.surface.set_size(width, height)?;
        self.scene.resize(width, height);

        debug!("surface resized to {}x{}", width, height);

        Ok(())
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn schedule(window: &Window, callback: &FrameCallback) -> Result<i32, Error> {
    let callback = callback.borrow();
    let closure = callback
        .as_ref()
        .ok_or_else(|| Error::new("frame loop was stopped"))?;

    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map_err(into_error)
}

/// Self-rescheduling `requestAnimationFrame` loop.
///
/// The callback holds a reference to itself, so the loop lives until it is
/// stopped or a frame fails.
struct FrameLoop {
    window: Window,
    pending: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl FrameLoop {
    fn start(window: &Window, runtime: Rc<RefCell<Runtime>>) -> Result<Self, Error> {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));

        let (this, frame_id, frame_window) = (callback.clone(), pending.clone(), window.clone());

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            frame_id.set(None);

            if let Err(err) = runtime.borrow_mut().frame(js_sys::Date::now()) {
                error!("frame failed, animation stopped: {}", describe(&err));
                return;
            }

            match schedule(&frame_window, &this) {
                Ok(id) => frame_id.set(Some(id)),
                Err(err) => error!("failed to schedule frame: {}", describe(&err)),
            }
        }) as Box<dyn FnMut()>));

        let first = schedule(window, &callback).map_err(|err| {
            callback.borrow_mut().take();
            err
        })?;

        pending.set(Some(first));

        Ok(Self {
            window: window.clone(),
            pending,
            callback,
        })
    }

    fn stop(&self) {
        if let Some(id) = self.pending.take() {
            let _ = self.window.cancel_animation_frame(id);
        }

        let closure = self.callback.borrow_mut().take();
        drop(closure);
    }
}

/// A DOM event listener which is detached explicitly.
struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    fn new(
        target: &EventTarget,
        event: &'static str,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, Error> {
        let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);

        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(into_error)?;

        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }

    fn remove(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }

    /// Leaves the listener attached for the rest of the page's lifetime.
    fn leak(self) {
        self.callback.forget();
    }
}

/// A mounted, animating scene.
///
/// Dropping the handle leaves the scene running for the rest of the page's
/// lifetime; call `dispose` to tear it down.
pub struct SceneHandle {
    runtime: Rc<RefCell<Runtime>>,
    frame_loop: FrameLoop,
    listeners: Vec<EventListener>,
}

impl SceneHandle {
    pub fn scene(&self) -> Ref<Scene> {
        Ref::map(self.runtime.borrow(), |runtime| &runtime.scene)
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.runtime.borrow().surface.size()
    }

    pub fn canvas(&self) -> HtmlCanvasElement {
        self.runtime.borrow().surface.canvas().clone()
    }

    /// Runs one frame body synchronously at wall-clock time `now_ms`.
    pub fn advance(&self, now_ms: f64) -> Result<(), Error> {
        self.runtime.borrow_mut().frame(now_ms)
    }

    /// Stops the animation, detaches all listeners and removes the canvas.
    ///
    /// Returns the final scene, or `None` if something outside the handle
    /// still holds on to it.
    pub fn dispose(mut self) -> Option<Scene> {
        self.frame_loop.stop();

        for listener in self.listeners.drain(..) {
            listener.remove();
        }

        let runtime = self.runtime.clone();
        drop(self);

        runtime.borrow().surface.canvas().remove();

        info!("scene disposed");

        Rc::try_unwrap(runtime)
            .ok()
            .map(|runtime| runtime.into_inner().scene)
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.leak();
        }
    }
}

/// Mounts the scene built by `builder` into the element `container_id`.
pub fn init_scene(
    container_id: &str,
    builder: impl FnOnce() -> Object,
) -> Result<Option<SceneHandle>, Error> {
    init_scene_with_options(container_id, &RunnerOptions::default(), builder)
}

/// Mounts the scene built by `builder` into the element `container_id`.
///
/// Returns `Ok(None)` without touching the page if there is no such element.
pub fn init_scene_with_options(
    container_id: &str,
    options: &RunnerOptions,
    builder: impl FnOnce() -> Object,
) -> Result<Option<SceneHandle>, Error> {
    let window = web_sys::window().ok_or_else(|| Error::new("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| Error::new("window has no document"))?;

    let container = match document.get_element_by_id(container_id) {
        Some(container) => container,
        None => {
            debug!("no element `{}', scene not mounted", container_id);
            return Ok(None);
        }
    };

    let (width, height) = client_size(&container);

    let surface = RenderSurface::create(&document, &options.surface)?;
    surface.set_size(width, height)?;

    let device = Device::new(surface.context())?;
    let scene = Scene::new(width, height, &options.surface, builder());

    let runtime = Rc::new(RefCell::new(Runtime {
        container,
        surface,
        device,
        scene,
        spin: options.spin.clone(),
    }));

    let mut listeners = vec![];

    let frame_loop = match mount(&window, &runtime, &mut listeners) {
        Ok(frame_loop) => frame_loop,
        Err(err) => {
            for listener in listeners.drain(..) {
                listener.remove();
            }

            runtime.borrow().surface.canvas().remove();

            return Err(err);
        }
    };

    info!("scene mounted in `{}' at {}x{}", container_id, width, height);

    Ok(Some(SceneHandle {
        runtime,
        frame_loop,
        listeners,
    }))
}

/// Attaches the listeners and the canvas, draws the first frame and starts
/// the frame loop. On failure `listeners` holds whatever was attached.
fn mount(
    window: &Window,
    runtime: &Rc<RefCell<Runtime>>,
    listeners: &mut Vec<EventListener>,
) -> Result<FrameLoop, Error> {
    let canvas: EventTarget = runtime.borrow().surface.canvas().clone().into();

    let shared = runtime.clone();
    listeners.push(EventListener::new(window, "resize", move |_| {
        if let Err(err) = shared.borrow_mut().resize() {
            error!("failed to resize surface: {}", describe(&err));
        }
    })?);

    let shared = runtime.clone();
    listeners.push(EventListener::new(&canvas, "webglcontextlost", move |event| {
        event.prevent_default();
        shared.borrow_mut().device.context_lost();

        warn!("graphics context lost");
    })?);

    {
        let runtime = runtime.borrow();

        runtime
            .container
            .append_child(runtime.surface.canvas())
            .map_err(into_error)?;
    }

    runtime.borrow_mut().frame(js_sys::Date::now())?;

    FrameLoop::start(window, runtime.clone())
}

/// Runs `f` once the document has been parsed.
///
/// `f` runs immediately if parsing already finished, otherwise on the
/// `DOMContentLoaded` event.
pub fn on_document_ready(document: &Document, f: impl FnOnce() + 'static) -> Result<(), Error> {
    if document.ready_state() != "loading" {
        f();
        return Ok(());
    }

    let callback = Closure::once_into_js(f);

    document
        .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
        .map_err(into_error)
}

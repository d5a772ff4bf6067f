use std::{cell::RefCell, rc::Rc};

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent};

use crate::config::{validate_scale, Bindings, Changes, MaterialKind, Orientation, ViewConfig};
use crate::error::{Result, WidgetError};
use crate::frame_loop::FrameLoop;
use crate::renderer::{NodeKind, SceneRenderer};
use crate::scene::{effective_size, SceneState};
use crate::{log, log_warn}; // macro import


struct Inner {
    element: HtmlElement,
    canvas: HtmlCanvasElement,
    bindings: Bindings,
    state: SceneState,
    renderer: SceneRenderer,
}

impl Inner {
    fn measured_width(&self) -> u32 {
        self.element.client_width().max(0) as u32
    }

    /// Runs the responses due for `next`, all-or-nothing
    fn apply(&mut self, next: Bindings) -> Result<Changes> {
        let changes = next.changes_since(&self.bindings);
        if !changes.any() {
            return Ok(changes);
        }

        // validate before touching anything
        if changes.orientation {
            next.quaternion.validated()?;
        }
        if changes.resize {
            effective_size(&next.config, self.measured_width())?;
        }
        if changes.scale {
            validate_scale(next.config.scale)?;
        }

        if changes.resize {
            self.resize_canvas(&next.config)?;
        }
        if changes.scale {
            self.state.set_scale(next.config.scale)?;
        }
        if changes.material {
            self.state.set_material(next.config.material);
        }
        if changes.orientation {
            self.state.set_orientation(next.quaternion)?;
        }
        self.bindings = next;
        Ok(changes)
    }

    fn resize_canvas(&mut self, config: &ViewConfig) -> Result<()> {
        let surface = self.state.resize(config, self.measured_width())?;
        if self.canvas.width() != surface.width || self.canvas.height() != surface.height {
            self.canvas.set_width(surface.width);
            self.canvas.set_height(surface.height);
        }
        Ok(())
    }

    fn draw(&mut self) {
        self.state.advance_camera();
        self.renderer.render(&self.state);
    }
}


/// The view attached to a host element: owns the canvas, scene, renderer,
/// DOM listeners and the animation loop. Dropping it releases all of them.
pub struct Widget {
    inner: Rc<RefCell<Inner>>,
    listeners: Vec<EventListener>,
    frame_loop: Option<FrameLoop>,
}

impl Widget {
    /// Builds the scene inside `element` and starts listening for pointer and resize events
    pub fn attach(element: HtmlElement, config: ViewConfig) -> Result<Self> {
        log!("Widget::attach(): initializing");

        let window = web_sys::window().ok_or_else(|| WidgetError::Dom("no window".to_string()))?;
        let document = window.document().ok_or_else(|| WidgetError::Dom("no document".to_string()))?;

        let measured = element.client_width().max(0) as u32;
        let state = SceneState::new(&config, measured)?;
        let surface = state.surface();

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| WidgetError::Dom("could not create a canvas".to_string()))?;
        canvas.set_width(surface.width);
        canvas.set_height(surface.height);

        let gl = create_gl(&canvas)?;
        let renderer = SceneRenderer::new(gl, &state)?;
        element.append_child(&canvas)?;
        log!("Widget::attach(): surface {}x{}, material {}", surface.width, surface.height, config.material);
        log!("Widget::attach(): nodes {:?}", renderer.nodes(config.material));

        let inner = Rc::new(RefCell::new(Inner {
            element,
            canvas,
            bindings: Bindings { config, quaternion: Orientation::IDENTITY },
            state,
            renderer,
        }));

        let mut listeners = Vec::with_capacity(2);
        {
            let inner = inner.clone();
            listeners.push(EventListener::new(&document, "mousemove", move |event| {
                if let Some(e) = event.dyn_ref::<MouseEvent>() {
                    inner.borrow_mut().state.pointer_moved(e.client_x() as f32, e.client_y() as f32);
                }
            }));
        }
        {
            let inner = inner.clone();
            listeners.push(EventListener::new(&window, "resize", move |_| {
                let mut inner = inner.borrow_mut();
                let config = inner.bindings.config.clone();
                if let Err(e) = inner.resize_canvas(&config) {
                    log_warn!("Widget: resize ignored: {}", e);
                }
            }));
        }

        log!("Widget::attach(): done initializing");

        Ok(Self { inner, listeners, frame_loop: None })
    }

    /// Starts the redraw loop; a no-op when it is already running
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let inner = self.inner.clone();
        self.frame_loop = Some(FrameLoop::start(move |_timestamp| {
            inner.borrow_mut().draw();
        }));
    }

    pub fn stop(&mut self) {
        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.as_ref().map_or(false, |l| l.is_running())
    }

    /// Draws a single frame outside the loop
    pub fn render_once(&self) {
        self.inner.borrow_mut().draw();
    }

    /// Replaces every binding at once and runs the responses that changed
    pub fn apply(&self, next: Bindings) -> Result<Changes> {
        let result = self.inner.borrow_mut().apply(next);
        if let Err(e) = &result {
            log_warn!("Widget::apply(): rejected: {}", e);
        }
        result
    }

    pub fn bindings(&self) -> Bindings {
        self.inner.borrow().bindings.clone()
    }

    fn update<F: FnOnce(&mut Bindings)>(&self, f: F) -> Result<Changes> {
        let mut next = self.bindings();
        f(&mut next);
        self.apply(next)
    }

    pub fn set_width(&self, width: u32) -> Result<Changes> {
        self.update(|b| b.config.width = width)
    }

    pub fn set_height(&self, height: u32) -> Result<Changes> {
        self.update(|b| b.config.height = height)
    }

    pub fn set_fill_container(&self, fill: bool) -> Result<Changes> {
        self.update(|b| b.config.fill_container = fill)
    }

    pub fn set_scale(&self, scale: f32) -> Result<Changes> {
        self.update(|b| b.config.scale = scale)
    }

    pub fn set_material(&self, material: MaterialKind) -> Result<Changes> {
        self.update(|b| b.config.material = material)
    }

    pub fn set_quaternion(&self, q: Orientation) -> Result<Changes> {
        self.update(|b| b.quaternion = q)
    }

    /// The scene nodes the next frame draws
    pub fn nodes(&self) -> Vec<NodeKind> {
        let inner = self.inner.borrow();
        inner.renderer.nodes(inner.state.material())
    }

    pub fn surface_size(&self) -> (u32, u32) {
        let s = self.inner.borrow().state.surface();
        (s.width, s.height)
    }

    pub fn aspect(&self) -> f32 {
        self.inner.borrow().state.aspect()
    }

    /// Tears the view down and removes its canvas from the host element
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        self.stop();
        self.listeners.clear();
        if let Ok(inner) = self.inner.try_borrow() {
            inner.canvas.remove();
        }
        log!("Widget: detached");
    }
}


#[cfg(target_arch = "wasm32")]
pub(crate) fn create_gl(canvas: &HtmlCanvasElement) -> Result<three_d::context::Context> {
    use wasm_bindgen::JsValue;

    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &JsValue::from_str("antialias"), &JsValue::TRUE)?;
    let webgl2 = canvas
        .get_context_with_context_options("webgl2", &options)?
        .ok_or_else(|| WidgetError::WebGl("WebGL2 is not supported".to_string()))?
        .dyn_into::<web_sys::WebGl2RenderingContext>()
        .map_err(|_| WidgetError::WebGl("not a WebGL2 rendering context".to_string()))?;
    Ok(three_d::context::Context::from_webgl2_context(webgl2))
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn create_gl(_canvas: &HtmlCanvasElement) -> Result<three_d::context::Context> {
    Err(WidgetError::WebGl("WebGL2 is only available in the browser".to_string()))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use std::rc::Rc;
    use wasm_bindgen_test::*;
    use web_sys::{MouseEvent, MouseEventInit};

    wasm_bindgen_test_configure!(run_in_browser);

    fn host() -> HtmlElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let div: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
        div.set_attribute("style", "width: 400px; height: 400px;").unwrap();
        document.body().unwrap().append_child(&div).unwrap();
        div
    }

    fn move_pointer_to(x: i32, y: i32) {
        let init = MouseEventInit::new();
        init.set_client_x(x);
        init.set_client_y(y);
        let event = MouseEvent::new_with_mouse_event_init_dict("mousemove", &init).unwrap();
        web_sys::window().unwrap().document().unwrap().dispatch_event(&event).unwrap();
    }

    #[wasm_bindgen_test]
    fn detach_drops_the_listeners() {
        let widget = Widget::attach(host(), ViewConfig::default()).unwrap();
        let inner = Rc::downgrade(&widget.inner);

        move_pointer_to(300, 250);
        assert_eq!(widget.inner.borrow().state.pointer(), three_d::vec2(100.0, 50.0));

        widget.detach();
        // the listener closures held the only other references
        assert!(inner.upgrade().is_none());
        move_pointer_to(0, 0);
    }

    #[wasm_bindgen_test]
    fn non_finite_quaternion_is_rejected_by_apply() {
        let widget = Widget::attach(host(), ViewConfig::default()).unwrap();
        let q = Orientation::new(0.0, 0.0, 1.0, 0.0).unwrap();
        widget.set_quaternion(q).unwrap();

        let mut next = widget.bindings();
        next.quaternion = Orientation { x: f32::NAN, ..Orientation::IDENTITY };
        next.config.scale = 3.0;
        assert!(matches!(widget.apply(next), Err(WidgetError::InvalidQuaternion { .. })));

        let kept = widget.bindings();
        assert_eq!(kept.quaternion, q);
        assert_eq!(kept.config.scale, 1.0);
        assert_eq!(widget.inner.borrow().state.frame_orientation(1), q);
        // nothing pending once the bad value was refused
        assert!(!widget.apply(kept).unwrap().any());
    }
}

use wasm_bindgen::prelude::*;

pub mod utils;
pub mod config;
pub mod error;
pub mod frame_loop;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod widget;

use config::{MaterialKind, Orientation, ViewConfig};
use widget::Widget;


/// JavaScript handle to a view attached to a host element.
///
/// ```js
/// const view = new RotationView(document.getElementById("view"));
/// view.setQuaternion(0, 0, Math.SQRT1_2, Math.SQRT1_2);
/// view.start();
/// ```
#[wasm_bindgen]
pub struct RotationView {
    widget: Option<Widget>,
}

impl RotationView {
    fn widget(&self) -> Result<&Widget, JsValue> {
        self.widget.as_ref().ok_or_else(|| JsValue::from_str("RotationView is detached"))
    }

    fn widget_mut(&mut self) -> Result<&mut Widget, JsValue> {
        self.widget.as_mut().ok_or_else(|| JsValue::from_str("RotationView is detached"))
    }
}

#[wasm_bindgen]
impl RotationView {
    /// Attaches to `element`, configured from its `data-*` attributes, and starts drawing
    #[wasm_bindgen(constructor)]
    pub fn new(element: web_sys::HtmlElement) -> Result<RotationView, JsValue> {
        utils::set_panic_hook();
        let config = ViewConfig::from_element(&element)?;
        let mut widget = Widget::attach(element, config)?;
        widget.start();
        Ok(RotationView { widget: Some(widget) })
    }

    #[wasm_bindgen(js_name = setWidth)]
    pub fn set_width(&self, width: u32) -> Result<(), JsValue> {
        self.widget()?.set_width(width)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setHeight)]
    pub fn set_height(&self, height: u32) -> Result<(), JsValue> {
        self.widget()?.set_height(height)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setFillContainer)]
    pub fn set_fill_container(&self, fill: bool) -> Result<(), JsValue> {
        self.widget()?.set_fill_container(fill)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&self, scale: f32) -> Result<(), JsValue> {
        self.widget()?.set_scale(scale)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setMaterialType)]
    pub fn set_material_type(&self, name: &str) -> Result<(), JsValue> {
        let material: MaterialKind = name.parse()?;
        self.widget()?.set_material(material)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setQuaternion)]
    pub fn set_quaternion(&self, x: f32, y: f32, z: f32, w: f32) -> Result<(), JsValue> {
        self.widget()?.set_quaternion(Orientation::new(x, y, z, w)?)?;
        Ok(())
    }

    /// Accepts any object with numeric `x`, `y`, `z` and `w` properties
    #[wasm_bindgen(js_name = setQuaternionObject)]
    pub fn set_quaternion_object(&self, q: &JsValue) -> Result<(), JsValue> {
        let component = |name: &str| -> Result<f32, JsValue> {
            js_sys::Reflect::get(q, &JsValue::from_str(name))?
                .as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| JsValue::from_str(&format!("quaternion.{} must be a number", name)))
        };
        self.set_quaternion(component("x")?, component("y")?, component("z")?, component("w")?)
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        self.widget_mut()?.start();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), JsValue> {
        self.widget_mut()?.stop();
        Ok(())
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.widget.as_ref().map_or(false, |w| w.is_running())
    }

    #[wasm_bindgen(js_name = renderOnce)]
    pub fn render_once(&self) -> Result<(), JsValue> {
        self.widget()?.render_once();
        Ok(())
    }

    /// Stops drawing, removes the listeners and the canvas. Later calls fail.
    pub fn detach(&mut self) {
        if let Some(widget) = self.widget.take() {
            widget.detach();
        }
    }

    pub fn width(&self) -> Result<u32, JsValue> {
        Ok(self.widget()?.surface_size().0)
    }

    pub fn height(&self) -> Result<u32, JsValue> {
        Ok(self.widget()?.surface_size().1)
    }

    pub fn aspect(&self) -> Result<f32, JsValue> {
        Ok(self.widget()?.aspect())
    }

    #[wasm_bindgen(js_name = materialType)]
    pub fn material_type(&self) -> Result<String, JsValue> {
        Ok(self.widget()?.bindings().config.material.to_string())
    }
}

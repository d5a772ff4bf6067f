use thiserror::Error;
use wasm_bindgen::JsValue;


/// Everything that can go wrong while attaching, updating or drawing the view
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("unknown material type '{0}' (expected one of: lambert, phong, wireframe)")]
    UnknownMaterial(String),

    #[error("canvas size must be non-zero, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("scale must be a positive finite number, got {0}")]
    InvalidScale(f32),

    #[error("quaternion components must be finite, got ({x}, {y}, {z}, {w})")]
    InvalidQuaternion { x: f32, y: f32, z: f32, w: f32 },

    #[error("invalid value '{value}' for attribute '{name}'")]
    InvalidAttribute { name: &'static str, value: String },

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("WebGL error: {0}")]
    WebGl(String),

    #[error("three-d context error: {0}")]
    Context(#[from] three_d::CoreError),
}

impl From<WidgetError> for JsValue {
    fn from(e: WidgetError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

impl From<JsValue> for WidgetError {
    fn from(v: JsValue) -> Self {
        WidgetError::Dom(v.as_string().unwrap_or_else(|| format!("{:?}", v)))
    }
}

pub type Result<T> = std::result::Result<T, WidgetError>;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let e = WidgetError::UnknownMaterial("toon".to_string());
        assert!(e.to_string().contains("'toon'"));

        let e = WidgetError::ZeroSize { width: 400, height: 0 };
        assert_eq!(e.to_string(), "canvas size must be non-zero, got 400x0");

        let e = WidgetError::InvalidAttribute { name: "data-scale", value: "big".to_string() };
        assert_eq!(e.to_string(), "invalid value 'big' for attribute 'data-scale'");
    }
}

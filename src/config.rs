use std::{fmt, str::FromStr};

use crate::error::{Result, WidgetError};


/// The closed set of surface materials the icosahedron can wear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialKind {
    /// Flat-shaded, vertex-colored, diffuse only
    #[default]
    Lambert,
    /// Flat-shaded, vertex-colored, with a specular highlight
    Phong,
    /// Black edge overlay
    Wireframe,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 3] = [MaterialKind::Lambert, MaterialKind::Phong, MaterialKind::Wireframe];

    pub fn name(&self) -> &'static str {
        match self {
            MaterialKind::Lambert => "lambert",
            MaterialKind::Phong => "phong",
            MaterialKind::Wireframe => "wireframe",
        }
    }
}

impl FromStr for MaterialKind {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self> {
        MaterialKind::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| WidgetError::UnknownMaterial(s.to_string()))
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


/// A quaternion as supplied by the host, components in (x, y, z, w) order.
///
/// Stored verbatim: the host is expected to pass a unit quaternion, and no
/// normalization happens on the way to the reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Builds an orientation, rejecting NaN and infinite components
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Result<Self> {
        Self { x, y, z, w }.validated()
    }

    /// Passes the orientation through when every component is finite
    pub fn validated(self) -> Result<Self> {
        let Self { x, y, z, w } = self;
        if [x, y, z, w].iter().all(|c| c.is_finite()) {
            Ok(self)
        } else {
            Err(WidgetError::InvalidQuaternion { x, y, z, w })
        }
    }

    pub fn to_quat(&self) -> three_d::Quat {
        // cgmath orders the scalar part first
        three_d::Quat::new(self.w, self.x, self.y, self.z)
    }
}


/// Host-facing view state: canvas size, fill-container flag, scale and material
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub width: u32,
    pub height: u32,
    pub fill_container: bool,
    pub scale: f32,
    pub material: MaterialKind,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            fill_container: true,
            scale: 1.0,
            material: MaterialKind::Lambert,
        }
    }
}

pub const ATTR_WIDTH: &str = "data-width";
pub const ATTR_HEIGHT: &str = "data-height";
pub const ATTR_FILL_CONTAINER: &str = "data-fill-container";
pub const ATTR_SCALE: &str = "data-scale";
pub const ATTR_MATERIAL_TYPE: &str = "data-material-type";

impl ViewConfig {
    /// Overlays attribute values onto the defaults.
    /// `lookup` returns the raw attribute text, or None when it is absent.
    pub fn from_attributes<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = ViewConfig::default();

        if let Some(v) = lookup(ATTR_WIDTH) {
            config.width = parse_attr(ATTR_WIDTH, &v)?;
        }
        if let Some(v) = lookup(ATTR_HEIGHT) {
            config.height = parse_attr(ATTR_HEIGHT, &v)?;
        }
        if let Some(v) = lookup(ATTR_FILL_CONTAINER) {
            config.fill_container = match v.trim() {
                // a bare attribute counts as set
                "" | "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(WidgetError::InvalidAttribute { name: ATTR_FILL_CONTAINER, value: v }),
            };
        }
        if let Some(v) = lookup(ATTR_SCALE) {
            config.scale = validate_scale(parse_attr(ATTR_SCALE, &v)?)?;
        }
        if let Some(v) = lookup(ATTR_MATERIAL_TYPE) {
            config.material = v.trim().parse()?;
        }
        // the bound width only matters when not filling the container
        if (!config.fill_container && config.width == 0) || config.height == 0 {
            return Err(WidgetError::ZeroSize { width: config.width, height: config.height });
        }

        Ok(config)
    }

    /// Reads the `data-*` configuration attributes of a host element
    pub fn from_element(element: &web_sys::HtmlElement) -> Result<Self> {
        Self::from_attributes(|name| element.get_attribute(name))
    }
}

fn parse_attr<T: FromStr>(name: &'static str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| WidgetError::InvalidAttribute { name, value: value.to_string() })
}

pub fn validate_scale(scale: f32) -> Result<f32> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(WidgetError::InvalidScale(scale))
    }
}


/// Everything the host binds into the view
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bindings {
    pub config: ViewConfig,
    pub quaternion: Orientation,
}


/// Which responses a new set of bindings calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes {
    pub resize: bool,
    pub scale: bool,
    pub material: bool,
    pub orientation: bool,
}

impl Changes {
    pub fn any(&self) -> bool {
        self.resize || self.scale || self.material || self.orientation
    }
}

impl Bindings {
    /// Compares against the previous snapshot
    pub fn changes_since(&self, previous: &Bindings) -> Changes {
        let (a, b) = (&self.config, &previous.config);
        Changes {
            resize: a.fill_container != b.fill_container || a.width != b.width || a.height != b.height,
            scale: a.scale != b.scale,
            material: a.material != b.material,
            orientation: self.quaternion != previous.quaternion,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn defaults_match_the_view_controller() {
        let c = ViewConfig::default();
        assert_eq!((c.width, c.height), (400, 400));
        assert!(c.fill_container);
        assert_eq!(c.scale, 1.0);
        assert_eq!(c.material, MaterialKind::Lambert);
    }

    #[test]
    fn material_names_parse_and_print() {
        for kind in MaterialKind::ALL {
            assert_eq!(kind.name().parse::<MaterialKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        match "Lambert".parse::<MaterialKind>() {
            Err(WidgetError::UnknownMaterial(s)) => assert_eq!(s, "Lambert"),
            other => panic!("unexpected {:?}", other),
        }
        assert!("".parse::<MaterialKind>().is_err());
    }

    #[test]
    fn orientation_rejects_non_finite_components() {
        assert!(Orientation::new(0.0, 0.0, 0.0, 1.0).is_ok());
        assert!(Orientation::new(f32::NAN, 0.0, 0.0, 1.0).is_err());
        assert!(Orientation::new(0.0, 0.0, f32::INFINITY, 1.0).is_err());
        // not normalized, but accepted as is
        let q = Orientation::new(0.0, 0.0, 0.0, 2.0).unwrap();
        assert_eq!(q.w, 2.0);
    }

    #[test]
    fn orientation_converts_with_scalar_first() {
        let q = Orientation::new(0.1, 0.2, 0.3, 0.9).unwrap().to_quat();
        assert_eq!(q.s, 0.9);
        assert_eq!((q.v.x, q.v.y, q.v.z), (0.1, 0.2, 0.3));
    }

    #[test]
    fn attributes_overlay_defaults() {
        let a = attrs(&[
            (ATTR_WIDTH, "640"),
            (ATTR_FILL_CONTAINER, "false"),
            (ATTR_SCALE, " 1.5 "),
            (ATTR_MATERIAL_TYPE, "wireframe"),
        ]);
        let c = ViewConfig::from_attributes(|k| a.get(k).cloned()).unwrap();
        assert_eq!(c.width, 640);
        assert_eq!(c.height, 400);
        assert!(!c.fill_container);
        assert_eq!(c.scale, 1.5);
        assert_eq!(c.material, MaterialKind::Wireframe);

        let c = ViewConfig::from_attributes(|_| None).unwrap();
        assert_eq!(c, ViewConfig::default());
    }

    #[test]
    fn bare_fill_container_attribute_is_true() {
        let a = attrs(&[(ATTR_FILL_CONTAINER, "")]);
        assert!(ViewConfig::from_attributes(|k| a.get(k).cloned()).unwrap().fill_container);
    }

    #[test]
    fn malformed_attributes_are_rejected() {
        let cases = [
            (ATTR_WIDTH, "wide"),
            (ATTR_HEIGHT, "-3"),
            (ATTR_FILL_CONTAINER, "maybe"),
            (ATTR_SCALE, "0"),
            (ATTR_SCALE, "NaN"),
            (ATTR_MATERIAL_TYPE, "toon"),
            (ATTR_HEIGHT, "0"),
        ];
        for (k, v) in cases {
            let a = attrs(&[(k, v)]);
            assert!(ViewConfig::from_attributes(|n| a.get(n).cloned()).is_err(), "{}={}", k, v);
        }
    }

    #[test]
    fn zero_width_only_matters_for_a_fixed_size() {
        let filling = attrs(&[(ATTR_WIDTH, "0")]);
        let c = ViewConfig::from_attributes(|k| filling.get(k).cloned()).unwrap();
        assert!(c.fill_container);
        assert_eq!(c.width, 0);

        let fixed = attrs(&[(ATTR_WIDTH, "0"), (ATTR_FILL_CONTAINER, "false")]);
        assert!(matches!(
            ViewConfig::from_attributes(|k| fixed.get(k).cloned()),
            Err(WidgetError::ZeroSize { width: 0, height: 400 })
        ));
    }

    #[test]
    fn struct_literal_orientation_is_checked_too() {
        let q = Orientation { x: f32::NAN, ..Orientation::IDENTITY };
        assert!(matches!(q.validated(), Err(WidgetError::InvalidQuaternion { .. })));
        assert_eq!(Orientation::IDENTITY.validated().unwrap(), Orientation::IDENTITY);
    }

    #[test]
    fn scale_must_be_positive_and_finite() {
        assert_eq!(validate_scale(0.25).unwrap(), 0.25);
        assert!(validate_scale(0.0).is_err());
        assert!(validate_scale(-1.0).is_err());
        assert!(validate_scale(f32::INFINITY).is_err());
    }

    #[test]
    fn change_detection_groups_size_inputs() {
        let prev = Bindings::default();
        assert!(!prev.changes_since(&prev).any());

        let mutations: [fn(&mut Bindings); 3] = [
            |b| b.config.width = 500,
            |b| b.config.height = 300,
            |b| b.config.fill_container = false,
        ];
        for mutate in mutations {
            let mut next = prev.clone();
            mutate(&mut next);
            assert_eq!(next.changes_since(&prev), Changes { resize: true, ..Default::default() });
        }

        let mut next = prev.clone();
        next.config.scale = 2.0;
        next.config.material = MaterialKind::Phong;
        next.quaternion = Orientation::new(1.0, 0.0, 0.0, 0.0).unwrap();
        let c = next.changes_since(&prev);
        assert!(!c.resize);
        assert!(c.scale && c.material && c.orientation);
    }
}

use three_d::*;

use crate::config::{validate_scale, MaterialKind, Orientation, ViewConfig};
use crate::error::{Result, WidgetError};


pub const FIELD_OF_VIEW_DEG: f32 = 30.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;
pub const CAMERA_DISTANCE: f32 = 10.0;
/// Pointer offset (pixels) to camera x (world units)
pub const POINTER_TO_WORLD: f32 = 0.01;
/// Fraction of the remaining distance the camera covers per frame
pub const CAMERA_EASING: f32 = 0.05;
pub const SHADOW_PLANE_Y: f32 = -1.5;
pub const LIGHT_POSITION: (f32, f32, f32) = (1.0, 1.0, 1.0);


/// Size of the drawing surface in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn viewport(&self) -> Viewport {
        Viewport::new_at_origo(self.width, self.height)
    }
}

/// Width comes from the host element when filling the container, otherwise from the binding
pub fn effective_size(config: &ViewConfig, measured_width: u32) -> Result<SurfaceSize> {
    let width = if config.fill_container { measured_width } else { config.width };
    let height = config.height;
    if width == 0 || height == 0 {
        return Err(WidgetError::ZeroSize { width, height });
    }
    Ok(SurfaceSize { width, height })
}


/// Renderer-independent state of the view: everything the draw call reads.
pub struct SceneState {
    camera: Camera,
    surface: SurfaceSize,
    half_extent: Vec2,
    pointer: Vec2,
    frames: [Orientation; 2],
    mesh_scale: f32,
    shadow_scale: f32,
    material: MaterialKind,
}

impl SceneState {
    pub fn new(config: &ViewConfig, measured_width: u32) -> Result<Self> {
        let surface = effective_size(config, measured_width)?;
        let scale = validate_scale(config.scale)?;
        let camera = Camera::new_perspective(
            surface.viewport(),
            vec3(0.0, 0.0, CAMERA_DISTANCE),
            vec3(0.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            degrees(FIELD_OF_VIEW_DEG),
            Z_NEAR,
            Z_FAR,
        );

        Ok(Self {
            camera,
            surface,
            half_extent: half_extent(surface),
            pointer: vec2(0.0, 0.0),
            frames: [Orientation::IDENTITY; 2],
            mesh_scale: scale,
            shadow_scale: scale,
            material: config.material,
        })
    }

    /// Recomputes the surface size and updates the camera aspect to match
    pub fn resize(&mut self, config: &ViewConfig, measured_width: u32) -> Result<SurfaceSize> {
        let surface = effective_size(config, measured_width)?;
        self.surface = surface;
        self.half_extent = half_extent(surface);
        self.camera.set_viewport(surface.viewport());
        Ok(surface)
    }

    /// Scales the icosahedron and the shadow plane together
    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        let scale = validate_scale(scale)?;
        self.mesh_scale = scale;
        self.shadow_scale = scale;
        Ok(())
    }

    pub fn set_material(&mut self, material: MaterialKind) {
        self.material = material;
    }

    /// Orients the second reference frame; the first one stays at identity
    pub fn set_orientation(&mut self, q: Orientation) -> Result<()> {
        self.frames[1] = q.validated()?;
        Ok(())
    }

    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32) {
        self.pointer = vec2(client_x - self.half_extent.x, client_y - self.half_extent.y);
    }

    /// One animation step: ease the camera's x toward the pointer and look at the origin
    pub fn advance_camera(&mut self) {
        let p = *self.camera.position();
        let x = p.x + (self.pointer.x * POINTER_TO_WORLD - p.x) * CAMERA_EASING;
        self.camera.set_view(vec3(x, p.y, p.z), vec3(0.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0));
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn aspect(&self) -> f32 {
        self.camera.viewport().aspect()
    }

    #[cfg(test)]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    #[cfg(test)]
    pub fn frame_orientation(&self, index: usize) -> Orientation {
        self.frames[index]
    }

    #[cfg(test)]
    pub fn mesh_scale(&self) -> f32 {
        self.mesh_scale
    }

    #[cfg(test)]
    pub fn shadow_scale(&self) -> f32 {
        self.shadow_scale
    }

    pub fn material(&self) -> MaterialKind {
        self.material
    }

    pub fn mesh_transformation(&self) -> Mat4 {
        Mat4::from_scale(self.mesh_scale)
    }

    /// Lays the plane flat below the mesh, then applies the bound scale
    pub fn shadow_transformation(&self) -> Mat4 {
        Mat4::from_translation(vec3(0.0, SHADOW_PLANE_Y, 0.0))
            * Mat4::from_angle_x(degrees(-90.0))
            * Mat4::from_scale(self.shadow_scale)
    }

    pub fn frame_transformation(&self, index: usize) -> Mat4 {
        Mat4::from(self.frames[index].to_quat())
    }

    /// Direction the light travels, from its position toward the origin
    pub fn light_direction(&self) -> Vec3 {
        let (x, y, z) = LIGHT_POSITION;
        -vec3(x, y, z)
    }
}

fn half_extent(surface: SurfaceSize) -> Vec2 {
    vec2(surface.width as f32 / 2.0, surface.height as f32 / 2.0)
}

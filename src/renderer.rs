use std::sync::Arc;

use three_d::*;

use crate::config::MaterialKind;
use crate::error::Result;
use crate::geometry::*;
use crate::scene::SceneState;


const FRAME_AXIS_LENGTH: f32 = 1.0;
const FRAME_AXIS_THICKNESS: f32 = 0.04;
const CLEAR_COLOR: (f32, f32, f32, f32) = (1.0, 1.0, 1.0, 1.0);


/// What a drawn scene node is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    ReferenceFrame,
    Light,
    ShadowPlane,
    Icosahedron,
}


/// Three colored arrows showing an oriented basis
struct ReferenceFrame {
    axes: Vec<(Gm<Mesh, ColorMaterial>, Mat4)>,
}
impl ReferenceFrame {
    fn new(context: &Context) -> Self {
        let arrow = CpuMesh::arrow(0.9, 0.6, 16);
        let axes = basis_axes(FRAME_AXIS_LENGTH, FRAME_AXIS_THICKNESS)
            .into_iter()
            .map(|(local, color)| {
                let material = ColorMaterial { color, ..Default::default() };
                (Gm::new(Mesh::new(context, &arrow), material), local)
            })
            .collect();
        Self { axes }
    }

    fn set_transformation(&mut self, orientation: Mat4) {
        for (gm, local) in self.axes.iter_mut() {
            gm.set_transformation(orientation * *local);
        }
    }

    fn objects(&self) -> impl Iterator<Item = &dyn Object> {
        self.axes.iter().map(|(gm, _)| gm as &dyn Object)
    }
}


/// The icosahedron pre-built once per material; the scene's material picks which one is drawn
struct MaterialTable {
    lambert: Gm<Mesh, PhysicalMaterial>,
    phong: Gm<Mesh, PhysicalMaterial>,
    wireframe: Gm<InstancedMesh, ColorMaterial>,
}
impl MaterialTable {
    fn new(context: &Context) -> Self {
        let poly = Polyhedron::icosahedron(ICOSAHEDRON_RADIUS, ICOSAHEDRON_DETAIL);
        let solid = poly.to_flat_cpu_mesh();

        let lambert = Gm::new(
            Mesh::new(context, &solid),
            PhysicalMaterial::new_opaque(
                context,
                &CpuMaterial {
                    albedo: Srgba::WHITE,
                    metallic: 0.0,
                    roughness: 1.0,
                    ..Default::default()
                },
            ),
        );
        let phong = Gm::new(
            Mesh::new(context, &solid),
            PhysicalMaterial::new_opaque(
                context,
                &CpuMaterial {
                    albedo: Srgba::new(0xdd, 0xdd, 0xdd, 0xff),
                    metallic: 0.1,
                    roughness: 0.35,
                    ..Default::default()
                },
            ),
        );
        let wireframe = Gm::new(
            InstancedMesh::new(
                context,
                &Instances {
                    transformations: poly.edge_transformations(EDGE_RADIUS),
                    ..Default::default()
                },
                &CpuMesh::cylinder(8),
            ),
            ColorMaterial { color: Srgba::BLACK, ..Default::default() },
        );

        Self { lambert, phong, wireframe }
    }

    fn set_transformation(&mut self, transformation: Mat4) {
        self.lambert.set_transformation(transformation);
        self.phong.set_transformation(transformation);
        self.wireframe.set_transformation(transformation);
    }

    fn get(&self, kind: MaterialKind) -> &dyn Object {
        match kind {
            MaterialKind::Lambert => &self.lambert,
            MaterialKind::Phong => &self.phong,
            MaterialKind::Wireframe => &self.wireframe,
        }
    }
}


/// GPU side of the view. Owns every three-d resource and draws a [SceneState].
pub struct SceneRenderer {
    context: Context,
    frames: [ReferenceFrame; 2],
    light: DirectionalLight,
    shadow: Gm<Mesh, ColorMaterial>,
    icosahedron: MaterialTable,
}
impl SceneRenderer {
    /// Wraps an existing GL context
    pub fn new(gl: three_d::context::Context, state: &SceneState) -> Result<Self> {
        let context = Context::from_gl_context(Arc::new(gl))?;

        let frames = [ReferenceFrame::new(&context), ReferenceFrame::new(&context)];
        let light = DirectionalLight::new(&context, 1.0, Srgba::WHITE, &state.light_direction());

        let shadow_texture = Texture2DRef::from_cpu_texture(&context, &shadow_cpu_texture());
        let shadow = Gm::new(
            Mesh::new(&context, &plane_cpu_mesh(SHADOW_PLANE_SIZE)),
            ColorMaterial {
                color: Srgba::WHITE,
                texture: Some(shadow_texture),
                ..Default::default()
            },
        );

        let icosahedron = MaterialTable::new(&context);

        let mut renderer = Self { context, frames, light, shadow, icosahedron };
        renderer.sync(state);
        Ok(renderer)
    }

    /// Copies node transforms from the scene state
    pub fn sync(&mut self, state: &SceneState) {
        for (i, frame) in self.frames.iter_mut().enumerate() {
            frame.set_transformation(state.frame_transformation(i));
        }
        self.shadow.set_transformation(state.shadow_transformation());
        self.icosahedron.set_transformation(state.mesh_transformation());
    }

    /// Geometry nodes drawn for `material`, each with the objects it contributes
    fn geometry(&self, material: MaterialKind) -> Vec<(NodeKind, Vec<&dyn Object>)> {
        let mut nodes: Vec<(NodeKind, Vec<&dyn Object>)> = self
            .frames
            .iter()
            .map(|frame| (NodeKind::ReferenceFrame, frame.objects().collect()))
            .collect();
        nodes.push((NodeKind::ShadowPlane, vec![&self.shadow as &dyn Object]));
        nodes.push((NodeKind::Icosahedron, vec![self.icosahedron.get(material)]));
        nodes
    }

    fn lights(&self) -> [&dyn Light; 1] {
        [&self.light]
    }

    /// Every node the next draw call uses, lights included
    pub fn nodes(&self, material: MaterialKind) -> Vec<NodeKind> {
        self.geometry(material)
            .into_iter()
            .map(|(kind, _)| kind)
            .chain(self.lights().iter().map(|_| NodeKind::Light))
            .collect()
    }

    /// Clears the screen and draws every node with the state's active material
    pub fn render(&mut self, state: &SceneState) {
        self.sync(state);

        let objects: Vec<&dyn Object> = self
            .geometry(state.material())
            .into_iter()
            .flat_map(|(_, objects)| objects)
            .collect();

        let size = state.surface();
        let (r, g, b, a) = CLEAR_COLOR;
        RenderTarget::screen(&self.context, size.width, size.height)
            .clear(ClearState::color_and_depth(r, g, b, a, 1.0))
            .render(state.camera(), objects, &self.lights());
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn gl() -> three_d::context::Context {
        let canvas = web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .create_element("canvas")
            .unwrap()
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .unwrap();
        crate::widget::create_gl(&canvas).unwrap()
    }

    fn address(object: &dyn Object) -> *const () {
        object as *const _ as *const ()
    }

    #[wasm_bindgen_test]
    fn material_table_hands_out_its_prebuilt_entries() {
        let context = Context::from_gl_context(Arc::new(gl())).unwrap();
        let table = MaterialTable::new(&context);
        assert_eq!(address(table.get(MaterialKind::Lambert)), address(&table.lambert));
        assert_eq!(address(table.get(MaterialKind::Phong)), address(&table.phong));
        assert_eq!(address(table.get(MaterialKind::Wireframe)), address(&table.wireframe));
        assert_ne!(address(&table.lambert), address(&table.phong));
    }

    #[wasm_bindgen_test]
    fn draw_list_has_two_frames_a_light_a_shadow_and_the_icosahedron() {
        let state = SceneState::new(&ViewConfig::default(), 400).unwrap();
        let renderer = SceneRenderer::new(gl(), &state).unwrap();

        for material in MaterialKind::ALL {
            let nodes = renderer.nodes(material);
            let count = |kind: NodeKind| nodes.iter().filter(|&&k| k == kind).count();
            assert_eq!(count(NodeKind::ReferenceFrame), 2);
            assert_eq!(count(NodeKind::Light), 1);
            assert_eq!(count(NodeKind::ShadowPlane), 1);
            assert_eq!(count(NodeKind::Icosahedron), 1);
            assert_eq!(nodes.len(), 5);

            let geometry = renderer.geometry(material);
            let (_, mesh) = geometry.iter().find(|(k, _)| *k == NodeKind::Icosahedron).unwrap();
            assert_eq!(address(mesh[0]), address(renderer.icosahedron.get(material)));
            // three arrows per frame
            assert!(geometry
                .iter()
                .filter(|(k, _)| *k == NodeKind::ReferenceFrame)
                .all(|(_, objects)| objects.len() == 3));
        }
    }
}

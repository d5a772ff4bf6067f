use std::collections::HashMap;

use three_d::*;


pub const ICOSAHEDRON_RADIUS: f32 = 1.0;
pub const ICOSAHEDRON_DETAIL: u32 = 1;
pub const HUE_RAMP: f32 = 0.125;
pub const SHADOW_PLANE_SIZE: f32 = 3.0;
pub const SHADOW_TEXTURE_SIZE: u32 = 128;
pub const EDGE_RADIUS: f32 = 0.007;


/// An indexed triangle mesh whose vertices lie on a sphere
#[derive(Debug, Clone)]
pub struct Polyhedron {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl Polyhedron {
    /// Regular icosahedron of the given radius, each face split into four `detail` times.
    /// Midpoints are shared between neighbouring faces and pushed out onto the sphere.
    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let t = (1.0 + 5_f32.sqrt()) / 2.0;
        let base = [
            (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
            (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
            (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
        ];
        let vertices = base
            .iter()
            .map(|&(x, y, z)| vec3(x, y, z).normalize() * radius)
            .collect();
        let faces = vec![
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        let mut poly = Self { vertices, faces };
        for _ in 0..detail {
            poly = poly.subdivide(radius);
        }
        poly
    }

    fn subdivide(&self, radius: f32) -> Self {
        let mut vertices = self.vertices.clone();
        let mut cache: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32| -> u32 {
            let key = if a < b { (a, b) } else { (b, a) };
            *cache.entry(key).or_insert_with(|| {
                let m = (vertices[a as usize] + vertices[b as usize]) * 0.5;
                vertices.push(m.normalize() * radius);
                (vertices.len() - 1) as u32
            })
        };

        let mut faces = Vec::with_capacity(self.faces.len() * 4);
        for &[a, b, c] in self.faces.iter() {
            let ab = midpoint(a, b);
            let bc = midpoint(b, c);
            let ca = midpoint(c, a);
            faces.push([a, ab, ca]);
            faces.push([b, bc, ab]);
            faces.push([c, ca, bc]);
            faces.push([ab, bc, ca]);
        }

        Self { vertices, faces }
    }

    /// Unique undirected edges, smaller index first
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .faces
            .iter()
            .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Hue ramp over the vertex index: vertex i gets hue `0.125 * i / n`
    pub fn vertex_colors(&self) -> Vec<Srgba> {
        let n = self.vertices.len() as f32;
        (0..self.vertices.len())
            .map(|i| hsl_to_srgba(HUE_RAMP * i as f32 / n, 1.0, 0.5))
            .collect()
    }

    /// Non-indexed copy with one normal per face, so shading comes out flat.
    /// Each corner keeps the color of the vertex it came from.
    pub fn to_flat_cpu_mesh(&self) -> CpuMesh {
        let colors = self.vertex_colors();
        let mut positions = Vec::with_capacity(self.faces.len() * 3);
        let mut normals = Vec::with_capacity(self.faces.len() * 3);
        let mut corner_colors = Vec::with_capacity(self.faces.len() * 3);

        for &[a, b, c] in self.faces.iter() {
            let (pa, pb, pc) = (self.vertices[a as usize], self.vertices[b as usize], self.vertices[c as usize]);
            let n = (pb - pa).cross(pc - pa).normalize();
            for (p, i) in [(pa, a), (pb, b), (pc, c)] {
                positions.push(p);
                normals.push(n);
                corner_colors.push(colors[i as usize]);
            }
        }

        CpuMesh {
            indices: Indices::U32((0..positions.len() as u32).collect()),
            positions: Positions::F32(positions),
            normals: Some(normals),
            colors: Some(corner_colors),
            ..Default::default()
        }
    }

    /// Instance transforms placing a unit x-axis cylinder along every edge
    pub fn edge_transformations(&self, radius: f32) -> Vec<Mat4> {
        self.edges()
            .into_iter()
            .map(|(a, b)| edge_transform(self.vertices[a as usize], self.vertices[b as usize], radius))
            .collect()
    }
}


fn edge_transform(p1: Vec3, p2: Vec3, radius: f32) -> Mat4 {
    let d = p2 - p1;
    Mat4::from_translation(p1)
        * Mat4::from(Quat::from_arc(vec3(1.0, 0.0, 0.0), d.normalize(), None))
        * Mat4::from_nonuniform_scale(d.magnitude(), radius, radius)
}


/// HSL to sRGB, all inputs in [0, 1]
pub fn hsl_to_srgba(h: f32, s: f32, l: f32) -> Srgba {
    let channel = |t: f32| -> f32 {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Srgba::new(
        to_u8(channel(h + 1.0 / 3.0)),
        to_u8(channel(h)),
        to_u8(channel(h - 1.0 / 3.0)),
        255,
    )
}


/// Square of side `size` in the XY plane, facing +Z, with uvs spanning the texture
pub fn plane_cpu_mesh(size: f32) -> CpuMesh {
    let h = size / 2.0;
    CpuMesh {
        positions: Positions::F32(vec![
            vec3(-h, -h, 0.0),
            vec3(h, -h, 0.0),
            vec3(h, h, 0.0),
            vec3(-h, h, 0.0),
        ]),
        indices: Indices::U32(vec![0, 1, 2, 2, 3, 0]),
        normals: Some(vec![vec3(0.0, 0.0, 1.0); 4]),
        uvs: Some(vec![vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(1.0, 1.0), vec2(0.0, 1.0)]),
        ..Default::default()
    }
}


/// Radial gradient used as a soft contact shadow: grey at the centre fading to white at the rim
pub fn shadow_gradient(size: u32) -> Vec<[u8; 4]> {
    const INNER_STOP: f32 = 0.1;
    const INNER: f32 = 200.0;
    const OUTER: f32 = 255.0;

    let c = size as f32 / 2.0;
    let mut data = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            // sample at the pixel centre
            let dx = x as f32 + 0.5 - c;
            let dy = y as f32 + 0.5 - c;
            let t = (dx * dx + dy * dy).sqrt() / c;
            let k = ((t - INNER_STOP) / (1.0 - INNER_STOP)).clamp(0.0, 1.0);
            let v = (INNER + (OUTER - INNER) * k).round() as u8;
            data.push([v, v, v, 255]);
        }
    }
    data
}

pub fn shadow_cpu_texture() -> CpuTexture {
    CpuTexture {
        name: "shadow".to_string(),
        data: TextureData::RgbaU8(shadow_gradient(SHADOW_TEXTURE_SIZE)),
        width: SHADOW_TEXTURE_SIZE,
        height: SHADOW_TEXTURE_SIZE,
        wrap_s: Wrapping::ClampToEdge,
        wrap_t: Wrapping::ClampToEdge,
        ..Default::default()
    }
}


/// Per-axis transforms and colors for an oriented basis drawn as three arrows
/// built from a unit x-axis arrow mesh: x red, y green, z blue.
pub fn basis_axes(length: f32, thickness: f32) -> [(Mat4, Srgba); 3] {
    let s = Mat4::from_nonuniform_scale(length, thickness, thickness);
    [
        (s, Srgba::RED),
        (Mat4::from_angle_z(degrees(90.0)) * s, Srgba::GREEN),
        (Mat4::from_angle_y(degrees(-90.0)) * s, Srgba::BLUE),
    ]
}

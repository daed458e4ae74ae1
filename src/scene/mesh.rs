use glam::{Vec2, Vec3};

/// Latitude and longitude bands of the marker sphere.
pub const SPHERE_SUBDIVISIONS: u32 = 40;

/// Indexed triangle list with per-vertex normals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals, same length as `positions`.
    pub normals: Vec<Vec3>,
    /// Triangle list indices into `positions`.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Size in bytes of one interleaved vertex (`position`, `normal`, six `f32`).
    pub const VERTEX_STRIDE: u64 = 24;

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaved little-endian `[px, py, pz, nx, ny, nz]` vertex stream.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.positions.len() * Self::VERTEX_STRIDE as usize);
        for (p, n) in self.positions.iter().zip(&self.normals) {
            for v in p.to_array().into_iter().chain(n.to_array()) {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out
    }

    /// Little-endian `u32` index stream.
    pub fn index_bytes(&self) -> Vec<u8> {
        self.indices.iter().flat_map(|i| i.to_le_bytes()).collect()
    }
}

/// Unit cube with a `1 x 1` footprint centered on the origin, `y` in `[0, 1]`, flat face normals.
pub fn cube() -> MeshData {
    // (normal, u axis, v axis); u x v points along the normal so winding is counter-clockwise
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let center = Vec3::new(0.0, 0.5, 0.0);

    let mut mesh = MeshData::default();
    for (normal, u, v) in FACES {
        let base = mesh.positions.len() as u32;
        let face_center = center + normal * 0.5;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            mesh.positions.push(face_center + u * su + v * sv);
            mesh.normals.push(normal);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Unit-radius UV sphere with `subdivisions` latitude and longitude bands.
pub fn uv_sphere(subdivisions: u32) -> MeshData {
    let bands = subdivisions.max(3);
    let mut mesh = MeshData::default();

    for lat in 0..=bands {
        let phi = std::f32::consts::PI * lat as f32 / bands as f32;
        let (sp, cp) = phi.sin_cos();
        for lon in 0..=bands {
            let theta = std::f32::consts::TAU * lon as f32 / bands as f32;
            let (st, ct) = theta.sin_cos();
            let n = Vec3::new(ct * sp, cp, st * sp);
            mesh.positions.push(n);
            mesh.normals.push(n);
        }
    }

    let row = bands + 1;
    for lat in 0..bands {
        for lon in 0..bands {
            let a = lat * row + lon;
            let b = a + row;
            mesh.indices
                .extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    mesh
}

/// World-space `(x, z)` of instance `index` in a `grid_size²` instanced draw.
///
/// This is the contract the cube-grid vertex shader implements:
/// `x = (i mod g) - g/2`, `z = floor(i / g) - g/2`.
pub fn grid_instance_position(index: u32, grid_size: u32) -> Vec2 {
    let g = grid_size.max(1);
    let half = g as f32 / 2.0;
    Vec2::new((index % g) as f32 - half, (index / g) as f32 - half)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mesh.rs"]
mod tests;

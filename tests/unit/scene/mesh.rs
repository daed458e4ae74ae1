use super::*;

#[test]
fn cube_has_six_flat_faces() {
    let c = cube();
    assert_eq!(c.positions.len(), 24);
    assert_eq!(c.normals.len(), 24);
    assert_eq!(c.triangle_count(), 12);
    for p in &c.positions {
        assert!(p.y >= 0.0 && p.y <= 1.0);
        assert!(p.x.abs() <= 0.5 && p.z.abs() <= 0.5);
    }
}

#[test]
fn cube_winding_matches_face_normals() {
    let c = cube();
    for tri in c.indices.chunks_exact(3) {
        let [a, b, d] = [0, 1, 2].map(|k| c.positions[tri[k] as usize]);
        let geometric = (b - a).cross(d - a).normalize();
        let n = c.normals[tri[0] as usize];
        assert!(geometric.dot(n) > 0.99, "triangle {tri:?} faces away from its normal");
    }
}

#[test]
fn sphere_counts_and_unit_radius() {
    let s = uv_sphere(SPHERE_SUBDIVISIONS);
    assert_eq!(s.positions.len(), 41 * 41);
    assert_eq!(s.indices.len(), 40 * 40 * 6);
    assert!(s.indices.iter().all(|&i| (i as usize) < s.positions.len()));
    for p in &s.positions {
        assert!((p.length() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn vertex_stream_is_interleaved() {
    let c = cube();
    let bytes = c.vertex_bytes();
    assert_eq!(bytes.len() as u64, c.positions.len() as u64 * MeshData::VERTEX_STRIDE);
    let nx = f32::from_le_bytes(bytes[12..16].try_into().unwrap());
    assert_eq!(nx, c.normals[0].x);
    assert_eq!(c.index_bytes().len(), c.indices.len() * 4);
}

#[test]
fn grid_placement_is_centered_row_major() {
    assert_eq!(grid_instance_position(0, 4), Vec2::new(-2.0, -2.0));
    assert_eq!(grid_instance_position(5, 4), Vec2::new(-1.0, -1.0));
    assert_eq!(grid_instance_position(15, 4), Vec2::new(1.0, 1.0));
    assert_eq!(grid_instance_position(3, 4), Vec2::new(1.0, -2.0));
}

#[test]
fn grid_placement_covers_every_cell_once() {
    let g = 7;
    let mut seen = std::collections::HashSet::new();
    for i in 0..g * g {
        let p = grid_instance_position(i, g);
        assert!(seen.insert((p.x.to_bits(), p.y.to_bits())));
    }
    assert_eq!(seen.len(), (g * g) as usize);
}

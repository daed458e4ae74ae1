use super::*;

fn set() -> RenderTargetSet {
    RenderTargetSet::new(Resolution::new(64, 48).unwrap())
}

#[test]
fn declares_gbuffer_pool_and_final() {
    let t = set();
    assert_eq!(t.surfaces().len(), 3 + FX_POOL_SIZE + 1);
    assert!(t.surfaces().iter().all(|d| d.width == 64 && d.height == 48));

    let g = t.gbuffer();
    assert_eq!(t.desc(g.color).unwrap().format, PixelFormat::Rgba8);
    assert_eq!(t.desc(g.normal).unwrap().format, PixelFormat::Rgba32Float);
    assert_eq!(t.desc(g.depth).unwrap().format, PixelFormat::Depth24);
    for id in t.fx_pool() {
        assert_eq!(t.desc(id).unwrap().format, PixelFormat::Rgba8);
    }
}

#[test]
fn surface_ids_are_unique_and_dense() {
    let t = set();
    let ids: Vec<_> = t.iter().map(|(id, _)| id.0).collect();
    assert_eq!(ids, (0..t.surfaces().len() as u32).collect::<Vec<_>>());
}

#[test]
fn color0_rebinding_accepts_pool_and_final_only() {
    let mut t = set();
    assert_eq!(t.color0(), None);

    for id in t.fx_pool() {
        t.rebind_color0(id).unwrap();
        assert_eq!(t.color0(), Some(id));
    }
    let fin = t.final_surface();
    t.rebind_color0(fin).unwrap();
    assert_eq!(t.color0(), Some(fin));

    let depth = t.gbuffer().depth;
    assert!(t.rebind_color0(depth).is_err());
    assert_eq!(t.color0(), Some(fin));
}

#[test]
fn out_of_range_lookups_fail() {
    let t = set();
    assert!(t.fx(FX_POOL_SIZE).is_err());
    assert!(t.desc(SurfaceId(99)).is_err());
}

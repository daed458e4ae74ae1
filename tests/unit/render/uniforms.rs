use super::*;
use crate::{
    foundation::core::Resolution,
    render::{plan::FramePlan, plan::Pass, targets::RenderTargetSet},
    scene::params::SceneParams,
};

fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn frame(params: &SceneParams) -> FrameState<'_> {
    FrameState {
        frame_index: 3,
        time: 2.5,
        resolution: Resolution::new(320, 200).unwrap(),
        view: Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
        projection: Mat4::perspective_rh(0.8, 1.6, 0.1, 100.0),
        inverse_projection: Mat4::perspective_rh(0.8, 1.6, 0.1, 100.0).inverse(),
        eye: Vec3::new(1.0, 2.0, 3.0),
        marker: Vec3::new(4.0, 5.0, 6.0),
        params,
    }
}

#[test]
fn light_record_is_32_bytes_with_padded_direction() {
    let light = DirectionalLight {
        direction: Vec3::new(-1.0, -2.0, 0.5),
        color: Vec3::new(0.25, 0.5, 0.75),
        intensity: 3.0,
    };
    let mut w = UniformWriter::new();
    write_light(&mut w, &light);
    let bytes = w.finish();

    assert_eq!(bytes.len(), LIGHT_RECORD_SIZE);
    assert_eq!(f32_at(&bytes, 0), -1.0);
    assert_eq!(f32_at(&bytes, 8), 0.5);
    assert_eq!(f32_at(&bytes, 12), 0.0);
    assert_eq!(f32_at(&bytes, 16), 0.25);
    assert_eq!(f32_at(&bytes, 24), 0.75);
    assert_eq!(f32_at(&bytes, 28), 3.0);
}

#[test]
fn writer_aligns_vectors_and_packs_scalars_after_vec3() {
    let mut w = UniformWriter::new();
    w.f32(1.0).vec3(Vec3::splat(2.0)).f32(3.0).vec2(Vec2::splat(4.0)).f32(5.0);
    assert_eq!(w.len(), 44);
    let bytes = w.finish();
    assert_eq!(bytes.len(), 48);
    assert_eq!(f32_at(&bytes, 16), 2.0);
    assert_eq!(f32_at(&bytes, 28), 3.0);
    assert_eq!(f32_at(&bytes, 32), 4.0);
    assert_eq!(f32_at(&bytes, 4), 0.0);
}

#[test]
fn empty_record_still_occupies_one_row() {
    assert_eq!(UniformWriter::new().finish().len(), 16);
}

#[test]
fn grid_record_layout() {
    let params = SceneParams::default();
    let f = frame(&params);
    let mut w = UniformWriter::new();
    write_grid(&mut w, &f);
    let bytes = w.finish();

    assert_eq!(bytes.len(), 192);
    assert_eq!(f32_at(&bytes, 64 + 56), -5.0);
    assert_eq!(f32_at(&bytes, 128), 1.0);
    assert_eq!(u32::from_le_bytes(bytes[140..144].try_into().unwrap()), 500);
    assert_eq!(f32_at(&bytes, 144), 0.91);
    assert_eq!(f32_at(&bytes, 156), 100.0);
    assert_eq!(f32_at(&bytes, 172), 7.0);
    assert_eq!(f32_at(&bytes, 176), -1.0);
    assert_eq!(f32_at(&bytes, 188), 2.5);
}

#[test]
fn fx_records_start_with_the_viewport() {
    let params = SceneParams::default();
    let f = frame(&params);
    let targets = RenderTargetSet::new(f.resolution);
    let plan = FramePlan::standard(&targets, true).unwrap();

    for pass in &plan.passes {
        let Pass::Fx(fx) = pass else { continue };
        let mut w = UniformWriter::new();
        write_fx(&mut w, fx, &f);
        let bytes = w.finish();
        assert!(bytes.len() >= 16 && bytes.len() % 16 == 0);
        match fx.viewport {
            None => {
                assert_eq!(f32_at(&bytes, 8), 320.0);
                assert_eq!(f32_at(&bytes, 12), 200.0);
            }
            Some(vp) => assert_eq!(f32_at(&bytes, 0), vp.x as f32),
        }
        match fx.stage {
            FxStage::Blur(dir) => {
                assert_eq!([i32_at(&bytes, 16), i32_at(&bytes, 20)], dir.step());
                assert_eq!(i32_at(&bytes, 24), 5);
            }
            FxStage::CircleOfConfusion => {
                assert_eq!(bytes.len(), 96);
                assert_eq!(f32_at(&bytes, 80), 15.0);
                assert_eq!(f32_at(&bytes, 84), 1.0);
                assert_eq!(f32_at(&bytes, 88), 50.0);
            }
            FxStage::Gamma => assert_eq!(f32_at(&bytes, 16), 1.2),
            FxStage::Glitch => assert_eq!(f32_at(&bytes, 16), 2.5),
            _ => {}
        }
    }
}

#[test]
fn scoped_upload_commits_on_drop() {
    let mut buf = vec![0xffu8; 8];
    {
        let mut up = ScopedUpload::new(&mut buf, 256);
        up.writer().f32(1.5);
    }
    assert_eq!(buf.len(), 272);
    assert_eq!(f32_at(&buf, 256), 1.5);
    assert_eq!(buf[0], 0xff);
}

#[test]
fn scoped_upload_commits_on_early_return() {
    fn fill(buf: &mut Vec<u8>, fail: bool) -> Result<(), ()> {
        let mut up = ScopedUpload::new(buf, 0);
        up.writer().f32(9.0);
        if fail {
            return Err(());
        }
        up.writer().f32(10.0);
        Ok(())
    }

    let mut buf = Vec::new();
    assert!(fill(&mut buf, true).is_err());
    assert_eq!(buf.len(), 16);
    assert_eq!(f32_at(&buf, 0), 9.0);
    assert_eq!(f32_at(&buf, 4), 0.0);
}

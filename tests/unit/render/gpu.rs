use super::*;

fn features(allowed_usages: wgpu::TextureUsages) -> wgpu::TextureFormatFeatures {
    wgpu::TextureFormatFeatures {
        allowed_usages,
        flags: wgpu::TextureFormatFeatureFlags::empty(),
    }
}

#[test]
fn compliant_adapter_with_renderable_normals_is_accepted() {
    let usages = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    assert_eq!(
        check_adapter_support(&wgpu::DownlevelCapabilities::default(), features(usages)),
        Ok(())
    );
}

#[test]
fn downlevel_adapter_is_rejected() {
    let gl_like = wgpu::DownlevelCapabilities {
        flags: wgpu::DownlevelFlags::empty(),
        ..wgpu::DownlevelCapabilities::default()
    };
    let err = check_adapter_support(&gl_like, features(wgpu::TextureUsages::all())).unwrap_err();
    assert!(err.contains("not WebGPU compliant"), "{err}");
}

#[test]
fn sample_only_normal_format_is_rejected() {
    // llvmpipe over GL exposes rgba32f for sampling and copies but not as a render target.
    let usages = wgpu::TextureUsages::COPY_SRC
        | wgpu::TextureUsages::COPY_DST
        | wgpu::TextureUsages::TEXTURE_BINDING
        | wgpu::TextureUsages::STORAGE_BINDING;
    let err =
        check_adapter_support(&wgpu::DownlevelCapabilities::default(), features(usages)).unwrap_err();
    assert!(err.contains("not renderable"), "{err}");
}

#[test]
fn readback_rows_are_padded_to_copy_alignment() {
    assert_eq!(align_to(64 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 256);
    assert_eq!(align_to(65 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 512);
}

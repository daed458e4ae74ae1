use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::{
    foundation::{
        core::FrameRgba,
        error::{FlightError, FlightResult},
    },
    render::{
        passes::{FrameState, PassBackend},
        plan::{FxPass, GeometryDraw, GeometryPass, LightingPass, Viewport},
        shaders::{ShaderKind, ShaderLibrary},
        targets::{PixelFormat, SurfaceDesc, SurfaceId},
        uniforms::{
            ScopedUpload, UniformWriter, UploadTarget, write_fx, write_grid, write_light,
            write_marker, write_viewport,
        },
    },
    scene::{
        mesh::{self, MeshData, SPHERE_SUBDIVISIONS},
        params::MAX_DIRECTIONAL_LIGHTS,
    },
};

pub(crate) mod programs;

use programs::{COLOR_FORMAT, DEPTH_FORMAT, NORMAL_FORMAT, ShaderProgram};

/// Size of one uniform record slot; matches the default dynamic offset alignment.
pub const UNIFORM_SLOT_SIZE: u64 = 256;
const UNIFORM_SLOTS: u64 = 32;

struct GpuSurface {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    desc: SurfaceDesc,
}

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> FlightResult<Self> {
        let index_count = u32::try_from(mesh.indices.len())
            .map_err(|_| FlightError::resource(label, "index count overflows u32"))?;
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: &mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: &mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        Ok(Self {
            vertices,
            indices,
            index_count,
        })
    }
}

struct QueueUpload<'a> {
    queue: &'a wgpu::Queue,
    buffer: &'a wgpu::Buffer,
}

impl UploadTarget for QueueUpload<'_> {
    fn commit(&mut self, offset: u64, bytes: &[u8]) {
        let len = bytes.len().min(UNIFORM_SLOT_SIZE as usize);
        if len < bytes.len() {
            tracing::warn!(
                size = bytes.len(),
                "uniform record exceeds its slot, truncated"
            );
        }
        self.queue.write_buffer(self.buffer, offset, &bytes[..len]);
    }
}

struct Readback {
    buffer: wgpu::Buffer,
    bytes_per_row: u32,
    width: u32,
    height: u32,
}

/// Why an adapter cannot run the pipeline, if it cannot.
///
/// The lighting and fx programs read the depth attachment with `textureLoad`, which downlevel
/// backends cannot translate, and the geometry pass renders normals into [`NORMAL_FORMAT`].
fn check_adapter_support(
    downlevel: &wgpu::DownlevelCapabilities,
    normal: wgpu::TextureFormatFeatures,
) -> Result<(), String> {
    if !downlevel.is_webgpu_compliant() {
        return Err("adapter is not WebGPU compliant".to_owned());
    }
    if !normal
        .allowed_usages
        .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
    {
        return Err(format!("{NORMAL_FORMAT:?} is not renderable"));
    }
    Ok(())
}

/// Headless wgpu implementation of [`PassBackend`].
///
/// Surfaces are offscreen textures; the final surface is copied into a mappable buffer for
/// presentation. Uniform records for the frame are written into fixed 256-byte slots of one buffer
/// and selected per draw with a dynamic offset.
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    programs: HashMap<ShaderKind, ShaderProgram>,
    uniform_buffer: wgpu::Buffer,
    uniform_group: wgpu::BindGroup,
    cube: MeshBuffers,
    sphere: MeshBuffers,
    surfaces: HashMap<SurfaceId, GpuSurface>,
    readback: Option<Readback>,
    next_slot: u64,
    frame_index: u64,
}

impl GpuBackend {
    /// Acquire a device and create every program and mesh up front.
    ///
    /// Any failure here is a [`FlightError::ResourceCreation`] and ends the run.
    #[tracing::instrument(skip(library))]
    pub fn new(library: &dyn ShaderLibrary) -> FlightResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                FlightError::resource("adapter", "no gpu adapter available")
            }
            other => FlightError::resource("adapter", format!("{other:?}")),
        })?;
        let info = adapter.get_info();
        check_adapter_support(
            &adapter.get_downlevel_capabilities(),
            adapter.get_texture_format_features(NORMAL_FORMAT),
        )
        .map_err(|reason| {
            FlightError::resource(
                "adapter",
                format!("no gpu adapter available ({} {:?}: {reason})", info.name, info.backend),
            )
        })?;
        tracing::info!(adapter = ?info.name, backend = ?info.backend, "gpu adapter selected");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("gridflight"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| FlightError::resource("device", format!("{e:?}")))?;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniforms"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SLOT_SIZE),
                },
                count: None,
            }],
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: UNIFORM_SLOT_SIZE * UNIFORM_SLOTS,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniforms"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_SLOT_SIZE),
                }),
            }],
        });

        let programs = ShaderKind::ALL
            .into_iter()
            .map(|kind| {
                ShaderProgram::create(&device, library, kind, &uniform_layout).map(|p| (kind, p))
            })
            .collect::<FlightResult<HashMap<_, _>>>()?;

        let cube = MeshBuffers::upload(&device, "cube", &mesh::cube())?;
        let sphere = MeshBuffers::upload(&device, "sphere", &mesh::uv_sphere(SPHERE_SUBDIVISIONS))?;

        tracing::info!(programs = programs.len(), "gpu backend ready");
        Ok(Self {
            device,
            queue,
            programs,
            uniform_buffer,
            uniform_group,
            cube,
            sphere,
            surfaces: HashMap::new(),
            readback: None,
            next_slot: 0,
            frame_index: 0,
        })
    }

    fn program(&self, kind: ShaderKind) -> FlightResult<&ShaderProgram> {
        self.programs
            .get(&kind)
            .ok_or_else(|| FlightError::frame(format!("program {} missing", kind.label())))
    }

    fn surface(&self, id: SurfaceId) -> FlightResult<&GpuSurface> {
        self.surfaces
            .get(&id)
            .ok_or_else(|| FlightError::frame(format!("surface {id:?} was not initialized")))
    }

    /// Reserve the next uniform slot, fill it with `write`, and return its dynamic offset.
    fn upload(&mut self, write: impl FnOnce(&mut UniformWriter)) -> FlightResult<u32> {
        if self.next_slot >= UNIFORM_SLOTS {
            return Err(FlightError::frame(format!(
                "more than {UNIFORM_SLOTS} uniform records in one frame"
            )));
        }
        let offset = self.next_slot * UNIFORM_SLOT_SIZE;
        self.next_slot += 1;

        let mut target = QueueUpload {
            queue: &self.queue,
            buffer: &self.uniform_buffer,
        };
        let mut scope = ScopedUpload::new(&mut target, offset);
        write(scope.writer());
        drop(scope);
        Ok(offset as u32)
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    fn ensure_readback(&mut self, width: u32, height: u32) -> FlightResult<()> {
        if self
            .readback
            .as_ref()
            .is_some_and(|r| r.width == width && r.height == height)
        {
            return Ok(());
        }
        let bytes_per_row_unpadded = width
            .checked_mul(4)
            .ok_or_else(|| FlightError::resource("readback", "render target width overflow"))?;
        let bytes_per_row = align_to(bytes_per_row_unpadded, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let size = (bytes_per_row as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| FlightError::resource("readback", "readback buffer size overflow"))?;
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.readback = Some(Readback {
            buffer,
            bytes_per_row,
            width,
            height,
        });
        Ok(())
    }
}

impl PassBackend for GpuBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> FlightResult<()> {
        if self.surfaces.get(&id).is_some_and(|s| s.desc == *desc) {
            return Ok(());
        }
        let (format, usage) = match desc.format {
            PixelFormat::Rgba8 => (COLOR_FORMAT, color_usage()),
            PixelFormat::Rgba32Float => (NORMAL_FORMAT, color_usage()),
            PixelFormat::Depth24 => (
                DEPTH_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            ),
        };

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(FlightError::resource(desc.label, err.to_string()));
        }

        tracing::debug!(surface = id.0, label = desc.label, "surface allocated");
        self.surfaces.insert(
            id,
            GpuSurface {
                texture,
                view,
                desc: desc.clone(),
            },
        );
        Ok(())
    }

    fn begin_frame(&mut self, frame: &FrameState<'_>) -> FlightResult<()> {
        self.next_slot = 0;
        self.frame_index = frame.frame_index;
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        Ok(())
    }

    fn exec_geometry(&mut self, pass: &GeometryPass, frame: &FrameState<'_>) -> FlightResult<()> {
        let offsets = pass
            .draws
            .iter()
            .map(|draw| {
                self.upload(|w| match draw {
                    GeometryDraw::CubeGrid => write_grid(w, frame),
                    GeometryDraw::Marker => write_marker(w, frame),
                })
            })
            .collect::<FlightResult<Vec<_>>>()?;

        let color = self.surface(pass.gbuffer.color)?;
        let normal = self.surface(pass.gbuffer.normal)?;
        let depth = self.surface(pass.gbuffer.depth)?;
        let grid = self.program(ShaderKind::CubeGrid)?;
        let marker = self.program(ShaderKind::Marker)?;

        let mut encoder = self.encoder("geometry");
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("geometry"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: &color.view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear_color(frame.params.clear_color)),
                            store: wgpu::StoreOp::Store,
                        },
                    }),
                    Some(wgpu::RenderPassColorAttachment {
                        view: &normal.view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    }),
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (draw, offset) in pass.draws.iter().zip(offsets) {
                let (program, mesh, instances) = match draw {
                    GeometryDraw::CubeGrid => {
                        let g = frame.params.grid_size;
                        (grid, &self.cube, g.saturating_mul(g))
                    }
                    GeometryDraw::Marker => (marker, &self.sphere, 1),
                };
                rpass.set_pipeline(program.pipeline());
                rpass.set_bind_group(0, &self.uniform_group, &[offset]);
                rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..instances);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn exec_lighting(&mut self, pass: &LightingPass, frame: &FrameState<'_>) -> FlightResult<()> {
        let lights = &frame.params.lights[..frame.params.lights.len().min(MAX_DIRECTIONAL_LIGHTS)];
        let light_offsets = lights
            .iter()
            .map(|light| self.upload(|w| write_light(w, light)))
            .collect::<FlightResult<Vec<_>>>()?;
        let albedo_offset = if pass.add_albedo {
            Some(self.upload(|w| write_viewport(w, Viewport::full(frame.resolution)))?)
        } else {
            None
        };

        let color = self.surface(pass.gbuffer.color)?;
        let normal = self.surface(pass.gbuffer.normal)?;
        let depth = self.surface(pass.gbuffer.depth)?;
        let target = self.surface(pass.target)?;

        let light_program = self.program(ShaderKind::DirectionalLight)?;
        let light_textures = light_program.bind_textures(
            &self.device,
            &[
                ("color", &color.view),
                ("normal", &normal.view),
                ("depth", &depth.view),
            ],
        )?;
        let albedo = match albedo_offset {
            Some(offset) => {
                let program = self.program(ShaderKind::AlbedoAdd)?;
                let textures = program.bind_textures(&self.device, &[("texture", &color.view)])?;
                Some((program, textures, offset))
            }
            None => None,
        };

        let mut encoder = self.encoder("lighting");
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lighting"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(frame.params.clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(light_program.pipeline());
            if let Some(textures) = &light_textures {
                rpass.set_bind_group(1, textures, &[]);
            }
            for offset in light_offsets {
                rpass.set_bind_group(0, &self.uniform_group, &[offset]);
                rpass.draw(0..3, 0..1);
            }

            if let Some((program, textures, offset)) = &albedo {
                rpass.set_pipeline(program.pipeline());
                rpass.set_bind_group(0, &self.uniform_group, &[*offset]);
                if let Some(textures) = textures {
                    rpass.set_bind_group(1, textures, &[]);
                }
                rpass.draw(0..3, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn exec_fx(&mut self, pass: &FxPass, frame: &FrameState<'_>) -> FlightResult<()> {
        let offset = self.upload(|w| write_fx(w, pass, frame))?;

        let program = self.program(ShaderKind::for_stage(pass.stage))?;
        let inputs = pass
            .inputs
            .iter()
            .map(|input| Ok((input.name, &self.surface(input.surface)?.view)))
            .collect::<FlightResult<Vec<_>>>()?;
        let textures = program.bind_textures(&self.device, &inputs)?;
        let output = self.surface(pass.output)?;

        let load = if pass.clear {
            wgpu::LoadOp::Clear(clear_color(frame.params.clear_color))
        } else {
            wgpu::LoadOp::Load
        };

        let mut encoder = self.encoder(pass.stage.label());
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(pass.stage.label()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(vp) = pass.viewport {
                rpass.set_viewport(
                    vp.x as f32,
                    vp.y as f32,
                    vp.width as f32,
                    vp.height as f32,
                    0.0,
                    1.0,
                );
            }
            rpass.set_pipeline(program.pipeline());
            rpass.set_bind_group(0, &self.uniform_group, &[offset]);
            if let Some(textures) = &textures {
                rpass.set_bind_group(1, textures, &[]);
            }
            rpass.draw(0..3, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn readback_rgba8(
        &mut self,
        surface: SurfaceId,
        desc: &SurfaceDesc,
    ) -> FlightResult<FrameRgba> {
        if desc.format != PixelFormat::Rgba8 {
            return Err(FlightError::frame(format!(
                "readback of {} requires an rgba8 surface",
                desc.label
            )));
        }
        self.ensure_readback(desc.width, desc.height)?;
        let readback = self
            .readback
            .as_ref()
            .ok_or_else(|| FlightError::frame("readback buffer missing"))?;
        let source = self.surface(surface)?;

        let mut encoder = self.encoder("readback");
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &source.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(readback.bytes_per_row),
                    rows_per_image: Some(desc.height),
                },
            },
            wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = readback.buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| FlightError::frame(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| FlightError::frame("readback channel closed"))?
            .map_err(|e| FlightError::frame(format!("readback map failed: {e:?}")))?;

        let mapped = buffer_slice.get_mapped_range();
        let row_bytes = desc.width as usize * 4;
        let padded_row_bytes = readback.bytes_per_row as usize;
        let mut out = Vec::with_capacity(row_bytes * desc.height as usize);
        for row in 0..desc.height as usize {
            let start = row * padded_row_bytes;
            out.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        readback.buffer.unmap();

        Ok(FrameRgba {
            width: desc.width,
            height: desc.height,
            data: out,
        })
    }

    fn end_frame(&mut self) -> FlightResult<()> {
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(FlightError::frame(format!(
                "frame {}: {err}",
                self.frame_index
            ))),
            None => Ok(()),
        }
    }
}

fn color_usage() -> wgpu::TextureUsages {
    wgpu::TextureUsages::RENDER_ATTACHMENT
        | wgpu::TextureUsages::TEXTURE_BINDING
        | wgpu::TextureUsages::COPY_SRC
}

fn clear_color([r, g, b, a]: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
#[path = "../../../tests/unit/render/gpu.rs"]
mod tests;

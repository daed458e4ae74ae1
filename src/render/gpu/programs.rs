use std::collections::HashMap;

use crate::{
    foundation::error::{FlightError, FlightResult},
    render::shaders::{Blending, ShaderKind, ShaderLibrary, TextureSample, resolve_texture_slots},
    scene::mesh::MeshData,
};

pub(crate) const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub(crate) const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

/// A compiled pipeline plus its texture-name to binding-slot map, resolved once at creation.
pub struct ShaderProgram {
    kind: ShaderKind,
    pipeline: wgpu::RenderPipeline,
    textures: Option<wgpu::BindGroupLayout>,
    slots: HashMap<&'static str, u32>,
}

impl ShaderProgram {
    /// Compile `kind` from `library`.
    ///
    /// Validation and internal (backend translation) errors raised by the device while creating
    /// the module or pipeline are captured and returned as [`FlightError::ResourceCreation`] naming the program.
    pub fn create(
        device: &wgpu::Device,
        library: &dyn ShaderLibrary,
        kind: ShaderKind,
        uniforms: &wgpu::BindGroupLayout,
    ) -> FlightResult<Self> {
        let source = library.source(kind)?;
        let slots = resolve_texture_slots(kind, &source)?;

        device.push_error_scope(wgpu::ErrorFilter::Internal);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(kind.label()),
            source: wgpu::ShaderSource::Wgsl(source),
        });

        let textures = (!kind.textures().is_empty()).then(|| {
            let entries: Vec<_> = kind
                .textures()
                .iter()
                .map(|&(name, sample)| wgpu::BindGroupLayoutEntry {
                    binding: slots[name],
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: match sample {
                            TextureSample::Color => {
                                wgpu::TextureSampleType::Float { filterable: false }
                            }
                            TextureSample::Depth => wgpu::TextureSampleType::Depth,
                        },
                    },
                    count: None,
                })
                .collect();
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(kind.label()),
                entries: &entries,
            })
        });

        let mut layouts = vec![uniforms];
        if let Some(t) = &textures {
            layouts.push(t);
        }
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(kind.label()),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let blend = match kind.blending() {
            Blending::Replace => None,
            Blending::Additive => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
        };
        let target = |format| {
            Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })
        };

        let gbuffer = kind.writes_gbuffer();
        let targets = if gbuffer {
            vec![target(COLOR_FORMAT), target(NORMAL_FORMAT)]
        } else {
            vec![target(COLOR_FORMAT)]
        };
        let mesh_layout = [wgpu::VertexBufferLayout {
            array_stride: MeshData::VERTEX_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        }];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(kind.label()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(kind.vertex_entry()),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: if gbuffer { &mesh_layout[..] } else { &[] },
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &targets,
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: gbuffer.then(|| wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Scopes pop innermost first; both must be popped before returning.
        let validation = pollster::block_on(device.pop_error_scope());
        let internal = pollster::block_on(device.pop_error_scope());
        if let Some(err) = validation.or(internal) {
            return Err(FlightError::resource(kind.label(), err.to_string()));
        }
        tracing::debug!(program = kind.label(), ?slots, "shader program created");

        Ok(Self {
            kind,
            pipeline,
            textures,
            slots,
        })
    }

    /// Render pipeline.
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Binding slot of texture input `name`.
    pub fn slot(&self, name: &str) -> FlightResult<u32> {
        self.slots.get(name).copied().ok_or_else(|| {
            FlightError::frame(format!(
                "program {} has no texture input '{name}'",
                self.kind.label()
            ))
        })
    }

    /// Bind group for the named texture inputs, or `None` for programs without textures.
    pub fn bind_textures(
        &self,
        device: &wgpu::Device,
        inputs: &[(&str, &wgpu::TextureView)],
    ) -> FlightResult<Option<wgpu::BindGroup>> {
        let Some(layout) = &self.textures else {
            return Ok(None);
        };
        if inputs.len() != self.slots.len() {
            return Err(FlightError::frame(format!(
                "program {} expects {} texture inputs, got {}",
                self.kind.label(),
                self.slots.len(),
                inputs.len()
            )));
        }
        let entries = inputs
            .iter()
            .map(|&(name, view)| {
                Ok(wgpu::BindGroupEntry {
                    binding: self.slot(name)?,
                    resource: wgpu::BindingResource::TextureView(view),
                })
            })
            .collect::<FlightResult<Vec<_>>>()?;
        Ok(Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.kind.label()),
            layout,
            entries: &entries,
        })))
    }
}

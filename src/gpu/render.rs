use wgpu::{BindGroup, Device, TextureFormat, TextureView};

use super::buffers::MatrixBuffers;
use super::context::Viewport;

/// Fragment-visible buffer binding
fn fragment_buffer(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// LED dot shader bound to one set of matrix buffers. The buffers are written
/// in place every frame, so the bind group is built once.
pub struct MatrixPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: BindGroup,
}

impl MatrixPipeline {
    pub fn new(device: &Device, format: TextureFormat, buffers: &MatrixBuffers) -> Self {
        let shader = device.create_shader_module(wgpu::include_wgsl!("../shaders/matrix.wgsl"));

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("matrix-bindings"),
            entries: &[
                fragment_buffer(0, wgpu::BufferBindingType::Storage { read_only: true }),
                fragment_buffer(1, wgpu::BufferBindingType::Uniform),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("matrix-bindings"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.intensity_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.params_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("matrix-pipeline-layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        // No vertex buffers: vs_main emits one oversized triangle
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("matrix-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(format.into())],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group,
        }
    }

    /// Clear to black, then draw the matrix into the square `viewport`
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, target: &TextureView, viewport: Viewport) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("matrix-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });

        pass.set_viewport(viewport.x, viewport.y, viewport.side, viewport.side, 0.0, 1.0);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

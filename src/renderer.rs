// src/renderer.rs

use bytemuck::{Pod, Zeroable};

use poly_outline::geometry::VertexStreams;

use crate::shader::WGSL_SHADER_SOURCE;

/// Uniform block shared by both shader stages. Field order keeps the struct
/// 16-byte aligned without explicit padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Globals {
    pub outline_color: [f32; 4],
    pub winres: [f32; 2],
    pub outline_size: f32,
    pub transition_smoothness: f32,
}

// One GPU buffer per attribute stream, bound to fixed slots. Keeping the
// streams separate lets the per-frame rotation update re-upload 4 bytes per
// vertex instead of a full interleaved vertex.
const COORD_SLOT: u32 = 0;
const ROTATION_SLOT: u32 = 1;
const SIZE_SLOT: u32 = 2;
const OFFSET_SLOT: u32 = 3;
const OUTLINE_DIRECTION_SLOT: u32 = 4;
const ATTR_SLOT: u32 = 5;
const COLOR_SLOT: u32 = 6;

const COORD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const ROTATION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32];
const SIZE_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32];
const OFFSET_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x2];
const OUTLINE_DIRECTION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![4 => Float32];
const ATTR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![5 => Uint32];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![6 => Unorm8x4];

fn stream_layout(
    stride: u64,
    attributes: &'static [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: stride,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

pub struct Renderer {
    render_pipeline: wgpu::RenderPipeline,

    coord_buffer: wgpu::Buffer,
    rotation_buffer: wgpu::Buffer,
    size_buffer: wgpu::Buffer,
    offset_buffer: wgpu::Buffer,
    outline_direction_buffer: wgpu::Buffer,
    attr_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    index_count: u32,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        streams: &VertexStreams,
    ) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Polygon Shader"),
            source: wgpu::ShaderSource::Wgsl(WGSL_SHADER_SOURCE.into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Polygon Pipeline Layout"),
                bind_group_layouts: &[&globals_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Polygon Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[
                    stream_layout(8, &COORD_ATTRS),
                    stream_layout(4, &ROTATION_ATTRS),
                    stream_layout(4, &SIZE_ATTRS),
                    stream_layout(8, &OFFSET_ATTRS),
                    stream_layout(4, &OUTLINE_DIRECTION_ATTRS),
                    stream_layout(4, &ATTR_ATTRS),
                    stream_layout(4, &COLOR_ATTRS),
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertex_count = streams.len() as u64;
        let make_vertex_buffer = |label: &str, bytes_per_record: u64| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (vertex_count * bytes_per_record).max(4),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        let coord_buffer = make_vertex_buffer("Coord Buffer", 8);
        let rotation_buffer = make_vertex_buffer("Rotation Buffer", 4);
        let size_buffer = make_vertex_buffer("Size Buffer", 4);
        let offset_buffer = make_vertex_buffer("Offset Buffer", 8);
        let outline_direction_buffer = make_vertex_buffer("Outline Direction Buffer", 4);
        let attr_buffer = make_vertex_buffer("Attr Buffer", 4);
        let color_buffer = make_vertex_buffer("Color Buffer", 4);

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Index Buffer"),
            size: ((streams.index_count() * std::mem::size_of::<u32>()) as u64).max(4),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        Self {
            render_pipeline,
            coord_buffer,
            rotation_buffer,
            size_buffer,
            offset_buffer,
            outline_direction_buffer,
            attr_buffer,
            color_buffer,
            index_buffer,
            globals_buffer,
            globals_bind_group,
            index_count: streams.index_count() as u32,
        }
    }

    /// Full upload of every stream; called once after the scene is built.
    pub fn upload_all(&self, queue: &wgpu::Queue, streams: &VertexStreams) {
        if streams.is_empty() {
            return;
        }
        queue.write_buffer(&self.coord_buffer, 0, bytemuck::cast_slice(&streams.coords));
        queue.write_buffer(
            &self.rotation_buffer,
            0,
            bytemuck::cast_slice(&streams.rotations),
        );
        queue.write_buffer(&self.size_buffer, 0, bytemuck::cast_slice(&streams.sizes));
        queue.write_buffer(
            &self.offset_buffer,
            0,
            bytemuck::cast_slice(&streams.offsets),
        );
        queue.write_buffer(
            &self.outline_direction_buffer,
            0,
            bytemuck::cast_slice(&streams.outline_directions),
        );
        // The attribute byte widens to u32 at the upload boundary; there is
        // no single-byte vertex format.
        let attrs: Vec<u32> = streams.attrs.iter().map(|&a| u32::from(a)).collect();
        queue.write_buffer(&self.attr_buffer, 0, bytemuck::cast_slice(&attrs));
        queue.write_buffer(&self.color_buffer, 0, bytemuck::cast_slice(&streams.colors));
        queue.write_buffer(
            &self.index_buffer,
            0,
            bytemuck::cast_slice(&streams.indices),
        );
    }

    /// Per-tick upload of the one stream the animation mutates.
    pub fn upload_rotations(&self, queue: &wgpu::Queue, streams: &VertexStreams) {
        if streams.is_empty() {
            return;
        }
        queue.write_buffer(
            &self.rotation_buffer,
            0,
            bytemuck::cast_slice(&streams.rotations),
        );
    }

    pub fn update_globals(&self, queue: &wgpu::Queue, globals: Globals) {
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[globals]));
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        output_view: &wgpu::TextureView,
        clear_color: wgpu::Color,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Polygon Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        if self.index_count == 0 {
            return;
        }

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
        render_pass.set_vertex_buffer(COORD_SLOT, self.coord_buffer.slice(..));
        render_pass.set_vertex_buffer(ROTATION_SLOT, self.rotation_buffer.slice(..));
        render_pass.set_vertex_buffer(SIZE_SLOT, self.size_buffer.slice(..));
        render_pass.set_vertex_buffer(OFFSET_SLOT, self.offset_buffer.slice(..));
        render_pass.set_vertex_buffer(
            OUTLINE_DIRECTION_SLOT,
            self.outline_direction_buffer.slice(..),
        );
        render_pass.set_vertex_buffer(ATTR_SLOT, self.attr_buffer.slice(..));
        render_pass.set_vertex_buffer(COLOR_SLOT, self.color_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

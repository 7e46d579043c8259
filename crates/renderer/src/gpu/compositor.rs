use std::borrow::Cow;

use wgpu::util::DeviceExt;

use crate::surface::{DrawingTarget, TARGET_FORMAT};
use crate::types::{BlitPolicy, SurfaceKind, TargetSize};

use super::context::GpuContext;
use super::projection::{quad_vertices, Projection, QuadVertex, QUAD_INDICES};

/// Colour the swapchain frame is cleared to before the quad is drawn.
pub(crate) const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.1,
    b: 0.2,
    a: 1.0,
};

const BLIT_SHADER: &str = r#"
struct Projection {
    matrix: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> projection: Projection;
@group(0) @binding(1) var source_texture: texture_2d<f32>;
@group(0) @binding(2) var source_sampler: sampler;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs(@location(0) position: vec2<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.position = projection.matrix * vec4<f32>(position, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(source_texture, source_sampler, in.uv);
}
"#;

/// Texture sampled for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Binding {
    /// The texture-backed target's own texture.
    Target,
    /// The compositor's default texture.
    Default,
}

/// Per-tick transfer into the default texture before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MirrorStep {
    UploadPixels,
    CopyTexture,
}

pub(crate) fn binding_for(kind: SurfaceKind) -> Binding {
    match kind {
        SurfaceKind::GlTexture => Binding::Target,
        SurfaceKind::Image | SurfaceKind::Gl => Binding::Default,
    }
}

pub(crate) fn mirror_step(kind: SurfaceKind, policy: BlitPolicy) -> Option<MirrorStep> {
    match (policy, kind) {
        (BlitPolicy::Default, _) | (_, SurfaceKind::GlTexture) => None,
        (BlitPolicy::Mirror, SurfaceKind::Image) => Some(MirrorStep::UploadPixels),
        (BlitPolicy::Mirror, SurfaceKind::Gl) => Some(MirrorStep::CopyTexture),
    }
}

/// Draws the drawing target into the swapchain frame as one textured quad.
pub(crate) struct Compositor {
    pipeline: wgpu::RenderPipeline,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    _projection: wgpu::Buffer,
    default_texture: wgpu::Texture,
    default_group: wgpu::BindGroup,
    target_group: Option<wgpu::BindGroup>,
    size: TargetSize,
    policy: BlitPolicy,
}

impl Compositor {
    pub(crate) fn new(
        gpu: &GpuContext,
        target: &DrawingTarget,
        size: TargetSize,
        policy: BlitPolicy,
    ) -> Self {
        let device = &gpu.shared.device;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let projection = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blit projection"),
            contents: bytemuck::bytes_of(&Projection::ortho(size.width, size.height)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blit quad"),
            contents: bytemuck::cast_slice(&quad_vertices(size.width, size.height)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blit indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Allocated once and only ever written by the mirror policy.
        let default_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("blit default texture"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let default_view = default_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let make_group = |label: &'static str, view: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: projection.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };
        let default_group = make_group("blit default group", &default_view);
        let target_group = target
            .texture_handle()
            .map(|handle| make_group("blit target group", handle.view()));

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(BLIT_SHADER)),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs"),
                buffers: &[QuadVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        tracing::debug!(
            surface = %target.kind(),
            binding = ?binding_for(target.kind()),
            ?policy,
            "compositor ready"
        );

        Self {
            pipeline,
            vertices,
            indices,
            _projection: projection,
            default_texture,
            default_group,
            target_group,
            size,
            policy,
        }
    }

    /// Records the mirror transfer (if any) and the blit into `frame`.
    pub(crate) fn composite(
        &self,
        gpu: &GpuContext,
        target: &DrawingTarget,
        frame: &wgpu::TextureView,
    ) -> wgpu::CommandBuffer {
        let mut encoder = gpu
            .shared
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("blit encoder"),
            });

        match (mirror_step(target.kind(), self.policy), target) {
            (Some(MirrorStep::UploadPixels), DrawingTarget::Image(image)) => {
                self.upload(&gpu.shared.queue, image.pixels());
            }
            (Some(MirrorStep::CopyTexture), DrawingTarget::Device(device_target)) => {
                encoder.copy_texture_to_texture(
                    device_target.backing().texture().as_image_copy(),
                    self.default_texture.as_image_copy(),
                    extent(self.size),
                );
            }
            _ => {}
        }

        let group = match (binding_for(target.kind()), &self.target_group) {
            (Binding::Target, Some(group)) => group,
            _ => &self.default_group,
        };

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, group, &[]);
            pass.set_vertex_buffer(0, self.vertices.slice(..));
            pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }

        encoder.finish()
    }

    fn upload(&self, queue: &wgpu::Queue, pixels: &[u8]) {
        queue.write_texture(
            self.default_texture.as_image_copy(),
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.size.width * 4),
                rows_per_image: Some(self.size.height),
            },
            extent(self.size),
        );
    }
}

fn extent(size: TargetSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_texture_target_samples_its_own_texture() {
        assert_eq!(binding_for(SurfaceKind::GlTexture), Binding::Target);
        assert_eq!(binding_for(SurfaceKind::Gl), Binding::Default);
        assert_eq!(binding_for(SurfaceKind::Image), Binding::Default);
    }

    #[test]
    fn default_policy_never_mirrors() {
        for kind in SurfaceKind::ALL {
            assert_eq!(mirror_step(kind, BlitPolicy::Default), None);
        }
    }

    #[test]
    fn mirror_policy_picks_transfer_per_variant() {
        assert_eq!(
            mirror_step(SurfaceKind::Image, BlitPolicy::Mirror),
            Some(MirrorStep::UploadPixels)
        );
        assert_eq!(
            mirror_step(SurfaceKind::Gl, BlitPolicy::Mirror),
            Some(MirrorStep::CopyTexture)
        );
        assert_eq!(mirror_step(SurfaceKind::GlTexture, BlitPolicy::Mirror), None);
    }
}

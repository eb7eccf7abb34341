use crate::helpers::{self, LineVertex};
use crate::shaders;
use crate::shadow::ShadowMap;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use grove_assets::{AssetLibrary, GradientRamp, ToonMaterial};
use grove_common::{MaterialHandle, MeshHandle};
use grove_scene::{Camera, Helper, NodeKind, Scene};
use std::collections::BTreeMap;
use std::ops::Range;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    sun_direction: [f32; 4],
    sun_color: [f32; 4],
    ambient_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    // x: receives shadows, y: outline width, z/w unused
    params: [f32; 4],
}

/// Mesh geometry uploaded at startup.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    toon_pipeline: wgpu::RenderPipeline,
    outline_pipeline: wgpu::RenderPipeline,
    helper_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    toon_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshHandle, GpuMesh>,
    materials: BTreeMap<MaterialHandle, ToonMaterial>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    helper_buffer: wgpu::Buffer,
    max_helper_vertices: u32,
    shadow_map: ShadowMap,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: &wgpu::SurfaceConfiguration,
        assets: &AssetLibrary,
        ramp: &GradientRamp,
        shadow_map_size: u32,
    ) -> Self {
        let surface_format = config.format;

        // Uniform buffer
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                light_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                sun_direction: [0.0, -1.0, 0.0, 0.0],
                sun_color: [1.0, 1.0, 1.0, 1.0],
                ambient_color: [1.0, 1.0, 1.0, 1.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("global_bind_group_layout"),
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

        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global_bind_group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Gradient ramp texture, one row of luminance steps. Nearest
        // filtering keeps the lighting bands hard-edged.
        let ramp_width = ramp.len().max(1) as u32;
        let ramp_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ramp_texture"),
            size: wgpu::Extent3d {
                width: ramp_width,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        if !ramp.is_empty() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &ramp_texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                ramp.steps(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(ramp_width),
                    rows_per_image: None,
                },
                wgpu::Extent3d {
                    width: ramp_width,
                    height: 1,
                    depth_or_array_layers: 1,
                },
            );
        }
        let ramp_view = ramp_texture.create_view(&Default::default());
        let ramp_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ramp_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shadow_map = ShadowMap::new(device, shadow_map_size);

        let toon_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("toon_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let toon_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("toon_bind_group"),
            layout: &toon_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&ramp_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&ramp_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
        });

        let global_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("global_pipeline_layout"),
                bind_group_layouts: &[&global_layout],
                push_constant_ranges: &[],
            });
        let toon_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("toon_pipeline_layout"),
                bind_group_layouts: &[&global_layout, &toon_layout],
                push_constant_ranges: &[],
            });

        let vertex_attrs = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
        ];
        let instance_attrs = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
        ];
        let mesh_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &vertex_attrs,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &instance_attrs,
            },
        ];
        let line_attrs = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x4,
        ];
        let line_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &line_attrs,
        }];

        // Toon pipeline
        let toon_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("toon_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::TOON_SHADER.into()),
        });

        let toon_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("toon_pipeline"),
            layout: Some(&toon_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &toon_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &mesh_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &toon_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Outline pipeline: same geometry, front faces culled so only the
        // displaced back-facing hull shows around each mesh.
        let outline_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("outline_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::OUTLINE_SHADER.into()),
        });

        let outline_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("outline_pipeline"),
            layout: Some(&global_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &outline_shader,
                entry_point: Some("vs_outline"),
                compilation_options: Default::default(),
                buffers: &mesh_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &outline_shader,
                entry_point: Some("fs_outline"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Front),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Helper line pipeline
        let helper_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("helper_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::HELPER_SHADER.into()),
        });

        let helper_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("helper_pipeline"),
            layout: Some(&global_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &helper_shader,
                entry_point: Some("vs_helper"),
                compilation_options: Default::default(),
                buffers: &line_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &helper_shader,
                entry_point: Some("fs_helper"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Shadow pipeline: depth-only into the shadow map. Both faces are
        // rasterized, and the bias keeps casters from shadowing themselves.
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&global_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &mesh_buffers,
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Upload meshes
        let mut meshes = BTreeMap::new();
        for (handle, asset) in assets.meshes() {
            let vertices: Vec<Vertex> = asset
                .data
                .positions
                .iter()
                .zip(&asset.data.normals)
                .map(|(p, n)| Vertex {
                    position: p.to_array(),
                    normal: n.to_array(),
                })
                .collect();
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}_vertex_buffer", asset.name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}_index_buffer", asset.name)),
                contents: bytemuck::cast_slice(&asset.data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            tracing::debug!(
                mesh = %asset.name,
                vertices = vertices.len(),
                indices = asset.data.indices.len(),
                "uploaded mesh"
            );
            meshes.insert(
                handle,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: asset.data.indices.len() as u32,
                },
            );
        }

        let materials = assets
            .materials()
            .map(|(handle, material)| (handle, material.clone()))
            .collect();

        // Instance and helper buffers (pre-allocated)
        let max_instances = 1024u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let max_helper_vertices = 1024u32;
        let helper_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("helper_vertex_buffer"),
            size: (max_helper_vertices as u64) * std::mem::size_of::<LineVertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, config.width, config.height);

        Self {
            toon_pipeline,
            outline_pipeline,
            helper_pipeline,
            shadow_pipeline,
            uniform_buffer,
            global_bind_group,
            toon_bind_group,
            meshes,
            materials,
            instance_buffer,
            max_instances,
            helper_buffer,
            max_helper_vertices,
            shadow_map,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame: shadow pass over the casters, then the color pass
    /// with helpers, toon meshes, and outlines.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &Camera,
    ) {
        let sun = &scene.sun;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                light_view_proj: sun.view_projection().to_cols_array_2d(),
                sun_direction: sun.direction().extend(0.0).to_array(),
                sun_color: [sun.color.r, sun.color.g, sun.color.b, sun.intensity],
                ambient_color: [
                    scene.ambient.color.r,
                    scene.ambient.color.g,
                    scene.ambient.color.b,
                    scene.ambient.intensity,
                ],
            }),
        );

        let frame = build_frame_draws(
            scene,
            &self.materials,
            self.max_instances,
            self.max_helper_vertices,
        );

        if !frame.instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&frame.instances));
        }
        if !frame.helper_verts.is_empty() {
            queue.write_buffer(&self.helper_buffer, 0, bytemuck::cast_slice(&frame.helper_verts));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        if frame.shadow_pass {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.global_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (mesh, range) in &frame.shadow_draws {
                let Some(gpu_mesh) = self.meshes.get(mesh) else {
                    continue;
                };
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu_mesh.index_count, 0, range.clone());
            }
        }

        {
            let bg = scene.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // Helper lines
            if !frame.helper_verts.is_empty() {
                pass.set_pipeline(&self.helper_pipeline);
                pass.set_bind_group(0, &self.global_bind_group, &[]);
                pass.set_vertex_buffer(0, self.helper_buffer.slice(..));
                pass.draw(0..frame.helper_verts.len() as u32, 0..1);
            }

            if !frame.draws.is_empty() {
                // Toon-shaded meshes
                pass.set_pipeline(&self.toon_pipeline);
                pass.set_bind_group(0, &self.global_bind_group, &[]);
                pass.set_bind_group(1, &self.toon_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for (mesh, range) in &frame.draws {
                    let Some(gpu_mesh) = self.meshes.get(mesh) else {
                        continue;
                    };
                    pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(
                        gpu_mesh.index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..gpu_mesh.index_count, 0, range.clone());
                }

                // Outlines over the same batches
                pass.set_pipeline(&self.outline_pipeline);
                pass.set_bind_group(0, &self.global_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for (mesh, range) in &frame.draws {
                    let Some(gpu_mesh) = self.meshes.get(mesh) else {
                        continue;
                    };
                    pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(
                        gpu_mesh.index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..gpu_mesh.index_count, 0, range.clone());
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// CPU side of one frame: the graph flattened into instance batches, draw
/// ranges into the shared instance buffer, and helper line vertices.
struct FrameDraws {
    instances: Vec<InstanceData>,
    draws: Vec<(MeshHandle, Range<u32>)>,
    shadow_draws: Vec<(MeshHandle, Range<u32>)>,
    helper_verts: Vec<LineVertex>,
    shadow_pass: bool,
}

fn build_frame_draws(
    scene: &Scene,
    materials: &BTreeMap<MaterialHandle, ToonMaterial>,
    max_instances: u32,
    max_helper_vertices: u32,
) -> FrameDraws {
    let sun = &scene.sun;
    let shadows_on = sun.shadow.enabled;
    let mut lit: BTreeMap<MeshHandle, Vec<InstanceData>> = BTreeMap::new();
    let mut casting: BTreeMap<MeshHandle, Vec<InstanceData>> = BTreeMap::new();
    let mut helper_verts: Vec<LineVertex> = Vec::new();

    for (id, node) in scene.graph.iter() {
        let Some(world) = scene.graph.world_transform(id) else {
            continue;
        };
        match &node.kind {
            NodeKind::Group => {}
            NodeKind::Mesh(mesh) => {
                let Some(material) = materials.get(&mesh.material) else {
                    continue;
                };
                let cols = world.to_cols_array_2d();
                let receives = mesh.receive_shadow && shadows_on;
                let data = InstanceData {
                    model_0: cols[0],
                    model_1: cols[1],
                    model_2: cols[2],
                    model_3: cols[3],
                    color: material.color.to_array(),
                    params: [
                        if receives { 1.0 } else { 0.0 },
                        material.outline_width,
                        0.0,
                        0.0,
                    ],
                };
                lit.entry(mesh.mesh).or_default().push(data);
                if mesh.cast_shadow {
                    casting.entry(mesh.mesh).or_default().push(data);
                }
            }
            NodeKind::Helper(helper) => match helper {
                Helper::Axes { size } => {
                    for v in helpers::axes_lines(*size) {
                        let p = world.transform_point3(Vec3::from(v.position));
                        helper_verts.push(LineVertex {
                            position: p.to_array(),
                            color: v.color,
                        });
                    }
                }
                Helper::ShadowFrustum => {
                    helper_verts
                        .extend(helpers::frustum_lines(&sun.frustum_corners(), sun.position));
                }
            },
        }
    }

    // Lit batches first, caster batches appended after, all in one buffer.
    let mut instances: Vec<InstanceData> = Vec::new();
    let mut draws: Vec<(MeshHandle, Range<u32>)> = Vec::new();
    for (mesh, batch) in &lit {
        let start = instances.len() as u32;
        instances.extend_from_slice(batch);
        draws.push((*mesh, start..instances.len() as u32));
    }
    let mut shadow_draws: Vec<(MeshHandle, Range<u32>)> = Vec::new();
    for (mesh, batch) in &casting {
        let start = instances.len() as u32;
        instances.extend_from_slice(batch);
        shadow_draws.push((*mesh, start..instances.len() as u32));
    }
    if instances.len() > max_instances as usize {
        tracing::warn!(
            count = instances.len(),
            max = max_instances,
            "instance capacity exceeded, dropping draws"
        );
        instances.truncate(max_instances as usize);
        draws.retain(|(_, range)| range.end <= max_instances);
        shadow_draws.retain(|(_, range)| range.end <= max_instances);
    }
    helper_verts.truncate(max_helper_vertices as usize);

    FrameDraws {
        instances,
        draws,
        shadow_draws,
        helper_verts,
        // The depth pass encodes whenever shadows are on, casters or not:
        // its clear is what resets the map to far depth. Skipping it would
        // leave the zero-initialized map shadowing every receiver.
        shadow_pass: shadows_on,
    }
}

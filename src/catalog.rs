//! Compiled pipelines and parameter blocks for every effect stage.

use std::borrow::Cow;
use std::collections::HashMap;

use encase::{internal::WriteInto, ShaderType};
use wgpu::{
    AddressMode, BindGroup, BindGroupLayout, BlendState, Buffer, ColorTargetState, ColorWrites,
    CommandEncoder, Device, FilterMode, FragmentState, LoadOp, Operations, PrimitiveState,
    PrimitiveTopology, Queue, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline,
    Sampler, ShaderModule, TextureView, VertexState,
};

use crate::color_buffer::COLOR_FORMAT;
use crate::effect::EffectStage;
use crate::params::{
    BloomParams, BlurParams, EffectParameterState, PyramidParams, RetroParams, TintParams,
    UnderwaterParams,
};
use crate::state::CompositorState;

/// One uniform block shared by the stages of an effect. Blurs share a single
/// block since box blur, gaussian and bloom's internal blur all read the same
/// tunables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum ParamBlock {
    Tint,
    Blur,
    Underwater,
    Retro,
    Bloom,
    Pyramid,
}

fn stage_param_block(stage: EffectStage) -> Option<ParamBlock> {
    match stage {
        EffectStage::Tint => Some(ParamBlock::Tint),
        EffectStage::BoxBlur
        | EffectStage::GaussianHorizontal
        | EffectStage::GaussianVertical => Some(ParamBlock::Blur),
        EffectStage::Underwater => Some(ParamBlock::Underwater),
        EffectStage::Pixelate | EffectStage::Posterize => Some(ParamBlock::Retro),
        EffectStage::BrightPass | EffectStage::BloomCombine => Some(ParamBlock::Bloom),
        EffectStage::PyramidBlur => Some(ParamBlock::Pyramid),
        EffectStage::Copy => None,
    }
}

pub(crate) fn uniform_bytes<T: ShaderType + WriteInto>(value: &T) -> Vec<u8> {
    let mut buffer = encase::UniformBuffer::new(Vec::new());
    buffer.write(value).unwrap();
    buffer.into_inner()
}

/// Prepends the shared full-screen vertex stage to a fragment source and
/// compiles the pair as one module.
pub(crate) fn compose_module(device: &Device, label: &str, fragment_source: &str) -> ShaderModule {
    const FULLSCREEN: &str = include_str!("shaders/fullscreen.wgsl");

    let source = format!("{FULLSCREEN}\n{fragment_source}");
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
    })
}

struct ParamSlot {
    buffer: Buffer,
    bind_group: BindGroup,
}

enum LayoutKind {
    /// Source texture and sampler only.
    Bare,
    /// Source plus the stage's parameter block.
    Single,
    /// Two sampled sources plus the parameter block.
    Dual,
}

/// Everything needed to run any effect stage: one pipeline per stage, one
/// uniform block per effect, the shared sampler and the bind group layouts.
///
/// The stage set is closed, so lookups cannot miss at runtime; a missing
/// registration is a construction bug and trips an assertion instead of an
/// error path.
pub struct EffectCatalog {
    source_layout: BindGroupLayout,
    dual_source_layout: BindGroupLayout,
    sampler: Sampler,
    pipelines: HashMap<EffectStage, RenderPipeline>,
    params: HashMap<ParamBlock, ParamSlot>,
}

impl EffectCatalog {
    pub fn new(device: &Device) -> Self {
        let source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Glaze Post Source"),
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
            ],
        });

        let dual_source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Glaze Post Dual Source"),
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
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Glaze Post Params"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Glaze Post Sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });

        let bare_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Glaze Post Bare"),
            bind_group_layouts: &[&source_layout],
            push_constant_ranges: &[],
        });
        let single_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Glaze Post Single"),
            bind_group_layouts: &[&source_layout, &params_layout],
            push_constant_ranges: &[],
        });
        let dual_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Glaze Post Dual"),
            bind_group_layouts: &[&dual_source_layout, &params_layout],
            push_constant_ranges: &[],
        });

        let tint = compose_module(device, "Glaze Tint", include_str!("shaders/tint.wgsl"));
        let box_blur = compose_module(device, "Glaze Box Blur", include_str!("shaders/box_blur.wgsl"));
        let gaussian = compose_module(
            device,
            "Glaze Gaussian Blur",
            include_str!("shaders/gaussian_blur.wgsl"),
        );
        let underwater = compose_module(
            device,
            "Glaze Underwater",
            include_str!("shaders/underwater.wgsl"),
        );
        let retro = compose_module(device, "Glaze Retro", include_str!("shaders/retro.wgsl"));
        let bloom = compose_module(device, "Glaze Bloom", include_str!("shaders/bloom.wgsl"));
        let pyramid = compose_module(
            device,
            "Glaze Pyramid Blur",
            include_str!("shaders/pyramid_blur.wgsl"),
        );
        let copy = compose_module(device, "Glaze Copy", include_str!("shaders/copy.wgsl"));

        let registrations: [(EffectStage, &ShaderModule, &str, LayoutKind); 11] = [
            (EffectStage::Tint, &tint, "fragment", LayoutKind::Single),
            (EffectStage::BoxBlur, &box_blur, "fragment", LayoutKind::Single),
            (
                EffectStage::GaussianHorizontal,
                &gaussian,
                "horizontal",
                LayoutKind::Single,
            ),
            (
                EffectStage::GaussianVertical,
                &gaussian,
                "vertical",
                LayoutKind::Single,
            ),
            (
                EffectStage::Underwater,
                &underwater,
                "fragment",
                LayoutKind::Single,
            ),
            (EffectStage::Pixelate, &retro, "pixelate", LayoutKind::Single),
            (EffectStage::Posterize, &retro, "posterize", LayoutKind::Single),
            (
                EffectStage::BrightPass,
                &bloom,
                "bright_pass",
                LayoutKind::Single,
            ),
            (
                EffectStage::BloomCombine,
                &bloom,
                "combine",
                LayoutKind::Dual,
            ),
            (
                EffectStage::PyramidBlur,
                &pyramid,
                "fragment",
                LayoutKind::Single,
            ),
            (EffectStage::Copy, &copy, "fragment", LayoutKind::Bare),
        ];

        let mut pipelines = HashMap::new();
        for (stage, module, entry_point, kind) in registrations {
            let layout = match kind {
                LayoutKind::Bare => &bare_layout,
                LayoutKind::Single => &single_layout,
                LayoutKind::Dual => &dual_layout,
            };

            let label = format!("Glaze {stage:?}");
            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(layout),
                vertex: VertexState {
                    module,
                    entry_point: "vertex",
                    buffers: &[],
                },
                fragment: Some(FragmentState {
                    module,
                    entry_point,
                    targets: &[Some(ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: Some(BlendState::REPLACE),
                        write_mask: ColorWrites::ALL,
                    })],
                }),
                primitive: PrimitiveState {
                    topology: PrimitiveTopology::TriangleStrip,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: Default::default(),
                multiview: None,
            });

            pipelines.insert(stage, pipeline);
        }

        let blocks: [(ParamBlock, u64); 6] = [
            (ParamBlock::Tint, TintParams::min_size().get()),
            (ParamBlock::Blur, BlurParams::min_size().get()),
            (ParamBlock::Underwater, UnderwaterParams::min_size().get()),
            (ParamBlock::Retro, RetroParams::min_size().get()),
            (ParamBlock::Bloom, BloomParams::min_size().get()),
            (ParamBlock::Pyramid, PyramidParams::min_size().get()),
        ];

        let mut params = HashMap::new();
        for (block, size) in blocks {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Glaze Effect Params"),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Glaze Effect Params"),
                layout: &params_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });

            params.insert(block, ParamSlot { buffer, bind_group });
        }

        Self {
            source_layout,
            dual_source_layout,
            sampler,
            pipelines,
            params,
        }
    }

    fn pipeline(&self, stage: EffectStage) -> &RenderPipeline {
        match self.pipelines.get(&stage) {
            Some(pipeline) => pipeline,
            None => panic!("no pipeline registered for effect stage {stage:?}"),
        }
    }

    fn param_slot(&self, block: ParamBlock) -> &ParamSlot {
        match self.params.get(&block) {
            Some(slot) => slot,
            None => panic!("no parameter block registered for {block:?}"),
        }
    }

    /// Uploads the current frame's values into every parameter block.
    pub fn write_params(
        &self,
        queue: &Queue,
        state: &CompositorState,
        params: &EffectParameterState,
        width: u32,
        height: u32,
    ) {
        let blocks: [(ParamBlock, Vec<u8>); 6] = [
            (ParamBlock::Tint, uniform_bytes(&TintParams::pack(params))),
            (
                ParamBlock::Blur,
                uniform_bytes(&BlurParams::pack(state, width, height)),
            ),
            (
                ParamBlock::Underwater,
                uniform_bytes(&UnderwaterParams::pack(params)),
            ),
            (
                ParamBlock::Retro,
                uniform_bytes(&RetroParams::pack(state, width, height)),
            ),
            (ParamBlock::Bloom, uniform_bytes(&BloomParams::pack())),
            (
                ParamBlock::Pyramid,
                uniform_bytes(&PyramidParams::pack(state, width, height)),
            ),
        ];

        for (block, bytes) in blocks {
            queue.write_buffer(&self.param_slot(block).buffer, 0, &bytes);
        }
    }

    /// Records one full-screen pass: bind the target, sample the source(s),
    /// draw four strip vertices. Bindings are scoped to the pass; nothing
    /// stays bound once it ends.
    pub fn apply_pass(
        &self,
        device: &Device,
        encoder: &mut CommandEncoder,
        stage: EffectStage,
        source: &TextureView,
        extra: Option<&TextureView>,
        target: &TextureView,
    ) {
        let source_group = match extra {
            None => device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Glaze Post Source"),
                layout: &self.source_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            }),
            Some(extra) => device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Glaze Post Dual Source"),
                layout: &self.dual_source_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(extra),
                    },
                ],
            }),
        };

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Glaze Post Pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Load,
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });

        pass.set_pipeline(self.pipeline(stage));
        pass.set_bind_group(0, &source_group, &[]);

        if let Some(block) = stage_param_block(stage) {
            pass.set_bind_group(1, &self.param_slot(block).bind_group, &[]);
        }

        pass.draw(0..4, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_maps_to_its_effects_block() {
        assert_eq!(stage_param_block(EffectStage::Tint), Some(ParamBlock::Tint));
        assert_eq!(stage_param_block(EffectStage::Copy), None);

        // The three blur-family stages share one block, so a single radius
        // adjustment reaches all of them.
        for stage in [
            EffectStage::BoxBlur,
            EffectStage::GaussianHorizontal,
            EffectStage::GaussianVertical,
        ] {
            assert_eq!(stage_param_block(stage), Some(ParamBlock::Blur));
        }

        for stage in [EffectStage::BrightPass, EffectStage::BloomCombine] {
            assert_eq!(stage_param_block(stage), Some(ParamBlock::Bloom));
        }
    }

    #[test]
    fn uniform_blocks_match_the_shader_struct_sizes() {
        // One assertion per wgsl-side param struct; the catalog allocates
        // each block at exactly this size.
        assert_eq!(TintParams::min_size().get(), 32);
        assert_eq!(BlurParams::min_size().get(), 16);
        assert_eq!(UnderwaterParams::min_size().get(), 48);
        assert_eq!(RetroParams::min_size().get(), 16);
        assert_eq!(BloomParams::min_size().get(), 8);
        assert_eq!(PyramidParams::min_size().get(), 16);
    }

    #[test]
    fn packed_bytes_match_the_declared_size() {
        let state = CompositorState::default();
        let params = EffectParameterState::new();

        assert_eq!(
            uniform_bytes(&TintParams::pack(&params)).len() as u64,
            TintParams::min_size().get()
        );
        assert_eq!(
            uniform_bytes(&BlurParams::pack(&state, 800, 600)).len() as u64,
            BlurParams::min_size().get()
        );
        assert_eq!(
            uniform_bytes(&UnderwaterParams::pack(&params)).len() as u64,
            UnderwaterParams::min_size().get()
        );
        assert_eq!(
            uniform_bytes(&RetroParams::pack(&state, 800, 600)).len() as u64,
            RetroParams::min_size().get()
        );
        assert_eq!(
            uniform_bytes(&BloomParams::pack()).len() as u64,
            BloomParams::min_size().get()
        );
        assert_eq!(
            uniform_bytes(&PyramidParams::pack(&state, 800, 600)).len() as u64,
            PyramidParams::min_size().get()
        );
    }
}

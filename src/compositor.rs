//! Sequencing of enabled effects over the ping-pong and auxiliary buffers.
//!
//! [`plan`] turns a [`CompositorState`] into an explicit list of passes with
//! concrete buffer assignments; [`PostProcessCompositor::run`] executes such
//! a plan. Keeping the two apart means every ordering and aliasing rule can
//! be checked on the plan alone, with no device in sight.

use std::time::Instant;

use wgpu::{CommandEncoder, Device, Queue};

use crate::catalog::EffectCatalog;
use crate::color_buffer::ColorBuffer;
use crate::effect::{EffectStage, Slot};
use crate::error::ResourceCreationError;
use crate::params::EffectParameterState;
use crate::state::CompositorState;

/// Concrete buffer a planned pass reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferSlot {
    /// The buffer the scene renderer writes, and the one presented at the
    /// end of the frame.
    Scene,
    PingA,
    PingB,
    Aux,
}

/// One full-screen pass with its buffers resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassPlan {
    pub stage: EffectStage,
    pub source: BufferSlot,
    pub extra: Option<BufferSlot>,
    pub target: BufferSlot,
}

/// Builds the frame's pass list from the enabled effects.
///
/// Effects run in canonical order. Each effect reads the chain from whatever
/// buffer currently holds it and leaves its result in a ping-pong buffer,
/// which then becomes the chain input of the next effect. When at least one
/// effect ran, a final copy moves the result back into the scene buffer so
/// presentation always reads from one place. With nothing enabled the plan
/// is empty and the scene image reaches the screen untouched.
pub fn plan(state: &CompositorState) -> Vec<PassPlan> {
    let mut passes = Vec::new();
    let mut current = BufferSlot::Scene;

    for effect in state.enabled_effects() {
        let descriptor = effect.descriptor();

        let chain = current;
        let work = if chain == BufferSlot::PingA {
            BufferSlot::PingB
        } else {
            BufferSlot::PingA
        };
        let alt = if work == BufferSlot::PingA {
            BufferSlot::PingB
        } else {
            BufferSlot::PingA
        };

        let resolve = |slot: Slot| match slot {
            Slot::Chain => chain,
            Slot::Work => work,
            Slot::Alt => alt,
            Slot::Aux => BufferSlot::Aux,
        };

        for route in descriptor.routes {
            passes.push(PassPlan {
                stage: route.stage,
                source: resolve(route.source),
                extra: route.extra.map(resolve),
                target: resolve(route.target),
            });
        }

        current = resolve(descriptor.result());
    }

    if !passes.is_empty() {
        passes.push(PassPlan {
            stage: EffectStage::Copy,
            source: current,
            extra: None,
            target: BufferSlot::Scene,
        });
    }

    passes
}

/// Owns the ping-pong and auxiliary buffers and drives the effect chain.
pub struct PostProcessCompositor {
    catalog: EffectCatalog,
    ping_a: ColorBuffer,
    ping_b: ColorBuffer,
    aux: ColorBuffer,
}

impl PostProcessCompositor {
    pub fn new(device: &Device, width: u32, height: u32) -> Result<Self, ResourceCreationError> {
        Ok(Self {
            catalog: EffectCatalog::new(device),
            ping_a: ColorBuffer::allocate(device, "Glaze Ping A", width, height)?,
            ping_b: ColorBuffer::allocate(device, "Glaze Ping B", width, height)?,
            aux: ColorBuffer::allocate(device, "Glaze Aux", width, height)?,
        })
    }

    pub fn resize(
        &mut self,
        device: &Device,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceCreationError> {
        self.ping_a.resize(device, width, height)?;
        self.ping_b.resize(device, width, height)?;
        self.aux.resize(device, width, height)?;

        Ok(())
    }

    fn buffer<'a>(&'a self, slot: BufferSlot, scene: &'a ColorBuffer) -> &'a ColorBuffer {
        match slot {
            BufferSlot::Scene => scene,
            BufferSlot::PingA => &self.ping_a,
            BufferSlot::PingB => &self.ping_b,
            BufferSlot::Aux => &self.aux,
        }
    }

    /// Runs the enabled effects against the scene buffer, leaving the final
    /// image back in it. With no effects enabled this records nothing.
    pub fn run(
        &self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        scene: &ColorBuffer,
        state: &CompositorState,
        params: &EffectParameterState,
    ) {
        let passes = plan(state);
        if passes.is_empty() {
            return;
        }

        debug_assert_eq!(scene.size(), self.ping_a.size());

        let start = Instant::now();

        self.catalog
            .write_params(queue, state, params, scene.width(), scene.height());

        for pass in &passes {
            let source = self.buffer(pass.source, scene);
            let target = self.buffer(pass.target, scene);
            let extra = pass.extra.map(|slot| self.buffer(slot, scene));

            debug_assert_ne!(source.id(), target.id());
            if let Some(extra) = extra {
                debug_assert_ne!(extra.id(), target.id());
            }

            self.catalog.apply_pass(
                device,
                encoder,
                pass.stage,
                source.sampled_view(),
                extra.map(|buffer| buffer.sampled_view()),
                target.target_view(),
            );
        }

        log::trace!("Post chain ({} passes) took: {:?}", passes.len(), start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;

    fn state_with(effects: &[Effect]) -> CompositorState {
        let mut state = CompositorState::default();
        for &effect in effects {
            state.toggle(effect);
        }
        state
    }

    fn all_subsets() -> impl Iterator<Item = CompositorState> {
        (0u32..1 << Effect::CANONICAL_ORDER.len()).map(|bits| {
            let mut state = CompositorState::default();
            for (i, effect) in Effect::CANONICAL_ORDER.into_iter().enumerate() {
                if bits & (1 << i) != 0 {
                    state.toggle(effect);
                }
            }
            state
        })
    }

    #[test]
    fn no_effects_means_no_passes() {
        assert!(plan(&CompositorState::default()).is_empty());
    }

    #[test]
    fn a_single_effect_runs_once_and_copies_back() {
        let passes = plan(&state_with(&[Effect::Tint]));
        assert_eq!(
            passes,
            vec![
                PassPlan {
                    stage: EffectStage::Tint,
                    source: BufferSlot::Scene,
                    extra: None,
                    target: BufferSlot::PingA,
                },
                PassPlan {
                    stage: EffectStage::Copy,
                    source: BufferSlot::PingA,
                    extra: None,
                    target: BufferSlot::Scene,
                },
            ]
        );
    }

    #[test]
    fn toggle_order_does_not_change_the_plan() {
        let forward = state_with(&[Effect::Tint, Effect::Retro, Effect::Bloom]);
        let backward = state_with(&[Effect::Bloom, Effect::Retro, Effect::Tint]);
        let shuffled = state_with(&[Effect::Retro, Effect::Bloom, Effect::Tint]);

        let expected = plan(&forward);
        assert_eq!(plan(&backward), expected);
        assert_eq!(plan(&shuffled), expected);
    }

    #[test]
    fn consecutive_effects_alternate_ping_pong_buffers() {
        let passes = plan(&state_with(&[Effect::Tint, Effect::Blur, Effect::Underwater]));
        assert_eq!(passes[0].source, BufferSlot::Scene);
        assert_eq!(passes[0].target, BufferSlot::PingA);
        assert_eq!(passes[1].source, BufferSlot::PingA);
        assert_eq!(passes[1].target, BufferSlot::PingB);
        assert_eq!(passes[2].source, BufferSlot::PingB);
        assert_eq!(passes[2].target, BufferSlot::PingA);
    }

    #[test]
    fn each_effect_reads_the_previous_result() {
        for state in all_subsets() {
            let passes = plan(&state);
            if passes.is_empty() {
                continue;
            }

            assert_eq!(passes[0].source, BufferSlot::Scene);

            let last = passes.last().unwrap();
            assert_eq!(last.stage, EffectStage::Copy);
            assert_eq!(last.target, BufferSlot::Scene);
        }
    }

    #[test]
    fn no_pass_writes_a_buffer_it_reads() {
        for state in all_subsets() {
            for pass in plan(&state) {
                assert_ne!(pass.source, pass.target, "{pass:?}");
                assert_ne!(pass.extra, Some(pass.target), "{pass:?}");
            }
        }
    }

    #[test]
    fn bloom_alone_routes_through_the_aux_buffer() {
        let passes = plan(&state_with(&[Effect::Bloom]));
        assert_eq!(
            passes,
            vec![
                PassPlan {
                    stage: EffectStage::BrightPass,
                    source: BufferSlot::Scene,
                    extra: None,
                    target: BufferSlot::Aux,
                },
                PassPlan {
                    stage: EffectStage::GaussianHorizontal,
                    source: BufferSlot::Aux,
                    extra: None,
                    target: BufferSlot::PingA,
                },
                PassPlan {
                    stage: EffectStage::GaussianVertical,
                    source: BufferSlot::PingA,
                    extra: None,
                    target: BufferSlot::Aux,
                },
                PassPlan {
                    stage: EffectStage::BloomCombine,
                    source: BufferSlot::Aux,
                    extra: Some(BufferSlot::Scene),
                    target: BufferSlot::PingA,
                },
                PassPlan {
                    stage: EffectStage::Copy,
                    source: BufferSlot::PingA,
                    extra: None,
                    target: BufferSlot::Scene,
                },
            ]
        );
    }

    #[test]
    fn bloom_combines_with_the_pre_bloom_image() {
        let passes = plan(&state_with(&[Effect::Tint, Effect::Bloom]));

        // Tint leaves the chain in ping A; bloom must keep reading that
        // buffer as its combine base while blurring through aux and ping B.
        let combine = passes
            .iter()
            .find(|pass| pass.stage == EffectStage::BloomCombine)
            .unwrap();
        assert_eq!(combine.extra, Some(BufferSlot::PingA));
        assert_eq!(combine.target, BufferSlot::PingB);
    }

    #[test]
    fn the_full_chain_stays_alias_free() {
        let mut state = CompositorState::default();
        for effect in Effect::CANONICAL_ORDER {
            state.toggle(effect);
        }

        let passes = plan(&state);
        let expected: usize = Effect::CANONICAL_ORDER
            .iter()
            .map(|effect| effect.descriptor().pass_count())
            .sum();
        assert_eq!(passes.len(), expected + 1);

        for pass in &passes {
            assert_ne!(pass.source, pass.target);
            assert_ne!(pass.extra, Some(pass.target));
        }
    }
}

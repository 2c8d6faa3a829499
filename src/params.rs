//! Per-effect parameter blocks and the animated state feeding them.
//!
//! [`EffectParameterState`] holds everything that changes over time on its
//! own (tint hues, wave phases); [`CompositorState`] holds everything driven
//! by input. The `pack` constructors below combine both into the uniform
//! structs the shaders read.

use encase::ShaderType;
use glam::{Vec2, Vec3};

use crate::color::Hsl;
use crate::state::CompositorState;

const TINT_PRIMARY_RATE: f32 = 24.0;
const TINT_SECONDARY_RATE: f32 = 40.0;

const UNDERWATER_SHALLOW: Vec3 = Vec3::new(0.0, 1.0, 1.0);
const UNDERWATER_DEEP: Vec3 = Vec3::new(0.0, 0.5, 1.0);

const BLOOM_THRESHOLD: f32 = 0.7;
const BLOOM_INTENSITY: f32 = 1.0;

/// Animated per-effect state, advanced once per frame from the elapsed
/// frame time and otherwise untouched by rendering.
#[derive(Clone, Debug)]
pub struct EffectParameterState {
    /// First tint color, rotating through hue at a slow rate.
    pub tint_primary: Hsl,
    /// Second tint color, rotating faster so the two drift apart.
    pub tint_secondary: Hsl,
    /// Accumulated time in seconds, driving the underwater wave phases.
    pub time: f32,
}

impl EffectParameterState {
    pub fn new() -> Self {
        Self {
            tint_primary: Hsl::new(180.0, 1.0, 0.5),
            tint_secondary: Hsl::new(60.0, 1.0, 0.5),
            time: 0.0,
        }
    }

    /// Advances all animation by `dt` seconds. Pure bookkeeping: calling
    /// this twice with halved deltas lands on the same state.
    pub fn advance(&mut self, dt: f32) {
        self.tint_primary.rotate(TINT_PRIMARY_RATE * dt);
        self.tint_secondary.rotate(TINT_SECONDARY_RATE * dt);
        self.time += dt;
    }

    /// Wave phases for the underwater distortion: the horizontal wave runs
    /// at full rate, the vertical one at half rate.
    pub fn wave_phases(&self) -> (f32, f32) {
        (self.time, self.time * 0.5)
    }
}

impl Default for EffectParameterState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, ShaderType)]
pub struct TintParams {
    pub color_a: Vec3,
    pub color_b: Vec3,
}

impl TintParams {
    pub fn pack(params: &EffectParameterState) -> Self {
        Self {
            color_a: params.tint_primary.to_rgb(),
            color_b: params.tint_secondary.to_rgb(),
        }
    }
}

/// Shared by the box blur, the separable gaussian and bloom's internal blur.
#[derive(Clone, Copy, Debug, ShaderType)]
pub struct BlurParams {
    pub texel: Vec2,
    pub radius: i32,
    pub curve: f32,
}

impl BlurParams {
    pub fn pack(state: &CompositorState, width: u32, height: u32) -> Self {
        Self {
            texel: Vec2::new(1.0 / width as f32, 1.0 / height as f32),
            radius: state.blur_radius,
            curve: state.blur_curve,
        }
    }
}

#[derive(Clone, Copy, Debug, ShaderType)]
pub struct UnderwaterParams {
    pub shallow: Vec3,
    pub deep: Vec3,
    pub wave_x: f32,
    pub wave_y: f32,
}

impl UnderwaterParams {
    pub fn pack(params: &EffectParameterState) -> Self {
        let (wave_x, wave_y) = params.wave_phases();
        Self {
            shallow: UNDERWATER_SHALLOW,
            deep: UNDERWATER_DEEP,
            wave_x,
            wave_y,
        }
    }
}

#[derive(Clone, Copy, Debug, ShaderType)]
pub struct RetroParams {
    pub resolution: Vec2,
    pub pixel_size: f32,
    pub levels: f32,
}

impl RetroParams {
    pub fn pack(state: &CompositorState, width: u32, height: u32) -> Self {
        Self {
            resolution: Vec2::new(width as f32, height as f32),
            pixel_size: state.pixel_size as f32,
            levels: state.posterize_levels as f32,
        }
    }
}

/// The bright pass keeps only samples whose brightness exceeds `threshold`;
/// everything at or below it contributes nothing to the bloom layer.
#[derive(Clone, Copy, Debug, ShaderType)]
pub struct BloomParams {
    pub threshold: f32,
    pub intensity: f32,
}

impl BloomParams {
    pub fn pack() -> Self {
        Self {
            threshold: BLOOM_THRESHOLD,
            intensity: BLOOM_INTENSITY,
        }
    }
}

#[derive(Clone, Copy, Debug, ShaderType)]
pub struct PyramidParams {
    pub texel: Vec2,
    pub rings: i32,
    pub spread: f32,
}

impl PyramidParams {
    pub fn pack(state: &CompositorState, width: u32, height: u32) -> Self {
        Self {
            texel: Vec2::new(1.0 / width as f32, 1.0 / height as f32),
            rings: (state.blur_radius / 2).max(2),
            spread: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hues_stay_normalized_over_long_runs() {
        let mut params = EffectParameterState::new();
        params.advance(10_000.0);
        assert!(params.tint_primary.hue >= 0.0 && params.tint_primary.hue < 360.0);
        assert!(params.tint_secondary.hue >= 0.0 && params.tint_secondary.hue < 360.0);
    }

    #[test]
    fn hues_rotate_at_independent_rates() {
        let mut params = EffectParameterState::new();
        let (start_a, start_b) = (params.tint_primary.hue, params.tint_secondary.hue);
        params.advance(1.0);
        assert!((params.tint_primary.hue - start_a - TINT_PRIMARY_RATE).abs() < 1e-3);
        assert!((params.tint_secondary.hue - start_b - TINT_SECONDARY_RATE).abs() < 1e-3);
    }

    #[test]
    fn vertical_wave_runs_at_half_rate() {
        let mut params = EffectParameterState::new();
        params.advance(3.0);
        let (wave_x, wave_y) = params.wave_phases();
        assert!((wave_x - 3.0).abs() < 1e-6);
        assert!((wave_y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn tint_starts_as_cyan_and_yellow() {
        let packed = TintParams::pack(&EffectParameterState::new());
        assert!(packed.color_a.abs_diff_eq(Vec3::new(0.0, 1.0, 1.0), 1e-5));
        assert!(packed.color_b.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn bright_pass_cuts_off_at_the_threshold() {
        let packed = BloomParams::pack();

        // Same weight expression the bloom bright pass evaluates per pixel.
        let weight =
            |brightness: f32| (brightness - packed.threshold).max(0.0) / brightness.max(0.0001);

        assert_eq!(weight(0.5), 0.0);
        assert_eq!(weight(packed.threshold), 0.0);
        assert!(weight(0.9) > 0.0);
        assert!(weight(10.0) > 0.9);
    }

    #[test]
    fn blur_params_track_the_shared_tunables() {
        let mut state = CompositorState::default();
        state.blur_radius = 12;
        state.blur_curve = 2.5;

        let packed = BlurParams::pack(&state, 800, 600);
        assert_eq!(packed.radius, 12);
        assert!((packed.curve - 2.5).abs() < 1e-6);
        assert!((packed.texel.x - 1.0 / 800.0).abs() < 1e-9);
        assert!((packed.texel.y - 1.0 / 600.0).abs() < 1e-9);
    }
}

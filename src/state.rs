use crate::effect::Effect;

/// Discrete control input applied to the compositor between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlEvent {
    Toggle(Effect),
    DisableAll,
    AdjustBlurRadius(i32),
    ScaleBlurCurve(f32),
    AdjustPixelSize(i32),
    AdjustPosterizeLevels(i32),
}

/// Which effects are enabled plus the shared tunables, passed into the render
/// step by value each frame.
///
/// Mutation happens only between frames, through [`CompositorState::apply`];
/// the compositor itself treats the state as read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositorState {
    enabled: [bool; Effect::CANONICAL_ORDER.len()],
    /// Blur kernel radius in texels, never below [`Self::MIN_BLUR_RADIUS`].
    pub blur_radius: i32,
    /// Sharpness exponent of the gaussian falloff. Adjusted in exponential
    /// steps, no upper or lower clamp.
    pub blur_curve: f32,
    /// Pixelation block size in texels, never below 1.
    pub pixel_size: u32,
    /// Shades per channel left by posterization, never below 1.
    pub posterize_levels: u32,
}

impl CompositorState {
    pub const MIN_BLUR_RADIUS: i32 = 5;
    pub const BLUR_CURVE_STEP: f32 = 1.1;

    pub fn is_enabled(&self, effect: Effect) -> bool {
        self.enabled[effect as usize]
    }

    pub fn toggle(&mut self, effect: Effect) {
        self.enabled[effect as usize] = !self.enabled[effect as usize];
    }

    pub fn disable_all(&mut self) {
        self.enabled = Default::default();
    }

    pub fn any_enabled(&self) -> bool {
        self.enabled.iter().any(|&on| on)
    }

    /// Enabled effects in canonical application order, independent of the
    /// order they were toggled on.
    pub fn enabled_effects(&self) -> impl Iterator<Item = Effect> + '_ {
        Effect::CANONICAL_ORDER
            .into_iter()
            .filter(|&effect| self.is_enabled(effect))
    }

    pub fn apply(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Toggle(effect) => self.toggle(effect),
            ControlEvent::DisableAll => self.disable_all(),
            ControlEvent::AdjustBlurRadius(delta) => {
                self.blur_radius = (self.blur_radius + delta).max(Self::MIN_BLUR_RADIUS);
            }
            ControlEvent::ScaleBlurCurve(factor) => {
                self.blur_curve *= factor;
            }
            ControlEvent::AdjustPixelSize(delta) => {
                self.pixel_size = self.pixel_size.saturating_add_signed(delta).max(1);
            }
            ControlEvent::AdjustPosterizeLevels(delta) => {
                self.posterize_levels = self.posterize_levels.saturating_add_signed(delta).max(1);
            }
        }
    }
}

impl Default for CompositorState {
    fn default() -> Self {
        Self {
            enabled: Default::default(),
            blur_radius: 10,
            blur_curve: 1.0,
            pixel_size: 8,
            posterize_levels: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_the_initial_state() {
        let mut state = CompositorState::default();
        state.apply(ControlEvent::Toggle(Effect::Bloom));
        assert!(state.is_enabled(Effect::Bloom));
        state.apply(ControlEvent::Toggle(Effect::Bloom));
        assert_eq!(state, CompositorState::default());
    }

    #[test]
    fn disable_all_clears_every_effect() {
        let mut state = CompositorState::default();
        for effect in Effect::CANONICAL_ORDER {
            state.toggle(effect);
        }
        state.apply(ControlEvent::DisableAll);
        assert!(!state.any_enabled());
    }

    #[test]
    fn enabled_effects_follow_canonical_order() {
        let mut state = CompositorState::default();
        state.toggle(Effect::PyramidBlur);
        state.toggle(Effect::Tint);
        state.toggle(Effect::Bloom);

        let order: Vec<_> = state.enabled_effects().collect();
        assert_eq!(order, vec![Effect::Tint, Effect::Bloom, Effect::PyramidBlur]);
    }

    #[test]
    fn blur_radius_never_drops_below_the_minimum() {
        let mut state = CompositorState::default();
        for _ in 0..100 {
            state.apply(ControlEvent::AdjustBlurRadius(-1));
        }
        assert_eq!(state.blur_radius, CompositorState::MIN_BLUR_RADIUS);

        state.apply(ControlEvent::AdjustBlurRadius(3));
        assert_eq!(state.blur_radius, CompositorState::MIN_BLUR_RADIUS + 3);
    }

    #[test]
    fn pixel_size_and_posterize_levels_stop_at_one() {
        let mut state = CompositorState::default();
        for _ in 0..100 {
            state.apply(ControlEvent::AdjustPixelSize(-1));
            state.apply(ControlEvent::AdjustPosterizeLevels(-1));
        }
        assert_eq!(state.pixel_size, 1);
        assert_eq!(state.posterize_levels, 1);
    }

    #[test]
    fn blur_curve_steps_are_exponential_and_unclamped() {
        let mut state = CompositorState::default();
        for _ in 0..10 {
            state.apply(ControlEvent::ScaleBlurCurve(CompositorState::BLUR_CURVE_STEP));
        }
        assert!((state.blur_curve - 1.1f32.powi(10)).abs() < 1e-4);

        for _ in 0..40 {
            state.apply(ControlEvent::ScaleBlurCurve(1.0 / CompositorState::BLUR_CURVE_STEP));
        }
        assert!(state.blur_curve < 1.0);
        assert!(state.blur_curve > 0.0);
    }
}

//! The closed set of post-processing effects and their expansion into
//! full-screen passes.
//!
//! Every effect is described by a static [`EffectDescriptor`]: an ordered
//! list of [`StageRoute`]s naming the shader stage each pass runs and the
//! logical buffer slots it reads and writes. The compositor resolves those
//! slots against its concrete buffers, so adding an effect is a matter of
//! adding a variant, a descriptor row, and its shader.

/// A toggleable post-processing effect.
///
/// The declaration order here is the canonical application order: enabled
/// effects always run in this order no matter when they were toggled on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    Tint,
    GaussianBlur,
    Blur,
    Underwater,
    Retro,
    Bloom,
    PyramidBlur,
}

impl Effect {
    pub const CANONICAL_ORDER: [Effect; 7] = [
        Effect::Tint,
        Effect::GaussianBlur,
        Effect::Blur,
        Effect::Underwater,
        Effect::Retro,
        Effect::Bloom,
        Effect::PyramidBlur,
    ];

    /// Looks up the static descriptor for this effect.
    ///
    /// The effect set is closed, so this cannot fail; the descriptor table
    /// is checked against [`Effect::CANONICAL_ORDER`] by a unit test.
    pub fn descriptor(self) -> &'static EffectDescriptor {
        &DESCRIPTORS[self as usize]
    }
}

/// One compiled shader stage. Several effects may share a stage: bloom blurs
/// its bright regions with the same separable passes as [`Effect::GaussianBlur`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectStage {
    Tint,
    BoxBlur,
    GaussianHorizontal,
    GaussianVertical,
    Underwater,
    Pixelate,
    Posterize,
    BrightPass,
    BloomCombine,
    PyramidBlur,
    /// Identity blit, used to move the finished chain back into the scene
    /// buffer.
    Copy,
}

/// Logical buffer slot in a [`StageRoute`], resolved per effect.
///
/// `Work` and `Alt` are the two ping-pong buffers, ordered so that `Work` is
/// never the buffer holding the effect's chain input. `Chain` is whatever
/// buffer currently holds the frame when the effect starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Chain,
    Work,
    Alt,
    Aux,
}

/// A single full-screen pass within an effect: which stage runs, what it
/// samples, and where it renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageRoute {
    pub stage: EffectStage,
    pub source: Slot,
    /// Second sampled input, only used by stages that merge two images.
    pub extra: Option<Slot>,
    pub target: Slot,
}

const fn route(stage: EffectStage, source: Slot, target: Slot) -> StageRoute {
    StageRoute {
        stage,
        source,
        extra: None,
        target,
    }
}

/// Static description of an effect: its passes in fixed order.
#[derive(Debug)]
pub struct EffectDescriptor {
    pub effect: Effect,
    pub routes: &'static [StageRoute],
}

impl EffectDescriptor {
    pub fn pass_count(&self) -> usize {
        self.routes.len()
    }

    /// Whether any pass of this effect touches the auxiliary buffer.
    pub fn uses_aux(&self) -> bool {
        self.routes
            .iter()
            .any(|r| r.source == Slot::Aux || r.extra == Some(Slot::Aux) || r.target == Slot::Aux)
    }

    /// The slot the effect leaves its result in.
    pub fn result(&self) -> Slot {
        self.routes[self.routes.len() - 1].target
    }
}

static DESCRIPTORS: [EffectDescriptor; 7] = [
    EffectDescriptor {
        effect: Effect::Tint,
        routes: &[route(EffectStage::Tint, Slot::Chain, Slot::Work)],
    },
    EffectDescriptor {
        effect: Effect::GaussianBlur,
        routes: &[
            route(EffectStage::GaussianHorizontal, Slot::Chain, Slot::Work),
            route(EffectStage::GaussianVertical, Slot::Work, Slot::Alt),
        ],
    },
    EffectDescriptor {
        effect: Effect::Blur,
        routes: &[route(EffectStage::BoxBlur, Slot::Chain, Slot::Work)],
    },
    EffectDescriptor {
        effect: Effect::Underwater,
        routes: &[route(EffectStage::Underwater, Slot::Chain, Slot::Work)],
    },
    EffectDescriptor {
        effect: Effect::Retro,
        routes: &[
            route(EffectStage::Pixelate, Slot::Chain, Slot::Work),
            route(EffectStage::Posterize, Slot::Work, Slot::Alt),
        ],
    },
    EffectDescriptor {
        effect: Effect::Bloom,
        routes: &[
            route(EffectStage::BrightPass, Slot::Chain, Slot::Aux),
            route(EffectStage::GaussianHorizontal, Slot::Aux, Slot::Work),
            route(EffectStage::GaussianVertical, Slot::Work, Slot::Aux),
            StageRoute {
                stage: EffectStage::BloomCombine,
                source: Slot::Aux,
                extra: Some(Slot::Chain),
                target: Slot::Work,
            },
        ],
    },
    EffectDescriptor {
        effect: Effect::PyramidBlur,
        routes: &[route(EffectStage::PyramidBlur, Slot::Chain, Slot::Work)],
    },
];

#![deny(unsafe_op_in_unsafe_fn)]

//! A small forward-rendered scene pushed through a chain of toggleable
//! full-screen post-processing effects before presentation.
//!
//! The interesting part is the [`PostProcessCompositor`]: it turns the set of
//! enabled effects into an explicit per-frame pass plan over a pair of
//! ping-pong color buffers plus one auxiliary buffer, and executes that plan
//! with a single full-screen-pass primitive. The plan itself is a pure
//! function of [`CompositorState`], so ordering and buffer-aliasing rules are
//! testable without a device.

pub mod app;
pub mod camera;
pub mod catalog;
pub mod color;
pub mod color_buffer;
pub mod compositor;
pub mod effect;
pub mod error;
pub mod gpu;
pub mod mesh;
pub mod params;
pub mod present;
pub mod scene;
pub mod state;

pub use camera::{Camera, Perspective};
pub use catalog::EffectCatalog;
pub use color::Hsl;
pub use color_buffer::{BufferId, ColorBuffer};
pub use compositor::{plan, BufferSlot, PassPlan, PostProcessCompositor};
pub use effect::{Effect, EffectDescriptor, EffectStage, Slot, StageRoute};
pub use error::{Error, ResourceCreationError};
pub use gpu::GpuContext;
pub use params::EffectParameterState;
pub use present::PresentStage;
pub use scene::SceneRenderer;
pub use state::{CompositorState, ControlEvent};

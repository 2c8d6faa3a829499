//! Window, input handling and the frame loop for the demo binary.

use std::collections::HashSet;
use std::time::Instant;

use glam::{Vec2, Vec3};
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use crate::camera::Camera;
use crate::compositor::PostProcessCompositor;
use crate::effect::Effect;
use crate::error::Error;
use crate::gpu::GpuContext;
use crate::params::EffectParameterState;
use crate::present::PresentStage;
use crate::scene::SceneRenderer;
use crate::state::{CompositorState, ControlEvent};

pub const WINDOW_TITLE: &str = "Glaze";

/// How often the frame-rate shown in the title is refreshed.
const TITLE_REFRESH: f32 = 0.5;

/// Maps a key press to the compositor control it drives, if any.
fn control_event(key: VirtualKeyCode) -> Option<ControlEvent> {
    match key {
        VirtualKeyCode::Key1 => Some(ControlEvent::Toggle(Effect::Tint)),
        VirtualKeyCode::Key2 => Some(ControlEvent::Toggle(Effect::GaussianBlur)),
        VirtualKeyCode::Key3 => Some(ControlEvent::Toggle(Effect::Blur)),
        VirtualKeyCode::Key4 => Some(ControlEvent::Toggle(Effect::Underwater)),
        VirtualKeyCode::Key5 => Some(ControlEvent::Toggle(Effect::Retro)),
        VirtualKeyCode::Key6 => Some(ControlEvent::Toggle(Effect::Bloom)),
        VirtualKeyCode::Key7 => Some(ControlEvent::Toggle(Effect::PyramidBlur)),
        VirtualKeyCode::Key0 => Some(ControlEvent::DisableAll),
        VirtualKeyCode::Comma => Some(ControlEvent::AdjustBlurRadius(-1)),
        VirtualKeyCode::Period => Some(ControlEvent::AdjustBlurRadius(1)),
        VirtualKeyCode::K => Some(ControlEvent::ScaleBlurCurve(
            1.0 / CompositorState::BLUR_CURVE_STEP,
        )),
        VirtualKeyCode::L => Some(ControlEvent::ScaleBlurCurve(
            CompositorState::BLUR_CURVE_STEP,
        )),
        VirtualKeyCode::N => Some(ControlEvent::AdjustPixelSize(-1)),
        VirtualKeyCode::M => Some(ControlEvent::AdjustPixelSize(1)),
        VirtualKeyCode::U => Some(ControlEvent::AdjustPosterizeLevels(-1)),
        VirtualKeyCode::I => Some(ControlEvent::AdjustPosterizeLevels(1)),
        _ => None,
    }
}

/// Toggles fire once per press; tunable nudges repeat with the key.
fn fires_on_edge_only(event: &ControlEvent) -> bool {
    matches!(
        event,
        ControlEvent::Toggle(_) | ControlEvent::DisableAll
    )
}

fn movement_axis(held: &HashSet<VirtualKeyCode>) -> Vec3 {
    let mut axis = Vec3::ZERO;
    if held.contains(&VirtualKeyCode::W) {
        axis.z -= 1.0;
    }
    if held.contains(&VirtualKeyCode::S) {
        axis.z += 1.0;
    }
    if held.contains(&VirtualKeyCode::A) {
        axis.x -= 1.0;
    }
    if held.contains(&VirtualKeyCode::D) {
        axis.x += 1.0;
    }
    axis
}

fn look_axis(held: &HashSet<VirtualKeyCode>) -> Vec2 {
    let mut axis = Vec2::ZERO;
    if held.contains(&VirtualKeyCode::Left) {
        axis.x += 1.0;
    }
    if held.contains(&VirtualKeyCode::Right) {
        axis.x -= 1.0;
    }
    if held.contains(&VirtualKeyCode::Up) {
        axis.y += 1.0;
    }
    if held.contains(&VirtualKeyCode::Down) {
        axis.y -= 1.0;
    }
    axis
}

pub fn run() -> Result<(), Error> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(LogicalSize::new(1280.0, 720.0))
        .build(&event_loop)?;

    let mut gpu = GpuContext::new(&window)?;
    let mut scene = SceneRenderer::new(&gpu.device, gpu.width(), gpu.height())?;
    let mut compositor = PostProcessCompositor::new(&gpu.device, gpu.width(), gpu.height())?;
    let present = PresentStage::new(&gpu.device, gpu.surface_format());

    let mut camera = Camera::default();
    camera.set_aspect(gpu.width(), gpu.height());

    let mut state = CompositorState::default();
    let mut params = EffectParameterState::new();
    let mut held: HashSet<VirtualKeyCode> = HashSet::new();

    let mut last_frame = Instant::now();
    let mut title_timer = 0.0_f32;
    let mut title_frames = 0_u32;

    log::info!("starting frame loop");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { ref event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                WindowEvent::Resized(size) => {
                    gpu.resize(size.width, size.height);
                    camera.set_aspect(gpu.width(), gpu.height());

                    let resized = scene
                        .resize(&gpu.device, gpu.width(), gpu.height())
                        .and_then(|_| compositor.resize(&gpu.device, gpu.width(), gpu.height()));
                    if let Err(error) = resized {
                        log::error!("failed to resize render targets: {error}");
                        *control_flow = ControlFlow::Exit;
                    }
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    gpu.resize(new_inner_size.width, new_inner_size.height);
                    camera.set_aspect(gpu.width(), gpu.height());

                    let resized = scene
                        .resize(&gpu.device, gpu.width(), gpu.height())
                        .and_then(|_| compositor.resize(&gpu.device, gpu.width(), gpu.height()));
                    if let Err(error) = resized {
                        log::error!("failed to resize render targets: {error}");
                        *control_flow = ControlFlow::Exit;
                    }
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: key_state,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => match key_state {
                    ElementState::Pressed => {
                        let repeat = !held.insert(*key);

                        match key {
                            VirtualKeyCode::Escape => *control_flow = ControlFlow::Exit,
                            VirtualKeyCode::V if !repeat => {
                                let on = gpu.toggle_vsync();
                                log::info!("vsync {}", if on { "on" } else { "off" });
                            }
                            VirtualKeyCode::O if !repeat => {
                                let on = scene.toggle_orbit();
                                log::info!("light orbit {}", if on { "on" } else { "off" });
                            }
                            _ => {
                                if let Some(event) = control_event(*key) {
                                    if !fires_on_edge_only(&event) || !repeat {
                                        state.apply(event);
                                    }
                                }
                            }
                        }
                    }
                    ElementState::Released => {
                        held.remove(key);
                    }
                },
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let frame_start = Instant::now();
                let delta_time = frame_start.duration_since(last_frame).as_secs_f32();
                last_frame = frame_start;

                camera.drive(movement_axis(&held), look_axis(&held), delta_time);
                params.advance(delta_time);

                let frame = match gpu.acquire() {
                    Ok(frame) => frame,
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("surface out of memory");
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    Err(error) => {
                        log::warn!("skipping frame: {error}");
                        return;
                    }
                };
                let frame_view = frame.texture.create_view(&Default::default());

                let mut encoder = gpu.device.create_command_encoder(&Default::default());

                scene.render(&gpu.queue, &mut encoder, &camera, delta_time);
                compositor.run(
                    &gpu.device,
                    &gpu.queue,
                    &mut encoder,
                    scene.target(),
                    &state,
                    &params,
                );
                present.blit(
                    &gpu.device,
                    &mut encoder,
                    scene.target().sampled_view(),
                    &frame_view,
                );

                gpu.queue.submit(std::iter::once(encoder.finish()));
                frame.present();

                title_timer += delta_time;
                title_frames += 1;
                if title_timer >= TITLE_REFRESH {
                    let fps = title_frames as f32 / title_timer;
                    window.set_title(&format!("{WINDOW_TITLE} - {fps:.0} fps"));
                    title_timer = 0.0;
                    title_frames = 0;
                }

                log::trace!("Frame took: {:?}", frame_start.elapsed());
            }
            Event::RedrawEventsCleared => {
                window.request_redraw();
            }
            _ => {}
        }
    })
}

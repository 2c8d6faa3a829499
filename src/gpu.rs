//! Instance, device and surface plumbing for the demo window.

use futures_lite::future;
use wgpu::{
    Backends, CompositeAlphaMode, Device, DeviceDescriptor, Instance, PowerPreference,
    PresentMode, Queue, RequestAdapterOptions, Surface, SurfaceConfiguration, SurfaceError,
    SurfaceTexture, TextureFormat, TextureUsages,
};
use winit::window::Window;

use crate::error::Error;

pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    surface: Surface,
    configuration: SurfaceConfiguration,
    supported_present_modes: Vec<PresentMode>,
    vsync: bool,
}

impl GpuContext {
    pub fn new(window: &Window) -> Result<Self, Error> {
        let instance = Instance::new(Backends::PRIMARY);
        let surface = unsafe { instance.create_surface(window) };

        let adapter = future::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(Error::AdapterNotFound)?;

        log::info!("Rendering with {}", adapter.get_info().name);

        let (device, queue) =
            future::block_on(adapter.request_device(&DeviceDescriptor::default(), None))?;

        let format = surface
            .get_supported_formats(&adapter)
            .first()
            .copied()
            .unwrap_or(TextureFormat::Bgra8UnormSrgb);
        let supported_present_modes = surface.get_supported_present_modes(&adapter);

        let size = window.inner_size();
        let configuration = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: PresentMode::Fifo,
            alpha_mode: CompositeAlphaMode::Auto,
        };
        surface.configure(&device, &configuration);

        Ok(Self {
            device,
            queue,
            surface,
            configuration,
            supported_present_modes,
            vsync: true,
        })
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.configuration.format
    }

    pub fn width(&self) -> u32 {
        self.configuration.width
    }

    pub fn height(&self) -> u32 {
        self.configuration.height
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    /// Ignores zero-sized updates; the surface cannot be configured empty.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        if self.configuration.width != width || self.configuration.height != height {
            self.configuration.width = width;
            self.configuration.height = height;
            self.surface.configure(&self.device, &self.configuration);
        }
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        let mode = if enabled {
            PresentMode::Fifo
        } else {
            match uncapped_mode(&self.supported_present_modes) {
                Some(mode) => mode,
                None => {
                    log::warn!("no uncapped present mode available, staying synchronized");
                    return;
                }
            }
        };

        self.vsync = enabled;
        if self.configuration.present_mode != mode {
            self.configuration.present_mode = mode;
            self.surface.configure(&self.device, &self.configuration);
        }
    }

    pub fn toggle_vsync(&mut self) -> bool {
        self.set_vsync(!self.vsync);
        self.vsync
    }

    /// Acquires the next swap-chain image, reconfiguring once if the surface
    /// was lost or outdated.
    pub fn acquire(&mut self) -> Result<SurfaceTexture, SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.configuration);
                self.surface.get_current_texture()
            }
            Err(error) => Err(error),
        }
    }
}

/// Fastest present mode that does not wait for vblank, if the surface has one.
fn uncapped_mode(supported: &[PresentMode]) -> Option<PresentMode> {
    [PresentMode::Immediate, PresentMode::Mailbox]
        .into_iter()
        .find(|mode| supported.contains(mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_prefers_immediate_over_mailbox() {
        let supported = vec![
            PresentMode::Fifo,
            PresentMode::Mailbox,
            PresentMode::Immediate,
        ];
        assert_eq!(uncapped_mode(&supported), Some(PresentMode::Immediate));
    }

    #[test]
    fn uncapped_falls_back_to_mailbox() {
        let supported = vec![PresentMode::Fifo, PresentMode::Mailbox];
        assert_eq!(uncapped_mode(&supported), Some(PresentMode::Mailbox));
    }

    #[test]
    fn fifo_only_surfaces_have_no_uncapped_mode() {
        let supported = vec![PresentMode::Fifo];
        assert_eq!(uncapped_mode(&supported), None);
    }
}

use uuid::Uuid;
use wgpu::{
    Device, Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
    TextureView,
};

use crate::error::ResourceCreationError;

/// Format of every offscreen color buffer. The demo stays in 8 bits per
/// channel end to end, like the swap chain it feeds.
pub const COLOR_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;

/// Identity of one [`ColorBuffer`] allocation. Reallocating (on resize)
/// produces a fresh id, so holding a stale id across a resize never aliases
/// the new texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(Uuid);

impl BufferId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Offscreen image sized to the viewport, writable as a render target and
/// readable as a texture.
///
/// The two views share the same backing memory; the compositor guarantees a
/// pass never has them bound as source and destination at the same time.
/// Contents are transient: nothing is carried from one frame into the next.
#[derive(Debug)]
pub struct ColorBuffer {
    id: BufferId,
    label: &'static str,
    target_view: TextureView,
    sampled_view: TextureView,
    size: Extent3d,
}

impl ColorBuffer {
    /// Creates a buffer of `width` by `height` texels, checking the size
    /// against the device limits first.
    pub fn allocate(
        device: &Device,
        label: &'static str,
        width: u32,
        height: u32,
    ) -> Result<Self, ResourceCreationError> {
        validate_extent(width, height, device.limits().max_texture_dimension_2d)?;

        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
        });

        // The views keep the texture alive; the handle itself is not needed
        // once both exist.
        let target_view = texture.create_view(&Default::default());
        let sampled_view = texture.create_view(&Default::default());

        Ok(Self {
            id: BufferId::new(),
            label,
            target_view,
            sampled_view,
            size,
        })
    }

    /// Recreates the buffer at the new size if it changed. There is no
    /// partial resize; the old texture is dropped wholesale.
    pub fn resize(
        &mut self,
        device: &Device,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceCreationError> {
        if self.size.width != width || self.size.height != height {
            *self = Self::allocate(device, self.label, width, height)?;
        }

        Ok(())
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> Extent3d {
        self.size
    }

    /// View for binding the buffer as the render destination of a pass.
    pub fn target_view(&self) -> &TextureView {
        &self.target_view
    }

    /// View for sampling the buffer as a pass input.
    pub fn sampled_view(&self) -> &TextureView {
        &self.sampled_view
    }
}

fn validate_extent(width: u32, height: u32, limit: u32) -> Result<(), ResourceCreationError> {
    if width == 0 || height == 0 || width > limit || height > limit {
        return Err(ResourceCreationError::TextureTooLarge {
            width,
            height,
            limit,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extents_within_the_limit_are_accepted() {
        assert!(validate_extent(1, 1, 8192).is_ok());
        assert!(validate_extent(8192, 8192, 8192).is_ok());
    }

    #[test]
    fn oversized_and_empty_extents_are_rejected() {
        assert!(validate_extent(8193, 100, 8192).is_err());
        assert!(validate_extent(100, 8193, 8192).is_err());
        assert!(validate_extent(0, 100, 8192).is_err());
        assert!(validate_extent(100, 0, 8192).is_err());
    }

    #[test]
    fn buffer_ids_are_unique() {
        assert_ne!(BufferId::new(), BufferId::new());
    }
}

//! Helpers shared by the integration tests.

use std::{borrow::Cow, sync::Arc};

use texcopy_core::{
    command::{ImageCopyBuffer, ImageCopyTexture},
    device::Device,
    resource::{Buffer, Texture},
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn device() -> Device {
    init_logger();
    Device::new(wgt::Limits::default())
}

pub fn extent(width: u32, height: u32, depth_or_array_layers: u32) -> wgt::Extent3d {
    wgt::Extent3d {
        width,
        height,
        depth_or_array_layers,
    }
}

pub fn layout(
    offset: wgt::BufferAddress,
    bytes_per_row: Option<u32>,
    rows_per_image: Option<u32>,
) -> wgt::ImageDataLayout {
    wgt::ImageDataLayout {
        offset,
        bytes_per_row,
        rows_per_image,
    }
}

pub fn buffer(device: &Device, size: wgt::BufferAddress) -> Arc<Buffer> {
    device
        .create_buffer(&wgt::BufferDescriptor {
            label: Some(Cow::Borrowed("buffer")),
            size,
            usage: wgt::BufferUsages::COPY_SRC | wgt::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
        .unwrap()
}

pub struct TextureBuilder {
    desc: wgt::TextureDescriptor<Option<Cow<'static, str>>>,
}

impl TextureBuilder {
    pub fn new(format: wgt::TextureFormat, size: wgt::Extent3d) -> Self {
        Self {
            desc: wgt::TextureDescriptor {
                label: Some(Cow::Borrowed("texture")),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgt::TextureDimension::D2,
                format,
                usage: wgt::TextureUsages::COPY_SRC | wgt::TextureUsages::COPY_DST,
            },
        }
    }

    pub fn dimension(mut self, dimension: wgt::TextureDimension) -> Self {
        self.desc.dimension = dimension;
        self
    }

    pub fn mip_level_count(mut self, mip_level_count: u32) -> Self {
        self.desc.mip_level_count = mip_level_count;
        self
    }

    pub fn sample_count(mut self, sample_count: u32) -> Self {
        self.desc.sample_count = sample_count;
        self
    }

    pub fn usage(mut self, usage: wgt::TextureUsages) -> Self {
        self.desc.usage = usage;
        self
    }

    pub fn build(self, device: &Device) -> Arc<Texture> {
        device.create_texture(&self.desc).unwrap()
    }
}

pub fn image_copy_buffer(buffer: &Arc<Buffer>, layout: wgt::ImageDataLayout) -> ImageCopyBuffer {
    wgt::ImageCopyBuffer {
        buffer: Arc::clone(buffer),
        layout,
    }
}

pub fn image_copy_texture(
    texture: &Arc<Texture>,
    mip_level: u32,
    origin: wgt::Origin3d,
    aspect: wgt::TextureAspect,
) -> ImageCopyTexture {
    wgt::ImageCopyTexture {
        texture: Arc::clone(texture),
        mip_level,
        origin,
        aspect,
    }
}

pub fn origin(x: u32, y: u32, z: u32) -> wgt::Origin3d {
    wgt::Origin3d { x, y, z }
}

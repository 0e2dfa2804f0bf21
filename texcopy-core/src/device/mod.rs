use std::sync::Arc;

use crate::{
    api_log,
    command::CommandEncoder,
    resource::{
        self, Buffer, CreateBufferError, CreateTextureError, Texture, TextureDimensionError,
        TextureErrorDimension,
    },
    resource_log, Label, LabelHelpers,
};

mod queue;

pub use queue::{Queue, QueueWriteError, StagedBufferWrite, StagedTextureWrite};

/// Sample counts a texture may be created with.
const SUPPORTED_SAMPLE_COUNTS: [u32; 2] = [1, 4];

/// Entry point for creating resources and recording copies.
///
/// A device only validates: resources are immutable descriptions, and
/// recorded copies are handed back to the caller for execution.
#[derive(Debug)]
pub struct Device {
    limits: wgt::Limits,
    queue: Queue,
}

impl Default for Device {
    fn default() -> Self {
        Self::new(wgt::Limits::default())
    }
}

impl Device {
    pub fn new(limits: wgt::Limits) -> Self {
        log::info!("Creating device with {:?}", limits);
        Self {
            limits,
            queue: Queue::new(),
        }
    }

    pub fn limits(&self) -> &wgt::Limits {
        &self.limits
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn create_buffer(
        &self,
        desc: &resource::BufferDescriptor,
    ) -> Result<Arc<Buffer>, CreateBufferError> {
        profiling::scope!("Device::create_buffer");
        api_log!("Device::create_buffer {:?}", desc.label.borrow_or_default());

        if desc.size > self.limits.max_buffer_size {
            return Err(CreateBufferError::MaxBufferSize {
                requested: desc.size,
                maximum: self.limits.max_buffer_size,
            });
        }

        if desc.usage.is_empty() || desc.usage.contains_invalid_bits() {
            return Err(CreateBufferError::InvalidUsage(desc.usage));
        }

        {
            use wgt::BufferUsages as Bu;
            let write_mismatch = desc.usage.contains(Bu::MAP_WRITE)
                && !(Bu::MAP_WRITE | Bu::COPY_SRC).contains(desc.usage);
            let read_mismatch = desc.usage.contains(Bu::MAP_READ)
                && !(Bu::MAP_READ | Bu::COPY_DST).contains(desc.usage);
            if write_mismatch || read_mismatch {
                return Err(CreateBufferError::UsageMismatch(desc.usage));
            }
        }

        if desc.mapped_at_creation && desc.size % wgt::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(CreateBufferError::UnalignedSize);
        }

        let buffer = Buffer {
            label: desc.label.borrow_or_default().to_string(),
            size: desc.size,
            usage: desc.usage,
        };
        resource_log!("Created buffer {:?} of {} bytes", buffer.label, buffer.size);
        Ok(Arc::new(buffer))
    }

    pub fn create_texture(
        &self,
        desc: &resource::TextureDescriptor,
    ) -> Result<Arc<Texture>, CreateTextureError> {
        profiling::scope!("Device::create_texture");
        api_log!("Device::create_texture {:?}", desc.label.borrow_or_default());

        if desc.usage.is_empty() || desc.usage.contains_invalid_bits() {
            return Err(CreateTextureError::InvalidUsage(desc.usage));
        }

        check_texture_dimension_size(desc.dimension, desc.size, desc.sample_count, &self.limits)?;

        if desc.dimension != wgt::TextureDimension::D2 {
            // Depth textures can only be 2D
            if desc.format.is_depth_stencil_format() {
                return Err(CreateTextureError::InvalidDepthDimension(
                    desc.dimension,
                    desc.format,
                ));
            }
            // Compressed textures can only be 2D
            if desc.format.is_compressed() {
                return Err(CreateTextureError::InvalidCompressedDimension(
                    desc.dimension,
                    desc.format,
                ));
            }
        }

        if desc.format.is_compressed() {
            let (block_width, block_height) = desc.format.block_dimensions();

            if desc.size.width % block_width != 0 {
                return Err(CreateTextureError::InvalidDimension(
                    TextureDimensionError::NotMultipleOfBlockWidth {
                        width: desc.size.width,
                        block_width,
                        format: desc.format,
                    },
                ));
            }

            if desc.size.height % block_height != 0 {
                return Err(CreateTextureError::InvalidDimension(
                    TextureDimensionError::NotMultipleOfBlockHeight {
                        height: desc.size.height,
                        block_height,
                        format: desc.format,
                    },
                ));
            }
        }

        if desc.sample_count > 1 {
            if desc.dimension != wgt::TextureDimension::D2 {
                return Err(CreateTextureError::InvalidMultisampledDimension(
                    desc.dimension,
                ));
            }

            if desc.mip_level_count != 1 {
                return Err(CreateTextureError::InvalidMipLevelCount {
                    requested: desc.mip_level_count,
                    maximum: 1,
                });
            }

            if desc.size.depth_or_array_layers != 1 {
                return Err(CreateTextureError::InvalidDimension(
                    TextureDimensionError::MultisampledDepthOrArrayLayer(
                        desc.size.depth_or_array_layers,
                    ),
                ));
            }

            if desc.format.is_compressed() {
                return Err(CreateTextureError::InvalidMultisampledFormat(desc.format));
            }
        }

        let mips = desc.mip_level_count;
        let max_levels_allowed = desc.size.max_mips(desc.dimension);
        if mips == 0 || mips > max_levels_allowed {
            return Err(CreateTextureError::InvalidMipLevelCount {
                requested: mips,
                maximum: max_levels_allowed,
            });
        }

        let texture = Texture {
            label: desc.label.borrow_or_default().to_string(),
            desc: desc.map_label(|_| ()),
        };
        resource_log!(
            "Created texture {:?} ({:?} {:?} {:?})",
            texture.label,
            desc.dimension,
            desc.format,
            desc.size
        );
        Ok(Arc::new(texture))
    }

    pub fn create_command_encoder(&self, label: Label) -> CommandEncoder {
        profiling::scope!("Device::create_command_encoder");
        api_log!("Device::create_command_encoder {:?}", label.borrow_or_default());

        CommandEncoder::new(&label)
    }
}

fn check_texture_dimension_size(
    dimension: wgt::TextureDimension,
    wgt::Extent3d {
        width,
        height,
        depth_or_array_layers,
    }: wgt::Extent3d,
    sample_count: u32,
    limits: &wgt::Limits,
) -> Result<(), TextureDimensionError> {
    use wgt::TextureDimension::*;
    use TextureDimensionError as Tde;
    use TextureErrorDimension as Ted;

    let extent_limits = match dimension {
        D1 => [limits.max_texture_dimension_1d, 1, 1],
        D2 => [
            limits.max_texture_dimension_2d,
            limits.max_texture_dimension_2d,
            limits.max_texture_array_layers,
        ],
        D3 => [
            limits.max_texture_dimension_3d,
            limits.max_texture_dimension_3d,
            limits.max_texture_dimension_3d,
        ],
    };

    for (dim, (given, limit)) in [Ted::X, Ted::Y, Ted::Z].into_iter().zip(
        [width, height, depth_or_array_layers]
            .into_iter()
            .zip(extent_limits),
    ) {
        if given == 0 {
            return Err(Tde::Zero(dim));
        }
        if given > limit {
            return Err(Tde::LimitExceeded { dim, given, limit });
        }
    }
    if !SUPPORTED_SAMPLE_COUNTS.contains(&sample_count) {
        return Err(Tde::InvalidSampleCount(sample_count));
    }

    Ok(())
}

use std::sync::Arc;

use smallvec::SmallVec;
use thiserror::Error;
use wgt::{math::align_to, BufferAddress, BufferUsages, Extent3d, TextureUsages};

use crate::{
    api_log,
    aspect::CopyKind,
    command::{
        validate_buffer_texture_copy, BufferCopy, BufferTextureCopy, CopySide, ImageCopyTexture,
        TransferError,
    },
    resource::{Buffer, Texture},
};

#[derive(Clone, Debug, Error)]
pub enum QueueWriteError {
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// A validated buffer write.
#[derive(Clone, Debug)]
pub struct StagedBufferWrite {
    pub buffer: Arc<Buffer>,
    /// Copy out of `data`, which starts at offset 0.
    pub region: BufferCopy,
    pub data: Vec<u8>,
}

/// A validated texture write with its data repacked for a buffer copy.
#[derive(Clone, Debug)]
pub struct StagedTextureWrite {
    pub texture: Arc<Texture>,
    /// Staged texel data. Rows are padded to
    /// [`wgt::COPY_BYTES_PER_ROW_ALIGNMENT`] and images are tightly packed.
    pub data: Vec<u8>,
    pub bytes_per_row: u32,
    pub rows_per_image: u32,
    /// One region per array layer, reading from `data`.
    pub regions: SmallVec<[BufferTextureCopy; 1]>,
}

/// Validates and stages writes of CPU data into resources.
#[derive(Debug)]
pub struct Queue {
    _private: (),
}

impl Queue {
    pub(super) fn new() -> Self {
        Self { _private: () }
    }

    pub fn write_buffer(
        &self,
        buffer: &Arc<Buffer>,
        buffer_offset: BufferAddress,
        data: &[u8],
    ) -> Result<Option<StagedBufferWrite>, QueueWriteError> {
        profiling::scope!("Queue::write_buffer");
        api_log!(
            "Queue::write_buffer {:?} {buffer_offset}..+{}",
            buffer.label(),
            data.len()
        );

        buffer
            .check_usage(BufferUsages::COPY_DST)
            .map_err(TransferError::MissingBufferUsage)?;

        let data_size =
            BufferAddress::try_from(data.len()).map_err(|_| TransferError::SizeOverflow)?;
        if data_size % wgt::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(TransferError::UnalignedCopySize(data_size).into());
        }
        if buffer_offset % wgt::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(TransferError::UnalignedBufferOffset(buffer_offset).into());
        }
        let end_offset = buffer_offset
            .checked_add(data_size)
            .ok_or(TransferError::SizeOverflow)?;
        if end_offset > buffer.size() {
            return Err(TransferError::BufferOverrun {
                start_offset: buffer_offset,
                end_offset,
                buffer_size: buffer.size(),
                side: CopySide::Destination,
            }
            .into());
        }

        let size = match wgt::BufferSize::new(data_size) {
            Some(size) => size,
            None => {
                log::trace!("Ignoring write_buffer of size 0");
                return Ok(None);
            }
        };

        Ok(Some(StagedBufferWrite {
            buffer: Arc::clone(buffer),
            region: BufferCopy {
                src_offset: 0,
                dst_offset: buffer_offset,
                size,
            },
            data: data.to_vec(),
        }))
    }

    /// Validate a write of `data` into a texture and repack it row by row.
    ///
    /// `data_layout` is validated like the source of a buffer-to-texture
    /// copy out of a buffer of `data.len()` bytes, except that neither the
    /// offset nor `bytes_per_row` have to be aligned.
    pub fn write_texture(
        &self,
        destination: &ImageCopyTexture,
        data: &[u8],
        data_layout: &wgt::ImageDataLayout,
        size: &Extent3d,
    ) -> Result<Option<StagedTextureWrite>, QueueWriteError> {
        profiling::scope!("Queue::write_texture");
        api_log!(
            "Queue::write_texture {:?} {size:?}",
            destination.texture.label()
        );

        let dst = &destination.texture;
        dst.check_usage(TextureUsages::COPY_DST)
            .map_err(TransferError::MissingTextureUsage)?;

        let data_size =
            BufferAddress::try_from(data.len()).map_err(|_| TransferError::SizeOverflow)?;
        let validated = match validate_buffer_texture_copy(
            data_layout,
            data_size,
            destination,
            size,
            CopyKind::BufferToTexture,
            false,
        )? {
            Some(validated) => validated,
            None => {
                log::trace!("Ignoring write_texture of size 0");
                return Ok(None);
            }
        };
        let info = &validated.info;

        let stage_bytes_per_row = u32::try_from(align_to(
            info.row_bytes_dense,
            u64::from(wgt::COPY_BYTES_PER_ROW_ALIGNMENT),
        ))
        .map_err(|_| TransferError::SizeOverflow)?;
        let stage_rows_per_image = info.height_blocks;
        let stage_bytes_per_image =
            u64::from(stage_bytes_per_row) * u64::from(stage_rows_per_image);
        let stage_size = stage_bytes_per_image
            .checked_mul(u64::from(info.depth_or_array_layers))
            .ok_or(TransferError::SizeOverflow)?;

        let to_usize = |value: u64| usize::try_from(value).map_err(|_| TransferError::SizeOverflow);

        let mut stage = vec![0u8; to_usize(stage_size)?];
        {
            profiling::scope!("copy");
            let row_bytes = to_usize(info.row_bytes_dense)?;
            if u64::from(stage_bytes_per_row) == info.row_stride_bytes
                && stage_bytes_per_image == info.image_stride_bytes
            {
                // Already laid out like the staging data.
                let start = to_usize(info.offset)?;
                let len = to_usize(info.bytes_in_copy)?;
                stage[..len].copy_from_slice(&data[start..start + len]);
            } else {
                for image in 0..u64::from(info.depth_or_array_layers) {
                    for row in 0..u64::from(info.height_blocks) {
                        let src_offset = to_usize(
                            info.offset
                                + image * info.image_stride_bytes
                                + row * info.row_stride_bytes,
                        )?;
                        let dst_offset = to_usize(
                            image * stage_bytes_per_image + row * u64::from(stage_bytes_per_row),
                        )?;
                        stage[dst_offset..dst_offset + row_bytes]
                            .copy_from_slice(&data[src_offset..src_offset + row_bytes]);
                    }
                }
            }
        }

        let stage_layout = wgt::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(stage_bytes_per_row),
            rows_per_image: Some(stage_rows_per_image),
        };
        let regions = validated.regions(stage_layout, stage_bytes_per_image);

        Ok(Some(StagedTextureWrite {
            texture: Arc::clone(dst),
            data: stage,
            bytes_per_row: stage_bytes_per_row,
            rows_per_image: stage_rows_per_image,
            regions,
        }))
    }
}

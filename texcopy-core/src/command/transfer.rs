use std::sync::Arc;

use smallvec::SmallVec;
use thiserror::Error;
use wgt::{BufferAddress, BufferUsages, Extent3d, TextureUsages};

use crate::{
    aspect::{select_copy_aspect, CopyKind, FormatAspects},
    layout::{BufferTextureCopyInfo, LayoutError},
    resource::{
        Buffer, MissingBufferUsageError, MissingTextureUsageError, Texture, TextureErrorDimension,
    },
};

pub type ImageCopyBuffer = wgt::ImageCopyBuffer<Arc<Buffer>>;
pub type ImageCopyTexture = wgt::ImageCopyTexture<Arc<Texture>>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CopySide {
    Source,
    Destination,
}

/// Error encountered while attempting a data transfer.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    #[error("Source and destination cannot be the same buffer")]
    SameSourceDestinationBuffer,
    #[error(transparent)]
    MissingBufferUsage(#[from] MissingBufferUsageError),
    #[error(transparent)]
    MissingTextureUsage(#[from] MissingTextureUsageError),
    #[error("Copy of {start_offset}..{end_offset} would end up overrunning the bounds of the {side:?} buffer of size {buffer_size}")]
    BufferOverrun {
        start_offset: BufferAddress,
        end_offset: BufferAddress,
        buffer_size: BufferAddress,
        side: CopySide,
    },
    #[error("Copy of {dimension:?} {start_offset}..{end_offset} would end up overrunning the bounds of the {side:?} texture of {dimension:?} size {texture_size}")]
    TextureOverrun {
        start_offset: u32,
        end_offset: u32,
        texture_size: u32,
        dimension: TextureErrorDimension,
        side: CopySide,
    },
    #[error("Partial copy of {start_offset}..{end_offset} on {dimension:?} dimension with size {texture_size} \
             is not supported for the {side:?} texture format {format:?} with {sample_count} samples")]
    UnsupportedPartialTransfer {
        format: wgt::TextureFormat,
        sample_count: u32,
        start_offset: u32,
        end_offset: u32,
        texture_size: u32,
        dimension: TextureErrorDimension,
        side: CopySide,
    },
    #[error("Copying layers {src_origin_z}..{} to layers {dst_origin_z}..{} of mip level {mip_level} of the same texture is not allowed",
            u64::from(*.src_origin_z) + u64::from(*.array_layer_count),
            u64::from(*.dst_origin_z) + u64::from(*.array_layer_count))]
    InvalidCopyWithinSameTexture {
        mip_level: u32,
        src_origin_z: u32,
        dst_origin_z: u32,
        array_layer_count: u32,
    },
    #[error("Unable to select texture aspect {aspect:?} from format {format:?}")]
    InvalidTextureAspect {
        format: wgt::TextureFormat,
        aspect: wgt::TextureAspect,
    },
    #[error("Unable to select texture mip level {level} out of {total}")]
    InvalidTextureMipLevel { level: u32, total: u32 },
    #[error("Buffer offset {0} is not aligned to block size or `COPY_BUFFER_ALIGNMENT`")]
    UnalignedBufferOffset(BufferAddress),
    #[error("Copy size {0} does not respect `COPY_BUFFER_ALIGNMENT`")]
    UnalignedCopySize(BufferAddress),
    #[error("Copy width is not a multiple of block width")]
    UnalignedCopyWidth,
    #[error("Copy height is not a multiple of block height")]
    UnalignedCopyHeight,
    #[error("Copy origin's x component is not a multiple of block width")]
    UnalignedCopyOriginX,
    #[error("Copy origin's y component is not a multiple of block height")]
    UnalignedCopyOriginY,
    #[error("Bytes per row does not respect `COPY_BYTES_PER_ROW_ALIGNMENT`")]
    UnalignedBytesPerRow,
    #[error("Number of bytes per row needs to be specified since more than one row is copied")]
    UnspecifiedBytesPerRow,
    #[error("Number of rows per image needs to be specified since more than one image is copied")]
    UnspecifiedRowsPerImage,
    #[error("Number of bytes per row is less than the number of bytes in a complete row")]
    InvalidBytesPerRow,
    #[error("Number of rows per image is invalid")]
    InvalidRowsPerImage,
    #[error("Overflow while computing the size of the copy")]
    SizeOverflow,
    #[error("Copy source aspects must refer to all aspects of the source texture format")]
    CopySrcMissingAspects,
    #[error(
        "Copy destination aspects must refer to all aspects of the destination texture format"
    )]
    CopyDstMissingAspects,
    #[error("Copy aspect must refer to a single aspect of texture format")]
    CopyAspectNotOne,
    #[error("Copying from textures with format {0:?} is forbidden")]
    CopyFromForbiddenTextureFormat(wgt::TextureFormat),
    #[error("Copying from textures with format {format:?} and aspect {aspect:?} is forbidden")]
    CopyFromForbiddenTextureFormatAspect {
        format: wgt::TextureFormat,
        aspect: wgt::TextureAspect,
    },
    #[error("Copying to textures with format {0:?} is forbidden")]
    CopyToForbiddenTextureFormat(wgt::TextureFormat),
    #[error("Copying to textures with format {format:?} and aspect {aspect:?} is forbidden")]
    CopyToForbiddenTextureFormatAspect {
        format: wgt::TextureFormat,
        aspect: wgt::TextureAspect,
    },
    #[error(
        "Source format ({src_format:?}) and destination format ({dst_format:?}) are not copy-compatible (they may only differ in srgb-ness)"
    )]
    TextureFormatsNotCopyCompatible {
        src_format: wgt::TextureFormat,
        dst_format: wgt::TextureFormat,
    },
    #[error("Texture sample count must be 1 to be copied to or from a buffer, got {sample_count}")]
    InvalidSampleCount { sample_count: u32 },
    #[error(
        "Source sample count ({src_sample_count:?}) and destination sample count ({dst_sample_count:?}) are not equal"
    )]
    SampleCountNotEqual {
        src_sample_count: u32,
        dst_sample_count: u32,
    },
}

/// Coarse classification of a [`TransferError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CopyErrorKind {
    /// A stride was left unspecified while it is needed, or is too small.
    InvalidStride,
    /// The buffer does not hold the bytes the copy spans.
    BufferTooSmall,
    /// Computing the extent of the copy overflowed.
    ArithmeticOverflow,
    /// The texture region lies outside the mip level or layers, or the mip
    /// level does not exist.
    OutOfBounds,
    /// The requested aspect is not present or not copyable in this direction.
    UnsupportedAspect,
    /// The copy covers only part of a subresource that has to be copied whole.
    PartialAspectCopyNotAllowed,
    /// An offset, size or stride is not aligned.
    Alignment,
    /// A resource lacks the usage the copy needs, or is used on both sides.
    Usage,
    /// The formats or sample counts of the two textures do not match.
    Format,
}

impl TransferError {
    pub fn kind(&self) -> CopyErrorKind {
        match *self {
            Self::UnspecifiedBytesPerRow
            | Self::UnspecifiedRowsPerImage
            | Self::InvalidBytesPerRow
            | Self::InvalidRowsPerImage => CopyErrorKind::InvalidStride,
            Self::BufferOverrun { .. } => CopyErrorKind::BufferTooSmall,
            Self::SizeOverflow => CopyErrorKind::ArithmeticOverflow,
            Self::TextureOverrun { .. }
            | Self::InvalidTextureMipLevel { .. }
            | Self::InvalidCopyWithinSameTexture { .. } => CopyErrorKind::OutOfBounds,
            Self::InvalidTextureAspect { .. }
            | Self::CopyAspectNotOne
            | Self::CopySrcMissingAspects
            | Self::CopyDstMissingAspects
            | Self::CopyFromForbiddenTextureFormat(..)
            | Self::CopyFromForbiddenTextureFormatAspect { .. }
            | Self::CopyToForbiddenTextureFormat(..)
            | Self::CopyToForbiddenTextureFormatAspect { .. } => CopyErrorKind::UnsupportedAspect,
            Self::UnsupportedPartialTransfer { .. } => CopyErrorKind::PartialAspectCopyNotAllowed,
            Self::UnalignedBufferOffset(..)
            | Self::UnalignedCopySize(..)
            | Self::UnalignedCopyWidth
            | Self::UnalignedCopyHeight
            | Self::UnalignedCopyOriginX
            | Self::UnalignedCopyOriginY
            | Self::UnalignedBytesPerRow => CopyErrorKind::Alignment,
            Self::SameSourceDestinationBuffer
            | Self::MissingBufferUsage(..)
            | Self::MissingTextureUsage(..) => CopyErrorKind::Usage,
            Self::TextureFormatsNotCopyCompatible { .. }
            | Self::InvalidSampleCount { .. }
            | Self::SampleCountNotEqual { .. } => CopyErrorKind::Format,
        }
    }
}

impl From<LayoutError> for TransferError {
    fn from(error: LayoutError) -> Self {
        match error {
            LayoutError::UncopyableAspect { format, aspect } => {
                Self::InvalidTextureAspect { format, aspect }
            }
            LayoutError::UnspecifiedBytesPerRow => Self::UnspecifiedBytesPerRow,
            LayoutError::UnspecifiedRowsPerImage => Self::UnspecifiedRowsPerImage,
            LayoutError::InvalidBytesPerRow { .. } => Self::InvalidBytesPerRow,
            LayoutError::InvalidRowsPerImage { .. } => Self::InvalidRowsPerImage,
            LayoutError::SizeOverflow => Self::SizeOverflow,
        }
    }
}

/// Size of a copy region in texels.
///
/// `depth` is 1 for array textures: their layers are separate regions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CopyExtent {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// Location of one subresource region of a copy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextureCopyBase {
    pub mip_level: u32,
    pub array_layer: u32,
    /// Origin within the selected array layer and mip level.
    pub origin: wgt::Origin3d,
    pub aspect: FormatAspects,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BufferCopy {
    pub src_offset: BufferAddress,
    pub dst_offset: BufferAddress,
    pub size: wgt::BufferSize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BufferTextureCopy {
    pub buffer_layout: wgt::ImageDataLayout,
    pub texture_base: TextureCopyBase,
    pub size: CopyExtent,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextureCopy {
    pub src_base: TextureCopyBase,
    pub dst_base: TextureCopyBase,
    pub size: CopyExtent,
}

/// A validated, non-empty copy.
#[derive(Clone, Debug)]
pub enum TransferCommand {
    CopyBufferToBuffer {
        src: Arc<Buffer>,
        dst: Arc<Buffer>,
        region: BufferCopy,
    },
    CopyBufferToTexture {
        src: Arc<Buffer>,
        dst: Arc<Texture>,
        regions: SmallVec<[BufferTextureCopy; 1]>,
    },
    CopyTextureToBuffer {
        src: Arc<Texture>,
        dst: Arc<Buffer>,
        regions: SmallVec<[BufferTextureCopy; 1]>,
    },
    CopyTextureToTexture {
        src: Arc<Texture>,
        dst: Arc<Texture>,
        regions: SmallVec<[TextureCopy; 2]>,
    },
}

/// The first subresource region a copy touches.
pub(crate) fn extract_texture_base<T>(
    copy_texture: &wgt::ImageCopyTexture<T>,
    dimension: wgt::TextureDimension,
    aspect: FormatAspects,
) -> TextureCopyBase {
    let (array_layer, origin_z) = match dimension {
        wgt::TextureDimension::D1 => (0, 0),
        wgt::TextureDimension::D2 => (copy_texture.origin.z, 0),
        wgt::TextureDimension::D3 => (0, copy_texture.origin.z),
    };
    TextureCopyBase {
        mip_level: copy_texture.mip_level,
        // incremented per copied layer
        array_layer,
        origin: wgt::Origin3d {
            x: copy_texture.origin.x,
            y: copy_texture.origin.y,
            z: origin_z,
        },
        aspect,
    }
}

/// WebGPU's [validating linear texture data][vltd] algorithm.
///
/// If successful, returns a tuple `(bytes, stride)`, where:
/// - `bytes` is the number of buffer bytes required for this copy, and
/// - `stride` number of bytes between array layers.
///
/// [vltd]: https://gpuweb.github.io/gpuweb/#abstract-opdef-validating-linear-texture-data
pub fn validate_linear_texture_data(
    layout: &wgt::ImageDataLayout,
    format: wgt::TextureFormat,
    aspect: wgt::TextureAspect,
    buffer_size: BufferAddress,
    buffer_side: CopySide,
    copy_size: &Extent3d,
) -> Result<(BufferAddress, BufferAddress), TransferError> {
    let info =
        linear_texture_data_info(layout, format, aspect, buffer_size, buffer_side, copy_size)?;
    Ok((info.bytes_in_copy, info.image_stride_bytes))
}

pub(crate) fn linear_texture_data_info(
    layout: &wgt::ImageDataLayout,
    format: wgt::TextureFormat,
    aspect: wgt::TextureAspect,
    buffer_size: BufferAddress,
    buffer_side: CopySide,
    copy_size: &Extent3d,
) -> Result<BufferTextureCopyInfo, TransferError> {
    let info = BufferTextureCopyInfo::new(format, aspect, copy_size, layout)?;

    if info.copy_width % info.block_width_texels != 0 {
        return Err(TransferError::UnalignedCopyWidth);
    }
    if info.copy_height % info.block_height_texels != 0 {
        return Err(TransferError::UnalignedCopyHeight);
    }

    let end_offset = info
        .offset
        .checked_add(info.bytes_in_copy)
        .ok_or(TransferError::SizeOverflow)?;
    if end_offset > buffer_size {
        return Err(TransferError::BufferOverrun {
            start_offset: info.offset,
            end_offset,
            buffer_size,
            side: buffer_side,
        });
    }

    Ok(info)
}

/// Validate the extent and alignment of a texture copy.
///
/// This mostly follows the [validating GPUImageCopyTexture][vict] and
/// [validating texture copy range][vtcr] algorithms. The mip level has to
/// exist even when nothing is copied, and an empty range may touch the far
/// edge of the mip level.
///
/// Returns the copy extent and the layer count.
///
/// [vict]: https://gpuweb.github.io/gpuweb/#abstract-opdef-validating-gpuimagecopytexture
/// [vtcr]: https://gpuweb.github.io/gpuweb/#abstract-opdef-validating-texture-copy-range
pub fn validate_texture_copy_range<T>(
    copy_texture: &wgt::ImageCopyTexture<T>,
    desc: &wgt::TextureDescriptor<()>,
    texture_side: CopySide,
    copy_size: &Extent3d,
) -> Result<(CopyExtent, u32), TransferError> {
    let (block_width, block_height) = desc.format.block_dimensions();

    let extent_virtual = desc.mip_level_size(copy_texture.mip_level).ok_or(
        TransferError::InvalidTextureMipLevel {
            level: copy_texture.mip_level,
            total: desc.mip_level_count,
        },
    )?;
    // physical size can be larger than the virtual
    let extent = extent_virtual.physical_size(desc.format);

    let check_dimension = |dimension: TextureErrorDimension,
                           start_offset: u32,
                           size: u32,
                           texture_size: u32|
     -> Result<(), TransferError> {
        // Avoid underflow in the subtraction by checking start_offset against
        // texture_size first.
        if start_offset > texture_size || texture_size - start_offset < size {
            Err(TransferError::TextureOverrun {
                start_offset,
                end_offset: start_offset.wrapping_add(size),
                texture_size,
                dimension,
                side: texture_side,
            })
        } else {
            Ok(())
        }
    };

    check_dimension(
        TextureErrorDimension::X,
        copy_texture.origin.x,
        copy_size.width,
        extent.width,
    )?;
    check_dimension(
        TextureErrorDimension::Y,
        copy_texture.origin.y,
        copy_size.height,
        extent.height,
    )?;
    check_dimension(
        TextureErrorDimension::Z,
        copy_texture.origin.z,
        copy_size.depth_or_array_layers,
        extent.depth_or_array_layers,
    )?;

    if copy_texture.origin.x % block_width != 0 {
        return Err(TransferError::UnalignedCopyOriginX);
    }
    if copy_texture.origin.y % block_height != 0 {
        return Err(TransferError::UnalignedCopyOriginY);
    }
    if copy_size.width % block_width != 0 {
        return Err(TransferError::UnalignedCopyWidth);
    }
    if copy_size.height % block_height != 0 {
        return Err(TransferError::UnalignedCopyHeight);
    }

    let (depth, array_layer_count) = match desc.dimension {
        wgt::TextureDimension::D1 => (1, 1),
        wgt::TextureDimension::D2 => (1, copy_size.depth_or_array_layers),
        wgt::TextureDimension::D3 => (copy_size.depth_or_array_layers, 1),
    };

    let copy_extent = CopyExtent {
        width: copy_size.width,
        height: copy_size.height,
        depth,
    };
    Ok((copy_extent, array_layer_count))
}

/// Reject copies that cover only part of a subresource that can only be
/// copied whole.
///
/// Depth/stencil formats and multisampled textures must be copied over the
/// full width and height of the mip level. A subset of layers is fine.
pub fn validate_subresource_coverage<T>(
    copy_texture: &wgt::ImageCopyTexture<T>,
    desc: &wgt::TextureDescriptor<()>,
    texture_side: CopySide,
    copy_size: &Extent3d,
) -> Result<(), TransferError> {
    if !desc.format.is_depth_stencil_format() && desc.sample_count <= 1 {
        return Ok(());
    }

    let extent = desc
        .mip_level_size(copy_texture.mip_level)
        .ok_or(TransferError::InvalidTextureMipLevel {
            level: copy_texture.mip_level,
            total: desc.mip_level_count,
        })?
        .physical_size(desc.format);

    let check_dimension = |dimension: TextureErrorDimension,
                           start_offset: u32,
                           size: u32,
                           texture_size: u32|
     -> Result<(), TransferError> {
        if start_offset != 0 || size != texture_size {
            Err(TransferError::UnsupportedPartialTransfer {
                format: desc.format,
                sample_count: desc.sample_count,
                start_offset,
                end_offset: start_offset.wrapping_add(size),
                texture_size,
                dimension,
                side: texture_side,
            })
        } else {
            Ok(())
        }
    };

    check_dimension(
        TextureErrorDimension::X,
        copy_texture.origin.x,
        copy_size.width,
        extent.width,
    )?;
    check_dimension(
        TextureErrorDimension::Y,
        copy_texture.origin.y,
        copy_size.height,
        extent.height,
    )
}

/// Buffer-side checks of a texture/buffer copy.
///
/// The texture must not be multisampled, and if `aligned` is true the
/// buffer offset must be a multiple of the block size (4 for depth/stencil
/// formats) and `bytes_per_row`, whenever given, a multiple of
/// [`wgt::COPY_BYTES_PER_ROW_ALIGNMENT`].
pub fn validate_texture_buffer_copy<T>(
    copy_texture: &wgt::ImageCopyTexture<T>,
    desc: &wgt::TextureDescriptor<()>,
    layout: &wgt::ImageDataLayout,
    aligned: bool,
) -> Result<(), TransferError> {
    if desc.sample_count != 1 {
        return Err(TransferError::InvalidSampleCount {
            sample_count: desc.sample_count,
        });
    }

    if !aligned {
        return Ok(());
    }

    let offset_alignment = if desc.format.is_depth_stencil_format() {
        4
    } else {
        desc.format
            .block_copy_size(Some(copy_texture.aspect))
            .ok_or(TransferError::InvalidTextureAspect {
                format: desc.format,
                aspect: copy_texture.aspect,
            })?
    };

    if layout.offset % u64::from(offset_alignment) != 0 {
        return Err(TransferError::UnalignedBufferOffset(layout.offset));
    }

    if let Some(bytes_per_row) = layout.bytes_per_row {
        if bytes_per_row % wgt::COPY_BYTES_PER_ROW_ALIGNMENT != 0 {
            return Err(TransferError::UnalignedBytesPerRow);
        }
    }

    Ok(())
}

/// Validate a copy within the same texture.
///
/// The source and destination subresources must not overlap. Assumes both
/// ranges already passed [`validate_texture_copy_range`].
pub(crate) fn validate_copy_within_same_texture<T>(
    src: &wgt::ImageCopyTexture<T>,
    dst: &wgt::ImageCopyTexture<T>,
    dimension: wgt::TextureDimension,
    array_layer_count: u32,
) -> Result<(), TransferError> {
    if src.mip_level != dst.mip_level {
        return Ok(());
    }

    // Only array layers are separate subresources.
    if dimension == wgt::TextureDimension::D2 {
        let src_end = u64::from(src.origin.z) + u64::from(array_layer_count);
        let dst_end = u64::from(dst.origin.z) + u64::from(array_layer_count);
        if u64::from(src.origin.z) >= dst_end || u64::from(dst.origin.z) >= src_end {
            return Ok(());
        }
    }

    Err(TransferError::InvalidCopyWithinSameTexture {
        mip_level: src.mip_level,
        src_origin_z: src.origin.z,
        dst_origin_z: dst.origin.z,
        array_layer_count,
    })
}

/// Outcome of validating one side of a buffer/texture transfer.
pub(crate) struct ValidatedBufferTextureCopy {
    pub(crate) texture_base: TextureCopyBase,
    pub(crate) copy_extent: CopyExtent,
    pub(crate) array_layer_count: u32,
    pub(crate) info: BufferTextureCopyInfo,
}

impl ValidatedBufferTextureCopy {
    /// One region per array layer, reading the buffer through `buffer_layout`.
    pub(crate) fn regions(
        &self,
        buffer_layout: wgt::ImageDataLayout,
        bytes_per_array_layer: BufferAddress,
    ) -> SmallVec<[BufferTextureCopy; 1]> {
        (0..self.array_layer_count)
            .map(|rel_array_layer| {
                let mut texture_base = self.texture_base.clone();
                texture_base.array_layer += rel_array_layer;
                let mut buffer_layout = buffer_layout;
                buffer_layout.offset += u64::from(rel_array_layer) * bytes_per_array_layer;
                BufferTextureCopy {
                    buffer_layout,
                    texture_base,
                    size: self.copy_extent,
                }
            })
            .collect()
    }
}

/// Shared validation of buffer-to-texture and texture-to-buffer copies.
///
/// Usage flags are checked by the caller. Returns `None` for an empty copy
/// after it passed validation.
pub(crate) fn validate_buffer_texture_copy(
    buffer_layout: &wgt::ImageDataLayout,
    buffer_size: BufferAddress,
    copy_texture: &ImageCopyTexture,
    copy_size: &Extent3d,
    kind: CopyKind,
    aligned: bool,
) -> Result<Option<ValidatedBufferTextureCopy>, TransferError> {
    let texture = &copy_texture.texture;
    let (buffer_side, texture_side) = match kind {
        CopyKind::TextureToBuffer => (CopySide::Destination, CopySide::Source),
        _ => (CopySide::Source, CopySide::Destination),
    };

    let (copy_extent, array_layer_count) =
        validate_texture_copy_range(copy_texture, &texture.desc, texture_side, copy_size)?;

    let aspect = select_copy_aspect(texture.desc.format, copy_texture.aspect, kind)?;

    validate_subresource_coverage(copy_texture, &texture.desc, texture_side, copy_size)?;

    validate_texture_buffer_copy(copy_texture, &texture.desc, buffer_layout, aligned)?;

    let info = linear_texture_data_info(
        buffer_layout,
        texture.desc.format,
        copy_texture.aspect,
        buffer_size,
        buffer_side,
        copy_size,
    )?;

    if copy_size.is_empty() {
        return Ok(None);
    }

    let texture_base = extract_texture_base(copy_texture, texture.desc.dimension, aspect);

    Ok(Some(ValidatedBufferTextureCopy {
        texture_base,
        copy_extent,
        array_layer_count,
        info,
    }))
}

pub(crate) fn copy_buffer_to_buffer(
    source: &Arc<Buffer>,
    source_offset: BufferAddress,
    destination: &Arc<Buffer>,
    destination_offset: BufferAddress,
    size: BufferAddress,
) -> Result<Option<TransferCommand>, TransferError> {
    if Arc::ptr_eq(source, destination) {
        return Err(TransferError::SameSourceDestinationBuffer);
    }

    source.check_usage(BufferUsages::COPY_SRC)?;
    destination.check_usage(BufferUsages::COPY_DST)?;

    if size % wgt::COPY_BUFFER_ALIGNMENT != 0 {
        return Err(TransferError::UnalignedCopySize(size));
    }
    if source_offset % wgt::COPY_BUFFER_ALIGNMENT != 0 {
        return Err(TransferError::UnalignedBufferOffset(source_offset));
    }
    if destination_offset % wgt::COPY_BUFFER_ALIGNMENT != 0 {
        return Err(TransferError::UnalignedBufferOffset(destination_offset));
    }

    let source_end_offset = source_offset
        .checked_add(size)
        .ok_or(TransferError::SizeOverflow)?;
    let destination_end_offset = destination_offset
        .checked_add(size)
        .ok_or(TransferError::SizeOverflow)?;
    if source_end_offset > source.size() {
        return Err(TransferError::BufferOverrun {
            start_offset: source_offset,
            end_offset: source_end_offset,
            buffer_size: source.size(),
            side: CopySide::Source,
        });
    }
    if destination_end_offset > destination.size() {
        return Err(TransferError::BufferOverrun {
            start_offset: destination_offset,
            end_offset: destination_end_offset,
            buffer_size: destination.size(),
            side: CopySide::Destination,
        });
    }

    let size = match wgt::BufferSize::new(size) {
        Some(size) => size,
        None => {
            log::trace!("Ignoring copy_buffer_to_buffer of size 0");
            return Ok(None);
        }
    };

    Ok(Some(TransferCommand::CopyBufferToBuffer {
        src: Arc::clone(source),
        dst: Arc::clone(destination),
        region: BufferCopy {
            src_offset: source_offset,
            dst_offset: destination_offset,
            size,
        },
    }))
}

pub(crate) fn copy_buffer_to_texture(
    source: &ImageCopyBuffer,
    destination: &ImageCopyTexture,
    copy_size: &Extent3d,
) -> Result<Option<TransferCommand>, TransferError> {
    let src_buffer = &source.buffer;
    let dst_texture = &destination.texture;

    src_buffer.check_usage(BufferUsages::COPY_SRC)?;
    dst_texture.check_usage(TextureUsages::COPY_DST)?;

    let validated = match validate_buffer_texture_copy(
        &source.layout,
        src_buffer.size(),
        destination,
        copy_size,
        CopyKind::BufferToTexture,
        true, // alignment required for buffer offset
    )? {
        Some(validated) => validated,
        None => {
            log::trace!("Ignoring copy_buffer_to_texture of size 0");
            return Ok(None);
        }
    };

    let regions = validated.regions(source.layout, validated.info.image_stride_bytes);
    Ok(Some(TransferCommand::CopyBufferToTexture {
        src: Arc::clone(src_buffer),
        dst: Arc::clone(dst_texture),
        regions,
    }))
}

pub(crate) fn copy_texture_to_buffer(
    source: &ImageCopyTexture,
    destination: &ImageCopyBuffer,
    copy_size: &Extent3d,
) -> Result<Option<TransferCommand>, TransferError> {
    let src_texture = &source.texture;
    let dst_buffer = &destination.buffer;

    src_texture.check_usage(TextureUsages::COPY_SRC)?;
    dst_buffer.check_usage(BufferUsages::COPY_DST)?;

    let validated = match validate_buffer_texture_copy(
        &destination.layout,
        dst_buffer.size(),
        source,
        copy_size,
        CopyKind::TextureToBuffer,
        true, // alignment required for buffer offset
    )? {
        Some(validated) => validated,
        None => {
            log::trace!("Ignoring copy_texture_to_buffer of size 0");
            return Ok(None);
        }
    };

    let regions = validated.regions(destination.layout, validated.info.image_stride_bytes);
    Ok(Some(TransferCommand::CopyTextureToBuffer {
        src: Arc::clone(src_texture),
        dst: Arc::clone(dst_buffer),
        regions,
    }))
}

pub(crate) fn copy_texture_to_texture(
    source: &ImageCopyTexture,
    destination: &ImageCopyTexture,
    copy_size: &Extent3d,
) -> Result<Option<TransferCommand>, TransferError> {
    let src_texture = &source.texture;
    let dst_texture = &destination.texture;

    src_texture.check_usage(TextureUsages::COPY_SRC)?;
    dst_texture.check_usage(TextureUsages::COPY_DST)?;

    // src and dst texture format must be copy-compatible
    // https://gpuweb.github.io/gpuweb/#copy-compatible
    if src_texture.desc.format.remove_srgb_suffix() != dst_texture.desc.format.remove_srgb_suffix()
    {
        return Err(TransferError::TextureFormatsNotCopyCompatible {
            src_format: src_texture.desc.format,
            dst_format: dst_texture.desc.format,
        });
    }

    let (src_copy_size, array_layer_count) =
        validate_texture_copy_range(source, &src_texture.desc, CopySide::Source, copy_size)?;
    let (dst_copy_size, _) = validate_texture_copy_range(
        destination,
        &dst_texture.desc,
        CopySide::Destination,
        copy_size,
    )?;

    let src_aspect = select_copy_aspect(
        src_texture.desc.format,
        source.aspect,
        CopyKind::TextureToTexture(CopySide::Source),
    )?;
    let dst_aspect = select_copy_aspect(
        dst_texture.desc.format,
        destination.aspect,
        CopyKind::TextureToTexture(CopySide::Destination),
    )?;

    validate_subresource_coverage(source, &src_texture.desc, CopySide::Source, copy_size)?;
    validate_subresource_coverage(
        destination,
        &dst_texture.desc,
        CopySide::Destination,
        copy_size,
    )?;

    if src_texture.desc.sample_count != dst_texture.desc.sample_count {
        return Err(TransferError::SampleCountNotEqual {
            src_sample_count: src_texture.desc.sample_count,
            dst_sample_count: dst_texture.desc.sample_count,
        });
    }

    if Arc::ptr_eq(src_texture, dst_texture) {
        validate_copy_within_same_texture(
            source,
            destination,
            src_texture.desc.dimension,
            array_layer_count,
        )?;
    }

    if copy_size.is_empty() {
        log::trace!("Ignoring copy_texture_to_texture of size 0");
        return Ok(None);
    }

    let src_tex_base = extract_texture_base(source, src_texture.desc.dimension, src_aspect);
    let dst_tex_base = extract_texture_base(destination, dst_texture.desc.dimension, dst_aspect);

    let copy_extent = CopyExtent {
        width: src_copy_size.width.min(dst_copy_size.width),
        height: src_copy_size.height.min(dst_copy_size.height),
        depth: src_copy_size.depth.min(dst_copy_size.depth),
    };

    let regions = (0..array_layer_count).map(|rel_array_layer| {
        let mut src_base = src_tex_base.clone();
        let mut dst_base = dst_tex_base.clone();
        src_base.array_layer += rel_array_layer;
        dst_base.array_layer += rel_array_layer;
        TextureCopy {
            src_base,
            dst_base,
            size: copy_extent,
        }
    });

    let regions: SmallVec<[TextureCopy; 2]> =
        if dst_tex_base.aspect == FormatAspects::DEPTH_STENCIL {
            regions
                .flat_map(|region| {
                    let (mut depth, mut stencil) = (region.clone(), region);
                    depth.src_base.aspect = FormatAspects::DEPTH;
                    depth.dst_base.aspect = FormatAspects::DEPTH;
                    stencil.src_base.aspect = FormatAspects::STENCIL;
                    stencil.dst_base.aspect = FormatAspects::STENCIL;
                    [depth, stencil]
                })
                .collect()
        } else {
            regions.collect()
        };

    Ok(Some(TransferCommand::CopyTextureToTexture {
        src: Arc::clone(src_texture),
        dst: Arc::clone(dst_texture),
        regions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(
        format: wgt::TextureFormat,
        size: Extent3d,
        dimension: wgt::TextureDimension,
    ) -> wgt::TextureDescriptor<()> {
        wgt::TextureDescriptor {
            label: (),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension,
            format,
            usage: TextureUsages::COPY_SRC | TextureUsages::COPY_DST,
        }
    }

    fn view(x: u32, y: u32, z: u32, mip_level: u32) -> wgt::ImageCopyTexture<()> {
        wgt::ImageCopyTexture {
            texture: (),
            mip_level,
            origin: wgt::Origin3d { x, y, z },
            aspect: wgt::TextureAspect::All,
        }
    }

    fn extent(width: u32, height: u32, depth_or_array_layers: u32) -> Extent3d {
        Extent3d {
            width,
            height,
            depth_or_array_layers,
        }
    }

    fn source_range(
        copy_texture: &wgt::ImageCopyTexture<()>,
        desc: &wgt::TextureDescriptor<()>,
        copy_size: &Extent3d,
    ) -> Result<(CopyExtent, u32), TransferError> {
        validate_texture_copy_range(copy_texture, desc, CopySide::Source, copy_size)
    }

    #[test]
    fn every_error_has_a_kind() {
        assert_eq!(
            TransferError::from(LayoutError::UnspecifiedRowsPerImage).kind(),
            CopyErrorKind::InvalidStride
        );
        assert_eq!(
            TransferError::from(LayoutError::SizeOverflow).kind(),
            CopyErrorKind::ArithmeticOverflow
        );
        assert_eq!(
            TransferError::InvalidTextureMipLevel { level: 1, total: 1 }.kind(),
            CopyErrorKind::OutOfBounds
        );
        assert_eq!(
            TransferError::CopyAspectNotOne.kind(),
            CopyErrorKind::UnsupportedAspect
        );
    }

    #[test]
    fn texture_range_edges() {
        let desc = desc(
            wgt::TextureFormat::Rgba8Unorm,
            extent(16, 16, 4),
            wgt::TextureDimension::D2,
        );
        assert!(source_range(&view(16, 16, 4, 0), &desc, &extent(0, 0, 0)).is_ok());
        assert!(matches!(
            source_range(&view(17, 0, 0, 0), &desc, &extent(0, 1, 1)),
            Err(TransferError::TextureOverrun {
                dimension: TextureErrorDimension::X,
                ..
            })
        ));
        assert!(matches!(
            validate_texture_copy_range(
                &view(0, 0, 3, 0),
                &desc,
                CopySide::Destination,
                &extent(16, 16, 2)
            ),
            Err(TransferError::TextureOverrun {
                dimension: TextureErrorDimension::Z,
                side: CopySide::Destination,
                ..
            })
        ));
        assert!(matches!(
            source_range(&view(0, 0, 0, 1), &desc, &extent(0, 0, 0)),
            Err(TransferError::InvalidTextureMipLevel { level: 1, total: 1 })
        ));
    }

    #[test]
    fn texture_range_does_not_overflow() {
        let desc = desc(
            wgt::TextureFormat::R8Unorm,
            extent(16, 1, 1),
            wgt::TextureDimension::D1,
        );
        assert!(matches!(
            validate_texture_copy_range(
                &view(8, 0, 0, 0),
                &desc,
                CopySide::Source,
                &extent(u32::MAX, 1, 1)
            ),
            Err(TransferError::TextureOverrun { .. })
        ));
        assert!(matches!(
            source_range(&view(0, 0, 0, 0), &desc, &extent(16, 2, 1)),
            Err(TransferError::TextureOverrun {
                dimension: TextureErrorDimension::Y,
                ..
            })
        ));
    }

    #[test]
    fn texture_range_block_alignment() {
        let desc = desc(
            wgt::TextureFormat::Bc1RgbaUnorm,
            extent(16, 16, 1),
            wgt::TextureDimension::D2,
        );
        assert!(matches!(
            source_range(&view(2, 0, 0, 0), &desc, &extent(4, 4, 1)),
            Err(TransferError::UnalignedCopyOriginX)
        ));
        assert!(matches!(
            source_range(&view(0, 0, 0, 0), &desc, &extent(4, 3, 1)),
            Err(TransferError::UnalignedCopyHeight)
        ));
        let (copy_extent, layers) =
            source_range(&view(4, 8, 0, 0), &desc, &extent(12, 8, 1)).unwrap();
        assert_eq!(
            copy_extent,
            CopyExtent {
                width: 12,
                height: 8,
                depth: 1
            }
        );
        assert_eq!(layers, 1);
    }

    #[test]
    fn compressed_mips_use_physical_size() {
        let mut desc = desc(
            wgt::TextureFormat::Bc1RgbaUnorm,
            extent(60, 60, 1),
            wgt::TextureDimension::D2,
        );
        desc.mip_level_count = 3;
        // Level 2 is 15x15 texels, backed by 4x4 blocks of 16x16 texels.
        assert!(source_range(&view(0, 0, 0, 2), &desc, &extent(16, 16, 1)).is_ok());
    }

    #[test]
    fn volume_depth_is_not_layers() {
        let desc = desc(
            wgt::TextureFormat::Rgba8Unorm,
            extent(8, 8, 8),
            wgt::TextureDimension::D3,
        );
        let (copy_extent, layers) =
            source_range(&view(0, 0, 2, 0), &desc, &extent(8, 8, 6)).unwrap();
        assert_eq!(copy_extent.depth, 6);
        assert_eq!(layers, 1);
    }

    #[test]
    fn coverage_is_only_required_for_depth_and_multisampled() {
        let color = desc(
            wgt::TextureFormat::Rgba8Unorm,
            extent(16, 16, 1),
            wgt::TextureDimension::D2,
        );
        assert!(validate_subresource_coverage(
            &view(1, 1, 0, 0),
            &color,
            CopySide::Source,
            &extent(4, 4, 1)
        )
        .is_ok());

        let mut multisampled = color.clone();
        multisampled.sample_count = 4;
        assert!(matches!(
            validate_subresource_coverage(
                &view(0, 0, 0, 0),
                &multisampled,
                CopySide::Source,
                &extent(16, 8, 1)
            ),
            Err(TransferError::UnsupportedPartialTransfer {
                dimension: TextureErrorDimension::Y,
                sample_count: 4,
                ..
            })
        ));

        let depth = desc(
            wgt::TextureFormat::Depth16Unorm,
            extent(16, 16, 6),
            wgt::TextureDimension::D2,
        );
        assert!(validate_subresource_coverage(
            &view(0, 0, 2, 0),
            &depth,
            CopySide::Destination,
            &extent(16, 16, 3)
        )
        .is_ok());
    }

    #[test]
    fn buffer_alignment_only_when_required() {
        let desc = desc(
            wgt::TextureFormat::Rg8Uint,
            extent(16, 16, 1),
            wgt::TextureDimension::D2,
        );
        let layout = wgt::ImageDataLayout {
            offset: 3,
            bytes_per_row: Some(100),
            rows_per_image: None,
        };
        assert!(matches!(
            validate_texture_buffer_copy(&view(0, 0, 0, 0), &desc, &layout, true),
            Err(TransferError::UnalignedBufferOffset(3))
        ));
        let layout = wgt::ImageDataLayout { offset: 2, ..layout };
        assert!(matches!(
            validate_texture_buffer_copy(&view(0, 0, 0, 0), &desc, &layout, true),
            Err(TransferError::UnalignedBytesPerRow)
        ));
        assert!(validate_texture_buffer_copy(&view(0, 0, 0, 0), &desc, &layout, false).is_ok());
    }

    #[test]
    fn linear_data_overrun_and_overflow() {
        let layout = wgt::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(256),
            rows_per_image: Some(4),
        };
        let format = wgt::TextureFormat::Rgba8Unorm;
        let aspect = wgt::TextureAspect::All;
        let size = extent(4, 4, 1);
        assert_eq!(
            validate_linear_texture_data(&layout, format, aspect, 784, CopySide::Source, &size)
                .unwrap(),
            (784, 1024)
        );
        assert!(matches!(
            validate_linear_texture_data(&layout, format, aspect, 783, CopySide::Source, &size),
            Err(TransferError::BufferOverrun {
                end_offset: 784,
                buffer_size: 783,
                ..
            })
        ));

        let layout = wgt::ImageDataLayout {
            offset: u64::MAX - 8,
            ..layout
        };
        assert!(matches!(
            validate_linear_texture_data(
                &layout,
                format,
                aspect,
                u64::MAX,
                CopySide::Source,
                &size
            ),
            Err(TransferError::SizeOverflow)
        ));
    }

    #[test]
    fn same_texture_overlap() {
        let src = view(0, 0, 0, 0);
        let dst = view(0, 0, 2, 0);
        let d2 = wgt::TextureDimension::D2;
        let d3 = wgt::TextureDimension::D3;
        assert!(validate_copy_within_same_texture(&src, &dst, d2, 2).is_ok());
        assert!(matches!(
            validate_copy_within_same_texture(&src, &dst, d2, 3),
            Err(TransferError::InvalidCopyWithinSameTexture { .. })
        ));
        // Slices of a volume are one subresource.
        assert!(validate_copy_within_same_texture(&src, &dst, d3, 1).is_err());
        assert!(validate_copy_within_same_texture(&src, &view(0, 0, 0, 1), d3, 1).is_ok());
    }

    #[test]
    fn texture_base_per_dimension() {
        let copy = view(4, 8, 3, 1);
        let base = extract_texture_base(&copy, wgt::TextureDimension::D2, FormatAspects::COLOR);
        assert_eq!((base.array_layer, base.origin.z), (3, 0));
        let base = extract_texture_base(&copy, wgt::TextureDimension::D3, FormatAspects::COLOR);
        assert_eq!((base.array_layer, base.origin.z), (0, 3));
        assert_eq!(base.mip_level, 1);
    }
}

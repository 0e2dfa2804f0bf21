//! Buffer-side layout of texture copies.
//!
//! All of the functions here work in units of texel blocks: a "row" is a row
//! of blocks and `rows_per_image` counts block rows. Sizes are computed in
//! `u64` with checked arithmetic throughout.

use thiserror::Error;
use wgt::{
    math::{align_to, div_round_up},
    BufferAddress, Extent3d, ImageDataLayout, TextureAspect, TextureDimension, TextureFormat,
};

/// Error computing the buffer layout of a copy.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("Format {format:?} has no byte representation for aspect {aspect:?}")]
    UncopyableAspect {
        format: TextureFormat,
        aspect: TextureAspect,
    },
    #[error("Number of bytes per row needs to be specified since more than one row is copied")]
    UnspecifiedBytesPerRow,
    #[error("Number of rows per image needs to be specified since more than one image is copied")]
    UnspecifiedRowsPerImage,
    #[error("Bytes per row {bytes_per_row} is less than the {minimum} bytes of a complete row")]
    InvalidBytesPerRow { bytes_per_row: u32, minimum: u64 },
    #[error("Rows per image {rows_per_image} is less than the {minimum} rows of the copy")]
    InvalidRowsPerImage { rows_per_image: u32, minimum: u32 },
    #[error("Overflow while computing the size of the copy")]
    SizeOverflow,
}

/// Number of bytes one texel block of `aspect` of `format` occupies in a buffer.
pub fn copy_block_size(format: TextureFormat, aspect: TextureAspect) -> Result<u32, LayoutError> {
    format
        .aspect_specific_format(aspect)
        .and_then(|specific| specific.block_copy_size(Some(aspect)))
        .ok_or(LayoutError::UncopyableAspect { format, aspect })
}

/// Strides of a buffer layout with the unspecified values filled in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedStrides {
    pub bytes_per_row: u64,
    pub rows_per_image: u32,
}

/// Resolve the optional strides of `layout` for a copy of `copy_size`.
///
/// A stride may be left unspecified only while it is not needed to address
/// the data: `bytes_per_row` for a single block row of a single image, and
/// `rows_per_image` for a single image. It then defaults to the dense value.
/// Explicit strides are only checked against the dense values when they
/// are actually used. An empty copy uses neither stride.
///
/// ```
/// # use texcopy_core::layout::{resolve_strides, ResolvedStrides};
/// let strides = resolve_strides(
///     wgt::TextureFormat::Bc1RgbaUnorm,
///     wgt::TextureAspect::All,
///     &wgt::Extent3d { width: 9, height: 1, depth_or_array_layers: 1 },
///     &wgt::ImageDataLayout::default(),
/// )
/// .unwrap();
/// assert_eq!(strides, ResolvedStrides { bytes_per_row: 24, rows_per_image: 1 });
/// ```
pub fn resolve_strides(
    format: TextureFormat,
    aspect: TextureAspect,
    copy_size: &Extent3d,
    layout: &ImageDataLayout,
) -> Result<ResolvedStrides, LayoutError> {
    let block_size = copy_block_size(format, aspect)?;
    let (block_width, block_height) = format.block_dimensions();

    let width_blocks = div_round_up(copy_size.width, block_width);
    let height_blocks = div_round_up(copy_size.height, block_height);
    let row_bytes_dense = u64::from(width_blocks) * u64::from(block_size);

    let is_empty = copy_size.is_empty();
    let requires_multiple_rows =
        !is_empty && (height_blocks > 1 || copy_size.depth_or_array_layers > 1);
    let requires_multiple_images = !is_empty && copy_size.depth_or_array_layers > 1;

    let bytes_per_row = match layout.bytes_per_row {
        None if requires_multiple_rows => return Err(LayoutError::UnspecifiedBytesPerRow),
        None => row_bytes_dense,
        Some(bytes_per_row)
            if requires_multiple_rows
                && (bytes_per_row == 0 || u64::from(bytes_per_row) < row_bytes_dense) =>
        {
            return Err(LayoutError::InvalidBytesPerRow {
                bytes_per_row,
                minimum: row_bytes_dense,
            });
        }
        Some(bytes_per_row) => u64::from(bytes_per_row),
    };

    let rows_per_image = match layout.rows_per_image {
        None if requires_multiple_images => return Err(LayoutError::UnspecifiedRowsPerImage),
        None => height_blocks,
        Some(rows_per_image) if requires_multiple_images && rows_per_image < height_blocks => {
            return Err(LayoutError::InvalidRowsPerImage {
                rows_per_image,
                minimum: height_blocks,
            });
        }
        Some(rows_per_image) => rows_per_image,
    };

    Ok(ResolvedStrides {
        bytes_per_row,
        rows_per_image,
    })
}

/// Number of buffer bytes a copy of `copy_size` spans with the given strides.
///
/// Only the last row of the last image is counted densely: padding after
/// it is not required to be present. A copy with any zero dimension spans
/// no bytes.
///
/// ```
/// # use texcopy_core::layout::required_bytes_in_copy;
/// let size = wgt::Extent3d { width: 4, height: 4, depth_or_array_layers: 1 };
/// let bytes = required_bytes_in_copy(
///     256,
///     4,
///     &size,
///     wgt::TextureFormat::Rgba8Unorm,
///     wgt::TextureAspect::All,
/// );
/// assert_eq!(bytes, Ok(784));
/// ```
pub fn required_bytes_in_copy(
    bytes_per_row: u64,
    rows_per_image: u32,
    copy_size: &Extent3d,
    format: TextureFormat,
    aspect: TextureAspect,
) -> Result<BufferAddress, LayoutError> {
    let block_size = copy_block_size(format, aspect)?;
    let (block_width, block_height) = format.block_dimensions();
    let width_blocks = div_round_up(copy_size.width, block_width);
    let height_blocks = div_round_up(copy_size.height, block_height);
    let bytes_per_image = bytes_per_row
        .checked_mul(u64::from(rows_per_image))
        .ok_or(LayoutError::SizeOverflow)?;
    bytes_in_copy(
        bytes_per_row,
        bytes_per_image,
        width_blocks,
        height_blocks,
        copy_size.depth_or_array_layers,
        block_size,
    )
}

fn bytes_in_copy(
    bytes_per_row: u64,
    bytes_per_image: u64,
    width_blocks: u32,
    height_blocks: u32,
    depth: u32,
    block_size: u32,
) -> Result<BufferAddress, LayoutError> {
    if width_blocks == 0 || height_blocks == 0 || depth == 0 {
        return Ok(0);
    }

    let last_row = u64::from(width_blocks) * u64::from(block_size);
    bytes_per_image
        .checked_mul(u64::from(depth - 1))
        .and_then(|images| {
            bytes_per_row
                .checked_mul(u64::from(height_blocks - 1))
                .and_then(|rows| images.checked_add(rows))
        })
        .and_then(|bytes| bytes.checked_add(last_row))
        .ok_or(LayoutError::SizeOverflow)
}

/// Complete description of the buffer side of a buffer/texture copy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BufferTextureCopyInfo {
    pub copy_width: u32,
    pub copy_height: u32,
    pub depth_or_array_layers: u32,

    pub offset: BufferAddress,

    pub block_size_bytes: u32,
    pub block_width_texels: u32,
    pub block_height_texels: u32,

    pub width_blocks: u32,
    pub height_blocks: u32,

    /// Bytes of one row of blocks without padding.
    pub row_bytes_dense: u64,
    /// Resolved bytes per row.
    pub row_stride_bytes: u64,

    /// Resolved rows per image.
    pub image_stride_rows: u32,
    /// Bytes between the starts of consecutive images.
    pub image_stride_bytes: u64,

    pub image_rows_dense: u32,
    pub image_bytes_dense: u64,

    /// Bytes the copy spans, starting at `offset`.
    pub bytes_in_copy: u64,
}

impl BufferTextureCopyInfo {
    pub fn new(
        format: TextureFormat,
        aspect: TextureAspect,
        copy_size: &Extent3d,
        layout: &ImageDataLayout,
    ) -> Result<Self, LayoutError> {
        let strides = resolve_strides(format, aspect, copy_size, layout)?;
        let block_size_bytes = copy_block_size(format, aspect)?;
        let (block_width_texels, block_height_texels) = format.block_dimensions();

        let width_blocks = div_round_up(copy_size.width, block_width_texels);
        let height_blocks = div_round_up(copy_size.height, block_height_texels);

        let row_bytes_dense = u64::from(width_blocks) * u64::from(block_size_bytes);
        let image_rows_dense = height_blocks;
        let image_bytes_dense = row_bytes_dense * u64::from(image_rows_dense);

        let image_stride_bytes = strides
            .bytes_per_row
            .checked_mul(u64::from(strides.rows_per_image))
            .ok_or(LayoutError::SizeOverflow)?;

        let bytes_in_copy = bytes_in_copy(
            strides.bytes_per_row,
            image_stride_bytes,
            width_blocks,
            height_blocks,
            copy_size.depth_or_array_layers,
            block_size_bytes,
        )?;

        Ok(Self {
            copy_width: copy_size.width,
            copy_height: copy_size.height,
            depth_or_array_layers: copy_size.depth_or_array_layers,
            offset: layout.offset,
            block_size_bytes,
            block_width_texels,
            block_height_texels,
            width_blocks,
            height_blocks,
            row_bytes_dense,
            row_stride_bytes: strides.bytes_per_row,
            image_stride_rows: strides.rows_per_image,
            image_stride_bytes,
            image_rows_dense,
            image_bytes_dense,
            bytes_in_copy,
        })
    }

    /// Texel blocks one resolved row holds, including padding.
    pub fn texel_blocks_per_row(&self) -> u64 {
        self.row_stride_bytes / u64::from(self.block_size_bytes)
    }

    /// Texel blocks one resolved image holds, including padding.
    pub fn texel_blocks_per_image(&self) -> u64 {
        self.texel_blocks_per_row() * u64::from(self.image_stride_rows)
    }

    /// Returns `true` if the copy has neither row nor image padding.
    pub fn is_contiguous(&self) -> bool {
        let requires_multiple_rows = self.depth_or_array_layers > 1 || self.height_blocks > 1;
        let requires_multiple_images = self.depth_or_array_layers > 1;
        (self.row_stride_bytes == self.row_bytes_dense || !requires_multiple_rows)
            && (self.image_stride_bytes == self.image_bytes_dense || !requires_multiple_images)
    }
}

/// Smallest `bytes_per_row` usable for copying `width` texels of `format`
/// on a command encoder.
///
/// Combined depth-stencil formats have to be narrowed with
/// [`TextureFormat::aspect_specific_format`] first.
pub fn minimum_bytes_per_row(format: TextureFormat, width: u32) -> Result<u32, LayoutError> {
    let block_size = format
        .block_copy_size(None)
        .ok_or(LayoutError::UncopyableAspect {
            format,
            aspect: TextureAspect::All,
        })?;
    let (block_width, _) = format.block_dimensions();
    let row_bytes = u64::from(div_round_up(width, block_width)) * u64::from(block_size);
    let aligned = align_to(
        row_bytes,
        u64::from(wgt::COPY_BYTES_PER_ROW_ALIGNMENT),
    );
    u32::try_from(aligned).map_err(|_| LayoutError::SizeOverflow)
}

/// Buffer layout holding a whole mip level of a texture, with rows padded to
/// [`wgt::COPY_BYTES_PER_ROW_ALIGNMENT`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TextureDataCopyLayout {
    pub byte_length: u64,
    pub texel_block_count: u64,
    pub bytes_per_row: u32,
    pub rows_per_image: u32,
    pub texel_blocks_per_row: u32,
    pub bytes_per_image: u64,
    pub texel_blocks_per_image: u64,
    /// Physical size of the mip level.
    pub mip_size: Extent3d,
}

impl TextureDataCopyLayout {
    /// Layout of mip level `mip_level` of a `format` texture whose level 0
    /// has extent `size`.
    ///
    /// `rows_per_image` defaults to the block rows of the mip level. For a
    /// level with several images it may not be smaller than that.
    pub fn at_level(
        format: TextureFormat,
        size: Extent3d,
        mip_level: u32,
        dimension: TextureDimension,
        rows_per_image: Option<u32>,
    ) -> Result<Self, LayoutError> {
        let mip_size = size
            .mip_level_size(mip_level, dimension)
            .physical_size(format);
        let block_size = format
            .block_copy_size(None)
            .ok_or(LayoutError::UncopyableAspect {
                format,
                aspect: TextureAspect::All,
            })?;
        let (_, block_height) = format.block_dimensions();

        let bytes_per_row = minimum_bytes_per_row(format, mip_size.width)?;
        let height_blocks = div_round_up(mip_size.height, block_height);
        let rows_per_image = match rows_per_image {
            Some(rows_per_image)
                if mip_size.depth_or_array_layers > 1 && rows_per_image < height_blocks =>
            {
                return Err(LayoutError::InvalidRowsPerImage {
                    rows_per_image,
                    minimum: height_blocks,
                });
            }
            Some(rows_per_image) => rows_per_image,
            None => height_blocks,
        };
        let bytes_per_image = u64::from(bytes_per_row) * u64::from(rows_per_image);
        let byte_length = required_bytes_in_copy(
            u64::from(bytes_per_row),
            rows_per_image,
            &mip_size,
            format,
            TextureAspect::All,
        )?;

        let texel_blocks_per_row = bytes_per_row / block_size;
        let texel_blocks_per_image = u64::from(texel_blocks_per_row) * u64::from(rows_per_image);
        let texel_block_count = texel_blocks_per_image
            .checked_mul(u64::from(mip_size.depth_or_array_layers))
            .ok_or(LayoutError::SizeOverflow)?;

        Ok(Self {
            byte_length,
            texel_block_count,
            bytes_per_row,
            rows_per_image,
            texel_blocks_per_row,
            bytes_per_image,
            texel_blocks_per_image,
            mip_size,
        })
    }

    /// Buffer layout of this mip level placed at `offset`.
    pub fn image_data_layout(&self, offset: BufferAddress) -> ImageDataLayout {
        ImageDataLayout {
            offset,
            bytes_per_row: Some(self.bytes_per_row),
            rows_per_image: Some(self.rows_per_image),
        }
    }
}

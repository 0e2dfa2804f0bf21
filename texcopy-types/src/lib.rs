/*! This library describes the value types shared by the texture copy
 *  validation engine: formats, extents, origins, aspects, buffer layouts
 *  and resource descriptors.
 */

#![allow(
    // We don't use syntax sugar where it's not necessary.
    clippy::match_like_matches_macro,
)]
#![warn(missing_docs)]

#[cfg(any(feature = "serde", test))]
use serde::{Deserialize, Serialize};

pub mod math;

use math::div_round_up;

// Bitflags serialize as their raw bits. Unknown bits are kept on
// deserialization so that the validation layer can report them.
macro_rules! impl_bitflags {
    ($name:ident) => {
        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.bits().serialize(serializer)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<$name, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = <_ as serde::Deserialize<'de>>::deserialize(deserializer)?;
                Ok($name::from_bits_retain(value))
            }
        }

        impl $name {
            /// Returns true if the bitflags contains bits that are not part of
            /// the bitflags definition.
            pub fn contains_invalid_bits(&self) -> bool {
                let all = Self::all().bits();
                (self.bits() | all) != all
            }
        }
    };
}

/// Integral type used for buffer offsets.
pub type BufferAddress = u64;
/// Integral type used for buffer slice sizes.
pub type BufferSize = std::num::NonZeroU64;

/// Buffer-Texture copies must have [`bytes_per_row`] aligned to this number.
///
/// This doesn't apply to queue texture writes.
///
/// [`bytes_per_row`]: ImageDataLayout::bytes_per_row
pub const COPY_BYTES_PER_ROW_ALIGNMENT: u32 = 256;
/// Buffer to buffer copy offsets and sizes must be aligned to this number.
pub const COPY_BUFFER_ALIGNMENT: BufferAddress = 4;

/// Represents the sets of limits a device supports.
///
/// The defaults are the limits every WebGPU implementation guarantees.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Limits {
    /// Maximum allowed value for the `size.width` of a texture created with `TextureDimension::D1`.
    /// Defaults to 8192.
    #[cfg_attr(feature = "serde", serde(rename = "maxTextureDimension1D"))]
    pub max_texture_dimension_1d: u32,
    /// Maximum allowed value for the `size.width` and `size.height` of a texture created with
    /// `TextureDimension::D2`. Defaults to 8192.
    #[cfg_attr(feature = "serde", serde(rename = "maxTextureDimension2D"))]
    pub max_texture_dimension_2d: u32,
    /// Maximum allowed value for every dimension of a texture created with
    /// `TextureDimension::D3`. Defaults to 2048.
    #[cfg_attr(feature = "serde", serde(rename = "maxTextureDimension3D"))]
    pub max_texture_dimension_3d: u32,
    /// Maximum allowed value for `size.depth_or_array_layers` of a 2D texture. Defaults to 256.
    pub max_texture_array_layers: u32,
    /// Maximum size of a buffer in bytes. Defaults to 256 MiB.
    pub max_buffer_size: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_texture_dimension_1d: 8192,
            max_texture_dimension_2d: 8192,
            max_texture_dimension_3d: 2048,
            max_texture_array_layers: 256,
            max_buffer_size: 1 << 28,
        }
    }
}

/// Dimensionality of a texture.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextureDimension {
    /// 1D texture
    #[cfg_attr(feature = "serde", serde(rename = "1d"))]
    D1,
    /// 2D texture
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "2d"))]
    D2,
    /// 3D texture
    #[cfg_attr(feature = "serde", serde(rename = "3d"))]
    D3,
}

/// ASTC block dimensions
#[repr(C)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AstcBlock {
    /// 4x4 block compressed texture. 16 bytes per block (8 bit/px).
    B4x4,
    /// 5x4 block compressed texture. 16 bytes per block (6.4 bit/px).
    B5x4,
    /// 5x5 block compressed texture. 16 bytes per block (5.12 bit/px).
    B5x5,
    /// 6x5 block compressed texture. 16 bytes per block (4.27 bit/px).
    B6x5,
    /// 6x6 block compressed texture. 16 bytes per block (3.56 bit/px).
    B6x6,
    /// 8x5 block compressed texture. 16 bytes per block (3.2 bit/px).
    B8x5,
    /// 8x6 block compressed texture. 16 bytes per block (2.67 bit/px).
    B8x6,
    /// 8x8 block compressed texture. 16 bytes per block (2 bit/px).
    B8x8,
    /// 10x5 block compressed texture. 16 bytes per block (2.56 bit/px).
    B10x5,
    /// 10x6 block compressed texture. 16 bytes per block (2.13 bit/px).
    B10x6,
    /// 10x8 block compressed texture. 16 bytes per block (1.6 bit/px).
    B10x8,
    /// 10x10 block compressed texture. 16 bytes per block (1.28 bit/px).
    B10x10,
    /// 12x10 block compressed texture. 16 bytes per block (1.07 bit/px).
    B12x10,
    /// 12x12 block compressed texture. 16 bytes per block (0.89 bit/px).
    B12x12,
}

/// ASTC RGBA channel
#[repr(C)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AstcChannel {
    /// Unsigned normalized.
    Unorm,
    /// Unsigned normalized, sRGB encoded.
    UnormSrgb,
    /// High dynamic range.
    Hdr,
}

/// Underlying texture data format.
///
/// Only the properties that matter for copies are described here: block
/// dimensions, the texel block copy size and the aspects.
#[repr(C)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TextureFormat {
    // 1 byte per texel
    /// R, 8 bit unsigned normalized.
    R8Unorm,
    /// R, 8 bit signed normalized.
    R8Snorm,
    /// R, 8 bit unsigned integer.
    R8Uint,
    /// R, 8 bit signed integer.
    R8Sint,

    // 2 bytes per texel
    /// R, 16 bit unsigned integer.
    R16Uint,
    /// R, 16 bit signed integer.
    R16Sint,
    /// R, 16 bit float.
    R16Float,
    /// RG, 8 bit unsigned normalized.
    Rg8Unorm,
    /// RG, 8 bit signed normalized.
    Rg8Snorm,
    /// RG, 8 bit unsigned integer.
    Rg8Uint,
    /// RG, 8 bit signed integer.
    Rg8Sint,

    // 4 bytes per texel
    /// R, 32 bit unsigned integer.
    R32Uint,
    /// R, 32 bit signed integer.
    R32Sint,
    /// R, 32 bit float.
    R32Float,
    /// RG, 16 bit unsigned integer.
    Rg16Uint,
    /// RG, 16 bit signed integer.
    Rg16Sint,
    /// RG, 16 bit float.
    Rg16Float,
    /// RGBA, 8 bit unsigned normalized.
    Rgba8Unorm,
    /// RGBA, 8 bit unsigned normalized, sRGB encoded.
    Rgba8UnormSrgb,
    /// RGBA, 8 bit signed normalized.
    Rgba8Snorm,
    /// RGBA, 8 bit unsigned integer.
    Rgba8Uint,
    /// RGBA, 8 bit signed integer.
    Rgba8Sint,
    /// BGRA, 8 bit unsigned normalized.
    Bgra8Unorm,
    /// BGRA, 8 bit unsigned normalized, sRGB encoded.
    Bgra8UnormSrgb,

    // Packed, 4 bytes per texel
    /// RGB with 9 bit mantissas and a shared 5 bit exponent.
    Rgb9e5Ufloat,
    /// RGB 10 bit and A 2 bit, unsigned normalized.
    Rgb10a2Unorm,
    /// RG 11 bit and B 10 bit unsigned float.
    Rg11b10Float,

    // 8 bytes per texel
    /// RG, 32 bit unsigned integer.
    Rg32Uint,
    /// RG, 32 bit signed integer.
    Rg32Sint,
    /// RG, 32 bit float.
    Rg32Float,
    /// RGBA, 16 bit unsigned integer.
    Rgba16Uint,
    /// RGBA, 16 bit signed integer.
    Rgba16Sint,
    /// RGBA, 16 bit float.
    Rgba16Float,

    // 16 bytes per texel
    /// RGBA, 32 bit unsigned integer.
    Rgba32Uint,
    /// RGBA, 32 bit signed integer.
    Rgba32Sint,
    /// RGBA, 32 bit float.
    Rgba32Float,

    // Depth and stencil
    /// 8 bit stencil. Copyable in every direction.
    Stencil8,
    /// 16 bit depth. Copyable in every direction.
    Depth16Unorm,
    /// Depth of unspecified layout. Never copyable to or from a buffer.
    Depth24Plus,
    /// Depth of unspecified layout and 8 bit stencil. Only the stencil
    /// aspect is copyable to or from a buffer.
    Depth24PlusStencil8,
    /// 32 bit float depth. Depth may only be copied into a buffer.
    Depth32Float,
    /// 32 bit float depth and 8 bit stencil. Depth may only be copied into
    /// a buffer.
    Depth32FloatStencil8,

    // BC, 4x4 blocks
    /// 8 bytes per block. RGBA with 1 bit alpha.
    Bc1RgbaUnorm,
    /// 8 bytes per block. sRGB variant of [`Self::Bc1RgbaUnorm`].
    Bc1RgbaUnormSrgb,
    /// 16 bytes per block. RGBA with 4 bit alpha.
    Bc2RgbaUnorm,
    /// 16 bytes per block. sRGB variant of [`Self::Bc2RgbaUnorm`].
    Bc2RgbaUnormSrgb,
    /// 16 bytes per block. RGBA with interpolated alpha.
    Bc3RgbaUnorm,
    /// 16 bytes per block. sRGB variant of [`Self::Bc3RgbaUnorm`].
    Bc3RgbaUnormSrgb,
    /// 8 bytes per block. R.
    Bc4RUnorm,
    /// 8 bytes per block. R, signed.
    Bc4RSnorm,
    /// 16 bytes per block. RG.
    Bc5RgUnorm,
    /// 16 bytes per block. RG, signed.
    Bc5RgSnorm,
    /// 16 bytes per block. RGB unsigned half float.
    Bc6hRgbUfloat,
    /// 16 bytes per block. RGB signed half float.
    Bc6hRgbFloat,
    /// 16 bytes per block. RGBA.
    Bc7RgbaUnorm,
    /// 16 bytes per block. sRGB variant of [`Self::Bc7RgbaUnorm`].
    Bc7RgbaUnormSrgb,

    // ETC2 and EAC, 4x4 blocks
    /// 8 bytes per block. RGB.
    Etc2Rgb8Unorm,
    /// 8 bytes per block. sRGB variant of [`Self::Etc2Rgb8Unorm`].
    Etc2Rgb8UnormSrgb,
    /// 8 bytes per block. RGB with 1 bit alpha.
    Etc2Rgb8A1Unorm,
    /// 8 bytes per block. sRGB variant of [`Self::Etc2Rgb8A1Unorm`].
    Etc2Rgb8A1UnormSrgb,
    /// 16 bytes per block. RGBA.
    Etc2Rgba8Unorm,
    /// 16 bytes per block. sRGB variant of [`Self::Etc2Rgba8Unorm`].
    Etc2Rgba8UnormSrgb,
    /// 8 bytes per block. 11 bit R.
    EacR11Unorm,
    /// 8 bytes per block. 11 bit R, signed.
    EacR11Snorm,
    /// 16 bytes per block. 11 bit RG.
    EacRg11Unorm,
    /// 16 bytes per block. 11 bit RG, signed.
    EacRg11Snorm,

    /// ASTC. 16 bytes per block of `block` texels.
    Astc {
        /// Block dimensions.
        block: AstcBlock,
        /// Channel encoding.
        channel: AstcChannel,
    },
}

impl TextureFormat {
    /// Returns the aspect-specific format of the original format
    ///
    /// see <https://gpuweb.github.io/gpuweb/#abstract-opdef-resolving-gputextureaspect>
    pub fn aspect_specific_format(&self, aspect: TextureAspect) -> Option<Self> {
        match (*self, aspect) {
            (Self::Stencil8, TextureAspect::StencilOnly) => Some(*self),
            (
                Self::Depth16Unorm | Self::Depth24Plus | Self::Depth32Float,
                TextureAspect::DepthOnly,
            ) => Some(*self),
            (
                Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8,
                TextureAspect::StencilOnly,
            ) => Some(Self::Stencil8),
            (Self::Depth24PlusStencil8, TextureAspect::DepthOnly) => Some(Self::Depth24Plus),
            (Self::Depth32FloatStencil8, TextureAspect::DepthOnly) => Some(Self::Depth32Float),
            (format, TextureAspect::All) => Some(format),
            _ => None,
        }
    }

    /// Returns `true` if the format is a depth and/or stencil format
    ///
    /// see <https://gpuweb.github.io/gpuweb/#depth-formats>
    pub fn is_depth_stencil_format(&self) -> bool {
        match *self {
            Self::Stencil8
            | Self::Depth16Unorm
            | Self::Depth24Plus
            | Self::Depth24PlusStencil8
            | Self::Depth32Float
            | Self::Depth32FloatStencil8 => true,
            _ => false,
        }
    }

    /// Returns `true` if the format is a combined depth-stencil format
    ///
    /// see <https://gpuweb.github.io/gpuweb/#combined-depth-stencil-format>
    pub fn is_combined_depth_stencil_format(&self) -> bool {
        match *self {
            Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8 => true,
            _ => false,
        }
    }

    /// Returns `true` if the format has a color aspect
    pub fn has_color_aspect(&self) -> bool {
        !self.is_depth_stencil_format()
    }

    /// Returns `true` if the format has a depth aspect
    pub fn has_depth_aspect(&self) -> bool {
        match *self {
            Self::Depth16Unorm
            | Self::Depth24Plus
            | Self::Depth24PlusStencil8
            | Self::Depth32Float
            | Self::Depth32FloatStencil8 => true,
            _ => false,
        }
    }

    /// Returns `true` if the format has a stencil aspect
    pub fn has_stencil_aspect(&self) -> bool {
        match *self {
            Self::Stencil8 | Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8 => true,
            _ => false,
        }
    }

    /// Returns the dimension of a block of texels.
    pub fn block_dimensions(&self) -> (u32, u32) {
        match *self {
            Self::Bc1RgbaUnorm
            | Self::Bc1RgbaUnormSrgb
            | Self::Bc2RgbaUnorm
            | Self::Bc2RgbaUnormSrgb
            | Self::Bc3RgbaUnorm
            | Self::Bc3RgbaUnormSrgb
            | Self::Bc4RUnorm
            | Self::Bc4RSnorm
            | Self::Bc5RgUnorm
            | Self::Bc5RgSnorm
            | Self::Bc6hRgbUfloat
            | Self::Bc6hRgbFloat
            | Self::Bc7RgbaUnorm
            | Self::Bc7RgbaUnormSrgb => (4, 4),

            Self::Etc2Rgb8Unorm
            | Self::Etc2Rgb8UnormSrgb
            | Self::Etc2Rgb8A1Unorm
            | Self::Etc2Rgb8A1UnormSrgb
            | Self::Etc2Rgba8Unorm
            | Self::Etc2Rgba8UnormSrgb
            | Self::EacR11Unorm
            | Self::EacR11Snorm
            | Self::EacRg11Unorm
            | Self::EacRg11Snorm => (4, 4),

            Self::Astc { block, .. } => match block {
                AstcBlock::B4x4 => (4, 4),
                AstcBlock::B5x4 => (5, 4),
                AstcBlock::B5x5 => (5, 5),
                AstcBlock::B6x5 => (6, 5),
                AstcBlock::B6x6 => (6, 6),
                AstcBlock::B8x5 => (8, 5),
                AstcBlock::B8x6 => (8, 6),
                AstcBlock::B8x8 => (8, 8),
                AstcBlock::B10x5 => (10, 5),
                AstcBlock::B10x6 => (10, 6),
                AstcBlock::B10x8 => (10, 8),
                AstcBlock::B10x10 => (10, 10),
                AstcBlock::B12x10 => (12, 10),
                AstcBlock::B12x12 => (12, 12),
            },

            _ => (1, 1),
        }
    }

    /// Returns `true` for compressed formats.
    pub fn is_compressed(&self) -> bool {
        self.block_dimensions() != (1, 1)
    }

    /// Returns the [texel block copy footprint](https://gpuweb.github.io/gpuweb/#texel-block-copy-footprint)
    /// of this format, in bytes.
    ///
    /// Returns `None` if any of the following are true:
    ///  - the format is combined depth-stencil and no `aspect` was provided
    ///  - the format is `Depth24Plus`
    ///  - the format is `Depth24PlusStencil8` and `aspect` is depth.
    pub fn block_copy_size(&self, aspect: Option<TextureAspect>) -> Option<u32> {
        match *self {
            Self::R8Unorm | Self::R8Snorm | Self::R8Uint | Self::R8Sint => Some(1),

            Self::Rg8Unorm | Self::Rg8Snorm | Self::Rg8Uint | Self::Rg8Sint => Some(2),
            Self::R16Uint | Self::R16Sint | Self::R16Float => Some(2),

            Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Rgba8Snorm
            | Self::Rgba8Uint
            | Self::Rgba8Sint
            | Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb => Some(4),
            Self::Rg16Uint | Self::Rg16Sint | Self::Rg16Float => Some(4),
            Self::R32Uint | Self::R32Sint | Self::R32Float => Some(4),
            Self::Rgb9e5Ufloat | Self::Rgb10a2Unorm | Self::Rg11b10Float => Some(4),

            Self::Rgba16Uint | Self::Rgba16Sint | Self::Rgba16Float => Some(8),
            Self::Rg32Uint | Self::Rg32Sint | Self::Rg32Float => Some(8),

            Self::Rgba32Uint | Self::Rgba32Sint | Self::Rgba32Float => Some(16),

            Self::Stencil8 => Some(1),
            Self::Depth16Unorm => Some(2),
            Self::Depth32Float => Some(4),
            Self::Depth24Plus => None,
            Self::Depth24PlusStencil8 => match aspect {
                None | Some(TextureAspect::All) => None,
                Some(TextureAspect::DepthOnly) => None,
                Some(TextureAspect::StencilOnly) => Some(1),
            },
            Self::Depth32FloatStencil8 => match aspect {
                None | Some(TextureAspect::All) => None,
                Some(TextureAspect::DepthOnly) => Some(4),
                Some(TextureAspect::StencilOnly) => Some(1),
            },

            Self::Bc1RgbaUnorm | Self::Bc1RgbaUnormSrgb | Self::Bc4RUnorm | Self::Bc4RSnorm => {
                Some(8)
            }
            Self::Bc2RgbaUnorm
            | Self::Bc2RgbaUnormSrgb
            | Self::Bc3RgbaUnorm
            | Self::Bc3RgbaUnormSrgb
            | Self::Bc5RgUnorm
            | Self::Bc5RgSnorm
            | Self::Bc6hRgbUfloat
            | Self::Bc6hRgbFloat
            | Self::Bc7RgbaUnorm
            | Self::Bc7RgbaUnormSrgb => Some(16),

            Self::Etc2Rgb8Unorm
            | Self::Etc2Rgb8UnormSrgb
            | Self::Etc2Rgb8A1Unorm
            | Self::Etc2Rgb8A1UnormSrgb
            | Self::EacR11Unorm
            | Self::EacR11Snorm => Some(8),
            Self::Etc2Rgba8Unorm
            | Self::Etc2Rgba8UnormSrgb
            | Self::EacRg11Unorm
            | Self::EacRg11Snorm => Some(16),

            Self::Astc { .. } => Some(16),
        }
    }

    /// Strips the `Srgb` suffix from the given texture format.
    ///
    /// Two formats are [copy-compatible](https://gpuweb.github.io/gpuweb/#copy-compatible)
    /// when they are equal after stripping.
    pub fn remove_srgb_suffix(&self) -> TextureFormat {
        match *self {
            Self::Rgba8UnormSrgb => Self::Rgba8Unorm,
            Self::Bgra8UnormSrgb => Self::Bgra8Unorm,
            Self::Bc1RgbaUnormSrgb => Self::Bc1RgbaUnorm,
            Self::Bc2RgbaUnormSrgb => Self::Bc2RgbaUnorm,
            Self::Bc3RgbaUnormSrgb => Self::Bc3RgbaUnorm,
            Self::Bc7RgbaUnormSrgb => Self::Bc7RgbaUnorm,
            Self::Etc2Rgb8UnormSrgb => Self::Etc2Rgb8Unorm,
            Self::Etc2Rgb8A1UnormSrgb => Self::Etc2Rgb8A1Unorm,
            Self::Etc2Rgba8UnormSrgb => Self::Etc2Rgba8Unorm,
            Self::Astc {
                block,
                channel: AstcChannel::UnormSrgb,
            } => Self::Astc {
                block,
                channel: AstcChannel::Unorm,
            },
            _ => *self,
        }
    }
}

#[test]
fn test_block_copy_size_by_aspect() {
    use TextureAspect as Ta;
    use TextureFormat as Tf;

    assert_eq!(Tf::Rgba8Unorm.block_copy_size(None), Some(4));
    assert_eq!(Tf::Bc1RgbaUnorm.block_copy_size(None), Some(8));
    assert_eq!(Tf::Depth24PlusStencil8.block_copy_size(Some(Ta::All)), None);
    assert_eq!(
        Tf::Depth24PlusStencil8.block_copy_size(Some(Ta::StencilOnly)),
        Some(1)
    );
    assert_eq!(
        Tf::Depth32FloatStencil8.block_copy_size(Some(Ta::DepthOnly)),
        Some(4)
    );
    assert_eq!(Tf::Depth24Plus.block_copy_size(Some(Ta::DepthOnly)), None);
}

#[test]
fn test_aspect_specific_format() {
    use TextureAspect as Ta;
    use TextureFormat as Tf;

    assert_eq!(
        Tf::Depth24PlusStencil8.aspect_specific_format(Ta::StencilOnly),
        Some(Tf::Stencil8)
    );
    assert_eq!(
        Tf::Depth32FloatStencil8.aspect_specific_format(Ta::DepthOnly),
        Some(Tf::Depth32Float)
    );
    assert_eq!(Tf::Rgba8Unorm.aspect_specific_format(Ta::DepthOnly), None);
    assert_eq!(Tf::Depth16Unorm.aspect_specific_format(Ta::StencilOnly), None);
    assert_eq!(
        Tf::Bc7RgbaUnorm.aspect_specific_format(Ta::All),
        Some(Tf::Bc7RgbaUnorm)
    );
}

bitflags::bitflags! {
    /// Different ways that you can use a buffer.
    ///
    /// Any bit not named here is rejected at buffer creation.
    #[repr(transparent)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct BufferUsages: u32 {
        /// Allow a buffer to be mapped for reading. The only other usage it
        /// may have is `COPY_DST`.
        const MAP_READ = 1 << 0;
        /// Allow a buffer to be mapped for writing. The only other usage it
        /// may have is `COPY_SRC`.
        const MAP_WRITE = 1 << 1;
        /// Allow a buffer to be the source of a buffer-to-buffer or
        /// buffer-to-texture copy.
        const COPY_SRC = 1 << 2;
        /// Allow a buffer to be the destination of a buffer-to-buffer or
        /// texture-to-buffer copy, or of a queue buffer write.
        const COPY_DST = 1 << 3;
    }
}

impl_bitflags!(BufferUsages);

bitflags::bitflags! {
    /// Different ways that you can use a texture.
    #[repr(transparent)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct TextureUsages: u32 {
        /// Allows a texture to be the source of a texture-to-buffer or
        /// texture-to-texture copy.
        const COPY_SRC = 1 << 0;
        /// Allows a texture to be the destination of a buffer-to-texture or
        /// texture-to-texture copy, or of a queue texture write.
        const COPY_DST = 1 << 1;
    }
}

impl_bitflags!(TextureUsages);

/// Describes a buffer.
#[repr(C)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BufferDescriptor<L> {
    /// Debug label of a buffer.
    pub label: L,
    /// Size of a buffer, in bytes.
    pub size: BufferAddress,
    /// Usages of a buffer.
    pub usage: BufferUsages,
    /// Allows a buffer to be mapped immediately after they are made. It does not have to be
    /// [`BufferUsages::MAP_READ`] or [`BufferUsages::MAP_WRITE`], all buffers are allowed to be
    /// mapped at creation.
    ///
    /// If this is `true`, [`size`](#structfield.size) must be a multiple of
    /// [`COPY_BUFFER_ALIGNMENT`].
    pub mapped_at_creation: bool,
}

/// Origin of a copy to/from a texture.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Origin3d {
    /// X position of the origin
    pub x: u32,
    /// Y position of the origin
    pub y: u32,
    /// Z position of the origin
    pub z: u32,
}

/// Extent of a texture related operation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extent3d {
    /// Width of the extent
    pub width: u32,
    /// Height of the extent
    pub height: u32,
    /// The depth of the extent or the number of array layers
    pub depth_or_array_layers: u32,
}

impl Default for Extent3d {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        }
    }
}

impl Extent3d {
    /// Returns `true` if any dimension is zero, i.e. nothing is covered.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth_or_array_layers == 0
    }

    /// Calculates the [physical size] backing a texture of the given
    /// format and extent.  This includes padding to the block width
    /// and height of the format.
    ///
    /// [physical size]: https://gpuweb.github.io/gpuweb/#physical-miplevel-specific-texture-extent
    pub fn physical_size(&self, format: TextureFormat) -> Self {
        let (block_width, block_height) = format.block_dimensions();

        let width = div_round_up(self.width, block_width).saturating_mul(block_width);
        let height = div_round_up(self.height, block_height).saturating_mul(block_height);

        Self {
            width,
            height,
            depth_or_array_layers: self.depth_or_array_layers,
        }
    }

    /// Calculates the maximum possible count of mipmaps.
    ///
    /// Treats the depth as part of the mipmaps. If calculating
    /// for a 2DArray texture, which does not mipmap depth, set depth to 1.
    pub fn max_mips(&self, dim: TextureDimension) -> u32 {
        match dim {
            TextureDimension::D1 => 1,
            TextureDimension::D2 => {
                let max_dim = self.width.max(self.height);
                32 - max_dim.leading_zeros()
            }
            TextureDimension::D3 => {
                let max_dim = self.width.max(self.height.max(self.depth_or_array_layers));
                32 - max_dim.leading_zeros()
            }
        }
    }

    /// Calculates the extent at a given mip level.
    /// Does *not* account for memory size being a multiple of block size.
    ///
    /// <https://gpuweb.github.io/gpuweb/#logical-miplevel-specific-texture-extent>
    pub fn mip_level_size(&self, level: u32, dim: TextureDimension) -> Self {
        // Shifting by 32 or more is an overflow; such levels are all 1.
        let shift = |value: u32| value.checked_shr(level).unwrap_or(0).max(1);
        Self {
            width: shift(self.width),
            height: match dim {
                TextureDimension::D1 => 1,
                _ => shift(self.height),
            },
            depth_or_array_layers: match dim {
                TextureDimension::D1 => 1,
                TextureDimension::D2 => self.depth_or_array_layers,
                TextureDimension::D3 => shift(self.depth_or_array_layers),
            },
        }
    }
}

#[test]
fn test_physical_size() {
    let format = TextureFormat::Bc1RgbaUnormSrgb; // 4x4 blocks
    assert_eq!(
        Extent3d {
            width: 7,
            height: 7,
            depth_or_array_layers: 1
        }
        .physical_size(format),
        Extent3d {
            width: 8,
            height: 8,
            depth_or_array_layers: 1
        }
    );
    let format = TextureFormat::Astc {
        block: AstcBlock::B8x5,
        channel: AstcChannel::Unorm,
    }; // 8x5 blocks
    assert_eq!(
        Extent3d {
            width: 7,
            height: 7,
            depth_or_array_layers: 1
        }
        .physical_size(format),
        Extent3d {
            width: 8,
            height: 10,
            depth_or_array_layers: 1
        }
    );
}

#[test]
fn test_max_mips() {
    let extent = Extent3d {
        width: 240,
        height: 1,
        depth_or_array_layers: 1,
    };
    assert_eq!(extent.max_mips(TextureDimension::D1), 1);
    let extent = Extent3d {
        width: 60,
        height: 60,
        depth_or_array_layers: 1,
    };
    assert_eq!(extent.max_mips(TextureDimension::D2), 6);
    let extent = Extent3d {
        width: 16,
        height: 30,
        depth_or_array_layers: 60,
    };
    assert_eq!(extent.max_mips(TextureDimension::D3), 6);
}

#[test]
fn test_mip_level_size() {
    let extent = Extent3d {
        width: 64,
        height: 16,
        depth_or_array_layers: 8,
    };
    assert_eq!(
        extent.mip_level_size(3, TextureDimension::D2),
        Extent3d {
            width: 8,
            height: 2,
            depth_or_array_layers: 8
        }
    );
    assert_eq!(
        extent.mip_level_size(3, TextureDimension::D3),
        Extent3d {
            width: 8,
            height: 2,
            depth_or_array_layers: 1
        }
    );
    assert_eq!(
        extent.mip_level_size(40, TextureDimension::D3),
        Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1
        }
    );
}

/// Describes a texture.
#[repr(C)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextureDescriptor<L> {
    /// Debug label of the texture.
    pub label: L,
    /// Size of the texture. All components must be greater than zero. For a
    /// regular 1D/2D texture, the unused sizes will be 1. For 2DArray textures,
    /// Z is the number of 2D textures in that array.
    pub size: Extent3d,
    /// Mip count of texture. For a texture with no extra mips, this must be 1.
    pub mip_level_count: u32,
    /// Sample count of texture. Multisampled textures can only be copied as
    /// whole subresources, and never to or from a buffer.
    pub sample_count: u32,
    /// Dimensions of the texture.
    pub dimension: TextureDimension,
    /// Format of the texture.
    pub format: TextureFormat,
    /// Allowed usages of the texture.
    pub usage: TextureUsages,
}

impl<L> TextureDescriptor<L> {
    /// Takes a closure and maps the label of the texture descriptor into another.
    pub fn map_label<K>(&self, fun: impl FnOnce(&L) -> K) -> TextureDescriptor<K> {
        TextureDescriptor {
            label: fun(&self.label),
            size: self.size,
            mip_level_count: self.mip_level_count,
            sample_count: self.sample_count,
            dimension: self.dimension,
            format: self.format,
            usage: self.usage,
        }
    }

    /// Calculates the extent at a given mip level.
    ///
    /// If the given mip level is larger than possible, returns None.
    ///
    /// ```rust
    /// # use texcopy_types as wgt;
    /// let desc = wgt::TextureDescriptor {
    ///   label: (),
    ///   size: wgt::Extent3d { width: 100, height: 60, depth_or_array_layers: 1 },
    ///   mip_level_count: 7,
    ///   sample_count: 1,
    ///   dimension: wgt::TextureDimension::D3,
    ///   format: wgt::TextureFormat::Rgba8Sint,
    ///   usage: wgt::TextureUsages::empty(),
    /// };
    ///
    /// assert_eq!(desc.mip_level_size(0), Some(wgt::Extent3d { width: 100, height: 60, depth_or_array_layers: 1 }));
    /// assert_eq!(desc.mip_level_size(3), Some(wgt::Extent3d { width: 12, height: 7, depth_or_array_layers: 1 }));
    /// assert_eq!(desc.mip_level_size(6), Some(wgt::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 }));
    /// assert_eq!(desc.mip_level_size(7), None);
    /// ```
    pub fn mip_level_size(&self, level: u32) -> Option<Extent3d> {
        if level >= self.mip_level_count {
            return None;
        }

        Some(self.size.mip_level_size(level, self.dimension))
    }

    /// Returns the number of array layers.
    ///
    /// <https://gpuweb.github.io/gpuweb/#abstract-opdef-array-layer-count>
    pub fn array_layer_count(&self) -> u32 {
        match self.dimension {
            TextureDimension::D1 | TextureDimension::D3 => 1,
            TextureDimension::D2 => self.size.depth_or_array_layers,
        }
    }
}

/// Kind of data the texture holds.
///
/// Corresponds to [WebGPU `GPUTextureAspect`](
/// https://gpuweb.github.io/gpuweb/#enumdef-gputextureaspect).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
#[cfg_attr(any(feature = "serde", test), derive(Serialize, Deserialize))]
#[cfg_attr(any(feature = "serde", test), serde(rename_all = "kebab-case"))]
pub enum TextureAspect {
    /// Depth, Stencil, and Color.
    #[default]
    All,
    /// Stencil.
    StencilOnly,
    /// Depth.
    DepthOnly,
}

#[test]
fn test_texture_aspect_names() {
    assert_eq!(
        serde_json::to_string(&TextureAspect::StencilOnly).unwrap(),
        "\"stencil-only\""
    );
    assert_eq!(
        serde_json::from_str::<TextureAspect>("\"depth-only\"").unwrap(),
        TextureAspect::DepthOnly
    );
}

/// Layout of a texture in a buffer's memory.
///
/// `None` in either stride means "not specified": the value is derived from the
/// copy extent, which is only allowed while the stride is not needed to address
/// the data (a single row of blocks, respectively a single image).
/// `Some(0)` is an explicit zero stride and is validated as such.
///
/// | Resolution | Format | Bytes per block | Pixels per block | Bytes per row                          | Rows per image               |
/// |------------|--------|-----------------|------------------|----------------------------------------|------------------------------|
/// | 256x256    | RGBA8  | 4               | 1 * 1 * 1        | 256 * 4 = Some(1024)                   | None                         |
/// | 32x16x8    | RGBA8  | 4               | 1 * 1 * 1        | 32 * 4 = 128 padded to 256 = Some(256) | None                         |
/// | 256x256    | BC3    | 16              | 4 * 4 * 1        | 16 * (256 / 4) = 1024 = Some(1024)     | None                         |
/// | 64x64x8    | BC3    | 16              | 4 * 4 * 1        | 16 * (64 / 4) = 256 = Some(256)        | 64 / 4 = 16 = Some(16)       |
///
/// Corresponds to [WebGPU `GPUImageDataLayout`](
/// https://gpuweb.github.io/gpuweb/#dictdef-gpuimagedatalayout).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageDataLayout {
    /// Offset into the buffer that is the start of the texture. Must be a multiple of texture block size.
    /// For non-compressed textures, this is 1.
    pub offset: BufferAddress,
    /// Bytes per "row" in an image.
    ///
    /// A row is one row of pixels or of compressed blocks in the x direction.
    ///
    /// This value is required if there are multiple rows (i.e. height or depth is more than one pixel or pixel block for compressed textures)
    ///
    /// Must be a multiple of 256 for buffer/texture copies recorded on a command
    /// encoder. Queue texture writes do not have this requirement.
    pub bytes_per_row: Option<u32>,
    /// "Rows" that make up a single "image".
    ///
    /// A row is one row of pixels or of compressed blocks in the x direction.
    ///
    /// An image is one layer in the z direction of a 3D image or 2DArray texture.
    ///
    /// The amount of rows per image may be larger than the actual amount of rows of data.
    ///
    /// Required if there are multiple images (i.e. the depth is more than one).
    pub rows_per_image: Option<u32>,
}

/// View of a buffer which can be used to copy to/from a texture.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageCopyBuffer<B> {
    /// The buffer to be copied to/from.
    pub buffer: B,
    /// The layout of the texture data in this buffer.
    pub layout: ImageDataLayout,
}

/// View of a texture which can be used to copy to/from a buffer/texture.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageCopyTexture<T> {
    /// The texture to be copied to/from.
    pub texture: T,
    /// The target mip level of the texture.
    pub mip_level: u32,
    /// The base texel of the texture in the selected `mip_level`. Together
    /// with the `copy_size` argument to copy functions, defines the
    /// sub-region of the texture to copy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub origin: Origin3d,
    /// The copy aspect.
    #[cfg_attr(feature = "serde", serde(default))]
    pub aspect: TextureAspect,
}

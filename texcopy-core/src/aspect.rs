//! Resolution of the texture aspect a copy reads or writes.

use crate::command::{CopySide, TransferError};

bitflags::bitflags! {
    /// Set of planes of a texture format.
    #[repr(transparent)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct FormatAspects: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;

        const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

impl FormatAspects {
    /// The aspects of `format` selected by `aspect`.
    ///
    /// Empty if the format has none of the requested aspects.
    pub fn new(format: wgt::TextureFormat, aspect: wgt::TextureAspect) -> Self {
        let aspect_mask = match aspect {
            wgt::TextureAspect::All => Self::all(),
            wgt::TextureAspect::DepthOnly => Self::DEPTH,
            wgt::TextureAspect::StencilOnly => Self::STENCIL,
        };
        Self::from(format) & aspect_mask
    }

    /// Returns `true` if only one flag is set
    pub fn is_one(&self) -> bool {
        self.bits().count_ones() == 1
    }
}

impl From<wgt::TextureFormat> for FormatAspects {
    fn from(format: wgt::TextureFormat) -> Self {
        let mut aspects = Self::empty();
        if format.has_color_aspect() {
            aspects |= Self::COLOR;
        }
        if format.has_depth_aspect() {
            aspects |= Self::DEPTH;
        }
        if format.has_stencil_aspect() {
            aspects |= Self::STENCIL;
        }
        aspects
    }
}

/// The operation an aspect is selected for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CopyKind {
    /// The texture is written from a buffer, or from data handed to the queue.
    BufferToTexture,
    /// The texture is read into a buffer.
    TextureToBuffer,
    /// The texture is one side of a texture-to-texture copy.
    TextureToTexture(CopySide),
}

/// Rejects depth formats whose bytes are not observable from a buffer.
///
/// See <https://gpuweb.github.io/gpuweb/#depth-formats>.
pub(crate) fn validate_texture_copy_src_format(
    format: wgt::TextureFormat,
    aspect: wgt::TextureAspect,
) -> Result<(), TransferError> {
    use wgt::TextureAspect as Ta;
    use wgt::TextureFormat as Tf;
    match (format, aspect) {
        (Tf::Depth24Plus, _) => Err(TransferError::CopyFromForbiddenTextureFormat(format)),
        (Tf::Depth24PlusStencil8, Ta::DepthOnly) => {
            Err(TransferError::CopyFromForbiddenTextureFormatAspect { format, aspect })
        }
        _ => Ok(()),
    }
}

/// Rejects depth formats that cannot be written from a buffer.
pub(crate) fn validate_texture_copy_dst_format(
    format: wgt::TextureFormat,
    aspect: wgt::TextureAspect,
) -> Result<(), TransferError> {
    use wgt::TextureAspect as Ta;
    use wgt::TextureFormat as Tf;
    match (format, aspect) {
        (Tf::Depth24Plus | Tf::Depth32Float, _) => {
            Err(TransferError::CopyToForbiddenTextureFormat(format))
        }
        (Tf::Depth24PlusStencil8 | Tf::Depth32FloatStencil8, Ta::DepthOnly) => {
            Err(TransferError::CopyToForbiddenTextureFormatAspect { format, aspect })
        }
        _ => Ok(()),
    }
}

/// Resolve the aspect `aspect` of `format` for a copy of the given kind.
///
/// Buffer copies move exactly one aspect, so `All` is only accepted on
/// formats that have a single one. Texture-to-texture copies have to name
/// every aspect of the format.
pub fn select_copy_aspect(
    format: wgt::TextureFormat,
    aspect: wgt::TextureAspect,
    kind: CopyKind,
) -> Result<FormatAspects, TransferError> {
    let aspects = FormatAspects::new(format, aspect);
    if aspects.is_empty() {
        return Err(TransferError::InvalidTextureAspect { format, aspect });
    }

    match kind {
        CopyKind::BufferToTexture => {
            validate_texture_copy_dst_format(format, aspect)?;
            if !aspects.is_one() {
                return Err(TransferError::CopyAspectNotOne);
            }
        }
        CopyKind::TextureToBuffer => {
            validate_texture_copy_src_format(format, aspect)?;
            if !aspects.is_one() {
                return Err(TransferError::CopyAspectNotOne);
            }
        }
        CopyKind::TextureToTexture(side) => {
            if aspects != FormatAspects::from(format) {
                return Err(match side {
                    CopySide::Source => TransferError::CopySrcMissingAspects,
                    CopySide::Destination => TransferError::CopyDstMissingAspects,
                });
            }
        }
    }

    Ok(aspects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgt::{TextureAspect as Ta, TextureFormat as Tf};

    #[test]
    fn aspects_of_formats() {
        assert_eq!(FormatAspects::from(Tf::Rgba8Unorm), FormatAspects::COLOR);
        assert_eq!(FormatAspects::from(Tf::Stencil8), FormatAspects::STENCIL);
        assert_eq!(FormatAspects::from(Tf::Depth16Unorm), FormatAspects::DEPTH);
        assert_eq!(
            FormatAspects::from(Tf::Depth32FloatStencil8),
            FormatAspects::DEPTH_STENCIL
        );
    }

    #[test]
    fn aspect_selection_masks_format() {
        assert_eq!(
            FormatAspects::new(Tf::Depth24PlusStencil8, Ta::StencilOnly),
            FormatAspects::STENCIL
        );
        assert!(FormatAspects::new(Tf::Rgba8Unorm, Ta::DepthOnly).is_empty());
        assert!(FormatAspects::new(Tf::Depth16Unorm, Ta::StencilOnly).is_empty());
        assert!(FormatAspects::new(Tf::Depth16Unorm, Ta::All).is_one());
        assert!(!FormatAspects::DEPTH_STENCIL.is_one());
    }

    #[test]
    fn missing_aspect_is_rejected() {
        assert!(matches!(
            select_copy_aspect(Tf::Rgba8Unorm, Ta::StencilOnly, CopyKind::TextureToBuffer),
            Err(TransferError::InvalidTextureAspect { .. })
        ));
        assert!(matches!(
            select_copy_aspect(Tf::Stencil8, Ta::DepthOnly, CopyKind::BufferToTexture),
            Err(TransferError::InvalidTextureAspect { .. })
        ));
    }

    #[test]
    fn buffer_copies_need_a_single_aspect() {
        assert!(matches!(
            select_copy_aspect(
                Tf::Depth32FloatStencil8,
                Ta::All,
                CopyKind::TextureToBuffer
            ),
            Err(TransferError::CopyAspectNotOne)
        ));
        assert_eq!(
            select_copy_aspect(Tf::Depth16Unorm, Ta::All, CopyKind::BufferToTexture).unwrap(),
            FormatAspects::DEPTH
        );
        assert_eq!(
            select_copy_aspect(
                Tf::Depth24PlusStencil8,
                Ta::StencilOnly,
                CopyKind::BufferToTexture
            )
            .unwrap(),
            FormatAspects::STENCIL
        );
    }

    #[test]
    fn depth_copy_directions() {
        assert!(matches!(
            select_copy_aspect(Tf::Depth24Plus, Ta::All, CopyKind::TextureToBuffer),
            Err(TransferError::CopyFromForbiddenTextureFormat(Tf::Depth24Plus))
        ));
        assert!(matches!(
            select_copy_aspect(
                Tf::Depth24PlusStencil8,
                Ta::DepthOnly,
                CopyKind::TextureToBuffer
            ),
            Err(TransferError::CopyFromForbiddenTextureFormatAspect { .. })
        ));
        assert!(select_copy_aspect(Tf::Depth32Float, Ta::All, CopyKind::TextureToBuffer).is_ok());
        assert!(matches!(
            select_copy_aspect(Tf::Depth32Float, Ta::All, CopyKind::BufferToTexture),
            Err(TransferError::CopyToForbiddenTextureFormat(Tf::Depth32Float))
        ));
        assert!(matches!(
            select_copy_aspect(
                Tf::Depth32FloatStencil8,
                Ta::DepthOnly,
                CopyKind::BufferToTexture
            ),
            Err(TransferError::CopyToForbiddenTextureFormatAspect { .. })
        ));
        assert!(
            select_copy_aspect(Tf::Depth16Unorm, Ta::DepthOnly, CopyKind::BufferToTexture).is_ok()
        );
    }

    #[test]
    fn texture_copies_need_every_aspect() {
        let src = CopyKind::TextureToTexture(CopySide::Source);
        let dst = CopyKind::TextureToTexture(CopySide::Destination);
        assert_eq!(
            select_copy_aspect(Tf::Depth24PlusStencil8, Ta::All, src).unwrap(),
            FormatAspects::DEPTH_STENCIL
        );
        assert!(matches!(
            select_copy_aspect(Tf::Depth24PlusStencil8, Ta::StencilOnly, src),
            Err(TransferError::CopySrcMissingAspects)
        ));
        assert!(matches!(
            select_copy_aspect(Tf::Depth32FloatStencil8, Ta::DepthOnly, dst),
            Err(TransferError::CopyDstMissingAspects)
        ));
        assert!(select_copy_aspect(Tf::Depth24Plus, Ta::All, dst).is_ok());
    }
}

use texcopy_core::{
    aspect::FormatAspects,
    command::{CopyErrorKind, TransferCommand, TransferError},
    resource::TextureErrorDimension,
};
use wgt::{TextureAspect, TextureFormat};

use crate::common::{
    buffer, device, extent, image_copy_buffer, image_copy_texture, layout, origin, TextureBuilder,
};

#[test]
fn stencil_copies_cover_the_whole_level() {
    let device = device();
    let texture =
        TextureBuilder::new(TextureFormat::Depth24PlusStencil8, extent(16, 16, 1)).build(&device);
    let dst = buffer(&device, 4096);
    let mut encoder = device.create_command_encoder(None);
    let src = image_copy_texture(&texture, 0, origin(0, 0, 0), TextureAspect::StencilOnly);
    let dst = image_copy_buffer(&dst, layout(0, Some(256), None));

    encoder
        .copy_texture_to_buffer(&src, &dst, &extent(16, 16, 1))
        .unwrap();

    let error = encoder
        .copy_texture_to_buffer(&src, &dst, &extent(15, 15, 1))
        .unwrap_err();
    assert!(matches!(
        error,
        TransferError::UnsupportedPartialTransfer {
            format: TextureFormat::Depth24PlusStencil8,
            dimension: TextureErrorDimension::X,
            end_offset: 15,
            texture_size: 16,
            ..
        }
    ));
    assert_eq!(error.kind(), CopyErrorKind::PartialAspectCopyNotAllowed);
}

#[test]
fn depth_layers_may_be_partial() {
    let device = device();
    let texture =
        TextureBuilder::new(TextureFormat::Depth32Float, extent(8, 8, 4)).build(&device);
    let dst = buffer(&device, 8192);
    let mut encoder = device.create_command_encoder(None);

    encoder
        .copy_texture_to_buffer(
            &image_copy_texture(&texture, 0, origin(0, 0, 1), TextureAspect::DepthOnly),
            &image_copy_buffer(&dst, layout(0, Some(256), Some(8))),
            &extent(8, 8, 2),
        )
        .unwrap();

    let commands = encoder.finish().unwrap().into_commands();
    match commands.as_slice() {
        [TransferCommand::CopyTextureToBuffer { regions, .. }] => {
            assert_eq!(regions.len(), 2);
            assert_eq!(regions[0].texture_base.array_layer, 1);
            assert_eq!(regions[0].texture_base.aspect, FormatAspects::DEPTH);
            assert_eq!(regions[1].buffer_layout.offset, 2048);
        }
        other => panic!("unexpected commands {other:?}"),
    }
}

#[test]
fn buffer_copies_name_one_aspect() {
    let device = device();
    let texture =
        TextureBuilder::new(TextureFormat::Depth32FloatStencil8, extent(4, 4, 1)).build(&device);
    let src = buffer(&device, 4096);
    let mut encoder = device.create_command_encoder(None);

    let error = encoder
        .copy_buffer_to_texture(
            &image_copy_buffer(&src, layout(0, Some(256), None)),
            &image_copy_texture(&texture, 0, origin(0, 0, 0), TextureAspect::All),
            &extent(4, 4, 1),
        )
        .unwrap_err();
    assert!(matches!(error, TransferError::CopyAspectNotOne));
    assert_eq!(error.kind(), CopyErrorKind::UnsupportedAspect);

    encoder
        .copy_buffer_to_texture(
            &image_copy_buffer(&src, layout(0, Some(256), None)),
            &image_copy_texture(&texture, 0, origin(0, 0, 0), TextureAspect::StencilOnly),
            &extent(4, 4, 1),
        )
        .unwrap();
}

#[test]
fn forbidden_depth_directions() {
    let device = device();
    let buf = buffer(&device, 4096);
    let buffer_layout = layout(0, Some(256), None);
    let mut encoder = device.create_command_encoder(None);

    let depth24 = TextureBuilder::new(TextureFormat::Depth24Plus, extent(4, 4, 1)).build(&device);
    assert!(matches!(
        encoder.copy_texture_to_buffer(
            &image_copy_texture(&depth24, 0, origin(0, 0, 0), TextureAspect::All),
            &image_copy_buffer(&buf, buffer_layout),
            &extent(4, 4, 1),
        ),
        Err(TransferError::CopyFromForbiddenTextureFormat(
            TextureFormat::Depth24Plus
        ))
    ));

    let depth24_stencil =
        TextureBuilder::new(TextureFormat::Depth24PlusStencil8, extent(4, 4, 1)).build(&device);
    assert!(matches!(
        encoder.copy_texture_to_buffer(
            &image_copy_texture(&depth24_stencil, 0, origin(0, 0, 0), TextureAspect::DepthOnly),
            &image_copy_buffer(&buf, buffer_layout),
            &extent(4, 4, 1),
        ),
        Err(TransferError::CopyFromForbiddenTextureFormatAspect {
            aspect: TextureAspect::DepthOnly,
            ..
        })
    ));

    let depth32 = TextureBuilder::new(TextureFormat::Depth32Float, extent(4, 4, 1)).build(&device);
    assert!(matches!(
        encoder.copy_buffer_to_texture(
            &image_copy_buffer(&buf, buffer_layout),
            &image_copy_texture(&depth32, 0, origin(0, 0, 0), TextureAspect::DepthOnly),
            &extent(4, 4, 1),
        ),
        Err(TransferError::CopyToForbiddenTextureFormat(
            TextureFormat::Depth32Float
        ))
    ));
    encoder
        .copy_texture_to_buffer(
            &image_copy_texture(&depth32, 0, origin(0, 0, 0), TextureAspect::DepthOnly),
            &image_copy_buffer(&buf, buffer_layout),
            &extent(4, 4, 1),
        )
        .unwrap();
}

#[test]
fn missing_aspect() {
    let device = device();
    let texture = TextureBuilder::new(TextureFormat::Rgba8Unorm, extent(4, 4, 1)).build(&device);
    let buf = buffer(&device, 4096);
    let mut encoder = device.create_command_encoder(None);

    assert!(matches!(
        encoder.copy_texture_to_buffer(
            &image_copy_texture(&texture, 0, origin(0, 0, 0), TextureAspect::StencilOnly),
            &image_copy_buffer(&buf, layout(0, Some(256), None)),
            &extent(4, 4, 1),
        ),
        Err(TransferError::InvalidTextureAspect {
            format: TextureFormat::Rgba8Unorm,
            aspect: TextureAspect::StencilOnly,
        })
    ));
}

#[test]
fn combined_texture_copies_split_by_aspect() {
    let device = device();
    let src = TextureBuilder::new(TextureFormat::Depth24PlusStencil8, extent(8, 8, 1))
        .build(&device);
    let dst = TextureBuilder::new(TextureFormat::Depth24PlusStencil8, extent(8, 8, 1))
        .build(&device);
    let mut encoder = device.create_command_encoder(None);

    assert!(matches!(
        encoder.copy_texture_to_texture(
            &image_copy_texture(&src, 0, origin(0, 0, 0), TextureAspect::StencilOnly),
            &image_copy_texture(&dst, 0, origin(0, 0, 0), TextureAspect::StencilOnly),
            &extent(8, 8, 1),
        ),
        Err(TransferError::CopySrcMissingAspects)
    ));

    let mut encoder = device.create_command_encoder(None);
    encoder
        .copy_texture_to_texture(
            &image_copy_texture(&src, 0, origin(0, 0, 0), TextureAspect::All),
            &image_copy_texture(&dst, 0, origin(0, 0, 0), TextureAspect::All),
            &extent(8, 8, 1),
        )
        .unwrap();
    let commands = encoder.finish().unwrap().into_commands();
    match commands.as_slice() {
        [TransferCommand::CopyTextureToTexture { regions, .. }] => {
            let aspects: Vec<_> = regions
                .iter()
                .map(|region| (region.src_base.aspect, region.dst_base.aspect))
                .collect();
            assert_eq!(
                aspects,
                vec![
                    (FormatAspects::DEPTH, FormatAspects::DEPTH),
                    (FormatAspects::STENCIL, FormatAspects::STENCIL),
                ]
            );
        }
        other => panic!("unexpected commands {other:?}"),
    }
}

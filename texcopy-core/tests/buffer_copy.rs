//! Tests for buffer copy validation.

use std::borrow::Cow;

use texcopy_core::command::{CommandEncoderError, CopySide, TransferCommand, TransferError};
use wgt::BufferAddress;

use crate::common::{buffer, device};

const BUFFER_SIZE: BufferAddress = 1234;

fn try_write(offset: BufferAddress, size: usize) -> Result<(), TransferError> {
    let device = device();
    let buffer = buffer(&device, BUFFER_SIZE);
    let data = vec![255; size];
    match device.queue().write_buffer(&buffer, offset, &data) {
        Ok(_) => Ok(()),
        Err(texcopy_core::device::QueueWriteError::Transfer(error)) => Err(error),
    }
}

#[test]
fn write_alignment() {
    assert!(try_write(0, 0).is_ok());
    assert!(matches!(
        try_write(4, 16 + 1),
        Err(TransferError::UnalignedCopySize(17))
    ));
    assert!(matches!(
        try_write(64, 20 + 2),
        Err(TransferError::UnalignedCopySize(22))
    ));
    assert!(try_write(1024, 8 + 4).is_ok());

    assert!(try_write(0, 4).is_ok());
    assert!(matches!(
        try_write(4 + 1, 8),
        Err(TransferError::UnalignedBufferOffset(5))
    ));
    assert!(matches!(
        try_write(256 + 3, 16),
        Err(TransferError::UnalignedBufferOffset(259))
    ));
    assert!(try_write(1024 + 4, 4).is_ok());
}

#[test]
fn write_overrun() {
    assert!(try_write(1228, 4).is_ok());
    assert!(matches!(
        try_write(1232, 4),
        Err(TransferError::BufferOverrun {
            start_offset: 1232,
            end_offset: 1236,
            buffer_size: BUFFER_SIZE,
            side: CopySide::Destination,
        })
    ));
}

#[test]
fn empty_write_is_not_staged() {
    let device = device();
    let buffer = buffer(&device, 16);
    let staged = device.queue().write_buffer(&buffer, 16, &[]).unwrap();
    assert!(staged.is_none());

    let staged = device
        .queue()
        .write_buffer(&buffer, 8, &[1, 2, 3, 4])
        .unwrap()
        .unwrap();
    assert_eq!(staged.region.dst_offset, 8);
    assert_eq!(staged.region.size.get(), 4);
    assert_eq!(staged.data, vec![1, 2, 3, 4]);
}

#[test]
fn write_requires_copy_dst() {
    let device = device();
    let buffer = device
        .create_buffer(&wgt::BufferDescriptor {
            label: Some(Cow::Borrowed("upload")),
            size: 64,
            usage: wgt::BufferUsages::MAP_WRITE | wgt::BufferUsages::COPY_SRC,
            mapped_at_creation: true,
        })
        .unwrap();
    let error = device
        .queue()
        .write_buffer(&buffer, 0, &[0; 4])
        .unwrap_err();
    assert!(error.to_string().contains("'upload'"));
}

#[test]
fn copy_records_region() {
    let device = device();
    let src = buffer(&device, 64);
    let dst = buffer(&device, 64);

    let mut encoder = device.create_command_encoder(None);
    encoder.copy_buffer_to_buffer(&src, 0, &dst, 32, 32).unwrap();
    encoder.copy_buffer_to_buffer(&src, 64, &dst, 0, 0).unwrap();
    let commands = encoder.finish().unwrap().into_commands();

    assert_eq!(commands.len(), 1);
    match commands[0] {
        TransferCommand::CopyBufferToBuffer { ref region, .. } => {
            assert_eq!(region.src_offset, 0);
            assert_eq!(region.dst_offset, 32);
            assert_eq!(region.size.get(), 32);
        }
        ref other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn copy_errors() {
    let device = device();
    let src = buffer(&device, 64);
    let dst = buffer(&device, 64);
    let mut encoder = device.create_command_encoder(None);

    assert!(matches!(
        encoder.copy_buffer_to_buffer(&src, 0, &src, 32, 16),
        Err(TransferError::SameSourceDestinationBuffer)
    ));
    assert!(matches!(
        encoder.copy_buffer_to_buffer(&src, 0, &dst, 0, 6),
        Err(TransferError::UnalignedCopySize(6))
    ));
    assert!(matches!(
        encoder.copy_buffer_to_buffer(&src, 2, &dst, 0, 4),
        Err(TransferError::UnalignedBufferOffset(2))
    ));
    assert!(matches!(
        encoder.copy_buffer_to_buffer(&src, 0, &dst, 48, 32),
        Err(TransferError::BufferOverrun {
            end_offset: 80,
            side: CopySide::Destination,
            ..
        })
    ));
    assert!(matches!(
        encoder.copy_buffer_to_buffer(&src, u64::MAX - 3, &dst, 0, 4),
        Err(TransferError::SizeOverflow)
    ));
}

#[test]
fn first_error_invalidates_encoder() {
    let device = device();
    let src = buffer(&device, 64);
    let dst = buffer(&device, 64);

    let mut encoder = device.create_command_encoder(Some(Cow::Borrowed("uploads")));
    encoder.copy_buffer_to_buffer(&src, 0, &dst, 0, 16).unwrap();
    assert!(encoder
        .copy_buffer_to_buffer(&src, 0, &dst, 0, 128)
        .is_err());
    assert!(encoder.is_invalid());
    assert!(encoder
        .copy_buffer_to_buffer(&src, 0, &dst, 0, 3)
        .is_err());

    match encoder.finish() {
        Err(CommandEncoderError::Invalid { label, source }) => {
            assert_eq!(label, "uploads");
            assert!(matches!(source, TransferError::BufferOverrun { .. }));
        }
        Ok(_) => panic!("encoder should be invalid"),
    }
}

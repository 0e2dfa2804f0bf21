mod transfer;

use std::sync::Arc;

use thiserror::Error;
use wgt::{BufferAddress, Extent3d};

use crate::{
    api_log,
    resource::Buffer,
    Label, LabelHelpers,
};

pub use self::transfer::*;

#[derive(Clone, Debug, Error)]
pub enum CommandEncoderError {
    #[error("Command encoder {label:?} is invalid")]
    Invalid {
        label: String,
        #[source]
        source: TransferError,
    },
}

/// Records validated copies.
///
/// The first failed copy invalidates the encoder: later copies are still
/// validated and report their own errors, but nothing more is recorded and
/// [`CommandEncoder::finish`] reports the first error.
#[derive(Debug)]
pub struct CommandEncoder {
    label: String,
    commands: Vec<TransferCommand>,
    error: Option<TransferError>,
}

impl CommandEncoder {
    pub(crate) fn new(label: &Label) -> Self {
        Self {
            label: label.borrow_or_default().to_string(),
            commands: Vec::new(),
            error: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` if a copy failed on this encoder.
    pub fn is_invalid(&self) -> bool {
        self.error.is_some()
    }

    fn record(
        &mut self,
        result: Result<Option<TransferCommand>, TransferError>,
    ) -> Result<(), TransferError> {
        match result {
            Ok(Some(command)) if self.error.is_none() => {
                self.commands.push(command);
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(error) => {
                if self.error.is_none() {
                    log::warn!("Encoder {:?} is invalid: {}", self.label, error);
                    self.error = Some(error.clone());
                }
                Err(error)
            }
        }
    }

    pub fn copy_buffer_to_buffer(
        &mut self,
        source: &Arc<Buffer>,
        source_offset: BufferAddress,
        destination: &Arc<Buffer>,
        destination_offset: BufferAddress,
        size: BufferAddress,
    ) -> Result<(), TransferError> {
        profiling::scope!("CommandEncoder::copy_buffer_to_buffer");
        api_log!(
            "CommandEncoder::copy_buffer_to_buffer {:?} -> {:?} {size:?}bytes",
            source.label(),
            destination.label()
        );

        let result = copy_buffer_to_buffer(
            source,
            source_offset,
            destination,
            destination_offset,
            size,
        );
        self.record(result)
    }

    pub fn copy_buffer_to_texture(
        &mut self,
        source: &ImageCopyBuffer,
        destination: &ImageCopyTexture,
        copy_size: &Extent3d,
    ) -> Result<(), TransferError> {
        profiling::scope!("CommandEncoder::copy_buffer_to_texture");
        api_log!(
            "CommandEncoder::copy_buffer_to_texture {:?} -> {:?} {copy_size:?}",
            source.buffer.label(),
            destination.texture.label()
        );

        let result = copy_buffer_to_texture(source, destination, copy_size);
        self.record(result)
    }

    pub fn copy_texture_to_buffer(
        &mut self,
        source: &ImageCopyTexture,
        destination: &ImageCopyBuffer,
        copy_size: &Extent3d,
    ) -> Result<(), TransferError> {
        profiling::scope!("CommandEncoder::copy_texture_to_buffer");
        api_log!(
            "CommandEncoder::copy_texture_to_buffer {:?} -> {:?} {copy_size:?}",
            source.texture.label(),
            destination.buffer.label()
        );

        let result = copy_texture_to_buffer(source, destination, copy_size);
        self.record(result)
    }

    pub fn copy_texture_to_texture(
        &mut self,
        source: &ImageCopyTexture,
        destination: &ImageCopyTexture,
        copy_size: &Extent3d,
    ) -> Result<(), TransferError> {
        profiling::scope!("CommandEncoder::copy_texture_to_texture");
        api_log!(
            "CommandEncoder::copy_texture_to_texture {:?} -> {:?} {copy_size:?}",
            source.texture.label(),
            destination.texture.label()
        );

        let result = copy_texture_to_texture(source, destination, copy_size);
        self.record(result)
    }

    pub fn finish(self) -> Result<CommandBuffer, CommandEncoderError> {
        profiling::scope!("CommandEncoder::finish");
        api_log!("CommandEncoder::finish {:?}", self.label);

        match self.error {
            Some(source) => Err(CommandEncoderError::Invalid {
                label: self.label,
                source,
            }),
            None => Ok(CommandBuffer {
                label: self.label,
                commands: self.commands,
            }),
        }
    }
}

/// The copies of a finished encoder, in recording order.
#[derive(Debug)]
pub struct CommandBuffer {
    label: String,
    commands: Vec<TransferCommand>,
}

impl CommandBuffer {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn commands(&self) -> &[TransferCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<TransferCommand> {
        self.commands
    }
}

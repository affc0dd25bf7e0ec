use crate::{
    capture::profile::EncodingProfile,
    devices::AudioTrack,
    foundation::error::{PhotocardError, PhotocardResult},
    render::{composite::flatten_to_opaque_rgba8, frame::FrameRGBA},
};

/// Everything an encoder needs to know up front.
#[derive(Clone, Debug)]
pub struct EncodeRequest {
    pub profile: EncodingProfile,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub audio: Option<AudioTrack>,
    /// Straight-alpha colour that transparent canvas pixels are flattened over.
    pub background: [u8; 4],
}

impl EncodeRequest {
    pub fn validate(&self) -> PhotocardResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PhotocardError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(PhotocardError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(PhotocardError::validation(
                "encode width/height must be even (required for yuv420p output)",
            ));
        }
        Ok(())
    }

    pub(crate) fn check_frame(&self, frame: &FrameRGBA) -> PhotocardResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(PhotocardError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// A running encoder. Chunks come out in emission order.
pub trait Encoder {
    /// Mime type actually produced.
    fn mime_type(&self) -> &str;
    fn push_frame(&mut self, frame: &FrameRGBA) -> PhotocardResult<()>;
    /// Move every chunk emitted so far into `out`.
    fn poll_chunks(&mut self, out: &mut Vec<Vec<u8>>) -> PhotocardResult<()>;
    /// Flush and return the remaining chunks.
    fn finish(self: Box<Self>) -> PhotocardResult<Vec<Vec<u8>>>;
    /// Stop without producing output.
    fn abort(self: Box<Self>);
}

pub trait EncoderFactory {
    fn supports(&self, mime_type: &str) -> bool;
    fn create(&mut self, request: &EncodeRequest) -> PhotocardResult<Box<dyn Encoder>>;
}

pub const RAW_MIME_TYPE: &str = "video/x-raw";

/// Encoder that emits every pushed frame as one opaque RGBA8 chunk.
///
/// It accepts no preferred profile, so selection always lands on the host default.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawEncoderFactory;

impl EncoderFactory for RawEncoderFactory {
    fn supports(&self, mime_type: &str) -> bool {
        mime_type == RAW_MIME_TYPE
    }

    fn create(&mut self, request: &EncodeRequest) -> PhotocardResult<Box<dyn Encoder>> {
        request.validate()?;
        if let Some(m) = request.profile.mime_type.as_deref()
            && m != RAW_MIME_TYPE
        {
            return Err(PhotocardError::encode(format!(
                "raw encoder cannot produce '{m}'"
            )));
        }
        Ok(Box::new(RawEncoder {
            request: request.clone(),
            pending: Vec::new(),
        }))
    }
}

struct RawEncoder {
    request: EncodeRequest,
    pending: Vec<Vec<u8>>,
}

impl Encoder for RawEncoder {
    fn mime_type(&self) -> &str {
        RAW_MIME_TYPE
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> PhotocardResult<()> {
        self.request.check_frame(frame)?;
        let mut chunk = vec![0u8; frame.data.len()];
        flatten_to_opaque_rgba8(&mut chunk, &frame.data, self.request.background)?;
        self.pending.push(chunk);
        Ok(())
    }

    fn poll_chunks(&mut self, out: &mut Vec<Vec<u8>>) -> PhotocardResult<()> {
        out.append(&mut self.pending);
        Ok(())
    }

    fn finish(self: Box<Self>) -> PhotocardResult<Vec<Vec<u8>>> {
        Ok(self.pending)
    }

    fn abort(self: Box<Self>) {}
}

#[cfg(test)]
#[path = "../../tests/unit/capture/encoder.rs"]
mod tests;

use crate::{
    capture::{
        buffer::{MediaBuffer, RecordedFile},
        encoder::{EncodeRequest, Encoder, EncoderFactory},
        profile::{EncodingProfile, FALLBACK_MIME_TYPE, select_profile},
    },
    devices::AudioTrack,
    foundation::error::{PhotocardError, PhotocardResult},
    render::frame::FrameRGBA,
};

/// Canvas geometry and rate shared by every attempt.
#[derive(Clone, Copy, Debug)]
pub struct CaptureFormat {
    pub side: u32,
    pub fps: u32,
    pub background: [u8; 4],
}

struct Active {
    encoder: Box<dyn Encoder>,
    profile: EncodingProfile,
    armed: bool,
}

/// One recording attempt at a time: prepare, arm, push, finalize (or discard).
pub struct CapturePipeline {
    format: CaptureFormat,
    active: Option<Active>,
    buffer: MediaBuffer,
    frames_pushed: u64,
    scratch: Vec<Vec<u8>>,
}

impl CapturePipeline {
    pub fn new(format: CaptureFormat) -> Self {
        Self {
            format,
            active: None,
            buffer: MediaBuffer::new(),
            frames_pushed: 0,
            scratch: Vec::new(),
        }
    }

    /// Pick a profile and construct the encoder. Any previous attempt is discarded.
    pub fn prepare(
        &mut self,
        factory: &mut dyn EncoderFactory,
        audio: Option<AudioTrack>,
    ) -> PhotocardResult<&EncodingProfile> {
        self.discard();
        let profile = select_profile(|m| factory.supports(m));
        let request = EncodeRequest {
            profile: profile.clone(),
            width: self.format.side,
            height: self.format.side,
            fps: self.format.fps,
            audio,
            background: self.format.background,
        };
        let encoder = factory.create(&request)?;
        tracing::info!(
            requested = profile.mime_type.as_deref().unwrap_or("<host default>"),
            produced = encoder.mime_type(),
            "encoder ready"
        );
        let active = self.active.insert(Active {
            encoder,
            profile,
            armed: false,
        });
        Ok(&active.profile)
    }

    pub fn is_prepared(&self) -> bool {
        self.active.is_some()
    }

    /// Start accepting frames.
    pub fn arm(&mut self) -> PhotocardResult<()> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| PhotocardError::encode("arm called without a prepared encoder"))?;
        active.armed = true;
        Ok(())
    }

    pub fn is_armed(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.armed)
    }

    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    /// Feed one canvas frame. Ignored unless armed.
    pub fn push_frame(&mut self, frame: &FrameRGBA) -> PhotocardResult<()> {
        let Some(active) = self.active.as_mut().filter(|a| a.armed) else {
            return Ok(());
        };
        active.encoder.push_frame(frame)?;
        self.frames_pushed += 1;
        Ok(())
    }

    /// Move emitted chunks into the buffer.
    pub fn pump(&mut self) -> PhotocardResult<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        active.encoder.poll_chunks(&mut self.scratch)?;
        for chunk in self.scratch.drain(..) {
            self.buffer.push(chunk);
        }
        Ok(())
    }

    /// Flush the encoder and concatenate everything buffered. The buffer keeps its chunks
    /// until [`reset`](Self::reset).
    pub fn finalize(&mut self) -> PhotocardResult<RecordedFile> {
        self.pump()?;
        let active = self
            .active
            .take()
            .ok_or_else(|| PhotocardError::encode("finalize called without an encoder"))?;
        let mime = active.encoder.mime_type().to_string();
        for chunk in active.encoder.finish()? {
            self.buffer.push(chunk);
        }
        let mime = if mime.is_empty() {
            FALLBACK_MIME_TYPE.to_string()
        } else {
            mime
        };
        tracing::info!(
            mime = %mime,
            chunks = self.buffer.len(),
            bytes = self.buffer.total_bytes(),
            frames = self.frames_pushed,
            "recording finalized"
        );
        Ok(RecordedFile::new(mime, self.buffer.concat()))
    }

    /// Abort the current attempt and drop anything it produced.
    pub fn discard(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!("discarding encoder");
            active.encoder.abort();
        }
        self.reset();
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.frames_pushed = 0;
    }

    pub fn buffer(&self) -> &MediaBuffer {
        &self.buffer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/pipeline.rs"]
mod tests;

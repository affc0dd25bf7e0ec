//! Turning composited canvas frames into a recorded file.
//!
//! [`pipeline::CapturePipeline`] owns one encoder per attempt: it is created when a session
//! starts (so an unsupported environment fails fast), fed frames once armed, and drained into a
//! [`buffer::MediaBuffer`] on every controller turn.

pub(crate) mod buffer;
pub(crate) mod encoder;
pub(crate) mod ffmpeg;
pub(crate) mod pipeline;
pub(crate) mod profile;

//! Probing and decoding of clip files through the system `ffprobe`/`ffmpeg` binaries.
//!
//! Everything here is behind the `media-ffmpeg` feature. Without it the entry points exist but
//! return [`PhotocardError::Device`](crate::PhotocardError::Device).

pub(crate) mod probe;

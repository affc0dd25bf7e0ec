use crate::capture::profile::extension_for_mime;

/// Encoded chunks in emission order.
#[derive(Clone, Debug, Default)]
pub struct MediaBuffer {
    chunks: Vec<Vec<u8>>,
    total_bytes: usize,
}

impl MediaBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Empty chunks are dropped and `false` is returned.
    pub fn push(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn concat(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_bytes);
        for c in &self.chunks {
            out.extend_from_slice(c);
        }
        out
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }
}

/// A finished recording held for preview and export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedFile {
    pub mime_type: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl RecordedFile {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime_type = mime_type.into();
        Self {
            extension: extension_for_mime(&mime_type).to_string(),
            mime_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/buffer.rs"]
mod tests;

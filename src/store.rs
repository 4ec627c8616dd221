use crate::{
    error::{PixelcastError, PixelcastResult},
    model::Frame,
};

/// Catalog of saved frames. Commits are zero-suppressed: an all-dark frame
/// never becomes a catalog entry.
#[derive(Clone, Debug, Default)]
pub struct FrameStore {
    frames: Vec<Frame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> PixelcastResult<&Frame> {
        self.frames
            .get(index)
            .ok_or_else(|| self.range_err(index))
    }

    pub fn get_mut(&mut self, index: usize) -> PixelcastResult<&mut Frame> {
        let len = self.frames.len();
        self.frames
            .get_mut(index)
            .ok_or_else(|| range_err(index, len))
    }

    /// Appends a copy of `frame` unless it is blank. Returns whether an
    /// entry was added, so callers know whether to persist.
    pub fn commit(&mut self, frame: &Frame) -> bool {
        if frame.is_blank() {
            return false;
        }
        self.frames.push(frame.clone());
        true
    }

    pub fn remove(&mut self, index: usize) -> PixelcastResult<Frame> {
        if index >= self.frames.len() {
            return Err(self.range_err(index));
        }
        Ok(self.frames.remove(index))
    }

    /// Decodes every entry before touching the catalog; one malformed entry
    /// fails the whole batch and leaves the catalog unchanged.
    pub fn import_hex(&mut self, entries: &[String]) -> PixelcastResult<usize> {
        let mut decoded = Vec::with_capacity(entries.len());
        for (i, hex) in entries.iter().enumerate() {
            let frame = Frame::from_hex(hex).map_err(|e| {
                PixelcastError::import_decode(format!("frame entry {i}: {e}"))
            })?;
            decoded.push(frame);
        }
        let count = decoded.len();
        self.frames.extend(decoded);
        Ok(count)
    }

    /// Parses a JSON array of hex strings (the export format) and imports it
    /// atomically.
    pub fn import_json(&mut self, json: &str) -> PixelcastResult<usize> {
        let entries: Vec<String> = serde_json::from_str(json)
            .map_err(|e| PixelcastError::import_decode(format!("frame import: {e}")))?;
        self.import_hex(&entries)
    }

    pub fn export_hex(&self) -> Vec<String> {
        self.frames.iter().map(Frame::to_hex).collect()
    }

    fn range_err(&self, index: usize) -> PixelcastError {
        range_err(index, self.frames.len())
    }
}

fn range_err(index: usize, len: usize) -> PixelcastError {
    PixelcastError::index_out_of_range(format!("frame {index} outside catalog of {len}"))
}

use crate::{
    error::{PixelcastError, PixelcastResult},
    model::{Frame, Timeline},
};

/// Catalog of timelines plus the "active" pointer the editor and the
/// playback scheduler both work against. The catalog may be empty, in which
/// case nothing is active.
#[derive(Clone, Debug, Default)]
pub struct TimelineStore {
    timelines: Vec<Timeline>,
    active: Option<usize>,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_timelines(timelines: Vec<Timeline>) -> Self {
        let active = if timelines.is_empty() { None } else { Some(0) };
        Self { timelines, active }
    }

    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&Timeline> {
        self.active.and_then(|i| self.timelines.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut Timeline> {
        let index = self.active?;
        self.timelines.get_mut(index)
    }

    pub fn get(&self, index: usize) -> PixelcastResult<&Timeline> {
        self.timelines
            .get(index)
            .ok_or_else(|| range_err(index, self.timelines.len()))
    }

    pub fn get_mut(&mut self, index: usize) -> PixelcastResult<&mut Timeline> {
        let len = self.timelines.len();
        self.timelines
            .get_mut(index)
            .ok_or_else(|| range_err(index, len))
    }

    pub fn set_active(&mut self, index: usize) -> PixelcastResult<()> {
        if index >= self.timelines.len() {
            return Err(range_err(index, self.timelines.len()));
        }
        self.active = Some(index);
        Ok(())
    }

    /// Appends a fresh timeline (default speed, repeating) and makes it
    /// active. Returns its index.
    pub fn create(&mut self, name: &str) -> PixelcastResult<usize> {
        let timeline = Timeline::new(name)?;
        self.timelines.push(timeline);
        let index = self.timelines.len() - 1;
        self.active = Some(index);
        Ok(index)
    }

    /// Removes a timeline. If it was active, activation falls back to the
    /// first remaining timeline, or to none when the catalog empties.
    pub fn delete(&mut self, index: usize) -> PixelcastResult<Timeline> {
        if index >= self.timelines.len() {
            return Err(range_err(index, self.timelines.len()));
        }
        let removed = self.timelines.remove(index);

        self.active = match self.active {
            _ if self.timelines.is_empty() => None,
            Some(a) if a == index => Some(0),
            Some(a) if a > index => Some(a - 1),
            other => other,
        };
        Ok(removed)
    }

    /// Inserts `frame` into the active timeline at `at`, unless the frame is
    /// blank (zero-suppression, as for the saved catalog). Returns the
    /// cursor position just after the inserted frame, or `None` when the
    /// insert was suppressed.
    pub fn insert_frame(&mut self, at: usize, frame: &Frame) -> PixelcastResult<Option<usize>> {
        let timeline = self
            .active_mut()
            .ok_or_else(|| PixelcastError::validation("no active timeline to insert into"))?;
        if at > timeline.frames.len() {
            return Err(PixelcastError::index_out_of_range(format!(
                "insert position {at} outside timeline of {} frames",
                timeline.frames.len()
            )));
        }
        if frame.is_blank() {
            return Ok(None);
        }
        timeline.frames.insert(at, frame.clone());
        Ok(Some(at + 1))
    }

    /// Parses a JSON array of `{name, frames: [hex], speed, repeat}` objects
    /// and imports it atomically: any malformed entry (including a bad frame
    /// hex) rejects the whole batch.
    pub fn import_json(&mut self, json: &str) -> PixelcastResult<usize> {
        let imported: Vec<Timeline> = serde_json::from_str(json)
            .map_err(|e| PixelcastError::import_decode(format!("timeline import: {e}")))?;
        for timeline in &imported {
            timeline
                .validate()
                .map_err(|e| PixelcastError::import_decode(format!("timeline import: {e}")))?;
        }

        let count = imported.len();
        self.timelines.extend(imported);
        if self.active.is_none() && !self.timelines.is_empty() {
            self.active = Some(0);
        }
        Ok(count)
    }

    pub fn export_json(&self) -> PixelcastResult<String> {
        serde_json::to_string(&self.timelines)
            .map_err(|e| PixelcastError::storage(format!("timeline export: {e}")))
    }
}

fn range_err(index: usize, len: usize) -> PixelcastError {
    PixelcastError::index_out_of_range(format!("timeline {index} outside catalog of {len}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_frame(hex: &str) -> Frame {
        Frame::from_hex(hex).unwrap()
    }

    #[test]
    fn create_activates_new_timeline() {
        let mut store = TimelineStore::new();
        assert_eq!(store.create("a").unwrap(), 0);
        assert_eq!(store.create("b").unwrap(), 1);
        assert_eq!(store.active_index(), Some(1));
    }

    #[test]
    fn create_rejects_empty_name() {
        let mut store = TimelineStore::new();
        assert!(matches!(
            store.create(""),
            Err(PixelcastError::InvalidName(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn insert_frame_advances_cursor_and_suppresses_blank() {
        let mut store = TimelineStore::new();
        store.create("pulse").unwrap();

        assert_eq!(
            store.insert_frame(0, &lit_frame("8000000000000000")).unwrap(),
            Some(1)
        );
        assert_eq!(store.insert_frame(1, &Frame::blank()).unwrap(), None);
        assert_eq!(store.active().unwrap().frames.len(), 1);
        assert!(store.insert_frame(5, &lit_frame("ffffffffffffffff")).is_err());
    }

    #[test]
    fn delete_falls_back_to_first_remaining() {
        let mut store = TimelineStore::new();
        store.create("a").unwrap();
        store.create("b").unwrap();
        store.create("c").unwrap();
        store.set_active(2).unwrap();

        store.delete(2).unwrap();
        assert_eq!(store.active_index(), Some(0));

        // Deleting below the active index shifts it down.
        store.set_active(1).unwrap();
        store.delete(0).unwrap();
        assert_eq!(store.active_index(), Some(0));

        store.delete(0).unwrap();
        assert_eq!(store.active_index(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn import_is_atomic_across_timelines() {
        let mut store = TimelineStore::new();
        store.create("keep").unwrap();

        let json = r#"[
            {"name":"ok","frames":["8000000000000000"],"speed":50,"repeat":true},
            {"name":"bad","frames":["xx"],"speed":50,"repeat":false}
        ]"#;
        let err = store.import_json(json).unwrap_err();
        assert!(matches!(err, PixelcastError::ImportDecode(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn import_rejects_zero_speed() {
        let mut store = TimelineStore::new();
        let json = r#"[{"name":"ok","frames":[],"speed":0,"repeat":true}]"#;
        assert!(store.import_json(json).is_err());
    }

    #[test]
    fn import_activates_first_when_catalog_was_empty() {
        let mut store = TimelineStore::new();
        let json = r#"[{"name":"only","frames":[],"speed":100,"repeat":true}]"#;
        assert_eq!(store.import_json(json).unwrap(), 1);
        assert_eq!(store.active_index(), Some(0));
    }

    #[test]
    fn export_import_roundtrip() {
        let mut store = TimelineStore::new();
        store.create("pulse").unwrap();
        store.insert_frame(0, &lit_frame("00ff00ff00ff00ff")).unwrap();

        let json = store.export_json().unwrap();
        let mut other = TimelineStore::new();
        other.import_json(&json).unwrap();
        assert_eq!(other.timelines(), store.timelines());
    }
}

use crate::{
    command,
    error::{PixelcastError, PixelcastResult},
    model::{DeviceTarget, Frame, FrameSource, Selection, Timeline},
    persist::{CatalogStore, DEVICES_KEY, FRAMES_KEY, TIMELINES_KEY},
    store::FrameStore,
    timeline::TimelineStore,
    transport::{CommandOutcome, DeviceTransport},
};

/// All editor state for one user of the device fleet: the frame under edit,
/// the saved/timeline/device catalogs, and the "last used" device. Every
/// catalog mutation persists synchronously through the backing store.
///
/// When a selection is live, the frame under edit *is* the catalog entry:
/// edits route into the owning collection directly, so manual edits and
/// scheduler ticks produce identical downstream effects.
pub struct Session<S: CatalogStore> {
    store: S,
    scratch: Frame,
    selection: Option<Selection>,
    frames: FrameStore,
    timelines: TimelineStore,
    devices: Vec<DeviceTarget>,
    last_device: Option<usize>,
    instant_update: bool,
}

impl<S: CatalogStore> Session<S> {
    /// Loads all catalogs from the store. Missing keys yield empty catalogs;
    /// the first device (if any) becomes the last-used one.
    pub fn load(store: S) -> PixelcastResult<Self> {
        let frames = match store.load(FRAMES_KEY)? {
            Some(json) => FrameStore::from_frames(parse_catalog(FRAMES_KEY, &json)?),
            None => FrameStore::new(),
        };
        let timelines = match store.load(TIMELINES_KEY)? {
            Some(json) => {
                TimelineStore::from_timelines(parse_catalog::<Timeline>(TIMELINES_KEY, &json)?)
            }
            None => TimelineStore::new(),
        };
        let devices: Vec<DeviceTarget> = match store.load(DEVICES_KEY)? {
            Some(json) => parse_catalog(DEVICES_KEY, &json)?,
            None => Vec::new(),
        };

        let last_device = if devices.is_empty() { None } else { Some(0) };
        Ok(Self {
            store,
            scratch: Frame::blank(),
            selection: None,
            frames,
            timelines,
            devices,
            last_device,
            instant_update: true,
        })
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    pub fn timelines(&self) -> &TimelineStore {
        &self.timelines
    }

    pub fn devices(&self) -> &[DeviceTarget] {
        &self.devices
    }

    pub fn last_device(&self) -> Option<usize> {
        self.last_device
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn instant_update(&self) -> bool {
        self.instant_update
    }

    pub fn set_instant_update(&mut self, on: bool) {
        self.instant_update = on;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The frame currently under edit: the selected catalog entry, or the
    /// free-standing scratch frame when nothing is selected.
    pub fn current_frame(&self) -> &Frame {
        match self.selection {
            Some(Selection {
                source: FrameSource::Saved,
                index,
            }) => match self.frames.frames().get(index) {
                Some(frame) => frame,
                None => &self.scratch,
            },
            Some(Selection {
                source: FrameSource::Timeline,
                index,
            }) => match self.timelines.active().and_then(|t| t.frames.get(index)) {
                Some(frame) => frame,
                None => &self.scratch,
            },
            None => &self.scratch,
        }
    }

    fn current_frame_mut(&mut self) -> &mut Frame {
        match self.selection {
            Some(Selection {
                source: FrameSource::Saved,
                index,
            }) if index < self.frames.len() => match self.frames.get_mut(index) {
                Ok(frame) => frame,
                Err(_) => &mut self.scratch,
            },
            Some(Selection {
                source: FrameSource::Timeline,
                index,
            }) => match self
                .timelines
                .active_mut()
                .and_then(|t| t.frames.get_mut(index))
            {
                Some(frame) => frame,
                None => &mut self.scratch,
            },
            _ => &mut self.scratch,
        }
    }

    /// Hex mirror of the frame under edit, as shown next to the editor grid.
    pub fn current_hex(&self) -> String {
        self.current_frame().to_hex()
    }

    /// Resets the edit frame to all-dark and drops the selection.
    pub fn clear_editor(&mut self) {
        self.scratch = Frame::blank();
        self.selection = None;
    }

    /// Replaces the edit frame wholesale (dropping any selection), as when
    /// a frame arrives from outside the editor grid.
    pub fn set_editor(
        &mut self,
        frame: Frame,
        transport: &mut dyn DeviceTransport,
    ) -> Option<CommandOutcome> {
        self.selection = None;
        self.scratch = frame;
        self.maybe_instant_send(transport)
    }

    /// Points the edit frame at a stored entry. Like a manual click in the
    /// catalog, this fires the instant-update send if one is configured;
    /// the playback scheduler goes through this same path on every tick.
    pub fn select(
        &mut self,
        source: FrameSource,
        index: usize,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<Option<CommandOutcome>> {
        match source {
            FrameSource::Saved => {
                self.frames.get(index)?;
            }
            FrameSource::Timeline => {
                let timeline = self.timelines.active().ok_or_else(|| {
                    PixelcastError::validation("no active timeline to select from")
                })?;
                if index >= timeline.frames.len() {
                    return Err(PixelcastError::index_out_of_range(format!(
                        "frame {index} outside timeline of {}",
                        timeline.frames.len()
                    )));
                }
            }
        }
        self.selection = Some(Selection { source, index });
        Ok(self.maybe_instant_send(transport))
    }

    /// Flips one pixel of the frame under edit. A live selection means the
    /// owning catalog just changed, so it is persisted before the
    /// instant-update send goes out.
    pub fn toggle_pixel(
        &mut self,
        pixel: usize,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<Option<CommandOutcome>> {
        self.current_frame_mut().toggle_pixel(pixel)?;
        match self.selection.map(|s| s.source) {
            Some(FrameSource::Saved) => self.persist_frames()?,
            Some(FrameSource::Timeline) => self.persist_timelines()?,
            None => {}
        }
        Ok(self.maybe_instant_send(transport))
    }

    /// Commits the frame under edit to the saved catalog. Blank frames are
    /// suppressed; returns whether an entry was added.
    pub fn commit_current(&mut self) -> PixelcastResult<bool> {
        let frame = self.current_frame().clone();
        if !self.frames.commit(&frame) {
            return Ok(false);
        }
        self.persist_frames()?;
        Ok(true)
    }

    /// Deletes the selected entry from whichever collection owns it, then
    /// clears the editor. Without a selection this is a no-op.
    pub fn delete_selected(&mut self) -> PixelcastResult<bool> {
        let Some(Selection { source, index }) = self.selection else {
            return Ok(false);
        };
        match source {
            FrameSource::Saved => {
                self.frames.remove(index)?;
                self.persist_frames()?;
            }
            FrameSource::Timeline => {
                let timeline = self.timelines.active_mut().ok_or_else(|| {
                    PixelcastError::validation("selection points at a missing timeline")
                })?;
                if index >= timeline.frames.len() {
                    return Err(PixelcastError::index_out_of_range(format!(
                        "frame {index} outside timeline of {}",
                        timeline.frames.len()
                    )));
                }
                timeline.frames.remove(index);
                self.persist_timelines()?;
            }
        }
        self.clear_editor();
        Ok(true)
    }

    /// Inserts a copy of the frame under edit into the active timeline at
    /// `at`. Returns the cursor just after the inserted frame, or `None`
    /// when the blank-frame suppression kicked in.
    pub fn insert_current_into_timeline(&mut self, at: usize) -> PixelcastResult<Option<usize>> {
        let frame = self.current_frame().clone();
        let cursor = self.timelines.insert_frame(at, &frame)?;
        if cursor.is_some() {
            // Keep a timeline-sourced selection pointing at the same frame.
            if let Some(sel) = self.selection.as_mut()
                && sel.source == FrameSource::Timeline
                && sel.index >= at
            {
                sel.index += 1;
            }
            self.persist_timelines()?;
        }
        Ok(cursor)
    }

    pub fn set_active_timeline(&mut self, index: usize) -> PixelcastResult<()> {
        self.timelines.set_active(index)?;
        self.drop_timeline_selection();
        Ok(())
    }

    pub fn create_timeline(&mut self, name: &str) -> PixelcastResult<usize> {
        let index = self.timelines.create(name)?;
        self.drop_timeline_selection();
        self.persist_timelines()?;
        Ok(index)
    }

    pub fn delete_timeline(&mut self, index: usize) -> PixelcastResult<()> {
        self.timelines.delete(index)?;
        self.drop_timeline_selection();
        self.persist_timelines()
    }

    pub fn set_timeline_speed(&mut self, index: usize, speed_ms: u32) -> PixelcastResult<()> {
        if speed_ms == 0 {
            return Err(PixelcastError::validation("timeline speed must be > 0 ms"));
        }
        self.timelines.get_mut(index)?.speed_ms = speed_ms;
        self.persist_timelines()
    }

    pub fn set_timeline_repeat(&mut self, index: usize, repeat: bool) -> PixelcastResult<()> {
        self.timelines.get_mut(index)?.repeat = repeat;
        self.persist_timelines()
    }

    pub fn import_frames_json(&mut self, json: &str) -> PixelcastResult<usize> {
        let added = self.frames.import_json(json)?;
        self.persist_frames()?;
        Ok(added)
    }

    pub fn export_frames_json(&self) -> PixelcastResult<String> {
        serde_json::to_string(&self.frames.export_hex())
            .map_err(|e| PixelcastError::storage(format!("frame export: {e}")))
    }

    pub fn import_timelines_json(&mut self, json: &str) -> PixelcastResult<usize> {
        let added = self.timelines.import_json(json)?;
        self.persist_timelines()?;
        Ok(added)
    }

    pub fn export_timelines_json(&self) -> PixelcastResult<String> {
        self.timelines.export_json()
    }

    /// Adds a device to the catalog. Mirroring the original behavior, any
    /// device-catalog change re-sends the current frame to the last-used
    /// device so its display stays in sync.
    pub fn add_device(
        &mut self,
        target: DeviceTarget,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<Option<CommandOutcome>> {
        target.validate()?;
        self.devices.push(target);
        if self.last_device.is_none() {
            self.last_device = Some(self.devices.len() - 1);
        }
        self.persist_devices()?;
        Ok(self.resend_to_last(transport))
    }

    pub fn remove_device(
        &mut self,
        index: usize,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<Option<CommandOutcome>> {
        if index >= self.devices.len() {
            return Err(PixelcastError::index_out_of_range(format!(
                "device {index} outside catalog of {}",
                self.devices.len()
            )));
        }
        self.devices.remove(index);
        self.last_device = match self.last_device {
            Some(l) if l == index => None,
            Some(l) if l > index => Some(l - 1),
            other => other,
        };
        self.persist_devices()?;
        Ok(self.resend_to_last(transport))
    }

    pub fn set_last_device(&mut self, index: usize) -> PixelcastResult<()> {
        if index >= self.devices.len() {
            return Err(PixelcastError::index_out_of_range(format!(
                "device {index} outside catalog of {}",
                self.devices.len()
            )));
        }
        self.last_device = Some(index);
        Ok(())
    }

    /// Sends the frame under edit to a device and remembers it as last used.
    pub fn send_frame(
        &mut self,
        device: usize,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<CommandOutcome> {
        self.set_last_device(device)?;
        let target = &self.devices[device];
        let request = command::frame_command(target, self.current_frame());
        Ok(transport.dispatch(&request))
    }

    /// Sends a whole timeline as an on-device animation.
    pub fn send_animation(
        &mut self,
        device: usize,
        timeline: usize,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<CommandOutcome> {
        self.set_last_device(device)?;
        let target = &self.devices[device];
        let request = command::animation_command(target, self.timelines.get(timeline)?)?;
        Ok(transport.dispatch(&request))
    }

    /// Sends a text message to the last-used device.
    pub fn send_message(
        &mut self,
        text: &str,
        repeat: bool,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<CommandOutcome> {
        let target = self
            .last_device
            .and_then(|i| self.devices.get(i))
            .ok_or(PixelcastError::NoDevice)?;
        let request = command::message_command(target, text, repeat);
        Ok(transport.dispatch(&request))
    }

    fn maybe_instant_send(&self, transport: &mut dyn DeviceTransport) -> Option<CommandOutcome> {
        if !self.instant_update {
            return None;
        }
        self.resend_to_last(transport)
    }

    fn resend_to_last(&self, transport: &mut dyn DeviceTransport) -> Option<CommandOutcome> {
        let target = self.last_device.and_then(|i| self.devices.get(i))?;
        let request = command::frame_command(target, self.current_frame());
        Some(transport.dispatch(&request))
    }

    fn drop_timeline_selection(&mut self) {
        if let Some(sel) = self.selection
            && sel.source == FrameSource::Timeline
        {
            self.selection = None;
        }
    }

    fn persist_frames(&mut self) -> PixelcastResult<()> {
        let payload = serde_json::to_string(self.frames.frames())
            .map_err(|e| PixelcastError::storage(format!("frame catalog: {e}")))?;
        self.store.save(FRAMES_KEY, &payload)
    }

    fn persist_timelines(&mut self) -> PixelcastResult<()> {
        let payload = serde_json::to_string(self.timelines.timelines())
            .map_err(|e| PixelcastError::storage(format!("timeline catalog: {e}")))?;
        self.store.save(TIMELINES_KEY, &payload)
    }

    fn persist_devices(&mut self) -> PixelcastResult<()> {
        let payload = serde_json::to_string(&self.devices)
            .map_err(|e| PixelcastError::storage(format!("device catalog: {e}")))?;
        self.store.save(DEVICES_KEY, &payload)
    }
}

fn parse_catalog<T: serde::de::DeserializeOwned>(key: &str, json: &str) -> PixelcastResult<Vec<T>> {
    serde_json::from_str(json)
        .map_err(|e| PixelcastError::storage(format!("corrupt '{key}' catalog: {e}")))
}

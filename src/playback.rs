use std::time::Duration;

use crate::{
    error::{PixelcastError, PixelcastResult},
    model::FrameSource,
    persist::CatalogStore,
    session::Session,
    transport::DeviceTransport,
};

/// Source of real time for the playback driver. Production uses
/// [`SystemClock`]; tests inject a manual clock and simulate N ticks without
/// waiting.
pub trait TickClock {
    fn sleep(&mut self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TickClock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing { timeline: usize, frame: usize },
}

/// What one tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Scheduler was stopped; nothing happened.
    Idle,
    /// Advanced to this frame index (wrapping when the timeline repeats).
    Advanced(usize),
    /// Reached the end of a non-repeating timeline and stopped. The last
    /// frame stays selected and displayed.
    Finished,
}

/// Stopped → Playing → Stopped state machine over a session's timelines.
/// Each tick routes frame selection through [`Session::select`], so display
/// refresh and instant-update sends fire exactly as they do for manual
/// selection.
///
/// Speed and repeat edits made while playing are picked up on the next
/// natural tick; there is no mid-tick rescheduling. That one-interval drift
/// is accepted behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaybackScheduler {
    state: PlaybackState,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    /// Starts playback of a timeline from frame 0. Any playback already
    /// running is stopped first; only one timeline plays at a time.
    pub fn play<S: CatalogStore>(
        &mut self,
        session: &mut Session<S>,
        timeline: usize,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<()> {
        self.stop();

        let target = session.timelines().get(timeline)?;
        if target.frames.is_empty() {
            return Err(PixelcastError::empty_timeline(target.name.clone()));
        }

        session.set_active_timeline(timeline)?;
        self.state = PlaybackState::Playing { timeline, frame: 0 };
        session.select(FrameSource::Timeline, 0, transport)?;
        tracing::debug!(timeline, "playback started");
        Ok(())
    }

    /// Advances playback by one frame. At the end of the timeline this
    /// wraps when `repeat` is set, and otherwise stops with the last frame
    /// still selected.
    pub fn tick<S: CatalogStore>(
        &mut self,
        session: &mut Session<S>,
        transport: &mut dyn DeviceTransport,
    ) -> PixelcastResult<TickOutcome> {
        let PlaybackState::Playing { timeline, frame } = self.state else {
            return Ok(TickOutcome::Idle);
        };

        let target = session.timelines().get(timeline)?;
        let len = target.frames.len();
        if len == 0 {
            // Frames were deleted out from under the playback.
            self.stop();
            return Ok(TickOutcome::Finished);
        }

        let mut next = frame + 1;
        if next >= len {
            if target.repeat {
                next = 0;
            } else {
                self.stop();
                tracing::debug!(timeline, frame, "playback finished");
                return Ok(TickOutcome::Finished);
            }
        }

        self.state = PlaybackState::Playing {
            timeline,
            frame: next,
        };
        session.select(FrameSource::Timeline, next, transport)?;
        Ok(TickOutcome::Advanced(next))
    }

    /// Stops playback. Idempotent.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    /// Drives playback in real time: sleep one timeline interval, tick,
    /// repeat until the scheduler stops. The speed is re-read from the
    /// timeline before every sleep, so edits apply from the next tick on.
    /// With a repeating timeline this only returns once something external
    /// calls [`PlaybackScheduler::stop`] or empties the timeline.
    pub fn run<S: CatalogStore>(
        &mut self,
        session: &mut Session<S>,
        transport: &mut dyn DeviceTransport,
        clock: &mut dyn TickClock,
    ) -> PixelcastResult<()> {
        while let PlaybackState::Playing { timeline, .. } = self.state {
            let speed_ms = session.timelines().get(timeline)?.speed_ms;
            clock.sleep(Duration::from_millis(u64::from(speed_ms)));
            self.tick(session, transport)?;
        }
        Ok(())
    }
}

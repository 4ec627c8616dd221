#![forbid(unsafe_code)]

pub mod codec;
pub mod command;
pub mod error;
pub mod model;
pub mod persist;
pub mod playback;
pub mod session;
pub mod store;
pub mod timeline;
pub mod transport;

pub use codec::{FRAME_HEX_CHARS, MATRIX_PIXELS, decode_hex, encode_bits};
pub use command::{CommandRequest, Method, animation_command, frame_command, message_command};
pub use error::{PixelcastError, PixelcastResult};
pub use model::{
    DEFAULT_TIMELINE_SPEED_MS, DeviceTarget, Frame, FrameSource, MAX_INTENSITY, Selection,
    Timeline,
};
pub use persist::{CatalogStore, JsonFileStore, MemoryStore};
pub use playback::{PlaybackScheduler, PlaybackState, SystemClock, TickClock, TickOutcome};
pub use session::Session;
pub use store::FrameStore;
pub use timeline::TimelineStore;
pub use transport::{CommandOutcome, DeviceTransport, HttpTransport, RecordingTransport};

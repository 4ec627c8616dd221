use std::fmt;

use crate::{
    codec::{self, FRAME_HEX_CHARS, MATRIX_PIXELS},
    error::{PixelcastError, PixelcastResult},
};

/// One 8x8 monochrome bitmap, row major. The pixel count is fixed by the
/// type; the canonical external form is the 16-character lowercase hex
/// string produced by [`Frame::to_hex`], which is also what gets persisted
/// and imported.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: [bool; MATRIX_PIXELS],
}

impl Frame {
    pub fn blank() -> Self {
        Self {
            pixels: [false; MATRIX_PIXELS],
        }
    }

    pub fn from_bits(bits: &[bool]) -> PixelcastResult<Self> {
        let pixels: [bool; MATRIX_PIXELS] = bits.try_into().map_err(|_| {
            PixelcastError::invalid_length(format!(
                "frame needs exactly {MATRIX_PIXELS} pixels, got {}",
                bits.len()
            ))
        })?;
        Ok(Self { pixels })
    }

    pub fn from_hex(hex: &str) -> PixelcastResult<Self> {
        if hex.len() != FRAME_HEX_CHARS {
            return Err(PixelcastError::invalid_length(format!(
                "frame hex needs exactly {FRAME_HEX_CHARS} characters, got {} in '{hex}'",
                hex.len()
            )));
        }
        Self::from_bits(&codec::decode_hex(hex)?)
    }

    pub fn to_hex(&self) -> String {
        codec::encode_bits_unchecked(&self.pixels)
    }

    pub fn as_bits(&self) -> &[bool; MATRIX_PIXELS] {
        &self.pixels
    }

    /// All pixels dark. Blank frames are suppressed when committing to a
    /// catalog or inserting into a timeline.
    pub fn is_blank(&self) -> bool {
        !self.pixels.iter().any(|&p| p)
    }

    pub fn pixel(&self, index: usize) -> PixelcastResult<bool> {
        self.pixels
            .get(index)
            .copied()
            .ok_or_else(|| pixel_range_err(index))
    }

    pub fn set_pixel(&mut self, index: usize, lit: bool) -> PixelcastResult<()> {
        let slot = self
            .pixels
            .get_mut(index)
            .ok_or_else(|| pixel_range_err(index))?;
        *slot = lit;
        Ok(())
    }

    /// Flips one pixel and returns its new state.
    pub fn toggle_pixel(&mut self, index: usize) -> PixelcastResult<bool> {
        let slot = self
            .pixels
            .get_mut(index)
            .ok_or_else(|| pixel_range_err(index))?;
        *slot = !*slot;
        Ok(*slot)
    }
}

fn pixel_range_err(index: usize) -> PixelcastError {
    PixelcastError::index_out_of_range(format!("pixel {index} outside 0..{MATRIX_PIXELS}"))
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frame").field(&self.to_hex()).finish()
    }
}

impl serde::Serialize for Frame {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Frame {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Named animation: ordered frames plus playback parameters. An empty frame
/// list is legal (it just produces no visible playback).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    pub name: String,
    pub frames: Vec<Frame>,
    #[serde(rename = "speed")]
    pub speed_ms: u32,
    pub repeat: bool,
}

pub const DEFAULT_TIMELINE_SPEED_MS: u32 = 100;

impl Timeline {
    pub fn new(name: impl Into<String>) -> PixelcastResult<Self> {
        let timeline = Self {
            name: name.into(),
            frames: Vec::new(),
            speed_ms: DEFAULT_TIMELINE_SPEED_MS,
            repeat: true,
        };
        timeline.validate()?;
        Ok(timeline)
    }

    pub fn validate(&self) -> PixelcastResult<()> {
        if self.name.trim().is_empty() {
            return Err(PixelcastError::invalid_name(
                "timeline name must be non-empty",
            ));
        }
        if self.speed_ms == 0 {
            return Err(PixelcastError::validation("timeline speed must be > 0 ms"));
        }
        Ok(())
    }
}

pub const MAX_INTENSITY: u8 = 15;

fn default_intensity() -> u8 {
    8
}

/// A network pixel-matrix endpoint.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceTarget {
    pub ip: String,
    pub name: String,
    #[serde(default = "default_intensity")]
    pub intensity: u8,
}

impl DeviceTarget {
    pub fn new(
        ip: impl Into<String>,
        name: impl Into<String>,
        intensity: u8,
    ) -> PixelcastResult<Self> {
        let target = Self {
            ip: ip.into(),
            name: name.into(),
            intensity,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> PixelcastResult<()> {
        if self.ip.trim().is_empty() {
            return Err(PixelcastError::validation("device ip must be non-empty"));
        }
        if self.intensity > MAX_INTENSITY {
            return Err(PixelcastError::validation(format!(
                "device intensity {} exceeds {MAX_INTENSITY}",
                self.intensity
            )));
        }
        Ok(())
    }
}

/// Which collection owns the frame under edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSource {
    Saved,
    Timeline,
}

/// Transient pointer to the frame under edit. Cleared whenever the owning
/// collection mutates underneath it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub source: FrameSource,
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_hex_roundtrip() {
        let mut frame = Frame::blank();
        frame.set_pixel(0, true).unwrap();
        frame.set_pixel(63, true).unwrap();
        let hex = frame.to_hex();
        assert_eq!(hex, "8000000000000001");
        assert_eq!(Frame::from_hex(&hex).unwrap(), frame);
    }

    #[test]
    fn frame_rejects_wrong_hex_length() {
        assert!(matches!(
            Frame::from_hex("80"),
            Err(PixelcastError::InvalidLength(_))
        ));
    }

    #[test]
    fn frame_serde_is_hex() {
        let frame = Frame::from_hex("00ff00ff00ff00ff").unwrap();
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, "\"00ff00ff00ff00ff\"");
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn toggle_flips_and_reports() {
        let mut frame = Frame::blank();
        assert!(frame.toggle_pixel(5).unwrap());
        assert!(!frame.toggle_pixel(5).unwrap());
        assert!(frame.toggle_pixel(64).is_err());
    }

    #[test]
    fn timeline_defaults_and_validation() {
        let timeline = Timeline::new("pulse").unwrap();
        assert_eq!(timeline.speed_ms, DEFAULT_TIMELINE_SPEED_MS);
        assert!(timeline.repeat);
        assert!(matches!(
            Timeline::new("  "),
            Err(PixelcastError::InvalidName(_))
        ));
    }

    #[test]
    fn timeline_serde_uses_speed_key_and_hex_frames() {
        let mut timeline = Timeline::new("pulse").unwrap();
        timeline
            .frames
            .push(Frame::from_hex("8000000000000000").unwrap());
        let json = serde_json::to_string(&timeline).unwrap();
        assert!(json.contains("\"speed\":100"));
        assert!(json.contains("\"8000000000000000\""));
    }

    #[test]
    fn device_validation() {
        assert!(DeviceTarget::new("192.168.1.42", "desk", 8).is_ok());
        assert!(DeviceTarget::new("", "desk", 8).is_err());
        assert!(DeviceTarget::new("192.168.1.42", "desk", 16).is_err());
    }

    #[test]
    fn device_intensity_defaults_on_import() {
        let target: DeviceTarget =
            serde_json::from_str(r#"{"ip":"10.0.0.9","name":"shelf"}"#).unwrap();
        assert_eq!(target.intensity, 8);
    }
}

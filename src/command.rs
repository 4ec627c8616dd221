use crate::{
    error::{PixelcastError, PixelcastResult},
    model::{DeviceTarget, Frame, Timeline},
};

/// The device protocol is GET-only: every command is a query string against
/// `http://<ip>/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
}

/// A fully-formed request descriptor. Building one performs no network I/O;
/// dispatch is the transport's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRequest {
    pub method: Method,
    pub base_url: String,
    pub query: Vec<(String, String)>,
}

impl CommandRequest {
    /// Display form of the request, query joined naively. Transports apply
    /// proper percent-encoding when they actually send.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.base_url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.base_url, query)
    }
}

fn request(target: &DeviceTarget, query: Vec<(String, String)>) -> CommandRequest {
    CommandRequest {
        method: Method::Get,
        base_url: format!("http://{}/", target.ip),
        query,
    }
}

/// `data=<16 hex>&intensity=<n>`: display one static frame.
pub fn frame_command(target: &DeviceTarget, frame: &Frame) -> CommandRequest {
    request(
        target,
        vec![
            ("data".to_string(), frame.to_hex()),
            ("intensity".to_string(), target.intensity.to_string()),
        ],
    )
}

/// `animation=<N*16 hex>&speed=<ms>[&repeat=true]`: play on-device. Frames
/// are concatenated in timeline order with no separator; the device consumes
/// 16 hex characters per frame. A timeline with no frames has no wire form.
pub fn animation_command(
    target: &DeviceTarget,
    timeline: &Timeline,
) -> PixelcastResult<CommandRequest> {
    if timeline.frames.is_empty() {
        return Err(PixelcastError::empty_timeline(timeline.name.clone()));
    }

    let payload: String = timeline.frames.iter().map(Frame::to_hex).collect();
    let mut query = vec![
        ("animation".to_string(), payload),
        ("speed".to_string(), timeline.speed_ms.to_string()),
    ];
    if timeline.repeat {
        query.push(("repeat".to_string(), "true".to_string()));
    }
    Ok(request(target, query))
}

/// `message=<text>[&repeat=true]`: scrolling/static text.
pub fn message_command(target: &DeviceTarget, text: &str, repeat: bool) -> CommandRequest {
    let mut query = vec![("message".to_string(), text.to_string())];
    if repeat {
        query.push(("repeat".to_string(), "true".to_string()));
    }
    request(target, query)
}

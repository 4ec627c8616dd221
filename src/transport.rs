use std::time::Duration;

use crate::{
    command::CommandRequest,
    error::{PixelcastError, PixelcastResult},
};

/// Result of one dispatch, observed rather than propagated: device commands
/// are fire-and-forget, so a failure is reported and then dropped, never
/// retried, never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Delivered,
    Failed(String),
}

impl CommandOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// The seam between the pure command builders and whatever actually moves
/// bytes. Implementations must not block indefinitely.
pub trait DeviceTransport {
    fn dispatch(&mut self, request: &CommandRequest) -> CommandOutcome;
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Blocking HTTP GET against the device, with a short timeout so a dead
/// device cannot stall the caller for long.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> PixelcastResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PixelcastError::validation(format!("http client init failed: {e}")))?;
        Ok(Self { client })
    }
}

impl DeviceTransport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(url = %request.full_url()))]
    fn dispatch(&mut self, request: &CommandRequest) -> CommandOutcome {
        let result = self
            .client
            .get(&request.base_url)
            .query(&request.query)
            .send();

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!("device command delivered");
                CommandOutcome::Delivered
            }
            Ok(response) => {
                let reason = format!("device returned {}", response.status());
                tracing::warn!(%reason, "device command rejected");
                CommandOutcome::Failed(reason)
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(%reason, "device command failed");
                CommandOutcome::Failed(reason)
            }
        }
    }
}

/// Captures requests instead of sending them. Used by tests and by dry runs.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Vec<CommandRequest>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[CommandRequest] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<CommandRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl DeviceTransport for RecordingTransport {
    fn dispatch(&mut self, request: &CommandRequest) -> CommandOutcome {
        self.requests.push(request.clone());
        CommandOutcome::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Method;

    #[test]
    fn recording_transport_captures_in_order() {
        let mut transport = RecordingTransport::new();
        for i in 0..3 {
            let req = CommandRequest {
                method: Method::Get,
                base_url: "http://10.0.0.1/".to_string(),
                query: vec![("data".to_string(), format!("{i:016x}"))],
            };
            assert!(transport.dispatch(&req).is_delivered());
        }
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(transport.requests()[2].query[0].1, "0000000000000002");
        assert_eq!(transport.take_requests().len(), 3);
        assert!(transport.requests().is_empty());
    }
}

//! In-process transport for unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use crate::error::SecurdenError;
use crate::transport::{ApiRequest, Transport};

/// Replies with a fixed body and records every request it sees.
pub struct RecordingTransport {
    reply: Vec<u8>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub fn replying(body: &str) -> Self {
        Self {
            reply: body.as_bytes().to_vec(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>, SecurdenError> {
        self.seen.lock().unwrap().push(request);
        Ok(self.reply.clone())
    }
}

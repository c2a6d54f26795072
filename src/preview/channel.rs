//! Live preview channel
//!
//! Wraps the shared, process-wide connection to the backend test service.
//! Connection lifecycle (reconnect, backoff) is owned by the host behind
//! the [`PreviewTransport`] trait; this side only reads readiness and
//! sends. A request issued while the transport is down is dropped, not
//! queued: the next trigger (reconnect or input change) is the implicit
//! retry path.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::types::TransportError;
use crate::models::ProfileTestRequest;

/// Host-owned duplex connection to the backend test service
pub trait PreviewTransport: Send + Sync {
    /// Whether the shared connection is currently established
    fn is_ready(&self) -> bool;

    /// Push one test request. Must not block.
    fn send(&self, request: &ProfileTestRequest) -> Result<(), TransportError>;
}

/// Sending side of the live preview pipeline
#[derive(Clone)]
pub struct LivePreviewChannel {
    transport: Arc<dyn PreviewTransport>,
}

impl LivePreviewChannel {
    pub fn new(transport: Arc<dyn PreviewTransport>) -> Self {
        Self { transport }
    }

    pub fn is_ready(&self) -> bool {
        self.transport.is_ready()
    }

    /// Send a test request if the transport is ready.
    ///
    /// Not-ready drops the request silently; a transport error is logged
    /// and swallowed. Neither case propagates to the caller.
    pub fn send_test_request(&self, request: ProfileTestRequest) {
        if !self.transport.is_ready() {
            debug!(
                "Preview channel not ready, dropping test request for '{}'",
                request.url
            );
            return;
        }

        if let Err(e) = self.transport.send(&request) {
            warn!("Failed to send profile test request: {}", e);
        }
    }
}

use thiserror::Error;

use crate::streaming::domain::shared_frame_slot::SharedFrameSlot;

#[derive(Error, Debug)]
pub enum ServerStartError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn server thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("server is already running")]
    AlreadyRunning,
}

/// Domain interface for the network component hosting stream publishers.
///
/// `start` returns once the listener is bound; serving continues in the
/// background until `stop`. `stop` is idempotent.
pub trait StreamServer: Send {
    fn start(&mut self, slot: SharedFrameSlot) -> Result<(), ServerStartError>;
    fn stop(&mut self);
}

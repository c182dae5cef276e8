//! Channel type definitions for inter-task communication

use tokio::sync::mpsc;

use super::types::InboundMessage;

/// Default inbound buffer size (`settings.channel_capacity`)
pub const DEFAULT_CHANNEL_SIZE: usize = 1000;

/// Create a new inbound message channel with a custom buffer size
pub fn create_message_channel_with_size(
    size: usize,
) -> (mpsc::Sender<InboundMessage>, mpsc::Receiver<InboundMessage>) {
    mpsc::channel(size.max(1))
}

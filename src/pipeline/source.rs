//! Inbound message sources and chat filtering

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::common::errors::{ExecutorError, Result};
use crate::common::traits::MessageSource;
use crate::common::types::InboundMessage;
use crate::config::types::SourceConfig;

/// Reads one JSON-encoded [`InboundMessage`] per line
///
/// Blank lines are ignored. Lines that are not UTF-8 or fail to decode are
/// logged and skipped, so a single bad record never stops the stream; only
/// a read error from the underlying reader does.
pub struct JsonLinesSource<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> MessageSource for JsonLinesSource<R> {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!(line = self.line_no, error = %e, "Skipping non UTF-8 line");
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<InboundMessage>(line) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => {
                    warn!(line = self.line_no, error = %e, "Skipping undecodable message")
                }
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "json_lines"
    }
}

/// Messages handed over by another task
pub struct ChannelSource {
    receiver: mpsc::Receiver<InboundMessage>,
}

impl ChannelSource {
    pub fn new(receiver: mpsc::Receiver<InboundMessage>) -> Self {
        Self { receiver }
    }
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        Ok(self.receiver.recv().await)
    }

    fn source_name(&self) -> &'static str {
        "channel"
    }
}

/// Pump every message from `source` into `sender` until the source ends
///
/// Returns the number of messages forwarded.
pub async fn forward_messages<S: MessageSource>(
    mut source: S,
    sender: mpsc::Sender<InboundMessage>,
) -> Result<usize> {
    let mut forwarded = 0;
    while let Some(message) = source.next_message().await? {
        sender
            .send(message)
            .await
            .map_err(|e| ExecutorError::ChannelSend(e.to_string()))?;
        forwarded += 1;
    }
    debug!(
        source = source.source_name(),
        forwarded,
        "Message source exhausted"
    );
    Ok(forwarded)
}

/// Decides which chats are listened to
#[derive(Debug, Clone, Default)]
pub struct ChatFilter {
    /// Chat id -> display name; empty accepts every chat
    allowed: HashMap<i64, String>,
    skip_forwarded: bool,
}

impl ChatFilter {
    pub fn new(allowed: HashMap<i64, String>, skip_forwarded: bool) -> Self {
        Self {
            allowed,
            skip_forwarded,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        let allowed = config
            .allowed_chats
            .iter()
            .map(|chat| (chat.id, chat.name.clone()))
            .collect();
        Self::new(allowed, config.skip_forwarded)
    }

    /// Source label for an admitted message, `None` if it is filtered out
    ///
    /// The label is the sender as delivered, else the allow-list name, else
    /// the chat id.
    pub fn admit(&self, message: &InboundMessage) -> Option<String> {
        if self.skip_forwarded && message.forwarded {
            debug!(chat_id = message.chat_id, "Skipping forwarded message");
            return None;
        }

        let listed_name = if self.allowed.is_empty() {
            None
        } else {
            match self.allowed.get(&message.chat_id) {
                Some(name) => Some(name.as_str()),
                None => {
                    debug!(chat_id = message.chat_id, "Chat not allow-listed");
                    return None;
                }
            }
        };

        let label = if !message.sender.trim().is_empty() {
            message.sender.clone()
        } else {
            match listed_name {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => message.chat_id.to_string(),
            }
        };
        Some(label)
    }
}

//! Line Card Reader
//!
//! Implements CardReader on top of a text stream, one event per line:
//! a hex UID (`040F2C82DC7280`, `04:0F:2C:82` or `04 0F 2C 82`) places that
//! card on the reader, an empty line or `-` takes it off again.
//! Used on hosts without a physical reader, typically fed from stdin.

use crate::domain::ports::{CardReader, ReaderPoll};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Card reader driven by a line stream.
pub struct LineCardReader {
    updates: mpsc::Receiver<Option<Vec<u8>>>,
    held: Option<Vec<u8>>,
}

impl LineCardReader {
    /// Spawn a task reading lines from `input`.
    ///
    /// The card stays on the reader after the stream ends.
    pub fn spawn<R>(input: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut lines = input.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let update = match parse_line(&line) {
                            Ok(update) => update,
                            Err(e) => {
                                tracing::warn!("ignoring reader input {:?}: {}", line, e);
                                continue;
                            }
                        };
                        if tx.send(update).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("reader input closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("reader input error: {}", e);
                        break;
                    }
                }
            }
        });

        Self {
            updates: rx,
            held: None,
        }
    }

    /// Reader on the process's standard input.
    pub fn stdin() -> Self {
        Self::spawn(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl CardReader for LineCardReader {
    async fn poll(&mut self) -> ReaderPoll {
        // One line per poll so that a quick remove/place pair is still
        // seen as two reads.
        if let Ok(update) = self.updates.try_recv() {
            self.held = update;
        }
        match &self.held {
            Some(uid) => ReaderPoll::Card(uid.clone()),
            None => ReaderPoll::NoCard,
        }
    }
}

/// Errors from parsing a reader input line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UidParseError {
    #[error("no hex digits")]
    Empty,
    #[error("invalid hex UID: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// `None` removes the card; `Some(uid)` places one.
fn parse_line(line: &str) -> Result<Option<Vec<u8>>, UidParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(None);
    }

    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ':' | ' ' | '-'))
        .collect();
    if digits.is_empty() {
        return Err(UidParseError::Empty);
    }
    Ok(Some(hex::decode(digits)?))
}

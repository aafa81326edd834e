//! Card Reader Port
//!
//! Defines the interface for polling the badge reader.

use async_trait::async_trait;

/// Result of polling the reader once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderPoll {
    /// A card is in the field; carries its unique identifier.
    Card(Vec<u8>),
    /// No card is present.
    NoCard,
}

/// Badge reader that can be polled for the card currently in range.
///
/// A physical reader reports the same card on every poll for as long as it
/// stays in the field. De-duplication happens above this port.
#[async_trait]
pub trait CardReader: Send {
    /// Poll the reader once.
    async fn poll(&mut self) -> ReaderPoll;
}

//! Badge De-duplication
//!
//! A reader reports a card on every poll while it stays in the field. Only
//! the first report of a card is accepted; the key resets when a different
//! card shows up or the reader reports no card.
//! This service has NO external dependencies - it's pure Rust.

use crate::domain::ports::ReaderPoll;

/// Turns raw reader polls into distinct badge events.
#[derive(Debug, Default)]
pub struct BadgeDebouncer {
    last_uid: Option<Vec<u8>>,
}

impl BadgeDebouncer {
    pub fn new() -> Self {
        Self { last_uid: None }
    }

    /// Feed one poll result. Returns the UID when it is a new tap.
    pub fn accept(&mut self, poll: ReaderPoll) -> Option<Vec<u8>> {
        match poll {
            ReaderPoll::NoCard => {
                self.last_uid = None;
                None
            }
            ReaderPoll::Card(uid) => {
                if self.last_uid.as_deref() == Some(uid.as_slice()) {
                    return None;
                }
                self.last_uid = Some(uid.clone());
                Some(uid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(bytes: &[u8]) -> ReaderPoll {
        ReaderPoll::Card(bytes.to_vec())
    }

    #[test]
    fn test_first_read_is_accepted() {
        let mut d = BadgeDebouncer::new();
        assert_eq!(d.accept(card(&[1, 2, 3, 4])), Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_repeated_reads_of_one_tap_accepted_once() {
        let mut d = BadgeDebouncer::new();
        let accepted = (0..50)
            .filter_map(|_| d.accept(card(&[9, 9, 9, 9])))
            .count();
        assert_eq!(accepted, 1);
    }

    #[test]
    fn test_no_card_resets_key() {
        let mut d = BadgeDebouncer::new();
        assert!(d.accept(card(&[1])).is_some());
        assert!(d.accept(ReaderPoll::NoCard).is_none());
        assert!(d.accept(card(&[1])).is_some());
    }

    #[test]
    fn test_different_card_resets_key() {
        let mut d = BadgeDebouncer::new();
        assert!(d.accept(card(&[1])).is_some());
        assert!(d.accept(card(&[2])).is_some());
        assert!(d.accept(card(&[1])).is_some());
    }

    #[test]
    fn test_no_card_alone_never_produces_event() {
        let mut d = BadgeDebouncer::new();
        for _ in 0..10 {
            assert!(d.accept(ReaderPoll::NoCard).is_none());
        }
    }
}

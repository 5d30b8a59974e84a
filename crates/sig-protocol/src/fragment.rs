//! Reassembly of multi-frame pager messages
//!
//! FLEX decoders print long messages as several lines. Each piece carries
//! a fragment flag in its state token: `F` means more is coming, `C`
//! completes the message. Pieces are accumulated per capcode until the
//! completing piece arrives.

use std::collections::HashMap;

/// Maximum number of messages kept in flight
///
/// Garbage input can open fragments that never complete. Once the buffer
/// is full it is dropped wholesale rather than evicted entry by entry.
pub const MAX_PENDING_FRAGMENTS: usize = 1024;

/// Fragment flag carried in a FLEX state token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    /// First or middle piece: `F`
    More,
    /// Final piece: `C`
    Complete,
    /// Message fits in one line
    Standalone,
}

impl Fragment {
    /// Interpret the single-character flag from a state token
    pub fn from_flag(flag: Option<char>) -> Self {
        match flag {
            Some('F') => Fragment::More,
            Some('C') => Fragment::Complete,
            _ => Fragment::Standalone,
        }
    }
}

/// Partially received messages keyed by capcode
#[derive(Debug, Default)]
pub struct FragmentBuffer {
    pending: HashMap<String, String>,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a piece of text for a capcode
    ///
    /// Starting a new message while the buffer is full clears every
    /// pending message first.
    pub fn push(&mut self, capcode: &str, text: &str) {
        if let Some(existing) = self.pending.get_mut(capcode) {
            existing.push_str(text);
            return;
        }

        if self.pending.len() >= MAX_PENDING_FRAGMENTS {
            tracing::debug!(
                "Fragment buffer full ({} messages), dropping all pending fragments",
                self.pending.len()
            );
            self.pending.clear();
        }
        self.pending.insert(capcode.to_string(), text.to_string());
    }

    /// Remove and return the accumulated text for a capcode
    pub fn take(&mut self, capcode: &str) -> Option<String> {
        self.pending.remove(capcode)
    }

    /// Whether a capcode has an unfinished message
    pub fn contains(&self, capcode: &str) -> bool {
        self.pending.contains_key(capcode)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Fragment, FragmentBuffer, MAX_PENDING_FRAGMENTS};

    #[test]
    fn test_fragment_flags() {
        assert_eq!(Fragment::from_flag(Some('F')), Fragment::More);
        assert_eq!(Fragment::from_flag(Some('C')), Fragment::Complete);
        assert_eq!(Fragment::from_flag(Some('K')), Fragment::Standalone);
        assert_eq!(Fragment::from_flag(None), Fragment::Standalone);
    }

    #[test]
    fn test_accumulate_and_take() {
        let mut buf = FragmentBuffer::new();
        buf.push("9999", "HELLO ");
        buf.push("9999", "THERE ");
        buf.push("9999", "WORLD");

        assert_eq!(buf.take("9999").as_deref(), Some("HELLO THERE WORLD"));
        assert!(!buf.contains("9999"));
        assert!(buf.take("9999").is_none());
    }

    #[test]
    fn test_overflow_clears_everything() {
        let mut buf = FragmentBuffer::new();
        for i in 0..MAX_PENDING_FRAGMENTS {
            buf.push(&i.to_string(), "x");
        }
        assert_eq!(buf.len(), MAX_PENDING_FRAGMENTS);

        // Continuing an existing message does not trigger the clear
        buf.push("0", "y");
        assert_eq!(buf.len(), MAX_PENDING_FRAGMENTS);

        buf.push("overflow", "z");
        assert_eq!(buf.len(), 1);
        assert!(buf.contains("overflow"));
        assert!(!buf.contains("0"));
    }
}

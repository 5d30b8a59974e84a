//! Line framing of raw decoder output
//!
//! Bytes arrive in arbitrary chunks. The framer buffers them and hands out
//! complete `\n`-terminated lines. A trailing partial line stays buffered
//! until its terminator arrives and is never emitted on its own.

/// Line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// A complete line extracted from the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Decoded text without the terminator; invalid UTF-8 is replaced
    pub text: String,
    /// Raw bytes including the terminator
    pub raw: Vec<u8>,
}

/// Streaming newline framer
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    /// Create a new framer
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Push raw bytes into the buffer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next complete line
    pub fn next_line(&mut self) -> Option<Line> {
        let eol = self.buffer.iter().position(|&b| b == LINE_TERMINATOR)?;

        let raw: Vec<u8> = self.buffer.drain(..=eol).collect();
        let text = String::from_utf8_lossy(&raw[..raw.len() - 1]).into_owned();

        Some(Line { text, raw })
    }

    /// Bytes waiting for a terminator
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear the internal buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::LineFramer;

    #[test]
    fn test_split_lines() {
        let mut framer = LineFramer::new();
        framer.push_bytes(b"A\nBB\n");
        framer.push_bytes(b"C");

        assert_eq!(framer.next_line().unwrap().text, "A");
        assert_eq!(framer.next_line().unwrap().text, "BB");
        assert!(framer.next_line().is_none());
        assert_eq!(framer.pending(), b"C");
    }

    #[test]
    fn test_streaming_line() {
        let mut framer = LineFramer::new();

        framer.push_bytes(b"POCSAG1200: Add");
        assert!(framer.next_line().is_none());

        framer.push_bytes(b"ress: 1\nFLEX");
        let line = framer.next_line().unwrap();
        assert_eq!(line.text, "POCSAG1200: Address: 1");
        assert_eq!(line.raw, b"POCSAG1200: Address: 1\n");
        assert_eq!(framer.pending(), b"FLEX");
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let mut framer = LineFramer::new();
        framer.push_bytes(b"ok\xFF\xFEok\n");

        let line = framer.next_line().unwrap();
        assert_eq!(line.text, "ok\u{FFFD}\u{FFFD}ok");
        assert_eq!(line.raw, b"ok\xFF\xFEok\n");
    }

    #[test]
    fn test_empty_line() {
        let mut framer = LineFramer::new();
        framer.push_bytes(b"\n");
        assert_eq!(framer.next_line().unwrap().text, "");
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn test_consumed_lines_not_repeated() {
        let mut framer = LineFramer::new();
        framer.push_bytes(b"A\n");
        assert!(framer.next_line().is_some());
        assert!(framer.next_line().is_none());
        assert!(framer.next_line().is_none());
    }
}

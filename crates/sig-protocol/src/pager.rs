//! Pager (POCSAG and FLEX) line grammars
//!
//! Both decoders share one parser. A line is classified by its leading
//! literal and handed to the matching grammar.
//!
//! # Formats
//!
//! ```text
//! POCSAG<baud>: Address: <addr> Function: <hex> [Certainty: <n>] [<type>: <message>]
//! FLEX|YYYY-MM-DD HH:MM:SS|<baud>/<levels>/<frag>/<phase>|NN.NNN|<capcode>[ <capcode>]|<type>|<message>
//! FLEX: YYYY-MM-DD HH:MM:SS <baud>/<levels>/<phase> NN.NNN [<capcode>] <type> <message>
//! ```
//!
//! FLEX messages split across lines are reassembled with a
//! [`FragmentBuffer`] before they are emitted.

use std::sync::LazyLock;

use regex::Regex;

use crate::color::ColorCache;
use crate::error::ParseError;
use crate::fragment::{Fragment, FragmentBuffer};
use crate::record::{FlexMessage, Output, PocsagMessage, Record};
use crate::{LineParser, Protocol};

/// Average word length at or above which a message is considered noise
pub const READABLE_WORD_LENGTH: f64 = 40.0;

static POCSAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^POCSAG(\d+):\s*Address:\s*(\S+)\s+Function:\s*(\S+)(?:\s+Certainty:\s*(\d+))?(?:\s+(\S+):\s*(.*))?",
    )
    .expect("POCSAG pattern is valid")
});

static FLEX_PIPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^FLEX\|(\d\d\d\d-\d\d-\d\d\s+\d\d:\d\d:\d\d)\|(\d+/\d+/\S/\S)\|(\d\d\.\d\d\d)\|(\d+(?:\s+\d+)?)\|(\S+)\|(.*)",
    )
    .expect("FLEX pipe pattern is valid")
});

static FLEX_COLONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^FLEX:\s+(\d\d\d\d-\d\d-\d\d\s+\d\d:\d\d:\d\d)\s+(\d+/\d+/\S)\s+(\d\d\.\d\d\d)\s+\[(\d+)\]\s+(\S+)\s+(.*)",
    )
    .expect("FLEX colon pattern is valid")
});

static FLEX_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+/\d+)(/\S)?/\S").expect("FLEX state pattern is valid"));

static CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[\w\d]{2,3}>").expect("control pattern is valid"));

static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1F\s]+").expect("whitespace pattern is valid"));

/// Which pager grammar a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerFormat {
    Pocsag,
    Flex,
}

impl PagerFormat {
    /// Classify a line by its leading literal
    pub fn classify(line: &str) -> Option<Self> {
        if line.starts_with("POCSAG") {
            Some(PagerFormat::Pocsag)
        } else if line.starts_with("FLEX") {
            Some(PagerFormat::Flex)
        } else {
            None
        }
    }
}

/// Collapse runs of whitespace and control characters into single spaces
pub fn collapse_spaces(text: &str) -> String {
    SPACES.replace_all(text, " ").trim().to_string()
}

/// Heuristic for telling human text from decoder noise
///
/// Text is readable when its average word length stays under
/// [`READABLE_WORD_LENGTH`]. Empty text is never readable.
pub fn is_readable(text: &str) -> bool {
    let spaces = text.chars().filter(|&c| c == ' ').count();
    let letters = text.chars().count() - spaces;
    letters > 0 && (letters as f64) / ((spaces + 1) as f64) < READABLE_WORD_LENGTH
}

/// Parser for POCSAG and FLEX decoder output
#[derive(Debug)]
pub struct PagerParser {
    /// Drop messages that do not look like human text
    filtering: bool,
    colors: ColorCache,
    fragments: FragmentBuffer,
}

impl PagerParser {
    /// Create a parser; `filtering` enables the readability filter
    pub fn new(filtering: bool) -> Self {
        Self {
            filtering,
            colors: ColorCache::new(),
            fragments: FragmentBuffer::new(),
        }
    }

    /// Messages still waiting for their completing fragment
    pub fn fragments(&self) -> &FragmentBuffer {
        &self.fragments
    }

    /// Parse one line of either grammar
    pub fn parse_line(&mut self, line: &str) -> Output {
        match PagerFormat::classify(line) {
            Some(PagerFormat::Pocsag) => self.parse_pocsag(line),
            Some(PagerFormat::Flex) => self.parse_flex(line),
            None => Output::Empty,
        }
    }

    fn parse_pocsag(&mut self, line: &str) -> Output {
        let Some(caps) = POCSAG.captures(line) else {
            tracing::debug!("Unrecognized POCSAG line: {}", line);
            return Output::Empty;
        };

        let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");
        let address = group(2);
        let msg_type = group(5);
        let message = collapse_spaces(&CONTROL.replace_all(group(6), " "));

        if self.filtering && !(msg_type == "Alpha" && !message.is_empty()) {
            return Output::Empty;
        }

        Record::Pocsag(PocsagMessage {
            baud: group(1).to_string(),
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            address: address.to_string(),
            function: group(3).to_string(),
            certainty: caps.get(4).map(|m| m.as_str().to_string()),
            color: self.colors.color_for(address),
            msg_type: msg_type.to_string(),
            message,
        })
        .into()
    }

    fn parse_flex(&mut self, line: &str) -> Output {
        let Some(caps) = FLEX_PIPES
            .captures(line)
            .or_else(|| FLEX_COLONS.captures(line))
        else {
            tracing::debug!("Unrecognized FLEX line: {}", line);
            return Output::Empty;
        };

        let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");
        let state = group(2);
        let capcode = group(4);
        let msg_type = group(5);

        let (baud, flag) = match FLEX_STATE.captures(state) {
            Some(st) => (
                st.get(1).map(|m| m.as_str()).unwrap_or(""),
                st.get(2).and_then(|m| m.as_str().chars().nth(1)),
            ),
            None => ("", None),
        };

        let message = match Fragment::from_flag(flag) {
            Fragment::More => {
                self.fragments.push(capcode, group(6));
                return Output::Empty;
            }
            Fragment::Complete => {
                self.fragments.push(capcode, group(6));
                self.fragments.take(capcode).unwrap_or_default()
            }
            Fragment::Standalone => group(6).to_string(),
        };

        let message = collapse_spaces(&message);
        if self.filtering && !(msg_type == "ALN" && is_readable(&message)) {
            return Output::Empty;
        }

        Record::Flex(FlexMessage {
            baud: baud.to_string(),
            timestamp: group(1).to_string(),
            state: state.to_string(),
            frame: group(3).to_string(),
            address: capcode.to_string(),
            color: self.colors.color_for(capcode),
            msg_type: msg_type.to_string(),
            message: (!message.is_empty()).then_some(message),
        })
        .into()
    }
}

impl LineParser for PagerParser {
    fn protocol(&self) -> Protocol {
        Protocol::Pager
    }

    fn parse(&mut self, line: &str) -> Result<Output, ParseError> {
        Ok(self.parse_line(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pocsag(output: Output) -> PocsagMessage {
        match output {
            Output::Record(Record::Pocsag(msg)) => msg,
            other => panic!("expected POCSAG record, got {:?}", other),
        }
    }

    fn flex(output: Output) -> FlexMessage {
        match output {
            Output::Record(Record::Flex(msg)) => msg,
            other => panic!("expected FLEX record, got {:?}", other),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(PagerFormat::classify("POCSAG512: x"), Some(PagerFormat::Pocsag));
        assert_eq!(PagerFormat::classify("FLEX|x"), Some(PagerFormat::Flex));
        assert_eq!(PagerFormat::classify("EAS: ZCZC"), None);
    }

    #[test]
    fn test_parse_pocsag_alpha() {
        let mut parser = PagerParser::new(false);
        let msg = pocsag(
            parser.parse_line("POCSAG1200: Address: 1234567 Function: 3 Alpha: HELLO WORLD"),
        );

        assert_eq!(msg.baud, "1200");
        assert_eq!(msg.address, "1234567");
        assert_eq!(msg.function, "3");
        assert_eq!(msg.certainty, None);
        assert_eq!(msg.msg_type, "Alpha");
        assert_eq!(msg.message, "HELLO WORLD");
        assert_eq!(msg.timestamp.len(), 19);
    }

    #[test]
    fn test_parse_pocsag_certainty_and_controls() {
        let mut parser = PagerParser::new(false);
        let msg = pocsag(parser.parse_line(
            "POCSAG512: Address:  200100  Function: 0  Certainty:   2  Alpha:   FIRE<CR><LF>AT   MAIN ST<NUL>",
        ));

        assert_eq!(msg.baud, "512");
        assert_eq!(msg.address, "200100");
        assert_eq!(msg.certainty.as_deref(), Some("2"));
        assert_eq!(msg.message, "FIRE AT MAIN ST");
    }

    #[test]
    fn test_parse_pocsag_tone_only() {
        let mut parser = PagerParser::new(false);
        let msg = pocsag(parser.parse_line("POCSAG2400: Address: 42 Function: 1"));

        assert_eq!(msg.msg_type, "");
        assert_eq!(msg.message, "");
    }

    #[test]
    fn test_filter_suppresses_numeric_pocsag() {
        let mut parser = PagerParser::new(true);
        let out = parser.parse_line("POCSAG1200: Address: 1234567 Function: 0 Numeric: 5551234");
        assert_eq!(out, Output::Empty);

        let out = parser.parse_line("POCSAG1200: Address: 1234567 Function: 3 Alpha: <NUL>");
        assert_eq!(out, Output::Empty);

        let out = parser.parse_line("POCSAG1200: Address: 1234567 Function: 3 Alpha: CALL ME");
        assert_eq!(pocsag(out).message, "CALL ME");
    }

    #[test]
    fn test_parse_flex_pipes() {
        let mut parser = PagerParser::new(false);
        let msg = flex(parser.parse_line(
            "FLEX|2024-03-01 10:15:00|1600/2/K/A|05.117|001234567|ALN|Unit  12 respond",
        ));

        assert_eq!(msg.baud, "1600/2");
        assert_eq!(msg.timestamp, "2024-03-01 10:15:00");
        assert_eq!(msg.state, "1600/2/K/A");
        assert_eq!(msg.frame, "05.117");
        assert_eq!(msg.address, "001234567");
        assert_eq!(msg.msg_type, "ALN");
        assert_eq!(msg.message.as_deref(), Some("Unit 12 respond"));
    }

    #[test]
    fn test_parse_flex_two_capcodes() {
        let mut parser = PagerParser::new(false);
        let msg = flex(parser.parse_line(
            "FLEX|2024-03-01 10:15:00|1600/2/K/A|05.117|001234567 007654321|ALN|Hi",
        ));
        assert_eq!(msg.address, "001234567 007654321");
    }

    #[test]
    fn test_parse_flex_colons() {
        let mut parser = PagerParser::new(false);
        let msg = flex(parser.parse_line(
            "FLEX: 2024-03-01 10:15:00 1600/2/A 05.117 [001234567] ALN Meet at noon",
        ));

        assert_eq!(msg.baud, "1600/2");
        assert_eq!(msg.state, "1600/2/A");
        assert_eq!(msg.address, "001234567");
        assert_eq!(msg.message.as_deref(), Some("Meet at noon"));
    }

    #[test]
    fn test_flex_reassembly() {
        let mut parser = PagerParser::new(false);

        let first = parser.parse_line("FLEX|2024-03-01 10:15:00|1600/2/F/A|05.117|9999|ALN|PART ONE ");
        assert_eq!(first, Output::Empty);
        assert!(parser.fragments().contains("9999"));

        let done = flex(
            parser.parse_line("FLEX|2024-03-01 10:15:01|1600/2/C/A|05.117|9999|ALN|PART TWO"),
        );
        assert_eq!(done.message.as_deref(), Some("PART ONE PART TWO"));
        assert!(!parser.fragments().contains("9999"));
    }

    #[test]
    fn test_flex_filter() {
        let mut parser = PagerParser::new(true);
        let out = parser.parse_line("FLEX|2024-03-01 10:15:00|1600/2/K/A|05.117|9999|NUM|12345");
        assert_eq!(out, Output::Empty);

        let noise = "x".repeat(60);
        let line = format!("FLEX|2024-03-01 10:15:00|1600/2/K/A|05.117|9999|ALN|{}", noise);
        assert_eq!(parser.parse_line(&line), Output::Empty);
    }

    #[test]
    fn test_same_capcode_same_color() {
        let mut parser = PagerParser::new(false);
        let a = pocsag(parser.parse_line("POCSAG1200: Address: 1 Function: 3 Alpha: A"));
        let b = pocsag(parser.parse_line("POCSAG1200: Address: 2 Function: 3 Alpha: B"));
        let c = pocsag(parser.parse_line("POCSAG1200: Address: 1 Function: 3 Alpha: C"));

        assert_eq!(a.color, c.color);
        assert_ne!(a.color, b.color);
    }

    #[test]
    fn test_unrecognized_lines_are_empty() {
        let mut parser = PagerParser::new(false);
        assert_eq!(parser.parse_line("POCSAG garbage"), Output::Empty);
        assert_eq!(parser.parse_line("FLEX garbage"), Output::Empty);
        assert_eq!(parser.parse_line("something else"), Output::Empty);
    }

    #[test]
    fn test_is_readable() {
        assert!(is_readable("HELLO WORLD"));
        assert!(!is_readable(""));
        assert!(!is_readable(&"A".repeat(40)));
        assert!(is_readable(&"A".repeat(39)));
    }

    #[test]
    fn test_collapse_spaces() {
        assert_eq!(collapse_spaces("  a\t\tb\r\n c  "), "a b c");
    }
}

//! Selective-call tone sequence parser
//!
//! The tone decoders print one or more `<MODE>: <digits>` segments per
//! line. Segments are joined into one text line, with a `[MODE]` label
//! written only when the mode differs from the previously emitted one.
//! The last mode is remembered across lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::record::Output;
use crate::{LineParser, Protocol};

static MODE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(ZVEI1|ZVEI2|ZVEI3|DZVEI|PZVEI|DTMF|EEA|EIA|CCIR):\s+")
        .expect("selective-call pattern is valid")
});

/// Parser for ZVEI/DTMF/EEA/EIA/CCIR tone sequences
#[derive(Debug, Default)]
pub struct SelCallParser {
    /// Mode of the last emitted segment
    mode: String,
}

impl SelCallParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode label most recently written to the output
    pub fn last_mode(&self) -> &str {
        &self.mode
    }

    /// Join the tone segments of one line
    pub fn parse_line(&mut self, line: &str) -> String {
        let mut out = String::new();
        let tokens: Vec<_> = MODE_TOKEN.captures_iter(line).collect();

        for (i, caps) in tokens.iter().enumerate() {
            let (Some(whole), Some(mode)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let end = tokens
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(line.len());

            let digits = line[whole.end()..end].trim();
            if digits.is_empty() {
                continue;
            }

            if mode.as_str() != self.mode {
                out.push('[');
                out.push_str(mode.as_str());
                out.push_str("] ");
                self.mode = mode.as_str().to_string();
            }
            out.push_str(digits);
            out.push(' ');
        }

        out
    }
}

impl LineParser for SelCallParser {
    fn protocol(&self) -> Protocol {
        Protocol::SelCall
    }

    fn parse(&mut self, line: &str) -> Result<Output, ParseError> {
        Ok(Output::Text(self.parse_line(line)))
    }
}

#[cfg(test)]
mod tests {
    use super::SelCallParser;

    #[test]
    fn test_repeated_mode_labelled_once() {
        let mut parser = SelCallParser::new();
        assert_eq!(parser.parse_line("ZVEI1: 1234 ZVEI1: 5678"), "[ZVEI1] 1234 5678 ");
    }

    #[test]
    fn test_mode_change_relabels() {
        let mut parser = SelCallParser::new();
        assert_eq!(
            parser.parse_line("ZVEI1: 12345 DTMF: 0815 ZVEI1: 999"),
            "[ZVEI1] 12345 [DTMF] 0815 [ZVEI1] 999 "
        );
    }

    #[test]
    fn test_mode_remembered_across_lines() {
        let mut parser = SelCallParser::new();
        assert_eq!(parser.parse_line("CCIR: 11223"), "[CCIR] 11223 ");
        assert_eq!(parser.parse_line("CCIR: 44556"), "44556 ");
        assert_eq!(parser.last_mode(), "CCIR");
        assert_eq!(parser.parse_line("EEA: 7"), "[EEA] 7 ");
    }

    #[test]
    fn test_no_tokens() {
        let mut parser = SelCallParser::new();
        assert_eq!(parser.parse_line("multimon-ng 1.3.0"), "");
        assert_eq!(parser.parse_line("ZVEI2:   "), "");
        assert_eq!(parser.last_mode(), "");
    }

    #[test]
    fn test_text_before_first_token_ignored() {
        let mut parser = SelCallParser::new();
        assert_eq!(parser.parse_line("noise ZVEI3: 42"), "[ZVEI3] 42 ");
    }
}

//! Passthrough for decoders without a grammar
//!
//! Lines are forwarded unchanged as text.

use crate::error::ParseError;
use crate::record::Output;
use crate::{LineParser, Protocol};

/// Emits every line as-is
#[derive(Debug, Clone, Copy)]
pub struct PassthroughParser {
    protocol: Protocol,
}

impl PassthroughParser {
    pub fn new(protocol: Protocol) -> Self {
        Self { protocol }
    }
}

impl LineParser for PassthroughParser {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn parse(&mut self, line: &str) -> Result<Output, ParseError> {
        Ok(Output::Text(line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_forwarded_unchanged() {
        let mut parser = PassthroughParser::new(Protocol::Eas);
        let line = "EAS: ZCZC-WXR-TOR-029095+0030-1051700-KEAX/NWS-";
        assert_eq!(parser.parse(line).unwrap(), Output::Text(line.to_string()));
        assert_eq!(parser.protocol(), Protocol::Eas);
    }
}

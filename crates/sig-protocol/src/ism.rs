//! ISM band sensor report parser
//!
//! The 433/868 MHz decoder prints one JSON object per received packet.
//! The object is passed through as is, tagged with a color keyed by the
//! sensor's `id` field.

use crate::color::ColorCache;
use crate::error::ParseError;
use crate::record::{IsmMessage, Output, Record};
use crate::{LineParser, Protocol};

/// Parser for ISM JSON reports
#[derive(Debug, Default)]
pub struct IsmParser {
    colors: ColorCache,
}

impl IsmParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one JSON report
    pub fn parse_report(&mut self, line: &str) -> Result<IsmMessage, ParseError> {
        let mut fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(line)?;

        let id = match fields.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => return Err(ParseError::MissingField("id")),
            Some(other) => other.to_string(),
        };

        // The record's own tag wins over any field of the same name
        fields.remove("mode");
        fields.remove("color");

        Ok(IsmMessage {
            color: self.colors.color_for(&id),
            fields,
        })
    }
}

impl LineParser for IsmParser {
    fn protocol(&self) -> Protocol {
        Protocol::Ism
    }

    fn parse(&mut self, line: &str) -> Result<Output, ParseError> {
        Ok(Output::Record(Record::Ism(self.parse_report(line)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report() {
        let mut parser = IsmParser::new();
        let line = r#"{"time":"2024-03-01 10:00:00","model":"Acurite-Tower","id":1234,"temperature_C":21.5}"#;
        let out = parser.parse(line).unwrap();

        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["mode"], "ISM");
        assert_eq!(value["model"], "Acurite-Tower");
        assert_eq!(value["id"], 1234);
        assert_eq!(value["color"], "#FFFFFF");
    }

    #[test]
    fn test_numeric_and_string_ids_share_color() {
        let mut parser = IsmParser::new();
        let a = parser.parse_report(r#"{"id":77}"#).unwrap();
        parser.parse_report(r#"{"id":"other"}"#).unwrap();
        let b = parser.parse_report(r#"{"id":"77"}"#).unwrap();
        assert_eq!(a.color, b.color);
    }

    #[test]
    fn test_missing_id() {
        let mut parser = IsmParser::new();
        assert!(matches!(
            parser.parse(r#"{"model":"x"}"#),
            Err(ParseError::MissingField("id"))
        ));
        assert!(matches!(parser.parse("[1,2]"), Err(ParseError::Json(_))));
    }
}

//! Structured output produced from decoder lines
//!
//! A line turns into one [`Output`]: nothing worth showing, a structured
//! [`Record`], or free text. Records serialize as flat JSON objects whose
//! `mode` key names the protocol family.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Result of handling one decoded line
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Suppressed, filtered or logged-only line
    Empty,
    /// Structured record
    Record(Record),
    /// Free text (selective-call tones and passthrough decoders)
    Text(String),
}

impl Output {
    /// Whether there is anything to forward downstream
    pub fn is_empty(&self) -> bool {
        match self {
            Output::Empty => true,
            Output::Text(text) => text.is_empty(),
            Output::Record(_) => false,
        }
    }

    /// The structured record, if any
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Output::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The free text, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Record> for Output {
    fn from(record: Record) -> Self {
        Output::Record(record)
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Output::Empty => serializer.serialize_map(Some(0))?.end(),
            Output::Record(record) => record.serialize(serializer),
            Output::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// A structured record tagged by protocol family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode")]
pub enum Record {
    #[serde(rename = "POCSAG")]
    Pocsag(PocsagMessage),
    #[serde(rename = "FLEX")]
    Flex(FlexMessage),
    #[serde(rename = "HFDL")]
    Hfdl(HfdlMessage),
    #[serde(rename = "ISM")]
    Ism(IsmMessage),
}

impl Record {
    /// Value of the reserved `mode` key
    pub fn mode(&self) -> &'static str {
        match self {
            Record::Pocsag(_) => "POCSAG",
            Record::Flex(_) => "FLEX",
            Record::Hfdl(_) => "HFDL",
            Record::Ism(_) => "ISM",
        }
    }

    /// Display color assigned to the sender, if any
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Record::Pocsag(msg) => Some(msg.color),
            Record::Flex(msg) => Some(msg.color),
            Record::Hfdl(msg) => msg.color,
            Record::Ism(msg) => Some(msg.color),
        }
    }
}

/// POCSAG page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PocsagMessage {
    pub baud: String,
    /// UTC time the line was decoded
    pub timestamp: String,
    pub address: String,
    pub function: String,
    pub certainty: Option<String>,
    pub color: &'static str,
    /// Numeric, Alpha or Skyper; empty for tone-only pages
    #[serde(rename = "type")]
    pub msg_type: String,
    pub message: String,
}

/// FLEX page, possibly reassembled from several lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlexMessage {
    /// Baud rate and level count, e.g. `1600/2`
    pub baud: String,
    /// Timestamp printed by the decoder
    pub timestamp: String,
    /// Raw state token, e.g. `1600/2/F/A`
    pub state: String,
    /// Cycle and frame number, e.g. `05.117`
    pub frame: String,
    pub address: String,
    pub color: &'static str,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aircraft datalink frame, flattened across protocol layers
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HfdlMessage {
    /// Local clock time of the frame
    pub time: String,
    #[serde(rename = "type")]
    pub frame_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    /// Time of day reported inside the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// ISM band sensor report, passed through with its own fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsmMessage {
    pub color: &'static str,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

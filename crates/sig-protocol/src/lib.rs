//! Decoder Line Protocol Library
//!
//! This crate turns the text printed by external signal decoders into
//! structured records:
//!
//! - **Pager**: POCSAG and FLEX pages, including FLEX multi-line reassembly
//! - **Selective call**: ZVEI/DTMF/EEA/EIA/CCIR tone sequences
//! - **HFDL**: HF aircraft datalink frames with embedded ACARS messages
//! - **ISM**: 433/868 MHz sensor reports
//! - **EAS**: emergency alert lines, passed through unchanged
//!
//! # Architecture
//!
//! Each protocol family has a parser implementing [`LineParser`]. A parser
//! owns its per-session state (sender colors, pending fragments) and is
//! fed one decoded line at a time. Lines that do not match the grammar
//! yield [`Output::Empty`]; malformed structured input yields a
//! [`ParseError`], which callers log and skip.
//!
//! # Example
//!
//! ```rust
//! use sig_protocol::{create_parser, Output, ParserOptions, Protocol};
//!
//! let mut parser = create_parser(Protocol::Pager, ParserOptions::default());
//! let out = parser
//!     .parse("POCSAG1200: Address: 1234567 Function: 3 Alpha: HELLO WORLD")
//!     .unwrap();
//!
//! let record = out.as_record().unwrap();
//! assert_eq!(record.mode(), "POCSAG");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod color;
pub mod error;
pub mod fragment;
pub mod hfdl;
pub mod ism;
pub mod location;
pub mod pager;
pub mod passthrough;
pub mod record;
pub mod selcall;

pub use color::{ColorCache, PALETTE};
pub use error::ParseError;
pub use fragment::{FragmentBuffer, MAX_PENDING_FRAGMENTS};
pub use location::{AprsSymbol, LocationReporter, LocationSink, MapLocation};
pub use record::{FlexMessage, HfdlMessage, IsmMessage, Output, PocsagMessage, Record};

/// Decoder family a parser handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// POCSAG and FLEX pagers
    Pager,
    /// Selective-call tone sequences
    SelCall,
    /// HF aircraft datalink
    Hfdl,
    /// ISM band sensors
    Ism,
    /// Emergency Alert System
    Eas,
}

impl Protocol {
    /// All supported protocol families
    pub const ALL: [Protocol; 5] = [
        Protocol::Pager,
        Protocol::SelCall,
        Protocol::Hfdl,
        Protocol::Ism,
        Protocol::Eas,
    ];

    /// Returns a human-readable name for the protocol
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Pager => "POCSAG/FLEX",
            Protocol::SelCall => "Selective Call",
            Protocol::Hfdl => "HFDL",
            Protocol::Ism => "ISM",
            Protocol::Eas => "EAS",
        }
    }

    /// Prefix of log files written for this protocol
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Protocol::Pager => "PAGE",
            Protocol::SelCall => "SELCALL",
            Protocol::Hfdl => "HFDL",
            Protocol::Ism => "ISM",
            Protocol::Eas => "EAS",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a protocol name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown protocol: {0}")]
pub struct UnknownProtocol(pub String);

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pager" | "page" | "pocsag" | "flex" => Ok(Protocol::Pager),
            "selcall" => Ok(Protocol::SelCall),
            "hfdl" => Ok(Protocol::Hfdl),
            "ism" => Ok(Protocol::Ism),
            "eas" => Ok(Protocol::Eas),
            _ => Err(UnknownProtocol(s.to_string())),
        }
    }
}

/// Object-safe parser for one decoder family
///
/// Parsers are owned by a single decoder instance and are moved into its
/// thread, hence `Send`.
pub trait LineParser: Send {
    /// The protocol family handled by this parser
    fn protocol(&self) -> Protocol;

    /// Turn one decoded line (without terminator) into an output
    fn parse(&mut self, line: &str) -> Result<Output, ParseError>;

    /// Report any position carried by the line, without producing output
    ///
    /// Used when running unattended. Most decoders carry no positions.
    fn report_location(&mut self, _line: &str) -> Result<(), ParseError> {
        Ok(())
    }
}

/// Construction options shared by all parsers
///
/// Read once when the parser is created.
#[derive(Clone, Default)]
pub struct ParserOptions {
    /// Suppress pager messages that do not look like human text
    pub paging_filter: bool,
    /// Map receiving aircraft positions
    pub location_sink: Option<Arc<dyn LocationSink>>,
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("paging_filter", &self.paging_filter)
            .field("location_sink", &self.location_sink.is_some())
            .finish()
    }
}

/// Create a parser for the given protocol
pub fn create_parser(protocol: Protocol, options: ParserOptions) -> Box<dyn LineParser> {
    match protocol {
        Protocol::Pager => Box::new(pager::PagerParser::new(options.paging_filter)),
        Protocol::SelCall => Box::new(selcall::SelCallParser::new()),
        Protocol::Hfdl => Box::new(hfdl::HfdlParser::new(LocationReporter::new(
            options.location_sink,
        ))),
        Protocol::Ism => Box::new(ism::IsmParser::new()),
        Protocol::Eas => Box::new(passthrough::PassthroughParser::new(Protocol::Eas)),
    }
}

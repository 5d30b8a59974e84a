//! HF aircraft datalink (HFDL) frame parser
//!
//! The decoder prints one JSON document per frame. Frames nest: a link
//! layer PDU (LPDU) may carry a network layer PDU (HFNPDU), which may in
//! turn carry an ACARS message. System (SPDU) and media access (MPDU)
//! frames are recognized but not decoded further. Every layer writes into
//! the same flat [`HfdlMessage`].
//!
//! Frames without an LPDU produce no output.

use chrono::{Local, TimeZone};
use serde::Deserialize;

use crate::color::ColorCache;
use crate::error::ParseError;
use crate::location::LocationReporter;
use crate::record::{HfdlMessage, Output, Record};
use crate::{LineParser, Protocol};

#[derive(Debug, Deserialize)]
struct Envelope {
    hfdl: Frame,
}

#[derive(Debug, Deserialize)]
struct Frame {
    t: FrameTime,
    lpdu: Option<Lpdu>,
    spdu: Option<serde_json::Value>,
    mpdu: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FrameTime {
    sec: i64,
}

#[derive(Debug, Deserialize)]
struct Lpdu {
    #[serde(rename = "type")]
    kind: NamedType,
    ac_info: Option<AircraftInfo>,
    src: Option<Endpoint>,
    hfnpdu: Option<Hfnpdu>,
}

#[derive(Debug, Deserialize)]
struct NamedType {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AircraftInfo {
    icao: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    #[serde(rename = "type")]
    kind: String,
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Hfnpdu {
    acars: Option<Acars>,
    flight_id: Option<String>,
    utc_time: Option<ClockTime>,
    time: Option<ClockTime>,
    pos: Option<Position>,
}

#[derive(Debug, Deserialize)]
struct Acars {
    #[serde(default)]
    reg: String,
    #[serde(default)]
    msg_text: String,
    flight: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct ClockTime {
    hour: u32,
    min: u32,
    sec: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Position {
    lat: f64,
    lon: f64,
}

/// Parser for HFDL JSON frames
#[derive(Debug, Default)]
pub struct HfdlParser {
    colors: ColorCache,
    reporter: LocationReporter,
}

impl HfdlParser {
    /// Create a parser that reports positions through `reporter`
    pub fn new(reporter: LocationReporter) -> Self {
        Self {
            colors: ColorCache::new(),
            reporter,
        }
    }

    /// Parse one JSON frame
    pub fn parse_frame(&mut self, line: &str) -> Result<Option<HfdlMessage>, ParseError> {
        let envelope: Envelope = serde_json::from_str(line)?;
        let frame = envelope.hfdl;

        let time = Local
            .timestamp_opt(frame.t.sec, 0)
            .single()
            .ok_or(ParseError::InvalidTimestamp(frame.t.sec))?
            .format("%I:%M:%S")
            .to_string();

        let Some(lpdu) = frame.lpdu else {
            return Ok(None);
        };

        let mut out = HfdlMessage {
            time,
            ..Default::default()
        };

        self.apply_lpdu(lpdu, &mut out);
        if frame.spdu.is_some() {
            out.frame_type = "SPDU frame".to_string();
        }
        if frame.mpdu.is_some() {
            out.frame_type = "MPDU frame".to_string();
        }

        Ok(Some(out))
    }

    fn apply_lpdu(&mut self, lpdu: Lpdu, out: &mut HfdlMessage) {
        out.frame_type = lpdu.kind.name;

        if let Some(icao) = lpdu.ac_info.and_then(|info| info.icao) {
            out.aircraft = Some(icao.trim().to_string());
        }

        if let Some(src) = &lpdu.src {
            if src.kind == "Ground station" {
                out.flight = Some(format!("GS-{}", src.id.unwrap_or_default()));
            }
        }

        if let Some(hfnpdu) = lpdu.hfnpdu {
            self.apply_hfnpdu(hfnpdu, out);
        }
    }

    fn apply_hfnpdu(&mut self, hfnpdu: Hfnpdu, out: &mut HfdlMessage) {
        if let Some(acars) = hfnpdu.acars {
            self.apply_acars(acars, out);
            return;
        }

        self.set_flight(hfnpdu.flight_id.as_deref(), out);

        if let Some(t) = hfnpdu.utc_time.or(hfnpdu.time) {
            out.msgtime = Some(format!("{:02}:{:02}:{:02}", t.hour, t.min, t.sec));
        }

        if let Some(pos) = hfnpdu.pos {
            out.lat = Some(pos.lat);
            out.lon = Some(pos.lon);
            if self.reporter.report_hfdl(out) {
                tracing::debug!("Reported position of {:?}", out.flight);
            }
        }
    }

    fn apply_acars(&mut self, acars: Acars, out: &mut HfdlMessage) {
        out.frame_type = "ACARS frame".to_string();
        out.aircraft = Some(acars.reg.trim().to_string());
        out.message = Some(acars.msg_text.trim().to_string());
        self.set_flight(acars.flight.as_deref(), out);
    }

    /// Use a non-empty flight id as the record's identity
    fn set_flight(&mut self, flight: Option<&str>, out: &mut HfdlMessage) {
        let flight = flight.map(str::trim).unwrap_or("");
        if !flight.is_empty() {
            out.color = Some(self.colors.color_for(flight));
            out.flight = Some(flight.to_string());
        }
    }
}

impl LineParser for HfdlParser {
    fn protocol(&self) -> Protocol {
        Protocol::Hfdl
    }

    fn parse(&mut self, line: &str) -> Result<Output, ParseError> {
        Ok(self
            .parse_frame(line)?
            .map(|msg| Output::Record(Record::Hfdl(msg)))
            .unwrap_or(Output::Empty))
    }

    fn report_location(&mut self, line: &str) -> Result<(), ParseError> {
        // Positions are reported while parsing
        self.parse_frame(line).map(|_| ())
    }
}

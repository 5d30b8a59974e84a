//! Location reporting to an external map
//!
//! Parsers that see positions hand them to a [`LocationSink`]. The sink is
//! shared by every decoder instance, so implementations take `&self` and
//! must be safe to call from several threads.

use std::sync::Arc;

use serde::Serialize;

use crate::record::HfdlMessage;

/// Receiver of location updates (the map)
pub trait LocationSink: Send + Sync {
    /// Place or move `id` on the map
    fn update_location(&self, id: &str, location: &MapLocation, source: &str);
}

/// APRS-style map symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AprsSymbol {
    pub symbol: char,
    pub table: char,
    /// Position of `symbol` in the printable symbol sheet
    pub index: u32,
    /// Position of `table` in the printable symbol sheet
    pub tableindex: u32,
}

impl AprsSymbol {
    pub fn new(symbol: char, table: char) -> Self {
        Self {
            symbol,
            table,
            index: (symbol as u32).saturating_sub(33),
            tableindex: (table as u32).saturating_sub(33),
        }
    }

    /// Symbol used for aircraft positions
    pub fn aircraft() -> Self {
        Self::new('^', '/')
    }
}

/// A point on the map with optional details
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLocation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub symbol: AprsSymbol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl MapLocation {
    /// Build an aircraft location from a datalink record
    ///
    /// Returns `None` unless the record has a position.
    pub fn from_hfdl(msg: &HfdlMessage) -> Option<Self> {
        Some(Self {
            kind: "latlon",
            lat: msg.lat?,
            lon: msg.lon?,
            symbol: AprsSymbol::aircraft(),
            aircraft: msg.aircraft.clone(),
            comment: msg.message.clone(),
        })
    }
}

/// Forwards positioned records to the map, if one is attached
#[derive(Clone, Default)]
pub struct LocationReporter {
    sink: Option<Arc<dyn LocationSink>>,
}

impl LocationReporter {
    pub fn new(sink: Option<Arc<dyn LocationSink>>) -> Self {
        Self { sink }
    }

    /// Report a datalink record if it has a position and a flight
    ///
    /// Returns true when an update was sent.
    pub fn report_hfdl(&self, msg: &HfdlMessage) -> bool {
        let Some(sink) = &self.sink else {
            return false;
        };
        let Some(flight) = msg.flight.as_deref().filter(|f| !f.is_empty()) else {
            return false;
        };
        let Some(location) = MapLocation::from_hfdl(msg) else {
            return false;
        };

        sink.update_location(flight, &location, "HFDL");
        true
    }
}

impl std::fmt::Debug for LocationReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationReporter")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

//! Location sink that writes map updates to the log

use sig_protocol::{LocationSink, MapLocation};

/// Logs every map update at info level
#[derive(Debug, Default)]
pub struct LogMap;

impl LocationSink for LogMap {
    fn update_location(&self, id: &str, location: &MapLocation, source: &str) {
        match serde_json::to_string(location) {
            Ok(json) => tracing::info!(target: "sigline::map", "{} {}: {}", source, id, json),
            Err(e) => tracing::warn!("Failed to encode location of {}: {}", id, e),
        }
    }
}

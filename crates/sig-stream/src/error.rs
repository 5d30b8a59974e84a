//! Error types for the decoder stream

use thiserror::Error;

/// Errors that stop a decoder loop
///
/// Parse failures and log file trouble never end up here; they are logged
/// and the loop keeps going.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading from the upstream decoder failed
    #[error("I/O error reading decoder output: {0}")]
    Io(#[from] std::io::Error),

    /// The consumer of decoded outputs went away
    #[error("output channel closed")]
    ChannelClosed,
}

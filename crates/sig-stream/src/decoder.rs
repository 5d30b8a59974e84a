//! Decoder processing unit
//!
//! A [`TextDecoder`] owns everything one external decoder process needs:
//! the line framer, the protocol parser and, when running unattended, the
//! rotating log. Bytes go in, outputs come out.
//!
//! In interactive mode each line is parsed and the resulting output is
//! forwarded. In service mode each line is written to the log, positions
//! are reported to the map and an [`Output::Empty`] marker is produced.
//!
//! ## Run loops
//!
//! [`TextDecoder::run`] pulls from a blocking [`Read`] on the calling
//! thread, [`TextDecoder::spawn`] does the same on a dedicated thread and
//! [`TextDecoder::run_async`] reads a tokio [`AsyncRead`]. All of them
//! drain every buffered line before reading again, skip empty outputs and
//! stop at end of stream. They also stop as soon as their output can no
//! longer be delivered.

use std::io::{ErrorKind, Read};
use std::sync::{mpsc, Arc};
use std::thread;

use serde::{Deserialize, Serialize};
use sig_protocol::{create_parser, LineParser, LocationSink, Output, ParserOptions, Protocol};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, info, warn};

use crate::error::StreamError;
use crate::framer::{Line, LineFramer};
use crate::logger::{RotatingLogger, DEFAULT_MAX_LINES};
use crate::storage::Storage;

/// Size of each read from the upstream decoder
const READ_CHUNK: usize = 4096;

/// Decoder configuration, read once at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Log lines to files instead of emitting records
    #[serde(default)]
    pub service: bool,
    /// Suppress pager messages that do not look like human text
    #[serde(default)]
    pub paging_filter: bool,
    /// Lines per log file before rotation
    #[serde(default = "default_max_lines")]
    pub max_lines_per_file: usize,
}

fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            service: false,
            paging_filter: false,
            max_lines_per_file: DEFAULT_MAX_LINES,
        }
    }
}

/// Turns a stream of decoder bytes into outputs
pub struct TextDecoder {
    parser: Box<dyn LineParser>,
    framer: LineFramer,
    /// Present in service mode only
    logger: Option<RotatingLogger>,
    frequency_hz: u64,
}

impl TextDecoder {
    /// Create a decoder that parses every line
    pub fn interactive(parser: Box<dyn LineParser>) -> Self {
        Self {
            parser,
            framer: LineFramer::new(),
            logger: None,
            frequency_hz: 0,
        }
    }

    /// Create a decoder that logs every line through `logger`
    pub fn service(parser: Box<dyn LineParser>, logger: RotatingLogger) -> Self {
        Self {
            parser,
            framer: LineFramer::new(),
            logger: Some(logger),
            frequency_hz: 0,
        }
    }

    /// Create a decoder for `protocol` as described by `config`
    ///
    /// `storage` is only used in service mode.
    pub fn from_config(
        protocol: Protocol,
        config: &DecoderConfig,
        storage: Arc<dyn Storage>,
        location_sink: Option<Arc<dyn LocationSink>>,
    ) -> Self {
        let parser = create_parser(
            protocol,
            ParserOptions {
                paging_filter: config.paging_filter,
                location_sink,
            },
        );

        if config.service {
            let logger =
                RotatingLogger::new(storage, protocol.file_prefix(), config.max_lines_per_file);
            Self::service(parser, logger)
        } else {
            Self::interactive(parser)
        }
    }

    /// Whether lines are logged rather than parsed
    pub fn is_service(&self) -> bool {
        self.logger.is_some()
    }

    pub fn protocol(&self) -> Protocol {
        self.parser.protocol()
    }

    /// Set the frequency the receiver is tuned to
    pub fn set_dial_frequency(&mut self, frequency_hz: u64) {
        self.frequency_hz = frequency_hz;
        if let Some(logger) = self.logger.as_mut() {
            logger.set_frequency(frequency_hz);
        }
    }

    /// Display name used in log messages, e.g. `Service at 152000kHz`
    pub fn name(&self) -> String {
        let role = if self.is_service() { "Service" } else { "Client" };
        if self.frequency_hz > 0 {
            format!("{} at {}kHz", role, self.frequency_hz / 1000)
        } else {
            role.to_string()
        }
    }

    /// Bytes received but not yet terminated
    pub fn pending(&self) -> &[u8] {
        self.framer.pending()
    }

    /// Push bytes and process every complete line
    ///
    /// Lines that fail to parse are logged and produce no output.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Output> {
        self.framer.push_bytes(data);

        let mut outputs = Vec::new();
        while let Some(line) = self.framer.next_line() {
            if let Some(out) = self.process_line(line) {
                outputs.push(out);
            }
        }
        outputs
    }

    fn process_line(&mut self, line: Line) -> Option<Output> {
        debug!("{}: {}", self.name(), line.text);

        if let Some(logger) = self.logger.as_mut() {
            logger.write(&line.raw);
            if let Err(e) = self.parser.report_location(&line.text) {
                debug!("{}: Exception reporting location: {}", self.name(), e);
            }
            return Some(Output::Empty);
        }

        match self.parser.parse(&line.text) {
            Ok(out) => Some(out),
            Err(e) => {
                debug!("{}: Exception parsing: {}", self.name(), e);
                None
            }
        }
    }

    /// Close the log file; unterminated bytes are dropped
    pub fn finish(&mut self) {
        if !self.framer.pending().is_empty() {
            debug!(
                "{}: Dropping {} unterminated bytes",
                self.name(),
                self.framer.pending().len()
            );
            self.framer.clear();
        }
        if let Some(logger) = self.logger.as_mut() {
            logger.close();
        }
    }

    /// Blocking read loop
    ///
    /// Calls `emit` for every non-empty output until `reader` reaches end
    /// of stream. An error from `emit` ends the loop and is returned.
    pub fn run<R, F>(mut self, mut reader: R, mut emit: F) -> Result<(), StreamError>
    where
        R: Read,
        F: FnMut(Output) -> Result<(), StreamError>,
    {
        info!("{} starting...", self.name());
        let mut buffer = vec![0u8; READ_CHUNK];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("{}: Read error: {}", self.name(), e);
                    self.finish();
                    return Err(e.into());
                }
            };

            for out in self.feed(&buffer[..n]) {
                if out.is_empty() {
                    continue;
                }
                if let Err(e) = emit(out) {
                    debug!("{}: Output stopped: {}", self.name(), e);
                    self.finish();
                    return Err(e);
                }
            }
        }

        self.finish();
        info!("{} exiting...", self.name());
        Ok(())
    }

    /// Run the blocking read loop on a dedicated thread
    ///
    /// Outputs arrive on the returned receiver; it disconnects once the
    /// loop has ended. Dropping the receiver stops the loop with
    /// [`StreamError::ChannelClosed`].
    pub fn spawn<R>(
        self,
        reader: R,
    ) -> (
        thread::JoinHandle<Result<(), StreamError>>,
        mpsc::Receiver<Output>,
    )
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            self.run(reader, |out| tx.send(out).map_err(|_| StreamError::ChannelClosed))
        });
        (handle, rx)
    }

    /// Async read loop sending outputs into a channel
    pub async fn run_async<R>(
        mut self,
        mut reader: R,
        tx: tokio_mpsc::Sender<Output>,
    ) -> Result<(), StreamError>
    where
        R: AsyncRead + Unpin,
    {
        info!("{} starting...", self.name());
        let mut buffer = vec![0u8; READ_CHUNK];

        loop {
            let n = match reader.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("{}: Read error: {}", self.name(), e);
                    self.finish();
                    return Err(e.into());
                }
            };

            for out in self.feed(&buffer[..n]) {
                if out.is_empty() {
                    continue;
                }
                if tx.send(out).await.is_err() {
                    debug!("{}: Output channel closed", self.name());
                    self.finish();
                    return Err(StreamError::ChannelClosed);
                }
            }
        }

        self.finish();
        info!("{} exiting...", self.name());
        Ok(())
    }
}

impl std::fmt::Debug for TextDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextDecoder")
            .field("protocol", &self.parser.protocol())
            .field("logger", &self.logger)
            .field("frequency_hz", &self.frequency_hz)
            .field("pending", &self.framer.pending().len())
            .finish()
    }
}

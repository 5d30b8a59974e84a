//! Sigline
//!
//! Reads the text output of an external signal decoder on stdin and prints
//! one JSON record (or text line) per decoded message on stdout. In
//! service mode lines are logged to rotating files instead.

mod map;
mod settings;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sig_protocol::{LocationSink, Output, Protocol};
use sig_stream::{DecoderConfig, DirStorage, StreamError, TextDecoder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use map::LogMap;
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "sigline", version, about)]
struct Cli {
    /// Decoder family: pager, selcall, hfdl, ism or eas
    #[arg(short, long)]
    protocol: Protocol,

    /// Log every line to rotating files instead of printing records
    #[arg(long)]
    service: bool,

    /// Frequency the receiver is tuned to, in Hz
    #[arg(short, long)]
    frequency: Option<u64>,

    /// Directory for service mode logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Only show pager messages that look like human text
    #[arg(long)]
    filter: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    save_settings: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sigline=info,sig_protocol=info,sig_stream=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load();
    if cli.filter {
        settings.paging_filter = true;
    }
    if let Some(dir) = &cli.log_dir {
        settings.log_dir = dir.clone();
    }

    if cli.save_settings {
        let path = settings.save()?;
        tracing::info!("Saved settings to {}", path.display());
        return Ok(());
    }

    let config = DecoderConfig {
        service: cli.service,
        paging_filter: settings.paging_filter,
        max_lines_per_file: settings.max_lines_per_file,
    };
    let storage = Arc::new(DirStorage::new(
        &settings.log_dir,
        settings.max_stored_files,
    ));
    let map: Arc<dyn LocationSink> = Arc::new(LogMap);

    let mut decoder = TextDecoder::from_config(cli.protocol, &config, storage, Some(map));
    if let Some(frequency) = cli.frequency {
        decoder.set_dial_frequency(frequency);
    }

    tracing::info!("Starting {} decoder ({})", cli.protocol, decoder.name());
    if decoder.is_service() {
        tracing::info!("Logging to {}", settings.log_dir.display());
    }

    let mut out = io::stdout().lock();
    let result = decoder.run(io::stdin().lock(), |output| {
        print_output(&mut out, &output).map_err(StreamError::from)
    });

    match result {
        Err(StreamError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Decoder stopped"),
    }
}

/// Records as one JSON object per line, text as-is
fn print_output(out: &mut impl Write, output: &Output) -> io::Result<()> {
    match output {
        Output::Empty => return Ok(()),
        Output::Text(text) => writeln!(out, "{}", text)?,
        Output::Record(record) => {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
        }
    }
    out.flush()
}

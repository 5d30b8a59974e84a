//! Decoder Stream Engine
//!
//! This crate connects the raw byte output of an external signal decoder
//! to the line parsers in [`sig_protocol`].
//!
//! # Architecture
//!
//! - [`LineFramer`]: buffers bytes and splits them into lines
//! - [`RotatingLogger`]: appends raw lines to files, rotating every
//!   10000 lines through a [`Storage`]
//! - [`TextDecoder`]: one processing unit per decoder process, in either
//!   interactive mode (parse and emit) or service mode (log and report
//!   positions)
//!
//! Each decoder instance is single-threaded and owns its state. Several
//! instances may share one [`Storage`] and one location sink.
//!
//! # Example
//!
//! ```rust
//! use sig_protocol::{create_parser, ParserOptions, Protocol};
//! use sig_stream::TextDecoder;
//!
//! let parser = create_parser(Protocol::SelCall, ParserOptions::default());
//! let mut decoder = TextDecoder::interactive(parser);
//!
//! let outputs = decoder.feed(b"ZVEI1: 1234 ZVEI1: 5678\n");
//! assert_eq!(outputs[0].as_text(), Some("[ZVEI1] 1234 5678 "));
//! ```

pub mod decoder;
pub mod error;
pub mod framer;
pub mod logger;
pub mod storage;

pub use decoder::{DecoderConfig, TextDecoder};
pub use error::StreamError;
pub use framer::{Line, LineFramer};
pub use logger::{RotatingLogger, DEFAULT_MAX_LINES};
pub use storage::{DirStorage, Storage, DEFAULT_MAX_FILES};

//! # alog
//!
//! A small, allocation-conscious text logger:
//!
//! * **Cheap records**: headers and numbers are rendered by hand-rolled
//!   codecs straight into a reused byte buffer, with no `format!` on the
//!   common paths
//! * **Optional batching**: a 2 KiB or 4 KiB buffer collects records and
//!   writes them to the sink in one call
//! * **Never fails the caller**: bad arguments degrade to markers in the
//!   output and sink errors are swallowed
//!
//! ## Main Components
//!
//! * `Logger`: the write pipeline (header, payload, newline, flush policy)
//! * `Sink`: where formatted bytes go; `Discard` is the default
//! * `codec`: integer and fixed-point float to text
//! * `Flags` / `LevelSet`: header, buffering and level configuration
//! * `global`: a process-wide logger on stdout
//! * `bridge`: a `log::Log` adapter
//!
//! ## Record layout
//!
//! ```text
//! [YYYY/][MM/DD ][hh:mm:ss[.uuuuuu] ][prefix]<payload>\n
//! ```
//!
//! Each bracketed block appears only when its flag is set. Every record ends
//! in exactly one newline.
//!
//! ## Quick Start
//!
//! ```
//! use alog::{log_print, log_printf, Flags, Level, Logger, SharedBuffer};
//!
//! let out = SharedBuffer::new();
//! let logger = Logger::with_sink(out.clone(), "web|", Flags::PREFIX | Flags::BUF_SMALL);
//!
//! log_printf!(logger, "GET %s -> %d", "/index", 200);
//! log_print!(logger, "cache hit ratio ", 0.875);
//! logger.printj("req|", Some(&[1, 2, 3]));
//! logger.printfl(Level::Debug, "not shown", &[]);
//!
//! // buffered: nothing written until flush
//! assert!(out.is_empty());
//! logger.close()?;
//! assert_eq!(
//!     out.to_string_lossy(),
//!     "web|GET /index -> 200\nweb|cache hit ratio 0.875\nweb|req|[1,2,3]\n"
//! );
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod bridge;
pub mod codec;
pub mod config;
pub mod flags;
pub mod global;
pub mod level;
pub mod logger;
pub mod sink;
pub mod value;

pub use bridge::LogBridge;
pub use config::{Config, ConfigError};
pub use flags::{BufferMode, Flags, ParseError};
pub use global::std_logger;
pub use level::{Level, LevelSet};
pub use logger::Logger;
pub use sink::{Discard, SharedBuffer, Sink, WriterSink};
pub use value::Arg;

//! Process-wide default logger.
//!
//! The default logger is created on first use, writes to standard output
//! with [`Flags::STD`] and an empty prefix, and lives for the rest of the
//! process. It is never closed, which is why it is built unbuffered:
//! every record reaches stdout before the call returns.
//!
//! Every free function here is a plain call on [`std_logger()`].

use std::io;

use lazy_static::lazy_static;
use serde::Serialize;

use crate::flags::Flags;
use crate::level::{Level, LevelSet};
use crate::logger::Logger;
use crate::sink::Sink;
use crate::value::Arg;

lazy_static! {
    static ref STD: Logger = Logger::with_sink(io::stdout(), "", Flags::STD);
}

/// The default logger.
pub fn std_logger() -> &'static Logger {
    &STD
}

pub fn printf(format: &str, args: &[Arg<'_>]) {
    STD.printf(format, args);
}

pub fn print(args: &[Arg<'_>]) {
    STD.print(args);
}

pub fn printj<T: Serialize + ?Sized>(prefix: &str, value: Option<&T>) {
    STD.printj(prefix, value);
}

pub fn printfl(level: Level, format: &str, args: &[Arg<'_>]) {
    STD.printfl(level, format, args);
}

pub fn printl(level: Level, args: &[Arg<'_>]) {
    STD.printl(level, args);
}

pub fn set_output(sink: impl Sink + 'static) {
    STD.set_output(sink);
}

pub fn set_prefix(prefix: &str) {
    STD.set_prefix(prefix);
}

pub fn set_flag(flags: Flags) {
    STD.set_flag(flags);
}

pub fn set_levels(levels: LevelSet) {
    STD.set_levels(levels);
}

pub fn flush() {
    STD.flush();
}

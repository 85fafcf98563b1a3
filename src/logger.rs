use std::fmt;
use std::io::{self, Write as _};
use std::mem;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::codec::{ftoa, itoa, utoa};
use crate::flags::{BufferMode, Flags};
use crate::level::{Level, LevelSet};
use crate::sink::{Discard, Sink};
use crate::value::Arg;

/// Rendered in place of an argument whose type does not fit its verb.
pub const UNSUPPORTED: &[u8] = b"?{unexp}";

/// Rendered by [`Logger::printj`] when there is no value or it fails to encode.
pub const EMPTY_OBJECT: &[u8] = b"{}";

/// Decimal places used by the `%f` verb.
const PRINTF_FLOAT_PLACES: usize = 2;

/// Initial size of the JSON scratch buffer.
const JSON_SCRATCH: usize = 256;

/// A text logger writing newline-terminated records to a [`Sink`].
///
/// Each record is composed in an internal byte buffer: an optional
/// date/time/prefix header selected by [`Flags`], then the payload of one of
/// three entry points:
///
/// * [`printf`](Logger::printf): `%d %s %f %t %%` positional formatting
/// * [`print`](Logger::print): arguments concatenated by type
/// * [`printj`](Logger::printj): a serde value encoded as JSON
///
/// # Buffering
///
/// Without a buffering flag every record is written to the sink as soon as it
/// is complete. With [`Flags::BUF_SMALL`] or [`Flags::BUF_LARGE`] records
/// accumulate and are written in one piece once the buffer grows past its
/// capacity, or on [`flush`](Logger::flush) / [`close`](Logger::close) /
/// drop. There is no background flushing: a buffered logger that is leaked
/// or killed loses whatever it still holds.
///
/// # Thread Safety
///
/// All methods take `&self`. One lock serializes writers, reconfiguration and
/// flushing, so a `Logger` can be shared through an `Arc` or a `static`.
///
/// # Failures
///
/// Logging never fails from the caller's point of view. Arguments that don't
/// match their verb render as `?{unexp}`, JSON encoding errors render as `{}`,
/// and sink write errors are dropped (reported only as `tracing` events).
/// Only [`close`](Logger::close) returns an error, and only from the sink's
/// own close.
///
/// # Examples
///
/// ```
/// # use alog::{log_printf, Flags, Logger, SharedBuffer};
/// let out = SharedBuffer::new();
/// let logger = Logger::with_sink(out.clone(), "app|", Flags::PREFIX);
///
/// log_printf!(logger, "%s took %dms (%f%%)", "load", 12, 99.5);
/// assert_eq!(out.to_string_lossy(), "app|load took 12ms (99.50%)\n");
/// ```
pub struct Logger {
    inner: Mutex<Inner>,
    levels: AtomicU8,
}

struct Inner {
    sink: Box<dyn Sink>,
    buf: Vec<u8>,
    /// JSON scratch space, allocated on the first `printj`.
    json: Option<Vec<u8>>,
    prefix: Vec<u8>,
    flags: Flags,
    mode: BufferMode,
}

impl Logger {
    /// Creates a logger. `None` for `sink` logs into [`Discard`].
    ///
    /// The buffering mode is taken from `flags` here and cannot change later.
    pub fn new(sink: Option<Box<dyn Sink>>, prefix: &str, flags: Flags) -> Self {
        let mode = flags.buffer_mode();
        Self {
            inner: Mutex::new(Inner {
                sink: sink.unwrap_or_else(|| Box::new(Discard)),
                buf: Vec::with_capacity(mode.capacity()),
                json: None,
                prefix: prefix.as_bytes().to_vec(),
                flags,
                mode,
            }),
            levels: AtomicU8::new(LevelSet::default().bits()),
        }
    }

    /// Shorthand for `Logger::new(Some(Box::new(sink)), prefix, flags)`.
    pub fn with_sink(sink: impl Sink + 'static, prefix: &str, flags: Flags) -> Self {
        Self::new(Some(Box::new(sink)), prefix, flags)
    }

    /// Replaces the sink. Bytes already buffered go to the new sink.
    pub fn set_output(&self, sink: impl Sink + 'static) {
        self.inner.lock().sink = Box::new(sink);
    }

    pub fn set_prefix(&self, prefix: &str) {
        let mut inner = self.inner.lock();
        inner.prefix.clear();
        inner.prefix.extend_from_slice(prefix.as_bytes());
    }

    /// Replaces the header flags. Buffering bits are ignored after construction.
    pub fn set_flag(&self, flags: Flags) {
        self.inner.lock().flags = flags;
    }

    pub fn flags(&self) -> Flags {
        self.inner.lock().flags
    }

    pub fn buffer_mode(&self) -> BufferMode {
        self.inner.lock().mode
    }

    /// Enables every level in `levels`, leaving the others untouched.
    pub fn enable_levels(&self, levels: impl Into<LevelSet>) {
        self.levels.fetch_or(levels.into().bits(), Ordering::Relaxed);
    }

    /// Disables every level in `levels`, leaving the others untouched.
    pub fn disable_levels(&self, levels: impl Into<LevelSet>) {
        self.levels.fetch_and(!levels.into().bits(), Ordering::Relaxed);
    }

    pub fn set_levels(&self, levels: LevelSet) {
        self.levels.store(levels.bits(), Ordering::Relaxed);
    }

    pub fn levels(&self) -> LevelSet {
        LevelSet::from_bits(self.levels.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn is_enabled(&self, level: Level) -> bool {
        self.levels().contains(level)
    }

    /// Writes one record formatted from `format` and positional `args`.
    ///
    /// | verb | accepts | renders |
    /// |------|---------|---------|
    /// | `%d` | [`Arg::Int`], [`Arg::Uint`] | decimal |
    /// | `%s` | [`Arg::Str`] | the text |
    /// | `%f` | [`Arg::F32`], [`Arg::F64`] | two fixed decimals, truncated |
    /// | `%t` | [`Arg::Bool`] | `true` / `false` |
    /// | `%%` | nothing | `%` |
    ///
    /// An argument of the wrong kind renders as `?{unexp}`. A verb with no
    /// argument left renders nothing. Unknown verbs render nothing and do
    /// not consume an argument.
    pub fn printf(&self, format: &str, args: &[Arg<'_>]) {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let start = inner.begin(&now);
        render_printf(&mut inner.buf, format, args);
        inner.finish(start);
    }

    /// Writes one record made of `args` concatenated with no separator.
    ///
    /// Integers render in decimal and floats at their shortest exact
    /// precision (unlike the two fixed places of `%f`).
    pub fn print(&self, args: &[Arg<'_>]) {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let start = inner.begin(&now);
        for arg in args {
            render_arg(&mut inner.buf, arg);
        }
        inner.finish(start);
    }

    /// Writes one record of `prefix` followed by `value` encoded as JSON.
    ///
    /// `None`, or a value serde refuses to encode, renders as `{}`.
    ///
    /// ```
    /// # use alog::{Flags, Logger, SharedBuffer};
    /// # use std::collections::BTreeMap;
    /// let out = SharedBuffer::new();
    /// let logger = Logger::with_sink(out.clone(), "", Flags::NONE);
    ///
    /// let event = BTreeMap::from([("user", "gon"), ("city", "conway")]);
    /// logger.printj("login|", Some(&event));
    /// logger.printj::<()>("empty|", None);
    ///
    /// assert_eq!(
    ///     out.to_string_lossy(),
    ///     "login|{\"city\":\"conway\",\"user\":\"gon\"}\nempty|{}\n"
    /// );
    /// ```
    pub fn printj<T: Serialize + ?Sized>(&self, prefix: &str, value: Option<&T>) {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let start = inner.begin(&now);
        inner.buf.extend_from_slice(prefix.as_bytes());
        inner.append_json(value);
        inner.finish(start);
    }

    /// [`printf`](Logger::printf) if `level` is enabled.
    pub fn printfl(&self, level: Level, format: &str, args: &[Arg<'_>]) {
        if self.is_enabled(level) {
            self.printf(format, args);
        }
    }

    /// [`print`](Logger::print) if `level` is enabled.
    pub fn printl(&self, level: Level, args: &[Arg<'_>]) {
        if self.is_enabled(level) {
            self.print(args);
        }
    }

    /// [`printj`](Logger::printj) if `level` is enabled.
    pub fn printjl<T: Serialize + ?Sized>(&self, level: Level, prefix: &str, value: Option<&T>) {
        if self.is_enabled(level) {
            self.printj(prefix, value);
        }
    }

    /// Writes one record rendered by `core::fmt` directly into the buffer.
    ///
    /// Used by the `log` bridge; prefer the other entry points on hot paths.
    pub fn print_fmt(&self, args: fmt::Arguments<'_>) {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let start = inner.begin(&now);
        if let Some(s) = args.as_str() {
            inner.buf.extend_from_slice(s.as_bytes());
        } else {
            // writing into a Vec cannot fail
            let _ = inner.buf.write_fmt(args);
        }
        inner.finish(start);
    }

    /// [`print_fmt`](Logger::print_fmt) if `level` is enabled.
    pub fn print_fmt_level(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.is_enabled(level) {
            self.print_fmt(args);
        }
    }

    /// Writes out any buffered records. Does nothing for an unbuffered logger.
    pub fn flush(&self) {
        self.inner.lock().flush();
    }

    /// Flushes, then closes the sink and swaps in [`Discard`].
    ///
    /// Records written after `close` are formatted as usual but never reach
    /// the old sink. [`set_output`](Logger::set_output) re-opens the logger.
    pub fn close(&self) -> io::Result<()> {
        let mut sink = {
            let mut inner = self.inner.lock();
            inner.flush();
            mem::replace(&mut inner.sink, Box::new(Discard))
        };
        sink.close().map_err(|err| {
            tracing::warn!(error = %err, "alog: sink close failed");
            err
        })
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.inner.get_mut().flush();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Logger")
            .field("prefix", &String::from_utf8_lossy(&inner.prefix))
            .field("flags", &inner.flags)
            .field("mode", &inner.mode)
            .field("buffered", &inner.buf.len())
            .field("levels", &self.levels())
            .finish()
    }
}

impl Inner {
    /// Prepares the buffer for a new record and returns where it starts.
    fn begin(&mut self, now: &DateTime<Utc>) -> usize {
        if !self.mode.is_buffered() {
            self.buf.clear();
        }
        let start = self.buf.len();
        self.format_header(now);
        start
    }

    /// Terminates the record that began at `start` and writes out if due.
    fn finish(&mut self, start: usize) {
        if self.buf.len() == start || self.buf.last() != Some(&b'\n') {
            self.buf.push(b'\n');
        }
        if !self.mode.is_buffered() || self.buf.len() > self.mode.capacity() {
            self.write_out();
        }
    }

    fn flush(&mut self) {
        if self.mode.is_buffered() && !self.buf.is_empty() {
            self.write_out();
        }
    }

    fn write_out(&mut self) {
        if let Err(err) = self.sink.write(&self.buf) {
            tracing::debug!(error = %err, bytes = self.buf.len(), "alog: sink write failed, dropping records");
        }
        self.buf.clear();
    }

    /// `[YYYY/][MM/DD ][hh:mm:ss[.uuuuuu] ][prefix]`
    fn format_header(&mut self, now: &DateTime<Utc>) {
        let flags = self.flags;
        if flags.intersects(Flags::DATE | Flags::MMDD | Flags::TIME | Flags::MICROSEC) {
            let t: NaiveDateTime = if flags.contains(Flags::UTC) {
                now.naive_utc()
            } else {
                now.with_timezone(&Local).naive_local()
            };
            let buf = &mut self.buf;

            if flags.intersects(Flags::DATE | Flags::MMDD) {
                if flags.contains(Flags::DATE) {
                    itoa(buf, i64::from(t.year()), 4);
                    buf.push(b'/');
                }
                itoa(buf, i64::from(t.month()), 2);
                buf.push(b'/');
                itoa(buf, i64::from(t.day()), 2);
                buf.push(b' ');
            }

            if flags.intersects(Flags::TIME | Flags::MICROSEC) {
                itoa(buf, i64::from(t.hour()), 2);
                buf.push(b':');
                itoa(buf, i64::from(t.minute()), 2);
                buf.push(b':');
                itoa(buf, i64::from(t.second()), 2);
                if flags.contains(Flags::MICROSEC) {
                    buf.push(b'.');
                    // leap seconds report nanoseconds past 1e9
                    let micros = (t.nanosecond() / 1_000).min(999_999);
                    itoa(buf, i64::from(micros), 6);
                }
                buf.push(b' ');
            }
        }
        if flags.contains(Flags::PREFIX) {
            self.buf.extend_from_slice(&self.prefix);
        }
    }

    fn append_json<T: Serialize + ?Sized>(&mut self, value: Option<&T>) {
        let Some(value) = value else {
            self.buf.extend_from_slice(EMPTY_OBJECT);
            return;
        };

        let scratch = self.json.get_or_insert_with(|| Vec::with_capacity(JSON_SCRATCH));
        scratch.clear();
        match serde_json::to_writer(&mut *scratch, value) {
            Ok(()) => self.buf.extend_from_slice(scratch),
            Err(err) => {
                tracing::debug!(error = %err, "alog: json encoding failed");
                self.buf.extend_from_slice(EMPTY_OBJECT);
            }
        }
    }
}

fn render_printf(buf: &mut Vec<u8>, format: &str, args: &[Arg<'_>]) {
    let bytes = format.as_bytes();
    let mut args = args.iter();
    let mut i = 0;

    while i < bytes.len() {
        let Some(pos) = bytes[i..].iter().position(|&b| b == b'%') else {
            buf.extend_from_slice(&bytes[i..]);
            break;
        };
        buf.extend_from_slice(&bytes[i..i + pos]);

        // '%' is ASCII, so the next byte starts a char
        let verb_at = i + pos + 1;
        let Some(verb) = format[verb_at..].chars().next() else {
            break;
        };
        i = verb_at + verb.len_utf8();

        if verb == '%' {
            buf.push(b'%');
            continue;
        }
        if args.len() == 0 {
            continue;
        }

        match verb {
            'd' => match args.next() {
                Some(&Arg::Int(v)) => itoa(buf, v, 0),
                Some(&Arg::Uint(v)) => utoa(buf, v, 0),
                _ => buf.extend_from_slice(UNSUPPORTED),
            },
            's' => match args.next() {
                Some(&Arg::Str(v)) => buf.extend_from_slice(v.as_bytes()),
                _ => buf.extend_from_slice(UNSUPPORTED),
            },
            'f' => match args.next() {
                Some(&Arg::F64(v)) => ftoa(buf, v, PRINTF_FLOAT_PLACES),
                Some(&Arg::F32(v)) => ftoa(buf, f64::from(v), PRINTF_FLOAT_PLACES),
                _ => buf.extend_from_slice(UNSUPPORTED),
            },
            't' => match args.next() {
                Some(&Arg::Bool(v)) => push_bool(buf, v),
                _ => buf.extend_from_slice(UNSUPPORTED),
            },
            _ => {}
        }
    }
}

fn render_arg(buf: &mut Vec<u8>, arg: &Arg<'_>) {
    match *arg {
        Arg::Str(v) => buf.extend_from_slice(v.as_bytes()),
        Arg::Bytes(v) => buf.extend_from_slice(v),
        Arg::Int(v) => itoa(buf, v, 0),
        Arg::Uint(v) => utoa(buf, v, 0),
        Arg::Bool(v) => push_bool(buf, v),
        // Display gives the shortest repr that round-trips, never an exponent
        Arg::F32(v) => {
            let _ = write!(buf, "{v}");
        }
        Arg::F64(v) => {
            let _ = write!(buf, "{v}");
        }
        Arg::Unsupported => buf.extend_from_slice(UNSUPPORTED),
    }
}

#[inline]
fn push_bool(buf: &mut Vec<u8>, v: bool) {
    buf.extend_from_slice(if v { b"true" } else { b"false" });
}

/// Writes a [`Logger::print`] record, converting each argument with `Arg::from`.
///
/// ```
/// # use alog::{log_print, Flags, Logger, SharedBuffer};
/// let out = SharedBuffer::new();
/// let logger = Logger::with_sink(out.clone(), "", Flags::NONE);
/// log_print!(logger, "n=", 42u8, " ok=", true, " ratio=", 0.25);
/// assert_eq!(out.to_string_lossy(), "n=42 ok=true ratio=0.25\n");
/// ```
#[macro_export]
macro_rules! log_print {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.print(&[$($crate::Arg::from($arg)),*])
    };
}

/// Writes a [`Logger::printf`] record, converting each argument with `Arg::from`.
#[macro_export]
macro_rules! log_printf {
    ($logger:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $logger.printf($fmt, &[$($crate::Arg::from($arg)),*])
    };
}

/// Level-gated [`log_print!`].
#[macro_export]
macro_rules! log_printl {
    ($logger:expr, $level:expr $(, $arg:expr)* $(,)?) => {
        $logger.printl($level, &[$($crate::Arg::from($arg)),*])
    };
}

/// Level-gated [`log_printf!`].
#[macro_export]
macro_rules! log_printfl {
    ($logger:expr, $level:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $logger.printfl($level, $fmt, &[$($crate::Arg::from($arg)),*])
    };
}

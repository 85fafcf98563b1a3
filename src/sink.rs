use std::fs::File;
use std::io::{self, BufWriter, Stderr, Stdout, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Destination for formatted log bytes.
///
/// A sink receives whole records (or whole batches of records in buffered
/// mode) in one `write` call. The logger never retries and never reports a
/// write failure to its caller, so implementations should do their own
/// retrying if they need it.
///
/// `close` is called once by [`Logger::close`](crate::Logger::close) after
/// the final flush. The default does nothing.
///
/// # Usage
///
/// ```
/// # use alog::Sink;
/// # use std::io;
/// // Counts bytes instead of storing them
/// struct ByteCounter(usize);
///
/// impl Sink for ByteCounter {
///     fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
///         self.0 += buf.len();
///         Ok(buf.len())
///     }
/// }
/// ```
pub trait Sink: Send {
    /// Accepts `buf` and returns how many bytes were taken.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Releases the destination. Errors are returned from `Logger::close`.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that accepts every write and drops the bytes.
///
/// Used when a logger is created without a sink and after a logger is closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl Sink for Discard {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }
}

impl Sink for Vec<u8> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
}

impl Sink for Stdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for Stderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write_all(buf)?;
        Ok(buf.len())
    }
}

impl Sink for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<W: Write + Send> Sink for BufWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Adapts any [`io::Write`] into a [`Sink`]. Closing flushes the writer.
#[derive(Debug)]
pub struct WriterSink<W>(pub W);

impl<W> WriterSink<W> {
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// In-memory sink whose contents stay readable after it is handed to a logger.
///
/// Clones share the same storage.
///
/// ```
/// # use alog::{Flags, Logger, SharedBuffer};
/// let out = SharedBuffer::new();
/// let logger = Logger::new(Some(Box::new(out.clone())), "", Flags::NONE);
/// logger.print(&["hello".into()]);
/// assert_eq!(out.to_string_lossy(), "hello\n");
/// ```
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().clone()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Sink for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }
}

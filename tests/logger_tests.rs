use alog::{log_print, log_printf, Arg, BufferMode, Flags, Level, LevelSet, Logger, SharedBuffer, Sink};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Records every write call separately.
#[derive(Clone, Default)]
struct CountingSink {
    writes: Arc<AtomicUsize>,
    data: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicUsize>,
}

impl CountingSink {
    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn text(&self) -> String {
        String::from_utf8(self.data.lock().unwrap().clone()).unwrap()
    }
}

impl Sink for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.data.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingSink;

impl Sink for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
    }

    fn close(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "close failed"))
    }
}

fn logger(flags: Flags) -> (Logger, SharedBuffer) {
    let out = SharedBuffer::new();
    (Logger::with_sink(out.clone(), "", flags), out)
}

#[test]
fn test_printf_without_header() {
    let (logger, out) = logger(Flags::NONE);
    logger.printf("test: %s", &["alog".into()]);
    assert_eq!(out.to_string_lossy(), "test: alog\n");
}

#[test]
fn test_missing_sink_discards() {
    let logger = Logger::new(None, "", Flags::STD);
    logger.print(&["nowhere".into()]);
    logger.flush();
    assert!(logger.close().is_ok());
}

#[test]
fn test_close_with_prefix_to_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    {
        let logger = Logger::with_sink(file.reopen().unwrap(), "CLOSE|", Flags::PREFIX);
        log_print!(logger, "test");
        log_print!(logger, "log");
        logger.close().unwrap();
        log_print!(logger, "XX");
        for i in 0..10 {
            log_print!(logger, "xx", i);
        }
    }
    let content = fs::read_to_string(file.path()).unwrap();
    assert_eq!(content, "CLOSE|test\nCLOSE|log\n");
}

#[test]
fn test_close_buffered_drains_then_detaches() {
    let sink = CountingSink::default();
    let logger = Logger::with_sink(sink.clone(), "CLOSE|", Flags::PREFIX | Flags::BUF_SMALL);
    log_print!(logger, "test");
    log_print!(logger, "log");
    assert_eq!(sink.writes(), 0);

    logger.close().unwrap();
    assert_eq!(sink.writes(), 1);
    assert_eq!(sink.closed.load(Ordering::SeqCst), 1);

    for _ in 0..100 {
        log_print!(logger, "after close, long enough to cross the threshold eventually");
    }
    logger.flush();
    drop(logger);
    assert_eq!(sink.text(), "CLOSE|test\nCLOSE|log\n");
    assert_eq!(sink.writes(), 1);
}

#[test]
fn test_set_output_reopens_after_close() {
    let (logger, first) = logger(Flags::NONE);
    logger.print(&["one".into()]);
    logger.close().unwrap();
    logger.print(&["lost".into()]);

    let second = SharedBuffer::new();
    logger.set_output(second.clone());
    logger.print(&["two".into()]);

    assert_eq!(first.to_string_lossy(), "one\n");
    assert_eq!(second.to_string_lossy(), "two\n");
}

#[test]
fn test_exactly_one_newline() {
    let (logger, out) = logger(Flags::NONE);
    logger.print(&["already\n".into()]);
    logger.print(&[]);
    logger.printf("", &[]);
    logger.printf("two\n\n", &[]);
    logger.print(&["plain".into()]);
    assert_eq!(out.to_string_lossy(), "already\n\n\ntwo\n\nplain\n");
}

#[test]
fn test_empty_records_in_buffered_mode() {
    let (logger, out) = logger(Flags::BUF_SMALL);
    logger.print(&["a".into()]);
    logger.print(&[]);
    logger.print(&["b\n".into()]);
    logger.flush();
    assert_eq!(out.to_string_lossy(), "a\n\nb\n");
}

#[test]
fn test_unbuffered_writes_once_per_call() {
    let sink = CountingSink::default();
    let logger = Logger::with_sink(sink.clone(), "", Flags::NONE);
    assert_eq!(logger.buffer_mode(), BufferMode::Unbuffered);

    for i in 0..25 {
        log_printf!(logger, "record %d", i);
        assert_eq!(sink.writes(), i + 1);
    }
    logger.print(&[]);
    assert_eq!(sink.writes(), 26);

    // flush has nothing to do without a buffer
    logger.flush();
    assert_eq!(sink.writes(), 26);
}

#[test]
fn test_buffered_threshold() {
    let sink = CountingSink::default();
    let logger = Logger::with_sink(sink.clone(), "", Flags::BUF_SMALL);
    assert_eq!(logger.buffer_mode(), BufferMode::Small);

    // 99 bytes + newline per record
    let line = "x".repeat(99);
    for _ in 0..20 {
        logger.print(&[Arg::from(&line)]);
    }
    assert_eq!(sink.writes(), 0, "2000 bytes stay below the 2048 byte threshold");

    logger.print(&[Arg::from(&line)]);
    assert_eq!(sink.writes(), 1);
    assert_eq!(sink.text().len(), 2100);

    logger.flush();
    assert_eq!(sink.writes(), 1, "nothing left to flush");

    logger.print(&[Arg::from(&line)]);
    logger.flush();
    assert_eq!(sink.writes(), 2);
    assert_eq!(sink.text().len(), 2200);
}

#[test]
fn test_large_buffer_threshold() {
    let sink = CountingSink::default();
    let logger = Logger::with_sink(sink.clone(), "", Flags::BUF_LARGE | Flags::BUF_SMALL);
    assert_eq!(logger.buffer_mode(), BufferMode::Large);

    let line = "y".repeat(99);
    for _ in 0..40 {
        logger.print(&[Arg::from(&line)]);
    }
    assert_eq!(sink.writes(), 0);
    logger.print(&[Arg::from(&line)]);
    assert_eq!(sink.writes(), 1);
}

#[test]
fn test_drop_flushes_buffer() {
    let sink = CountingSink::default();
    {
        let logger = Logger::with_sink(sink.clone(), "", Flags::BUF_LARGE);
        log_print!(logger, "kept");
        assert_eq!(sink.writes(), 0);
    }
    assert_eq!(sink.text(), "kept\n");
}

#[test]
fn test_printf_type_mismatch_marker() {
    let (logger, out) = logger(Flags::NONE);
    log_printf!(logger, "d=%d s=%s f=%f t=%t done", 1.5, 7, "text", 3u8);
    assert_eq!(out.to_string_lossy(), "d=?{unexp} s=?{unexp} f=?{unexp} t=?{unexp} done\n");
}

#[test]
fn test_printf_all_verbs() {
    let (logger, out) = logger(Flags::NONE);
    log_printf!(
        logger,
        "%d %d %s %f %f %t %t 100%%",
        -42,
        18u64,
        "str",
        3.14159,
        -0.5f32,
        true,
        false
    );
    assert_eq!(out.to_string_lossy(), "-42 18 str 3.14 -0.50 true false 100%\n");
}

#[test]
fn test_printf_extra_verbs_dropped() {
    let (logger, out) = logger(Flags::NONE);
    log_printf!(logger, "a=%d b=%d c=%s.", 1);
    log_printf!(logger, "none: %d %s %f %t");
    log_printf!(logger, "unknown %q verb %d", 5);
    assert_eq!(out.to_string_lossy(), "a=1 b= c=.\nnone:    \nunknown  verb 5\n");
}

#[test]
fn test_print_value_kinds() {
    let (logger, out) = logger(Flags::NONE);
    let owned = String::from("owned");
    log_print!(
        logger,
        "s:",
        &owned,
        " b:",
        b"bytes",
        " i:",
        -8i8,
        i64::MIN,
        " u:",
        u64::MAX,
        " t:",
        true,
        " f:",
        0.1f32,
        "/",
        2.5e-3,
        " x:",
        Arg::Unsupported,
        " o:",
        None::<i32>
    );
    assert_eq!(
        out.to_string_lossy(),
        "s:owned b:bytes i:-8-9223372036854775808 u:18446744073709551615 t:true f:0.1/0.0025 x:?{unexp} o:?{unexp}\n"
    );
}

#[derive(Serialize)]
struct Event<'a> {
    name: &'a str,
    city: &'a str,
    #[serde(rename = "cnt")]
    count: u32,
}

#[test]
fn test_printj() {
    let (logger, out) = logger(Flags::PREFIX);
    logger.set_prefix("jsonTest ");

    let event = Event { name: "Gon", city: "Conway", count: 3 };
    logger.printj("log|", Some(&event));
    logger.printj::<Event>("nil|", None);
    logger.printj("", Some("quoted \"text\""));

    assert_eq!(
        out.to_string_lossy(),
        "jsonTest log|{\"name\":\"Gon\",\"city\":\"Conway\",\"cnt\":3}\n\
         jsonTest nil|{}\n\
         jsonTest \"quoted \\\"text\\\"\"\n"
    );
}

#[test]
fn test_printj_encoding_failure_falls_back() {
    let (logger, out) = logger(Flags::NONE);
    let bad: HashMap<(i32, i32), i32> = HashMap::from([((1, 2), 3)]);
    logger.printj("bad|", Some(&bad));
    logger.printj("good|", Some(&[1, 2]));
    assert_eq!(out.to_string_lossy(), "bad|{}\ngood|[1,2]\n");
}

#[test]
fn test_levels() {
    let (logger, out) = logger(Flags::NONE);
    let emit = |tag: &str| {
        logger.printfl(Level::Debug, "debug: %s", &[tag.into()]);
        logger.printfl(Level::Info, "info: %s", &[tag.into()]);
        logger.printl(Level::Warn, &["warn: ".into(), tag.into()]);
        logger.printl(Level::Error, &["error: ".into(), tag.into()]);
        logger.printjl(Level::Fatal, "fatal: ", Some(tag));
    };

    emit("t1");
    logger.disable_levels(Level::Info | Level::Warn);
    emit("t2");
    logger.enable_levels(Level::Debug | Level::Warn);
    emit("t3");

    assert_eq!(
        out.to_string_lossy(),
        "info: t1\nwarn: t1\nerror: t1\nfatal: \"t1\"\n\
         error: t2\nfatal: \"t2\"\n\
         debug: t3\nwarn: t3\nerror: t3\nfatal: \"t3\"\n"
    );
    assert_eq!(logger.levels(), LevelSet::ALL.difference(Level::Info.into()));
}

#[test]
fn test_reconfigure_does_not_rerender_buffered() {
    let (logger, out) = logger(Flags::PREFIX | Flags::BUF_SMALL);
    logger.set_prefix("old|");
    log_print!(logger, "first");
    logger.set_prefix("new|");
    log_print!(logger, "second");
    logger.set_flag(Flags::NONE);
    log_print!(logger, "third");
    // buffering was fixed at construction
    assert_eq!(logger.buffer_mode(), BufferMode::Small);
    assert!(out.is_empty());

    logger.flush();
    assert_eq!(out.to_string_lossy(), "old|first\nnew|second\nthird\n");
}

#[test]
fn test_header_layout() {
    let (logger, out) = logger(Flags::DATE | Flags::MICROSEC | Flags::UTC | Flags::PREFIX);
    logger.set_prefix("p|");
    log_print!(logger, "msg");

    let line = out.to_string_lossy();
    // YYYY/MM/DD hh:mm:ss.uuuuuu p|msg\n
    assert_eq!(line.len(), 27 + "p|msg\n".len(), "unexpected line: {line:?}");
    let b = line.as_bytes();
    for (idx, sep) in [(4, b'/'), (7, b'/'), (10, b' '), (13, b':'), (16, b':'), (19, b'.'), (26, b' ')] {
        assert_eq!(b[idx], sep, "separator at {idx} in {line:?}");
    }
    for idx in (0..26).filter(|i| ![4, 7, 10, 13, 16, 19].contains(i)) {
        assert!(b[idx].is_ascii_digit(), "digit at {idx} in {line:?}");
    }
    assert!(line.ends_with(" p|msg\n"));
}

#[test]
fn test_header_mmdd_time() {
    let (logger, out) = logger(Flags::STD);
    log_print!(logger, "x");
    let line = out.to_string_lossy();
    // MM/DD hh:mm:ss x\n, empty prefix
    assert_eq!(line.len(), 17, "unexpected line: {line:?}");
    assert_eq!(&line[2..3], "/");
    assert_eq!(&line[5..6], " ");
    assert_eq!(&line[8..9], ":");
    assert!(line.ends_with(" x\n"));
}

#[test]
fn test_sink_failures_are_swallowed() {
    let logger = Logger::with_sink(FailingSink, "", Flags::NONE);
    log_print!(logger, "into the void");
    log_printf!(logger, "%d", 1);
    let err = logger.close().unwrap_err();
    assert_eq!(err.to_string(), "close failed");

    // the failing sink is gone after close
    log_print!(logger, "still fine");
    assert!(logger.close().is_ok());
}

#[test]
fn test_concurrent_writers_are_serialized() {
    let sink = CountingSink::default();
    let logger = Arc::new(Logger::with_sink(sink.clone(), "", Flags::BUF_SMALL));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..200 {
                    log_printf!(logger, "thread=%d seq=%d payload=%s", t, i, "abcdefghij");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush();

    let text = sink.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1600);
    for line in &lines {
        assert!(line.starts_with("thread="), "interleaved line: {line:?}");
        assert!(line.ends_with(" payload=abcdefghij"), "interleaved line: {line:?}");
    }
    for t in 0..8 {
        let prefix = format!("thread={t} ");
        assert_eq!(lines.iter().filter(|l| l.starts_with(&prefix)).count(), 200);
    }
}

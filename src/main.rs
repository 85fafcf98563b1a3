use std::io;
use std::sync::Arc;

use alog::{bridge, log_print, log_printf, Config, Level, Logger};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Startup<'a> {
    name: &'a str,
    pid: u32,
    args: usize,
}

fn main() -> io::Result<()> {
    // alog's own diagnostics (failed sink writes etc.) go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let logger = Arc::new(config.build(Some(Box::new(io::stdout()))));

    log_printf!(logger, "starting %s with flags %s", "alog", &config.flags.to_string());
    logger.printj(
        "startup|",
        Some(&Startup { name: "alog", pid: std::process::id(), args: std::env::args().count() }),
    );
    for (i, arg) in std::env::args().skip(1).enumerate() {
        log_print!(logger, "arg[", i, "]=", &arg);
    }
    logger.printfl(Level::Debug, "debug records are off unless ALOG_LEVELS enables them", &[]);

    bridge::init(Arc::clone(&logger), log::LevelFilter::Info)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    log::info!("records from the log facade land in the same stream");

    logger.close()
}

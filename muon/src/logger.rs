//! Console logger behind the `log` facade.
//!
//! Three output levels controlled by CLI flags:
//! - **Quiet** (`-q`): warnings, errors, and the final summary only
//! - **Default** (no flag): the per-call stream on stdout as well
//! - **Verbose** (`-v`): everything, including generator diagnostics
//!
//! The call stream (info level) goes to stdout, since it is the tool's
//! data output; diagnostics go to stderr with a level color.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

struct Logger;

static LOGGER: Logger = Logger;

fn level_color(level: Level) -> u8 {
    match level {
        Level::Error => 31,
        Level::Warn => 93,
        Level::Info => 34,
        Level::Debug => 32,
        Level::Trace => 90,
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Info => println!("{}", record.args()),
            level => eprintln!(
                "\x1b[{}m{:>5}\x1b[0m {}",
                level_color(level),
                level,
                record.args()
            ),
        }
    }

    fn flush(&self) {
        use std::io::Write;
        let _ = std::io::stdout().flush();
    }
}

/// Installs the logger and sets the level from the CLI flags.
///
/// # Errors
///
/// Fails if a logger was already installed.
pub fn init(quiet: bool, verbose: bool) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    Ok(())
}

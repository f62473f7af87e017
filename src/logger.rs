//! `log` backend that writes to the brain's serial console.

use core::time::Duration;

use log::{max_level, set_logger, set_max_level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use vexide::io::println;

/// ANSI color per level, indexed by `Level as usize`.
const COLORS: [&str; 6] = [
    "",
    "\x1B[31m", // Error
    "\x1B[33m", // Warn
    "\x1B[34m", // Info
    "\x1B[36m", // Debug
    "\x1B[37m", // Trace
];

/// Target of the periodic pose records.
const TELEMETRY_TARGET: &str = "odometry::telemetry";

/// Prints records stamped with the brain uptime.
///
/// Telemetry records are printed bare so host tools can parse them.
pub struct SerialLogger;

impl SerialLogger {
    pub fn init(&'static self, level: LevelFilter) -> Result<(), SetLoggerError> {
        set_logger(self)?;
        set_max_level(level);
        Ok(())
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if record.target() == TELEMETRY_TARGET {
            println!("{}", record.args());
            return;
        }
        let uptime = Duration::from_micros(unsafe { vex_sdk::vexSystemHighResTimeGet() });
        println!(
            "{:02}:{:02}.{:03} {}[{}]\x1B[0m {}",
            uptime.as_secs() / 60,
            uptime.as_secs() % 60,
            uptime.subsec_millis(),
            COLORS[record.level() as usize],
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

//! Logger setup.

use std::io::Write;

use log::LevelFilter;

/// Install `env_logger` at `level`. `RUST_LOG` overrides it per module.
///
/// In raw terminal mode LF no longer returns the carriage, so `raw_mode`
/// terminates each record with CRLF.
pub fn init(level: LevelFilter, raw_mode: bool) {
    let eol = if raw_mode { "\r\n" } else { "\n" };

    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            write!(
                buf,
                "{} {:<5} {}{eol}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .init();
}

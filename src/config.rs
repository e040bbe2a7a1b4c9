//! Command-line configuration.

use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use transmitter_core::ReceiveMode;

#[cfg(windows)]
const DEFAULT_PORT: &str = "COM7";
#[cfg(not(windows))]
const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// How bytes arriving on the serial port are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RxMode {
    /// Decode 25-byte SBUS frames.
    Frame,
    /// Print LF-terminated text lines.
    Line,
}

impl From<RxMode> for ReceiveMode {
    fn from(mode: RxMode) -> Self {
        match mode {
            RxMode::Frame => ReceiveMode::Frame,
            RxMode::Line => ReceiveMode::Line,
        }
    }
}

/// Emulate an RC transmitter: keyboard in, SBUS frames out over a serial port.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Serial port to open
    #[arg(short, long, default_value = DEFAULT_PORT)]
    pub port: String,

    /// Baud rate (8N1)
    #[arg(short, long, default_value_t = sbus_proto::DEFAULT_BAUDRATE)]
    pub baud: u32,

    /// Milliseconds between transmitted frames
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub tx_period_ms: u64,

    /// Milliseconds between keyboard polls
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_ms: u64,

    /// Interpretation of received bytes
    #[arg(long, value_enum, default_value_t = RxMode::Line)]
    pub rx_mode: RxMode,

    /// Drop received frames with a bad header or footer
    #[arg(long)]
    pub validate_frames: bool,

    /// Serial read timeout in milliseconds
    #[arg(long, default_value_t = 50)]
    pub read_timeout_ms: u64,

    /// Do not read the keyboard; transmit the neutral channel values
    #[arg(long)]
    pub no_keyboard: bool,

    /// Milliseconds between monitor output lines (0 disables the monitor)
    #[arg(long, default_value_t = 500)]
    pub monitor_ms: u64,

    /// More output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Config {
    #[must_use]
    pub fn tx_period(&self) -> Duration {
        Duration::from_millis(self.tx_period_ms)
    }

    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// `None` when the monitor is disabled.
    #[must_use]
    pub fn monitor_period(&self) -> Option<Duration> {
        (self.monitor_ms > 0).then(|| Duration::from_millis(self.monitor_ms))
    }

    #[must_use]
    pub fn keyboard_enabled(&self) -> bool {
        !self.no_keyboard
    }

    /// Log level from `-v`/`-q`, starting at `Info`.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            i16::MIN..=-2 => LevelFilter::Error,
            -1 => LevelFilter::Warn,
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("sbus-transmitter").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.baud, 115_200);
        assert_eq!(config.tx_period(), Duration::from_millis(10));
        assert_eq!(config.poll_period(), Duration::from_millis(5));
        assert_eq!(config.rx_mode, RxMode::Line);
        assert!(!config.validate_frames);
        assert!(config.keyboard_enabled());
        assert_eq!(config.monitor_period(), Some(Duration::from_millis(500)));
        assert_eq!(config.log_level(), LevelFilter::Info);
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--port",
            "/dev/ttyACM1",
            "-b",
            "100000",
            "--tx-period-ms",
            "2",
            "--rx-mode",
            "frame",
            "--validate-frames",
            "--no-keyboard",
            "--monitor-ms",
            "0",
            "-vv",
        ])
        .unwrap();
        assert_eq!(config.port, "/dev/ttyACM1");
        assert_eq!(config.baud, 100_000);
        assert_eq!(config.tx_period(), Duration::from_millis(2));
        assert_eq!(ReceiveMode::from(config.rx_mode), ReceiveMode::Frame);
        assert!(config.validate_frames);
        assert!(!config.keyboard_enabled());
        assert_eq!(config.monitor_period(), None);
        assert_eq!(config.log_level(), LevelFilter::Trace);
    }

    #[test]
    fn test_zero_tx_period_rejected() {
        assert!(parse(&["--tx-period-ms", "0"]).is_err());
    }

    #[test]
    fn test_quiet_levels() {
        assert_eq!(parse(&["-q"]).unwrap().log_level(), LevelFilter::Warn);
        assert_eq!(parse(&["-qqq"]).unwrap().log_level(), LevelFilter::Error);
        assert!(parse(&["-q", "-v"]).is_err());
    }
}

//! Host adapters for the SBUS transmitter: configuration, logging, serial
//! port, terminal keyboard and the monitor display.

pub mod config;
pub mod keyboard;
pub mod logging;
pub mod monitor;
pub mod serial;

pub use config::{Config, RxMode};
pub use keyboard::{TerminalKeys, TerminalModeGuard};
pub use monitor::{Received, ReceivedSignal};
pub use serial::{SerialLink, SerialReader, SerialWriter};

use std::thread;

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use sbus_transmitter::{
    keyboard::HOLD_WINDOW, logging, monitor, serial, Config, ReceivedSignal, SerialReader,
    SerialWriter, TerminalKeys, TerminalModeGuard,
};
use transmitter_core::{
    ChannelStore, InputMapper, ReceiveEvent, Receiver, RunFlag, StatusCell, Transmitter,
    DEFAULT_KEYMAP,
};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init(config.log_level(), config.keyboard_enabled());

    info!("SBUS transmitter starting...");

    let store = ChannelStore::new();
    let running = RunFlag::new();
    let received = ReceivedSignal::new();

    // --- Serial setup ---
    let link = serial::open(&config.port, config.baud, config.read_timeout());
    let status = StatusCell::new(link.status);

    // --- Keyboard setup ---
    let keys = TerminalKeys::new(HOLD_WINDOW);
    let guard = if config.keyboard_enabled() {
        let guard = TerminalModeGuard::new().context("failed to set up the terminal")?;
        keys.set_reports_releases(guard.reports_releases());
        Some(guard)
    } else {
        info!("keyboard disabled, transmitting stored channel values");
        None
    };

    info!("{}", status.get());
    if guard.is_some() {
        for line in monitor::key_guide(&DEFAULT_KEYMAP) {
            info!("{line}");
        }
    }
    info!("press Esc or Ctrl+C to quit");

    thread::scope(|s| {
        if guard.is_some() {
            s.spawn(|| keyboard_task(&keys, &running));
            s.spawn(|| input_task(&keys, &store, &running, &config));
        }
        s.spawn(|| transmit_task(link.writer, &store, &status, &running, &config));
        s.spawn(|| receive_task(link.reader, &status, &received, &running, &config));

        match config.monitor_period() {
            Some(period) => monitor::run(&store, &status, &received, &running, period),
            None => {
                while running.is_running() {
                    thread::sleep(config.poll_period());
                }
            }
        }
    });

    drop(guard);
    info!("SBUS transmitter stopped");
    Ok(())
}

/// Keyboard task - turns terminal events into key state.
fn keyboard_task(keys: &TerminalKeys, running: &RunFlag) {
    if let Err(e) = keys.pump(running) {
        error!("keyboard error: {e}");
        running.stop();
    }
}

/// Input task - polls key state into the channel store.
fn input_task(keys: &TerminalKeys, store: &ChannelStore, running: &RunFlag, config: &Config) {
    let mut mapper = InputMapper::new(DEFAULT_KEYMAP);
    mapper.run(keys, store, running, config.poll_period());
}

/// Transmit task - sends the channel store at a fixed period.
fn transmit_task(
    writer: SerialWriter,
    store: &ChannelStore,
    status: &StatusCell,
    running: &RunFlag,
    config: &Config,
) {
    let mut transmitter = Transmitter::new(writer, store).with_status(status);
    let stats = transmitter.run(running, config.tx_period());
    info!(
        "transmitted {} frames ({} skipped, {} failed)",
        stats.sent, stats.skipped, stats.failed
    );
}

/// Receive task - decodes frames for the monitor or prints text lines.
fn receive_task(
    reader: SerialReader,
    status: &StatusCell,
    received: &ReceivedSignal,
    running: &RunFlag,
    config: &Config,
) {
    let mut receiver = Receiver::new(reader, config.rx_mode.into())
        .with_validation(config.validate_frames)
        .with_status(status);

    receiver.run(running, |event| match event {
        ReceiveEvent::Frame { raw, channels } => received.signal((*raw, channels)),
        ReceiveEvent::Line(line) => info!("> {line}"),
        ReceiveEvent::Rejected { .. } | ReceiveEvent::Discarded(_) => {}
    });
}

//! Periodic text display of the transmitter state.

use std::fmt::Write;
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::info;
use sbus_proto::{Frame, DECODED_CHANNELS};
use transmitter_core::{
    proportion, ChannelStore, KeyMap, RunFlag, StatusCell, Ticker, CHANNEL_NAMES, SWITCH_CHANNELS,
};

/// A received frame and its decoded channels.
pub type Received = (Frame, [u16; DECODED_CHANNELS]);

/// Latest received frame, written by the receive loop.
///
/// Only the most recent frame is kept; older ones are overwritten unseen.
pub type ReceivedSignal = Signal<CriticalSectionRawMutex, Received>;

/// Upper-case hex bytes separated by spaces.
#[must_use]
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02X}");
    }
    out
}

/// `CH1=1000(50%) CH2=...` for a channel vector.
#[must_use]
pub fn channel_line(values: &[u16]) -> String {
    let mut out = String::new();
    for (i, &v) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "CH{}={}({}%)", i + 1, v, proportion(v));
    }
    out
}

/// One line per channel with its name and a bar of 20 cells.
#[must_use]
pub fn channel_table(values: &[u16]) -> String {
    let mut out = String::new();
    for (name, &v) in CHANNEL_NAMES.iter().zip(values) {
        let filled = usize::from(proportion(v)) / 5;
        let _ = writeln!(
            out,
            "{name:<26}{v:>5} [{}{}]",
            "#".repeat(filled),
            ".".repeat(20 - filled)
        );
    }
    out
}

/// One line per binding of `keymap`, for the startup help.
#[must_use]
pub fn key_guide(keymap: &KeyMap) -> Vec<String> {
    let mut guide = Vec::new();
    for axis in &keymap.axes {
        guide.push(format!(
            "{} / {}  {} up / down",
            axis.increase.char(),
            axis.decrease.char(),
            CHANNEL_NAMES[axis.channel]
        ));
    }
    let snap = &keymap.snap;
    guide.push(format!(
        "{} / {}  {} to {} / {}",
        snap.low.char(),
        snap.high.char(),
        CHANNEL_NAMES[snap.channel],
        snap.low_value,
        snap.high_value
    ));
    for toggle in &keymap.toggles {
        guide.push(format!(
            "{}      cycle {}",
            toggle.key.char(),
            CHANNEL_NAMES[SWITCH_CHANNELS[toggle.slot]]
        ));
    }
    guide.push(format!("{}      reset all channels", keymap.reset.char()));
    guide
}

/// Log the channel snapshot, link status and the latest received frame
/// every `period` until `running` is cleared.
pub fn run(
    store: &ChannelStore,
    status: &StatusCell,
    received: &ReceivedSignal,
    running: &RunFlag,
    period: Duration,
) {
    let mut ticker = Ticker::every(period);
    let mut last = None;

    for row in channel_table(&store.snapshot()).lines() {
        info!("{row}");
    }
    while running.is_running() {
        info!("{} | TX {}", status.get(), channel_line(&store.snapshot()));

        if let Some((raw, channels)) = received.try_take() {
            info!("RX [{}]", hex(&raw));
            info!("RX {}", channel_line(&channels));
            last = Some(raw);
        } else if last.take().is_some() {
            info!("RX idle");
        }

        ticker.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex as bytes;
    use transmitter_core::{DEFAULT_KEYMAP, NEUTRAL_CHANNELS};

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[]), "");
        assert_eq!(hex(&bytes!("0F E8 00")), "0F E8 00");
    }

    #[test]
    fn test_hex_neutral_frame() {
        let frame = sbus_proto::encode(&NEUTRAL_CHANNELS);
        assert_eq!(
            hex(&frame),
            "0F E8 43 1F FA D0 47 1F F4 D1 87 3E F4 A1 0F 7D E8 43 1F FA D0 87 3E 00 00"
        );
    }

    #[test]
    fn test_channel_line() {
        assert_eq!(
            channel_line(&[1000, 500, 1680]),
            "CH1=1000(50%) CH2=500(0%) CH3=1680(100%)"
        );
    }

    #[test]
    fn test_channel_table_rows() {
        let table = channel_table(&NEUTRAL_CHANNELS);
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 16);
        assert!(rows[0].starts_with("CH1 Aileron L"));
        assert!(rows[0].ends_with("[##########..........]"));
        assert!(rows[4].ends_with("[....................]"));
    }

    #[test]
    fn test_key_guide_default_keymap() {
        let guide = key_guide(&DEFAULT_KEYMAP);
        assert_eq!(guide.len(), 4 + 1 + 11 + 1);
        assert_eq!(guide[0], "j / l  CH1 Aileron L up / down");
        assert_eq!(guide[4], "q / e  CH6 Aileron R to 360 / 1680");
        assert_eq!(guide[5], "0      cycle CH5 Drop device");
        assert_eq!(guide[15], "-      cycle CH16 Aux");
        assert_eq!(guide[16], "R      reset all channels");
    }

    #[test]
    fn test_signal_keeps_latest() {
        let signal = ReceivedSignal::new();
        signal.signal(([1; 25], [1; 12]));
        signal.signal(([2; 25], [2; 12]));
        assert_eq!(signal.try_take().map(|(raw, _)| raw[0]), Some(2));
        assert!(signal.try_take().is_none());
    }
}

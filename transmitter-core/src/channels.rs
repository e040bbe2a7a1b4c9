//! Channel Store: the shared channel vector and switch states.
//!
//! # Concurrency
//!
//! The store is a best-effort "latest value wins" register shared by the
//! input, transmit, receive and display loops. Every slot is an independent
//! atomic accessed with `Relaxed` ordering and there is no lock around the
//! vector as a whole. A reader may therefore observe a snapshot that mixes
//! values from before and after a concurrent write (for example half of a
//! [`ChannelStore::reset_to_neutral`]). That torn snapshot costs at most one
//! frame, which the next transmit tick replaces.
//!
//! The transmit cycle must never wait on the input loop, so the store is not
//! to be wrapped in a lock. Writes come from a single thread (the input
//! mapper).

use portable_atomic::{AtomicU16, AtomicU8, Ordering};

/// Number of channels in the vector (one SBUS frame worth).
pub const CHANNEL_COUNT: usize = sbus_proto::CHANNEL_COUNT;

/// Number of three-position switch channels.
pub const SWITCH_COUNT: usize = 11;

/// Lower bound of the analog channel range.
pub const AXIS_MIN: u16 = 360;

/// Upper bound of the analog channel range.
pub const AXIS_MAX: u16 = 1680;

/// Analog channel value at power-on and after reset.
pub const AXIS_NEUTRAL: u16 = 1000;

/// Channel index of each switch slot: CH5, then CH7 through CH16.
pub const SWITCH_CHANNELS: [usize; SWITCH_COUNT] = [4, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

/// Channel vector at power-on and after reset.
pub const NEUTRAL_CHANNELS: [u16; CHANNEL_COUNT] = [
    AXIS_NEUTRAL,
    AXIS_NEUTRAL,
    AXIS_NEUTRAL,
    AXIS_NEUTRAL,
    SwitchPosition::Low.value(),
    AXIS_NEUTRAL,
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
    SwitchPosition::Low.value(),
];

/// Human-readable channel labels, indexed by channel index.
pub const CHANNEL_NAMES: [&str; CHANNEL_COUNT] = [
    "CH1 Aileron L",
    "CH2 Rudder",
    "CH3 Throttle",
    "CH4 Elevator",
    "CH5 Drop device",
    "CH6 Aileron R",
    "CH7 Autopilot",
    "CH8 Mission select",
    "CH9 Auto takeoff/landing",
    "CH10 Safety",
    "CH11 Pre-takeoff test",
    "CH12 Post-takeoff test",
    "CH13 Aux",
    "CH14 Aux",
    "CH15 Aux",
    "CH16 Aux",
];

/// Position of a three-position switch.
///
/// The discriminant is the switch state (1, 2 or 3) kept in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SwitchPosition {
    Low = 1,
    Mid = 2,
    High = 3,
}

impl SwitchPosition {
    /// Channel value output for this position.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u16 {
        match self {
            Self::Low => 500,
            Self::Mid => 1000,
            Self::High => 1500,
        }
    }

    /// Next position in the 1 -> 2 -> 3 -> 1 cycle.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Low => Self::Mid,
            Self::Mid => Self::High,
            Self::High => Self::Low,
        }
    }

    /// Switch state number (1-3).
    #[inline]
    #[must_use]
    pub const fn state(self) -> u8 {
        self as u8
    }

    /// Position for a switch state number, if valid.
    #[inline]
    #[must_use]
    pub const fn from_state(state: u8) -> Option<Self> {
        match state {
            1 => Some(Self::Low),
            2 => Some(Self::Mid),
            3 => Some(Self::High),
            _ => None,
        }
    }
}

/// Shared channel vector plus the switch state of every discrete channel.
///
/// See the [module documentation](self) for the synchronization contract.
#[derive(Debug)]
pub struct ChannelStore {
    channels: [AtomicU16; CHANNEL_COUNT],
    switches: [AtomicU8; SWITCH_COUNT],
}

impl ChannelStore {
    /// Create a store in the neutral configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: core::array::from_fn(|i| AtomicU16::new(NEUTRAL_CHANNELS[i])),
            switches: core::array::from_fn(|_| AtomicU8::new(SwitchPosition::Low.state())),
        }
    }

    /// Current value of a channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= CHANNEL_COUNT`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u16 {
        self.channels[index].load(Ordering::Relaxed)
    }

    /// Overwrite a channel value.
    ///
    /// No range check is done here: anything above 2047 loses its high bits
    /// when encoded, so callers clamp before writing.
    ///
    /// # Panics
    ///
    /// Panics if `index >= CHANNEL_COUNT`.
    #[inline]
    pub fn set(&self, index: usize, value: u16) {
        self.channels[index].store(value, Ordering::Relaxed);
    }

    /// Copy of the whole channel vector, read slot by slot.
    #[must_use]
    pub fn snapshot(&self) -> [u16; CHANNEL_COUNT] {
        core::array::from_fn(|i| self.get(i))
    }

    /// Current position of a switch slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= SWITCH_COUNT`.
    #[must_use]
    pub fn switch_position(&self, slot: usize) -> SwitchPosition {
        let state = self.switches[slot].load(Ordering::Relaxed);
        SwitchPosition::from_state(state).unwrap_or(SwitchPosition::Low)
    }

    /// Advance a switch slot one position and write its channel value.
    ///
    /// Returns the new position.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= SWITCH_COUNT`.
    pub fn cycle_switch(&self, slot: usize) -> SwitchPosition {
        let position = self.switch_position(slot).next();
        self.switches[slot].store(position.state(), Ordering::Relaxed);
        self.set(SWITCH_CHANNELS[slot], position.value());
        position
    }

    /// Restore every channel and every switch state to power-on values.
    pub fn reset_to_neutral(&self) {
        for (slot, &value) in self.channels.iter().zip(NEUTRAL_CHANNELS.iter()) {
            slot.store(value, Ordering::Relaxed);
        }
        for switch in &self.switches {
            switch.store(SwitchPosition::Low.state(), Ordering::Relaxed);
        }
    }

    /// Check that a switch slot's channel carries the value of its position.
    #[must_use]
    pub fn is_switch_consistent(&self, slot: usize) -> bool {
        self.get(SWITCH_CHANNELS[slot]) == self.switch_position(slot).value()
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Bar-graph fill (0-100 %) of a value on the 500-1500 display scale.
#[inline]
#[must_use]
pub fn proportion(value: u16) -> u8 {
    (i32::from(value) - 500).clamp(0, 1000).div_euclid(10) as u8
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering as StdOrdering};
    use std::thread;

    #[test]
    fn test_new_store_is_neutral() {
        let store = ChannelStore::new();
        assert_eq!(store.snapshot(), NEUTRAL_CHANNELS);
        for slot in 0..SWITCH_COUNT {
            assert_eq!(store.switch_position(slot), SwitchPosition::Low);
            assert!(store.is_switch_consistent(slot));
        }
    }

    #[test]
    fn test_set_accepts_any_value() {
        let store = ChannelStore::new();
        store.set(3, 4095);
        assert_eq!(store.get(3), 4095);
    }

    #[test]
    fn test_cycle_switch_wraps() {
        let store = ChannelStore::new();
        let expected = [
            SwitchPosition::Mid,
            SwitchPosition::High,
            SwitchPosition::Low,
            SwitchPosition::Mid,
        ];
        for position in expected {
            assert_eq!(store.cycle_switch(0), position);
            assert_eq!(store.get(4), position.value());
            assert!(store.is_switch_consistent(0));
        }
    }

    #[test]
    fn test_cycle_switch_targets_mapped_channel() {
        let store = ChannelStore::new();
        store.cycle_switch(10);
        assert_eq!(store.get(15), 1000);
        assert_eq!(store.get(14), 500);
    }

    #[test]
    fn test_reset_restores_channels_and_switches() {
        let store = ChannelStore::new();
        store.set(0, 1680);
        store.set(5, 360);
        store.cycle_switch(3);
        store.cycle_switch(3);

        store.reset_to_neutral();

        assert_eq!(store.snapshot(), NEUTRAL_CHANNELS);
        for slot in 0..SWITCH_COUNT {
            assert_eq!(store.switch_position(slot), SwitchPosition::Low);
            assert_eq!(store.get(SWITCH_CHANNELS[slot]), 500);
        }
    }

    #[test]
    fn test_proportion() {
        assert_eq!(proportion(360), 0);
        assert_eq!(proportion(500), 0);
        assert_eq!(proportion(1000), 50);
        assert_eq!(proportion(1500), 100);
        assert_eq!(proportion(1680), 100);
    }

    /// Readers racing a writer see only values the writer actually stored,
    /// slot by slot. Cross-slot consistency is not promised.
    #[test]
    fn test_concurrent_readers_see_written_values() {
        let store = ChannelStore::new();
        let done = AtomicBool::new(false);

        thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..2_000 {
                    store.set(0, AXIS_MIN);
                    store.set(0, AXIS_MAX);
                }
                done.store(true, StdOrdering::Release);
            });

            s.spawn(|| {
                while !done.load(StdOrdering::Acquire) {
                    let value = store.snapshot()[0];
                    assert!(value == AXIS_NEUTRAL || value == AXIS_MIN || value == AXIS_MAX);
                }
            });
        });
    }
}

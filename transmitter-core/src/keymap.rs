//! Key bindings for the Input Mapper.

use crate::channels::{AXIS_MAX, AXIS_MIN, SWITCH_COUNT};

/// A key, identified by the character it produces.
///
/// Letters are case-sensitive: `R` (reset) and `r` are different keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key(pub char);

impl Key {
    #[inline]
    #[must_use]
    pub const fn char(self) -> char {
        self.0
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self(c)
    }
}

/// A channel stepped up and down while a key is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisBinding {
    pub channel: usize,
    /// Adds `step` per tick. Wins when both keys are held.
    pub increase: Key,
    /// Subtracts `step` per tick.
    pub decrease: Key,
    pub step: u16,
    pub min: u16,
    pub max: u16,
}

/// A channel jumped to one of two fixed values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapBinding {
    pub channel: usize,
    /// Sets the channel to `low_value`. Wins when both keys are held.
    pub low: Key,
    pub high: Key,
    pub low_value: u16,
    pub high_value: u16,
}

/// A key cycling one switch slot per press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleBinding {
    pub key: Key,
    /// Index into the switch slots, not the channel vector.
    pub slot: usize,
}

/// Complete key assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyMap {
    pub axes: [AxisBinding; 4],
    pub snap: SnapBinding,
    pub toggles: [ToggleBinding; SWITCH_COUNT],
    pub reset: Key,
}

impl KeyMap {
    /// Switch slot toggled by `key`, if any.
    #[must_use]
    pub fn toggle_slot(&self, key: Key) -> Option<usize> {
        self.toggles.iter().find(|t| t.key == key).map(|t| t.slot)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        DEFAULT_KEYMAP
    }
}

/// Step applied to an axis per input tick.
pub const AXIS_STEP: u16 = 10;

const fn axis(channel: usize, increase: char, decrease: char) -> AxisBinding {
    AxisBinding {
        channel,
        increase: Key(increase),
        decrease: Key(decrease),
        step: AXIS_STEP,
        min: AXIS_MIN,
        max: AXIS_MAX,
    }
}

const fn toggle(key: char, slot: usize) -> ToggleBinding {
    ToggleBinding {
        key: Key(key),
        slot,
    }
}

/// Default key assignment.
///
/// | Keys      | Function                         |
/// |-----------|----------------------------------|
/// | `j` / `l` | CH1 up / down                    |
/// | `a` / `d` | CH2 up / down                    |
/// | `w` / `s` | CH3 up / down                    |
/// | `i` / `k` | CH4 up / down                    |
/// | `q` / `e` | CH6 to 360 / 1680                |
/// | `0`       | cycle CH5                        |
/// | `1`...`9` | cycle CH7...CH15                 |
/// | `-`       | cycle CH16                       |
/// | `R`       | reset all channels to neutral    |
pub const DEFAULT_KEYMAP: KeyMap = KeyMap {
    axes: [
        axis(0, 'j', 'l'),
        axis(1, 'a', 'd'),
        axis(2, 'w', 's'),
        axis(3, 'i', 'k'),
    ],
    snap: SnapBinding {
        channel: 5,
        low: Key('q'),
        high: Key('e'),
        low_value: AXIS_MIN,
        high_value: AXIS_MAX,
    },
    toggles: [
        toggle('0', 0),
        toggle('1', 1),
        toggle('2', 2),
        toggle('3', 3),
        toggle('4', 4),
        toggle('5', 5),
        toggle('6', 6),
        toggle('7', 7),
        toggle('8', 8),
        toggle('9', 9),
        toggle('-', 10),
    ],
    reset: Key('R'),
};

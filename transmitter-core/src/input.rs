//! Input Mapper: turns held keys into channel store mutations.

use crate::channels::{ChannelStore, CHANNEL_COUNT, SWITCH_CHANNELS, SWITCH_COUNT};
use crate::keymap::{AxisBinding, Key, KeyMap, SnapBinding, DEFAULT_KEYMAP};

/// Level-triggered key state, queried once per poll tick.
///
/// Implementations report whether a key is down *now*. Releases are never
/// delivered as events; a key that is no longer held is simply reported as
/// not held on the next query.
pub trait KeySource {
    fn is_held(&self, key: Key) -> bool;
}

impl<T: KeySource + ?Sized> KeySource for &T {
    fn is_held(&self, key: Key) -> bool {
        (**self).is_held(key)
    }
}

/// Edge detector for one toggle key.
///
/// ```text
///            held                 consume()
/// Released ------> PressedUnconsumed -------> PressedConsumed
///    ^                                               |
///    +------------------- not held ------------------+
/// ```
///
/// A release from either pressed state returns to `Released`. Only the
/// `PressedUnconsumed -> PressedConsumed` step triggers an action, so one
/// press fires once however many ticks the key stays down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToggleLatch {
    #[default]
    Released,
    PressedUnconsumed,
    PressedConsumed,
}

impl ToggleLatch {
    /// Feed the current key level.
    pub fn observe(&mut self, held: bool) {
        *self = match (*self, held) {
            (_, false) => Self::Released,
            (Self::Released, true) => Self::PressedUnconsumed,
            (state, true) => state,
        };
    }

    /// Take the pending press, if any.
    pub fn consume(&mut self) -> bool {
        if *self == Self::PressedUnconsumed {
            *self = Self::PressedConsumed;
            true
        } else {
            false
        }
    }

    /// Observe and consume in one step. Returns `true` on the press edge.
    pub fn poll(&mut self, held: bool) -> bool {
        self.observe(held);
        self.consume()
    }

    /// Whether the key is down as of the last observation.
    #[inline]
    #[must_use]
    pub fn is_latched(self) -> bool {
        self != Self::Released
    }
}

/// What one [`InputMapper::poll`] tick changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollOutcome {
    /// Bit `i` is set when channel `i` took a new value.
    pub changed: u16,
    /// The reset key fired this tick.
    pub reset: bool,
}

impl PollOutcome {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed == 0 && !self.reset
    }

    #[inline]
    #[must_use]
    pub fn channel_changed(&self, index: usize) -> bool {
        self.changed & (1 << index) != 0
    }

    /// Indices of the changed channels, lowest first.
    pub fn changed_channels(&self) -> impl Iterator<Item = usize> {
        let changed = self.changed;
        (0..CHANNEL_COUNT).filter(move |&i| changed & (1 << i) != 0)
    }
}

/// Polls a [`KeySource`] and applies the key map to a [`ChannelStore`].
///
/// The mapper is the only writer of the store. It owns the toggle latches
/// (the set of keys that already fired and are still held).
#[derive(Debug, Clone)]
pub struct InputMapper {
    keymap: KeyMap,
    toggles: [ToggleLatch; SWITCH_COUNT],
    reset: ToggleLatch,
}

impl InputMapper {
    #[must_use]
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            toggles: [ToggleLatch::Released; SWITCH_COUNT],
            reset: ToggleLatch::Released,
        }
    }

    #[must_use]
    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Run one input tick: axes, then the snapped channel, then toggles,
    /// then reset. A reset pressed in the same tick as other keys wins.
    pub fn poll<K: KeySource>(&mut self, keys: &K, store: &ChannelStore) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        for axis in &self.keymap.axes {
            if step_axis(axis, keys, store) {
                outcome.changed |= 1 << axis.channel;
            }
        }

        if snap(&self.keymap.snap, keys, store) {
            outcome.changed |= 1 << self.keymap.snap.channel;
        }

        for (binding, latch) in self.keymap.toggles.iter().zip(self.toggles.iter_mut()) {
            if latch.poll(keys.is_held(binding.key)) {
                store.cycle_switch(binding.slot);
                outcome.changed |= 1 << SWITCH_CHANNELS[binding.slot];
            }
        }

        if self.reset.poll(keys.is_held(self.keymap.reset)) {
            store.reset_to_neutral();
            info!("channels reset to neutral");
            outcome.reset = true;
        }

        outcome
    }

    /// Keys currently latched: pressed on an earlier tick and not yet
    /// seen released.
    pub fn latched_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keymap
            .toggles
            .iter()
            .zip(self.toggles.iter())
            .filter(|(_, latch)| latch.is_latched())
            .map(|(binding, _)| binding.key)
            .chain(self.reset.is_latched().then_some(self.keymap.reset))
    }

    /// Release every latch. A key still held fires again on the next tick.
    pub fn clear_latches(&mut self) {
        self.toggles = [ToggleLatch::Released; SWITCH_COUNT];
        self.reset = ToggleLatch::Released;
    }
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new(DEFAULT_KEYMAP)
    }
}

/// Step one axis. Increase wins over decrease. Results are clamped to the
/// binding's bounds whatever the starting value.
fn step_axis<K: KeySource>(axis: &AxisBinding, keys: &K, store: &ChannelStore) -> bool {
    let value = store.get(axis.channel);
    let next = if keys.is_held(axis.increase) {
        if value >= axis.max {
            return false;
        }
        value.saturating_add(axis.step)
    } else if keys.is_held(axis.decrease) {
        if value <= axis.min {
            return false;
        }
        value.saturating_sub(axis.step)
    } else {
        return false;
    };

    let next = next.clamp(axis.min, axis.max);
    store.set(axis.channel, next);
    next != value
}

fn snap<K: KeySource>(binding: &SnapBinding, keys: &K, store: &ChannelStore) -> bool {
    let target = if keys.is_held(binding.low) {
        binding.low_value
    } else if keys.is_held(binding.high) {
        binding.high_value
    } else {
        return false;
    };

    let changed = store.get(binding.channel) != target;
    store.set(binding.channel, target);
    changed
}

#[cfg(feature = "std")]
impl InputMapper {
    /// Poll `keys` every `period` until `running` is cleared.
    pub fn run<K: KeySource>(
        &mut self,
        keys: &K,
        store: &ChannelStore,
        running: &crate::RunFlag,
        period: std::time::Duration,
    ) {
        let mut ticker = crate::Ticker::every(period);
        debug!("input loop started");
        while running.is_running() {
            let outcome = self.poll(keys, store);
            log_changes(&outcome, store);
            ticker.next();
        }
        debug!("input loop stopped");
    }
}

/// Log every channel a tick changed with its new value. A reset is logged
/// on its own by [`InputMapper::poll`].
#[cfg(feature = "std")]
fn log_changes(outcome: &PollOutcome, store: &ChannelStore) {
    if outcome.reset {
        return;
    }
    for index in outcome.changed_channels() {
        debug!("{}: {}", crate::channels::CHANNEL_NAMES[index], store.get(index));
    }
}

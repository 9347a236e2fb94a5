//! Haptic feedback on guesses
//!
//! Feedback is fire-and-forget: implementations never report failure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Pulse length for an accepted guess
pub const GUESS_PULSE: Duration = Duration::from_millis(50);

pub trait Haptics {
    fn pulse(&self, duration: Duration);
}

/// Drops every pulse
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self, _duration: Duration) {}
}

/// Rings the terminal bell in place of a vibration motor
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn pulse(&self, _duration: Duration) {
        let _ = console::Term::stdout().write_str("\x07");
    }
}

/// Counts pulses, for checking when feedback fires
#[derive(Debug, Default)]
pub struct PulseCounter {
    count: AtomicUsize,
}

impl PulseCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Haptics for PulseCounter {
    fn pulse(&self, _duration: Duration) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

impl<H: Haptics + ?Sized> Haptics for std::sync::Arc<H> {
    fn pulse(&self, duration: Duration) {
        (**self).pulse(duration)
    }
}

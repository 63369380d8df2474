//! Millisecond tick time, kept behind a trait because the tick counter
//! belongs to whatever scheduler hosts the task.

/// A point in time, in scheduler ticks of 1 ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ticks(u64);

impl Ticks {
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    pub fn millis_since(self, earlier: Ticks) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Source of monotonic ticks (the scheduler's tick counter).
pub trait Monotonic {
    fn now(&self) -> Ticks;
}

//! Stage timing for `PerfStats`.

/// Milliseconds on a clock whose origin is unspecified; only differences mean anything.
#[cfg(target_arch = "wasm32")]
#[inline]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Times one step and its stages. A stopped clock never reads the time.
pub(crate) struct StepClock {
    started_ms: Option<f64>,
}

impl StepClock {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { started_ms: enabled.then(now_ms) }
    }

    /// Run one stage, storing its duration in `slot` while the clock runs
    #[inline]
    pub(crate) fn stage<T>(&self, slot: &mut f64, f: impl FnOnce() -> T) -> T {
        if self.started_ms.is_none() {
            return f();
        }
        let t0 = now_ms();
        let out = f();
        *slot = now_ms() - t0;
        out
    }

    /// Time since the step started; `None` for a stopped clock
    pub(crate) fn total_ms(&self) -> Option<f64> {
        self.started_ms.map(|t0| now_ms() - t0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_clock_leaves_slots_alone() {
        let clock = StepClock::new(false);
        let mut slot = -1.0;
        assert_eq!(clock.stage(&mut slot, || 7), 7);
        assert_eq!(slot, -1.0);
        assert_eq!(clock.total_ms(), None);
    }

    #[test]
    fn running_clock_fills_slots() {
        let clock = StepClock::new(true);
        let mut slot = -1.0;
        clock.stage(&mut slot, || std::hint::black_box((0..1000u64).sum::<u64>()));
        assert!(slot >= 0.0);
        assert!(clock.total_ms().is_some_and(|t| t >= slot));
    }
}

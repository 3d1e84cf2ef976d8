//! Scoped timing over the `log` facade.

use std::time::Instant;

use log::info;

/// Logs the elapsed wall time of a scope when dropped.
///
/// ```
/// use fieldmap::instrumentation::Timer;
///
/// {
///     let _timer = Timer::new("octree construction");
///     // timed work
/// } // logs "octree construction took ..."
/// ```
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Starts a timer with the given label.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Elapsed time in milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1.0e3
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("{} took {:.3} ms", self.label, self.elapsed_ms());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let timer = Timer::new("test scope");
        let first = timer.elapsed_ms();
        let second = timer.elapsed_ms();
        assert!(second >= first);
        assert!(first >= 0.0);
    }
}

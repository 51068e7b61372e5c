//! Host platform hooks serviced during long conversions.

/// Progress reporting and pacing calls. All methods default to no-ops.
pub trait Host {
    /// `done` of `total` files are converted; `filename` is next.
    fn progress(&mut self, filename: &str, done: usize, total: usize) {
        let _ = (filename, done, total);
    }

    /// Services the hardware watchdog.
    fn watchdog(&mut self) {}

    /// Lets the platform refresh between files.
    fn yield_now(&mut self) {}
}

/// A host that ignores every hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}

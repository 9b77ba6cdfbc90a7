//! Cancellable periodic task driven by wall-clock time
//!
//! The level clock fires once per interval no matter how often it is polled.
//! The host polls it from its own timer callback; cancelling is idempotent and
//! a cancelled task never fires again until restarted.

#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    interval_ms: f64,
    next_due_ms: Option<f64>,
}

impl Countdown {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(1.0),
            next_due_ms: None,
        }
    }

    /// (Re)start; first fire is one interval after `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        self.next_due_ms = Some(now_ms + self.interval_ms);
    }

    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Number of fires that came due since the last poll
    pub fn poll(&mut self, now_ms: f64) -> u32 {
        let Some(mut due) = self.next_due_ms else {
            return 0;
        };
        let mut fired = 0;
        while now_ms >= due {
            fired += 1;
            due += self.interval_ms;
        }
        self.next_due_ms = Some(due);
        fired
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(1000.0)
    }
}
